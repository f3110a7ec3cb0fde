//! Text preparation for paced reveal.

mod chunker;

pub use chunker::{split, Chunker, DEFAULT_SENTENCES_PER_CHUNK};
