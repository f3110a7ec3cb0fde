//! Rate limiting for the render path.
//!
//! Reveal steps from several messages can land in the same frame. A
//! [`ThrottledValue`] lets the host accept every update but re-render at a
//! bounded rate; [`ThrottledSink`](crate::reveal::ThrottledSink) applies it
//! to coordinator output.

mod buffer;

pub use buffer::ThrottledValue;
