//! Reveal Demo: paced replay of a short conversation into a transcript.
//!
//! Drives the coordinator and scroll arbiter from a ticker thread, prints
//! the visible transcript rows whenever they change, and persists revealed
//! flags through the background marker.
//!
//! Run with `RUST_LOG=reveal=trace` to watch the scroll decisions.

use reveal::actor::MarkerConfig;
use reveal::{
    MarkRevealedWorker, Message, MessageId, MessageKind, RevealConfig, RevealCoordinator,
    ScrollArbiter, ScrollBehavior, ScrollConfig, StoreError, TickerActor, TickerConfig,
    Transcript,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const WIDTH: u16 = 48;
const HEIGHT: u16 = 6;

fn conversation() -> Vec<Message> {
    vec![
        Message::new("u1", MessageKind::User, "Where am I?", 1),
        Message::new(
            "m1",
            MessageKind::AiGenerated,
            "Hello there. It is dark. Footsteps echo nearby. Something moves.",
            2,
        ),
        Message::new(
            "m2",
            MessageKind::Narration,
            r#"{"content": "Rain begins to fall. Thunder rolls in the distance! Do you run?"}"#,
            3,
        ),
    ]
}

fn print_rows(view: &Transcript, frame: u64) {
    println!("--- frame {frame} (top row {}) ---", view.top());
    for line in view.visible_lines() {
        println!("| {:<width$} |", line.text, width = usize::from(WIDTH));
    }
}

fn main() -> reveal::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reveal=info")),
        )
        .init();

    println!("Reveal Demo");
    println!("===========");
    println!();

    let store = |id: &MessageId| {
        println!("  [store] {id} marked revealed");
        Ok::<(), StoreError>(())
    };
    let (marker, notifier) = MarkRevealedWorker::spawn(store, &MarkerConfig::default())?;
    let ticker = TickerActor::spawn(&TickerConfig::default())?;

    let mut coordinator = RevealCoordinator::with_notifier(RevealConfig::default(), notifier);
    let mut arbiter = ScrollArbiter::with_config(ScrollConfig {
        near_bottom_threshold: 1.0,
        jitter_threshold: 0.5,
        ..ScrollConfig::default()
    });
    arbiter.attach(Transcript::new(WIDTH, HEIGHT));

    let messages = conversation();
    let mut arrived = false;
    let mut last_top = None;
    let mut last_len = 0;

    for tick in ticker.receiver().iter() {
        let now = tick.at;

        if !arrived {
            if let Some(view) = arbiter.viewport_mut() {
                for message in &messages {
                    let text = if coordinator.is_eligible(message) {
                        ""
                    } else {
                        message.content.as_str()
                    };
                    view.push_message(message, text);
                }
            }
            coordinator.consider_batch(&messages, now);
            arrived = true;
        }

        let fired = match arbiter.viewport_mut() {
            Some(view) => coordinator.advance(now, view),
            None => 0,
        };
        if fired > 0 {
            arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, now);
        }
        if arbiter.run_frame() {
            arbiter.on_scroll(now);
        }

        if let Some(view) = arbiter.viewport() {
            let changed = last_top != Some(view.top()) || last_len != view.len();
            if changed || fired > 0 {
                print_rows(view, tick.frame);
                last_top = Some(view.top());
                last_len = view.len();
            }
        }

        if coordinator.next_deadline().is_none() && tick.elapsed > Duration::from_millis(500) {
            break;
        }
    }

    ticker.join();
    drop(coordinator);
    let stats = marker.join();
    println!();
    println!("Done: {} marked, {} failed", stats.marked, stats.failed);
    Ok(())
}
