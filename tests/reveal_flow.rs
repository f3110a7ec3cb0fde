//! End-to-end: coordinator output rendered into a transcript whose scroll
//! position is governed by the arbiter.

use reveal::{
    FollowMode, Message, MessageId, MessageKind, RevealConfig, RevealCoordinator, RevealSink,
    RevealUpdate, ScrollArbiter, ScrollBehavior, ScrollConfig, SessionId, ThrottledSink,
    Transcript, Viewport,
};
use std::time::{Duration, Instant};

const SCENE: &str = "Hello there. It is dark. Footsteps echo nearby. Something moves.";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Row-based thresholds for a terminal transcript.
fn row_config() -> ScrollConfig {
    ScrollConfig {
        near_bottom_threshold: 1.0,
        jitter_threshold: 0.5,
        ..ScrollConfig::default()
    }
}

struct Screen {
    coordinator: RevealCoordinator<Vec<MessageId>>,
    arbiter: ScrollArbiter<Transcript>,
    log: Vec<RevealUpdate>,
}

impl Screen {
    fn new(width: u16, height: u16) -> Self {
        let mut arbiter = ScrollArbiter::with_config(row_config());
        arbiter.attach(Transcript::new(width, height));
        Self {
            coordinator: RevealCoordinator::with_notifier(RevealConfig::default(), Vec::new()),
            arbiter,
            log: Vec::new(),
        }
    }

    fn view(&mut self) -> &mut Transcript {
        self.arbiter.viewport_mut().expect("attached")
    }

    fn receive(&mut self, messages: &[Message], now: Instant) {
        for message in messages {
            let text = if message.kind.is_revealable() && !message.revealed {
                ""
            } else {
                message.content.as_str()
            };
            self.view().push_message(message, text);
        }
        self.coordinator.consider_batch(messages, now);
    }

    /// One host frame: reveal steps, follow request, scroll.
    fn frame(&mut self, now: Instant) {
        let view = self.arbiter.viewport_mut().expect("attached");
        let log = &mut self.log;
        let fired = self.coordinator.advance(now, &mut |update: RevealUpdate| {
            log.push(update.clone());
            view.on_reveal(update);
        });

        if fired > 0 {
            self.arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, now);
        }
        if self.arbiter.run_frame() {
            self.arbiter.on_scroll(now);
        }
    }
}

#[test]
fn test_scene_streams_and_follows() {
    let t0 = Instant::now();
    let mut screen = Screen::new(40, 2);

    screen.receive(
        &[
            Message::new("u1", MessageKind::User, "Where am I?", 1),
            Message::new("m1", MessageKind::AiGenerated, SCENE, 2),
        ],
        t0,
    );
    let bottom = screen.view().max_scroll_offset();
    screen.view().scroll_to(bottom, ScrollBehavior::Instant);
    screen.arbiter.on_scroll(t0);

    screen.frame(t0);
    screen.frame(t0 + ms(200));
    screen.frame(t0 + ms(350));

    assert_eq!(
        screen.log,
        vec![
            RevealUpdate {
                message_id: MessageId::new("m1"),
                text: "Hello there. It is dark.".to_string(),
                complete: false,
            },
            RevealUpdate {
                message_id: MessageId::new("m1"),
                text: SCENE.to_string(),
                complete: true,
            },
        ]
    );
    assert_eq!(screen.coordinator.notifier(), &vec![MessageId::new("m1")]);
    assert!(screen.view().at_bottom());
    assert_eq!(screen.arbiter.mode(), FollowMode::AutoFollow);
}

#[test]
fn test_reading_back_blocks_follow_until_forced() {
    let t0 = Instant::now();
    // Narrow enough that the scene wraps past the visible rows.
    let mut screen = Screen::new(20, 2);

    screen.receive(&[Message::new("m1", MessageKind::AiGenerated, SCENE, 1)], t0);
    for step in 0..4 {
        screen.frame(t0 + ms(350) * step);
    }
    assert!(screen.view().at_bottom());

    // The user scrolls up to re-read.
    screen.view().scroll_up(2);
    screen.arbiter.on_scroll(t0 + ms(1000));
    assert_eq!(screen.arbiter.mode(), FollowMode::ManualOverride);

    let rain = Message::new(
        "m2",
        MessageKind::Narration,
        "Rain falls. Thunder rolls. Lightning flashes.",
        2,
    );
    screen.receive(std::slice::from_ref(&rain), t0 + ms(1100));
    screen.frame(t0 + ms(1100));

    assert_eq!(screen.view().top(), 0);
    assert_eq!(screen.view().text(&rain.id), Some("Rain falls. Thunder rolls."));

    // Skip completes the message and force-scrolls regardless of mode.
    let now = t0 + ms(1200);
    let view = screen.arbiter.viewport_mut().expect("attached");
    assert!(screen.coordinator.skip(&rain.id, view));
    assert!(screen
        .arbiter
        .request_scroll_to_bottom(true, ScrollBehavior::Instant, now));
    assert!(screen.arbiter.run_frame());
    screen.arbiter.on_scroll(now);

    assert!(screen.view().at_bottom());
    assert_eq!(screen.view().text(&rain.id), Some(rain.content.as_str()));
    assert_eq!(screen.arbiter.mode(), FollowMode::ManualOverride);

    // Nothing else fires for the skipped message.
    let before = screen.log.len();
    screen.frame(t0 + ms(5000));
    assert_eq!(screen.log.len(), before);
    assert_eq!(screen.coordinator.notifier().len(), 2);
}

#[test]
fn test_previously_revealed_messages_render_whole() {
    let t0 = Instant::now();
    let mut screen = Screen::new(80, 4);

    let old = Message::new("old", MessageKind::AiGenerated, SCENE, 1).with_revealed(true);
    screen.receive(std::slice::from_ref(&old), t0);
    screen.frame(t0);

    assert!(screen.log.is_empty());
    assert_eq!(screen.view().text(&old.id), Some(SCENE));
}

#[test]
fn test_session_switch_allows_restreaming() {
    let t0 = Instant::now();
    let mut coordinator = RevealCoordinator::new();
    let message = Message::new("m1", MessageKind::AiGenerated, SCENE, 1);
    let mut out: Vec<RevealUpdate> = Vec::new();

    coordinator.bind_session(SessionId::new("a"));
    coordinator.consider(&message, t0);
    coordinator.advance(t0, &mut out);

    coordinator.bind_session(SessionId::new("b"));
    coordinator.advance(t0 + ms(1000), &mut out);
    assert_eq!(out.len(), 1);

    assert!(coordinator.consider(&message, t0 + ms(1000)));
    coordinator.advance(t0 + ms(1000), &mut out);
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].text, "Hello there. It is dark.");
}

#[test]
fn test_throttled_pipeline_delivers_completion() {
    let t0 = Instant::now();
    let mut coordinator = RevealCoordinator::new();
    let mut throttle = ThrottledSink::new(ms(500), t0);
    let mut view = Transcript::new(80, 4);

    let batch = [
        Message::new("a", MessageKind::AiGenerated, SCENE, 1),
        Message::new("b", MessageKind::Narration, SCENE, 2),
    ];
    coordinator.consider_batch(&batch, t0);

    let mut now = t0;
    while coordinator.next_deadline().is_some() {
        now += ms(50);
        coordinator.advance(now, &mut throttle);
        throttle.poll(now, &mut view);
    }
    throttle.finish(&mut view);

    assert_eq!(view.text(&MessageId::new("a")), Some(SCENE));
    assert_eq!(view.text(&MessageId::new("b")), Some(SCENE));
}

/// A sink that counts calls, to check the one-call-per-step contract.
struct Counter(usize);

impl RevealSink for Counter {
    fn on_reveal(&mut self, _update: RevealUpdate) {
        self.0 += 1;
    }
}

#[test]
fn test_one_callback_per_step() {
    let t0 = Instant::now();
    let mut coordinator = RevealCoordinator::new();
    let mut counter = Counter(0);
    coordinator.consider(&Message::new("m", MessageKind::AiGenerated, SCENE, 1), t0);

    let mut steps = 0;
    let mut now = t0;
    while coordinator.next_deadline().is_some() {
        steps += coordinator.advance(now, &mut counter);
        now += ms(350);
    }
    assert_eq!(steps, 2);
    assert_eq!(counter.0, 2);
}
