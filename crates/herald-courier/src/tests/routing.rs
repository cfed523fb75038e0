//! Routing tests: profile filtering and undecodable payloads.

use super::harness::{PopScript, TestHarness, ALPHA_EVENT};
use crate::config::ConsumerProfile;
use crate::courier::IterationOutcome;
use herald_content::EventKind;
use std::time::Duration;
use tokio::time::Instant;

/// An alpha courier drops message events without counting them.
#[tokio::test(start_paused = true)]
async fn alpha_profile_skips_message_events() {
    let mut h = TestHarness::new(ConsumerProfile::Alpha);
    h.queue
        .script([PopScript::item(r#"{"type":"generic","message":"hello"}"#)]);

    let started = Instant::now();
    let outcome = h.courier.process_one_iteration().await.unwrap();

    assert!(matches!(
        outcome,
        IterationOutcome::Skipped {
            kind: EventKind::Generic
        }
    ));
    assert_eq!(h.gateway.post_count(), 0);
    assert_eq!(h.courier.state().consecutive_failures(), 0);
    assert_eq!(h.courier.stats().discarded, 1);
    // No pacing for items that never reached validation.
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// A message courier drops alpha events.
#[tokio::test(start_paused = true)]
async fn message_profile_skips_alpha_events() {
    let mut h = TestHarness::new(ConsumerProfile::Message);
    h.queue.script([PopScript::item(ALPHA_EVENT)]);

    let outcome = h.courier.process_one_iteration().await.unwrap();

    assert!(matches!(
        outcome,
        IterationOutcome::Skipped {
            kind: EventKind::AlphaNewToken
        }
    ));
    assert_eq!(h.gateway.post_count(), 0);
}

/// Discriminator spelling variants still route to the alpha profile.
#[tokio::test(start_paused = true)]
async fn non_canonical_discriminator_is_accepted() {
    let mut h = TestHarness::new(ConsumerProfile::Alpha);
    let payload = ALPHA_EVENT.replace("alpha_new_token", "AlphaNewToken");
    h.queue.script([PopScript::item(&payload)]);

    let outcome = h.courier.process_one_iteration().await.unwrap();

    assert!(matches!(outcome, IterationOutcome::Posted { .. }));
}

/// Events without a discriminator are handled by the message profile.
#[tokio::test(start_paused = true)]
async fn untyped_message_goes_to_message_profile() {
    let mut h = TestHarness::new(ConsumerProfile::Message);
    h.queue
        .script([PopScript::item(r#"{"message":"legacy payload"}"#)]);

    let outcome = h.courier.process_one_iteration().await.unwrap();

    assert!(matches!(
        outcome,
        IterationOutcome::Posted {
            kind: EventKind::Unknown,
            ..
        }
    ));
    assert_eq!(h.gateway.posted(), vec!["legacy payload"]);
}

/// Undecodable payloads are discarded and not counted.
#[tokio::test(start_paused = true)]
async fn malformed_payloads_are_discarded() {
    let mut h = TestHarness::new(ConsumerProfile::Alpha);
    h.queue.script([
        PopScript::item("{not json"),
        PopScript::item("[1, 2, 3]"),
        PopScript::Item(vec![0xff, 0xfe]),
    ]);

    for _ in 0..3 {
        let outcome = h.courier.process_one_iteration().await.unwrap();
        assert!(matches!(outcome, IterationOutcome::Malformed { .. }));
    }

    assert_eq!(h.gateway.post_count(), 0);
    assert_eq!(h.courier.state().consecutive_failures(), 0);
    assert_eq!(h.courier.stats().discarded, 3);
}
