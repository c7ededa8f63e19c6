use crate::mailbox::{Author, IndicatorColor, Mailbox, MailboxEvent, Status};

use std::{thread, time::Duration};

/// WHAT: Events from one producer arrive in emission order
/// WHY: The UI applies effects in arrival order
#[test]
#[allow(clippy::unwrap_used)]
fn given_two_producers_when_draining_then_each_producer_order_preserved() {
    // Given: Two producer threads posting numbered messages
    let (mailbox, events) = Mailbox::channel();
    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|tag| {
            let producer = mailbox.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    producer.notice(format!("{}{}", tag, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // When: Draining everything
    let drained = events.drain();

    // Then: Nothing dropped, each producer's sequence in order
    assert_eq!(drained.len(), 400);
    for tag in ["a", "b"] {
        let sequence: Vec<u32> = drained
            .iter()
            .filter_map(|e| match e {
                MailboxEvent::Message { text, .. } => text.strip_prefix(tag),
                _ => None,
            })
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(sequence, (0..200).collect::<Vec<_>>());
    }
}

/// WHAT: Draining an empty queue returns immediately
/// WHY: The UI tick must never block on workers
#[test]
fn given_empty_queue_when_draining_then_empty_without_blocking() {
    // Given: A queue with nothing posted
    let (_mailbox, events) = Mailbox::channel();

    // When/Then: Both drain and a short wait come back empty
    assert!(events.drain().is_empty());
    assert!(events.recv_timeout(Duration::from_millis(10)).is_none());
}

/// WHAT: Activity posts status before indicator
/// WHY: Consumers rely on the pair arriving together and in order
#[test]
fn given_activity_when_posting_then_status_then_indicator() {
    // Given: A mailbox
    let (mailbox, events) = Mailbox::channel();

    // When: Posting activity and a user line
    mailbox.activity(Status::Listening, IndicatorColor::Green);
    mailbox.user("hi");

    // Then: Three events in order
    let drained = events.drain();
    assert!(matches!(
        drained.as_slice(),
        [
            MailboxEvent::StatusChanged {
                state: Status::Listening
            },
            MailboxEvent::IndicatorChanged {
                color: IndicatorColor::Green
            },
            MailboxEvent::Message {
                sender: Author::User,
                ..
            },
        ]
    ));
    assert_eq!(Status::Processing.to_string(), "Processing...");
}

/// WHAT: Posting after the consumer is gone is harmless
/// WHY: Workers may outlive the UI during shutdown
#[test]
fn given_dropped_consumer_when_posting_then_no_panic() {
    // Given: A closed consumer
    let (mailbox, events) = Mailbox::channel();
    drop(events);

    // When/Then: Posting is a no-op
    mailbox.notice("late");
}
