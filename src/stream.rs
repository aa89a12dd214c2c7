//! Handoff channels between stages and the cancellation-aware send/receive
//! primitives every worker is built from.

use crate::cancel::CancellationToken;
use crossbeam::channel::{bounded, select, Receiver, Sender};

/// Receiving half of a stage-to-stage channel
pub type Stream = Receiver<i64>;

/// Sending half of a stage-to-stage channel
pub type StreamSender = Sender<i64>;

/// Create a rendezvous channel: each send blocks until the receiver takes
/// the value, so values arrive in send order and nothing queues in between.
pub fn handoff() -> (StreamSender, Stream) {
    bounded(0)
}

/// Outcome of waiting for the next input value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recv {
    Value(i64),
    /// Cancellation fired before a value arrived
    Cancelled,
    /// The producer dropped its end of the stream
    Closed,
}

/// Wait for the next value on `input`, giving up as soon as `cancel` fires
pub fn recv(cancel: &CancellationToken, input: &Stream) -> Recv {
    select! {
        recv(input) -> msg => match msg {
            Ok(value) => Recv::Value(value),
            Err(_) => Recv::Closed,
        },
        recv(cancel.receiver()) -> _ => Recv::Cancelled,
    }
}

/// Hand `value` to the downstream receiver, abandoning the send if `cancel`
/// fires first or the receiver is gone. Returns true if the value was taken.
pub fn send(cancel: &CancellationToken, output: &StreamSender, value: i64) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    select! {
        send(output, value) -> res => res.is_ok(),
        recv(cancel.receiver()) -> _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_send_recv_in_order() {
        let cancel = CancellationToken::new();
        let (tx, rx) = handoff();
        let producer_cancel = cancel.clone();
        let handle = thread::spawn(move || {
            for i in 0..5 {
                assert!(send(&producer_cancel, &tx, i));
            }
        });
        for i in 0..5 {
            assert_eq!(recv(&cancel, &rx), Recv::Value(i));
        }
        handle.join().unwrap();
        assert_eq!(recv(&cancel, &rx), Recv::Closed);
    }

    #[test]
    fn test_blocked_send_abandoned_on_cancel() {
        let cancel = CancellationToken::new();
        let (tx, _rx) = handoff();
        let sender_cancel = cancel.clone();
        let handle = thread::spawn(move || send(&sender_cancel, &tx, 1));
        thread::sleep(Duration::from_millis(20));
        cancel.cancel();
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn test_recv_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = handoff();
        cancel.cancel();
        assert_eq!(recv(&cancel, &rx), Recv::Cancelled);
    }

    #[test]
    fn test_send_refused_after_cancel() {
        let cancel = CancellationToken::new();
        let (tx, rx) = handoff();
        cancel.cancel();
        assert!(!send(&cancel, &tx, 3));
        assert!(rx.try_recv().is_err());
    }
}
