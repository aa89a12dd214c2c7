//! Terminal consumers for a pipeline's output stream.

use crate::cancel::CancellationToken;
use crate::stream::{self, Recv, Stream};
use crossbeam::channel::select;
use std::time::{Duration, Instant};

/// Drain `stream` until cancellation or disconnect, calling `f` for each
/// value. Returns how many values were consumed.
pub fn consume<F>(cancel: &CancellationToken, stream: &Stream, mut f: F) -> usize
where
    F: FnMut(i64),
{
    let mut consumed = 0;
    while let Recv::Value(value) = stream::recv(cancel, stream) {
        f(value);
        consumed += 1;
    }
    consumed
}

/// Gather up to `limit` values, stopping early on cancellation, disconnect,
/// or once `timeout` has elapsed.
pub fn collect(
    cancel: &CancellationToken,
    stream: &Stream,
    limit: usize,
    timeout: Duration,
) -> Vec<i64> {
    let deadline = Instant::now() + timeout;
    let mut values = Vec::new();
    'collect: while values.len() < limit {
        let remaining = deadline.saturating_duration_since(Instant::now());
        select! {
            recv(stream) -> msg => match msg {
                Ok(value) => values.push(value),
                Err(_) => break 'collect,
            },
            recv(cancel.receiver()) -> _ => break 'collect,
            default(remaining) => break 'collect,
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::handoff;
    use std::thread;

    #[test]
    fn test_consume_until_closed() {
        let cancel = CancellationToken::new();
        let (tx, rx) = handoff();
        thread::spawn(move || {
            for v in [1, 2, 3] {
                tx.send(v).unwrap();
            }
        });
        let mut seen = Vec::new();
        let count = consume(&cancel, &rx, |v| seen.push(v));
        assert_eq!(count, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_consume_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = handoff();
        let trigger = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            trigger.cancel();
        });
        assert_eq!(consume(&cancel, &rx, |_| {}), 0);
    }

    #[test]
    fn test_collect_times_out() {
        let cancel = CancellationToken::new();
        let (_tx, rx) = handoff();
        let start = Instant::now();
        assert!(collect(&cancel, &rx, 1, Duration::from_millis(30)).is_empty());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_collect_respects_limit() {
        let cancel = CancellationToken::new();
        let (tx, rx) = handoff();
        thread::spawn(move || {
            for v in 0..10 {
                if tx.send(v).is_err() {
                    return;
                }
            }
        });
        assert_eq!(
            collect(&cancel, &rx, 4, Duration::from_secs(1)),
            vec![0, 1, 2, 3]
        );
    }
}
