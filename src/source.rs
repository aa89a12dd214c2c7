//! Adapters that turn external input into a pipeline source stream.

use crate::stage::StageContext;
use crate::stream::{self, handoff, Stream};
use std::io::BufRead;

/// Word that ends line input, compared case-insensitively
pub const EXIT_COMMAND: &str = "exit";

/// What a single input line means to the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A parsed integer to forward
    Value(i64),
    /// The exit command
    Exit,
    /// An empty or whitespace-only line
    Blank,
    /// Anything else, trimmed
    Malformed(String),
}

/// Classify one line of text input
pub fn parse_line(line: &str) -> LineEvent {
    let line = line.trim();
    if line.is_empty() {
        LineEvent::Blank
    } else if line.eq_ignore_ascii_case(EXIT_COMMAND) {
        LineEvent::Exit
    } else {
        match line.parse::<i64>() {
            Ok(value) => LineEvent::Value(value),
            Err(_) => LineEvent::Malformed(line.to_string()),
        }
    }
}

/// Feed the values of `iter` into a new stream, one handoff at a time.
///
/// The stream closes when the iterator is exhausted; cancellation stops the
/// feed early. Closing does not cancel the run.
pub fn from_iter<I>(ctx: &StageContext, values: I) -> Stream
where
    I: IntoIterator<Item = i64>,
    I::IntoIter: Send + 'static,
{
    let (tx, rx) = handoff();
    let cancel = ctx.cancellation().clone();
    let values = values.into_iter();
    ctx.spawn("source", move || {
        for value in values {
            if !stream::send(&cancel, &tx, value) {
                return;
            }
        }
        tracing::debug!("source exhausted");
    });
    rx
}

/// Read integers line by line from `reader`.
///
/// Malformed lines are logged and skipped. The `exit` command, end of input,
/// or a read error signal cancellation for the whole run.
pub fn from_lines<R>(ctx: &StageContext, reader: R) -> Stream
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = handoff();
    let cancel = ctx.cancellation().clone();
    ctx.spawn("line_source", move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read input");
                    break;
                }
            };
            match parse_line(&line) {
                LineEvent::Value(value) => {
                    if !stream::send(&cancel, &tx, value) {
                        return;
                    }
                }
                LineEvent::Exit => {
                    tracing::info!("exit requested");
                    break;
                }
                LineEvent::Blank => {}
                LineEvent::Malformed(text) => {
                    tracing::warn!(input = %text, "only integers are accepted");
                }
            }
        }
        cancel.cancel();
    });
    rx
}
