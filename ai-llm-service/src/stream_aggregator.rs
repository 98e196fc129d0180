//! Incremental aggregator for Ollama's NDJSON generation stream.
//!
//! Ollama emits one JSON object per line:
//! ```text
//! {"model":"llama3.2:1b","response":"Hel","done":false}
//! {"model":"llama3.2:1b","response":"lo","done":false}
//! {"model":"llama3.2:1b","response":"","done":true,"eval_count":2}
//! ```
//!
//! Network chunk boundaries are independent of line boundaries, so bytes are
//! buffered until a `\n` shows up and only complete lines are parsed. Lines
//! that are not valid JSON (or carry no `response` field) are dropped one by
//! one; they never abort the aggregation and never affect neighbouring lines.
//! An unterminated tail left at stream end is discarded.
//!
//! The aggregator does no I/O, so it can be driven directly with literal byte
//! slices:
//!
//! ```
//! use ai_llm_service::stream_aggregator::StreamAggregator;
//!
//! let mut agg = StreamAggregator::new();
//! agg.feed(b"{\"response\":\"hel");
//! agg.feed(b"lo\"}\n{\"response\":\" world\"}\n{\"resp");
//! assert_eq!(agg.finalize(), "hello world");
//! ```

use serde_json::Value;
use tracing::trace;

/// Line-oriented accumulator that folds a chunked NDJSON stream into a
/// single answer.
///
/// Lives for exactly one backend call and is owned by the task serving it.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    /// Bytes received but not yet terminated by `\n`.
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no `\n`.
    scanned: usize,
    /// Extracted text pieces in arrival order.
    pieces: Vec<String>,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw chunk and processes every line it completes.
    ///
    /// The buffer is byte-based, so a multi-byte UTF-8 sequence split across
    /// two chunks is reassembled before the line is decoded.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);

        let mut consumed = 0;
        let mut search_from = self.scanned;
        while let Some(pos) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + pos;
            if let Some(piece) = extract_piece(&self.buffer[consumed..end]) {
                self.pieces.push(piece);
            }
            consumed = end + 1;
            search_from = consumed;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
        self.scanned = self.buffer.len();
    }

    /// Number of buffered bytes still waiting for a line terminator.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Number of text pieces collected so far.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Drops the unterminated tail and returns the concatenated, trimmed answer.
    pub fn finalize(self) -> String {
        if !self.buffer.is_empty() {
            trace!(bytes = self.buffer.len(), "discarding unterminated trailing fragment");
        }
        self.pieces.concat().trim().to_string()
    }
}

/// Parses one complete line; `None` for blank, malformed or text-less lines.
///
/// Only a JSON object counts as a fragment. Its `response` must be a string;
/// with duplicate keys the last one wins.
fn extract_piece(line: &[u8]) -> Option<String> {
    let text = match std::str::from_utf8(line) {
        Ok(t) => t.trim(),
        Err(e) => {
            trace!(error = %e, "dropping non-UTF-8 line");
            return None;
        }
    };

    if text.is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(v) => v,
        Err(e) => {
            trace!(error = %e, "dropping malformed line");
            return None;
        }
    };

    let Some(fragment) = value.as_object() else {
        trace!("dropping non-object line");
        return None;
    };

    fragment
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
