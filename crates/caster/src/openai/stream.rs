//! Tolerant parser for the streamed completion body.
//!
//! The body is newline-delimited event lines. The parser is deliberately
//! forgiving: blank lines, lines without the `data: ` framing prefix, and
//! lines whose payload is not valid JSON are all skipped so that keep-alive
//! and comment framing some servers emit never kills a stream.

use super::types::StreamChunk;

/// Framing prefix each event line must carry.
const DATA_PREFIX: &str = "data: ";

/// Payload marking end-of-stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental line framer and chunk decoder.
///
/// Network chunks can split lines at arbitrary byte positions, including in
/// the middle of a multi-byte character, so buffering happens on raw bytes
/// and decoding only on complete lines. `feed` hands each delta to the
/// callback in wire order.
pub(super) struct DeltaParser {
    buf: Vec<u8>,
}

impl DeltaParser {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consume one network chunk, invoking `on_delta` for every complete
    /// event line it finishes.
    pub fn feed(&mut self, chunk: &[u8], on_delta: &mut dyn FnMut(&str)) {
        self.buf.extend_from_slice(chunk);
        while let Some(newline) = self.buf.iter().position(|&byte| byte == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            handle_line(line.trim_end_matches(['\r', '\n']), on_delta);
        }
    }

    /// Flush a trailing line that arrived without a final newline.
    pub fn finish(&mut self, on_delta: &mut dyn FnMut(&str)) {
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&line);
            handle_line(line.trim_end_matches('\r'), on_delta);
        }
    }
}

fn handle_line(line: &str, on_delta: &mut dyn FnMut(&str)) {
    if line.is_empty() {
        return;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return;
    };
    if payload == DONE_SENTINEL {
        return;
    }
    let Ok(chunk) = serde_json::from_str::<StreamChunk>(payload) else {
        return;
    };
    if let Some(choice) = chunk.choices.first() {
        on_delta(&choice.delta.content);
    }
}
