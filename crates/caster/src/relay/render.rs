//! Broadcast payload rendering.
//!
//! Viewers receive pre-rendered HTML lines. The format is part of the
//! broadcast contract, so it lives with the relay rather than the HTTP
//! layer.

pub fn user_line(text: &str) -> String {
    format!("<div><b>You:</b> {}</div>", escape_html(text))
}

pub fn assistant_line(text: &str) -> String {
    format!("<div><b>Assistant:</b> {}</div>", escape_html(text))
}

/// Minimal HTML escaping for text interpolated into broadcast lines.
/// Streamed fragments go through this directly: escaping is per-character,
/// so it is safe across arbitrary fragment boundaries.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
