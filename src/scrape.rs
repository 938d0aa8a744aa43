//! Extraction of decompiled pseudo-source from the decompiler's HTML reply.
//!
//! The decompiler wraps recovered source in one known block element. The
//! matching rule below is versioned to that exact markup; if the service
//! changes its output format, only this module needs to change.

use crate::error::{AnalystError, Result};

/// The fixed wrapper element the decompiler emits around recovered source.
const MARKER: &str = r#"<div class="code javascript" style="border: 1px solid gray; padding: 0.5em; white-space: pre; font-family: monospace; line-height: 1.2">"#;

const MARKER_END: &str = "</div>";

/// Locate the decompiled source block and return its inner text with markup
/// stripped. The full response body is carried in the error when the marker
/// is absent, as diagnostic context.
pub fn extract_decompiled_source(html: &str) -> Result<String> {
    let start = html
        .find(MARKER)
        .ok_or_else(|| AnalystError::DecompileExtractFailed(html.to_string()))?
        + MARKER.len();

    let inner = &html[start..];
    let end = inner
        .find(MARKER_END)
        .ok_or_else(|| AnalystError::DecompileExtractFailed(html.to_string()))?;

    Ok(strip_tags(&inner[..end]))
}

/// Remove every `<...>` span from the input. An unterminated trailing `<` is
/// kept verbatim. No entity decoding is performed.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('>') {
            Some(close) => rest = &tail[close + 1..],
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}
