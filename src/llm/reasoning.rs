//! Removal of model "thinking" segments from replies

/// Marker that opens a reasoning segment
pub const REASONING_START: &str = "<think>";

/// Marker that closes a reasoning segment
pub const REASONING_END: &str = "</think>";

/// Remove every complete `<think>…</think>` segment, markers included
///
/// Each segment runs from a start marker to the nearest end marker after it,
/// across newlines. A start marker with no end marker after it is left in
/// place along with everything that follows. The result is trimmed.
///
/// Applying this to its own output changes nothing.
#[must_use]
pub fn strip_reasoning(text: &str) -> String {
    let mut out = text.to_string();

    // Rescan from the top after each cut: joining the halves can form a new marker
    while let Some(start) = out.find(REASONING_START) {
        let body = start + REASONING_START.len();
        let Some(end_rel) = out[body..].find(REASONING_END) else {
            break;
        };
        let end = body + end_rel + REASONING_END.len();
        out.replace_range(start..end, "");
    }

    out.trim().to_string()
}
