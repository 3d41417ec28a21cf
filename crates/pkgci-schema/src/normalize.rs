/// Characters stripped from both ends of a physical line.
const LINE_PADDING: &[char] = &[' ', '\t', '\r'];

/// Strip the trailing comment and surrounding padding from one physical line.
///
/// Everything from the first `#` onward is dropped before trimming, so a `#`
/// inside quotes still starts a comment. Comments never span lines: inside a
/// multi-line array only the remainder of the current line is discarded.
pub fn normalize_line(raw: &str) -> &str {
    let uncommented = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    uncommented.trim_matches(LINE_PADDING)
}
