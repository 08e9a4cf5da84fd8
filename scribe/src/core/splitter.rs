//! Outline splitting into per-section outlines.

/// Token that opens a section in the default outline format.
pub const DEFAULT_MARKER: &str = "####";

/// Split `outline` into ordered section outlines.
///
/// Every segment that follows a `marker` occurrence becomes one section,
/// re-prefixed with the marker and trimmed. Text before the first marker and
/// whitespace-only segments are dropped, so an outline without markers yields
/// an empty list.
pub fn split_outline(outline: &str, marker: &str) -> Vec<String> {
    if marker.is_empty() {
        return Vec::new();
    }

    outline
        .split(marker)
        .skip(1)
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| format!("{marker}{segment}").trim().to_string())
        .collect()
}

/// First line of a section outline, used for progress output.
pub fn section_title(section: &str) -> &str {
    section.lines().next().unwrap_or_default().trim()
}
