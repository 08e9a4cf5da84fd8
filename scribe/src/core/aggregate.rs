//! Manuscript assembly from completed sections.

/// Separator between consecutive sections: exactly one blank line.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Join completed section texts, in order, into the final manuscript.
pub fn compile_manuscript(sections: &[String]) -> String {
    sections.join(SECTION_SEPARATOR)
}
