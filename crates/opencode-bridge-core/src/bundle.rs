//! Context sections and the ordered bundle they form.

use std::fmt;

/// Label of the directory listing section.
pub const STRUCTURE_LABEL: &str = "PROJECT STRUCTURE";
/// Label of the version-control status section.
pub const STATUS_LABEL: &str = "GIT STATUS";
/// Label of the pending diff section.
pub const DIFF_LABEL: &str = "RECENT CHANGES (DIFF)";

/// Label for a key file section, e.g. `FILE: README.md`.
pub fn file_label(path: &str) -> String {
    format!("FILE: {path}")
}

/// A labeled chunk of captured text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSection {
    pub label: String,
    pub body: String,
}

impl ContextSection {
    /// A section with `label` (without the `---` markers) and raw `body`.
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for ContextSection {
    /// `--- LABEL ---` followed by the body, newline-terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.label)?;
        f.write_str(&self.body)?;
        if !self.body.ends_with('\n') {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Sections in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBundle {
    sections: Vec<ContextSection>,
}

impl ContextBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section unless its body is empty. Returns whether it was kept.
    pub fn push(&mut self, section: ContextSection) -> bool {
        if section.is_empty() {
            return false;
        }
        self.sections.push(section);
        true
    }

    /// Append a section even if its body is empty.
    pub fn push_always(&mut self, section: ContextSection) {
        self.sections.push(section);
    }

    /// Sections in the order they were pushed.
    pub fn sections(&self) -> &[ContextSection] {
        &self.sections
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&ContextSection> {
        self.sections.iter().find(|s| s.label == label)
    }

    /// Number of sections, the runtime header included.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The artifact text: rendered sections separated by one blank line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
