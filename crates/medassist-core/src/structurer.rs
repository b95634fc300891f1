//! Response structuring.
//!
//! Models are prompted to answer with bold section headings:
//!
//! ```text
//! **Possible causes:** viral infection, ...
//! **Recommendations:** rest, fluids, ...
//! ```
//!
//! [`structure`] turns such a reply into an ordered list of titled sections.
//! It is a pure function so a stricter, schema-constrained response format can
//! replace it without touching the conversation state machine.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Token wrapping each section title.
pub const SECTION_DELIMITER: &str = "**";

/// Ordered mapping from section title to section body.
///
/// Keys keep the position of their first insertion; inserting an existing
/// title replaces its body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredAnalysis {
    sections: Vec<(String, String)>,
}

impl StructuredAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a section, overwriting the body of an existing title in place.
    pub fn insert(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let title = title.into();
        let body = body.into();
        match self.sections.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, existing_body)) => *existing_body = body,
            None => self.sections.push((title, body)),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(existing, _)| existing == title)
            .map(|(_, body)| body.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// `true` when the reply contained no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .map(|(title, body)| (title.as_str(), body.as_str()))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(title, _)| title.as_str())
    }
}

impl IntoIterator for StructuredAnalysis {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

impl Serialize for StructuredAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (title, body) in &self.sections {
            map.serialize_entry(title, body)?;
        }
        map.end()
    }
}

/// Splits a model reply into titled sections.
///
/// Text before the first delimiter is preamble and never becomes a section.
/// After it, fragments pair up as (title, body). A blank fragment after the
/// last delimiter carries nothing and is ignored; if a title is then left
/// without a body, it is dropped.
pub fn structure(text: &str) -> StructuredAnalysis {
    let mut fragments: Vec<&str> = text.split(SECTION_DELIMITER).skip(1).collect();
    if fragments.last().is_some_and(|tail| tail.trim().is_empty()) {
        fragments.pop();
    }

    let mut analysis = StructuredAnalysis::new();
    for pair in fragments.chunks_exact(2) {
        analysis.insert(clean_title(pair[0]), pair[1].trim());
    }
    analysis
}

fn clean_title(fragment: &str) -> &str {
    let trimmed = fragment.trim();
    trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end()
}
