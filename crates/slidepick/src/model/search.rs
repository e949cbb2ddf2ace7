//! Search-mode cycler and the client-side library filter.

use serde::{Deserialize, Serialize};

use super::{Library, Presentation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMode {
    pub value: String,
    pub label: String,
    pub title: String,
    pub has_threshold: bool,
}

impl SearchMode {
    fn new(value: &str, label: &str, title: &str, has_threshold: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            title: title.to_string(),
            has_threshold,
        }
    }

    /// Server setting that stores this mode's threshold. `None` when the
    /// mode has no threshold control.
    pub fn threshold_key(&self) -> Option<String> {
        self.has_threshold
            .then(|| format!("{}_threshold", self.value))
    }
}

/// Ordered list of search modes with a cursor that wraps.
#[derive(Debug, Clone)]
pub struct SearchModes {
    modes: Vec<SearchMode>,
    current: usize,
}

impl Default for SearchModes {
    fn default() -> Self {
        Self {
            modes: vec![
                SearchMode::new("fts", "Full Text", "Search using full text", false),
                SearchMode::new(
                    "similarity",
                    "Similarity",
                    "Find slides with similar content",
                    true,
                ),
                SearchMode::new(
                    "word_similarity",
                    "Word Similarity",
                    "Find slides with similar words",
                    true,
                ),
            ],
            current: 0,
        }
    }
}

impl SearchModes {
    /// Start at the mode whose value matches, or the first one.
    pub fn restored(value: Option<&str>) -> Self {
        let mut modes = Self::default();
        if let Some(value) = value {
            match modes.modes.iter().position(|m| m.value == value) {
                Some(index) => modes.current = index,
                None => tracing::debug!(value, "unknown search mode, using default"),
            }
        }
        modes
    }

    pub fn current(&self) -> &SearchMode {
        &self.modes[self.current]
    }

    pub fn cycle(&mut self) -> &SearchMode {
        self.current = (self.current + 1) % self.modes.len();
        self.current()
    }
}

/// Case-insensitive match on filename or tags. An empty term matches all.
pub fn matches(presentation: &Presentation, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    presentation.filename.to_lowercase().contains(&term)
        || presentation.tags.to_lowercase().contains(&term)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceCounts {
    pub slides: usize,
    pub presentations: usize,
}

impl SourceCounts {
    pub fn badge(&self) -> String {
        format!("{} slides ({} PPTX)", self.slides, self.presentations)
    }
}

/// Counts over the presentations the filter leaves visible.
pub fn visible_counts(library: &Library, term: &str) -> SourceCounts {
    library
        .presentations()
        .iter()
        .filter(|p| matches(p, term))
        .fold(SourceCounts::default(), |acc, p| SourceCounts {
            slides: acc.slides + p.slides.len(),
            presentations: acc.presentations + 1,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::library;

    #[test]
    fn test_cycle_wraps() {
        let mut modes = SearchModes::default();
        assert_eq!(modes.current().value, "fts");
        assert_eq!(modes.cycle().value, "similarity");
        assert_eq!(modes.cycle().value, "word_similarity");
        assert_eq!(modes.cycle().value, "fts");
    }

    #[test]
    fn test_threshold_key() {
        let mut modes = SearchModes::default();
        assert_eq!(modes.current().threshold_key(), None);
        assert_eq!(
            modes.cycle().threshold_key().as_deref(),
            Some("similarity_threshold")
        );
    }

    #[test]
    fn test_restored_by_value() {
        assert_eq!(
            SearchModes::restored(Some("word_similarity")).current().label,
            "Word Similarity"
        );
        assert_eq!(SearchModes::restored(Some("bogus")).current().value, "fts");
        assert_eq!(SearchModes::restored(None).current().value, "fts");
    }

    #[test]
    fn test_filter_matches_filename_and_tags() {
        let mut p = Presentation::new("1", "Budget");
        p.filename = "Budget-2024.PPTX".into();
        p.tags = "Finance, Planning".into();
        assert!(matches(&p, "budget"));
        assert!(matches(&p, "FINANCE"));
        assert!(matches(&p, ""));
        assert!(!matches(&p, "roadmap"));
    }

    #[test]
    fn test_visible_counts_badge() {
        let lib = library();
        assert_eq!(visible_counts(&lib, "").badge(), "5 slides (2 PPTX)");
        assert_eq!(visible_counts(&lib, "roadmap").badge(), "2 slides (1 PPTX)");
        assert_eq!(visible_counts(&lib, "zzz").badge(), "0 slides (0 PPTX)");
    }
}
