use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{SlideItem, SourceRef, default_label};

/// A presentation and its ordered slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub slides: Vec<SlideItem>,
}

impl Presentation {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            id: id.into(),
            filename: format!("{display_name}.pptx"),
            display_name,
            tags: String::new(),
            slides: Vec::new(),
        }
    }
}

/// The source library, as exported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    presentations: Vec<Presentation>,
}

impl Library {
    pub fn new(presentations: Vec<Presentation>) -> Self {
        let mut library = Self { presentations };
        library.normalize();
        library
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let library: Library = serde_json::from_str(json).context("Malformed library document")?;
        Ok(Self::new(library.presentations))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Load the library, falling back to an empty one when the document is
    /// missing or corrupt.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(library) => {
                tracing::debug!(
                    path = %path.display(),
                    presentations = library.presentations.len(),
                    "library loaded"
                );
                library
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "using empty library: {e:#}");
                Self::default()
            }
        }
    }

    /// Fill in the owning presentation and default labels.
    fn normalize(&mut self) {
        for presentation in &mut self.presentations {
            for (index, slide) in presentation.slides.iter_mut().enumerate() {
                slide.source_container_id = presentation.id.clone();
                if slide.slide_number == 0 {
                    slide.slide_number = index + 1;
                }
                if slide.display_label.trim().is_empty() {
                    slide.display_label = default_label(slide.slide_number);
                }
                slide.selected = false;
            }
        }
    }

    pub fn presentations(&self) -> &[Presentation] {
        &self.presentations
    }

    pub fn is_empty(&self) -> bool {
        self.presentations.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Presentation> {
        self.presentations.iter().find(|p| p.id == id)
    }

    /// Display name of the presentation that owns `slide`, if it can be resolved.
    pub fn owner_name(&self, slide: &SlideItem) -> Option<&str> {
        self.find(&slide.source_container_id)
            .map(|p| p.display_name.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn slide(&self, source: SourceRef) -> Option<&SlideItem> {
        self.presentations
            .get(source.presentation)?
            .slides
            .get(source.slide)
    }

    pub fn slide_mut(&mut self, source: SourceRef) -> Option<&mut SlideItem> {
        self.presentations
            .get_mut(source.presentation)?
            .slides
            .get_mut(source.slide)
    }

    /// Every slide address in document order.
    pub fn refs(&self) -> impl Iterator<Item = SourceRef> + '_ {
        self.presentations
            .iter()
            .enumerate()
            .flat_map(|(p, presentation)| {
                (0..presentation.slides.len()).map(move |s| SourceRef {
                    presentation: p,
                    slide: s,
                })
            })
    }

    pub fn slide_count(&self) -> usize {
        self.presentations.iter().map(|p| p.slides.len()).sum()
    }
}
