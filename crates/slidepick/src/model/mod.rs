pub mod click;
pub mod collection;
pub mod drag;
pub mod library;
pub mod search;
pub mod selection;

use serde::{Deserialize, Serialize};

pub use collection::{Collection, RowId};
pub use drag::{DragSession, DragTracker};
pub use library::{Library, Presentation};
pub use selection::ItemStore;

/// Separator between the presentation name and the slide label once a slide
/// has been collected.
pub const COMPOUND_SEPARATOR: &str = " / ";

/// One slide offered for collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideItem {
    /// Unique within the owning presentation.
    pub id: String,
    /// Thumbnail location; also the identity used to match the dropped copy.
    #[serde(rename = "path")]
    pub source_path: String,
    #[serde(default, rename = "label")]
    pub display_label: String,
    #[serde(default)]
    pub slide_number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Id of the presentation the slide came from. Filled in on load.
    #[serde(default, skip_serializing)]
    pub source_container_id: String,
    #[serde(skip)]
    pub selected: bool,
}

impl SlideItem {
    pub fn new(id: impl Into<String>, source_path: impl Into<String>, slide_number: usize) -> Self {
        Self {
            id: id.into(),
            source_path: source_path.into(),
            display_label: default_label(slide_number),
            slide_number,
            summary: None,
            content: None,
            source_container_id: String::new(),
            selected: false,
        }
    }

    /// Whether the label already carries the presentation prefix.
    pub fn has_compound_label(&self) -> bool {
        self.display_label.contains(COMPOUND_SEPARATOR)
    }

    /// Prefix the label with the presentation name, once.
    pub fn apply_compound_label(&mut self, presentation_name: &str) {
        let name = presentation_name.trim();
        if name.is_empty() || self.has_compound_label() {
            return;
        }
        self.display_label = format!(
            "{name}{COMPOUND_SEPARATOR}{}",
            self.display_label.trim()
        );
    }
}

pub fn default_label(slide_number: usize) -> String {
    format!("Slide {slide_number}")
}

/// Address of a slide in the source library, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceRef {
    pub presentation: usize,
    pub slide: usize,
}

/// Any slide visible in the window: a library slide or a collected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Source(SourceRef),
    Collected(RowId),
}

impl ItemKey {
    pub fn is_source(&self) -> bool {
        matches!(self, ItemKey::Source(_))
    }
}

/// Library, collection and in-flight drag state edited by the UI thread.
#[derive(Debug, Default)]
pub struct Workspace {
    pub library: Library,
    pub collection: Collection,
    pub drag: DragTracker,
}

impl Workspace {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            collection: Collection::default(),
            drag: DragTracker::default(),
        }
    }

    /// Swap in a reloaded library. Collected copies are values and survive;
    /// source selection and any drag in flight refer to old indices and are dropped.
    pub fn replace_library(&mut self, library: Library) {
        self.library = library;
        self.drag.end();
    }

    /// Append a copy of one library slide to the collection.
    pub fn add_to_collection(&mut self, source: SourceRef) -> Option<RowId> {
        let item = self.library.slide(source)?.clone();
        let index = self.collection.len();
        let rows = self
            .collection
            .insert_block(index, vec![item], &self.library);
        rows.first().copied()
    }

    /// Start a drag on `key`, capturing the session from the current selection.
    pub fn begin_drag(&mut self, key: ItemKey) -> &DragSession {
        let members = drag::capture(self, key);
        self.drag.start(key, members)
    }

    /// Finish the active drag with a drop at `index` in the collection.
    /// Ends the session whether or not anything was inserted.
    pub fn drop_session(&mut self, index: usize) -> Vec<RowId> {
        let Some(session) = self.drag.end() else {
            return Vec::new();
        };
        let items: Vec<SlideItem> = session
            .members()
            .iter()
            .filter_map(|key| self.item(*key).cloned())
            .collect();
        self.collection.insert_block(index, items, &self.library)
    }

    /// Drop a whole presentation onto the collection.
    pub fn drop_presentation(&mut self, presentation_id: &str) -> Vec<RowId> {
        let Some(presentation) = self.library.find(presentation_id) else {
            tracing::debug!(presentation_id, "dropped presentation is not in the library");
            return Vec::new();
        };
        let items = presentation.slides.clone();
        let index = self.collection.len();
        self.collection.insert_block(index, items, &self.library)
    }
}

impl ItemStore for Workspace {
    fn keys(&self) -> Vec<ItemKey> {
        let mut keys: Vec<ItemKey> = self.library.refs().map(ItemKey::Source).collect();
        keys.extend(self.collection.rows().iter().map(|r| ItemKey::Collected(r.row)));
        keys
    }

    fn item(&self, key: ItemKey) -> Option<&SlideItem> {
        match key {
            ItemKey::Source(source) => self.library.slide(source),
            ItemKey::Collected(row) => self.collection.get(row),
        }
    }

    fn item_mut(&mut self, key: ItemKey) -> Option<&mut SlideItem> {
        match key {
            ItemKey::Source(source) => self.library.slide_mut(source),
            ItemKey::Collected(row) => self.collection.get_mut(row),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Two presentations: "Quarterly" with slides q1..q3, "Roadmap" with r1..r2.
    pub fn library() -> Library {
        let mut quarterly = Presentation::new("p1", "Quarterly");
        for n in 1..=3 {
            quarterly.slides.push(SlideItem::new(
                format!("q{n}"),
                format!("/thumbnails/p1/{n}.png"),
                n,
            ));
        }
        let mut roadmap = Presentation::new("p2", "Roadmap");
        for n in 1..=2 {
            roadmap.slides.push(SlideItem::new(
                format!("r{n}"),
                format!("/thumbnails/p2/{n}.png"),
                n,
            ));
        }
        Library::new(vec![quarterly, roadmap])
    }

    pub fn src(presentation: usize, slide: usize) -> ItemKey {
        ItemKey::Source(SourceRef {
            presentation,
            slide,
        })
    }

    pub fn labels(ws: &Workspace) -> Vec<String> {
        ws.collection
            .rows()
            .iter()
            .map(|r| r.item.display_label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_compound_label_applied_once() {
        let mut item = SlideItem::new("a", "/a.png", 4);
        item.apply_compound_label("Deck");
        assert_eq!(item.display_label, "Deck / Slide 4");
        item.apply_compound_label("Deck");
        assert_eq!(item.display_label, "Deck / Slide 4");
    }

    #[test]
    fn test_compound_label_skips_empty_name() {
        let mut item = SlideItem::new("a", "/a.png", 1);
        item.apply_compound_label("   ");
        assert_eq!(item.display_label, "Slide 1");
    }

    #[test]
    fn test_add_to_collection_copies_without_touching_source() {
        let mut ws = Workspace::new(library());
        let row = ws
            .add_to_collection(SourceRef {
                presentation: 1,
                slide: 0,
            })
            .unwrap();
        assert_eq!(ws.collection.get(row).unwrap().display_label, "Roadmap / Slide 1");
        assert_eq!(ws.library.presentations()[1].slides[0].display_label, "Slide 1");
        assert_eq!(ws.library.presentations()[1].slides.len(), 2);
    }

    #[test]
    fn test_add_unknown_source_is_noop() {
        let mut ws = Workspace::new(library());
        let row = ws.add_to_collection(SourceRef {
            presentation: 9,
            slide: 0,
        });
        assert!(row.is_none());
        assert!(ws.collection.shows_placeholder());
    }

    #[test]
    fn test_drop_presentation_appends_all_slides_in_order() {
        let mut ws = Workspace::new(library());
        ws.add_to_collection(SourceRef {
            presentation: 1,
            slide: 1,
        });
        let rows = ws.drop_presentation("p1");
        assert_eq!(rows.len(), 3);
        assert_eq!(
            labels(&ws),
            vec![
                "Roadmap / Slide 2",
                "Quarterly / Slide 1",
                "Quarterly / Slide 2",
                "Quarterly / Slide 3",
            ]
        );
        assert!(ws.drag.session().is_none());
    }

    #[test]
    fn test_drop_unknown_presentation_is_noop() {
        let mut ws = Workspace::new(library());
        assert!(ws.drop_presentation("missing").is_empty());
        assert!(ws.collection.is_empty());
    }

    #[test]
    fn test_drop_without_session_is_noop() {
        let mut ws = Workspace::new(library());
        assert!(ws.drop_session(0).is_empty());
        assert!(ws.collection.is_empty());
    }

    #[test]
    fn test_document_order_lists_source_then_collection() {
        let mut ws = Workspace::new(library());
        let row = ws
            .add_to_collection(SourceRef {
                presentation: 0,
                slide: 0,
            })
            .unwrap();
        let keys = ws.keys();
        assert_eq!(keys.len(), 6);
        assert_eq!(keys[0], src(0, 0));
        assert_eq!(keys[4], src(1, 1));
        assert_eq!(keys[5], ItemKey::Collected(row));
    }
}
