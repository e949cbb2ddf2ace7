//! The user-built target list and the drop mutator that feeds it.

use super::{Library, SlideItem};

/// Identity of one row in the collection. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedSlide {
    pub row: RowId,
    pub item: SlideItem,
}

/// Ordered copies of library slides.
///
/// The empty-state placeholder is not stored: it is shown exactly when
/// [`Collection::shows_placeholder`] says so, which keeps it in lockstep with
/// every insert, remove and clear.
#[derive(Debug, Default)]
pub struct Collection {
    rows: Vec<CollectedSlide>,
    next_row: u64,
}

impl Collection {
    pub fn rows(&self) -> &[CollectedSlide] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn shows_placeholder(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, row: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.row == row)
    }

    pub fn get(&self, row: RowId) -> Option<&SlideItem> {
        self.rows.iter().find(|r| r.row == row).map(|r| &r.item)
    }

    pub fn get_mut(&mut self, row: RowId) -> Option<&mut SlideItem> {
        self.rows.iter_mut().find(|r| r.row == row).map(|r| &mut r.item)
    }

    /// Ids of the collected slides, in deck order.
    pub fn slide_ids(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.item.id.clone()).collect()
    }

    /// Insert copies of `items` as one contiguous block starting at `index`
    /// (clamped to the end), in the order given, finishing each copy.
    ///
    /// The first item lands at the drop point and every later one directly
    /// after the one placed before it, so a multi-item drop always reads in
    /// session order no matter which member the pointer carried.
    pub fn insert_block(
        &mut self,
        index: usize,
        items: Vec<SlideItem>,
        library: &Library,
    ) -> Vec<RowId> {
        let mut at = index.min(self.rows.len());
        let mut inserted = Vec::with_capacity(items.len());
        let mut seen: Vec<(String, String)> = Vec::with_capacity(items.len());

        for mut item in items {
            let identity = (item.source_container_id.clone(), item.id.clone());
            if seen.contains(&identity) {
                tracing::debug!(id = %item.id, "skipping duplicate slide within one drop");
                continue;
            }
            seen.push(identity);

            finish(&mut item, library);
            let row = self.allocate_row();
            self.rows.insert(at, CollectedSlide { row, item });
            inserted.push(row);
            at += 1;
        }

        if !inserted.is_empty() {
            tracing::debug!(count = inserted.len(), index, "slides collected");
        }
        inserted
    }

    /// Move an existing row so it ends up at `index` in the resulting list.
    pub fn move_row(&mut self, row: RowId, index: usize) -> bool {
        let Some(from) = self.position(row) else {
            return false;
        };
        let entry = self.rows.remove(from);
        let to = index.min(self.rows.len());
        self.rows.insert(to, entry);
        true
    }

    /// Move a row into the gap before the row currently at `gap`
    /// (`gap == len()` means the end), as seen before the move.
    pub fn move_row_to_gap(&mut self, row: RowId, gap: usize) -> bool {
        let Some(from) = self.position(row) else {
            return false;
        };
        let index = if gap > from { gap - 1 } else { gap };
        self.move_row(row, index)
    }

    pub fn remove(&mut self, row: RowId) -> Option<SlideItem> {
        let index = self.position(row)?;
        Some(self.rows.remove(index).item)
    }

    /// Remove every selected row; returns how many went.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.item.selected);
        before - self.rows.len()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn allocate_row(&mut self) -> RowId {
        self.next_row += 1;
        RowId(self.next_row)
    }
}

/// Per-copy finishing step: deselect and apply the compound label.
pub fn finish(item: &mut SlideItem, library: &Library) {
    item.selected = false;
    if let Some(name) = library.owner_name(item) {
        item.apply_compound_label(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use crate::model::{ItemKey, SourceRef, Workspace, selection};

    fn collect(ws: &mut Workspace, presentation: usize, slide: usize) -> RowId {
        ws.add_to_collection(SourceRef {
            presentation,
            slide,
        })
        .unwrap()
    }

    #[test]
    fn test_single_drop_inserts_exactly_one() {
        let mut ws = Workspace::new(library());
        ws.begin_drag(src(0, 1));
        let rows = ws.drop_session(0);
        assert_eq!(rows.len(), 1);
        assert_eq!(labels(&ws), vec!["Quarterly / Slide 2"]);
    }

    #[test]
    fn test_multi_drop_is_contiguous_in_session_order() {
        let mut ws = Workspace::new(library());
        collect(&mut ws, 1, 0);
        collect(&mut ws, 1, 1);

        selection::toggle(&mut ws, src(0, 2));
        selection::toggle(&mut ws, src(0, 0));
        selection::toggle(&mut ws, src(0, 1));
        ws.begin_drag(src(0, 2));
        let rows = ws.drop_session(1);

        assert_eq!(rows.len(), 3);
        assert_eq!(
            labels(&ws),
            vec![
                "Roadmap / Slide 1",
                "Quarterly / Slide 1",
                "Quarterly / Slide 2",
                "Quarterly / Slide 3",
                "Roadmap / Slide 2",
            ]
        );
    }

    #[test]
    fn test_drop_between_existing_rows_anchors_block() {
        // A, B collected; C, D selected in source with C before D; D is dragged.
        let mut ws = Workspace::new(library());
        collect(&mut ws, 1, 0); // A
        collect(&mut ws, 1, 1); // B
        selection::toggle(&mut ws, src(0, 0)); // C
        selection::toggle(&mut ws, src(0, 1)); // D
        ws.begin_drag(src(0, 1));
        ws.drop_session(1);
        assert_eq!(
            labels(&ws),
            vec![
                "Roadmap / Slide 1",
                "Quarterly / Slide 1",
                "Quarterly / Slide 2",
                "Roadmap / Slide 2",
            ]
        );
    }

    #[test]
    fn test_inserted_copies_are_deselected_and_sources_untouched() {
        let mut ws = Workspace::new(library());
        selection::toggle(&mut ws, src(0, 0));
        selection::toggle(&mut ws, src(1, 1));
        ws.begin_drag(src(1, 1));
        ws.drop_session(0);
        assert!(ws.collection.rows().iter().all(|r| !r.item.selected));
        assert!(selection::is_selected(&ws, src(0, 0)));
        assert_eq!(ws.library.presentations()[0].slides[0].display_label, "Slide 1");
    }

    #[test]
    fn test_no_duplicate_identity_from_shared_source_path() {
        let mut lib = library();
        // Two distinct slides pointing at the same thumbnail.
        let shared = lib.slide(SourceRef {
            presentation: 0,
            slide: 0,
        })
        .unwrap()
        .source_path
        .clone();
        lib = {
            let mut presentations = lib.presentations().to_vec();
            presentations[0].slides[1].source_path = shared;
            Library::new(presentations)
        };
        let mut ws = Workspace::new(lib);
        selection::toggle(&mut ws, src(0, 0));
        selection::toggle(&mut ws, src(0, 1));
        ws.begin_drag(src(0, 1));
        let rows = ws.drop_session(0);
        assert_eq!(rows.len(), 2);
        let ids = ws.collection.slide_ids();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn test_duplicate_members_collapse() {
        let mut ws = Workspace::new(library());
        let item = ws.library.presentations()[0].slides[0].clone();
        let rows = ws
            .collection
            .insert_block(0, vec![item.clone(), item], &ws.library);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_recollecting_a_collected_row_keeps_single_prefix() {
        let mut ws = Workspace::new(library());
        let row = collect(&mut ws, 0, 0);
        selection::set_exclusive(&mut ws, ItemKey::Collected(row));
        ws.begin_drag(ItemKey::Collected(row));
        ws.drop_session(1);
        assert_eq!(
            labels(&ws),
            vec!["Quarterly / Slide 1", "Quarterly / Slide 1"]
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let lib = library();
        let mut once = lib.presentations()[1].slides[0].clone();
        finish(&mut once, &lib);
        let mut twice = once.clone();
        finish(&mut twice, &lib);
        assert_eq!(once.display_label, "Roadmap / Slide 1");
        assert_eq!(once.display_label, twice.display_label);
    }

    #[test]
    fn test_finish_leaves_label_when_owner_unknown() {
        let lib = library();
        let mut item = SlideItem::new("x", "/x.png", 3);
        item.selected = true;
        finish(&mut item, &lib);
        assert_eq!(item.display_label, "Slide 3");
        assert!(!item.selected);
    }

    #[test]
    fn test_placeholder_tracks_emptiness() {
        let mut ws = Workspace::new(library());
        assert!(ws.collection.shows_placeholder());

        let a = collect(&mut ws, 0, 0);
        collect(&mut ws, 0, 1);
        assert!(!ws.collection.shows_placeholder());

        ws.collection.remove(a);
        assert!(!ws.collection.shows_placeholder());

        ws.collection.clear();
        assert!(ws.collection.shows_placeholder());

        let b = collect(&mut ws, 1, 0);
        ws.collection.remove(b);
        assert!(ws.collection.shows_placeholder());
    }

    #[test]
    fn test_remove_selected_only_touches_selected_rows() {
        let mut ws = Workspace::new(library());
        let a = collect(&mut ws, 0, 0);
        collect(&mut ws, 0, 1);
        let c = collect(&mut ws, 0, 2);
        selection::toggle(&mut ws, ItemKey::Collected(a));
        selection::toggle(&mut ws, ItemKey::Collected(c));
        assert_eq!(ws.collection.remove_selected(), 2);
        assert_eq!(labels(&ws), vec!["Quarterly / Slide 2"]);
    }

    #[test]
    fn test_move_row_reorders() {
        let mut ws = Workspace::new(library());
        let a = collect(&mut ws, 0, 0);
        collect(&mut ws, 0, 1);
        collect(&mut ws, 0, 2);
        assert!(ws.collection.move_row(a, 2));
        assert_eq!(
            labels(&ws),
            vec![
                "Quarterly / Slide 2",
                "Quarterly / Slide 3",
                "Quarterly / Slide 1",
            ]
        );
        ws.collection.remove(a);
        assert!(!ws.collection.move_row(a, 0));
    }

    #[test]
    fn test_move_row_to_gap_accounts_for_own_slot() {
        let mut ws = Workspace::new(library());
        let a = collect(&mut ws, 0, 0);
        collect(&mut ws, 0, 1);
        let c = collect(&mut ws, 0, 2);
        // Gap 2 is between the second and third rows.
        assert!(ws.collection.move_row_to_gap(a, 2));
        assert_eq!(
            labels(&ws),
            vec![
                "Quarterly / Slide 2",
                "Quarterly / Slide 1",
                "Quarterly / Slide 3",
            ]
        );
        assert!(ws.collection.move_row_to_gap(c, 0));
        assert_eq!(labels(&ws)[0], "Quarterly / Slide 3");
    }

    #[test]
    fn test_drop_index_past_end_appends() {
        let mut ws = Workspace::new(library());
        collect(&mut ws, 1, 0);
        ws.begin_drag(src(0, 0));
        ws.drop_session(42);
        assert_eq!(labels(&ws), vec!["Roadmap / Slide 1", "Quarterly / Slide 1"]);
    }
}
