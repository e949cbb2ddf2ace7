//! Multi-select over every slide in the window.
//!
//! Selection is a flag on each [`SlideItem`]; the functions here are the only
//! place that flips it. One selection spans the source library and the
//! collection, so a ctrl-click in either list extends the same set.

use super::{ItemKey, SlideItem};

/// Slides addressable by key, enumerable in document order.
pub trait ItemStore {
    /// All keys, in the order the slides appear on screen.
    fn keys(&self) -> Vec<ItemKey>;
    fn item(&self, key: ItemKey) -> Option<&SlideItem>;
    fn item_mut(&mut self, key: ItemKey) -> Option<&mut SlideItem>;
}

/// Flip the selection of one item. Unknown keys are ignored.
pub fn toggle<S: ItemStore + ?Sized>(store: &mut S, key: ItemKey) {
    if let Some(item) = store.item_mut(key) {
        item.selected = !item.selected;
    }
}

/// Select `key` and deselect everything else.
pub fn set_exclusive<S: ItemStore + ?Sized>(store: &mut S, key: ItemKey) {
    if store.item(key).is_none() {
        return;
    }
    for other in store.keys() {
        if let Some(item) = store.item_mut(other) {
            item.selected = other == key;
        }
    }
}

pub fn clear<S: ItemStore + ?Sized>(store: &mut S) {
    for key in store.keys() {
        if let Some(item) = store.item_mut(key) {
            item.selected = false;
        }
    }
}

/// Selected keys in document order.
pub fn current<S: ItemStore + ?Sized>(store: &S) -> Vec<ItemKey> {
    store
        .keys()
        .into_iter()
        .filter(|key| store.item(*key).is_some_and(|item| item.selected))
        .collect()
}

pub fn is_selected<S: ItemStore + ?Sized>(store: &S, key: ItemKey) -> bool {
    store.item(key).is_some_and(|item| item.selected)
}
