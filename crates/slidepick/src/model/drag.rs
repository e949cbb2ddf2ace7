use super::selection::{self, ItemStore};
use super::ItemKey;

/// Items implicated by one drag gesture, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    origin: ItemKey,
    members: Vec<ItemKey>,
}

impl DragSession {
    /// The item the gesture started on.
    pub fn origin(&self) -> ItemKey {
        self.origin
    }

    pub fn members(&self) -> &[ItemKey] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.members.contains(&key)
    }
}

/// Holds at most one drag session.
#[derive(Debug, Default)]
pub struct DragTracker {
    session: Option<DragSession>,
}

impl DragTracker {
    /// Replace any previous session. The new members carry the "being dragged" marker.
    pub fn start(&mut self, origin: ItemKey, members: Vec<ItemKey>) -> &DragSession {
        tracing::debug!(?origin, count = members.len(), "drag started");
        self.session.insert(DragSession { origin, members })
    }

    /// End the session, dropped or not. Safe to call when idle.
    pub fn end(&mut self) -> Option<DragSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::debug!(origin = ?s.origin, "drag ended");
        }
        session
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether `key` should render with the dragging marker.
    pub fn is_dragging(&self, key: ItemKey) -> bool {
        self.session.as_ref().is_some_and(|s| s.contains(key))
    }
}

/// Members for a drag that starts on `origin`: the whole selection when the
/// origin is selected, otherwise the origin alone.
pub fn capture<S: ItemStore + ?Sized>(store: &S, origin: ItemKey) -> Vec<ItemKey> {
    if selection::is_selected(store, origin) {
        let members = selection::current(store);
        debug_assert!(members.contains(&origin));
        members
    } else {
        vec![origin]
    }
}
