use eframe::egui::{Pos2, Rect, Vec2, pos2};

use crate::model::click::ClickAction;
use crate::model::{ItemKey, RowId, SourceRef};

/// Estimated size of the slide menu, used until it has been laid out once.
pub const MENU_SIZE: Vec2 = Vec2::new(200.0, 170.0);

pub const REMOVE_FROM_SOURCE_NOTICE: &str = "Cannot remove from source library.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuState {
    Hidden,
    Shown { target: ItemKey, pos: Pos2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Preview,
    Metadata,
    RawData,
    Add,
    Remove,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::Metadata => "Show metadata",
            Self::RawData => "Show raw data",
            Self::Add => "Add to collection",
            Self::Remove => "Remove from collection",
        }
    }
}

/// What choosing a menu entry amounts to once the target is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEffect {
    Inspect(ItemKey, ClickAction),
    AddToCollection(SourceRef),
    RemoveFromCollection(RowId),
    Rejected(&'static str),
}

/// Right-click menu for slide rows.
#[derive(Debug)]
pub struct ContextMenu {
    state: MenuState,
    size: Vec2,
    cursor: Pos2,
    viewport: Rect,
}

impl Default for ContextMenu {
    fn default() -> Self {
        Self {
            state: MenuState::Hidden,
            size: MENU_SIZE,
            cursor: Pos2::ZERO,
            viewport: Rect::EVERYTHING,
        }
    }
}

impl ContextMenu {
    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        matches!(self.state, MenuState::Shown { .. })
    }

    pub fn target(&self) -> Option<ItemKey> {
        match self.state {
            MenuState::Shown { target, .. } => Some(target),
            MenuState::Hidden => None,
        }
    }

    /// Show the menu for `target` at the cursor, kept inside `viewport`.
    pub fn open(&mut self, target: ItemKey, cursor: Pos2, viewport: Rect) {
        self.cursor = cursor;
        self.viewport = viewport;
        let pos = clamp_position(cursor, self.size, viewport);
        self.state = MenuState::Shown { target, pos };
    }

    /// Record the size the menu was actually laid out at. A shown menu that
    /// now overflows is placed again from the cursor it was opened at.
    pub fn set_measured_size(&mut self, size: Vec2) {
        if size.x <= 0.0 || size.y <= 0.0 || size == self.size {
            return;
        }
        self.size = size;
        if let MenuState::Shown { target, .. } = self.state {
            let pos = clamp_position(self.cursor, size, self.viewport);
            self.state = MenuState::Shown { target, pos };
        }
    }

    /// Hide the menu. Safe to call when already hidden.
    pub fn dismiss(&mut self) {
        self.state = MenuState::Hidden;
    }

    /// Entries offered for the current target, in display order.
    pub fn entries(&self) -> Vec<MenuAction> {
        match self.target() {
            Some(target) => entries_for(target),
            None => Vec::new(),
        }
    }

    /// Choose an entry: hides the menu and resolves what it means.
    pub fn choose(&mut self, action: MenuAction) -> Option<MenuEffect> {
        let target = self.target()?;
        self.dismiss();
        Some(effect_for(action, target))
    }
}

pub fn entries_for(target: ItemKey) -> Vec<MenuAction> {
    let mut entries = vec![MenuAction::Preview, MenuAction::Metadata, MenuAction::RawData];
    entries.push(if target.is_source() {
        MenuAction::Add
    } else {
        MenuAction::Remove
    });
    entries
}

pub fn effect_for(action: MenuAction, target: ItemKey) -> MenuEffect {
    match (action, target) {
        (MenuAction::Preview, _) => MenuEffect::Inspect(target, ClickAction::ShowPreview),
        (MenuAction::Metadata, _) => MenuEffect::Inspect(target, ClickAction::ShowMetadata),
        (MenuAction::RawData, _) => MenuEffect::Inspect(target, ClickAction::ShowRawData),
        (MenuAction::Add, ItemKey::Source(source)) => MenuEffect::AddToCollection(source),
        // Collected rows are already in the collection.
        (MenuAction::Add, ItemKey::Collected(_)) => MenuEffect::Rejected("Slide is already collected."),
        (MenuAction::Remove, ItemKey::Collected(row)) => MenuEffect::RemoveFromCollection(row),
        (MenuAction::Remove, ItemKey::Source(_)) => MenuEffect::Rejected(REMOVE_FROM_SOURCE_NOTICE),
    }
}

/// Position a box of `size` at `cursor`, flipping left or up when it would
/// overflow `viewport`, then pinning it inside.
pub fn clamp_position(cursor: Pos2, size: Vec2, viewport: Rect) -> Pos2 {
    let mut x = cursor.x;
    let mut y = cursor.y;
    if x + size.x > viewport.right() {
        x -= size.x;
    }
    if y + size.y > viewport.bottom() {
        y -= size.y;
    }
    let max_x = (viewport.right() - size.x).max(viewport.left());
    let max_y = (viewport.bottom() - size.y).max(viewport.top());
    pos2(x.clamp(viewport.left(), max_x), y.clamp(viewport.top(), max_y))
}
