use eframe::egui::Modifiers;

use super::ItemKey;

/// What a click on a slide row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    SelectExclusive,
    ToggleSelection,
    ShowMetadata,
    ShowPreview,
    ShowRawData,
}

/// What a double-click on a slide row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleClickAction {
    AddToCollection,
    RemoveFromCollection,
}

/// Map the held modifiers to an action. Position and list do not matter.
pub fn click_action(modifiers: Modifiers) -> ClickAction {
    if modifiers.alt && modifiers.shift {
        ClickAction::ShowRawData
    } else if modifiers.alt {
        ClickAction::ShowPreview
    } else if modifiers.shift {
        ClickAction::ShowMetadata
    } else if modifiers.ctrl || modifiers.command || modifiers.mac_cmd {
        ClickAction::ToggleSelection
    } else {
        ClickAction::SelectExclusive
    }
}

/// Source slides are copied in; collected rows are removed.
pub fn double_click_action(key: ItemKey) -> DoubleClickAction {
    if key.is_source() {
        DoubleClickAction::AddToCollection
    } else {
        DoubleClickAction::RemoveFromCollection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::src;
    use crate::model::{RowId, Workspace};

    fn mods(ctrl: bool, command: bool, shift: bool, alt: bool) -> Modifiers {
        Modifiers {
            alt,
            ctrl,
            shift,
            mac_cmd: false,
            command,
        }
    }

    #[test]
    fn test_modifier_table() {
        let cases = [
            (mods(false, false, false, false), ClickAction::SelectExclusive),
            (mods(true, false, false, false), ClickAction::ToggleSelection),
            (mods(false, true, false, false), ClickAction::ToggleSelection),
            (mods(false, false, true, false), ClickAction::ShowMetadata),
            (mods(false, false, false, true), ClickAction::ShowPreview),
            (mods(false, false, true, true), ClickAction::ShowRawData),
        ];
        for (m, expected) in cases {
            assert_eq!(click_action(m), expected, "modifiers {m:?}");
        }
    }

    #[test]
    fn test_inspectors_win_over_ctrl() {
        assert_eq!(click_action(mods(true, false, true, false)), ClickAction::ShowMetadata);
        assert_eq!(click_action(mods(true, false, false, true)), ClickAction::ShowPreview);
        assert_eq!(click_action(mods(true, true, true, true)), ClickAction::ShowRawData);
    }

    #[test]
    fn test_mac_cmd_toggles() {
        let m = Modifiers {
            mac_cmd: true,
            ..Default::default()
        };
        assert_eq!(click_action(m), ClickAction::ToggleSelection);
    }

    #[test]
    fn test_double_click_depends_on_list() {
        let mut ws = Workspace::new(crate::model::fixtures::library());
        let row: RowId = ws
            .add_to_collection(crate::model::SourceRef {
                presentation: 0,
                slide: 0,
            })
            .unwrap();
        assert_eq!(double_click_action(src(1, 1)), DoubleClickAction::AddToCollection);
        assert_eq!(
            double_click_action(ItemKey::Collected(row)),
            DoubleClickAction::RemoveFromCollection
        );
    }
}
