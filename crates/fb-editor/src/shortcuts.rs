//! Keyboard shortcut mapping for the form editor.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. On macOS
//! `meta` is ⌘; elsewhere `ctrl` plays the same role.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    /// Delete the selected field.
    Delete,
    /// Move the selected field one slot up.
    MoveUp,
    /// Move the selected field one slot down.
    MoveDown,

    // ── Form ──
    Save,

    // ── UI ──
    Deselect,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::Save),
                _ => None,
            };
        }

        if alt {
            return match key {
                "ArrowUp" => Some(ShortcutAction::MoveUp),
                "ArrowDown" => Some(ShortcutAction::MoveDown),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
