//! Trigger keyboard handling.

use lattice_select_core::logging::targets;

use super::Dropdown;

/// A key pressed while the trigger has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
    /// Any other printable key.
    Character(char),
}

impl Key {
    /// Whether the host should suppress its default action for this key
    /// (scrolling, form submission).
    pub fn prevents_default(self) -> bool {
        !matches!(self, Key::Tab | Key::Character(_))
    }
}

/// Returns whether the key was consumed.
pub(super) async fn handle(dropdown: &Dropdown, key: Key) -> bool {
    if dropdown.is_disabled() {
        return false;
    }
    let open = dropdown.is_open();
    tracing::trace!(target: targets::DROPDOWN, ?key, open, "trigger key-down");

    match key {
        Key::Escape => {
            if !open {
                return false;
            }
            dropdown.close();
            true
        }
        Key::Tab => {
            dropdown.close();
            false
        }
        Key::Home | Key::PageUp => {
            dropdown.highlight_first();
            ensure_open(dropdown).await;
            true
        }
        Key::End | Key::PageDown => {
            dropdown.highlight_last();
            ensure_open(dropdown).await;
            true
        }
        Key::ArrowDown | Key::ArrowUp => {
            if dropdown.highlighted().is_none() {
                dropdown.highlight_first();
            } else if open && key == Key::ArrowDown {
                dropdown.highlight_next();
            } else if open {
                dropdown.highlight_prev();
            }
            ensure_open(dropdown).await;
            true
        }
        Key::Enter | Key::Space => {
            match dropdown.highlighted() {
                Some(index) if open => {
                    dropdown.select(index);
                    dropdown.close();
                }
                Some(_) => {
                    ensure_open(dropdown).await;
                }
                None => {
                    dropdown.highlight_first();
                    ensure_open(dropdown).await;
                }
            }
            true
        }
        Key::Character(_) => false,
    }
}

async fn ensure_open(dropdown: &Dropdown) {
    if !dropdown.is_open() {
        dropdown.open().await;
    }
}
