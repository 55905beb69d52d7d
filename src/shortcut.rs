//! Keyboard shortcuts: exact modifier matching, recording rules and the
//! owned registry of in-page commands plus the single "open search" binding.
use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Result, ShelfError};

const MODIFIER_KEYS: [&str; 3] = ["Control", "Alt", "Shift"];

/// A single-keypress shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutKeys {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    #[serde(deserialize_with = "uppercase_key")]
    pub key: String,
}

fn uppercase_key<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|key| key.to_uppercase())
}

/// An observed key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, ctrl_key: bool, alt_key: bool, shift_key: bool) -> Self {
        Self {
            key: key.into(),
            ctrl_key,
            alt_key,
            shift_key,
        }
    }
}

impl ShortcutKeys {
    /// Builds a shortcut, storing the key upper-cased.
    pub fn new(ctrl: bool, alt: bool, shift: bool, key: &str) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            key: key.to_uppercase(),
        }
    }

    /// Modifiers must be identical and the upper-cased event key must equal `key`.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.ctrl_key == self.ctrl
            && event.alt_key == self.alt
            && event.shift_key == self.shift
            && event.key.to_uppercase() == self.key
    }

    /// Turns a key press into a shortcut, enforcing the recording rules: one
    /// or two modifiers plus a key that is not itself a modifier.
    pub fn record(event: &KeyEvent) -> Result<Self> {
        let modifiers = [event.ctrl_key, event.alt_key, event.shift_key]
            .iter()
            .filter(|held| **held)
            .count();

        if modifiers > 2 {
            return Err(ShelfError::InvalidShortcut {
                message: "at most two modifiers plus one key are supported".to_string(),
            });
        }
        if modifiers == 0 {
            return Err(ShelfError::InvalidShortcut {
                message: "use at least one modifier (Ctrl/Alt/Shift)".to_string(),
            });
        }
        if event.key.is_empty() || MODIFIER_KEYS.contains(&event.key.as_str()) {
            return Err(ShelfError::InvalidShortcut {
                message: "a non-modifier key is required".to_string(),
            });
        }

        Ok(Self::new(
            event.ctrl_key,
            event.alt_key,
            event.shift_key,
            &event.key,
        ))
    }

    /// The key press that would trigger this shortcut.
    pub fn to_event(&self) -> KeyEvent {
        KeyEvent::new(self.key.clone(), self.ctrl, self.alt, self.shift)
    }
}

impl Default for ShortcutKeys {
    fn default() -> Self {
        Self::new(true, false, false, "K")
    }
}

impl fmt::Display for ShortcutKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parses combos such as `Ctrl+Alt+F` or `Ctrl++`. Only the syntax is
/// checked here; use [`ShortcutKeys::record`] to apply the recording rules.
impl FromStr for ShortcutKeys {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        let mut keys = ShortcutKeys::new(false, false, false, "");
        let trimmed = s.trim();

        // A trailing `++` (or a lone `+`) binds the plus key itself.
        let (modifiers, mut key) = match trimmed.strip_suffix("++") {
            Some(rest) => (rest, Some("+")),
            None if trimmed == "+" => ("", Some("+")),
            None => (trimmed, None),
        };
        let parts = if modifiers.is_empty() && key.is_some() {
            Vec::new()
        } else {
            modifiers.split('+').map(str::trim).collect()
        };

        for part in parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => keys.ctrl = true,
                "alt" | "option" => keys.alt = true,
                "shift" => keys.shift = true,
                "" => {
                    return Err(ShelfError::InvalidShortcut {
                        message: format!("empty key in '{}'", s),
                    })
                }
                _ if key.is_some() => {
                    return Err(ShelfError::InvalidShortcut {
                        message: format!("more than one key in '{}'", s),
                    })
                }
                _ => key = Some(part),
            }
        }

        let key = key.ok_or_else(|| ShelfError::InvalidShortcut {
            message: format!("no key in '{}'", s),
        })?;
        keys.key = key.to_uppercase();
        Ok(keys)
    }
}

/// A registered in-page command.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutCommand<A> {
    pub keys: ShortcutKeys,
    pub description: String,
    pub action: A,
}

/// What a key press resolved to.
#[derive(Debug, PartialEq)]
pub enum ShortcutMatch<'a, A> {
    Command(&'a ShortcutCommand<A>),
    Search,
}

/// Owned registry of shortcuts.
///
/// Registered commands are checked first, in registration order, and the
/// first match wins; the search shortcut is checked last.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry<A> {
    commands: Vec<ShortcutCommand<A>>,
    search: ShortcutKeys,
    enabled: bool,
}

impl<A> ShortcutRegistry<A> {
    pub fn new(search: ShortcutKeys) -> Self {
        let mut registry = Self {
            commands: Vec::new(),
            search: ShortcutKeys::default(),
            enabled: true,
        };
        registry.set_search_shortcut(search);
        registry
    }

    pub fn register(&mut self, keys: ShortcutKeys, description: impl Into<String>, action: A) {
        let keys = ShortcutKeys::new(keys.ctrl, keys.alt, keys.shift, &keys.key);
        let description = description.into();
        debug!("Registering shortcut {} ({})", keys, description);
        self.commands.push(ShortcutCommand {
            keys,
            description,
            action,
        });
    }

    /// Removes every command bound to `key`. Returns how many were removed.
    pub fn unregister(&mut self, key: &str) -> usize {
        let key = key.to_uppercase();
        let before = self.commands.len();
        self.commands.retain(|cmd| cmd.keys.key != key);
        before - self.commands.len()
    }

    pub fn search_shortcut(&self) -> &ShortcutKeys {
        &self.search
    }

    pub fn set_search_shortcut(&mut self, keys: ShortcutKeys) {
        self.search = ShortcutKeys::new(keys.ctrl, keys.alt, keys.shift, &keys.key);
    }

    pub fn commands(&self) -> &[ShortcutCommand<A>] {
        &self.commands
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dispatch(&self, event: &KeyEvent) -> Option<ShortcutMatch<'_, A>> {
        if !self.enabled {
            return None;
        }
        if let Some(command) = self.commands.iter().find(|cmd| cmd.keys.matches(event)) {
            return Some(ShortcutMatch::Command(command));
        }
        self.search.matches(event).then_some(ShortcutMatch::Search)
    }
}

impl<A> Default for ShortcutRegistry<A> {
    fn default() -> Self {
        Self::new(ShortcutKeys::default())
    }
}
