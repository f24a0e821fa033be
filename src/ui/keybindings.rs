//! Keyboard shortcuts for the walkthrough menu.
//!
//! Single source of truth consumed by the help dialog and the status bar hints.

use crossterm::event::KeyCode;

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: KeyCode,
    /// Alternative key (e.g., arrow key)
    pub alt_key: Option<KeyCode>,
    pub description: &'static str,
    pub category: ShortcutCategory,
}

/// Categories for organizing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Scene,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Scene => "Scene",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Scene,
        ]
    }
}

impl Shortcut {
    /// Format key for display (e.g., "q", "Tab", "n/→")
    pub fn key_display(&self) -> String {
        let primary = format_keycode(&self.key);
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Format key for help dialog (left-padded to 7 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<7}", self.key_display())
    }
}

fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        _ => format!("{:?}", key),
    }
}

pub static SHORTCUTS: &[Shortcut] = &[
    // General
    Shortcut {
        key: KeyCode::Char('q'),
        alt_key: None,
        description: "Quit",
        category: ShortcutCategory::General,
    },
    Shortcut {
        key: KeyCode::Char('?'),
        alt_key: None,
        description: "Toggle help",
        category: ShortcutCategory::General,
    },
    Shortcut {
        key: KeyCode::Char('m'),
        alt_key: None,
        description: "Minimize / restore menu",
        category: ShortcutCategory::General,
    },
    // Navigation
    Shortcut {
        key: KeyCode::Char('n'),
        alt_key: Some(KeyCode::Right),
        description: "Next step",
        category: ShortcutCategory::Navigation,
    },
    Shortcut {
        key: KeyCode::Char('p'),
        alt_key: Some(KeyCode::Left),
        description: "Previous step",
        category: ShortcutCategory::Navigation,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: None,
        description: "Switch between steps and scene",
        category: ShortcutCategory::Navigation,
    },
    Shortcut {
        key: KeyCode::Char('j'),
        alt_key: Some(KeyCode::Down),
        description: "Move down",
        category: ShortcutCategory::Navigation,
    },
    Shortcut {
        key: KeyCode::Char('k'),
        alt_key: Some(KeyCode::Up),
        description: "Move up",
        category: ShortcutCategory::Navigation,
    },
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        description: "Jump to step / use scene object",
        category: ShortcutCategory::Navigation,
    },
    // Scene
    Shortcut {
        key: KeyCode::Char('w'),
        alt_key: Some(KeyCode::Char('s')),
        description: "Move transform along z",
        category: ShortcutCategory::Scene,
    },
    Shortcut {
        key: KeyCode::Char('a'),
        alt_key: Some(KeyCode::Char('d')),
        description: "Move transform along x",
        category: ShortcutCategory::Scene,
    },
    Shortcut {
        key: KeyCode::Char('['),
        alt_key: Some(KeyCode::Char(']')),
        description: "Turn transform left / right",
        category: ShortcutCategory::Scene,
    },
];

/// Shortcuts grouped by category, in display order, skipping empty groups
pub fn shortcuts_by_category() -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = SHORTCUTS
            .iter()
            .filter(|s| s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shortcuts_have_descriptions() {
        for shortcut in SHORTCUTS {
            assert!(
                !shortcut.description.is_empty(),
                "Shortcut {:?} has empty description",
                shortcut.key
            );
        }
    }

    #[test]
    fn test_key_display_with_alt() {
        let next = SHORTCUTS
            .iter()
            .find(|s| s.description == "Next step")
            .unwrap();
        assert_eq!(next.key_display(), "n/→");
        assert_eq!(next.key_display_padded(), "n/→    ");
    }

    #[test]
    fn test_no_duplicate_keys() {
        let mut seen = std::collections::HashSet::new();
        for shortcut in SHORTCUTS {
            assert!(seen.insert(shortcut.key), "duplicate key {:?}", shortcut.key);
            if let Some(alt) = shortcut.alt_key {
                assert!(seen.insert(alt), "duplicate key {:?}", alt);
            }
        }
    }

    #[test]
    fn test_grouped_in_display_order() {
        let grouped = shortcuts_by_category();
        let categories: Vec<_> = grouped.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            categories,
            vec![
                ShortcutCategory::General,
                ShortcutCategory::Navigation,
                ShortcutCategory::Scene
            ]
        );
    }
}
