//! Keybinding configuration for the reading screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub set_goal: Vec<String>,
    pub open_book: Vec<String>,
    pub toggle_pause: Vec<String>,
    pub refresh: Vec<String>,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: vec!["q".to_string(), "Ctrl+c".to_string()],
            set_goal: vec!["g".to_string()],
            open_book: vec!["o".to_string()],
            toggle_pause: vec!["p".to_string(), "Space".to_string()],
            refresh: vec!["r".to_string()],
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table = [
            (&self.quit, Action::Quit),
            (&self.set_goal, Action::SetGoal),
            (&self.open_book, Action::OpenBook),
            (&self.toggle_pause, Action::TogglePause),
            (&self.refresh, Action::Refresh),
        ];

        table
            .into_iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| action)
            .unwrap_or(Action::None)
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Check if this binding matches a key event.
    ///
    /// Shift is ignored on the event side so "G" and "Shift+g" style reports
    /// from different terminals both match.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse a key string such as "q", "Space", "Ctrl+c" or "Shift+Tab".
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    let mut parts: Vec<&str> = s.split('+').collect();
    // "+" on its own, or "Ctrl++"
    if s.ends_with('+') && parts.len() > 1 {
        parts.truncate(parts.len() - 2);
        parts.push("+");
    }

    let (key_part, modifier_parts) = parts
        .split_last()
        .ok_or_else(|| format!("Empty key binding: {}", s))?;

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        }
    }

    let code = parse_key_code(key_part)?;
    Ok(KeyBinding { code, modifiers })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_char() {
        let binding = parse_key_string("g").unwrap();
        assert_eq!(binding.code, KeyCode::Char('g'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_key_string("Space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_string("esc").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key_string("F5").unwrap().code, KeyCode::F(5));
        assert!(parse_key_string("F13").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+Shift+a").unwrap();
        assert_eq!(binding.code, KeyCode::Char('a'));
        assert_eq!(
            binding.modifiers,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
        assert!(parse_key_string("Hyper+a").is_err());
    }

    #[test]
    fn test_parse_plus_key() {
        assert_eq!(parse_key_string("+").unwrap().code, KeyCode::Char('+'));
        let binding = parse_key_string("Ctrl++").unwrap();
        assert_eq!(binding.code, KeyCode::Char('+'));
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_keybinding_matches() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_keybinding_config_get_action() {
        let config = KeybindingConfig::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(config.get_action(&key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            config.get_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(config.get_action(&key(KeyCode::Char('g'))), Action::SetGoal);
        assert_eq!(config.get_action(&key(KeyCode::Char('o'))), Action::OpenBook);
        assert_eq!(config.get_action(&key(KeyCode::Char(' '))), Action::TogglePause);
        assert_eq!(config.get_action(&key(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(config.get_action(&key(KeyCode::Char('x'))), Action::None);
    }
}
