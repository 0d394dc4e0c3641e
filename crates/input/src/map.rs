//! Key mapping from terminal events to game keys.

use crate::types::GameKey;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a terminal key code to a game key.
pub fn map_key(code: KeyCode) -> Option<GameKey> {
    match code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(GameKey::Left)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(GameKey::Right)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameKey::Down)
        }

        // Rotation (counter-clockwise only)
        KeyCode::Up
        | KeyCode::Char(' ')
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W') => Some(GameKey::Rotate),

        // Save
        KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('C') => Some(GameKey::Save),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyCode::Left), Some(GameKey::Left));
        assert_eq!(map_key(KeyCode::Right), Some(GameKey::Right));
        assert_eq!(map_key(KeyCode::Down), Some(GameKey::Down));
        assert_eq!(map_key(KeyCode::Char('H')), Some(GameKey::Left));
        assert_eq!(map_key(KeyCode::Char('d')), Some(GameKey::Right));
    }

    #[test]
    fn test_rotate_and_save_keys() {
        assert_eq!(map_key(KeyCode::Up), Some(GameKey::Rotate));
        assert_eq!(map_key(KeyCode::Char(' ')), Some(GameKey::Rotate));
        assert_eq!(map_key(KeyCode::Enter), Some(GameKey::Save));
        assert_eq!(map_key(KeyCode::Char('C')), Some(GameKey::Save));
        assert_eq!(map_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
