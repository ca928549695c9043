use std::str::FromStr;

use crate::engine::Move;

/// Something the player asked for from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Restart,
    /// Start a new round on a board of this edge length.
    Resize(usize),
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized direction: {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Accepts `wasd`, vi-style `hjkl` and the full direction names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "k" | "up" => Ok(Move::Up),
            "s" | "j" | "down" => Ok(Move::Down),
            "a" | "h" | "left" => Ok(Move::Left),
            "d" | "l" | "right" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// Map one line of player input to a command.
///
/// `size N` asks for a new round at size N; the number is not range-checked here.
pub fn parse_key(input: &str) -> Option<Command> {
    let input = input.trim().to_ascii_lowercase();
    if let Some(rest) = input.strip_prefix("size") {
        return rest.trim().parse().ok().map(Command::Resize);
    }
    match input.as_str() {
        "q" | "quit" | "exit" => Some(Command::Quit),
        "r" | "new" | "restart" => Some(Command::Restart),
        other => other.parse::<Move>().ok().map(Command::Move),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_aliases() {
        for key in ["w", "k", "UP", " up "] {
            assert_eq!(key.parse::<Move>(), Ok(Move::Up), "{key}");
        }
        for key in ["s", "j", "Down"] {
            assert_eq!(key.parse::<Move>(), Ok(Move::Down), "{key}");
        }
        for key in ["a", "H", "left"] {
            assert_eq!(key.parse::<Move>(), Ok(Move::Left), "{key}");
        }
        for key in ["d", "l", "RIGHT"] {
            assert_eq!(key.parse::<Move>(), Ok(Move::Right), "{key}");
        }
    }

    #[test]
    fn rejects_unknown_direction() {
        assert_eq!("x".parse::<Move>(), Err(ParseMoveError("x".to_string())));
        assert!("".parse::<Move>().is_err());
    }

    #[test]
    fn parse_key_commands() {
        assert_eq!(parse_key("q"), Some(Command::Quit));
        assert_eq!(parse_key("Quit\n"), Some(Command::Quit));
        assert_eq!(parse_key("r"), Some(Command::Restart));
        assert_eq!(parse_key("a"), Some(Command::Move(Move::Left)));
        assert_eq!(parse_key("?"), None);
    }

    #[test]
    fn parse_key_resize() {
        assert_eq!(parse_key("size 5"), Some(Command::Resize(5)));
        assert_eq!(parse_key("  SIZE   10\n"), Some(Command::Resize(10)));
        assert_eq!(parse_key("size 1"), Some(Command::Resize(1)));
        assert_eq!(parse_key("size"), None);
        assert_eq!(parse_key("size five"), None);
        assert_eq!(parse_key("size -3"), None);
    }
}
