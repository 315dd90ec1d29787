//! Piece identity: role and colored piece.

use crate::Color;

/// The six types of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Role {
    /// All roles in order.
    pub const ALL: [Role; 6] = [
        Role::Pawn,
        Role::Knight,
        Role::Bishop,
        Role::Rook,
        Role::Queen,
        Role::King,
    ];

    /// The roles a pawn may promote to under standard rules.
    pub const PROMOTABLE: [Role; 4] = [Role::Queen, Role::Rook, Role::Bishop, Role::Knight];

    /// Returns the index of this role (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase FEN character.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Role::Pawn => 'p',
            Role::Knight => 'n',
            Role::Bishop => 'b',
            Role::Rook => 'r',
            Role::Queen => 'q',
            Role::King => 'k',
        }
    }

    /// Returns the uppercase SAN letter.
    #[inline]
    pub const fn upper_char(self) -> char {
        self.to_char().to_ascii_uppercase()
    }

    /// Parses a role from a character, accepting either case.
    #[inline]
    pub const fn from_char(c: char) -> Option<Role> {
        match c.to_ascii_lowercase() {
            'p' => Some(Role::Pawn),
            'n' => Some(Role::Knight),
            'b' => Some(Role::Bishop),
            'r' => Some(Role::Rook),
            'q' => Some(Role::Queen),
            'k' => Some(Role::King),
            _ => None,
        }
    }

    /// Returns true if this role is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Role::Bishop | Role::Rook | Role::Queen)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Pawn => "Pawn",
            Role::Knight => "Knight",
            Role::Bishop => "Bishop",
            Role::Rook => "Rook",
            Role::Queen => "Queen",
            Role::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A piece: a role owned by a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    /// Creates a piece.
    #[inline]
    pub const fn new(color: Color, role: Role) -> Self {
        Piece { color, role }
    }

    /// Returns the FEN character (uppercase for White).
    #[inline]
    pub const fn to_fen_char(self) -> char {
        match self.color {
            Color::White => self.role.to_char().to_ascii_uppercase(),
            Color::Black => self.role.to_char(),
        }
    }

    /// Parses a FEN character into a piece.
    #[inline]
    pub const fn from_fen_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Role::from_char(c) {
            Some(role) => Some(Piece { color, role }),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_char_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_char(role.to_char()), Some(role));
            assert_eq!(Role::from_char(role.upper_char()), Some(role));
        }
        assert_eq!(Role::from_char('x'), None);
    }

    #[test]
    fn piece_fen_char() {
        assert_eq!(Piece::new(Color::White, Role::Pawn).to_fen_char(), 'P');
        assert_eq!(Piece::new(Color::Black, Role::Pawn).to_fen_char(), 'p');
        assert_eq!(Piece::new(Color::White, Role::King).to_fen_char(), 'K');
        assert_eq!(Piece::new(Color::Black, Role::Knight).to_fen_char(), 'n');
    }

    #[test]
    fn piece_from_fen_char() {
        assert_eq!(
            Piece::from_fen_char('Q'),
            Some(Piece::new(Color::White, Role::Queen))
        );
        assert_eq!(
            Piece::from_fen_char('r'),
            Some(Piece::new(Color::Black, Role::Rook))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn is_slider() {
        assert!(!Role::Pawn.is_slider());
        assert!(!Role::Knight.is_slider());
        assert!(Role::Bishop.is_slider());
        assert!(Role::Rook.is_slider());
        assert!(Role::Queen.is_slider());
        assert!(!Role::King.is_slider());
    }
}
