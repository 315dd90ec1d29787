//! Move representation.
//!
//! Moves are tagged records. Castling always records the king and rook
//! *origin* squares so Chess960 setups need no special casing; the
//! destinations follow from the castling side and the back rank.

use crate::{CastlingSide, Role, Square};

/// A chess move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// A regular piece or pawn move.
    Normal {
        role: Role,
        from: Square,
        capture: Option<Role>,
        to: Square,
    },
    /// A pawn reaching the last rank.
    Promotion {
        from: Square,
        capture: Option<Role>,
        to: Square,
        promotion: Role,
    },
    /// An en passant capture; `to` is the target square, not the captured
    /// pawn's square.
    EnPassant { from: Square, to: Square },
    /// Castling, recorded by the origin squares of king and rook.
    Castle {
        king: Square,
        rook: Square,
        side: CastlingSide,
    },
    /// A Crazyhouse drop from the pocket.
    Put { role: Role, to: Square },
}

impl Move {
    /// Returns the origin square, if the move has one (drops do not).
    #[inline]
    pub const fn from(&self) -> Option<Square> {
        match *self {
            Move::Normal { from, .. }
            | Move::Promotion { from, .. }
            | Move::EnPassant { from, .. } => Some(from),
            Move::Castle { king, .. } => Some(king),
            Move::Put { .. } => None,
        }
    }

    /// Returns the destination square of the moving piece.
    pub fn to(&self) -> Square {
        match *self {
            Move::Normal { to, .. }
            | Move::Promotion { to, .. }
            | Move::EnPassant { to, .. }
            | Move::Put { to, .. } => to,
            Move::Castle { king, side, .. } => Square::new(side.king_to_file(), king.rank()),
        }
    }

    /// Returns the role of the moving (or dropped) piece.
    #[inline]
    pub const fn role(&self) -> Role {
        match *self {
            Move::Normal { role, .. } => role,
            Move::Promotion { .. } | Move::EnPassant { .. } => Role::Pawn,
            Move::Castle { .. } => Role::King,
            Move::Put { role, .. } => role,
        }
    }

    /// Returns the captured role, if any.
    #[inline]
    pub const fn capture(&self) -> Option<Role> {
        match *self {
            Move::Normal { capture, .. } | Move::Promotion { capture, .. } => capture,
            Move::EnPassant { .. } => Some(Role::Pawn),
            Move::Castle { .. } | Move::Put { .. } => None,
        }
    }

    /// Returns true if the move captures.
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.capture().is_some()
    }

    /// Returns true if the move is a promotion.
    #[inline]
    pub const fn is_promotion(&self) -> bool {
        matches!(self, Move::Promotion { .. })
    }

    /// Returns the promoted role, if any.
    #[inline]
    pub const fn promotion(&self) -> Option<Role> {
        match *self {
            Move::Promotion { promotion, .. } => Some(promotion),
            _ => None,
        }
    }

    /// Returns the castling side, if the move castles.
    #[inline]
    pub const fn castling_side(&self) -> Option<CastlingSide> {
        match *self {
            Move::Castle { side, .. } => Some(side),
            _ => None,
        }
    }

    /// Returns true if the move resets the halfmove clock
    /// (a pawn move or a capture).
    #[inline]
    pub const fn is_zeroing(&self) -> bool {
        matches!(
            self,
            Move::Normal {
                role: Role::Pawn,
                ..
            } | Move::Normal {
                capture: Some(_),
                ..
            } | Move::Promotion { .. }
                | Move::EnPassant { .. }
        )
    }

    /// Renders the move as a UCI string.
    ///
    /// Castling is encoded king-to-rook in Chess960 mode and
    /// king-to-final-square otherwise; the two disagree, so there is
    /// deliberately no `Display` impl and every caller states the mode.
    /// Drops use the `Q@e4` form.
    pub fn to_uci(&self, chess960: bool) -> String {
        match *self {
            Move::Castle { king, rook, side } => {
                if chess960 {
                    format!("{}{}", king, rook)
                } else {
                    format!("{}{}", king, Square::new(side.king_to_file(), king.rank()))
                }
            }
            Move::Promotion {
                from,
                to,
                promotion,
                ..
            } => format!("{}{}{}", from, to, promotion.to_char()),
            Move::Put { role, to } => format!("{}@{}", role.upper_char(), to),
            Move::Normal { from, to, .. } | Move::EnPassant { from, to } => {
                format!("{}{}", from, to)
            }
        }
    }
}
