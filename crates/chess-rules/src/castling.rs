//! Castling rights as unmoved-rook squares.
//!
//! Rights are a bitboard of rook squares that may still castle, which
//! covers Chess960 setups without special cases: the side of a right is
//! inferred from the rook's position relative to its sibling or king.

use crate::Bitboard;
use chess_core::{CastlingSide, Color, Square};

/// The rook squares still carrying castling rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UnmovedRooks(Bitboard);

impl UnmovedRooks {
    /// No castling rights.
    pub const EMPTY: UnmovedRooks = UnmovedRooks(Bitboard::EMPTY);

    /// The standard corner rooks.
    pub const STANDARD: UnmovedRooks = UnmovedRooks(Bitboard(0x8100_0000_0000_0081));

    /// Creates rights from a bitboard of rook squares.
    #[inline]
    pub const fn new(squares: Bitboard) -> Self {
        UnmovedRooks(squares)
    }

    /// Returns the underlying bitboard.
    #[inline]
    pub const fn squares(self) -> Bitboard {
        self.0
    }

    /// Returns true if no rights remain.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the square still carries a right.
    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0.contains(sq)
    }

    /// Adds a right on a square.
    #[inline]
    pub fn add(&mut self, sq: Square) {
        self.0.set(sq);
    }

    /// Removes the right on a square, if present.
    #[inline]
    pub fn discard(&mut self, sq: Square) {
        self.0.clear(sq);
    }

    /// Removes all rights of a color (its back rank).
    #[inline]
    pub fn discard_color(&mut self, color: Color) {
        self.0 &= !Bitboard::rank(color.back_rank());
    }

    /// Returns the unmoved rooks on a color's back rank.
    #[inline]
    pub fn on_back_rank(self, color: Color) -> Bitboard {
        self.0 & Bitboard::rank(color.back_rank())
    }

    /// Classifies the right on a square.
    ///
    /// - `None`: the square is not an unmoved rook.
    /// - `Some(None)`: an unmoved rook with no sibling on its rank, so the
    ///   side cannot be inferred from the rights alone.
    /// - `Some(Some(side))`: inferred from the file of the sibling rook.
    pub fn side(self, sq: Square) -> Option<Option<CastlingSide>> {
        if !self.contains(sq) {
            return None;
        }
        let siblings = (self.0 & Bitboard::rank(sq.rank())).without(sq);
        Some(siblings.first().map(|other| {
            if other.file() > sq.file() {
                CastlingSide::QueenSide
            } else {
                CastlingSide::KingSide
            }
        }))
    }
}
