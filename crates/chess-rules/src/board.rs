//! Piece placement: role and color bitboards with update atoms.

use crate::movegen::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::Bitboard;
use chess_core::{Color, Piece, Role, Square};

/// Piece placement for one position.
///
/// Six role bitboards plus two color bitboards. The public update operations
/// are total: they return `None` (or leave a copy untouched) instead of
/// panicking on illegal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    by_role: [Bitboard; 6],
    by_color: [Bitboard; 2],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Board {
            by_role: [Bitboard::EMPTY; 6],
            by_color: [Bitboard::EMPTY; 2],
        }
    }

    /// Creates the standard starting placement.
    pub const fn standard() -> Self {
        Board {
            by_role: [
                Bitboard(0x00FF_0000_0000_FF00), // pawns
                Bitboard(0x4200_0000_0000_0042), // knights
                Bitboard(0x2400_0000_0000_0024), // bishops
                Bitboard(0x8100_0000_0000_0081), // rooks
                Bitboard(0x0800_0000_0000_0008), // queens
                Bitboard(0x1000_0000_0000_0010), // kings
            ],
            by_color: [
                Bitboard(0x0000_0000_0000_FFFF),
                Bitboard(0xFFFF_0000_0000_0000),
            ],
        }
    }

    /// Returns the bitboard for a role (both colors).
    #[inline]
    pub fn by_role(&self, role: Role) -> Bitboard {
        self.by_role[role.index()]
    }

    /// Returns the bitboard for a color.
    #[inline]
    pub fn by_color(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    /// Returns the bitboard for a specific piece.
    #[inline]
    pub fn pieces(&self, color: Color, role: Role) -> Bitboard {
        self.by_role[role.index()] & self.by_color[color.index()]
    }

    /// Returns all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[0] | self.by_color[1]
    }

    /// Returns the role on the given square, if any.
    pub fn role_at(&self, sq: Square) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.by_role[role.index()].contains(sq))
    }

    /// Returns the color on the given square, if any.
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|color| self.by_color[color.index()].contains(sq))
    }

    /// Returns the piece on the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let color = self.color_at(sq)?;
        let role = self.role_at(sq)?;
        Some(Piece::new(color, role))
    }

    /// Returns the square of the given color's king, if present.
    #[inline]
    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.pieces(color, Role::King).first()
    }

    /// Places a piece onto an empty square.
    pub fn place(&self, piece: Piece, sq: Square) -> Option<Board> {
        if self.occupied().contains(sq) {
            return None;
        }
        let mut board = *self;
        board.set_piece_at(sq, piece);
        Some(board)
    }

    /// Removes and returns the piece on an occupied square.
    pub fn take(&self, sq: Square) -> Option<(Piece, Board)> {
        let piece = self.piece_at(sq)?;
        let mut board = *self;
        board.discard_piece_at(sq);
        Some((piece, board))
    }

    /// Moves a piece to an empty or enemy-occupied square.
    pub fn move_piece(&self, from: Square, to: Square) -> Option<Board> {
        let piece = self.piece_at(from)?;
        if let Some(dest) = self.piece_at(to) {
            if dest.color == piece.color {
                return None;
            }
        }
        let mut board = *self;
        board.discard_piece_at(to);
        board.discard_piece_at(from);
        board.set_piece_at(to, piece);
        Some(board)
    }

    /// As [`move_piece`](Board::move_piece), replacing the role at `to`.
    pub fn promote(&self, from: Square, to: Square, role: Role) -> Option<Board> {
        let piece = self.piece_at(from)?;
        let mut board = self.move_piece(from, to)?;
        board.discard_piece_at(to);
        board.set_piece_at(to, Piece::new(piece.color, role));
        Some(board)
    }

    /// Returns the pieces of `by` attacking `sq` under the given occupancy.
    ///
    /// The occupancy is a parameter so callers can probe hypothetical
    /// removals (discovered checks, king retreats along a ray).
    pub fn attackers(&self, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
        let them = self.by_color(by);
        let queens = self.by_role(Role::Queen);

        (pawn_attacks(by.opposite(), sq) & self.by_role(Role::Pawn)
            | knight_attacks(sq) & self.by_role(Role::Knight)
            | king_attacks(sq) & self.by_role(Role::King)
            | bishop_attacks(sq, occupied) & (self.by_role(Role::Bishop) | queens)
            | rook_attacks(sq, occupied) & (self.by_role(Role::Rook) | queens))
            & them
    }

    /// Returns true if the given color's king is attacked.
    pub fn check_of(&self, color: Color) -> bool {
        match self.king_of(color) {
            Some(king) => self
                .attackers(king, color.opposite(), self.occupied())
                .is_not_empty(),
            None => false,
        }
    }

    /// Checks structural invariants.
    ///
    /// Always: role bitboards pairwise disjoint, color bitboards disjoint,
    /// and their unions equal. With `strict`, additionally one king per
    /// color and no pawns on the back ranks.
    pub fn is_valid(&self, strict: bool) -> bool {
        let mut union = Bitboard::EMPTY;
        for role in Role::ALL {
            let bb = self.by_role(role);
            if (bb & union).is_not_empty() {
                return false;
            }
            union |= bb;
        }

        if (self.by_color[0] & self.by_color[1]).is_not_empty() {
            return false;
        }
        if self.by_color[0] | self.by_color[1] != union {
            return false;
        }

        if strict {
            for color in Color::ALL {
                if self.pieces(color, Role::King).count() != 1 {
                    return false;
                }
            }
            let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
            if (self.by_role(Role::Pawn) & back_ranks).is_not_empty() {
                return false;
            }
        }

        true
    }

    pub(crate) fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        self.by_role[piece.role.index()].set(sq);
        self.by_color[piece.color.index()].set(sq);
    }

    pub(crate) fn discard_piece_at(&mut self, sq: Square) {
        if let Some(piece) = self.piece_at(sq) {
            self.by_role[piece.role.index()].clear(sq);
            self.by_color[piece.color.index()].clear(sq);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
