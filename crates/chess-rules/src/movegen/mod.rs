//! Move generation.
//!
//! Legal moves are produced directly from check geometry: the checkers and
//! pinned pieces of the side to move are computed once, and per-piece
//! generation is masked accordingly instead of filtering by make-and-test.
//! Variant rule sets compose these building blocks.

mod attacks;
mod magics;
pub mod perft;

use crate::{Bitboard, Board, Position};
use chess_core::{CastlingSide, Color, Move, Role, Square};

pub use attacks::{
    aligned, between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks,
    ray, rook_attacks,
};

/// A list of generated moves.
#[derive(Debug, Clone, Default)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    /// Creates an empty move list.
    #[inline]
    pub fn new() -> Self {
        MoveList {
            moves: Vec::with_capacity(48),
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Returns the number of moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Returns true if the list contains the move.
    #[inline]
    pub fn contains(&self, m: &Move) -> bool {
        self.moves.contains(m)
    }

    /// Retains only moves for which the predicate returns true.
    #[inline]
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.moves.retain(f);
    }

    /// Appends all moves from another list.
    #[inline]
    pub fn extend(&mut self, other: MoveList) {
        self.moves.extend(other.moves);
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Generates the legal moves under orthodox king-safety rules.
///
/// This is the baseline used by Standard, Chess960, King of the Hill,
/// Three-check and Crazyhouse (plus drops), and as the pre-filter stage for
/// Racing Kings. A side without a king (Horde) gets its pseudo-legal moves,
/// since there is nothing to expose to check.
pub(crate) fn standard_moves(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let us = pos.turn;
    let occupied = pos.board.occupied();

    let Some(king) = pos.board.king_of(us) else {
        pawn_moves(pos, Bitboard::FULL, &Role::PROMOTABLE, &mut moves);
        piece_moves(pos, Bitboard::FULL, &mut moves);
        en_passant_moves(pos, &mut moves);
        return moves;
    };

    let checkers = pos.board.attackers(king, us.opposite(), occupied);

    if checkers.more_than_one() {
        king_safe_moves(pos, king, &mut moves);
        return moves;
    }

    let target = match checkers.single_square() {
        Some(checker) => between(king, checker).with(checker),
        None => Bitboard::FULL,
    };

    pawn_moves(pos, target, &Role::PROMOTABLE, &mut moves);
    piece_moves(pos, target, &mut moves);
    en_passant_moves(pos, &mut moves);

    // Pinned pieces may only move along the ray through their king.
    // En passant is exempt: its legality was fully simulated above.
    let blockers = slider_blockers(&pos.board, king, us);
    if blockers.is_not_empty() {
        moves.retain(|m| {
            if matches!(m, Move::EnPassant { .. }) {
                return true;
            }
            match m.from() {
                Some(from) if blockers.contains(from) => aligned(king, from, m.to()),
                _ => true,
            }
        });
    }

    king_safe_moves(pos, king, &mut moves);
    if checkers.is_empty() {
        castling_moves(pos, king, &mut moves);
    }

    moves
}

/// Generates pseudo-legal moves: piece movement rules only, the king treated
/// as an ordinary piece. Used by Antichess and as the Atomic candidate set.
pub(crate) fn pseudo_moves(pos: &Position, promotions: &[Role], castling: bool) -> MoveList {
    let mut moves = MoveList::new();
    pawn_moves(pos, Bitboard::FULL, promotions, &mut moves);
    piece_moves(pos, Bitboard::FULL, &mut moves);
    king_pseudo_moves(pos, &mut moves);
    en_passant_candidates(pos, &mut moves);
    if castling {
        if let Some(king) = pos.board.king_of(pos.turn) {
            castling_moves(pos, king, &mut moves);
        }
    }
    moves
}

/// Generates pocket drops for the side to move (Crazyhouse).
///
/// Under check, drops are confined to interposition squares; under double
/// check no drop helps.
pub(crate) fn drop_moves(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let Some(pockets) = &pos.pockets else {
        return moves;
    };

    let us = pos.turn;
    let empty = !pos.board.occupied();
    let mut targets = empty;

    if let Some(king) = pos.board.king_of(us) {
        let checkers = pos.board.attackers(king, us.opposite(), pos.board.occupied());
        if checkers.more_than_one() {
            return moves;
        }
        if let Some(checker) = checkers.single_square() {
            targets &= between(king, checker);
        }
    }

    let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
    let pocket = pockets.pocket(us);
    for role in [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
        if pocket.count(role) == 0 {
            continue;
        }
        let role_targets = if role == Role::Pawn {
            targets - back_ranks
        } else {
            targets
        };
        for to in role_targets {
            moves.push(Move::Put { role, to });
        }
    }

    moves
}

/// Returns the friendly pieces shielding `king` from an enemy slider.
pub(crate) fn slider_blockers(board: &Board, king: Square, us: Color) -> Bitboard {
    let occupied = board.occupied();
    let queens = board.by_role(Role::Queen);
    let snipers = (rook_attacks(king, Bitboard::EMPTY) & (board.by_role(Role::Rook) | queens)
        | bishop_attacks(king, Bitboard::EMPTY) & (board.by_role(Role::Bishop) | queens))
        & board.by_color(us.opposite());

    let mut blockers = Bitboard::EMPTY;
    for sniper in snipers {
        let shield = between(king, sniper) & occupied;
        if !shield.more_than_one() {
            blockers |= shield & board.by_color(us);
        }
    }
    blockers
}

fn pawn_moves(pos: &Position, target: Bitboard, promotions: &[Role], moves: &mut MoveList) {
    let us = pos.turn;
    let dir = us.pawn_direction();
    let last_rank = us.last_rank();
    let occupied = pos.board.occupied();
    let empty = !occupied;
    let their = pos.board.by_color(us.opposite());

    for from in pos.board.pieces(us, Role::Pawn) {
        // Captures.
        for to in pawn_attacks(us, from) & their & target {
            let capture = pos.board.role_at(to);
            if to.rank() == last_rank {
                for &promotion in promotions {
                    moves.push(Move::Promotion {
                        from,
                        capture,
                        to,
                        promotion,
                    });
                }
            } else {
                moves.push(Move::Normal {
                    role: Role::Pawn,
                    from,
                    capture,
                    to,
                });
            }
        }

        // Pushes.
        let Some(to) = from.offset(8 * dir) else {
            continue;
        };
        if !empty.contains(to) {
            continue;
        }
        if target.contains(to) {
            if to.rank() == last_rank {
                for &promotion in promotions {
                    moves.push(Move::Promotion {
                        from,
                        capture: None,
                        to,
                        promotion,
                    });
                }
            } else {
                moves.push(Move::Normal {
                    role: Role::Pawn,
                    from,
                    capture: None,
                    to,
                });
            }
        }
        if pos.double_push_rank(from.rank()) {
            if let Some(far) = from.offset(16 * dir) {
                if empty.contains(far) && target.contains(far) {
                    moves.push(Move::Normal {
                        role: Role::Pawn,
                        from,
                        capture: None,
                        to: far,
                    });
                }
            }
        }
    }
}

fn piece_moves(pos: &Position, target: Bitboard, moves: &mut MoveList) {
    let us = pos.turn;
    let our = pos.board.by_color(us);
    let occupied = pos.board.occupied();

    for role in [Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
        for from in pos.board.pieces(us, role) {
            let attacks = match role {
                Role::Knight => knight_attacks(from),
                Role::Bishop => bishop_attacks(from, occupied),
                Role::Rook => rook_attacks(from, occupied),
                _ => queen_attacks(from, occupied),
            };
            for to in attacks & !our & target {
                moves.push(Move::Normal {
                    role,
                    from,
                    capture: pos.board.role_at(to),
                    to,
                });
            }
        }
    }
}

/// King moves filtered by destination safety, with the king itself removed
/// from the occupancy so retreats along a checking ray are caught.
fn king_safe_moves(pos: &Position, king: Square, moves: &mut MoveList) {
    let us = pos.turn;
    let them = us.opposite();
    let occupied = pos.board.occupied().without(king);

    for to in king_attacks(king) & !pos.board.by_color(us) {
        if pos.board.attackers(to, them, occupied).is_empty() {
            moves.push(Move::Normal {
                role: Role::King,
                from: king,
                capture: pos.board.role_at(to),
                to,
            });
        }
    }
}

/// King moves without safety filtering (Antichess, Atomic candidates).
fn king_pseudo_moves(pos: &Position, moves: &mut MoveList) {
    let us = pos.turn;
    for from in pos.board.pieces(us, Role::King) {
        for to in king_attacks(from) & !pos.board.by_color(us) {
            moves.push(Move::Normal {
                role: Role::King,
                from,
                capture: pos.board.role_at(to),
                to,
            });
        }
    }
}

/// En passant with full self-check simulation: both the moving and the
/// captured pawn leave their squares, which no mask-based filter models.
fn en_passant_moves(pos: &Position, moves: &mut MoveList) {
    let us = pos.turn;
    let Some(to) = pos.en_passant else {
        return;
    };

    for from in pawn_attacks(us.opposite(), to) & pos.board.pieces(us, Role::Pawn) {
        let mut board = pos.board;
        board.discard_piece_at(from);
        board.discard_piece_at(Square::new(to.file(), from.rank()));
        board.set_piece_at(to, chess_core::Piece::new(us, Role::Pawn));
        if !board.check_of(us) {
            moves.push(Move::EnPassant { from, to });
        }
    }
}

/// En passant candidates without the self-check simulation.
fn en_passant_candidates(pos: &Position, moves: &mut MoveList) {
    let us = pos.turn;
    let Some(to) = pos.en_passant else {
        return;
    };
    for from in pawn_attacks(us.opposite(), to) & pos.board.pieces(us, Role::Pawn) {
        moves.push(Move::EnPassant { from, to });
    }
}

/// Castling generation over unmoved-rook rights; handles arbitrary king and
/// rook files (Chess960).
fn castling_moves(pos: &Position, king: Square, moves: &mut MoveList) {
    let us = pos.turn;
    let them = us.opposite();
    if king.rank() != us.back_rank() {
        return;
    }

    let rooks = pos.castling.on_back_rank(us) & pos.board.pieces(us, Role::Rook);
    for rook in rooks {
        let side = if rook.file() > king.file() {
            CastlingSide::KingSide
        } else {
            CastlingSide::QueenSide
        };
        let king_to = Square::new(side.king_to_file(), king.rank());
        let rook_to = Square::new(side.rook_to_file(), rook.rank());

        let occupied = pos.board.occupied().without(king).without(rook);
        let paths = between(king, king_to).with(king_to) | between(rook, rook_to).with(rook_to);
        if (paths & occupied).is_not_empty() {
            continue;
        }

        let traversed = between(king, king_to).with(king).with(king_to);
        if traversed
            .into_iter()
            .any(|sq| pos.board.attackers(sq, them, occupied).is_not_empty())
        {
            continue;
        }

        moves.push(Move::Castle { king, rook, side });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::startpos();
        assert_eq!(standard_moves(&pos).len(), 20);
    }

    #[test]
    fn pinned_piece_stays_on_ray() {
        // Knight on e4 is pinned by the rook on e8.
        let pos = Position::from_fen("4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let moves = standard_moves(&pos);
        assert!(moves
            .as_slice()
            .iter()
            .all(|m| m.from() != Some(Square::from_algebraic("e4").unwrap())));
    }

    #[test]
    fn check_must_be_addressed() {
        // White king checked by a rook on e8; interposition, capture, or
        // king move only.
        let pos = Position::from_fen("4r2k/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        let moves = standard_moves(&pos);
        for m in &moves {
            let after = pos.play(m);
            assert!(!after.board.check_of(chess_core::Color::White));
        }
    }

    #[test]
    fn double_check_only_king_moves() {
        // Rook e8 and bishop b4 both check the king on e1.
        let pos = Position::from_fen("4r2k/8/8/8/1b6/8/8/RN2K3 w - - 0 1").unwrap();
        let moves = standard_moves(&pos);
        assert!(!moves.is_empty());
        assert!(moves
            .as_slice()
            .iter()
            .all(|m| m.role() == Role::King));
    }

    #[test]
    fn en_passant_generated() {
        let pos = Position::from_fen("4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1").unwrap();
        let moves = standard_moves(&pos);
        assert!(moves
            .as_slice()
            .iter()
            .any(|m| matches!(m, Move::EnPassant { .. })));
    }

    #[test]
    fn en_passant_respects_discovered_check() {
        // Capturing en passant would expose the white king on the rank.
        let pos = Position::from_fen("4k3/8/8/KPp4r/8/8/8/8 w - c6 0 1").unwrap();
        let moves = standard_moves(&pos);
        assert!(moves
            .as_slice()
            .iter()
            .all(|m| !matches!(m, Move::EnPassant { .. })));
    }

    #[test]
    fn castling_both_sides() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let moves = standard_moves(&pos);
        let castles: Vec<_> = moves
            .as_slice()
            .iter()
            .filter_map(|m| m.castling_side())
            .collect();
        assert!(castles.contains(&CastlingSide::KingSide));
        assert!(castles.contains(&CastlingSide::QueenSide));
    }

    #[test]
    fn no_castling_through_attacked_square() {
        // Black rook on f8 covers f1.
        let pos =
            Position::from_fen("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = standard_moves(&pos);
        let castles: Vec<_> = moves
            .as_slice()
            .iter()
            .filter_map(|m| m.castling_side())
            .collect();
        assert!(!castles.contains(&CastlingSide::KingSide));
        assert!(castles.contains(&CastlingSide::QueenSide));
    }

    #[test]
    fn promotions_emit_four_moves() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let moves = standard_moves(&pos);
        let promotions = moves
            .as_slice()
            .iter()
            .filter(|m| m.is_promotion())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn drop_moves_require_pockets() {
        let pos = Position::startpos();
        assert!(drop_moves(&pos).is_empty());
    }
}
