//! Rule sets for chess variants.
//!
//! Variants are a closed tagged union dispatched by `match`, not a trait
//! hierarchy: every rule override lives in one of the arms below, and the
//! shared baseline comes from the movegen building blocks.

use crate::movegen::{drop_moves, king_attacks, pseudo_moves, standard_moves, MoveList};
use crate::{Bitboard, Board, Pockets, Position, RemainingChecks, UnmovedRooks};
use chess_core::{Color, Move, Rank, Role, Square};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The hill squares for King of the Hill (d4, d5, e4, e5).
const CENTER: Bitboard = Bitboard(0x0000_0018_1800_0000);

const HORDE_FEN: &str = "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1";
const RACING_KINGS_FEN: &str = "8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1";

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// White wins.
    WhiteWins,
    /// Black wins.
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    /// The win for the given color.
    #[inline]
    pub const fn win(color: Color) -> GameResult {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// Returns the winner, if decisive.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw(_) => None,
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    /// Neither side can win by any series of legal moves.
    InsufficientMaterial,
    /// 50-move rule (100 half-moves without pawn move or capture) - claimable.
    FiftyMoveRule,
    /// 75-move rule (150 half-moves) - automatic.
    SeventyFiveMoveRule,
    /// Threefold repetition - claimable.
    ThreefoldRepetition,
    /// Fivefold repetition - automatic.
    FivefoldRepetition,
    /// Draw by agreement.
    Agreement,
    /// A variant-specific drawing rule (e.g. both kings reach rank 8 in
    /// Racing Kings).
    VariantEnd,
}

/// A validated Crazyhouse drop with the position it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    pub role: Role,
    pub to: Square,
    pub position: Position,
}

/// Reasons a drop can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DropError {
    #[error("variant has no pockets")]
    NoPockets,
    #[error("no {0} in pocket")]
    EmptyPocket(Role),
    #[error("drop square is occupied")]
    Occupied,
    #[error("pawns may not be dropped on the back ranks")]
    PawnOnBackRank,
    #[error("drop would leave the king in check")]
    SelfCheck,
}

/// The supported rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Standard,
    Chess960,
    KingOfTheHill,
    ThreeCheck,
    Antichess,
    Atomic,
    Horde,
    RacingKings,
    Crazyhouse,
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Standard
    }
}

impl Variant {
    /// All variants in order.
    pub const ALL: [Variant; 9] = [
        Variant::Standard,
        Variant::Chess960,
        Variant::KingOfTheHill,
        Variant::ThreeCheck,
        Variant::Antichess,
        Variant::Atomic,
        Variant::Horde,
        Variant::RacingKings,
        Variant::Crazyhouse,
    ];

    /// The canonical key for this variant.
    pub const fn key(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Chess960 => "chess960",
            Variant::KingOfTheHill => "kingOfTheHill",
            Variant::ThreeCheck => "threeCheck",
            Variant::Antichess => "antichess",
            Variant::Atomic => "atomic",
            Variant::Horde => "horde",
            Variant::RacingKings => "racingKings",
            Variant::Crazyhouse => "crazyhouse",
        }
    }

    /// Looks up a variant by key, tolerating case, spaces and dashes
    /// (e.g. "Three-check", "racingkings", "King of the Hill").
    pub fn from_key(key: &str) -> Option<Variant> {
        let normalized: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "standard" | "chess" | "fromposition" => Some(Variant::Standard),
            "chess960" | "fischerandom" | "fischerrandom" => Some(Variant::Chess960),
            "kingofthehill" | "koth" => Some(Variant::KingOfTheHill),
            "threecheck" | "3check" => Some(Variant::ThreeCheck),
            "antichess" | "giveaway" | "suicide" => Some(Variant::Antichess),
            "atomic" => Some(Variant::Atomic),
            "horde" => Some(Variant::Horde),
            "racingkings" => Some(Variant::RacingKings),
            "crazyhouse" => Some(Variant::Crazyhouse),
            _ => None,
        }
    }

    /// Returns the initial position for this variant.
    pub fn initial_position(self) -> Position {
        match self {
            Variant::Horde => {
                Position::from_fen_as(HORDE_FEN, self).expect("initial FEN is valid")
            }
            Variant::RacingKings => {
                Position::from_fen_as(RACING_KINGS_FEN, self).expect("initial FEN is valid")
            }
            _ => {
                let mut pos = Position::startpos();
                pos.variant = self;
                match self {
                    Variant::Crazyhouse => pos.pockets = Some(Pockets::default()),
                    Variant::ThreeCheck => {
                        pos.remaining_checks = Some(RemainingChecks::default())
                    }
                    Variant::Antichess => pos.castling = UnmovedRooks::EMPTY,
                    _ => {}
                }
                pos
            }
        }
    }

    /// Returns true if the variant's king is royal (check applies).
    pub(crate) const fn has_royal_king(self) -> bool {
        !matches!(self, Variant::Antichess)
    }

    /// Returns true if the side to move is in check under this variant's
    /// rules.
    pub fn is_check(self, pos: &Position) -> bool {
        match self {
            Variant::Antichess => false,
            Variant::Atomic => atomic_check(&pos.board, pos.turn),
            _ => pos.checkers().is_not_empty(),
        }
    }

    /// Generates all legal moves.
    pub fn legal_moves(self, pos: &Position) -> MoveList {
        match self {
            Variant::Antichess => antichess_moves(pos),
            Variant::Atomic => atomic_moves(pos),
            Variant::RacingKings => racing_kings_moves(pos),
            Variant::Crazyhouse => {
                let mut moves = standard_moves(pos);
                moves.extend(drop_moves(pos));
                moves
            }
            _ => standard_moves(pos),
        }
    }

    /// Validates and performs a pocket drop.
    pub fn drop(self, pos: &Position, role: Role, to: Square) -> Result<Drop, DropError> {
        let Some(pockets) = &pos.pockets else {
            return Err(DropError::NoPockets);
        };
        if pockets.pocket(pos.turn).count(role) == 0 {
            return Err(DropError::EmptyPocket(role));
        }
        if pos.board.occupied().contains(to) {
            return Err(DropError::Occupied);
        }
        if role == Role::Pawn && matches!(to.rank(), Rank::R1 | Rank::R8) {
            return Err(DropError::PawnOnBackRank);
        }
        let m = Move::Put { role, to };
        if !drop_moves(pos).contains(&m) {
            return Err(DropError::SelfCheck);
        }
        Ok(Drop {
            role,
            to,
            position: pos.play(&m),
        })
    }

    /// Applies the variant's board transformation after a move: the Atomic
    /// explosion. Every other variant leaves the board as-is; Crazyhouse
    /// pocket accumulation happens at the position level where hands live.
    pub fn finalize_board(self, mut board: Board, m: &Move, captured: Option<Role>) -> Board {
        if self != Variant::Atomic || captured.is_none() {
            return board;
        }
        let center = m.to();
        board.discard_piece_at(center);
        for sq in king_attacks(center) {
            if let Some(piece) = board.piece_at(sq) {
                if piece.role != Role::Pawn {
                    board.discard_piece_at(sq);
                }
            }
        }
        board
    }

    /// Checks whether a board is acceptable for this variant.
    pub fn valid(self, board: &Board, strict: bool) -> bool {
        match self {
            Variant::Antichess => board.is_valid(false),
            Variant::Horde => {
                board.is_valid(false)
                    && board.pieces(Color::White, Role::King).is_empty()
                    && board.pieces(Color::Black, Role::King).count() == 1
                    && (board.pieces(Color::White, Role::Pawn) & Bitboard::RANK_8).is_empty()
                    && (board.pieces(Color::Black, Role::Pawn) & Bitboard::RANK_1).is_empty()
            }
            _ => board.is_valid(strict),
        }
    }

    /// Checkmate under this variant's rules.
    pub fn is_checkmate(self, pos: &Position) -> bool {
        self.is_check(pos) && self.legal_moves(pos).is_empty()
    }

    /// Stalemate: no legal moves while not in check.
    pub fn is_stalemate(self, pos: &Position) -> bool {
        !self.is_check(pos) && self.legal_moves(pos).is_empty()
    }

    /// Returns true if neither side can win by any series of legal moves.
    pub fn is_insufficient_material(self, pos: &Position) -> bool {
        match self {
            // Pockets make any material sufficient.
            Variant::Crazyhouse => false,
            // A bare king can still race, reach the hill, or be fed checks.
            Variant::RacingKings | Variant::KingOfTheHill | Variant::Horde => false,
            // Antichess zugzwang endings depend on move parity; deciding
            // them is out of reach of a material count.
            Variant::Antichess => false,
            Variant::ThreeCheck => {
                pos.board.occupied() == pos.board.by_role(Role::King)
            }
            Variant::Atomic => atomic_insufficient(&pos.board),
            _ => standard_insufficient(&pos.board),
        }
    }

    /// Variant-specific game ends that override checkmate and stalemate.
    pub fn special_end(self, pos: &Position) -> Option<GameResult> {
        match self {
            Variant::KingOfTheHill => {
                for color in Color::ALL {
                    if (pos.board.pieces(color, Role::King) & CENTER).is_not_empty() {
                        return Some(GameResult::win(color));
                    }
                }
                None
            }
            Variant::ThreeCheck => {
                let checks = pos.remaining_checks?;
                for color in Color::ALL {
                    if checks.of(color) == 0 {
                        return Some(GameResult::win(color));
                    }
                }
                None
            }
            Variant::Atomic => {
                for color in Color::ALL {
                    if pos.board.pieces(color, Role::King).is_empty() {
                        return Some(GameResult::win(color.opposite()));
                    }
                }
                None
            }
            Variant::Horde => {
                if pos.board.by_color(Color::White).is_empty() {
                    Some(GameResult::BlackWins)
                } else {
                    None
                }
            }
            Variant::Antichess => {
                for color in Color::ALL {
                    if pos.board.by_color(color).is_empty() {
                        return Some(GameResult::win(color));
                    }
                }
                None
            }
            Variant::RacingKings => racing_kings_end(pos),
            _ => None,
        }
    }

    /// Variant draw rules beyond stalemate and material.
    pub fn special_draw(self, pos: &Position) -> bool {
        matches!(
            self.special_end(pos),
            Some(GameResult::Draw(DrawReason::VariantEnd))
        )
    }

    /// Returns the game result decidable from the position alone, if the
    /// game is over. Repetition draws need history and live in `Game`.
    pub fn outcome(self, pos: &Position) -> Option<GameResult> {
        if let Some(end) = self.special_end(pos) {
            return Some(end);
        }

        // 75-move rule; Crazyhouse plays without move-count draws.
        if self != Variant::Crazyhouse && pos.halfmove_clock >= 150 {
            return Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule));
        }

        if self.is_insufficient_material(pos) {
            return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
        }

        if self.legal_moves(pos).is_empty() {
            return Some(match self {
                // The stalemated (or bare) side wins.
                Variant::Antichess => GameResult::win(pos.turn),
                // Racing Kings never ends by checkmate; a blocked king draws.
                Variant::RacingKings => GameResult::Draw(DrawReason::Stalemate),
                _ => {
                    if self.is_check(pos) {
                        GameResult::win(pos.turn.opposite())
                    } else {
                        GameResult::Draw(DrawReason::Stalemate)
                    }
                }
            });
        }

        None
    }
}

/// Atomic check: adjacent kings shield each other, otherwise orthodox.
fn atomic_check(board: &Board, color: Color) -> bool {
    match board.king_of(color) {
        Some(king) => {
            let them = color.opposite();
            if (king_attacks(king) & board.pieces(them, Role::King)).is_not_empty() {
                return false;
            }
            board.attackers(king, them, board.occupied()).is_not_empty()
        }
        None => false,
    }
}

fn antichess_moves(pos: &Position) -> MoveList {
    const PROMOTIONS: [Role; 5] = [
        Role::Queen,
        Role::Rook,
        Role::Bishop,
        Role::Knight,
        Role::King,
    ];
    let mut moves = pseudo_moves(pos, &PROMOTIONS, false);
    if moves.as_slice().iter().any(Move::is_capture) {
        moves.retain(Move::is_capture);
    }
    moves
}

fn atomic_moves(pos: &Position) -> MoveList {
    let us = pos.turn;
    let mut moves = pseudo_moves(pos, &Role::PROMOTABLE, true);
    moves.retain(|m| {
        let after = pos.play(m);
        if after.board.king_of(us).is_none() {
            // Exploding the own king is never allowed.
            return false;
        }
        if after.board.king_of(us.opposite()).is_none() {
            // Exploding the enemy king wins regardless of checks.
            return true;
        }
        !atomic_check(&after.board, us)
    });
    moves
}

fn racing_kings_moves(pos: &Position) -> MoveList {
    let them = pos.turn.opposite();
    let mut moves = standard_moves(pos);
    // No checks are permitted at any time, by either side.
    moves.retain(|m| !pos.play(m).board.check_of(them));
    moves
}

fn racing_kings_end(pos: &Position) -> Option<GameResult> {
    let white_done =
        (pos.board.pieces(Color::White, Role::King) & Bitboard::RANK_8).is_not_empty();
    let black_done =
        (pos.board.pieces(Color::Black, Role::King) & Bitboard::RANK_8).is_not_empty();

    match (white_done, black_done) {
        (true, true) => Some(GameResult::Draw(DrawReason::VariantEnd)),
        (false, true) => Some(GameResult::BlackWins),
        (true, false) => {
            // Black gets one move to equalize after White reaches the goal.
            if pos.turn == Color::Black && black_can_reach_goal(pos) {
                None
            } else {
                Some(GameResult::WhiteWins)
            }
        }
        (false, false) => None,
    }
}

fn black_can_reach_goal(pos: &Position) -> bool {
    pos.legal_moves()
        .as_slice()
        .iter()
        .any(|m| m.role() == Role::King && m.to().rank() == Rank::R8)
}

/// Standard insufficient material: bare kings, a lone minor, or same-color
/// bishops.
fn standard_insufficient(board: &Board) -> bool {
    let heavy = board.by_role(Role::Pawn) | board.by_role(Role::Rook) | board.by_role(Role::Queen);
    if heavy.is_not_empty() {
        return false;
    }

    let knights = board.by_role(Role::Knight);
    let bishops = board.by_role(Role::Bishop);

    if (knights | bishops).count() <= 1 {
        return true;
    }

    // Any number of bishops all on one square color cannot mate.
    if knights.is_empty() {
        let on_light = bishops & Bitboard::LIGHT_SQUARES;
        let on_dark = bishops & Bitboard::DARK_SQUARES;
        if on_light.is_empty() || on_dark.is_empty() {
            return true;
        }
    }

    false
}

/// In Atomic a lone minor piece cannot force the winning explosion either.
fn atomic_insufficient(board: &Board) -> bool {
    let heavy = board.by_role(Role::Pawn) | board.by_role(Role::Rook) | board.by_role(Role::Queen);
    if heavy.is_not_empty() {
        return false;
    }
    let minors = board.by_role(Role::Knight) | board.by_role(Role::Bishop);
    minors.count() <= 1
}

/// Builds the Chess960 starting position with the given Scharnagl number
/// (0-959). Number 518 is the classical arrangement.
pub fn chess960_start(n: usize) -> Option<Position> {
    if n < 960 {
        Some(scharnagl(n))
    } else {
        None
    }
}

/// Picks a random Chess960 starting position.
pub fn chess960_random<R: Rng + ?Sized>(rng: &mut R) -> Position {
    scharnagl(rng.gen_range(0..960))
}

fn scharnagl(n: usize) -> Position {
    let mut back_rank = [None::<Role>; 8];

    let light_bishop = 2 * (n % 4) + 1;
    let rest = n / 4;
    let dark_bishop = 2 * (rest % 4);
    let rest = rest / 4;
    back_rank[light_bishop] = Some(Role::Bishop);
    back_rank[dark_bishop] = Some(Role::Bishop);

    // Queen goes on the n-th remaining file.
    let queen_index = rest % 6;
    let rest = rest / 6;
    let mut free = 0;
    for slot in back_rank.iter_mut() {
        if slot.is_none() {
            if free == queen_index {
                *slot = Some(Role::Queen);
                break;
            }
            free += 1;
        }
    }

    // Knights by combination index over the five remaining files.
    const KNIGHT_PAIRS: [(usize, usize); 10] = [
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, 2),
        (1, 3),
        (1, 4),
        (2, 3),
        (2, 4),
        (3, 4),
    ];
    let (first, second) = KNIGHT_PAIRS[rest % 10];
    let mut free = 0;
    for slot in back_rank.iter_mut() {
        if slot.is_none() {
            if free == first || free == second {
                *slot = Some(Role::Knight);
            }
            free += 1;
        }
    }

    // The remaining files take rook, king, rook.
    let mut order = [Role::Rook, Role::King, Role::Rook].into_iter();
    for slot in back_rank.iter_mut() {
        if slot.is_none() {
            *slot = order.next();
        }
    }

    let mut board = Board::empty();
    let mut castling = UnmovedRooks::EMPTY;
    for (file_idx, role) in back_rank.iter().enumerate() {
        let role = role.unwrap_or(Role::Rook);
        let file = file_idx as u8;
        let white_sq = unsafe { Square::from_index_unchecked(file) };
        let black_sq = unsafe { Square::from_index_unchecked(56 + file) };
        board.set_piece_at(white_sq, chess_core::Piece::new(Color::White, role));
        board.set_piece_at(black_sq, chess_core::Piece::new(Color::Black, role));
        if role == Role::Rook {
            castling.add(white_sq);
            castling.add(black_sq);
        }
        board.set_piece_at(
            unsafe { Square::from_index_unchecked(8 + file) },
            chess_core::Piece::new(Color::White, Role::Pawn),
        );
        board.set_piece_at(
            unsafe { Square::from_index_unchecked(48 + file) },
            chess_core::Piece::new(Color::Black, Role::Pawn),
        );
    }

    Position {
        board,
        turn: Color::White,
        castling,
        en_passant: None,
        halfmove_clock: 0,
        fullmove_number: 1,
        variant: Variant::Chess960,
        pockets: None,
        remaining_checks: None,
        promoted: Bitboard::EMPTY,
    }
}
