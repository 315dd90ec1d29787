//! Chess position representation.
//!
//! A [`Position`] is an immutable value: applying a move produces a new
//! position and never mutates the old one. Variant-specific state (pockets,
//! remaining checks, promoted-piece markers) travels with the position so
//! replay and repetition detection see everything that matters.

use crate::variant::Variant;
use crate::{Bitboard, Board, MoveList, UnmovedRooks};
use chess_core::{Color, Fen, FenError, File, Move, Piece, Rank, Role, Square};
use thiserror::Error;

/// Errors produced when building a position from external input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("board violates placement invariants")]
    InvalidBoard,

    #[error("side not to move is in check")]
    OppositeCheck,

    #[error("invalid en passant target")]
    InvalidEnPassant,
}

/// One color's Crazyhouse hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pocket {
    counts: [u8; 6],
}

impl Pocket {
    /// Returns how many pieces of the role are in hand.
    #[inline]
    pub fn count(&self, role: Role) -> u8 {
        self.counts[role.index()]
    }

    /// Adds a piece to the hand.
    #[inline]
    pub fn store(&mut self, role: Role) {
        self.counts[role.index()] = self.counts[role.index()].saturating_add(1);
    }

    /// Removes a piece from the hand; false if none was held.
    #[inline]
    pub fn take(&mut self, role: Role) -> bool {
        if self.counts[role.index()] == 0 {
            return false;
        }
        self.counts[role.index()] -= 1;
        true
    }

    /// Returns true if the hand is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&n| n == 0)
    }
}

/// Both Crazyhouse hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pockets {
    pub white: Pocket,
    pub black: Pocket,
}

impl Pockets {
    /// Returns the hand of a color.
    #[inline]
    pub fn pocket(&self, color: Color) -> &Pocket {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    #[inline]
    pub(crate) fn pocket_mut(&mut self, color: Color) -> &mut Pocket {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Builds pockets from a FEN pocket segment (e.g., "Qrr").
    pub fn from_fen_segment(segment: &str) -> Pockets {
        let mut pockets = Pockets::default();
        for piece in segment.chars().filter_map(Piece::from_fen_char) {
            pockets.pocket_mut(piece.color).store(piece.role);
        }
        pockets
    }

    /// Renders the FEN pocket segment (white pieces first).
    pub fn fen_segment(&self) -> String {
        let mut out = String::new();
        for color in Color::ALL {
            for role in Role::ALL {
                for _ in 0..self.pocket(color).count(role) {
                    out.push(Piece::new(color, role).to_fen_char());
                }
            }
        }
        out
    }
}

/// Checks each side may still deliver before winning (Three-check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemainingChecks {
    pub white: u8,
    pub black: u8,
}

impl Default for RemainingChecks {
    fn default() -> Self {
        RemainingChecks { white: 3, black: 3 }
    }
}

impl RemainingChecks {
    /// Returns the remaining checks for a color.
    #[inline]
    pub fn of(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn decrement(&mut self, color: Color) {
        match color {
            Color::White => self.white = self.white.saturating_sub(1),
            Color::Black => self.black = self.black.saturating_sub(1),
        }
    }
}

/// Complete game state for one ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Piece placement.
    pub board: Board,
    /// The side to move.
    pub turn: Color,
    /// Castling rights as unmoved rook squares.
    pub castling: UnmovedRooks,
    /// En passant target square, if the last move was a double push.
    pub en_passant: Option<Square>,
    /// Halfmove clock for the 50-move rule.
    pub halfmove_clock: u32,
    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,
    /// The rule set in effect.
    pub variant: Variant,
    /// Crazyhouse hands.
    pub pockets: Option<Pockets>,
    /// Three-check counters.
    pub remaining_checks: Option<RemainingChecks>,
    /// Squares holding promoted pieces (Crazyhouse capture demotion).
    pub promoted: Bitboard,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Position {
            board: Board::standard(),
            turn: Color::White,
            castling: UnmovedRooks::STANDARD,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            variant: Variant::Standard,
            pockets: None,
            remaining_checks: None,
            promoted: Bitboard::EMPTY,
        }
    }

    /// Creates a position from a FEN string under standard rules.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Self::from_fen_as(fen, Variant::Standard)
    }

    /// Creates a position from a FEN string under the given variant.
    pub fn from_fen_as(fen: &str, variant: Variant) -> Result<Self, PositionError> {
        let parsed = Fen::parse(fen)?;

        let mut board = Board::empty();
        let mut promoted = Bitboard::EMPTY;
        for (rank_idx, rank_str) in parsed.placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            let mut last = None;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as u8;
                    last = None;
                } else if c == '~' {
                    if let Some(sq) = last {
                        promoted.set(sq);
                    }
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                    board.set_piece_at(sq, piece);
                    last = Some(sq);
                    file += 1;
                }
            }
        }

        let turn = match parsed.active_color {
            'b' => Color::Black,
            _ => Color::White,
        };

        let castling = Self::castling_from_fen(&board, &parsed.castling);

        let en_passant = if parsed.en_passant == "-" {
            None
        } else {
            let sq = Square::from_algebraic(&parsed.en_passant)
                .ok_or(PositionError::InvalidEnPassant)?;
            let expected_rank = turn.fold(Rank::R6, Rank::R3);
            let pushed = Square::new(sq.file(), turn.fold(Rank::R5, Rank::R4));
            let valid = sq.rank() == expected_rank
                && board.piece_at(sq).is_none()
                && board.piece_at(pushed) == Some(Piece::new(turn.opposite(), Role::Pawn));
            if !valid {
                return Err(PositionError::InvalidEnPassant);
            }
            Some(sq)
        };

        let pockets = match &parsed.pocket {
            Some(segment) => Some(Pockets::from_fen_segment(segment)),
            None if variant == Variant::Crazyhouse => Some(Pockets::default()),
            None => None,
        };

        let remaining_checks = match parsed.remaining_checks {
            Some((white, black)) => Some(RemainingChecks { white, black }),
            None if variant == Variant::ThreeCheck => Some(RemainingChecks::default()),
            None => None,
        };

        let pos = Position {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
            variant,
            pockets,
            remaining_checks,
            promoted,
        };
        pos.validate()?;
        Ok(pos)
    }

    fn castling_from_fen(board: &Board, field: &str) -> UnmovedRooks {
        let mut castling = UnmovedRooks::EMPTY;
        for c in field.chars() {
            if c == '-' {
                continue;
            }
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let back = color.back_rank();
            let rooks = board.pieces(color, Role::Rook) & Bitboard::rank(back);
            let king_file = board.king_of(color).map(|k| k.file());

            let square = match c.to_ascii_lowercase() {
                'k' => rooks
                    .into_iter()
                    .filter(|sq| king_file.map_or(true, |kf| sq.file() > kf))
                    .last(),
                'q' => rooks
                    .into_iter()
                    .find(|sq| king_file.map_or(true, |kf| sq.file() < kf)),
                file_char => File::from_char(file_char).and_then(|f| {
                    let sq = Square::new(f, back);
                    rooks.contains(sq).then_some(sq)
                }),
            };
            if let Some(sq) = square {
                castling.add(sq);
            }
        }
        castling
    }

    /// Validates construction invariants for the variant.
    fn validate(&self) -> Result<(), PositionError> {
        if !self.variant.valid(&self.board, true) {
            return Err(PositionError::InvalidBoard);
        }
        // The player who just moved must not have left a capturable king.
        // Atomic kings standing next to each other shield one another.
        if self.variant.has_royal_king() {
            let them = self.turn.opposite();
            if let Some(their_king) = self.board.king_of(them) {
                let attacked = self
                    .board
                    .attackers(their_king, self.turn, self.board.occupied())
                    .is_not_empty();
                let shielded = self.variant == Variant::Atomic
                    && (crate::movegen::king_attacks(their_king)
                        & self.board.pieces(self.turn, Role::King))
                    .is_not_empty();
                if attacked && !shielded {
                    return Err(PositionError::OppositeCheck);
                }
            }
        }
        Ok(())
    }

    /// Renders the position as a FEN string. All six standard fields are
    /// emitted; pockets and remaining checks only when present.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8u8).rev() {
            let mut empty_run = 0;
            for file in 0..8u8 {
                let sq = unsafe { Square::from_index_unchecked(rank * 8 + file) };
                match self.board.piece_at(sq) {
                    Some(piece) => {
                        if empty_run > 0 {
                            fen.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        fen.push(piece.to_fen_char());
                        if self.promoted.contains(sq) {
                            fen.push('~');
                        }
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        if let Some(pockets) = &self.pockets {
            fen.push('[');
            fen.push_str(&pockets.fen_segment());
            fen.push(']');
        }

        fen.push(' ');
        fen.push(self.turn.fold('w', 'b'));

        fen.push(' ');
        fen.push_str(&self.castling_fen());

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        if let Some(checks) = self.remaining_checks {
            fen.push_str(&format!(" {}+{}", checks.white, checks.black));
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));
        fen
    }

    fn castling_fen(&self) -> String {
        // Chess960 positions keep Shredder file letters; otherwise corner
        // rooks render as the classical KQkq tokens.
        let letters = self.variant == Variant::Chess960;
        let mut out = String::new();
        for color in Color::ALL {
            // Kingside rights first, east to west.
            let mut ordered: Vec<Square> = self.castling.on_back_rank(color).into_iter().collect();
            ordered.sort_by_key(|sq| std::cmp::Reverse(sq.file()));
            for sq in ordered {
                let c = match sq.file() {
                    File::H if !letters => 'K',
                    File::A if !letters => 'Q',
                    file => file.to_char().to_ascii_uppercase(),
                };
                out.push(color.fold(c, c.to_ascii_lowercase()));
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    /// Returns the pieces of the side to move.
    #[inline]
    pub fn us(&self) -> Bitboard {
        self.board.by_color(self.turn)
    }

    /// Returns the opponent's pieces.
    #[inline]
    pub fn them(&self) -> Bitboard {
        self.board.by_color(self.turn.opposite())
    }

    /// Returns the side to move's pieces of a role.
    #[inline]
    pub fn our(&self, role: Role) -> Bitboard {
        self.board.pieces(self.turn, role)
    }

    /// Returns the opponent's pieces of a role.
    #[inline]
    pub fn their(&self, role: Role) -> Bitboard {
        self.board.pieces(self.turn.opposite(), role)
    }

    /// Returns the enemy pieces currently attacking our king.
    pub fn checkers(&self) -> Bitboard {
        match self.board.king_of(self.turn) {
            Some(king) => self
                .board
                .attackers(king, self.turn.opposite(), self.board.occupied()),
            None => Bitboard::EMPTY,
        }
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.variant.is_check(self)
    }

    /// Returns all legal moves under the variant's rules.
    pub fn legal_moves(&self) -> MoveList {
        self.variant.legal_moves(self)
    }

    /// Returns the game result decidable from this position alone, if any.
    pub fn outcome(&self) -> Option<crate::variant::GameResult> {
        self.variant.outcome(self)
    }

    /// Returns true if a double pawn push may start from this rank.
    pub(crate) fn double_push_rank(&self, rank: Rank) -> bool {
        rank == self.turn.second_rank()
            || (self.variant == Variant::Horde && rank == self.turn.back_rank())
    }

    /// Applies a legal move, producing the successor position.
    ///
    /// The move must come from [`legal_moves`](Position::legal_moves);
    /// applying an illegal move gives an unspecified (but non-panicking)
    /// result.
    pub fn play(&self, m: &Move) -> Position {
        let mut pos = self.clone();
        let us = self.turn;
        pos.en_passant = None;

        match *m {
            Move::Normal {
                role,
                from,
                capture,
                to,
            } => {
                if let Some(captured) = capture {
                    pos.capture_at(us, to, captured);
                }
                pos.board.discard_piece_at(from);
                pos.board.set_piece_at(to, Piece::new(us, role));
                if pos.promoted.contains(from) {
                    pos.promoted.clear(from);
                    pos.promoted.set(to);
                }

                if role == Role::Pawn {
                    let distance = (to.index() as i8 - from.index() as i8).abs();
                    if distance == 16 {
                        pos.en_passant = from.offset(8 * us.pawn_direction());
                    }
                }
                if role == Role::King {
                    pos.castling.discard_color(us);
                }
                pos.castling.discard(from);
                pos.castling.discard(to);
            }
            Move::Promotion {
                from,
                capture,
                to,
                promotion,
            } => {
                if let Some(captured) = capture {
                    pos.capture_at(us, to, captured);
                }
                pos.board.discard_piece_at(from);
                pos.board.set_piece_at(to, Piece::new(us, promotion));
                if pos.pockets.is_some() {
                    pos.promoted.set(to);
                }
                pos.castling.discard(to);
            }
            Move::EnPassant { from, to } => {
                let captured_sq = Square::new(to.file(), from.rank());
                pos.capture_at(us, captured_sq, Role::Pawn);
                pos.board.discard_piece_at(from);
                pos.board.set_piece_at(to, Piece::new(us, Role::Pawn));
            }
            Move::Castle { king, rook, side } => {
                pos.board.discard_piece_at(king);
                pos.board.discard_piece_at(rook);
                pos.board
                    .set_piece_at(Square::new(side.king_to_file(), king.rank()), Piece::new(us, Role::King));
                pos.board
                    .set_piece_at(Square::new(side.rook_to_file(), rook.rank()), Piece::new(us, Role::Rook));
                pos.castling.discard_color(us);
            }
            Move::Put { role, to } => {
                if let Some(pockets) = pos.pockets.as_mut() {
                    pockets.pocket_mut(us).take(role);
                }
                pos.board.set_piece_at(to, Piece::new(us, role));
            }
        }

        // Variant board transformation (the Atomic explosion), then drop
        // promotion markers and castling rights whose piece is gone.
        if m.is_capture() {
            pos.board = self.variant.finalize_board(pos.board, m, m.capture());
            pos.promoted &= pos.board.occupied();
            pos.castling =
                UnmovedRooks::new(pos.castling.squares() & pos.board.by_role(Role::Rook));
        }

        pos.halfmove_clock = if m.is_zeroing() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if us == Color::Black {
            pos.fullmove_number += 1;
        }
        pos.turn = us.opposite();

        // Three-check: a delivered check burns one of the mover's counters.
        if pos.remaining_checks.is_some() && pos.is_check() {
            if let Some(checks) = pos.remaining_checks.as_mut() {
                checks.decrement(us);
            }
        }

        pos
    }

    /// Removes a captured piece, feeding the capturer's pocket when playing
    /// Crazyhouse (promoted pieces revert to pawns).
    fn capture_at(&mut self, us: Color, sq: Square, captured: Role) {
        let demoted = if self.promoted.contains(sq) {
            Role::Pawn
        } else {
            captured
        };
        self.board.discard_piece_at(sq);
        self.promoted.clear(sq);
        if let Some(pockets) = self.pockets.as_mut() {
            pockets.pocket_mut(us).store(demoted);
        }
    }

    /// Finds the legal move matching a UCI string.
    ///
    /// Castling is accepted in both encodings: king-to-rook (Chess960) and
    /// king-to-final-square. Drops use the `Q@e4` form.
    pub fn parse_uci(&self, uci: &str) -> Option<Move> {
        let legal = self.legal_moves();

        if let Some((role_part, dest)) = uci.split_once('@') {
            let role = Role::from_char(role_part.chars().next()?)?;
            let to = Square::from_algebraic(dest)?;
            return legal
                .into_iter()
                .find(|m| matches!(m, Move::Put { role: r, to: t } if *r == role && *t == to));
        }

        if uci.len() < 4 || uci.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&uci[0..2])?;
        let to = Square::from_algebraic(&uci[2..4])?;
        let promotion = match uci.len() {
            5 => Some(Role::from_char(uci.chars().nth(4)?)?),
            _ => None,
        };

        legal.into_iter().find(|m| match *m {
            Move::Castle { king, rook, side } => {
                promotion.is_none()
                    && from == king
                    && (to == rook || to == Square::new(side.king_to_file(), king.rank()))
            }
            Move::Promotion {
                from: f,
                to: t,
                promotion: p,
                ..
            } => f == from && t == to && Some(p) == promotion,
            Move::Normal { from: f, to: t, .. } | Move::EnPassant { from: f, to: t } => {
                f == from && t == to && promotion.is_none()
            }
            Move::Put { .. } => false,
        })
    }

    /// Returns the Zobrist hash of the position.
    pub fn zobrist_hash(&self) -> u64 {
        crate::zobrist::hash(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
