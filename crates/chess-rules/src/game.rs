//! Full game management with history tracking.
//!
//! [`Game`] wraps a [`Position`] with the state a single position cannot
//! carry: hashes of every visited position for repetition detection, the
//! move list with SAN notation, and draw claiming.

use crate::san::{to_san, San, SanError};
use crate::variant::{DrawReason, GameResult, Variant};
use crate::{MoveList, Position, PositionError};
use chess_core::Move;
use std::fmt;

/// A recorded move in game history.
#[derive(Debug, Clone)]
pub struct GameMove {
    /// The move in internal format.
    pub mov: Move,
    /// SAN notation for the move.
    pub san: String,
}

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// The move is not legal in the current position.
    IllegalMove(String),
    /// The SAN string could not be parsed or resolved.
    InvalidSan(SanError),
    /// The game has already ended.
    GameAlreadyOver,
    /// Draw-claim conditions are not met.
    CannotClaimDraw,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::IllegalMove(s) => write!(f, "illegal move: {}", s),
            GameError::InvalidSan(e) => write!(f, "invalid SAN: {}", e),
            GameError::GameAlreadyOver => write!(f, "game has already ended"),
            GameError::CannotClaimDraw => write!(f, "cannot claim draw: conditions not met"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<SanError> for GameError {
    fn from(e: SanError) -> Self {
        GameError::InvalidSan(e)
    }
}

/// A complete game with history tracking.
#[derive(Debug, Clone)]
pub struct Game {
    /// Current position.
    position: Position,
    /// Zobrist hashes of every position seen, the current one included.
    history: Vec<u64>,
    /// Move history with SAN notation.
    moves: Vec<GameMove>,
    /// Starting position.
    start: Position,
    /// Game result once the game has ended.
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new standard game.
    pub fn new() -> Self {
        Self::initial(Variant::Standard)
    }

    /// Creates a new game of the given variant.
    pub fn initial(variant: Variant) -> Self {
        Self::from_position(variant.initial_position())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        let hash = position.zobrist_hash();
        let mut game = Game {
            position: position.clone(),
            history: vec![hash],
            moves: Vec::new(),
            start: position,
            result: None,
        };
        game.check_game_end();
        game
    }

    /// Creates a game from a FEN string under the given variant.
    pub fn from_fen_as(fen: &str, variant: Variant) -> Result<Self, PositionError> {
        Ok(Self::from_position(Position::from_fen_as(fen, variant)?))
    }

    /// Creates a standard game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Self::from_fen_as(fen, Variant::Standard)
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the starting position.
    pub fn start_position(&self) -> &Position {
        &self.start
    }

    /// Returns all legal moves in the current position.
    pub fn legal_moves(&self) -> MoveList {
        self.position.legal_moves()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// Returns the move history.
    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    /// Returns the number of half-moves played.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Plays a move in internal format.
    pub fn play(&mut self, m: Move) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        if !self.legal_moves().contains(&m) {
            return Err(GameError::IllegalMove(
                m.to_uci(self.position.variant == Variant::Chess960),
            ));
        }
        self.apply(m);
        Ok(())
    }

    /// Plays a move given in SAN.
    pub fn play_san(&mut self, san: &str) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        let m = San::parse(san)?.to_move(&self.position)?;
        self.apply(m);
        Ok(())
    }

    /// Plays a move given in UCI.
    pub fn play_uci(&mut self, uci: &str) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        let m = self
            .position
            .parse_uci(uci)
            .ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        self.apply(m);
        Ok(())
    }

    fn apply(&mut self, m: Move) {
        let san = to_san(&self.position, &m);
        self.moves.push(GameMove { mov: m, san });
        self.position = self.position.play(&m);
        self.history.push(self.position.zobrist_hash());
        self.check_game_end();
    }

    fn check_game_end(&mut self) {
        // Fivefold repetition ends the game without a claim.
        if self.position_count() >= 5 {
            self.result = Some(GameResult::Draw(DrawReason::FivefoldRepetition));
            return;
        }
        self.result = self.position.outcome();
    }

    /// Counts how many times the current position has occurred.
    pub fn position_count(&self) -> usize {
        let current = self.position.zobrist_hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Returns true if a draw can be claimed (threefold repetition, or the
    /// 50-move rule outside Crazyhouse).
    pub fn can_claim_draw(&self) -> bool {
        if self.result.is_some() {
            return false;
        }
        if self.position_count() >= 3 {
            return true;
        }
        self.position.variant != Variant::Crazyhouse && self.position.halfmove_clock >= 100
    }

    /// Claims a draw if the conditions are met.
    pub fn claim_draw(&mut self) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        if self.position_count() >= 3 {
            self.result = Some(GameResult::Draw(DrawReason::ThreefoldRepetition));
            return Ok(());
        }
        if self.position.variant != Variant::Crazyhouse && self.position.halfmove_clock >= 100 {
            self.result = Some(GameResult::Draw(DrawReason::FiftyMoveRule));
            return Ok(());
        }
        Err(GameError::CannotClaimDraw)
    }

    /// Ends the game as a draw by agreement.
    pub fn agree_draw(&mut self) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        self.result = Some(GameResult::Draw(DrawReason::Agreement));
        Ok(())
    }

    /// Resigns the game for the side to move.
    pub fn resign(&mut self) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        self.result = Some(GameResult::win(self.position.turn.opposite()));
        Ok(())
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }
}
