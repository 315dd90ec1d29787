//! Chess rules with bitboard move generation, variants, SAN and PGN.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Board`] and [`Position`] - immutable placement and game state
//! - [`Variant`] - rule sets for Standard chess, Chess960, King of the
//!   Hill, Three-check, Antichess, Atomic, Horde, Racing Kings and
//!   Crazyhouse
//! - [`San`] and [`pgn`] - notation parsing with a replay engine
//! - [`Game`] - game management with repetition tracking
//!
//! # Architecture
//!
//! Positions are immutable values: [`Position::play`] returns the successor
//! position and leaves the original untouched, so replays, perft and search
//! can share snapshots freely. Move generation works from check geometry
//! (checkers, pinned pieces) rather than make-and-test filtering, and every
//! variant composes the same generation building blocks.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Position, Reader, Variant};
//!
//! let position = Position::startpos();
//! assert_eq!(position.legal_moves().len(), 20);
//!
//! let reading = Reader::full("1. e4 e5 2. Nf3 Nc6 *").unwrap();
//! assert!(reading.is_complete());
//!
//! let crazyhouse = Variant::Crazyhouse.initial_position();
//! assert!(crazyhouse.pockets.is_some());
//! ```

mod bitboard;
mod board;
mod castling;
mod game;
pub mod movegen;
pub mod pgn;
mod position;
pub mod replay;
pub mod san;
pub mod variant;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use castling::UnmovedRooks;
pub use game::{Game, GameError, GameMove};
pub use movegen::{
    aligned, between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks,
    ray, rook_attacks, MoveList,
};
pub use pgn::{parse_pgn, ParsedPgn, PgnError, Tags};
pub use position::{Pocket, Pockets, Position, PositionError, RemainingChecks};
pub use replay::{Reader, Reading, Replay, Step};
pub use san::{to_san, Metas, San, SanError, SanKind};
pub use variant::{
    chess960_random, chess960_start, DrawReason, Drop, DropError, GameResult, Variant,
};
