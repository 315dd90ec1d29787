//! Core types for chess.
//!
//! This crate provides the fundamental types used across the rules library:
//! - [`Color`] and [`Role`] / [`Piece`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] as a tagged record covering normal moves, promotions,
//!   en passant, castling, and Crazyhouse drops
//! - Raw FEN field parsing and validation

mod castle;
mod color;
mod fen;
mod mov;
mod role;
mod square;

pub use castle::CastlingSide;
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::Move;
pub use role::{Piece, Role};
pub use square::{File, Rank, Square};
