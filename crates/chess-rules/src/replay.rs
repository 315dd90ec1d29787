//! Replaying parsed games against the move engine.
//!
//! The replay is a left fold: each SAN node is resolved against the current
//! position and applied, producing a chain of value snapshots. Resolution
//! failure is a recovery point, not a fatal error: everything that did
//! apply is preserved.

use crate::pgn::{parse_pgn, ParsedPgn, PgnError};
use crate::san::San;
use crate::variant::Variant;
use crate::Position;
use chess_core::Move;

/// One applied move and the position it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub mov: Move,
    pub position: Position,
}

/// An applied move sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// The position the game started from.
    pub initial: Position,
    /// Moves in order, each with the position after it.
    pub steps: Vec<Step>,
}

impl Replay {
    /// Creates an empty replay.
    pub fn new(initial: Position) -> Self {
        Replay {
            initial,
            steps: Vec::new(),
        }
    }

    /// Returns the position after the last applied move.
    pub fn last_position(&self) -> &Position {
        self.steps
            .last()
            .map(|step| &step.position)
            .unwrap_or(&self.initial)
    }

    /// Returns the number of applied moves.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no move was applied.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The outcome of a replay attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// All tokens applied.
    Complete(Replay),
    /// Replay stopped early; the error names the offending token.
    Incomplete(Replay, String),
}

impl Reading {
    /// Returns the replay regardless of completeness.
    pub fn replay(&self) -> &Replay {
        match self {
            Reading::Complete(replay) | Reading::Incomplete(replay, _) => replay,
        }
    }

    /// Returns true if every token applied.
    pub fn is_complete(&self) -> bool {
        matches!(self, Reading::Complete(_))
    }
}

/// Folds SAN nodes over a starting position.
pub fn replay_sans(initial: Position, sans: &[San]) -> Reading {
    let mut replay = Replay::new(initial.clone());
    let mut position = initial;

    for san in sans {
        match san.to_move(&position) {
            Ok(mov) => {
                let next = position.play(&mov);
                replay.steps.push(Step {
                    mov,
                    position: next.clone(),
                });
                position = next;
            }
            Err(err) => return Reading::Incomplete(replay, err.to_string()),
        }
    }

    Reading::Complete(replay)
}

/// Parses and replays complete PGN games.
pub struct Reader;

impl Reader {
    /// Parses a PGN string and replays its mainline. The `Variant` and
    /// `FEN` tags select the rule set and starting position.
    pub fn full(pgn: &str) -> Result<Reading, PgnError> {
        let parsed = parse_pgn(pgn)?;
        Ok(Self::replay_parsed(&parsed))
    }

    /// Replays an already-parsed game.
    pub fn replay_parsed(parsed: &ParsedPgn) -> Reading {
        let variant = parsed
            .tags
            .get("Variant")
            .and_then(Variant::from_key)
            .unwrap_or_default();

        let initial = match parsed.tags.get("FEN") {
            Some(fen) => match Position::from_fen_as(fen, variant) {
                Ok(position) => position,
                Err(err) => {
                    return Reading::Incomplete(
                        Replay::new(variant.initial_position()),
                        format!("invalid FEN tag: {}", err),
                    )
                }
            },
            None => variant.initial_position(),
        };

        replay_sans(initial, &parsed.mainline)
    }
}
