//! Zobrist hashing for position identification.
//!
//! Hashes combine piece placement, side to move, unmoved-rook castling
//! squares and the en passant file, plus the variant state that
//! distinguishes repeated positions: pocket contents and remaining checks.

use crate::Position;
use chess_core::{Color, Role};

/// Zobrist hash keys, generated from a fixed seed for reproducibility.
pub struct ZobristKeys {
    /// Keys for pieces: [role][color][square].
    pieces: [[[u64; 64]; 2]; 6],
    /// Key applied when black is to move.
    black_to_move: u64,
    /// Keys for unmoved-rook squares.
    castling: [u64; 64],
    /// Keys for the en passant file.
    en_passant: [u64; 8],
    /// Keys for pocket contents: [color][role][count capped at 16].
    pockets: [[[u64; 17]; 6]; 2],
    /// Keys for remaining checks: [color][count].
    checks: [[u64; 4]; 2],
}

impl ZobristKeys {
    const fn new() -> Self {
        // xorshift64 is enough here; the seed is the golden ratio constant.
        const fn next(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 64];
        let mut en_passant = [0u64; 8];
        let mut pockets = [[[0u64; 17]; 6]; 2];
        let mut checks = [[0u64; 4]; 2];

        let mut role = 0;
        while role < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    state = next(state);
                    pieces[role][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            role += 1;
        }

        state = next(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 64 {
            state = next(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next(state);
            en_passant[i] = state;
            i += 1;
        }

        let mut color = 0;
        while color < 2 {
            let mut role = 0;
            while role < 6 {
                let mut count = 0;
                while count < 17 {
                    state = next(state);
                    pockets[color][role][count] = state;
                    count += 1;
                }
                role += 1;
            }
            color += 1;
        }

        let mut color = 0;
        while color < 2 {
            let mut count = 0;
            while count < 4 {
                state = next(state);
                checks[color][count] = state;
                count += 1;
            }
            color += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
            pockets,
            checks,
        }
    }
}

/// Global Zobrist keys (initialized at compile time).
static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// Hashes a position for repetition detection and transposition keys.
pub fn hash(pos: &Position) -> u64 {
    let keys = &ZOBRIST;
    let mut h = 0u64;

    for color in Color::ALL {
        for role in Role::ALL {
            for sq in pos.board.pieces(color, role) {
                h ^= keys.pieces[role.index()][color.index()][sq.index() as usize];
            }
        }
    }

    if pos.turn == Color::Black {
        h ^= keys.black_to_move;
    }

    for sq in pos.castling.squares() {
        h ^= keys.castling[sq.index() as usize];
    }

    if let Some(ep) = pos.en_passant {
        h ^= keys.en_passant[ep.file().index() as usize];
    }

    if let Some(pockets) = &pos.pockets {
        for color in Color::ALL {
            for role in Role::ALL {
                let count = pockets.pocket(color).count(role).min(16) as usize;
                if count > 0 {
                    h ^= keys.pockets[color.index()][role.index()][count];
                }
            }
        }
    }

    if let Some(checks) = pos.remaining_checks {
        for color in Color::ALL {
            h ^= keys.checks[color.index()][checks.of(color).min(3) as usize];
        }
    }

    h
}
