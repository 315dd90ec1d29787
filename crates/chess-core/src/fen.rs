//! FEN (Forsyth-Edwards Notation) field parsing and serialization.
//!
//! This module splits and validates the raw FEN fields. The rules crate is
//! responsible for turning the fields into its position representation.
//!
//! Beyond plain FEN, the reader accepts:
//! - missing trailing fields (castling, en passant and the clocks default),
//! - Shredder-style castling tokens using file letters (Chess960),
//! - a `[pocket]` suffix on the placement field (Crazyhouse),
//! - a `N+N` remaining-checks field before the clocks (Three-check).

use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("empty FEN")]
    Empty,

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid pocket: {0}")]
    InvalidPocket(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid remaining checks: {0}")]
    InvalidRemainingChecks(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// Parsed FEN fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Piece placement string, pocket segment removed
    /// (e.g., "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").
    pub placement: String,
    /// Crazyhouse pocket segment, if present (e.g., "Qrr").
    pub pocket: Option<String>,
    /// Active color ('w' or 'b').
    pub active_color: char,
    /// Castling availability (e.g., "KQkq", "HFhf", "-").
    pub castling: String,
    /// En passant target square (e.g., "e3", "-").
    pub en_passant: String,
    /// Remaining checks per color (white, black), if present.
    pub remaining_checks: Option<(u8, u8)>,
    /// Halfmove clock (for the 50-move rule).
    pub halfmove_clock: u32,
    /// Fullmove number.
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. Missing trailing fields take their defaults.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let mut parts = fen.split_whitespace();

        let board_field = parts.next().ok_or(FenError::Empty)?;
        let (placement, pocket) = Self::split_pocket(board_field)?;
        Self::validate_placement(placement)?;
        if let Some(p) = pocket {
            Self::validate_pocket(p)?;
        }

        let active_color = match parts.next() {
            None => 'w',
            Some("w") => 'w',
            Some("b") => 'b',
            Some(other) => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = parts.next().unwrap_or("-");
        Self::validate_castling(castling)?;

        let en_passant = parts.next().unwrap_or("-");
        Self::validate_en_passant(en_passant)?;

        // A Three-check field sits between the en passant square and the
        // clocks; the clocks shift right when it is present.
        let mut next = parts.next();
        let remaining_checks = match next {
            Some(field) if field.contains('+') => {
                let checks = Self::parse_remaining_checks(field)?;
                next = parts.next();
                Some(checks)
            }
            _ => None,
        };

        let halfmove_clock = match next {
            None => 0,
            Some(field) => field
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(field.to_string()))?,
        };

        let fullmove_number = match parts.next() {
            None => 1,
            Some(field) => field
                .parse::<u32>()
                .map_err(|_| FenError::InvalidFullmoveNumber(field.to_string()))?
                .max(1),
        };

        Ok(Fen {
            placement: placement.to_string(),
            pocket: pocket.map(str::to_string),
            active_color,
            castling: castling.to_string(),
            en_passant: en_passant.to_string(),
            remaining_checks,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn split_pocket(board: &str) -> Result<(&str, Option<&str>), FenError> {
        match board.find('[') {
            None => Ok((board, None)),
            Some(open) => {
                if !board.ends_with(']') {
                    return Err(FenError::InvalidPocket(board.to_string()));
                }
                Ok((&board[..open], Some(&board[open + 1..board.len() - 1])))
            }
        }
    }

    fn validate_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut squares = 0;
            for c in rank.chars() {
                if let Some(digit) = c.to_digit(10) {
                    squares += digit;
                } else if "pnbrqkPNBRQK".contains(c) || c == '~' {
                    // '~' marks a promoted piece in Crazyhouse FENs.
                    if c == '~' {
                        continue;
                    }
                    squares += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    fn validate_pocket(pocket: &str) -> Result<(), FenError> {
        if pocket.chars().any(|c| !"pnbrqPNBRQ".contains(c)) {
            return Err(FenError::InvalidPocket(pocket.to_string()));
        }
        Ok(())
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }

        for c in castling.chars() {
            let valid = "KQkq".contains(c) || c.is_ascii_alphabetic() && matches!(c.to_ascii_lowercase(), 'a'..='h');
            if !valid {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}'",
                    c
                )));
            }
        }

        Ok(())
    }

    fn validate_en_passant(ep: &str) -> Result<(), FenError> {
        if ep == "-" {
            return Ok(());
        }

        let chars: Vec<char> = ep.chars().collect();
        if chars.len() != 2
            || !('a'..='h').contains(&chars[0])
            || !(chars[1] == '3' || chars[1] == '6')
        {
            return Err(FenError::InvalidEnPassantSquare(ep.to_string()));
        }

        Ok(())
    }

    fn parse_remaining_checks(field: &str) -> Result<(u8, u8), FenError> {
        // Accepts both "3+3" and the lichess "+3+3" spelling.
        let trimmed = field.strip_prefix('+').unwrap_or(field);
        let mut halves = trimmed.splitn(2, '+');
        let white = halves
            .next()
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|&n| n <= 3);
        let black = halves
            .next()
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|&n| n <= 3);
        match (white, black) {
            (Some(w), Some(b)) => Ok((w, b)),
            _ => Err(FenError::InvalidRemainingChecks(field.to_string())),
        }
    }

    /// Converts the parsed fields back to a FEN string. All six standard
    /// fields are always emitted; the pocket and checks extensions only
    /// when present.
    pub fn to_fen(&self) -> String {
        let board = match &self.pocket {
            Some(pocket) => format!("{}[{}]", self.placement, pocket),
            None => self.placement.clone(),
        };
        let checks = match self.remaining_checks {
            Some((w, b)) => format!(" {}+{}", w, b),
            None => String::new(),
        };
        format!(
            "{} {} {} {}{} {} {}",
            board,
            self.active_color,
            self.castling,
            self.en_passant,
            checks,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for Fen {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.active_color, 'w');
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, "-");
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.pocket, None);
        assert_eq!(fen.remaining_checks, None);
    }

    #[test]
    fn roundtrip() {
        let original = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = Fen::parse(original).unwrap();
        assert_eq!(parsed.to_fen(), original);
    }

    #[test]
    fn missing_trailing_fields_default() {
        let fen = Fen::parse("8/8/8/8/8/8/8/8 b").unwrap();
        assert_eq!(fen.castling, "-");
        assert_eq!(fen.en_passant, "-");
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);

        let fen = Fen::parse("8/8/8/8/8/8/8/8").unwrap();
        assert_eq!(fen.active_color, 'w');
    }

    #[test]
    fn shredder_castling_letters() {
        let fen = Fen::parse("bbqnnrkr/pppppppp/8/8/8/8/PPPPPPPP/BBQNNRKR w HFhf - 0 1").unwrap();
        assert_eq!(fen.castling, "HFhf");
    }

    #[test]
    fn crazyhouse_pocket() {
        let fen = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Qrr] w KQkq - 0 1")
            .unwrap();
        assert_eq!(fen.pocket.as_deref(), Some("Qrr"));
        assert_eq!(
            fen.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Qrr] w KQkq - 0 1"
        );
    }

    #[test]
    fn three_check_field() {
        let fen = Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3+2 0 1")
            .unwrap();
        assert_eq!(fen.remaining_checks, Some((3, 2)));
        assert_eq!(
            fen.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3+2 0 1"
        );

        let plus = Fen::parse("8/8/8/8/8/8/8/8 w - - +1+3 10 20").unwrap();
        assert_eq!(plus.remaining_checks, Some((1, 3)));
        assert_eq!(plus.halfmove_clock, 10);
        assert_eq!(plus.fullmove_number, 20);
    }

    #[test]
    fn invalid_fen() {
        assert_eq!(Fen::parse(""), Err(FenError::Empty));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8 w"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 x"),
            Err(FenError::InvalidActiveColor(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w XYZ"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - e4"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - abc"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8[kx] w"),
            Err(FenError::InvalidPocket(_))
        ));
    }

    #[test]
    fn invalid_remaining_checks() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 9+9 0 1"),
            Err(FenError::InvalidRemainingChecks(_))
        ));
    }
}
