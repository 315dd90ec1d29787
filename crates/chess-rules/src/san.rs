//! Standard Algebraic Notation (SAN).
//!
//! A parsed SAN node is a sum type plus shared [`Metas`]: the annotations
//! (check marks, comments, glyphs, variations) ride along but never affect
//! which move the node resolves to. Resolution matches the node against the
//! legal moves of a concrete position.

use crate::Position;
use chess_core::{CastlingSide, File, Move, Rank, Role, Square};
use std::fmt;

/// Error type for SAN parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    /// The SAN string is empty.
    Empty,
    /// The SAN string has invalid format.
    InvalidFormat(String),
    /// No legal move matches the SAN.
    NoMoveFound(String),
    /// Multiple legal moves match the SAN.
    AmbiguousMove(String),
    /// A promotion suffix is missing or impossible.
    WrongPromotion(String),
    /// A drop was rejected by the variant rules.
    IllegalDrop(String),
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty SAN string"),
            SanError::InvalidFormat(s) => write!(f, "invalid SAN format: {}", s),
            SanError::NoMoveFound(s) => write!(f, "no legal move matches: {}", s),
            SanError::AmbiguousMove(s) => write!(f, "ambiguous move: {}", s),
            SanError::WrongPromotion(s) => write!(f, "wrong promotion: {}", s),
            SanError::IllegalDrop(s) => write!(f, "illegal drop: {}", s),
        }
    }
}

impl std::error::Error for SanError {}

/// Annotations attached to a SAN node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metas {
    /// A `+` suffix was present.
    pub check: bool,
    /// A `#` suffix was present.
    pub checkmate: bool,
    /// Comments following the move.
    pub comments: Vec<String>,
    /// Numeric annotation glyphs (`$1`, `!`, `??`, ...).
    pub glyphs: Vec<u32>,
    /// Alternative lines branching from the position before this move.
    pub variations: Vec<Vec<San>>,
}

/// The move description part of a SAN node.
#[derive(Debug, Clone, PartialEq)]
pub enum SanKind {
    /// A piece or pawn move with optional disambiguators.
    Piece {
        role: Role,
        file: Option<File>,
        rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    /// `O-O` or `O-O-O`.
    Castle(CastlingSide),
    /// A Crazyhouse drop such as `N@f3`.
    Put { role: Role, to: Square },
}

/// One parsed SAN token.
#[derive(Debug, Clone, PartialEq)]
pub struct San {
    pub kind: SanKind,
    pub metas: Metas,
}

impl San {
    /// Parses a single SAN token (suffix annotations included).
    pub fn parse(token: &str) -> Result<San, SanError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SanError::Empty);
        }

        let mut metas = Metas::default();
        let mut body = token;
        while let Some(last) = body.chars().last() {
            match last {
                '#' => metas.checkmate = true,
                '+' => metas.check = true,
                _ => break,
            }
            body = &body[..body.len() - 1];
        }

        let kind = Self::parse_kind(body, token)?;
        Ok(San { kind, metas })
    }

    fn parse_kind(body: &str, token: &str) -> Result<SanKind, SanError> {
        match body {
            "O-O" | "0-0" => return Ok(SanKind::Castle(CastlingSide::KingSide)),
            "O-O-O" | "0-0-0" => return Ok(SanKind::Castle(CastlingSide::QueenSide)),
            _ => {}
        }

        if let Some((role_part, dest)) = body.split_once('@') {
            let role = match role_part {
                "" => Role::Pawn,
                _ => role_part
                    .chars()
                    .next()
                    .filter(|_| role_part.len() == 1)
                    .and_then(Role::from_char)
                    .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?,
            };
            let to = Square::from_algebraic(dest)
                .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
            return Ok(SanKind::Put { role, to });
        }

        let mut chars: Vec<char> = body.chars().collect();
        if chars.is_empty() {
            return Err(SanError::Empty);
        }

        let role = if chars[0].is_ascii_uppercase() {
            let role = Role::from_char(chars[0])
                .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
            chars.remove(0);
            role
        } else {
            Role::Pawn
        };

        // Promotion: `=Q` or a bare trailing role letter on a pawn move.
        let mut promotion = None;
        if let Some(eq) = chars.iter().position(|&c| c == '=') {
            if eq + 2 != chars.len() {
                return Err(SanError::InvalidFormat(token.to_string()));
            }
            promotion = Some(
                Role::from_char(chars[eq + 1])
                    .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?,
            );
            chars.truncate(eq);
        } else if role == Role::Pawn && chars.len() > 2 {
            if let Some(&last) = chars.last() {
                if last.is_ascii_uppercase() {
                    promotion = Role::from_char(last);
                    chars.pop();
                }
            }
        }
        if promotion.is_some() && role != Role::Pawn {
            return Err(SanError::InvalidFormat(token.to_string()));
        }

        let capture = chars.contains(&'x');
        chars.retain(|&c| c != 'x');

        if chars.len() < 2 {
            return Err(SanError::InvalidFormat(token.to_string()));
        }
        let to_file = File::from_char(chars[chars.len() - 2])
            .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
        let to_rank = Rank::from_char(chars[chars.len() - 1])
            .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
        let to = Square::new(to_file, to_rank);

        let disambig = &chars[..chars.len() - 2];
        let (file, rank) = match disambig {
            [] => (None, None),
            [c] => {
                if let Some(f) = File::from_char(*c).filter(|_| c.is_ascii_lowercase()) {
                    (Some(f), None)
                } else if let Some(r) = Rank::from_char(*c) {
                    (None, Some(r))
                } else {
                    return Err(SanError::InvalidFormat(token.to_string()));
                }
            }
            [f, r] => {
                let file = File::from_char(*f)
                    .filter(|_| f.is_ascii_lowercase())
                    .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
                let rank = Rank::from_char(*r)
                    .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
                (Some(file), Some(rank))
            }
            _ => return Err(SanError::InvalidFormat(token.to_string())),
        };

        Ok(SanKind::Piece {
            role,
            file,
            rank,
            capture,
            to,
            promotion,
        })
    }

    /// Resolves the node against a position, selecting exactly one legal
    /// move. Check and checkmate suffixes are informational and never cause
    /// a mismatch.
    pub fn to_move(&self, pos: &Position) -> Result<Move, SanError> {
        match self.kind {
            SanKind::Castle(side) => pos
                .legal_moves()
                .into_iter()
                .find(|m| m.castling_side() == Some(side))
                .ok_or_else(|| SanError::NoMoveFound(side.to_string())),
            SanKind::Put { role, to } => pos
                .variant
                .drop(pos, role, to)
                .map(|_| Move::Put { role, to })
                .map_err(|e| SanError::IllegalDrop(e.to_string())),
            SanKind::Piece {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                let description = self.describe();
                let mut candidates: Vec<Move> = pos
                    .legal_moves()
                    .into_iter()
                    .filter(|m| {
                        m.castling_side().is_none()
                            && !matches!(m, Move::Put { .. })
                            && m.role() == role
                            && m.to() == to
                            && (!capture || m.is_capture())
                    })
                    .filter(|m| match m.from() {
                        Some(from) => {
                            file.map_or(true, |f| from.file() == f)
                                && rank.map_or(true, |r| from.rank() == r)
                        }
                        None => false,
                    })
                    .collect();

                match promotion {
                    Some(promoted) => {
                        if !candidates.iter().any(|m| m.is_promotion()) {
                            return Err(SanError::WrongPromotion(description));
                        }
                        candidates.retain(|m| m.promotion() == Some(promoted));
                    }
                    None => {
                        if candidates.iter().any(|m| m.is_promotion()) {
                            return Err(SanError::WrongPromotion(description));
                        }
                    }
                }

                match candidates.len() {
                    0 => Err(SanError::NoMoveFound(description)),
                    1 => Ok(candidates[0]),
                    _ => Err(SanError::AmbiguousMove(description)),
                }
            }
        }
    }

    fn describe(&self) -> String {
        match &self.kind {
            SanKind::Castle(side) => side.to_string(),
            SanKind::Put { role, to } => format!("{}@{}", role.upper_char(), to),
            SanKind::Piece {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                let mut out = String::new();
                if *role != Role::Pawn {
                    out.push(role.upper_char());
                }
                if let Some(f) = file {
                    out.push(f.to_char());
                }
                if let Some(r) = rank {
                    out.push(r.to_char());
                }
                if *capture {
                    out.push('x');
                }
                out.push_str(&to.to_algebraic());
                if let Some(p) = promotion {
                    out.push('=');
                    out.push(p.upper_char());
                }
                out
            }
        }
    }
}

/// Renders a legal move as SAN with minimal disambiguation and check
/// suffixes, given the position it is played from.
pub fn to_san(pos: &Position, m: &Move) -> String {
    let mut san = match *m {
        Move::Castle { side, .. } => side.to_string(),
        Move::Put { role, to } => format!("{}@{}", role.upper_char(), to),
        Move::EnPassant { from, to } => format!("{}x{}", from.file(), to),
        Move::Normal {
            role: Role::Pawn,
            from,
            capture,
            to,
        } => {
            if capture.is_some() {
                format!("{}x{}", from.file(), to)
            } else {
                to.to_algebraic()
            }
        }
        Move::Promotion {
            from,
            capture,
            to,
            promotion,
        } => {
            let stem = if capture.is_some() {
                format!("{}x{}", from.file(), to)
            } else {
                to.to_algebraic()
            };
            format!("{}={}", stem, promotion.upper_char())
        }
        Move::Normal {
            role,
            from,
            capture,
            to,
        } => {
            let mut out = String::new();
            out.push(role.upper_char());
            out.push_str(&disambiguation(pos, role, from, to));
            if capture.is_some() {
                out.push('x');
            }
            out.push_str(&to.to_algebraic());
            out
        }
    };

    let after = pos.play(m);
    if after.is_check() {
        if after.legal_moves().is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}

/// Minimal origin disambiguation: nothing if unique, then file, then rank,
/// then both.
fn disambiguation(pos: &Position, role: Role, from: Square, to: Square) -> String {
    let origins: Vec<Square> = pos
        .legal_moves()
        .into_iter()
        .filter(|m| m.castling_side().is_none() && m.role() == role && m.to() == to)
        .filter_map(|m| m.from())
        .collect();

    if origins.len() <= 1 {
        return String::new();
    }
    if origins.iter().filter(|sq| sq.file() == from.file()).count() == 1 {
        return from.file().to_string();
    }
    if origins.iter().filter(|sq| sq.rank() == from.rank()).count() == 1 {
        return from.rank().to_string();
    }
    from.to_algebraic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;

    fn resolve(pos: &Position, token: &str) -> Result<Move, SanError> {
        San::parse(token)?.to_move(pos)
    }

    #[test]
    fn parse_pawn_push() {
        let pos = Position::startpos();
        let m = resolve(&pos, "e4").unwrap();
        assert_eq!(m.to().to_algebraic(), "e4");
    }

    #[test]
    fn parse_knight_move() {
        let pos = Position::startpos();
        let m = resolve(&pos, "Nf3").unwrap();
        assert_eq!(m.from().map(|s| s.to_algebraic()), Some("g1".into()));
    }

    #[test]
    fn parse_castles() {
        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(
            resolve(&pos, "O-O").unwrap().castling_side(),
            Some(CastlingSide::KingSide)
        );
        assert_eq!(
            resolve(&pos, "0-0-0").unwrap().castling_side(),
            Some(CastlingSide::QueenSide)
        );
    }

    #[test]
    fn check_suffix_is_informational() {
        let pos = Position::startpos();
        // A wrong '+' must not cause rejection; it lands in the metas.
        let san = San::parse("e4+").unwrap();
        assert!(san.metas.check);
        assert!(san.to_move(&pos).is_ok());
    }

    #[test]
    fn capture_flag_filters() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let m = resolve(&pos, "exd5").unwrap();
        assert!(m.is_capture());
        assert!(resolve(&pos, "exd4").is_err());
    }

    #[test]
    fn disambiguation_by_file_and_rank() {
        // Knights on b1 and f1 both reach d2.
        let pos = Position::from_fen("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1").unwrap();
        let m = resolve(&pos, "Nbd2").unwrap();
        assert_eq!(m.from().map(|s| s.to_algebraic()), Some("b1".into()));
        assert!(matches!(
            resolve(&pos, "Nd2"),
            Err(SanError::AmbiguousMove(_))
        ));
    }

    #[test]
    fn missing_promotion_is_rejected() {
        let pos = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(matches!(
            resolve(&pos, "a8"),
            Err(SanError::WrongPromotion(_))
        ));
        assert!(resolve(&pos, "a8=Q").is_ok());
        assert!(resolve(&pos, "a8Q").is_ok());
    }

    #[test]
    fn promotion_on_normal_move_is_rejected() {
        let pos = Position::startpos();
        assert!(matches!(
            resolve(&pos, "e4=Q"),
            Err(SanError::WrongPromotion(_))
        ));
    }

    #[test]
    fn no_matching_move() {
        let pos = Position::startpos();
        assert!(matches!(
            resolve(&pos, "Ke4"),
            Err(SanError::NoMoveFound(_))
        ));
        assert!(matches!(
            resolve(&pos, "xyz"),
            Err(SanError::InvalidFormat(_))
        ));
        assert!(matches!(San::parse(""), Err(SanError::Empty)));
    }

    #[test]
    fn drop_san() {
        let pos = Position::from_fen_as(
            "4k3/8/8/8/8/8/8/4K3[Nn] w - - 0 1",
            Variant::Crazyhouse,
        )
        .unwrap();
        let m = resolve(&pos, "N@f3").unwrap();
        assert!(matches!(m, Move::Put { role: Role::Knight, .. }));
        assert!(matches!(
            resolve(&pos, "Q@f3"),
            Err(SanError::IllegalDrop(_))
        ));
    }

    #[test]
    fn render_basic_moves() {
        let pos = Position::startpos();
        let e4 = pos.parse_uci("e2e4").unwrap();
        assert_eq!(to_san(&pos, &e4), "e4");
        let nf3 = pos.parse_uci("g1f3").unwrap();
        assert_eq!(to_san(&pos, &nf3), "Nf3");
    }

    #[test]
    fn render_capture_and_castle() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let m = pos.parse_uci("e4d5").unwrap();
        assert_eq!(to_san(&pos, &m), "exd5");

        let pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let m = pos.parse_uci("e1g1").unwrap();
        assert_eq!(to_san(&pos, &m), "O-O");
    }

    #[test]
    fn render_disambiguation_prefers_file() {
        let pos = Position::from_fen("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1").unwrap();
        let m = pos.parse_uci("b1d2").unwrap();
        assert_eq!(to_san(&pos, &m), "Nbd2");
    }

    #[test]
    fn render_check_and_mate() {
        let pos = Position::from_fen("8/8/8/8/8/7k/8/4K1Q1 w - - 0 1").unwrap();
        let m = pos.parse_uci("g1h2").unwrap();
        assert_eq!(to_san(&pos, &m), "Qh2+");

        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let m = pos.parse_uci("a1a8").unwrap();
        assert_eq!(to_san(&pos, &m), "Ra8#");
    }

    #[test]
    fn roundtrip_every_legal_move() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/P7/8/8/8/8/8/4K2k w - - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            for m in &pos.legal_moves() {
                let san = to_san(&pos, m);
                let resolved = San::parse(&san)
                    .and_then(|s| s.to_move(&pos))
                    .unwrap_or_else(|e| panic!("{} in {}: {}", san, fen, e));
                assert_eq!(resolved, *m, "roundtrip failed for {}", san);
            }
        }
    }
}
