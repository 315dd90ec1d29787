//! PGN (Portable Game Notation) parsing.
//!
//! A hand-written recursive-descent parser over the small PGN grammar:
//! tag pairs, movetext with comments, numeric annotation glyphs, nested
//! variations, move numbers and a result token. The parser fails fast on
//! the first syntax error and reports unterminated constructs separately,
//! so a truncated file is distinguishable from a malformed one.

use crate::san::San;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the PGN grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("syntax error at offset {offset}: expected {expected}")]
    Parse { offset: usize, expected: &'static str },

    #[error("unterminated tag, comment or variation")]
    Incomplete,
}

/// Tag pairs in file order. PGN allows duplicate tag names, so this is a
/// multimap rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    /// Adds a tag pair.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the first value for a tag name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over all pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of tag pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed game: tags, comments on the initial position, and the mainline
/// with its nested variations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPgn {
    pub tags: Tags,
    pub initial_comments: Vec<String>,
    pub mainline: Vec<San>,
}

/// Parses a single PGN game.
pub fn parse_pgn(input: &str) -> Result<ParsedPgn, PgnError> {
    let mut parser = Parser::new(input);
    parser.skip_bom();

    let mut pgn = ParsedPgn::default();
    loop {
        parser.skip_whitespace();
        if parser.peek() != Some(b'[') {
            break;
        }
        let (name, value) = parser.tag()?;
        pgn.tags.push(name, value);
    }

    let (leading, mainline) = parser.line(false)?;
    pgn.initial_comments = leading;
    pgn.mainline = mainline;
    Ok(pgn)
}

const RESULTS: [&str; 3] = ["1-0", "0-1", "1/2-1/2"];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn bytes(&self) -> &[u8] {
        self.input.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_bom(&mut self) {
        if self.input.as_bytes().starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.pos = 3;
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    /// Parses a `[Name "value"]` tag pair.
    fn tag(&mut self) -> Result<(String, String), PgnError> {
        self.bump(); // '['
        self.skip_whitespace();

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.bump();
        }
        if self.pos == start {
            return Err(PgnError::Parse {
                offset: self.pos,
                expected: "tag name",
            });
        }
        let name = self.input[start..self.pos].to_string();

        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(PgnError::Parse {
                offset: self.pos,
                expected: "quoted tag value",
            });
        }
        self.bump();

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(PgnError::Incomplete),
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        Some(c @ (b'"' | b'\\')) => {
                            value.push(c as char);
                            self.bump();
                        }
                        Some(_) => {
                            value.push('\\');
                        }
                        None => return Err(PgnError::Incomplete),
                    }
                }
                Some(_) => {
                    let c = self.char_at_pos();
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        self.skip_whitespace();
        match self.peek() {
            Some(b']') => {
                self.bump();
                Ok((name, value))
            }
            None => Err(PgnError::Incomplete),
            _ => Err(PgnError::Parse {
                offset: self.pos,
                expected: "closing bracket",
            }),
        }
    }

    fn char_at_pos(&self) -> char {
        self.input[self.pos..]
            .chars()
            .next()
            .unwrap_or('\u{fffd}')
    }

    /// Parses a movetext line until end of input (mainline) or a closing
    /// parenthesis (variation). Returns comments that preceded the first
    /// move along with the moves.
    fn line(&mut self, nested: bool) -> Result<(Vec<String>, Vec<San>), PgnError> {
        let mut leading = Vec::new();
        let mut moves: Vec<San> = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(next) = self.peek() else {
                if nested {
                    return Err(PgnError::Incomplete);
                }
                return Ok((leading, moves));
            };

            match next {
                b')' => {
                    if nested {
                        self.bump();
                        return Ok((leading, moves));
                    }
                    return Err(PgnError::Parse {
                        offset: self.pos,
                        expected: "move or end of game",
                    });
                }
                b'(' => {
                    self.bump();
                    let (variation_leading, mut variation) = self.line(true)?;
                    let Some(last) = moves.last_mut() else {
                        return Err(PgnError::Parse {
                            offset: self.pos,
                            expected: "move before variation",
                        });
                    };
                    // Comments before a variation's first move describe it.
                    if let Some(first) = variation.first_mut() {
                        let mut comments = variation_leading;
                        comments.append(&mut first.metas.comments);
                        first.metas.comments = comments;
                    }
                    last.metas.variations.push(variation);
                }
                b'{' => {
                    let comment = self.brace_comment()?;
                    match moves.last_mut() {
                        Some(last) => last.metas.comments.push(comment),
                        None => leading.push(comment),
                    }
                }
                b';' => {
                    let comment = self.line_comment();
                    match moves.last_mut() {
                        Some(last) => last.metas.comments.push(comment),
                        None => leading.push(comment),
                    }
                }
                b'%' => {
                    // PGN escape mechanism: the rest of the line is ignored.
                    self.line_comment();
                }
                b'$' => {
                    self.bump();
                    let start = self.pos;
                    while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                        self.bump();
                    }
                    let glyph = self.input[start..self.pos].parse::<u32>().map_err(|_| {
                        PgnError::Parse {
                            offset: start,
                            expected: "annotation number",
                        }
                    })?;
                    self.attach_glyph(&mut moves, glyph, start)?;
                }
                b'!' | b'?' => {
                    let start = self.pos;
                    let mut suffix = String::new();
                    while suffix.len() < 2 && matches!(self.peek(), Some(b'!' | b'?')) {
                        suffix.push(self.peek().map(|c| c as char).unwrap_or('!'));
                        self.bump();
                    }
                    let glyph = match suffix.as_str() {
                        "!" => 1,
                        "?" => 2,
                        "!!" => 3,
                        "??" => 4,
                        "!?" => 5,
                        "?!" => 6,
                        _ => 0,
                    };
                    self.attach_glyph(&mut moves, glyph, start)?;
                }
                b'*' => {
                    self.bump();
                    if !nested {
                        return Ok((leading, moves));
                    }
                }
                _ => {
                    let start = self.pos;
                    let word = self.word();
                    if word.is_empty() {
                        return Err(PgnError::Parse {
                            offset: start,
                            expected: "token",
                        });
                    }
                    if RESULTS.contains(&word) {
                        if !nested {
                            return Ok((leading, moves));
                        }
                        continue;
                    }
                    if word.bytes().all(|c| c.is_ascii_digit()) {
                        // A move number; eat the dot run ("1." / "1...").
                        while self.peek() == Some(b'.') {
                            self.bump();
                        }
                        continue;
                    }
                    let san = San::parse(word).map_err(|_| PgnError::Parse {
                        offset: start,
                        expected: "san move",
                    })?;
                    moves.push(san);
                }
            }
        }
    }

    fn attach_glyph(
        &self,
        moves: &mut [San],
        glyph: u32,
        offset: usize,
    ) -> Result<(), PgnError> {
        match moves.last_mut() {
            Some(last) => {
                last.metas.glyphs.push(glyph);
                Ok(())
            }
            None => Err(PgnError::Parse {
                offset,
                expected: "move before annotation",
            }),
        }
    }

    /// Reads a `{...}` comment, normalizing inner whitespace at the ends.
    fn brace_comment(&mut self) -> Result<String, PgnError> {
        self.bump(); // '{'
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(PgnError::Incomplete),
                Some(b'}') => {
                    let comment = self.input[start..self.pos].trim().to_string();
                    self.bump();
                    return Ok(comment);
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Reads a `;` comment running to the end of the line.
    fn line_comment(&mut self) -> String {
        self.bump(); // ';' or '%'
        let start = self.pos;
        while !matches!(self.peek(), None | Some(b'\n')) {
            self.bump();
        }
        self.input[start..self.pos].trim().to_string()
    }

    /// Reads a movetext word: SAN characters, castle dashes, result slashes.
    fn word(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, b'=' | b'+' | b'#' | b'@' | b'-' | b'/' | b'~')
        ) {
            self.bump();
        }
        &self.input[start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::san::SanKind;
    use chess_core::Role;

    #[test]
    fn parses_tags_and_moves() {
        let pgn = parse_pgn(
            "[Event \"Casual\"]\n[Site \"?\"]\n\n1. e4 e5 2. Nf3 Nc6 1-0\n",
        )
        .unwrap();
        assert_eq!(pgn.tags.get("Event"), Some("Casual"));
        assert_eq!(pgn.tags.len(), 2);
        assert_eq!(pgn.mainline.len(), 4);
    }

    #[test]
    fn accepts_bom_and_crlf() {
        let pgn = parse_pgn("\u{feff}[Event \"x\"]\r\n\r\n1. e4 e5 *\r\n").unwrap();
        assert_eq!(pgn.tags.get("Event"), Some("x"));
        assert_eq!(pgn.mainline.len(), 2);
    }

    #[test]
    fn comments_attach_to_preceding_move() {
        let pgn = parse_pgn("{start} 1. e4 {best by test} e5 ; classical\n2. Nf3").unwrap();
        assert_eq!(pgn.initial_comments, vec!["start".to_string()]);
        assert_eq!(pgn.mainline[0].metas.comments, vec!["best by test"]);
        assert_eq!(pgn.mainline[1].metas.comments, vec!["classical"]);
        assert!(pgn.mainline[2].metas.comments.is_empty());
    }

    #[test]
    fn nags_and_suffix_glyphs() {
        let pgn = parse_pgn("1. e4 $1 e5?! 2. Nf3!").unwrap();
        assert_eq!(pgn.mainline[0].metas.glyphs, vec![1]);
        assert_eq!(pgn.mainline[1].metas.glyphs, vec![6]);
        assert_eq!(pgn.mainline[2].metas.glyphs, vec![1]);
    }

    #[test]
    fn variations_nest_and_attach() {
        let pgn = parse_pgn("1. e4 e5 (1... c5 2. Nf3 (2. c3)) 2. Nf3").unwrap();
        assert_eq!(pgn.mainline.len(), 3);
        let variations = &pgn.mainline[1].metas.variations;
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].len(), 2);
        assert_eq!(variations[0][1].metas.variations.len(), 1);
    }

    #[test]
    fn castles_and_results_disambiguate() {
        let pgn = parse_pgn("1. e4 e5 2. O-O 0-0-0 1/2-1/2").unwrap();
        assert_eq!(pgn.mainline.len(), 4);
        assert!(matches!(pgn.mainline[2].kind, SanKind::Castle(_)));
        assert!(matches!(pgn.mainline[3].kind, SanKind::Castle(_)));
    }

    #[test]
    fn drops_parse_in_movetext() {
        let pgn = parse_pgn("1. e4 e5 2. N@f3").unwrap();
        assert!(matches!(
            pgn.mainline[2].kind,
            SanKind::Put {
                role: Role::Knight,
                ..
            }
        ));
    }

    #[test]
    fn check_suffixes_recorded() {
        let pgn = parse_pgn("1. f3 e5 2. g4 Qh4#").unwrap();
        assert!(pgn.mainline[3].metas.checkmate);
    }

    #[test]
    fn unterminated_comment_is_incomplete() {
        assert_eq!(parse_pgn("1. e4 {forever"), Err(PgnError::Incomplete));
        assert_eq!(parse_pgn("[Event \"x"), Err(PgnError::Incomplete));
        assert_eq!(parse_pgn("1. e4 (1... c5"), Err(PgnError::Incomplete));
    }

    #[test]
    fn syntax_errors_fail_fast() {
        assert!(matches!(
            parse_pgn("[Event Casual]"),
            Err(PgnError::Parse { .. })
        ));
        assert!(matches!(
            parse_pgn("1. e4 )"),
            Err(PgnError::Parse { .. })
        ));
        assert!(matches!(
            parse_pgn("(1. e4)"),
            Err(PgnError::Parse { .. })
        ));
        assert!(matches!(
            parse_pgn("1. zz9"),
            Err(PgnError::Parse { .. })
        ));
    }

    #[test]
    fn tag_value_escapes() {
        let pgn = parse_pgn("[White \"O\\\"Kelly\\\\\"]\n*").unwrap();
        assert_eq!(pgn.tags.get("White"), Some("O\"Kelly\\"));
    }

    #[test]
    fn stops_at_result() {
        let pgn = parse_pgn("1. e4 1-0 this is not chess").unwrap();
        assert_eq!(pgn.mainline.len(), 1);
    }

    #[test]
    fn escape_lines_ignored() {
        let pgn = parse_pgn("%evald nothing\n1. e4 *").unwrap();
        assert_eq!(pgn.mainline.len(), 1);
    }
}
