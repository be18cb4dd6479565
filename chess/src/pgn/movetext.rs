//! Movetext tokenizer.
//!
//! Splits the move section of a PGN document into tokens while keeping the
//! byte span of each, so annotation-aware callers can recover the raw text
//! between two moves.

use std::ops::Range;

/// Result marker closing a movetext section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultToken {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl ResultToken {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" | "½-½" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Ongoing => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `12.` or `12...`
    MoveNumber { number: u32, black: bool },
    /// A word shaped like a SAN move.
    San(&'a str),
    /// Contents of a `{...}` comment, braces stripped.
    Comment(&'a str),
    /// `$n` numeric annotation glyph.
    Nag(u8),
    Result(ResultToken),
    /// Anything else: stray words, `(`/`)` variation markers, `;` comments.
    Other(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Range<usize>,
}

/// Tokenize movetext. Never fails: unrecognised input becomes
/// [`TokenKind::Other`] and an unterminated comment runs to end of input.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        match c {
            b'{' => {
                let end = text[start + 1..]
                    .find('}')
                    .map_or(text.len(), |off| start + 1 + off);
                let body = &text[start + 1..end];
                i = (end + 1).min(text.len());
                tokens.push(Token {
                    kind: TokenKind::Comment(body.trim()),
                    span: start..i,
                });
            }
            b';' => {
                i = text[start..].find('\n').map_or(text.len(), |off| start + off);
                tokens.push(Token {
                    kind: TokenKind::Other(&text[start..i]),
                    span: start..i,
                });
            }
            b'(' | b')' => {
                i += 1;
                tokens.push(Token {
                    kind: TokenKind::Other(&text[start..i]),
                    span: start..i,
                });
            }
            _ => {
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'{' | b'(' | b')' | b';')
                {
                    i += 1;
                }
                let word = &text[start..i];
                for (kind, span) in classify_word(word, start) {
                    tokens.push(Token { kind, span });
                }
            }
        }
    }

    tokens
}

/// A word may glue a move number to its move ("1.e4"); split those apart.
fn classify_word(word: &str, offset: usize) -> Vec<(TokenKind<'_>, Range<usize>)> {
    if let Some(result) = ResultToken::parse(word) {
        return vec![(TokenKind::Result(result), offset..offset + word.len())];
    }

    if let Some(nag) = word.strip_prefix('$') {
        if let Ok(n) = nag.parse() {
            return vec![(TokenKind::Nag(n), offset..offset + word.len())];
        }
    }

    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && word[digits..].starts_with('.') {
        let dots = word[digits..].bytes().take_while(|b| *b == b'.').count();
        let number_end = digits + dots;
        let mut out = Vec::new();
        if let Ok(number) = word[..digits].parse() {
            out.push((
                TokenKind::MoveNumber {
                    number,
                    black: dots >= 3,
                },
                offset..offset + number_end,
            ));
            if number_end < word.len() {
                out.extend(classify_word(&word[number_end..], offset + number_end));
            }
            return out;
        }
    }

    let kind = if looks_like_san(word) {
        TokenKind::San(word)
    } else {
        TokenKind::Other(word)
    };
    vec![(kind, offset..offset + word.len())]
}

/// Cheap shape check; legality is decided against a board later.
pub fn looks_like_san(word: &str) -> bool {
    let core = word.trim_end_matches(['+', '#', '!', '?']);
    if matches!(core, "O-O" | "O-O-O" | "0-0" | "0-0-0") {
        return true;
    }
    let bytes = core.as_bytes();
    if bytes.len() < 2 || bytes.len() > 7 {
        return false;
    }
    let first_ok = matches!(bytes[0], b'a'..=b'h' | b'K' | b'Q' | b'R' | b'B' | b'N');
    let has_square = core
        .as_bytes()
        .windows(2)
        .any(|w| matches!(w[0], b'a'..=b'h') && matches!(w[1], b'1'..=b'8'));
    let charset_ok = core
        .bytes()
        .all(|b| matches!(b, b'a'..=b'h' | b'1'..=b'8' | b'x' | b'=' | b'K' | b'Q' | b'R' | b'B' | b'N'));
    first_ok && has_square && charset_ok
}
