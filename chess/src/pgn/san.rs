//! Standard Algebraic Notation.
//!
//! Both functions take moves in cozy-chess encoding (castling as king takes
//! rook); [`crate::Position`] converts at its boundary.

use cozy_chess::{Board, Color, Move, Piece, Square};

use crate::types::{piece_letter, promotion_from_char, Side};
use crate::uci::{file_char, format_square, parse_square, rank_char};

/// Format a legal move as SAN, including the check or mate suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = format_san_body(board, mv);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if has_any_move(&after) { '+' } else { '#' });
    }

    san
}

/// Parse a SAN move against the legal moves of `board`.
///
/// Check/mate markers and annotation glyphs (`!`, `?`) are ignored, `0-0`
/// is accepted for `O-O`, and the `=` before a promotion piece is optional.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let text = san.trim().trim_end_matches(['+', '#', '!', '?']);
    if text.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);

    if matches!(text, "O-O" | "0-0" | "O-O-O" | "0-0-0") {
        let long = text.len() == 5;
        return legal
            .into_iter()
            .find(|mv| {
                is_castle(board, *mv) && ((mv.to.file() as u8) < (mv.from.file() as u8)) == long
            })
            .ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let pattern = SanPattern::parse(text).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;

    let mut candidates = legal
        .into_iter()
        .filter(|mv| !is_castle(board, *mv) && pattern.matches(board, *mv));
    let found = candidates
        .next()
        .ok_or_else(|| SanError::NoLegalMove(san.to_string()))?;
    if candidates.next().is_some() {
        return Err(SanError::AmbiguousMove(san.to_string()));
    }
    Ok(found)
}

fn format_san_body(board: &Board, mv: Move) -> String {
    if is_castle(board, mv) {
        return if (mv.to.file() as u8) > (mv.from.file() as u8) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let Some(piece) = board.piece_on(mv.from) else {
        return format!("{}{}", format_square(mv.from), format_square(mv.to));
    };
    let capture = is_capture(board, mv, piece);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if capture {
            san.push(file_char(mv.from.file()));
        }
    } else {
        san.push(piece_letter(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(piece_letter(promo));
    }

    san
}

/// Minimal origin hint: file if it is unique among rivals, else rank, else both.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
                && !is_castle(board, *other)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        return file_char(mv.from.file()).to_string();
    }
    if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        return rank_char(mv.from.rank()).to_string();
    }
    format_square(mv.from)
}

fn is_capture(board: &Board, mv: Move, piece: Piece) -> bool {
    let enemy: Color = Side::from(board.side_to_move()).opponent().into();
    board.color_on(mv.to) == Some(enemy) || (piece == Piece::Pawn && mv.from.file() != mv.to.file())
}

fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

fn has_any_move(board: &Board) -> bool {
    board.generate_moves(|mvs| mvs.into_iter().next().is_some())
}

/// The pieces of a non-castling SAN token.
struct SanPattern {
    piece: Piece,
    file_hint: Option<char>,
    rank_hint: Option<char>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(text: &str) -> Option<Self> {
        let mut chars: Vec<char> = text.chars().filter(|c| *c != 'x' && *c != '=').collect();

        let piece = match chars.first() {
            Some('K') => Some(Piece::King),
            Some('Q') => Some(Piece::Queen),
            Some('R') => Some(Piece::Rook),
            Some('B') => Some(Piece::Bishop),
            Some('N') => Some(Piece::Knight),
            _ => None,
        };
        if piece.is_some() {
            chars.remove(0);
        }

        let promotion = match chars.last() {
            Some(c) if c.is_ascii_uppercase() => {
                let promo = promotion_from_char(*c)?;
                chars.pop();
                Some(promo)
            }
            _ => None,
        };

        if chars.len() < 2 || chars.len() > 4 {
            return None;
        }
        let dest: String = chars[chars.len() - 2..].iter().collect();
        let to = parse_square(&dest).ok()?;

        let mut file_hint = None;
        let mut rank_hint = None;
        for c in &chars[..chars.len() - 2] {
            match c {
                'a'..='h' => file_hint = Some(*c),
                '1'..='8' => rank_hint = Some(*c),
                _ => return None,
            }
        }

        Some(Self {
            piece: piece.unwrap_or(Piece::Pawn),
            file_hint,
            rank_hint,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        board.piece_on(mv.from) == Some(self.piece)
            && mv.to == self.to
            && mv.promotion == self.promotion
            && self.file_hint.map_or(true, |f| file_char(mv.from.file()) == f)
            && self.rank_hint.map_or(true, |r| rank_char(mv.from.rank()) == r)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
