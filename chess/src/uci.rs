//! UCI coordinate notation for moves ("e2e4", "e7e8q").
//!
//! Everything outside this crate speaks standard UCI, where castling is the
//! king moving two squares (e1g1). cozy-chess encodes castling as the king
//! capturing its own rook (e1h1); the helpers here translate between the two.

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::types::promotion_from_char;

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(match promo {
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            _ => 'q',
        });
    }
    s
}

/// Parse UCI move format (e2e4, e7e8q). Castling must be given king-two-squares.
pub fn parse_uci_move(s: &str) -> Result<Move, UciMoveError> {
    let s = s.trim();
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(UciMoveError::InvalidMove(s.to_string()));
    }

    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;

    let promotion = match s[4..].chars().next() {
        Some(c) => Some(
            promotion_from_char(c).ok_or_else(|| UciMoveError::InvalidPromotion(s.to_string()))?,
        ),
        None => None,
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Format a square as its name, e.g. "e4".
pub fn format_square(sq: Square) -> String {
    format!("{}{}", file_char(sq.file()), rank_char(sq.rank()))
}

pub fn file_char(file: File) -> char {
    match file {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub fn rank_char(rank: Rank) -> char {
    match rank {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// Parse a square name such as "e4".
pub fn parse_square(s: &str) -> Result<Square, UciMoveError> {
    let mut chars = s.chars();
    let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(UciMoveError::InvalidSquare(s.to_string()));
    };

    let file = match f {
        'a' => File::A,
        'b' => File::B,
        'c' => File::C,
        'd' => File::D,
        'e' => File::E,
        'f' => File::F,
        'g' => File::G,
        'h' => File::H,
        _ => return Err(UciMoveError::InvalidSquare(s.to_string())),
    };

    let rank = match r {
        '1' => Rank::First,
        '2' => Rank::Second,
        '3' => Rank::Third,
        '4' => Rank::Fourth,
        '5' => Rank::Fifth,
        '6' => Rank::Sixth,
        '7' => Rank::Seventh,
        '8' => Rank::Eighth,
        _ => return Err(UciMoveError::InvalidSquare(s.to_string())),
    };

    Ok(Square::new(file, rank))
}

/// Convert a standard castling move (e1g1) to cozy-chess notation (e1h1).
///
/// Only moves made by a king travelling two files along its home rank are
/// touched; everything else comes back unchanged.
pub fn castling_to_cozy(board: &Board, mv: Move) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }
    if !matches!(mv.from.rank(), Rank::First | Rank::Eighth) || mv.from.rank() != mv.to.rank() {
        return mv;
    }

    let rook_file = match (mv.from.file(), mv.to.file()) {
        (File::E, File::G) => File::H,
        (File::E, File::C) => File::A,
        _ => return mv,
    };

    Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    }
}

/// Convert a cozy-chess castling move (king takes own rook) to standard UCI.
pub fn castling_to_standard(board: &Board, mv: Move) -> Move {
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if !is_castle {
        return mv;
    }

    let king_file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
        File::G
    } else {
        File::C
    };

    Move {
        from: mv.from,
        to: Square::new(king_file, mv.from.rank()),
        promotion: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UciMoveError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASTLE_READY: &str = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn test_format_every_promotion_letter() {
        let cases = [
            (None, "b7b8"),
            (Some(Piece::Queen), "b7b8q"),
            (Some(Piece::Rook), "b7b8r"),
            (Some(Piece::Bishop), "b7b8b"),
            (Some(Piece::Knight), "b7b8n"),
        ];
        for (promotion, expected) in cases {
            let mv = Move {
                from: Square::new(File::B, Rank::Seventh),
                to: Square::new(File::B, Rank::Eighth),
                promotion,
            };
            assert_eq!(format_uci_move(mv), expected);
        }
    }

    #[test]
    fn test_square_names_at_the_corners() {
        for name in ["a1", "h1", "a8", "h8"] {
            assert_eq!(format_square(parse_square(name).unwrap()), name);
        }
        assert!(parse_square("a9").is_err());
        assert!(parse_square("e44").is_err());
    }

    #[test]
    fn test_parse_uci_move() {
        let mv = parse_uci_move("a7a8n").unwrap();
        assert_eq!(mv.from, Square::new(File::A, Rank::Seventh));
        assert_eq!(mv.to, Square::new(File::A, Rank::Eighth));
        assert_eq!(mv.promotion, Some(Piece::Knight));
        assert_eq!(format_uci_move(parse_uci_move("g1f3").unwrap()), "g1f3");
    }

    #[test]
    fn test_parse_uci_move_rejects_malformed() {
        assert!(matches!(parse_uci_move("e2"), Err(UciMoveError::InvalidMove(_))));
        assert!(matches!(parse_uci_move("z2e4"), Err(UciMoveError::InvalidSquare(_))));
        assert!(matches!(parse_uci_move("e7e8k"), Err(UciMoveError::InvalidPromotion(_))));
        assert!(matches!(parse_uci_move("e2e4é"), Err(UciMoveError::InvalidMove(_))));
    }

    #[test]
    fn test_castling_round_trip() {
        let board = Board::from_fen(CASTLE_READY, false).unwrap();
        let standard = parse_uci_move("e1g1").unwrap();
        let cozy = castling_to_cozy(&board, standard);
        assert_eq!(format_uci_move(cozy), "e1h1");
        assert_eq!(castling_to_standard(&board, cozy), standard);

        let long = castling_to_cozy(&board, parse_uci_move("e1c1").unwrap());
        assert_eq!(format_uci_move(long), "e1a1");
    }

    #[test]
    fn test_non_king_moves_are_untouched() {
        let board = Board::from_fen("k7/8/8/8/8/8/8/4Q1K1 w - - 0 1", false).unwrap();
        let queen_move = parse_uci_move("e1g1").unwrap();
        // Queen on e1, not a king: must not be rewritten.
        assert_eq!(castling_to_cozy(&board, queen_move), queen_move);
    }
}
