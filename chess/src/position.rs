use cozy_chess::{BitBoard, Board, Color, Move, Piece, Rank, Square};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::pgn::san::{format_san, parse_san, SanError};
use crate::types::Side;
use crate::uci::{castling_to_cozy, castling_to_standard, format_uci_move};

/// Immutable chess position: the board plus every position reached on the
/// way here, so repetition can be judged without the caller's help.
///
/// All moves going in and out use standard UCI coordinates (castling as the
/// king's two-square step).
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    seen: Vec<u64>,
}

impl Position {
    /// The standard starting position
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_board(parse_fen(fen)?))
    }

    fn from_board(board: Board) -> Self {
        let seen = vec![repetition_key(&board)];
        Self { board, seen }
    }

    pub fn side_to_move(&self) -> Side {
        self.board.side_to_move().into()
    }

    pub fn fullmove_number(&self) -> u16 {
        self.board.fullmove_number()
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.board)
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        standard_moves(&self.board)
    }

    /// Legal moves for `side`, whether or not it is on move.
    ///
    /// For the waiting side this is what it could play if it were its turn.
    /// That is undefined while the side to move is in check, and comes back
    /// empty.
    pub fn legal_moves_for(&self, side: Side) -> Vec<Move> {
        if side == self.side_to_move() {
            return self.legal_moves();
        }
        match self.passed() {
            Some(board) => standard_moves(&board),
            None => Vec::new(),
        }
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// Play a move, returning the resulting position.
    pub fn apply_move(&self, mv: Move) -> Result<Position, PositionError> {
        if !self.is_legal(mv) {
            return Err(PositionError::IllegalMove(format_uci_move(mv)));
        }

        let mut board = self.board.clone();
        board.play_unchecked(castling_to_cozy(&self.board, mv));

        let mut seen = self.seen.clone();
        seen.push(repetition_key(&board));
        Ok(Position { board, seen })
    }

    /// Whether `side`'s king is attacked. A legal position never leaves the
    /// side that just moved in check, so only the side to move can answer yes.
    pub fn is_in_check(&self, side: Side) -> bool {
        side == self.side_to_move() && !self.board.checkers().is_empty()
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.side_to_move()) && !self.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.side_to_move()) && !self.has_legal_move()
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops that all stand on one square color.
    pub fn has_insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if knights.len() + bishops.len() <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }

        let light = count_light_squares(bishops);
        light == 0 || light == bishops.len()
    }

    /// The current position has occurred at least three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = repetition_key(&self.board);
        self.seen.iter().filter(|h| **h == current).count() >= 3
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.board.halfmove_clock() >= 100
    }

    /// SAN for a legal move in this position.
    pub fn san(&self, mv: Move) -> Result<String, PositionError> {
        if !self.is_legal(mv) {
            return Err(PositionError::IllegalMove(format_uci_move(mv)));
        }
        Ok(format_san(&self.board, castling_to_cozy(&self.board, mv)))
    }

    /// Resolve SAN text to a legal move.
    pub fn parse_san(&self, san: &str) -> Result<Move, SanError> {
        let mv = parse_san(&self.board, san)?;
        Ok(castling_to_standard(&self.board, mv))
    }

    fn has_legal_move(&self) -> bool {
        self.board.generate_moves(|mvs| mvs.into_iter().next().is_some())
    }

    /// The same placement with the other side on move, if that is legal.
    fn passed(&self) -> Option<Board> {
        let fen = self.to_fen();
        let mut fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return None;
        }
        fields[1] = match self.side_to_move() {
            Side::White => "b",
            Side::Black => "w",
        };
        fields[3] = "-";
        Board::from_fen(&fields.join(" "), false).ok()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

fn standard_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs.into_iter().map(|mv| castling_to_standard(board, mv)));
        false
    });
    moves
}

/// Hash identifying a position for repetition. An en-passant square only
/// distinguishes positions while the capture is actually playable.
fn repetition_key(board: &Board) -> u64 {
    let Some(file) = board.en_passant() else {
        return board.hash();
    };
    let target_rank = match board.side_to_move() {
        Color::White => Rank::Sixth,
        Color::Black => Rank::Third,
    };
    let target = Square::new(file, target_rank);
    let capturable = board.generate_moves(|mvs| {
        mvs.into_iter()
            .any(|mv| mv.to == target && board.piece_on(mv.from) == Some(Piece::Pawn))
    });
    if capturable {
        return board.hash();
    }

    without_en_passant(board).map_or_else(|| board.hash(), |b| b.hash())
}

fn without_en_passant(board: &Board) -> Option<Board> {
    let fen = format_fen(board);
    let mut fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return None;
    }
    fields[3] = "-";
    Board::from_fen(&fields.join(" "), false).ok()
}

fn count_light_squares(squares: BitBoard) -> u32 {
    squares
        .into_iter()
        .filter(|sq: &Square| (sq.file() as u8 + sq.rank() as u8) % 2 == 1)
        .count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_uci_move;
    use proptest::prelude::*;

    fn mv(s: &str) -> Move {
        parse_uci_move(s).unwrap()
    }

    fn play(pos: &Position, moves: &[&str]) -> Position {
        moves
            .iter()
            .fold(pos.clone(), |p, m| p.apply_move(mv(m)).unwrap())
    }

    #[test]
    fn test_initial_position() {
        let pos = Position::new();
        assert_eq!(pos.side_to_move(), Side::White);
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(!pos.is_in_check(Side::White));
        assert!(!pos.is_checkmate());
        assert!(!pos.is_stalemate());
    }

    #[test]
    fn test_waiting_side_moves() {
        let pos = Position::new();
        let black = pos.legal_moves_for(Side::Black);
        assert_eq!(black.len(), 20);
        assert!(black.contains(&mv("e7e5")));
    }

    #[test]
    fn test_apply_move_rejects_illegal() {
        let pos = Position::new();
        assert_eq!(
            pos.apply_move(mv("e2e5")).unwrap_err(),
            PositionError::IllegalMove("e2e5".into())
        );
        let next = pos.apply_move(mv("e2e4")).unwrap();
        assert_eq!(next.side_to_move(), Side::Black);
        // The original value is untouched.
        assert_eq!(pos.side_to_move(), Side::White);
    }

    #[test]
    fn test_castling_uses_standard_coordinates() {
        let pos = Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let moves = pos.legal_moves();
        assert!(moves.contains(&mv("e1g1")));
        assert!(moves.contains(&mv("e1c1")));
        assert!(!moves.contains(&mv("e1h1")));

        let after = pos.apply_move(mv("e1g1")).unwrap();
        assert!(after.to_fen().starts_with("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 b kq"));
        assert_eq!(pos.san(mv("e1c1")).unwrap(), "O-O-O");
        assert_eq!(pos.parse_san("O-O").unwrap(), mv("e1g1"));
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let mated = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(mated.is_checkmate());
        assert!(mated.is_in_check(Side::Black));

        let stalemated = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stalemated.is_stalemate());
        assert!(!stalemated.is_checkmate());
    }

    #[test]
    fn test_insufficient_material() {
        let bare = Position::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(bare.has_insufficient_material());

        let knight = Position::from_fen("8/8/4k3/8/8/3K4/8/6N1 w - - 0 1").unwrap();
        assert!(knight.has_insufficient_material());

        // c1 and f8 are both dark squares.
        let same_color = Position::from_fen("5b2/8/4k3/8/8/3K4/8/2B5 w - - 0 1").unwrap();
        assert!(same_color.has_insufficient_material());

        let opposite = Position::from_fen("4b3/8/4k3/8/8/3K4/8/2B5 w - - 0 1").unwrap();
        assert!(!opposite.has_insufficient_material());

        assert!(!Position::new().has_insufficient_material());
    }

    #[test]
    fn test_threefold_repetition() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let once = play(&Position::new(), &shuffle);
        assert!(!once.is_threefold_repetition());
        let twice = play(&once, &shuffle);
        assert!(twice.is_threefold_repetition());
    }

    #[test]
    fn test_repetition_ignores_uncapturable_en_passant() {
        // The first occurrence follows a double push nobody can capture.
        let shuffle = ["g8f6", "g1f3", "f6g8", "f3g1"];
        let opened = play(&Position::new(), &["e2e4"]);
        let twice = play(&opened, &shuffle);
        assert!(!twice.is_threefold_repetition());
        let thrice = play(&twice, &shuffle);
        assert_eq!(
            thrice.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 8 5"
        );
        assert!(thrice.is_threefold_repetition());
    }

    #[test]
    fn test_repetition_keeps_capturable_en_passant() {
        // After d7d5 the e5 pawn may take en passant; once that chance is
        // gone the same placement counts as a different position.
        let start = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let pushed = play(&start, &["d7d5"]);
        let shuffle = ["e1e2", "e8e7", "e2e1", "e7e8"];
        let first = play(&pushed, &shuffle);
        let second = play(&first, &shuffle);
        assert!(!second.is_threefold_repetition());
        assert!(play(&second, &shuffle).is_threefold_repetition());
    }

    #[test]
    fn test_fifty_move_rule() {
        let pos = Position::from_fen("8/8/4k3/8/8/3K4/8/R7 w - - 99 80").unwrap();
        assert!(!pos.is_fifty_move_draw());
        let after = pos.apply_move(mv("a1a2")).unwrap();
        assert!(after.is_fifty_move_draw());
    }

    proptest! {
        #[test]
        fn san_round_trips_along_random_games(choices in prop::collection::vec(any::<u16>(), 0..60)) {
            let mut pos = Position::new();
            for choice in choices {
                let moves = pos.legal_moves();
                if moves.is_empty() {
                    break;
                }
                for m in &moves {
                    let san = pos.san(*m).unwrap();
                    prop_assert_eq!(pos.parse_san(&san).unwrap(), *m);
                }
                pos = pos.apply_move(moves[choice as usize % moves.len()]).unwrap();
            }
        }
    }
}
