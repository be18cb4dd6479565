use cozy_chess::Board;

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.is_empty() {
        return Err(FenError::Empty);
    }
    if parts.len() != 6 {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }

    Board::from_fen(&parts.join(" "), false).map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Whether `fen` describes the standard initial position, ignoring spacing.
pub fn is_starting_fen(fen: &str) -> bool {
    fen.split_whitespace().eq(STARTING_FEN.split_whitespace())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN")]
    Empty,
    #[error("Invalid FEN: {0}")]
    InvalidFormat(String),
}
