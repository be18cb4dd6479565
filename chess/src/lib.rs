//! Standard chess rules for the workspace, backed by cozy-chess.
//!
//! Legal move generation, check and draw detection, FEN, UCI coordinates,
//! SAN and PGN movetext. Variant rules live in the crates built on top.

pub mod fen;
pub mod pgn;
pub mod position;
pub mod types;
pub mod uci;

pub use fen::{format_fen, is_starting_fen, parse_fen, FenError, STARTING_FEN};
pub use pgn::{
    parse_document, tokenize, PgnDocument, ResultToken, SanError, TagError, Token, TokenKind,
};
pub use position::{Position, PositionError};
pub use types::Side;
pub use uci::{format_square, format_uci_move, parse_square, parse_uci_move, UciMoveError};

pub use cozy_chess::{Move, Piece, Square};
