pub mod movetext;
pub mod san;
pub mod tags;

pub use movetext::{looks_like_san, tokenize, ResultToken, Token, TokenKind};
pub use san::{format_san, parse_san, SanError};
pub use tags::{parse_document, PgnDocument, TagError};
