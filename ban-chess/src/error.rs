use chess::FenError;

pub type BanChessResult<T> = Result<T, BanChessError>;

/// Failures surfaced by the engine and the record service.
///
/// Callers racing on a shared record should treat `InvalidBan`,
/// `InvalidMove` and `CorruptRecord` from a stale write as "refetch and
/// retry".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BanChessError {
    #[error("Invalid ban: {0}")]
    InvalidBan(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Wrong phase: {0}")]
    WrongPhase(String),

    #[error("Corrupt record at ply {ply}: {reason}")]
    CorruptRecord { ply: usize, reason: String },

    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] FenError),
}

impl BanChessError {
    /// Wrap any failure met while replaying ply `ply` of a stored record.
    pub(crate) fn corrupt(ply: usize, source: impl std::fmt::Display) -> Self {
        Self::CorruptRecord {
            ply,
            reason: source.to_string(),
        }
    }
}
