pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod snapshot;
pub mod types;

pub use codec::{encode_ban, extract_all_bans, extract_ban, split_movetext, AnnotatedMovetext};
pub use config::RuleConfig;
pub use engine::{BanChessEngine, MoveDescription};
pub use error::{BanChessError, BanChessResult};
pub use record::{GameRecord, GameRecordService, PlayerAction};
pub use snapshot::{GameSnapshot, PlyRecord};
pub use types::{Ban, BannedMove, EndReason, GamePhase, GameResult, Ply};
