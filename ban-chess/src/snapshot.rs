use chess::{format_square, Side};
use serde::Serialize;

use crate::engine::MoveDescription;
use crate::types::{BannedMove, GamePhase, Ply};

/// Complete, immutable snapshot of engine state for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub fen: String,
    pub side_to_move: Side,
    pub phase: GamePhase,
    pub active_ban: Option<BannedMove>,
    pub in_check: bool,
    pub legal_moves: Vec<MoveDescription>,
    pub legal_bans: Vec<String>,
    pub ply_count: usize,
    pub last_move: Option<(String, String)>,
    pub history: Vec<PlyRecord>,
}

/// A single ply in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlyRecord {
    pub index: usize,
    pub mover: Side,
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
    pub san: String,
    pub fen_after: String,
    pub banned: Option<BannedMove>,
    pub banned_by: Option<Side>,
}

impl From<&Ply> for PlyRecord {
    fn from(ply: &Ply) -> Self {
        let uci = ply.uci();
        Self {
            index: ply.index,
            mover: ply.mover,
            from: format_square(ply.from),
            to: format_square(ply.to),
            promotion: (uci.len() == 5).then(|| uci[4..].to_string()),
            san: ply.san.clone(),
            fen_after: ply.fen_after.clone(),
            banned: ply.ban.map(|b| b.mv),
            banned_by: ply.ban.map(|b| b.by),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::BanChessEngine;

    #[test]
    fn test_snapshot_initial() {
        let snap = BanChessEngine::new().snapshot();
        assert_eq!(snap.ply_count, 0);
        assert_eq!(snap.side_to_move.as_str(), "white");
        assert!(!snap.in_check);
        assert_eq!(snap.legal_bans.len(), 20);
        assert!(snap.last_move.is_none());
    }

    #[test]
    fn test_snapshot_after_move() {
        let mut engine = BanChessEngine::new();
        engine.submit_ban_uci("d2d4").unwrap();
        engine.submit_move_uci("e2e4").unwrap();
        let snap = engine.snapshot();
        assert_eq!(snap.ply_count, 1);
        assert_eq!(snap.last_move, Some(("e2".into(), "e4".into())));
        assert_eq!(snap.history[0].banned.map(|b| b.to_string()), Some("d2d4".into()));
        assert_eq!(snap.history[0].banned_by.map(|s| s.as_str()), Some("black"));
        assert!(!snap.legal_moves.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut engine = BanChessEngine::new();
        engine.submit_ban_uci("e2e4").unwrap();
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["phase"]["phase"], "awaiting_move");
        assert_eq!(json["phase"]["mover"], "white");
        assert_eq!(json["active_ban"], "e2e4");
        assert_eq!(json["legal_moves"].as_array().unwrap().len(), 19);
    }
}
