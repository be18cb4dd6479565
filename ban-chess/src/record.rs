//! Persisted game records and their conversion to and from live engines.
//!
//! A record is the only artifact that gets stored or sent: the start FEN and
//! annotated movetext. Engine state is always rebuilt from it by replay.

use chess::{is_starting_fen, parse_document, PgnDocument, Piece, ResultToken, Side, Square};
use serde::{Deserialize, Serialize};

use crate::codec::{encode_ban, encode_termination, split_movetext};
use crate::config::RuleConfig;
use crate::engine::BanChessEngine;
use crate::error::{BanChessError, BanChessResult};
use crate::types::{GamePhase, GameResult, Ply};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub start_fen: String,
    pub movetext: String,
}

impl GameRecord {
    /// An empty game from the standard starting position.
    pub fn new() -> Self {
        Self::from_fen(chess::STARTING_FEN)
    }

    pub fn from_fen(fen: &str) -> Self {
        Self {
            start_fen: fen.to_string(),
            movetext: String::new(),
        }
    }

    /// Render as a PGN document. FEN/SetUp tags appear only for
    /// non-standard starts; ongoing games end in `*`.
    pub fn to_pgn(&self) -> String {
        let result = split_movetext(&self.movetext)
            .result
            .unwrap_or(ResultToken::Ongoing);

        let mut tags = Vec::new();
        if !is_starting_fen(&self.start_fen) {
            tags.push(("SetUp".to_string(), "1".to_string()));
            tags.push(("FEN".to_string(), self.start_fen.clone()));
        }
        tags.push(("Result".to_string(), result.as_str().to_string()));

        let movetext = match result {
            ResultToken::Ongoing if self.movetext.is_empty() => "*".to_string(),
            ResultToken::Ongoing => format!("{} *", self.movetext),
            _ => self.movetext.clone(),
        };

        PgnDocument { tags, movetext }.render()
    }

    /// Read a PGN document. Unknown tags are ignored; without a FEN tag the
    /// standard start is assumed. A closing `*` is dropped.
    pub fn from_pgn(text: &str) -> BanChessResult<Self> {
        let doc = parse_document(text).map_err(|e| BanChessError::corrupt(0, e))?;
        let start_fen = doc.tag("FEN").unwrap_or(chess::STARTING_FEN).to_string();

        let movetext = doc.movetext.trim();
        let movetext = movetext
            .strip_suffix('*')
            .map(str::trim_end)
            .unwrap_or(movetext)
            .to_string();

        Ok(Self {
            start_fen,
            movetext,
        })
    }
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Something a player does to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Ban {
        from: Square,
        to: Square,
    },
    Move {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
    Resign(Side),
    Flag(Side),
    AgreeDraw,
}

/// Converts between stored records and live engines.
#[derive(Debug, Clone, Default)]
pub struct GameRecordService {
    rules: RuleConfig,
}

impl GameRecordService {
    pub fn new(rules: RuleConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> RuleConfig {
        self.rules
    }

    /// Replay a record into an engine. Any ply that fails to apply makes the
    /// whole record corrupt; no partial state is returned.
    pub fn reconstruct(&self, record: &GameRecord) -> BanChessResult<BanChessEngine> {
        let mut engine = BanChessEngine::from_fen(&record.start_fen, self.rules)
            .map_err(|e| BanChessError::corrupt(0, e))?;
        let parsed = split_movetext(&record.movetext);

        for (index, ply) in parsed.plies.iter().enumerate() {
            let banned = match ply.ban {
                Some(ban) => engine.submit_ban(ban.from, ban.to),
                None => engine.waive_ban(),
            };
            banned.map_err(|e| BanChessError::corrupt(index, e))?;

            let mv = engine
                .current_position()
                .parse_san(&ply.san)
                .map_err(|e| BanChessError::corrupt(index, e))?;
            engine
                .submit_move(mv.from, mv.to, mv.promotion)
                .map_err(|e| BanChessError::corrupt(index, e))?;
        }

        let ply_count = parsed.plies.len();
        if let Some(ban) = parsed.trailing_ban {
            engine
                .submit_ban(ban.from, ban.to)
                .map_err(|e| BanChessError::corrupt(ply_count, e))?;
        }

        if let Some(claimed) = parsed.result.and_then(GameResult::from_token) {
            settle_result(&mut engine, claimed, parsed.termination)
                .map_err(|reason| BanChessError::corrupt(ply_count, reason))?;
        }

        tracing::debug!(
            plies = ply_count,
            phase = %engine.current_phase(),
            "Record reconstructed"
        );
        Ok(engine)
    }

    /// Write an engine's history back out as a record.
    pub fn serialize(&self, engine: &BanChessEngine) -> GameRecord {
        let start = engine.start_position();
        let first_number = u32::from(start.fullmove_number());
        let black_first = start.side_to_move() == Side::Black;
        let mut parts: Vec<String> = Vec::new();

        for ply in engine.history() {
            if let Some(ban) = ply.ban {
                parts.push(encode_ban(ban.mv));
            }
            let number = first_number + (ply.index as u32 + u32::from(black_first)) / 2;
            match ply.mover {
                Side::White => parts.push(format!("{}.", number)),
                Side::Black if ply.index == 0 => parts.push(format!("{}...", number)),
                Side::Black => {}
            }
            parts.push(ply.san.clone());
        }

        if let Some(ban) = engine.active_ban() {
            parts.push(encode_ban(ban));
        }
        if let GamePhase::Ended { result, reason } = engine.current_phase() {
            if reason.is_external() {
                parts.push(encode_termination(reason));
            }
            parts.push(result.token().as_str().to_string());
        }

        GameRecord {
            start_fen: engine.start_fen(),
            movetext: parts.join(" "),
        }
    }

    /// Replay `record`, apply `action`, and write the result back out.
    ///
    /// Callers sharing a record must serialize these calls; a write built on
    /// a stale record fails validation and should be retried after refetch.
    pub fn apply(
        &self,
        record: &GameRecord,
        action: PlayerAction,
    ) -> BanChessResult<(GameRecord, Option<Ply>)> {
        let mut engine = self.reconstruct(record)?;
        let ply = match action {
            PlayerAction::Ban { from, to } => {
                engine.submit_ban(from, to)?;
                None
            }
            PlayerAction::Move {
                from,
                to,
                promotion,
            } => Some(engine.submit_move(from, to, promotion)?),
            PlayerAction::Resign(side) => {
                engine.resign(side)?;
                None
            }
            PlayerAction::Flag(side) => {
                engine.flag(side)?;
                None
            }
            PlayerAction::AgreeDraw => {
                engine.agree_draw()?;
                None
            }
        };
        Ok((self.serialize(&engine), ply))
    }

    pub fn append_move(
        &self,
        record: &GameRecord,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> BanChessResult<(GameRecord, Ply)> {
        let mut engine = self.reconstruct(record)?;
        let ply = engine.submit_move(from, to, promotion)?;
        Ok((self.serialize(&engine), ply))
    }

    pub fn append_ban(
        &self,
        record: &GameRecord,
        from: Square,
        to: Square,
    ) -> BanChessResult<GameRecord> {
        let (record, _) = self.apply(record, PlayerAction::Ban { from, to })?;
        Ok(record)
    }
}

/// Reconcile a record's result token with the replayed game.
fn settle_result(
    engine: &mut BanChessEngine,
    claimed: GameResult,
    termination: Option<crate::types::EndReason>,
) -> Result<(), String> {
    use crate::types::EndReason;

    if let Some((result, reason)) = engine.result() {
        if result == claimed {
            return Ok(());
        }
        return Err(format!(
            "result {} contradicts {}",
            claimed.token().as_str(),
            reason
        ));
    }

    let outcome = match (termination, claimed.winner()) {
        (Some(EndReason::Resignation), Some(winner)) => engine.resign(winner.opponent()),
        (Some(EndReason::Timeout), Some(winner)) => engine.flag(winner.opponent()),
        (Some(EndReason::Agreement), None) => engine.agree_draw(),
        (Some(reason), _) => {
            return Err(format!(
                "{} cannot end with {}",
                reason,
                claimed.token().as_str()
            ))
        }
        (None, _) => {
            return Err(format!(
                "result {} claimed but the game is still in progress",
                claimed.token().as_str()
            ))
        }
    };
    outcome.map(|_| ()).map_err(|e| e.to_string())
}
