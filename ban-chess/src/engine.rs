//! The ban/move state machine.
//!
//! Before every move the waiting player bans one of the mover's legal moves;
//! the mover then plays any legal move except the banned one. Black bans
//! first, so White's opening move is already constrained.
//!
//! Every transition validates completely before touching state, so a failed
//! call leaves the engine exactly as it was.

use chess::{format_square, format_uci_move, Move, Piece, Position, Side, Square};
use serde::Serialize;

use crate::config::RuleConfig;
use crate::error::{BanChessError, BanChessResult};
use crate::snapshot::{GameSnapshot, PlyRecord};
use crate::types::{Ban, BannedMove, EndReason, GamePhase, GameResult, Ply};

/// A move the current mover may play, in both notations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveDescription {
    pub uci: String,
    pub san: String,
}

#[derive(Debug, Clone)]
pub struct BanChessEngine {
    rules: RuleConfig,
    start: Position,
    position: Position,
    phase: GamePhase,
    active_ban: Option<BannedMove>,
    history: Vec<Ply>,
}

impl BanChessEngine {
    /// A new game from the standard starting position with default rules.
    pub fn new() -> Self {
        Self::with_rules(RuleConfig::default())
    }

    pub fn with_rules(rules: RuleConfig) -> Self {
        Self::from_position(Position::new(), rules)
    }

    /// A new game from an arbitrary position. The waiting side bans first.
    pub fn from_fen(fen: &str, rules: RuleConfig) -> BanChessResult<Self> {
        Ok(Self::from_position(Position::from_fen(fen)?, rules))
    }

    fn from_position(position: Position, rules: RuleConfig) -> Self {
        let banner = position.side_to_move().opponent();
        let mut engine = Self {
            rules,
            start: position.clone(),
            position,
            phase: GamePhase::AwaitingBan { banner },
            active_ban: None,
            history: Vec::new(),
        };
        if let Some((result, reason)) = engine.evaluate_termination(true) {
            engine.phase = GamePhase::Ended { result, reason };
        }
        engine
    }

    // ---- transitions ----

    /// Forbid `from`-`to` for the upcoming move.
    ///
    /// The squares must name a legal move of the side about to move. If the
    /// ban leaves that side with nothing to play the game ends on the spot:
    /// checkmate when in check, stalemate otherwise.
    pub fn submit_ban(&mut self, from: Square, to: Square) -> BanChessResult<GamePhase> {
        let ban = BannedMove::new(from, to);
        let GamePhase::AwaitingBan { banner } = self.phase else {
            return Err(BanChessError::InvalidBan(format!(
                "{} cannot be banned while {}",
                ban, self.phase
            )));
        };

        let mover = banner.opponent();
        if !self.position.legal_moves().iter().any(|mv| ban.matches(*mv)) {
            return Err(BanChessError::InvalidBan(format!(
                "{} is not a legal move for {}",
                ban, mover
            )));
        }

        self.active_ban = Some(ban);
        self.phase = match self.evaluate_termination(false) {
            Some((result, reason)) => GamePhase::Ended { result, reason },
            None => GamePhase::AwaitingMove { mover },
        };

        tracing::debug!(%banner, ban = %ban, phase = %self.phase, "Ban submitted");
        Ok(self.phase)
    }

    /// Play a move for the side to move. It must be legal and must not be
    /// the banned move.
    pub fn submit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> BanChessResult<Ply> {
        let mv = Move {
            from,
            to,
            promotion,
        };
        let GamePhase::AwaitingMove { mover } = self.phase else {
            return Err(BanChessError::WrongPhase(format!(
                "cannot play {} while {}",
                format_uci_move(mv),
                self.phase
            )));
        };

        if let Some(ban) = self.active_ban.filter(|ban| ban.matches(mv)) {
            return Err(BanChessError::InvalidMove(format!("{} is banned", ban)));
        }

        let san = self
            .position
            .san(mv)
            .map_err(|e| BanChessError::InvalidMove(e.to_string()))?;
        let next = self
            .position
            .apply_move(mv)
            .map_err(|e| BanChessError::InvalidMove(e.to_string()))?;

        let ply = Ply {
            index: self.history.len(),
            mover,
            from,
            to,
            promotion,
            san,
            fen_after: next.to_fen(),
            ban: self.active_ban.map(|banned| Ban {
                mv: banned,
                by: mover.opponent(),
            }),
        };

        self.position = next;
        self.active_ban = None;
        self.history.push(ply.clone());
        self.phase = match self.evaluate_termination(true) {
            Some((result, reason)) => GamePhase::Ended { result, reason },
            None => GamePhase::AwaitingBan { banner: mover },
        };

        tracing::debug!(
            ply = ply.index,
            %mover,
            san = %ply.san,
            phase = %self.phase,
            "Move committed"
        );
        Ok(ply)
    }

    /// Parse a ban given in coordinates ("e7e5") and submit it.
    pub fn submit_ban_uci(&mut self, token: &str) -> BanChessResult<GamePhase> {
        let ban = BannedMove::parse(token)
            .ok_or_else(|| BanChessError::InvalidBan(format!("unreadable ban: {}", token)))?;
        self.submit_ban(ban.from, ban.to)
    }

    /// Parse a move given in UCI ("e2e4", "e7e8q") and submit it.
    pub fn submit_move_uci(&mut self, token: &str) -> BanChessResult<Ply> {
        let mv = chess::parse_uci_move(token)
            .map_err(|e| BanChessError::InvalidMove(e.to_string()))?;
        self.submit_move(mv.from, mv.to, mv.promotion)
    }

    /// `side` gives up.
    pub fn resign(&mut self, side: Side) -> BanChessResult<GamePhase> {
        self.conclude(GameResult::win_for(side.opponent()), EndReason::Resignation)
    }

    /// `side` ran out of time on the caller's clock.
    pub fn flag(&mut self, side: Side) -> BanChessResult<GamePhase> {
        self.conclude(GameResult::win_for(side.opponent()), EndReason::Timeout)
    }

    pub fn agree_draw(&mut self) -> BanChessResult<GamePhase> {
        self.conclude(GameResult::Draw, EndReason::Agreement)
    }

    /// Skip the ban for the upcoming move. Only replay of records written
    /// without annotations needs this.
    pub(crate) fn waive_ban(&mut self) -> BanChessResult<GamePhase> {
        let GamePhase::AwaitingBan { banner } = self.phase else {
            return Err(BanChessError::WrongPhase(format!(
                "no ban to waive while {}",
                self.phase
            )));
        };
        self.phase = GamePhase::AwaitingMove {
            mover: banner.opponent(),
        };
        Ok(self.phase)
    }

    fn conclude(&mut self, result: GameResult, reason: EndReason) -> BanChessResult<GamePhase> {
        if self.phase.is_ended() {
            return Err(BanChessError::WrongPhase(format!(
                "game already over: {}",
                self.phase
            )));
        }
        self.phase = GamePhase::Ended { result, reason };
        tracing::debug!(phase = %self.phase, "Game concluded");
        Ok(self.phase)
    }

    /// Ending, if any, for the current position under the active ban.
    /// Draw rules only apply after a move; a ban cannot change the board.
    fn evaluate_termination(&self, after_move: bool) -> Option<(GameResult, EndReason)> {
        let to_move = self.position.side_to_move();

        if self.moves_minus_ban().is_empty() {
            return Some(if self.position.is_in_check(to_move) {
                (GameResult::win_for(to_move.opponent()), EndReason::Checkmate)
            } else {
                (GameResult::Draw, EndReason::Stalemate)
            });
        }

        if !after_move {
            return None;
        }
        if self.rules.insufficient_material && self.position.has_insufficient_material() {
            return Some((GameResult::Draw, EndReason::InsufficientMaterial));
        }
        if self.rules.threefold_repetition && self.position.is_threefold_repetition() {
            return Some((GameResult::Draw, EndReason::ThreefoldRepetition));
        }
        if self.rules.fifty_move_rule && self.position.is_fifty_move_draw() {
            return Some((GameResult::Draw, EndReason::FiftyMoveRule));
        }
        None
    }

    fn moves_minus_ban(&self) -> Vec<Move> {
        let mut moves = self.position.legal_moves();
        if let Some(ban) = self.active_ban {
            moves.retain(|mv| !ban.matches(*mv));
        }
        moves
    }

    // ---- queries ----

    /// Moves the side to move may play now: its legal moves minus the active
    /// ban. Empty once the game is over.
    pub fn effective_legal_moves(&self) -> Vec<Move> {
        if self.phase.is_ended() {
            return Vec::new();
        }
        self.moves_minus_ban()
    }

    /// Moves the banner may choose from. Empty outside the ban phase.
    pub fn effective_legal_bans(&self) -> Vec<BannedMove> {
        if !matches!(self.phase, GamePhase::AwaitingBan { .. }) {
            return Vec::new();
        }
        let mut bans: Vec<BannedMove> = Vec::new();
        for mv in self.position.legal_moves() {
            let ban = BannedMove::from(mv);
            // Four promotions share one ban.
            if !bans.contains(&ban) {
                bans.push(ban);
            }
        }
        bans
    }

    /// Effective legal moves starting on `square`.
    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.effective_legal_moves()
            .into_iter()
            .filter(|mv| mv.from == square)
            .collect()
    }

    /// Effective legal moves with their SAN, for display.
    pub fn describe_moves(&self) -> Vec<MoveDescription> {
        self.effective_legal_moves()
            .into_iter()
            .filter_map(|mv| {
                let san = self.position.san(mv).ok()?;
                Some(MoveDescription {
                    uci: format_uci_move(mv),
                    san,
                })
            })
            .collect()
    }

    pub fn is_in_check(&self) -> bool {
        self.position.is_in_check(self.position.side_to_move())
    }

    pub fn current_phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_position(&self) -> &Position {
        &self.position
    }

    pub fn start_position(&self) -> &Position {
        &self.start
    }

    pub fn start_fen(&self) -> String {
        self.start.to_fen()
    }

    pub fn side_to_move(&self) -> Side {
        self.position.side_to_move()
    }

    pub fn active_ban(&self) -> Option<BannedMove> {
        self.active_ban
    }

    pub fn history(&self) -> &[Ply] {
        &self.history
    }

    pub fn last_ply(&self) -> Option<&Ply> {
        self.history.last()
    }

    pub fn rules(&self) -> RuleConfig {
        self.rules
    }

    pub fn result(&self) -> Option<(GameResult, EndReason)> {
        match self.phase {
            GamePhase::Ended { result, reason } => Some((result, reason)),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_ended()
    }

    /// Build a full snapshot of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.position.to_fen(),
            side_to_move: self.side_to_move(),
            phase: self.phase,
            active_ban: self.active_ban,
            in_check: self.is_in_check(),
            legal_moves: self.describe_moves(),
            legal_bans: self
                .effective_legal_bans()
                .iter()
                .map(ToString::to_string)
                .collect(),
            ply_count: self.history.len(),
            last_move: self
                .last_ply()
                .map(|p| (format_square(p.from), format_square(p.to))),
            history: self.history.iter().map(PlyRecord::from).collect(),
        }
    }
}

impl Default for BanChessEngine {
    fn default() -> Self {
        Self::new()
    }
}
