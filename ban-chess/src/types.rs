//! Value types shared by the engine, the codec and the record service.

use chess::{format_square, parse_square, Move, Piece, ResultToken, Side, Square};
use serde::{Deserialize, Serialize};

/// A move forbidden for exactly one upcoming ply, identified by its squares.
///
/// Promotion choice is not part of a ban: banning a pawn's step to the last
/// rank forbids every promotion of that step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BannedMove {
    pub from: Square,
    pub to: Square,
}

impl BannedMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Whether `mv` is forbidden by this ban.
    pub fn matches(&self, mv: Move) -> bool {
        mv.from == self.from && mv.to == self.to
    }

    /// Parse a coordinate token such as `e7e5`. A fifth promotion letter is
    /// accepted and dropped.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if !token.is_ascii() || !(4..=5).contains(&token.len()) {
            return None;
        }
        if token.len() == 5 && !matches!(&token[4..], "q" | "r" | "b" | "n") {
            return None;
        }
        let from = parse_square(&token[0..2]).ok()?;
        let to = parse_square(&token[2..4]).ok()?;
        Some(Self { from, to })
    }
}

impl From<Move> for BannedMove {
    fn from(mv: Move) -> Self {
        Self::new(mv.from, mv.to)
    }
}

impl From<BannedMove> for String {
    fn from(ban: BannedMove) -> Self {
        ban.to_string()
    }
}

impl TryFrom<String> for BannedMove {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid ban token: {}", value))
    }
}

impl std::fmt::Display for BannedMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", format_square(self.from), format_square(self.to))
    }
}

/// A ban as it was imposed: the move and the side that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ban {
    pub mv: BannedMove,
    pub by: Side,
}

/// One committed half-move plus the ban that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    pub index: usize,
    pub mover: Side,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub san: String,
    pub fen_after: String,
    pub ban: Option<Ban>,
}

impl Ply {
    pub fn mv(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    pub fn uci(&self) -> String {
        chess::format_uci_move(self.mv())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::White => Self::WhiteWins,
            Side::Black => Self::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Self::WhiteWins => Some(Side::White),
            Self::BlackWins => Some(Side::Black),
            Self::Draw => None,
        }
    }

    pub fn token(self) -> ResultToken {
        match self {
            Self::WhiteWins => ResultToken::WhiteWins,
            Self::BlackWins => ResultToken::BlackWins,
            Self::Draw => ResultToken::Draw,
        }
    }

    pub fn from_token(token: ResultToken) -> Option<Self> {
        match token {
            ResultToken::WhiteWins => Some(Self::WhiteWins),
            ResultToken::BlackWins => Some(Self::BlackWins),
            ResultToken::Draw => Some(Self::Draw),
            ResultToken::Ongoing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    Resignation,
    Timeout,
    Agreement,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::InsufficientMaterial => "insufficient_material",
            Self::ThreefoldRepetition => "threefold_repetition",
            Self::FiftyMoveRule => "fifty_move_rule",
            Self::Resignation => "resignation",
            Self::Timeout => "timeout",
            Self::Agreement => "agreement",
        }
    }

    /// Endings decided outside the board, which a replay cannot re-derive.
    pub fn is_external(self) -> bool {
        matches!(self, Self::Resignation | Self::Timeout | Self::Agreement)
    }

    pub fn parse_external(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "resignation" => Some(Self::Resignation),
            "timeout" => Some(Self::Timeout),
            "agreement" => Some(Self::Agreement),
            _ => None,
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whose action the game is waiting for, or how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    /// `banner` must forbid one of the opponent's legal moves.
    AwaitingBan { banner: Side },
    /// `mover` must play a legal move other than the active ban.
    AwaitingMove { mover: Side },
    Ended { result: GameResult, reason: EndReason },
}

impl GamePhase {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingBan { .. } => "awaiting ban",
            Self::AwaitingMove { .. } => "awaiting move",
            Self::Ended { .. } => "ended",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingBan { banner } => write!(f, "{} to ban", banner),
            Self::AwaitingMove { mover } => write!(f, "{} to move", mover),
            Self::Ended { result, reason } => match result.winner() {
                Some(side) => write!(f, "{} wins by {}", side, reason),
                None => write!(f, "draw by {}", reason),
            },
        }
    }
}
