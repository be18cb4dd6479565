//! Rule configuration.
//!
//! Checkmate and stalemate are always in force; the automatic draw rules can
//! be switched off individually, e.g. for a casual table that prefers to let
//! players claim draws themselves.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// End the game as a draw when neither side can mate.
    pub insufficient_material: bool,
    /// End the game as a draw on the third occurrence of a position.
    pub threefold_repetition: bool,
    /// End the game as a draw after fifty moves without capture or pawn move.
    pub fifty_move_rule: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            insufficient_material: true,
            threefold_repetition: true,
            fifty_move_rule: true,
        }
    }
}

impl RuleConfig {
    /// Only checkmate and stalemate end the game.
    pub fn without_automatic_draws() -> Self {
        Self {
            insufficient_material: false,
            threefold_repetition: false,
            fifty_move_rule: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
