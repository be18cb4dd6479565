//! Ban annotations inside PGN movetext.
//!
//! A ban travels as a comment placed in front of the move it constrained:
//!
//! ```text
//! {banning: e2e4} 1. d4 {banning: e7e5} e6 {banning: g1f3} 2. c4
//! ```
//!
//! Generic PGN readers see ordinary comments; this module recovers one
//! optional ban per ply. Decoding is lenient: braces may be missing, the
//! marker may sit before or after the move number, and anything that does
//! not parse is read as "no ban" so old records stay playable.

use chess::{tokenize, ResultToken, TokenKind};
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{BannedMove, EndReason};

lazy_static! {
    static ref BAN_RE: Regex =
        Regex::new(r"(?i)\{?\s*banning:\s*([a-h][1-8])([a-h][1-8])([qrbn])?(?:\s*\}|\s|$)")
            .expect("ban annotation pattern is valid");
    static ref TERMINATION_RE: Regex = Regex::new(r"(?i)\{?\s*termination:\s*([a-z_]+)\s*\}?")
        .expect("termination annotation pattern is valid");
}

const BAN_MARKER: &str = "banning:";

/// One move of the movetext with the ban found in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedPly {
    pub ban: Option<BannedMove>,
    pub san: String,
}

/// Movetext decoded into plies plus what follows the last move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedMovetext {
    pub plies: Vec<AnnotatedPly>,
    /// A ban placed after the last move that no move has answered yet.
    pub trailing_ban: Option<BannedMove>,
    /// `{termination: ...}` marker for endings decided off the board.
    pub termination: Option<EndReason>,
    pub result: Option<ResultToken>,
}

/// Canonical annotation for a ban: `{banning: e7e5}`.
pub fn encode_ban(ban: BannedMove) -> String {
    format!("{{banning: {}}}", ban)
}

/// Canonical annotation for an off-board ending: `{termination: resignation}`.
pub fn encode_termination(reason: EndReason) -> String {
    format!("{{termination: {}}}", reason.as_str())
}

/// Find the ban in one segment of movetext. First match wins; malformed
/// markers give `None`.
pub fn extract_ban(segment: &str) -> Option<BannedMove> {
    if let Some(caps) = BAN_RE.captures(segment) {
        let token = format!(
            "{}{}",
            caps[1].to_ascii_lowercase(),
            caps[2].to_ascii_lowercase()
        );
        return BannedMove::parse(&token);
    }

    if segment.to_ascii_lowercase().contains("banning") {
        tracing::warn!(segment = segment.trim(), "Ignoring malformed ban annotation");
    }
    None
}

/// One entry per ply, in document order, parallel to the move list.
pub fn extract_all_bans(movetext: &str) -> Vec<Option<BannedMove>> {
    split_movetext(movetext)
        .plies
        .into_iter()
        .map(|ply| ply.ban)
        .collect()
}

/// Split movetext into plies, attaching to each the ban written in the
/// segment between it and the previous move.
pub fn split_movetext(movetext: &str) -> AnnotatedMovetext {
    let mut out = AnnotatedMovetext::default();
    let mut segment_start = 0;
    let mut segment_end = movetext.len();
    let mut after_marker = false;

    for token in tokenize(movetext) {
        // The word after a bare `banning:` is the ban token, never a move.
        let marker_argument = std::mem::take(&mut after_marker);

        match token.kind {
            TokenKind::Other(word) if word.eq_ignore_ascii_case(BAN_MARKER) => {
                after_marker = true;
            }
            TokenKind::San(_) | TokenKind::Other(_) if marker_argument => {}
            TokenKind::San(san) => {
                let segment = &movetext[segment_start..token.span.start];
                out.plies.push(AnnotatedPly {
                    ban: extract_ban(segment),
                    san: san.to_string(),
                });
                segment_start = token.span.end;
            }
            TokenKind::Result(result) => {
                out.result = Some(result);
                segment_end = token.span.start;
                break;
            }
            _ => {}
        }
    }

    let trailing = &movetext[segment_start..segment_end.max(segment_start)];
    out.trailing_ban = extract_ban(trailing);
    out.termination = TERMINATION_RE
        .captures(trailing)
        .and_then(|caps| EndReason::parse_external(&caps[1]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ban(token: &str) -> Option<BannedMove> {
        BannedMove::parse(token)
    }

    #[test]
    fn test_encode_ban() {
        assert_eq!(encode_ban(ban("e7e5").unwrap()), "{banning: e7e5}");
        assert_eq!(
            encode_termination(EndReason::Resignation),
            "{termination: resignation}"
        );
    }

    #[test]
    fn test_extract_ban_with_and_without_braces() {
        assert_eq!(extract_ban("{banning: e7e5}"), ban("e7e5"));
        assert_eq!(extract_ban(" banning: d2d4 "), ban("d2d4"));
        assert_eq!(extract_ban("{Banning:g7g8q}"), ban("g7g8"));
        assert_eq!(extract_ban("{banning: E2E4}"), ban("e2e4"));
    }

    #[test]
    fn test_extract_ban_degrades_to_none() {
        assert_eq!(extract_ban(""), None);
        assert_eq!(extract_ban("{a quiet move}"), None);
        assert_eq!(extract_ban("{banning: z9e5}"), None);
        assert_eq!(extract_ban("{banning:}"), None);
    }

    #[test]
    fn test_extract_ban_rejects_trailing_garbage() {
        assert_eq!(extract_ban("{banning: e2e4x}"), None);
        assert_eq!(extract_ban("{banning: e7e5e6}"), None);
        assert_eq!(extract_ban("{banning: e7e8qq}"), None);
        assert_eq!(extract_ban("banning: e7e5"), ban("e7e5"));
        assert_eq!(extract_all_bans("1. e4 {banning: e7e5e6} e6"), vec![None, None]);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract_ban("{banning: e2e4} {banning: d2d4}"),
            ban("e2e4")
        );
    }

    #[test]
    fn test_extract_all_bans_aligns_with_plies() {
        assert_eq!(
            extract_all_bans("1. e4 {banning: e7e5} e6"),
            vec![None, ban("e7e5")]
        );
    }

    #[test]
    fn test_ban_before_or_after_move_number() {
        let before = extract_all_bans("{banning: e2e4} 1. d4 {banning: d7d5} e6");
        let after = extract_all_bans("1. {banning: e2e4} d4 e6");
        assert_eq!(before, vec![ban("e2e4"), ban("d7d5")]);
        assert_eq!(after, vec![ban("e2e4"), None]);
    }

    #[test]
    fn test_unbraced_marker_token_is_not_a_move() {
        let split = split_movetext("1. e4 banning: e7e5 e6 2. d4");
        let sans: Vec<&str> = split.plies.iter().map(|p| p.san.as_str()).collect();
        assert_eq!(sans, vec!["e4", "e6", "d4"]);
        assert_eq!(split.plies[1].ban, ban("e7e5"));
    }

    #[test]
    fn test_trailing_ban_termination_and_result() {
        let split = split_movetext(
            "{banning: e2e4} 1. d4 {banning: e7e5} {termination: resignation} 1-0",
        );
        assert_eq!(split.plies.len(), 1);
        assert_eq!(split.trailing_ban, ban("e7e5"));
        assert_eq!(split.termination, Some(EndReason::Resignation));
        assert_eq!(split.result, Some(ResultToken::WhiteWins));
    }

    #[test]
    fn test_text_after_result_is_ignored() {
        let split = split_movetext("1. e4 * {banning: e7e5} e5");
        assert_eq!(split.plies.len(), 1);
        assert_eq!(split.trailing_ban, None);
        assert_eq!(split.result, Some(ResultToken::Ongoing));
    }

    #[test]
    fn test_empty_movetext() {
        assert_eq!(split_movetext(""), AnnotatedMovetext::default());
        assert!(extract_all_bans("   ").is_empty());
    }
}
