//! Subcommand handlers. Each returns the text to print on success.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context};
use ban_chess::{BanChessEngine, BannedMove, GamePhase, GameRecord, GameRecordService, PlayerAction};
use chess::Side;

use crate::store::{read_record, replace_record, write_record};

pub fn new_game(
    service: &GameRecordService,
    path: &Path,
    fen: Option<&str>,
    force: bool,
) -> anyhow::Result<String> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let record = match fen {
        Some(fen) => GameRecord::from_fen(fen.trim()),
        None => GameRecord::new(),
    };
    let engine = BanChessEngine::from_fen(&record.start_fen, service.rules())
        .context("invalid starting position")?;

    write_record(path, &record)?;
    tracing::info!(path = %path.display(), "New game created");
    Ok(format!("Created {} ({})", path.display(), engine.current_phase()))
}

pub fn show(service: &GameRecordService, path: &Path, json: bool) -> anyhow::Result<String> {
    let record = read_record(path)?;
    let engine = service.reconstruct(&record)?;

    if json {
        return Ok(serde_json::to_string_pretty(&engine.snapshot())?);
    }

    let mut out = render_board(&engine.current_position().to_fen());
    writeln!(out)?;
    writeln!(out, "FEN:    {}", engine.current_position().to_fen())?;
    writeln!(out, "Status: {}", engine.current_phase())?;
    if let Some(ban) = engine.active_ban() {
        writeln!(out, "Banned: {}", ban)?;
    }
    if engine.is_in_check() {
        writeln!(out, "Check!")?;
    }
    if let Some(ply) = engine.last_ply() {
        writeln!(out, "Last:   {} ({})", ply.san, ply.uci())?;
    }
    if !record.movetext.is_empty() {
        writeln!(out, "Moves:  {}", record.movetext)?;
    }
    Ok(out.trim_end().to_string())
}

pub fn list_bans(service: &GameRecordService, path: &Path) -> anyhow::Result<String> {
    let engine = service.reconstruct(&read_record(path)?)?;
    let GamePhase::AwaitingBan { banner } = engine.current_phase() else {
        bail!("no ban to choose: {}", engine.current_phase());
    };

    let bans: Vec<String> = engine
        .effective_legal_bans()
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(format!("{} may ban: {}", banner, bans.join(" ")))
}

pub fn ban(service: &GameRecordService, path: &Path, token: &str) -> anyhow::Result<String> {
    let ban = BannedMove::parse(token).with_context(|| format!("unreadable ban: {}", token))?;
    let action = PlayerAction::Ban {
        from: ban.from,
        to: ban.to,
    };
    update(service, path, action)
}

pub fn play(service: &GameRecordService, path: &Path, token: &str) -> anyhow::Result<String> {
    let mv = chess::parse_uci_move(token).with_context(|| format!("unreadable move: {}", token))?;
    let action = PlayerAction::Move {
        from: mv.from,
        to: mv.to,
        promotion: mv.promotion,
    };
    update(service, path, action)
}

pub fn resign(service: &GameRecordService, path: &Path, side: Side) -> anyhow::Result<String> {
    update(service, path, PlayerAction::Resign(side))
}

pub fn draw(service: &GameRecordService, path: &Path) -> anyhow::Result<String> {
    update(service, path, PlayerAction::AgreeDraw)
}

/// Apply one action to the record at `path` and write it back.
fn update(service: &GameRecordService, path: &Path, action: PlayerAction) -> anyhow::Result<String> {
    let record = read_record(path)?;
    let (updated, ply) = service.apply(&record, action)?;
    replace_record(path, &record, &updated)?;

    let engine = service.reconstruct(&updated)?;
    let status = engine.current_phase();
    tracing::info!(path = %path.display(), ?action, %status, "Record updated");

    Ok(match ply {
        Some(ply) => format!("Played {}. Now {}.", ply.san, status),
        None => format!("Now {}.", status),
    })
}

/// Eight text rows for the piece placement of `fen`, White at the bottom.
fn render_board(fen: &str) -> String {
    let placement = fen.split_whitespace().next().unwrap_or_default();
    let mut out = String::new();

    for (row, rank) in placement.split('/').enumerate() {
        out.push_str(&format!("{} ", 8 - row));
        for c in rank.chars() {
            match c.to_digit(10) {
                Some(empty) => (0..empty).for_each(|_| out.push_str(" .")),
                None => {
                    out.push(' ');
                    out.push(c);
                }
            }
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}
