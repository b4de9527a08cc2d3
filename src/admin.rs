//! Word list management and usage reports for the ADMIN role.

use crate::api::{ApiError, DailyReport, GameApi, PlayerDayStats, PlayerSummary, Word, WordInput};
use crate::validation::{ValidationError, normalize_word};
use crate::wordlist::WordList;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub fn create_word<A: GameApi>(api: &A, word: &str, active: bool) -> Result<Word, AdminError> {
    let word = normalize_word(word)?;
    let created = api.create_word(&WordInput { word, active })?;
    log::info!("created word {} (id {})", created.word, created.id);
    Ok(created)
}

pub fn update_word<A: GameApi>(
    api: &A,
    word_id: i64,
    word: &str,
    active: bool,
) -> Result<Word, AdminError> {
    let word = normalize_word(word)?;
    let updated = api.update_word(word_id, &WordInput { word, active })?;
    log::info!("updated word {} (id {})", updated.word, updated.id);
    Ok(updated)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Create every word of `list` that the server does not already have.
///
/// Individual rejections are collected; an expired session aborts the import.
pub fn import_words<A: GameApi>(api: &A, list: &WordList) -> Result<ImportSummary, ApiError> {
    let existing: HashSet<String> = api
        .list_words()?
        .into_iter()
        .map(|w| w.word.to_ascii_uppercase())
        .collect();

    let mut summary = ImportSummary::default();
    for word in &list.words {
        if existing.contains(word) {
            summary.already_present.push(word.clone());
            continue;
        }
        let input = WordInput {
            word: word.clone(),
            active: true,
        };
        match api.create_word(&input) {
            Ok(_) => summary.added.push(word.clone()),
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(e) => {
                log::warn!("could not add {word}: {e}");
                summary.failed.push((word.clone(), e.to_string()));
            }
        }
    }
    log::info!(
        "import finished: {} added, {} present, {} failed",
        summary.added.len(),
        summary.already_present.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Whole-number win percentage; zero when nothing was played.
#[must_use]
pub fn win_rate(wins: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((wins as f64 / total as f64) * 100.0).round() as u64
}

/// Win percentage with fractional part, for per-day player rows.
#[must_use]
pub fn success_rate(wins: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    wins as f64 / attempts as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReportRow {
    pub date: NaiveDate,
    pub words_tried: u64,
    pub correct_guesses: u64,
    pub success_rate: f64,
}

/// Per-day rows, oldest first.
#[must_use]
pub fn player_report_rows(stats: &[PlayerDayStats]) -> Vec<PlayerReportRow> {
    let mut rows: Vec<PlayerReportRow> = stats
        .iter()
        .map(|day| PlayerReportRow {
            date: day.date,
            words_tried: day.attempts,
            correct_guesses: day.wins,
            success_rate: success_rate(day.wins, day.attempts),
        })
        .collect();
    rows.sort_by_key(|row| row.date);
    rows
}

#[must_use]
pub fn player_report_csv(rows: &[PlayerReportRow]) -> String {
    let mut out = String::from("date,wordsTried,correctGuesses,successRate\n");
    for row in rows {
        let _ = writeln!(
            out,
            "\"{}\",\"{}\",\"{}\",\"{:.2}\"",
            row.date.format("%Y-%m-%d"),
            row.words_tried,
            row.correct_guesses,
            row.success_rate
        );
    }
    out
}

#[must_use]
pub fn format_player_report(user_id: i64, rows: &[PlayerReportRow]) -> String {
    if rows.is_empty() {
        return format!("No games recorded for player {user_id}.");
    }
    let mut out = format!(
        "Player {user_id}\n{:<12} {:>6} {:>8} {:>9}\n",
        "Date", "Tried", "Correct", "Success"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>8} {:>8.2}%",
            row.date.format("%Y-%m-%d").to_string(),
            row.words_tried,
            row.correct_guesses,
            row.success_rate
        );
    }
    out.trim_end().to_string()
}

#[must_use]
pub fn format_daily_report(report: &DailyReport) -> String {
    format!(
        "Report for {}\n  Players:    {}\n  Games:      {}\n  Games won:  {}\n  Win rate:   {}%",
        report.date.format("%Y-%m-%d"),
        report.total_users,
        report.total_games,
        report.games_won,
        win_rate(report.games_won, report.total_games)
    )
}

#[must_use]
pub fn format_words(words: &[Word]) -> String {
    if words.is_empty() {
        return "No words.".to_string();
    }
    let mut out = format!("{:>5}  {:<6} {:<8} {}\n", "ID", "Word", "Active", "Updated");
    for word in words {
        let updated = word
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>5}  {:<6} {:<8} {}",
            word.id,
            word.word,
            if word.active { "yes" } else { "no" },
            updated
        );
    }
    let active = words.iter().filter(|w| w.active).count();
    let _ = write!(out, "{} words, {} active", words.len(), active);
    out
}

#[must_use]
pub fn format_players(players: &[PlayerSummary]) -> String {
    if players.is_empty() {
        return "No players registered.".to_string();
    }
    let mut out = format!("{:>5}  {:<20} {}\n", "ID", "Username", "Joined");
    for player in players {
        let joined = player
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:>5}  {:<20} {}", player.id, player.username, joined);
    }
    out.trim_end().to_string()
}
