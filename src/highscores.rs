//! High score store
//!
//! In-memory rendition of the score API: submissions with a blank player
//! name are rejected, listings are ordered by score (highest first), and the
//! time-windowed listings return at most the top 10 of their window.
//! The JSON shape matches the HTTP endpoint (`playerName`, `score`,
//! `dateAchieved` in Unix milliseconds).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum entries returned for a time window
pub const MAX_WINDOW_ENTRIES: usize = 10;

const DAY_MS: f64 = 86_400_000.0;
/// Window math is clamped to this many days either side of the epoch
const MAX_DAYS: f64 = 100_000_000.0;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(default)]
    pub date_achieved: f64,
}

/// Payload posted at game over
pub type ScoreSubmission = ScoreEntry;

/// Why a submission was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighScoreError {
    EmptyPlayerName,
}

impl fmt::Display for HighScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighScoreError::EmptyPlayerName => write!(f, "Invalid highscore entry"),
        }
    }
}

impl std::error::Error for HighScoreError {}

/// Time windows for the top-10 listings (UTC calendar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardWindow {
    Today,
    /// Weeks start on Sunday
    ThisWeek,
    ThisMonth,
}

impl LeaderboardWindow {
    /// First millisecond of the window containing `now`
    pub fn start(&self, now: f64) -> f64 {
        // NaN casts to 0; out-of-range values clamp instead of overflowing
        let days = (now / DAY_MS).floor().clamp(-MAX_DAYS, MAX_DAYS) as i64;
        let first_day = match self {
            LeaderboardWindow::Today => days,
            // 1970-01-01 was a Thursday
            LeaderboardWindow::ThisWeek => days - (days + 4).rem_euclid(7),
            LeaderboardWindow::ThisMonth => days - (day_of_month(days) - 1),
        };
        first_day as f64 * DAY_MS
    }

    /// Route suffix used by the HTTP API
    pub fn path(&self) -> &'static str {
        match self {
            LeaderboardWindow::Today => "top10byday",
            LeaderboardWindow::ThisWeek => "top10byweek",
            LeaderboardWindow::ThisMonth => "top10bymonth",
        }
    }

    /// Inverse of `path`
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "top10byday" => Some(LeaderboardWindow::Today),
            "top10byweek" => Some(LeaderboardWindow::ThisWeek),
            "top10bymonth" => Some(LeaderboardWindow::ThisMonth),
            _ => None,
        }
    }
}

/// Day of month (1-based) for a count of days since the Unix epoch
fn day_of_month(days: i64) -> i64 {
    // Shift to a March-based era so leap days fall at the end of the year
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    doy - (153 * mp + 2) / 5 + 1
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Store a score. Returns the rank achieved (1-indexed).
    pub fn submit(&mut self, entry: ScoreSubmission) -> Result<usize, HighScoreError> {
        if entry.player_name.trim().is_empty() {
            return Err(HighScoreError::EmptyPlayerName);
        }

        log::info!(
            "New high score entry added: {} - {}",
            entry.player_name,
            entry.score
        );

        // Sorted descending by score; ties keep submission order
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        Ok(rank)
    }

    /// Every entry, highest score first
    pub fn all(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Top entries achieved inside `window`, highest score first
    pub fn top(&self, window: LeaderboardWindow, now: f64) -> Vec<ScoreEntry> {
        let start = window.start(now);
        self.entries
            .iter()
            .filter(|e| e.date_achieved >= start)
            .take(MAX_WINDOW_ENTRIES)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse a JSON list of entries (any order)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut entries: Vec<ScoreEntry> = serde_json::from_str(json)?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(Self { entries })
    }

    /// Serialize as a JSON list, highest score first
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2024-03-15 12:00 UTC, a Friday
    const NOW: f64 = 19_797.0 * DAY_MS + 12.0 * 3_600_000.0;

    fn entry(name: &str, score: u64, date_achieved: f64) -> ScoreEntry {
        ScoreEntry {
            player_name: name.to_string(),
            score,
            date_achieved,
        }
    }

    #[test]
    fn test_rejects_blank_name() {
        let mut scores = HighScores::new();
        assert_eq!(
            scores.submit(entry("", 10, NOW)),
            Err(HighScoreError::EmptyPlayerName)
        );
        assert_eq!(
            scores.submit(entry("   ", 10, NOW)),
            Err(HighScoreError::EmptyPlayerName)
        );
        assert!(scores.is_empty());
    }

    #[test]
    fn test_ordering_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.submit(entry("a", 50, NOW)), Ok(1));
        assert_eq!(scores.submit(entry("b", 100, NOW)), Ok(1));
        assert_eq!(scores.submit(entry("c", 50, NOW)), Ok(3));
        assert_eq!(scores.submit(entry("d", 10, NOW)), Ok(4));

        let names: Vec<&str> = scores.all().iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
        assert_eq!(scores.top_score(), Some(100));
    }

    #[test]
    fn test_window_starts() {
        assert_eq!(LeaderboardWindow::Today.start(NOW), 19_797.0 * DAY_MS);
        // Sunday 2024-03-10
        assert_eq!(LeaderboardWindow::ThisWeek.start(NOW), 19_792.0 * DAY_MS);
        // 2024-03-01
        assert_eq!(LeaderboardWindow::ThisMonth.start(NOW), 19_783.0 * DAY_MS);
    }

    #[test]
    fn test_window_start_survives_extreme_clocks() {
        for window in [
            LeaderboardWindow::Today,
            LeaderboardWindow::ThisWeek,
            LeaderboardWindow::ThisMonth,
        ] {
            for now in [f64::MAX, f64::MIN, f64::INFINITY, f64::NEG_INFINITY] {
                let start = window.start(now);
                assert!(start.is_finite());
                assert!(start.abs() <= (MAX_DAYS + 31.0) * DAY_MS);
            }
            assert_eq!(window.start(f64::NAN), window.start(0.0));
        }
    }

    #[test]
    fn test_window_paths() {
        for window in [
            LeaderboardWindow::Today,
            LeaderboardWindow::ThisWeek,
            LeaderboardWindow::ThisMonth,
        ] {
            assert_eq!(LeaderboardWindow::from_path(window.path()), Some(window));
        }
        assert_eq!(LeaderboardWindow::from_path("top10"), None);
    }

    #[test]
    fn test_day_of_month_across_leap_day() {
        // 2024-02-29 and 2024-03-01
        assert_eq!(day_of_month(19_782), 29);
        assert_eq!(day_of_month(19_783), 1);
        // 1970-01-01
        assert_eq!(day_of_month(0), 1);
    }

    #[test]
    fn test_window_filters_and_caps() {
        let mut scores = HighScores::new();
        let yesterday = NOW - DAY_MS;
        scores.submit(entry("old", 1000, yesterday)).unwrap();
        for i in 0..12 {
            scores.submit(entry(&format!("p{i}"), i * 10, NOW)).unwrap();
        }

        let today = scores.top(LeaderboardWindow::Today, NOW);
        assert_eq!(today.len(), MAX_WINDOW_ENTRIES);
        assert!(today.iter().all(|e| e.player_name != "old"));
        assert_eq!(today[0].score, 110);
        assert!(today.windows(2).all(|w| w[0].score >= w[1].score));

        let week = scores.top(LeaderboardWindow::ThisWeek, NOW);
        assert_eq!(week[0].player_name, "old");
    }

    #[test]
    fn test_json_wire_format() {
        let json = r#"[
            {"playerName": "low", "score": 5, "dateAchieved": 0},
            {"playerName": "high", "score": 50}
        ]"#;
        let scores = HighScores::from_json(json).unwrap();
        assert_eq!(scores.all()[0].player_name, "high");
        assert_eq!(scores.all()[0].date_achieved, 0.0);

        let out = scores.to_json().unwrap();
        assert!(out.contains("\"playerName\": \"high\""));
        assert!(out.contains("\"dateAchieved\""));
    }
}
