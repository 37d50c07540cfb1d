use serde::{Deserialize, Serialize};

use crate::session::TrainingSession;
use crate::util::average;

/// Sessions kept when history is saved
pub const MAX_SESSIONS: usize = 100;
/// Smaller window retried when the store reports it is full
pub const FALLBACK_SESSIONS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainingHistory {
    pub sessions: Vec<TrainingSession>,
    pub total_time: u64,
    pub total_sessions: usize,
}

impl TrainingHistory {
    pub fn push(&mut self, session: TrainingSession) {
        self.sessions.push(session);
        self.recompute_totals();
    }

    pub fn recompute_totals(&mut self) {
        self.total_sessions = self.sessions.len();
        self.total_time = self.sessions.iter().map(|s| s.duration).sum();
    }

    /// Copy holding only the most recent `keep` sessions. Totals are left as-is.
    pub fn trimmed(&self, keep: usize) -> Self {
        let start = self.sessions.len().saturating_sub(keep);
        Self {
            sessions: self.sessions[start..].to_vec(),
            ..self.clone()
        }
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_history(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySummary {
    pub total_sessions: usize,
    pub total_time_ms: u64,
    pub best_accuracy: f64,
    /// Lowest non-zero average reaction time
    pub best_reaction_time: u64,
    pub average_accuracy: f64,
    pub average_reaction_time: u64,
}

impl HistorySummary {
    pub fn from_history(history: &TrainingHistory) -> Self {
        let sessions = &history.sessions;
        if sessions.is_empty() {
            return Self::default();
        }

        let accuracies: Vec<f64> = sessions.iter().map(|s| s.stats.accuracy).collect();
        let reaction_times: Vec<u64> = sessions
            .iter()
            .map(|s| s.stats.average_reaction_time)
            .filter(|&t| t > 0)
            .collect();
        let reaction_samples: Vec<f64> = reaction_times.iter().map(|&t| t as f64).collect();

        Self {
            total_sessions: sessions.len(),
            total_time_ms: sessions.iter().map(|s| s.duration).sum(),
            best_accuracy: accuracies.iter().copied().fold(f64::MIN, f64::max),
            best_reaction_time: reaction_times.iter().copied().min().unwrap_or(0),
            average_accuracy: average(&accuracies),
            average_reaction_time: average(&reaction_samples) as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMetric {
    Accuracy,
    ReactionTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    Insufficient,
}

/// Compare the last `recent` sessions with the `recent` sessions before them.
///
/// Accuracy must move by more than 2 points and reaction time by more than
/// 20ms to count as a change; lower reaction time is an improvement.
pub fn trend(history: &TrainingHistory, metric: TrendMetric, recent: usize) -> Trend {
    let sessions = &history.sessions;
    if recent == 0 || sessions.len() < recent * 2 {
        return Trend::Insufficient;
    }

    let value = |s: &TrainingSession| match metric {
        TrendMetric::Accuracy => s.stats.accuracy,
        TrendMetric::ReactionTime => s.stats.average_reaction_time as f64,
    };
    let len = sessions.len();
    let recent_avg = average(&sessions[len - recent..].iter().map(value).collect::<Vec<_>>());
    let older_avg = average(
        &sessions[len - recent * 2..len - recent]
            .iter()
            .map(value)
            .collect::<Vec<_>>(),
    );

    let (threshold, diff) = match metric {
        TrendMetric::Accuracy => (2.0, recent_avg - older_avg),
        TrendMetric::ReactionTime => (20.0, older_avg - recent_avg),
    };

    if diff > threshold {
        Trend::Improving
    } else if diff < -threshold {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// `42s` or `3m 5s`
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// `850ms`, `4.2s` or `1:05`
pub fn format_time(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let seconds = ms / 1000;
    let millis = ms % 1000;
    if seconds < 60 {
        return format!("{seconds}.{}s", millis / 100);
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::GameMode;
    use crate::settings::GameSettings;
    use crate::stats::GameStats;

    fn session(id: &str, duration: u64, accuracy: f64, avg_rt: u64) -> TrainingSession {
        TrainingSession {
            id: id.to_string(),
            mode: GameMode::Flick,
            start_time: 0,
            end_time: duration,
            duration,
            stats: GameStats {
                accuracy,
                average_reaction_time: avg_rt,
                ..GameStats::initial()
            },
            settings: GameSettings::default(),
        }
    }

    #[test]
    fn push_updates_totals() {
        let mut h = TrainingHistory::default();
        h.push(session("a", 1_000, 50.0, 300));
        h.push(session("b", 2_500, 60.0, 280));
        assert_eq!(h.total_sessions, 2);
        assert_eq!(h.total_time, 3_500);
    }

    #[test]
    fn trimmed_keeps_most_recent() {
        let mut h = TrainingHistory::default();
        for i in 0..5 {
            h.push(session(&i.to_string(), 10, 0.0, 0));
        }
        let t = h.trimmed(2);
        let ids: Vec<&str> = t.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
        assert_eq!(h.trimmed(50).sessions.len(), 5);
    }

    #[test]
    fn summary_of_empty_history() {
        assert_eq!(TrainingHistory::default().summary(), HistorySummary::default());
    }

    #[test]
    fn summary_ignores_zero_reaction_times() {
        let mut h = TrainingHistory::default();
        h.push(session("a", 30_000, 80.0, 0));
        h.push(session("b", 30_000, 90.0, 300));
        h.push(session("c", 60_000, 70.0, 250));
        let s = h.summary();
        assert_eq!(s.total_sessions, 3);
        assert_eq!(s.total_time_ms, 120_000);
        assert_eq!(s.best_accuracy, 90.0);
        assert_eq!(s.best_reaction_time, 250);
        assert_eq!(s.average_accuracy, 80.0);
        assert_eq!(s.average_reaction_time, 275);
    }

    #[test]
    fn trend_needs_two_windows() {
        let mut h = TrainingHistory::default();
        for _ in 0..9 {
            h.push(session("x", 1, 50.0, 300));
        }
        assert_eq!(trend(&h, TrendMetric::Accuracy, 5), Trend::Insufficient);
        h.push(session("x", 1, 50.0, 300));
        assert_eq!(trend(&h, TrendMetric::Accuracy, 5), Trend::Stable);
    }

    #[test]
    fn trend_directions() {
        let mut h = TrainingHistory::default();
        for _ in 0..3 {
            h.push(session("old", 1, 60.0, 320));
        }
        for _ in 0..3 {
            h.push(session("new", 1, 70.0, 280));
        }
        assert_eq!(trend(&h, TrendMetric::Accuracy, 3), Trend::Improving);
        assert_eq!(trend(&h, TrendMetric::ReactionTime, 3), Trend::Improving);

        let mut h = TrainingHistory::default();
        for _ in 0..2 {
            h.push(session("old", 1, 70.0, 250));
        }
        for _ in 0..2 {
            h.push(session("new", 1, 61.0, 290));
        }
        assert_eq!(trend(&h, TrendMetric::Accuracy, 2), Trend::Declining);
        assert_eq!(trend(&h, TrendMetric::ReactionTime, 2), Trend::Declining);
    }

    #[test]
    fn trend_threshold_is_exclusive() {
        let mut h = TrainingHistory::default();
        h.push(session("old", 1, 60.0, 300));
        h.push(session("new", 1, 62.0, 280));
        assert_eq!(trend(&h, TrendMetric::Accuracy, 1), Trend::Stable);
        assert_eq!(trend(&h, TrendMetric::ReactionTime, 1), Trend::Stable);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(42_900), "42s");
        assert_eq!(format_duration(185_000), "3m 5s");
        assert_eq!(format_time(850), "850ms");
        assert_eq!(format_time(4_250), "4.2s");
        assert_eq!(format_time(65_000), "1:05");
    }
}
