//! Leaderboard and streak computation over progress records.
//!
//! Pure functions: callers fetch the records, these fold them. Keeping the
//! math out of the storage layer lets the tests drive it with fixture data
//! and a fixed "today".

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::Progress;

/// One row of a room leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    // ---
    pub username: String,
    pub total_points: i64,
    /// Percent of this user's submissions marked completed, rounded.
    pub completion_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_submissions: u64,
    /// 1-based position after sorting.
    pub rank: u32,
}

/// Consecutive-day completion runs for one user in one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    // ---
    pub current: u32,
    pub longest: u32,
}

/// Percentage of completed submissions, rounded to the nearest integer.
pub fn completion_rate(completed: u64, total: u64) -> u32 {
    // ---
    if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    }
}

/// Longest and current runs of consecutive completed days.
///
/// Duplicate dates collapse into one day. The current streak counts the
/// run ending at the most recent completed day, and only while that day
/// is `today` or yesterday; an older run has already been broken.
pub fn calculate_streaks(entries: &[Progress], today: NaiveDate) -> Streaks {
    // ---
    let mut dates: Vec<NaiveDate> = entries.iter().filter(|e| e.completed).map(|e| e.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    if dates.is_empty() {
        return Streaks::default();
    }

    let mut runs: Vec<u32> = Vec::new();
    let mut run = 1u32;
    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
        } else {
            runs.push(run);
            run = 1;
        }
    }
    runs.push(run);

    let newest = dates[0];
    let ongoing = newest == today || newest == today - Duration::days(1);

    Streaks {
        current: if ongoing { runs[0] } else { 0 },
        longest: runs.iter().copied().max().unwrap_or(0),
    }
}

/// Fold a room's progress into ranked leaderboard rows.
///
/// Every participant gets a row, zeroed if they have not submitted yet.
/// Records from past participants who since left the room are ignored.
/// Rows sort by points, then completion rate; full ties keep join order.
pub fn compute_leaderboard(
    participants: &[String],
    progress: &[Progress],
    today: NaiveDate,
) -> Vec<LeaderboardEntry> {
    // ---
    struct Tally {
        points: i64,
        completed: u64,
        total: u64,
        entries: Vec<Progress>,
    }

    let mut tallies: HashMap<&str, Tally> = participants
        .iter()
        .map(|p| {
            (
                p.as_str(),
                Tally {
                    points: 0,
                    completed: 0,
                    total: 0,
                    entries: Vec::new(),
                },
            )
        })
        .collect();

    for entry in progress {
        if let Some(tally) = tallies.get_mut(entry.username.as_str()) {
            tally.points += entry.points;
            tally.total += 1;
            if entry.completed {
                tally.completed += 1;
            }
            tally.entries.push(entry.clone());
        }
    }

    let mut rows: Vec<LeaderboardEntry> = participants
        .iter()
        .filter_map(|username| {
            tallies.get(username.as_str()).map(|tally| {
                let streaks = calculate_streaks(&tally.entries, today);
                LeaderboardEntry {
                    username: username.clone(),
                    total_points: tally.points,
                    completion_rate: completion_rate(tally.completed, tally.total),
                    current_streak: streaks.current,
                    longest_streak: streaks.longest,
                    total_submissions: tally.total,
                    rank: 0,
                }
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(b.completion_rate.cmp(&a.completion_rate))
    });
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }
    rows
}
