// League-wide leaderboards over rostered players.

use std::cmp::Ordering;

use serde::Serialize;

use crate::ingest::{PlayerStat, Role};
use crate::league::MatchResult;

/// Tunables for the leaderboards, normally taken from the `[stats]`
/// config section.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRules {
    pub size: usize,
    /// Appearance floor for the goalkeeper and fantasy-average boards.
    pub min_appearances: f64,
    /// Added to the highest stored giornata to get the season's matchday
    /// count; the league starts after the first rounds of Serie A.
    pub matchday_offset: i64,
}

impl Default for LeaderboardRules {
    fn default() -> Self {
        LeaderboardRules {
            size: 3,
            min_appearances: 3.0,
            matchday_offset: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboards {
    pub scorers: Vec<PlayerStat>,
    pub assistmen: Vec<PlayerStat>,
    pub goalkeepers: Vec<PlayerStat>,
    pub fanta_media: Vec<PlayerStat>,
    pub total_matchdays: i64,
}

impl Leaderboards {
    /// `"pv/total"` presence label for display.
    pub fn presences(&self, player: &PlayerStat) -> String {
        format!("{}/{}", player.pv, self.total_matchdays)
    }
}

pub fn compute_leaderboards(stats: &[PlayerStat], results: &[MatchResult]) -> Leaderboards {
    compute_leaderboards_with(stats, results, &LeaderboardRules::default())
}

pub fn compute_leaderboards_with(
    stats: &[PlayerStat],
    results: &[MatchResult],
    rules: &LeaderboardRules,
) -> Leaderboards {
    let rostered = || stats.iter().filter(|s| s.is_rostered());

    let scorers = top(rostered().filter(|s| s.gf > 0), rules.size, |a, b| {
        b.gf.cmp(&a.gf)
    });
    let assistmen = top(rostered().filter(|s| s.ass > 0), rules.size, |a, b| {
        b.ass.cmp(&a.ass)
    });
    let goalkeepers = top(
        rostered().filter(|s| s.role == Role::Goalkeeper && s.pv >= rules.min_appearances),
        rules.size,
        |a, b| a.gs.cmp(&b.gs),
    );
    let fanta_media = top(
        rostered().filter(|s| s.pv >= rules.min_appearances && s.fm > 0.0),
        rules.size,
        |a, b| b.fm.total_cmp(&a.fm),
    );

    Leaderboards {
        scorers,
        assistmen,
        goalkeepers,
        fanta_media,
        total_matchdays: total_matchdays(results, rules.matchday_offset),
    }
}

/// Stable sort, then keep the first `size`.
fn top<'a>(
    pool: impl Iterator<Item = &'a PlayerStat>,
    size: usize,
    order: impl FnMut(&&'a PlayerStat, &&'a PlayerStat) -> Ordering,
) -> Vec<PlayerStat> {
    let mut pool: Vec<&PlayerStat> = pool.collect();
    pool.sort_by(order);
    pool.into_iter().take(size).cloned().collect()
}

/// Highest leading-integer giornata (0 when none) plus `offset`.
pub fn total_matchdays(results: &[MatchResult], offset: i64) -> i64 {
    let highest = results
        .iter()
        .map(|r| r.giornata.leading_number().unwrap_or(0))
        .max()
        .unwrap_or(0);
    highest + offset
}
