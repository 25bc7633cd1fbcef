// League-wide superlatives and the season overview.
//
// Each record keeps its own running best. A candidate replaces the holder
// only when strictly better, so the first team or match to reach a value
// keeps the record.

use std::collections::HashMap;

use serde::Serialize;

use super::results::{Giornata, MatchOutcome, MatchResult};
use super::standings::tally;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team: String,
    pub value: i64,
}

/// One side's fantasy score in one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub team: String,
    pub opponent: String,
    pub score: f64,
    pub giornata: Giornata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinRecord {
    pub winner: String,
    pub loser: String,
    pub margin: f64,
    /// Winner's and loser's points as `"max-min"`, one decimal each.
    pub score: String,
    pub giornata: Giornata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub home_team: String,
    pub away_team: String,
    pub score: f64,
    pub giornata: Giornata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsMatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub total_goals: u32,
    pub score: String,
    pub giornata: Giornata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiornataGoals {
    pub giornata: Giornata,
    pub total_goals: u32,
}

/// Every superlative; `None` means no team or match qualified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRecords {
    pub best_attack: Option<TeamRecord>,
    pub best_defense: Option<TeamRecord>,
    pub best_goal_difference: Option<TeamRecord>,
    pub worst_goal_difference: Option<TeamRecord>,
    pub highest_score: Option<ScoreRecord>,
    pub lowest_score: Option<ScoreRecord>,
    pub biggest_win: Option<WinRecord>,
    pub highest_draw: Option<DrawRecord>,
    pub lowest_draw: Option<DrawRecord>,
    pub most_goals_match: Option<GoalsMatchRecord>,
    pub most_goals_giornata: Option<GiornataGoals>,
    pub least_goals_giornata: Option<GiornataGoals>,
}

/// Replace `slot` with `candidate` when the slot is empty or `better` holds.
fn keep_best<T>(slot: &mut Option<T>, candidate: T, better: impl FnOnce(&T, &T) -> bool) {
    let replace = match slot {
        Some(current) => better(&candidate, current),
        None => true,
    };
    if replace {
        *slot = Some(candidate);
    }
}

pub fn compute_league_records(results: &[MatchResult]) -> LeagueRecords {
    let mut records = LeagueRecords::default();

    // Per-team goal aggregates
    for row in tally(results) {
        let team_record = |value: i64| TeamRecord {
            team: row.team.clone(),
            value,
        };
        if row.goals_for > 0 {
            keep_best(
                &mut records.best_attack,
                team_record(i64::from(row.goals_for)),
                |c, cur| c.value > cur.value,
            );
        }
        keep_best(
            &mut records.best_defense,
            team_record(i64::from(row.goals_against)),
            |c, cur| c.value < cur.value,
        );
        keep_best(
            &mut records.best_goal_difference,
            team_record(row.goal_difference()),
            |c, cur| c.value > cur.value,
        );
        keep_best(
            &mut records.worst_goal_difference,
            team_record(row.goal_difference()),
            |c, cur| c.value < cur.value,
        );
    }

    // Per-match scores
    for result in results {
        let sides = [
            (&result.home_team, &result.away_team, result.home_points),
            (&result.away_team, &result.home_team, result.away_points),
        ];
        for (team, opponent, score) in sides {
            let record = || ScoreRecord {
                team: team.clone(),
                opponent: opponent.clone(),
                score,
                giornata: result.giornata.clone(),
            };
            if score > 0.0 {
                keep_best(&mut records.highest_score, record(), |c, cur| c.score > cur.score);
                keep_best(&mut records.lowest_score, record(), |c, cur| c.score < cur.score);
            }
        }

        let margin = (result.home_points - result.away_points).abs();
        // Any non-draw code counts; only `1` credits the home side.
        let decisive = match result.result {
            MatchOutcome::Draw => None,
            MatchOutcome::HomeWin => Some((&result.home_team, &result.away_team)),
            _ => Some((&result.away_team, &result.home_team)),
        };
        if let Some((winner, loser)) = decisive.filter(|_| margin > 0.0) {
            let high = result.home_points.max(result.away_points);
            let low = result.home_points.min(result.away_points);
            keep_best(
                &mut records.biggest_win,
                WinRecord {
                    winner: winner.clone(),
                    loser: loser.clone(),
                    margin,
                    score: format!("{high:.1}-{low:.1}"),
                    giornata: result.giornata.clone(),
                },
                |c, cur| c.margin > cur.margin,
            );
        }

        if result.result == MatchOutcome::Draw && result.home_points > 0.0 {
            let draw = || DrawRecord {
                home_team: result.home_team.clone(),
                away_team: result.away_team.clone(),
                score: result.home_points,
                giornata: result.giornata.clone(),
            };
            keep_best(&mut records.highest_draw, draw(), |c, cur| c.score > cur.score);
            keep_best(&mut records.lowest_draw, draw(), |c, cur| c.score < cur.score);
        }

        if let Some((home_goals, away_goals)) = result.goals() {
            let total_goals = home_goals.saturating_add(away_goals);
            if total_goals > 0 {
                keep_best(
                    &mut records.most_goals_match,
                    GoalsMatchRecord {
                        home_team: result.home_team.clone(),
                        away_team: result.away_team.clone(),
                        total_goals,
                        score: result.score.clone(),
                        giornata: result.giornata.clone(),
                    },
                    |c, cur| c.total_goals > cur.total_goals,
                );
            }
        }
    }

    // Per-giornata goal totals
    for day in giornata_goals(results) {
        if day.total_goals > 0 {
            keep_best(&mut records.most_goals_giornata, day.clone(), |c, cur| {
                c.total_goals > cur.total_goals
            });
        }
        keep_best(&mut records.least_goals_giornata, day, |c, cur| {
            c.total_goals < cur.total_goals
        });
    }

    records
}

/// Goals per raw giornata label, labels in first-seen order. A label
/// appears only once one of its scores parses, so unplayed giornate are
/// never candidates.
pub fn giornata_goals(results: &[MatchResult]) -> Vec<GiornataGoals> {
    let mut days: Vec<GiornataGoals> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for result in results {
        let Some((home, away)) = result.goals() else {
            continue;
        };
        let slot = *index.entry(result.giornata.as_str()).or_insert_with(|| {
            days.push(GiornataGoals {
                giornata: result.giornata.clone(),
                total_goals: 0,
            });
            days.len() - 1
        });
        let total = &mut days[slot].total_goals;
        *total = total.saturating_add(home).saturating_add(away);
    }
    days
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueOverview {
    pub matches: usize,
    pub home_wins: usize,
    pub draws: usize,
    pub away_wins: usize,
    pub total_goals: u32,
    pub average_goals: f64,
}

pub fn compute_overview(results: &[MatchResult]) -> LeagueOverview {
    let count = |outcome: MatchOutcome| results.iter().filter(|r| r.result == outcome).count();
    let total_goals: u32 = results
        .iter()
        .filter_map(MatchResult::goals)
        .fold(0u32, |sum, (home, away)| sum.saturating_add(home).saturating_add(away));
    let average_goals = if results.is_empty() {
        0.0
    } else {
        f64::from(total_goals) / results.len() as f64
    };

    LeagueOverview {
        matches: results.len(),
        home_wins: count(MatchOutcome::HomeWin),
        draws: count(MatchOutcome::Draw),
        away_wins: count(MatchOutcome::AwayWin),
        total_goals,
        average_goals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::results::fixtures::result;

    fn season() -> Vec<MatchResult> {
        vec![
            result("1", "Lupi", "Falchi", "1", "3-1", 78.5, 64.0),
            result("1", "Orsi", "Volpi", "X", "1-1", 70.0, 70.0),
            result("2", "Falchi", "Orsi", "2", "0-2", 61.0, 75.0),
            result("2", "Volpi", "Lupi", "X", "0-0", 66.5, 66.5),
            result("3", "Lupi", "Orsi", "1", "N/A", 81.0, 58.5),
        ]
    }

    #[test]
    fn team_superlatives() {
        let records = compute_league_records(&season());

        let attack = records.best_attack.unwrap();
        assert_eq!((attack.team.as_str(), attack.value), ("Lupi", 3));

        // Lupi, Orsi and Volpi all concede 1; Lupi is seen first
        let defense = records.best_defense.unwrap();
        assert_eq!((defense.team.as_str(), defense.value), ("Lupi", 1));

        // Orsi ties Lupi on +2 but never overtakes
        let best = records.best_goal_difference.unwrap();
        assert_eq!((best.team.as_str(), best.value), ("Lupi", 2));
        let worst = records.worst_goal_difference.unwrap();
        assert_eq!((worst.team.as_str(), worst.value), ("Falchi", -4));
    }

    #[test]
    fn match_superlatives() {
        let records = compute_league_records(&season());

        let high = records.highest_score.unwrap();
        assert_eq!((high.team.as_str(), high.score), ("Lupi", 81.0));
        assert_eq!(high.giornata.as_str(), "3");

        let low = records.lowest_score.unwrap();
        assert_eq!((low.team.as_str(), low.score), ("Orsi", 58.5));

        let win = records.biggest_win.unwrap();
        assert_eq!(win.winner, "Lupi");
        assert_eq!(win.loser, "Orsi");
        assert_eq!(win.score, "81.0-58.5");
        assert!((win.margin - 22.5).abs() < f64::EPSILON);

        assert_eq!(records.highest_draw.unwrap().score, 70.0);
        assert_eq!(records.lowest_draw.unwrap().score, 66.5);

        let most = records.most_goals_match.unwrap();
        assert_eq!((most.home_team.as_str(), most.total_goals), ("Lupi", 4));
    }

    #[test]
    fn giornata_superlatives() {
        let records = compute_league_records(&season());
        let most = records.most_goals_giornata.unwrap();
        assert_eq!((most.giornata.as_str(), most.total_goals), ("1", 6));
        // giornata 3 has only an unparseable score and is left out
        let least = records.least_goals_giornata.unwrap();
        assert_eq!((least.giornata.as_str(), least.total_goals), ("2", 2));
    }

    #[test]
    fn unplayed_giornata_is_not_a_candidate() {
        let results = vec![
            result("1", "A", "B", "1", "2-1", 70.0, 60.0),
            result("2", "A", "B", "", "-", 0.0, 0.0),
            result("3", "B", "A", "", "", 0.0, 0.0),
        ];
        let records = compute_league_records(&results);
        let least = records.least_goals_giornata.unwrap();
        assert_eq!((least.giornata.as_str(), least.total_goals), ("1", 3));
        assert_eq!(records.most_goals_giornata.unwrap().giornata.as_str(), "1");

        let days: Vec<String> = giornata_goals(&results)
            .into_iter()
            .map(|d| d.giornata.as_str().to_string())
            .collect();
        assert_eq!(days, vec!["1"]);
    }

    #[test]
    fn biggest_win_counts_any_non_draw_code() {
        let results = vec![result("1", "A", "B", "?", "-", 60.0, 80.0)];
        let win = compute_league_records(&results).biggest_win.unwrap();
        assert_eq!((win.winner.as_str(), win.loser.as_str()), ("B", "A"));
        assert!((win.margin - 20.0).abs() < f64::EPSILON);
        assert_eq!(win.score, "80.0-60.0");

        let pending = vec![result("1", "A", "B", "", "-", 75.0, 70.0)];
        assert_eq!(compute_league_records(&pending).biggest_win.unwrap().winner, "B");

        let draw = vec![result("1", "A", "B", "X", "1-1", 75.0, 70.0)];
        assert!(compute_league_records(&draw).biggest_win.is_none());
    }

    #[test]
    fn huge_scores_saturate() {
        let results = vec![result("1", "A", "B", "1", "4294967295-1", 70.0, 60.0)];
        let records = compute_league_records(&results);
        assert_eq!(records.most_goals_match.unwrap().total_goals, u32::MAX);
        assert_eq!(compute_overview(&results).total_goals, u32::MAX);
    }

    #[test]
    fn ties_keep_first_holder() {
        let results = vec![
            result("1", "A", "B", "1", "2-0", 70.0, 60.0),
            result("1", "C", "D", "1", "2-0", 70.0, 60.0),
        ];
        let records = compute_league_records(&results);
        assert_eq!(records.highest_score.unwrap().team, "A");
        assert_eq!(records.biggest_win.unwrap().winner, "A");
        assert_eq!(records.most_goals_match.unwrap().home_team, "A");
        assert_eq!(records.best_attack.unwrap().team, "A");
    }

    #[test]
    fn zero_scores_never_hold_records() {
        let results = vec![
            result("1", "A", "B", "X", "0-0", 0.0, 0.0),
            result("1", "C", "D", "1", "-", 0.0, 0.0),
        ];
        let records = compute_league_records(&results);
        assert!(records.best_attack.is_none());
        assert!(records.highest_score.is_none());
        assert!(records.lowest_score.is_none());
        assert!(records.biggest_win.is_none());
        assert!(records.highest_draw.is_none());
        assert!(records.lowest_draw.is_none());
        assert!(records.most_goals_match.is_none());
        assert!(records.most_goals_giornata.is_none());
        // defensive and goal-difference records accept any value
        assert!(records.best_defense.is_some());
        assert_eq!(records.least_goals_giornata.unwrap().total_goals, 0);
    }

    #[test]
    fn empty_results_have_no_records() {
        assert_eq!(compute_league_records(&[]), LeagueRecords::default());
        assert_eq!(compute_overview(&[]), LeagueOverview::default());
    }

    #[test]
    fn overview_counts() {
        let overview = compute_overview(&season());
        assert_eq!(overview.matches, 5);
        assert_eq!(overview.home_wins, 2);
        assert_eq!(overview.draws, 2);
        assert_eq!(overview.away_wins, 1);
        assert_eq!(overview.total_goals, 8);
        assert!((overview.average_goals - 1.6).abs() < 1e-9);
    }
}
