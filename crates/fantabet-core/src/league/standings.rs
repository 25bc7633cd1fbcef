// League table: a fold over match results into one row per team.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::results::{MatchOutcome, MatchResult};

const WIN_POINTS: u32 = 3;
const DRAW_POINTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub fantasy_points: f64,
}

impl StandingsRow {
    fn new(team: &str) -> Self {
        StandingsRow {
            team: team.to_string(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            fantasy_points: 0.0,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Accumulate every result into per-team rows, teams in first-seen order.
///
/// Goals are only counted when the score parses; points only when the
/// result code is `1`, `X` or `2`. `played` is always incremented.
pub fn tally(results: &[MatchResult]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for result in results {
        let home = slot(&mut rows, &mut index, &result.home_team);
        let away = slot(&mut rows, &mut index, &result.away_team);

        rows[home].played += 1;
        rows[away].played += 1;

        if let Some((home_goals, away_goals)) = result.goals() {
            let row = &mut rows[home];
            row.goals_for = row.goals_for.saturating_add(home_goals);
            row.goals_against = row.goals_against.saturating_add(away_goals);
            let row = &mut rows[away];
            row.goals_for = row.goals_for.saturating_add(away_goals);
            row.goals_against = row.goals_against.saturating_add(home_goals);
        }

        match result.result {
            MatchOutcome::HomeWin => {
                rows[home].wins += 1;
                rows[home].points += WIN_POINTS;
                rows[away].losses += 1;
            }
            MatchOutcome::AwayWin => {
                rows[away].wins += 1;
                rows[away].points += WIN_POINTS;
                rows[home].losses += 1;
            }
            MatchOutcome::Draw => {
                rows[home].draws += 1;
                rows[home].points += DRAW_POINTS;
                rows[away].draws += 1;
                rows[away].points += DRAW_POINTS;
            }
            MatchOutcome::Pending | MatchOutcome::Unrecognized(_) => {}
        }

        rows[home].fantasy_points += result.home_fantasy_total();
        rows[away].fantasy_points += result.away_fantasy_total();
    }

    rows
}

fn slot<'a>(
    rows: &mut Vec<StandingsRow>,
    index: &mut HashMap<&'a str, usize>,
    team: &'a str,
) -> usize {
    *index.entry(team).or_insert_with(|| {
        rows.push(StandingsRow::new(team));
        rows.len() - 1
    })
}

/// Points, then fantasy points, then goal difference; all descending.
pub fn default_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.fantasy_points.total_cmp(&a.fantasy_points))
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
}

/// The league table in its default order.
pub fn compute_standings(results: &[MatchResult]) -> Vec<StandingsRow> {
    let mut rows = tally(results);
    rows.sort_by(default_order);
    rows
}

// ---------------------------------------------------------------------------
// Column sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsColumn {
    Team,
    Played,
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    GoalDifference,
    Points,
    FantasyPoints,
}

impl StandingsColumn {
    pub const ALL: [StandingsColumn; 10] = [
        StandingsColumn::Team,
        StandingsColumn::Played,
        StandingsColumn::Wins,
        StandingsColumn::Draws,
        StandingsColumn::Losses,
        StandingsColumn::GoalsFor,
        StandingsColumn::GoalsAgainst,
        StandingsColumn::GoalDifference,
        StandingsColumn::Points,
        StandingsColumn::FantasyPoints,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StandingsColumn::Team => "team",
            StandingsColumn::Played => "played",
            StandingsColumn::Wins => "wins",
            StandingsColumn::Draws => "draws",
            StandingsColumn::Losses => "losses",
            StandingsColumn::GoalsFor => "goalsFor",
            StandingsColumn::GoalsAgainst => "goalsAgainst",
            StandingsColumn::GoalDifference => "goalDifference",
            StandingsColumn::Points => "points",
            StandingsColumn::FantasyPoints => "fantasyPoints",
        }
    }

    fn compare(self, a: &StandingsRow, b: &StandingsRow) -> Ordering {
        match self {
            StandingsColumn::Team => a.team.cmp(&b.team),
            StandingsColumn::Played => a.played.cmp(&b.played),
            StandingsColumn::Wins => a.wins.cmp(&b.wins),
            StandingsColumn::Draws => a.draws.cmp(&b.draws),
            StandingsColumn::Losses => a.losses.cmp(&b.losses),
            StandingsColumn::GoalsFor => a.goals_for.cmp(&b.goals_for),
            StandingsColumn::GoalsAgainst => a.goals_against.cmp(&b.goals_against),
            StandingsColumn::GoalDifference => a.goal_difference().cmp(&b.goal_difference()),
            StandingsColumn::Points => a.points.cmp(&b.points),
            StandingsColumn::FantasyPoints => a.fantasy_points.total_cmp(&b.fantasy_points),
        }
    }
}

impl fmt::Display for StandingsColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown column '{}'", self.0)
    }
}

impl std::error::Error for UnknownColumn {}

impl FromStr for StandingsColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StandingsColumn::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// User-selected sort over the table. Choosing a new column sorts it
/// ascending; choosing the same column again flips the direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsSort {
    column: Option<StandingsColumn>,
    direction: SortDirection,
}

impl StandingsSort {
    pub fn column(&self) -> Option<StandingsColumn> {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn select(&mut self, column: StandingsColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
    }

    /// Stable: rows equal on the column keep their current order.
    pub fn apply(&self, rows: &mut [StandingsRow]) {
        if let Some(column) = self.column {
            rows.sort_by(|a, b| self.direction.apply(column.compare(a, b)));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
