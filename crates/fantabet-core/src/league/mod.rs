// League table and league-wide records computed from match results.

pub mod records;
pub mod results;
pub mod standings;

pub use records::{compute_league_records, compute_overview, LeagueOverview, LeagueRecords};
pub use results::{by_giornata, parse_score, Giornata, MatchOutcome, MatchResult, Matchday};
pub use standings::{
    compute_standings, SortDirection, StandingsColumn, StandingsRow, StandingsSort,
};
