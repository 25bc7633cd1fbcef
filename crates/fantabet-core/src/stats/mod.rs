// Player statistics aggregation: team summaries, leaderboards, the stats
// table and the snapshot cache they read from.

pub mod cache;
pub mod leaderboards;
pub mod summary;
pub mod table;

pub use cache::StatsCache;
pub use leaderboards::{
    compute_leaderboards, compute_leaderboards_with, total_matchdays, LeaderboardRules,
    Leaderboards,
};
pub use summary::{compute_team_summary, RatedPlayer, RoleBest, TeamSummary};
pub use table::{
    player_table, summarize_by_squad, PlayerColumn, PlayerFilter, PlayerSort, SquadStatsSummary,
};
