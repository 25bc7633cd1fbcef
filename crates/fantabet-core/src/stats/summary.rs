// Per-team statistics summary.

use serde::Serialize;

use crate::ingest::{PlayerStat, Role};
use crate::league::StandingsRow;

/// Appearance floors tried in turn when picking a team's best rated player.
pub const BEST_PLAYER_APPEARANCES: [f64; 3] = [5.0, 3.0, 1.0];

/// Appearance floor for the per-role bests.
pub const ROLE_BEST_APPEARANCES: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedPlayer {
    pub player: PlayerStat,
    /// The appearance floor the player was selected under.
    pub min_appearances: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBest {
    pub role: Role,
    pub player: PlayerStat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub squad: String,
    /// 1-based league position, `None` when the squad has no standings row.
    pub position: Option<usize>,
    pub top_scorer: Option<PlayerStat>,
    pub best_player: Option<RatedPlayer>,
    pub top_assistman: Option<PlayerStat>,
    pub best_by_role: Vec<RoleBest>,
}

/// First item with the strictly greatest key.
fn first_max_by<'a, T>(items: impl IntoIterator<Item = &'a T>, key: impl Fn(&T) -> f64) -> Option<&'a T> {
    let mut best: Option<(&'a T, f64)> = None;
    for item in items {
        let k = key(item);
        match best {
            Some((_, best_key)) if k <= best_key => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}

/// Summarize one squad from the full player-stat set and the ordered
/// league table.
pub fn compute_team_summary(
    squad: &str,
    stats: &[PlayerStat],
    standings: &[StandingsRow],
) -> TeamSummary {
    let players: Vec<&PlayerStat> = stats.iter().filter(|s| s.fanta_squad == squad).collect();

    let position = standings
        .iter()
        .position(|row| row.team == squad)
        .map(|i| i + 1);

    let top_scorer = first_max_by(players.iter().copied(), |p| f64::from(p.gf)).cloned();

    let best_player = BEST_PLAYER_APPEARANCES.iter().find_map(|&floor| {
        let pool = players.iter().copied().filter(|p| p.pv >= floor);
        first_max_by(pool, |p| p.fm).map(|p| RatedPlayer {
            player: p.clone(),
            min_appearances: floor,
        })
    });

    let top_assistman = first_max_by(
        players.iter().copied().filter(|p| p.ass > 0),
        |p| f64::from(p.ass),
    )
    .cloned();

    let best_by_role = Role::STANDARD
        .into_iter()
        .filter_map(|role| {
            let pool = players
                .iter()
                .copied()
                .filter(|p| p.role == role && p.pv >= ROLE_BEST_APPEARANCES);
            first_max_by(pool, |p| p.fm).map(|p| RoleBest {
                role: role.clone(),
                player: p.clone(),
            })
        })
        .collect();

    TeamSummary {
        squad: squad.to_string(),
        position,
        top_scorer,
        best_player,
        top_assistman,
        best_by_role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::stat;

    #[test]
    fn first_scorer_wins_ties_and_zero_goals_still_count() {
        let stats = vec![
            stat("Lupi", "A", "Primo", 10.0, 6.0, 0, 0),
            stat("Lupi", "A", "Secondo", 10.0, 6.0, 0, 0),
        ];
        let summary = compute_team_summary("Lupi", &stats, &[]);
        assert_eq!(summary.top_scorer.unwrap().player_name, "Primo");

        let stats = vec![
            stat("Lupi", "A", "Primo", 10.0, 6.0, 4, 0),
            stat("Lupi", "A", "Secondo", 10.0, 6.0, 7, 0),
            stat("Lupi", "A", "Terzo", 10.0, 6.0, 7, 0),
        ];
        let summary = compute_team_summary("Lupi", &stats, &[]);
        assert_eq!(summary.top_scorer.unwrap().player_name, "Secondo");
    }

    #[test]
    fn best_player_falls_back_to_lower_floor() {
        let stats = vec![
            stat("Lupi", "C", "Tanto", 4.0, 6.5, 0, 0),
            stat("Lupi", "C", "Poco", 2.0, 9.0, 0, 0),
            stat("Lupi", "C", "Medio", 3.0, 7.0, 0, 0),
        ];
        let best = compute_team_summary("Lupi", &stats, &[]).best_player.unwrap();
        assert_eq!(best.player.player_name, "Medio");
        assert_eq!(best.min_appearances, 3.0);
    }

    #[test]
    fn best_player_prefers_regulars() {
        let stats = vec![
            stat("Lupi", "C", "Titolare", 12.0, 6.8, 0, 0),
            stat("Lupi", "C", "Riserva", 4.0, 8.0, 0, 0),
        ];
        let best = compute_team_summary("Lupi", &stats, &[]).best_player.unwrap();
        assert_eq!(best.player.player_name, "Titolare");
        assert_eq!(best.min_appearances, 5.0);
    }

    #[test]
    fn no_qualifying_player_is_empty_not_error() {
        let stats = vec![stat("Lupi", "P", "Mai", 0.0, 0.0, 0, 0)];
        let summary = compute_team_summary("Lupi", &stats, &[]);
        assert!(summary.best_player.is_none());
        assert!(summary.top_assistman.is_none());
        assert!(summary.best_by_role.is_empty());
        assert!(summary.top_scorer.is_some());

        let empty = compute_team_summary("Nessuno", &stats, &[]);
        assert!(empty.top_scorer.is_none());
        assert!(empty.position.is_none());
    }

    #[test]
    fn position_assists_and_role_bests() {
        let stats = vec![
            stat("Lupi", "D", "Terzino", 10.0, 6.4, 1, 3),
            stat("Lupi", "D", "Centrale", 10.0, 6.9, 2, 1),
            stat("Lupi", "A", "Punta", 4.0, 8.0, 5, 3),
            stat("Falchi", "D", "Altro", 20.0, 9.0, 0, 9),
        ];
        let standings = crate::league::compute_standings(&[
            crate::league::results::fixtures::result("1", "Falchi", "Lupi", "1", "1-0", 70.0, 60.0),
        ]);

        let summary = compute_team_summary("Lupi", &stats, &standings);
        assert_eq!(summary.position, Some(2));
        assert_eq!(summary.top_assistman.unwrap().player_name, "Terzino");
        assert_eq!(summary.best_by_role.len(), 1);
        assert_eq!(summary.best_by_role[0].role, Role::Defender);
        assert_eq!(summary.best_by_role[0].player.player_name, "Centrale");
    }
}
