// Integration tests for the league companion.
//
// These drive the public API end to end: CSV uploads through the league
// service into a document store, then the standings, records, leaderboards
// and cup draw computed from what was stored.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fantabet_core::auth::Caller;
use fantabet_core::draw::{run_draw, DrawPhase};
use fantabet_core::ingest::{Role, SkipReason, UNAFFILIATED};
use fantabet_core::league::{by_giornata, MatchOutcome};
use fantabet_core::service::{ImportError, League};
use fantabet_core::squads::squad_sheets;
use fantabet_core::stats::{player_table, LeaderboardRules, PlayerColumn, PlayerFilter, PlayerSort};
use fantabet_core::store::{DocumentStore, MemoryStore, SqliteStore};

// ===========================================================================
// Test helpers
// ===========================================================================

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn admin() -> Caller {
    Caller::admin("commissioner")
}

/// League over `store` with roster, statistics and calendar uploaded.
async fn loaded<S: DocumentStore>(store: S) -> League<S> {
    let mut league = League::new(store, LeaderboardRules::default());
    let stamped = Utc.with_ymd_and_hms(2024, 9, 20, 18, 0, 0).unwrap();
    league
        .import_roster(&admin(), &fixture("roster.csv"))
        .await
        .unwrap();
    league
        .import_player_stats(&admin(), &fixture("player_stats.csv"), stamped)
        .await
        .unwrap();
    league
        .import_calendar(&admin(), &fixture("calendar.csv"))
        .await
        .unwrap();
    league
}

// ===========================================================================
// Uploads
// ===========================================================================

#[tokio::test]
async fn roster_upload_skips_malformed_lines() {
    let mut league = League::new(MemoryStore::new(), LeaderboardRules::default());
    let import = league
        .import_roster(&admin(), &fixture("roster.csv"))
        .await
        .unwrap();

    assert_eq!(import.report.accepted, 20);
    assert_eq!(import.report.skipped, 3);
    let reasons: Vec<&SkipReason> = import.report.skipped_lines.iter().map(|s| &s.reason).collect();
    assert_eq!(reasons[0], &SkipReason::HeaderRow);
    assert_eq!(reasons[1], &SkipReason::MissingField("role"));
    assert!(matches!(reasons[2], SkipReason::TooFewColumns { found: 2, .. }));
    assert_eq!(import.squads, 10);

    let roster = league.roster().await.unwrap();
    assert_eq!(roster[0].squad_name, "Aquile");
    assert_eq!(roster[0].player_name, "Meret");
    assert_eq!(roster[0].role, Role::Goalkeeper);

    for squad in league.squads().await.unwrap() {
        let mine: Vec<_> = roster.iter().filter(|e| e.squad_name == squad.name).collect();
        assert_eq!(squad.player_count as usize, mine.len());
        let cost: f64 = mine.iter().map(|e| e.cost).sum();
        assert!((squad.total_cost - cost).abs() < 1e-9);
    }
}

#[tokio::test]
async fn stats_upload_marks_unrostered_players() {
    let mut league = loaded(MemoryStore::new()).await;
    let stats = league.player_stats().await.unwrap();
    assert_eq!(stats.len(), 11);

    let dovbyk = stats.iter().find(|p| p.player_name == "Dovbyk").unwrap();
    assert_eq!(dovbyk.fanta_squad, UNAFFILIATED);
    let thuram = stats.iter().find(|p| p.player_name == "Thuram").unwrap();
    assert_eq!(thuram.fanta_squad, "Orsi");
}

#[tokio::test]
async fn non_admin_uploads_leave_store_untouched() {
    let mut league = loaded(MemoryStore::new()).await;
    let err = league
        .import_calendar(&Caller::anonymous(), "1;2024-09-01;A;B;1;1-0;60;50\n")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::PermissionDenied(_)));
    assert_eq!(league.results().await.unwrap().len(), 5);
}

// ===========================================================================
// League
// ===========================================================================

#[tokio::test]
async fn standings_from_uploaded_calendar() {
    let league = loaded(MemoryStore::new()).await;
    let standings = league.standings().await.unwrap();

    let order: Vec<&str> = standings.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(order, vec!["Cervi", "Aquile", "Delfini", "Bisonti"]);

    for row in &standings {
        assert_eq!(row.points, 3 * row.wins + row.draws);
    }
    let gf: u32 = standings.iter().map(|r| r.goals_for).sum();
    let ga: u32 = standings.iter().map(|r| r.goals_against).sum();
    assert_eq!(gf, ga);

    let aquile = &standings[1];
    assert_eq!(aquile.played, 3);
    assert_eq!(aquile.points, 4);
    assert!((aquile.fantasy_points - 145.5).abs() < 1e-9);
}

#[tokio::test]
async fn records_and_matchdays() {
    let league = loaded(MemoryStore::new()).await;
    let records = league.league_records().await.unwrap();

    let attack = records.best_attack.unwrap();
    assert_eq!((attack.team.as_str(), attack.value), ("Aquile", 4));
    let win = records.biggest_win.unwrap();
    assert_eq!(win.winner, "Cervi");
    assert_eq!(win.score, "79.0-60.0");

    let overview = league.overview().await.unwrap();
    assert_eq!(overview.matches, 5);
    assert_eq!(overview.draws, 2);
    assert_eq!(overview.total_goals, 11);

    let results = league.results().await.unwrap();
    let days = by_giornata(&results);
    let labels: Vec<&str> = days.iter().map(|d| d.giornata.as_str()).collect();
    assert_eq!(labels, vec!["1", "2", "3"]);
    assert_eq!(days[2].matches[0].result, MatchOutcome::Pending);
}

// ===========================================================================
// Statistics
// ===========================================================================

#[tokio::test]
async fn leaderboards_exclude_unaffiliated() {
    let mut league = loaded(MemoryStore::new()).await;
    let boards = league.leaderboards().await.unwrap();

    let scorers: Vec<&str> = boards.scorers.iter().map(|p| p.player_name.as_str()).collect();
    assert_eq!(scorers, vec!["Retegui", "Lautaro", "Vlahovic"]);
    let keepers: Vec<&str> = boards.goalkeepers.iter().map(|p| p.player_name.as_str()).collect();
    assert_eq!(keepers, vec!["Maignan", "Meret", "Sommer"]);
    assert_eq!(boards.total_matchdays, 5);
    assert_eq!(boards.presences(&boards.scorers[0]), "7/5");
}

#[tokio::test]
async fn team_summary_and_player_table() {
    let mut league = loaded(MemoryStore::new()).await;

    let summary = league.team_summary("Cervi").await.unwrap();
    assert_eq!(summary.position, Some(1));
    // Barella has too few appearances for the first floor.
    assert_eq!(summary.best_player.unwrap().player.player_name, "Maignan");
    assert_eq!(summary.top_assistman.unwrap().player_name, "Barella");

    let stats = league.player_stats().await.unwrap();
    let filter = PlayerFilter {
        squad: None,
        role: Some(Role::Forward),
    };
    let mut sort = PlayerSort::default();
    sort.select(PlayerColumn::Gf);
    let rows = player_table(stats, &filter, &sort);
    assert_eq!(rows[0].player_name, "Retegui");
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn squad_sheets_group_by_role() {
    let league = loaded(MemoryStore::new()).await;
    let roster = league.roster().await.unwrap();
    let sheets = squad_sheets(&roster);
    assert_eq!(sheets.len(), 10);
    assert_eq!(sheets[0].name, "Aquile");
    assert!((sheets[0].total_cost - 57.0).abs() < 1e-9);
    assert_eq!(sheets[0].lines[0].players[0].player_name, "Meret");
}

// ===========================================================================
// Cup draw
// ===========================================================================

#[tokio::test]
async fn cup_draw_over_uploaded_squads() {
    let mut league = loaded(MemoryStore::new()).await;
    let teams = league.draw_teams().await.unwrap();
    assert_eq!(teams.len(), 10);

    let state = run_draw(teams.clone(), &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
    assert_eq!(state.phase(), DrawPhase::Complete);
    let outcome = state.outcome().unwrap();
    league.record_draw(&admin(), &outcome).await.unwrap();

    let draws = league.draws().await.unwrap();
    assert_eq!(draws.len(), 1);
    let mut drawn: Vec<String> = draws[0]
        .group_a
        .iter()
        .chain(&draws[0].group_b)
        .cloned()
        .collect();
    drawn.sort();
    let mut expected = teams;
    expected.sort();
    assert_eq!(drawn, expected);
}

#[tokio::test]
async fn cup_draw_needs_ten_teams() {
    let teams: Vec<String> = (1..=9).map(|i| format!("T{i}")).collect();
    assert!(run_draw(teams, &mut ChaCha8Rng::seed_from_u64(1)).is_err());
}

// ===========================================================================
// SQLite persistence
// ===========================================================================

#[tokio::test]
async fn sqlite_league_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.db");

    {
        let league = loaded(SqliteStore::open(&path).unwrap()).await;
        assert_eq!(league.standings().await.unwrap().len(), 4);
    }

    let mut league = League::new(SqliteStore::open(&path).unwrap(), LeaderboardRules::default());
    assert_eq!(league.roster().await.unwrap().len(), 20);
    assert_eq!(league.squads().await.unwrap().len(), 10);
    assert_eq!(league.player_stats().await.unwrap().len(), 11);
    let standings = league.standings().await.unwrap();
    assert_eq!(standings[0].team, "Cervi");
}
