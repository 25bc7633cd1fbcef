// League service: upload pipelines and the read-side queries over a
// document store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::auth::{require_admin, Identity, PermissionDenied};
use crate::draw::DrawOutcome;
use crate::ingest::{
    content_lines, parse_calendar, parse_player_stats, parse_roster, ParseReport, PlayerStat,
    RosterEntry, SquadLookup,
};
use crate::league::{
    compute_league_records, compute_overview, compute_standings, LeagueOverview, LeagueRecords,
    MatchResult, StandingsRow,
};
use crate::squads::{aggregate_squads, SquadAggregate};
use crate::stats::{
    compute_leaderboards_with, compute_team_summary, summarize_by_squad, LeaderboardRules,
    Leaderboards, SquadStatsSummary, StatsCache, TeamSummary,
};
use crate::store::{
    clear_collection, fetch_typed, replace_collection, Collection, DocumentStore, StoreError,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error("{kind} upload is empty: expected at least {required} non-empty line(s)")]
    EmptyInput { kind: &'static str, required: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterImport {
    pub report: ParseReport,
    pub squads: usize,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsImport {
    pub report: ParseReport,
    pub squads: Vec<SquadStatsSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarImport {
    pub report: ParseReport,
    pub matches: usize,
}

/// One league over one store. Owns the player-stats cache; every write
/// path invalidates it first.
pub struct League<S> {
    store: S,
    cache: StatsCache,
    rules: LeaderboardRules,
}

impl<S: DocumentStore> League<S> {
    pub fn new(store: S, rules: LeaderboardRules) -> Self {
        League {
            store,
            cache: StatsCache::new(),
            rules,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &LeaderboardRules {
        &self.rules
    }

    // -----------------------------------------------------------------------
    // Uploads
    // -----------------------------------------------------------------------

    /// Replace every roster entry and squad aggregate with the contents of
    /// a roster CSV.
    pub async fn import_roster(
        &mut self,
        caller: &dyn Identity,
        text: &str,
    ) -> Result<RosterImport, ImportError> {
        require_admin(caller, "upload rosters")?;
        if content_lines(text) == 0 {
            return Err(ImportError::EmptyInput {
                kind: "roster",
                required: 1,
            });
        }
        self.cache.invalidate();

        let (entries, report) = parse_roster(text).finish();
        let squads = aggregate_squads(&entries);
        info!(
            "roster parsed: {} entries, {} skipped, {} squads",
            report.accepted,
            report.skipped,
            squads.len()
        );

        let players = replace_collection(&self.store, Collection::Players, &entries).await?;
        let squad_count = replace_collection(&self.store, Collection::Squads, &squads).await?;

        Ok(RosterImport {
            report,
            squads: squad_count,
            players,
        })
    }

    /// Replace the player statistics. Each player's fantasy squad is looked
    /// up in the stored roster.
    pub async fn import_player_stats(
        &mut self,
        caller: &dyn Identity,
        text: &str,
        stamped_at: DateTime<Utc>,
    ) -> Result<StatsImport, ImportError> {
        require_admin(caller, "upload player statistics")?;
        if content_lines(text) < 2 {
            return Err(ImportError::EmptyInput {
                kind: "player statistics",
                required: 2,
            });
        }
        self.cache.invalidate();

        let roster: Vec<RosterEntry> = fetch_typed(&self.store, Collection::Players).await?;
        let lookup = SquadLookup::from_roster(&roster);
        info!("squad lookup built from {} roster players", lookup.len());

        let (stats, report) = parse_player_stats(text, &lookup, stamped_at).finish();
        info!(
            "player stats parsed: {} rows, {} skipped",
            report.accepted, report.skipped
        );

        replace_collection(&self.store, Collection::PlayerStats, &stats).await?;

        Ok(StatsImport {
            report,
            squads: summarize_by_squad(&stats),
        })
    }

    /// Replace the match calendar and results.
    pub async fn import_calendar(
        &mut self,
        caller: &dyn Identity,
        text: &str,
    ) -> Result<CalendarImport, ImportError> {
        require_admin(caller, "upload the calendar")?;
        if content_lines(text) == 0 {
            return Err(ImportError::EmptyInput {
                kind: "calendar",
                required: 1,
            });
        }
        self.cache.invalidate();

        let (results, report) = parse_calendar(text).finish();
        let matches = replace_collection(&self.store, Collection::Results, &results).await?;

        Ok(CalendarImport { report, matches })
    }

    pub async fn clear_player_stats(&mut self, caller: &dyn Identity) -> Result<usize, ImportError> {
        require_admin(caller, "clear player statistics")?;
        self.cache.invalidate();
        Ok(clear_collection(&self.store, Collection::PlayerStats).await?)
    }

    /// Delete every roster entry and squad aggregate.
    pub async fn clear_rosters(&mut self, caller: &dyn Identity) -> Result<usize, ImportError> {
        require_admin(caller, "clear rosters")?;
        self.cache.invalidate();
        let players = clear_collection(&self.store, Collection::Players).await?;
        let squads = clear_collection(&self.store, Collection::Squads).await?;
        Ok(players + squads)
    }

    /// Persist a completed cup draw; returns the new document id.
    pub async fn record_draw(
        &mut self,
        caller: &dyn Identity,
        outcome: &DrawOutcome,
    ) -> Result<String, ImportError> {
        require_admin(caller, "record a cup draw")?;
        let data = serde_json::to_value(outcome).map_err(StoreError::from)?;
        let id = self.store.insert(Collection::CupDraws, data).await?;
        info!("cup draw recorded as {id}");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn roster(&self) -> Result<Vec<RosterEntry>, StoreError> {
        fetch_typed(&self.store, Collection::Players).await
    }

    pub async fn squads(&self) -> Result<Vec<SquadAggregate>, StoreError> {
        fetch_typed(&self.store, Collection::Squads).await
    }

    pub async fn results(&self) -> Result<Vec<MatchResult>, StoreError> {
        fetch_typed(&self.store, Collection::Results).await
    }

    pub async fn draws(&self) -> Result<Vec<DrawOutcome>, StoreError> {
        fetch_typed(&self.store, Collection::CupDraws).await
    }

    pub async fn standings(&self) -> Result<Vec<StandingsRow>, StoreError> {
        Ok(compute_standings(&self.results().await?))
    }

    pub async fn league_records(&self) -> Result<LeagueRecords, StoreError> {
        Ok(compute_league_records(&self.results().await?))
    }

    pub async fn overview(&self) -> Result<LeagueOverview, StoreError> {
        Ok(compute_overview(&self.results().await?))
    }

    pub async fn player_stats(&mut self) -> Result<&[PlayerStat], StoreError> {
        self.cache.get_or_load(&self.store).await
    }

    pub async fn leaderboards(&mut self) -> Result<Leaderboards, StoreError> {
        let results = self.results().await?;
        let stats = self.cache.get_or_load(&self.store).await?;
        Ok(compute_leaderboards_with(stats, &results, &self.rules))
    }

    pub async fn team_summary(&mut self, squad: &str) -> Result<TeamSummary, StoreError> {
        let standings = self.standings().await?;
        let stats = self.cache.get_or_load(&self.store).await?;
        Ok(compute_team_summary(squad, stats, &standings))
    }

    /// Summaries for every drawn team, keyed by name, so the draw can show
    /// each team's position and key players as it is revealed.
    pub async fn team_summaries(
        &mut self,
        teams: &[String],
    ) -> Result<HashMap<String, TeamSummary>, StoreError> {
        let standings = self.standings().await?;
        let stats = self.cache.get_or_load(&self.store).await?;
        Ok(teams
            .iter()
            .map(|team| (team.clone(), compute_team_summary(team, stats, &standings)))
            .collect())
    }

    /// Teams eligible for the cup draw: the stored squads, or the teams in
    /// the standings when no roster has been uploaded.
    pub async fn draw_teams(&self) -> Result<Vec<String>, StoreError> {
        let squads = self.squads().await?;
        if !squads.is_empty() {
            return Ok(squads.into_iter().map(|s| s.name).collect());
        }
        Ok(self.standings().await?.into_iter().map(|r| r.team).collect())
    }
}
