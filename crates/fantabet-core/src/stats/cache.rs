// Snapshot cache of the `player_stats` collection.

use std::collections::HashMap;

use tracing::debug;

use crate::ingest::PlayerStat;
use crate::store::{fetch_typed, Collection, DocumentStore, StoreError};

/// Loaded player stats plus a per-squad index. Writers must call
/// [`StatsCache::invalidate`] before touching the collection.
#[derive(Debug, Default)]
pub struct StatsCache {
    snapshot: Option<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    players: Vec<PlayerStat>,
    by_squad: HashMap<String, Vec<usize>>,
}

impl Snapshot {
    fn new(players: Vec<PlayerStat>) -> Self {
        let mut by_squad: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, player) in players.iter().enumerate() {
            by_squad
                .entry(player.fanta_squad.clone())
                .or_default()
                .push(i);
        }
        Snapshot { players, by_squad }
    }
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("player stats cache invalidated");
        }
    }

    /// The cached snapshot, fetching it from `store` on first use.
    pub async fn get_or_load<S>(&mut self, store: &S) -> Result<&[PlayerStat], StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let snapshot = self.load(store).await?;
        Ok(&snapshot.players)
    }

    /// One squad's players in stored order.
    pub async fn squad_players<S>(
        &mut self,
        store: &S,
        squad: &str,
    ) -> Result<Vec<&PlayerStat>, StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let snapshot = self.load(store).await?;
        let players: Vec<&PlayerStat> = snapshot
            .by_squad
            .get(squad)
            .map(|indices| indices.iter().map(|&i| &snapshot.players[i]).collect())
            .unwrap_or_default();
        Ok(players)
    }

    async fn load<S>(&mut self, store: &S) -> Result<&Snapshot, StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let snapshot = match self.snapshot.take() {
            Some(snapshot) => snapshot,
            None => {
                let players: Vec<PlayerStat> = fetch_typed(store, Collection::PlayerStats).await?;
                debug!("loaded {} player stats into cache", players.len());
                Snapshot::new(players)
            }
        };
        Ok(self.snapshot.insert(snapshot))
    }
}
