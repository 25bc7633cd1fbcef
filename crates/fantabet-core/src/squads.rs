// Squad aggregates and squad sheets derived from roster entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ingest::{Role, RosterEntry};

/// Players per standard role. Other role codes are not counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    #[serde(rename = "P", default)]
    pub goalkeepers: u32,
    #[serde(rename = "D", default)]
    pub defenders: u32,
    #[serde(rename = "C", default)]
    pub midfielders: u32,
    #[serde(rename = "A", default)]
    pub forwards: u32,
}

impl RoleCounts {
    fn record(&mut self, role: &Role) {
        match role {
            Role::Goalkeeper => self.goalkeepers += 1,
            Role::Defender => self.defenders += 1,
            Role::Midfielder => self.midfielders += 1,
            Role::Forward => self.forwards += 1,
            Role::Other(_) => {}
        }
    }

    pub fn get(&self, role: &Role) -> u32 {
        match role {
            Role::Goalkeeper => self.goalkeepers,
            Role::Defender => self.defenders,
            Role::Midfielder => self.midfielders,
            Role::Forward => self.forwards,
            Role::Other(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadAggregate {
    pub name: String,
    pub player_count: u32,
    pub total_cost: f64,
    #[serde(rename = "roles", default)]
    pub role_counts: RoleCounts,
}

/// One aggregate per distinct squad name (exact match), in first-seen order.
pub fn aggregate_squads(entries: &[RosterEntry]) -> Vec<SquadAggregate> {
    let mut squads: Vec<SquadAggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let slot = *index.entry(entry.squad_name.as_str()).or_insert_with(|| {
            squads.push(SquadAggregate {
                name: entry.squad_name.clone(),
                player_count: 0,
                total_cost: 0.0,
                role_counts: RoleCounts::default(),
            });
            squads.len() - 1
        });

        let squad = &mut squads[slot];
        squad.player_count += 1;
        squad.total_cost += entry.cost;
        squad.role_counts.record(&entry.role);
    }

    squads
}

// ---------------------------------------------------------------------------
// Squad sheets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RoleLine<'a> {
    pub role: Role,
    pub players: Vec<&'a RosterEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquadSheet<'a> {
    pub name: &'a str,
    pub total_cost: f64,
    pub lines: Vec<RoleLine<'a>>,
}

/// The roster laid out per squad: squads by name, one line per standard
/// role (P, D, C, A) with the most expensive players first.
pub fn squad_sheets(entries: &[RosterEntry]) -> Vec<SquadSheet<'_>> {
    let mut by_squad: HashMap<&str, Vec<&RosterEntry>> = HashMap::new();
    for entry in entries {
        by_squad.entry(&entry.squad_name).or_default().push(entry);
    }

    let mut sheets: Vec<SquadSheet<'_>> = by_squad
        .into_iter()
        .map(|(name, players)| {
            let lines = Role::STANDARD
                .into_iter()
                .map(|role| {
                    let mut line: Vec<&RosterEntry> =
                        players.iter().copied().filter(|p| p.role == role).collect();
                    line.sort_by(|a, b| b.cost.total_cmp(&a.cost));
                    RoleLine { role, players: line }
                })
                .collect();
            SquadSheet {
                name,
                total_cost: players.iter().map(|p| p.cost).sum(),
                lines,
            }
        })
        .collect();

    sheets.sort_by(|a, b| a.name.cmp(b.name));
    sheets
}
