// Player statistics table: filtering, column sorting and the per-squad
// summary shown after an upload.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ingest::{PlayerStat, Role};
use crate::league::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColumn {
    PlayerName,
    FantaSquad,
    Role,
    SerieATeam,
    Pv,
    Mv,
    Fm,
    Gf,
    Gs,
    Rp,
    Rc,
    RPlus,
    RMinus,
    Ass,
    Amm,
    Esp,
    Au,
}

impl PlayerColumn {
    pub const ALL: [PlayerColumn; 17] = [
        PlayerColumn::PlayerName,
        PlayerColumn::FantaSquad,
        PlayerColumn::Role,
        PlayerColumn::SerieATeam,
        PlayerColumn::Pv,
        PlayerColumn::Mv,
        PlayerColumn::Fm,
        PlayerColumn::Gf,
        PlayerColumn::Gs,
        PlayerColumn::Rp,
        PlayerColumn::Rc,
        PlayerColumn::RPlus,
        PlayerColumn::RMinus,
        PlayerColumn::Ass,
        PlayerColumn::Amm,
        PlayerColumn::Esp,
        PlayerColumn::Au,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerColumn::PlayerName => "playerName",
            PlayerColumn::FantaSquad => "fantaSquad",
            PlayerColumn::Role => "role",
            PlayerColumn::SerieATeam => "serieATeam",
            PlayerColumn::Pv => "pv",
            PlayerColumn::Mv => "mv",
            PlayerColumn::Fm => "fm",
            PlayerColumn::Gf => "gf",
            PlayerColumn::Gs => "gs",
            PlayerColumn::Rp => "rp",
            PlayerColumn::Rc => "rc",
            PlayerColumn::RPlus => "rPlus",
            PlayerColumn::RMinus => "rMinus",
            PlayerColumn::Ass => "ass",
            PlayerColumn::Amm => "amm",
            PlayerColumn::Esp => "esp",
            PlayerColumn::Au => "au",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            PlayerColumn::PlayerName
                | PlayerColumn::FantaSquad
                | PlayerColumn::Role
                | PlayerColumn::SerieATeam
        )
    }

    fn compare(self, a: &PlayerStat, b: &PlayerStat) -> Ordering {
        match self {
            PlayerColumn::PlayerName => a.player_name.cmp(&b.player_name),
            PlayerColumn::FantaSquad => a.fanta_squad.cmp(&b.fanta_squad),
            PlayerColumn::Role => a.role.code().cmp(b.role.code()),
            PlayerColumn::SerieATeam => a.serie_a_team.cmp(&b.serie_a_team),
            PlayerColumn::Pv => a.pv.total_cmp(&b.pv),
            PlayerColumn::Mv => a.mv.total_cmp(&b.mv),
            PlayerColumn::Fm => a.fm.total_cmp(&b.fm),
            PlayerColumn::Gf => a.gf.cmp(&b.gf),
            PlayerColumn::Gs => a.gs.cmp(&b.gs),
            PlayerColumn::Rp => a.rp.cmp(&b.rp),
            PlayerColumn::Rc => a.rc.cmp(&b.rc),
            PlayerColumn::RPlus => a.r_plus.cmp(&b.r_plus),
            PlayerColumn::RMinus => a.r_minus.cmp(&b.r_minus),
            PlayerColumn::Ass => a.ass.cmp(&b.ass),
            PlayerColumn::Amm => a.amm.cmp(&b.amm),
            PlayerColumn::Esp => a.esp.cmp(&b.esp),
            PlayerColumn::Au => a.au.cmp(&b.au),
        }
    }
}

impl fmt::Display for PlayerColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlayerColumn {
    type Err = crate::league::standings::UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerColumn::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::league::standings::UnknownColumn(s.to_string()))
    }
}

/// Column sort for the statistics table. Starts on fantasy average,
/// best first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSort {
    column: PlayerColumn,
    direction: SortDirection,
}

impl Default for PlayerSort {
    fn default() -> Self {
        PlayerSort {
            column: PlayerColumn::Fm,
            direction: SortDirection::Descending,
        }
    }
}

impl PlayerSort {
    pub fn column(&self) -> PlayerColumn {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Same column flips; a new text column starts ascending, a new
    /// numeric column descending.
    pub fn select(&mut self, column: PlayerColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = if column.is_text() {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
        }
    }

    pub fn apply(&self, players: &mut [&PlayerStat]) {
        players.sort_by(|a, b| self.direction.apply(self.column.compare(a, b)));
    }
}

/// Table filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub squad: Option<String>,
    pub role: Option<Role>,
}

impl PlayerFilter {
    pub fn matches(&self, player: &PlayerStat) -> bool {
        self.squad.as_ref().map_or(true, |s| player.fanta_squad == *s)
            && self.role.as_ref().map_or(true, |r| player.role == *r)
    }
}

/// Filter then sort, borrowing from the snapshot.
pub fn player_table<'a>(
    stats: &'a [PlayerStat],
    filter: &PlayerFilter,
    sort: &PlayerSort,
) -> Vec<&'a PlayerStat> {
    let mut rows: Vec<&PlayerStat> = stats.iter().filter(|p| filter.matches(p)).collect();
    sort.apply(&mut rows);
    rows
}

// ---------------------------------------------------------------------------
// Upload summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadStatsSummary {
    pub squad: String,
    pub players: usize,
    pub total_appearances: f64,
    /// Mean of `fm` over the squad's players, 0 for an empty squad.
    pub average_fm: f64,
}

/// Per-squad totals, squads in name order (the unaffiliated sentinel
/// included).
pub fn summarize_by_squad(stats: &[PlayerStat]) -> Vec<SquadStatsSummary> {
    let mut groups: BTreeMap<&str, Vec<&PlayerStat>> = BTreeMap::new();
    for player in stats {
        groups.entry(&player.fanta_squad).or_default().push(player);
    }

    groups
        .into_iter()
        .map(|(squad, players)| {
            let total_fm: f64 = players.iter().map(|p| p.fm).sum();
            SquadStatsSummary {
                squad: squad.to_string(),
                players: players.len(),
                total_appearances: players.iter().map(|p| p.pv).sum(),
                average_fm: if players.is_empty() {
                    0.0
                } else {
                    total_fm / players.len() as f64
                },
            }
        })
        .collect()
}
