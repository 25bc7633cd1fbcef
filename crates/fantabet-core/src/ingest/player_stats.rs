// Player statistics uploads: 17-column season export with a header row.
//
// Column order:
//   Id;R;Nome;Squadra;Pv;Mv;Fm;Gf;Gs;Rp;Rc;R+;R-;Ass;Amm;Esp;Au

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Records, Role, RosterEntry, Schema, SkipReason};
use crate::lenient;

/// Squad name given to players that no roster claims.
pub const UNAFFILIATED: &str = "SVINCOLATI";

const STATS_COLUMNS: usize = 17;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    #[serde(default)]
    pub player_id: String,
    pub role: Role,
    pub player_name: String,
    #[serde(default)]
    pub serie_a_team: String,
    pub fanta_squad: String,
    /// Appearances.
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub pv: f64,
    /// Base average vote.
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub mv: f64,
    /// Fantasy average.
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub fm: f64,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub gf: i32,
    /// Goals conceded (goalkeepers).
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub gs: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub rp: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub rc: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub r_plus: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub r_minus: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub ass: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub amm: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub esp: i32,
    #[serde(default, deserialize_with = "lenient::de_i32")]
    pub au: i32,
    pub last_update: DateTime<Utc>,
}

impl PlayerStat {
    pub fn is_unaffiliated(&self) -> bool {
        self.fanta_squad == UNAFFILIATED
    }

    /// Owned by a fantasy squad: neither the free-agent sentinel nor blank.
    pub fn is_rostered(&self) -> bool {
        !self.fanta_squad.trim().is_empty() && !self.is_unaffiliated()
    }
}

// ---------------------------------------------------------------------------
// Player → squad lookup
// ---------------------------------------------------------------------------

/// Case-insensitive map from player name to the squad that owns it.
#[derive(Debug, Clone, Default)]
pub struct SquadLookup {
    by_player: HashMap<String, String>,
}

impl SquadLookup {
    /// Later entries for the same normalized name win.
    pub fn from_roster<'a>(entries: impl IntoIterator<Item = &'a RosterEntry>) -> Self {
        let by_player = entries
            .into_iter()
            .map(|e| (normalize(&e.player_name), e.squad_name.clone()))
            .collect();
        SquadLookup { by_player }
    }

    pub fn resolve(&self, player_name: &str) -> &str {
        self.by_player
            .get(&normalize(player_name))
            .map(String::as_str)
            .unwrap_or(UNAFFILIATED)
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

pub struct PlayerStatsSchema<'l> {
    lookup: &'l SquadLookup,
    stamped_at: DateTime<Utc>,
}

impl<'l> PlayerStatsSchema<'l> {
    pub fn new(lookup: &'l SquadLookup, stamped_at: DateTime<Utc>) -> Self {
        PlayerStatsSchema { lookup, stamped_at }
    }
}

impl Schema for PlayerStatsSchema<'_> {
    type Record = PlayerStat;
    const NAME: &'static str = "player stats";

    fn is_header(&self, _fields: &[&str]) -> bool {
        true
    }

    fn decode(&self, fields: &[&str]) -> Result<PlayerStat, SkipReason> {
        if fields.len() < STATS_COLUMNS {
            return Err(SkipReason::TooFewColumns {
                found: fields.len(),
                expected: STATS_COLUMNS,
            });
        }

        let player_name = fields[2];
        Ok(PlayerStat {
            player_id: fields[0].to_string(),
            role: Role::from_code(fields[1]),
            player_name: player_name.to_string(),
            serie_a_team: fields[3].to_string(),
            fanta_squad: self.lookup.resolve(player_name).to_string(),
            pv: lenient::float_or_zero(fields[4]),
            mv: lenient::float_or_zero(fields[5]),
            fm: lenient::float_or_zero(fields[6]),
            gf: lenient::int_or_zero(fields[7]),
            gs: lenient::int_or_zero(fields[8]),
            rp: lenient::int_or_zero(fields[9]),
            rc: lenient::int_or_zero(fields[10]),
            r_plus: lenient::int_or_zero(fields[11]),
            r_minus: lenient::int_or_zero(fields[12]),
            ass: lenient::int_or_zero(fields[13]),
            amm: lenient::int_or_zero(fields[14]),
            esp: lenient::int_or_zero(fields[15]),
            au: lenient::int_or_zero(fields[16]),
            last_update: self.stamped_at,
        })
    }
}

/// Decode a statistics upload, resolving each player's squad through
/// `lookup` and stamping every record with `stamped_at`.
pub fn parse_player_stats<'a>(
    text: &'a str,
    lookup: &'a SquadLookup,
    stamped_at: DateTime<Utc>,
) -> Records<'a, PlayerStatsSchema<'a>> {
    Records::new(text, PlayerStatsSchema::new(lookup, stamped_at))
}
