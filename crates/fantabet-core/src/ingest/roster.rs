// Roster uploads: `Squadra;Ruolo;Calciatore;Squadra (Serie A);Costo`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Records, Schema, SkipReason};
use crate::lenient;

/// Positional role of a player. The four Serie A fantasy codes are
/// recognized; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Other(String),
}

impl Role {
    /// The four standard roles in line-up order.
    pub const STANDARD: [Role; 4] = [
        Role::Goalkeeper,
        Role::Defender,
        Role::Midfielder,
        Role::Forward,
    ];

    pub fn from_code(code: &str) -> Role {
        match code {
            "P" => Role::Goalkeeper,
            "D" => Role::Defender,
            "C" => Role::Midfielder,
            "A" => Role::Forward,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Role::Goalkeeper => "P",
            Role::Defender => "D",
            Role::Midfielder => "C",
            Role::Forward => "A",
            Role::Other(code) => code,
        }
    }
}

impl From<String> for Role {
    fn from(code: String) -> Self {
        Role::from_code(&code)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.code().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub squad_name: String,
    pub role: Role,
    pub player_name: String,
    #[serde(default)]
    pub serie_a_team: String,
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RosterSchema;

const ROSTER_COLUMNS: usize = 5;

impl Schema for RosterSchema {
    type Record = RosterEntry;
    const NAME: &'static str = "roster";

    // Header lines are rejected by `decode` and counted as skipped, so a
    // re-pasted header in the middle of the file is treated the same way.
    fn is_header(&self, _fields: &[&str]) -> bool {
        false
    }

    fn decode(&self, fields: &[&str]) -> Result<RosterEntry, SkipReason> {
        let [squad, role, player, team, cost, ..] = fields else {
            return Err(SkipReason::TooFewColumns {
                found: fields.len(),
                expected: ROSTER_COLUMNS,
            });
        };

        if squad.is_empty() {
            return Err(SkipReason::MissingField("squadName"));
        }
        if role.is_empty() {
            return Err(SkipReason::MissingField("role"));
        }
        if player.is_empty() {
            return Err(SkipReason::MissingField("playerName"));
        }
        if *role == "Ruolo" || *squad == "Squadra" {
            return Err(SkipReason::HeaderRow);
        }
        if squad.contains("Crediti Residui") {
            return Err(SkipReason::SummaryRow);
        }

        Ok(RosterEntry {
            squad_name: squad.to_string(),
            role: Role::from_code(role),
            player_name: player.to_string(),
            serie_a_team: team.to_string(),
            cost: lenient::float_or_zero(cost).max(0.0),
        })
    }
}

/// Decode a roster upload.
pub fn parse_roster(text: &str) -> Records<'_, RosterSchema> {
    Records::new(text, RosterSchema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_roster_upload() {
        let text = "Squadra;Ruolo;Calciatore;Squadra (Serie A);Costo\n\
                    Lupi;P;Rossi;Roma;12\n\
                    Lupi;Crediti Residui;;;\n\
                    ;;;;\n\
                    Falchi;A;\"Bianchi\";Inter;30.5";
        let (entries, report) = parse_roster(text).finish();

        assert_eq!(entries.len(), 2);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped, 3);

        assert_eq!(entries[0].squad_name, "Lupi");
        assert_eq!(entries[0].role, Role::Goalkeeper);
        assert_eq!(entries[0].player_name, "Rossi");
        assert_eq!(entries[0].serie_a_team, "Roma");
        assert!((entries[0].cost - 12.0).abs() < f64::EPSILON);

        assert_eq!(entries[1].player_name, "Bianchi");
        assert_eq!(entries[1].role, Role::Forward);
        assert!((entries[1].cost - 30.5).abs() < f64::EPSILON);
    }

    #[test]
    fn quoted_line_decodes_every_field() {
        let (entries, _) = parse_roster("\"SquadraX\";\"P\";\"Rossi\";\"Milan\";12.5").finish();
        assert_eq!(
            entries,
            vec![RosterEntry {
                squad_name: "SquadraX".to_string(),
                role: Role::Goalkeeper,
                player_name: "Rossi".to_string(),
                serie_a_team: "Milan".to_string(),
                cost: 12.5,
            }]
        );
    }

    #[test]
    fn summary_row_with_a_player_is_still_dropped() {
        let (entries, report) = parse_roster("Lupi Crediti Residui;C;X;Roma;5\n").finish();
        assert!(entries.is_empty());
        assert_eq!(report.skipped_lines[0].reason, SkipReason::SummaryRow);
    }

    #[test]
    fn repeated_header_is_skipped_not_fatal() {
        let text = "Lupi;P;Rossi;Roma;12\nSquadra;Ruolo;Calciatore;Squadra;Costo\nLupi;D;Verdi;Lazio;4\n";
        let (entries, report) = parse_roster(text).finish();
        assert_eq!(entries.len(), 2);
        assert_eq!(report.skipped_lines[0].reason, SkipReason::HeaderRow);
    }

    #[test]
    fn cost_is_lenient_and_never_negative() {
        let text = "Lupi;C;Neri;Milan;n.d.\nLupi;C;Gialli;Milan;-3\nLupi;C;Blu;Milan;7 crediti\n";
        let (entries, _) = parse_roster(text).finish();
        assert_eq!(entries[0].cost, 0.0);
        assert_eq!(entries[1].cost, 0.0);
        assert!((entries[2].cost - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let (entries, _) = parse_roster("Lupi;D;Verdi;Lazio;4;note;altro\n").finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::Defender);
    }

    #[test]
    fn unknown_role_code_is_preserved() {
        let (entries, _) = parse_roster("Lupi;T;Verdi;Lazio;4\n").finish();
        assert_eq!(entries[0].role, Role::Other("T".to_string()));
        assert_eq!(entries[0].role.to_string(), "T");
    }

    #[test]
    fn role_serializes_as_code() {
        let json = serde_json::to_value(Role::Midfielder).unwrap();
        assert_eq!(json, serde_json::json!("C"));
        let back: Role = serde_json::from_value(json).unwrap();
        assert_eq!(back, Role::Midfielder);
    }
}
