// Calendar uploads:
//   giornata;date;homeTeam;awayTeam;result;score;homePoints;awayPoints[;homeFantasyPoints;awayFantasyPoints]

use super::{Records, Schema, SkipReason};
use crate::league::results::{Giornata, MatchOutcome, MatchResult};
use crate::lenient;

const CALENDAR_COLUMNS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarSchema;

impl Schema for CalendarSchema {
    type Record = MatchResult;
    const NAME: &'static str = "calendar";

    fn is_header(&self, fields: &[&str]) -> bool {
        fields
            .first()
            .is_some_and(|f| f.eq_ignore_ascii_case("giornata"))
    }

    fn decode(&self, fields: &[&str]) -> Result<MatchResult, SkipReason> {
        if fields.len() < CALENDAR_COLUMNS {
            return Err(SkipReason::TooFewColumns {
                found: fields.len(),
                expected: CALENDAR_COLUMNS,
            });
        }
        if fields[0].is_empty() {
            return Err(SkipReason::MissingField("giornata"));
        }
        if fields[2].is_empty() {
            return Err(SkipReason::MissingField("homeTeam"));
        }
        if fields[3].is_empty() {
            return Err(SkipReason::MissingField("awayTeam"));
        }

        let optional = |i: usize| {
            fields
                .get(i)
                .filter(|f| !f.is_empty())
                .map(|f| lenient::float_or_zero(f))
        };

        Ok(MatchResult {
            giornata: Giornata::new(fields[0]),
            date: fields[1].to_string(),
            home_team: fields[2].to_string(),
            away_team: fields[3].to_string(),
            result: MatchOutcome::from(fields[4]),
            score: fields[5].to_string(),
            home_points: lenient::float_or_zero(fields[6]),
            away_points: lenient::float_or_zero(fields[7]),
            home_fantasy_points: optional(8),
            away_fantasy_points: optional(9),
        })
    }
}

/// Decode a calendar upload.
pub fn parse_calendar(text: &str) -> Records<'_, CalendarSchema> {
    Records::new(text, CalendarSchema)
}
