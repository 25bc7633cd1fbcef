// Match results as stored in the `results` collection, plus the helpers the
// standings and records engines share: score parsing and matchday grouping.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;

// ---------------------------------------------------------------------------
// Giornata
// ---------------------------------------------------------------------------

/// Matchday label. Stored either as a number or as free text ("3",
/// "Giornata 3", "Recupero"), so it is kept as text and only interpreted
/// on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Giornata(pub String);

impl Giornata {
    pub fn new(label: impl Into<String>) -> Self {
        Giornata(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading integer of the label, if it starts with one (`"12"` → 12,
    /// `"12bis"` → 12, `"Giornata 12"` → `None`).
    pub fn leading_number(&self) -> Option<i64> {
        let s = self.0.trim();
        let digits_end = s
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        s[..digits_end].parse().ok()
    }

    /// First run of digits anywhere in the label (`"Giornata 12"` → 12).
    pub fn first_number(&self) -> Option<u64> {
        let start = self.0.find(|c: char| c.is_ascii_digit())?;
        let rest = &self.0[start..];
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        rest[..end].parse().ok()
    }
}

impl fmt::Display for Giornata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Giornata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        let label = match Raw::deserialize(deserializer)? {
            Raw::Int(n) => n.to_string(),
            Raw::Float(v) => v.to_string(),
            Raw::Text(s) => s,
        };
        Ok(Giornata(label))
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The `1` / `X` / `2` result code. Anything else is preserved but earns
/// no points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
    #[default]
    Pending,
    Unrecognized(String),
}

impl MatchOutcome {
    pub fn code(&self) -> &str {
        match self {
            MatchOutcome::HomeWin => "1",
            MatchOutcome::Draw => "X",
            MatchOutcome::AwayWin => "2",
            MatchOutcome::Pending => "",
            MatchOutcome::Unrecognized(code) => code,
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            MatchOutcome::HomeWin | MatchOutcome::Draw | MatchOutcome::AwayWin
        )
    }
}

impl From<String> for MatchOutcome {
    fn from(code: String) -> Self {
        match code.as_str() {
            "1" => MatchOutcome::HomeWin,
            "X" => MatchOutcome::Draw,
            "2" => MatchOutcome::AwayWin,
            "" => MatchOutcome::Pending,
            _ => MatchOutcome::Unrecognized(code),
        }
    }
}

impl From<&str> for MatchOutcome {
    fn from(code: &str) -> Self {
        MatchOutcome::from(code.to_string())
    }
}

impl From<MatchOutcome> for String {
    fn from(outcome: MatchOutcome) -> Self {
        outcome.code().to_string()
    }
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub giornata: Giornata,
    #[serde(default)]
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub result: MatchOutcome,
    /// `"H-A"` goals, or a placeholder such as `-` / `N/A`.
    #[serde(default)]
    pub score: String,
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub home_points: f64,
    #[serde(default, deserialize_with = "lenient::de_f64")]
    pub away_points: f64,
    #[serde(
        default,
        deserialize_with = "lenient::de_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub home_fantasy_points: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::de_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub away_fantasy_points: Option<f64>,
}

impl MatchResult {
    /// Goals as `(home, away)` when the score parses.
    pub fn goals(&self) -> Option<(u32, u32)> {
        parse_score(&self.score)
    }

    /// Fantasy total credited to the home side: the explicit fantasy
    /// figure when stored, otherwise the match points.
    pub fn home_fantasy_total(&self) -> f64 {
        self.home_fantasy_points.unwrap_or(self.home_points)
    }

    pub fn away_fantasy_total(&self) -> f64 {
        self.away_fantasy_points.unwrap_or(self.away_points)
    }
}

/// Parse an `"H-A"` score. Both sides must be non-negative integers.
pub fn parse_score(score: &str) -> Option<(u32, u32)> {
    let (home, away) = score.split_once('-')?;
    let home = home.trim().parse().ok()?;
    let away = away.trim().parse().ok()?;
    Some((home, away))
}

// ---------------------------------------------------------------------------
// Matchday grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Matchday<'a> {
    pub giornata: &'a Giornata,
    pub matches: Vec<&'a MatchResult>,
}

/// Group results by giornata label for the historic view.
///
/// Groups are ordered by the first number in the label, labels without one
/// last; equal keys keep encounter order. Matches within a group are ordered
/// by ISO date, undated matches last.
pub fn by_giornata(results: &[MatchResult]) -> Vec<Matchday<'_>> {
    let mut days: Vec<Matchday<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for result in results {
        let slot = *index.entry(result.giornata.as_str()).or_insert_with(|| {
            days.push(Matchday {
                giornata: &result.giornata,
                matches: Vec::new(),
            });
            days.len() - 1
        });
        days[slot].matches.push(result);
    }

    days.sort_by_key(|day| day.giornata.first_number().unwrap_or(u64::MAX));
    for day in &mut days {
        day.matches.sort_by(|a, b| compare_dates(&a.date, &b.date));
    }
    days
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
