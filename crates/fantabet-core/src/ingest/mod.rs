// CSV ingestion: semicolon-delimited uploads decoded into typed records.
//
// All upload schemas share the same line handling. A leading BOM is dropped,
// blank lines vanish, each field is trimmed and loses one pair of surrounding
// quotes, and lines that cannot be decoded are skipped and counted.

pub mod calendar;
pub mod player_stats;
pub mod roster;

use std::fmt;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use tracing::{debug, warn};

pub use calendar::{parse_calendar, CalendarSchema};
pub use player_stats::{parse_player_stats, PlayerStat, PlayerStatsSchema, SquadLookup, UNAFFILIATED};
pub use roster::{parse_roster, Role, RosterEntry, RosterSchema};

// ---------------------------------------------------------------------------
// Skip accounting
// ---------------------------------------------------------------------------

/// Why a non-blank line was left out of the parsed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewColumns { found: usize, expected: usize },
    MissingField(&'static str),
    HeaderRow,
    SummaryRow,
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewColumns { found, expected } => {
                write!(f, "expected at least {expected} columns, found {found}")
            }
            SkipReason::MissingField(name) => write!(f, "required field '{name}' is empty"),
            SkipReason::HeaderRow => write!(f, "repeated header row"),
            SkipReason::SummaryRow => write!(f, "credit summary row"),
            SkipReason::Unreadable(msg) => write!(f, "unreadable line: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the uploaded text.
    pub line: u64,
    pub reason: SkipReason,
}

/// Accepted/skipped tally for one upload. Blank lines and a schema's
/// leading header count as neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub accepted: usize,
    pub skipped: usize,
    pub skipped_lines: Vec<SkippedLine>,
}

impl ParseReport {
    fn skip(&mut self, line: u64, reason: SkipReason) {
        self.skipped += 1;
        self.skipped_lines.push(SkippedLine { line, reason });
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A CSV layout: decides which leading line is a header and how a split,
/// cleaned line becomes a record.
pub trait Schema {
    type Record;

    /// Name used in log lines.
    const NAME: &'static str;

    /// Called once, with the first non-blank line.
    fn is_header(&self, fields: &[&str]) -> bool;

    fn decode(&self, fields: &[&str]) -> Result<Self::Record, SkipReason>;
}

// ---------------------------------------------------------------------------
// Record iterator
// ---------------------------------------------------------------------------

/// Lazily decodes an upload, one record per accepted line.
///
/// The report is updated as the iterator advances; use [`Records::finish`]
/// to drain the rest and take both the records and the final tally.
pub struct Records<'a, S: Schema> {
    rows: StringRecordsIntoIter<&'a [u8]>,
    schema: S,
    report: ParseReport,
    seen_content: bool,
}

impl<'a, S: Schema> Records<'a, S> {
    pub fn new(text: &'a str, schema: S) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let rows = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(text.as_bytes())
            .into_records();

        Records {
            rows,
            schema,
            report: ParseReport::default(),
            seen_content: false,
        }
    }

    /// Tally of the lines consumed so far.
    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    pub fn finish(mut self) -> (Vec<S::Record>, ParseReport) {
        let mut records = Vec::new();
        for record in self.by_ref() {
            records.push(record);
        }
        (records, self.report)
    }

    fn skip(&mut self, line: u64, reason: SkipReason) {
        warn!("skipping {} line {line}: {reason}", S::NAME);
        self.report.skip(line, reason);
    }
}

impl<S: Schema> Iterator for Records<'_, S> {
    type Item = S::Record;

    fn next(&mut self) -> Option<S::Record> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    self.skip(line, SkipReason::Unreadable(e.to_string()));
                    continue;
                }
            };

            if is_blank(&row) {
                continue;
            }

            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let fields: Vec<&str> = row.iter().map(strip_quotes).collect();

            if !self.seen_content {
                self.seen_content = true;
                if self.schema.is_header(&fields) {
                    debug!("dropping {} header at line {line}", S::NAME);
                    continue;
                }
            }

            match self.schema.decode(&fields) {
                Ok(record) => {
                    self.report.accepted += 1;
                    return Some(record);
                }
                Err(reason) => self.skip(line, reason),
            }
        }
    }
}

/// Number of lines with any non-whitespace content.
pub fn content_lines(text: &str) -> usize {
    text.lines()
        .filter(|line| !line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}').is_empty())
        .count()
}

fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.iter().all(str::is_empty)
}

/// Remove one matching pair of surrounding `"` or `'`. The inner text is
/// not trimmed again.
pub(crate) fn strip_quotes(field: &str) -> &str {
    for quote in ['"', '\''] {
        if field.len() >= 2 && field.starts_with(quote) && field.ends_with(quote) {
            return &field[1..field.len() - 1];
        }
    }
    field
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
