// Plain-text rendering of league data for the terminal.
//
// Every printer writes to a caller-supplied sink so command output can be
// captured; `main` passes a locked stdout.

use std::io::{self, Write};

use fantabet_core::draw::{DrawOutcome, DrawStep};
use fantabet_core::ingest::{ParseReport, PlayerStat};
use fantabet_core::league::records::{DrawRecord, GiornataGoals, ScoreRecord, TeamRecord};
use fantabet_core::league::{LeagueOverview, LeagueRecords, Matchday, StandingsRow};
use fantabet_core::squads::{SquadAggregate, SquadSheet};
use fantabet_core::stats::{Leaderboards, SquadStatsSummary, TeamSummary};

const NO_DATA: &str = "no data available";

fn or_no_data(value: Option<String>) -> String {
    value.unwrap_or_else(|| NO_DATA.to_string())
}

pub fn parse_report(out: &mut impl Write, report: &ParseReport) -> io::Result<()> {
    writeln!(out, "{} lines accepted, {} skipped", report.accepted, report.skipped)?;
    for skipped in &report.skipped_lines {
        writeln!(out, "  line {}: {}", skipped.line, skipped.reason)?;
    }
    Ok(())
}

pub fn squad_upload_summary(out: &mut impl Write, squads: &[SquadStatsSummary]) -> io::Result<()> {
    for s in squads {
        writeln!(
            out,
            "{:<24} {:>3} players  {:>6.0} appearances  fm {:.2}",
            s.squad, s.players, s.total_appearances, s.average_fm
        )?;
    }
    Ok(())
}

pub fn standings(out: &mut impl Write, rows: &[StandingsRow]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "{NO_DATA}");
    }
    writeln!(
        out,
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>8}",
        "#", "team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "FantaPt"
    )?;
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4} {:>8.1}",
            i + 1,
            row.team,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference(),
            row.points,
            row.fantasy_points
        )?;
    }
    Ok(())
}

pub fn matchdays(out: &mut impl Write, days: &[Matchday<'_>]) -> io::Result<()> {
    if days.is_empty() {
        return writeln!(out, "{NO_DATA}");
    }
    for day in days {
        writeln!(out, "Giornata {}", day.giornata)?;
        for m in &day.matches {
            writeln!(
                out,
                "  {:<10} {:<20} {:>5} {:<20} ({:.1} - {:.1})",
                m.date, m.home_team, m.score, m.away_team, m.home_points, m.away_points
            )?;
        }
    }
    Ok(())
}

pub fn overview(out: &mut impl Write, overview: &LeagueOverview) -> io::Result<()> {
    writeln!(
        out,
        "{} matches: {} home wins, {} draws, {} away wins; {} goals ({:.2} per match)",
        overview.matches,
        overview.home_wins,
        overview.draws,
        overview.away_wins,
        overview.total_goals,
        overview.average_goals
    )
}

pub fn records(out: &mut impl Write, records: &LeagueRecords) -> io::Result<()> {
    let team = |r: &Option<TeamRecord>| {
        or_no_data(r.as_ref().map(|r| format!("{} ({})", r.team, r.value)))
    };
    let score = |r: &Option<ScoreRecord>| {
        or_no_data(r.as_ref().map(|r| {
            format!("{} {:.1} vs {} (giornata {})", r.team, r.score, r.opponent, r.giornata)
        }))
    };
    let draw = |r: &Option<DrawRecord>| {
        or_no_data(r.as_ref().map(|r| {
            format!("{} - {} {:.1} (giornata {})", r.home_team, r.away_team, r.score, r.giornata)
        }))
    };
    let giornata = |r: &Option<GiornataGoals>| {
        or_no_data(r.as_ref().map(|r| format!("giornata {} ({} goals)", r.giornata, r.total_goals)))
    };

    writeln!(out, "Best attack:           {}", team(&records.best_attack))?;
    writeln!(out, "Best defense:          {}", team(&records.best_defense))?;
    writeln!(out, "Best goal difference:  {}", team(&records.best_goal_difference))?;
    writeln!(out, "Worst goal difference: {}", team(&records.worst_goal_difference))?;
    writeln!(out, "Highest score:         {}", score(&records.highest_score))?;
    writeln!(out, "Lowest score:          {}", score(&records.lowest_score))?;
    writeln!(
        out,
        "Biggest win:           {}",
        or_no_data(records.biggest_win.as_ref().map(|w| format!(
            "{} over {} {} (+{:.1}, giornata {})",
            w.winner, w.loser, w.score, w.margin, w.giornata
        )))
    )?;
    writeln!(out, "Highest draw:          {}", draw(&records.highest_draw))?;
    writeln!(out, "Lowest draw:           {}", draw(&records.lowest_draw))?;
    writeln!(
        out,
        "Most goals in a match: {}",
        or_no_data(records.most_goals_match.as_ref().map(|m| format!(
            "{} - {} {} ({} goals, giornata {})",
            m.home_team, m.away_team, m.score, m.total_goals, m.giornata
        )))
    )?;
    writeln!(out, "Most goals giornata:   {}", giornata(&records.most_goals_giornata))?;
    writeln!(out, "Least goals giornata:  {}", giornata(&records.least_goals_giornata))
}

fn board(
    out: &mut impl Write,
    title: &str,
    players: &[PlayerStat],
    value: impl Fn(&PlayerStat) -> String,
) -> io::Result<()> {
    writeln!(out, "{title}")?;
    if players.is_empty() {
        return writeln!(out, "  {NO_DATA}");
    }
    for (i, p) in players.iter().enumerate() {
        writeln!(out, "  {}. {:<24} {:<20} {}", i + 1, p.player_name, p.fanta_squad, value(p))?;
    }
    Ok(())
}

pub fn leaderboards(out: &mut impl Write, boards: &Leaderboards) -> io::Result<()> {
    board(out, "Top scorers", &boards.scorers, |p| format!("{} goals", p.gf))?;
    board(out, "Top assistmen", &boards.assistmen, |p| format!("{} assists", p.ass))?;
    board(out, "Best goalkeepers", &boards.goalkeepers, |p| {
        format!("{} conceded in {}", p.gs, boards.presences(p))
    })?;
    board(out, "FantaMedia", &boards.fanta_media, |p| {
        format!("{:.2} in {}", p.fm, boards.presences(p))
    })
}

fn position_label(summary: &TeamSummary) -> String {
    or_no_data(summary.position.map(|p| p.to_string()))
}

fn top_scorer_label(summary: &TeamSummary) -> String {
    or_no_data(
        summary
            .top_scorer
            .as_ref()
            .map(|p| format!("{} ({} goals)", p.player_name, p.gf)),
    )
}

fn best_player_label(summary: &TeamSummary) -> String {
    or_no_data(summary.best_player.as_ref().map(|r| {
        format!(
            "{} (fm {:.2}, {} appearances)",
            r.player.player_name, r.player.fm, r.player.pv
        )
    }))
}

pub fn team_summary(out: &mut impl Write, summary: &TeamSummary) -> io::Result<()> {
    writeln!(out, "{}", summary.squad)?;
    writeln!(out, "  Position:      {}", position_label(summary))?;
    writeln!(out, "  Top scorer:    {}", top_scorer_label(summary))?;
    writeln!(out, "  Best player:   {}", best_player_label(summary))?;
    writeln!(
        out,
        "  Top assistman: {}",
        or_no_data(
            summary
                .top_assistman
                .as_ref()
                .map(|p| format!("{} ({} assists)", p.player_name, p.ass))
        )
    )?;
    for best in &summary.best_by_role {
        writeln!(
            out,
            "  Best {}:        {} (fm {:.2})",
            best.role, best.player.player_name, best.player.fm
        )?;
    }
    Ok(())
}

pub fn squads(
    out: &mut impl Write,
    squads: &[SquadAggregate],
    sheets: &[SquadSheet<'_>],
) -> io::Result<()> {
    if squads.is_empty() && sheets.is_empty() {
        return writeln!(out, "{NO_DATA}");
    }
    for s in squads {
        writeln!(
            out,
            "{:<24} {:>2} players  {:>7.1} credits  P{} D{} C{} A{}",
            s.name,
            s.player_count,
            s.total_cost,
            s.role_counts.goalkeepers,
            s.role_counts.defenders,
            s.role_counts.midfielders,
            s.role_counts.forwards
        )?;
    }
    for sheet in sheets {
        writeln!(out)?;
        writeln!(out, "{} ({:.1} credits)", sheet.name, sheet.total_cost)?;
        for line in &sheet.lines {
            let names: Vec<String> = line
                .players
                .iter()
                .map(|p| format!("{} {:.0}", p.player_name, p.cost))
                .collect();
            writeln!(out, "  {}: {}", line.role, names.join(", "))?;
        }
    }
    Ok(())
}

pub fn players(out: &mut impl Write, rows: &[&PlayerStat]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "{NO_DATA}");
    }
    writeln!(
        out,
        "{:<24} {:<2} {:<16} {:<20} {:>4} {:>5} {:>5} {:>3} {:>3} {:>3}",
        "player", "R", "team", "squad", "pv", "mv", "fm", "gf", "gs", "ass"
    )?;
    for p in rows {
        writeln!(
            out,
            "{:<24} {:<2} {:<16} {:<20} {:>4} {:>5.2} {:>5.2} {:>3} {:>3} {:>3}",
            p.player_name,
            p.role.code(),
            p.serie_a_team,
            p.fanta_squad,
            p.pv,
            p.mv,
            p.fm,
            p.gf,
            p.gs,
            p.ass
        )?;
    }
    Ok(())
}

/// One revealed team, followed by its league position, top scorer and best
/// player when a summary is available.
pub fn draw_step(
    out: &mut impl Write,
    step: &DrawStep,
    summary: Option<&TeamSummary>,
) -> io::Result<()> {
    writeln!(out, "{:>2}. {} -> group {}", step.index + 1, step.team, step.group)?;
    if let Some(summary) = summary {
        writeln!(
            out,
            "    position {} | top scorer {} | best player {}",
            position_label(summary),
            top_scorer_label(summary),
            best_player_label(summary)
        )?;
    }
    Ok(())
}

pub fn draw_outcome(out: &mut impl Write, outcome: &DrawOutcome) -> io::Result<()> {
    writeln!(out, "Group A: {}", outcome.group_a.join(", "))?;
    writeln!(out, "Group B: {}", outcome.group_b.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fantabet_core::draw::Group;
    use fantabet_core::league::{
        compute_league_records, compute_standings, Giornata, MatchOutcome, MatchResult,
    };

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn match_result(giornata: &str, home: &str, away: &str, code: &str, score: &str) -> MatchResult {
        MatchResult {
            giornata: Giornata::new(giornata),
            date: String::new(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            result: MatchOutcome::from(code),
            score: score.to_string(),
            home_points: 72.0,
            away_points: 64.5,
            home_fantasy_points: None,
            away_fantasy_points: None,
        }
    }

    fn empty_summary(squad: &str) -> TeamSummary {
        TeamSummary {
            squad: squad.to_string(),
            position: None,
            top_scorer: None,
            best_player: None,
            top_assistman: None,
            best_by_role: Vec::new(),
        }
    }

    #[test]
    fn empty_tables_show_placeholder() {
        assert_eq!(render(|out| standings(out, &[])), "no data available\n");
        assert_eq!(render(|out| matchdays(out, &[])), "no data available\n");
        assert_eq!(render(|out| players(out, &[])), "no data available\n");
        assert_eq!(render(|out| squads(out, &[], &[])), "no data available\n");
    }

    #[test]
    fn standings_rows_are_numbered() {
        let results = vec![match_result("1", "Lupi", "Orsi", "1", "2-0")];
        let text = render(|out| standings(out, &compute_standings(&results)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with("1  Lupi"));
        assert!(lines[1].contains("+2"));
        assert!(lines[2].trim_start().starts_with("2  Orsi"));
    }

    #[test]
    fn missing_records_show_placeholder() {
        let text = render(|out| records(out, &LeagueRecords::default()));
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().all(|l| l.ends_with(NO_DATA)));

        let results = vec![match_result("4", "Lupi", "Orsi", "1", "3-1")];
        let text = render(|out| records(out, &compute_league_records(&results)));
        assert!(text.contains("Biggest win:           Lupi over Orsi 72.0-64.5 (+7.5, giornata 4)"));
        assert!(text.contains("Most goals giornata:   giornata 4 (4 goals)"));
    }

    #[test]
    fn empty_leaderboards_keep_titles() {
        let text = render(|out| leaderboards(out, &Leaderboards::default()));
        assert_eq!(text.matches(NO_DATA).count(), 4);
        assert!(text.starts_with("Top scorers\n"));
    }

    #[test]
    fn draw_step_with_and_without_team_stats() {
        let step = DrawStep {
            index: 2,
            team: "Lupi".to_string(),
            group: Group::A,
        };
        let bare = render(|out| draw_step(out, &step, None));
        assert_eq!(bare, " 3. Lupi -> group A\n");

        let mut summary = empty_summary("Lupi");
        summary.position = Some(4);
        let text = render(|out| draw_step(out, &step, Some(&summary)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "    position 4 | top scorer no data available | best player no data available"
        );
    }

    #[test]
    fn draw_outcome_lists_both_groups() {
        let outcome = DrawOutcome {
            drawn_at: Utc::now(),
            group_a: vec!["A1".into(), "A2".into()],
            group_b: vec!["B1".into()],
        };
        assert_eq!(
            render(|out| draw_outcome(out, &outcome)),
            "Group A: A1, A2\nGroup B: B1\n"
        );
    }
}
