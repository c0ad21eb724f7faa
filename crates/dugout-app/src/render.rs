// Output rendering for the CLI: JSON (with a generation stamp), CSV, or a
// plain aligned table.

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use dugout_baseball::metrics::Metric;
use dugout_baseball::overview::{OverviewTiles, Tile, TeamVsLeague};
use dugout_baseball::percentile::{Percentiles, RankedBatter, RankedPitcher};
use dugout_baseball::profile::GroupProfile;
use dugout_baseball::quadrant::{ContributionPoint, ContributionReport};
use dugout_core::records::TeamRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Unknown format: {}. Use json, csv, or table.", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular view
// ---------------------------------------------------------------------------

/// Flat rows for CSV and table output. Undefined values are empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

fn cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => String::new(),
    }
}

fn text(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn percentile_cells<M: Metric>(p: &Percentiles<M>) -> impl Iterator<Item = String> + '_ {
    p.iter().map(|(_, pct)| cell(pct, 1))
}

fn metric_headers<M: Metric>() -> impl Iterator<Item = &'static str> {
    M::ALL.iter().map(|m| m.label())
}

pub fn batters_table(rows: &[RankedBatter]) -> Table {
    let mut t = Table::new(
        ["player_id", "team_id", "position", "pa", "avg", "obp", "slg", "qualified"]
            .into_iter()
            .chain(metric_headers::<dugout_baseball::metrics::BatterMetric>()),
    );
    for r in rows {
        let s = &r.line.season;
        let rates = &r.line.rates;
        let mut row = vec![
            s.player_id.clone(),
            s.team_id.clone(),
            s.position.clone(),
            cell(rates.pa, 0),
            cell(rates.avg, 3),
            cell(rates.obp, 3),
            cell(rates.slg, 3),
            r.qualified.to_string(),
        ];
        row.extend(percentile_cells(&r.percentiles));
        t.push(row);
    }
    t
}

pub fn pitchers_table(rows: &[RankedPitcher]) -> Table {
    let mut t = Table::new(
        ["player_id", "team_id", "position", "throws", "ip", "k9", "bb9", "whip", "qualified"]
            .into_iter()
            .chain(metric_headers::<dugout_baseball::metrics::PitcherMetric>()),
    );
    for r in rows {
        let s = &r.line.season;
        let rates = &r.line.rates;
        let mut row = vec![
            s.player_id.clone(),
            s.team_id.clone(),
            s.position.clone(),
            text(s.throws),
            cell(rates.ip, 1),
            cell(rates.k9, 2),
            cell(rates.bb9, 2),
            cell(rates.whip, 2),
            r.qualified.to_string(),
        ];
        row.extend(percentile_cells(&r.percentiles));
        t.push(row);
    }
    t
}

pub fn profile_table<M: Metric>(profile: &GroupProfile<M>) -> Table {
    let mut t = Table::new(["group", "members", "metric", "value"]);
    for v in &profile.values {
        t.push(vec![
            profile.group.clone(),
            profile.members.to_string(),
            v.metric.label().to_string(),
            cell(v.value, 1),
        ]);
    }
    t
}

pub fn players_table(points: &[ContributionPoint]) -> Table {
    let mut t = Table::new(["player_id", "team_id", "position", "salary", "metric", "quadrant"]);
    for p in points {
        t.push(vec![
            p.player_id.clone(),
            p.team_id.clone(),
            p.position.clone(),
            cell(p.salary, 0),
            cell(p.metric, 1),
            text(p.quadrant),
        ]);
    }
    t
}

pub fn contribution_table(report: &ContributionReport) -> Table {
    let mut t = players_table(&report.points);
    t.headers[4] = report.metric_name.to_string();
    t
}

pub fn comparison_table(cmp: &TeamVsLeague) -> Table {
    let mut t = Table::new(["category", "league_avg", "team_avg"]);
    for c in &cmp.categories {
        t.push(vec![
            c.category.clone(),
            cell(c.league_avg, 1),
            cell(Some(c.team_avg), 1),
        ]);
    }
    t
}

pub fn tiles_table(tiles: &OverviewTiles) -> Table {
    let mut t = Table::new(["tile", "value", "diff"]);
    let mut add = |name: &str, tile: &Tile| {
        t.push(vec![name.to_string(), cell(tile.value, 1), cell(tile.diff, 1)]);
    };
    add("SP", &tiles.starters);
    add("RP", &tiles.relievers);
    add("H", &tiles.hitters);
    t
}

pub fn record_table(record: &TeamRecord) -> Table {
    let mut t = Table::new(["team_id", "name", "wins", "losses", "rank"]);
    t.push(vec![
        record.team_id.clone(),
        text(record.name.as_deref()),
        text(record.wins),
        text(record.losses),
        text(record.rank),
    ]);
    t
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    command: &'a str,
    generated_at: String,
    data: &'a T,
}

/// Write `data` in the requested format. JSON output is wrapped in an
/// envelope carrying the command name and a UTC generation timestamp.
pub fn render<T: Serialize, W: Write>(
    out: &mut W,
    format: OutputFormat,
    command: &str,
    data: &T,
    table: &Table,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let envelope = Envelope {
                command,
                generated_at: Utc::now().to_rfc3339(),
                data,
            };
            serde_json::to_writer_pretty(&mut *out, &envelope)
                .context("failed to write JSON output")?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(out, table)?,
        OutputFormat::Table => write_table(out, table)?,
    }
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(&table.headers)
        .context("failed to write CSV header")?;
    for row in &table.rows {
        wtr.write_record(row).context("failed to write CSV row")?;
    }
    wtr.flush().context("failed to flush CSV output")?;
    Ok(())
}

fn write_table<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.len()).collect();
    for row in &table.rows {
        for (i, c) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(c.len().max(1));
            }
        }
    }

    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    writeln!(out, "{}", pad_line(&headers, &widths))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    writeln!(out, "{}", pad_line(&rule, &widths))?;
    for row in &table.rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|c| if c.is_empty() { "-" } else { c.as_str() })
            .collect();
        writeln!(out, "{}", pad_line(&cells, &widths))?;
    }
    Ok(())
}

fn pad_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<width$}", width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Message rendered in place of a result when there is nothing to show.
#[derive(Debug, Serialize)]
pub struct NoData {
    pub message: String,
}

pub fn no_data_table(message: &str) -> Table {
    let mut t = Table::new(["message"]);
    t.push(vec![message.to_string()]);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use dugout_baseball::quadrant::Quadrant;

    fn point(id: &str, salary: Option<f64>, quadrant: Option<Quadrant>) -> ContributionPoint {
        ContributionPoint {
            player_id: id.into(),
            team_id: "LAA".into(),
            position: "SS".into(),
            salary,
            metric: Some(104.0),
            quadrant,
        }
    }

    fn rendered(format: OutputFormat, data: &impl Serialize, table: &Table) -> String {
        let mut buf = Vec::new();
        render(&mut buf, format, "test", data, table).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn csv_leaves_undefined_cells_empty() {
        let points = vec![
            point("a", Some(1_500_000.0), Some(Quadrant::Value)),
            point("b", None, None),
        ];
        let out = rendered(OutputFormat::Csv, &points, &players_table(&points));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "player_id,team_id,position,salary,metric,quadrant");
        assert_eq!(lines[1], "a,LAA,SS,1500000,104.0,Value Players");
        assert_eq!(lines[2], "b,LAA,SS,,104.0,");
    }

    #[test]
    fn table_aligns_and_marks_undefined() {
        let points = vec![point("longer_id", None, None)];
        let out = rendered(OutputFormat::Table, &points, &players_table(&points));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("player_id  team_id"));
        assert!(lines[1].starts_with("---------"));
        assert!(lines[2].starts_with("longer_id  LAA"));
        assert!(lines[2].ends_with('-'));
    }

    #[test]
    fn json_is_wrapped_with_timestamp() {
        let record = TeamRecord {
            team_id: "LAA".into(),
            wins: Some(73),
            ..Default::default()
        };
        let out = rendered(OutputFormat::Json, &record, &record_table(&record));
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["command"], "test");
        assert_eq!(v["data"]["wins"], 73);
        assert!(v["data"]["name"].is_null());
        let stamp = v["generated_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn record_table_has_one_row() {
        let t = record_table(&TeamRecord {
            team_id: "LAA".into(),
            ..Default::default()
        });
        assert_eq!(t.rows, vec![vec!["LAA".to_string(), String::new(), String::new(), String::new(), String::new()]]);
    }
}
