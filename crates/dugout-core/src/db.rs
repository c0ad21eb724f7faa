// SQLite-backed season-stat store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use tracing::{debug, warn};

use crate::records::{parse_stat, BatterSeason, Handedness, PitcherSeason, TeamRecord};
use crate::source::{RowFilter, StatSource};

const BATTER_COLUMNS: &str = r#"playerID, yearID, teamID, POS, bats, salary,
    H, "2B", "3B", HR, AB, BB, HBP, SF, SH, SO, "ops+""#;

const PITCHER_COLUMNS: &str = r#"playerID, yearID, teamID, POS, throws, salary,
    IPouts, BB, H, SO, ERA, fip, "fip-""#;

/// Read access to the `batter`, `pitcher` and `team` tables.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open an existing database file read-only. This is what the dashboard
    /// uses; it never writes to the store.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("database not found at {}", path.display());
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .context("failed to set busy timeout")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open (or create) a database read-write and make sure the three tables
    /// exist. Existing tables are left untouched. Pass `":memory:"` for an
    /// ephemeral in-memory database (useful for tests and fixtures).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS batter (
                playerID TEXT NOT NULL,
                yearID   INTEGER,
                teamID   TEXT NOT NULL,
                POS      TEXT NOT NULL,
                bats     TEXT,
                salary   REAL,
                H        INTEGER,
                "2B"     INTEGER,
                "3B"     INTEGER,
                HR       INTEGER,
                AB       INTEGER,
                BB       INTEGER,
                HBP      INTEGER,
                SF       INTEGER,
                SH       INTEGER,
                SO       INTEGER,
                "ops+"   REAL
            );

            CREATE TABLE IF NOT EXISTS pitcher (
                playerID TEXT NOT NULL,
                yearID   INTEGER,
                teamID   TEXT NOT NULL,
                POS      TEXT NOT NULL,
                throws   TEXT,
                salary   REAL,
                IPouts   INTEGER,
                BB       INTEGER,
                H        INTEGER,
                SO       INTEGER,
                ERA      REAL,
                fip      REAL,
                "fip-"   REAL
            );

            CREATE TABLE IF NOT EXISTS team (
                teamID TEXT PRIMARY KEY,
                name   TEXT,
                W      INTEGER,
                L      INTEGER,
                Rank   INTEGER
            );
            "#,
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. The guard is held for a single
    /// query and released when it goes out of scope, on every exit path.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Insert batter rows in a single transaction.
    pub fn import_batters(&self, rows: &[BatterSeason]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        for b in rows {
            tx.execute(
                &format!(
                    "INSERT INTO batter ({BATTER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
                ),
                params![
                    b.player_id,
                    b.season,
                    b.team_id,
                    b.position,
                    b.bats.map(|h| h.code()),
                    b.salary,
                    b.h,
                    b.doubles,
                    b.triples,
                    b.hr,
                    b.ab,
                    b.bb,
                    b.hbp,
                    b.sf,
                    b.sh,
                    b.so,
                    b.ops_plus,
                ],
            )
            .with_context(|| format!("failed to insert batter {}", b.player_id))?;
        }
        tx.commit().context("failed to commit batter import")?;
        Ok(())
    }

    /// Insert pitcher rows in a single transaction.
    pub fn import_pitchers(&self, rows: &[PitcherSeason]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        for p in rows {
            tx.execute(
                &format!(
                    "INSERT INTO pitcher ({PITCHER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                params![
                    p.player_id,
                    p.season,
                    p.team_id,
                    p.position,
                    p.throws.map(|h| h.code()),
                    p.salary,
                    p.ip_outs,
                    p.bb,
                    p.h,
                    p.so,
                    p.era,
                    p.fip,
                    p.fip_minus,
                ],
            )
            .with_context(|| format!("failed to insert pitcher {}", p.player_id))?;
        }
        tx.commit().context("failed to commit pitcher import")?;
        Ok(())
    }

    /// Insert a team row or replace the existing one.
    pub fn upsert_team(&self, team: &TeamRecord) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO team (teamID, name, W, L, Rank) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![team.team_id, team.name, team.wins, team.losses, team.rank],
        )
        .context("failed to upsert team")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Hand code normalized the way `Handedness::from_code` reads it.
const THROWS_CODE: &str = "CASE UPPER(TRIM(throws)) WHEN 'S' THEN 'B' ELSE UPPER(TRIM(throws)) END";

/// Build a `WHERE` clause and its bound values from a filter. Values are
/// always bound, never spliced into the SQL text. Columns are compared after
/// the same trimming the row mappers apply.
fn where_clause(filter: &RowFilter, pitcher: bool) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(team) = &filter.team_id {
        values.push(Value::Text(team.clone()));
        clauses.push(format!("TRIM(teamID) = ?{}", values.len()));
    }

    if !filter.positions.is_empty() {
        clauses.push(format!(
            "TRIM(POS) IN ({})",
            placeholders(&mut values, &filter.positions)
        ));
    }

    if pitcher && !filter.roles.is_empty() {
        clauses.push(format!(
            "(TRIM(POS) || ' ' || {THROWS_CODE}) IN ({})",
            placeholders(&mut values, &filter.roles)
        ));
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

fn placeholders(values: &mut Vec<Value>, items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            values.push(Value::Text(item.clone()));
            format!("?{}", values.len())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Coerce any SQLite cell to a number. Text is parsed; blobs, NULL and
/// unparsable text become `None`.
fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(r) if r.is_finite() => Some(r),
        Value::Text(ref s) => {
            let parsed = parse_stat(s);
            if parsed.is_none() && !s.trim().is_empty() {
                warn!("column {idx}: non-numeric value {s:?} treated as undefined");
            }
            parsed
        }
        _ => None,
    })
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        _ => None,
    })
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u32>> {
    Ok(number(row, idx)?
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.round() as u32))
}

fn season(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i32>> {
    Ok(number(row, idx)?.map(|v| v.round() as i32))
}

fn hand(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Handedness>> {
    Ok(text(row, idx)?.and_then(|s| Handedness::from_code(&s)))
}

fn batter_from_row(row: &Row<'_>) -> rusqlite::Result<BatterSeason> {
    Ok(BatterSeason {
        player_id: text(row, 0)?.unwrap_or_default(),
        season: season(row, 1)?,
        team_id: text(row, 2)?.unwrap_or_default(),
        position: text(row, 3)?.unwrap_or_default(),
        bats: hand(row, 4)?,
        salary: number(row, 5)?,
        h: number(row, 6)?,
        doubles: number(row, 7)?,
        triples: number(row, 8)?,
        hr: number(row, 9)?,
        ab: number(row, 10)?,
        bb: number(row, 11)?,
        hbp: number(row, 12)?,
        sf: number(row, 13)?,
        sh: number(row, 14)?,
        so: number(row, 15)?,
        ops_plus: number(row, 16)?,
    })
}

fn pitcher_from_row(row: &Row<'_>) -> rusqlite::Result<PitcherSeason> {
    Ok(PitcherSeason {
        player_id: text(row, 0)?.unwrap_or_default(),
        season: season(row, 1)?,
        team_id: text(row, 2)?.unwrap_or_default(),
        position: text(row, 3)?.unwrap_or_default(),
        throws: hand(row, 4)?,
        salary: number(row, 5)?,
        ip_outs: number(row, 6)?,
        bb: number(row, 7)?,
        h: number(row, 8)?,
        so: number(row, 9)?,
        era: number(row, 10)?,
        fip: number(row, 11)?,
        fip_minus: number(row, 12)?,
    })
}

// ---------------------------------------------------------------------------
// StatSource
// ---------------------------------------------------------------------------

impl StatSource for Database {
    fn fetch_batters(&self, filter: &RowFilter) -> Result<Vec<BatterSeason>> {
        let (clause, values) = where_clause(filter, false);
        let sql = format!("SELECT {BATTER_COLUMNS} FROM batter{clause} ORDER BY rowid");

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare batter query")?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), batter_from_row)
            .context("failed to query batters")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map batter rows")?;

        debug!("fetched {} batter rows ({:?})", rows.len(), filter);
        Ok(rows)
    }

    fn fetch_pitchers(&self, filter: &RowFilter) -> Result<Vec<PitcherSeason>> {
        let (clause, values) = where_clause(filter, true);
        let sql = format!("SELECT {PITCHER_COLUMNS} FROM pitcher{clause} ORDER BY rowid");

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare pitcher query")?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), pitcher_from_row)
            .context("failed to query pitchers")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pitcher rows")?;

        debug!("fetched {} pitcher rows ({:?})", rows.len(), filter);
        Ok(rows)
    }

    fn fetch_team(&self, team_id: &str) -> Result<Option<TeamRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT teamID, name, W, L, Rank FROM team WHERE teamID = ?1 LIMIT 1")
            .context("failed to prepare team query")?;

        let mut rows = stmt
            .query_map(params![team_id], |row| {
                Ok(TeamRecord {
                    team_id: text(row, 0)?.unwrap_or_default(),
                    name: text(row, 1)?,
                    wins: count(row, 2)?,
                    losses: count(row, 3)?,
                    rank: count(row, 4)?,
                })
            })
            .context("failed to query team")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read team row")?)),
            None => Ok(None),
        }
    }
}
