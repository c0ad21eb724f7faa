// Team vs league comparisons on the headline adjusted metrics.

use std::collections::BTreeMap;

use dugout_core::records::{BatterSeason, Handedness, PitcherSeason, TeamRecord};
use serde::Serialize;

use crate::metrics::PlayerType;
use crate::profile::{PitcherRole, HITTER_POSITIONS};

/// League and team averages for one category (a position, a role key or a
/// throwing hand).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub category: String,
    pub league_avg: Option<f64>,
    pub team_avg: f64,
}

/// A set of category comparisons on one metric, sorted by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamVsLeague {
    pub metric_name: &'static str,
    pub categories: Vec<CategoryComparison>,
}

impl TeamVsLeague {
    pub fn get(&self, category: &str) -> Option<&CategoryComparison> {
        self.categories.iter().find(|c| c.category == category)
    }
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Group `(category, on_team, value)` observations and average them per
/// category. Categories with no defined team value are dropped.
fn compare<I>(metric_name: &'static str, observations: I) -> TeamVsLeague
where
    I: IntoIterator<Item = (String, bool, Option<f64>)>,
{
    let mut by_category: BTreeMap<String, (Mean, Mean)> = BTreeMap::new();
    for (category, on_team, value) in observations {
        let (league, team) = by_category.entry(category).or_default();
        league.push(value);
        if on_team {
            team.push(value);
        }
    }

    let categories = by_category
        .into_iter()
        .filter_map(|(category, (league, team))| {
            team.value().map(|team_avg| CategoryComparison {
                category,
                league_avg: league.value(),
                team_avg,
            })
        })
        .collect();

    TeamVsLeague {
        metric_name,
        categories,
    }
}

fn wanted(list: &[String], category: &str) -> bool {
    list.is_empty() || list.iter().any(|c| c == category)
}

// ---------------------------------------------------------------------------
// Performance comparison
// ---------------------------------------------------------------------------

/// League vs team OPS+ per position. An empty `positions` list means every
/// position present.
pub fn batter_comparison(rows: &[BatterSeason], team_id: &str, positions: &[String]) -> TeamVsLeague {
    compare(
        PlayerType::Batter.headline_metric(),
        rows.iter()
            .filter(|r| wanted(positions, &r.position))
            .map(|r| (r.position.clone(), r.team_id == team_id, r.ops_plus)),
    )
}

/// League vs team FIP- per role key (`"SP R"`, `"RP L"`, ...). Pitchers with
/// no known throwing hand have no role key and are skipped.
pub fn pitcher_comparison(rows: &[PitcherSeason], team_id: &str, roles: &[String]) -> TeamVsLeague {
    compare(
        PlayerType::Pitcher.headline_metric(),
        rows.iter().filter_map(|r| {
            let key = r.role_key()?;
            wanted(roles, &key).then(|| (key, r.team_id == team_id, r.fip_minus))
        }),
    )
}

// ---------------------------------------------------------------------------
// Overview breakdown
// ---------------------------------------------------------------------------

/// Pitchers in one role split by throwing hand (`L`, `R`).
pub fn role_breakdown(rows: &[PitcherSeason], team_id: &str, role: PitcherRole) -> TeamVsLeague {
    compare(
        PlayerType::Pitcher.headline_metric(),
        rows.iter()
            .filter(|r| r.position == role.code())
            .filter_map(|r| match r.throws {
                Some(hand @ (Handedness::Left | Handedness::Right)) => {
                    Some((hand.code().to_string(), r.team_id == team_id, r.fip_minus))
                }
                _ => None,
            }),
    )
}

/// Hitters split by position.
pub fn hitter_breakdown(rows: &[BatterSeason], team_id: &str) -> TeamVsLeague {
    compare(
        PlayerType::Batter.headline_metric(),
        rows.iter()
            .filter(|r| HITTER_POSITIONS.contains(&r.position.as_str()))
            .map(|r| (r.position.clone(), r.team_id == team_id, r.ops_plus)),
    )
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// Team average on a headline metric and its distance from the baseline,
/// signed so that positive is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tile {
    pub value: Option<f64>,
    pub diff: Option<f64>,
}

impl Tile {
    pub fn new(side: PlayerType, value: Option<f64>, baseline: f64) -> Self {
        let diff = value.map(|v| match side {
            PlayerType::Batter => v - baseline,
            PlayerType::Pitcher => baseline - v,
        });
        Self { value, diff }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverviewTiles {
    pub starters: Tile,
    pub relievers: Tile,
    pub hitters: Tile,
}

/// Team tiles: average FIP- for starters and relievers, average OPS+ for
/// hitters. `batters` and `pitchers` should already be the team's rows.
pub fn overview_tiles(batters: &[BatterSeason], pitchers: &[PitcherSeason], baseline: f64) -> OverviewTiles {
    let role_avg = |role: PitcherRole| {
        let mut m = Mean::default();
        for p in pitchers.iter().filter(|p| p.position == role.code()) {
            m.push(p.fip_minus);
        }
        m.value()
    };
    let mut hitters = Mean::default();
    for b in batters
        .iter()
        .filter(|b| HITTER_POSITIONS.contains(&b.position.as_str()))
    {
        hitters.push(b.ops_plus);
    }

    OverviewTiles {
        starters: Tile::new(PlayerType::Pitcher, role_avg(PitcherRole::Starter), baseline),
        relievers: Tile::new(PlayerType::Pitcher, role_avg(PitcherRole::Reliever), baseline),
        hitters: Tile::new(PlayerType::Batter, hitters.value(), baseline),
    }
}

/// The team's standings row, or an all-empty record if the store has none.
pub fn record_or_empty(team_id: &str, record: Option<TeamRecord>) -> TeamRecord {
    record.unwrap_or_else(|| TeamRecord {
        team_id: team_id.to_string(),
        ..Default::default()
    })
}
