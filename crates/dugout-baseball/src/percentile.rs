// League percentile ranking.
//
// Only records meeting the minimum-opportunity threshold form the league
// distribution. Everyone else is carried through with no percentile at all,
// which is distinct from a percentile of 0.

use std::collections::BTreeMap;

use dugout_core::config::QualificationConfig;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::error::StatsError;
use crate::metrics::{BatterMetric, Direction, Metric, PitcherMetric, PlayerType};
use crate::rates::{BatterLine, PitcherLine};

// ---------------------------------------------------------------------------
// Core ranking
// ---------------------------------------------------------------------------

/// Percentile rank (0-100) of every qualified record with a finite metric
/// value, index-aligned with `population`.
///
/// Ties share the average of the 1-based ranks they span; the fractional
/// rank is that average divided by the number of ranked records. For
/// lower-is-better metrics the percentile is `100 - fraction * 100`.
/// Records that are unqualified or have no value get `None`.
pub fn percentile_ranks<T>(
    population: &[T],
    qualifies: impl Fn(&T) -> bool,
    value: impl Fn(&T) -> Option<f64>,
    direction: Direction,
) -> Vec<Option<f64>> {
    let mut league: Vec<(usize, f64)> = population
        .iter()
        .enumerate()
        .filter(|(_, record)| qualifies(record))
        .filter_map(|(idx, record)| value(record).filter(|v| v.is_finite()).map(|v| (idx, v)))
        .collect();

    let mut out = vec![None; population.len()];
    if league.is_empty() {
        return out;
    }

    // Stable sort keeps equal values in population order; ties are resolved
    // by averaging below, so order never leaks into the result.
    league.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = league.len() as f64;
    let mut start = 0;
    while start < league.len() {
        let mut end = start + 1;
        while end < league.len() && league[end].1 == league[start].1 {
            end += 1;
        }
        // 1-based ranks start+1..=end; their mean:
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let fraction = avg_rank / n;
        let pct = match direction {
            Direction::HigherBetter => fraction * 100.0,
            Direction::LowerBetter => 100.0 - fraction * 100.0,
        };
        for &(idx, _) in &league[start..end] {
            out[idx] = Some(pct);
        }
        start = end;
    }

    out
}

// ---------------------------------------------------------------------------
// Percentile records
// ---------------------------------------------------------------------------

/// Percentile per metric. A metric missing from the map is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles<M: Metric> {
    ranks: BTreeMap<M, f64>,
}

impl<M: Metric> Default for Percentiles<M> {
    fn default() -> Self {
        Self {
            ranks: BTreeMap::new(),
        }
    }
}

impl<M: Metric> Percentiles<M> {
    pub fn get(&self, metric: M) -> Option<f64> {
        self.ranks.get(&metric).copied()
    }

    pub fn set(&mut self, metric: M, pct: Option<f64>) {
        match pct {
            Some(p) => {
                self.ranks.insert(metric, p);
            }
            None => {
                self.ranks.remove(&metric);
            }
        }
    }

    /// All metrics in fixed radar order, undefined ones included.
    pub fn iter(&self) -> impl Iterator<Item = (M, Option<f64>)> + '_ {
        M::ALL.iter().map(move |m| (*m, self.get(*m)))
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl<M: Metric> Serialize for Percentiles<M> {
    /// Serializes every metric in radar order; undefined ones as `null`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(M::ALL.len()))?;
        for (metric, pct) in self.iter() {
            map.serialize_entry(metric.label(), &pct)?;
        }
        map.end()
    }
}

/// A derived-rate record with its league percentiles.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(bound = "M::Line: serde::Serialize")]
pub struct Ranked<M: Metric> {
    #[serde(flatten)]
    pub line: M::Line,
    /// Whether the record met the threshold and joined the league pool.
    pub qualified: bool,
    pub percentiles: Percentiles<M>,
}

pub type RankedBatter = Ranked<BatterMetric>;
pub type RankedPitcher = Ranked<PitcherMetric>;

/// Rank every metric in `M::ALL` over the qualified subset of `lines`. With
/// an empty league every record comes back with no percentiles.
fn rank_all<M: Metric>(
    lines: Vec<M::Line>,
    qualifies: impl Fn(&M::Line) -> bool,
    side: PlayerType,
) -> Vec<Ranked<M>> {
    let qualified: Vec<bool> = lines.iter().map(&qualifies).collect();
    let league_size = qualified.iter().filter(|q| **q).count();
    if league_size == 0 && !lines.is_empty() {
        warn!("no qualified {side}s; percentiles left undefined");
    }
    debug!(
        "ranking {} {}s against a league of {}",
        lines.len(),
        side,
        league_size
    );

    let columns: Vec<(M, Vec<Option<f64>>)> = M::ALL
        .iter()
        .map(|m| {
            let ranks = percentile_ranks(&lines, &qualifies, |l| m.value(l), m.direction());
            (*m, ranks)
        })
        .collect();

    lines
        .into_iter()
        .zip(qualified)
        .enumerate()
        .map(|(idx, (line, qualified))| {
            let mut percentiles = Percentiles::default();
            for (metric, ranks) in &columns {
                percentiles.set(*metric, ranks[idx]);
            }
            Ranked {
                line,
                qualified,
                percentiles,
            }
        })
        .collect()
}

/// Fails with `NoQualifiedPlayers` when no record in `ranked` joined the
/// league. Views built on percentiles call this; plain rate listings don't.
pub fn require_league<M: Metric>(ranked: &[Ranked<M>], side: PlayerType) -> Result<(), StatsError> {
    if ranked.iter().any(|r| r.qualified) {
        Ok(())
    } else {
        Err(StatsError::NoQualifiedPlayers { side })
    }
}

// ---------------------------------------------------------------------------
// League ranker
// ---------------------------------------------------------------------------

/// Ranks batters and pitchers against the qualified league.
///
/// Thresholds are inclusive: exactly `min_pa` plate appearances (or `min_ip`
/// innings) qualifies.
#[derive(Debug, Clone, Copy)]
pub struct LeagueRanker {
    pub min_pa: f64,
    pub min_ip: f64,
}

impl Default for LeagueRanker {
    fn default() -> Self {
        Self::from_config(&QualificationConfig::default())
    }
}

impl LeagueRanker {
    pub fn from_config(q: &QualificationConfig) -> Self {
        Self {
            min_pa: f64::from(q.min_pa),
            min_ip: q.min_ip,
        }
    }

    pub fn batter_qualifies(&self, line: &BatterLine) -> bool {
        line.rates.pa.is_some_and(|pa| pa >= self.min_pa)
    }

    pub fn pitcher_qualifies(&self, line: &PitcherLine) -> bool {
        line.rates.ip.is_some_and(|ip| ip >= self.min_ip)
    }

    pub fn rank_batters(&self, lines: Vec<BatterLine>) -> Vec<RankedBatter> {
        rank_all(lines, |l| self.batter_qualifies(l), PlayerType::Batter)
    }

    pub fn rank_pitchers(&self, lines: Vec<PitcherLine>) -> Vec<RankedPitcher> {
        rank_all(lines, |l| self.pitcher_qualifies(l), PlayerType::Pitcher)
    }
}
