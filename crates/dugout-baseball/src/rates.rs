// Rate statistics derived from raw counting stats.
//
// Denominators that are zero, negative or undefined are floored to 1 so that
// sorting and display never fail. The resulting rate is not meaningful for a
// zero-opportunity player; only the ranker's qualification filter makes a
// rate trustworthy.

use dugout_core::records::{BatterSeason, PitcherSeason};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Denominator floor: a positive value passes through, anything else is 1.
pub fn floor_denominator(denominator: Option<f64>) -> f64 {
    match denominator {
        Some(d) if d > 0.0 => d,
        _ => 1.0,
    }
}

/// Sum of all parts, or `None` if any part is undefined.
fn sum(parts: &[Option<f64>]) -> Option<f64> {
    parts.iter().copied().sum()
}

fn rate(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    numerator.map(|n| n / floor_denominator(denominator))
}

// ---------------------------------------------------------------------------
// Batters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatterRates {
    pub singles: Option<f64>,
    pub pa: Option<f64>,
    pub avg: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
    pub bb_rate: Option<f64>,
    pub k_rate: Option<f64>,
}

/// A batter season row together with its derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterLine {
    #[serde(flatten)]
    pub season: BatterSeason,
    #[serde(flatten)]
    pub rates: BatterRates,
}

impl BatterLine {
    pub fn new(season: BatterSeason) -> Self {
        let rates = batter_rates(&season);
        Self { season, rates }
    }
}

/// AVG, OBP, SLG, walk rate and strikeout rate for one batter row.
pub fn batter_rates(s: &BatterSeason) -> BatterRates {
    let singles = match (s.h, s.doubles, s.triples, s.hr) {
        (Some(h), Some(d), Some(t), Some(hr)) => Some(h - d - t - hr),
        _ => None,
    };
    let pa = sum(&[s.ab, s.bb, s.hbp, s.sf, s.sh]);

    let total_bases = match (singles, s.doubles, s.triples, s.hr) {
        (Some(b1), Some(d), Some(t), Some(hr)) => Some(b1 + 2.0 * d + 3.0 * t + 4.0 * hr),
        _ => None,
    };

    BatterRates {
        singles,
        pa,
        avg: rate(s.h, s.ab),
        obp: rate(sum(&[s.h, s.bb, s.hbp]), pa),
        slg: rate(total_bases, s.ab),
        bb_rate: rate(s.bb, pa),
        k_rate: rate(s.so, pa),
    }
}

pub fn derive_batters(rows: Vec<BatterSeason>) -> Vec<BatterLine> {
    rows.into_iter().map(BatterLine::new).collect()
}

// ---------------------------------------------------------------------------
// Pitchers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PitcherRates {
    pub ip: Option<f64>,
    pub k9: Option<f64>,
    pub bb9: Option<f64>,
    pub h9: Option<f64>,
    pub whip: Option<f64>,
}

/// A pitcher season row together with its derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherLine {
    #[serde(flatten)]
    pub season: PitcherSeason,
    #[serde(flatten)]
    pub rates: PitcherRates,
}

impl PitcherLine {
    pub fn new(season: PitcherSeason) -> Self {
        let rates = pitcher_rates(&season);
        Self { season, rates }
    }
}

/// Innings pitched, K/9, BB/9, H/9 and WHIP for one pitcher row.
pub fn pitcher_rates(s: &PitcherSeason) -> PitcherRates {
    let ip = s.ip_outs.map(|outs| outs / 3.0);
    let per_nine = |n: Option<f64>| rate(n.map(|v| v * 9.0), ip);

    PitcherRates {
        ip,
        k9: per_nine(s.so),
        bb9: per_nine(s.bb),
        h9: per_nine(s.h),
        whip: rate(sum(&[s.bb, s.h]), ip),
    }
}

pub fn derive_pitchers(rows: Vec<PitcherSeason>) -> Vec<PitcherLine> {
    rows.into_iter().map(PitcherLine::new).collect()
}
