// Closed metric sets and their direction of goodness.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;
use crate::rates::{BatterLine, PitcherLine};

/// Whether a larger metric value is a better performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

/// Batter or pitcher side of the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Batter,
    Pitcher,
}

impl PlayerType {
    /// Name of the park/league-adjusted headline metric for this side.
    pub fn headline_metric(&self) -> &'static str {
        match self {
            PlayerType::Batter => "ops+",
            PlayerType::Pitcher => "fip-",
        }
    }

    /// Direction of the headline metric: OPS+ is higher-better, FIP- is
    /// lower-better.
    pub fn headline_direction(&self) -> Direction {
        match self {
            PlayerType::Batter => Direction::HigherBetter,
            PlayerType::Pitcher => Direction::LowerBetter,
        }
    }
}

impl FromStr for PlayerType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batter" | "hitter" => Ok(PlayerType::Batter),
            "pitcher" => Ok(PlayerType::Pitcher),
            _ => Err(StatsError::UnrecognizedPlayerType(s.to_string())),
        }
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerType::Batter => f.write_str("batter"),
            PlayerType::Pitcher => f.write_str("pitcher"),
        }
    }
}

/// A percentile-ranked metric. `ALL` is the fixed radar order and is never
/// extended at runtime.
pub trait Metric: Copy + Ord + fmt::Debug + Serialize + 'static {
    /// The derived-rate record this metric is read from.
    type Line;

    const ALL: &'static [Self];

    /// Percentile column label, e.g. `AVG_PR`.
    fn label(&self) -> &'static str;

    fn direction(&self) -> Direction;

    /// Raw metric value for a record; `None` if undefined.
    fn value(&self, line: &Self::Line) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// Batter metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BatterMetric {
    #[serde(rename = "AVG_PR")]
    Avg,
    #[serde(rename = "OBP_PR")]
    Obp,
    #[serde(rename = "SLG_PR")]
    Slg,
    #[serde(rename = "BB_rate_PR")]
    BbRate,
    #[serde(rename = "K_rate_PR")]
    KRate,
    #[serde(rename = "OPS_plus_PR")]
    OpsPlus,
}

/// Batter radar profile, in rendering order.
pub const BATTER_RADAR_METRICS: [BatterMetric; 6] = [
    BatterMetric::Avg,
    BatterMetric::Obp,
    BatterMetric::Slg,
    BatterMetric::BbRate,
    BatterMetric::KRate,
    BatterMetric::OpsPlus,
];

impl Metric for BatterMetric {
    type Line = BatterLine;

    const ALL: &'static [Self] = &BATTER_RADAR_METRICS;

    fn label(&self) -> &'static str {
        match self {
            BatterMetric::Avg => "AVG_PR",
            BatterMetric::Obp => "OBP_PR",
            BatterMetric::Slg => "SLG_PR",
            BatterMetric::BbRate => "BB_rate_PR",
            BatterMetric::KRate => "K_rate_PR",
            BatterMetric::OpsPlus => "OPS_plus_PR",
        }
    }

    fn direction(&self) -> Direction {
        match self {
            BatterMetric::KRate => Direction::LowerBetter,
            _ => Direction::HigherBetter,
        }
    }

    fn value(&self, line: &BatterLine) -> Option<f64> {
        match self {
            BatterMetric::Avg => line.rates.avg,
            BatterMetric::Obp => line.rates.obp,
            BatterMetric::Slg => line.rates.slg,
            BatterMetric::BbRate => line.rates.bb_rate,
            BatterMetric::KRate => line.rates.k_rate,
            BatterMetric::OpsPlus => line.season.ops_plus,
        }
    }
}

// ---------------------------------------------------------------------------
// Pitcher metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PitcherMetric {
    #[serde(rename = "ERA_PR")]
    Era,
    #[serde(rename = "fip_PR")]
    Fip,
    #[serde(rename = "WHIP_PR")]
    Whip,
    #[serde(rename = "K9_PR")]
    K9,
    #[serde(rename = "BB9_PR")]
    Bb9,
    #[serde(rename = "H9_PR")]
    H9,
}

/// Pitcher radar profile, in rendering order.
pub const PITCHER_RADAR_METRICS: [PitcherMetric; 6] = [
    PitcherMetric::Era,
    PitcherMetric::Fip,
    PitcherMetric::Whip,
    PitcherMetric::K9,
    PitcherMetric::Bb9,
    PitcherMetric::H9,
];

impl Metric for PitcherMetric {
    type Line = PitcherLine;

    const ALL: &'static [Self] = &PITCHER_RADAR_METRICS;

    fn label(&self) -> &'static str {
        match self {
            PitcherMetric::Era => "ERA_PR",
            PitcherMetric::Fip => "fip_PR",
            PitcherMetric::Whip => "WHIP_PR",
            PitcherMetric::K9 => "K9_PR",
            PitcherMetric::Bb9 => "BB9_PR",
            PitcherMetric::H9 => "H9_PR",
        }
    }

    fn direction(&self) -> Direction {
        match self {
            PitcherMetric::K9 => Direction::HigherBetter,
            _ => Direction::LowerBetter,
        }
    }

    fn value(&self, line: &PitcherLine) -> Option<f64> {
        match self {
            PitcherMetric::Era => line.season.era,
            PitcherMetric::Fip => line.season.fip,
            PitcherMetric::Whip => line.rates.whip,
            PitcherMetric::K9 => line.rates.k9,
            PitcherMetric::Bb9 => line.rates.bb9,
            PitcherMetric::H9 => line.rates.h9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radar_orders_are_fixed() {
        let batter: Vec<&str> = BatterMetric::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            batter,
            vec!["AVG_PR", "OBP_PR", "SLG_PR", "BB_rate_PR", "K_rate_PR", "OPS_plus_PR"]
        );
        let pitcher: Vec<&str> = PitcherMetric::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            pitcher,
            vec!["ERA_PR", "fip_PR", "WHIP_PR", "K9_PR", "BB9_PR", "H9_PR"]
        );
    }

    #[test]
    fn directions() {
        let lower: Vec<BatterMetric> = BatterMetric::ALL
            .iter()
            .copied()
            .filter(|m| m.direction() == Direction::LowerBetter)
            .collect();
        assert_eq!(lower, vec![BatterMetric::KRate]);

        let higher: Vec<PitcherMetric> = PitcherMetric::ALL
            .iter()
            .copied()
            .filter(|m| m.direction() == Direction::HigherBetter)
            .collect();
        assert_eq!(higher, vec![PitcherMetric::K9]);
    }

    #[test]
    fn player_type_parsing() {
        assert_eq!("batter".parse::<PlayerType>().unwrap(), PlayerType::Batter);
        assert_eq!(" Pitcher ".parse::<PlayerType>().unwrap(), PlayerType::Pitcher);
        assert!(matches!(
            "catcher".parse::<PlayerType>(),
            Err(StatsError::UnrecognizedPlayerType(_))
        ));
        assert_eq!(PlayerType::Batter.headline_metric(), "ops+");
        assert_eq!(PlayerType::Pitcher.headline_direction(), Direction::LowerBetter);
    }
}
