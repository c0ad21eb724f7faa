// Salary/performance quadrants and the roster action each one implies.
//
// The salary split is the league-wide median for the player type; the
// performance split is the headline adjusted metric against the baseline
// (OPS+ >= baseline for batters, FIP- <= baseline for pitchers).

use std::fmt;
use std::str::FromStr;

use dugout_core::records::{BatterSeason, PitcherSeason};
use serde::Serialize;

use crate::error::StatsError;
use crate::metrics::{Direction, PlayerType};

// ---------------------------------------------------------------------------
// Quadrants and actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quadrant {
    /// High salary, good performance.
    #[serde(rename = "Star Players")]
    Star,
    /// High salary, below-baseline performance.
    #[serde(rename = "Overpaid")]
    Overpaid,
    /// Low salary, good performance.
    #[serde(rename = "Value Players")]
    Value,
    /// Low salary, below-baseline performance.
    #[serde(rename = "Developing")]
    Developing,
}

impl Quadrant {
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::Star => "Star Players",
            Quadrant::Overpaid => "Overpaid",
            Quadrant::Value => "Value Players",
            Quadrant::Developing => "Developing",
        }
    }

    pub fn classify(high_salary: bool, good: bool) -> Self {
        match (high_salary, good) {
            (true, true) => Quadrant::Star,
            (true, false) => Quadrant::Overpaid,
            (false, true) => Quadrant::Value,
            (false, false) => Quadrant::Developing,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Quadrant::Star => Action::Retain,
            Quadrant::Overpaid => Action::Trade,
            Quadrant::Value => Action::Extend,
            Quadrant::Developing => Action::Option,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommended roster move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Retain,
    Trade,
    Extend,
    /// Send down to the minors.
    Option,
}

impl Action {
    pub fn quadrant(&self) -> Quadrant {
        match self {
            Action::Retain => Quadrant::Star,
            Action::Trade => Quadrant::Overpaid,
            Action::Extend => Quadrant::Value,
            Action::Option => Quadrant::Developing,
        }
    }
}

impl FromStr for Action {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(Action::Retain),
            "trade" => Ok(Action::Trade),
            "extend" => Ok(Action::Extend),
            "option" => Ok(Action::Option),
            _ => Err(StatsError::UnrecognizedAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Retain => "retain",
            Action::Trade => "trade",
            Action::Extend => "extend",
            Action::Option => "option",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

/// Whether `value` of the side's headline metric is at or better than the
/// baseline.
pub fn is_good_performance(side: PlayerType, value: f64, baseline: f64) -> bool {
    match side.headline_direction() {
        Direction::HigherBetter => value >= baseline,
        Direction::LowerBetter => value <= baseline,
    }
}

/// Median of the finite values; an even count averages the middle two.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Contribution
// ---------------------------------------------------------------------------

/// One scatter point: what a player costs against what they produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionPoint {
    pub player_id: String,
    pub team_id: String,
    pub position: String,
    pub salary: Option<f64>,
    /// Headline adjusted metric (OPS+ or FIP-).
    pub metric: Option<f64>,
    /// `None` when salary or metric is missing.
    pub quadrant: Option<Quadrant>,
}

impl ContributionPoint {
    pub fn from_batter(row: &BatterSeason) -> Self {
        Self {
            player_id: row.player_id.clone(),
            team_id: row.team_id.clone(),
            position: row.position.clone(),
            salary: row.salary,
            metric: row.ops_plus,
            quadrant: None,
        }
    }

    pub fn from_pitcher(row: &PitcherSeason) -> Self {
        let position = match row.role_key() {
            Some(key) => key,
            None => row.position.clone(),
        };
        Self {
            player_id: row.player_id.clone(),
            team_id: row.team_id.clone(),
            position,
            salary: row.salary,
            metric: row.fip_minus,
            quadrant: None,
        }
    }
}

/// Classified scatter for one player type, with the splits that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionReport {
    pub player_type: PlayerType,
    /// Name of the headline metric, `ops+` or `fip-`.
    pub metric_name: &'static str,
    pub salary_median: f64,
    pub baseline: f64,
    pub points: Vec<ContributionPoint>,
}

impl ContributionReport {
    /// Classify every point against the given splits.
    pub fn classify(
        player_type: PlayerType,
        salary_median: f64,
        baseline: f64,
        mut points: Vec<ContributionPoint>,
    ) -> Self {
        for p in &mut points {
            p.quadrant = match (p.salary, p.metric) {
                (Some(salary), Some(metric)) => Some(Quadrant::classify(
                    salary >= salary_median,
                    is_good_performance(player_type, metric, baseline),
                )),
                _ => None,
            };
        }
        Self {
            player_type,
            metric_name: player_type.headline_metric(),
            salary_median,
            baseline,
            points,
        }
    }

    /// Players whose quadrant maps to `action`. Unclassified players never
    /// appear.
    pub fn select_action(&self, action: Action) -> Vec<&ContributionPoint> {
        let target = action.quadrant();
        self.points
            .iter()
            .filter(|p| p.quadrant == Some(target))
            .collect()
    }

    pub fn unclassified(&self) -> usize {
        self.points.iter().filter(|p| p.quadrant.is_none()).count()
    }
}
