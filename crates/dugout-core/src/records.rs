// Raw per-player season rows as they come out of the backing store.
//
// Every numeric column is optional: a NULL or malformed cell stays `None`
// rather than being read as 0, since 0 is a legitimate stat value.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Handedness
// ---------------------------------------------------------------------------

/// Throwing or batting hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    /// Switch hitter. Lahman-style data uses `B` ("both").
    #[serde(rename = "B")]
    Switch,
}

impl Handedness {
    /// Parse a one-letter hand code. Returns `None` for anything else.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "L" => Some(Handedness::Left),
            "R" => Some(Handedness::Right),
            "B" | "S" => Some(Handedness::Switch),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
            Handedness::Switch => "B",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Season rows
// ---------------------------------------------------------------------------

/// One batter row: (player, team, season) with raw counting stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatterSeason {
    pub player_id: String,
    pub team_id: String,
    pub season: Option<i32>,
    /// Primary defensive position code (C, 1B, 2B, 3B, SS, OF, DH).
    pub position: String,
    pub bats: Option<Handedness>,
    pub salary: Option<f64>,
    pub h: Option<f64>,
    pub doubles: Option<f64>,
    pub triples: Option<f64>,
    pub hr: Option<f64>,
    pub ab: Option<f64>,
    pub bb: Option<f64>,
    pub hbp: Option<f64>,
    pub sf: Option<f64>,
    pub sh: Option<f64>,
    pub so: Option<f64>,
    /// Park- and league-adjusted OPS, 100 = league average.
    pub ops_plus: Option<f64>,
}

/// One pitcher row: (player, team, season) with raw counting stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PitcherSeason {
    pub player_id: String,
    pub team_id: String,
    pub season: Option<i32>,
    /// SP or RP.
    pub position: String,
    pub throws: Option<Handedness>,
    pub salary: Option<f64>,
    /// Outs recorded; innings pitched = outs / 3.
    pub ip_outs: Option<f64>,
    pub bb: Option<f64>,
    pub h: Option<f64>,
    pub so: Option<f64>,
    pub era: Option<f64>,
    pub fip: Option<f64>,
    /// Park- and league-adjusted FIP, 100 = league average, lower is better.
    pub fip_minus: Option<f64>,
}

impl PitcherSeason {
    /// Role key used by the dashboard filters, e.g. `"SP R"`.
    pub fn role_key(&self) -> Option<String> {
        self.throws.map(|t| format!("{} {}", self.position, t.code()))
    }
}

/// Standings row for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRecord {
    pub team_id: String,
    pub name: Option<String>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub rank: Option<u32>,
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Coerce a text cell to a number. Thousands separators, `$` and surrounding
/// whitespace are tolerated; anything else that fails to parse (or parses to
/// NaN/infinity) is undefined.
pub fn parse_stat(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handedness_codes() {
        assert_eq!(Handedness::from_code("L"), Some(Handedness::Left));
        assert_eq!(Handedness::from_code(" r "), Some(Handedness::Right));
        assert_eq!(Handedness::from_code("B"), Some(Handedness::Switch));
        assert_eq!(Handedness::from_code("S"), Some(Handedness::Switch));
        assert_eq!(Handedness::from_code("X"), None);
        assert_eq!(Handedness::from_code(""), None);
        assert_eq!(Handedness::Left.to_string(), "L");
    }

    #[test]
    fn role_key_requires_throwing_hand() {
        let mut p = PitcherSeason {
            position: "SP".into(),
            throws: Some(Handedness::Right),
            ..Default::default()
        };
        assert_eq!(p.role_key().as_deref(), Some("SP R"));
        p.throws = None;
        assert_eq!(p.role_key(), None);
    }

    #[test]
    fn parse_stat_accepts_numbers() {
        assert_eq!(parse_stat("112"), Some(112.0));
        assert_eq!(parse_stat(" 3.25 "), Some(3.25));
        assert_eq!(parse_stat("$4,500,000"), Some(4_500_000.0));
        assert_eq!(parse_stat("0"), Some(0.0));
    }

    #[test]
    fn parse_stat_rejects_garbage_without_zeroing() {
        assert_eq!(parse_stat(""), None);
        assert_eq!(parse_stat("N/A"), None);
        assert_eq!(parse_stat("--"), None);
        assert_eq!(parse_stat("NaN"), None);
        assert_eq!(parse_stat("inf"), None);
    }
}
