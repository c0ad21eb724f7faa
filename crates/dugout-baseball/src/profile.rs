// Group profiles: mean percentile per radar metric over a subset of the
// team's players.

use std::fmt;
use std::str::FromStr;

use dugout_core::records::Handedness;
use serde::Serialize;
use tracing::debug;

use crate::error::StatsError;
use crate::metrics::{BatterMetric, Metric, PitcherMetric};
use crate::percentile::{Ranked, RankedBatter, RankedPitcher};

/// Positions that make up the team's hitter pool.
pub const HITTER_POSITIONS: [&str; 7] = ["C", "1B", "2B", "3B", "SS", "OF", "DH"];

// ---------------------------------------------------------------------------
// Group codes
// ---------------------------------------------------------------------------

/// A batter position group, or every hitter at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatterGroup {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    Outfield,
    DesignatedHitter,
    AllHitters,
}

impl BatterGroup {
    pub fn code(&self) -> &'static str {
        match self {
            BatterGroup::Catcher => "C",
            BatterGroup::FirstBase => "1B",
            BatterGroup::SecondBase => "2B",
            BatterGroup::ThirdBase => "3B",
            BatterGroup::Shortstop => "SS",
            BatterGroup::Outfield => "OF",
            BatterGroup::DesignatedHitter => "DH",
            BatterGroup::AllHitters => "H",
        }
    }

    /// Position codes covered by this group.
    pub fn positions(&self) -> &'static [&'static str] {
        match self {
            BatterGroup::Catcher => &HITTER_POSITIONS[0..1],
            BatterGroup::FirstBase => &HITTER_POSITIONS[1..2],
            BatterGroup::SecondBase => &HITTER_POSITIONS[2..3],
            BatterGroup::ThirdBase => &HITTER_POSITIONS[3..4],
            BatterGroup::Shortstop => &HITTER_POSITIONS[4..5],
            BatterGroup::Outfield => &HITTER_POSITIONS[5..6],
            BatterGroup::DesignatedHitter => &HITTER_POSITIONS[6..7],
            BatterGroup::AllHitters => &HITTER_POSITIONS,
        }
    }

    pub fn contains(&self, position: &str) -> bool {
        self.positions().contains(&position)
    }
}

impl FromStr for BatterGroup {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" => Ok(BatterGroup::Catcher),
            "1B" => Ok(BatterGroup::FirstBase),
            "2B" => Ok(BatterGroup::SecondBase),
            "3B" => Ok(BatterGroup::ThirdBase),
            "SS" => Ok(BatterGroup::Shortstop),
            "OF" => Ok(BatterGroup::Outfield),
            "DH" => Ok(BatterGroup::DesignatedHitter),
            "H" => Ok(BatterGroup::AllHitters),
            _ => Err(StatsError::UnrecognizedGroup {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BatterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Starter or reliever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitcherRole {
    #[serde(rename = "SP")]
    Starter,
    #[serde(rename = "RP")]
    Reliever,
}

impl PitcherRole {
    pub fn code(&self) -> &'static str {
        match self {
            PitcherRole::Starter => "SP",
            PitcherRole::Reliever => "RP",
        }
    }
}

impl FromStr for PitcherRole {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SP" => Ok(PitcherRole::Starter),
            "RP" => Ok(PitcherRole::Reliever),
            _ => Err(StatsError::UnrecognizedGroup {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PitcherRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pitcher role, optionally narrowed to one throwing hand
/// (`SP`, `RP`, `SP_L`, `SP_R`, `RP_L`, `RP_R`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitcherGroup {
    pub role: PitcherRole,
    pub throws: Option<Handedness>,
}

impl PitcherGroup {
    pub fn code(&self) -> String {
        match self.throws {
            Some(hand) => format!("{}_{}", self.role.code(), hand.code()),
            None => self.role.code().to_string(),
        }
    }

    pub fn contains(&self, position: &str, throws: Option<Handedness>) -> bool {
        position == self.role.code() && self.throws.map_or(true, |t| throws == Some(t))
    }
}

impl FromStr for PitcherGroup {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognized = || StatsError::UnrecognizedGroup {
            code: s.to_string(),
        };
        let upper = s.trim().to_uppercase();
        let (role, hand) = match upper.split_once('_') {
            Some((role, hand)) => (role, Some(hand)),
            None => (upper.as_str(), None),
        };
        let role: PitcherRole = role.parse().map_err(|_| unrecognized())?;
        let throws = match hand {
            None => None,
            Some("L") => Some(Handedness::Left),
            Some("R") => Some(Handedness::Right),
            Some(_) => return Err(unrecognized()),
        };
        Ok(PitcherGroup { role, throws })
    }
}

impl fmt::Display for PitcherGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// One radar spoke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue<M: Metric> {
    pub metric: M,
    pub value: Option<f64>,
}

/// Mean percentile per metric over a group, in radar order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupProfile<M: Metric> {
    pub group: String,
    pub members: usize,
    pub values: Vec<MetricValue<M>>,
}

impl<M: Metric> GroupProfile<M> {
    pub fn get(&self, metric: M) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.metric == metric)
            .and_then(|v| v.value)
    }
}

/// Average each metric's percentile across `members`, skipping undefined
/// values. An empty member set is `NoData`.
pub fn build_profile<'a, M: Metric>(
    group: &str,
    members: impl IntoIterator<Item = &'a Ranked<M>>,
) -> Result<GroupProfile<M>, StatsError>
where
    M::Line: 'a,
{
    let members: Vec<&Ranked<M>> = members.into_iter().collect();
    if members.is_empty() {
        return Err(StatsError::NoData {
            group: group.to_string(),
        });
    }

    let values = M::ALL
        .iter()
        .map(|metric| {
            let defined: Vec<f64> = members
                .iter()
                .filter_map(|r| r.percentiles.get(*metric))
                .collect();
            let value = if defined.is_empty() {
                None
            } else {
                Some(defined.iter().sum::<f64>() / defined.len() as f64)
            };
            MetricValue {
                metric: *metric,
                value,
            }
        })
        .collect();

    debug!("profile {} over {} players", group, members.len());
    Ok(GroupProfile {
        group: group.to_string(),
        members: members.len(),
        values,
    })
}

/// Profile of the team's batters in `group`, from league-ranked rows.
pub fn batter_profile(
    ranked: &[RankedBatter],
    team_id: &str,
    group: BatterGroup,
) -> Result<GroupProfile<BatterMetric>, StatsError> {
    build_profile(
        group.code(),
        ranked.iter().filter(|r| {
            r.line.season.team_id == team_id && group.contains(&r.line.season.position)
        }),
    )
}

/// Profile of the team's pitchers in `group`, from league-ranked rows.
pub fn pitcher_profile(
    ranked: &[RankedPitcher],
    team_id: &str,
    group: PitcherGroup,
) -> Result<GroupProfile<PitcherMetric>, StatsError> {
    build_profile(
        &group.code(),
        ranked.iter().filter(|r| {
            let s = &r.line.season;
            s.team_id == team_id && group.contains(&s.position, s.throws)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::percentile::Percentiles;
    use crate::rates::{BatterLine, PitcherLine};
    use dugout_core::records::{BatterSeason, PitcherSeason};

    fn ranked_batter(team: &str, pos: &str, pcts: &[(BatterMetric, Option<f64>)]) -> RankedBatter {
        let mut percentiles = Percentiles::default();
        for (m, p) in pcts {
            percentiles.set(*m, *p);
        }
        Ranked {
            line: BatterLine::new(BatterSeason {
                team_id: team.into(),
                position: pos.into(),
                ..Default::default()
            }),
            qualified: true,
            percentiles,
        }
    }

    fn ranked_pitcher(pos: &str, throws: Option<Handedness>, era_pct: f64) -> RankedPitcher {
        let mut percentiles = Percentiles::default();
        percentiles.set(PitcherMetric::Era, Some(era_pct));
        Ranked {
            line: PitcherLine::new(PitcherSeason {
                team_id: "LAA".into(),
                position: pos.into(),
                throws,
                ..Default::default()
            }),
            qualified: true,
            percentiles,
        }
    }

    #[test]
    fn group_codes_parse() {
        assert_eq!("ss".parse::<BatterGroup>().unwrap(), BatterGroup::Shortstop);
        assert_eq!("H".parse::<BatterGroup>().unwrap(), BatterGroup::AllHitters);
        assert!(BatterGroup::AllHitters.contains("DH"));
        assert!(!BatterGroup::Outfield.contains("DH"));

        let g: PitcherGroup = "SP_L".parse().unwrap();
        assert_eq!(g.role, PitcherRole::Starter);
        assert_eq!(g.throws, Some(Handedness::Left));
        assert_eq!(g.code(), "SP_L");
        let g: PitcherGroup = "rp".parse().unwrap();
        assert_eq!(g.throws, None);
        assert_eq!(g.to_string(), "RP");
    }

    #[test]
    fn unknown_group_codes_are_rejected() {
        for code in ["XX", "LF", ""] {
            assert!(matches!(
                code.parse::<BatterGroup>(),
                Err(StatsError::UnrecognizedGroup { .. })
            ));
        }
        for code in ["CL", "SP_B", "SP_", "RP_X_Y", "H"] {
            assert!(matches!(
                code.parse::<PitcherGroup>(),
                Err(StatsError::UnrecognizedGroup { .. })
            ));
        }
    }

    #[test]
    fn means_skip_undefined_values() {
        let ranked = vec![
            ranked_batter("LAA", "SS", &[(BatterMetric::Avg, Some(80.0)), (BatterMetric::Obp, None)]),
            ranked_batter("LAA", "SS", &[(BatterMetric::Avg, Some(40.0)), (BatterMetric::Obp, Some(30.0))]),
            ranked_batter("LAA", "C", &[(BatterMetric::Avg, Some(0.0))]),
            ranked_batter("SEA", "SS", &[(BatterMetric::Avg, Some(0.0))]),
        ];
        let p = batter_profile(&ranked, "LAA", BatterGroup::Shortstop).unwrap();
        assert_eq!(p.group, "SS");
        assert_eq!(p.members, 2);
        assert_eq!(p.get(BatterMetric::Avg), Some(60.0));
        assert_eq!(p.get(BatterMetric::Obp), Some(30.0));
        assert_eq!(p.get(BatterMetric::Slg), None);
        assert_eq!(p.values.len(), 6);

        let all = batter_profile(&ranked, "LAA", BatterGroup::AllHitters).unwrap();
        assert_eq!(all.members, 3);
        assert_eq!(all.get(BatterMetric::Avg), Some(40.0));
    }

    #[test]
    fn empty_group_is_no_data() {
        let ranked = vec![ranked_batter("LAA", "SS", &[])];
        let err = batter_profile(&ranked, "LAA", BatterGroup::Catcher).unwrap_err();
        assert!(matches!(err, StatsError::NoData { ref group } if group == "C"));
    }

    #[test]
    fn pitcher_groups_split_by_hand() {
        let ranked = vec![
            ranked_pitcher("SP", Some(Handedness::Left), 90.0),
            ranked_pitcher("SP", Some(Handedness::Right), 50.0),
            ranked_pitcher("SP", None, 10.0),
            ranked_pitcher("RP", Some(Handedness::Left), 20.0),
        ];
        let sp = pitcher_profile(&ranked, "LAA", "SP".parse().unwrap()).unwrap();
        assert_eq!(sp.members, 3);
        assert_eq!(sp.get(PitcherMetric::Era), Some(50.0));

        let sp_l = pitcher_profile(&ranked, "LAA", "SP_L".parse().unwrap()).unwrap();
        assert_eq!(sp_l.members, 1);
        assert_eq!(sp_l.get(PitcherMetric::Era), Some(90.0));

        assert!(pitcher_profile(&ranked, "LAA", "RP_R".parse().unwrap())
            .unwrap_err()
            .is_no_data());
    }

    #[test]
    fn profile_serializes_metric_labels() {
        let ranked = vec![ranked_batter("LAA", "DH", &[(BatterMetric::KRate, Some(25.0))])];
        let p = batter_profile(&ranked, "LAA", BatterGroup::DesignatedHitter).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["values"][4]["metric"], "K_rate_PR");
        assert_eq!(json["values"][4]["value"], 25.0);
        assert!(json["values"][0]["value"].is_null());
    }
}
