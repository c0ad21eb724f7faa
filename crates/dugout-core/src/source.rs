// Abstract read interface over the season-stat store.

use anyhow::Result;

use crate::records::{BatterSeason, PitcherSeason, TeamRecord};

/// Simple filter predicates understood by every [`StatSource`].
///
/// Empty lists mean "no restriction". All predicates are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub team_id: Option<String>,
    /// Match any of these position codes (`POS IN (...)`).
    pub positions: Vec<String>,
    /// Match any of these pitcher role keys (`"SP R"`, `"RP L"`, ...).
    pub roles: Vec<String>,
}

impl RowFilter {
    /// A filter that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn team(team_id: impl Into<String>) -> Self {
        Self {
            team_id: Some(team_id.into()),
            ..Self::default()
        }
    }

    pub fn with_positions<I, S>(mut self, positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positions = positions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// In-memory equivalent of the predicate, for sources that filter after
    /// loading.
    pub fn matches_batter(&self, row: &BatterSeason) -> bool {
        self.team_id.as_ref().map_or(true, |t| *t == row.team_id)
            && (self.positions.is_empty() || self.positions.contains(&row.position))
    }

    pub fn matches_pitcher(&self, row: &PitcherSeason) -> bool {
        self.team_id.as_ref().map_or(true, |t| *t == row.team_id)
            && (self.positions.is_empty() || self.positions.contains(&row.position))
            && (self.roles.is_empty()
                || row.role_key().is_some_and(|k| self.roles.contains(&k)))
    }
}

/// Read-only access to batter, pitcher and team rows.
///
/// Implementations must not keep state between calls: each fetch reflects the
/// store as it is at call time.
pub trait StatSource {
    fn fetch_batters(&self, filter: &RowFilter) -> Result<Vec<BatterSeason>>;

    fn fetch_pitchers(&self, filter: &RowFilter) -> Result<Vec<PitcherSeason>>;

    /// Standings row for `team_id`, or `None` if the team is unknown.
    fn fetch_team(&self, team_id: &str) -> Result<Option<TeamRecord>>;
}

/// In-memory source backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub batters: Vec<BatterSeason>,
    pub pitchers: Vec<PitcherSeason>,
    pub teams: Vec<TeamRecord>,
}

impl StatSource for MemorySource {
    fn fetch_batters(&self, filter: &RowFilter) -> Result<Vec<BatterSeason>> {
        Ok(self
            .batters
            .iter()
            .filter(|b| filter.matches_batter(b))
            .cloned()
            .collect())
    }

    fn fetch_pitchers(&self, filter: &RowFilter) -> Result<Vec<PitcherSeason>> {
        Ok(self
            .pitchers
            .iter()
            .filter(|p| filter.matches_pitcher(p))
            .cloned()
            .collect())
    }

    fn fetch_team(&self, team_id: &str) -> Result<Option<TeamRecord>> {
        Ok(self.teams.iter().find(|t| t.team_id == team_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Handedness;

    fn pitcher(team: &str, pos: &str, throws: Option<Handedness>) -> PitcherSeason {
        PitcherSeason {
            player_id: format!("{team}-{pos}"),
            team_id: team.into(),
            position: pos.into(),
            throws,
            ..Default::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = RowFilter::all();
        assert!(f.matches_pitcher(&pitcher("LAA", "SP", None)));
        assert!(f.matches_batter(&BatterSeason::default()));
    }

    #[test]
    fn role_filter_needs_known_hand() {
        let f = RowFilter::team("LAA").with_roles(["SP R"]);
        assert!(f.matches_pitcher(&pitcher("LAA", "SP", Some(Handedness::Right))));
        assert!(!f.matches_pitcher(&pitcher("LAA", "SP", Some(Handedness::Left))));
        assert!(!f.matches_pitcher(&pitcher("LAA", "SP", None)));
        assert!(!f.matches_pitcher(&pitcher("SEA", "SP", Some(Handedness::Right))));
    }

    #[test]
    fn memory_source_applies_filter() {
        let src = MemorySource {
            pitchers: vec![
                pitcher("LAA", "SP", Some(Handedness::Left)),
                pitcher("LAA", "RP", Some(Handedness::Left)),
                pitcher("HOU", "SP", Some(Handedness::Left)),
            ],
            ..Default::default()
        };
        let rows = src
            .fetch_pitchers(&RowFilter::team("LAA").with_positions(["SP"]))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, "LAA-SP");
        assert!(src.fetch_team("LAA").unwrap().is_none());
    }
}
