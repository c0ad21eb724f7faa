// Dashboard service: wires configuration to a stat source and answers each
// query from a fresh read of the store.

use dugout_core::config::Config;
use dugout_core::records::TeamRecord;
use dugout_core::source::{RowFilter, StatSource};
use tracing::{debug, info};

use crate::error::StatsError;
use crate::metrics::{BatterMetric, PitcherMetric, PlayerType};
use crate::overview::{self, OverviewTiles, TeamVsLeague};
use crate::percentile::{require_league, LeagueRanker, RankedBatter, RankedPitcher};
use crate::profile::{self, BatterGroup, GroupProfile, PitcherGroup, PitcherRole};
use crate::quadrant::{median, Action, ContributionPoint, ContributionReport};
use crate::rates::{derive_batters, derive_pitchers};

/// Statistics queries for one franchise.
///
/// Nothing is cached: every method re-reads the rows it needs, so results
/// always reflect the store at call time and no state is shared between
/// calls.
pub struct Dashboard<S: StatSource> {
    source: S,
    team_id: String,
    ranker: LeagueRanker,
    baseline: f64,
}

impl<S: StatSource> Dashboard<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            team_id: config.team.id.clone(),
            ranker: LeagueRanker::from_config(&config.qualification),
            baseline: config.performance.baseline,
        }
    }

    // ------------------------------------------------------------------
    // Percentiles
    // ------------------------------------------------------------------

    /// Every batter in the store, ranked against the qualified league. An
    /// empty league still yields every row and its derived rates.
    pub fn ranked_batters(&self) -> Result<Vec<RankedBatter>, StatsError> {
        let rows = self.source.fetch_batters(&RowFilter::all())?;
        Ok(self.ranker.rank_batters(derive_batters(rows)))
    }

    pub fn ranked_pitchers(&self) -> Result<Vec<RankedPitcher>, StatsError> {
        let rows = self.source.fetch_pitchers(&RowFilter::all())?;
        Ok(self.ranker.rank_pitchers(derive_pitchers(rows)))
    }

    /// The team's batters with league percentiles.
    pub fn team_batters(&self) -> Result<Vec<RankedBatter>, StatsError> {
        let mut ranked = self.ranked_batters()?;
        ranked.retain(|r| r.line.season.team_id == self.team_id);
        Ok(ranked)
    }

    pub fn team_pitchers(&self) -> Result<Vec<RankedPitcher>, StatsError> {
        let mut ranked = self.ranked_pitchers()?;
        ranked.retain(|r| r.line.season.team_id == self.team_id);
        Ok(ranked)
    }

    // ------------------------------------------------------------------
    // Group profiles
    // ------------------------------------------------------------------

    /// Radar profile for a batter group code (`C`, `1B`, ..., `DH`, `H`).
    pub fn batter_profile(&self, group: &str) -> Result<GroupProfile<BatterMetric>, StatsError> {
        let group: BatterGroup = group.parse()?;
        let ranked = self.ranked_batters()?;
        require_league(&ranked, PlayerType::Batter)?;
        profile::batter_profile(&ranked, &self.team_id, group)
    }

    /// Radar profile for a pitcher group code (`SP`, `RP`, `SP_L`, ...).
    pub fn pitcher_profile(&self, group: &str) -> Result<GroupProfile<PitcherMetric>, StatsError> {
        let group: PitcherGroup = group.parse()?;
        let ranked = self.ranked_pitchers()?;
        require_league(&ranked, PlayerType::Pitcher)?;
        profile::pitcher_profile(&ranked, &self.team_id, group)
    }

    // ------------------------------------------------------------------
    // Contribution and actions
    // ------------------------------------------------------------------

    /// League-wide median salary for the player type.
    pub fn salary_median(&self, player_type: PlayerType) -> Result<f64, StatsError> {
        let salaries: Vec<f64> = match player_type {
            PlayerType::Batter => self
                .source
                .fetch_batters(&RowFilter::all())?
                .into_iter()
                .filter_map(|b| b.salary)
                .collect(),
            PlayerType::Pitcher => self
                .source
                .fetch_pitchers(&RowFilter::all())?
                .into_iter()
                .filter_map(|p| p.salary)
                .collect(),
        };
        debug!("{} {} salaries for median", salaries.len(), player_type);
        median(salaries).ok_or_else(|| StatsError::NoData {
            group: format!("{player_type} salaries"),
        })
    }

    /// Salary vs headline metric for the team's players. `roles` are position
    /// codes for batters and role keys (`"SP R"`) for pitchers; an empty list
    /// means everyone.
    pub fn contribution(
        &self,
        player_type: PlayerType,
        roles: &[String],
    ) -> Result<ContributionReport, StatsError> {
        let salary_median = self.salary_median(player_type)?;
        let team = RowFilter::team(self.team_id.as_str());
        let points: Vec<ContributionPoint> = match player_type {
            PlayerType::Batter => self
                .source
                .fetch_batters(&team.with_positions(roles.iter().cloned()))?
                .iter()
                .map(ContributionPoint::from_batter)
                .collect(),
            PlayerType::Pitcher => self
                .source
                .fetch_pitchers(&team.with_roles(roles.iter().cloned()))?
                .iter()
                .map(ContributionPoint::from_pitcher)
                .collect(),
        };
        let report = ContributionReport::classify(player_type, salary_median, self.baseline, points);
        if report.unclassified() > 0 {
            debug!(
                "{} {}s left unclassified (missing salary or {})",
                report.unclassified(),
                player_type,
                report.metric_name
            );
        }
        Ok(report)
    }

    /// Team players whose quadrant calls for `action`.
    pub fn player_list(
        &self,
        player_type: &str,
        action: &str,
        roles: &[String],
    ) -> Result<Vec<ContributionPoint>, StatsError> {
        let player_type: PlayerType = player_type.parse()?;
        let action: Action = action.parse()?;
        let report = self.contribution(player_type, roles)?;
        let players: Vec<ContributionPoint> =
            report.select_action(action).into_iter().cloned().collect();
        info!(
            "{} {}s to {} ({})",
            players.len(),
            player_type,
            action,
            action.quadrant()
        );
        Ok(players)
    }

    // ------------------------------------------------------------------
    // Team vs league
    // ------------------------------------------------------------------

    /// League vs team headline metric per position (batters) or role key
    /// (pitchers).
    pub fn performance_comparison(
        &self,
        player_type: PlayerType,
        groups: &[String],
    ) -> Result<TeamVsLeague, StatsError> {
        Ok(match player_type {
            PlayerType::Batter => {
                let rows = self.source.fetch_batters(&RowFilter::all())?;
                overview::batter_comparison(&rows, &self.team_id, groups)
            }
            PlayerType::Pitcher => {
                let rows = self.source.fetch_pitchers(&RowFilter::all())?;
                overview::pitcher_comparison(&rows, &self.team_id, groups)
            }
        })
    }

    /// `SP`/`RP` split by throwing hand, or `H` split by position.
    pub fn overview_breakdown(&self, group: &str) -> Result<TeamVsLeague, StatsError> {
        if group.trim().eq_ignore_ascii_case("H") {
            let rows = self.source.fetch_batters(&RowFilter::all())?;
            return Ok(overview::hitter_breakdown(&rows, &self.team_id));
        }
        let role: PitcherRole = group.parse()?;
        let rows = self
            .source
            .fetch_pitchers(&RowFilter::all().with_positions([role.code()]))?;
        Ok(overview::role_breakdown(&rows, &self.team_id, role))
    }

    pub fn overview_tiles(&self) -> Result<OverviewTiles, StatsError> {
        let team = RowFilter::team(self.team_id.as_str());
        let batters = self.source.fetch_batters(&team)?;
        let pitchers = self.source.fetch_pitchers(&team)?;
        Ok(overview::overview_tiles(&batters, &pitchers, self.baseline))
    }

    pub fn team_record(&self) -> Result<TeamRecord, StatsError> {
        let record = self.source.fetch_team(&self.team_id)?;
        Ok(overview::record_or_empty(&self.team_id, record))
    }
}
