// Statistics engine: derived rates, league percentiles, group profiles,
// salary/performance quadrants and team-vs-league overviews.

pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod overview;
pub mod percentile;
pub mod profile;
pub mod quadrant;
pub mod rates;
