// Integration tests for the statistics engine.
//
// These run the whole pipeline (SQLite store -> rates -> percentiles ->
// profiles / quadrants / overview) through the public API, against an
// in-memory database seeded the way a fixture file would be.

use dugout_baseball::dashboard::Dashboard;
use dugout_baseball::error::StatsError;
use dugout_baseball::metrics::{BatterMetric, PitcherMetric, PlayerType};
use dugout_baseball::quadrant::Quadrant;
use dugout_core::config::{Config, PerformanceConfig, QualificationConfig, TeamConfig};
use dugout_core::db::Database;
use dugout_core::records::{BatterSeason, Handedness, PitcherSeason, TeamRecord};

// ===========================================================================
// Test helpers
// ===========================================================================

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn inline_config() -> Config {
    Config {
        team: TeamConfig {
            id: "LAA".into(),
            name: Some("Los Angeles Angels".into()),
            color: None,
        },
        qualification: QualificationConfig::default(),
        performance: PerformanceConfig::default(),
        db_path: ":memory:".into(),
    }
}

/// Batter whose counting stats scale with `pa` (all plate appearances are
/// at-bats); `quality` moves hits and strikeouts in opposite directions.
fn batter(id: &str, team: &str, pos: &str, pa: f64, quality: f64, salary: Option<f64>, ops_plus: Option<f64>) -> BatterSeason {
    BatterSeason {
        player_id: id.into(),
        team_id: team.into(),
        season: Some(2024),
        position: pos.into(),
        bats: Some(Handedness::Right),
        salary,
        h: Some((pa * quality).round()),
        doubles: Some(0.0),
        triples: Some(0.0),
        hr: Some(0.0),
        ab: Some(pa),
        bb: Some(0.0),
        hbp: Some(0.0),
        sf: Some(0.0),
        sh: Some(0.0),
        so: Some((pa * (0.5 - quality)).round()),
        ops_plus,
    }
}

fn pitcher(id: &str, team: &str, pos: &str, throws: Handedness, outs: f64, salary: f64, fip_minus: f64) -> PitcherSeason {
    PitcherSeason {
        player_id: id.into(),
        team_id: team.into(),
        season: Some(2024),
        position: pos.into(),
        throws: Some(throws),
        salary: Some(salary),
        ip_outs: Some(outs),
        bb: Some(outs / 10.0),
        h: Some(outs / 3.0),
        so: Some(outs / 3.0),
        era: Some(fip_minus / 25.0),
        fip: Some(fip_minus / 25.0),
        fip_minus: Some(fip_minus),
    }
}

fn seeded_dashboard() -> Dashboard<Database> {
    let db = Database::open(":memory:").expect("in-memory database");
    db.import_batters(&[
        batter("trout", "LAA", "OF", 500.0, 0.30, Some(35_000_000.0), Some(160.0)),
        batter("ward", "LAA", "OF", 450.0, 0.26, Some(2_000_000.0), Some(115.0)),
        batter("neto", "LAA", "SS", 550.0, 0.25, Some(800_000.0), Some(95.0)),
        batter("rendon", "LAA", "3B", 200.0, 0.22, Some(38_000_000.0), Some(80.0)),
        batter("callup", "LAA", "C", 10.0, 0.40, Some(740_000.0), Some(200.0)),
        batter("judge", "NYY", "OF", 600.0, 0.32, Some(40_000_000.0), Some(200.0)),
        batter("volpe", "NYY", "SS", 580.0, 0.21, Some(750_000.0), Some(85.0)),
        batter("raleigh", "SEA", "C", 500.0, 0.22, Some(5_000_000.0), None),
    ])
    .expect("import batters");
    db.import_pitchers(&[
        pitcher("detmers", "LAA", "SP", Handedness::Left, 400.0, 2_000_000.0, 95.0),
        pitcher("canning", "LAA", "SP", Handedness::Right, 450.0, 3_000_000.0, 110.0),
        pitcher("estevez", "LAA", "RP", Handedness::Right, 180.0, 6_000_000.0, 85.0),
        pitcher("cole", "NYY", "SP", Handedness::Right, 500.0, 36_000_000.0, 75.0),
        pitcher("mopup", "NYY", "RP", Handedness::Left, 20.0, 740_000.0, 150.0),
    ])
    .expect("import pitchers");
    db.upsert_team(&TeamRecord {
        team_id: "LAA".into(),
        name: Some("Los Angeles Angels".into()),
        wins: Some(63),
        losses: Some(99),
        rank: Some(5),
    })
    .expect("upsert team");
    Dashboard::new(db, &inline_config())
}

// ===========================================================================
// Percentiles
// ===========================================================================

#[test]
fn league_ranking_covers_every_row() {
    let d = seeded_dashboard();
    let batters = d.ranked_batters().unwrap();
    assert_eq!(batters.len(), 8);

    let callup = batters
        .iter()
        .find(|r| r.line.season.player_id == "callup")
        .unwrap();
    assert!(!callup.qualified);
    assert_eq!(callup.percentiles.get(BatterMetric::Avg), None);

    let judge = batters
        .iter()
        .find(|r| r.line.season.player_id == "judge")
        .unwrap();
    // Best AVG and lowest K rate among the seven qualified batters.
    assert_eq!(judge.percentiles.get(BatterMetric::Avg), Some(100.0));
    let k = judge.percentiles.get(BatterMetric::KRate).unwrap();
    assert!(approx_eq(k, 100.0 - 100.0 / 7.0, 1e-9));

    // Raleigh has no OPS+, so only six batters are ranked on it.
    let raleigh = batters
        .iter()
        .find(|r| r.line.season.player_id == "raleigh")
        .unwrap();
    assert_eq!(raleigh.percentiles.get(BatterMetric::OpsPlus), None);
    assert!(raleigh.percentiles.get(BatterMetric::Avg).is_some());
    assert_eq!(judge.percentiles.get(BatterMetric::OpsPlus), Some(100.0));
}

#[test]
fn percentiles_stay_in_range_and_recompute_identically() {
    let d = seeded_dashboard();
    let first = d.ranked_pitchers().unwrap();
    let second = d.ranked_pitchers().unwrap();
    assert_eq!(first, second);
    for r in &first {
        for (_, pct) in r.percentiles.iter() {
            if let Some(p) = pct {
                assert!((0.0..=100.0).contains(&p));
            }
        }
    }
    let mopup = first
        .iter()
        .find(|r| r.line.season.player_id == "mopup")
        .unwrap();
    assert!(!mopup.qualified);
    let cole = first
        .iter()
        .find(|r| r.line.season.player_id == "cole")
        .unwrap();
    assert_eq!(cole.percentiles.get(PitcherMetric::Fip), Some(75.0));
}

// ===========================================================================
// Profiles
// ===========================================================================

#[test]
fn team_profiles_use_league_percentiles() {
    let d = seeded_dashboard();
    let of = d.batter_profile("OF").unwrap();
    assert_eq!(of.members, 2);
    // trout and ward sit at AVG ranks 6 and 5 of 7.
    assert!(approx_eq(of.get(BatterMetric::Avg).unwrap(), 550.0 / 7.0, 1e-9));

    let hitters = d.batter_profile("H").unwrap();
    assert_eq!(hitters.members, 5);

    let sp = d.pitcher_profile("SP").unwrap();
    assert_eq!(sp.members, 2);
    assert!(d.pitcher_profile("RP_L").unwrap_err().is_no_data());
    assert!(matches!(
        d.pitcher_profile("CL"),
        Err(StatsError::UnrecognizedGroup { .. })
    ));
}

// ===========================================================================
// Quadrants
// ===========================================================================

#[test]
fn contribution_and_action_lists() {
    let d = seeded_dashboard();
    // League batter salaries: 0.74, 0.75, 0.8, 2, 5, 35, 38, 40 (M) -> 3.5M.
    assert_eq!(d.salary_median(PlayerType::Batter).unwrap(), 3_500_000.0);

    let report = d.contribution(PlayerType::Batter, &[]).unwrap();
    assert_eq!(report.points.len(), 5);
    let quadrant = |id: &str| {
        report
            .points
            .iter()
            .find(|p| p.player_id == id)
            .and_then(|p| p.quadrant)
    };
    assert_eq!(quadrant("trout"), Some(Quadrant::Star));
    assert_eq!(quadrant("rendon"), Some(Quadrant::Overpaid));
    assert_eq!(quadrant("ward"), Some(Quadrant::Value));
    assert_eq!(quadrant("neto"), Some(Quadrant::Developing));

    let trade = d.player_list("batter", "trade", &[]).unwrap();
    assert_eq!(trade.len(), 1);
    assert_eq!(trade[0].player_id, "rendon");

    let outfield = vec!["OF".to_string()];
    let extend = d.player_list("batter", "extend", &outfield).unwrap();
    assert_eq!(extend.len(), 1);
    let option = d.player_list("batter", "option", &outfield).unwrap();
    assert!(option.is_empty());

    // Pitcher salaries: 0.74, 2, 3, 6, 36 -> 3M. Canning at 3M counts as high.
    let roles = vec!["SP R".to_string(), "SP L".to_string()];
    let trade = d.player_list("pitcher", "trade", &roles).unwrap();
    assert_eq!(trade.len(), 1);
    assert_eq!(trade[0].player_id, "canning");
    assert_eq!(trade[0].position, "SP R");
}

// ===========================================================================
// Overview
// ===========================================================================

#[test]
fn overview_against_league() {
    let d = seeded_dashboard();

    let cmp = d
        .performance_comparison(PlayerType::Pitcher, &["SP R".to_string(), "RP R".to_string()])
        .unwrap();
    let sp_r = cmp.get("SP R").unwrap();
    assert_eq!(sp_r.team_avg, 110.0);
    assert_eq!(sp_r.league_avg, Some(92.5));
    assert_eq!(cmp.get("RP R").unwrap().team_avg, 85.0);

    let breakdown = d.overview_breakdown("H").unwrap();
    let cats: Vec<&str> = breakdown.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(cats, vec!["3B", "C", "OF", "SS"]);

    let tiles = d.overview_tiles().unwrap();
    assert_eq!(tiles.starters.value, Some(102.5));
    assert_eq!(tiles.starters.diff, Some(-2.5));
    assert_eq!(tiles.hitters.value, Some(130.0));

    let record = d.team_record().unwrap();
    assert_eq!(record.name.as_deref(), Some("Los Angeles Angels"));
    assert_eq!(record.wins, Some(63));
}

#[test]
fn output_serializes_for_presentation() {
    let d = seeded_dashboard();
    let profile = d.batter_profile("SS").unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["group"], "SS");
    assert_eq!(json["values"][0]["metric"], "AVG_PR");

    let report = d.contribution(PlayerType::Pitcher, &[]).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["player_type"], "pitcher");
    assert_eq!(json["metric_name"], "fip-");
}
