use super::common::*;
use crate::scorecard::domain::{Quarter, Timeframe};
use crate::scorecard::editor::{EditCommand, OverrideBound};
use crate::scorecard::snapshot::PeriodEntry;
use crate::scorecard::views::HeatBand;
use crate::scorecard::{ScoringEngine, YearSnapshot, ZeroValuePolicy};

fn disable_leaf(
    engine: &ScoringEngine<PercentRules>,
    snapshot: crate::scorecard::YearSnapshot,
    leaf_id: &str,
    month: u8,
) -> crate::scorecard::YearSnapshot {
    edit(
        engine,
        snapshot,
        EditCommand::SetLeafEnabled {
            manager_id: "m1".to_string(),
            objective_id: "obj1".to_string(),
            leaf_id: leaf_id.to_string(),
            month,
            enabled: false,
        },
    )
}

#[test]
fn objective_score_averages_only_enabled_leaves() {
    let engine = percent_engine();
    let snapshot = engine.initialize();
    let snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s1", 0, 80.0);
    let snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s2", 0, 60.0);
    let snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s3", 0, 40.0);
    let snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s4", 0, 100.0);
    let snapshot = disable_leaf(&engine, snapshot, "s4", 0);

    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m1", "obj1", month(0)), 60);
}

#[test]
fn objective_with_every_leaf_disabled_scores_zero() {
    let engine = percent_engine();
    let mut snapshot = set_leaf(&engine, engine.initialize(), "m1", "obj1", "s1", 0, 90.0);
    for leaf in ["s1", "s2", "s3", "s4"] {
        snapshot = disable_leaf(&engine, snapshot, leaf, 0);
    }

    assert_eq!(engine.view(&snapshot).resolve_objective("m1", "obj1", month(0)), 0);
}

#[test]
fn disabled_objective_scores_zero_for_that_month_only() {
    let engine = percent_engine();
    let snapshot = set_single(&engine, engine.initialize(), "m2", "obj2", 1, 75.0);
    let snapshot = set_single(&engine, snapshot, "m2", "obj2", 2, 75.0);
    let snapshot = edit(
        &engine,
        snapshot,
        EditCommand::SetObjectiveEnabled {
            manager_id: "m2".to_string(),
            objective_id: "obj2".to_string(),
            month: 1,
            enabled: false,
        },
    );

    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m2", "obj2", month(1)), 0);
    assert_eq!(view.resolve_objective("m2", "obj2", month(2)), 75);
}

#[test]
fn quarterly_objective_only_scores_in_quarter_end_months() {
    let engine = percent_engine();
    let mut snapshot = engine.initialize();
    for leaf in ["t1", "t2", "t3", "t4"] {
        snapshot = set_leaf(&engine, snapshot, "m1", "obj4", leaf, 1, 90.0);
        snapshot = set_leaf(&engine, snapshot, "m1", "obj4", leaf, 2, 90.0);
    }

    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m1", "obj4", month(1)), 0);
    assert_eq!(view.resolve_objective("m1", "obj4", month(2)), 90);
}

#[test]
fn aggregate_uses_closed_months_only() {
    let engine = percent_engine();
    let mut snapshot = engine.initialize();
    for (index, value) in [(2, 70.0), (5, 80.0), (8, 90.0), (11, 100.0)] {
        snapshot = set_single(&engine, snapshot, "m1", "obj2", index, value);
    }
    close_months(&mut snapshot, "m1", &[2, 5, 8]);

    let view = engine.view(&snapshot);
    assert_eq!(view.aggregate("m1", "obj2", Timeframe::YearToDate), 80);
    assert_eq!(
        view.aggregate("m1", "obj2", Timeframe::Quarter(Quarter::new(3).expect("q4"))),
        0
    );
    assert_eq!(view.aggregate("m1", "obj2", Timeframe::Month(month(5))), 80);
}

#[test]
fn aggregate_without_closed_months_is_zero() {
    let engine = percent_engine();
    let snapshot = set_single(&engine, engine.initialize(), "m3", "obj5", 4, 100.0);

    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m3", "obj5", month(4)), 100);
    assert_eq!(view.aggregate("m3", "obj5", Timeframe::YearToDate), 0);
    assert_eq!(view.global_score("m3", Timeframe::YearToDate), 0);
}

#[test]
fn global_score_keeps_quarterly_objectives_in_the_denominator() {
    let engine = percent_engine();
    let mut snapshot = engine.initialize();
    for leaf in ["s1", "s2", "s3", "s4"] {
        snapshot = set_leaf(&engine, snapshot, "m1", "obj1", leaf, 0, 100.0);
    }
    for leaf in ["f1", "f2", "f3", "f4"] {
        snapshot = set_leaf(&engine, snapshot, "m1", "obj3", leaf, 0, 100.0);
    }
    snapshot = set_single(&engine, snapshot, "m1", "obj2", 0, 100.0);
    snapshot = set_single(&engine, snapshot, "m1", "obj5", 0, 100.0);
    close_months(&mut snapshot, "m1", &[0]);

    let view = engine.view(&snapshot);
    assert_eq!(view.global_score("m1", Timeframe::Month(month(0))), 80);
    assert_eq!(view.monthly_score("m1", month(0)), 100);
}

#[test]
fn trend_reports_closed_months_only() {
    let engine = percent_engine();
    let mut snapshot = set_single(&engine, engine.initialize(), "m1", "obj2", 3, 50.0);
    close_months(&mut snapshot, "m1", &[3]);

    let view = engine.view(&snapshot);
    let trend = view.trend("m1");
    assert_eq!(trend.len(), 12);
    assert_eq!(trend[3].score, Some(view.monthly_score("m1", month(3))));
    assert!(trend
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 3)
        .all(|(_, point)| point.score.is_none()));
    assert_eq!(view.trends().len(), engine.roster().len());
}

#[test]
fn ranking_orders_by_score_and_keeps_roster_order_for_ties() {
    let engine = percent_engine();
    let mut snapshot = set_single(&engine, engine.initialize(), "m3", "obj2", 0, 100.0);
    snapshot = set_single(&engine, snapshot, "m7", "obj2", 0, 50.0);
    close_months(&mut snapshot, "m3", &[0]);
    close_months(&mut snapshot, "m7", &[0]);

    let ranking = engine.view(&snapshot).rank(Timeframe::YearToDate);
    let order: Vec<&str> = ranking.iter().map(|entry| entry.manager_id.as_str()).collect();
    assert_eq!(
        order,
        ["m3", "m7", "m1", "m2", "m4", "m5", "m6", "m8", "m9", "m10"]
    );
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[0].score, 20);
    assert_eq!(ranking[0].heat_band, HeatBand::Low);
    assert_eq!(ranking[9].heat_band, HeatBand::Empty);
}

#[test]
fn radar_lists_every_objective_for_every_manager() {
    let engine = percent_engine();
    let snapshot = engine.initialize();
    let radar = engine.view(&snapshot).radar(Timeframe::YearToDate);

    assert_eq!(radar.len(), engine.objectives().len());
    assert!(radar
        .iter()
        .all(|axis| axis.scores.len() == engine.roster().len()));
}

#[test]
fn aggregate_value_skips_disabled_months_and_rounds() {
    let engine = percent_engine();
    let mut snapshot = engine.initialize();
    for (index, value) in [(0, 1.0), (1, 2.0), (2, 2.0), (3, 40.0)] {
        snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s1", index, value);
    }
    snapshot = disable_leaf(&engine, snapshot, "s1", 3);
    close_months(&mut snapshot, "m1", &[0, 1, 2, 3]);

    let view = engine.view(&snapshot);
    assert_eq!(view.aggregate_value("m1", "s1", Timeframe::YearToDate), 1.7);
    assert_eq!(view.aggregate_value("m2", "s1", Timeframe::YearToDate), 0.0);
}

#[test]
fn standard_catalog_scores_the_reference_scenarios() {
    let engine = ScoringEngine::standard();
    let mut snapshot = engine.initialize();
    snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s1", 0, 6.0);
    snapshot = set_leaf(&engine, snapshot, "m1", "obj1", "s4", 1, 60.0);

    let view = engine.view(&snapshot);
    let score = |metric: &str, index: u8| {
        let bounds = view
            .metric_bounds("m1", metric, month(index))
            .expect("catalog rule");
        let value = view
            .metric_value("m1", metric, month(index))
            .expect("metric counts");
        crate::scorecard::achievement(value, bounds.base, bounds.target)
    };
    assert_eq!(score("s1", 0), 60);
    assert_eq!(score("s4", 1), 62);
}

#[test]
fn overrides_replace_catalog_bounds() {
    let engine = ScoringEngine::standard();
    let snapshot = set_single(&engine, engine.initialize(), "m5", "obj2", 6, 65.0);
    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m5", "obj2", month(6)), 50);

    let snapshot = edit(
        &engine,
        snapshot,
        EditCommand::SetOverride {
            manager_id: "m5".to_string(),
            objective_id: "obj2".to_string(),
            leaf_id: None,
            month: 6,
            bound: OverrideBound::Target,
            value: Some(65.0),
        },
    );
    let view = engine.view(&snapshot);
    assert_eq!(view.resolve_objective("m5", "obj2", month(6)), 100);
    assert_eq!(
        view.metric_bounds("m5", "obj2", month(6)).map(|bounds| bounds.target),
        Some(65.0)
    );
}

#[test]
fn zero_value_policy_controls_inverted_metrics() {
    let measured = ScoringEngine::standard();
    let mut snapshot = measured.initialize();
    for leaf in ["s1", "s2", "s3"] {
        snapshot = edit(
            &measured,
            snapshot,
            EditCommand::SetLeafEnabled {
                manager_id: "m1".to_string(),
                objective_id: "obj1".to_string(),
                leaf_id: leaf.to_string(),
                month: 0,
                enabled: false,
            },
        );
    }

    assert_eq!(
        measured.view(&snapshot).resolve_objective("m1", "obj1", month(0)),
        100
    );

    let no_data = ScoringEngine::standard().with_zero_policy(ZeroValuePolicy::NoData);
    assert_eq!(
        no_data.view(&snapshot).resolve_objective("m1", "obj1", month(0)),
        0
    );
}

#[test]
fn scorecard_hides_quarterly_objectives_outside_quarter_ends() {
    let engine = ScoringEngine::standard();
    let snapshot = engine.initialize();
    let view = engine.view(&snapshot);

    let january = view
        .scorecard("m1", Timeframe::Month(month(0)))
        .expect("known manager");
    assert!(january.objectives.iter().all(|card| card.objective_id != "obj4"));

    let march = view
        .scorecard("m1", Timeframe::Month(month(2)))
        .expect("known manager");
    let talent = march
        .objectives
        .iter()
        .find(|card| card.objective_id == "obj4")
        .expect("talent shown at quarter end");
    let t1 = talent
        .metrics
        .iter()
        .find(|metric| metric.metric_id == "t1")
        .expect("t1 card");
    assert_eq!(t1.target, Some(9.0));

    let performance = march
        .objectives
        .iter()
        .find(|card| card.objective_id == "obj1")
        .expect("performance");
    let s4 = performance
        .metrics
        .iter()
        .find(|metric| metric.metric_id == "s4")
        .expect("s4 card");
    assert_eq!(s4.unit.as_deref(), Some("days"));

    assert!(view.scorecard("nobody", Timeframe::YearToDate).is_none());
}

#[test]
fn empty_snapshot_scores_every_cell_as_enabled_zero() {
    let engine = ScoringEngine::standard();
    let mut snapshot = YearSnapshot::default();
    for index in [0, 1] {
        snapshot.completions.set_closed("m1", month(index), true);
    }
    let view = engine.view(&snapshot);

    // Only the inverted stock rotation leaf reaches its target at 0.
    assert_eq!(view.resolve_objective("m1", "obj1", month(0)), 25);
    assert_eq!(view.resolve_objective("m1", "obj2", month(0)), 0);
    assert_eq!(view.metric_value("m1", "s1", month(0)), Some(0.0));
    assert_eq!(view.metric_value("m1", "obj5", month(1)), Some(0.0));
    assert_eq!(view.metric_value("m1", "t1", month(0)), None);
    assert_eq!(view.metric_value("m1", "t1", month(2)), Some(0.0));
    assert_eq!(
        view.metric_bounds("m1", "s3", month(0)).map(|bounds| bounds.base),
        Some(80.0)
    );

    assert_eq!(view.aggregate("m1", "obj1", Timeframe::YearToDate), 25);
    assert_eq!(view.aggregate("m2", "obj1", Timeframe::YearToDate), 0);
    assert_eq!(view.aggregate_value("m1", "s4", Timeframe::YearToDate), 0.0);
    assert_eq!(view.global_score("m1", Timeframe::YearToDate), 5);
}

#[test]
fn missing_leaf_cells_count_as_enabled_zero() {
    let engine = ScoringEngine::standard();
    let mut snapshot = engine.initialize();
    for (leaf, value) in [("s1", 10.0), ("s2", 1.0), ("s3", 85.0), ("s4", 60.8)] {
        snapshot = set_leaf(&engine, snapshot, "m1", "obj1", leaf, 0, value);
    }
    snapshot.completions.set_closed("m1", month(0), true);

    let performance = snapshot
        .data
        .get_mut("m1")
        .and_then(|objectives| objectives.get_mut("obj1"))
        .and_then(|months| months.get_mut("0"));
    match performance {
        Some(PeriodEntry::Composite(entry)) => {
            entry.leaves.remove("s2");
        }
        other => panic!("expected a composite entry, got {other:?}"),
    }
    snapshot
        .data
        .get_mut("m1")
        .and_then(|objectives| objectives.get_mut("obj2"))
        .and_then(|months| months.remove("0"))
        .expect("obj2 cell existed");

    let view = engine.view(&snapshot);
    // s1 100, s2 0, s3 100, s4 0
    assert_eq!(view.resolve_objective("m1", "obj1", month(0)), 50);
    assert_eq!(view.metric_value("m1", "s2", month(0)), Some(0.0));
    assert_eq!(view.resolve_objective("m1", "obj2", month(0)), 0);
    assert_eq!(view.metric_value("m1", "obj2", month(0)), Some(0.0));
    assert_eq!(view.aggregate("m1", "obj1", Timeframe::YearToDate), 50);
}

#[test]
fn untouched_performance_scores_25_once_a_month_closes() {
    let measured = ScoringEngine::standard();
    let mut snapshot = measured.initialize();
    let view = measured.view(&snapshot);
    assert_eq!(view.aggregate("m1", "obj1", Timeframe::YearToDate), 0);

    snapshot.completions.set_closed("m1", month(0), true);
    let view = measured.view(&snapshot);
    assert_eq!(view.aggregate("m1", "obj1", Timeframe::YearToDate), 25);
    let ranking = view.rank(Timeframe::YearToDate);
    assert_eq!(ranking[0].manager_id, "m1");
    assert_eq!(ranking[0].score, 5);

    let no_data = ScoringEngine::standard().with_zero_policy(ZeroValuePolicy::NoData);
    let view = no_data.view(&snapshot);
    assert_eq!(view.aggregate("m1", "obj1", Timeframe::YearToDate), 0);
    assert_eq!(view.global_score("m1", Timeframe::YearToDate), 0);
}
