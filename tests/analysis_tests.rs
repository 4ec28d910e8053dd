use schedule_risk::{
    Activity, Analysis, AnalysisConfig, AnalysisError, DurationSpec, ModelValidationError,
    StructuralError,
};

fn config(samples: usize) -> AnalysisConfig {
    AnalysisConfig {
        samples,
        seed: 11,
        ..AnalysisConfig::default()
    }
}

fn project() -> Vec<Activity> {
    vec![
        Activity::new("A", "Design", DurationSpec::triangular(1.0, 2.0, 4.0)),
        Activity::new("B", "Build", DurationSpec::triangular(2.0, 3.0, 5.0)).with_predecessors(["A"]),
        Activity::new("C", "Test", DurationSpec::fixed(4.0)).with_predecessors(["A"]),
        Activity::new("D", "Ship", DurationSpec::fixed(1.0)).with_predecessors(["B", "C"]),
    ]
}

#[test]
fn baseline_uses_point_estimates_and_default_endpoints() {
    let analysis = Analysis::from_activities(project(), config(10)).unwrap();
    let baseline = analysis.baseline(None, None).unwrap();
    assert_eq!(baseline.path.path().unwrap(), ["A", "C", "D"]);
    assert_eq!(baseline.path.total_weight(), Some(7.0));
    assert_eq!(baseline.project_finish, 7.0);
    let b = baseline.times.iter().find(|t| t.code == "B").unwrap();
    assert_eq!(b.total_float, 1.0);
}

#[test]
fn explicit_endpoints_override_defaults() {
    let analysis = Analysis::from_activities(project(), config(10)).unwrap();
    let baseline = analysis.baseline(Some("A"), Some("B")).unwrap();
    assert_eq!(baseline.path.path().unwrap(), ["A", "B"]);
}

#[test]
fn pipeline_runs_end_to_end() {
    let mut analysis = Analysis::from_activities(project(), config(400)).unwrap();
    assert!(matches!(
        analysis.risk(),
        Err(AnalysisError::MissingArtifact(_))
    ));

    let report = analysis.simulate(None, None).unwrap();
    assert_eq!(report.len(), 400);
    assert_eq!((report.start.as_str(), report.end.as_str()), ("A", "D"));

    let risk = analysis.risk().unwrap();
    assert!(risk.value_at_risk >= risk.mean);
    assert!(risk.conditional_value_at_risk >= risk.value_at_risk);
    assert!(risk.min >= 6.0 - 1e-9);

    let discretization = analysis.discretize().unwrap();
    assert_eq!(discretization.len(), 4);

    let model = analysis.build_network().unwrap();
    assert_eq!(model.len(), 8);

    let summary = analysis.summary().unwrap();
    assert_eq!(summary.samples, Some(400));
    assert_eq!(summary.network_variables, Some(8));
    let line = summary.to_cli_summary();
    assert!(line.contains("activities=4"), "{line}");
    assert!(line.contains("samples=400"), "{line}");
    assert!(line.contains("crit_path=A->C->D"), "{line}");
}

#[test]
fn same_seed_reproduces_the_run() {
    let mut first = Analysis::from_activities(project(), config(200)).unwrap();
    let mut second = Analysis::from_activities(project(), config(200)).unwrap();
    let a = first.simulate(None, None).unwrap().clone();
    let b = second.simulate(None, None).unwrap().clone();
    assert_eq!(a, b);
}

#[test]
fn editing_activities_discards_artifacts() {
    let mut analysis = Analysis::from_activities(project(), config(50)).unwrap();
    analysis.simulate(None, None).unwrap();
    analysis.build_network().unwrap();

    analysis
        .add_activity(Activity::new("E", "Docs", DurationSpec::fixed(2.0)).with_predecessors(["D"]))
        .unwrap();
    assert!(analysis.report().is_none());
    assert!(analysis.model().is_none());
    assert_eq!(analysis.activities().len(), 5);
}

#[test]
fn cyclic_edit_is_rejected_and_state_kept() {
    let mut analysis = Analysis::from_activities(project(), config(50)).unwrap();
    let err = analysis
        .add_activity(Activity::new("A", "Design", DurationSpec::fixed(1.0)).with_predecessors(["D"]))
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Structural(StructuralError::CycleDetected { .. })
    ));
    assert!(analysis.activities()[0].predecessors.is_empty());
}

#[test]
fn removing_an_activity_drops_its_precedences() {
    let mut analysis = Analysis::from_activities(project(), config(50)).unwrap();
    assert!(analysis.remove_activity("B"));
    assert!(!analysis.remove_activity("B"));
    let d = analysis.activities().iter().find(|a| a.code == "D").unwrap();
    assert_eq!(d.predecessors, vec!["C"]);
    analysis.graph().unwrap();
}

#[test]
fn invalid_config_is_rejected() {
    let mut analysis = Analysis::new();
    assert!(analysis.update_config_with(|c| c.confidence = 0.0).is_err());
    assert_eq!(analysis.config().confidence, 0.95);
}

#[test]
fn oversized_horizon_is_rejected_by_the_session() {
    let mut analysis = Analysis::from_activities(
        vec![Activity::new("A", "Forever", DurationSpec::fixed(1e19))],
        config(5),
    )
    .unwrap();
    analysis.simulate(None, None).unwrap();
    assert!(matches!(
        analysis.build_network(),
        Err(AnalysisError::ModelValidation(
            ModelValidationError::CapacityExceeded { .. }
        ))
    ));
    assert!(analysis.model().is_none());

    analysis
        .update_config_with(|c| c.max_completion_states = usize::MAX)
        .unwrap();
    // fits in usize, but the largest label no longer fits in a day count
    assert!(matches!(
        analysis.build_network(),
        Err(AnalysisError::ModelValidation(
            ModelValidationError::CapacityExceeded { .. }
        ))
    ));
}
