use schedule_risk::{
    Activity, DistributionSampler, DurationSpec, MonteCarloSimulator, PathResult, ProjectDag,
    SampleSet, SamplingMethod,
};

fn diamond() -> ProjectDag {
    ProjectDag::from_activities(&[
        Activity::new("A", "Start", DurationSpec::triangular(1.0, 2.0, 4.0)),
        Activity::new("B", "Left", DurationSpec::triangular(2.0, 3.0, 8.0)).with_predecessors(["A"]),
        Activity::new("C", "Right", DurationSpec::normal(4.0, 1.0)).with_predecessors(["A"]),
        Activity::new("D", "Finish", DurationSpec::fixed(5.0)).with_predecessors(["B", "C"]),
    ])
    .unwrap()
}

#[test]
fn thousand_samples_give_thousand_rows() {
    let dag = diamond();
    let mut sampler = DistributionSampler::seeded(42);
    let report = MonteCarloSimulator::new(&dag)
        .unwrap()
        .run(&mut sampler, SamplingMethod::LatinHypercube, 1000, "A", "D")
        .unwrap();

    assert_eq!(report.len(), 1000);
    assert_eq!(report.rows().count(), 1000);
    assert_eq!(report.durations().len(), 1000);
    assert_eq!(report.unreachable_count(), 0);

    for row in report.rows() {
        let path = row.critical_path.unwrap();
        assert_eq!(path.first().map(String::as_str), Some("A"));
        assert_eq!(path.last().map(String::as_str), Some("D"));
        assert_eq!(path.len(), 3);
    }
}

#[test]
fn row_totals_match_their_sampled_weights() {
    let dag = diamond();
    let mut sampler = DistributionSampler::seeded(9);
    let report = MonteCarloSimulator::new(&dag)
        .unwrap()
        .run(&mut sampler, SamplingMethod::Random, 50, "A", "D")
        .unwrap();

    for row in report.rows() {
        let path = row.critical_path.unwrap();
        let sum: f64 = path
            .iter()
            .map(|code| report.samples.column(code).unwrap()[row.sample])
            .sum();
        assert!((sum - row.total_weight.unwrap()).abs() < 1e-9);
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dag = diamond();
    let samples = DistributionSampler::seeded(3)
        .generate(&dag, SamplingMethod::LatinHypercube, 500)
        .unwrap();

    let parallel = MonteCarloSimulator::new(&dag)
        .unwrap()
        .evaluate(samples.clone(), "A", "D")
        .unwrap();
    let sequential = MonteCarloSimulator::new(&dag)
        .unwrap()
        .with_parallel(false)
        .evaluate(samples, "A", "D")
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn unreachable_samples_are_recorded_not_fatal() {
    let dag = ProjectDag::from_activities(&[
        Activity::new("A", "A", DurationSpec::fixed(1.0)),
        Activity::new("B", "B", DurationSpec::fixed(2.0)),
    ])
    .unwrap();
    let mut sampler = DistributionSampler::seeded(0);
    let report = MonteCarloSimulator::new(&dag)
        .unwrap()
        .run(&mut sampler, SamplingMethod::LatinHypercube, 20, "A", "B")
        .unwrap();

    assert_eq!(report.len(), 20);
    assert_eq!(report.unreachable_count(), 20);
    assert!(report.durations().is_empty());
    assert!(report.results.iter().all(|r| matches!(r, PathResult::Unreachable { .. })));
    assert!(report.rows().all(|row| row.total_weight.is_none()));
}

#[test]
fn path_frequencies_and_criticality_come_from_the_batch() {
    let dag = ProjectDag::from_activities(&[
        Activity::new("A", "A", DurationSpec::fixed(1.0)),
        Activity::new("B", "B", DurationSpec::fixed(1.0)).with_predecessors(["A"]),
        Activity::new("C", "C", DurationSpec::fixed(1.0)).with_predecessors(["A"]),
        Activity::new("D", "D", DurationSpec::fixed(1.0)).with_predecessors(["B", "C"]),
    ])
    .unwrap();
    // B is longer in three rows, C in one.
    let samples = SampleSet::from_columns([
        ("A", vec![1.0, 1.0, 1.0, 1.0]),
        ("B", vec![5.0, 5.0, 5.0, 1.0]),
        ("C", vec![2.0, 2.0, 2.0, 6.0]),
        ("D", vec![1.0, 1.0, 1.0, 1.0]),
    ])
    .unwrap();
    let report = MonteCarloSimulator::new(&dag)
        .unwrap()
        .evaluate(samples, "A", "D")
        .unwrap();

    let frequencies = report.path_frequencies();
    assert_eq!(frequencies.len(), 2);
    assert_eq!(frequencies[0].path, vec!["A", "B", "D"]);
    assert_eq!(frequencies[0].count, 3);
    assert_eq!(frequencies[1].count, 1);
    assert!((frequencies[0].share - 0.75).abs() < 1e-12);

    let index = report.criticality_index();
    assert_eq!(
        index,
        vec![
            ("A".to_string(), 1.0),
            ("B".to_string(), 0.75),
            ("C".to_string(), 0.25),
            ("D".to_string(), 1.0),
        ]
    );
}

#[test]
fn mismatched_sample_set_is_rejected() {
    let dag = diamond();
    let samples = SampleSet::from_columns([("A", vec![1.0]), ("B", vec![1.0])]).unwrap();
    assert!(
        MonteCarloSimulator::new(&dag)
            .unwrap()
            .evaluate(samples, "A", "D")
            .is_err()
    );
}
