use schedule_risk::{
    Activity, ActivityTimes, CriticalPathSolver, DurationSpec, ProjectDag, WeightAssignment,
    schedule_times,
};

fn act(code: &str, days: f64, preds: &[&str]) -> Activity {
    Activity::new(code, code, DurationSpec::fixed(days)).with_predecessors(preds.iter().copied())
}

fn times_for(activities: &[Activity]) -> (Vec<ActivityTimes>, f64) {
    let dag = ProjectDag::from_activities(activities).unwrap();
    let solver = CriticalPathSolver::new(&dag).unwrap();
    let weights = WeightAssignment::from_map(&dag, &dag.point_weights()).unwrap();
    schedule_times(&solver, &weights)
}

fn find<'a>(times: &'a [ActivityTimes], code: &str) -> &'a ActivityTimes {
    times.iter().find(|t| t.code == code).unwrap()
}

#[test]
fn forward_and_backward_passes_set_floats() {
    // Graph: T1 -> {T2,T3} -> T4 with durations 2,3,1,2
    let (times, finish) = times_for(&[
        act("T1", 2.0, &[]),
        act("T2", 3.0, &["T1"]),
        act("T3", 1.0, &["T1"]),
        act("T4", 2.0, &["T2", "T3"]),
    ]);

    assert_eq!(finish, 7.0);

    let t1 = find(&times, "T1");
    assert_eq!((t1.early_start, t1.early_finish), (0.0, 2.0));
    assert!(t1.is_critical);

    let t2 = find(&times, "T2");
    assert_eq!((t2.early_start, t2.early_finish), (2.0, 5.0));
    assert_eq!((t2.late_start, t2.late_finish), (2.0, 5.0));
    assert!(t2.is_critical);

    let t3 = find(&times, "T3");
    assert_eq!((t3.early_start, t3.early_finish), (2.0, 3.0));
    assert_eq!((t3.late_start, t3.late_finish), (4.0, 5.0));
    assert_eq!(t3.total_float, 2.0);
    assert!(!t3.is_critical);

    let t4 = find(&times, "T4");
    assert_eq!((t4.late_start, t4.late_finish), (5.0, 7.0));
}

#[test]
fn every_sink_finishes_late_at_project_finish() {
    let (times, finish) = times_for(&[
        act("A", 4.0, &[]),
        act("B", 1.0, &[]),
        act("C", 2.0, &["A"]),
    ]);
    assert_eq!(finish, 6.0);
    let b = find(&times, "B");
    assert_eq!(b.late_finish, 6.0);
    assert_eq!(b.total_float, 5.0);
    assert!(find(&times, "C").is_critical);
}

#[test]
fn times_follow_declaration_order() {
    let (times, _) = times_for(&[act("Z", 1.0, &[]), act("A", 1.0, &["Z"])]);
    let codes: Vec<&str> = times.iter().map(|t| t.code.as_str()).collect();
    assert_eq!(codes, vec!["Z", "A"]);
}
