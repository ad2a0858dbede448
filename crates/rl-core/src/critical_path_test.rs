use super::*;
use proptest::prelude::*;

fn act(id: &str, preds: &[&str], duration: f64) -> Activity {
    let mut a = Activity::new(id, format!("Task {}", id));
    a.predecessors = preds.iter().map(|p| p.to_string()).collect();
    a.planned_duration = Some(duration);
    a
}

fn engine_for(activities: &[Activity]) -> (CriticalPathEngine, Vec<f64>) {
    let twin = DigitalTwin::build(activities);
    let durations = planned_durations(twin.activities());
    (CriticalPathEngine::new(&twin), durations)
}

#[test]
fn test_linear_chain_is_fully_critical() {
    let activities = vec![
        act("A", &[], 5.0),
        act("B", &["A"], 3.0),
        act("C", &["B"], 2.0),
    ];
    let (engine, durations) = engine_for(&activities);

    let result = engine.compute(&durations);

    assert_eq!(result.project_finish, 10.0);
    assert!(result.timings.iter().all(|t| t.critical));
    assert!(result.timings.iter().all(|t| t.total_float == 0.0));
    let c = result.timing("C").unwrap();
    assert_eq!(c.early_start, 8.0);
    assert_eq!(c.late_finish, 10.0);
}

#[test]
fn test_parallel_branch_has_float() {
    // A -> {B (5d), C (2d)} -> D
    let activities = vec![
        act("A", &[], 1.0),
        act("B", &["A"], 5.0),
        act("C", &["A"], 2.0),
        act("D", &["B", "C"], 1.0),
    ];
    let (engine, durations) = engine_for(&activities);

    let result = engine.compute(&durations);

    assert_eq!(result.project_finish, 7.0);
    let c = result.timing("C").unwrap();
    assert_eq!(c.total_float, 3.0);
    assert!(!c.critical);
    let ids: Vec<&str> = result.critical_ids().iter().map(|i| i.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "D"]);
}

#[test]
fn test_phantom_predecessor_contributes_nothing() {
    let activities = vec![act("A", &["MISSING"], 4.0), act("B", &["A"], 1.0)];
    let (engine, durations) = engine_for(&activities);

    let result = engine.compute(&durations);

    assert_eq!(result.timing("A").unwrap().early_start, 0.0);
    assert_eq!(result.project_finish, 5.0);
}

#[test]
fn test_cycle_never_fails() {
    let activities = vec![
        act("A", &["C"], 2.0),
        act("B", &["A"], 2.0),
        act("C", &["B"], 2.0),
    ];
    let (engine, durations) = engine_for(&activities);

    let result = engine.compute(&durations);

    // the back edge C -> A is ignored, leaving a 6-day chain
    assert_eq!(result.project_finish, 6.0);
    assert_eq!(result.timings.len(), 3);
}

#[test]
fn test_compute_into_reuses_scratch() {
    let activities = vec![act("A", &[], 2.0), act("B", &["A"], 3.0)];
    let (engine, _) = engine_for(&activities);
    let mut scratch = Scratch::default();

    assert_eq!(engine.compute_into(&[2.0, 3.0], &mut scratch), 5.0);
    assert_eq!(engine.compute_into(&[1.0, 1.5], &mut scratch), 2.5);
    assert_eq!(scratch.es[1], 1.0);
    assert!(scratch.is_critical(0));
}

#[test]
fn test_empty_engine() {
    let twin = DigitalTwin::build(&[]);
    let engine = CriticalPathEngine::new(&twin);
    let result = engine.compute(&[]);
    assert_eq!(result.project_finish, 0.0);
    assert!(result.timings.is_empty());
}

#[test]
fn test_planned_durations_fallbacks() {
    let mut a = Activity::new("A", "Task");
    a.baseline_duration = Some(4.0);
    let mut b = Activity::new("B", "Task");
    b.planned_duration = Some(0.0);
    let c = act("C", &[], 6.0);

    assert_eq!(planned_durations(&[a, b, c]), vec![4.0, 1.0, 6.0]);
}

fn random_dag() -> impl Strategy<Value = Vec<Activity>> {
    prop::collection::vec((0.1f64..30.0, prop::collection::vec(any::<prop::sample::Index>(), 0..3)), 1..25)
        .prop_map(|rows| {
            let mut activities = Vec::with_capacity(rows.len());
            for (i, (duration, pred_picks)) in rows.into_iter().enumerate() {
                let preds: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    pred_picks
                        .iter()
                        .map(|pick| format!("T{}", pick.index(i)))
                        .collect()
                };
                let mut a = Activity::new(format!("T{}", i), "Task");
                a.planned_duration = Some(duration);
                a.predecessors = preds;
                activities.push(a);
            }
            activities
        })
}

proptest! {
    #[test]
    fn prop_float_and_criticality_agree(activities in random_dag()) {
        let (engine, durations) = engine_for(&activities);
        let result = engine.compute(&durations);

        for timing in &result.timings {
            prop_assert!(timing.total_float >= 0.0);
            prop_assert!(timing.late_start >= timing.early_start - 1e-9);
            prop_assert!(timing.early_finish <= result.project_finish + 1e-9);
            if timing.critical {
                prop_assert!(timing.total_float < CRITICAL_TOLERANCE);
            } else {
                prop_assert!(timing.total_float >= CRITICAL_TOLERANCE);
            }
        }
        prop_assert!(result.timings.iter().any(|t| t.critical));
    }
}
