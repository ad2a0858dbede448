use super::*;

fn act(id: &str, preds: &[&str]) -> Activity {
    let mut a = Activity::new(id, format!("Task {}", id));
    a.predecessors = preds.iter().map(|p| p.to_string()).collect();
    a
}

#[test]
fn test_build_twin_orders_predecessors_first() {
    let activities = vec![
        act("fit_out", &["frame", "services"]),
        act("frame", &[]),
        act("services", &["frame"]),
    ];

    let twin = DigitalTwin::build(&activities);
    assert!(!twin.has_cycles());
    assert!(twin.cycle_warning().is_none());

    let order: Vec<&str> = twin
        .processing_order()
        .iter()
        .map(|&i| twin.activities()[i].id.as_str())
        .collect();
    let pos = |id: &str| order.iter().position(|o| *o == id).unwrap();

    assert_eq!(order.len(), 3);
    assert!(pos("frame") < pos("services"));
    assert!(pos("services") < pos("fit_out"));
}

#[test]
fn test_dangling_predecessor_becomes_phantom() {
    let activities = vec![act("A", &["GHOST"]), act("B", &["A"])];

    let twin = DigitalTwin::build(&activities);

    assert_eq!(twin.len(), 2);
    assert_eq!(twin.node_count(), 3);
    assert!(twin.contains("GHOST"));
    assert!(twin.activity("GHOST").is_none());
    assert_eq!(twin.predecessors("A"), vec!["GHOST".to_string()]);
    // phantom nodes never appear in the processing order
    assert_eq!(twin.processing_order().len(), 2);
    assert!(twin.predecessor_indices(0).is_empty());
}

#[test]
fn test_cycle_is_flagged_not_fatal() {
    let activities = vec![act("A", &["C"]), act("B", &["A"]), act("C", &["B"])];

    let twin = DigitalTwin::build(&activities);

    assert!(twin.has_cycles());
    assert_eq!(
        twin.cycle_warning(),
        Some("Graph contains cycles (e.g., A -> B -> C). Critical path calculations may be approximate.")
    );
    assert_eq!(twin.processing_order().len(), 3);
}

#[test]
fn test_long_cycle_warning_is_truncated() {
    let ids = ["A", "B", "C", "D", "E", "F", "G"];
    let activities: Vec<Activity> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let prev = ids[(i + ids.len() - 1) % ids.len()];
            act(id, &[prev])
        })
        .collect();

    let twin = DigitalTwin::build(&activities);
    let warning = twin.cycle_warning().unwrap();

    assert!(warning.contains("(e.g., A -> B -> C -> D -> E...)"));
    assert!(!warning.contains("F"));
}

#[test]
fn test_self_loop_is_a_cycle() {
    let activities = vec![act("A", &["A"]), act("B", &["A"])];

    let twin = DigitalTwin::build(&activities);

    assert!(twin.has_cycles());
    assert!(twin.cycle_warning().unwrap().contains("(e.g., A)"));
    assert_eq!(twin.processing_order().len(), 2);
}

#[test]
fn test_best_effort_order_keeps_acyclic_tail_after_cycle() {
    let activities = vec![
        act("A", &["B"]),
        act("B", &["A"]),
        act("C", &["B"]),
    ];

    let twin = DigitalTwin::build(&activities);
    let order = twin.processing_order();

    assert_eq!(order, &[0, 1, 2]);
}

#[test]
fn test_degrees_and_neighbours() {
    let activities = vec![act("A", &[]), act("B", &["A"]), act("C", &["A", "B"])];

    let twin = DigitalTwin::build(&activities);

    assert_eq!(twin.out_degree("A"), 2);
    assert_eq!(twin.in_degree("C"), 2);
    assert_eq!(twin.in_degree("missing"), 0);
    assert_eq!(twin.successor_indices(0), vec![1, 2]);
    assert_eq!(twin.predecessor_indices(2), vec![0, 1]);
    assert_eq!(twin.edge_count(), 3);
}

#[test]
fn test_empty_twin() {
    let twin = DigitalTwin::build(&[]);
    assert!(twin.is_empty());
    assert!(!twin.has_cycles());
    assert!(twin.processing_order().is_empty());
}
