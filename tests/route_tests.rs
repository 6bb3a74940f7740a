use project_planner::route::{UNVISITED, locate_tasks, route_distance};
use project_planner::{
    Euclidean, Haversine, MetricKind, MockGeocoder, Task, TaskLocation, optimize_route,
    optimize_route_with, plan_route,
};

fn depot() -> TaskLocation {
    TaskLocation::new(0, 0.0, 0.0).with_label("Depot")
}

#[test]
fn two_stops_form_a_closed_loop() {
    let mut stops = vec![TaskLocation::new(1, 10.0, 0.0), TaskLocation::new(2, 1.0, 1.0)];
    let mut depot = depot();
    let route = optimize_route(&mut stops, &mut depot);

    let order: Vec<_> = route.iter().map(|stop| stop.task_id).collect();
    assert_eq!(order, vec![0, 2, 1, 0]);
    assert_eq!(route.first(), route.last());
}

#[test]
fn order_index_is_written_in_place() {
    let mut stops = vec![
        TaskLocation::new(1, 5.0, 0.0),
        TaskLocation::new(2, 1.0, 0.0),
        TaskLocation::new(3, 3.0, 0.0),
    ];
    let mut depot = depot();
    optimize_route(&mut stops, &mut depot);

    assert_eq!(depot.order_index, 0);
    let indices: Vec<i32> = stops.iter().map(|stop| stop.order_index).collect();
    assert_eq!(indices, vec![3, 1, 2]);
    assert!(stops.iter().all(|stop| stop.visited));
}

#[test]
fn every_stop_is_visited_exactly_once() {
    let mut geocoder = MockGeocoder::new(11);
    let tasks: Vec<Task> = (1..=12).map(|id| Task::new(id, format!("Site {id}"))).collect();
    let mut stops = locate_tasks(&tasks, &mut geocoder);
    let mut depot = TaskLocation::new(0, 50.0, 50.0);
    let route = optimize_route(&mut stops, &mut depot);

    assert_eq!(route.len(), tasks.len() + 2);
    let mut middle: Vec<_> = route[1..route.len() - 1]
        .iter()
        .map(|stop| stop.task_id)
        .collect();
    middle.sort_unstable();
    assert_eq!(middle, (1..=12).collect::<Vec<_>>());

    let mut indices: Vec<i32> = stops.iter().map(|stop| stop.order_index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (1..=12).collect::<Vec<_>>());
}

#[test]
fn empty_stop_list_returns_only_the_depot() {
    let mut depot = depot();
    let route = optimize_route(&mut [], &mut depot);
    assert_eq!(route.len(), 1);
    assert_eq!(route[0].task_id, 0);
    assert_eq!(route[0].order_index, 0);
}

#[test]
fn equal_distances_go_to_lower_task_id() {
    let mut stops = vec![TaskLocation::new(7, 0.0, 2.0), TaskLocation::new(4, 2.0, 0.0)];
    let mut depot = depot();
    let route = optimize_route(&mut stops, &mut depot);
    assert_eq!(route[1].task_id, 4);
    assert_eq!(route[2].task_id, 7);
}

#[test]
fn depot_entries_in_the_stop_list_are_skipped() {
    let mut stops = vec![TaskLocation::new(0, 0.0, 0.0), TaskLocation::new(1, 1.0, 0.0)];
    let mut depot = depot();
    let route = optimize_route(&mut stops, &mut depot);
    let order: Vec<_> = route.iter().map(|stop| stop.task_id).collect();
    assert_eq!(order, vec![0, 1, 0]);
    assert_eq!(stops[0].order_index, 0);
}

#[test]
fn stale_order_indices_are_reset() {
    let mut stops = vec![TaskLocation::new(1, 1.0, 0.0)];
    stops[0].order_index = 9;
    stops[0].visited = true;
    let mut depot = depot();
    optimize_route(&mut stops, &mut depot);
    assert_eq!(stops[0].order_index, 1);
    assert_ne!(stops[0].order_index, UNVISITED);
}

#[test]
fn plan_route_totals_the_closed_loop() {
    let mut stops = vec![TaskLocation::new(1, 3.0, 0.0), TaskLocation::new(2, 3.0, 4.0)];
    let mut depot = depot();
    let route = plan_route(&mut stops, &mut depot, MetricKind::Euclidean);
    assert_eq!(route.visiting_order(), vec![0, 1, 2, 0]);
    assert!((route.total_distance - 12.0).abs() < 1e-9);
    assert!((route_distance(&route.stops, &Euclidean) - 12.0).abs() < 1e-9);
}

#[test]
fn haversine_metric_changes_the_choice() {
    // Near the pole a degree of longitude is short; planar distance disagrees
    let mut stops = vec![TaskLocation::new(1, 89.0, 40.0), TaskLocation::new(2, 88.0, 0.0)];
    let mut depot = TaskLocation::new(0, 89.0, 0.0);
    let planar = optimize_route_with(&mut stops.clone(), &mut depot.clone(), &Euclidean);
    let spherical = optimize_route_with(&mut stops, &mut depot, &Haversine);
    assert_eq!(planar[1].task_id, 2);
    assert_eq!(spherical[1].task_id, 1);
}
