//! Field-service route sequencing.
//!
//! A greedy nearest-neighbour walk from a depot through every stop and back.
//! It is a heuristic for the tens of stops a technician visits in a day, not
//! a travelling-salesman solver.

use crate::config::MetricKind;
use crate::task::{Task, TaskId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const UNVISITED: i32 = -1;

const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLocation {
    pub task_id: TaskId,
    #[serde(default)]
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "unvisited")]
    pub order_index: i32,
    #[serde(skip)]
    pub visited: bool,
}

fn unvisited() -> i32 {
    UNVISITED
}

impl TaskLocation {
    pub fn new(task_id: TaskId, x: f64, y: f64) -> Self {
        Self {
            task_id,
            label: String::new(),
            x,
            y,
            order_index: UNVISITED,
            visited: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

pub trait DistanceMetric {
    fn distance(&self, from: &TaskLocation, to: &TaskLocation) -> f64;
}

/// Planar distance between mock or projected coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, from: &TaskLocation, to: &TaskLocation) -> f64 {
        (to.x - from.x).hypot(to.y - from.y)
    }
}

/// Great-circle distance in km; `x` is latitude and `y` longitude, in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    fn distance(&self, from: &TaskLocation, to: &TaskLocation) -> f64 {
        let (lat1, lat2) = (from.x.to_radians(), to.x.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (to.y - from.y).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl DistanceMetric for MetricKind {
    fn distance(&self, from: &TaskLocation, to: &TaskLocation) -> f64 {
        match self {
            MetricKind::Euclidean => Euclidean.distance(from, to),
            MetricKind::Haversine => Haversine.distance(from, to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<TaskLocation>,
    pub total_distance: f64,
}

impl Route {
    pub fn visiting_order(&self) -> Vec<TaskId> {
        self.stops.iter().map(|stop| stop.task_id).collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

pub fn optimize_route(locations: &mut [TaskLocation], depot: &mut TaskLocation) -> Vec<TaskLocation> {
    optimize_route_with(locations, depot, &Euclidean)
}

/// Orders `locations` starting and ending at `depot`, writing each stop's
/// `order_index` in place (depot 0, stops 1..=n) and returning the closed
/// loop. Entries sharing the depot's task id are treated as the depot.
///
/// Ties on distance go to the lower task id, then to the earlier entry.
pub fn optimize_route_with(
    locations: &mut [TaskLocation],
    depot: &mut TaskLocation,
    metric: &dyn DistanceMetric,
) -> Vec<TaskLocation> {
    depot.order_index = 0;
    depot.visited = true;

    let mut unvisited: Vec<usize> = Vec::with_capacity(locations.len());
    for (idx, location) in locations.iter_mut().enumerate() {
        if location.task_id == depot.task_id {
            location.order_index = 0;
            location.visited = true;
        } else {
            location.order_index = UNVISITED;
            location.visited = false;
            unvisited.push(idx);
        }
    }

    let mut route = Vec::with_capacity(unvisited.len() + 2);
    route.push(depot.clone());
    let mut current = depot.clone();
    let mut next_index = 1;

    while !unvisited.is_empty() {
        let mut best_slot = 0;
        let mut best_distance = metric.distance(&current, &locations[unvisited[0]]);
        for (slot, &idx) in unvisited.iter().enumerate().skip(1) {
            let candidate = &locations[idx];
            let distance = metric.distance(&current, candidate);
            let closer = match distance.total_cmp(&best_distance) {
                Ordering::Less => true,
                Ordering::Equal => candidate.task_id < locations[unvisited[best_slot]].task_id,
                Ordering::Greater => false,
            };
            if closer {
                best_slot = slot;
                best_distance = distance;
            }
        }

        let idx = unvisited.remove(best_slot);
        let stop = &mut locations[idx];
        stop.order_index = next_index;
        stop.visited = true;
        next_index += 1;
        log::debug!(
            "route stop {} -> task {} ({:.3} away)",
            stop.order_index,
            stop.task_id,
            best_distance
        );
        current = stop.clone();
        route.push(current.clone());
    }

    if route.last().is_some_and(|last| last.task_id != depot.task_id) {
        route.push(depot.clone());
    }
    route
}

/// Sequence the stops and total up the closed-loop distance.
pub fn plan_route(
    locations: &mut [TaskLocation],
    depot: &mut TaskLocation,
    metric: MetricKind,
) -> Route {
    let stops = optimize_route_with(locations, depot, &metric);
    let total_distance = route_distance(&stops, &metric);
    log::info!(
        "route planned: {} stops, total distance {:.3}",
        stops.len(),
        total_distance
    );
    Route {
        stops,
        total_distance,
    }
}

pub fn route_distance(stops: &[TaskLocation], metric: &dyn DistanceMetric) -> f64 {
    stops
        .windows(2)
        .map(|pair| metric.distance(&pair[0], &pair[1]))
        .sum()
}

/// Supplies coordinates for a task's site.
pub trait Geocoder {
    fn locate(&mut self, task: &Task) -> Option<(f64, f64)>;
}

/// Seeded random coordinates inside a bounding box, for demos and tests.
#[derive(Debug, Clone)]
pub struct MockGeocoder {
    rng: StdRng,
    min: (f64, f64),
    max: (f64, f64),
}

impl MockGeocoder {
    pub fn new(seed: u64) -> Self {
        Self::with_bounds(seed, (0.0, 0.0), (100.0, 100.0))
    }

    pub fn with_bounds(seed: u64, min: (f64, f64), max: (f64, f64)) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min,
            max,
        }
    }

    fn coordinate(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.rng.random_range(low..high)
        } else {
            low
        }
    }
}

impl Geocoder for MockGeocoder {
    fn locate(&mut self, _task: &Task) -> Option<(f64, f64)> {
        let x = self.coordinate(self.min.0, self.max.0);
        let y = self.coordinate(self.min.1, self.max.1);
        Some((x, y))
    }
}

/// Geocode every task; tasks the geocoder cannot place are left out.
pub fn locate_tasks(tasks: &[Task], geocoder: &mut dyn Geocoder) -> Vec<TaskLocation> {
    tasks
        .iter()
        .filter_map(|task| match geocoder.locate(task) {
            Some((x, y)) => Some(TaskLocation::new(task.id, x, y).with_label(task.name.clone())),
            None => {
                log::warn!("no location for task {}", task.id);
                None
            }
        })
        .collect()
}
