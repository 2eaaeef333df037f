//! Path planner for queen movement.
//!
//! `PathPlanner` runs a best-first search over the continuous map. Each node
//! branches into up to seven successors stepped along the bearing to the
//! target and along that bearing rotated by ±27°, ±54° and ±81°. Successors
//! that land inside a site footprint (site radius plus agent radius) are
//! pushed radially out of it before being scored. Only successors that
//! strictly reduce the remaining distance are kept, so the search always
//! makes progress. It stops after a fixed number of expansions and then
//! returns the best node seen.

use crate::board::*;
use crate::config::*;
use crate::constants::*;
use crate::location::*;
use fnv::FnvHashSet;
use log::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Counters describing a single search, for logging and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expansions: usize,
    pub generated: usize,
    pub rejected: usize,
    /// The expansion cap stopped the search before it finished.
    pub capped: bool,
}

/// Result of a search. `waypoints` excludes the start position.
#[derive(Clone, Debug)]
pub struct PathPlan {
    pub start: Point,
    pub waypoints: Vec<Point>,
    pub reached: bool,
    pub stats: SearchStats,
}

impl PathPlan {
    /// Where to move this tick. Falls back to the start when no step exists.
    pub fn next_waypoint(&self) -> Point {
        self.waypoints.first().copied().unwrap_or(self.start)
    }

    /// Final position of the path.
    pub fn end(&self) -> Point {
        self.waypoints.last().copied().unwrap_or(self.start)
    }
}

struct SearchNode {
    point: Point,
    remaining: f64,
    parent: Option<usize>,
}

/// Frontier entry. Ordered so the max-heap pops the lowest heuristic, then the
/// smallest remaining distance, then the oldest entry.
struct FrontierEntry {
    heuristic: u32,
    remaining: f64,
    sequence: usize,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .heuristic
            .cmp(&self.heuristic)
            .then_with(|| other.remaining.total_cmp(&self.remaining))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

pub struct PathPlanner<'a> {
    board: &'a Board,
    config: &'a PathConfig,
}

impl<'a> PathPlanner<'a> {
    pub fn new(board: &'a Board, config: &'a PathConfig) -> Self {
        PathPlanner { board, config }
    }

    /// Number of steps still needed to cover `remaining`.
    pub fn heuristic(&self, remaining: f64) -> u32 {
        (remaining / self.config.step_length).ceil().max(0.0) as u32
    }

    /// Plans a path from `start` toward `target`. Always returns a plan; when
    /// the target cannot be reached the path ends at the closest node found.
    pub fn plan(&self, start: Point, target: Point) -> PathPlan {
        let mut stats = SearchStats::default();

        if !start.is_finite() || !target.is_finite() || self.config.step_length <= 0.0 {
            warn!("Refusing to plan from {:?} to {:?}", start, target);
            return PathPlan {
                start,
                waypoints: Vec::new(),
                reached: false,
                stats,
            };
        }

        let start_remaining = start.distance_to(target);
        let mut nodes = vec![SearchNode {
            point: start,
            remaining: start_remaining,
            parent: None,
        }];
        let mut visited: FnvHashSet<Location> = FnvHashSet::default();
        visited.insert(start.round());

        let mut frontier = BinaryHeap::new();
        frontier.push(FrontierEntry {
            heuristic: self.heuristic(start_remaining),
            remaining: start_remaining,
            sequence: 0,
            node: 0,
        });
        let mut sequence = 1;

        let mut best = 0;
        let mut reached = None;

        while let Some(entry) = frontier.pop() {
            if stats.expansions >= self.config.max_expansions {
                stats.capped = true;
                break;
            }
            stats.expansions += 1;

            let current = nodes[entry.node].point;
            let remaining = nodes[entry.node].remaining;

            if remaining <= self.config.arrival_tolerance {
                reached = Some(entry.node);
                break;
            }

            for offset in BEARING_OFFSETS {
                stats.generated += 1;

                let candidate = match self.successor(current, target, offset) {
                    Some(candidate) => candidate,
                    None => {
                        stats.rejected += 1;
                        continue;
                    }
                };

                let candidate_remaining = candidate.distance_to(target);
                if candidate_remaining >= remaining - EPSILON {
                    trace!(
                        "Rejected {:?} (no progress, {:.1} left)",
                        candidate,
                        candidate_remaining
                    );
                    stats.rejected += 1;
                    continue;
                }

                if !visited.insert(candidate.round()) {
                    stats.rejected += 1;
                    continue;
                }

                let index = nodes.len();
                nodes.push(SearchNode {
                    point: candidate,
                    remaining: candidate_remaining,
                    parent: Some(entry.node),
                });

                if candidate_remaining < nodes[best].remaining {
                    best = index;
                }

                frontier.push(FrontierEntry {
                    heuristic: self.heuristic(candidate_remaining),
                    remaining: candidate_remaining,
                    sequence,
                    node: index,
                });
                sequence += 1;
            }
        }

        let goal = reached.unwrap_or(best);
        let waypoints = trace_back(&nodes, goal);

        debug!(
            "Path {:?} -> {:?}: reached={} waypoints={} expansions={} generated={} \
             rejected={} capped={}",
            start.round(),
            target.round(),
            reached.is_some(),
            waypoints.len(),
            stats.expansions,
            stats.generated,
            stats.rejected,
            stats.capped
        );

        PathPlan {
            start,
            waypoints,
            reached: reached.is_some(),
            stats,
        }
    }

    /// One step from `current` along the target bearing rotated by `offset`
    /// degrees, moved out of any footprint it lands in.
    fn successor(&self, current: Point, target: Point, offset: f64) -> Option<Point> {
        let bearing = target - current;
        let direction = bearing.normalized()?;
        let length = bearing.magnitude().min(self.config.step_length);
        let candidate = current + direction.rotated(offset) * length;

        self.push_out_of_footprints(candidate, direction)
    }

    /// Moves `point` radially out of every footprint it overlaps. `heading` is
    /// used to back away when the point sits exactly on a site centre. Returns
    /// `None` if no clear position was found.
    pub fn push_out_of_footprints(&self, point: Point, heading: Point) -> Option<Point> {
        let mut point = point.clamped_to_map();

        for _ in 0..PUSH_PASSES {
            let mut moved = false;

            for site in self.board.sites() {
                let center = site.location.as_point();
                let clearance = site.footprint_radius(self.config.agent_radius);
                let offset = point - center;
                if offset.magnitude() >= clearance {
                    continue;
                }

                let outward = offset.normalized().unwrap_or(heading * -1.0);
                point = (center + outward * (clearance + PUSH_MARGIN)).clamped_to_map();
                moved = true;
            }

            if !moved {
                break;
            }
        }

        if !point.is_finite() || self.overlaps_footprint(point) {
            return None;
        }

        Some(point)
    }

    pub fn overlaps_footprint(&self, point: Point) -> bool {
        self.board.sites().any(|site| {
            point.distance_to(site.location.as_point())
                < site.footprint_radius(self.config.agent_radius)
        })
    }
}

fn trace_back(nodes: &[SearchNode], goal: usize) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = goal;
    while let Some(parent) = nodes[current].parent {
        path.push(nodes[current].point);
        current = parent;
    }
    path.reverse();
    path
}
