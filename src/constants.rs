pub const MAP_WIDTH: i32 = 1920;
pub const MAP_HEIGHT: i32 = 1000;

/// Collision radius of a queen. Site footprints are inflated by this much
/// when planning movement.
pub const QUEEN_RADIUS: f64 = 30.0;

/// Distance a queen covers in one tick.
pub const QUEEN_STEP: f64 = 60.0;

pub const KNIGHT_TRAIN_COST: i32 = 80;
pub const ARCHER_TRAIN_COST: i32 = 100;
pub const GIANT_TRAIN_COST: i32 = 140;

/// Enemy knights closer than this to the queen count as a threat.
pub const THREAT_RADIUS: f64 = 200.0;

/// Number of barracks built before anything else.
pub const BARRACKS_TARGET: usize = 2;

/// Income below which the agent keeps claiming new mines.
pub const INCOME_TARGET: i32 = 8;

/// How far the queen tries to run from approaching knights.
pub const RETREAT_DISTANCE: f64 = 300.0;

/// Upper bound on planner expansions per search.
pub const MAX_EXPANSIONS: usize = 200;

/// A node this close to the target counts as arrived.
pub const ARRIVAL_TOLERANCE: f64 = 1.0;

/// Bearing offsets (degrees) sampled around the direct heading, in the
/// order successors are generated.
pub const BEARING_OFFSETS: [f64; 7] = [0.0, 27.0, -27.0, 54.0, -54.0, 81.0, -81.0];

/// Extra clearance added when pushing a point out of a footprint so the
/// result lands strictly outside it.
pub const PUSH_MARGIN: f64 = 0.5;

/// Passes over all sites when resolving footprint overlaps.
pub const PUSH_PASSES: usize = 3;

/// Smallest vector length treated as a usable direction.
pub const EPSILON: f64 = 1e-6;

/// Train cost of a barracks producing the given unit kind.
pub fn train_cost(unit: crate::world::UnitKind) -> i32 {
    use crate::world::UnitKind;

    match unit {
        UnitKind::Knight => KNIGHT_TRAIN_COST,
        UnitKind::Archer => ARCHER_TRAIN_COST,
        UnitKind::Giant => GIANT_TRAIN_COST,
        UnitKind::Queen => 0,
    }
}
