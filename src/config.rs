use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Tunables for the path planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Distance covered per expansion.
    pub step_length: f64,
    /// Clearance added to every site radius.
    pub agent_radius: f64,
    pub max_expansions: usize,
    pub arrival_tolerance: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            step_length: QUEEN_STEP,
            agent_radius: QUEEN_RADIUS,
            max_expansions: MAX_EXPANSIONS,
            arrival_tolerance: ARRIVAL_TOLERANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub threat_radius: f64,
    pub barracks_target: usize,
    pub income_target: i32,
    pub retreat_distance: f64,
    pub path: PathConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            threat_radius: THREAT_RADIUS,
            barracks_target: BARRACKS_TARGET,
            income_target: INCOME_TARGET,
            retreat_distance: RETREAT_DISTANCE,
            path: PathConfig::default(),
        }
    }
}
