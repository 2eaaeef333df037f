//! Per-tick orchestration.
//!
//! `Agent` owns the only cross-tick state (the training flag) and turns a
//! refreshed `WorldState` into the queen command and the TRAIN command.
//! `run` drives a whole game over any reader/writer pair.

use crate::board::*;
use crate::config::*;
use crate::error::*;
use crate::location::*;
use crate::policy::*;
use crate::protocol::{self, TokenReader};
use crate::search::*;
use crate::world::*;
use log::*;
use std::io::{BufRead, Write};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnActions {
    pub queen: QueenAction,
    pub train: TrainOrder,
}

pub struct Agent {
    config: AgentConfig,
    training: TrainingState,
    ticks: u64,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Agent {
            config,
            training: TrainingState::default(),
            ticks: 0,
        }
    }

    pub fn training(&self) -> &TrainingState {
        &self.training
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn act(&mut self, world: &WorldState) -> TurnActions {
        self.ticks += 1;

        if log_enabled!(Level::Trace) {
            match serde_json::to_string(world) {
                Ok(json) => trace!("World at tick {}: {}", self.ticks, json),
                Err(err) => warn!("Failed to dump world state: {}", err),
            }
        }

        let mut queen = choose_build(world, &self.config);
        if queen == QueenAction::Wait {
            if let Some(to) = self.retreat_step(world) {
                queen = QueenAction::Move { to };
            }
        }

        let train = plan_training(world, &mut self.training);

        debug!(
            "Tick {}: {} / {} (gold left {}, next train knights={})",
            self.ticks, queen, train, train.gold_left, self.training.build_knights
        );

        TurnActions { queen, train }
    }

    /// Next step away from enemy knights closing on the queen, if any are.
    fn retreat_step(&self, world: &WorldState) -> Option<Location> {
        let queen = world.hero.queen?;
        let knights = &world.enemy.knights;
        let radius = self.config.threat_radius;

        if !threat_near(queen.location, knights, radius) {
            return None;
        }

        let close: Vec<Point> = knights
            .iter()
            .filter(|knight| knight.location.distance_to(queen.location) < radius)
            .map(|knight| knight.location.as_point())
            .collect();
        let centroid = close
            .iter()
            .fold(Point::default(), |sum, point| sum + *point)
            * (1.0 / close.len() as f64);

        let position = queen.location.as_point();
        let away = (position - centroid).normalized()?;
        let target = (position + away * self.config.retreat_distance).clamped_to_map();

        let plan = PathPlanner::new(&world.board, &self.config.path).plan(position, target);
        let step = plan.next_waypoint().round();
        if step == queen.location {
            debug!("Queen is threatened but has nowhere to go");
            return None;
        }

        info!(
            "Retreating from {} knight(s) toward {:?} via {:?}",
            close.len(),
            target.round(),
            step
        );
        Some(step)
    }
}

/// Plays a full game: reads the layout, then answers every tick until the
/// input ends. Returns the number of ticks played.
pub fn run<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    config: AgentConfig,
) -> Result<u64, ProtocolError> {
    let mut reader = TokenReader::new(input);
    let layout = protocol::read_layout(&mut reader)?;
    info!("Loaded {} sites", layout.len());

    let mut world = WorldState::new(&layout);
    let mut agent = Agent::new(config);

    while let Some(snapshot) = protocol::read_tick(&mut reader, layout.len())? {
        world.apply(&snapshot)?;
        let actions = agent.act(&world);
        protocol::write_turn(&mut output, &actions.queen, &actions.train)?;
    }

    info!("Input closed after {} ticks", agent.ticks());
    Ok(agent.ticks())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::*;

    fn crowded_world(enemies: Vec<Unit>) -> WorldState {
        // Every site is taken, so the ladder has nothing to build.
        let mut world = WorldState::new(&layout(&[(0, 1500, 800, 60), (1, 1700, 800, 60)]));
        let mut units = vec![unit(800, 500, Owner::Hero, UnitKind::Queen)];
        units.extend(enemies);
        world
            .apply(&TickSnapshot {
                gold: 0,
                touched_site: None,
                sites: vec![
                    built_site(0, Owner::Hero, StructureKind::barracks(UnitKind::Knight, 2)),
                    built_site(1, Owner::Hero, StructureKind::barracks(UnitKind::Archer, 2)),
                ],
                units,
            })
            .unwrap();
        world
    }

    #[test]
    fn idle_queen_without_threat_waits() {
        let world = crowded_world(vec![]);
        let mut agent = Agent::new(AgentConfig::default());

        let actions = agent.act(&world);
        assert_eq!(actions.queen, QueenAction::Wait);
        assert!(actions.train.sites.is_empty());
    }

    #[test]
    fn threatened_queen_moves_away_from_knights() {
        let world = crowded_world(vec![
            unit(900, 480, Owner::Enemy, UnitKind::Knight),
            unit(900, 520, Owner::Enemy, UnitKind::Knight),
        ]);
        let mut agent = Agent::new(AgentConfig::default());

        match agent.act(&world).queen {
            QueenAction::Move { to } => {
                assert!(to.x() < 800, "{:?}", to);
                assert!(to.distance_to(Location::new(800, 500)) <= 61.0);
            }
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn queen_cornered_against_map_edge_waits() {
        let mut world = WorldState::new(&layout(&[]));
        world
            .apply(&TickSnapshot {
                gold: 0,
                touched_site: None,
                sites: vec![],
                units: vec![
                    unit(0, 500, Owner::Hero, UnitKind::Queen),
                    unit(100, 500, Owner::Enemy, UnitKind::Knight),
                ],
            })
            .unwrap();
        let mut agent = Agent::new(AgentConfig::default());

        assert_eq!(agent.act(&world).queen, QueenAction::Wait);
    }

    #[test]
    fn knight_on_top_of_queen_leaves_no_direction() {
        let world = crowded_world(vec![unit(800, 500, Owner::Enemy, UnitKind::Knight)]);
        let mut agent = Agent::new(AgentConfig::default());

        assert_eq!(agent.act(&world).queen, QueenAction::Wait);
    }

    #[test]
    fn missing_queen_never_retreats() {
        let mut world = WorldState::new(&layout(&[(0, 1500, 800, 60)]));
        world
            .apply(&TickSnapshot {
                gold: 0,
                touched_site: None,
                sites: vec![empty_site(0, 50)],
                units: vec![unit(800, 500, Owner::Enemy, UnitKind::Knight)],
            })
            .unwrap();
        let mut agent = Agent::new(AgentConfig::default());

        let actions = agent.act(&world);
        assert_eq!(actions.queen, QueenAction::Wait);
        assert!(actions.train.sites.is_empty());
    }

    #[test]
    fn training_flag_persists_between_ticks() {
        let mut world = WorldState::new(&layout(&[(0, 1500, 800, 60), (1, 1700, 800, 60)]));
        let snapshot = TickSnapshot {
            gold: 100,
            touched_site: None,
            sites: vec![
                built_site(0, Owner::Hero, StructureKind::barracks(UnitKind::Knight, 0)),
                built_site(1, Owner::Hero, StructureKind::barracks(UnitKind::Archer, 0)),
            ],
            units: vec![unit(800, 500, Owner::Hero, UnitKind::Queen)],
        };
        let mut agent = Agent::new(AgentConfig::default());

        world.apply(&snapshot).unwrap();
        assert_eq!(agent.act(&world).train.sites, vec![SiteId(0)]);
        assert!(!agent.training().build_knights);

        world.apply(&snapshot).unwrap();
        assert_eq!(agent.act(&world).train.sites, vec![SiteId(1)]);
        assert!(agent.training().build_knights);
        assert_eq!(agent.ticks(), 2);
    }
}
