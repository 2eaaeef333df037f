//! Build ladder and barracks training.
//!
//! `choose_build` walks a fixed list of guarded rules and returns the first
//! one that applies. `plan_training` spends gold on idle barracks, alternating
//! between knight and archer production.

use crate::board::*;
use crate::config::*;
use crate::location::*;
use crate::world::*;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum BuildKind {
    Mine,
    Tower,
    BarracksKnight,
    BarracksArcher,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum QueenAction {
    Build { site: SiteId, kind: BuildKind },
    Move { to: Location },
    Wait,
}

/// Barracks chosen to train this tick and the gold left afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrainOrder {
    pub sites: Vec<SiteId>,
    pub gold_left: i32,
}

/// The only state the agent keeps between ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Next unit to train: knights when set, archers otherwise.
    pub build_knights: bool,
}

impl Default for TrainingState {
    fn default() -> Self {
        TrainingState {
            build_knights: true,
        }
    }
}

/// Picks this tick's BUILD (or WAIT) for the hero queen.
pub fn choose_build(world: &WorldState, config: &AgentConfig) -> QueenAction {
    let hero = &world.hero;
    let board = &world.board;
    let origin = hero.queen.map(|queen| queen.location);

    let closest_unused = origin.and_then(|origin| board.closest_unused_site(origin, false));

    if hero.barracks.len() < config.barracks_target {
        // No cascade: without a free site the queen waits this tick.
        return match closest_unused {
            Some(site) => {
                let kind = if hero.barracks.is_empty() {
                    BuildKind::BarracksKnight
                } else {
                    BuildKind::BarracksArcher
                };
                debug!(
                    "Ladder: barracks {} of {} at {}",
                    hero.barracks.len() + 1,
                    config.barracks_target,
                    site.id
                );
                QueenAction::Build {
                    site: site.id,
                    kind,
                }
            }
            None => {
                debug!("Ladder: want barracks but no free site");
                QueenAction::Wait
            }
        };
    }

    if let Some(site) = closest_unused {
        if hero.towers.is_empty() {
            debug!("Ladder: first tower at {}", site.id);
            return QueenAction::Build {
                site: site.id,
                kind: BuildKind::Tower,
            };
        }
    }

    if let (Some(&tower), Some(origin)) = (hero.towers.first(), origin) {
        if threat_near(origin, &world.enemy.knights, config.threat_radius) {
            debug!("Ladder: knights near queen, reinforcing tower {}", tower);
            return QueenAction::Build {
                site: tower,
                kind: BuildKind::Tower,
            };
        }
    }

    if let Some(site) = board.first_unmaxed_mine(hero) {
        debug!("Ladder: upgrading mine {}", site.id);
        return QueenAction::Build {
            site: site.id,
            kind: BuildKind::Mine,
        };
    }

    if hero.income_rate < config.income_target {
        if let Some(site) = origin.and_then(|origin| board.closest_unused_site(origin, true)) {
            debug!("Ladder: new mine at {} (income {})", site.id, hero.income_rate);
            return QueenAction::Build {
                site: site.id,
                kind: BuildKind::Mine,
            };
        }
    }

    QueenAction::Wait
}

/// Chooses which hero barracks train this tick. Barracks are visited in site
/// order; one trains when it is idle, affordable and produces the unit the
/// flag asks for. Every successful train flips the flag.
pub fn plan_training(world: &WorldState, state: &mut TrainingState) -> TrainOrder {
    let mut gold = world.hero.gold.unwrap_or(0);
    let mut sites = Vec::new();

    for &id in &world.hero.barracks {
        let kind = world.board.structure_at(id).map(|structure| structure.kind);
        let (unit, time_until_idle, train_cost) = match kind {
            Some(StructureKind::Barracks {
                unit,
                time_until_idle,
                train_cost,
            }) => (unit, time_until_idle, train_cost),
            _ => continue,
        };

        if time_until_idle != 0 || gold < train_cost {
            continue;
        }

        if (unit == UnitKind::Knight) != state.build_knights {
            trace!("Barracks {} idle but flag wants the other unit type", id);
            continue;
        }

        sites.push(id);
        gold -= train_cost;
        state.build_knights = !state.build_knights;
    }

    TrainOrder {
        sites,
        gold_left: gold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::*;

    /// Queen at (100, 100). Sites are listed as (id, x, y).
    fn world(
        gold: i32,
        sites: &[(u32, i32, i32)],
        snapshot: Vec<SiteSnapshot>,
        enemies: Vec<Unit>,
    ) -> WorldState {
        let layout_entries: Vec<(u32, i32, i32, i32)> =
            sites.iter().map(|&(id, x, y)| (id, x, y, 40)).collect();
        let mut world = WorldState::new(&layout(&layout_entries));
        let mut units = vec![unit(100, 100, Owner::Hero, UnitKind::Queen)];
        units.extend(enemies);
        world
            .apply(&TickSnapshot {
                gold,
                touched_site: None,
                sites: snapshot,
                units,
            })
            .unwrap();
        world
    }

    fn knight_barracks(id: u32) -> SiteSnapshot {
        built_site(id, Owner::Hero, StructureKind::barracks(UnitKind::Knight, 0))
    }

    fn archer_barracks(id: u32) -> SiteSnapshot {
        built_site(id, Owner::Hero, StructureKind::barracks(UnitKind::Archer, 0))
    }

    fn hero_tower(id: u32) -> SiteSnapshot {
        built_site(
            id,
            Owner::Hero,
            StructureKind::Tower {
                health: 200,
                attack_radius: 150,
            },
        )
    }

    #[test]
    fn first_barracks_trains_knights() {
        let world = world(100, &[(4, 200, 100)], vec![empty_site(4, 50)], vec![]);

        let action = choose_build(&world, &AgentConfig::default());
        assert_eq!(
            action,
            QueenAction::Build {
                site: SiteId(4),
                kind: BuildKind::BarracksKnight
            }
        );
    }

    #[test]
    fn second_barracks_trains_archers() {
        let world = world(
            100,
            &[(4, 200, 100), (5, 900, 900)],
            vec![empty_site(4, 50), knight_barracks(5)],
            vec![],
        );

        let action = choose_build(&world, &AgentConfig::default());
        assert_eq!(
            action,
            QueenAction::Build {
                site: SiteId(4),
                kind: BuildKind::BarracksArcher
            }
        );
    }

    #[test]
    fn missing_barracks_without_free_site_waits() {
        // An unmaxed mine exists, but the barracks rule does not fall through.
        let world = world(
            100,
            &[(0, 500, 500)],
            vec![built_site(0, Owner::Hero, StructureKind::Mine { income_rate: 1 })],
            vec![],
        );

        assert_eq!(choose_build(&world, &AgentConfig::default()), QueenAction::Wait);
    }

    #[test]
    fn missing_queen_waits_for_barracks() {
        let mut world = WorldState::new(&layout(&[(0, 500, 500, 40)]));
        world
            .apply(&TickSnapshot {
                gold: 100,
                touched_site: None,
                sites: vec![empty_site(0, 50)],
                units: vec![unit(900, 500, Owner::Enemy, UnitKind::Queen)],
            })
            .unwrap();

        assert!(world.hero.queen.is_none());
        assert_eq!(choose_build(&world, &AgentConfig::default()), QueenAction::Wait);
    }

    #[test]
    fn first_tower_after_barracks() {
        let world = world(
            0,
            &[(1, 800, 800), (2, 900, 800), (7, 250, 100), (8, 600, 100)],
            vec![knight_barracks(1), archer_barracks(2), empty_site(7, 50), empty_site(8, 50)],
            vec![],
        );

        assert_eq!(
            choose_build(&world, &AgentConfig::default()),
            QueenAction::Build {
                site: SiteId(7),
                kind: BuildKind::Tower
            }
        );
    }

    #[test]
    fn threatened_queen_reinforces_first_tower() {
        let tower = StructureKind::Tower {
            health: 200,
            attack_radius: 150,
        };
        let world = world(
            0,
            &[(1, 800, 800), (2, 900, 800), (3, 300, 300), (6, 600, 300), (9, 1200, 300)],
            vec![
                knight_barracks(1),
                archer_barracks(2),
                built_site(3, Owner::Hero, tower),
                built_site(6, Owner::Hero, tower),
                empty_site(9, 50),
            ],
            vec![unit(250, 100, Owner::Enemy, UnitKind::Knight)],
        );

        assert_eq!(
            choose_build(&world, &AgentConfig::default()),
            QueenAction::Build {
                site: SiteId(3),
                kind: BuildKind::Tower
            }
        );
    }

    #[test]
    fn distant_knights_do_not_trigger_reinforcement() {
        let world = world(
            0,
            &[(1, 800, 800), (2, 900, 800), (3, 300, 300)],
            vec![
                knight_barracks(1),
                archer_barracks(2),
                hero_tower(3),
            ],
            vec![unit(300, 100, Owner::Enemy, UnitKind::Knight)],
        );

        assert_eq!(choose_build(&world, &AgentConfig::default()), QueenAction::Wait);
    }

    #[test]
    fn unmaxed_mine_is_upgraded() {
        let world = world(
            0,
            &[(1, 800, 800), (2, 900, 800), (3, 300, 300), (4, 400, 400)],
            vec![
                knight_barracks(1),
                archer_barracks(2),
                hero_tower(3),
                built_site(4, Owner::Hero, StructureKind::Mine { income_rate: 2 }),
            ],
            vec![],
        );

        assert_eq!(
            choose_build(&world, &AgentConfig::default()),
            QueenAction::Build {
                site: SiteId(4),
                kind: BuildKind::Mine
            }
        );
    }

    #[test]
    fn low_income_claims_nearest_minable_site() {
        let world = world(
            0,
            &[(1, 800, 800), (2, 900, 800), (3, 300, 300), (4, 150, 100), (5, 700, 100)],
            vec![
                knight_barracks(1),
                archer_barracks(2),
                hero_tower(3),
                empty_site(4, 0),
                empty_site(5, 90),
            ],
            vec![],
        );

        assert_eq!(
            choose_build(&world, &AgentConfig::default()),
            QueenAction::Build {
                site: SiteId(5),
                kind: BuildKind::Mine
            }
        );
    }

    #[test]
    fn enough_income_waits() {
        let mine = StructureKind::Mine { income_rate: 3 };
        let world = world(
            0,
            &[
                (1, 800, 800),
                (2, 900, 800),
                (3, 300, 300),
                (4, 400, 400),
                (5, 500, 500),
                (6, 600, 600),
                (7, 700, 100),
            ],
            vec![
                knight_barracks(1),
                archer_barracks(2),
                hero_tower(3),
                built_site(4, Owner::Hero, mine),
                built_site(5, Owner::Hero, mine),
                built_site(6, Owner::Hero, mine),
                empty_site(7, 90),
            ],
            vec![],
        );

        assert_eq!(world.hero.income_rate, 9);
        assert_eq!(choose_build(&world, &AgentConfig::default()), QueenAction::Wait);
    }

    #[test]
    fn training_follows_the_flag() {
        let world = world(
            200,
            &[(0, 800, 800), (1, 900, 800)],
            vec![archer_barracks(0), knight_barracks(1)],
            vec![],
        );
        let mut state = TrainingState::default();

        let order = plan_training(&world, &mut state);

        assert_eq!(order.sites, vec![SiteId(1)]);
        assert_eq!(order.gold_left, 120);
        assert!(!state.build_knights);
    }

    #[test]
    fn alternating_barracks_can_train_in_one_tick() {
        let world = world(
            200,
            &[(0, 800, 800), (1, 900, 800)],
            vec![knight_barracks(0), archer_barracks(1)],
            vec![],
        );
        let mut state = TrainingState::default();

        let order = plan_training(&world, &mut state);

        assert_eq!(order.sites, vec![SiteId(0), SiteId(1)]);
        assert_eq!(order.gold_left, 20);
        assert!(state.build_knights);
    }

    #[test]
    fn busy_or_unaffordable_barracks_do_not_flip_the_flag() {
        let world = world(
            90,
            &[(0, 800, 800), (1, 900, 800)],
            vec![
                built_site(0, Owner::Hero, StructureKind::barracks(UnitKind::Knight, 4)),
                archer_barracks(1),
            ],
            vec![],
        );
        let mut state = TrainingState {
            build_knights: false,
        };

        let order = plan_training(&world, &mut state);

        assert!(order.sites.is_empty());
        assert_eq!(order.gold_left, 90);
        assert!(!state.build_knights);
    }

    #[test]
    fn enemy_barracks_are_never_trained() {
        let world = world(
            500,
            &[(0, 800, 800)],
            vec![built_site(0, Owner::Enemy, StructureKind::barracks(UnitKind::Knight, 0))],
            vec![],
        );
        let mut state = TrainingState::default();

        assert!(plan_training(&world, &mut state).sites.is_empty());
        assert!(state.build_knights);
    }
}
