//! World model: sites, structures, units and the two players.
//!
//! Everything except site geometry is a per-tick snapshot. `WorldState::apply`
//! wipes the previous tick's occupancy, structures and units before loading
//! the new ones, so nothing observed on an earlier tick stays reachable.

use crate::board::*;
use crate::constants::*;
use crate::error::*;
use crate::location::*;
use log::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Owner {
    Hero,
    Enemy,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum UnitKind {
    Queen,
    Knight,
    Archer,
    Giant,
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub location: Location,
    pub owner: Owner,
    pub kind: UnitKind,
    pub health: i32,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StructureKind {
    Mine {
        income_rate: i32,
    },
    Tower {
        health: i32,
        attack_radius: i32,
    },
    Barracks {
        unit: UnitKind,
        time_until_idle: i32,
        train_cost: i32,
    },
}

impl StructureKind {
    pub fn barracks(unit: UnitKind, time_until_idle: i32) -> Self {
        StructureKind::Barracks {
            unit,
            time_until_idle,
            train_cost: train_cost(unit),
        }
    }
}

/// A structure standing on a site. `site` refers back into the board.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Structure {
    pub owner: Owner,
    pub site: SiteId,
    pub kind: StructureKind,
}

impl Structure {
    pub fn income_rate(&self) -> i32 {
        match self.kind {
            StructureKind::Mine { income_rate } => income_rate,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Site {
    pub id: SiteId,
    pub location: Location,
    pub radius: i32,
    pub gold_remaining: i32,
    pub max_gold_rate: i32,
    pub structure: Option<Structure>,
}

impl Site {
    pub fn new(id: SiteId, location: Location, radius: i32) -> Self {
        Site {
            id,
            location,
            radius,
            gold_remaining: -1,
            max_gold_rate: -1,
            structure: None,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.structure.is_none()
    }

    /// Only sites with a known positive gold count are minable. The game
    /// reports `-1` for sites the queen has not seen yet.
    pub fn is_minable(&self) -> bool {
        self.gold_remaining > 0
    }

    /// Radius of the circle a unit of `clearance` radius cannot enter.
    pub fn footprint_radius(&self, clearance: f64) -> f64 {
        self.radius as f64 + clearance
    }
}

/// Fixed geometry of a site, read once at startup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SiteLayout {
    pub id: SiteId,
    pub location: Location,
    pub radius: i32,
}

/// Per-tick state of one site.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SiteSnapshot {
    pub id: SiteId,
    pub gold_remaining: i32,
    pub max_gold_rate: i32,
    pub structure: Option<(Owner, StructureKind)>,
}

/// Everything the game reports on a single tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSnapshot {
    pub gold: i32,
    pub touched_site: Option<SiteId>,
    pub sites: Vec<SiteSnapshot>,
    pub units: Vec<Unit>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Player {
    pub owner: Owner,
    /// Unknown for the enemy.
    pub gold: Option<i32>,
    pub income_rate: i32,
    pub touched_site: Option<SiteId>,
    pub barracks: Vec<SiteId>,
    pub towers: Vec<SiteId>,
    pub mines: Vec<SiteId>,
    pub queen: Option<Unit>,
    pub knights: Vec<Unit>,
    pub archers: Vec<Unit>,
    pub giants: Vec<Unit>,
}

impl Player {
    pub fn new(owner: Owner) -> Self {
        Player {
            owner,
            gold: None,
            income_rate: 0,
            touched_site: None,
            barracks: Vec::new(),
            towers: Vec::new(),
            mines: Vec::new(),
            queen: None,
            knights: Vec::new(),
            archers: Vec::new(),
            giants: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.gold = None;
        self.income_rate = 0;
        self.touched_site = None;
        self.barracks.clear();
        self.towers.clear();
        self.mines.clear();
        self.queen = None;
        self.knights.clear();
        self.archers.clear();
        self.giants.clear();
    }

    fn add_unit(&mut self, unit: Unit) {
        match unit.kind {
            UnitKind::Queen => self.queen = Some(unit),
            UnitKind::Knight => self.knights.push(unit),
            UnitKind::Archer => self.archers.push(unit),
            UnitKind::Giant => self.giants.push(unit),
        }
    }

    fn add_structure(&mut self, structure: &Structure) {
        match structure.kind {
            StructureKind::Mine { .. } => self.mines.push(structure.site),
            StructureKind::Tower { .. } => self.towers.push(structure.site),
            StructureKind::Barracks { .. } => self.barracks.push(structure.site),
        }
    }

    /// Sum of the income of every mine this player owns on `board`.
    pub fn compute_income_rate(&self, board: &Board) -> i32 {
        self.mines
            .iter()
            .filter_map(|id| board.structure_at(*id))
            .map(|structure| structure.income_rate())
            .sum()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldState {
    pub board: Board,
    pub hero: Player,
    pub enemy: Player,
}

impl WorldState {
    pub fn new(layout: &[SiteLayout]) -> Self {
        WorldState {
            board: Board::from_layout(layout),
            hero: Player::new(Owner::Hero),
            enemy: Player::new(Owner::Enemy),
        }
    }

    pub fn player(&self, owner: Owner) -> &Player {
        match owner {
            Owner::Hero => &self.hero,
            Owner::Enemy => &self.enemy,
        }
    }

    fn player_mut(&mut self, owner: Owner) -> &mut Player {
        match owner {
            Owner::Hero => &mut self.hero,
            Owner::Enemy => &mut self.enemy,
        }
    }

    /// Replaces all per-tick state with `snapshot`.
    pub fn apply(&mut self, snapshot: &TickSnapshot) -> Result<(), ProtocolError> {
        self.board.clear_tick_state();
        self.hero.clear();
        self.enemy.clear();

        self.hero.gold = Some(snapshot.gold);
        self.hero.touched_site = snapshot.touched_site;

        for entry in &snapshot.sites {
            let site = self
                .board
                .site_mut(entry.id)
                .ok_or(ProtocolError::UnknownSite(entry.id.0 as i64))?;

            site.gold_remaining = entry.gold_remaining;
            site.max_gold_rate = entry.max_gold_rate;
            site.structure = entry.structure.map(|(owner, kind)| Structure {
                owner,
                site: entry.id,
                kind,
            });
        }

        // Ownership lists are rebuilt from the board so they come out in site order.
        let structures: Vec<Structure> = self
            .board
            .sites()
            .filter_map(|site| site.structure)
            .collect();
        for structure in &structures {
            self.player_mut(structure.owner).add_structure(structure);
        }

        for unit in &snapshot.units {
            self.player_mut(unit.owner).add_unit(*unit);
        }

        self.hero.income_rate = self.hero.compute_income_rate(&self.board);
        self.enemy.income_rate = self.enemy.compute_income_rate(&self.board);

        if self.hero.queen.is_none() {
            warn!("No hero queen reported this tick");
        }

        debug!(
            "Tick state: gold={} income={} barracks={} towers={} mines={} enemy_knights={}",
            snapshot.gold,
            self.hero.income_rate,
            self.hero.barracks.len(),
            self.hero.towers.len(),
            self.hero.mines.len(),
            self.enemy.knights.len()
        );

        Ok(())
    }
}
