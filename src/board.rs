//! Board query engine.
//!
//! The board owns every `Site` keyed by `SiteId` and is the only place
//! occupancy is recorded. Iteration is always in ascending site order, which
//! makes every query below deterministic.

use crate::location::*;
use crate::world::*;
use log::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize)]
pub struct Board {
    sites: BTreeMap<SiteId, Site>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            sites: BTreeMap::new(),
        }
    }

    pub fn from_layout(layout: &[SiteLayout]) -> Self {
        let mut board = Board::new();
        for entry in layout {
            if board.sites.contains_key(&entry.id) {
                warn!("Duplicate site {} in layout, keeping the last one", entry.id);
            }
            board
                .sites
                .insert(entry.id, Site::new(entry.id, entry.location, entry.radius));
        }
        board
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(&id)
    }

    pub fn site_mut(&mut self, id: SiteId) -> Option<&mut Site> {
        self.sites.get_mut(&id)
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn structure_at(&self, id: SiteId) -> Option<&Structure> {
        self.site(id).and_then(|site| site.structure.as_ref())
    }

    /// Forgets everything observed on the previous tick. Geometry is kept.
    pub fn clear_tick_state(&mut self) {
        for site in self.sites.values_mut() {
            site.structure = None;
            site.gold_remaining = -1;
            site.max_gold_rate = -1;
        }
    }

    /// Nearest site with no structure on it. With `require_minable` only
    /// sites with gold left qualify. Equal distances resolve to the lowest id.
    pub fn closest_unused_site(&self, origin: Location, require_minable: bool) -> Option<&Site> {
        self.sites()
            .filter(|site| site.is_unused())
            .filter(|site| !require_minable || site.is_minable())
            .map(|site| (origin.distance_to(site.location), site))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, site)| site)
    }

    /// First mine owned by `player` that is below its site's maximum rate.
    pub fn first_unmaxed_mine(&self, player: &Player) -> Option<&Site> {
        player
            .mines
            .iter()
            .filter_map(|id| self.site(*id))
            .find(|site| match site.structure {
                Some(structure) => structure.income_rate() < site.max_gold_rate,
                None => false,
            })
    }
}

/// True if any unit in `enemy_units` is strictly closer than `radius` to `point`.
pub fn threat_near(point: Location, enemy_units: &[Unit], radius: f64) -> bool {
    enemy_units
        .iter()
        .any(|unit| unit.location.distance_to(point) < radius)
}
