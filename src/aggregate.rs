//! Summing the crafting materials a loadout needs

use std::collections::BTreeMap;
use std::ops::Index;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::loadout::{Loadout, LoadoutItem, LoadoutWeapon};
use crate::models::{crafts_needed, CraftingMaterial};

/// Required quantity per material display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawResources(BTreeMap<String, u64>);

impl RawResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `delta` units of `name`. Zero deltas add no entry.
    pub fn add(&mut self, name: &str, delta: u64) {
        if delta == 0 {
            return;
        }
        *self.0.entry(name.to_string()).or_default() += delta;
    }

    fn add_materials(&mut self, materials: &[CraftingMaterial], multiplier: u64) {
        for m in materials {
            self.add(&m.material, u64::from(m.quantity) * multiplier);
        }
    }

    /// Pointwise sum with another mapping.
    pub fn merge(&mut self, other: &RawResources) {
        for (name, qty) in &other.0 {
            self.add(name, *qty);
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl Index<&str> for RawResources {
    type Output = u64;

    fn index(&self, name: &str) -> &u64 {
        &self.0[name]
    }
}

impl<'a> FromIterator<(&'a str, u64)> for RawResources {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut resources = RawResources::new();
        for (name, qty) in iter {
            resources.add(name, qty);
        }
        resources
    }
}

/// Materials for one loadout entry, used when grouping by item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResources {
    pub label: String,
    pub resources: RawResources,
}

/// Total materials for every slot of the loadout.
pub fn aggregate(loadout: &Loadout, catalog: &Catalog) -> RawResources {
    let mut total = RawResources::new();
    for item in aggregate_per_item(loadout, catalog) {
        total.merge(&item.resources);
    }
    total
}

/// Materials per loadout entry, in slot order. Entries whose ids don't
/// resolve in the catalog are left out.
pub fn aggregate_per_item(loadout: &Loadout, catalog: &Catalog) -> Vec<ItemResources> {
    let mut items = Vec::new();

    let weapons = [
        (&loadout.weapon1, "Primary"),
        (&loadout.weapon2, "Secondary"),
    ];
    for (slot, role) in weapons {
        if let Some(selection) = slot {
            if let Some(item) = weapon_resources(selection, role, catalog) {
                items.push(item);
            }
        }
    }

    for id in [&loadout.augment, &loadout.shield].into_iter().flatten() {
        match catalog.equipment(id) {
            Some(equipment) => {
                let mut resources = RawResources::new();
                resources.add_materials(&equipment.crafting.materials, 1);
                items.push(ItemResources {
                    label: equipment.name.clone(),
                    resources,
                });
            }
            None => debug!(id = %id, "skipping unknown equipment"),
        }
    }

    let stacks = [
        &loadout.healing,
        &loadout.grenades,
        &loadout.utilities,
        &loadout.traps,
    ];
    for entry in stacks.into_iter().flatten() {
        if let Some(item) = stack_resources(entry, catalog) {
            items.push(item);
        }
    }

    for entry in &loadout.ammo {
        let Some(ammo) = catalog.ammo_by_name(&entry.ammo_type) else {
            debug!(ammo = %entry.ammo_type, "skipping unknown ammo type");
            continue;
        };
        let crafts = crafts_needed(
            u64::from(entry.quantity),
            ammo.crafting.output_per_craft(),
        );
        let mut resources = RawResources::new();
        resources.add_materials(&ammo.crafting.materials, crafts);
        items.push(ItemResources {
            label: format!("{} x{}", ammo.name, entry.quantity),
            resources,
        });
    }

    items
}

/// Base recipe, cumulative upgrade stages up to the selected tier, and fitted mods.
fn weapon_resources(
    selection: &LoadoutWeapon,
    role: &str,
    catalog: &Catalog,
) -> Option<ItemResources> {
    let Some(weapon) = catalog.weapon(&selection.id) else {
        debug!(id = %selection.id, "skipping unknown weapon");
        return None;
    };

    let mut resources = RawResources::new();
    resources.add_materials(&weapon.crafting.materials, 1);

    // Tiers past the last upgrade stage are clamped by `take`.
    let stages = (selection.effective_tier() - 1) as usize;
    for upgrade in weapon.crafting.upgrades.iter().take(stages) {
        resources.add_materials(&upgrade.materials, 1);
    }

    for mod_id in selection.fitted_mods() {
        match catalog.modification(mod_id) {
            Some(m) => resources.add_materials(&m.crafting.materials, 1),
            None => debug!(id = %mod_id, "skipping unknown modification"),
        }
    }

    Some(ItemResources {
        label: format!("{} ({})", weapon.name, role),
        resources,
    })
}

fn stack_resources(entry: &LoadoutItem, catalog: &Catalog) -> Option<ItemResources> {
    let Some(item) = catalog.equipment(&entry.id) else {
        debug!(id = %entry.id, "skipping unknown equipment");
        return None;
    };
    let mut resources = RawResources::new();
    resources.add_materials(&item.crafting.materials, u64::from(entry.quantity));
    Some(ItemResources {
        label: format!("{} x{}", item.name, entry.quantity),
        resources,
    })
}
