//! Loadout state and the edits the builder applies to it
//!
//! Stackable entries always carry a positive quantity: an edit that would
//! take an entry to zero removes it instead.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutWeapon {
    pub id: String,
    #[serde(default = "first_tier")]
    pub tier: u32,
    /// Modification id per weapon slot position; empty string for no mod
    #[serde(default)]
    pub mods: Vec<String>,
}

fn first_tier() -> u32 {
    1
}

impl LoadoutWeapon {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tier: 1,
            mods: Vec::new(),
        }
    }

    /// Tier 0 is stored by some share links; it means the base weapon.
    pub fn effective_tier(&self) -> u32 {
        self.tier.max(1)
    }

    /// Mod ids that are actually filled in, in slot order.
    pub fn fitted_mods(&self) -> impl Iterator<Item = &str> {
        self.mods.iter().map(String::as_str).filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutItem {
    pub id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoEntry {
    /// Ammo display name, matched case-insensitively against the catalog
    #[serde(rename = "type")]
    pub ammo_type: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponSlot {
    Primary,
    Secondary,
}

/// The stackable consumable lists of a loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Healing,
    Utilities,
    Grenades,
    Traps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    #[serde(default)]
    pub weapon1: Option<LoadoutWeapon>,
    #[serde(default)]
    pub weapon2: Option<LoadoutWeapon>,
    #[serde(default)]
    pub augment: Option<String>,
    #[serde(default)]
    pub shield: Option<String>,
    #[serde(default)]
    pub healing: Vec<LoadoutItem>,
    #[serde(default)]
    pub utilities: Vec<LoadoutItem>,
    #[serde(default)]
    pub grenades: Vec<LoadoutItem>,
    #[serde(default)]
    pub traps: Vec<LoadoutItem>,
    #[serde(default)]
    pub ammo: Vec<AmmoEntry>,
}

impl Loadout {
    /// Read a loadout from a JSON file
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| InputError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.weapon1.is_none()
            && self.weapon2.is_none()
            && self.augment.is_none()
            && self.shield.is_none()
            && self.healing.is_empty()
            && self.utilities.is_empty()
            && self.grenades.is_empty()
            && self.traps.is_empty()
            && self.ammo.is_empty()
    }

    pub fn weapon(&self, slot: WeaponSlot) -> Option<&LoadoutWeapon> {
        match slot {
            WeaponSlot::Primary => self.weapon1.as_ref(),
            WeaponSlot::Secondary => self.weapon2.as_ref(),
        }
    }

    fn weapon_mut(&mut self, slot: WeaponSlot) -> &mut Option<LoadoutWeapon> {
        match slot {
            WeaponSlot::Primary => &mut self.weapon1,
            WeaponSlot::Secondary => &mut self.weapon2,
        }
    }

    pub fn stack(&self, kind: StackKind) -> &[LoadoutItem] {
        match kind {
            StackKind::Healing => &self.healing,
            StackKind::Utilities => &self.utilities,
            StackKind::Grenades => &self.grenades,
            StackKind::Traps => &self.traps,
        }
    }

    fn stack_mut(&mut self, kind: StackKind) -> &mut Vec<LoadoutItem> {
        match kind {
            StackKind::Healing => &mut self.healing,
            StackKind::Utilities => &mut self.utilities,
            StackKind::Grenades => &mut self.grenades,
            StackKind::Traps => &mut self.traps,
        }
    }

    /// Select a weapon (at tier 1 with no mods) or clear the slot.
    pub fn set_weapon(&mut self, slot: WeaponSlot, id: Option<&str>) {
        *self.weapon_mut(slot) = id.map(LoadoutWeapon::new);
    }

    /// Change the tier of an equipped weapon. No-op on an empty slot.
    pub fn set_tier(&mut self, slot: WeaponSlot, tier: u32) {
        if let Some(weapon) = self.weapon_mut(slot) {
            weapon.tier = tier.max(1);
        }
    }

    /// Fit or clear the mod at slot position `index`.
    pub fn set_mod(&mut self, slot: WeaponSlot, index: usize, mod_id: Option<&str>) {
        let Some(weapon) = self.weapon_mut(slot) else {
            return;
        };
        if weapon.mods.len() <= index {
            weapon.mods.resize(index + 1, String::new());
        }
        weapon.mods[index] = mod_id.unwrap_or_default().to_string();
        while weapon.mods.last().is_some_and(String::is_empty) {
            weapon.mods.pop();
        }
    }

    pub fn set_augment(&mut self, id: Option<&str>) {
        self.augment = id.map(str::to_string);
    }

    pub fn set_shield(&mut self, id: Option<&str>) {
        self.shield = id.map(str::to_string);
    }

    /// Add one of an item that isn't carried yet, or drop it entirely if it is.
    pub fn toggle_item(&mut self, kind: StackKind, id: &str) {
        let stack = self.stack_mut(kind);
        if let Some(pos) = stack.iter().position(|i| i.id == id) {
            stack.remove(pos);
        } else {
            stack.push(LoadoutItem {
                id: id.to_string(),
                quantity: 1,
            });
        }
    }

    pub fn increment(&mut self, kind: StackKind, id: &str) {
        let stack = self.stack_mut(kind);
        match stack.iter_mut().find(|i| i.id == id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => stack.push(LoadoutItem {
                id: id.to_string(),
                quantity: 1,
            }),
        }
    }

    pub fn decrement(&mut self, kind: StackKind, id: &str) {
        let stack = self.stack_mut(kind);
        if let Some(item) = stack.iter_mut().find(|i| i.id == id) {
            item.quantity = item.quantity.saturating_sub(1);
        }
        stack.retain(|i| i.quantity > 0);
    }

    /// Set how many rounds of an ammo type to carry; 0 removes the entry.
    pub fn set_ammo(&mut self, ammo_type: &str, quantity: u32) {
        match self.ammo.iter_mut().find(|a| a.ammo_type == ammo_type) {
            Some(entry) => entry.quantity = quantity,
            None if quantity > 0 => self.ammo.push(AmmoEntry {
                ammo_type: ammo_type.to_string(),
                quantity,
            }),
            None => {}
        }
        self.ammo.retain(|a| a.quantity > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selecting_weapon_resets_tier_and_mods() {
        let mut loadout = Loadout::default();
        loadout.set_weapon(WeaponSlot::Primary, Some("kettle"));
        loadout.set_tier(WeaponSlot::Primary, 3);
        loadout.set_mod(WeaponSlot::Primary, 0, Some("compensator_i"));

        loadout.set_weapon(WeaponSlot::Primary, Some("ferro"));
        assert_eq!(loadout.weapon1, Some(LoadoutWeapon::new("ferro")));

        loadout.set_weapon(WeaponSlot::Primary, None);
        assert!(loadout.is_empty());
    }

    #[test]
    fn test_set_tier_ignores_empty_slot() {
        let mut loadout = Loadout::default();
        loadout.set_tier(WeaponSlot::Secondary, 2);
        assert!(loadout.weapon2.is_none());
    }

    #[test]
    fn test_set_mod_pads_slots() {
        let mut loadout = Loadout::default();
        loadout.set_weapon(WeaponSlot::Secondary, Some("kettle"));
        loadout.set_mod(WeaponSlot::Secondary, 2, Some("extended_light_mag_i"));

        let weapon = loadout.weapon(WeaponSlot::Secondary).unwrap();
        assert_eq!(weapon.mods, vec!["", "", "extended_light_mag_i"]);
        assert_eq!(weapon.fitted_mods().collect::<Vec<_>>(), vec!["extended_light_mag_i"]);

        loadout.set_mod(WeaponSlot::Secondary, 2, None);
        assert!(loadout.weapon2.as_ref().unwrap().mods.is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_entry() {
        let mut loadout = Loadout::default();
        loadout.increment(StackKind::Healing, "bandage");
        loadout.increment(StackKind::Healing, "bandage");
        assert_eq!(loadout.healing[0].quantity, 2);

        loadout.decrement(StackKind::Healing, "bandage");
        assert_eq!(loadout.healing[0].quantity, 1);
        loadout.decrement(StackKind::Healing, "bandage");
        assert!(loadout.healing.is_empty());

        loadout.decrement(StackKind::Healing, "bandage");
        assert!(loadout.healing.is_empty());
    }

    #[test]
    fn test_toggle_item_adds_then_removes() {
        let mut loadout = Loadout::default();
        loadout.toggle_item(StackKind::Grenades, "light_impact_grenade");
        assert_eq!(
            loadout.stack(StackKind::Grenades),
            &[LoadoutItem {
                id: "light_impact_grenade".to_string(),
                quantity: 1
            }]
        );
        loadout.increment(StackKind::Grenades, "light_impact_grenade");
        loadout.toggle_item(StackKind::Grenades, "light_impact_grenade");
        assert!(loadout.grenades.is_empty());
    }

    #[test]
    fn test_set_ammo_zero_removes() {
        let mut loadout = Loadout::default();
        loadout.set_ammo("Light Ammo", 40);
        loadout.set_ammo("Light Ammo", 60);
        assert_eq!(loadout.ammo.len(), 1);
        assert_eq!(loadout.ammo[0].quantity, 60);

        loadout.set_ammo("Light Ammo", 0);
        assert!(loadout.ammo.is_empty());
        loadout.set_ammo("Heavy Ammo", 0);
        assert!(loadout.ammo.is_empty());
    }

    #[test]
    fn test_deserializes_sparse_json() {
        let loadout: Loadout = serde_json::from_str(
            r#"{"weapon1": {"id": "kettle"}, "ammo": [{"type": "Light Ammo", "quantity": 37}]}"#,
        )
        .unwrap();
        assert_eq!(loadout.weapon1.as_ref().unwrap().tier, 1);
        assert_eq!(loadout.ammo[0].ammo_type, "Light Ammo");
        assert!(loadout.healing.is_empty());
    }
}
