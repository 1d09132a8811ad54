//! Read-only game catalog with id and name indexes
//!
//! Recipes reference their ingredients by display name. All name lookups go
//! through [`name_key`] so case folding happens in exactly one place.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::CatalogError;
use crate::models::{
    Ammo, CatalogDocument, CraftingMaterial, EquipmentItem, Material, Modification, Recipe,
    Weapon,
};

/// Normalized key for case-insensitive name matching.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// The loaded catalog. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    doc: CatalogDocument,
    weapons_by_id: HashMap<String, usize>,
    equipment_by_id: HashMap<String, (EquipmentSlot, usize)>,
    modifications_by_id: HashMap<String, usize>,
    materials_by_name: HashMap<String, usize>,
    ammo_by_name: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EquipmentSlot {
    Augments,
    Shields,
    Healing,
    QuickUse,
    Grenades,
    Traps,
}

impl Catalog {
    /// Load a catalog document from a JSON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: CatalogDocument =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::from_document(doc);
        info!(
            path = %path.display(),
            weapons = catalog.doc.weapons.len(),
            materials = catalog.doc.materials.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build the indexes over an in-memory document.
    ///
    /// When ids or names collide the first entry wins.
    pub fn from_document(doc: CatalogDocument) -> Self {
        let mut weapons_by_id = HashMap::new();
        for (i, w) in doc.weapons.iter().enumerate() {
            weapons_by_id.entry(w.id.clone()).or_insert(i);
        }

        let mut equipment_by_id = HashMap::new();
        let categories = [
            (EquipmentSlot::Augments, &doc.equipment.augments),
            (EquipmentSlot::Shields, &doc.equipment.shields),
            (EquipmentSlot::Healing, &doc.equipment.healing),
            (EquipmentSlot::QuickUse, &doc.equipment.quick_use),
            (EquipmentSlot::Grenades, &doc.equipment.grenades),
            (EquipmentSlot::Traps, &doc.equipment.traps),
        ];
        for (slot, items) in categories {
            for (i, item) in items.iter().enumerate() {
                equipment_by_id.entry(item.id.clone()).or_insert((slot, i));
            }
        }

        let mut modifications_by_id = HashMap::new();
        for (i, m) in doc.modifications.iter().enumerate() {
            modifications_by_id.entry(m.id.clone()).or_insert(i);
        }

        let mut materials_by_name = HashMap::new();
        for (i, m) in doc.materials.iter().enumerate() {
            materials_by_name.entry(name_key(&m.name)).or_insert(i);
        }

        let mut ammo_by_name = HashMap::new();
        for (i, a) in doc.ammo.iter().enumerate() {
            ammo_by_name.entry(name_key(&a.name)).or_insert(i);
        }

        Self {
            doc,
            weapons_by_id,
            equipment_by_id,
            modifications_by_id,
            materials_by_name,
            ammo_by_name,
        }
    }

    pub fn document(&self) -> &CatalogDocument {
        &self.doc
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.doc.weapons
    }

    pub fn materials(&self) -> &[Material] {
        &self.doc.materials
    }

    pub fn weapon(&self, id: &str) -> Option<&Weapon> {
        self.weapons_by_id.get(id).map(|&i| &self.doc.weapons[i])
    }

    /// Look up an equipment item of any category by id.
    pub fn equipment(&self, id: &str) -> Option<&EquipmentItem> {
        let &(slot, i) = self.equipment_by_id.get(id)?;
        let eq = &self.doc.equipment;
        let items = match slot {
            EquipmentSlot::Augments => &eq.augments,
            EquipmentSlot::Shields => &eq.shields,
            EquipmentSlot::Healing => &eq.healing,
            EquipmentSlot::QuickUse => &eq.quick_use,
            EquipmentSlot::Grenades => &eq.grenades,
            EquipmentSlot::Traps => &eq.traps,
        };
        items.get(i)
    }

    pub fn modification(&self, id: &str) -> Option<&Modification> {
        self.modifications_by_id
            .get(id)
            .map(|&i| &self.doc.modifications[i])
    }

    pub fn material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials_by_name
            .get(&name_key(name))
            .map(|&i| &self.doc.materials[i])
    }

    pub fn ammo_by_name(&self, name: &str) -> Option<&Ammo> {
        self.ammo_by_name
            .get(&name_key(name))
            .map(|&i| &self.doc.ammo[i])
    }

    /// A material is craftable when it has a non-empty recipe.
    pub fn is_craftable(&self, name: &str) -> bool {
        self.material_by_name(name)
            .is_some_and(|m| !m.crafting.materials.is_empty())
    }

    pub fn recipe(&self, name: &str) -> Option<Recipe> {
        let material = self.material_by_name(name)?;
        if material.crafting.materials.is_empty() {
            return None;
        }
        Some(Recipe {
            ingredients: material.crafting.materials.clone(),
            output_quantity: material.crafting.output_per_craft(),
        })
    }

    /// Highest selectable tier: the base weapon plus one per upgrade stage.
    pub fn max_tier(weapon: &Weapon) -> u32 {
        weapon.crafting.upgrades.len() as u32 + 1
    }

    /// Modifications that fit `slot_type` on the named weapon.
    pub fn modifications_for_slot(&self, weapon_name: &str, slot_type: &str) -> Vec<&Modification> {
        self.doc
            .modifications
            .iter()
            .filter(|m| m.slot_type == slot_type)
            .filter(|m| {
                m.compatible_weapons.is_empty()
                    || m.compatible_weapons.iter().any(|w| w == weapon_name)
            })
            .collect()
    }

    /// Shields allowed by an augment's "Shield Compatibility" stat.
    pub fn shields_for_augment(&self, augment_id: &str) -> Vec<&EquipmentItem> {
        let Some(augment) = self.doc.equipment.augments.iter().find(|a| a.id == augment_id)
        else {
            return Vec::new();
        };
        let Some(compat) = augment.stats.get("Shield Compatibility") else {
            return Vec::new();
        };

        let allowed: Vec<String> = compat.split(',').map(|s| name_key(s.trim())).collect();

        self.doc
            .equipment
            .shields
            .iter()
            .filter(|shield| {
                let kind = name_key(&shield.name).replace(" shield", "");
                allowed.contains(&kind)
            })
            .collect()
    }

    /// Check the catalog for content problems.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut seen_ids = HashSet::new();
        let all_ids = self
            .doc
            .weapons
            .iter()
            .map(|w| w.id.as_str())
            .chain(self.doc.equipment.iter().map(|e| e.id.as_str()))
            .chain(self.doc.modifications.iter().map(|m| m.id.as_str()))
            .chain(self.doc.materials.iter().map(|m| m.id.as_str()))
            .chain(self.doc.ammo.iter().map(|a| a.id.as_str()));
        for id in all_ids {
            if !seen_ids.insert(id) {
                issues.push(ValidationIssue::DuplicateId(id.to_string()));
            }
        }

        let mut seen_names = HashSet::new();
        for m in &self.doc.materials {
            if !seen_names.insert(name_key(&m.name)) {
                issues.push(ValidationIssue::DuplicateMaterialName(m.name.clone()));
            }
        }

        for (owner, recipe) in self.all_recipes() {
            for ingredient in recipe {
                if ingredient.quantity == 0 {
                    issues.push(ValidationIssue::ZeroQuantity {
                        item: owner.to_string(),
                        material: ingredient.material.clone(),
                    });
                }
            }
        }

        for m in &self.doc.materials {
            if m.crafting.output_quantity == 0 && !m.crafting.materials.is_empty() {
                issues.push(ValidationIssue::ZeroOutput(m.name.clone()));
            }
        }
        for a in &self.doc.ammo {
            if a.crafting.output_quantity == 0 {
                issues.push(ValidationIssue::ZeroOutput(a.name.clone()));
            }
        }

        issues.extend(self.find_recipe_cycles().into_iter().map(ValidationIssue::RecipeCycle));

        for issue in &issues {
            warn!("{}", issue);
        }
        issues
    }

    /// Every recipe in the catalog, paired with the name of the item it builds.
    fn all_recipes(&self) -> impl Iterator<Item = (&str, &[CraftingMaterial])> {
        let doc = &self.doc;
        let weapons = doc.weapons.iter().flat_map(|w| {
            std::iter::once((w.name.as_str(), w.crafting.materials.as_slice())).chain(
                w.crafting
                    .upgrades
                    .iter()
                    .map(move |u| (w.name.as_str(), u.materials.as_slice())),
            )
        });
        let equipment = doc
            .equipment
            .iter()
            .map(|e| (e.name.as_str(), e.crafting.materials.as_slice()));
        let modifications = doc
            .modifications
            .iter()
            .map(|m| (m.name.as_str(), m.crafting.materials.as_slice()));
        let materials = doc
            .materials
            .iter()
            .map(|m| (m.name.as_str(), m.crafting.materials.as_slice()));
        let ammo = doc
            .ammo
            .iter()
            .map(|a| (a.name.as_str(), a.crafting.materials.as_slice()));

        weapons
            .chain(equipment)
            .chain(modifications)
            .chain(materials)
            .chain(ammo)
    }

    /// Depth-first search over material recipes. Each cycle is reported once,
    /// as the path from its first revisited material back to itself.
    fn find_recipe_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut finished: HashSet<String> = HashSet::new();

        for m in &self.doc.materials {
            let mut path = Vec::new();
            self.visit_for_cycles(&m.name, &mut path, &mut finished, &mut cycles);
        }
        cycles
    }

    fn visit_for_cycles(
        &self,
        name: &str,
        path: &mut Vec<String>,
        finished: &mut HashSet<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        let key = name_key(name);
        if finished.contains(&key) {
            return;
        }
        if let Some(pos) = path.iter().position(|p| name_key(p) == key) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(name.to_string());
            cycles.push(cycle);
            return;
        }

        let Some(recipe) = self.recipe(name) else {
            finished.insert(key);
            return;
        };

        path.push(name.to_string());
        for ingredient in &recipe.ingredients {
            self.visit_for_cycles(&ingredient.material, path, finished, cycles);
        }
        path.pop();
        finished.insert(key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateId(String),
    DuplicateMaterialName(String),
    ZeroQuantity { item: String, material: String },
    ZeroOutput(String),
    RecipeCycle(Vec<String>),
}

impl ValidationIssue {
    /// Cycles make recipe expansion fail; everything else only skews totals.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationIssue::RecipeCycle(_))
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DuplicateId(id) => write!(f, "duplicate id '{}'", id),
            ValidationIssue::DuplicateMaterialName(name) => {
                write!(f, "duplicate material name '{}'", name)
            }
            ValidationIssue::ZeroQuantity { item, material } => {
                write!(f, "{} lists {} with quantity 0", item, material)
            }
            ValidationIssue::ZeroOutput(name) => write!(f, "{} has output quantity 0", name),
            ValidationIssue::RecipeCycle(path) => {
                write!(f, "recipe cycle: {}", path.join(" -> "))
            }
        }
    }
}
