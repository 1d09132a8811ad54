//! Catalog consolidation from scraped wiki data
//!
//! Walks a directory for the scraper's output files and merges them into a
//! single catalog document with cleaned names and generated ids.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::name_key;
use crate::error::ConsolidateError;
use crate::models::{
    Ammo, BatchCraftingInfo, CatalogDocument, CraftingInfo, CraftingMaterial, Equipment,
    EquipmentItem, Material, Modification, Rarity, Weapon, WeaponCrafting, WeaponUpgrade,
    lenient_number,
};

pub const CATALOG_VERSION: &str = "1.0.0";

const WEAPONS_FILE: &str = "weapons_data.json";
const EQUIPMENT_FILE: &str = "equipment_data.json";
const MODIFICATIONS_FILE: &str = "modifications_data.json";
const MATERIALS_FILE: &str = "materials_data.json";

/// Index pages the scraper picks up alongside real equipment
const SKIPPED_EQUIPMENT: [&str; 4] = ["Quick Use", "ARC", "Raider", "Skills"];

/// Crafting parts that show up in the modification listing
const MISFILED_MATERIALS: [&str; 8] = [
    "Metal Parts",
    "Plastic Parts",
    "Rubber Parts",
    "Wires",
    "Duct Tape",
    "Mechanical Components",
    "Steel Spring",
    "Mod Components",
];

#[derive(Debug, Deserialize)]
struct ScrapedMaterialAmount {
    material: String,
    #[serde(default)]
    quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapedCraft {
    #[serde(default)]
    materials: Vec<ScrapedMaterialAmount>,
    #[serde(default)]
    workshop: Option<String>,
    #[serde(default)]
    output_quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ScrapedUpgrade {
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    materials: Vec<ScrapedMaterialAmount>,
    #[serde(default)]
    workshop: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapedWeapon {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    ammo_type: Option<String>,
    #[serde(default)]
    modification_slots: Vec<String>,
    #[serde(default)]
    base_craft: ScrapedCraft,
    #[serde(default)]
    upgrades: Vec<ScrapedUpgrade>,
}

#[derive(Debug, Deserialize)]
struct ScrapedEquipment {
    name: String,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    special_effect: Option<String>,
    #[serde(default)]
    stats: BTreeMap<String, Value>,
    #[serde(default)]
    crafting: ScrapedCraft,
}

#[derive(Debug, Deserialize)]
struct ScrapedModification {
    name: String,
    #[serde(default)]
    slot_type: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    effects: Vec<String>,
    #[serde(default)]
    compatible_weapons: Vec<String>,
    #[serde(default)]
    crafting: ScrapedCraft,
}

#[derive(Debug, Deserialize)]
struct ScrapedStackable {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    stack_size: Option<u32>,
    #[serde(default)]
    crafting: ScrapedCraft,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapedMaterials {
    #[serde(default)]
    materials: Vec<ScrapedStackable>,
    #[serde(default)]
    ammo: Vec<ScrapedStackable>,
}

/// Scraped files located under a source directory
#[derive(Debug, Default)]
pub struct SourceFiles {
    pub weapons: Option<PathBuf>,
    pub equipment: Option<PathBuf>,
    pub modifications: Option<PathBuf>,
    pub materials: Option<PathBuf>,
}

impl SourceFiles {
    fn is_empty(&self) -> bool {
        self.weapons.is_none()
            && self.equipment.is_none()
            && self.modifications.is_none()
            && self.materials.is_none()
    }
}

/// Find the scraper output files anywhere under `source_dir`. The first file
/// of each name in walk order is used.
pub fn find_source_files(source_dir: &Path) -> SourceFiles {
    let mut files = SourceFiles::default();

    for entry in WalkDir::new(source_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let slot = match entry.file_name().to_str() {
            Some(WEAPONS_FILE) => &mut files.weapons,
            Some(EQUIPMENT_FILE) => &mut files.equipment,
            Some(MODIFICATIONS_FILE) => &mut files.modifications,
            Some(MATERIALS_FILE) => &mut files.materials,
            _ => continue,
        };
        if slot.is_none() {
            debug!(path = %entry.path().display(), "found scraped data file");
            *slot = Some(entry.path().to_path_buf());
        }
    }

    files
}

fn read_scraped<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConsolidateError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path).map_err(|source| ConsolidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConsolidateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Trim and replace non-breaking spaces
pub fn clean_string(s: &str) -> String {
    s.replace('\u{a0}', " ").trim().to_string()
}

fn clean_optional(s: Option<String>) -> Option<String> {
    s.map(|s| clean_string(&s)).filter(|s| !s.is_empty())
}

/// Catalog id for a display name: lowercase, underscores for spaces
pub fn make_id(name: &str) -> String {
    clean_string(name)
        .replace("%27", "'")
        .to_lowercase()
        .replace(' ', "_")
}

/// Guess a modification's slot from its name
pub fn infer_slot_type(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["compensator", "muzzle", "silencer", "choke", "barrel"]) {
        "Muzzle"
    } else if has(&["grip"]) {
        "Underbarrel"
    } else if has(&["mag"]) {
        if has(&["light"]) {
            "Light-Mag"
        } else if has(&["medium"]) {
            "Medium-Mag"
        } else if has(&["shotgun"]) {
            "Shotgun-Mag"
        } else {
            "Magazine"
        }
    } else if has(&["stock"]) {
        "Stock"
    } else if has(&["splitter", "kinetic"]) {
        "Tech-Mod"
    } else {
        "Unknown"
    }
}

fn parse_rarity(raw: Option<&str>) -> Option<Rarity> {
    raw.and_then(|r| r.parse().ok())
}

fn clean_materials(materials: Vec<ScrapedMaterialAmount>) -> Vec<CraftingMaterial> {
    materials
        .into_iter()
        .map(|m| CraftingMaterial::new(clean_string(&m.material), m.quantity))
        .collect()
}

fn crafting_info(craft: ScrapedCraft) -> CraftingInfo {
    CraftingInfo {
        materials: clean_materials(craft.materials),
        workshop: clean_optional(craft.workshop),
    }
}

fn batch_crafting_info(craft: ScrapedCraft) -> BatchCraftingInfo {
    BatchCraftingInfo {
        output_quantity: craft.output_quantity.unwrap_or(1),
        materials: clean_materials(craft.materials),
        workshop: clean_optional(craft.workshop),
    }
}

fn stat_text(value: Value) -> String {
    match value {
        Value::String(s) => clean_string(&s),
        other => other.to_string(),
    }
}

fn convert_weapon(w: ScrapedWeapon) -> Weapon {
    let upgrades = w
        .upgrades
        .into_iter()
        .zip(2..)
        .map(|(u, tier)| WeaponUpgrade {
            to_tier: clean_optional(u.output),
            tier: Some(tier),
            materials: clean_materials(u.materials),
            workshop: clean_optional(u.workshop),
            perks: Vec::new(),
        })
        .collect();

    Weapon {
        id: make_id(&w.name),
        name: clean_string(&w.name),
        image: None,
        category: clean_optional(w.category).unwrap_or_else(|| "Unknown".to_string()),
        rarity: parse_rarity(w.rarity.as_deref()).or(Some(Rarity::Common)),
        ammo_type: clean_optional(w.ammo_type),
        modification_slots: w.modification_slots.iter().map(|s| clean_string(s)).collect(),
        crafting: WeaponCrafting {
            materials: clean_materials(w.base_craft.materials),
            workshop: clean_optional(w.base_craft.workshop),
            upgrades,
        },
    }
}

fn convert_equipment(category: &str, e: ScrapedEquipment) -> EquipmentItem {
    let name = clean_string(&e.name.replace("%27", "'"));
    EquipmentItem {
        id: make_id(&e.name),
        name,
        image: None,
        category: category.to_string(),
        rarity: parse_rarity(e.rarity.as_deref()),
        description: clean_optional(e.description),
        special_effect: clean_optional(e.special_effect),
        stats: e
            .stats
            .into_iter()
            .map(|(k, v)| (clean_string(&k), stat_text(v)))
            .collect(),
        crafting: crafting_info(e.crafting),
    }
}

fn convert_modification(m: ScrapedModification) -> Modification {
    let slot_type = clean_optional(m.slot_type)
        .unwrap_or_else(|| infer_slot_type(&m.name).to_string());
    Modification {
        id: make_id(&m.name),
        name: clean_string(&m.name),
        image: None,
        slot_type,
        rarity: parse_rarity(m.rarity.as_deref()),
        effects: m.effects.iter().map(|s| clean_string(s)).collect(),
        compatible_weapons: m.compatible_weapons.iter().map(|s| clean_string(s)).collect(),
        crafting: crafting_info(m.crafting),
    }
}

fn stackable_id(s: &ScrapedStackable) -> String {
    match &s.id {
        Some(id) => id.to_lowercase(),
        None => make_id(&s.name),
    }
}

fn convert_material(m: ScrapedStackable) -> Material {
    Material {
        id: stackable_id(&m),
        name: clean_string(&m.name),
        image: None,
        rarity: parse_rarity(m.rarity.as_deref()),
        weight: m.weight,
        stack_size: m.stack_size,
        crafting: batch_crafting_info(m.crafting),
    }
}

fn convert_ammo(a: ScrapedStackable) -> Ammo {
    Ammo {
        id: stackable_id(&a),
        name: clean_string(&a.name),
        image: None,
        weight: a.weight,
        stack_size: a.stack_size,
        crafting: batch_crafting_info(a.crafting),
    }
}

/// Counts reported after a consolidation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsolidateStats {
    pub weapons: usize,
    pub augments: usize,
    pub shields: usize,
    pub healing: usize,
    pub quick_use: usize,
    pub grenades: usize,
    pub traps: usize,
    pub modifications: usize,
    pub materials: usize,
    pub ammo: usize,
    pub skipped: usize,
}

impl ConsolidateStats {
    fn from_document(doc: &CatalogDocument, skipped: usize) -> Self {
        Self {
            weapons: doc.weapons.len(),
            augments: doc.equipment.augments.len(),
            shields: doc.equipment.shields.len(),
            healing: doc.equipment.healing.len(),
            quick_use: doc.equipment.quick_use.len(),
            grenades: doc.equipment.grenades.len(),
            traps: doc.equipment.traps.len(),
            modifications: doc.modifications.len(),
            materials: doc.materials.len(),
            ammo: doc.ammo.len(),
            skipped,
        }
    }
}

impl fmt::Display for ConsolidateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weapons:       {}", self.weapons)?;
        writeln!(f, "Augments:      {}", self.augments)?;
        writeln!(f, "Shields:       {}", self.shields)?;
        writeln!(f, "Healing:       {}", self.healing)?;
        writeln!(f, "Quick Use:     {}", self.quick_use)?;
        writeln!(f, "Grenades:      {}", self.grenades)?;
        writeln!(f, "Traps:         {}", self.traps)?;
        writeln!(f, "Modifications: {}", self.modifications)?;
        writeln!(f, "Materials:     {}", self.materials)?;
        writeln!(f, "Ammo Types:    {}", self.ammo)?;
        write!(f, "Skipped:       {}", self.skipped)
    }
}

/// Build a catalog document from the scraped files under `source_dir`
pub fn consolidate(source_dir: &Path) -> Result<(CatalogDocument, ConsolidateStats), ConsolidateError> {
    let files = find_source_files(source_dir);
    if files.is_empty() {
        return Err(ConsolidateError::MissingSource {
            dir: source_dir.to_path_buf(),
        });
    }

    let weapons: Vec<ScrapedWeapon> = read_scraped(files.weapons.as_deref())?;
    let equipment: BTreeMap<String, Vec<ScrapedEquipment>> =
        read_scraped(files.equipment.as_deref())?;
    let modifications: Vec<ScrapedModification> = read_scraped(files.modifications.as_deref())?;
    let stackables: ScrapedMaterials = read_scraped(files.materials.as_deref())?;

    let mut skipped = 0;
    let mut doc = CatalogDocument {
        version: Some(CATALOG_VERSION.to_string()),
        ..Default::default()
    };

    info!(count = weapons.len(), "processing weapons");
    doc.weapons = weapons.into_iter().map(convert_weapon).collect();

    info!(categories = equipment.len(), "processing equipment");
    for (category, items) in equipment {
        let Some(target) = equipment_category(&mut doc.equipment, &category) else {
            debug!(category = %category, items = items.len(), "skipping unknown equipment category");
            skipped += items.len();
            continue;
        };
        for item in items {
            if SKIPPED_EQUIPMENT.contains(&clean_string(&item.name).as_str()) {
                skipped += 1;
                continue;
            }
            target.push(convert_equipment(&category, item));
        }
    }

    info!(count = stackables.materials.len(), "processing materials");
    doc.materials = stackables.materials.into_iter().map(convert_material).collect();
    doc.ammo = stackables.ammo.into_iter().map(convert_ammo).collect();

    let material_names: HashSet<String> = doc
        .materials
        .iter()
        .map(|m| name_key(&m.name))
        .chain(MISFILED_MATERIALS.iter().map(|n| name_key(n)))
        .collect();

    info!(count = modifications.len(), "processing modifications");
    for scraped in modifications {
        if material_names.contains(&name_key(&clean_string(&scraped.name))) {
            skipped += 1;
            continue;
        }
        doc.modifications.push(convert_modification(scraped));
    }

    let stats = ConsolidateStats::from_document(&doc, skipped);
    Ok((doc, stats))
}

fn equipment_category<'a>(equipment: &'a mut Equipment, category: &str) -> Option<&'a mut Vec<EquipmentItem>> {
    match category {
        "augments" => Some(&mut equipment.augments),
        "shields" => Some(&mut equipment.shields),
        "healing" => Some(&mut equipment.healing),
        "quick_use" => Some(&mut equipment.quick_use),
        "grenades" => Some(&mut equipment.grenades),
        "traps" => Some(&mut equipment.traps),
        _ => None,
    }
}

/// Write a catalog document as pretty-printed JSON, creating parent directories
pub fn write_catalog(doc: &CatalogDocument, path: &Path) -> Result<(), ConsolidateError> {
    let io_err = |source: std::io::Error| ConsolidateError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(doc).map_err(|source| ConsolidateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)?;

    info!(path = %path.display(), "wrote catalog");
    Ok(())
}
