//! Data models for catalog items and their crafting recipes

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Item rarity, ordered from most to least valuable for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Legendary,
    Epic,
    Rare,
    Uncommon,
    Common,
}

impl Rarity {
    /// Sort rank used for resource listings; unknown rarity sorts last.
    pub fn rank(rarity: Option<Rarity>) -> u8 {
        match rarity {
            Some(Rarity::Legendary) => 0,
            Some(Rarity::Epic) => 1,
            Some(Rarity::Rare) => 2,
            Some(Rarity::Uncommon) => 3,
            Some(Rarity::Common) => 4,
            None => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Legendary => "Legendary",
            Rarity::Epic => "Epic",
            Rarity::Rare => "Rare",
            Rarity::Uncommon => "Uncommon",
            Rarity::Common => "Common",
        }
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legendary" => Ok(Rarity::Legendary),
            "epic" => Ok(Rarity::Epic),
            "rare" => Ok(Rarity::Rare),
            "uncommon" => Ok(Rarity::Uncommon),
            "common" => Ok(Rarity::Common),
            other => Err(format!("unknown rarity '{}'", other)),
        }
    }
}

/// Accepts any casing; rarities the game adds later deserialize as unknown.
fn lenient_rarity<'de, D>(deserializer: D) -> Result<Option<Rarity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// Scraped pages store numbers as text ("0.25", "15"). Accepts either form;
/// anything that doesn't parse is dropped.
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    let raw = Option::<NumberOrText<T>>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient line of a recipe. Ingredients reference materials by
/// display name, not by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingMaterial {
    pub material: String,
    pub quantity: u32,
}

impl CraftingMaterial {
    pub fn new(material: impl Into<String>, quantity: u32) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingInfo {
    #[serde(default)]
    pub materials: Vec<CraftingMaterial>,
    #[serde(default)]
    pub workshop: Option<String>,
}

/// Crafting info for materials and ammo, which yield a batch per craft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCraftingInfo {
    #[serde(default)]
    pub materials: Vec<CraftingMaterial>,
    #[serde(default)]
    pub workshop: Option<String>,
    #[serde(default = "default_output_quantity")]
    pub output_quantity: u32,
}

impl BatchCraftingInfo {
    /// Units produced per craft. A zero in the data means one.
    pub fn output_per_craft(&self) -> u32 {
        self.output_quantity.max(1)
    }
}

impl Default for BatchCraftingInfo {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            workshop: None,
            output_quantity: default_output_quantity(),
        }
    }
}

fn default_output_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponUpgrade {
    /// Name of the tier this stage produces (e.g. "Kettle II")
    #[serde(default)]
    pub to_tier: Option<String>,
    /// Numeric tier this stage produces
    #[serde(default)]
    pub tier: Option<u32>,
    #[serde(default)]
    pub materials: Vec<CraftingMaterial>,
    #[serde(default)]
    pub workshop: Option<String>,
    #[serde(default)]
    pub perks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponCrafting {
    #[serde(default)]
    pub materials: Vec<CraftingMaterial>,
    #[serde(default)]
    pub workshop: Option<String>,
    /// Stage `i` upgrades the weapon to tier `i + 2`
    #[serde(default)]
    pub upgrades: Vec<WeaponUpgrade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "unknown_category")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_rarity")]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub ammo_type: Option<String>,
    #[serde(default)]
    pub modification_slots: Vec<String>,
    #[serde(default)]
    pub crafting: WeaponCrafting,
}

fn unknown_category() -> String {
    "Unknown".to_string()
}

/// Augments, shields, healing, quick-use, grenades and traps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_rarity")]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub special_effect: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, String>,
    #[serde(default)]
    pub crafting: CraftingInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub slot_type: String,
    #[serde(default, deserialize_with = "lenient_rarity")]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub effects: Vec<String>,
    /// Weapon display names; empty means compatible with every weapon
    #[serde(default)]
    pub compatible_weapons: Vec<String>,
    #[serde(default)]
    pub crafting: CraftingInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_rarity")]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stack_size: Option<u32>,
    #[serde(default)]
    pub crafting: BatchCraftingInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ammo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stack_size: Option<u32>,
    #[serde(default)]
    pub crafting: BatchCraftingInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub augments: Vec<EquipmentItem>,
    #[serde(default)]
    pub shields: Vec<EquipmentItem>,
    #[serde(default)]
    pub healing: Vec<EquipmentItem>,
    #[serde(default)]
    pub quick_use: Vec<EquipmentItem>,
    #[serde(default)]
    pub grenades: Vec<EquipmentItem>,
    #[serde(default)]
    pub traps: Vec<EquipmentItem>,
}

impl Equipment {
    /// Every equipment item across all categories, in category order.
    pub fn iter(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.augments
            .iter()
            .chain(&self.shields)
            .chain(&self.healing)
            .chain(&self.quick_use)
            .chain(&self.grenades)
            .chain(&self.traps)
    }
}

/// The catalog as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub modifications: Vec<Modification>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub ammo: Vec<Ammo>,
}

/// A material's recipe resolved for expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub ingredients: Vec<CraftingMaterial>,
    pub output_quantity: u32,
}

impl Recipe {
    /// Number of craft actions needed to produce at least `quantity` units.
    pub fn crafts_needed(&self, quantity: u64) -> u64 {
        crafts_needed(quantity, self.output_quantity)
    }
}

/// Partial batches still cost a full craft.
pub fn crafts_needed(quantity: u64, output_per_craft: u32) -> u64 {
    quantity.div_ceil(u64::from(output_per_craft.max(1)))
}
