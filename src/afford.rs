//! How many loadouts an inventory covers, and how much N loadouts need

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::name_key;
use crate::error::InputError;
use crate::tree::FinalMaterials;

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("count pattern is valid"));

/// Owned amounts as the user typed them. Entries that are missing, empty or
/// not a whole number leave that material unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<String, String>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an inventory from a JSON object of numbers or numeric strings
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&content).map_err(|source| InputError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = raw
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name, text)
            })
            .collect();
        Ok(Self(entries))
    }

    /// Record an input value. Only empty or all-digit text is accepted;
    /// returns whether the value was taken.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        if value.is_empty() {
            self.0.remove(name);
            return true;
        }
        if !COUNT_RE.is_match(value) {
            return false;
        }
        self.0.insert(name.to_string(), value.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Parsed owned amount, or `None` when the material is unconstrained.
    pub fn owned(&self, name: &str) -> Option<u64> {
        let raw = self.0.get(name)?.trim();
        if !COUNT_RE.is_match(raw) {
            return None;
        }
        raw.parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AffordabilityResult {
    /// Complete loadouts craftable; `None` when nothing is constrained
    pub rounds: Option<u64>,
    pub bottleneck: Option<String>,
    pub per_material_rounds: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StandingStatus {
    Depleted,
    Bottleneck,
    Tight,
    Comfortable,
}

/// How one constrained material compares with the overall limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialStanding {
    pub rounds: u64,
    pub headroom_percent: f64,
    pub bar_percent: f64,
    pub status: StandingStatus,
}

/// Headroom at or under this percentage counts as tight.
const TIGHT_HEADROOM_PERCENT: f64 = 25.0;
const MIN_BAR_PERCENT: f64 = 10.0;

impl AffordabilityResult {
    pub fn has_any_input(&self) -> bool {
        !self.per_material_rounds.is_empty()
    }

    /// Standing of a constrained material. Only defined when at least one
    /// full round is affordable.
    pub fn standing(&self, name: &str) -> Option<MaterialStanding> {
        let overall = self.rounds.filter(|&r| r > 0)?;
        let own = *self.per_material_rounds.get(name)?;
        let is_bottleneck = self.bottleneck.as_deref() == Some(name);

        let headroom_percent = (own as f64 - overall as f64) / overall as f64 * 100.0;
        let status = if own == 0 {
            StandingStatus::Depleted
        } else if is_bottleneck {
            StandingStatus::Bottleneck
        } else if headroom_percent <= TIGHT_HEADROOM_PERCENT {
            StandingStatus::Tight
        } else {
            StandingStatus::Comfortable
        };
        let bar_percent = if is_bottleneck {
            100.0
        } else {
            headroom_percent.clamp(MIN_BAR_PERCENT, 100.0)
        };

        Some(MaterialStanding {
            rounds: own,
            headroom_percent,
            bar_percent,
            status,
        })
    }
}

/// Whole loadouts the inventory covers.
///
/// Each material with a usable inventory entry allows `owned / needed`
/// rounds; the overall answer is the smallest of those. When several
/// materials tie for the smallest, the bottleneck is the one whose name sorts
/// first case-insensitively.
pub fn calculate_affordability(leaves: &FinalMaterials, inventory: &Inventory) -> AffordabilityResult {
    let mut result = AffordabilityResult::default();
    let mut best: Option<(u64, &str)> = None;

    for (name, material) in leaves.iter() {
        let Some(owned) = inventory.owned(name) else {
            continue;
        };
        if material.quantity == 0 {
            continue;
        }

        let rounds = owned / material.quantity;
        result.per_material_rounds.insert(name.to_string(), rounds);

        let better = match best {
            None => true,
            Some((best_rounds, best_name)) => {
                rounds < best_rounds
                    || (rounds == best_rounds
                        && (name_key(name), name) < (name_key(best_name), best_name))
            }
        };
        if better {
            best = Some((rounds, name));
        }
    }

    if let Some((rounds, name)) = best {
        result.rounds = Some(rounds);
        result.bottleneck = Some(name.to_string());
    }
    result
}

/// Parse a planned loadout count. Anything that isn't a whole number
/// falls back to 1.
pub fn parse_target_rounds(input: &str) -> u64 {
    let trimmed = input.trim();
    if !COUNT_RE.is_match(trimmed) {
        return 1;
    }
    trimmed.parse().unwrap_or(1)
}

/// Planned totals for `target_rounds` loadouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaidPlan {
    pub target_rounds: u64,
    pub materials: BTreeMap<String, PlannedMaterial>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMaterial {
    pub per_round: u64,
    pub total: u64,
}

/// Totals saturate at `u64::MAX` for very large targets.
pub fn raid_prep(leaves: &FinalMaterials, target_rounds: u64) -> RaidPlan {
    let materials = leaves
        .iter()
        .map(|(name, m)| {
            (
                name.to_string(),
                PlannedMaterial {
                    per_round: m.quantity,
                    total: m.quantity.saturating_mul(target_rounds),
                },
            )
        })
        .collect();
    RaidPlan {
        target_rounds,
        materials,
    }
}

/// Target to show when switching from the stash check to raid planning:
/// the affordable count carries over when there is one.
pub fn carry_over_rounds(result: &AffordabilityResult, current_target: u64) -> u64 {
    result.rounds.unwrap_or(current_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RawResources;
    use crate::catalog::Catalog;
    use crate::sample::sample_catalog;
    use crate::tree::{build_tree, collect_leaves, ExpansionSet};

    fn leaves(entries: &[(&str, u64)]) -> FinalMaterials {
        let catalog = Catalog::from_document(sample_catalog());
        let raw: RawResources = entries.iter().copied().collect();
        let tree = build_tree(&raw, &ExpansionSet::new(), &catalog).unwrap();
        collect_leaves(&tree)
    }

    fn inventory(entries: &[(&str, &str)]) -> Inventory {
        let mut inv = Inventory::new();
        for (name, value) in entries {
            assert!(inv.set(name, value));
        }
        inv
    }

    #[test]
    fn test_empty_inventory_is_unconstrained() {
        let result = calculate_affordability(
            &leaves(&[("Metal Parts", 6), ("Rubber Parts", 8)]),
            &Inventory::new(),
        );
        assert_eq!(result.rounds, None);
        assert_eq!(result.bottleneck, None);
        assert!(!result.has_any_input());
    }

    #[test]
    fn test_exact_inventory_affords_one_round() {
        let needs = leaves(&[("Metal Parts", 6), ("Rubber Parts", 8)]);
        let result = calculate_affordability(
            &needs,
            &inventory(&[("Metal Parts", "6"), ("Rubber Parts", "8")]),
        );
        assert_eq!(result.rounds, Some(1));

        let result = calculate_affordability(
            &needs,
            &inventory(&[("Metal Parts", "6"), ("Rubber Parts", "7")]),
        );
        assert_eq!(result.rounds, Some(0));
        assert_eq!(result.bottleneck.as_deref(), Some("Rubber Parts"));
    }

    #[test]
    fn test_minimum_across_constrained_materials() {
        let needs = leaves(&[("Metal Parts", 6), ("Rubber Parts", 8), ("Wires", 2)]);
        let result = calculate_affordability(
            &needs,
            &inventory(&[("Metal Parts", "40"), ("Rubber Parts", "17")]),
        );

        assert_eq!(result.rounds, Some(2));
        assert_eq!(result.bottleneck.as_deref(), Some("Rubber Parts"));
        assert_eq!(result.per_material_rounds.get("Metal Parts"), Some(&6));
        assert_eq!(result.per_material_rounds.get("Rubber Parts"), Some(&2));
        assert_eq!(result.per_material_rounds.get("Wires"), None);
    }

    #[test]
    fn test_tie_goes_to_first_name_alphabetically() {
        let needs = leaves(&[("Wires", 1), ("Battery", 1), ("Metal Parts", 1)]);
        let result = calculate_affordability(
            &needs,
            &inventory(&[("Wires", "3"), ("Metal Parts", "3"), ("Battery", "9")]),
        );
        assert_eq!(result.rounds, Some(3));
        assert_eq!(result.bottleneck.as_deref(), Some("Metal Parts"));
    }

    #[test]
    fn test_invalid_entries_are_unconstrained() {
        let mut inv = Inventory::new();
        assert!(!inv.set("Metal Parts", "12abc"));
        assert!(!inv.set("Metal Parts", "-4"));
        assert_eq!(inv.owned("Metal Parts"), None);

        assert!(inv.set("Metal Parts", "12"));
        assert!(inv.set("Metal Parts", ""));
        assert_eq!(inv.owned("Metal Parts"), None);

        let result = calculate_affordability(&leaves(&[("Metal Parts", 6)]), &inv);
        assert_eq!(result.rounds, None);
    }

    #[test]
    fn test_load_accepts_numbers_and_strings() {
        let path = std::env::temp_dir().join(format!(
            "loadout-calculator-inventory-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{"Metal Parts": 30, "Rubber Parts": "16", "Wires": "lots", "Fabric": null}"#,
        )
        .unwrap();
        let inv = Inventory::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(inv.owned("Metal Parts"), Some(30));
        assert_eq!(inv.owned("Rubber Parts"), Some(16));
        assert_eq!(inv.owned("Wires"), None);
        assert_eq!(inv.owned("Fabric"), None);
    }

    #[test]
    fn test_standing_classifies_headroom() {
        let needs = leaves(&[("Metal Parts", 1), ("Rubber Parts", 1), ("Wires", 1)]);
        let result = calculate_affordability(
            &needs,
            &inventory(&[("Metal Parts", "4"), ("Rubber Parts", "5"), ("Wires", "40")]),
        );
        assert_eq!(result.rounds, Some(4));

        let bottleneck = result.standing("Metal Parts").unwrap();
        assert_eq!(bottleneck.status, StandingStatus::Bottleneck);
        assert_eq!(bottleneck.bar_percent, 100.0);

        let tight = result.standing("Rubber Parts").unwrap();
        assert_eq!(tight.status, StandingStatus::Tight);
        assert_eq!(tight.headroom_percent, 25.0);
        assert_eq!(tight.bar_percent, 25.0);

        let plenty = result.standing("Wires").unwrap();
        assert_eq!(plenty.status, StandingStatus::Comfortable);
        assert_eq!(plenty.bar_percent, 100.0);

        assert!(result.standing("Battery").is_none());
    }

    #[test]
    fn test_no_standing_without_a_full_round() {
        let needs = leaves(&[("Metal Parts", 10)]);
        let result = calculate_affordability(&needs, &inventory(&[("Metal Parts", "3")]));
        assert_eq!(result.rounds, Some(0));
        assert!(result.standing("Metal Parts").is_none());
    }

    #[test]
    fn test_raid_prep_scales_each_material() {
        let needs = leaves(&[("Metal Parts", 6), ("Chemicals", 4)]);
        let plan = raid_prep(&needs, 3);
        assert_eq!(plan.target_rounds, 3);
        assert_eq!(
            plan.materials["Metal Parts"],
            PlannedMaterial {
                per_round: 6,
                total: 18
            }
        );
        assert_eq!(plan.materials["Chemicals"].total, 12);

        assert!(raid_prep(&needs, 0).materials.values().all(|m| m.total == 0));
    }

    #[test]
    fn test_target_rounds_parsing() {
        assert_eq!(parse_target_rounds("5"), 5);
        assert_eq!(parse_target_rounds(" 0 "), 0);
        assert_eq!(parse_target_rounds("-3"), 1);
        assert_eq!(parse_target_rounds("three"), 1);
        assert_eq!(parse_target_rounds(""), 1);
    }

    #[test]
    fn test_carry_over_keeps_target_when_unconstrained() {
        let unconstrained = AffordabilityResult::default();
        assert_eq!(carry_over_rounds(&unconstrained, 4), 4);

        let constrained = AffordabilityResult {
            rounds: Some(2),
            ..Default::default()
        };
        assert_eq!(carry_over_rounds(&constrained, 4), 2);
    }

    #[test]
    fn test_raid_prep_saturates_huge_targets() {
        let needs = leaves(&[("Metal Parts", 6)]);
        let rounds = parse_target_rounds("18446744073709551615");
        assert_eq!(rounds, u64::MAX);

        let plan = raid_prep(&needs, rounds);
        assert_eq!(plan.materials["Metal Parts"].total, u64::MAX);
        assert_eq!(plan.materials["Metal Parts"].per_round, 6);
    }
}
