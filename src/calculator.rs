//! Loadout resource pipeline: aggregate, expand, collect, then check

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::afford::{self, AffordabilityResult, Inventory, RaidPlan, StandingStatus};
use crate::aggregate::{self, RawResources};
use crate::catalog::Catalog;
use crate::config::DEFAULT_MAX_RECIPE_DEPTH;
use crate::error::CalcError;
use crate::loadout::Loadout;
use crate::tree::{self, ExpansionSet, FinalMaterials, ResourceNode, TreeBuilder};

#[derive(Debug, Clone)]
pub struct CalcOptions {
    pub expanded: ExpansionSet,
    pub inventory: Inventory,
    /// Planned loadout count; switches the report to raid prep
    pub target_rounds: Option<u64>,
    pub group_by_item: bool,
    pub max_depth: usize,
}

impl Default for CalcOptions {
    fn default() -> Self {
        Self {
            expanded: ExpansionSet::new(),
            inventory: Inventory::new(),
            target_rounds: None,
            group_by_item: false,
            max_depth: DEFAULT_MAX_RECIPE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemBreakdown {
    pub label: String,
    pub tree: Vec<ResourceNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Check {
    StashCheck(AffordabilityResult),
    RaidPrep(RaidPlan),
}

/// Everything computed for one loadout
#[derive(Debug, Clone, Serialize)]
pub struct CalcReport {
    pub raw: RawResources,
    pub tree: Vec<ResourceNode>,
    pub final_materials: FinalMaterials,
    pub check: Check,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemBreakdown>,
}

/// Run the full pipeline for a loadout.
///
/// In raid prep the tree is scaled to the planned round count; otherwise it
/// shows a single loadout and the inventory is checked against its leaves.
pub fn calculate(
    catalog: &Catalog,
    loadout: &Loadout,
    options: &CalcOptions,
) -> Result<CalcReport, CalcError> {
    let builder = TreeBuilder::new(catalog, &options.expanded).with_max_depth(options.max_depth);

    let raw = aggregate::aggregate(loadout, catalog);
    let mut tree = builder.build(&raw)?;
    let final_materials = tree::collect_leaves(&tree);

    let check = match options.target_rounds {
        Some(rounds) => {
            tree = tree.iter().map(|node| node.scaled(rounds)).collect();
            Check::RaidPrep(afford::raid_prep(&final_materials, rounds))
        }
        None => Check::StashCheck(afford::calculate_affordability(
            &final_materials,
            &options.inventory,
        )),
    };

    let mut items = Vec::new();
    if options.group_by_item {
        for item in aggregate::aggregate_per_item(loadout, catalog) {
            items.push(ItemBreakdown {
                label: item.label,
                tree: builder.build(&item.resources)?,
            });
        }
    }

    debug!(
        raw = raw.len(),
        leaves = final_materials.len(),
        "calculated loadout"
    );

    Ok(CalcReport {
        raw,
        tree,
        final_materials,
        check,
        items,
    })
}

impl fmt::Display for CalcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            return writeln!(f, "Loadout is empty; nothing to craft.");
        }

        writeln!(f, "=== Resource Tree ===")?;
        write!(f, "{}", tree::format_tree(&self.tree, 0))?;
        writeln!(f)?;

        for item in &self.items {
            writeln!(f, "--- {} ---", item.label)?;
            write!(f, "{}", tree::format_tree(&item.tree, 0))?;
            writeln!(f)?;
        }

        writeln!(f, "=== Final Materials ===")?;
        match &self.check {
            Check::StashCheck(result) => {
                for (name, material) in self.final_materials.sorted() {
                    write!(f, "  {:>6} x {}", material.quantity, name)?;
                    if let Some(standing) = result.standing(name) {
                        let note = match standing.status {
                            StandingStatus::Depleted => "depleted".to_string(),
                            StandingStatus::Bottleneck => "bottleneck".to_string(),
                            StandingStatus::Tight => {
                                format!("tight, +{:.0}%", standing.headroom_percent)
                            }
                            StandingStatus::Comfortable => {
                                format!("+{:.0}%", standing.headroom_percent)
                            }
                        };
                        write!(f, "  ({} rounds, {})", standing.rounds, note)?;
                    }
                    writeln!(f)?;
                }
                writeln!(f)?;
                match (result.rounds, &result.bottleneck) {
                    (Some(rounds), Some(bottleneck)) => {
                        writeln!(f, "Affordable loadouts: {}", rounds)?;
                        writeln!(f, "Bottleneck: {}", bottleneck)?;
                    }
                    _ => writeln!(f, "No inventory entered.")?,
                }
            }
            Check::RaidPrep(plan) => {
                for (name, _) in self.final_materials.sorted() {
                    if let Some(planned) = plan.materials.get(name) {
                        writeln!(
                            f,
                            "  {:>6} x {}  ({} per loadout)",
                            planned.total, name, planned.per_round
                        )?;
                    }
                }
                writeln!(f)?;
                writeln!(f, "Planned loadouts: {}", plan.target_rounds)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::{LoadoutWeapon, WeaponSlot};
    use crate::sample::sample_catalog;

    fn catalog() -> Catalog {
        Catalog::from_document(sample_catalog())
    }

    fn kettle_loadout(tier: u32) -> Loadout {
        let mut loadout = Loadout::default();
        loadout.weapon1 = Some(LoadoutWeapon {
            tier,
            ..LoadoutWeapon::new("kettle")
        });
        loadout
    }

    #[test]
    fn test_stash_check_against_inventory() {
        let mut options = CalcOptions::default();
        assert!(options.inventory.set("Metal Parts", "12"));
        assert!(options.inventory.set("Rubber Parts", "8"));

        let report = calculate(&catalog(), &kettle_loadout(1), &options).unwrap();
        assert_eq!(report.raw.get("Metal Parts"), Some(6));
        match &report.check {
            Check::StashCheck(result) => {
                assert_eq!(result.rounds, Some(1));
                assert_eq!(result.bottleneck.as_deref(), Some("Rubber Parts"));
            }
            other => panic!("expected stash check, got {other:?}"),
        }
    }

    #[test]
    fn test_expansion_changes_leaves() {
        let mut options = CalcOptions::default();
        options.expanded.expand("Mechanical Components");

        let mut loadout = Loadout::default();
        loadout.weapon1 = Some(LoadoutWeapon {
            tier: 3,
            ..LoadoutWeapon::new("ferro")
        });

        let report = calculate(&catalog(), &loadout, &options).unwrap();
        // Ferro III: Metal 5+7, Rubber 2, MC 1+2, Advanced MC 1
        assert_eq!(report.raw.get("Mechanical Components"), Some(3));
        assert_eq!(report.final_materials.get("Mechanical Components"), None);
        assert_eq!(report.final_materials.get("Metal Parts").unwrap().quantity, 12 + 21);
        assert_eq!(report.final_materials.get("Rubber Parts").unwrap().quantity, 2 + 9);
    }

    #[test]
    fn test_raid_prep_scales_tree_and_plan() {
        let options = CalcOptions {
            target_rounds: Some(3),
            ..Default::default()
        };
        let report = calculate(&catalog(), &kettle_loadout(1), &options).unwrap();

        let metal = report.tree.iter().find(|n| n.name == "Metal Parts").unwrap();
        assert_eq!(metal.quantity, 18);
        assert_eq!(report.final_materials.get("Metal Parts").unwrap().quantity, 6);
        match &report.check {
            Check::RaidPrep(plan) => assert_eq!(plan.materials["Rubber Parts"].total, 24),
            other => panic!("expected raid prep, got {other:?}"),
        }
    }

    #[test]
    fn test_raid_prep_with_maximum_target() {
        let options = CalcOptions {
            target_rounds: Some(afford::parse_target_rounds("18446744073709551615")),
            ..Default::default()
        };
        let report = calculate(&catalog(), &kettle_loadout(1), &options).unwrap();

        assert!(report.tree.iter().all(|n| n.quantity == u64::MAX));
        match &report.check {
            Check::RaidPrep(plan) => assert_eq!(plan.materials["Metal Parts"].total, u64::MAX),
            other => panic!("expected raid prep, got {other:?}"),
        }
    }

    #[test]
    fn test_group_by_item_builds_a_tree_per_item() {
        let mut loadout = kettle_loadout(1);
        loadout.set_shield(Some("light_shield"));
        loadout.set_weapon(WeaponSlot::Secondary, Some("ferro"));

        let options = CalcOptions {
            group_by_item: true,
            ..Default::default()
        };
        let report = calculate(&catalog(), &loadout, &options).unwrap();
        let labels: Vec<_> = report.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Kettle (Primary)", "Ferro (Secondary)", "Light Shield"]);
    }

    #[test]
    fn test_depth_limit_propagates() {
        let mut loadout = Loadout::default();
        loadout.weapon1 = Some(LoadoutWeapon {
            tier: 3,
            ..LoadoutWeapon::new("ferro")
        });
        let options = CalcOptions {
            expanded: ["Advanced Mechanical Components", "Mechanical Components"]
                .into_iter()
                .collect(),
            max_depth: 1,
            ..Default::default()
        };

        let err = calculate(&catalog(), &loadout, &options).unwrap_err();
        assert!(matches!(err, CalcError::DepthExceeded { max_depth: 1, .. }));
    }

    #[test]
    fn test_display_summarizes_report() {
        let mut options = CalcOptions::default();
        assert!(options.inventory.set("Metal Parts", "30"));
        assert!(options.inventory.set("Rubber Parts", "16"));

        let text = calculate(&catalog(), &kettle_loadout(1), &options)
            .unwrap()
            .to_string();
        assert!(text.contains("=== Resource Tree ==="));
        assert!(text.contains("Affordable loadouts: 2"));
        assert!(text.contains("Bottleneck: Rubber Parts"));

        let empty = calculate(&catalog(), &Loadout::default(), &CalcOptions::default()).unwrap();
        assert!(empty.to_string().contains("nothing to craft"));
    }
}
