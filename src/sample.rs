//! Built-in sample catalog for trying the calculator without scraped data

use std::collections::BTreeMap;

use crate::models::{
    Ammo, BatchCraftingInfo, CatalogDocument, CraftingInfo, CraftingMaterial, Equipment,
    EquipmentItem, Material, Modification, Rarity, Weapon, WeaponCrafting, WeaponUpgrade,
};

fn mats(list: &[(&str, u32)]) -> Vec<CraftingMaterial> {
    list.iter()
        .map(|(name, qty)| CraftingMaterial::new(*name, *qty))
        .collect()
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

fn material(name: &str, rarity: Rarity, recipe: &[(&str, u32)], output_quantity: u32) -> Material {
    Material {
        id: slug(name),
        name: name.to_string(),
        image: Some(format!("images/materials/{}.png", slug(name))),
        rarity: Some(rarity),
        weight: None,
        stack_size: None,
        crafting: BatchCraftingInfo {
            materials: mats(recipe),
            workshop: (!recipe.is_empty()).then(|| "Refiner 1".to_string()),
            output_quantity,
        },
    }
}

fn ammo_entry(name: &str, recipe: &[(&str, u32)], output_quantity: u32) -> Ammo {
    Ammo {
        id: slug(name),
        name: name.to_string(),
        image: None,
        weight: None,
        stack_size: None,
        crafting: BatchCraftingInfo {
            materials: mats(recipe),
            workshop: Some("Workbench 1".to_string()),
            output_quantity,
        },
    }
}

fn equipment_item(
    name: &str,
    category: &str,
    rarity: Rarity,
    recipe: &[(&str, u32)],
    stats: &[(&str, &str)],
) -> EquipmentItem {
    EquipmentItem {
        id: slug(name),
        name: name.to_string(),
        image: None,
        category: category.to_string(),
        rarity: Some(rarity),
        description: None,
        special_effect: None,
        stats: stats
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        crafting: CraftingInfo {
            materials: mats(recipe),
            workshop: Some("Workbench 1".to_string()),
        },
    }
}

fn modification(
    name: &str,
    slot_type: &str,
    recipe: &[(&str, u32)],
    compatible_weapons: &[&str],
) -> Modification {
    Modification {
        id: slug(name),
        name: name.to_string(),
        image: None,
        slot_type: slot_type.to_string(),
        rarity: Some(Rarity::Common),
        effects: Vec::new(),
        compatible_weapons: compatible_weapons.iter().map(|w| w.to_string()).collect(),
        crafting: CraftingInfo {
            materials: mats(recipe),
            workshop: Some("Gunsmith 1".to_string()),
        },
    }
}

fn upgrade(to_tier: &str, tier: u32, recipe: &[(&str, u32)]) -> WeaponUpgrade {
    WeaponUpgrade {
        to_tier: Some(to_tier.to_string()),
        tier: Some(tier),
        materials: mats(recipe),
        workshop: Some("Gunsmith 1".to_string()),
        perks: Vec::new(),
    }
}

/// A small, self-consistent catalog covering every item category.
pub fn sample_catalog() -> CatalogDocument {
    let weapons = vec![
        Weapon {
            id: "kettle".to_string(),
            name: "Kettle".to_string(),
            image: None,
            category: "Assault Rifle".to_string(),
            rarity: Some(Rarity::Common),
            ammo_type: Some("Light Ammo".to_string()),
            modification_slots: vec![
                "Muzzle".to_string(),
                "Underbarrel".to_string(),
                "Light-Mag".to_string(),
                "Stock".to_string(),
            ],
            crafting: WeaponCrafting {
                materials: mats(&[("Metal Parts", 6), ("Rubber Parts", 8)]),
                workshop: Some("Gunsmith 1".to_string()),
                upgrades: vec![
                    upgrade("Kettle II", 2, &[("Metal Parts", 8), ("Plastic Parts", 10)]),
                    upgrade("Kettle III", 3, &[("Metal Parts", 10), ("Simple Gun Parts", 1)]),
                    upgrade(
                        "Kettle IV",
                        4,
                        &[("Mechanical Components", 3), ("Simple Gun Parts", 1)],
                    ),
                ],
            },
        },
        Weapon {
            id: "ferro".to_string(),
            name: "Ferro".to_string(),
            image: None,
            category: "Battle Rifle".to_string(),
            rarity: Some(Rarity::Common),
            ammo_type: Some("Heavy Ammo".to_string()),
            modification_slots: vec!["Muzzle".to_string(), "Stock".to_string()],
            crafting: WeaponCrafting {
                materials: mats(&[("Metal Parts", 5), ("Rubber Parts", 2)]),
                workshop: Some("Gunsmith 1".to_string()),
                upgrades: vec![
                    upgrade("Ferro II", 2, &[("Metal Parts", 7), ("Mechanical Components", 1)]),
                    upgrade(
                        "Ferro III",
                        3,
                        &[("Mechanical Components", 2), ("Advanced Mechanical Components", 1)],
                    ),
                ],
            },
        },
    ];

    let equipment = Equipment {
        augments: vec![
            equipment_item(
                "Looting Mk 1",
                "augments",
                Rarity::Common,
                &[("Plastic Parts", 6), ("Rubber Parts", 6)],
                &[("Shield Compatibility", "Light")],
            ),
            equipment_item(
                "Combat Mk 1",
                "augments",
                Rarity::Uncommon,
                &[("Mechanical Components", 2), ("Wires", 3)],
                &[("Shield Compatibility", "Light, Medium")],
            ),
        ],
        shields: vec![
            equipment_item(
                "Light Shield",
                "shields",
                Rarity::Uncommon,
                &[("Plastic Parts", 4), ("Wires", 2)],
                &[],
            ),
            equipment_item(
                "Medium Shield",
                "shields",
                Rarity::Rare,
                &[("Mechanical Components", 2), ("Battery", 1)],
                &[],
            ),
        ],
        healing: vec![
            equipment_item("Bandage", "healing", Rarity::Common, &[("Fabric", 2)], &[]),
            equipment_item(
                "Shield Recharger",
                "healing",
                Rarity::Uncommon,
                &[("Battery", 1), ("Plastic Parts", 2)],
                &[],
            ),
        ],
        quick_use: vec![equipment_item(
            "Zipline",
            "quick_use",
            Rarity::Uncommon,
            &[("Rope", 1), ("Mechanical Components", 1)],
            &[],
        )],
        grenades: vec![equipment_item(
            "Light Impact Grenade",
            "grenades",
            Rarity::Common,
            &[("Plastic Parts", 2), ("Chemicals", 3)],
            &[],
        )],
        traps: vec![equipment_item(
            "Blaze Trap",
            "traps",
            Rarity::Uncommon,
            &[("Chemicals", 4), ("Metal Parts", 1)],
            &[],
        )],
    };

    let modifications = vec![
        modification("Compensator I", "Muzzle", &[("Metal Parts", 6), ("Wires", 1)], &[]),
        modification(
            "Angled Grip I",
            "Underbarrel",
            &[("Plastic Parts", 6), ("Rubber Parts", 2)],
            &[],
        ),
        modification(
            "Extended Light Mag I",
            "Light-Mag",
            &[("Plastic Parts", 6), ("Steel Spring", 1)],
            &["Kettle"],
        ),
        modification(
            "Stable Stock I",
            "Stock",
            &[("Rubber Parts", 6), ("Duct Tape", 1)],
            &["Ferro"],
        ),
    ];

    let materials = vec![
        material("Metal Parts", Rarity::Common, &[], 1),
        material("Rubber Parts", Rarity::Common, &[], 1),
        material("Plastic Parts", Rarity::Common, &[], 1),
        material("Chemicals", Rarity::Common, &[], 1),
        material("Fabric", Rarity::Common, &[], 1),
        material("Wires", Rarity::Uncommon, &[], 1),
        material("Battery", Rarity::Uncommon, &[], 1),
        material("Duct Tape", Rarity::Uncommon, &[], 1),
        material("Rope", Rarity::Common, &[("Fabric", 3)], 1),
        material(
            "Mechanical Components",
            Rarity::Uncommon,
            &[("Metal Parts", 7), ("Rubber Parts", 3)],
            1,
        ),
        material("Simple Gun Parts", Rarity::Uncommon, &[("Metal Parts", 3)], 1),
        material("Steel Spring", Rarity::Uncommon, &[("Metal Parts", 15)], 3),
        material(
            "Advanced Mechanical Components",
            Rarity::Rare,
            &[("Mechanical Components", 2), ("Steel Spring", 2)],
            1,
        ),
    ];

    let ammo = vec![
        ammo_entry("Light Ammo", &[("Metal Parts", 3), ("Chemicals", 2)], 25),
        ammo_entry("Medium Ammo", &[("Metal Parts", 2), ("Chemicals", 3)], 20),
        ammo_entry("Heavy Ammo", &[("Metal Parts", 4), ("Chemicals", 4)], 10),
    ];

    CatalogDocument {
        version: Some("1.0.0".to_string()),
        last_updated: Some("2025-12-02".to_string()),
        weapons,
        equipment,
        modifications,
        materials,
        ammo,
    }
}
