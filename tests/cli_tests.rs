use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_loadout-calculator")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("loadout-calculator-{name}-{stamp}.json"))
}

fn run(catalog: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .arg("--catalog")
        .arg(catalog)
        .args(args)
        .env_remove("LOADOUT_CATALOG")
        .env_remove("LOADOUT_MAX_RECIPE_DEPTH")
        .output()
        .expect("binary should run")
}

fn sample_catalog(name: &str) -> PathBuf {
    let path = unique_temp_path(name);
    let output = Command::new(bin())
        .args(["sample", "--output"])
        .arg(&path)
        .output()
        .expect("sample should run");
    assert_eq!(output.status.code(), Some(0));
    path
}

fn write_fixture(name: &str, content: &str) -> PathBuf {
    let path = unique_temp_path(name);
    fs::write(&path, content).expect("fixture should be written");
    path
}

#[test]
fn calc_command_emits_json_report() {
    let catalog = sample_catalog("calc-catalog");
    let loadout = write_fixture(
        "calc-loadout",
        r#"{"weapon1": {"id": "kettle", "tier": 2}, "ammo": [{"type": "Light Ammo", "quantity": 50}]}"#,
    );
    let inventory = write_fixture(
        "calc-inventory",
        r#"{"Metal Parts": 40, "Rubber Parts": "16", "Plastic Parts": "10", "Chemicals": "oops"}"#,
    );

    let output = run(
        &catalog,
        &[
            "calc",
            loadout.to_string_lossy().as_ref(),
            "--inventory",
            inventory.to_string_lossy().as_ref(),
            "--json",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("calc should emit json");

    // Kettle II: Metal 6+8, Rubber 8, Plastic 10; two batches of light ammo
    assert_eq!(payload["raw"]["Metal Parts"], 20);
    assert_eq!(payload["raw"]["Chemicals"], 4);
    assert_eq!(payload["check"]["mode"], "stash_check");
    assert_eq!(payload["check"]["rounds"], 1);
    assert_eq!(payload["check"]["bottleneck"], "Plastic Parts");
    assert!(payload["check"]["per_material_rounds"]["Chemicals"].is_null());

    for path in [catalog, loadout, inventory] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn calc_command_plans_raid_rounds() {
    let catalog = sample_catalog("raid-catalog");
    let loadout = write_fixture("raid-loadout", r#"{"shield": "medium_shield"}"#);

    let output = run(
        &catalog,
        &[
            "calc",
            loadout.to_string_lossy().as_ref(),
            "--expand",
            "Mechanical Components",
            "--rounds",
            "3",
            "--json",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("calc should emit json");

    assert_eq!(payload["check"]["mode"], "raid_prep");
    assert_eq!(payload["check"]["target_rounds"], 3);
    // Medium Shield: 2 Mechanical Components (7 Metal, 3 Rubber each), 1 Battery
    assert_eq!(payload["check"]["materials"]["Metal Parts"]["total"], 42);
    assert_eq!(payload["check"]["materials"]["Battery"]["total"], 3);
    assert!(payload["final_materials"]["Mechanical Components"].is_null());

    for path in [catalog, loadout] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn calc_command_prints_summary_text() {
    let catalog = sample_catalog("text-catalog");
    let loadout = write_fixture("text-loadout", r#"{"healing": [{"id": "bandage", "quantity": 3}]}"#);

    let output = run(&catalog, &["calc", loadout.to_string_lossy().as_ref()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("6 x Fabric"));
    assert!(stdout.contains("No inventory entered."));

    for path in [catalog, loadout] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn list_weapons_shows_sample_weapons() {
    let catalog = sample_catalog("list-catalog");

    let output = run(&catalog, &["list-weapons"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kettle"));
    assert!(stdout.contains("Ferro"));

    let _ = fs::remove_file(catalog);
}

#[test]
fn validate_command_accepts_sample_catalog() {
    let catalog = sample_catalog("validate-catalog");

    let output = run(&catalog, &["validate"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Catalog OK."));

    let _ = fs::remove_file(catalog);
}

#[test]
fn validate_command_returns_non_zero_on_recipe_cycle() {
    let catalog = write_fixture(
        "cycle-catalog",
        r#"{"materials": [
            {"id": "alpha", "name": "Alpha", "crafting": {"materials": [{"material": "Beta", "quantity": 1}]}},
            {"id": "beta", "name": "Beta", "crafting": {"materials": [{"material": "Alpha", "quantity": 2}]}}
        ]}"#,
    );

    let output = run(&catalog, &["validate"]);

    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("recipe cycle"));

    let _ = fs::remove_file(catalog);
}

#[test]
fn calc_command_fails_without_catalog() {
    let missing = unique_temp_path("missing-catalog");
    let loadout = write_fixture("orphan-loadout", "{}");

    let output = run(&missing, &["calc", loadout.to_string_lossy().as_ref()]);

    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No catalog at"));

    let _ = fs::remove_file(loadout);
}
