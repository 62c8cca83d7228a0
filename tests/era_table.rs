//! Era table loading: built-in data, JSON files and what an era does to the engine.

use erasim::prelude::*;
use erasim::ConfigError;
use std::path::PathBuf;

const CUSTOM_TABLE: &str = r##"[
    {
        "id": 0,
        "name": "Quiet",
        "description": "Nothing moves."
    },
    {
        "id": 7,
        "name": "Hadron test",
        "interval": "10⁻⁶ s",
        "background": { "u_intensity": 0.4 },
        "host": {
            "shader": "base",
            "parameters": {
                "u_colorA": "#ff0000",
                "u_colorB": "#0000ff",
                "u_disp": 0.25
            }
        },
        "scale": 0.5,
        "auto_rotate": [0.0, 1.0, 0.0],
        "simulation": { "kind": "hadron", "options": { "trio_count": 12 } }
    }
]"##;

fn temp_table(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("erasim-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, contents).expect("write temp table");
    path
}

// ============================================================================
// Built-in table
// ============================================================================

#[test]
fn test_builtin_covers_timeline() {
    let table = EraTable::builtin();
    let registry = Registry::builtin();
    assert_eq!(table.len(), 18);

    let kinds: Vec<&str> = table.iter().filter_map(|e| e.simulation_kind()).collect();
    assert_eq!(kinds.len(), 17);
    for kind in &kinds {
        assert!(registry.contains(kind), "builtin era uses unregistered {kind}");
    }
    assert_eq!(kinds.first(), Some(&"planck"));
    assert_eq!(kinds.last(), Some(&"heat_death"));
}

#[test]
fn test_builtin_names_and_intervals() {
    for era in EraTable::builtin().iter() {
        assert!(!era.name.is_empty(), "era {} has no name", era.id);
        assert!(!era.interval.is_empty(), "era {} has no interval", era.id);
    }
}

// ============================================================================
// JSON tables
// ============================================================================

#[test]
fn test_load_from_path() {
    let path = temp_table("custom", CUSTOM_TABLE);
    let table = EraTable::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(table.len(), 2);
    let era = table.get(7).unwrap();
    assert_eq!(era.simulation_kind(), Some("hadron"));
    assert_eq!(era.scale, 0.5);
    assert!(table.get(0).unwrap().simulation.is_none());
    assert!(matches!(table.get(1), Err(ConfigError::UnknownEra(1))));
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("erasim-does-not-exist.json");
    assert!(matches!(EraTable::from_path(path), Err(ConfigError::Io(_))));
}

#[test]
fn test_bad_color_rejected() {
    let json = r##"[{ "id": 1, "name": "x", "host": { "parameters": { "u_colorA": "red" } } }]"##;
    assert!(matches!(EraTable::from_json(json), Err(ConfigError::Json(_))));
}

#[test]
fn test_missing_name_rejected() {
    assert!(EraTable::from_json(r#"[{ "id": 1 }]"#).is_err());
}

#[test]
fn test_custom_era_configures_engine() {
    let table = EraTable::from_json(CUSTOM_TABLE).unwrap();
    let registry = Registry::builtin();
    let mut engine = Engine::new();
    engine.initialize();

    let handle = engine.apply_era(table.get(7).unwrap(), &registry);
    let params = engine.host().params();
    assert_eq!(params.color("u_colorA"), Some(Vec3::new(1.0, 0.0, 0.0)));
    assert_eq!(params.color("u_colorB"), Some(Vec3::new(0.0, 0.0, 1.0)));
    assert_eq!(params.scalar("u_disp"), Some(0.25));
    assert_eq!(engine.background().scalar("u_intensity"), Some(0.4));
    assert_eq!(engine.palette().primary, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(engine.host().transform().scale, 0.5);
    assert_eq!(engine.sprite_count(), 36);

    // Switching to an era without a simulation clears the host.
    engine.apply_era(table.get(0).unwrap(), &registry);
    assert!(handle.is_complete());
    assert_eq!(engine.sprite_count(), 0);
    assert_eq!(engine.host().layer_count(), 0);
}

#[test]
fn test_table_survives_json_export() {
    let path = temp_table("export", &EraTable::builtin().to_json().unwrap());
    let table = EraTable::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(table, EraTable::builtin());
}
