//! Runtime configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CATALOG_PATH: &str = "game_data.json";

/// Recipe chains in the game are a handful of levels deep; anything past
/// this is treated as broken catalog data.
pub const DEFAULT_MAX_RECIPE_DEPTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalcConfig {
    pub catalog_path: PathBuf,
    pub max_recipe_depth: usize,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            max_recipe_depth: DEFAULT_MAX_RECIPE_DEPTH,
        }
    }
}

impl CalcConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `LOADOUT_CATALOG` - Path to the catalog JSON (default: `game_data.json`)
    /// - `LOADOUT_MAX_RECIPE_DEPTH` - Recipe expansion depth limit (default: 20)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("LOADOUT_CATALOG") {
            if !path.is_empty() {
                config.catalog_path = PathBuf::from(path);
            }
        }

        if let Some(depth) = read_env::<usize>("LOADOUT_MAX_RECIPE_DEPTH") {
            config.max_recipe_depth = depth.max(1);
        }

        config
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, catalog: Option<PathBuf>, max_depth: Option<usize>) -> Self {
        if let Some(path) = catalog {
            self.catalog_path = path;
        }
        if let Some(depth) = max_depth {
            self.max_recipe_depth = depth.max(1);
        }
        self
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
