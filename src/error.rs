//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Failures while expanding recipes into a resource tree.
///
/// Both variants point at broken catalog content rather than a bad loadout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("recipe cycle detected: {}", path.join(" -> "))]
    RecipeCycle { path: Vec<String> },

    #[error("recipe expansion of '{material}' exceeded maximum depth of {max_depth}")]
    DepthExceeded { material: String, max_depth: usize },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reading a loadout or inventory file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("no scraped data files found under {}", dir.display())]
    MissingSource { dir: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
