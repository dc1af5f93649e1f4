// Champion catalog: read-only lookup data loaded once before a draft starts.
//
// The engine treats champions as opaque identifiers; the catalog exists to
// validate that an identifier is real, to resolve names typed at the console,
// and to carry the tag bag the recommendation provider consumes.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::draft::turn::Role;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read catalog file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate champion id {id} in catalog")]
    DuplicateId { id: u32 },

    #[error("catalog contains no champions")]
    Empty,
}

// ---------------------------------------------------------------------------
// Champion data
// ---------------------------------------------------------------------------

/// Stable numeric champion identifier. All draft state references champions
/// through this key; the catalog owns the full records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChampionId(pub u32);

impl fmt::Display for ChampionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single champion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Champion {
    pub id: ChampionId,
    pub name: String,
    /// Roles this champion is normally played in.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Attribute bag consumed only by the recommendation provider; the
    /// engine never inspects it.
    #[serde(default)]
    pub tags: Map<String, Value>,
}

/// The full champion pool, keyed by id.
#[derive(Debug, Clone)]
pub struct ChampionCatalog {
    by_id: HashMap<ChampionId, Champion>,
}

impl ChampionCatalog {
    /// Build a catalog from a list of champions, rejecting duplicate ids.
    pub fn from_champions(champions: Vec<Champion>) -> Result<Self, CatalogError> {
        if champions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut by_id = HashMap::with_capacity(champions.len());
        for champion in champions {
            let id = champion.id;
            if by_id.insert(id, champion).is_some() {
                return Err(CatalogError::DuplicateId { id: id.0 });
            }
        }
        Ok(ChampionCatalog { by_id })
    }

    /// Load the catalog from a JSON file containing an array of champions.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let champions: Vec<Champion> =
            serde_json::from_str(&text).map_err(|e| CatalogError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        let catalog = Self::from_champions(champions)?;
        info!("Loaded {} champions from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Look up a champion by id.
    pub fn get(&self, id: ChampionId) -> Option<&Champion> {
        self.by_id.get(&id)
    }

    /// Whether the catalog knows this id.
    pub fn contains(&self, id: ChampionId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Case-insensitive name lookup, for console input.
    pub fn by_name(&self, name: &str) -> Option<&Champion> {
        self.by_id
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Display name for an id, falling back to the raw number.
    pub fn display_name(&self, id: ChampionId) -> String {
        match self.get(id) {
            Some(champion) => champion.name.clone(),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Champion> {
        self.by_id.values()
    }
}
