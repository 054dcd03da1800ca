//! Skills Catalog: the read-only role → {technical skills, concepts} mapping.
//!
//! Loaded once at startup from a JSON file shaped like:
//!
//! ```json
//! { "Data Science": { "Technical Skills": ["Python", "SQL"], "Concepts": ["Statistics"] } }
//! ```
//!
//! Role order follows the file. A missing or unreadable file degrades to a single
//! fallback role instead of aborting startup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Role offered when no catalog file can be loaded.
pub const FALLBACK_ROLE: &str = "Data Science";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Skills catalog not found at {0}")]
    Missing(String),

    #[error("Failed to read skills catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Skills catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Expected skills for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleSkills {
    #[serde(rename = "Technical Skills", default)]
    pub technical_skills: Vec<String>,
    #[serde(rename = "Concepts", default)]
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleEntry {
    pub role: String,
    #[serde(flatten)]
    pub skills: RoleSkills,
}

#[derive(Debug, Clone)]
pub struct SkillsCatalog {
    roles: Vec<RoleEntry>,
}

impl SkillsCatalog {
    /// Parses catalog JSON, keeping the roles in file order.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let roles = map
            .into_iter()
            .map(|(role, value)| {
                let skills: RoleSkills = serde_json::from_value(value)?;
                Ok::<_, serde_json::Error>(RoleEntry { role, skills })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { roles })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CatalogError::Missing(path.display().to_string()),
            _ => CatalogError::Io(e),
        })?;
        Self::from_json(&raw)
    }

    /// Loads the catalog, falling back to the single hard-coded role on any failure.
    pub fn load_or_fallback(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(catalog) if !catalog.roles.is_empty() => {
                info!("Skills catalog loaded with {} roles", catalog.roles.len());
                catalog
            }
            Ok(_) => {
                warn!("Skills catalog is empty; using fallback role '{FALLBACK_ROLE}'");
                Self::fallback()
            }
            Err(e) => {
                warn!("{e}; using fallback role '{FALLBACK_ROLE}'");
                Self::fallback()
            }
        }
    }

    pub fn fallback() -> Self {
        Self {
            roles: vec![RoleEntry {
                role: FALLBACK_ROLE.to_string(),
                skills: RoleSkills::default(),
            }],
        }
    }

    pub fn get(&self, role: &str) -> Option<&RoleSkills> {
        self.roles
            .iter()
            .find(|entry| entry.role == role)
            .map(|entry| &entry.skills)
    }

    pub fn roles(&self) -> &[RoleEntry] {
        &self.roles
    }
}
