use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::finder::DataSource;
use crate::dns::{Name, NameError, RRClass};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid zone origin {origin:?}: {source}")]
    InvalidOrigin { origin: String, source: NameError },
    #[error("invalid zone class: {0}")]
    InvalidClass(String),
    #[error("invalid zone role: {0} (expected \"primary\" or \"secondary\")")]
    InvalidRole(String),
}

/// How this server relates to a zone named in an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRole {
    Primary,
    Secondary,
    NotFound,
}

/// One `[[zone]]` table in a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDecl {
    pub origin: String,
    #[serde(default = "default_class")]
    pub class: String,
    pub role: String,
}

fn default_class() -> String {
    "IN".to_string()
}

/// The `[[zone]]` tables of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneConfigFile {
    #[serde(default, rename = "zone")]
    pub zones: Vec<ZoneDecl>,
}

impl ZoneConfigFile {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

/// Maps a zone name and class to the server's role for that zone and,
/// for primary zones, the data source serving it.
#[derive(Clone, Default)]
pub struct ZoneConfig {
    zones: HashMap<(Name, RRClass), ZoneEntry>,
}

#[derive(Clone)]
struct ZoneEntry {
    role: ZoneRole,
    datasrc: Option<Arc<dyn DataSource>>,
}

impl ZoneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_primary(&mut self, apex: Name, class: RRClass, datasrc: Arc<dyn DataSource>) {
        self.zones.insert(
            (apex, class),
            ZoneEntry {
                role: ZoneRole::Primary,
                datasrc: Some(datasrc),
            },
        );
    }

    pub fn add_secondary(&mut self, apex: Name, class: RRClass) {
        self.zones.insert(
            (apex, class),
            ZoneEntry {
                role: ZoneRole::Secondary,
                datasrc: None,
            },
        );
    }

    /// Resolve a zone to the server's role and data source. Unknown
    /// zones yield `(NotFound, None)`.
    pub fn find_zone(&self, name: &Name, class: RRClass) -> (ZoneRole, Option<Arc<dyn DataSource>>) {
        match self.zones.get(&(name.clone(), class)) {
            Some(entry) => (entry.role, entry.datasrc.clone()),
            None => (ZoneRole::NotFound, None),
        }
    }

    /// Build a config from declarations, wiring every primary zone to
    /// the given data source.
    pub fn from_decls(
        file: &ZoneConfigFile,
        datasrc: Arc<dyn DataSource>,
    ) -> Result<Self, ConfigError> {
        let mut config = ZoneConfig::new();
        for decl in &file.zones {
            let apex: Name = decl
                .origin
                .parse()
                .map_err(|source| ConfigError::InvalidOrigin {
                    origin: decl.origin.clone(),
                    source,
                })?;
            let class = RRClass::from_text(&decl.class)
                .ok_or_else(|| ConfigError::InvalidClass(decl.class.clone()))?;
            match decl.role.to_lowercase().as_str() {
                "primary" | "master" => config.add_primary(apex, class, Arc::clone(&datasrc)),
                "secondary" | "slave" => config.add_secondary(apex, class),
                other => return Err(ConfigError::InvalidRole(other.to_string())),
            }
        }
        Ok(config)
    }
}
