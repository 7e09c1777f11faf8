use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{read_to_string, write},
    path::PathBuf,
};

use crate::error::PathwayError;

pub const DEFAULT_DERIVED_TITLE_SUFFIX: &str = " [P]";

/// Toggles that change how source pathways are turned into nodes.
#[derive(EnumSetType, Debug, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
pub enum CompositionOption {
    /// VReps sharing an entity collapse into one node, within and across pathways
    RemoveDuplicateVertices,
    /// VReps without incident edges in their own pathway produce no node
    DisplayOnlyVerticesWithEdges,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Hops kept around the focus vertex. 0 disables bounding.
    pub environment_radius: u32,
    pub options: EnumSet<CompositionOption>,
    /// Appended to the title of every bounded subpathway.
    pub derived_title_suffix: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig {
            environment_radius: 0,
            options: EnumSet::only(CompositionOption::RemoveDuplicateVertices),
            derived_title_suffix: DEFAULT_DERIVED_TITLE_SUFFIX.to_string(),
        }
    }
}

impl ComposerConfig {
    pub fn remove_duplicate_vertices(&self) -> bool {
        self.options.contains(CompositionOption::RemoveDuplicateVertices)
    }

    pub fn display_only_vertices_with_edges(&self) -> bool {
        self.options
            .contains(CompositionOption::DisplayOnlyVerticesWithEdges)
    }

    pub fn set_option(&mut self, option: CompositionOption, enabled: bool) {
        if enabled {
            self.options.insert(option);
        } else {
            self.options.remove(option);
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.environment_radius > 0
    }
}

pub trait ConfigProvider {
    fn get_config(&self) -> Result<ComposerConfig, PathwayError>;
    fn set_config(&self, config: &ComposerConfig) -> Result<(), PathwayError>;
}

/// Stores a [ComposerConfig] under the `composer` table of a TOML file.
#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<ComposerConfig, PathwayError> {
        tracing::debug!("Attempting to read composer config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(ComposerConfig::default());
        }
        let content = read_to_string(&self.path)?;
        let mut config: BTreeMap<String, ComposerConfig> = toml::from_str(&content)?;
        Ok(config.remove("composer").unwrap_or_default())
    }

    fn set_config(&self, config: &ComposerConfig) -> Result<(), PathwayError> {
        tracing::debug!("Attempting to write composer config to: {:?}", &self.path);
        let mut table = BTreeMap::new();
        table.insert("composer".to_string(), config.clone());
        let toml_string = toml::to_string(&table)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}
