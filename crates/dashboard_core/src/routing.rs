use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use shared::domain::Domain;

use crate::params::ParameterField;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

/// Maps parameter changes to the domains that must be refetched, plus the
/// set fetched on initial mount. Treated as configuration rather than
/// hard-coded orchestrator logic: the defaults mirror the upstream API
/// semantics (income is a pure client-side filter), and a `dashboard.toml`
/// can override individual entries without touching code.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTable {
    pub initial_load: Vec<Domain>,
    refetch: HashMap<ParameterField, Vec<Domain>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        let mut refetch = HashMap::new();
        // income changes are filtered client-side by the selectors
        refetch.insert(ParameterField::UserIncome, Vec::new());
        refetch.insert(ParameterField::UserUnitSize, vec![Domain::Rent]);
        refetch.insert(ParameterField::OtherUnitSize, vec![Domain::Affordability]);
        refetch.insert(
            ParameterField::OtherDemographic,
            vec![Domain::Affordability],
        );
        Self {
            initial_load: vec![Domain::Affordability, Domain::Rent, Domain::Neighborhoods],
            refetch,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RoutingFile {
    #[serde(default)]
    initial_load: Option<Vec<Domain>>,
    #[serde(default)]
    refetch: HashMap<ParameterField, Vec<Domain>>,
}

impl RoutingTable {
    pub fn domains_for(&self, field: ParameterField) -> &[Domain] {
        self.refetch
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Loads `dashboard.toml` from the working directory if present, falling
    /// back to the defaults. Malformed files are an error rather than a
    /// silent fallback.
    pub fn load() -> anyhow::Result<Self> {
        if !Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read routing config '{}'", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse routing config '{}'", path.display()))
    }

    /// Overrides only the entries present in the file; everything else keeps
    /// its default.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let file: RoutingFile = toml::from_str(raw).context("invalid routing table toml")?;
        let mut table = Self::default();
        if let Some(initial_load) = file.initial_load {
            table.initial_load = initial_load;
        }
        for (field, domains) in file.refetch {
            table.refetch.insert(field, domains);
        }
        Ok(table)
    }
}
