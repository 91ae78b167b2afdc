use super::RunnerConfig;
use crate::delivery::PayloadFormat;
use crate::{ScoutError, ScoutResult};
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_SETTINGS_PATH: &str = "./SearchSettings.json";
pub const SETTINGS_PATH_ENV: &str = "VACANCY_SCOUT_SETTINGS";
const DEFAULT_SORT_ORDER: &str = "relevance";

/// Contents of `SearchSettings.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub parsers: Vec<ParserSettings>,
    #[serde(default)]
    pub webhooks: Vec<WebhookSettings>,
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserSettings {
    pub name: String,
    #[serde(default)]
    pub structure: Structure,
    /// Overrides the board's public address, e.g. for a mirror.
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Sent verbatim with every request to the board.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Structure {
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub areas: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub sorted: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    pub url: Url,
    pub format: PayloadFormat,
}

/// Location and role ids a board is allowed to crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    pub areas: BTreeSet<String>,
    pub roles: BTreeSet<String>,
}

impl Whitelist {
    pub fn new<A, R>(areas: A, roles: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            areas: areas.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, location_id: &str, role_id: &str) -> bool {
        self.areas.contains(location_id) && self.roles.contains(role_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder(pub String);

impl SortOrder {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder(DEFAULT_SORT_ORDER.to_string())
    }
}

impl SearchSettings {
    pub fn load(path: impl AsRef<Path>) -> ScoutResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScoutError::MissingSettings(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&raw)?;
        debug!(
            "Loaded settings from {} ({} parsers, {} webhooks)",
            path.display(),
            settings.parsers.len(),
            settings.webhooks.len()
        );
        Ok(settings)
    }

    /// Loads from `$VACANCY_SCOUT_SETTINGS`, falling back to `./SearchSettings.json`.
    pub fn load_default() -> ScoutResult<Self> {
        let path = std::env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
        Self::load(path)
    }

    pub fn from_json(raw: &str) -> ScoutResult<Self> {
        serde_json::from_str(raw).map_err(|e| ScoutError::InvalidSettings(e.to_string()))
    }

    pub fn parser(&self, name: &str) -> ScoutResult<&ParserSettings> {
        self.parsers
            .iter()
            .find(|parser| parser.name == name)
            .ok_or_else(|| ScoutError::MissingParserSettings(name.to_string()))
    }
}

impl ParserSettings {
    pub fn whitelist(&self) -> Whitelist {
        Whitelist::new(
            self.structure.areas.iter().cloned(),
            self.structure.roles.iter().cloned(),
        )
    }

    /// First order flagged `true` in document order, `relevance` when none is.
    pub fn sort_order(&self) -> SortOrder {
        self.structure
            .sorted
            .iter()
            .find(|(_, enabled)| enabled.as_bool().unwrap_or(false))
            .map(|(name, _)| SortOrder(name.clone()))
            .unwrap_or_default()
    }
}

fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    let ids = Vec::<Id>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Id::Text(text) => text,
            Id::Number(number) => number.to_string(),
        })
        .collect())
}
