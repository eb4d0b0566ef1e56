use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// State and municipality names used as ground truth for every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    /// Canonical state name -> two-letter abbreviation.
    #[serde(rename = "estados")]
    pub states: BTreeMap<String, String>,
    /// Canonical state name -> municipalities, in source order.
    #[serde(rename = "municipios_por_estado")]
    pub municipalities_by_state: BTreeMap<String, Vec<String>>,
    /// Abbreviation -> canonical state name.
    #[serde(rename = "sigla_para_nome", default)]
    pub abbreviation_to_state: BTreeMap<String, String>,
}

impl GeoReference {
    pub fn state_names(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    pub fn state_for_abbreviation(&self, abbreviation: &str) -> Option<&str> {
        self.abbreviation_to_state.get(abbreviation).map(String::as_str)
    }

    pub fn municipalities_of(&self, state: &str) -> &[String] {
        self.municipalities_by_state
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn fill_abbreviation_index(&mut self) {
        if self.abbreviation_to_state.is_empty() {
            self.abbreviation_to_state = self
                .states
                .iter()
                .map(|(name, abbr)| (abbr.clone(), name.clone()))
                .collect();
        }
    }
}

/// State entry as listed by the geographic service.
#[derive(Debug, Clone, Deserialize)]
pub struct StateEntry {
    pub id: u32,
    pub sigla: String,
    pub nome: String,
}

/// Remote source of the raw state and municipality listings.
#[async_trait]
pub trait GeoSource: Send + Sync {
    async fn fetch_states(&self) -> Result<Vec<StateEntry>>;

    /// Municipalities are kept as raw JSON; the owning state sits in one of
    /// two nested shapes.
    async fn fetch_municipalities(&self) -> Result<Vec<Value>>;
}

const PRIMARY_UF_PATH: &str = "/microrregiao/mesorregiao/UF/sigla";
const FALLBACK_UF_PATH: &str = "/regiao-imediata/regiao-intermediaria/UF/sigla";

fn owning_state_abbreviation(municipality: &Value) -> Option<&str> {
    municipality
        .pointer(PRIMARY_UF_PATH)
        .and_then(Value::as_str)
        .or_else(|| municipality.pointer(FALLBACK_UF_PATH).and_then(Value::as_str))
}

/// Assembles the reference from raw listings. Municipalities whose state
/// cannot be determined are dropped with a warning.
pub fn build_reference(states: &[StateEntry], municipalities: &[Value]) -> GeoReference {
    let mut reference = GeoReference::default();
    for state in states {
        reference.states.insert(state.nome.clone(), state.sigla.clone());
        reference
            .abbreviation_to_state
            .insert(state.sigla.clone(), state.nome.clone());
        reference
            .municipalities_by_state
            .insert(state.nome.clone(), Vec::new());
    }

    let mut dropped = 0usize;
    for municipality in municipalities {
        let Some(name) = municipality.get("nome").and_then(Value::as_str) else {
            warn!("Municipality entry without a name, ignoring: {}", municipality);
            dropped += 1;
            continue;
        };
        let Some(abbreviation) = owning_state_abbreviation(municipality) else {
            warn!("Could not determine the state of municipality '{}', ignoring it", name);
            dropped += 1;
            continue;
        };
        match reference.abbreviation_to_state.get(abbreviation) {
            Some(state) => {
                if let Some(list) = reference.municipalities_by_state.get_mut(state) {
                    list.push(name.to_string());
                }
            }
            None => {
                warn!("Municipality '{}' belongs to unknown state '{}', ignoring it", name, abbreviation);
                dropped += 1;
            }
        }
    }

    info!(
        "Built geographic reference: {} states, {} municipalities ({} dropped)",
        reference.states.len(),
        reference.municipalities_by_state.values().map(Vec::len).sum::<usize>(),
        dropped
    );
    reference
}

/// Loads the reference from the local cache, or fetches and caches it.
pub struct GeoLoader {
    cache_path: PathBuf,
    source: Box<dyn GeoSource>,
}

impl GeoLoader {
    pub fn new(cache_path: impl Into<PathBuf>, source: Box<dyn GeoSource>) -> Self {
        Self {
            cache_path: cache_path.into(),
            source,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Cache first; the cache is trusted as-is with no freshness check.
    #[instrument(skip(self), fields(cache = %self.cache_path.display()))]
    pub async fn load(&self) -> Result<GeoReference> {
        if self.cache_path.exists() {
            info!("Loading geographic data from cache");
            return read_cache(&self.cache_path);
        }
        info!("Cache not found, fetching geographic data from remote service");
        self.refresh().await
    }

    /// Fetches from the remote source and overwrites the cache.
    pub async fn refresh(&self) -> Result<GeoReference> {
        let states = self.source.fetch_states().await?;
        let municipalities = self.source.fetch_municipalities().await?;
        let reference = build_reference(&states, &municipalities);
        write_cache(&self.cache_path, &reference)?;
        info!("Geographic data cached");
        Ok(reference)
    }
}

pub fn read_cache(path: &Path) -> Result<GeoReference> {
    let content = fs::read_to_string(path)?;
    let mut reference: GeoReference = serde_json::from_str(&content)?;
    reference.fill_abbreviation_index();
    Ok(reference)
}

pub fn write_cache(path: &Path, reference: &GeoReference) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(reference)?;
    fs::write(path, json)?;
    Ok(())
}
