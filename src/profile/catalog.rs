//! Archetype catalog loading.
//!
//! The catalog is externally authored data: a weighted list of device
//! archetypes, each with nested weighted tables. It can be read from a JSON or
//! TOML file, or from the copy bundled into the crate. Any failure to load
//! degrades to a single built-in archetype so synthesis can always proceed.
//!
//! # Formats
//!
//! JSON, either a top-level array or wrapped:
//!
//! ```json
//! { "archetypes": [ { "name": "Office Desktop", "weight": 40, "os": { "Windows 11": 1 } } ] }
//! ```
//!
//! TOML:
//!
//! ```toml
//! [[archetypes]]
//! name = "Office Desktop"
//! weight = 40
//! os = { "Windows 11" = 1 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::profile::tables::FormFactor;

/// Weighted table. Iterated in key order, which keeps draws stable.
pub type WeightTable = BTreeMap<String, f64>;

/// Name of the built-in archetype used when no catalog is available.
pub const FALLBACK_ARCHETYPE_NAME: &str = "Default Windows PC";

const BUNDLED_CATALOG: &str = include_str!("../../catalog/archetypes.json");

static FALLBACK_ARCHETYPE: Lazy<Archetype> = Lazy::new(|| Archetype {
    name: FALLBACK_ARCHETYPE_NAME.to_string(),
    weight: 1.0,
    platform: Some("Win32".to_string()),
    form_factor: Some(FormFactor::Desktop),
    ..Archetype::default()
});

/// One coherent device class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Archetype {
    pub name: String,
    pub weight: f64,
    /// Optional `navigator.platform` hint, used when the OS name is unrecognised.
    pub platform: Option<String>,
    pub os: WeightTable,
    pub hardware: HardwareTables,
    pub display: DisplayTable,
    pub locale: LocaleTable,
    pub fonts: Vec<String>,
    pub user_agent_template: Option<String>,
    pub form_factor: Option<FormFactor>,
}

impl Default for Archetype {
    fn default() -> Self {
        Self {
            name: String::new(),
            weight: 1.0,
            platform: None,
            os: WeightTable::new(),
            hardware: HardwareTables::default(),
            display: DisplayTable::default(),
            locale: LocaleTable::default(),
            fonts: Vec::new(),
            user_agent_template: None,
            form_factor: None,
        }
    }
}

impl Archetype {
    /// Declared form factor, or the one implied by the name.
    pub fn form_factor(&self) -> FormFactor {
        self.form_factor
            .unwrap_or_else(|| FormFactor::infer(&self.name))
    }

    /// The built-in "Default Windows PC" archetype.
    pub fn fallback() -> &'static Archetype {
        &FALLBACK_ARCHETYPE
    }
}

/// Hardware weight tables. RAM keys are sizes in GB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareTables {
    pub cpu: WeightTable,
    pub ram: WeightTable,
    pub gpu: WeightTable,
}

/// Display options. Resolutions are `"WxH"` strings chosen uniformly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayTable {
    pub resolutions: Vec<String>,
    pub color_depth: Option<u32>,
    pub pixel_depth: Option<u32>,
    pub max_touch_points: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleTable {
    pub languages: Vec<String>,
}

/// Validated, non-empty list of archetypes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeCatalog {
    archetypes: Vec<Archetype>,
}

#[derive(Deserialize)]
struct TomlDocument {
    #[serde(default)]
    archetypes: Vec<Archetype>,
}

impl ArchetypeCatalog {
    /// Build a catalog, rejecting empty lists and unusable weights.
    pub fn new(archetypes: Vec<Archetype>) -> EngineResult<Self> {
        if archetypes.is_empty() {
            return Err(EngineError::CatalogUnavailable(
                "catalog contains no archetypes".to_string(),
            ));
        }
        if let Some(bad) = archetypes
            .iter()
            .find(|a| !a.weight.is_finite() || a.weight < 0.0)
        {
            return Err(EngineError::CatalogUnavailable(format!(
                "archetype '{}' has invalid weight {}",
                bad.name, bad.weight
            )));
        }
        if archetypes.iter().all(|a| a.weight <= 0.0) {
            return Err(EngineError::CatalogUnavailable(
                "archetype weights sum to zero".to_string(),
            ));
        }
        Ok(Self { archetypes })
    }

    /// Catalog holding only the built-in "Default Windows PC" archetype.
    pub fn fallback() -> Self {
        Self {
            archetypes: vec![Archetype::fallback().clone()],
        }
    }

    /// The catalog bundled into the crate.
    pub fn bundled() -> EngineResult<Self> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    /// Parse a JSON document: a top-level array or `{ "archetypes": [...] }`.
    pub fn from_json_str(content: &str) -> EngineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(unavailable)?;
        let list = match value {
            serde_json::Value::Array(items) => serde_json::Value::Array(items),
            serde_json::Value::Object(mut map) => map.remove("archetypes").ok_or_else(|| {
                EngineError::CatalogUnavailable("missing 'archetypes' key".to_string())
            })?,
            _ => {
                return Err(EngineError::CatalogUnavailable(
                    "catalog must be an array or an object".to_string(),
                ))
            }
        };
        let archetypes: Vec<Archetype> = serde_json::from_value(list).map_err(unavailable)?;
        Self::new(archetypes)
    }

    /// Parse a TOML document with `[[archetypes]]` tables.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let document: TomlDocument = toml::from_str(content).map_err(unavailable)?;
        Self::new(document.archetypes)
    }

    /// Read a catalog file; the format follows the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::CatalogUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "toml" => Self::from_toml_str(&content),
            ext => Err(EngineError::CatalogUnavailable(format!(
                "unsupported catalog format: '{}'",
                ext
            ))),
        }
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Archetype weights in catalog order.
    pub fn weights(&self) -> Vec<f64> {
        self.archetypes.iter().map(|a| a.weight).collect()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// True when this is the single built-in fallback archetype.
    pub fn is_fallback(&self) -> bool {
        self.archetypes.len() == 1 && self.archetypes[0] == *Archetype::fallback()
    }
}

fn unavailable(err: impl std::fmt::Display) -> EngineError {
    EngineError::CatalogUnavailable(err.to_string())
}

/// Source of an archetype catalog.
pub trait CatalogLoader: Send + Sync {
    fn load(&self) -> EngineResult<ArchetypeCatalog>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Catalog read from a JSON or TOML file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogLoader for FileCatalog {
    fn load(&self) -> EngineResult<ArchetypeCatalog> {
        ArchetypeCatalog::from_path(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl CatalogLoader for BundledCatalog {
    fn load(&self) -> EngineResult<ArchetypeCatalog> {
        ArchetypeCatalog::bundled()
    }

    fn describe(&self) -> String {
        "bundled catalog".to_string()
    }
}

/// Load through `loader`, substituting the built-in archetype on any failure.
pub fn load_or_fallback(loader: &dyn CatalogLoader) -> ArchetypeCatalog {
    match loader.load() {
        Ok(catalog) => {
            info!(
                "Loaded {} archetypes from {}",
                catalog.len(),
                loader.describe()
            );
            for archetype in catalog.archetypes() {
                debug!(name = %archetype.name, weight = archetype.weight, "archetype");
            }
            catalog
        }
        Err(e) => {
            warn!(
                "Archetype catalog from {} unavailable, using '{}': {}",
                loader.describe(),
                FALLBACK_ARCHETYPE_NAME,
                e
            );
            ArchetypeCatalog::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct BrokenLoader;

    impl CatalogLoader for BrokenLoader {
        fn load(&self) -> EngineResult<ArchetypeCatalog> {
            Err(EngineError::CatalogUnavailable("disk on fire".to_string()))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    const SAMPLE_JSON: &str = r#"[
        {
            "name": "Office Desktop",
            "weight": 3,
            "os": { "Windows 11": 70, "Windows 10": 30 },
            "hardware": {
                "cpu": { "Intel Core i5": 1 },
                "ram": { "8": 1, "16": 1 },
                "gpu": { "Intel(R) UHD Graphics 630": 1 }
            },
            "display": { "resolutions": ["1920x1080"], "colorDepth": 24 },
            "locale": { "languages": ["de-DE", "de", "en"] },
            "userAgentTemplate": "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/{version}"
        },
        { "name": "Gaming Laptop", "weight": 1, "formFactor": "laptop" }
    ]"#;

    #[test]
    fn test_parse_json_array() {
        let catalog = ArchetypeCatalog::from_json_str(SAMPLE_JSON).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.weights(), vec![3.0, 1.0]);

        let office = &catalog.archetypes()[0];
        assert_eq!(office.os.len(), 2);
        assert_eq!(office.hardware.ram.get("16"), Some(&1.0));
        assert_eq!(office.display.color_depth, Some(24));
        assert_eq!(office.display.pixel_depth, None);
        assert_eq!(office.locale.languages[0], "de-DE");
        assert_eq!(office.form_factor(), FormFactor::Desktop);

        let laptop = &catalog.archetypes()[1];
        assert_eq!(laptop.form_factor(), FormFactor::Laptop);
        assert!(laptop.os.is_empty());
    }

    #[test]
    fn test_parse_json_wrapped() {
        let wrapped = format!("{{ \"archetypes\": {} }}", SAMPLE_JSON);
        let catalog = ArchetypeCatalog::from_json_str(&wrapped).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_weight_table_key_order() {
        let catalog = ArchetypeCatalog::from_json_str(SAMPLE_JSON).unwrap();
        let keys: Vec<&String> = catalog.archetypes()[0].os.keys().collect();
        assert_eq!(keys, vec!["Windows 10", "Windows 11"]);
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
            [[archetypes]]
            name = "Creator MacBook"
            weight = 2.5
            formFactor = "laptop"
            os = { "macOS Sonoma" = 1 }
            fonts = ["Helvetica"]

            [archetypes.hardware]
            cpu = { "Apple M2 Pro" = 1 }

            [[archetypes]]
            name = "Budget Desktop"
        "#;
        let catalog = ArchetypeCatalog::from_toml_str(content).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.archetypes()[0].weight, 2.5);
        assert_eq!(catalog.archetypes()[0].hardware.cpu.len(), 1);
        assert_eq!(catalog.archetypes()[1].weight, 1.0);
    }

    #[test]
    fn test_invalid_catalogs_rejected() {
        assert!(ArchetypeCatalog::from_json_str("[]").is_err());
        assert!(ArchetypeCatalog::from_json_str("{}").is_err());
        assert!(ArchetypeCatalog::from_json_str("42").is_err());
        assert!(ArchetypeCatalog::from_json_str("not json").is_err());
        assert!(ArchetypeCatalog::from_json_str(r#"[{"name":"a","weight":-1}]"#).is_err());
        assert!(ArchetypeCatalog::from_json_str(r#"[{"name":"a","weight":0}]"#).is_err());
        assert!(ArchetypeCatalog::from_toml_str("").is_err());
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = ArchetypeCatalog::bundled().unwrap();
        assert!(catalog.len() >= 4);
        assert!(catalog
            .archetypes()
            .iter()
            .any(|a| a.form_factor() == FormFactor::Desktop));
        assert!(catalog
            .archetypes()
            .iter()
            .any(|a| a.form_factor() == FormFactor::Laptop));
        assert!(!catalog.is_fallback());

        // System-on-chip archetypes pin one chip per archetype.
        for archetype in catalog.archetypes() {
            let soc = archetype.hardware.cpu.keys().any(|cpu| {
                cpu.starts_with("Apple") || cpu.contains("Tensor") || cpu.contains("Snapdragon")
            });
            if soc {
                assert_eq!(archetype.hardware.cpu.len(), 1, "{}", archetype.name);
                assert_eq!(archetype.hardware.gpu.len(), 1, "{}", archetype.name);
            }
        }
    }

    #[test]
    fn test_file_catalog_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SAMPLE_JSON.as_bytes()).unwrap();
        let catalog = FileCatalog::new(file.path()).load().unwrap();
        assert_eq!(catalog.len(), 2);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(b"- name: nope").unwrap();
        assert!(FileCatalog::new(yaml.path()).load().is_err());

        assert!(FileCatalog::new("/definitely/not/here.json").load().is_err());
    }

    #[test]
    fn test_loader_failure_falls_back() {
        let catalog = load_or_fallback(&BrokenLoader);
        assert!(catalog.is_fallback());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.archetypes()[0].name, FALLBACK_ARCHETYPE_NAME);
        assert_eq!(catalog.archetypes()[0].weight, 1.0);
    }

    #[test]
    fn test_loader_success_passes_through() {
        let catalog = load_or_fallback(&BundledCatalog);
        assert!(!catalog.is_fallback());
    }
}
