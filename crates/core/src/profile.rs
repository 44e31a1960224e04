//! Profiles — named bundles of coding standards for one technology context.
//!
//! A profile is parsed from one YAML document (see `codeward-store`) into a
//! [`ProfileDocument`], then validated and canonicalized into a [`Profile`]
//! by [`ProfileDocument::into_profile`]. Canonicalization happens exactly
//! once, at load time:
//!
//! - hexagonal profiles without layers receive [`default_hexagonal_layers`]
//! - naming conventions in any accepted shape become one [`NamingConventions`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;

/// Supported architecture styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchitectureStyle {
    Hexagonal,
    Clean,
    Onion,
    Layered,
    Microservices,
    #[serde(alias = "modular_monolith")]
    ModularMonolith,
}

impl ArchitectureStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hexagonal => "hexagonal",
            Self::Clean => "clean",
            Self::Onion => "onion",
            Self::Layered => "layered",
            Self::Microservices => "microservices",
            Self::ModularMonolith => "modular-monolith",
        }
    }
}

impl fmt::Display for ArchitectureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named partition of a codebase and the layers it may depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "depends_on")]
    pub allowed_dependencies: Vec<String>,
}

impl Layer {
    fn new(name: &str, description: &str, allowed: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            allowed_dependencies: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The fixed layer set given to hexagonal profiles that declare none.
///
/// Dependencies point inward: infrastructure → application → domain.
pub fn default_hexagonal_layers() -> Vec<Layer> {
    vec![
        Layer::new(
            "domain",
            "Entities, value objects and domain services; no framework code",
            &[],
        ),
        Layer::new(
            "application",
            "Use cases and ports orchestrating the domain",
            &["domain"],
        ),
        Layer::new(
            "infrastructure",
            "Adapters for persistence, messaging, HTTP and other frameworks",
            &["application", "domain"],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub style: ArchitectureStyle,

    #[serde(default)]
    pub layers: Vec<Layer>,
}

/// Domain-driven-design pattern toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DddPatterns {
    pub aggregates: bool,
    pub value_objects: bool,
    pub domain_events: bool,
    pub repositories: bool,
    pub factories: bool,
    pub domain_services: bool,
}

impl DddPatterns {
    /// Names of the enabled patterns, in declaration order.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            (self.aggregates, "aggregates"),
            (self.value_objects, "value objects"),
            (self.domain_events, "domain events"),
            (self.repositories, "repositories"),
            (self.factories, "factories"),
            (self.domain_services, "domain services"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

/// Numeric code-quality thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub max_method_lines: u32,
    pub max_class_lines: u32,
    pub max_file_lines: u32,
    pub max_parameters: u32,
    pub max_cyclomatic_complexity: u32,
    pub min_test_coverage: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_method_lines: 20,
            max_class_lines: 200,
            max_file_lines: 400,
            max_parameters: 4,
            max_cyclomatic_complexity: 10,
            min_test_coverage: 80,
        }
    }
}

impl QualityThresholds {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let positive = [
            ("max_method_lines", self.max_method_lines),
            ("max_class_lines", self.max_class_lines),
            ("max_file_lines", self.max_file_lines),
            ("max_parameters", self.max_parameters),
            ("max_cyclomatic_complexity", self.max_cyclomatic_complexity),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(format!("{name} must be greater than 0"));
        }
        if self.min_test_coverage > 100 {
            return Err("min_test_coverage must be <= 100".into());
        }
        Ok(())
    }
}

// ── Naming conventions ────────────────────────────────────────────────────

/// One entry of a naming-conventions map as written in YAML: either a rule
/// or a nested group of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamingEntry {
    Rule(String),
    Group(BTreeMap<String, String>),
}

/// Canonical naming conventions.
///
/// Flat `key: rule` entries live in `general`. The recognized nested groups
/// `general`, `suffixes` and `testing` map onto their fields; any other
/// nested group is flattened into `general` as `group.key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConventions {
    pub general: BTreeMap<String, String>,
    pub suffixes: BTreeMap<String, String>,
    pub testing: BTreeMap<String, String>,
}

impl NamingConventions {
    pub fn from_entries(entries: BTreeMap<String, NamingEntry>) -> Self {
        let mut naming = Self::default();
        for (key, entry) in entries {
            match (key.as_str(), entry) {
                (_, NamingEntry::Rule(rule)) => {
                    naming.general.insert(key, rule);
                }
                ("general", NamingEntry::Group(group)) => naming.general.extend(group),
                ("suffixes", NamingEntry::Group(group)) => naming.suffixes.extend(group),
                ("testing", NamingEntry::Group(group)) => naming.testing.extend(group),
                (_, NamingEntry::Group(group)) => {
                    for (inner, rule) in group {
                        naming.general.insert(format!("{key}.{inner}"), rule);
                    }
                }
            }
        }
        naming
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.suffixes.is_empty() && self.testing.is_empty()
    }

    /// Non-empty groups in rendering order.
    pub fn groups(&self) -> Vec<(&'static str, &BTreeMap<String, String>)> {
        [
            ("General", &self.general),
            ("Suffixes", &self.suffixes),
            ("Testing", &self.testing),
        ]
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
        .collect()
    }
}

/// A named technology with free-form rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,

    #[serde(default)]
    pub rules: BTreeMap<String, serde_json::Value>,
}

// ── Profile ───────────────────────────────────────────────────────────────

/// The on-disk shape of a profile document.
///
/// Sections this crate does not model (`testing`, `api`, ...) land in
/// `extra` and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub language: Option<String>,

    pub architecture: Architecture,

    #[serde(default)]
    pub ddd: DddPatterns,

    #[serde(default, alias = "quality")]
    pub code_quality: QualityThresholds,

    #[serde(default, alias = "naming_conventions")]
    pub naming: BTreeMap<String, NamingEntry>,

    #[serde(default)]
    pub technologies: Vec<Technology>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A loaded, validated and canonicalized profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub language: Option<String>,
    pub architecture: Architecture,
    pub ddd: DddPatterns,
    pub code_quality: QualityThresholds,
    pub naming: NamingConventions,
    pub technologies: Vec<Technology>,
}

impl ProfileDocument {
    /// Validate and canonicalize into a [`Profile`] with the given id.
    pub fn into_profile(self, id: &str) -> Result<Profile, ValidationError> {
        let invalid = |reason: String| ValidationError::Profile {
            id: id.to_string(),
            reason,
        };

        self.code_quality.validate().map_err(invalid)?;

        let mut architecture = self.architecture;
        if architecture.style == ArchitectureStyle::Hexagonal && architecture.layers.is_empty() {
            architecture.layers = default_hexagonal_layers();
        }
        validate_layers(&architecture.layers).map_err(invalid)?;

        Ok(Profile {
            id: id.to_string(),
            name: self.name.unwrap_or_else(|| id.to_string()),
            description: self.description,
            language: self.language,
            architecture,
            ddd: self.ddd,
            code_quality: self.code_quality,
            naming: NamingConventions::from_entries(self.naming),
            technologies: self.technologies,
        })
    }
}

fn validate_layers(layers: &[Layer]) -> Result<(), String> {
    for (i, layer) in layers.iter().enumerate() {
        if layer.name.trim().is_empty() {
            return Err(format!("layer #{} has an empty name", i + 1));
        }
        if layers[..i].iter().any(|l| l.name == layer.name) {
            return Err(format!("layer '{}' is declared twice", layer.name));
        }
    }
    for layer in layers {
        for dep in &layer.allowed_dependencies {
            if !layers.iter().any(|l| &l.name == dep) {
                return Err(format!(
                    "layer '{}' depends on undeclared layer '{dep}'",
                    layer.name
                ));
            }
        }
    }
    Ok(())
}

/// What a profile load does with a document that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidProfilePolicy {
    /// Log and record the rejected file, keep loading the others.
    #[default]
    Skip,
    /// Fail the whole load on the first invalid file.
    Abort,
}

/// Compact listing entry for a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub architecture: ArchitectureStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            architecture: profile.architecture.style,
            language: profile.language.clone(),
        }
    }
}
