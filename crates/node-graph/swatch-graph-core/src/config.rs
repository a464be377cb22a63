//! Resolver configuration.

use serde::{Deserialize, Serialize};
use swatch_api_core::Color;

use crate::dispatch::{DispatchTables, MatchPolicy, Purpose, TableEntry};
use crate::walk::{ImageSampler, WalkSettings, DEFAULT_MAX_DEPTH};

/// Tunables for a [`MaterialResolver`](crate::resolver::MaterialResolver).
///
/// Every field may be omitted from JSON; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Pixels with alpha below this are ignored when sampling images.
    pub alpha_threshold: f32,
    /// Recursion bound for a single walk.
    pub max_depth: usize,
    pub match_policy: MatchPolicy,
    pub defaults: PurposeDefaults,
    /// Entries applied on top of the built-in tables, per purpose.
    pub overrides: TableOverrides,
}

/// Values reported when a graph carries no information.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurposeDefaults {
    pub albedo: Color,
    pub metallic: f32,
    pub roughness: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOverrides {
    pub albedo: Vec<TableEntry>,
    pub metallic: Vec<TableEntry>,
    pub roughness: Vec<TableEntry>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: ImageSampler::DEFAULT_ALPHA_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            match_policy: MatchPolicy::Exact,
            defaults: PurposeDefaults::default(),
            overrides: TableOverrides::default(),
        }
    }
}

impl Default for PurposeDefaults {
    fn default() -> Self {
        Self {
            albedo: Color::DEFAULT_ALBEDO,
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

impl TableOverrides {
    pub fn get(&self, purpose: Purpose) -> &[TableEntry] {
        match purpose {
            Purpose::Albedo => &self.albedo,
            Purpose::Metallic => &self.metallic,
            Purpose::Roughness => &self.roughness,
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn walk_settings(&self) -> WalkSettings {
        WalkSettings {
            max_depth: self.max_depth,
            alpha_threshold: self.alpha_threshold,
        }
    }

    /// Built-in tables under the configured policy with overrides applied.
    pub fn build_tables(&self) -> DispatchTables {
        let mut tables = DispatchTables::builtin(self.match_policy);
        for purpose in Purpose::ALL {
            tables
                .get_mut(purpose)
                .extend_entries(self.overrides.get(purpose));
        }
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchEntry, Evaluator};

    #[test]
    fn empty_json_yields_defaults() {
        let config = ResolverConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.alpha_threshold, 0.7);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.defaults.albedo, Color([0.8, 0.8, 0.8, 1.0]));
        assert_eq!(config.defaults.roughness, 0.5);
    }

    #[test]
    fn partial_defaults_keep_remaining_fields() {
        let config = ResolverConfig::from_json_str(
            r#"{ "match_policy": "contains", "defaults": { "roughness": 0.8 } }"#,
        )
        .expect("parse");
        assert_eq!(config.match_policy, MatchPolicy::Contains);
        assert_eq!(config.defaults.roughness, 0.8);
        assert_eq!(config.defaults.metallic, 0.0);
        assert_eq!(config.defaults.albedo, Color::DEFAULT_ALBEDO);
    }

    #[test]
    fn overrides_extend_the_builtin_tables() {
        let config = ResolverConfig::from_json_str(
            r#"{
                "overrides": {
                    "metallic": [
                        { "node_type": "ShaderNodeBsdfAnisotropic",
                          "entry": { "kind": "locator", "direction": "inputs", "index": 2 } },
                        { "node_type": "ShaderNodeGamma",
                          "entry": { "kind": "evaluator", "evaluator": "clamp" } }
                    ]
                }
            }"#,
        )
        .expect("parse");
        let tables = config.build_tables();
        let metallic = tables.get(Purpose::Metallic);
        assert_eq!(
            metallic.get("ShaderNodeBsdfAnisotropic"),
            Some(DispatchEntry::input(2))
        );
        assert_eq!(
            metallic.get("ShaderNodeGamma"),
            Some(DispatchEntry::evaluator(Evaluator::Clamp))
        );
        // Other purposes are untouched.
        assert_eq!(
            tables.get(Purpose::Albedo).get("ShaderNodeGamma"),
            Some(DispatchEntry::input(0))
        );
    }

    #[test]
    fn configured_policy_reaches_every_table() {
        let config = ResolverConfig {
            match_policy: MatchPolicy::Contains,
            ..Default::default()
        };
        let tables = config.build_tables();
        for purpose in Purpose::ALL {
            assert_eq!(tables.get(purpose).policy(), MatchPolicy::Contains);
        }
    }
}
