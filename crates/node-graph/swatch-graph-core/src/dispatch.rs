//! Node-type dispatch tables.
//!
//! A table maps a node type identifier to either a fixed socket locator or a
//! bespoke evaluator. Lookup is first-match in definition order, so the order
//! of entries is part of a table's meaning.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::host::Direction;

/// The quantity a table resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Albedo,
    Metallic,
    Roughness,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Albedo, Purpose::Metallic, Purpose::Roughness];
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::Albedo => f.write_str("albedo"),
            Purpose::Metallic => f.write_str("metallic"),
            Purpose::Roughness => f.write_str("roughness"),
        }
    }
}

/// Node types whose meaningful value needs more than a socket read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluator {
    Clamp,
    ColorRamp,
    Mix,
    /// Image and environment textures.
    Image,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DispatchEntry {
    /// Read this node's `index`-th socket on `direction`.
    Locator { direction: Direction, index: usize },
    /// Hand the node to a custom evaluator. Evaluators are terminal.
    Evaluator { evaluator: Evaluator },
}

impl DispatchEntry {
    pub const fn input(index: usize) -> Self {
        DispatchEntry::Locator {
            direction: Direction::Inputs,
            index,
        }
    }

    pub const fn output(index: usize) -> Self {
        DispatchEntry::Locator {
            direction: Direction::Outputs,
            index,
        }
    }

    pub const fn evaluator(evaluator: Evaluator) -> Self {
        DispatchEntry::Evaluator { evaluator }
    }
}

/// How table keys are compared against node type identifiers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Key must equal the identifier.
    #[default]
    Exact,
    /// Key must be a substring of the identifier. Prone to collisions between
    /// unrelated types; kept for hosts with decorated identifiers.
    Contains,
}

/// A keyed entry as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub node_type: String,
    pub entry: DispatchEntry,
}

/// Insertion-ordered mapping from node type to [`DispatchEntry`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchTable {
    entries: Vec<(String, DispatchEntry)>,
    index: HashMap<String, usize>,
    policy: MatchPolicy,
}

const FIRST_INPUT: DispatchEntry = DispatchEntry::input(0);
const IMAGE: DispatchEntry = DispatchEntry::evaluator(Evaluator::Image);

/// Entries whose meaning does not depend on the quantity being resolved.
const UNIVERSAL: &[(&str, DispatchEntry)] = &[
    ("ShaderNodeRGB", DispatchEntry::output(0)),
    ("ShaderNodeValue", DispatchEntry::output(0)),
    ("ShaderNodeMapRange", FIRST_INPUT),
    ("ShaderNodeSeparateColor", FIRST_INPUT),
    ("NodeGroupOutput", FIRST_INPUT),
    ("ShaderNodeOutputMaterial", FIRST_INPUT),
    ("ShaderNodeBrightContrast", FIRST_INPUT),
    ("ShaderNodeGamma", FIRST_INPUT),
    ("ShaderNodeHueSaturation", DispatchEntry::input(4)),
    ("ShaderNodeInvert", DispatchEntry::input(1)),
    ("ShaderNodeRGBCurve", DispatchEntry::input(1)),
    ("ShaderNodeClamp", DispatchEntry::evaluator(Evaluator::Clamp)),
    ("ShaderNodeValToRGB", DispatchEntry::evaluator(Evaluator::ColorRamp)),
    ("ShaderNodeMix", DispatchEntry::evaluator(Evaluator::Mix)),
    ("ShaderNodeMixRGB", DispatchEntry::evaluator(Evaluator::Mix)),
];

const ALBEDO: &[(&str, DispatchEntry)] = &[
    ("ShaderNodeBsdfPrincipled", FIRST_INPUT),
    ("ShaderNodeEmission", FIRST_INPUT),
    ("ShaderNodeBsdfToon", FIRST_INPUT),
    ("ShaderNodeBsdfAnisotropic", FIRST_INPUT),
    ("ShaderNodeBsdfDiffuse", FIRST_INPUT),
    ("ShaderNodeBsdfGlass", FIRST_INPUT),
    ("ShaderNodeBsdfGlossy", FIRST_INPUT),
    ("ShaderNodeBsdfHair", FIRST_INPUT),
    ("ShaderNodeBsdfHairPrincipled", FIRST_INPUT),
    ("ShaderNodeBsdfRefraction", FIRST_INPUT),
    ("ShaderNodeSubsurfaceScattering", FIRST_INPUT),
    ("ShaderNodeBsdfTranslucent", FIRST_INPUT),
    ("ShaderNodeBsdfVelvet", FIRST_INPUT),
    ("ShaderNodeTexImage", IMAGE),
    ("ShaderNodeTexEnvironment", IMAGE),
];

const METALLIC: &[(&str, DispatchEntry)] = &[
    ("ShaderNodeBsdfPrincipled", DispatchEntry::input(6)),
    ("ShaderNodeTexImage", IMAGE),
    ("ShaderNodeTexEnvironment", IMAGE),
];

const ROUGHNESS: &[(&str, DispatchEntry)] = &[
    ("ShaderNodeBsdfPrincipled", DispatchEntry::input(9)),
    ("ShaderNodeBsdfToon", DispatchEntry::input(1)),
    ("ShaderNodeBsdfAnisotropic", DispatchEntry::input(1)),
    ("ShaderNodeBsdfDiffuse", DispatchEntry::input(1)),
    ("ShaderNodeBsdfGlass", DispatchEntry::input(1)),
    ("ShaderNodeBsdfGlossy", DispatchEntry::input(1)),
    ("ShaderNodeBsdfHairPrincipled", DispatchEntry::input(5)),
    ("ShaderNodeBsdfRefraction", DispatchEntry::input(1)),
    ("ShaderNodeBsdfVelvet", DispatchEntry::input(1)),
    ("ShaderNodeTexImage", IMAGE),
    ("ShaderNodeTexEnvironment", IMAGE),
];

impl DispatchTable {
    pub fn new(policy: MatchPolicy) -> Self {
        DispatchTable {
            entries: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    fn from_static(entries: &[(&str, DispatchEntry)]) -> Self {
        let mut table = DispatchTable::default();
        for (key, entry) in entries {
            table.insert(*key, *entry);
        }
        table
    }

    /// Entries shared by every purpose.
    pub fn universal() -> Self {
        Self::from_static(UNIVERSAL)
    }

    /// Built-in table for `purpose`: the purpose-specific entries with the
    /// universal entries overlaid on top.
    pub fn builtin(purpose: Purpose) -> Self {
        let base = match purpose {
            Purpose::Albedo => ALBEDO,
            Purpose::Metallic => METALLIC,
            Purpose::Roughness => ROUGHNESS,
        };
        let mut table = Self::from_static(base);
        table.overlay(&Self::universal());
        table
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Insert or replace an entry. A replaced key keeps its position; a new
    /// key is appended.
    pub fn insert(&mut self, node_type: impl Into<String>, entry: DispatchEntry) {
        let node_type = node_type.into();
        match self.index.get(&node_type) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.index.insert(node_type.clone(), self.entries.len());
                self.entries.push((node_type, entry));
            }
        }
    }

    /// Apply every entry of `other` on top of this table, in `other`'s order.
    pub fn overlay(&mut self, other: &DispatchTable) {
        for (key, entry) in &other.entries {
            self.insert(key.clone(), *entry);
        }
    }

    /// Apply configured entries on top of this table.
    pub fn extend_entries<'a>(&mut self, entries: impl IntoIterator<Item = &'a TableEntry>) {
        for TableEntry { node_type, entry } in entries {
            self.insert(node_type.clone(), *entry);
        }
    }

    /// First entry matching `type_id` under the table's policy, with its key.
    pub fn lookup(&self, type_id: &str) -> Option<(&str, DispatchEntry)> {
        match self.policy {
            MatchPolicy::Exact => self
                .index
                .get(type_id)
                .map(|&pos| (self.entries[pos].0.as_str(), self.entries[pos].1)),
            MatchPolicy::Contains => self
                .entries
                .iter()
                .find(|(key, _)| type_id.contains(key.as_str()))
                .map(|(key, entry)| (key.as_str(), *entry)),
        }
    }

    pub fn get(&self, node_type: &str) -> Option<DispatchEntry> {
        self.index.get(node_type).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DispatchEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), *entry))
    }

    /// Entries in definition order, as configuration would spell them.
    pub fn to_entries(&self) -> Vec<TableEntry> {
        self.iter()
            .map(|(node_type, entry)| TableEntry {
                node_type: node_type.to_string(),
                entry,
            })
            .collect()
    }
}

/// The three per-purpose tables, built once and shared by every walk.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchTables {
    pub albedo: DispatchTable,
    pub metallic: DispatchTable,
    pub roughness: DispatchTable,
}

impl DispatchTables {
    pub fn builtin(policy: MatchPolicy) -> Self {
        DispatchTables {
            albedo: DispatchTable::builtin(Purpose::Albedo).with_policy(policy),
            metallic: DispatchTable::builtin(Purpose::Metallic).with_policy(policy),
            roughness: DispatchTable::builtin(Purpose::Roughness).with_policy(policy),
        }
    }

    pub fn get(&self, purpose: Purpose) -> &DispatchTable {
        match purpose {
            Purpose::Albedo => &self.albedo,
            Purpose::Metallic => &self.metallic,
            Purpose::Roughness => &self.roughness,
        }
    }

    pub fn get_mut(&mut self, purpose: Purpose) -> &mut DispatchTable {
        match purpose {
            Purpose::Albedo => &mut self.albedo,
            Purpose::Metallic => &mut self.metallic,
            Purpose::Roughness => &mut self.roughness,
        }
    }
}

impl Default for DispatchTables {
    fn default() -> Self {
        Self::builtin(MatchPolicy::default())
    }
}
