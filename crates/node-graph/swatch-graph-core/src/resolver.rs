//! Material-level resolution built on the walker.
//!
//! The `resolve_*` family is total: structural problems are logged and
//! replaced by the purpose default, and non-finite results never escape.
//! Use the `try_resolve_*` family to observe [`WalkError`]s instead.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use swatch_api_core::Color;

use crate::config::ResolverConfig;
use crate::dispatch::{DispatchTables, Purpose};
use crate::graph::{GraphError, MaterialGraph};
use crate::host::NodeGraph;
use crate::walk::{find_output, Quantity, WalkError, Walker};

/// The three quantities resolved for one material.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub base_color: Color,
    pub metallic: f32,
    pub roughness: f32,
}

/// Owns the dispatch tables built from a [`ResolverConfig`] and resolves any
/// number of graphs against them.
#[derive(Clone, Debug)]
pub struct MaterialResolver {
    config: ResolverConfig,
    tables: DispatchTables,
}

impl Default for MaterialResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl MaterialResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let tables = config.build_tables();
        MaterialResolver { config, tables }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn tables(&self) -> &DispatchTables {
        &self.tables
    }

    fn walker<'a, G: NodeGraph>(&'a self, graph: &'a G, purpose: Purpose) -> Walker<'a, G> {
        Walker::with_settings(graph, self.tables.get(purpose), self.config.walk_settings())
    }

    /// Resolve `purpose` from `node`, reporting structural errors.
    pub fn try_resolve<G: NodeGraph, T: Quantity>(
        &self,
        graph: &G,
        node: G::Node,
        purpose: Purpose,
        default: T,
    ) -> Result<T, WalkError> {
        self.walker(graph, purpose).resolve(node, default)
    }

    pub fn try_resolve_albedo<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
    ) -> Result<Color, WalkError> {
        self.try_resolve(graph, node, Purpose::Albedo, self.config.defaults.albedo)
    }

    pub fn try_resolve_metallic<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
    ) -> Result<f32, WalkError> {
        self.try_resolve(graph, node, Purpose::Metallic, self.config.defaults.metallic)
    }

    pub fn try_resolve_roughness<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
    ) -> Result<f32, WalkError> {
        self.try_resolve(graph, node, Purpose::Roughness, self.config.defaults.roughness)
    }

    fn resolve_or_default<G: NodeGraph, T: Quantity>(
        &self,
        graph: &G,
        node: G::Node,
        purpose: Purpose,
        default: T,
    ) -> T {
        match self.try_resolve(graph, node, purpose, default) {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                warn!("{purpose} of {node:?} is not finite ({value:?}); using default");
                default
            }
            Err(err) => {
                warn!("{purpose} of {node:?} could not be resolved: {err}; using default");
                default
            }
        }
    }

    pub fn resolve_albedo<G: NodeGraph>(&self, graph: &G, node: G::Node) -> Color {
        self.resolve_albedo_with_default(graph, node, self.config.defaults.albedo)
    }

    pub fn resolve_albedo_with_default<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
        default: Color,
    ) -> Color {
        self.resolve_or_default(graph, node, Purpose::Albedo, default)
    }

    pub fn resolve_metallic<G: NodeGraph>(&self, graph: &G, node: G::Node) -> f32 {
        self.resolve_metallic_with_default(graph, node, self.config.defaults.metallic)
    }

    pub fn resolve_metallic_with_default<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
        default: f32,
    ) -> f32 {
        self.resolve_or_default(graph, node, Purpose::Metallic, default)
    }

    pub fn resolve_roughness<G: NodeGraph>(&self, graph: &G, node: G::Node) -> f32 {
        self.resolve_roughness_with_default(graph, node, self.config.defaults.roughness)
    }

    pub fn resolve_roughness_with_default<G: NodeGraph>(
        &self,
        graph: &G,
        node: G::Node,
        default: f32,
    ) -> f32 {
        self.resolve_or_default(graph, node, Purpose::Roughness, default)
    }

    /// All three quantities starting from `node`, usually an output node but
    /// any node is accepted.
    pub fn resolve<G: NodeGraph>(&self, graph: &G, node: G::Node) -> Appearance {
        Appearance {
            base_color: self.resolve_albedo(graph, node),
            metallic: self.resolve_metallic(graph, node),
            roughness: self.resolve_roughness(graph, node),
        }
    }

    /// Resolve from the tree's output node, if it has one.
    pub fn resolve_tree<G: NodeGraph>(&self, graph: &G, tree: G::Tree) -> Option<Appearance> {
        let Some(output) = find_output(graph, tree) else {
            debug!("tree {tree:?} has no output node");
            return None;
        };
        Some(self.resolve(graph, output))
    }

    /// Resolve a named material. `Ok(None)` when the material does not use
    /// nodes or its tree has no output node.
    pub fn resolve_material(
        &self,
        graph: &MaterialGraph,
        name: &str,
    ) -> Result<Option<Appearance>, GraphError> {
        let material = graph
            .material(name)
            .ok_or_else(|| GraphError::UnknownMaterial(name.to_string()))?;
        let Some(tree_name) = &material.node_tree else {
            debug!("material '{name}' does not use nodes");
            return Ok(None);
        };
        let tree = graph
            .tree(tree_name)
            .ok_or_else(|| GraphError::UnknownTree(tree_name.clone()))?;
        Ok(self.resolve_tree(graph, tree))
    }

    /// Every material that resolves, in snapshot order.
    pub fn resolve_all(&self, graph: &MaterialGraph) -> Vec<(String, Appearance)> {
        graph
            .materials()
            .iter()
            .filter_map(|material| match self.resolve_material(graph, &material.name) {
                Ok(Some(appearance)) => Some((material.name.clone(), appearance)),
                Ok(None) => None,
                Err(err) => {
                    warn!("skipping material '{}': {err}", material.name);
                    None
                }
            })
            .collect()
    }
}
