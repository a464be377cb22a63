//! Validated, indexed form of a [`GraphSpec`] implementing [`NodeGraph`].

use hashbrown::HashMap;
use swatch_api_core::json::JsonError;
use swatch_api_core::Value;
use thiserror::Error;

use crate::host::{ClampMode, Direction, MixDataType, NodeGraph, NodeKind, SocketRef};
use crate::ramp::ColorRamp;
use crate::types::{
    GraphSpec, ImageSpec, MaterialSpec, NodeSpec, SocketSpec, TreeSpec, GROUP_INPUT_TYPE,
    GROUP_OUTPUT_TYPE,
};

/// Errors raised while loading or validating a graph snapshot.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error("graph snapshot does not deserialize: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("duplicate tree '{0}'")]
    DuplicateTree(String),
    #[error("duplicate node '{node}' in tree '{tree}'")]
    DuplicateNode { tree: String, node: String },
    #[error("duplicate image '{0}'")]
    DuplicateImage(String),
    #[error("duplicate material '{0}'")]
    DuplicateMaterial(String),
    #[error("unknown tree '{0}'")]
    UnknownTree(String),
    #[error("unknown node '{node}' in tree '{tree}'")]
    UnknownNode { tree: String, node: String },
    #[error("node '{node}' references unknown image '{image}'")]
    UnknownImage { node: String, image: String },
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),
    #[error("node '{node}' in tree '{tree}' has no {direction} socket {index}")]
    SocketOutOfRange {
        tree: String,
        node: String,
        direction: Direction,
        index: usize,
    },
    #[error("input {socket} of node '{node}' in tree '{tree}' has more than one link")]
    MultipleLinks {
        tree: String,
        node: String,
        socket: usize,
    },
    #[error("image '{image}' has {len} pixel floats, not a multiple of 4")]
    RaggedPixels { image: String, len: usize },
}

/// Index of a tree inside a [`MaterialGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TreeHandle(pub usize);

/// Index of a node inside a [`MaterialGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub tree: usize,
    pub node: usize,
}

#[derive(Debug, Clone)]
struct IndexedNode {
    spec: NodeSpec,
    kind: NodeKind<TreeHandle>,
    image: Option<usize>,
    /// Upstream output socket per input, by input position.
    input_links: Vec<Option<SocketRef<NodeHandle>>>,
}

#[derive(Debug, Clone)]
struct IndexedTree {
    name: String,
    nodes: Vec<IndexedNode>,
    by_name: HashMap<String, usize>,
}

/// An owned shading-graph snapshot ready for resolution.
#[derive(Debug, Clone, Default)]
pub struct MaterialGraph {
    trees: Vec<IndexedTree>,
    tree_index: HashMap<String, TreeHandle>,
    images: Vec<ImageSpec>,
    materials: Vec<MaterialSpec>,
    material_index: HashMap<String, usize>,
}

fn index_names<'a, E>(
    names: impl Iterator<Item = &'a str>,
    duplicate: impl Fn(&str) -> E,
) -> Result<HashMap<String, usize>, E> {
    let mut index = HashMap::new();
    for (pos, name) in names.enumerate() {
        if index.insert(name.to_string(), pos).is_some() {
            return Err(duplicate(name));
        }
    }
    Ok(index)
}

impl MaterialGraph {
    /// Validate `spec` and build lookup indices.
    pub fn from_spec(spec: GraphSpec) -> Result<Self, GraphError> {
        let GraphSpec {
            trees,
            images,
            materials,
        } = spec;

        let tree_index: HashMap<String, TreeHandle> =
            index_names(trees.iter().map(|t| t.name.as_str()), |n| {
                GraphError::DuplicateTree(n.to_string())
            })?
            .into_iter()
            .map(|(name, pos)| (name, TreeHandle(pos)))
            .collect();
        let image_index = index_names(images.iter().map(|i| i.name.as_str()), |n| {
            GraphError::DuplicateImage(n.to_string())
        })?;
        let material_index = index_names(materials.iter().map(|m| m.name.as_str()), |n| {
            GraphError::DuplicateMaterial(n.to_string())
        })?;

        for image in &images {
            if let Some(pixels) = &image.pixels {
                if pixels.len() % 4 != 0 {
                    return Err(GraphError::RaggedPixels {
                        image: image.name.clone(),
                        len: pixels.len(),
                    });
                }
            }
        }
        for material in &materials {
            if let Some(tree) = &material.node_tree {
                if !tree_index.contains_key(tree) {
                    return Err(GraphError::UnknownTree(tree.clone()));
                }
            }
        }

        let indexed = trees
            .into_iter()
            .enumerate()
            .map(|(pos, tree)| index_tree(pos, tree, &tree_index, &image_index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MaterialGraph {
            trees: indexed,
            tree_index,
            images,
            materials,
            material_index,
        })
    }

    /// Parse and validate a JSON snapshot in one go.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Self::from_spec(GraphSpec::from_json_str(json)?)
    }

    pub fn tree(&self, name: &str) -> Option<TreeHandle> {
        self.tree_index.get(name).copied()
    }

    pub fn tree_name(&self, tree: TreeHandle) -> &str {
        &self.trees[tree.0].name
    }

    pub fn node(&self, tree: &str, node: &str) -> Option<NodeHandle> {
        let handle = self.tree(tree)?;
        self.trees[handle.0]
            .by_name
            .get(node)
            .map(|&pos| NodeHandle {
                tree: handle.0,
                node: pos,
            })
    }

    pub fn node_name(&self, node: NodeHandle) -> &str {
        &self.entry(node).spec.name
    }

    pub fn materials(&self) -> &[MaterialSpec] {
        &self.materials
    }

    pub fn material(&self, name: &str) -> Option<&MaterialSpec> {
        self.material_index.get(name).map(|&pos| &self.materials[pos])
    }

    fn entry(&self, node: NodeHandle) -> &IndexedNode {
        &self.trees[node.tree].nodes[node.node]
    }

    fn socket_spec(&self, socket: SocketRef<NodeHandle>) -> Option<&SocketSpec> {
        let spec = &self.entry(socket.node).spec;
        match socket.direction {
            Direction::Inputs => spec.inputs.get(socket.index),
            Direction::Outputs => spec.outputs.get(socket.index),
        }
    }
}

fn index_tree(
    pos: usize,
    tree: TreeSpec,
    tree_index: &HashMap<String, TreeHandle>,
    image_index: &HashMap<String, usize>,
) -> Result<IndexedTree, GraphError> {
    let TreeSpec { name, nodes, links } = tree;
    let by_name = index_names(nodes.iter().map(|n| n.name.as_str()), |n| {
        GraphError::DuplicateNode {
            tree: name.clone(),
            node: n.to_string(),
        }
    })?;

    let mut indexed = Vec::with_capacity(nodes.len());
    for mut spec in nodes {
        let kind = if let Some(nested) = &spec.params.node_tree {
            let handle = tree_index
                .get(nested)
                .copied()
                .ok_or_else(|| GraphError::UnknownTree(nested.clone()))?;
            NodeKind::GroupInstance(handle)
        } else if spec.type_id == GROUP_INPUT_TYPE {
            NodeKind::GroupInput
        } else if spec.type_id == GROUP_OUTPUT_TYPE {
            NodeKind::GroupOutput
        } else {
            NodeKind::Regular
        };
        let image = match &spec.params.image {
            Some(image) => Some(image_index.get(image).copied().ok_or_else(|| {
                GraphError::UnknownImage {
                    node: spec.name.clone(),
                    image: image.clone(),
                }
            })?),
            None => None,
        };
        if let Some(ramp) = spec.params.color_ramp.take() {
            spec.params.color_ramp = Some(ColorRamp::new(ramp.interpolation, ramp.elements));
        }
        let input_links = vec![None; spec.inputs.len()];
        indexed.push(IndexedNode {
            spec,
            kind,
            image,
            input_links,
        });
    }

    let lookup = |node: &str| {
        by_name
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode {
                tree: name.clone(),
                node: node.to_string(),
            })
    };
    let out_of_range = |node: &str, direction: Direction, index: usize| {
        GraphError::SocketOutOfRange {
            tree: name.clone(),
            node: node.to_string(),
            direction,
            index,
        }
    };

    for link in &links {
        let from = lookup(&link.from_node)?;
        let to = lookup(&link.to_node)?;
        if link.from_socket >= indexed[from].spec.outputs.len() {
            return Err(out_of_range(
                &link.from_node,
                Direction::Outputs,
                link.from_socket,
            ));
        }
        let slot = indexed[to]
            .input_links
            .get_mut(link.to_socket)
            .ok_or_else(|| out_of_range(&link.to_node, Direction::Inputs, link.to_socket))?;
        if slot.is_some() {
            return Err(GraphError::MultipleLinks {
                tree: name.clone(),
                node: link.to_node.clone(),
                socket: link.to_socket,
            });
        }
        *slot = Some(SocketRef::output(
            NodeHandle {
                tree: pos,
                node: from,
            },
            link.from_socket,
        ));
    }

    Ok(IndexedTree {
        name,
        nodes: indexed,
        by_name,
    })
}

impl NodeGraph for MaterialGraph {
    type Node = NodeHandle;
    type Tree = TreeHandle;

    fn type_identifier(&self, node: NodeHandle) -> &str {
        &self.entry(node).spec.type_id
    }

    fn kind(&self, node: NodeHandle) -> NodeKind<TreeHandle> {
        self.entry(node).kind
    }

    fn socket_count(&self, node: NodeHandle, direction: Direction) -> usize {
        let spec = &self.entry(node).spec;
        match direction {
            Direction::Inputs => spec.inputs.len(),
            Direction::Outputs => spec.outputs.len(),
        }
    }

    fn default_value(&self, socket: SocketRef<NodeHandle>) -> Option<Value> {
        self.socket_spec(socket)?.default_value.clone()
    }

    fn link_source(&self, socket: SocketRef<NodeHandle>) -> Option<SocketRef<NodeHandle>> {
        match socket.direction {
            Direction::Inputs => self
                .entry(socket.node)
                .input_links
                .get(socket.index)
                .copied()
                .flatten(),
            Direction::Outputs => None,
        }
    }

    fn tree_nodes(&self, tree: TreeHandle) -> Vec<NodeHandle> {
        (0..self.trees[tree.0].nodes.len())
            .map(|node| NodeHandle { tree: tree.0, node })
            .collect()
    }

    fn clamp_mode(&self, node: NodeHandle) -> ClampMode {
        self.entry(node).spec.params.clamp_type.unwrap_or_default()
    }

    fn mix_data_type(&self, node: NodeHandle) -> MixDataType {
        self.entry(node).spec.params.data_type.unwrap_or_default()
    }

    fn color_ramp(&self, node: NodeHandle) -> Option<&ColorRamp> {
        self.entry(node).spec.params.color_ramp.as_ref()
    }

    fn image_pixels(&self, node: NodeHandle) -> Option<&[f32]> {
        let image = self.entry(node).image?;
        self.images[image].pixels.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinkSpec, NodeParams};

    fn rgb_and_output() -> TreeSpec {
        TreeSpec {
            name: "Material".into(),
            nodes: vec![
                NodeSpec::new("Material Output", "ShaderNodeOutputMaterial")
                    .with_inputs(vec![SocketSpec::empty()]),
                NodeSpec::new("RGB", "ShaderNodeRGB")
                    .with_outputs(vec![SocketSpec::value(Value::rgba(0.2, 0.3, 0.4, 1.0))]),
            ],
            links: vec![LinkSpec::new("RGB", 0, "Material Output", 0)],
        }
    }

    #[test]
    fn links_are_indexed_by_input_position() {
        let graph = MaterialGraph::from_spec(GraphSpec {
            trees: vec![rgb_and_output()],
            ..Default::default()
        })
        .expect("valid graph");
        let out = graph.node("Material", "Material Output").unwrap();
        let rgb = graph.node("Material", "RGB").unwrap();
        assert_eq!(
            graph.link_source(SocketRef::input(out, 0)),
            Some(SocketRef::output(rgb, 0))
        );
        assert!(!graph.is_linked(SocketRef::output(rgb, 0)));
        assert_eq!(graph.kind(rgb), NodeKind::Regular);
    }

    #[test]
    fn second_link_into_one_input_is_rejected() {
        let mut tree = rgb_and_output();
        tree.links.push(LinkSpec::new("RGB", 0, "Material Output", 0));
        let err = MaterialGraph::from_spec(GraphSpec {
            trees: vec![tree],
            ..Default::default()
        })
        .expect_err("duplicate link");
        assert!(matches!(err, GraphError::MultipleLinks { socket: 0, .. }));
    }

    #[test]
    fn link_to_missing_socket_is_rejected() {
        let mut tree = rgb_and_output();
        tree.links = vec![LinkSpec::new("RGB", 3, "Material Output", 0)];
        let err = MaterialGraph::from_spec(GraphSpec {
            trees: vec![tree],
            ..Default::default()
        })
        .expect_err("bad socket");
        assert!(matches!(
            err,
            GraphError::SocketOutOfRange {
                direction: Direction::Outputs,
                index: 3,
                ..
            }
        ));
    }

    #[test]
    fn group_kinds_are_derived_once() {
        let group = TreeSpec {
            name: "Group".into(),
            nodes: vec![
                NodeSpec::new("Group Input", GROUP_INPUT_TYPE),
                NodeSpec::new("Group Output", GROUP_OUTPUT_TYPE),
            ],
            links: vec![],
        };
        let mut top = rgb_and_output();
        top.nodes.push(NodeSpec::new("Group", "ShaderNodeGroup").with_params(
            NodeParams {
                node_tree: Some("Group".into()),
                ..Default::default()
            },
        ));
        let graph = MaterialGraph::from_spec(GraphSpec {
            trees: vec![top, group],
            ..Default::default()
        })
        .expect("valid graph");
        let instance = graph.node("Material", "Group").unwrap();
        assert_eq!(
            graph.kind(instance),
            NodeKind::GroupInstance(graph.tree("Group").unwrap())
        );
        let input = graph.node("Group", "Group Input").unwrap();
        assert_eq!(graph.kind(input), NodeKind::GroupInput);
    }

    #[test]
    fn unknown_group_tree_is_rejected() {
        let mut tree = rgb_and_output();
        tree.nodes[1].params.node_tree = Some("Missing".into());
        let err = MaterialGraph::from_spec(GraphSpec {
            trees: vec![tree],
            ..Default::default()
        })
        .expect_err("unknown tree");
        assert!(matches!(err, GraphError::UnknownTree(name) if name == "Missing"));
    }

    #[test]
    fn ragged_pixel_buffer_is_rejected() {
        let err = MaterialGraph::from_spec(GraphSpec {
            images: vec![ImageSpec {
                name: "broken".into(),
                width: 1,
                height: 1,
                pixels: Some(vec![1.0, 0.0, 0.0]),
            }],
            ..Default::default()
        })
        .expect_err("ragged pixels");
        assert!(matches!(err, GraphError::RaggedPixels { len: 3, .. }));
    }
}
