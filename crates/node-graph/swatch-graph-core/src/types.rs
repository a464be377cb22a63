//! Serializable snapshot of a host shading graph.
//!
//! Trees, images and materials reference each other by name. The snapshot is
//! validated and indexed by [`MaterialGraph::from_spec`](crate::graph::MaterialGraph::from_spec)
//! before any resolution happens.

use serde::{Deserialize, Serialize};
use swatch_api_core::json::normalize_graph_spec_json;
use swatch_api_core::Value;

use crate::graph::GraphError;
use crate::host::{ClampMode, MixDataType};
use crate::ramp::ColorRamp;

pub type NodeName = String;
pub type TreeName = String;

/// Type identifier of the placeholder standing for a group's inputs.
pub const GROUP_INPUT_TYPE: &str = "NodeGroupInput";
/// Type identifier of the placeholder standing for a group's outputs.
pub const GROUP_OUTPUT_TYPE: &str = "NodeGroupOutput";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SocketSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_value: Option<Value>,
}

impl SocketSpec {
    pub fn new(name: impl Into<String>, default_value: Option<Value>) -> Self {
        SocketSpec {
            name: name.into(),
            default_value,
        }
    }

    /// Socket with a default and no name.
    pub fn value(value: impl Into<Value>) -> Self {
        SocketSpec {
            name: String::new(),
            default_value: Some(value.into()),
        }
    }

    /// Socket without a default (shader sockets).
    pub fn empty() -> Self {
        SocketSpec::default()
    }
}

/// Node-specific parameters read by custom evaluators.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeParams {
    /// Nested tree for group instances.
    #[serde(default)]
    pub node_tree: Option<TreeName>,
    #[serde(default)]
    pub clamp_type: Option<ClampMode>,
    #[serde(default)]
    pub data_type: Option<MixDataType>,
    #[serde(default)]
    pub color_ramp: Option<ColorRamp>,
    /// Image bound to a texture node.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub name: NodeName,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub inputs: Vec<SocketSpec>,
    #[serde(default)]
    pub outputs: Vec<SocketSpec>,
    #[serde(default)]
    pub params: NodeParams,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        NodeSpec {
            name: name.into(),
            type_id: type_id.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            params: NodeParams::default(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<SocketSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<SocketSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_params(mut self, params: NodeParams) -> Self {
        self.params = params;
        self
    }
}

/// Directed edge from an output socket to an input socket, by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkSpec {
    pub from_node: NodeName,
    #[serde(default)]
    pub from_socket: usize,
    pub to_node: NodeName,
    #[serde(default)]
    pub to_socket: usize,
}

impl LinkSpec {
    pub fn new(from_node: &str, from_socket: usize, to_node: &str, to_socket: usize) -> Self {
        LinkSpec {
            from_node: from_node.to_string(),
            from_socket,
            to_node: to_node.to_string(),
            to_socket,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TreeSpec {
    pub name: TreeName,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// Decoded image pixels: flat RGBA floats, row-major.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ImageSpec {
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Absent when the host has no pixel data loaded.
    #[serde(default)]
    pub pixels: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MaterialSpec {
    pub name: String,
    /// Top-level tree; `None` when the material does not use nodes.
    #[serde(default)]
    pub node_tree: Option<TreeName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GraphSpec {
    #[serde(default)]
    pub trees: Vec<TreeSpec>,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
}

impl GraphSpec {
    /// Parse a snapshot, accepting value shorthands for socket defaults.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let normalized = normalize_graph_spec_json(json)?;
        Ok(serde_json::from_value(normalized)?)
    }
}
