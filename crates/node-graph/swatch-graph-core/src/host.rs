//! The read-only view of a host node graph that resolution walks.
//!
//! Hosts own their nodes, sockets and trees; the resolver only ever borrows
//! them through [`NodeGraph`]. [`MaterialGraph`](crate::graph::MaterialGraph)
//! is the built-in implementation over an owned snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};
use swatch_api_core::Value;

use crate::ramp::ColorRamp;

/// Which side of a node a socket sits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inputs,
    Outputs,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inputs => f.write_str("input"),
            Direction::Outputs => f.write_str("output"),
        }
    }
}

/// Structural role of a node. Group nodes are tagged explicitly so traversal
/// never has to probe for a nested tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind<T> {
    Regular,
    /// Instance of a (possibly shared) nested tree.
    GroupInstance(T),
    /// Placeholder inside a nested tree standing for the instance's inputs.
    GroupInput,
    /// Placeholder inside a nested tree standing for the instance's outputs.
    GroupOutput,
}

/// Positional address of a socket: owning node, side, index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SocketRef<N> {
    pub node: N,
    pub direction: Direction,
    pub index: usize,
}

impl<N> SocketRef<N> {
    pub fn input(node: N, index: usize) -> Self {
        SocketRef {
            node,
            direction: Direction::Inputs,
            index,
        }
    }

    pub fn output(node: N, index: usize) -> Self {
        SocketRef {
            node,
            direction: Direction::Outputs,
            index,
        }
    }
}

/// Clamp node behaviour. `Range` allows min and max to arrive swapped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampMode {
    #[default]
    #[serde(rename = "MINMAX")]
    MinMax,
    #[serde(rename = "RANGE")]
    Range,
}

/// Declared operand type of a mix node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MixDataType {
    #[default]
    Float,
    Vector,
    Rgba,
}

/// Read access to a host node graph.
///
/// Inputs carry at most one upstream link. Handles are cheap copies; the host
/// may mutate its graph between calls but not during one.
pub trait NodeGraph {
    type Node: Copy + Eq + fmt::Debug;
    type Tree: Copy + Eq + fmt::Debug;

    /// Host type identifier, e.g. `ShaderNodeBsdfPrincipled`.
    fn type_identifier(&self, node: Self::Node) -> &str;

    fn kind(&self, node: Self::Node) -> NodeKind<Self::Tree>;

    fn socket_count(&self, node: Self::Node, direction: Direction) -> usize;

    /// Unlinked value of a socket, `None` for sockets without one (shaders).
    fn default_value(&self, socket: SocketRef<Self::Node>) -> Option<Value>;

    /// Output socket feeding `socket`, if it is a linked input.
    fn link_source(&self, socket: SocketRef<Self::Node>) -> Option<SocketRef<Self::Node>>;

    fn is_linked(&self, socket: SocketRef<Self::Node>) -> bool {
        self.link_source(socket).is_some()
    }

    /// Nodes of a tree in the host's order.
    fn tree_nodes(&self, tree: Self::Tree) -> Vec<Self::Node>;

    fn clamp_mode(&self, _node: Self::Node) -> ClampMode {
        ClampMode::MinMax
    }

    fn mix_data_type(&self, _node: Self::Node) -> MixDataType {
        MixDataType::Float
    }

    fn color_ramp(&self, _node: Self::Node) -> Option<&ColorRamp> {
        None
    }

    /// Flat RGBA float buffer of the image bound to a texture node.
    fn image_pixels(&self, _node: Self::Node) -> Option<&[f32]> {
        None
    }
}
