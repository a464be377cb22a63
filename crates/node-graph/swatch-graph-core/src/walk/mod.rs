//! Backward traversal from an output node to a representative value.
//!
//! The walk is organised around a few pieces:
//!
//! - [`Walker::resolve_node`] enters groups and consults the dispatch table.
//! - [`socket`] reads one socket, following links and crossing group
//!   boundaries in both directions.
//! - [`evaluators`] holds the bespoke node handlers (clamp, ramp, mix, image).
//! - [`image`] reduces a pixel buffer to a single color.
//!
//! Escaping a group through its input placeholder is ordinary control flow:
//! it travels back up as [`Flow::Escape`] until the frame that owns the group
//! instance picks it up.

use std::fmt;

use log::{debug, trace};
use swatch_api_core::{coercion, Color, Value};
use thiserror::Error;

use crate::dispatch::{DispatchEntry, DispatchTable};
use crate::host::{Direction, NodeGraph, NodeKind, SocketRef};

/// Default recursion bound. Group nesting costs one frame per level.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A resolvable quantity: an opaque color or a scalar.
pub trait Quantity: Copy + PartialEq + fmt::Debug {
    /// Value reported by a texture node without an image.
    const MISSING_TEXTURE: Self;

    fn from_value(value: &Value) -> Self;
    fn from_scalar(value: f32) -> Self;
    fn from_color(color: Color) -> Self;
    fn to_scalar(self) -> f32;
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn is_finite(&self) -> bool;
}

impl Quantity for Color {
    const MISSING_TEXTURE: Self = Color::MISSING_TEXTURE;

    fn from_value(value: &Value) -> Self {
        coercion::to_color(value)
    }

    fn from_scalar(value: f32) -> Self {
        Color::splat(value)
    }

    fn from_color(color: Color) -> Self {
        Color::rgb(color.r(), color.g(), color.b())
    }

    fn to_scalar(self) -> f32 {
        self.max_channel()
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        swatch_api_core::blend::lerp_color(a, b, t)
    }

    fn is_finite(&self) -> bool {
        Color::is_finite(self)
    }
}

impl Quantity for f32 {
    const MISSING_TEXTURE: Self = 0.0;

    fn from_value(value: &Value) -> Self {
        coercion::to_scalar(value)
    }

    fn from_scalar(value: f32) -> Self {
        value
    }

    fn from_color(color: Color) -> Self {
        color.max_channel()
    }

    fn to_scalar(self) -> f32 {
        self
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        swatch_api_core::blend::lerp_f(a, b, t)
    }

    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

/// Outcome of one step of the walk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Flow<T> {
    Resolved(T),
    /// A group input placeholder was reached through its output `socket`;
    /// the enclosing group instance must read its own input at that index.
    Escape(usize),
}

/// Unwrap a resolved value or hand an escape to the caller.
macro_rules! resolved {
    ($flow:expr) => {
        match $flow? {
            $crate::walk::Flow::Resolved(value) => value,
            $crate::walk::Flow::Escape(socket) => {
                return Ok($crate::walk::Flow::Escape(socket));
            }
        }
    };
}
pub(crate) use resolved;

mod evaluators;
pub mod image;
mod socket;

pub use image::ImageSampler;


/// Structural problems that stop a walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("group input socket {socket} reached outside of any group")]
    UnboundGroupInput { socket: usize },
    #[error("traversal exceeded the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalkSettings {
    pub max_depth: usize,
    pub alpha_threshold: f32,
}

impl Default for WalkSettings {
    fn default() -> Self {
        WalkSettings {
            max_depth: DEFAULT_MAX_DEPTH,
            alpha_threshold: ImageSampler::DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// First node of `tree` whose type identifier contains `Output`.
pub fn find_output<G: NodeGraph>(graph: &G, tree: G::Tree) -> Option<G::Node> {
    graph
        .tree_nodes(tree)
        .into_iter()
        .find(|&node| graph.type_identifier(node).contains("Output"))
}

/// One traversal context: a graph, the table for the quantity being resolved
/// and the walk limits. Holds no mutable state, so a walker can be reused for
/// any number of resolutions over the same graph snapshot.
pub struct Walker<'a, G: NodeGraph> {
    graph: &'a G,
    table: &'a DispatchTable,
    settings: WalkSettings,
}

impl<'a, G: NodeGraph> Walker<'a, G> {
    pub fn new(graph: &'a G, table: &'a DispatchTable) -> Self {
        Self::with_settings(graph, table, WalkSettings::default())
    }

    pub fn with_settings(graph: &'a G, table: &'a DispatchTable, settings: WalkSettings) -> Self {
        Walker {
            graph,
            table,
            settings,
        }
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn table(&self) -> &'a DispatchTable {
        self.table
    }

    pub fn settings(&self) -> WalkSettings {
        self.settings
    }

    /// Resolve the value represented by `node`, falling back to `default`
    /// wherever the graph carries no information.
    pub fn resolve<T: Quantity>(&self, node: G::Node, default: T) -> Result<T, WalkError> {
        match self.resolve_node(node, default, 0)? {
            Flow::Resolved(value) => Ok(value),
            Flow::Escape(socket) => Err(WalkError::UnboundGroupInput { socket }),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize, WalkError> {
        if depth >= self.settings.max_depth {
            return Err(WalkError::DepthExceeded {
                limit: self.settings.max_depth,
            });
        }
        Ok(depth + 1)
    }

    pub(crate) fn resolve_node<T: Quantity>(
        &self,
        node: G::Node,
        default: T,
        depth: usize,
    ) -> Result<Flow<T>, WalkError> {
        let depth = self.descend(depth)?;
        let type_id = self.graph.type_identifier(node);
        trace!("visit {node:?} ({type_id}) at depth {depth}");

        if let NodeKind::GroupInstance(tree) = self.graph.kind(node) {
            return self.enter_group(node, tree, default, depth);
        }

        match self.table.lookup(type_id) {
            Some((key, DispatchEntry::Evaluator { evaluator })) => {
                trace!("{type_id} matched '{key}' -> {evaluator:?}");
                evaluators::evaluate(self, evaluator, node, default, depth)
            }
            Some((key, DispatchEntry::Locator { direction, index })) => {
                trace!("{type_id} matched '{key}' -> {direction} {index}");
                if index >= self.graph.socket_count(node, direction) {
                    debug!("{type_id} has no {direction} socket {index}; using default");
                    return Ok(Flow::Resolved(default));
                }
                let socket = SocketRef {
                    node,
                    direction,
                    index,
                };
                self.read_socket(socket, default, depth)
            }
            None if self.graph.socket_count(node, Direction::Inputs) == 1 => {
                trace!("{type_id} is unknown; passing through its only input");
                self.read_socket(SocketRef::input(node, 0), default, depth)
            }
            None => {
                trace!("{type_id} is unknown and ambiguous; using default");
                Ok(Flow::Resolved(default))
            }
        }
    }

    /// Resolve a group instance from the inside, treating an uninformative
    /// interior as transparent.
    fn enter_group<T: Quantity>(
        &self,
        node: G::Node,
        tree: G::Tree,
        default: T,
        depth: usize,
    ) -> Result<Flow<T>, WalkError> {
        let interior = match find_output(self.graph, tree) {
            Some(output) => match self.resolve_node(output, default, depth)? {
                Flow::Resolved(value) => Some(value),
                Flow::Escape(socket) => {
                    debug!("group {node:?} interior escaped through input {socket}");
                    return self.read_input(node, socket, default, depth);
                }
            },
            None => None,
        };

        match interior {
            Some(value) if value != default => Ok(Flow::Resolved(value)),
            _ => {
                debug!("group {node:?} yields nothing; falling through to its first input");
                self.read_input(node, 0, default, depth)
            }
        }
    }
}
