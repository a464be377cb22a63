//! Reading a single socket: default value, linked producer, or a group
//! boundary in either direction.

use log::debug;

use super::{find_output, Flow, Quantity, WalkError, Walker};
use crate::host::{Direction, NodeGraph, NodeKind, SocketRef};

impl<G: NodeGraph> Walker<'_, G> {
    /// Value carried by `socket` as a `T`.
    ///
    /// Linked inputs defer to the producing node. Everything else reads the
    /// socket's own default, broadcasting or reducing it to `T`; sockets
    /// without a default yield `default`.
    pub(crate) fn read_socket<T: Quantity>(
        &self,
        socket: SocketRef<G::Node>,
        default: T,
        depth: usize,
    ) -> Result<Flow<T>, WalkError> {
        if let Some(source) = self.upstream(socket) {
            let producer = source.node;
            return match self.graph.kind(producer) {
                NodeKind::GroupInput => {
                    debug!("{socket:?} is fed by group input socket {}", source.index);
                    Ok(Flow::Escape(source.index))
                }
                NodeKind::GroupInstance(tree) => {
                    self.pass_through_group(producer, tree, source.index, default, depth)
                }
                NodeKind::Regular | NodeKind::GroupOutput => {
                    self.resolve_node(producer, default, depth)
                }
            };
        }

        let value = self
            .graph
            .default_value(socket)
            .map(|value| T::from_value(&value))
            .unwrap_or(default);
        Ok(Flow::Resolved(value))
    }

    /// Read input `index` of `node`, or `default` if the node has no such input.
    pub(crate) fn read_input<T: Quantity>(
        &self,
        node: G::Node,
        index: usize,
        default: T,
        depth: usize,
    ) -> Result<Flow<T>, WalkError> {
        if index >= self.graph.socket_count(node, Direction::Inputs) {
            return Ok(Flow::Resolved(default));
        }
        self.read_socket(SocketRef::input(node, index), default, depth)
    }

    /// Follow output `index` of a group instance to whatever feeds the matching
    /// input of the group's interior output node. An interior that yields only
    /// the default is transparent: the instance's first input is read instead.
    fn pass_through_group<T: Quantity>(
        &self,
        instance: G::Node,
        tree: G::Tree,
        index: usize,
        default: T,
        depth: usize,
    ) -> Result<Flow<T>, WalkError> {
        let depth = self.descend(depth)?;
        let Some(output) = find_output(self.graph, tree) else {
            debug!("group {instance:?} has no output node; using default");
            return Ok(Flow::Resolved(default));
        };

        match self.read_input(output, index, default, depth)? {
            Flow::Escape(socket) => {
                debug!("group {instance:?} output {index} is wired to its input {socket}");
                self.read_input(instance, socket, default, depth)
            }
            Flow::Resolved(value) if value == default => {
                debug!("group {instance:?} output {index} yields nothing; falling through");
                self.read_input(instance, 0, default, depth)
            }
            resolved => Ok(resolved),
        }
    }

    /// Upstream output socket of a linked input.
    fn upstream(&self, socket: SocketRef<G::Node>) -> Option<SocketRef<G::Node>> {
        if socket.direction != Direction::Inputs || !self.graph.is_linked(socket) {
            return None;
        }
        let source = self.graph.link_source(socket);
        assert!(
            source.is_some(),
            "host graph reports {socket:?} as linked but exposes no link source"
        );
        source
    }
}
