//! Handlers for node types whose value is not a single socket.

use log::trace;
use swatch_api_core::Color;

use super::{resolved, Flow, ImageSampler, Quantity, WalkError, Walker};
use crate::dispatch::Evaluator;
use crate::host::{ClampMode, Direction, MixDataType, NodeGraph};

pub(super) fn evaluate<G: NodeGraph, T: Quantity>(
    walker: &Walker<'_, G>,
    evaluator: Evaluator,
    node: G::Node,
    default: T,
    depth: usize,
) -> Result<Flow<T>, WalkError> {
    match evaluator {
        Evaluator::Clamp => clamp(walker, node, default, depth),
        Evaluator::ColorRamp => color_ramp(walker, node, default, depth),
        Evaluator::Mix => mix(walker, node, default, depth),
        Evaluator::Image => Ok(Flow::Resolved(image(walker, node, default))),
    }
}

/// Bound the value input by the min/max inputs. `Range` mode tolerates
/// swapped bounds.
fn clamp<G: NodeGraph, T: Quantity>(
    walker: &Walker<'_, G>,
    node: G::Node,
    default: T,
    depth: usize,
) -> Result<Flow<T>, WalkError> {
    let value: f32 = resolved!(walker.read_input(node, 0, default.to_scalar(), depth));
    let mut min: f32 = resolved!(walker.read_input(node, 1, 0.0, depth));
    let mut max: f32 = resolved!(walker.read_input(node, 2, 1.0, depth));

    if walker.graph().clamp_mode(node) == ClampMode::Range && min > max {
        std::mem::swap(&mut min, &mut max);
    }
    trace!("clamp {value} to [{min}, {max}]");
    Ok(Flow::Resolved(T::from_scalar(value.max(min).min(max))))
}

/// Sample the node's ramp at its factor input.
fn color_ramp<G: NodeGraph, T: Quantity>(
    walker: &Walker<'_, G>,
    node: G::Node,
    default: T,
    depth: usize,
) -> Result<Flow<T>, WalkError> {
    let factor: f32 = resolved!(walker.read_input(node, 0, 0.5, depth));
    let Some(ramp) = walker.graph().color_ramp(node) else {
        return Ok(Flow::Resolved(default));
    };
    let [r, g, b, _] = ramp.evaluate(factor);
    Ok(Flow::Resolved(T::from_color(Color::rgb(r, g, b))))
}

/// Operand sockets of a mix node. Three-input nodes are the legacy color mix.
fn mix_operands(input_count: usize, data_type: MixDataType) -> (usize, usize) {
    if input_count == 3 {
        return (1, 2);
    }
    match data_type {
        MixDataType::Float => (2, 3),
        MixDataType::Vector => (4, 5),
        MixDataType::Rgba => (6, 7),
    }
}

/// `a * (1 - factor) + b * factor`, with the factor clamped to [0, 1].
fn mix<G: NodeGraph, T: Quantity>(
    walker: &Walker<'_, G>,
    node: G::Node,
    default: T,
    depth: usize,
) -> Result<Flow<T>, WalkError> {
    let graph = walker.graph();
    let (a_index, b_index) = mix_operands(
        graph.socket_count(node, Direction::Inputs),
        graph.mix_data_type(node),
    );
    let factor: f32 = resolved!(walker.read_input(node, 0, 0.5, depth));
    let a: T = resolved!(walker.read_input(node, a_index, default, depth));
    let b: T = resolved!(walker.read_input(node, b_index, default, depth));

    let factor = if factor.is_nan() {
        0.5
    } else {
        factor.clamp(0.0, 1.0)
    };
    trace!("mix {a:?} and {b:?} by {factor}");
    Ok(Flow::Resolved(T::lerp(a, b, factor)))
}

fn image<G: NodeGraph, T: Quantity>(walker: &Walker<'_, G>, node: G::Node, default: T) -> T {
    let sampler = ImageSampler::new(walker.settings().alpha_threshold);
    sampler.sample(walker.graph().image_pixels(node), default)
}
