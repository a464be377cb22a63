//! Coercion helpers between socket values and resolved quantities.
//!
//! Rules:
//! - scalar -> color broadcasts to all three channels with full alpha
//! - tuple -> scalar takes the maximum of the non-alpha channels
//! - tuple -> color keeps the first three channels and forces alpha to 1.0
//!
//! Only four-channel values (`Vec4`, `ColorRgba`, or a `Vector` of length 4)
//! are treated as carrying alpha. Brightness is approximated by channel max,
//! never by an average.

use crate::{Color, Value};

/// Channels of `v` that contribute to brightness.
fn color_channels(v: &Value) -> &[f32] {
    match v {
        Value::Float(f) => std::slice::from_ref(f),
        Value::Vec2(a) => &a[..],
        Value::Vec3(a) => &a[..],
        Value::Vec4(a) | Value::ColorRgba(a) => &a[..3],
        Value::Vector(vec) if vec.len() == 4 => &vec[..3],
        Value::Vector(vec) => &vec[..],
    }
}

/// Reduce a [`Value`] into a single scalar.
///
/// Empty vectors reduce to 0.0.
pub fn to_scalar(v: &Value) -> f32 {
    color_channels(v)
        .iter()
        .copied()
        .reduce(f32::max)
        .unwrap_or(0.0)
}

/// Coerce a [`Value`] into an opaque [`Color`].
///
/// Missing channels of short vectors are filled with 0.0.
pub fn to_color(v: &Value) -> Color {
    match v {
        Value::Float(f) => Color::splat(*f),
        Value::Vec3(a) => Color::rgb(a[0], a[1], a[2]),
        Value::Vec4(a) | Value::ColorRgba(a) => Color::rgb(a[0], a[1], a[2]),
        Value::Vec2(a) => Color::rgb(a[0], a[1], 0.0),
        Value::Vector(vec) => {
            let mut out = [0.0f32; 3];
            for (slot, src) in out.iter_mut().zip(vec.iter()) {
                *slot = *src;
            }
            Color::rgb(out[0], out[1], out[2])
        }
    }
}
