//! Socket default values and resolved colors. All channels are f32.

use serde::{Deserialize, Serialize};

/// Default value stored on a socket.
///
/// Hosts expose scalars (factor, roughness, ...) and fixed-length tuples
/// (colors, vectors). Arity matters when a tuple is reduced to a scalar: only
/// four-channel values are read as carrying alpha.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    Float(f32),
    Vec2([f32; 2]),
    /// Also used by hosts for RGB without alpha.
    Vec3([f32; 3]),
    /// Channel four is alpha.
    Vec4([f32; 4]),
    ColorRgba([f32; 4]),
    /// Variable length. Four entries are read as RGBA, like `Vec4`.
    Vector(Vec<f32>),
}

impl Value {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Value::ColorRgba([r, g, b, a])
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::ColorRgba(c.0)
    }
}

/// RGBA color produced by albedo resolution. Resolved colors are opaque.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [f32; 4]);

impl Color {
    /// Neutral gray reported when nothing informative is found.
    pub const DEFAULT_ALBEDO: Color = Color([0.8, 0.8, 0.8, 1.0]);

    /// "Texture not found" magenta.
    pub const MISSING_TEXTURE: Color = Color([1.0, 0.0, 1.0, 1.0]);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color([r, g, b, 1.0])
    }

    /// Gray of intensity `v`.
    pub const fn splat(v: f32) -> Self {
        Color([v, v, v, 1.0])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }

    /// Brightness as the largest color channel. Alpha never takes part.
    pub fn max_channel(&self) -> f32 {
        self.r().max(self.g()).max(self.b())
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::DEFAULT_ALBEDO
    }
}
