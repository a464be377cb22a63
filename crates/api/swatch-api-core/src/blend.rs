//! Interpolation shared by mix nodes and color ramps.

use crate::Color;

/// Linear interpolation for f32: `a * (1 - t) + b * t`.
#[inline]
pub fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Component-wise [`lerp_f`].
pub fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = lerp_f(a[i], b[i], t);
    }
    out
}

/// Lerp two colors channel by channel. Alpha stays opaque.
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let [r, g, bl, _] = lerp_array(&a.0, &b.0, t);
    Color::rgb(r, g, bl)
}

/// Hermite smoothstep on [0, 1].
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_matches_weighted_sum() {
        assert_eq!(lerp_f(10.0, 20.0, 0.25), 12.5);
        assert_eq!(lerp_array(&[0.0, 2.0], &[4.0, 6.0], 0.5), [2.0, 4.0]);
    }

    #[test]
    fn smoothstep_is_flat_at_ends() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
    }
}
