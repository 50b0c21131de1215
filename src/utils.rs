//! Utils

use image::Rgb;
use nalgebra::Unit;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TracerError};
use crate::{Color, UnitVec3, Vec3};

/// Magnitudes below this are treated as exactly zero
pub const ALIGN_EPSILON: f64 = 1e-10;

/// Whether a value is within [`ALIGN_EPSILON`] of zero
pub fn is_zero(value: f64) -> bool {
    value.abs() < ALIGN_EPSILON
}

/// Snap near-zero values to exactly zero
///
/// Every comparison that decides parallelism, intersection acceptance or a shading sign goes
/// through here, so grazing and tangent rays classify the same way everywhere.
pub fn align_zero(value: f64) -> f64 {
    if is_zero(value) {
        0.0
    } else {
        value
    }
}

/// Normalize a vector, rejecting the zero vector
pub fn normalize(v: Vec3) -> Result<UnitVec3> {
    Unit::try_new(v, 0.0).ok_or(TracerError::ZeroVector)
}

/// Whether every component of a vector is exactly zero
pub fn is_zero_vector(v: &Vec3) -> bool {
    v.iter().all(|c| *c == 0.0)
}

/// Whether every channel of a coefficient triple is below `threshold`
pub fn lower_than(k: &Vec3, threshold: f64) -> bool {
    k.iter().all(|c| *c < threshold)
}

/// Mirror `v` about the normal `n`: `v - 2 (v.n) n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Convert an unclamped color in the 0..255 range into an image pixel
pub fn get_pixel(color: &Color) -> Rgb<u8> {
    Rgb([
        scale_color(color[0]),
        scale_color(color[1]),
        scale_color(color[2]),
    ])
}

/// clamp the channel to between 0 and 255
fn scale_color(val: f64) -> u8 {
    val.min(255.0).max(0.0).round() as u8
}

/// Three doubles as they appear in scene files, e.g. `[0, 1, 0]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SerdeVector(pub f64, pub f64, pub f64);
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.0, v.1, v.2)
    }
}

/// Material coefficient given either as one scalar for all channels or as an RGB triple
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerdeCoefficient {
    Uniform(f64),
    Rgb(SerdeVector),
}
impl Default for SerdeCoefficient {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}
impl From<SerdeCoefficient> for Vec3 {
    fn from(k: SerdeCoefficient) -> Self {
        match k {
            SerdeCoefficient::Uniform(v) => Vec3::repeat(v),
            SerdeCoefficient::Rgb(v) => v.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_zero() {
        assert_eq!(align_zero(1e-12), 0.0);
        assert_eq!(align_zero(-1e-12), 0.0);
        assert_eq!(align_zero(1e-3), 1e-3);
        assert!(is_zero(0.0));
        assert!(!is_zero(1e-9));
    }

    #[test]
    fn test_normalize_rejects_zero() {
        assert!(matches!(
            normalize(Vec3::zeros()),
            Err(TracerError::ZeroVector)
        ));
        let n = normalize(Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_reflect_preserves_length() {
        let v = Vec3::new(1.0, -2.0, 0.5);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let r = reflect(&v, &n);
        assert_eq!(r, Vec3::new(1.0, 2.0, 0.5));
        assert!((r.norm() - v.norm()).abs() < 1e-12);
    }

    #[test]
    fn test_lower_than_requires_every_channel() {
        assert!(lower_than(&Vec3::new(0.0, 0.0005, 0.0), 0.001));
        assert!(!lower_than(&Vec3::new(0.0, 0.5, 0.0), 0.001));
    }

    #[test]
    fn test_get_pixel_clamps() {
        let p = get_pixel(&Color::new(-20.0, 127.6, 900.0));
        assert_eq!(p, Rgb([0, 128, 255]));
    }

    #[test]
    fn test_coefficient_from_yaml() {
        let k: SerdeCoefficient = serde_yaml::from_str("0.5").unwrap();
        assert_eq!(Vec3::from(k), Vec3::repeat(0.5));
        let k: SerdeCoefficient = serde_yaml::from_str("[0.2, 0.4, 0.6]").unwrap();
        assert_eq!(Vec3::from(k), Vec3::new(0.2, 0.4, 0.6));
    }
}
