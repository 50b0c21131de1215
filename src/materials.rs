//! Implementation of materials

use serde::{Deserialize, Serialize};

use crate::utils::SerdeCoefficient;
use crate::Vec3;

/// Phong material
///
/// Per-channel coefficients for diffuse (`kd`), specular (`ks`), transparency (`kt`) and
/// reflection (`kr`), plus the specular shininess exponent. Everything defaults to zero, a black
/// opaque surface that only shows its emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kd: Vec3,
    pub ks: Vec3,
    pub kt: Vec3,
    pub kr: Vec3,
    pub shininess: i32,
}
impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Vec3::zeros(),
            ks: Vec3::zeros(),
            kt: Vec3::zeros(),
            kr: Vec3::zeros(),
            shininess: 0,
        }
    }
}
impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kd(mut self, kd: Vec3) -> Self {
        self.kd = kd;
        self
    }

    pub fn with_ks(mut self, ks: Vec3) -> Self {
        self.ks = ks;
        self
    }

    pub fn with_kt(mut self, kt: Vec3) -> Self {
        self.kt = kt;
        self
    }

    pub fn with_kr(mut self, kr: Vec3) -> Self {
        self.kr = kr;
        self
    }

    pub fn with_shininess(mut self, shininess: i32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn from_config(config: MaterialConfig) -> Self {
        Self {
            kd: config.kd.into(),
            ks: config.ks.into(),
            kt: config.kt.into(),
            kr: config.kr.into(),
            shininess: config.shininess,
        }
    }
}

/// Material Config
///
/// Each coefficient is either one number for all channels or an `[r, g, b]` triple
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub kd: SerdeCoefficient,
    pub ks: SerdeCoefficient,
    pub kt: SerdeCoefficient,
    pub kr: SerdeCoefficient,
    pub shininess: i32,
}
