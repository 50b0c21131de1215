//! Light sources
//!
//! Every light answers three questions about a point: how much light reaches it, from which
//! direction (`l`, pointing from the light toward the point), and how far away the light is.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::{align_zero, normalize, SerdeCoefficient, SerdeVector};
use crate::{Color, Point, UnitVec3, Vec3};

/// Constant light added once to every shaded pixel
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub intensity: Color,
    pub ka: Color,
}
impl AmbientLight {
    pub fn new(intensity: Color, ka: Color) -> Self {
        Self { intensity, ka }
    }

    /// Effective intensity, `intensity` scaled per channel by `ka`
    pub fn intensity(&self) -> Color {
        self.intensity.component_mul(&self.ka)
    }

    pub fn from_config(config: AmbientLightConfig) -> Self {
        Self::new(config.intensity.into(), config.ka.into())
    }
}
impl Default for AmbientLight {
    fn default() -> Self {
        Self::new(Color::zeros(), Color::zeros())
    }
}

/// Ambient Light Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientLightConfig {
    pub intensity: SerdeVector,
    #[serde(default = "unit_coefficient")]
    pub ka: SerdeCoefficient,
}

fn unit_coefficient() -> SerdeCoefficient {
    SerdeCoefficient::Uniform(1.0)
}

/// Light with a position: distance falloff `1 / (kc + kl d + kq d^2)`
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Point,
    pub kc: f64,
    pub kl: f64,
    pub kq: f64,
}
impl PointLight {
    pub fn new(intensity: Color, position: Point) -> Self {
        Self {
            intensity,
            position,
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
        }
    }

    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> Self {
        self.kc = kc;
        self.kl = kl;
        self.kq = kq;
        self
    }

    pub fn from_config(config: PointLightConfig) -> Self {
        Self::new(config.intensity.into(), config.position.into()).with_attenuation(
            config.kc,
            config.kl,
            config.kq,
        )
    }

    fn intensity(&self, p: &Point) -> Color {
        let d_sqr = (p - self.position).norm_squared();
        let factor = self.kc + self.kl * d_sqr.sqrt() + self.kq * d_sqr;
        self.intensity / factor
    }

    fn l(&self, p: &Point) -> Option<UnitVec3> {
        normalize(p - self.position).ok()
    }
}

/// Light source
#[derive(Debug, Clone, PartialEq)]
pub enum LightSource {
    /// Parallel light from infinitely far away
    Directional {
        intensity: Color,
        direction: UnitVec3,
    },
    Point(PointLight),
    /// Point light attenuated by `max(0, direction . l)^narrow_beam`
    Spot {
        light: PointLight,
        direction: UnitVec3,
        narrow_beam: f64,
    },
}
impl LightSource {
    pub fn directional(intensity: Color, direction: Vec3) -> Result<Self> {
        Ok(LightSource::Directional {
            intensity,
            direction: normalize(direction)?,
        })
    }

    pub fn point(intensity: Color, position: Point) -> Self {
        LightSource::Point(PointLight::new(intensity, position))
    }

    pub fn spot(light: PointLight, direction: Vec3) -> Result<Self> {
        Ok(LightSource::Spot {
            light,
            direction: normalize(direction)?,
            narrow_beam: 1.0,
        })
    }

    /// Narrow a spot light's beam; no effect on other lights
    pub fn with_narrow_beam(mut self, narrow: f64) -> Self {
        if let LightSource::Spot { narrow_beam, .. } = &mut self {
            *narrow_beam = narrow.max(1.0);
        }
        self
    }

    /// Intensity of the light arriving at `p`
    pub fn intensity(&self, p: &Point) -> Color {
        match self {
            LightSource::Directional { intensity, .. } => *intensity,
            LightSource::Point(light) => light.intensity(p),
            LightSource::Spot {
                light,
                direction,
                narrow_beam,
            } => {
                let factor = match light.l(p) {
                    Some(l) => align_zero(direction.dot(&*l)),
                    None => 0.0,
                };
                if factor <= 0.0 {
                    return Color::zeros();
                }
                light.intensity(p) * factor.powf(*narrow_beam)
            }
        }
    }

    /// Unit direction from the light toward `p`, `None` when `p` is the light's position
    pub fn l(&self, p: &Point) -> Option<UnitVec3> {
        match self {
            LightSource::Directional { direction, .. } => Some(*direction),
            LightSource::Point(light) | LightSource::Spot { light, .. } => light.l(p),
        }
    }

    /// Distance from `p` to the light, infinite for directional lights
    pub fn distance(&self, p: &Point) -> f64 {
        match self {
            LightSource::Directional { .. } => f64::INFINITY,
            LightSource::Point(light) | LightSource::Spot { light, .. } => {
                (p - light.position).norm()
            }
        }
    }

    pub fn from_config(config: LightConfig) -> Result<Self> {
        match config {
            LightConfig::Directional(c) => Self::directional(c.intensity.into(), c.direction.into()),
            LightConfig::Point(c) => Ok(LightSource::Point(PointLight::from_config(c))),
            LightConfig::Spot(c) => Ok(Self::spot(
                PointLight::from_config(c.light),
                c.direction.into(),
            )?
            .with_narrow_beam(c.narrow_beam)),
        }
    }
}

/// Config for light sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightConfig {
    Directional(DirectionalLightConfig),
    Point(PointLightConfig),
    Spot(SpotLightConfig),
}

/// Directional Light Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionalLightConfig {
    pub intensity: SerdeVector,
    pub direction: SerdeVector,
}

/// Point Light Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLightConfig {
    pub intensity: SerdeVector,
    pub position: SerdeVector,
    #[serde(default = "default_kc")]
    pub kc: f64,
    #[serde(default)]
    pub kl: f64,
    #[serde(default)]
    pub kq: f64,
}

fn default_kc() -> f64 {
    1.0
}

/// Spot Light Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotLightConfig {
    #[serde(flatten)]
    pub light: PointLightConfig,
    pub direction: SerdeVector,
    #[serde(default = "default_narrow_beam")]
    pub narrow_beam: f64,
}

fn default_narrow_beam() -> f64 {
    1.0
}
