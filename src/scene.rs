//! Scene: everything the shader reads while tracing

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::cameras::CameraConfig;
use crate::error::Result;
use crate::geometries::{Geometries, GeometriesBuilder, Intersectable};
use crate::lights::{AmbientLight, AmbientLightConfig, LightConfig, LightSource};
use crate::objects::{Geometry, GeometryConfig};
use crate::utils::SerdeVector;
use crate::Color;

/// Immutable scene, built once before rendering
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub background: Color,
    pub ambient: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<LightSource>,
}
impl Scene {
    pub fn builder(name: impl Into<String>) -> SceneBuilder {
        SceneBuilder::new(name)
    }

    pub fn from_config(config: SceneConfig) -> Result<Self> {
        let mut builder = Self::builder(config.name).bvh(config.bvh);
        if let Some(background) = config.background {
            builder = builder.background(background.into());
        }
        if let Some(ambient) = config.ambient {
            builder = builder.ambient(AmbientLight::from_config(ambient));
        }
        for geometry in config.geometries {
            builder = builder.add_geometry(Geometry::from_config(geometry)?);
        }
        for light in config.lights {
            builder = builder.add_light(LightSource::from_config(light)?);
        }
        Ok(builder.build())
    }
}

/// Staged scene assembly; the geometries are finalized by [`SceneBuilder::build`]
#[derive(Debug)]
pub struct SceneBuilder {
    name: String,
    background: Color,
    ambient: AmbientLight,
    geometries: GeometriesBuilder,
    lights: Vec<LightSource>,
}
impl SceneBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: Color::zeros(),
            ambient: AmbientLight::default(),
            geometries: GeometriesBuilder::new(),
            lights: Vec::new(),
        }
    }

    pub fn background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn ambient(mut self, ambient: AmbientLight) -> Self {
        self.ambient = ambient;
        self
    }

    /// Organize the scene geometry in a bounding volume hierarchy
    pub fn bvh(mut self, enabled: bool) -> Self {
        self.geometries = self.geometries.bvh(enabled);
        self
    }

    pub fn add_geometry(mut self, geometry: impl Into<Intersectable>) -> Self {
        self.geometries.push(geometry);
        self
    }

    pub fn add_light(mut self, light: LightSource) -> Self {
        self.lights.push(light);
        self
    }

    pub fn build(self) -> Scene {
        let geometries = self.geometries.build();
        info!(
            "Scene {:?}: {} primitives, {} lights",
            self.name,
            geometries.len(),
            self.lights.len()
        );
        Scene {
            name: self.name,
            background: self.background,
            ambient: self.ambient,
            geometries,
            lights: self.lights,
        }
    }
}

/// Scene Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub background: Option<SerdeVector>,
    #[serde(default)]
    pub ambient: Option<AmbientLightConfig>,
    #[serde(default)]
    pub bvh: bool,
    #[serde(default)]
    pub geometries: Vec<GeometryConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
}

fn default_name() -> String {
    "scene".to_owned()
}

/// Scene file: the scene and the camera looking at it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneConfig,
    pub camera: CameraConfig,
}
impl SceneFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading scene file {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
