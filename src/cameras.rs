//! Cameras and configs for cameras

use std::time::Instant;

use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TracerError};
use crate::objects::Plane;
use crate::output::PixelSink;
use crate::tracer::TraceRay;
use crate::utils::{is_zero, normalize, SerdeVector};
use crate::{Color, Point, Ray, UnitVec3, Vec3};

/// Camera Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: SerdeVector,
    pub to: SerdeVector,
    pub up: SerdeVector,
    /// View plane width
    pub width: f64,
    /// View plane height
    pub height: f64,
    /// Distance from the camera to the view plane
    pub distance: f64,
    #[serde(default)]
    pub depth_of_field: Option<DepthOfFieldConfig>,
}

/// Depth of Field Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthOfFieldConfig {
    pub focal_distance: f64,
    pub aperture_size: f64,
    #[serde(default = "default_aperture_points")]
    pub points: usize,
}

fn default_aperture_points() -> usize {
    100
}

/// Aperture grid and the plane everything is in focus on
#[derive(Debug, Clone)]
struct DepthOfField {
    focal_plane: Plane,
    aperture_points: Vec<Point>,
}

/// Pinhole camera with an optional square aperture
///
/// Looks along `to` with `up` pointing up the image; `right` completes the basis. The view
/// plane is centered on the `to` axis at `distance` from the camera.
#[derive(Debug, Clone)]
pub struct Camera {
    p0: Point,
    to: UnitVec3,
    up: UnitVec3,
    right: UnitVec3,
    width: f64,
    height: f64,
    distance: f64,
    depth_of_field: Option<DepthOfField>,
}
impl Camera {
    /// Fails if either vector is zero or they are not orthogonal
    pub fn new(p0: Point, to: Vec3, up: Vec3) -> Result<Self> {
        let to = normalize(to)?;
        let up = normalize(up)?;
        if !is_zero(up.dot(&*to)) {
            return Err(TracerError::NotOrthogonal);
        }
        let right = normalize(to.cross(&*up))?;
        Ok(Self {
            p0,
            to,
            up,
            right,
            width: 0.0,
            height: 0.0,
            distance: 0.0,
            depth_of_field: None,
        })
    }

    pub fn view_plane_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn view_plane_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Average every pixel over a grid of rays from the aperture through the focal plane
    ///
    /// The aperture is a square of half side `aperture_size` around the camera, sampled on a
    /// `floor(sqrt(points))` square grid. A zero aperture turns the effect off.
    pub fn depth_of_field(
        mut self,
        focal_distance: f64,
        aperture_size: f64,
        points: usize,
    ) -> Result<Self> {
        if aperture_size == 0.0 {
            self.depth_of_field = None;
            return Ok(self);
        }
        if focal_distance <= 0.0 || aperture_size < 0.0 {
            return Err(TracerError::InvalidConfig(format!(
                "depth of field needs a positive focal distance and aperture, got {focal_distance} and {aperture_size}"
            )));
        }
        let row = (points as f64).sqrt().floor() as usize;
        if row == 0 {
            return Err(TracerError::InvalidConfig(
                "depth of field needs at least one aperture point".to_owned(),
            ));
        }

        let up = self.up.into_inner();
        let right = self.right.into_inner();
        let spacing = aperture_size * 2.0 / row as f64;
        // one step below and left of the aperture corner, so the grid is centered
        let initial = self.p0 - (up + right) * (aperture_size + spacing / 2.0);
        let mut aperture_points = Vec::with_capacity(row * row);
        for i in 1..=row {
            for j in 1..=row {
                aperture_points.push(
                    initial + up * (i as f64 * spacing) + right * (j as f64 * spacing),
                );
            }
        }

        self.depth_of_field = Some(DepthOfField {
            focal_plane: Plane::from_unit(self.p0 + self.to.into_inner() * focal_distance, self.to),
            aperture_points,
        });
        Ok(self)
    }

    pub fn from_config(config: CameraConfig) -> Result<Self> {
        let camera = Self::new(config.position.into(), config.to.into(), config.up.into())?
            .view_plane_size(config.width, config.height)
            .view_plane_distance(config.distance);
        match config.depth_of_field {
            Some(dof) => camera.depth_of_field(dof.focal_distance, dof.aperture_size, dof.points),
            None => Ok(camera),
        }
    }

    pub fn position(&self) -> &Point {
        &self.p0
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Sample points of the aperture, empty without depth of field
    pub fn aperture_points(&self) -> &[Point] {
        match &self.depth_of_field {
            Some(dof) => &dof.aperture_points,
            None => &[],
        }
    }

    /// Primary ray through the center of pixel (j, i) of an nx by ny grid
    ///
    /// Column j grows along `right`, row i grows against `up`.
    pub fn construct_ray(&self, nx: usize, ny: usize, j: usize, i: usize) -> Result<Ray> {
        let image_center = self.p0 + self.to.into_inner() * self.distance;
        let ry = self.height / ny as f64;
        let rx = self.width / nx as f64;
        let yi = -(i as f64 - (ny as f64 - 1.0) / 2.0) * ry;
        let xj = (j as f64 - (nx as f64 - 1.0) / 2.0) * rx;

        let pij = image_center + self.right.into_inner() * xj + self.up.into_inner() * yi;
        Ray::new(self.p0, pij - self.p0)
    }

    fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TracerError::MissingResource("view plane size"));
        }
        if self.distance <= 0.0 {
            return Err(TracerError::MissingResource("view plane distance"));
        }
        Ok(())
    }

    fn cast_ray<T>(&self, tracer: &T, nx: usize, ny: usize, j: usize, i: usize) -> Result<Color>
    where
        T: TraceRay + ?Sized,
    {
        let ray = self.construct_ray(nx, ny, j, i)?;
        match &self.depth_of_field {
            Some(dof) => dof.averaged_beam_color(tracer, &ray),
            None => Ok(tracer.trace_ray(&ray)),
        }
    }

    /// Render every pixel of the sink and write the colors into it
    ///
    /// Pixels are traced in parallel into a buffer; the sink is filled once all succeeded.
    /// Call [`PixelSink::write`] afterwards to persist the image.
    pub fn render_image<T, S>(&self, tracer: &T, sink: &mut S) -> Result<()>
    where
        T: TraceRay + ?Sized,
        S: PixelSink + ?Sized,
    {
        self.validate()?;
        let (nx, ny) = (sink.nx(), sink.ny());
        info!(
            "Rendering {}x{} on {} threads",
            nx,
            ny,
            rayon::current_num_threads()
        );
        let start = Instant::now();

        let bar = ProgressBar::new((nx * ny) as u64);
        let mut buffer = vec![Color::zeros(); nx * ny];
        buffer
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, pixel)| {
                *pixel = self.cast_ray(tracer, nx, ny, index % nx, index / nx)?;
                bar.inc(1);
                Ok::<(), TracerError>(())
            })?;
        bar.finish();

        for (index, color) in buffer.iter().enumerate() {
            sink.write_pixel(index % nx, index / nx, color);
        }
        info!("Rendered in {:.2?}", start.elapsed());
        Ok(())
    }

    /// Paint every `interval`-th row and column with one color
    pub fn print_grid<S>(&self, interval: usize, color: &Color, sink: &mut S) -> Result<()>
    where
        S: PixelSink + ?Sized,
    {
        if interval == 0 {
            return Err(TracerError::InvalidConfig(
                "grid interval must be positive".to_owned(),
            ));
        }
        for i in 0..sink.ny() {
            for j in 0..sink.nx() {
                if i % interval == 0 || j % interval == 0 {
                    sink.write_pixel(j, i, color);
                }
            }
        }
        Ok(())
    }
}

impl DepthOfField {
    fn averaged_beam_color<T>(&self, tracer: &T, ray: &Ray) -> Result<Color>
    where
        T: TraceRay + ?Sized,
    {
        let Some(t) = self.focal_plane.intersect(ray, f64::INFINITY) else {
            warn!("Primary ray {:?} misses the focal plane", ray);
            return Ok(tracer.trace_ray(ray));
        };
        let focal_point = ray.get(t);

        let mut sum = Color::zeros();
        for aperture_point in &self.aperture_points {
            let aperture_ray = Ray::new(*aperture_point, focal_point - aperture_point)?;
            sum += tracer.trace_ray(&aperture_ray);
        }
        Ok(sum / self.aperture_points.len() as f64)
    }
}
