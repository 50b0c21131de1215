//! Recursive Phong shading
//!
//! The color of a hit is its emission plus diffuse and specular light from every light source
//! that is not blocked, plus whatever is seen along the reflected and refracted rays. Recursion
//! stops after [`RayTracer::MAX_CALC_COLOR_LEVEL`] levels or once the accumulated attenuation
//! drops below [`RayTracer::MIN_CALC_COLOR_K`] in every channel.

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Unit;

use crate::lights::LightSource;
use crate::objects::GeoPoint;
use crate::scene::Scene;
use crate::utils::{align_zero, is_zero, lower_than, normalize, reflect};
use crate::{Color, Point, Ray, UnitVec3, Vec3};

/// Computes the color seen along a ray
///
/// Cameras render through this, so it has to be shareable between worker threads.
pub trait TraceRay: Sync {
    fn trace_ray(&self, ray: &Ray) -> Color;
}

/// Ray tracer over a borrowed, finalized scene
#[derive(Debug)]
pub struct RayTracer<'a> {
    scene: &'a Scene,
    evaluations: AtomicUsize,
}
impl<'a> RayTracer<'a> {
    pub const MAX_CALC_COLOR_LEVEL: u32 = 10;
    pub const MIN_CALC_COLOR_K: f64 = 0.001;

    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Number of shaded hits so far, primary and recursive
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn find_closest_intersection(&self, ray: &Ray) -> Option<GeoPoint<'a>> {
        self.scene.geometries.find_closest(ray, f64::INFINITY)
    }

    fn calc_color(&self, gp: &GeoPoint, ray: &Ray, level: u32, k: &Vec3) -> Color {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let color = self.calc_local_effects(gp, ray, k);
        if level <= 1 {
            color
        } else {
            color + self.calc_global_effects(gp, ray, level, k)
        }
    }

    fn calc_local_effects(&self, gp: &GeoPoint, ray: &Ray, k: &Vec3) -> Color {
        let v = ray.dir;
        let n = gp.normal();
        let mut color = gp.geometry.emission;
        let nv = align_zero(n.dot(&*v));
        if nv == 0.0 {
            return color;
        }

        let material = &gp.geometry.material;
        for light in &self.scene.lights {
            let Some(l) = light.l(&gp.point) else {
                continue;
            };
            let nl = align_zero(n.dot(&*l));
            // light and viewer must be on the same side of the surface
            if nl * nv <= 0.0 {
                continue;
            }
            let ktr = self.transparency(gp, light, &l, &n);
            if lower_than(&ktr.component_mul(k), Self::MIN_CALC_COLOR_K) {
                continue;
            }
            let il = light.intensity(&gp.point).component_mul(&ktr);
            color += calc_diffuse(&material.kd, nl, &il)
                + calc_specular(&material.ks, &l, &n, nl, &v, material.shininess, &il);
        }
        color
    }

    /// Fraction of a light's intensity passing through everything between the point and it
    fn transparency(&self, gp: &GeoPoint, light: &LightSource, l: &UnitVec3, n: &UnitVec3) -> Vec3 {
        let to_light = Unit::new_unchecked(-l.into_inner());
        let light_ray = Ray::offset(gp.point, to_light, n);
        let distance = light.distance(&gp.point);

        let mut ktr = Vec3::repeat(1.0);
        for hit in self
            .scene
            .geometries
            .find_geo_intersections(&light_ray, distance)
        {
            ktr = ktr.component_mul(&hit.geometry.material.kt);
            if lower_than(&ktr, Self::MIN_CALC_COLOR_K) {
                return Vec3::zeros();
            }
        }
        ktr
    }

    fn calc_global_effects(&self, gp: &GeoPoint, ray: &Ray, level: u32, k: &Vec3) -> Color {
        let v = ray.dir;
        let n = gp.normal();
        let material = &gp.geometry.material;

        let reflected = match construct_reflected_ray(&gp.point, &v, &n) {
            Some(reflected) => self.calc_global_effect(&reflected, level, k, &material.kr),
            None => Color::zeros(),
        };
        let refracted = Ray::offset(gp.point, v, &n);
        reflected + self.calc_global_effect(&refracted, level, k, &material.kt)
    }

    fn calc_global_effect(&self, ray: &Ray, level: u32, k: &Vec3, kx: &Vec3) -> Color {
        let kkx = k.component_mul(kx);
        if lower_than(&kkx, Self::MIN_CALC_COLOR_K) {
            return Color::zeros();
        }
        match self.find_closest_intersection(ray) {
            None => self.scene.background.component_mul(kx),
            Some(gp) => {
                if is_zero(gp.normal().dot(&*ray.dir)) {
                    Color::zeros()
                } else {
                    self.calc_color(&gp, ray, level - 1, &kkx).component_mul(kx)
                }
            }
        }
    }
}
impl TraceRay for RayTracer<'_> {
    fn trace_ray(&self, ray: &Ray) -> Color {
        match self.find_closest_intersection(ray) {
            None => self.scene.background,
            Some(gp) => {
                self.calc_color(&gp, ray, Self::MAX_CALC_COLOR_LEVEL, &Vec3::repeat(1.0))
                    + self.scene.ambient.intensity()
            }
        }
    }
}

fn calc_diffuse(kd: &Vec3, nl: f64, il: &Color) -> Color {
    il.component_mul(&(kd * nl.abs()))
}

fn calc_specular(
    ks: &Vec3,
    l: &UnitVec3,
    n: &UnitVec3,
    nl: f64,
    v: &UnitVec3,
    shininess: i32,
    il: &Color,
) -> Color {
    let r = l.into_inner() - 2.0 * nl * n.into_inner();
    let vr = align_zero(v.dot(&r));
    if vr >= 0.0 {
        return Color::zeros();
    }
    il.component_mul(&(ks * (-vr).powi(shininess)))
}

/// Mirror ray `v - 2 (v.n) n`, none when `v` grazes the surface
fn construct_reflected_ray(p: &Point, v: &UnitVec3, n: &UnitVec3) -> Option<Ray> {
    if is_zero(v.dot(&**n)) {
        return None;
    }
    let r = normalize(reflect(v, n)).ok()?;
    Some(Ray::offset(*p, r, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::{AmbientLight, LightSource};
    use crate::materials::Material;
    use crate::objects::{Geometry, Plane, Sphere};

    fn ray(orig: (f64, f64, f64), dir: (f64, f64, f64)) -> Ray {
        Ray::new(
            Point::new(orig.0, orig.1, orig.2),
            Vec3::new(dir.0, dir.1, dir.2),
        )
        .unwrap()
    }

    fn floor() -> Geometry {
        Geometry::new(Plane::new(Point::zeros(), Vec3::z()).unwrap().into())
            .with_material(Material::new().with_kd(Vec3::repeat(1.0)))
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = Scene::builder("empty")
            .background(Color::new(1.0, 2.0, 3.0))
            .ambient(AmbientLight::new(Color::repeat(100.0), Color::repeat(1.0)))
            .build();
        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray((0.0, 0.0, 0.0), (0.0, 0.0, -1.0)));
        assert_eq!(color, Color::new(1.0, 2.0, 3.0));
        assert_eq!(tracer.evaluations(), 0);
    }

    #[test]
    fn test_ambient_added_once() {
        let scene = Scene::builder("ambient")
            .ambient(AmbientLight::new(Color::repeat(100.0), Color::repeat(0.2)))
            .add_geometry(
                Geometry::new(Sphere::new(Point::zeros(), 1.0).into())
                    .with_emission(Color::new(5.0, 0.0, 0.0)),
            )
            .build();
        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray((0.0, 0.0, 5.0), (0.0, 0.0, -1.0)));
        assert!((color - Color::new(25.0, 20.0, 20.0)).norm() < 1e-9);
    }

    #[test]
    fn test_opaque_blocker_casts_black_shadow() {
        let light = LightSource::point(Color::repeat(255.0), Point::new(0.0, 0.0, 10.0));
        let view = ray((3.0, 0.0, 10.0), (-3.0, 0.0, -10.0));

        let lit = Scene::builder("lit")
            .add_geometry(floor())
            .add_light(light.clone())
            .build();
        let color = RayTracer::new(&lit).trace_ray(&view);
        assert!(color.iter().all(|c| *c > 0.0));

        let shadowed = Scene::builder("shadowed")
            .add_geometry(floor())
            .add_geometry(Geometry::new(Sphere::new(Point::new(0.0, 0.0, 5.0), 1.0).into()))
            .add_light(light)
            .build();
        let color = RayTracer::new(&shadowed).trace_ray(&view);
        assert_eq!(color, Color::zeros());
    }

    #[test]
    fn test_transparent_blocker_lets_light_through() {
        let light = LightSource::point(Color::repeat(255.0), Point::new(0.0, 0.0, 10.0));
        let view = ray((3.0, 0.0, 10.0), (-3.0, 0.0, -10.0));
        let build = |kt: f64| {
            Scene::builder("glass")
                .add_geometry(floor())
                .add_geometry(
                    Geometry::new(Sphere::new(Point::new(0.0, 0.0, 5.0), 1.0).into())
                        .with_material(Material::new().with_kt(Vec3::repeat(kt))),
                )
                .add_light(light.clone())
                .build()
        };
        let open = Scene::builder("open")
            .add_geometry(floor())
            .add_light(light.clone())
            .build();
        let full = RayTracer::new(&open).trace_ray(&view);

        // the shadow ray crosses the sphere twice
        let half = build(0.5);
        let color = RayTracer::new(&half).trace_ray(&view);
        assert!((color - full * 0.25).norm() < 1e-9);
    }

    #[test]
    fn test_facing_mirrors_terminate() {
        let mirror = Material::new().with_kr(Vec3::repeat(1.0));
        let scene = Scene::builder("mirrors")
            .add_geometry(
                Geometry::new(Plane::new(Point::new(1.0, 1.0, 0.0), Vec3::z()).unwrap().into())
                    .with_material(mirror.clone()),
            )
            .add_geometry(
                Geometry::new(
                    Plane::new(Point::new(1.0, 1.0, 10.0), -Vec3::z())
                        .unwrap()
                        .into(),
                )
                .with_material(mirror),
            )
            .build();
        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray((0.0, 0.0, 5.0), (0.0, 0.0, -1.0)));
        assert_eq!(color, Color::zeros());
        assert_eq!(
            tracer.evaluations(),
            RayTracer::MAX_CALC_COLOR_LEVEL as usize
        );
    }

    #[test]
    fn test_attenuation_cuts_recursion() {
        // 1, 0.2, 0.04, 0.008, 0.0016 are shaded, 0.00032 is below the cutoff
        let mirror = Material::new().with_kr(Vec3::repeat(0.2));
        let scene = Scene::builder("dim mirrors")
            .add_geometry(
                Geometry::new(Plane::new(Point::new(1.0, 1.0, 0.0), Vec3::z()).unwrap().into())
                    .with_material(mirror.clone()),
            )
            .add_geometry(
                Geometry::new(Plane::new(Point::new(1.0, 1.0, 10.0), Vec3::z()).unwrap().into())
                    .with_material(mirror),
            )
            .build();
        let tracer = RayTracer::new(&scene);
        tracer.trace_ray(&ray((0.0, 0.0, 5.0), (0.0, 0.0, -1.0)));
        assert_eq!(tracer.evaluations(), 5);
    }

    #[test]
    fn test_reflection_sees_background() {
        let scene = Scene::builder("mirror")
            .background(Color::new(10.0, 20.0, 30.0))
            .add_geometry(
                Geometry::new(Plane::new(Point::zeros(), Vec3::z()).unwrap().into())
                    .with_material(Material::new().with_kr(Vec3::new(1.0, 0.5, 0.0))),
            )
            .build();
        let color = RayTracer::new(&scene).trace_ray(&ray((0.0, 0.0, 5.0), (1.0, 0.0, -1.0)));
        assert!((color - Color::new(10.0, 10.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_specular_highlight() {
        let l = normalize(Vec3::new(1.0, 0.0, -1.0)).unwrap();
        let n = Vec3::z_axis();
        let nl = l.dot(&*n);
        // viewer exactly along the mirror direction of the light
        let v = normalize(Vec3::new(-1.0, 0.0, -1.0)).unwrap();
        let il = Color::repeat(100.0);
        let spec = calc_specular(&Vec3::repeat(0.5), &l, &n, nl, &v, 10, &il);
        assert!((spec - Color::repeat(50.0)).norm() < 1e-9);

        // viewer on the light's side gets nothing
        let v = normalize(Vec3::new(1.0, 0.0, -1.0)).unwrap();
        assert_eq!(
            calc_specular(&Vec3::repeat(0.5), &l, &n, nl, &v, 10, &il),
            Color::zeros()
        );
    }

    #[test]
    fn test_grazing_reflection_is_none() {
        let v = Vec3::x_axis();
        assert!(construct_reflected_ray(&Point::zeros(), &v, &Vec3::z_axis()).is_none());
        let r = construct_reflected_ray(
            &Point::zeros(),
            &normalize(Vec3::new(1.0, 0.0, -1.0)).unwrap(),
            &Vec3::z_axis(),
        )
        .unwrap();
        assert!(r.dir[2] > 0.0);
        assert!((r.orig[2] - Ray::DELTA).abs() < 1e-12);
    }
}
