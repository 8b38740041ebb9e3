//! Look-direction camera for the panorama sphere
//!
//! The camera sits at the sphere's center and looks at a point on the sphere
//! computed from a longitude/latitude pair. Zoom changes the vertical field
//! of view rather than moving the camera.

use glam::{Mat4, Vec3};

/// Latitude limit in degrees, keeps the look direction away from the poles
pub const MAX_LATITUDE_DEG: f32 = 85.0;

/// Sphere radius the look target is projected onto
pub const SPHERE_RADIUS: f32 = 500.0;

/// Near clipping plane
const NEAR_PLANE: f32 = 1.0;
/// Far clipping plane, beyond the sphere surface
const FAR_PLANE: f32 = 1100.0;

/// Camera look direction in angular coordinates (degrees).
///
/// Longitude is unbounded; the trigonometry wraps it implicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Horizontal angle in degrees
    pub longitude: f32,
    /// Vertical angle in degrees
    pub latitude: f32,
}

impl Orientation {
    /// Create an orientation from longitude/latitude degrees
    pub fn new(longitude: f32, latitude: f32) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Copy with latitude limited to the pole-safe range
    pub fn clamped(self) -> Self {
        Self {
            longitude: self.longitude,
            latitude: self
                .latitude
                .clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG),
        }
    }

    /// Point on the sphere this orientation looks at.
    ///
    /// Spherical-to-Cartesian with phi measured from the +Y pole:
    /// lat 0 / lon 0 looks down +X, lat 90 looks straight up.
    pub fn look_target(self) -> Vec3 {
        let phi = (90.0 - self.latitude).to_radians();
        let theta = self.longitude.to_radians();

        Vec3::new(
            SPHERE_RADIUS * phi.sin() * theta.cos(),
            SPHERE_RADIUS * phi.cos(),
            SPHERE_RADIUS * phi.sin() * theta.sin(),
        )
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Perspective camera fixed at the origin of the panorama sphere
pub struct Camera {
    /// Vertical field of view in degrees
    fov_y_deg: f32,
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Field of view lower bound
    min_fov_deg: f32,
    /// Field of view upper bound
    max_fov_deg: f32,
}

impl Camera {
    /// Create a camera with the given field of view and zoom limits
    pub fn new(fov_y_deg: f32, aspect: f32, min_fov_deg: f32, max_fov_deg: f32) -> Self {
        Self {
            fov_y_deg: fov_y_deg.clamp(min_fov_deg, max_fov_deg),
            aspect,
            min_fov_deg,
            max_fov_deg,
        }
    }

    /// Combined view-projection matrix for the given look direction
    pub fn view_proj(&self, orientation: Orientation) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(f32::EPSILON),
            NEAR_PLANE,
            FAR_PLANE,
        );
        let view = Mat4::look_at_rh(Vec3::ZERO, orientation.look_target(), Vec3::Y);
        proj * view
    }

    /// Adjust the field of view by a signed amount of degrees.
    ///
    /// Positive widens (zoom out), negative narrows (zoom in). The result
    /// stays within the configured limits.
    pub fn zoom(&mut self, delta_deg: f32) {
        self.fov_y_deg = (self.fov_y_deg + delta_deg).clamp(self.min_fov_deg, self.max_fov_deg);
    }

    /// Update aspect ratio on window resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Current vertical field of view in degrees
    pub fn fov_y_deg(&self) -> f32 {
        self.fov_y_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_clamp() {
        assert_eq!(Orientation::new(0.0, 120.0).clamped().latitude, 85.0);
        assert_eq!(Orientation::new(0.0, -90.01).clamped().latitude, -85.0);
        assert_eq!(Orientation::new(370.0, 40.0).clamped().latitude, 40.0);
        // Longitude is never touched
        assert_eq!(Orientation::new(370.0, 120.0).clamped().longitude, 370.0);
    }

    #[test]
    fn test_look_target_axes() {
        // lat 0 / lon 0 points down +X at sphere radius
        let t = Orientation::new(0.0, 0.0).look_target();
        assert!((t.x - SPHERE_RADIUS).abs() < 1e-3);
        assert!(t.y.abs() < 1e-3);
        assert!(t.z.abs() < 1e-3);

        // lon 90 points down +Z
        let t = Orientation::new(90.0, 0.0).look_target();
        assert!(t.x.abs() < 1e-3);
        assert!((t.z - SPHERE_RADIUS).abs() < 1e-3);

        // lat 90 (pre-clamp) points straight up
        let t = Orientation::new(0.0, 90.0).look_target();
        assert!((t.y - SPHERE_RADIUS).abs() < 1e-3);
    }

    #[test]
    fn test_look_target_wraps_longitude() {
        let a = Orientation::new(10.0, 20.0).look_target();
        let b = Orientation::new(370.0, 20.0).look_target();
        assert!((a - b).length() < 1e-3);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::new(75.0, 16.0 / 9.0, 30.0, 120.0);
        camera.zoom(1000.0);
        assert_eq!(camera.fov_y_deg(), 120.0);
        camera.zoom(-1000.0);
        assert_eq!(camera.fov_y_deg(), 30.0);
        camera.zoom(5.0);
        assert_eq!(camera.fov_y_deg(), 35.0);
    }

    #[test]
    fn test_view_proj_finite() {
        let camera = Camera::new(75.0, 16.0 / 9.0, 30.0, 120.0);
        let m = camera.view_proj(Orientation::new(123.0, -45.0));
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
