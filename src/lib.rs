//! Panorama Viewer Library
//!
//! An interactive 360 degree panorama viewer: an equirectangular image is
//! mapped onto the inside of a sphere, a pointer drag orients the camera,
//! the scroll wheel zooms, and dropping an image file replaces the
//! panorama live.

pub mod app;
pub mod camera;
pub mod config;
pub mod controller;
pub mod loader;
pub mod render;
pub mod texture;

// Re-export commonly used types
pub use app::App;
pub use camera::{Camera, Orientation};
pub use config::ViewerConfig;
pub use controller::{ControllerSettings, OrbitController};
pub use loader::ImageLoader;
pub use render::{PanoramaPipeline, SphereMesh};
pub use texture::{PanoramaImage, PanoramaTexture, TextureError};
