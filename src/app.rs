//! Application state holding the wgpu graphics context
//!
//! Owns the surface, device, and queue, the sphere pipeline, the current
//! panorama texture, and the interaction state. The window event loop in
//! `main` forwards events here; `update` and `render` run once per frame.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::dpi::PhysicalSize;
use winit::event::{MouseScrollDelta, TouchPhase};
use winit::window::Window;

use crate::camera::{Camera, Orientation, SPHERE_RADIUS};
use crate::config::ViewerConfig;
use crate::controller::OrbitController;
use crate::loader::ImageLoader;
use crate::render::{PanoramaPipeline, SceneUniforms, SphereMesh};
use crate::texture::{PanoramaImage, PanoramaTexture};

/// Scene brightness while a file hovers over the window
const DROP_HOVER_TINT: f32 = 0.5;

/// Field of view change per pixel of wheel scroll
const PIXEL_ZOOM_FACTOR: f32 = 0.05;

/// Main application state
pub struct App {
    /// Reference to the window
    window: Arc<Window>,
    /// The wgpu surface for presenting rendered frames
    surface: wgpu::Surface<'static>,
    /// The wgpu device for creating GPU resources
    device: wgpu::Device,
    /// The command queue for submitting GPU work
    queue: wgpu::Queue,
    /// Surface configuration
    config: wgpu::SurfaceConfiguration,
    /// Current window size in physical pixels
    size: PhysicalSize<u32>,

    // Scene
    pipeline: PanoramaPipeline,
    panorama: PanoramaTexture,
    texture_bind_group: wgpu::BindGroup,
    camera: Camera,

    // Interaction
    controller: OrbitController,
    cursor_position: (f32, f32),
    active_touch: Option<u64>,
    drop_hover: bool,
    wheel_zoom_step: f32,

    // Background image loading
    loader: ImageLoader,
}

impl App {
    /// Create a new App instance with initialized wgpu context.
    ///
    /// Starts on the procedural test pattern; if `initial_image` is given
    /// its decode is kicked off immediately and hot-swapped in when ready.
    pub async fn new(
        window: Arc<Window>,
        viewer_config: &ViewerConfig,
        initial_image: Option<PathBuf>,
    ) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find suitable GPU adapter");

        log::info!("Using GPU: {}", adapter.get_info().name);
        log::info!("Backend: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Panorama Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // One frame per display refresh, matching the paced redraw loop
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let mesh = SphereMesh::new(
            SPHERE_RADIUS,
            viewer_config.sphere_segments,
            viewer_config.sphere_rings,
        );
        let pipeline = PanoramaPipeline::new(&device, surface_format, &mesh);

        // Visible surface until the first real image arrives
        let pattern = PanoramaImage::test_pattern(2048, 1024);
        let panorama = PanoramaTexture::upload(&device, &queue, &pattern);
        let texture_bind_group = pipeline.create_texture_bind_group(&device, &panorama.view);

        let camera = Camera::new(
            viewer_config.fov_deg,
            size.width.max(1) as f32 / size.height.max(1) as f32,
            viewer_config.min_fov_deg,
            viewer_config.max_fov_deg,
        );
        let controller = OrbitController::new(
            Orientation::default(),
            viewer_config.controller_settings(),
        );

        let mut loader = ImageLoader::new();
        if let Some(path) = initial_image {
            loader.request(path);
        }

        Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            panorama,
            texture_bind_group,
            camera,
            controller,
            cursor_position: (0.0, 0.0),
            active_touch: None,
            drop_hover: false,
            wheel_zoom_step: viewer_config.wheel_zoom_step,
            loader,
        }
    }

    /// Resize the surface
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera
                .set_aspect(new_size.width as f32 / new_size.height as f32);
        }
    }

    /// Get current size
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Handle cursor movement
    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor_position = (x, y);
        self.controller.pointer_move((x, y));
    }

    /// Handle primary mouse button press at the tracked cursor position
    pub fn on_pointer_pressed(&mut self) {
        self.controller.pointer_down(self.cursor_position);
    }

    /// Handle primary mouse button release
    pub fn on_pointer_released(&mut self) {
        self.controller.pointer_up(Instant::now());
    }

    /// Handle a touch event; only the first active touch drives the drag
    pub fn on_touch(&mut self, phase: TouchPhase, id: u64, x: f32, y: f32) {
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_none() {
                    self.active_touch = Some(id);
                    self.cursor_position = (x, y);
                    self.controller.pointer_down((x, y));
                }
            }
            TouchPhase::Moved => {
                if self.active_touch == Some(id) {
                    self.cursor_position = (x, y);
                    self.controller.pointer_move((x, y));
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    self.controller.pointer_up(Instant::now());
                }
            }
        }
    }

    /// Handle scroll wheel zoom
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        let fov_delta = match delta {
            // Scrolling up narrows the view (zoom in)
            MouseScrollDelta::LineDelta(_, y) => -y * self.wheel_zoom_step,
            MouseScrollDelta::PixelDelta(pos) => -pos.y as f32 * PIXEL_ZOOM_FACTOR,
        };
        self.camera.zoom(fov_delta);
    }

    /// Handle a file dropped onto the window
    pub fn on_file_dropped(&mut self, path: PathBuf) {
        self.drop_hover = false;
        self.loader.request(path);
    }

    /// Handle a file entering or leaving the window while dragged
    pub fn on_file_hover(&mut self, hovering: bool) {
        self.drop_hover = hovering;
    }

    /// Open a native file dialog and load the chosen image
    pub fn open_image_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp", "tiff"])
            .pick_file()
        {
            self.loader.request(path);
        }
    }

    /// Per-frame update: complete pending loads and advance the view
    pub fn update(&mut self, now: Instant) {
        if let Some(image) = self.loader.poll() {
            self.panorama = PanoramaTexture::upload(&self.device, &self.queue, &image);
            self.texture_bind_group = self
                .pipeline
                .create_texture_bind_group(&self.device, &self.panorama.view);
            self.window.request_redraw();
        }

        self.controller.advance_frame(now);
    }

    /// Render one frame
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let tint = if self.drop_hover { DROP_HOVER_TINT } else { 1.0 };
        let uniforms = SceneUniforms {
            view_proj: self
                .camera
                .view_proj(self.controller.orientation())
                .to_cols_array_2d(),
            tint: [tint, tint, tint, 1.0],
        };
        self.pipeline.write_uniforms(&self.queue, &uniforms);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panorama Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.pipeline.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.pipeline.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.pipeline.index_count, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
