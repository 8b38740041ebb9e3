//! Panorama Viewer - Main Entry Point
//!
//! Creates the window, forwards window events to the application state,
//! and paces the redraw loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use panorama_viewer::{App, ViewerConfig};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Panorama Viewer";
const TARGET_FPS: u32 = 60;

/// Interactive 360 degree equirectangular panorama viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Equirectangular image to open at startup (test pattern when omitted)
    image: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Application state machine
enum AppState {
    /// Initial state before window is created
    Uninitialized,
    /// Window and graphics context are ready
    Running { window: Arc<Window>, app: App },
}

/// Main application handler implementing winit's ApplicationHandler trait
struct PanoramaViewerApp {
    state: AppState,
    config: ViewerConfig,
    initial_image: Option<PathBuf>,
    next_redraw_at: Instant,
}

impl PanoramaViewerApp {
    fn new(config: ViewerConfig, initial_image: Option<PathBuf>) -> Self {
        Self {
            state: AppState::Uninitialized,
            config,
            initial_image,
            next_redraw_at: Instant::now(),
        }
    }
}

impl ApplicationHandler for PanoramaViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only initialize if we haven't already
        if let AppState::Uninitialized = &self.state {
            log::info!("Creating window...");

            let window_attributes = WindowAttributes::default()
                .with_title(WINDOW_TITLE)
                .with_inner_size(LogicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                ));

            let window = Arc::new(
                event_loop
                    .create_window(window_attributes)
                    .expect("Failed to create window"),
            );

            log::info!(
                "Window created: {}x{}",
                window.inner_size().width,
                window.inner_size().height
            );

            log::info!("Initializing wgpu...");
            let app = pollster::block_on(App::new(
                window.clone(),
                &self.config,
                self.initial_image.take(),
            ));

            log::info!("Panorama Viewer ready!");
            log::info!("Drag to look around, scroll to zoom, drop an image to load it");
            log::info!("Press ESC to exit, F11 for fullscreen, O to open a file");

            self.state = AppState::Running { window, app };
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Only handle events if we're running
        let AppState::Running { window, app } = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => {
                    log::info!("Escape pressed, exiting...");
                    event_loop.exit();
                }
                KeyCode::F11 => {
                    if window.fullscreen().is_some() {
                        window.set_fullscreen(None);
                        log::info!("Exiting fullscreen");
                    } else {
                        window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                        log::info!("Entering fullscreen");
                    }
                }
                KeyCode::KeyO => {
                    app.open_image_dialog();
                }
                _ => {}
            },

            WindowEvent::Resized(physical_size) => {
                app.resize(physical_size);
            }

            WindowEvent::CursorMoved { position, .. } => {
                app.on_cursor_moved(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => app.on_pointer_pressed(),
                ElementState::Released => app.on_pointer_released(),
            },

            WindowEvent::Touch(touch) => {
                app.on_touch(
                    touch.phase,
                    touch.id,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
            }

            WindowEvent::MouseWheel { delta, .. } => {
                app.on_scroll(delta);
            }

            WindowEvent::DroppedFile(path) => {
                log::info!("File dropped: {:?}", path);
                app.on_file_dropped(path);
            }

            WindowEvent::HoveredFile(_) => {
                app.on_file_hover(true);
            }

            WindowEvent::HoveredFileCancelled => {
                app.on_file_hover(false);
            }

            WindowEvent::RedrawRequested => {
                app.update(Instant::now());

                match app.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        log::warn!("Surface lost, reconfiguring...");
                        app.resize(app.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("Surface error: {:?}", e);
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running { window, .. } = &mut self.state else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // Drive redraws at target FPS
        let frame_duration = Duration::from_nanos(1_000_000_000u64 / TARGET_FPS as u64);
        let now = Instant::now();

        if now >= self.next_redraw_at {
            window.request_redraw();
            self.next_redraw_at += frame_duration;

            // Reset if too far behind
            if now > self.next_redraw_at + frame_duration * 2 {
                self.next_redraw_at = now + frame_duration;
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_redraw_at));
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("Panorama Viewer v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = PanoramaViewerApp::new(config, args.image);
    event_loop.run_app(&mut app).expect("Event loop error");

    Ok(())
}
