use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use marcher_camera::FlyCamera;
use marcher_input::{Control, InputState};
use marcher_render::{DEFAULT_SHADER, Renderer, UniformBlock};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

#[derive(Parser)]
#[command(name = "marcher-desktop", about = "Interactive ray-marching viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Cap the frame rate to the display refresh; uncapped by default
    #[arg(long)]
    vsync: bool,

    /// External WGSL shader replacing the built-in scene
    #[arg(long)]
    shader: Option<PathBuf>,
}

/// Map a physical key to a viewer control. Keys outside this table are
/// ignored and never reach the input state.
fn map_key(key: KeyCode) -> Option<Control> {
    match key {
        KeyCode::KeyW => Some(Control::Forward),
        KeyCode::KeyS => Some(Control::Back),
        KeyCode::KeyA => Some(Control::StrafeLeft),
        KeyCode::KeyD => Some(Control::StrafeRight),
        KeyCode::Space => Some(Control::Ascend),
        KeyCode::ShiftLeft => Some(Control::Descend),
        KeyCode::ControlLeft => Some(Control::Precision),
        _ => None,
    }
}

struct App {
    input: InputState,
    camera: FlyCamera,
    started: Instant,
    vsync: bool,
    shader_source: String,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<Renderer>,
}

impl App {
    fn new(vsync: bool, shader_source: String) -> Self {
        Self {
            input: InputState::new(),
            camera: FlyCamera::default(),
            started: Instant::now(),
            vsync,
            shader_source,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Ray Marching")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("marcher_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if self.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Shader source was validated in main(); a failure here is a bug.
        let renderer = Renderer::new(
            &device,
            surface_format,
            &self.shader_source,
            config.width,
            config.height,
        )
        .expect("build renderer");

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(control) = map_key(key) {
                    match state {
                        ElementState::Pressed => self.input.press(control),
                        ElementState::Released => self.input.release(control),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                // One integration tick per displayed frame.
                self.camera.advance(&self.input);
                let time = self.started.elapsed().as_secs_f32();

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &mut self.renderer {
                    renderer.render(device, queue, &view, &self.camera, time);
                }

                output.present();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.camera.look(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let shader_source = match &cli.shader {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader {}", path.display()))?,
        None => DEFAULT_SHADER.to_owned(),
    };
    // Reject unusable shaders before the window opens.
    UniformBlock::from_wgsl(&shader_source).context("shader rejected")?;

    tracing::info!("marcher-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(cli.vsync, shader_source);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_map_to_controls() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Control::Forward));
        assert_eq!(map_key(KeyCode::KeyS), Some(Control::Back));
        assert_eq!(map_key(KeyCode::KeyA), Some(Control::StrafeLeft));
        assert_eq!(map_key(KeyCode::KeyD), Some(Control::StrafeRight));
        assert_eq!(map_key(KeyCode::Space), Some(Control::Ascend));
        assert_eq!(map_key(KeyCode::ShiftLeft), Some(Control::Descend));
        assert_eq!(map_key(KeyCode::ControlLeft), Some(Control::Precision));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        assert_eq!(map_key(KeyCode::KeyQ), None);
        assert_eq!(map_key(KeyCode::Escape), None);
        assert_eq!(map_key(KeyCode::F5), None);
    }
}
