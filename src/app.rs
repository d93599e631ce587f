//! Windowed viewer application.
//!
//! Owns the winit event loop, routes mouse input to the orbit camera, and
//! drives one render per frame from the [`AnimationDriver`]. The heavy
//! lifting lives in [`crate::gpu`]; this module is plumbing.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::animation::AnimationDriver;
use crate::config::FieldConfig;
use crate::error::AppError;
use crate::field::ParticleField;
use crate::gpu::GpuState;

/// Run the viewer with the given configuration. Blocks until the window is
/// closed. Validates the configuration, including the bloom contract, before
/// opening a window.
pub fn run(cfg: FieldConfig) -> Result<(), AppError> {
    cfg.validate()?;
    cfg.check_bloom_contract()?;

    let mut rng = SmallRng::from_entropy();
    let field = ParticleField::generate(&cfg, &mut rng)?;

    let event_loop = EventLoop::new().map_err(AppError::EventLoop)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(cfg, field, rng);
    event_loop.run_app(&mut app).map_err(AppError::EventLoop)?;

    match app.init_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    cfg: FieldConfig,
    field: ParticleField,
    driver: AnimationDriver,
    rng: SmallRng,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    /// First error hit during window/GPU setup, reported after the loop ends.
    init_error: Option<AppError>,
}

impl App {
    fn new(cfg: FieldConfig, field: ParticleField, rng: SmallRng) -> Self {
        let driver = AnimationDriver::new(cfg.base_scale);
        Self {
            window: None,
            gpu_state: None,
            cfg,
            field,
            driver,
            rng,
            mouse_pressed: false,
            last_mouse_pos: None,
            init_error: None,
        }
    }

    /// Draw a fresh field from the same configuration and upload it.
    fn reseed(&mut self) {
        match ParticleField::generate(&self.cfg, &mut self.rng) {
            Ok(field) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.replace_field(&field);
                }
                self.field = field;
            }
            Err(e) => eprintln!("Field regeneration failed: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Heartfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(AppError::Window(e));
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(GpuState::new(window, &self.cfg, &self.field)) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => {
                self.init_error = Some(AppError::Gpu(e));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        PhysicalKey::Code(KeyCode::Space) => self.reseed(),
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(-dx, dy);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll * 1.5);
                }
            }
            WindowEvent::RedrawRequested => {
                let scale_factor = self
                    .window
                    .as_ref()
                    .map(|w| w.scale_factor())
                    .unwrap_or(1.0);
                let frame = self.driver.advance(scale_factor);

                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render(&frame) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            gpu_state.resize(winit::dpi::PhysicalSize {
                                width: gpu_state.config.width,
                                height: gpu_state.config.height,
                            })
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_rejects_broken_bloom_contract() {
        let mut cfg = FieldConfig::default();
        cfg.bloom.threshold = 10.0;
        assert!(run(cfg).is_err());
    }

    #[test]
    fn test_run_rejects_zero_count() {
        let cfg = FieldConfig {
            count: 0,
            ..FieldConfig::default()
        };
        assert!(run(cfg).is_err());
    }
}
