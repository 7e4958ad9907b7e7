//! Window, GPU surface and the per-frame loop.

use crate::capture::{CaptureError, CaptureTask};
use crate::config::{AppConfig, ConfigError};
use crate::hud::{HudState, render_hud};
use crate::shortcuts::ShortcutRegistry;
use kurbo::{Point, Size, Vec2};
use peniko::Color;
use snapcrop_core::canvas::Canvas;
use snapcrop_core::input::{InputState, KeyEvent, MouseButton, PointerEvent};
use snapcrop_core::session::{FrameOutcome, Session};
use snapcrop_render::{
    CompositeError, Compositor, RasterImage, RenderContext, Renderer, RendererError, VelloRenderer,
    preview_commands,
};
use std::sync::Arc;
use thiserror::Error;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

/// Scroll distance in pixels treated as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Composite(#[from] CompositeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Runtime state, created once the capture is available.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    scene_renderer: VelloRenderer,
    /// Converts vello's Rgba8 output to the surface format.
    texture_blitter: vello::wgpu::util::TextureBlitter,
    background: Color,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    hud: HudState,

    // State
    session: Session,
    input: InputState,
    compositor: Compositor,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    capture: Option<CaptureTask>,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    exported: Option<RasterImage>,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: AppConfig, capture: CaptureTask) -> Self {
        Self {
            config,
            capture: Some(capture),
            state: None,
            render_cx: None,
            exported: None,
            error: None,
        }
    }

    /// Run the interactive session until export or quit.
    ///
    /// Returns the composited image when the session ended with an export.
    pub fn run(config: AppConfig, capture: CaptureTask) -> Result<Option<RasterImage>, AppError> {
        let event_loop = EventLoop::new()?;
        let mut app = App::new(config, capture);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(app.exported.take()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop, canvas: Canvas) -> Result<(), AppError> {
        let background = self.config.background()?;

        // One screen pixel per canvas pixel at zoom 1.
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(canvas.width(), canvas.height()));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (canvas.width(), canvas.height())
        } else {
            (size.width, size.height)
        };
        log::info!("Window created, surface size {}x{}", width, height);

        let render_cx = self
            .render_cx
            .get_or_insert_with(vello::util::RenderContext::new);
        let surface: RenderSurface<'static> = pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .map_err(|e| RendererError::Surface(e.to_string()))?;

        let device = &render_cx.devices[surface.dev_id].device;
        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(e.to_string()))?;
        let texture_blitter =
            vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let shortcuts = ShortcutRegistry::new(&self.config.bindings, &self.config.hud_keys);
        shortcuts.log_all();

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            scene_renderer: VelloRenderer::new(),
            texture_blitter,
            background,
            egui_ctx,
            egui_state,
            egui_renderer,
            hud: HudState::new(self.config.show_hud, shortcuts),
            session: Session::new(canvas, self.config.session_options()),
            input: InputState::new(),
            compositor: Compositor::new(self.config.style.clone()),
        });

        window.request_redraw();
        Ok(())
    }

    /// Advance the session by one frame and present it.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        if state.input.any_just_pressed(&self.config.hud_keys) {
            state.hud.toggle();
        }
        let outcome = state.session.update(&state.input);
        state.input.begin_frame();

        match outcome {
            FrameOutcome::Continue => {}
            FrameOutcome::Quit => {
                log::info!("Exiting without export");
                event_loop.exit();
                return;
            }
            FrameOutcome::Export => {
                match state.compositor.export_session(&state.session) {
                    Ok(image) => {
                        log::info!("Exported {}x{}", image.width, image.height);
                        self.exported = Some(image);
                    }
                    Err(e) => {
                        log::error!("Export failed: {}", e);
                        self.error = Some(e.into());
                    }
                }
                event_loop.exit();
                return;
            }
        }

        let width = state.surface.config.width;
        let height = state.surface.config.height;

        let commands = preview_commands(&state.session, &self.config.style);
        let ctx = RenderContext::new(
            state.session.canvas(),
            &commands,
            Size::new(width as f64, height as f64),
        )
        .with_transform(state.session.camera.transform())
        .with_background(state.background);
        state.scene_renderer.build_scene(&ctx);
        let base_color = state.scene_renderer.background_color(&ctx);
        let scene = state.scene_renderer.take_scene();

        let egui_input = state.egui_state.take_egui_input(&state.window);
        let egui_output = state.egui_ctx.run(egui_input, |ctx| {
            render_hud(ctx, &state.session, &state.hud);
        });
        state
            .egui_state
            .handle_platform_output(&state.window, egui_output.platform_output);
        let egui_primitives = state
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        let Some(render_cx) = self.render_cx.as_ref() else {
            return;
        };
        let device_handle = &render_cx.devices[state.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match state.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                state.window.request_redraw();
                return;
            }
        };

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a storage-bindable Rgba8Unorm target; the surface may be Bgra.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) = state.vello_renderer.render_to_texture(
            device,
            queue,
            &scene,
            &render_texture_view,
            &params,
        ) {
            log::error!("Failed to render: {:?}", e);
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        {
            let mut blit_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("blit encoder"),
                });
            state.texture_blitter.copy(
                device,
                &mut blit_encoder,
                &render_texture_view,
                &surface_view,
            );
            queue.submit(std::iter::once(blit_encoder.finish()));
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            state.egui_renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("egui encoder"),
                });
            state.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Load,
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static render pass
            let mut render_pass = render_pass.forget_lifetime();
            state
                .egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            state.egui_renderer.free_texture(id);
        }

        surface_texture.present();
        state.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(capture) = self.capture.take() else {
            return;
        };

        // The window must not exist before the screen has been captured.
        let result = capture
            .join()
            .map_err(AppError::from)
            .and_then(|canvas| self.init(event_loop, canvas));
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw(event_loop);
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        // The HUD is display-only, so egui never consumes input.
        let _ = state.egui_state.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed without export");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::Focused(false) => {
                log::debug!("Focus lost, releasing held input");
                state.input.release_all();
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.handle_pointer_event(PointerEvent::Move {
                    position: Point::new(position.x, position.y),
                });
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let Some(button) = map_button(button) else {
                    return;
                };
                let position = state.input.pointer_position;
                let event = match button_state {
                    ElementState::Pressed => PointerEvent::Down { position, button },
                    ElementState::Released => PointerEvent::Up { position, button },
                };
                state.input.handle_pointer_event(event);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_LINE,
                };
                state.input.handle_pointer_event(PointerEvent::Scroll {
                    position: state.input.pointer_position,
                    delta: Vec2::new(0.0, notches),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(name) = key_name(&event.logical_key) else {
                    return;
                };
                let event = match event.state {
                    ElementState::Pressed => KeyEvent::Pressed(name),
                    ElementState::Released => KeyEvent::Released(name),
                };
                state.input.handle_key_event(event);
            }

            _ => {}
        }
    }
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Binding name for a key: lower-case characters, winit names for named keys.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_lowercase()),
        Key::Named(named) => Some(format!("{:?}", named)),
        _ => None,
    }
}
