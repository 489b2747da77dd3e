use anyhow::{Context, Result};
use overlap_experiment::{FileStore, PointerEvent, Session, SessionStep};
use overlap_render::SkiaRenderer;
use overlap_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Icon, Window, WindowId},
};

type TrialSession = Session<FileStore, HighPrecisionTimer, StdRng>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    session: TrialSession,
    font: Option<PathBuf>,
    icon: Option<PathBuf>,
    /// Last pointer position in canvas pixels.
    cursor: Option<(f64, f64)>,
    render_timer: HighPrecisionTimer,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(session: TrialSession, font: Option<PathBuf>, icon: Option<PathBuf>) -> Self {
        Self {
            window: None,
            pixels: None,
            renderer: None,
            session,
            font,
            icon,
            cursor: None,
            render_timer: HighPrecisionTimer::new(),
            failure: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        log::info!(
            "platform {} ({}), press Escape to quit",
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        event_loop.run_app(&mut self)?;
        self.log_summary();

        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn canvas_size(&self) -> (u32, u32) {
        let layout = &self.session.config().layout;
        (layout.canvas_width, layout.canvas_height)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.canvas_size();

        // font first: without it there is nothing to show
        let renderer = match &self.font {
            Some(path) => SkiaRenderer::from_font_file(width, height, path)
                .with_context(|| format!("loading font {}", path.display()))?,
            None => SkiaRenderer::with_default_font(width, height)?,
        };

        let mut window_attributes = Window::default_attributes()
            .with_title("Circle Overlap")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);
        if let Some(path) = &self.icon {
            match load_icon(path) {
                Ok(icon) => window_attributes = window_attributes.with_window_icon(Some(icon)),
                Err(e) => log::warn!("ignoring window icon {}: {:#}", path.display(), e),
            }
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        log::info!(
            "window {}x{} (scale {:.2}), canvas {}x{}",
            physical_size.width,
            physical_size.height,
            window.scale_factor(),
            width,
            height
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(width, height, surface_texture)?);
        self.renderer = Some(renderer);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let Some(scene) = self.session.scene(self.cursor) else {
            return Ok(());
        };

        let stats = renderer.render_frame(&scene, pixels.frame_mut(), &mut self.render_timer)?;
        pixels.render()?;
        log::trace!(
            "clear {:.3}ms, draw {:.3}ms, copy {:.3}ms, total {:.3}ms, {} cached text sprites",
            stats.clear.as_secs_f64() * 1e3,
            stats.draw.as_secs_f64() * 1e3,
            stats.copy.as_secs_f64() * 1e3,
            stats.total.as_secs_f64() * 1e3,
            stats.cached_text,
        );
        Ok(())
    }

    /// Window position to canvas pixel. Positions outside the canvas map to
    /// out-of-range pixels so drags keep tracking past the edge.
    fn to_canvas(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let pixels = self.pixels.as_ref()?;
        let (px, py) = match pixels.window_pos_to_pixel((x as f32, y as f32)) {
            Ok((px, py)) => (px as f64, py as f64),
            Err((px, py)) => (px as f64, py as f64),
        };
        Some((px, py))
    }

    fn dispatch(&mut self, event: PointerEvent, event_loop: &ActiveEventLoop) {
        match self.session.handle_pointer(event) {
            Ok(SessionStep::Idle) => {}
            Ok(SessionStep::Warned) => log::debug!("incomplete warning shown"),
            Ok(SessionStep::Advanced(result)) => {
                log::info!("trial {} done, starting the next one", result.trial());
            }
            Ok(SessionStep::Finished(result)) => {
                log::info!("trial {} done, plan complete", result.trial());
                event_loop.exit();
            }
            Err(e) => self.fail(e.into(), event_loop),
        }
    }

    fn fail(&mut self, err: anyhow::Error, event_loop: &ActiveEventLoop) {
        log::error!("{:#}", err);
        self.failure.get_or_insert(err);
        event_loop.exit();
    }

    fn log_summary(&self) {
        let frames = self.session.timer().frame_stats();
        let render = self.render_timer.frame_stats();
        log::info!(
            "{} frames at {:.1} Hz (jitter {:.3} ms), render {:.3} ms avg / {:.3} ms max",
            frames.samples,
            frames.effective_fps,
            frames.jitter_ns / 1e6,
            render.average_frame_time_ns / 1e6,
            render.max_frame_time_ns / 1e6,
        );
        log::info!(
            "{} trial(s) recorded this session for {}, {} premature confirm(s)",
            self.session.completed(),
            self.session
                .participant()
                .map_or("an anonymous participant".to_string(), |p| format!("participant {p}")),
            self.session.recorder().warnings(),
        );
    }
}

fn load_icon(path: &Path) -> Result<Icon> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();
    Ok(Icon::from_rgba(image.into_raw(), width, height)?)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e, event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("escape pressed, leaving without recording the current trial");
                event_loop.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_canvas(position.x, position.y);
                if let Some((x, y)) = self.cursor {
                    self.dispatch(PointerEvent::Move { x, y }, event_loop);
                }
            }
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    if let Some((x, y)) = self.cursor {
                        self.dispatch(PointerEvent::Down { x, y }, event_loop);
                    }
                }
                ElementState::Released => self.dispatch(PointerEvent::Up, event_loop),
            },
            WindowEvent::RedrawRequested => {
                self.session.tick();
                if let Err(e) = self.render() {
                    self.fail(e, event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(pixels) = &mut self.pixels {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        log::warn!("failed to resize surface: {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}
