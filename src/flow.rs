//! Frame loop and application event loop.
//!
//! The frame loop is a small state machine driven by the host's per-frame
//! scheduler:
//!
//! ```text
//! Idle --start--> Scheduled --frame--> Rendering --draw ok--> Scheduled
//!                                          |
//!                                          +--fatal draw error--> Idle
//! ```
//!
//! Each frame it
//! 1. resizes the backing store if the logical size changed,
//! 2. advances the showcase by the elapsed time,
//! 3. draws the scene from the camera,
//! 4. asks the scheduler for the next frame.
//!
//! The surface and the scheduler are traits so the loop can be driven
//! without a window. [`App`] plugs in the wgpu [`Context`] and the winit window.

use std::{rc::Rc, sync::Arc};

use instant::{Duration, Instant};
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::PerspectiveCamera,
    config::ShowcaseConfig,
    context::Context,
    data_structures::scene_graph::Scene,
    resources::{PlatformSource, queue::LoadQueue},
    showcase::Showcase,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Something the scene can be drawn onto.
pub trait RenderSurface {
    /// Size the host currently displays the surface at.
    fn logical_size(&self) -> (u32, u32);
    /// Size of the pixel buffer that is drawn into.
    fn backing_size(&self) -> (u32, u32);
    fn resize_backing(&mut self, width: u32, height: u32);
    /// Recreate the swap chain at the current backing size.
    fn reconfigure(&mut self);
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera)
    -> Result<(), wgpu::SurfaceError>;
}

/// The host's per-frame scheduler.
pub trait FrameScheduler {
    /// Ask for exactly one more frame.
    fn request_frame(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Scheduled,
    Rendering,
}

/// Monotonic frame clock. The first delta is zero.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let dt = self.last.map_or(Duration::ZERO, |last| now - last);
        self.last = Some(now);
        dt
    }
}

/// Compare logical and backing size; on mismatch resize the backing store
/// and recompute the camera projection. Returns `true` if it resized.
pub fn resize_to_display_size<R>(surface: &mut R, camera: &mut PerspectiveCamera) -> bool
where
    R: RenderSurface + ?Sized,
{
    let (width, height) = surface.logical_size();
    if width == 0 || height == 0 || (width, height) == surface.backing_size() {
        return false;
    }
    debug!("Resizing backing store to {}x{}", width, height);
    surface.resize_backing(width, height);
    camera.aspect = width as f32 / height as f32;
    camera.update_projection_matrix();
    true
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    clock: FrameClock,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn successfully so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Schedule the first frame. Does nothing unless the loop is idle.
    pub fn start<F>(&mut self, scheduler: &mut F)
    where
        F: FrameScheduler + ?Sized,
    {
        if self.state == LoopState::Idle {
            self.state = LoopState::Scheduled;
            scheduler.request_frame();
        }
    }

    /// Run one frame with the wall-clock time since the previous one.
    pub fn frame<R, F>(
        &mut self,
        showcase: &mut Showcase,
        surface: &mut R,
        scheduler: &mut F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        R: RenderSurface + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        let dt = self.clock.delta();
        self.frame_with_delta(showcase, surface, scheduler, dt)
    }

    /// Run one frame advancing the showcase by `dt`.
    ///
    /// Lost or outdated surfaces are reconfigured and the loop keeps going.
    /// Any other draw error stops the loop and is returned.
    pub fn frame_with_delta<R, F>(
        &mut self,
        showcase: &mut Showcase,
        surface: &mut R,
        scheduler: &mut F,
        dt: Duration,
    ) -> Result<(), wgpu::SurfaceError>
    where
        R: RenderSurface + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        if self.state != LoopState::Scheduled {
            debug!("Ignoring a frame while {:?}", self.state);
            return Ok(());
        }
        self.state = LoopState::Rendering;

        resize_to_display_size(surface, &mut showcase.camera);
        let (_, height) = surface.backing_size();
        showcase.update(dt.as_secs_f32(), height as f32);

        match surface.draw(&showcase.scene, &showcase.camera) {
            Ok(()) => self.frames += 1,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                surface.reconfigure();
            }
            Err(e) => {
                error!("Unable to render {}", e);
                self.state = LoopState::Idle;
                return Err(e);
            }
        }

        self.state = LoopState::Scheduled;
        scheduler.request_frame();
        Ok(())
    }
}

/// Schedules frames through winit redraw requests.
#[derive(Debug, Clone)]
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

pub(crate) enum ShowcaseEvent {
    #[allow(dead_code)]
    Initialized(Context),
}

struct Running {
    ctx: Context,
    showcase: Showcase,
    scheduler: WindowScheduler,
}

pub struct App {
    config: ShowcaseConfig,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<ShowcaseEvent>,
    loads: LoadQueue<Showcase>,
    running: Option<Running>,
    frame_loop: FrameLoop,
}

impl App {
    fn new(
        event_loop: &EventLoop<ShowcaseEvent>,
        config: ShowcaseConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            proxy: event_loop.create_proxy(),
            loads: LoadQueue::new()?,
            running: None,
            frame_loop: FrameLoop::new(),
        })
    }

    fn init(&mut self, ctx: Context) -> anyhow::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        let source = PlatformSource::new(&self.config.asset_root);
        #[cfg(target_arch = "wasm32")]
        let source = PlatformSource::from_location(&self.config.asset_root)?;

        let mut showcase = Showcase::assemble(self.config.clone(), Rc::new(source), &self.loads);
        let (width, height) = ctx.backing_size();
        showcase.camera.aspect = width as f32 / height as f32;
        showcase.camera.update_projection_matrix();
        let mut scheduler = WindowScheduler::new(ctx.window.clone());
        self.frame_loop.start(&mut scheduler);
        let running = Running {
            ctx,
            showcase,
            scheduler,
        };
        self.running = Some(running);
        Ok(())
    }
}

impl ApplicationHandler<ShowcaseEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.config.window_title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let clear_color = self.config.clear_color;
            let initialized = self
                .loads
                .block_on(Context::new(window, clear_color))
                .and_then(|ctx| self.init(ctx));
            if let Err(e) = initialized {
                error!("App initialization failed: {:#}", e);
                event_loop.exit();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let clear_color = self.config.clear_color;
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window, clear_color).await {
                    Ok(ctx) => {
                        if proxy.send_event(ShowcaseEvent::Initialized(ctx)).is_err() {
                            error!("Event loop closed before the context was ready");
                        }
                    }
                    Err(e) => error!("App initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ShowcaseEvent) {
        match event {
            ShowcaseEvent::Initialized(ctx) => {
                if let Err(e) = self.init(ctx) {
                    error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let window = running.ctx.window.clone();
        if !running.ctx.gui.handle_input(&window, &event) {
            running.showcase.handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) => running.ctx.window.request_redraw(),
            WindowEvent::RedrawRequested => {
                let applied = self.loads.poll(&mut running.showcase);
                if applied > 0 {
                    info!(
                        "{} asset load(s) completed, {} pending",
                        applied,
                        self.loads.pending()
                    );
                }
                running.ctx.gui.begin_frame(&window);
                running.showcase.show_panel(running.ctx.gui.context());
                running.ctx.gui.end_frame(&window);
                if self
                    .frame_loop
                    .frame(
                        &mut running.showcase,
                        &mut running.ctx,
                        &mut running.scheduler,
                    )
                    .is_err()
                {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

/// Initialize logging, open the window and run the showcase until it is closed.
pub fn run(config: ShowcaseConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ShowcaseEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
