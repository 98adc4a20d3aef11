//! Application event loop.
//!
//! [`run`] opens a window (or binds the `#canvas` element in the browser),
//! creates the GPU [`Context`], the scene and the post-processing
//! [`Composer`], then starts the asset boot task. Boot results come back to the
//! loop as user events and are applied to the scene in the order they were sent.
//!
//! # Lifecycle
//!
//! Every `RedrawRequested` runs [`drive_frame`]:
//! 1. Request the next frame
//! 2. Tick orbit controls, the rotation tween and world transforms
//! 3. Render through the composer and present
//!
//! Pointer moves feed both the orbit controls and the [`RotationBridge`].

use std::{fmt::Debug, iter, sync::Arc};

use cgmath::SquareMatrix;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    boot,
    config::Config,
    context::Context,
    data_structures::{
        environment::EnvironmentMap,
        scene_graph::{Node, Scene, SceneSink, Stage},
    },
    input::RotationBridge,
    render::{Composer, PassContext, RgbShiftPass, ScenePass, resize_viewport},
    resources::GpuLoader,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Something that can schedule another frame, usually the window.
pub trait FrameScheduler {
    fn request_next_frame(&self);
}

impl FrameScheduler for Window {
    fn request_next_frame(&self) {
        self.request_redraw();
    }
}

/// Per-frame state update and drawing.
pub trait FrameTarget {
    type Error;

    fn tick(&mut self, dt: Duration);

    fn render(&mut self) -> Result<(), Self::Error>;
}

/// One iteration of the render loop.
///
/// The next frame is requested before anything else, so a failing render
/// does not stop the loop.
pub fn drive_frame<S, T>(scheduler: &S, target: &mut T, dt: Duration) -> Result<(), T::Error>
where
    S: FrameScheduler + ?Sized,
    T: FrameTarget,
{
    scheduler.request_next_frame();
    target.tick(dt);
    target.render()
}

pub(crate) enum ShowcaseEvent {
    /// The wasm `spawn_local` finished creating the GPU state.
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    Environment(EnvironmentMap),
    Model(Node),
    Stage(Stage),
}

impl Debug for ShowcaseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Environment(env) => f.debug_tuple("Environment").field(&env.size).finish(),
            Self::Model(node) => f.debug_tuple("Model").field(&node.name).finish(),
            Self::Stage(stage) => f.debug_tuple("Stage").field(stage).finish(),
        }
    }
}

/// Forwards boot results from the loading task to the event loop.
#[derive(Clone)]
pub(crate) struct ProxySink {
    proxy: EventLoopProxy<ShowcaseEvent>,
}

impl ProxySink {
    fn send(&self, event: ShowcaseEvent) {
        if let Err(err) = self.proxy.send_event(event) {
            log::warn!("event loop closed before boot finished: {}", err);
        }
    }
}

impl SceneSink<EnvironmentMap, Node> for ProxySink {
    fn install_environment(&mut self, environment: EnvironmentMap) {
        self.send(ShowcaseEvent::Environment(environment));
    }

    fn attach_model(&mut self, model: Node) {
        self.send(ShowcaseEvent::Model(model));
    }

    fn enter(&mut self, stage: Stage) {
        self.send(ShowcaseEvent::Stage(stage));
    }
}

pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    composer: Composer,
    bridge: RotationBridge,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &Config) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let format = ctx.config.format;
        let mut composer = Composer::new(format, ctx.config.width, ctx.config.height);
        composer.add_pass(Box::new(ScenePass::new(&ctx.device, format)));
        composer.add_pass(Box::new(RgbShiftPass::new(
            &ctx.device,
            format,
            config.shift_amount,
            config.shift_angle,
        )));
        Ok(Self {
            ctx,
            scene: Scene::new(),
            composer,
            bridge: RotationBridge::from_config(config),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if resize_viewport(&mut self.ctx.projection, &mut self.composer, width, height) {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
            self.is_surface_configured = true;
        }
    }

    fn viewport(&self) -> (f64, f64) {
        (self.ctx.config.width as f64, self.ctx.config.height as f64)
    }

    fn loader(&self) -> GpuLoader {
        GpuLoader {
            device: self.ctx.device.clone(),
            queue: self.ctx.queue.clone(),
        }
    }

    fn handle_boot_event(&mut self, event: ShowcaseEvent) {
        match event {
            ShowcaseEvent::Environment(environment) => self.scene.install_environment(environment),
            ShowcaseEvent::Model(node) => self.scene.attach_model(node),
            ShowcaseEvent::Stage(stage) => self.scene.enter(stage),
            #[cfg(target_arch = "wasm32")]
            ShowcaseEvent::Initialized(_) => log::warn!("app state initialized twice"),
        }
    }
}

impl FrameTarget for AppState {
    type Error = wgpu::SurfaceError;

    fn tick(&mut self, dt: Duration) {
        let fovy = self.ctx.projection.fovy;
        self.ctx
            .camera
            .controls
            .update(&mut self.ctx.camera.camera, fovy);
        self.ctx.write_camera();

        self.bridge
            .advance(dt, self.scene.model_mut().map(|node| &mut node.transform));
        for node in self.scene.children() {
            node.write_world_transforms(&self.ctx.queue, cgmath::Matrix4::identity());
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut frame = PassContext {
                device: &self.ctx.device,
                queue: &self.ctx.queue,
                encoder: &mut encoder,
                scene: &self.scene,
                camera_bind_group: &self.ctx.camera.bind_group,
                environment: self
                    .scene
                    .environment()
                    .unwrap_or(&self.ctx.fallback_environment),
                clear_colour: self.ctx.clear_colour,
            };
            self.composer.render(&mut frame, &view);
        }
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ShowcaseEvent>,
    config: Config,
    state: Option<AppState>,
    window_created: bool,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ShowcaseEvent>, config: Config) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            window_created: false,
            last_time: Instant::now(),
        })
    }

    /// Take ownership of freshly created GPU state and start loading assets.
    fn start(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);

        let loader = state.loader();
        let mut sink = ProxySink {
            proxy: self.proxy.clone(),
        };
        let assets = self.config.assets.clone();
        let boot_task = async move {
            // populate logs its own failures
            let _ = boot::populate(&loader, &mut sink, &assets).await;
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(boot_task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(boot_task);

        state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }
}

#[cfg(target_arch = "wasm32")]
fn canvas_attributes(
    attributes: winit::window::WindowAttributes,
    canvas_id: &str,
) -> anyhow::Result<winit::window::WindowAttributes> {
    use anyhow::Context as _;
    use winit::platform::web::WindowAttributesExtWebSys;

    let window = web_sys::window().context("no browser window")?;
    let document = window.document().context("no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .with_context(|| format!("no element with id {}", canvas_id))?;
    Ok(attributes.with_canvas(Some(canvas.unchecked_into())))
}

impl ApplicationHandler<ShowcaseEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_created {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("shiftview");

        #[cfg(target_arch = "wasm32")]
        {
            window_attributes = match canvas_attributes(window_attributes, self.config.canvas_id) {
                Ok(attributes) => attributes,
                Err(e) => {
                    log::error!("cannot bind canvas: {:#}", e);
                    event_loop.exit();
                    return;
                }
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window_created = true;

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self
                .async_runtime
                .block_on(AppState::new(window, &self.config))
            {
                Ok(state) => self.start(state),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window, &config).await {
                    Ok(state) => {
                        if proxy
                            .send_event(ShowcaseEvent::Initialized(Box::new(state)))
                            .is_err()
                        {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ShowcaseEvent) {
        #[cfg(target_arch = "wasm32")]
        if let ShowcaseEvent::Initialized(state) = event {
            // This is the message from our wasm `spawn_local`
            self.start(*state);
            return;
        }

        match &mut self.state {
            Some(state) => state.handle_boot_event(event),
            None => log::warn!("dropping {:?}, app not initialized", event),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match &event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let window = state.ctx.window.clone();
                match drive_frame(window.as_ref(), state, dt) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (width, height) = state.viewport();
                state
                    .ctx
                    .camera
                    .controls
                    .handle_window_event(&event, height as f32);
                state.bridge.on_pointer_move(
                    state.scene.model().map(|node| &node.transform),
                    (position.x, position.y),
                    (width, height),
                );
            }
            WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => {
                let (_, height) = state.viewport();
                state
                    .ctx
                    .camera
                    .controls
                    .handle_window_event(&event, height as f32);
            }
            _ => {}
        }
    }
}

/// Open the viewer and block until the window closes.
pub fn run(config: Config) -> anyhow::Result<()> {
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
    log::info!("starting with {:?}", app.config.assets);

    event_loop.run_app(&mut app)?;

    Ok(())
}
