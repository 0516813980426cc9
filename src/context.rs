use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{CameraResources, PerspectiveCamera},
    data_structures::{scene_graph::Scene, texture},
    flow::RenderSurface,
    pipelines::{Pipelines, gui::GuiPass, light::LightResources},
    render::{DrawMesh, GpuScene},
};

/// Window, device and every GPU resource the showcase draws with.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub gpu_scene: GpuScene,
    pub gui: GuiPass,
    pub clear_color: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, clear_color: wgpu::Color) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        // every backend wgpu was built with, WebGL on the web
        let instance = wgpu::Instance::default();

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await
            .context("Could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // colours are written linear and converted by the sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface supports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // the real camera is uploaded before every draw
        let camera = CameraResources::new(
            &device,
            &PerspectiveCamera::new(45.0, config.width as f32 / config.height as f32, 0.1, 1000.0),
        );
        let light = LightResources::new(&device);
        let pipelines = Pipelines::new(&device, &config, &camera, &light);
        let gpu_scene = GpuScene::new(&device, &queue, &pipelines)?;
        let gui = GuiPass::new(&device, config.format, &window);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            pipelines,
            gpu_scene,
            gui,
            clear_color,
        })
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.camera.upload(&self.queue, camera);
        self.light.upload(&self.queue, &scene.lights());
        self.gpu_scene
            .prepare(&self.device, &self.queue, &self.pipelines, scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let gui_buffers = self.gui.prepare(
            &self.device,
            &self.queue,
            &mut encoder,
            [self.config.width, self.config.height],
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if let Some(background) = scene
                .background()
                .and_then(|handle| self.gpu_scene.texture_bind_group(handle))
            {
                render_pass.set_pipeline(&self.pipelines.background);
                render_pass.draw_background(background, &self.camera.bind_group);
            }

            self.gpu_scene.draw(
                &mut render_pass,
                &self.pipelines,
                &self.camera.bind_group,
                &self.light.bind_group,
            );
        }

        self.gui.render(&mut encoder, &view);

        self.queue
            .submit(gui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

impl RenderSurface for Context {
    fn logical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn draw(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        self.render(scene, camera)
    }
}
