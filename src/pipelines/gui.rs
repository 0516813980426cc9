use std::fmt;

use winit::{
    event::{ElementState, WindowEvent},
    window::Window,
};

/// egui on top of the scene: winit input in, tessellated widgets out.
///
/// Per frame: [`begin_frame`](Self::begin_frame), lay out widgets on
/// [`context`](Self::context), [`end_frame`](Self::end_frame), then
/// [`prepare`](Self::prepare) and [`render`](Self::render) while recording.
pub struct GuiPass {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

impl fmt::Debug for GuiPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuiPass")
            .field("primitives", &self.primitives.len())
            .finish_non_exhaustive()
    }
}

impl GuiPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
        let size = window.inner_size();
        let ctx = egui::Context::default();
        let max_texture_side = device.limits().max_texture_dimension_2d as usize;
        let state = egui_winit::State::new(
            ctx.clone(),
            ctx.viewport_id(),
            window,
            None,
            None,
            Some(max_texture_side),
        );
        let renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
            primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Feed a window event to egui. Returns `true` if a widget took it.
    ///
    /// Button releases are never reported as taken, so a drag that ends over
    /// the panel still ends for the orbit controls.
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } = event
        {
            return false;
        }
        response.consumed
    }

    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let input = self.state.take_egui_input(window);
        self.ctx.begin_pass(input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let egui::FullOutput {
            shapes,
            textures_delta,
            platform_output,
            pixels_per_point,
            ..
        } = self.ctx.end_pass();

        self.state.handle_platform_output(window, platform_output);
        self.textures_delta.append(textures_delta);
        self.primitives = self.ctx.tessellate(shapes, pixels_per_point);
        self.screen.pixels_per_point = pixels_per_point;
    }

    /// Upload textures and geometry for the last finished frame. The returned
    /// command buffers go to the queue ahead of `encoder`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        self.screen.size_in_pixels = size_in_pixels;
        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let buffers =
            self.renderer
                .update_buffers(device, queue, encoder, &self.primitives, &self.screen);
        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta.clear();
        buffers
    }

    /// Draw the widgets over whatever `view` already holds.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Gui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        self.renderer
            .render(&mut render_pass, &self.primitives, &self.screen);
    }
}
