//! Render pipelines and the uniforms they bind.
//!
//! - `basic`: scene meshes, one variant culling back faces and one drawing both sides
//! - `background`: the equirectangular background behind everything else
//! - `light`: packing scene lights into a uniform
//! - `gui`: the egui overlay

pub mod background;
pub mod basic;
pub mod gui;
pub mod light;

use crate::{
    camera::CameraResources, pipelines::light::LightResources, resources::texture::diffuse_layout,
};

#[derive(Debug)]
pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
    pub mesh_double_sided: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
    pub material_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera: &CameraResources,
        light: &LightResources,
    ) -> Self {
        let material_layout = basic::mk_material_layout(device);
        let texture_layout = diffuse_layout(device);
        let layouts = [
            &camera.bind_group_layout,
            &light.bind_group_layout,
            &material_layout,
            &texture_layout,
        ];

        Self {
            mesh: basic::mk_mesh_pipeline(device, config, &layouts, Some(wgpu::Face::Back)),
            mesh_double_sided: basic::mk_mesh_pipeline(device, config, &layouts, None),
            background: background::mk_background_pipeline(
                device,
                config,
                &camera.bind_group_layout,
                &texture_layout,
            ),
            material_layout,
            texture_layout,
        }
    }
}
