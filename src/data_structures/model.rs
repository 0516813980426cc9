//! CPU-side mesh and material descriptions.
//!
//! A [`Geometry`] is the vertex/index data of one mesh, a [`Material`]
//! describes how it is shaded. Both live in the scene graph and are turned
//! into GPU buffers lazily by [`crate::render::GpuScene`].

use crate::data_structures::texture::TextureHandle;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(name: impl Into<String>, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Shading model of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Colour (times map) only, lights are ignored.
    Basic,
    /// Ambient + diffuse + specular from the scene lights.
    Phong,
}

/// Which faces of a mesh are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    /// Linear RGB base colour.
    pub color: [f32; 3],
    pub map: Option<TextureHandle>,
    pub side: Side,
    pub shininess: f32,
}

impl Material {
    pub fn basic(color: u32) -> Self {
        Self {
            name: String::from("basic"),
            shading: Shading::Basic,
            color: hex_to_rgb(color),
            map: None,
            side: Side::Front,
            shininess: 30.0,
        }
    }

    pub fn phong(color: u32) -> Self {
        Self {
            name: String::from("phong"),
            shading: Shading::Phong,
            ..Self::basic(color)
        }
    }

    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::phong(0xffffff)
    }
}

/// Converts an sRGB `0xRRGGBB` colour into linear RGB.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

/// The sRGB transfer function, inverted.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
