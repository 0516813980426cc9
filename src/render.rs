//! GPU mirror of the scene graph.
//!
//! The scene holds plain CPU data. [`GpuScene`] creates buffers and bind
//! groups for it lazily: mesh buffers on first sight of a mesh node, texture
//! uploads whenever a texture's version or sampler settings change. Until a
//! texture has pixels it is drawn as 1x1 white.

use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::Side,
        scene_graph::{Mesh, NodeId, Scene},
        texture::{SamplerSettings, Texture, TextureAsset, TextureHandle},
    },
    pipelines::{
        Pipelines,
        basic::{MaterialUniform, mk_material_bind_group, mk_material_buffer},
    },
};

/// Buffers of one mesh node.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub instance_buffer: wgpu::Buffer,
    pub material: MaterialUniform,
    pub material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
    pub map: Option<TextureHandle>,
    pub double_sided: bool,
}

#[derive(Debug)]
struct GpuTexture {
    version: u32,
    settings: SamplerSettings,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct GpuScene {
    meshes: HashMap<NodeId, GpuMesh>,
    textures: HashMap<TextureHandle, GpuTexture>,
    white: wgpu::BindGroup,
    /// Mesh nodes in draw order, refreshed by `prepare`.
    visible: Vec<NodeId>,
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> anyhow::Result<wgpu::BindGroup> {
    let sampler = texture
        .sampler
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Texture {} has no sampler", label))?;
    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    }))
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
    ) -> anyhow::Result<Self> {
        let white = Texture::from_asset(device, queue, &TextureAsset::placeholder("white"))?;
        let white = texture_bind_group(device, &pipelines.texture_layout, &white, "white")?;
        Ok(Self {
            meshes: HashMap::new(),
            textures: HashMap::new(),
            white,
            visible: Vec::new(),
        })
    }

    /// Bring the GPU copies up to date with `scene`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        scene: &Scene,
    ) {
        for (handle, asset) in scene.textures() {
            let stale = self
                .textures
                .get(&handle)
                .is_none_or(|t| t.version != asset.version() || t.settings != asset.settings);
            if !stale {
                continue;
            }
            let uploaded = Texture::from_asset(device, queue, asset).and_then(|texture| {
                texture_bind_group(device, &pipelines.texture_layout, &texture, &asset.path)
            });
            match uploaded {
                Ok(bind_group) => {
                    log::debug!("Uploaded texture {} version {}", asset.path, asset.version());
                    self.textures.insert(
                        handle,
                        GpuTexture {
                            version: asset.version(),
                            settings: asset.settings,
                            bind_group,
                        },
                    );
                }
                Err(e) => log::error!("Could not upload texture {}: {:#}", asset.path, e),
            }
        }

        self.visible.clear();
        let mut seen = HashSet::new();
        let mut meshes = Vec::new();
        scene.root().visit(&mut |node| {
            if let Some(mesh) = node.as_mesh() {
                meshes.push((node.id(), mesh, node.world_transform().to_raw()));
            }
        });
        for (id, mesh, instance) in meshes {
            if mesh.geometry.indices.is_empty() {
                continue;
            }
            seen.insert(id);
            let repeat = mesh
                .material
                .map
                .and_then(|handle| scene.texture(handle))
                .map_or([1.0, 1.0], |t| t.settings.repeat);
            let material = MaterialUniform::new(&mesh.material, repeat);

            match self.meshes.get_mut(&id) {
                Some(gpu) => {
                    queue.write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&[instance]));
                    if gpu.material != material {
                        gpu.material = material;
                        queue.write_buffer(&gpu.material_buffer, 0, bytemuck::cast_slice(&[material]));
                    }
                    gpu.map = mesh.material.map;
                    gpu.double_sided = mesh.material.side == Side::Double;
                }
                None => {
                    let gpu = create_mesh(device, pipelines, mesh, instance, material);
                    self.meshes.insert(id, gpu);
                }
            }
            self.visible.push(id);
        }
        self.meshes.retain(|id, _| seen.contains(id));
    }

    /// Bind group of an uploaded texture.
    pub fn texture_bind_group(&self, handle: TextureHandle) -> Option<&wgpu::BindGroup> {
        self.textures.get(&handle).map(|t| &t.bind_group)
    }

    pub fn mesh(&self, id: NodeId) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Draw every mesh found by the last `prepare`, single sided ones first.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipelines: &Pipelines,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        for (pipeline, double_sided) in [
            (&pipelines.mesh, false),
            (&pipelines.mesh_double_sided, true),
        ] {
            render_pass.set_pipeline(pipeline);
            for mesh in self
                .visible
                .iter()
                .filter_map(|id| self.meshes.get(id))
                .filter(|mesh| mesh.double_sided == double_sided)
            {
                let map = mesh
                    .map
                    .and_then(|handle| self.texture_bind_group(handle))
                    .unwrap_or(&self.white);
                render_pass.draw_mesh(mesh, map, camera_bind_group, light_bind_group);
            }
        }
    }
}

fn create_mesh(
    device: &wgpu::Device,
    pipelines: &Pipelines,
    mesh: &Mesh,
    instance: InstanceRaw,
    material: MaterialUniform,
) -> GpuMesh {
    let name = &mesh.geometry.name;
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(&mesh.geometry.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", name)),
        contents: bytemuck::cast_slice(&mesh.geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Instance Buffer", name)),
        contents: bytemuck::cast_slice(&[instance]),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });
    let material_buffer = mk_material_buffer(device, material);
    let material_bind_group =
        mk_material_bind_group(device, &pipelines.material_layout, &material_buffer);

    GpuMesh {
        vertex_buffer,
        index_buffer,
        num_indices: mesh.geometry.indices.len() as u32,
        instance_buffer,
        material,
        material_buffer,
        material_bind_group,
        map: mesh.material.map,
        double_sided: mesh.material.side == Side::Double,
    }
}

pub trait DrawMesh {
    fn draw_mesh(
        &mut self,
        mesh: &GpuMesh,
        map: &wgpu::BindGroup,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );

    fn draw_background(&mut self, map: &wgpu::BindGroup, camera_bind_group: &wgpu::BindGroup);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(
        &mut self,
        mesh: &GpuMesh,
        map: &wgpu::BindGroup,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, light_bind_group, &[]);
        self.set_bind_group(2, &mesh.material_bind_group, &[]);
        self.set_bind_group(3, map, &[]);
        self.draw_indexed(0..mesh.num_indices, 0, 0..1);
    }

    fn draw_background(&mut self, map: &wgpu::BindGroup, camera_bind_group: &wgpu::BindGroup) {
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, map, &[]);
        self.draw(0..3, 0..1);
    }
}
