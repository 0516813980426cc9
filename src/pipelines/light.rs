use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::Light;

/// Lights beyond this count are ignored by the shader.
pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    /// xyz position, w is 0 for directional and 1 for point lights.
    position: [f32; 4],
    /// rgb already scaled by intensity, w is the point light cut-off distance.
    color: [f32; 4],
}

impl LightRaw {
    pub fn position(&self) -> [f32; 4] {
        self.position
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    ambient: [f32; 4],
    lights: [LightRaw; MAX_LIGHTS],
    // vec4 for uniform alignment, only x is read
    count: [u32; 4],
}

impl LightUniform {
    /// Ambient lights are summed, the other lights fill the slots in order.
    pub fn from_lights(lights: &[(Light, cgmath::Vector3<f32>)]) -> Self {
        let mut uniform = Self {
            ambient: [0.0; 4],
            lights: [LightRaw::default(); MAX_LIGHTS],
            count: [0; 4],
        };
        let mut count = 0;
        let mut ignored = 0;
        for (light, position) in lights {
            let (color, intensity, w, distance) = match *light {
                Light::Ambient { color, intensity } => {
                    for (sum, c) in uniform.ambient.iter_mut().zip(color) {
                        *sum += c * intensity;
                    }
                    continue;
                }
                Light::Directional { color, intensity } => (color, intensity, 0.0, 0.0),
                Light::Point {
                    color,
                    intensity,
                    distance,
                } => (color, intensity, 1.0, distance),
            };
            if count == MAX_LIGHTS {
                ignored += 1;
                continue;
            }
            uniform.lights[count] = LightRaw {
                position: [position.x, position.y, position.z, w],
                color: [
                    color[0] * intensity,
                    color[1] * intensity,
                    color[2] * intensity,
                    distance,
                ],
            };
            count += 1;
        }
        if ignored > 0 {
            log::warn!("More than {} lights, ignoring {}", MAX_LIGHTS, ignored);
        }
        uniform.count[0] = count as u32;
        uniform
    }

    pub fn ambient(&self) -> [f32; 3] {
        [self.ambient[0], self.ambient[1], self.ambient[2]]
    }

    pub fn count(&self) -> usize {
        self.count[0] as usize
    }

    /// The filled light slots.
    pub fn lights(&self) -> &[LightRaw] {
        &self.lights[..self.count()]
    }
}

/// GPU side of the scene lights.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = LightUniform::from_lights(&[]);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("light_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Write the lights to the GPU if they changed.
    pub fn upload(&mut self, queue: &wgpu::Queue, lights: &[(Light, cgmath::Vector3<f32>)]) {
        let uniform = LightUniform::from_lights(lights);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}
