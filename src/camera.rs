//! Perspective camera, orbit controls and the camera uniform.
//!
//! The camera keeps its projection matrix cached: changing `fov`, `aspect`,
//! `near` or `far` has no effect until [`PerspectiveCamera::update_projection_matrix`]
//! is called, and every recompute bumps [`PerspectiveCamera::projection_version`].

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    projection: Matrix4<f32>,
    projection_version: u64,
}

impl PerspectiveCamera {
    const MIN_FOV: f32 = 0.01;
    const MAX_FOV: f32 = 179.9;

    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Point3::origin(),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            projection: Matrix4::identity(),
            projection_version: 0,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from `fov`, `aspect`, `near` and `far`.
    ///
    /// A 180 degree fov is accepted but projected just below it, and a
    /// degenerate near/far pair or aspect keeps the previous matrix.
    pub fn update_projection_matrix(&mut self) {
        let fov = self.effective_fov();
        if self.aspect > 0.0 && self.near > 0.0 && self.far > self.near {
            self.projection = OPENGL_TO_WGPU_MATRIX
                * cgmath::perspective(cgmath::Deg(fov), self.aspect, self.near, self.far);
        } else {
            log::warn!(
                "Keeping the previous projection, aspect {} near {} far {}",
                self.aspect,
                self.near,
                self.far
            );
        }
        self.projection_version += 1;
    }

    /// The fov in degrees the projection is actually built with.
    pub fn effective_fov(&self) -> f32 {
        self.fov.clamp(Self::MIN_FOV, Self::MAX_FOV)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Number of projection recomputes so far.
    pub fn projection_version(&self) -> u64 {
        self.projection_version
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// Clip space back to world directions, used by the background pass.
    inv_view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            inv_view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &PerspectiveCamera) {
        self.view_position = camera.position.to_homogeneous().into();
        let view_proj = camera.view_projection();
        self.view_proj = view_proj.into();
        // the background only needs directions, so translation is dropped
        let mut rotation_only = camera.view_matrix();
        rotation_only.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        let inverse = (camera.projection_matrix() * rotation_only)
            .invert()
            .unwrap_or_else(Matrix4::identity);
        self.inv_view_proj = inverse.into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &PerspectiveCamera) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, camera: &PerspectiveCamera) {
        self.uniform.update_view_proj(camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Drag {
    #[default]
    None,
    Rotate,
    Pan,
}

/// Orbits the camera around a target point.
///
/// Left drag rotates, right drag pans and the wheel dollies. Input is
/// accumulated by [`OrbitControls::handle_window_event`] and applied to the
/// camera by [`OrbitControls::update`].
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pub target: Point3<f32>,
    radius: f32,
    /// Azimuth around +Y, zero looking down -Z.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,

    drag: Drag,
    cursor: Option<(f64, f64)>,
    rotate_delta: (f32, f32),
    pan_delta: (f32, f32),
    zoom_delta: f32,
}

impl OrbitControls {
    const POLE_EPSILON: f32 = 1e-4;

    /// Controls orbiting `target`, starting from the camera's current position.
    pub fn new(camera: &PerspectiveCamera, target: Point3<f32>) -> Self {
        let offset = camera.position - target;
        let radius = offset.magnitude().max(f32::EPSILON);
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            drag: Drag::None,
            cursor: None,
            rotate_delta: (0.0, 0.0),
            pan_delta: (0.0, 0.0),
            zoom_delta: 0.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Records pointer input. Returns `true` if the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((x, y)) = self.cursor {
                    let dx = (position.x - x) as f32;
                    let dy = (position.y - y) as f32;
                    match self.drag {
                        Drag::Rotate => self.rotate(dx, dy),
                        Drag::Pan => self.pan(dx, dy),
                        Drag::None => (),
                    }
                }
                self.cursor = Some((position.x, position.y));
                self.drag != Drag::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.dolly(scroll);
                true
            }
            _ => false,
        }
    }

    /// Queue a rotation by a cursor movement in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.rotate_delta.0 += dx;
        self.rotate_delta.1 += dy;
    }

    /// Queue a pan by a cursor movement in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_delta.0 += dx;
        self.pan_delta.1 += dy;
    }

    /// Queue a dolly; positive values move towards the target.
    pub fn dolly(&mut self, scroll: f32) {
        self.zoom_delta += scroll;
    }

    /// Apply queued input and place the camera. `viewport_height` is in pixels.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, viewport_height: f32) {
        let viewport_height = viewport_height.max(1.0);

        let rotate_per_pixel = 2.0 * PI / viewport_height * self.rotate_speed;
        self.theta -= self.rotate_delta.0 * rotate_per_pixel;
        self.phi -= self.rotate_delta.1 * rotate_per_pixel;
        self.phi = self
            .phi
            .clamp(Self::POLE_EPSILON, PI - Self::POLE_EPSILON);
        self.rotate_delta = (0.0, 0.0);

        if self.zoom_delta != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(self.zoom_delta.abs());
            if self.zoom_delta > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
            self.zoom_delta = 0.0;
        }

        let direction = self.direction();
        if self.pan_delta != (0.0, 0.0) {
            let half_fov = camera.effective_fov().to_radians() / 2.0;
            let world_per_pixel = 2.0 * self.radius * half_fov.tan() / viewport_height;
            let forward = -direction;
            let right = forward.cross(Vector3::unit_y()).normalize();
            let up = right.cross(forward).normalize();
            let (dx, dy) = self.pan_delta;
            self.target += (right * -dx + up * dy) * world_per_pixel * self.pan_speed;
            self.pan_delta = (0.0, 0.0);
        }

        camera.position = self.target + direction * self.radius;
        camera.look_at(self.target);
    }

    fn direction(&self) -> Vector3<f32> {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vector3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }
}
