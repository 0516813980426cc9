//! Procedural geometry for the primitive meshes of the scene.
//!
//! All generators emit counter-clockwise front faces, outward normals and
//! texture coordinates with `v = 0` at the top of the image.

use std::f32::consts::PI;

use cgmath::InnerSpace;

use crate::data_structures::model::{Geometry, ModelVertex};

/// Axis aligned box centred at the origin.
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 4 vertices per face: (normal, corners)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front (+Z)
        ([0.0, 0.0, 1.0], [[-w, -h, d], [w, -h, d], [w, h, d], [-w, h, d]]),
        // Back (-Z)
        ([0.0, 0.0, -1.0], [[w, -h, -d], [-w, -h, -d], [-w, h, -d], [w, h, -d]]),
        // Top (+Y)
        ([0.0, 1.0, 0.0], [[-w, h, d], [w, h, d], [w, h, -d], [-w, h, -d]]),
        // Bottom (-Y)
        ([0.0, -1.0, 0.0], [[-w, -h, -d], [w, -h, -d], [w, -h, d], [-w, -h, d]]),
        // Right (+X)
        ([1.0, 0.0, 0.0], [[w, -h, d], [w, -h, -d], [w, h, -d], [w, h, d]]),
        // Left (-X)
        ([-1.0, 0.0, 0.0], [[-w, -h, -d], [-w, -h, d], [-w, h, d], [-w, h, -d]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (position, tex_coords) in corners.into_iter().zip(uvs) {
            vertices.push(ModelVertex {
                position,
                tex_coords,
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new("box", vertices, indices)
}

/// UV sphere centred at the origin.
pub fn create_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::new();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            let normal = [-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            vertices.push(ModelVertex {
                position: normal.map(|n| n * radius),
                tex_coords: [u, v],
                normal,
            });
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            // the pole rows collapse into single triangles
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new("sphere", vertices, indices)
}

/// Capped cylinder (or cone frustum) along the Y axis, centred at the origin.
pub fn create_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Geometry {
    let radial_segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // torso
    for v in [0.0_f32, 1.0] {
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let y = half_height - v * height;
        for ix in 0..=radial_segments {
            let u = ix as f32 / radial_segments as f32;
            let (sin, cos) = (u * 2.0 * PI).sin_cos();
            let normal = cgmath::Vector3::new(sin, slope, cos).normalize();
            vertices.push(ModelVertex {
                position: [radius * sin, y, radius * cos],
                tex_coords: [u, v],
                normal: normal.into(),
            });
        }
    }
    let stride = radial_segments + 1;
    for ix in 0..radial_segments {
        let a = ix;
        let b = stride + ix;
        let c = stride + ix + 1;
        let d = ix + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // caps
    for top in [true, false] {
        let (radius, y, sign) = if top {
            (radius_top, half_height, 1.0)
        } else {
            (radius_bottom, -half_height, -1.0)
        };
        if radius <= 0.0 {
            continue;
        }
        let center_start = vertices.len() as u32;
        for _ in 1..=radial_segments {
            vertices.push(ModelVertex {
                position: [0.0, y, 0.0],
                tex_coords: [0.5, 0.5],
                normal: [0.0, sign, 0.0],
            });
        }
        let ring_start = vertices.len() as u32;
        for ix in 0..=radial_segments {
            let u = ix as f32 / radial_segments as f32;
            let (sin, cos) = (u * 2.0 * PI).sin_cos();
            vertices.push(ModelVertex {
                position: [radius * sin, y, radius * cos],
                tex_coords: [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
                normal: [0.0, sign, 0.0],
            });
        }
        for ix in 0..radial_segments {
            let center = center_start + ix;
            let ring = ring_start + ix;
            if top {
                indices.extend_from_slice(&[ring, ring + 1, center]);
            } else {
                indices.extend_from_slice(&[ring + 1, ring, center]);
            }
        }
    }

    Geometry::new("cylinder", vertices, indices)
}

/// Single-quad plane in the XY plane facing +Z.
pub fn create_plane(width: f32, height: f32) -> Geometry {
    let w = width / 2.0;
    let h = height / 2.0;
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        ModelVertex {
            position: [-w, h, 0.0],
            tex_coords: [0.0, 0.0],
            normal,
        },
        ModelVertex {
            position: [w, h, 0.0],
            tex_coords: [1.0, 0.0],
            normal,
        },
        ModelVertex {
            position: [-w, -h, 0.0],
            tex_coords: [0.0, 1.0],
            normal,
        },
        ModelVertex {
            position: [w, -h, 0.0],
            tex_coords: [1.0, 1.0],
            normal,
        },
    ];
    // top-left, bottom-left, top-right / bottom-left, bottom-right, top-right
    let indices = vec![0, 2, 1, 2, 3, 1];

    Geometry::new("plane", vertices, indices)
}
