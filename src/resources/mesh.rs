use cgmath::InnerSpace;

use crate::data_structures::model::{Geometry, ModelVertex};

/// Converts a triangulated, single-index tobj mesh into a [`Geometry`].
///
/// OBJ files without normals get smooth normals averaged from their faces.
pub fn to_geometry(model: &tobj::Model) -> Geometry {
    let m = &model.mesh;
    let mut vertices = (0..m.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                m.positions[i * 3],
                m.positions[i * 3 + 1],
                m.positions[i * 3 + 2],
            ],
            tex_coords: [
                m.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                m.normals.get(i * 3).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        })
        .collect::<Vec<_>>();

    let indices: Vec<u32> = m
        .indices
        .chunks_exact(3)
        .filter(|c| c.iter().all(|&i| (i as usize) < vertices.len()))
        .flatten()
        .copied()
        .collect();
    if indices.len() != m.indices.len() {
        log::warn!(
            "Mesh {} references vertices that do not exist, {} indices dropped",
            model.name,
            m.indices.len() - indices.len()
        );
    }

    if m.normals.is_empty() {
        compute_normals(&mut vertices, &indices);
    }

    Geometry::new(model.name.clone(), vertices, indices)
}

fn compute_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut normals = vec![cgmath::Vector3::new(0.0_f32, 0.0, 0.0); vertices.len()];
    for c in indices.chunks_exact(3) {
        let pos0: cgmath::Vector3<_> = vertices[c[0] as usize].position.into();
        let pos1: cgmath::Vector3<_> = vertices[c[1] as usize].position.into();
        let pos2: cgmath::Vector3<_> = vertices[c[2] as usize].position.into();
        // area weighted
        let face = (pos1 - pos0).cross(pos2 - pos0);
        for &i in c {
            normals[i as usize] += face;
        }
    }
    for (vertex, normal) in vertices.iter_mut().zip(normals) {
        if normal.magnitude2() > 0.0 {
            vertex.normal = normal.normalize().into();
        }
    }
}

