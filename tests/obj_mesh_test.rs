use flow_showcase::resources::mesh::to_geometry;


fn triangle(normals: Vec<f32>, indices: Vec<u32>) -> tobj::Model {
    tobj::Model::new(
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals,
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices,
            ..Default::default()
        },
        "triangle".to_string(),
    )
}

#[test]
fn should_flip_texture_coordinates_vertically() {
    let geometry = to_geometry(&triangle(vec![], vec![0, 1, 2]));

    assert_eq!(geometry.name, "triangle");
    assert_eq!(geometry.vertices[0].tex_coords, [0.0, 1.0]);
    assert_eq!(geometry.vertices[1].tex_coords, [1.0, 1.0]);
    assert_eq!(geometry.vertices[2].tex_coords, [0.0, 0.0]);
}

#[test]
fn should_compute_normals_when_the_file_has_none() {
    let geometry = to_geometry(&triangle(vec![], vec![0, 1, 2]));

    for vertex in &geometry.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
}

#[test]
fn should_keep_normals_from_the_file() {
    let normals = vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
    let geometry = to_geometry(&triangle(normals, vec![0, 1, 2]));

    for vertex in &geometry.vertices {
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
    }
}

#[test]
fn should_drop_triangles_with_missing_vertices() {
    let geometry = to_geometry(&triangle(vec![], vec![0, 1, 2, 0, 1, 7]));

    assert_eq!(geometry.indices, vec![0, 1, 2]);
    assert_eq!(geometry.triangle_count(), 1);
}
