use std::borrow::Cow;

use cgmath::{Quaternion, Rotation3, Vector3};
use flow_showcase::data_structures::{
    instance::Instance,
    model::Material,
    primitives,
    scene_graph::{Light, Node, NodeId, Scene},
    texture::{TextureAsset, fit_to_limit},
};

use crate::common::test_utils::assert_close;

mod common;

fn cube(name: &str) -> Node {
    Node::mesh(
        name,
        primitives::create_box(1.0, 1.0, 1.0),
        Material::basic(0xffffff),
    )
}

#[test]
fn should_start_with_only_the_root() {
    let scene = Scene::new();

    assert!(scene.is_empty());
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.root().id(), NodeId::ROOT);
    assert_eq!(scene.background(), None);
}

#[test]
fn should_assign_unique_ids_to_whole_subtrees() {
    let mut scene = Scene::new();

    let a = scene.add(cube("a"));
    let group = scene.add(Node::group("group").with_child(cube("b")).with_child(cube("c")));

    assert_ne!(a, group);
    assert_eq!(scene.len(), 5);
    let ids: Vec<NodeId> = scene.node(group).unwrap().children().iter().map(Node::id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| *id != a && *id != group));
    assert_ne!(ids[0], ids[1]);
    assert_eq!(scene.find_by_name("c").unwrap().id(), ids[1]);
}

#[test]
fn should_attach_under_a_known_parent_only() {
    let mut scene = Scene::new();
    let group = scene.add(Node::group("group"));

    let child = scene.add_child(group, cube("child"));
    let orphan = scene.add_child(NodeId(999), cube("orphan"));

    assert!(child.is_some());
    assert!(orphan.is_none());
    assert_eq!(scene.node(group).unwrap().children().len(), 1);
    assert!(scene.find_by_name("orphan").is_none());
}

#[test]
fn should_compose_world_transforms_parent_first() {
    let mut scene = Scene::new();
    let turn = Instance {
        rotation: Quaternion::from_angle_y(cgmath::Deg(90.0)),
        ..Instance::at(0.0, 0.0, 5.0)
    };
    let parent = scene.add(
        Node::group("parent")
            .transformed(turn)
            .with_child(cube("child").at(1.0, 0.0, 0.0)),
    );
    scene.update_world_transforms();

    let child = &scene.node(parent).unwrap().children()[0];
    let world = child.world_transform().position;
    assert_close(world.x, 0.0);
    assert_close(world.y, 0.0);
    assert_close(world.z, 4.0);
}

#[test]
fn should_pick_up_local_changes_on_the_next_update() {
    let mut scene = Scene::new();
    let id = scene.add(cube("cube"));
    scene.update_world_transforms();

    scene.node_mut(id).unwrap().local.position = Vector3::new(3.0, 2.0, 1.0);
    assert_eq!(
        scene.node(id).unwrap().world_transform().position,
        Vector3::new(0.0, 0.0, 0.0)
    );

    scene.update_world_transforms();
    assert_eq!(
        scene.node(id).unwrap().world_transform().position,
        Vector3::new(3.0, 2.0, 1.0)
    );
}

#[test]
fn should_collect_lights_with_world_positions() {
    let mut scene = Scene::new();
    let ambient = Light::Ambient {
        color: [0.25, 0.25, 0.25],
        intensity: 1.0,
    };
    scene.add(Node::light("ambient", ambient));
    scene.add(
        Node::group("rig").at(0.0, 10.0, 0.0).with_child(
            Node::light(
                "sun",
                Light::Directional {
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.5,
                },
            )
            .at(5.0, 0.0, 0.0),
        ),
    );
    scene.update_world_transforms();

    let lights = scene.lights();
    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].0, ambient);
    assert_eq!(lights[1].1, Vector3::new(5.0, 10.0, 0.0));
}

#[test]
fn should_hand_out_texture_handles_in_order() {
    let mut scene = Scene::new();

    let first = scene.add_texture(TextureAsset::placeholder("a.png"));
    let second = scene.add_texture(TextureAsset::placeholder("b.png"));
    scene.set_background(Some(second));

    assert_ne!(first, second);
    assert_eq!(scene.texture(second).unwrap().path, "b.png");
    assert_eq!(scene.textures().count(), 2);
    assert_eq!(scene.background(), Some(second));
}

#[test]
fn should_bump_the_texture_version_on_every_change() {
    let mut texture = TextureAsset::placeholder("a.png");
    assert!(!texture.is_loaded());

    texture.set_image(image::RgbaImage::new(1, 1));
    texture.update_settings(|s| s.repeat = [2.0, 2.0]);

    assert!(texture.is_loaded());
    assert_eq!(texture.version(), 2);
    assert_eq!(texture.settings.repeat, [2.0, 2.0]);
}

#[test]
fn should_scale_textures_down_to_the_device_limit() {
    let panorama = image::RgbaImage::from_pixel(4096, 1024, image::Rgba([10, 20, 30, 255]));

    let fitted = fit_to_limit(&panorama, 2048);

    assert!(matches!(fitted, Cow::Owned(_)));
    assert_eq!(fitted.dimensions(), (2048, 512));
    assert_eq!(fitted.get_pixel(1000, 200), &image::Rgba([10, 20, 30, 255]));
}

#[test]
fn should_keep_textures_within_the_limit_untouched() {
    let tall = image::RgbaImage::new(1, 2048);

    assert!(matches!(fit_to_limit(&tall, 2048), Cow::Borrowed(_)));
    assert_eq!(fit_to_limit(&tall, 1024).dimensions(), (1, 1024));
}
