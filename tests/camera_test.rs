use cgmath::{InnerSpace, Point3, SquareMatrix};
use flow_showcase::camera::{CameraUniform, OrbitControls, PerspectiveCamera};

use crate::common::test_utils::assert_close;

mod common;

const VIEWPORT: f32 = 600.0;

fn orbiting() -> (PerspectiveCamera, OrbitControls) {
    let mut camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);
    camera.position = Point3::new(0.0, 10.0, 20.0);
    let controls = OrbitControls::new(&camera, Point3::new(0.0, 5.0, 0.0));
    (camera, controls)
}

#[test]
fn should_keep_the_camera_in_place_without_input() {
    let (mut camera, mut controls) = orbiting();

    controls.update(&mut camera, VIEWPORT);

    assert_close(camera.position.x, 0.0);
    assert_close(camera.position.y, 10.0);
    assert_close(camera.position.z, 20.0);
    assert_eq!(camera.target, Point3::new(0.0, 5.0, 0.0));
}

#[test]
fn should_rotate_around_the_target() {
    let (mut camera, mut controls) = orbiting();
    let distance = controls.distance();

    // a quarter of the viewport height turns a quarter circle
    controls.rotate(VIEWPORT / 4.0, 0.0);
    controls.update(&mut camera, VIEWPORT);

    assert_close(camera.position.x, -20.0);
    assert_close(camera.position.y, 10.0);
    assert_close(camera.position.z, 0.0);
    assert_close((camera.position - camera.target).magnitude(), distance);
}

#[test]
fn should_stop_just_short_of_the_pole() {
    let (mut camera, mut controls) = orbiting();
    let distance = controls.distance();

    controls.rotate(0.0, VIEWPORT * 10.0);
    controls.update(&mut camera, VIEWPORT);

    let offset = camera.position - camera.target;
    assert!(offset.x.is_finite() && offset.z.is_finite());
    assert!(offset.y > distance * 0.999);
    assert!(camera.view_matrix().is_invertible());
}

#[test]
fn should_dolly_towards_and_away_from_the_target() {
    let (mut camera, mut controls) = orbiting();
    let distance = controls.distance();

    controls.dolly(1.0);
    controls.update(&mut camera, VIEWPORT);
    assert_close(controls.distance(), distance * 0.95);

    controls.dolly(-1.0);
    controls.update(&mut camera, VIEWPORT);
    assert_close(controls.distance(), distance);
}

#[test]
fn should_clamp_the_distance() {
    let (mut camera, mut controls) = orbiting();
    controls.min_distance = 10.0;
    controls.max_distance = 25.0;

    controls.dolly(-100.0);
    controls.update(&mut camera, VIEWPORT);
    assert_close(controls.distance(), 25.0);

    controls.dolly(100.0);
    controls.update(&mut camera, VIEWPORT);
    assert_close(controls.distance(), 10.0);
}

#[test]
fn should_pan_the_target_with_the_camera() {
    let (mut camera, mut controls) = orbiting();
    let distance = controls.distance();

    controls.pan(100.0, 0.0);
    controls.update(&mut camera, VIEWPORT);

    assert!(controls.target.x < 0.0);
    assert_close(controls.target.y, 5.0);
    assert_close(controls.target.z, 0.0);
    assert_eq!(camera.target, controls.target);
    assert_close((camera.position - camera.target).magnitude(), distance);
}

#[test]
fn should_only_change_the_projection_when_asked() {
    let mut camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);
    let version = camera.projection_version();
    let before = camera.projection_matrix();

    camera.fov = 90.0;
    assert_eq!(camera.projection_matrix(), before);

    camera.update_projection_matrix();
    assert_eq!(camera.projection_version(), version + 1);
    assert_ne!(camera.projection_matrix(), before);
}

#[test]
fn should_keep_the_previous_projection_when_degenerate() {
    let mut camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);
    let before = camera.projection_matrix();
    let version = camera.projection_version();

    camera.near = 20.0;
    camera.far = 20.0;
    camera.update_projection_matrix();

    assert_eq!(camera.projection_matrix(), before);
    assert_eq!(camera.projection_version(), version + 1);
}

#[test]
fn should_project_a_straight_angle_fov() {
    let mut camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);

    camera.fov = 180.0;
    camera.update_projection_matrix();

    let projection = camera.projection_matrix();
    assert!(projection.x.x.is_finite() && projection.y.y.is_finite());
    assert!(projection.y.y > 0.0);
}

#[test]
fn should_pan_a_straight_angle_fov_like_the_projection() {
    let pan_with_fov = |fov| {
        let (mut camera, mut controls) = orbiting();
        camera.fov = fov;
        camera.update_projection_matrix();
        controls.pan(100.0, 0.0);
        controls.update(&mut camera, VIEWPORT);
        controls.target
    };

    let straight = pan_with_fov(180.0);
    let widest = pan_with_fov(179.9);

    assert!(straight.x.is_finite() && straight.y.is_finite() && straight.z.is_finite());
    assert!(straight.x < 0.0);
    assert_eq!(straight, widest);
}

#[test]
fn should_invert_the_rotation_for_the_background() {
    let mut camera = PerspectiveCamera::new(90.0, 1.0, 0.1, 1000.0);
    camera.position = Point3::new(3.0, 4.0, 5.0);
    camera.look_at(Point3::new(3.0, 4.0, 4.0));
    let mut uniform = CameraUniform::new();

    uniform.update_view_proj(&camera);

    // raw layout: view position, view projection, inverse
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniform));
    assert_eq!(&floats[..4], &[3.0, 4.0, 5.0, 1.0]);
    let inverse: [[f32; 4]; 4] = [
        floats[20..24].try_into().unwrap(),
        floats[24..28].try_into().unwrap(),
        floats[28..32].try_into().unwrap(),
        floats[32..36].try_into().unwrap(),
    ];
    let inverse = cgmath::Matrix4::from(inverse);
    let centre = inverse * cgmath::Vector4::new(0.0, 0.0, 1.0, 1.0);
    let direction = (centre.truncate() / centre.w).normalize();
    assert_close(direction.x, 0.0);
    assert_close(direction.y, 0.0);
    assert_close(direction.z, -1.0);
}
