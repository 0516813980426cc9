use cgmath::{InnerSpace, Quaternion, Vector3};
use flow_showcase::{
    data_structures::{
        model::Material,
        primitives,
        scene_graph::{Node, NodeId, Scene},
    },
    resources::animation::{
        AnimationClip, AnimationMixer, KeyframeTrack, Keyframes, LoopMode, TrackValue,
    },
};

use crate::common::test_utils::assert_close;

mod common;

fn translation_track() -> KeyframeTrack {
    KeyframeTrack::new(
        vec![0.0, 1.0, 3.0],
        Keyframes::Translation(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(2.0, 4.0, 0.0),
        ]),
    )
    .unwrap()
}

fn scene_with_cube() -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let cube = scene.add(Node::mesh(
        "cube",
        primitives::create_box(1.0, 1.0, 1.0),
        Material::basic(0xffffff),
    ));
    (scene, cube)
}

#[test]
fn should_interpolate_between_keyframes() {
    let track = translation_track();

    assert_eq!(
        track.sample(0.5),
        TrackValue::Translation(Vector3::new(1.0, 0.0, 0.0))
    );
    assert_eq!(
        track.sample(2.0),
        TrackValue::Translation(Vector3::new(2.0, 2.0, 0.0))
    );
}

#[test]
fn should_hold_the_first_and_last_keyframe_outside_the_track() {
    let track = translation_track();

    assert_eq!(
        track.sample(-1.0),
        TrackValue::Translation(Vector3::new(0.0, 0.0, 0.0))
    );
    assert_eq!(
        track.sample(10.0),
        TrackValue::Translation(Vector3::new(2.0, 4.0, 0.0))
    );
    assert_eq!(track.end_time(), 3.0);
}

#[test]
fn should_slerp_rotations_to_unit_quaternions() {
    let track = KeyframeTrack::quaternion(
        vec![0.0, 1.0],
        &[[0.0, 0.0, 0.0, 1.0], [0.707, 0.707, 0.0, 0.0]],
    )
    .unwrap();

    let TrackValue::Rotation(start) = track.sample(0.0) else {
        panic!("expected a rotation");
    };
    assert_eq!(start, Quaternion::new(1.0, 0.0, 0.0, 0.0));

    let TrackValue::Rotation(end) = track.sample(1.0) else {
        panic!("expected a rotation");
    };
    assert_close(end.magnitude(), 1.0);
    assert_close(end.v.x, std::f32::consts::FRAC_1_SQRT_2);
    assert_close(end.s, 0.0);

    let TrackValue::Rotation(mid) = track.sample(0.5) else {
        panic!("expected a rotation");
    };
    assert_close(mid.magnitude(), 1.0);
    assert!(mid.s > 0.0 && mid.s < 1.0);
}

#[test]
fn should_reject_malformed_tracks() {
    assert!(KeyframeTrack::new(vec![], Keyframes::Scale(vec![])).is_err());
    assert!(
        KeyframeTrack::new(
            vec![0.0, 1.0],
            Keyframes::Scale(vec![Vector3::new(1.0, 1.0, 1.0)])
        )
        .is_err()
    );
    assert!(
        KeyframeTrack::new(
            vec![1.0, 0.0],
            Keyframes::Scale(vec![Vector3::new(1.0, 1.0, 1.0); 2])
        )
        .is_err()
    );
}

#[test]
fn should_derive_the_duration_from_the_tracks() {
    let clip = AnimationClip::new("move", -1.0, vec![translation_track()]);
    assert_eq!(clip.duration, 3.0);
}

#[test]
fn should_drive_the_target_node() {
    let (mut scene, cube) = scene_with_cube();
    let mut mixer = AnimationMixer::new(cube);
    mixer
        .clip_action(AnimationClip::new("move", 3.0, vec![translation_track()]))
        .play();

    mixer.update(0.5, &mut scene);

    assert_eq!(
        scene.node(cube).unwrap().local.position,
        Vector3::new(1.0, 0.0, 0.0)
    );
}

#[test]
fn should_wrap_repeating_clips() {
    let (mut scene, cube) = scene_with_cube();
    let mut mixer = AnimationMixer::new(cube);
    mixer
        .clip_action(AnimationClip::new("move", 3.0, vec![translation_track()]))
        .play();

    mixer.update(2.0, &mut scene);
    mixer.update(1.5, &mut scene);

    let action = mixer.action("move").unwrap();
    assert_close(action.time(), 0.5);
    assert!(action.is_playing());
    assert_eq!(
        scene.node(cube).unwrap().local.position,
        Vector3::new(1.0, 0.0, 0.0)
    );
}

#[test]
fn should_stop_once_clips_at_the_end() {
    let (mut scene, cube) = scene_with_cube();
    let mut mixer = AnimationMixer::new(cube);
    mixer
        .clip_action(AnimationClip::new("move", 3.0, vec![translation_track()]))
        .set_loop(LoopMode::Once)
        .play();

    mixer.update(5.0, &mut scene);

    assert!(!mixer.is_active());
    assert_eq!(mixer.action("move").unwrap().time(), 3.0);
    assert_eq!(
        scene.node(cube).unwrap().local.position,
        Vector3::new(2.0, 4.0, 0.0)
    );
}

#[test]
fn should_ignore_zero_deltas_and_stopped_actions() {
    let (mut scene, cube) = scene_with_cube();
    let mut mixer = AnimationMixer::new(cube);
    mixer.clip_action(AnimationClip::new("move", 3.0, vec![translation_track()]));

    mixer.update(1.0, &mut scene);
    assert_eq!(mixer.action("move").unwrap().time(), 0.0);

    mixer.clip_action(AnimationClip::new("move", 3.0, vec![])).play();
    mixer.update(0.0, &mut scene);
    assert_eq!(mixer.action("move").unwrap().time(), 0.0);
    assert_eq!(
        scene.node(cube).unwrap().local.position,
        Vector3::new(0.0, 0.0, 0.0)
    );
}

#[test]
fn should_reuse_the_action_of_a_known_clip() {
    let mut mixer = AnimationMixer::new(NodeId(1));
    mixer.clip_action(AnimationClip::new("move", 3.0, vec![translation_track()]));
    mixer.clip_action(AnimationClip::new("move", 1.0, vec![])).play();

    let action = mixer.action("move").unwrap();
    assert!(action.is_playing());
    assert_eq!(action.clip().duration, 3.0);
}
