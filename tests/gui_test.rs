use std::{cell::Cell, rc::Rc};

use flow_showcase::{
    camera::PerspectiveCamera,
    gui::{self, ControlPanel, FieldLens, MinMaxGuiHelper, Property, Slider},
};

use crate::common::test_utils::assert_close;

mod common;

#[derive(Default)]
struct Range {
    low: f32,
    high: f32,
}

const LOW: FieldLens<Range> = FieldLens::new(|r| r.low, |r, v| r.low = v);
const HIGH: FieldLens<Range> = FieldLens::new(|r| r.high, |r, v| r.high = v);

fn camera() -> PerspectiveCamera {
    PerspectiveCamera::new(45.0, 2.0, 0.1, 10.0)
}

#[test]
fn should_push_max_up_when_min_gets_too_close() {
    let helper = MinMaxGuiHelper::new(LOW, HIGH, 0.1);
    let mut range = Range {
        low: 1.0,
        high: 10.0,
    };

    helper.set_min(&mut range, 20.0);

    assert_close(range.low, 20.0);
    assert_close(range.high, 20.1);
}

#[test]
fn should_leave_max_alone_when_min_stays_below() {
    let helper = MinMaxGuiHelper::new(LOW, HIGH, 0.1);
    let mut range = Range {
        low: 1.0,
        high: 10.0,
    };

    helper.set_min(&mut range, 5.0);

    assert_eq!(range.low, 5.0);
    assert_eq!(range.high, 10.0);
}

#[test]
fn should_reapply_min_when_max_drops_below_it() {
    let helper = MinMaxGuiHelper::new(LOW, HIGH, 0.1);
    let mut range = Range {
        low: 5.0,
        high: 10.0,
    };

    helper.set_max(&mut range, 2.0);

    assert_close(range.low, 5.0);
    assert_close(range.high, 5.1);
    assert!(range.high - range.low >= helper.gap());
}

#[test]
fn should_expose_both_sides_as_properties() {
    let helper = MinMaxGuiHelper::new(LOW, HIGH, 1.0);
    let min = helper.min_property();
    let max = helper.max_property();
    let mut range = Range::default();

    max.set(&mut range, 4.0);
    min.set(&mut range, 3.5);

    assert_eq!(min.get(&range), 3.5);
    assert_eq!(max.get(&range), 4.5);
}

#[test]
fn should_clamp_and_step_slider_values() {
    let mut slider = Slider::new("low", LOW, 0.0, 10.0).step(0.5);
    let mut range = Range::default();

    assert_eq!(slider.set_value(&mut range, 3.3), 3.5);
    assert_eq!(slider.set_value(&mut range, 42.0), 10.0);
    assert_eq!(slider.set_value(&mut range, -3.0), 0.0);
    assert_eq!(range.low, 0.0);
}

#[test]
fn should_notify_once_per_write() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut slider =
        Slider::new("high", HIGH, 0.0, 1.0).on_change(move |_: &mut Range| {
            counter.set(counter.get() + 1)
        });
    let mut range = Range::default();

    slider.set_value(&mut range, 0.25);
    slider.set_value(&mut range, 0.26);

    assert_eq!(calls.get(), 2);
    assert_close(range.high, 0.26);
}

#[test]
fn should_recompute_projection_once_at_the_fov_boundary() {
    let mut panel = gui::camera_panel();
    let mut camera = camera();
    let version = camera.projection_version();

    let fov = panel.slider_mut("fov").unwrap().set_value(&mut camera, 180.0);

    assert_eq!(fov, 180.0);
    assert_eq!(camera.fov, 180.0);
    assert_eq!(camera.projection_version(), version + 1);
}

#[test]
fn should_keep_far_above_near_from_the_panel() {
    let mut panel = gui::camera_panel();
    let mut camera = camera();
    let version = camera.projection_version();

    panel.slider_mut("near").unwrap().set_value(&mut camera, 20.0);

    assert_close(camera.near, 20.0);
    assert_close(camera.far, 20.1);
    assert_eq!(camera.projection_version(), version + 1);

    panel.slider_mut("far").unwrap().set_value(&mut camera, 5.0);

    assert_close(camera.near, 20.0);
    assert_close(camera.far, 20.1);
    assert_eq!(camera.projection_version(), version + 2);
}

#[test]
fn should_keep_the_full_gap_for_every_near_step() {
    let mut panel = gui::camera_panel();
    let mut camera = camera();

    for step in 1..=500 {
        panel
            .slider_mut("near")
            .unwrap()
            .set_value(&mut camera, step as f32 * 0.1);
        assert!(camera.far - camera.near >= gui::NEAR_FAR_GAP);

        panel.slider_mut("far").unwrap().set_value(&mut camera, 0.1);
        assert!(
            camera.far - camera.near >= gui::NEAR_FAR_GAP,
            "near {} far {}",
            camera.near,
            camera.far
        );
    }
}

#[test]
fn should_leave_the_camera_alone_when_the_panel_is_only_shown() {
    let mut panel = gui::camera_panel();
    let mut camera = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);
    let version = camera.projection_version();
    let ctx = egui::Context::default();

    for _ in 0..2 {
        ctx.begin_pass(egui::RawInput::default());
        assert!(!panel.show(&ctx, &mut camera));
        let _ = ctx.end_pass();
    }

    assert_eq!(camera.fov, 45.0);
    assert_eq!(camera.near, 0.1);
    assert_eq!(camera.far, 1000.0);
    assert_eq!(camera.projection_version(), version);
}

#[test]
fn should_find_sliders_by_name() {
    let mut panel: ControlPanel<Range> = ControlPanel::new("Range");
    panel
        .add(Slider::new("low", LOW, 1.0, 0.0))
        .add(Slider::new("high", HIGH, 0.0, 1.0));

    let names: Vec<_> = panel.sliders().iter().map(Slider::name).collect();
    assert_eq!(names, ["low", "high"]);
    assert_eq!(panel.slider("low").unwrap().range(), (0.0, 1.0));
    assert!(panel.slider("far").is_none());
}
