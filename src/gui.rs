//! Property-bound sliders shown in an egui window.
//!
//! Sliders are bound to numeric fields of a target object through a
//! [`Property`]. Every write through a slider clamps and steps the value,
//! stores it and then fires the slider's change callback exactly once.
//! The widgets are drawn by egui; [`crate::pipelines::gui::GuiPass`] takes
//! care of input and of rendering the tessellated output.

use log::info;

use crate::camera::PerspectiveCamera;

/// A readable and writable numeric view into `T`.
pub trait Property<T> {
    fn get(&self, target: &T) -> f32;
    fn set(&self, target: &mut T, value: f32);
}

/// Direct access to one field.
pub struct FieldLens<T> {
    get: fn(&T) -> f32,
    set: fn(&mut T, f32),
}

impl<T> FieldLens<T> {
    pub const fn new(get: fn(&T) -> f32, set: fn(&mut T, f32)) -> Self {
        Self { get, set }
    }
}

impl<T> Clone for FieldLens<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldLens<T> {}

impl<T> Property<T> for FieldLens<T> {
    fn get(&self, target: &T) -> f32 {
        (self.get)(target)
    }

    fn set(&self, target: &mut T, value: f32) {
        (self.set)(target, value)
    }
}

/// Two fields of `T` that must stay at least `gap` apart, `min` below `max`.
pub struct MinMaxGuiHelper<T> {
    min: FieldLens<T>,
    max: FieldLens<T>,
    gap: f32,
}

impl<T> Clone for MinMaxGuiHelper<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MinMaxGuiHelper<T> {}

impl<T> MinMaxGuiHelper<T> {
    pub fn new(min: FieldLens<T>, max: FieldLens<T>, gap: f32) -> Self {
        Self { min, max, gap }
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn min(&self, target: &T) -> f32 {
        self.min.get(target)
    }

    pub fn max(&self, target: &T) -> f32 {
        self.max.get(target)
    }

    /// Writes `min`, raising `max` until it is at least `gap` above it.
    pub fn set_min(&self, target: &mut T, value: f32) {
        self.min.set(target, value);
        let min = self.min.get(target);
        let mut max = self.max.get(target).max(min + self.gap);
        // `min + gap` can round below the gap
        while max - min < self.gap {
            max = max.next_up();
        }
        self.max.set(target, max);
    }

    /// Writes `max`, then re-applies the current `min`.
    pub fn set_max(&self, target: &mut T, value: f32) {
        self.max.set(target, value);
        let min = self.min.get(target);
        self.set_min(target, min);
    }

    pub fn min_property(self) -> MinProperty<T> {
        MinProperty(self)
    }

    pub fn max_property(self) -> MaxProperty<T> {
        MaxProperty(self)
    }
}

/// The `min` side of a [`MinMaxGuiHelper`].
pub struct MinProperty<T>(MinMaxGuiHelper<T>);

impl<T> Property<T> for MinProperty<T> {
    fn get(&self, target: &T) -> f32 {
        self.0.min(target)
    }

    fn set(&self, target: &mut T, value: f32) {
        self.0.set_min(target, value)
    }
}

/// The `max` side of a [`MinMaxGuiHelper`].
pub struct MaxProperty<T>(MinMaxGuiHelper<T>);

impl<T> Property<T> for MaxProperty<T> {
    fn get(&self, target: &T) -> f32 {
        self.0.max(target)
    }

    fn set(&self, target: &mut T, value: f32) {
        self.0.set_max(target, value)
    }
}

/// A numeric slider bound to a [`Property`] of `T`.
pub struct Slider<T> {
    name: String,
    range: (f32, f32),
    step: Option<f32>,
    binding: Box<dyn Property<T>>,
    on_change: Option<Box<dyn FnMut(&mut T)>>,
}

impl<T> Slider<T> {
    pub fn new(
        name: impl Into<String>,
        binding: impl Property<T> + 'static,
        min: f32,
        max: f32,
    ) -> Self {
        Self {
            name: name.into(),
            range: (min.min(max), min.max(max)),
            step: None,
            binding: Box::new(binding),
            on_change: None,
        }
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = (step > 0.0).then_some(step);
        self
    }

    pub fn on_change(mut self, on_change: impl FnMut(&mut T) + 'static) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn value(&self, target: &T) -> f32 {
        self.binding.get(target)
    }

    /// Clamp, snap to the step grid, write and notify. Returns the stored value.
    pub fn set_value(&mut self, target: &mut T, value: f32) -> f32 {
        let value = snap(self.range, self.step, value);
        self.binding.set(target, value);
        self.notify(target);
        value
    }

    /// Draw the slider. Edits are written through the binding as egui reports
    /// them; the change callback fires once if the response changed.
    pub fn ui(&mut self, ui: &mut egui::Ui, target: &mut T) -> egui::Response {
        let (min, max) = self.range;
        let (range, step, binding) = (self.range, self.step, &self.binding);
        let mut widget = egui::Slider::from_get_set(min as f64..=max as f64, |value| {
            if let Some(value) = value {
                binding.set(target, snap(range, step, value as f32));
            }
            binding.get(target) as f64
        })
        .text(self.name.as_str())
        // values set outside the range, like the initial far plane, stay until edited
        .clamping(egui::SliderClamping::Edits);
        if let Some(step) = step {
            widget = widget.step_by(step as f64);
        }

        let response = ui.add(widget);
        if response.changed() {
            self.notify(target);
        }
        response
    }

    fn notify(&mut self, target: &mut T) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(target);
        }
        info!("{} = {}", self.name, self.binding.get(target));
    }
}

fn snap((min, max): (f32, f32), step: Option<f32>, value: f32) -> f32 {
    let value = value.clamp(min, max);
    match step {
        Some(step) => (min + ((value - min) / step).round() * step).clamp(min, max),
        None => value,
    }
}

/// A titled egui window holding sliders over one target.
pub struct ControlPanel<T> {
    title: String,
    sliders: Vec<Slider<T>>,
}

impl<T> ControlPanel<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sliders: Vec::new(),
        }
    }

    pub fn add(&mut self, slider: Slider<T>) -> &mut Self {
        self.sliders.push(slider);
        self
    }

    pub fn sliders(&self) -> &[Slider<T>] {
        &self.sliders
    }

    pub fn slider(&self, name: &str) -> Option<&Slider<T>> {
        self.sliders.iter().find(|slider| slider.name == name)
    }

    pub fn slider_mut(&mut self, name: &str) -> Option<&mut Slider<T>> {
        self.sliders.iter_mut().find(|slider| slider.name == name)
    }

    /// Lay the panel out for the current egui pass. Returns `true` if any
    /// slider changed `target`.
    pub fn show(&mut self, ctx: &egui::Context, target: &mut T) -> bool {
        let mut changed = false;
        egui::Window::new(self.title.as_str())
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                for slider in &mut self.sliders {
                    changed |= slider.ui(ui, target).changed();
                }
            });
        changed
    }
}

pub const FOV: FieldLens<PerspectiveCamera> =
    FieldLens::new(|camera| camera.fov, |camera, fov| camera.fov = fov);
pub const NEAR: FieldLens<PerspectiveCamera> =
    FieldLens::new(|camera| camera.near, |camera, near| camera.near = near);
pub const FAR: FieldLens<PerspectiveCamera> =
    FieldLens::new(|camera| camera.far, |camera, far| camera.far = far);

/// Minimum distance kept between the near and far planes.
pub const NEAR_FAR_GAP: f32 = 0.1;

/// fov, near and far sliders, each recomputing the projection on change.
pub fn camera_panel() -> ControlPanel<PerspectiveCamera> {
    let clip = MinMaxGuiHelper::new(NEAR, FAR, NEAR_FAR_GAP);
    let mut panel = ControlPanel::new("Camera");
    panel
        .add(
            Slider::new("fov", FOV, 1.0, 180.0)
                .step(1.0)
                .on_change(PerspectiveCamera::update_projection_matrix),
        )
        .add(
            Slider::new("near", clip.min_property(), 0.1, 50.0)
                .step(0.1)
                .on_change(PerspectiveCamera::update_projection_matrix),
        )
        .add(
            Slider::new("far", clip.max_property(), 0.1, 50.0)
                .step(0.1)
                .on_change(PerspectiveCamera::update_projection_matrix),
        );
    panel
}
