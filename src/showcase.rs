//! The showcase scene and everything that mutates it.
//!
//! [`Showcase`] is the single context object shared by the frame loop and the
//! asset load callbacks: scene graph, camera, orbit controls, the animation
//! mixer and the camera panel. It holds no GPU state, so it can be assembled
//! and driven in tests without a window.

use std::{f32::consts::PI, rc::Rc};

use cgmath::Point3;
use log::{error, info, warn};
use winit::event::WindowEvent;

use crate::{
    camera::{OrbitControls, PerspectiveCamera},
    config::ShowcaseConfig,
    data_structures::{
        instance::Instance,
        model::{Material, Side, hex_to_rgb},
        primitives,
        scene_graph::{Light, Node, NodeId, Scene},
        texture::{ColorSpace, Filter, Mapping, TextureAsset, TextureHandle, Wrapping},
    },
    gui::{self, ControlPanel},
    resources::{
        AssetSource,
        animation::{AnimationClip, AnimationMixer, KeyframeTrack},
        load_obj_model,
        queue::LoadQueue,
        texture::load_texture,
    },
};

/// Texture table entries created during assembly.
#[derive(Clone, Copy, Debug)]
pub struct SceneTextures {
    pub background: TextureHandle,
    pub road: TextureHandle,
    pub cube: TextureHandle,
}

/// Nodes created during assembly.
#[derive(Clone, Copy, Debug)]
pub struct SceneNodes {
    pub plane: NodeId,
    pub cube: NodeId,
    pub sphere: NodeId,
    pub cylinder: NodeId,
}

pub struct Showcase {
    pub config: ShowcaseConfig,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub mixer: Option<AnimationMixer>,
    pub panel: ControlPanel<PerspectiveCamera>,
    pub textures: SceneTextures,
    pub nodes: SceneNodes,
    model: Option<NodeId>,
    failed_loads: Vec<String>,
}

impl Showcase {
    /// Build the static scene and issue the background, road, cube and model loads.
    pub fn assemble<A>(config: ShowcaseConfig, source: Rc<A>, loads: &LoadQueue<Showcase>) -> Self
    where
        A: AssetSource + 'static,
    {
        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, cam.aspect, cam.near, cam.far);
        camera.position = cam.position.into();
        let mut controls = OrbitControls::new(&camera, Point3::from(cam.orbit_target));
        controls.update(&mut camera, 1.0);

        let mut scene = Scene::new();

        // filled in by the background callback, not shown until then
        let background = scene.add_texture(TextureAsset::placeholder(&config.assets.background));

        let road = scene.add_texture(TextureAsset::placeholder(&config.assets.road));
        let repeats = config.road_repeats();
        if let Some(texture) = scene.texture_mut(road) {
            texture.update_settings(|s| {
                s.wrap_s = Wrapping::Repeat;
                s.wrap_t = Wrapping::Repeat;
                s.mag_filter = Filter::Nearest;
                s.repeat = [repeats, repeats];
            });
        }
        let plane = scene.add(
            Node::mesh(
                "plane",
                primitives::create_plane(config.plane_size, config.plane_size),
                Material::phong(0xffffff)
                    .with_map(road)
                    .with_side(Side::Double),
            )
            .transformed(Instance::new().with_euler(-PI * 0.5, 0.0, 0.0)),
        );

        scene.add(Node::light(
            "ambient",
            Light::Ambient {
                color: hex_to_rgb(0x404040),
                intensity: 1.0,
            },
        ));
        scene.add(
            Node::light(
                "directional",
                Light::Directional {
                    color: hex_to_rgb(0xffffff),
                    intensity: 1.0,
                },
            )
            .at(5.0, 10.0, 7.5),
        );
        scene.add(
            Node::light(
                "point",
                Light::Point {
                    color: hex_to_rgb(0xff0000),
                    intensity: 1.0,
                    distance: 100.0,
                },
            )
            .at(50.0, 50.0, 50.0),
        );

        let cube_texture = scene.add_texture(TextureAsset::placeholder(&config.assets.cube));
        if let Some(texture) = scene.texture_mut(cube_texture) {
            texture.update_settings(|s| s.color_space = ColorSpace::Srgb);
        }
        let cube = scene.add(
            Node::mesh(
                "cube",
                primitives::create_box(1.0, 1.0, 1.0),
                Material::basic(0xffffff).with_map(cube_texture),
            )
            .at(-5.0, 2.0, -5.0),
        );
        let sphere = scene.add(
            Node::mesh(
                "sphere",
                primitives::create_sphere(0.5, 16, 16),
                Material::basic(0x78ff44),
            )
            .at(0.0, 0.5, -5.0),
        );
        let cylinder = scene.add(
            Node::mesh(
                "cylinder",
                primitives::create_cylinder(0.5, 0.5, 2.0, 32),
                Material::phong(0x3498db),
            )
            .at(5.0, 1.0, -5.0),
        );
        scene.update_world_transforms();

        let mut mixer = AnimationMixer::new(cube);
        match rotate_clip() {
            Ok(clip) => {
                mixer.clip_action(clip).play();
            }
            Err(e) => error!("The rotate clip is invalid: {:#}", e),
        }

        let showcase = Self {
            config,
            scene,
            camera,
            controls,
            mixer: Some(mixer),
            panel: gui::camera_panel(),
            textures: SceneTextures {
                background,
                road,
                cube: cube_texture,
            },
            nodes: SceneNodes {
                plane,
                cube,
                sphere,
                cylinder,
            },
            model: None,
            failed_loads: Vec::new(),
        };
        showcase.issue_loads(source, loads);
        info!("Scene assembled with {} nodes", showcase.scene.len());
        showcase
    }

    fn issue_loads<A>(&self, source: Rc<A>, loads: &LoadQueue<Showcase>)
    where
        A: AssetSource + 'static,
    {
        let assets = &self.config.assets;

        let path = assets.background.clone();
        let handle = self.textures.background;
        let src = Rc::clone(&source);
        loads.load(
            async move { load_texture(&*src, &path).await },
            move |showcase: &mut Showcase, image| showcase.on_background_loaded(handle, image),
            move |showcase: &mut Showcase, e| showcase.on_texture_failed(handle, e),
        );

        for handle in [self.textures.road, self.textures.cube] {
            let path = match self.scene.texture(handle) {
                Some(texture) => texture.path.clone(),
                None => continue,
            };
            let src = Rc::clone(&source);
            loads.load(
                async move { load_texture(&*src, &path).await },
                move |showcase: &mut Showcase, image| showcase.on_texture_loaded(handle, image),
                move |showcase: &mut Showcase, e| showcase.on_texture_failed(handle, e),
            );
        }

        let materials = assets.model_materials.clone();
        let geometry = assets.model_geometry.clone();
        loads.load(
            async move { load_obj_model(&*source, &materials, &geometry).await },
            |showcase: &mut Showcase, model| {
                let node = model.into_node(&mut showcase.scene);
                showcase.attach_model(node);
            },
            |showcase: &mut Showcase, e| {
                error!("Model failed to load: {:#}", e);
                showcase.failed_loads.push(format!("{:#}", e));
            },
        );
    }

    fn on_background_loaded(&mut self, handle: TextureHandle, image: image::RgbaImage) {
        let Some(texture) = self.scene.texture_mut(handle) else {
            return;
        };
        texture.set_image(image);
        texture.update_settings(|s| {
            s.mapping = Mapping::EquirectangularReflection;
            s.color_space = ColorSpace::Srgb;
        });
        info!("Background {} loaded", texture.path);
        self.scene.set_background(Some(handle));
    }

    fn on_texture_loaded(&mut self, handle: TextureHandle, image: image::RgbaImage) {
        if let Some(texture) = self.scene.texture_mut(handle) {
            texture.set_image(image);
            info!("Texture {} loaded", texture.path);
        }
    }

    fn on_texture_failed(&mut self, handle: TextureHandle, e: anyhow::Error) {
        let path = self
            .scene
            .texture(handle)
            .map_or_else(|| format!("{:?}", handle), |t| t.path.clone());
        error!("Texture {} failed to load, keeping the placeholder: {:#}", path, e);
        self.failed_loads.push(path);
    }

    /// Attach the loaded model under the root. Only the first model is attached.
    pub fn attach_model(&mut self, node: Node) -> Option<NodeId> {
        if self.model.is_some() {
            warn!("Model {} is already attached, ignoring", node.name);
            return None;
        }
        let [x, y, z] = self.config.model_offset;
        let id = self.scene.add(node.at(x, y, z));
        self.scene.update_world_transforms();
        info!("Model attached as {:?}", id);
        self.model = Some(id);
        Some(id)
    }

    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    /// Paths or errors of loads that failed so far.
    pub fn failed_loads(&self) -> &[String] {
        &self.failed_loads
    }

    /// Per-frame simulation: orbit controls, animation and world transforms.
    pub fn update(&mut self, dt: f32, viewport_height: f32) {
        self.controls.update(&mut self.camera, viewport_height);
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.update(dt, &mut self.scene);
        }
        self.scene.update_world_transforms();
    }

    /// Pointer input not taken by the panel goes to the orbit controls.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        self.controls.handle_window_event(event);
    }

    /// Lay out the camera panel for the current egui pass. Returns `true` if
    /// the camera changed.
    pub fn show_panel(&mut self, ctx: &egui::Context) -> bool {
        self.panel.show(ctx, &mut self.camera)
    }
}

/// A 3 second rotation of the cube: half a turn around the (1, 1, 0) axis and back.
pub fn rotate_clip() -> anyhow::Result<AnimationClip> {
    let track = KeyframeTrack::quaternion(
        vec![0.0, 1.0, 2.0],
        &[
            [0.0, 0.0, 0.0, 1.0],
            [0.707, 0.707, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    )?;
    Ok(AnimationClip::new("rotate", 3.0, vec![track]))
}
