//! Fixed parameters of the showcase scene.
//!
//! ```rust,ignore
//! use flow_showcase::config::ShowcaseConfig;
//!
//! let config = ShowcaseConfig {
//!     asset_root: "/srv/showcase".into(),
//!     ..Default::default()
//! };
//! ```

/// Initial camera placement and projection.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Point the orbit controls circle around.
    pub orbit_target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            // the canvas default before the first resize
            aspect: 2.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 10.0, 20.0],
            orbit_target: [0.0, 5.0, 0.0],
        }
    }
}

/// Asset paths, relative to [`ShowcaseConfig::asset_root`].
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPaths {
    pub background: String,
    pub road: String,
    pub cube: String,
    pub model_materials: String,
    pub model_geometry: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            background: "images/rural4k.png".into(),
            road: "images/road.png".into(),
            cube: "images/lava.jpg".into(),
            model_materials: "models/bus.mtl".into(),
            model_geometry: "models/bus.obj".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShowcaseConfig {
    /// Directory (native) or URL prefix (web) all asset paths are resolved against.
    pub asset_root: String,
    pub assets: AssetPaths,
    pub camera: CameraConfig,
    /// Edge length of the square ground plane.
    pub plane_size: f32,
    /// Where the loaded model is attached.
    pub model_offset: [f32; 3],
    /// Used whenever no background texture is set.
    pub clear_color: wgpu::Color,
    pub window_title: String,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".into(),
            assets: AssetPaths::default(),
            camera: CameraConfig::default(),
            plane_size: 40.0,
            model_offset: [0.0, 0.0, 5.0],
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            window_title: "flow showcase".into(),
        }
    }
}

impl ShowcaseConfig {
    pub const ASSET_ROOT_VAR: &'static str = "SHOWCASE_ASSETS";

    /// Defaults, with the asset root taken from `SHOWCASE_ASSETS` if set.
    ///
    /// Without the variable, native builds fall back to the copy bundled at
    /// build time when `assets/` is not present in the working directory.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut config = Self::default();
        #[cfg(not(target_arch = "wasm32"))]
        if let Ok(root) = std::env::var(Self::ASSET_ROOT_VAR) {
            log::info!("Using asset root {}", root);
            config.asset_root = root;
        } else if let Some(bundled) = option_env!("SHOWCASE_BUNDLED_ASSETS")
            && !std::path::Path::new(&config.asset_root).is_dir()
        {
            log::info!("Using bundled assets at {}", bundled);
            config.asset_root = bundled.into();
        }
        config
    }

    /// How often the road texture repeats across the plane.
    pub fn road_repeats(&self) -> f32 {
        self.plane_size / 2.0
    }
}
