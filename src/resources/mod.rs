//! Loading textures and models from external files.
//!
//! Everything here produces plain CPU-side data. Nothing touches the GPU or
//! the scene directly: results are spliced into the scene by the callbacks
//! registered on the [`queue::LoadQueue`].

use std::{
    collections::HashMap,
    future::Future,
    io::{BufReader, Cursor},
};

use anyhow::Context as _;

use crate::data_structures::{
    model::{Material, hex_to_rgb},
    scene_graph::{Node, Scene},
    texture::{ColorSpace, TextureAsset},
};

pub mod animation;
pub mod mesh;
pub mod queue;
pub mod texture;

/// Where asset bytes come from.
pub trait AssetSource {
    fn load_binary(&self, path: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>>;

    fn load_string(&self, path: &str) -> impl Future<Output = anyhow::Result<String>> {
        async move {
            let bytes = self.load_binary(path).await?;
            String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path))
        }
    }
}

/// Reads assets below a root directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FileSource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FileSource {
    async fn load_binary(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let full_path = self.root.join(path);
        tokio::fs::read(&full_path)
            .await
            .with_context(|| format!("Could not read {}", full_path.display()))
    }

    async fn load_string(&self, path: &str) -> anyhow::Result<String> {
        let full_path = self.root.join(path);
        tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("Could not read {}", full_path.display()))
    }
}

/// Fetches assets relative to a base URL.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct HttpSource {
    base: reqwest::Url,
}

#[cfg(target_arch = "wasm32")]
impl HttpSource {
    /// Resolve `asset_root` against the page origin.
    pub fn from_location(asset_root: &str) -> anyhow::Result<Self> {
        let window = web_sys::window().context("No window available")?;
        let origin = window
            .location()
            .origin()
            .map_err(|_| anyhow::anyhow!("Could not read the page origin"))?;
        let base = reqwest::Url::parse(&format!("{}/", origin))?
            .join(&format!("{}/", asset_root.trim_matches('/')))?;
        Ok(Self { base })
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetSource for HttpSource {
    async fn load_binary(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.base.join(path)?;
        let response = reqwest::get(url.clone())
            .await
            .with_context(|| format!("Could not fetch {}", url))?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn load_string(&self, path: &str) -> anyhow::Result<String> {
        let url = self.base.join(path)?;
        let response = reqwest::get(url.clone())
            .await
            .with_context(|| format!("Could not fetch {}", url))?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// The asset source of the current platform.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSource = FileSource;
#[cfg(target_arch = "wasm32")]
pub type PlatformSource = HttpSource;

/// A material from an MTL file with its diffuse map already fetched.
#[derive(Clone, Debug)]
pub struct ObjMaterial {
    pub name: String,
    pub color: [f32; 3],
    pub shininess: f32,
    pub map: Option<LoadedMap>,
}

#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub path: String,
    /// `None` if the map could not be loaded.
    pub image: Option<image::RgbaImage>,
}

/// A parsed OBJ model, not yet part of any scene.
#[derive(Clone, Debug)]
pub struct ObjModel {
    pub name: String,
    pub meshes: Vec<(crate::data_structures::model::Geometry, Option<usize>)>,
    pub materials: Vec<ObjMaterial>,
}

impl ObjModel {
    /// Register the model's textures with `scene` and build a group node with
    /// one mesh child per OBJ object.
    pub fn into_node(self, scene: &mut Scene) -> Node {
        let materials: Vec<Material> = self
            .materials
            .into_iter()
            .map(|m| {
                let mut material = Material::phong(0xffffff);
                material.name = m.name;
                material.color = m.color;
                material.shininess = m.shininess;
                if let Some(map) = m.map {
                    let mut texture = TextureAsset::placeholder(map.path);
                    texture.update_settings(|s| s.color_space = ColorSpace::Srgb);
                    if let Some(image) = map.image {
                        texture.set_image(image);
                    }
                    material.map = Some(scene.add_texture(texture));
                }
                material
            })
            .collect();

        self.meshes
            .into_iter()
            .fold(Node::group(self.name), |group, (geometry, material_id)| {
                let material = material_id
                    .and_then(|id| materials.get(id).cloned())
                    .unwrap_or_default();
                group.with_child(Node::mesh(geometry.name.clone(), geometry, material))
            })
    }
}

/// Directory part of `path` including the trailing slash, used to resolve
/// paths referenced from inside MTL files.
fn base_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..=idx])
}

/// Load an OBJ model together with its MTL material library.
///
/// The material library and every diffuse map it references are loaded
/// before the geometry is requested. Missing maps are logged and left empty.
pub async fn load_obj_model<A>(
    source: &A,
    material_path: &str,
    geometry_path: &str,
) -> anyhow::Result<ObjModel>
where
    A: AssetSource + ?Sized,
{
    let mtl_text = source
        .load_string(material_path)
        .await
        .with_context(|| format!("Material library {} not found", material_path))?;
    let (mtl_materials, _) = tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(&mtl_text)))
        .with_context(|| format!("Could not parse {}", material_path))?;

    let mut preloaded: HashMap<String, ObjMaterial> = HashMap::new();
    for m in mtl_materials {
        let map = match &m.diffuse_texture {
            Some(map_path) => {
                let path = format!("{}{}", base_dir(material_path), map_path);
                let image = match texture::load_texture(source, &path).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::error!("Diffuse map {} of {} failed to load: {:#}", path, m.name, e);
                        None
                    }
                };
                Some(LoadedMap { path, image })
            }
            None => None,
        };
        let material = ObjMaterial {
            name: m.name.clone(),
            color: m.diffuse.unwrap_or(hex_to_rgb(0xffffff)),
            shininess: m.shininess.unwrap_or(30.0),
            map,
        };
        preloaded.insert(m.name, material);
    }

    let obj_text = source
        .load_string(geometry_path)
        .await
        .with_context(|| format!("Model {} not found", geometry_path))?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        // the material library has been parsed already
        |_| {
            let mtl_text = mtl_text.clone();
            async move { tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_text))) }
        },
    )
    .await
    .with_context(|| format!("Could not parse {}", geometry_path))?;

    // OBJ material ids index the libraries referenced by the OBJ file
    let names: Vec<String> = match obj_materials {
        Ok(materials) => materials.into_iter().map(|m| m.name).collect(),
        Err(e) => {
            log::warn!("{} references no usable material library: {}", geometry_path, e);
            Vec::new()
        }
    };
    let mut materials = Vec::new();
    let mut material_index: HashMap<String, usize> = HashMap::new();
    let meshes = models
        .iter()
        .map(|model| {
            let material = model
                .mesh
                .material_id
                .and_then(|id| names.get(id))
                .and_then(|name| match material_index.get(name) {
                    Some(idx) => Some(*idx),
                    None => {
                        let material = preloaded.get(name)?.clone();
                        materials.push(material);
                        material_index.insert(name.clone(), materials.len() - 1);
                        Some(materials.len() - 1)
                    }
                });
            (mesh::to_geometry(model), material)
        })
        .collect();

    log::info!(
        "Loaded {} with {} meshes and {} materials",
        geometry_path,
        models.len(),
        materials.len()
    );
    Ok(ObjModel {
        name: geometry_path.to_string(),
        meshes,
        materials,
    })
}
