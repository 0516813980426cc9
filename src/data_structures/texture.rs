//! Textures: the asset side ([`TextureAsset`]) and the GPU side ([`Texture`]).
//!
//! A texture asset starts out as an empty placeholder and is filled in place
//! once its image has been fetched and decoded. Every change bumps
//! [`TextureAsset::version`] so the renderer knows when to re-upload.

use std::borrow::Cow;

use anyhow::*;

/// Index into the scene's texture table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wrapping {
    #[default]
    ClampToEdge,
    Repeat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

/// How texture coordinates are derived when sampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mapping {
    /// Regular mesh UVs.
    #[default]
    Uv,
    /// Direction-based lookup of a panorama, used for backgrounds.
    EquirectangularReflection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Values are used as stored.
    #[default]
    Linear,
    /// Values are sRGB encoded and decoded on sampling.
    Srgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerSettings {
    pub wrap_s: Wrapping,
    pub wrap_t: Wrapping,
    pub mag_filter: Filter,
    pub repeat: [f32; 2],
    pub mapping: Mapping,
    pub color_space: ColorSpace,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            wrap_s: Wrapping::ClampToEdge,
            wrap_t: Wrapping::ClampToEdge,
            mag_filter: Filter::Linear,
            repeat: [1.0, 1.0],
            mapping: Mapping::Uv,
            color_space: ColorSpace::Linear,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextureAsset {
    pub path: String,
    /// `None` until the image has been decoded.
    pub image: Option<image::RgbaImage>,
    pub settings: SamplerSettings,
    version: u32,
}

impl TextureAsset {
    pub fn placeholder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image: None,
            settings: SamplerSettings::default(),
            version: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_image(&mut self, image: image::RgbaImage) {
        self.image = Some(image);
        self.version += 1;
    }

    pub fn update_settings(&mut self, mutation: impl FnOnce(&mut SamplerSettings)) {
        mutation(&mut self.settings);
        self.version += 1;
    }
}

impl From<Wrapping> for wgpu::AddressMode {
    fn from(wrapping: Wrapping) -> Self {
        match wrapping {
            Wrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            Wrapping::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

impl From<Filter> for wgpu::FilterMode {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => wgpu::FilterMode::Nearest,
            Filter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Upload an asset, or a 1x1 white stand-in while its image is missing.
    pub fn from_asset(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        asset: &TextureAsset,
    ) -> Result<Self> {
        let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let rgba = asset.image.as_ref().unwrap_or(&white);
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            bail!("Texture {} has no pixels", asset.path);
        }
        let max_side = device.limits().max_texture_dimension_2d;
        let rgba = fit_to_limit(rgba, max_side);
        if rgba.dimensions() != (width, height) {
            log::warn!(
                "Texture {} is {}x{}, scaled to {}x{} to fit the device limit of {}",
                asset.path,
                width,
                height,
                rgba.width(),
                rgba.height(),
                max_side
            );
        }
        let (width, height) = rgba.dimensions();

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let format = match asset.settings.color_space {
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&asset.path),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let settings = &asset.settings;
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: settings.wrap_s.into(),
            address_mode_v: settings.wrap_t.into(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: settings.mag_filter.into(),
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

/// Scale `image` down, keeping its aspect ratio, until neither side exceeds
/// `max_side`. Images that already fit are borrowed as they are.
pub fn fit_to_limit(image: &image::RgbaImage, max_side: u32) -> Cow<'_, image::RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return Cow::Borrowed(image);
    }
    let scale = |side: u32| ((side as u64 * max_side as u64) / longest as u64).max(1) as u32;
    Cow::Owned(image::imageops::resize(
        image,
        scale(width),
        scale(height),
        image::imageops::FilterType::Triangle,
    ))
}
