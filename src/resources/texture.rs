use anyhow::Context as _;

use crate::resources::AssetSource;

/// Texture + sampler, bound once per texture handle.
pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

/// Decode any format the `image` crate understands into RGBA8.
pub fn decode_rgba(bytes: &[u8], name: &str) -> anyhow::Result<image::RgbaImage> {
    let img = image::load_from_memory(bytes)
        .with_context(|| format!("Could not decode image {}", name))?;
    Ok(img.to_rgba8())
}

pub async fn load_texture<A>(source: &A, path: &str) -> anyhow::Result<image::RgbaImage>
where
    A: AssetSource + ?Sized,
{
    let data = source.load_binary(path).await?;
    decode_rgba_async(data, path.to_string()).await
}

/// [`decode_rgba`] on the blocking pool on native, inline on the web.
pub async fn decode_rgba_async(data: Vec<u8>, name: String) -> anyhow::Result<image::RgbaImage> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::task::spawn_blocking(move || decode_rgba(&data, &name))
            .await
            .context("Image decoding task failed")?
    }
    #[cfg(target_arch = "wasm32")]
    {
        decode_rgba(&data, &name)
    }
}
