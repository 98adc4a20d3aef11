//! HDR environment maps.
//!
//! The environment is an equirectangular float texture used only for lighting
//! and reflections of the model; it is never drawn as a background. Radiance
//! `.hdr` files decode to 32-bit float RGB, which is uploaded as `Rgba32Float`.
//! That format is not filterable everywhere (WebGL2 in particular), so the map
//! is sampled with a non-filtering sampler.

use anyhow::Context as _;
use image::ImageFormat;

use crate::data_structures::texture::Texture;

/// How the renderer interprets an environment texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mapping {
    /// Longitude/latitude panorama sampled by reflection direction.
    #[default]
    EquirectangularReflection,
}

pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    pub texture: Texture,
    pub mapping: Mapping,
    pub bind_group: wgpu::BindGroup,
    pub size: [u32; 2],
}

impl EnvironmentMap {
    pub fn from_hdr_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> anyhow::Result<Self> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Hdr)
            .with_context(|| format!("{} is not a Radiance HDR image", label))?;
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        log::info!("decoded environment {} ({}x{})", label, width, height);
        Ok(Self::from_texels(device, queue, rgba.as_raw(), [width, height], label))
    }

    /// Neutral grey environment bound until the real one arrives.
    pub fn fallback(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_texels(device, queue, &[0.5, 0.5, 0.5, 1.0], [1, 1], "fallback environment")
    }

    fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[f32],
        size: [u32; 2],
        label: &str,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ENVIRONMENT_FORMAT,
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
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16 * size[0]),
                rows_per_image: Some(size[1]),
            },
            extent,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("environment sampler"),
            // Longitude wraps, latitude doesn't
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &environment_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("environment_bind_group"),
        });
        Self {
            texture: Texture {
                texture,
                view,
                sampler: Some(sampler),
            },
            mapping: Mapping::EquirectangularReflection,
            bind_group,
            size,
        }
    }
}

pub fn environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
        label: Some("environment_bind_group_layout"),
    })
}
