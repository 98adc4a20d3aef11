use crate::pipelines::basic::mk_render_pipeline;

/// Uniform block of the RGB shift shader, padded to 16 bytes for WebGL.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RgbShiftUniform {
    pub amount: f32,
    pub angle: f32,
    _padding: [f32; 2],
}

impl RgbShiftUniform {
    pub fn new(amount: f32, angle: f32) -> Self {
        Self {
            amount,
            angle,
            _padding: [0.0; 2],
        }
    }

    /// Texture-space offset of the red channel; blue is shifted the opposite way.
    pub fn offset(&self) -> [f32; 2] {
        [
            self.amount * self.angle.cos(),
            self.amount * self.angle.sin(),
        ]
    }
}

pub fn rgb_shift_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("rgb_shift_bind_group_layout"),
    })
}

/// Fullscreen pass: no vertex buffers, no depth, nothing culled.
pub fn mk_rgb_shift_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("RGB Shift Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("RGB Shift Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("rgb_shift.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        None,
        None,
        None,
        &[],
        shader,
    )
}
