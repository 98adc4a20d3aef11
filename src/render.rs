//! Post-processing composition.
//!
//! A [`Composer`] owns an ordered list of [`Pass`]es. Each pass reads the
//! output of the previous one and writes either into one of two ping-pong
//! offscreen targets or, for the last pass, straight into the surface. The
//! order is fixed at startup: the scene pass first, then the RGB shift.
//!
//! Sizes are tracked without touching the GPU. [`Composer::set_size`] only
//! records the new size and marks the targets stale; they are recreated on the
//! next [`Composer::render`].

use crate::{
    camera::Projection,
    data_structures::{environment::EnvironmentMap, scene_graph::Scene, texture::Texture},
    pipelines::{
        basic::mk_scene_pipeline,
        rgb_shift::{RgbShiftUniform, mk_rgb_shift_pipeline, rgb_shift_layout},
    },
};
use wgpu::util::DeviceExt;

/// Everything a pass may touch while recording one frame.
pub struct PassContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub scene: &'a Scene,
    pub camera_bind_group: &'a wgpu::BindGroup,
    /// The scene environment, or the fallback until one is installed.
    pub environment: &'a EnvironmentMap,
    pub clear_colour: wgpu::Color,
}

pub trait Pass {
    fn name(&self) -> &str;

    /// Called for every viewport change, before the next `draw`.
    fn set_size(&mut self, width: u32, height: u32);

    /// Record the pass. `input` is the previous pass's target, `None` for the first pass.
    fn draw(&mut self, frame: &mut PassContext<'_>, input: Option<&Texture>, output: &wgpu::TextureView);
}

pub struct Composer {
    passes: Vec<Box<dyn Pass>>,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    targets: Option<[Texture; 2]>,
    stale: bool,
}

impl Composer {
    pub fn new(format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        Self {
            passes: Vec::new(),
            width,
            height,
            format,
            targets: None,
            stale: true,
        }
    }

    pub fn add_pass(&mut self, mut pass: Box<dyn Pass>) {
        pass.set_size(self.width, self.height);
        log::debug!("composer pass #{}: {}", self.passes.len(), pass.name());
        self.passes.push(pass);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.stale = true;
        for pass in self.passes.iter_mut() {
            pass.set_size(width, height);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the offscreen targets will be recreated before the next render.
    pub fn targets_stale(&self) -> bool {
        self.stale || self.targets.is_none()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order; the last one draws into `surface`.
    pub fn render(&mut self, frame: &mut PassContext<'_>, surface: &wgpu::TextureView) {
        let Self {
            passes,
            width,
            height,
            format,
            targets,
            stale,
        } = self;

        if passes.len() > 1 && (*stale || targets.is_none()) {
            let size = [*width, *height];
            *targets = Some([
                Texture::create_render_target(frame.device, size, *format, "composer target a"),
                Texture::create_render_target(frame.device, size, *format, "composer target b"),
            ]);
            *stale = false;
        }

        let last = passes.len().saturating_sub(1);
        for (i, pass) in passes.iter_mut().enumerate() {
            let input = match (i, targets.as_ref()) {
                (0, _) | (_, None) => None,
                (_, Some(targets)) => Some(&targets[(i - 1) % 2]),
            };
            let output = match targets.as_ref() {
                Some(targets) if i != last => &targets[i % 2].view,
                _ => surface,
            };
            pass.draw(frame, input, output);
        }
    }
}

/// Apply a new viewport size to the projection and the composer together.
///
/// Zero-sized viewports (minimised windows) are ignored. Returns whether
/// anything changed.
pub fn resize_viewport(projection: &mut Projection, composer: &mut Composer, width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        log::debug!("ignoring zero-sized viewport {}x{}", width, height);
        return false;
    }
    projection.resize(width, height);
    composer.set_size(width, height);
    true
}

/// Clears and draws the scene graph with the lit scene pipeline.
pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    depth: Option<Texture>,
    size: [u32; 2],
}

impl ScenePass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            pipeline: mk_scene_pipeline(device, format),
            depth: None,
            size: [1, 1],
        }
    }
}

impl Pass for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = [width, height];
        self.depth = None;
    }

    fn draw(&mut self, frame: &mut PassContext<'_>, _input: Option<&Texture>, output: &wgpu::TextureView) {
        let depth = self
            .depth
            .get_or_insert_with(|| Texture::create_depth_texture(frame.device, self.size, "depth_texture"));

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        for node in frame.scene.children() {
            node.draw(
                frame.camera_bind_group,
                &frame.environment.bind_group,
                &mut render_pass,
            );
        }
    }
}

/// Fullscreen chromatic offset: red and blue sampled on opposite sides of
/// each pixel along `angle`.
pub struct RgbShiftPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    buffer: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
}

impl RgbShiftPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, amount: f32, angle: f32) -> Self {
        let layout = rgb_shift_layout(device);
        let pipeline = mk_rgb_shift_pipeline(device, &layout, format);
        let uniform = RgbShiftUniform::new(amount, angle);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("RGB Shift Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("rgb shift sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            pipeline,
            layout,
            sampler,
            buffer,
            bind_group: None,
        }
    }
}

impl Pass for RgbShiftPass {
    fn name(&self) -> &str {
        "rgb shift"
    }

    fn set_size(&mut self, _width: u32, _height: u32) {
        // The input target is about to be recreated
        self.bind_group = None;
    }

    fn draw(&mut self, frame: &mut PassContext<'_>, input: Option<&Texture>, output: &wgpu::TextureView) {
        let Some(input) = input else {
            log::warn!("rgb shift pass has no input, skipping");
            return;
        };
        let bind_group = self.bind_group.get_or_insert_with(|| {
            frame.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&input.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: self.buffer.as_entire_binding(),
                    },
                ],
                label: Some("rgb_shift_bind_group"),
            })
        });

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("RGB Shift Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &*bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
