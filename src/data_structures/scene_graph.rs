//! Scene graph and hierarchical scene organization.
//!
//! [`Scene`] is the root container: an optional environment, a list of child
//! nodes and the boot [`Stage`] it has reached. It is generic over the
//! environment and node types so that loading and input code can be exercised
//! without a GPU; the renderer uses `Scene<EnvironmentMap, Node>`.
//!
//! [`Node`] is one glTF node: a local [`Transform`], an optional mesh and its
//! children. World matrices are pushed into a per-node vertex buffer every frame.
//! A loaded asset always hangs below an identity container built by
//! [`wrap_roots`], so the container can be rotated as a whole while every
//! authored node keeps its own transform.

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    environment::EnvironmentMap,
    model::{DrawModel, Model, Vertex},
    transform::{Transform, TransformRaw},
};

/// Progress of the startup sequence.
///
/// `Booting → EnvironmentLoading → ModelLoading → Ready`. A failed environment
/// load never leaves `EnvironmentLoading`; a failed model load still reaches
/// `Ready`, just without a model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Booting,
    EnvironmentLoading,
    ModelLoading,
    Ready,
}

/// Receiver of boot results.
///
/// Implemented by [`Scene`] itself and by anything that forwards results to the
/// owner of the scene (the event loop proxy in the app).
pub trait SceneSink<E, N> {
    fn install_environment(&mut self, environment: E);

    fn attach_model(&mut self, model: N);

    fn enter(&mut self, _stage: Stage) {}
}

#[derive(Debug)]
pub struct Scene<E = EnvironmentMap, N = Node> {
    environment: Option<E>,
    children: Vec<N>,
    model: Option<usize>,
    stage: Stage,
}

impl<E, N> Default for Scene<E, N> {
    fn default() -> Self {
        Self {
            environment: None,
            children: Vec::new(),
            model: None,
            stage: Stage::Booting,
        }
    }
}

impl<E, N> Scene<E, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> Option<&E> {
        self.environment.as_ref()
    }

    /// Install the environment. Later calls are ignored, the first one sticks.
    pub fn set_environment(&mut self, environment: E) {
        if self.environment.is_some() {
            log::warn!("environment already installed, ignoring replacement");
            return;
        }
        self.environment = Some(environment);
    }

    pub fn add(&mut self, child: N) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[N] {
        &self.children
    }

    pub fn model(&self) -> Option<&N> {
        self.model.and_then(|idx| self.children.get(idx))
    }

    pub fn model_mut(&mut self) -> Option<&mut N> {
        self.model.and_then(|idx| self.children.get_mut(idx))
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

impl<E, N> SceneSink<E, N> for Scene<E, N> {
    fn install_environment(&mut self, environment: E) {
        self.set_environment(environment);
    }

    fn attach_model(&mut self, model: N) {
        if self.model.is_some() {
            log::warn!("model already attached, ignoring second model");
            return;
        }
        let idx = self.add(model);
        self.model = Some(idx);
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("scene stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}

/// A transform tree node that can own further nodes.
pub trait Hierarchy: Sized {
    fn transform_mut(&mut self) -> &mut Transform;

    fn children(&self) -> &[Self];

    fn add_child(&mut self, child: Self);
}

/// Hang `roots` below `container`, whose transform is reset to identity.
///
/// Even a single root is wrapped: the container is what gets animated, the
/// roots keep their authored transforms.
pub fn wrap_roots<N: Hierarchy>(roots: impl IntoIterator<Item = N>, mut container: N) -> N {
    *container.transform_mut() = Transform::new();
    for root in roots {
        container.add_child(root);
    }
    container
}

pub struct Node {
    pub name: String,
    pub transform: Transform,
    model: Option<Model>,
    instance_buffer: wgpu::Buffer,
    children: Vec<Node>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("meshes", &self.model.as_ref().map_or(0, |m| m.meshes.len()))
            .field("children", &self.children)
            .finish()
    }
}

impl Node {
    pub fn new(device: &wgpu::Device, name: &str, model: Option<Model>) -> Self {
        let raw = TransformRaw::from_world(Matrix4::identity());
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", name)),
            contents: bytemuck::cast_slice(&[raw]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            model,
            instance_buffer,
            children: Vec::new(),
        }
    }

    /// Recompute world matrices below `parent` and upload them.
    pub fn write_world_transforms(&self, queue: &wgpu::Queue, parent: Matrix4<f32>) {
        let world = parent * self.transform.to_matrix();
        if self.model.is_some() {
            let raw = TransformRaw::from_world(world);
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
        }
        for child in &self.children {
            child.write_world_transforms(queue, world);
        }
    }

    pub fn draw(
        &self,
        camera_bind_group: &wgpu::BindGroup,
        environment_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        if let Some(model) = &self.model {
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.draw_model_instanced(model, 0..1, camera_bind_group, environment_bind_group);
        }
        for child in &self.children {
            child.draw(camera_bind_group, environment_bind_group, render_pass);
        }
    }

    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        TransformRaw::desc()
    }
}

impl Hierarchy for Node {
    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn children(&self) -> &[Node] {
        &self.children
    }

    fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }
}
