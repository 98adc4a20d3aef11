use wgpu::util::DeviceExt;

use crate::{
    boot::AssetLoader,
    data_structures::{
        environment::EnvironmentMap,
        model::{self, ModelVertex},
        scene_graph::{Hierarchy, Node, wrap_roots},
        texture::Texture,
        transform::Transform,
    },
    resources::texture::{diffuse_normal_layout, load_binary, load_texture, sibling_path},
};

/**
 * This module contains all logic for loading meshes/textures/environments from external files.
 */
pub mod mesh;
pub mod texture;

/// Loads assets straight into GPU resources.
///
/// Holds its own handles to the device and queue so the loading task can run
/// detached from the event loop.
#[derive(Clone, Debug)]
pub struct GpuLoader {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl AssetLoader for GpuLoader {
    type Environment = EnvironmentMap;
    type Model = Node;

    async fn load_environment(&self, url: &str) -> anyhow::Result<EnvironmentMap> {
        load_environment(url, &self.device, &self.queue).await
    }

    async fn load_model(&self, url: &str) -> anyhow::Result<Node> {
        load_model_gltf(url, &self.device, &self.queue).await
    }
}

pub async fn load_environment(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<EnvironmentMap> {
    let bytes = load_binary(file_name).await?;
    EnvironmentMap::from_hdr_bytes(device, queue, &bytes, file_name)
}

fn mime_extension(mime_type: &str) -> Option<&str> {
    mime_type.split('/').last()
}

fn to_srgb_byte(linear: f32) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let srgb = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (srgb * 255.0).round() as u8
}

async fn load_gltf_image(
    image: gltf::Image<'_>,
    file_name: &str,
    buffers: &[Vec<u8>],
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = buffers
                .get(view.buffer().index())
                .ok_or_else(|| anyhow::anyhow!("image refers to missing buffer {}", view.buffer().index()))?;
            let bytes = buffer
                .get(view.offset()..view.offset() + view.length())
                .ok_or_else(|| anyhow::anyhow!("image view out of bounds in {}", file_name))?;
            Texture::from_bytes(
                device,
                queue,
                bytes,
                file_name,
                mime_extension(mime_type),
                is_normal_map,
            )
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            if uri.starts_with("data:") {
                anyhow::bail!("embedded data URIs are not supported ({})", file_name);
            }
            load_texture(
                &sibling_path(file_name, uri),
                is_normal_map,
                device,
                queue,
                mime_type.and_then(mime_extension),
            )
            .await
        }
    }
}

pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Node> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)?;

    // Load buffers, fetched concurrently but kept in index order
    let blob = gltf.blob.as_deref();
    let buffer_data = futures::future::try_join_all(gltf.buffers().map(|buffer| async move {
        match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .map(<[u8]>::to_vec)
                .ok_or_else(|| anyhow::anyhow!("{} references a missing GLB blob", file_name)),
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    anyhow::bail!("embedded data URIs are not supported ({})", file_name);
                }
                load_binary(&sibling_path(file_name, uri)).await
            }
        }
    }))
    .await?;

    // Load materials. A missing base colour texture falls back to the colour factor,
    // a missing normal texture to a flat normal map.
    let layout = diffuse_normal_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(info) => {
                load_gltf_image(
                    info.texture().source(),
                    file_name,
                    &buffer_data,
                    false,
                    device,
                    queue,
                )
                .await?
            }
            None => {
                let [r, g, b, a] = pbr.base_color_factor();
                Texture::create_solid(
                    [to_srgb_byte(r), to_srgb_byte(g), to_srgb_byte(b), (a.clamp(0.0, 1.0) * 255.0).round() as u8],
                    1,
                    1,
                    wgpu::TextureFormat::Rgba8UnormSrgb,
                    "base colour factor",
                    device,
                    queue,
                )
            }
        };
        let normal_texture = match material.normal_texture() {
            Some(normal) => {
                load_gltf_image(
                    normal.texture().source(),
                    file_name,
                    &buffer_data,
                    true,
                    device,
                    queue,
                )
                .await?
            }
            None => Texture::create_default_normal_map(1, 1, device, queue),
        };
        let name = format!("{}#{}", file_name, material.name().unwrap_or("material"));
        materials.push(model::Material::new(
            device,
            &name,
            diffuse_texture,
            normal_texture,
            &layout,
        ));
    }
    if materials.is_empty() {
        // Primitives without a material use the glTF default: plain white
        materials.push(model::Material::new(
            device,
            "default material",
            Texture::create_solid([255; 4], 1, 1, wgpu::TextureFormat::Rgba8UnormSrgb, "white", device, queue),
            Texture::create_default_normal_map(1, 1, device, queue),
            &layout,
        ));
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow::anyhow!("{} contains no scene", file_name))?;

    let roots = scene
        .nodes()
        .map(|node| to_scene_node(node, &buffer_data, device, &materials))
        .collect::<anyhow::Result<Vec<_>>>()?;
    log::debug!("{} has {} root node(s)", file_name, roots.len());

    let root_node = wrap_roots(roots, Node::new(device, scene.name().unwrap_or(file_name), None));
    log::info!("loaded model {}", file_name);

    Ok(root_node)
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &[model::Material],
) -> anyhow::Result<Node> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node {}", node.index()));
    let model = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!("skipping non-triangle primitive in mesh {}", name);
                    continue;
                }
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

                let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
                    Some(positions) => positions
                        .map(|position| ModelVertex {
                            position,
                            ..Default::default()
                        })
                        .collect(),
                    None => {
                        log::warn!("primitive without positions in mesh {}", name);
                        continue;
                    }
                };
                if let Some(normals) = reader.read_normals() {
                    vertices
                        .iter_mut()
                        .zip(normals)
                        .for_each(|(v, normal)| v.normal = normal);
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                    vertices
                        .iter_mut()
                        .zip(tex_coords)
                        .for_each(|(v, tex_coord)| v.tex_coords = tex_coord);
                }

                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..vertices.len() as u32).collect(),
                };

                match reader.read_tangents() {
                    Some(tangents) => vertices.iter_mut().zip(tangents).for_each(|(v, tangent)| {
                        // GLTF tangents are vec4, w carries the bitangent sign
                        let tangent: cgmath::Vector4<f32> = tangent.into();
                        let normal: cgmath::Vector3<f32> = v.normal.into();
                        v.tangent = tangent.truncate().into();
                        v.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
                    }),
                    None => mesh::compute_tangents(&mut vertices, &indices),
                }

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                let material = primitive
                    .material()
                    .index()
                    .filter(|&idx| idx < materials.len())
                    .unwrap_or(0);

                meshes.push(model::Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material,
                });
            }
            Some(model::Model {
                meshes,
                materials: materials.to_vec(),
            })
        }
        None => None,
    };

    let mut scene_node = Node::new(device, &name, model);
    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.transform = Transform::from_decomposed(translation, rotation, scale);
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffers, device, materials)?);
    }

    Ok(scene_node)
}
