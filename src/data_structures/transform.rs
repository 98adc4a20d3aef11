//! Node transforms and their GPU representation.
//!
//! A [`Transform`] is the local position/rotation/scale of a scene node. The
//! rotation is kept as Euler angles because the pointer tween animates pitch and
//! yaw directly. [`TransformRaw`] is the world matrix as it is laid out in the
//! per-node vertex buffer.

use cgmath::{Euler, Matrix4, Quaternion, Rad, SquareMatrix};

use crate::data_structures::model;

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build from glTF's decomposed TRS (quaternion given as `[x, y, z, w]`).
    pub fn from_decomposed(
        translation: [f32; 3],
        rotation: [f32; 4],
        scale: [f32; 3],
    ) -> Self {
        let [x, y, z, w] = rotation;
        Self {
            position: translation.into(),
            rotation: Euler::from(Quaternion::new(w, x, y, z)),
            scale: scale.into(),
        }
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        Quaternion::from(self.rotation)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.quaternion())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw transform is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl TransformRaw {
    pub fn from_world(world: Matrix4<f32>) -> Self {
        // Inverse-transpose keeps normals perpendicular under non-uniform scale
        let upper = cgmath::Matrix3::new(
            world.x.x, world.x.y, world.x.z, world.y.x, world.y.y, world.y.z, world.z.x,
            world.z.y, world.z.z,
        );
        let normal = upper
            .invert()
            .map(|inverse| cgmath::Matrix::transpose(&inverse))
            .unwrap_or(upper);
        Self {
            model: world.into(),
            normal: normal.into(),
        }
    }
}

/**
 * Layout of the per-node buffer: a 4x4 model matrix (four vec4 slots) followed
 * by a 3x3 normal matrix (three vec3 slots). Stepped per instance.
 */
impl model::Vertex for TransformRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TransformRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Transform as _, Point3};

    use super::*;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::new().to_matrix().transform_point(p), p);
    }

    #[test]
    fn decomposed_identity_quaternion_has_no_rotation() {
        let t = Transform::from_decomposed([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], [2.0; 3]);
        assert_eq!(t.rotation, Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)));
        let p = t.to_matrix().transform_point(Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3::new(3.0, 2.0, 2.0));
    }
}
