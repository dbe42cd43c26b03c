//! Tight interleaved byte layouts for GPU upload
//!
//! [`Vertex`] stays an attribute-named struct; these packed types are the
//! explicit serialization step.

use crate::error::{Error, Result};
use crate::mesh::{Mesh, Vertex};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 11 floats: position, normal, uv, barycentric
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub barycentric: [f32; 3],
}

/// Same as [`PackedVertex`] with uv stored as normalized signed shorts
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedVertexShortUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [i16; 2],
    pub barycentric: [f32; 3],
}

impl From<&Vertex> for PackedVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: [v.position.x, v.position.y, v.position.z],
            normal: [v.normal.x, v.normal.y, v.normal.z],
            uv: [v.uv.x, v.uv.y],
            barycentric: [v.barycentric.x, v.barycentric.y, v.barycentric.z],
        }
    }
}

impl From<&Vertex> for PackedVertexShortUv {
    fn from(v: &Vertex) -> Self {
        Self {
            position: [v.position.x, v.position.y, v.position.z],
            normal: [v.normal.x, v.normal.y, v.normal.z],
            uv: [normalize_short(v.uv.x), normalize_short(v.uv.y)],
            barycentric: [v.barycentric.x, v.barycentric.y, v.barycentric.z],
        }
    }
}

/// Maps [-1, 1] onto the full signed 16 bit range
fn normalize_short(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Texture coordinate storage in the vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UvFormat {
    #[default]
    Float,
    NormalizedShort,
}

/// Width of each index in the index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexFormat {
    U16,
    #[default]
    U32,
}

impl IndexFormat {
    /// Smallest format able to address `vertex_count` vertices
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count <= u16::MAX as usize + 1 {
            IndexFormat::U16
        } else {
            IndexFormat::U32
        }
    }
}

/// Serialized vertex and index bytes ready to hand to a graphics API
#[derive(Debug, Clone, PartialEq)]
pub struct GpuBuffers {
    pub vertex_bytes: Vec<u8>,
    pub index_bytes: Vec<u8>,
    pub vertex_stride: usize,
    pub index_format: IndexFormat,
    pub index_count: usize,
}

impl Mesh {
    pub fn packed_vertices(&self) -> Vec<PackedVertex> {
        self.vertices.iter().map(PackedVertex::from).collect()
    }

    /// Serializes the mesh with the requested layouts.
    ///
    /// Fails with [`Error::IndexOverflow`] if 16 bit indices are requested for
    /// more vertices than they can address.
    pub fn to_gpu_buffers(&self, uv_format: UvFormat, index_format: IndexFormat) -> Result<GpuBuffers> {
        let (vertex_bytes, vertex_stride) = match uv_format {
            UvFormat::Float => {
                let packed = self.packed_vertices();
                (bytemuck::cast_slice::<_, u8>(&packed).to_vec(), std::mem::size_of::<PackedVertex>())
            }
            UvFormat::NormalizedShort => {
                let packed: Vec<PackedVertexShortUv> = self.vertices.iter().map(PackedVertexShortUv::from).collect();
                (bytemuck::cast_slice::<_, u8>(&packed).to_vec(), std::mem::size_of::<PackedVertexShortUv>())
            }
        };

        let index_bytes = match index_format {
            IndexFormat::U32 => bytemuck::cast_slice::<_, u8>(&self.indices).to_vec(),
            IndexFormat::U16 => {
                let limit = u16::MAX as usize + 1;
                if self.vertices.len() > limit {
                    return Err(Error::IndexOverflow { count: self.vertices.len(), limit });
                }
                let short: Vec<u16> = self.indices.iter().map(|&i| i as u16).collect();
                bytemuck::cast_slice::<_, u8>(&short).to_vec()
            }
        };

        Ok(GpuBuffers {
            vertex_bytes,
            index_bytes,
            vertex_stride,
            index_format,
            index_count: self.indices.len(),
        })
    }
}
