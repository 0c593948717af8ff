//! Hand-authored demo meshes.
//!
//! Three primitive-list variants are available: a cube drawn as a triangle
//! list, a zig-zag ribbon drawn as a triangle strip, and a stepped disc
//! drawn as a triangle fan. The variant is chosen at startup and fixed for
//! the program's lifetime.
//!
//! Vertex object-space positions are *mutable state*: the transform engine
//! rotates them in place every frame, so orientation accumulates. The
//! screen-space fields are scratch output recomputed per frame.

use crate::error::InitError;
use serde::{Deserialize, Serialize};

/// Triangle assembly order for a vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Explicit triples of indices.
    List,
    /// Each new index forms a triangle with the previous two.
    Strip,
    /// Each new index forms a triangle with the first and previous index.
    Fan,
}

/// One mesh vertex.
///
/// `x/y/z` is the rest pose, overwritten by each frame's incremental
/// rotation. Everything else is derived per frame except the color and the
/// texture coordinates, which are assigned once at init.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    // object space (mutated in place by rotation)
    pub x: f32,
    pub y: f32,
    pub z: f32,
    // screen space, recomputed every frame
    pub sx: f32,
    pub sy: f32,
    /// Homogeneous depth (camera-space z) for perspective-correct texturing.
    pub w: f32,
    /// Depth-buffer value (camera-space z scaled by 100).
    pub depth: f32,
    /// Fog alpha; only written when fogging is enabled.
    pub a: u8,
    // texture coordinates, assigned at init
    pub u: f32,
    pub v: f32,
    // vertex color
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Vertex {
    fn at(x: f32, y: f32, z: f32, color: (u8, u8, u8)) -> Self {
        Vertex {
            x,
            y,
            z,
            a: 255,
            r: color.0,
            g: color.1,
            b: color.2,
            ..Default::default()
        }
    }
}

/// Which of the three authored meshes to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshVariant {
    Cube,
    Ribbon,
    Disc,
}

impl MeshVariant {
    /// Parse a variant name (settings file / command line).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cube" => Some(MeshVariant::Cube),
            "ribbon" | "strip" => Some(MeshVariant::Ribbon),
            "disc" | "fan" => Some(MeshVariant::Disc),
            _ => None,
        }
    }
}

/// A vertex list with its triangle topology.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub topology: Topology,
}

impl Mesh {
    pub fn build(variant: MeshVariant) -> Mesh {
        match variant {
            MeshVariant::Cube => Mesh::cube(),
            MeshVariant::Ribbon => Mesh::ribbon(),
            MeshVariant::Disc => Mesh::disc(),
        }
    }

    /// Unit cube: 8 vertices, 12 triangles as an explicit list.
    pub fn cube() -> Mesh {
        const P: [(f32, f32, f32); 8] = [
            (1.0, 1.0, 1.0),
            (1.0, 1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, -1.0, 1.0),
            (-1.0, 1.0, 1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, -1.0),
            (-1.0, -1.0, 1.0),
        ];
        const C: [(u8, u8, u8); 8] = [
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (0, 255, 255),
            (255, 0, 255),
            (255, 255, 255),
            (10, 10, 10),
        ];
        #[rustfmt::skip]
        const IDX: [u16; 36] = [
            0, 1, 2,  0, 2, 3,
            1, 5, 6,  1, 6, 2,
            5, 4, 7,  5, 7, 6,
            4, 0, 3,  4, 3, 7,
            5, 1, 0,  5, 0, 4,
            7, 3, 2,  7, 2, 6,
        ];
        Mesh {
            vertices: P
                .iter()
                .zip(C.iter())
                .map(|(&(x, y, z), &c)| Vertex::at(x, y, z, c))
                .collect(),
            indices: IDX.to_vec(),
            topology: Topology::List,
        }
    }

    /// Zig-zag ribbon: 9 vertices, 7 triangles as a strip.
    pub fn ribbon() -> Mesh {
        const P: [(f32, f32, f32); 9] = [
            (-2.0, -1.0, 0.2),
            (-1.5, 1.0, -0.2),
            (-1.0, -1.0, -0.2),
            (-0.5, 1.0, 0.2),
            (0.0, -1.0, -0.2),
            (0.5, 1.0, -0.2),
            (1.0, -1.0, 0.2),
            (1.5, 1.0, -0.2),
            (2.0, -1.0, -0.2),
        ];
        const C: [(u8, u8, u8); 9] = [
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (0, 255, 255),
            (255, 0, 255),
            (255, 255, 255),
            (10, 10, 10),
            (0, 255, 0),
        ];
        Mesh {
            vertices: P
                .iter()
                .zip(C.iter())
                .map(|(&(x, y, z), &c)| Vertex::at(x, y, z, c))
                .collect(),
            indices: (0..9).collect(),
            topology: Topology::Strip,
        }
    }

    /// Stepped disc: a hub vertex plus 30 rim vertices spiralling in z,
    /// drawn as a fan. Rim colors cycle through the palette.
    pub fn disc() -> Mesh {
        const RIM: [(f32, f32); 8] = [
            (-0.2, -0.7),
            (-0.7, -0.2),
            (-0.7, 0.2),
            (-0.2, 0.7),
            (0.2, 0.7),
            (0.7, 0.2),
            (0.7, -0.2),
            (0.2, -0.7),
        ];
        const PALETTE: [(u8, u8, u8); 7] = [
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (0, 255, 255),
            (255, 0, 255),
            (255, 255, 255),
        ];
        let mut vertices = vec![Vertex::at(0.0, 0.0, 0.0, (0, 0, 0))];
        for i in 0..30 {
            let (x, y) = RIM[i % RIM.len()];
            let z = -0.70 + 0.05 * i as f32;
            vertices.push(Vertex::at(x, y, z, PALETTE[i % PALETTE.len()]));
        }
        Mesh {
            vertices,
            indices: (0..31).collect(),
            topology: Topology::Fan,
        }
    }

    /// Number of triangles the index list assembles to.
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::List => self.indices.len() / 3,
            Topology::Strip | Topology::Fan => self.indices.len().saturating_sub(2),
        }
    }

    /// Assign planar texture coordinates from the current rest pose.
    ///
    /// `U` spans the x extent right-to-left and `V` the y extent
    /// bottom-to-top, scaled to the texture dimensions. When the texture is
    /// mipmapped only the top level is of interest, and that level is
    /// square, so `V` is scaled by the width.
    ///
    /// The extent min/max are seeded at zero; the authored meshes straddle
    /// the origin so this matches their true extents.
    pub fn assign_uvs(
        &mut self,
        tex_width: u32,
        tex_height: u32,
        mipmapped: bool,
    ) -> Result<(), InitError> {
        let mut min_x = 0.0f32;
        let mut max_x = 0.0f32;
        let mut min_y = 0.0f32;
        let mut max_y = 0.0f32;
        for v in &self.vertices {
            min_x = min_x.min(v.x);
            max_x = max_x.max(v.x);
            min_y = min_y.min(v.y);
            max_y = max_y.max(v.y);
        }
        if max_x == min_x || max_y == min_y {
            return Err(InitError::DegenerateMesh);
        }
        let u_scale = (tex_width as f32 - 1.0) / (max_x - min_x);
        let v_extent = if mipmapped { tex_width } else { tex_height };
        let v_scale = (v_extent as f32 - 1.0) / (max_y - min_y);
        for v in &mut self.vertices {
            v.u = (max_x - v.x) * u_scale;
            v.v = (max_y - v.y) * v_scale;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_shape() {
        let m = Mesh::cube();
        assert_eq!(m.vertices.len(), 8);
        assert_eq!(m.indices.len(), 36);
        assert_eq!(m.topology, Topology::List);
        assert_eq!(m.triangle_count(), 12);
    }

    #[test]
    fn test_ribbon_shape() {
        let m = Mesh::ribbon();
        assert_eq!(m.vertices.len(), 9);
        assert_eq!(m.topology, Topology::Strip);
        assert_eq!(m.triangle_count(), 7);
    }

    #[test]
    fn test_disc_shape() {
        let m = Mesh::disc();
        assert_eq!(m.vertices.len(), 31);
        assert_eq!(m.topology, Topology::Fan);
        assert_eq!(m.triangle_count(), 29);
        // hub sits at the origin
        assert_eq!(m.vertices[0].x, 0.0);
        assert_eq!(m.vertices[0].z, 0.0);
        // rim z steps from -0.70 in 0.05 increments
        assert!((m.vertices[1].z - -0.70).abs() < 1e-6);
        assert!((m.vertices[30].z - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_uv_assignment_spans_texture() {
        let mut m = Mesh::cube();
        m.assign_uvs(64, 32, false).unwrap();
        for v in &m.vertices {
            assert!(v.u >= 0.0 && v.u <= 63.0);
            assert!(v.v >= 0.0 && v.v <= 31.0);
        }
        // x = +1 maps to U = 0, x = -1 maps to U = texW-1
        let right = m.vertices.iter().find(|v| v.x > 0.0).unwrap();
        assert_eq!(right.u, 0.0);
    }

    #[test]
    fn test_uv_assignment_mipmapped_uses_width_for_v() {
        let mut m = Mesh::cube();
        m.assign_uvs(64, 8, true).unwrap();
        let top = m
            .vertices
            .iter()
            .find(|v| v.y < 0.0)
            .map(|v| v.v)
            .unwrap();
        assert_eq!(top, 63.0);
    }

    #[test]
    fn test_uv_assignment_rejects_flat_mesh() {
        let mut m = Mesh::cube();
        for v in &mut m.vertices {
            v.x = 0.0;
        }
        assert!(matches!(
            m.assign_uvs(64, 64, false),
            Err(InitError::DegenerateMesh)
        ));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(MeshVariant::parse("Cube"), Some(MeshVariant::Cube));
        assert_eq!(MeshVariant::parse("strip"), Some(MeshVariant::Ribbon));
        assert_eq!(MeshVariant::parse("fan"), Some(MeshVariant::Disc));
        assert_eq!(MeshVariant::parse("teapot"), None);
    }
}
