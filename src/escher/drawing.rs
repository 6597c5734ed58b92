//! Drawing summary atoms: Dgg (drawing group), Dg (drawing) and
//! SplitMenuColors.
//!
//! # Dgg layout
//!
//! ```text
//! Offset | Size | Field
//! -------|------|------
//! 0      | 4    | spidMax (next shape id to hand out)
//! 4      | 4    | cidcl (number of id clusters plus one)
//! 8      | 4    | cspSaved (shapes saved)
//! 12     | 4    | cdgSaved (drawings saved)
//! 16     | 8*n  | id clusters (dgid, cspidCur)
//! ```

use super::atom::{AtomCodec, AtomContext};
use crate::common::error::Result;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::*;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct DgWire {
    csp: U32,
    spid_cur: U32,
}

/// Drawing atom (Dg). The drawing id lives in the record instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawingRecord {
    /// Number of shapes in the drawing
    pub num_shapes: u32,
    /// Last shape id used in the drawing
    pub last_shape_id: u32,
}

impl DrawingRecord {
    pub const SIZE: usize = 8;

    pub fn new(num_shapes: u32, last_shape_id: u32) -> Self {
        Self {
            num_shapes,
            last_shape_id,
        }
    }
}

impl AtomCodec for DrawingRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let (wire, _) =
            DgWire::read_from_prefix(body).map_err(|_| ctx.truncated(body, Self::SIZE))?;
        Ok((Self::new(wire.csp.get(), wire.spid_cur.get()), Self::SIZE))
    }

    fn body_len(&self) -> usize {
        Self::SIZE
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        let wire = DgWire {
            csp: U32::new(self.num_shapes),
            spid_cur: U32::new(self.last_shape_id),
        };
        out.extend_from_slice(wire.as_bytes());
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct DggWire {
    spid_max: U32,
    cidcl: U32,
    csp_saved: U32,
    cdg_saved: U32,
}

/// File ID cluster entry
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct IdClusterWire {
    dgid: U32,
    cspid_cur: U32,
}

/// Shape id cluster owned by one drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCluster {
    /// Drawing group ID
    pub drawing_group_id: u32,
    /// Next available shape ID in cluster
    pub num_shape_ids_used: u32,
}

/// Drawing group atom (Dgg).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrawingGroupRecord {
    pub shape_id_max: u32,
    /// Cluster count field as stored (normally `clusters.len() + 1`)
    pub num_id_clusters: u32,
    pub num_shapes_saved: u32,
    pub drawings_saved: u32,
    pub clusters: Vec<IdCluster>,
}

impl DrawingGroupRecord {
    pub const FIXED_SIZE: usize = 16;
    const CLUSTER_SIZE: usize = 8;

    /// Append a cluster and update the stored cluster count.
    pub fn add_cluster(&mut self, drawing_group_id: u32, num_shape_ids_used: u32) {
        self.clusters.push(IdCluster {
            drawing_group_id,
            num_shape_ids_used,
        });
        self.num_id_clusters = self.clusters.len() as u32 + 1;
    }

    pub fn find_cluster(&self, drawing_group_id: u32) -> Option<&IdCluster> {
        self.clusters
            .iter()
            .find(|c| c.drawing_group_id == drawing_group_id)
    }
}

impl AtomCodec for DrawingGroupRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let (wire, mut rest) =
            DggWire::read_from_prefix(body).map_err(|_| ctx.truncated(body, Self::FIXED_SIZE))?;

        // Clusters fill the body; the stored count is not trusted for framing
        let mut clusters = Vec::with_capacity(rest.len() / Self::CLUSTER_SIZE);
        while let Ok((cluster, tail)) = IdClusterWire::read_from_prefix(rest) {
            clusters.push(IdCluster {
                drawing_group_id: cluster.dgid.get(),
                num_shape_ids_used: cluster.cspid_cur.get(),
            });
            rest = tail;
        }

        Ok((
            Self {
                shape_id_max: wire.spid_max.get(),
                num_id_clusters: wire.cidcl.get(),
                num_shapes_saved: wire.csp_saved.get(),
                drawings_saved: wire.cdg_saved.get(),
                clusters,
            },
            body.len() - rest.len(),
        ))
    }

    fn body_len(&self) -> usize {
        Self::FIXED_SIZE + self.clusters.len() * Self::CLUSTER_SIZE
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        let wire = DggWire {
            spid_max: U32::new(self.shape_id_max),
            cidcl: U32::new(self.num_id_clusters),
            csp_saved: U32::new(self.num_shapes_saved),
            cdg_saved: U32::new(self.drawings_saved),
        };
        out.extend_from_slice(wire.as_bytes());
        for cluster in &self.clusters {
            let wire = IdClusterWire {
                dgid: U32::new(cluster.drawing_group_id),
                cspid_cur: U32::new(cluster.num_shape_ids_used),
            };
            out.extend_from_slice(wire.as_bytes());
        }
    }
}

/// Split menu colors (fill, line, shadow, 3-D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitMenuColorsRecord {
    pub colors: [u32; 4],
}

impl SplitMenuColorsRecord {
    pub const SIZE: usize = 16;
    /// Instance written by [`Record::split_menu_colors`](super::record::Record::split_menu_colors)
    pub const INSTANCE: u16 = 4;

    pub fn new(colors: [u32; 4]) -> Self {
        Self { colors }
    }
}

impl AtomCodec for SplitMenuColorsRecord {
    fn decode_body(body: &[u8], ctx: &AtomContext<'_>) -> Result<(Self, usize)> {
        let (words, _) =
            <[U32; 4]>::read_from_prefix(body).map_err(|_| ctx.truncated(body, Self::SIZE))?;
        Ok((Self::new(words.map(|w| w.get())), Self::SIZE))
    }

    fn body_len(&self) -> usize {
        Self::SIZE
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.colors.map(U32::new).as_bytes());
    }
}
