//! Notifications for the visual layer that mirrors a frame's voxels.
//!
//! Every grid entry owns at most one proxy handle. Structural edits queue a
//! [`ProxyEvent`] per affected handle; the visual layer drains the queue and
//! applies it, so the two sides never mutate each other directly.

use voxframe_core::{ColorIndex, GridPos, ProxyId};

/// A change the visual layer has to mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyEvent {
    /// A voxel was placed and owns a new proxy.
    Created {
        proxy: ProxyId,
        pos: GridPos,
        color: ColorIndex,
    },
    /// A voxel changed cells, keeping its proxy.
    Moved {
        proxy: ProxyId,
        from: GridPos,
        to: GridPos,
    },
    /// A voxel changed color.
    Recolored {
        proxy: ProxyId,
        pos: GridPos,
        color: ColorIndex,
    },
    /// A voxel was removed; its proxy must be destroyed.
    Destroyed { proxy: ProxyId, pos: GridPos },
}

impl ProxyEvent {
    /// Handle the event refers to
    pub const fn proxy(&self) -> ProxyId {
        match *self {
            Self::Created { proxy, .. }
            | Self::Moved { proxy, .. }
            | Self::Recolored { proxy, .. }
            | Self::Destroyed { proxy, .. } => proxy,
        }
    }
}
