//! Track model: the concentric lanes the ship can occupy
//!
//! Tracks are discrete radial lanes, index 0 innermost. Lane changes are
//! instantaneous at the simulation level; the presentation layer is free to
//! animate them. A move past either boundary is a silent no-op.

use serde::{Deserialize, Serialize};

use crate::consts::{NUM_TRACKS, TRACK_BASE_RADIUS, TRACK_SPACING};

/// Direction of a requested lane change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Toward the black hole (lower track index)
    Inward,
    /// Away from the black hole (higher track index)
    Outward,
}

/// Centerline radius of a track
#[inline]
pub fn track_radius(track: usize) -> f32 {
    TRACK_BASE_RADIUS + track as f32 * TRACK_SPACING
}

/// Resolve a lane-change request against the track bounds.
///
/// Returns the track the request lands on; boundary violations return the
/// current track unchanged.
pub fn resolve_move(current: usize, direction: MoveDirection) -> usize {
    match direction {
        MoveDirection::Inward => current.saturating_sub(1),
        MoveDirection::Outward => (current + 1).min(NUM_TRACKS - 1),
    }
}

/// Step one lane toward a target track (used by the following charge's
/// nearest-lane pursuit). Already there means no movement.
pub fn step_toward(current: usize, target: usize) -> usize {
    use std::cmp::Ordering;
    match current.cmp(&target) {
        Ordering::Less => current + 1,
        Ordering::Greater => current - 1,
        Ordering::Equal => current,
    }
}
