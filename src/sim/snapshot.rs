//! Read-only views handed to the presentation layer
//!
//! A [`Snapshot`] is a cheap copy of everything a renderer or HUD needs for
//! one frame; it borrows nothing, so the embedder can keep it across ticks.
//! The [`FinalReport`] is built exactly once, at Terminal entry, and is what
//! a high-score table would persist.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::ObstaclePhase;
use super::state::{PickupKind, RunOutcome, RunPhase, RunState};

/// Obstacle type label for views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleType {
    Asteroid,
    Exploder,
    Mine,
    Charge,
}

/// One obstacle as the presentation layer sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleType,
    pub phase: ObstaclePhase,
    pub track: usize,
    pub position: Vec2,
}

/// One pickup as the presentation layer sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupView {
    pub id: u32,
    pub kind: PickupKind,
    pub track: usize,
    pub position: Vec2,
}

/// Per-tick state of the run for rendering and HUD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: RunPhase,
    pub ship_track: usize,
    pub ship_position: Vec2,
    pub orbital_radius: f32,
    pub ship_speed: f32,
    pub hull: f32,
    pub energy: f32,
    pub shield_active: bool,
    pub dilation_score: f64,
    pub boost_count: u32,
    /// Active-phase ticks left before the escape sequence
    pub survival_ticks_remaining: u32,
    pub obstacles: Vec<ObstacleView>,
    pub pickups: Vec<PickupView>,
}

/// Immutable summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub score: u64,
    pub dilation_score: f64,
    pub boost_count: u32,
    /// Active-phase ticks survived
    pub survival_ticks: u32,
    pub outcome: RunOutcome,
}

impl RunState {
    /// Capture the current tick as a presentation snapshot.
    pub fn snapshot(&self) -> Snapshot {
        use super::obstacle::ObstacleKind;
        Snapshot {
            tick: self.time_ticks,
            phase: self.phase,
            ship_track: self.ship.track,
            ship_position: self.ship.position(),
            orbital_radius: self.ship.orbital_radius,
            ship_speed: self.ship.tangential_speed,
            hull: self.ship.hull,
            energy: self.ship.energy,
            shield_active: self.ship.shield_active,
            dilation_score: self.dilation_score,
            boost_count: self.boost_count,
            survival_ticks_remaining: self.survival_ticks_remaining,
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: match o.kind {
                        ObstacleKind::Asteroid { .. } => ObstacleType::Asteroid,
                        ObstacleKind::Exploder { .. } => ObstacleType::Exploder,
                        ObstacleKind::Mine { .. } => ObstacleType::Mine,
                        ObstacleKind::Charge { .. } => ObstacleType::Charge,
                    },
                    phase: o.phase(),
                    track: o.track,
                    position: o.position(),
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .map(|p| PickupView {
                    id: p.id,
                    kind: p.kind,
                    track: p.track,
                    position: crate::polar_to_cartesian(
                        super::track::track_radius(p.track),
                        p.angle,
                    ),
                })
                .collect(),
        }
    }
}
