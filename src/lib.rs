//! Black Hole Run - orbital survival arcade game, simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tracks, obstacles, dilation, run phases)
//! - `input`: Intent buffering boundary between raw input and the tick loop
//!
//! Rendering, audio, menus and high-score persistence are external
//! collaborators: they feed intents through [`input::InputAdapter`] and read
//! [`sim::Snapshot`]s back out. Nothing in this crate touches a platform API.

pub mod input;
pub mod sim;

pub use input::InputAdapter;
pub use sim::{FinalReport, RunOutcome, RunPhase, RunState, Snapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second); all timers are tick-counted
    pub const TICK_HZ: u32 = 120;

    /// Number of concentric tracks (0 = innermost)
    pub const NUM_TRACKS: usize = 3;
    /// Centerline radius of the innermost track
    pub const TRACK_BASE_RADIUS: f32 = 150.0;
    /// Radial distance between adjacent track centerlines
    pub const TRACK_SPACING: f32 = 100.0;
    /// Radial width of a track band
    pub const TRACK_WIDTH: f32 = 40.0;
    /// Outer edge of the play field; entities beyond this are gone
    pub const FIELD_RADIUS: f32 = 500.0;

    /// Ship collision radius
    pub const SHIP_RADIUS: f32 = 12.0;
    /// Hull integrity at run start
    pub const HULL_MAX: f32 = 200.0;
    /// Tangential speed at run start
    pub const BASE_TANGENTIAL_SPEED: f32 = 3.0;
    /// Tangential speed ceiling (boosts clamp here)
    pub const MAX_TANGENTIAL_SPEED: f32 = 10.0;
    /// Floor the ship can be slowed to by taking hits
    pub const MIN_TANGENTIAL_SPEED: f32 = 1.0;
    /// Permanent speed gained per collected boost crystal
    pub const BOOST_SPEED_BONUS: f32 = 1.0;
    /// Speed lost per unshielded hit
    pub const HIT_SPEED_PENALTY: f32 = 0.5;

    /// Energy pool capacity
    pub const ENERGY_MAX: f32 = 100.0;
    /// Energy drained per tick while the shield is up
    pub const SHIELD_DRAIN_PER_TICK: f32 = 0.5;
    /// Energy regenerated per tick while the shield is down
    pub const ENERGY_REGEN_PER_TICK: f32 = 0.1;
    /// Flat energy cost of a shield-blocked hit
    pub const SHIELD_BLOCK_COST: f32 = 15.0;
    /// Energy restored by an energy-cell pickup
    pub const ENERGY_CELL_AMOUNT: f32 = 30.0;

    /// Asteroid body radius and contact damage
    pub const ASTEROID_RADIUS: f32 = 20.0;
    pub const ASTEROID_DAMAGE: f32 = 5.0;
    /// Exploder body radius and contact damage
    pub const EXPLODER_RADIUS: f32 = 25.0;
    pub const EXPLODER_DAMAGE: f32 = 10.0;
    /// Exploder blast: arc-distance reach along its track, active window,
    /// and damage to a ship caught in the zone
    pub const EXPLOSION_RADIUS: f32 = 180.0;
    pub const EXPLOSION_DURATION_TICKS: u32 = 30;
    pub const EXPLOSION_DAMAGE: f32 = 10.0;

    /// Mine phase durations (charge-up, active blast window, harmless fade)
    pub const MINE_CHARGE_TICKS: u32 = 300;
    pub const MINE_BLAST_TICKS: u32 = 30;
    pub const MINE_FADE_TICKS: u32 = 60;
    pub const MINE_RADIUS: f32 = 15.0;
    pub const MINE_DAMAGE: f32 = 75.0;

    /// Following charge contact radius and per-tick electrocution damage
    pub const CHARGE_RADIUS: f32 = 15.0;
    pub const CHARGE_DAMAGE_PER_TICK: f32 = 2.0;
    /// Charge speed as a fraction of the ship's tangential speed at spawn,
    /// and its per-tick growth
    pub const CHARGE_BASE_MULTIPLIER: f32 = 0.3;
    pub const CHARGE_MULTIPLIER_GROWTH: f32 = 0.0005;
    /// Ticks between the charge's lane steps toward the ship
    pub const CHARGE_LANE_STEP_TICKS: u32 = 45;
    /// Ticks without a live charge before the next one is sent in
    pub const CHARGE_SPAWN_IDLE_TICKS: u32 = 300;

    /// Pickup collection radius
    pub const PICKUP_RADIUS: f32 = 15.0;

    /// Active-phase survival requirement (60 seconds)
    pub const SURVIVAL_TICKS: u32 = 60 * TICK_HZ;
    /// Orbital radius at which the escape sequence completes
    pub const ESCAPE_RADIUS_THRESHOLD: f32 = 700.0;
    /// Escape spin-up: full rotations before the outward burst
    pub const ESCAPE_SPIN_ROTATIONS: u32 = 2;
    /// Escape spin-up increments (per tick)
    pub const ESCAPE_SPIN_RADIUS_STEP: f32 = 0.1;
    pub const ESCAPE_SPIN_ACCEL: f32 = 0.01;
    /// Escape burst increments (per tick)
    pub const ESCAPE_BURST_RADIUS_STEP: f32 = 5.0;
    pub const ESCAPE_BURST_ACCEL: f32 = 0.2;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Shortest angular distance between two angles, in [0, π]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}
