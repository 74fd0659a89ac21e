//! Obstacle behavior engine: the four hostile entity state machines
//!
//! Each variant advances independently per tick; obstacles never interact
//! with each other except through a mine's track-wide blast, which the tick
//! loop resolves in a separate sweep so iteration order never matters.
//! Collision detection is lane-based: an obstacle threatens the ship only
//! while it occupies the ship's track and the ship falls inside its hazard
//! window (body, blast reach, or contact radius).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::track::{step_toward, track_radius};
use crate::consts::*;
use crate::{angular_distance, normalize_angle, polar_to_cartesian};

/// What the ship looks like to an obstacle (read-only pursuit/hazard input)
#[derive(Debug, Clone, Copy)]
pub struct ShipView {
    pub track: usize,
    pub angle: f32,
    pub tangential_speed: f32,
    pub shield_active: bool,
}

/// Mine lifecycle: travel out to the track, charge up, then blow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MinePhase {
    /// Moving radially from the black hole toward its track
    Traveling { speed: f32 },
    /// Parked on the track, counting down to the blast
    Charging { timer: u32 },
    /// Blast window then harmless fade; removed when the timer runs out
    Exploding { timer: u32 },
}

/// Exploder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExploderPhase {
    /// Fuse burning down; pulse level rises as it gets close
    Fused { fuse_ticks: u32 },
    /// Fixed-radius damage zone on its track
    Exploding { timer: u32 },
}

/// Per-kind state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Drifts onto a track, orbits, destroyed on contact or after drifting
    /// back off the field
    Asteroid {
        entry_speed: f32,
        orbital_speed: f32,
        ttl_ticks: u32,
        departing: bool,
    },
    /// Asteroid-shaped bomb with a fuse; detonates on expiry or contact
    Exploder {
        entry_speed: f32,
        orbital_speed: f32,
        phase: ExploderPhase,
        /// Pulse level in [0, 1]; presentation reads it for the glow
        pulse: f32,
        pulse_dir: f32,
        /// Blast damages the ship at most once
        hit_ship: bool,
    },
    /// Ball-lightning mine; its blast covers the whole track
    Mine { phase: MinePhase, hit_ship: bool },
    /// Following charge: nearest-lane pursuit, continuous damage on contact
    Charge {
        speed_multiplier: f32,
        /// Riding the ship and electrocuting it each tick
        engaged: bool,
        /// Cooldown until the next lane step toward the ship
        lane_step_ticks: u32,
    },
}

/// Coarse phase label exposed in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstaclePhase {
    Arriving,
    Orbiting,
    Departing,
    Fused,
    Traveling,
    Charging,
    Exploding,
    Fading,
    Pursuing,
    Engaged,
}

/// A hostile entity bound to (at most) one track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Track the obstacle occupies (or is heading for)
    pub track: usize,
    /// Orbital angle (radians)
    pub angle: f32,
    /// Current radial position; hazardous only while inside the track band
    pub radius: f32,
    pub kind: ObstacleKind,
    /// Marked by the tick loop; swept at end of tick
    #[serde(default)]
    pub dead: bool,
}

impl Obstacle {
    pub fn asteroid(id: u32, track: usize, angle: f32, spawn_radius: f32, entry_speed: f32, orbital_speed: f32, ttl_ticks: u32) -> Self {
        Self {
            id,
            track,
            angle,
            radius: spawn_radius,
            kind: ObstacleKind::Asteroid {
                entry_speed,
                orbital_speed,
                ttl_ticks,
                departing: false,
            },
            dead: false,
        }
    }

    pub fn exploder(id: u32, track: usize, angle: f32, spawn_radius: f32, entry_speed: f32, orbital_speed: f32, fuse_ticks: u32) -> Self {
        Self {
            id,
            track,
            angle,
            radius: spawn_radius,
            kind: ObstacleKind::Exploder {
                entry_speed,
                orbital_speed,
                phase: ExploderPhase::Fused { fuse_ticks },
                pulse: 0.0,
                pulse_dir: 1.0,
                hit_ship: false,
            },
            dead: false,
        }
    }

    pub fn mine(id: u32, track: usize, angle: f32, travel_speed: f32) -> Self {
        Self {
            id,
            track,
            angle,
            radius: 0.0,
            kind: ObstacleKind::Mine {
                phase: MinePhase::Traveling { speed: travel_speed },
                hit_ship: false,
            },
            dead: false,
        }
    }

    pub fn charge(id: u32, track: usize, angle: f32) -> Self {
        Self {
            id,
            track,
            angle,
            radius: track_radius(track),
            kind: ObstacleKind::Charge {
                speed_multiplier: CHARGE_BASE_MULTIPLIER,
                engaged: false,
                lane_step_ticks: CHARGE_LANE_STEP_TICKS,
            },
            dead: false,
        }
    }

    /// Cartesian position for the presentation layer
    pub fn position(&self) -> Vec2 {
        polar_to_cartesian(self.radius, self.angle)
    }

    /// Body radius for contact collision
    pub fn body_radius(&self) -> f32 {
        match self.kind {
            ObstacleKind::Asteroid { .. } => ASTEROID_RADIUS,
            ObstacleKind::Exploder { .. } => EXPLODER_RADIUS,
            ObstacleKind::Mine { .. } => MINE_RADIUS,
            ObstacleKind::Charge { .. } => CHARGE_RADIUS,
        }
    }

    /// Whether the obstacle currently sits inside its track band
    pub fn on_track(&self) -> bool {
        (self.radius - track_radius(self.track)).abs() < TRACK_WIDTH / 2.0
    }

    /// Snapshot phase label
    pub fn phase(&self) -> ObstaclePhase {
        match &self.kind {
            ObstacleKind::Asteroid { departing, .. } => {
                if *departing {
                    ObstaclePhase::Departing
                } else if self.on_track() {
                    ObstaclePhase::Orbiting
                } else {
                    ObstaclePhase::Arriving
                }
            }
            ObstacleKind::Exploder { phase, .. } => match phase {
                ExploderPhase::Fused { .. } => ObstaclePhase::Fused,
                ExploderPhase::Exploding { .. } => ObstaclePhase::Exploding,
            },
            ObstacleKind::Mine { phase, .. } => match phase {
                MinePhase::Traveling { .. } => ObstaclePhase::Traveling,
                MinePhase::Charging { .. } => ObstaclePhase::Charging,
                MinePhase::Exploding { timer } if *timer < MINE_BLAST_TICKS => {
                    ObstaclePhase::Exploding
                }
                MinePhase::Exploding { .. } => ObstaclePhase::Fading,
            },
            ObstacleKind::Charge { engaged, .. } => {
                if *engaged { ObstaclePhase::Engaged } else { ObstaclePhase::Pursuing }
            }
        }
    }

    /// Arc distance from the ship along the shared track centerline
    fn arc_distance_to(&self, ship: &ShipView) -> f32 {
        angular_distance(self.angle, ship.angle) * track_radius(self.track)
    }

    /// Body contact with the ship (same track, overlapping radii)
    pub fn contacts_ship(&self, ship: &ShipView) -> bool {
        self.track == ship.track
            && self.on_track()
            && self.arc_distance_to(ship) < self.body_radius() + SHIP_RADIUS
    }

    /// Ship inside an exploder's blast reach
    pub fn blast_reaches_ship(&self, ship: &ShipView) -> bool {
        self.track == ship.track && self.arc_distance_to(ship) < EXPLOSION_RADIUS + SHIP_RADIUS
    }

    /// Whether a mine's blast window is currently open
    pub fn mine_blast_active(&self) -> bool {
        matches!(
            self.kind,
            ObstacleKind::Mine { phase: MinePhase::Exploding { timer }, .. }
                if timer < MINE_BLAST_TICKS
        )
    }

    /// Whether an exploder's blast window is currently open
    pub fn exploder_blast_active(&self) -> bool {
        matches!(
            self.kind,
            ObstacleKind::Exploder { phase: ExploderPhase::Exploding { timer }, .. }
                if timer < EXPLOSION_DURATION_TICKS
        )
    }

    /// Force an exploder into its blast (contact trigger or mine sympathy).
    /// No-op for anything already exploding or of another kind.
    pub fn trigger_blast(&mut self) {
        if let ObstacleKind::Exploder { phase, .. } = &mut self.kind
            && matches!(phase, ExploderPhase::Fused { .. })
        {
            *phase = ExploderPhase::Exploding { timer: 0 };
        }
    }

    /// Advance this obstacle's state machine by one tick.
    ///
    /// Pure motion and timers; all damage is resolved by the tick loop
    /// before this runs, so simultaneous expiry never skips a hit.
    pub fn advance(&mut self, ship: &ShipView) {
        let target = track_radius(self.track);
        match &mut self.kind {
            ObstacleKind::Asteroid { entry_speed, orbital_speed, ttl_ticks, departing } => {
                if *departing {
                    self.radius += *entry_speed;
                    if self.radius > FIELD_RADIUS {
                        self.dead = true;
                    }
                } else if (self.radius - target).abs() > *entry_speed {
                    // Still drifting onto the track
                    self.radius += entry_speed.copysign(target - self.radius);
                } else {
                    self.radius = target;
                    self.angle = normalize_angle(self.angle + *orbital_speed);
                    *ttl_ticks = ttl_ticks.saturating_sub(1);
                    if *ttl_ticks == 0 {
                        *departing = true;
                    }
                }
            }

            ObstacleKind::Exploder { entry_speed, orbital_speed, phase, pulse, pulse_dir, .. } => {
                match phase {
                    ExploderPhase::Fused { fuse_ticks } => {
                        if (self.radius - target).abs() > *entry_speed {
                            self.radius += entry_speed.copysign(target - self.radius);
                        } else {
                            self.radius = target;
                            self.angle = normalize_angle(self.angle + *orbital_speed);
                        }
                        // Pulse faster as the fuse shortens
                        let rate = 0.05 + 0.1 * (1.0 - (*fuse_ticks as f32 / 600.0).min(1.0));
                        *pulse += rate * *pulse_dir;
                        if *pulse >= 1.0 {
                            *pulse = 1.0;
                            *pulse_dir = -1.0;
                        } else if *pulse <= 0.0 {
                            *pulse = 0.0;
                            *pulse_dir = 1.0;
                        }
                        *fuse_ticks = fuse_ticks.saturating_sub(1);
                        if *fuse_ticks == 0 {
                            *phase = ExploderPhase::Exploding { timer: 0 };
                        }
                    }
                    ExploderPhase::Exploding { timer } => {
                        *timer += 1;
                        if *timer >= EXPLOSION_DURATION_TICKS {
                            self.dead = true;
                        }
                    }
                }
            }

            ObstacleKind::Mine { phase, .. } => match phase {
                MinePhase::Traveling { speed } => {
                    self.radius += *speed;
                    if self.radius >= target {
                        self.radius = target;
                        *phase = MinePhase::Charging { timer: 0 };
                    }
                }
                MinePhase::Charging { timer } => {
                    *timer += 1;
                    if *timer >= MINE_CHARGE_TICKS {
                        *phase = MinePhase::Exploding { timer: 0 };
                    }
                }
                MinePhase::Exploding { timer } => {
                    *timer += 1;
                    if *timer >= MINE_BLAST_TICKS + MINE_FADE_TICKS {
                        // Removed, never recycled
                        self.dead = true;
                    }
                }
            },

            ObstacleKind::Charge { speed_multiplier, engaged, lane_step_ticks } => {
                *speed_multiplier += CHARGE_MULTIPLIER_GROWTH;
                if *engaged {
                    // Riding the ship; stays glued until it escapes the lane
                    self.angle = ship.angle;
                    self.radius = track_radius(self.track);
                    return;
                }
                // Step one lane toward the ship on a fixed cadence
                *lane_step_ticks = lane_step_ticks.saturating_sub(1);
                if *lane_step_ticks == 0 && self.track != ship.track {
                    self.track = step_toward(self.track, ship.track);
                    *lane_step_ticks = CHARGE_LANE_STEP_TICKS;
                } else if *lane_step_ticks == 0 {
                    *lane_step_ticks = CHARGE_LANE_STEP_TICKS;
                }
                self.radius = track_radius(self.track);
                // Close angularly at a fraction of the ship's tangential speed
                let angular_step =
                    (*speed_multiplier * ship.tangential_speed) / track_radius(self.track);
                let delta = normalize_angle(ship.angle - self.angle);
                if delta.abs() <= angular_step {
                    self.angle = ship.angle;
                } else {
                    self.angle = normalize_angle(self.angle + angular_step.copysign(delta));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parked_ship(track: usize) -> ShipView {
        ShipView { track, angle: 0.0, tangential_speed: 3.0, shield_active: false }
    }

    #[test]
    fn test_asteroid_arrives_then_orbits() {
        let mut a = Obstacle::asteroid(1, 1, 0.0, 50.0, 10.0, 0.002, 600);
        let ship = parked_ship(0);
        for _ in 0..50 {
            a.advance(&ship);
        }
        assert!(a.on_track());
        let angle_before = a.angle;
        a.advance(&ship);
        assert!(a.angle > angle_before);
    }

    #[test]
    fn test_asteroid_departs_and_leaves_field() {
        let mut a = Obstacle::asteroid(1, 0, 0.0, track_radius(0), 8.0, 0.002, 1);
        let ship = parked_ship(2);
        // Burn the TTL, then drift out
        for _ in 0..2000 {
            a.advance(&ship);
            if a.dead {
                break;
            }
        }
        assert!(a.dead);
        assert!(a.radius > FIELD_RADIUS);
    }

    #[test]
    fn test_exploder_fuse_expiry_enters_blast_then_removed() {
        let mut e = Obstacle::exploder(2, 1, 0.0, track_radius(1), 6.0, 0.001, 3);
        let ship = parked_ship(0);
        for _ in 0..3 {
            assert!(!e.exploder_blast_active());
            e.advance(&ship);
        }
        assert!(e.exploder_blast_active());
        for _ in 0..EXPLOSION_DURATION_TICKS {
            e.advance(&ship);
        }
        assert!(e.dead);
    }

    #[test]
    fn test_mine_phase_schedule() {
        let mut m = Obstacle::mine(3, 0, 1.0, 5.0);
        let ship = parked_ship(2);
        assert_eq!(m.phase(), ObstaclePhase::Traveling);
        for _ in 0..30 {
            m.advance(&ship);
        }
        assert_eq!(m.phase(), ObstaclePhase::Charging);
        for _ in 0..MINE_CHARGE_TICKS {
            m.advance(&ship);
        }
        assert!(m.mine_blast_active());
        for _ in 0..MINE_BLAST_TICKS {
            m.advance(&ship);
        }
        assert_eq!(m.phase(), ObstaclePhase::Fading);
        assert!(!m.mine_blast_active());
        for _ in 0..MINE_FADE_TICKS {
            m.advance(&ship);
        }
        assert!(m.dead);
    }

    #[test]
    fn test_charge_steps_lanes_toward_ship() {
        let mut c = Obstacle::charge(4, 2, std::f32::consts::PI);
        let ship = parked_ship(0);
        for _ in 0..(CHARGE_LANE_STEP_TICKS * 2 + 2) {
            c.advance(&ship);
        }
        assert_eq!(c.track, 0);
    }

    #[test]
    fn test_charge_closes_angle_and_rides_when_engaged() {
        let mut c = Obstacle::charge(5, 0, 1.0);
        let mut ship = parked_ship(0);
        ship.angle = 0.9;
        c.advance(&ship);
        assert!(angular_distance(c.angle, ship.angle) < 0.1);

        if let ObstacleKind::Charge { engaged, .. } = &mut c.kind {
            *engaged = true;
        }
        ship.angle = -2.0;
        c.advance(&ship);
        assert_eq!(c.angle, ship.angle);
    }
}
