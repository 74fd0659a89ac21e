//! Spawn policy: what enters the field and when
//!
//! All randomness flows through the run's seeded RNG, in a fixed draw order,
//! so two runs with the same seed and inputs see identical fields. Mines and
//! charges spawn on tick-counted schedules; asteroids, exploders and pickups
//! roll a per-tick chance.

use log::info;
use rand::Rng;
use std::f32::consts::PI;

use super::obstacle::{Obstacle, ObstacleKind};
use super::state::{Pickup, PickupKind, RunState};
use crate::consts::*;
use crate::normalize_angle;

/// Soft cap on chance-spawned obstacles (schedule spawns ignore it)
const MAX_OBSTACLES: usize = 5;
/// Per-tick probability of a new obstacle while under the cap
const OBSTACLE_SPAWN_CHANCE: f64 = 0.008;
/// Share of chance-spawned obstacles that are exploders
const EXPLODER_SHARE: f64 = 0.2;
/// Per-tick probability of a boost crystal while none is on the field
const BOOST_SPAWN_CHANCE: f64 = 0.01;
/// Per-tick probability of an energy cell
const ENERGY_SPAWN_CHANCE: f64 = 0.002;
/// Ticks between forced mine spawns (10 seconds)
const MINE_SPAWN_INTERVAL: u32 = 10 * TICK_HZ;
/// Pickups linger this long before despawning
const PICKUP_TTL_TICKS: u32 = 15 * TICK_HZ;

/// Run one tick of the spawn policy. Active phase only.
pub fn run_spawns(state: &mut RunState) {
    spawn_obstacles(state);
    spawn_mine(state);
    spawn_charge(state);
    spawn_pickups(state);
}

/// A spawn angle safely away from the ship's current position
fn offset_angle(state: &mut RunState) -> f32 {
    let offset = state.rng.random_range(0.5..2.0 * PI - 0.5);
    normalize_angle(state.ship.angle + offset)
}

fn spawn_obstacles(state: &mut RunState) {
    // Pressure ramps up over the run: double the spawn rate by the end
    let ramp = 1.0 + f64::from(state.survival_ticks_elapsed()) / f64::from(SURVIVAL_TICKS);
    if state.obstacles.len() >= MAX_OBSTACLES
        || !state.rng.random_bool(OBSTACLE_SPAWN_CHANCE * ramp)
    {
        return;
    }
    let track = state.rng.random_range(0..NUM_TRACKS);
    let angle = offset_angle(state);
    // Half drift in from outside the field, half out from near the hole
    let from_inside = state.rng.random_bool(0.5);
    let spawn_radius = if from_inside {
        (crate::sim::track_radius(track) - 100.0).max(20.0)
    } else {
        FIELD_RADIUS
    };
    let entry_speed = state.rng.random_range(2.0..5.0);
    let orbital_speed =
        state.rng.random_range(0.001..0.002) * if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let id = state.next_entity_id();

    if state.rng.random_bool(EXPLODER_SHARE) {
        let fuse_ticks = state.rng.random_range(3 * TICK_HZ..8 * TICK_HZ);
        info!("spawn exploder id={id} track={track} fuse={fuse_ticks}");
        state.obstacles.push(Obstacle::exploder(
            id, track, angle, spawn_radius, entry_speed, orbital_speed, fuse_ticks,
        ));
    } else {
        let ttl_ticks = state.rng.random_range(5 * TICK_HZ..20 * TICK_HZ);
        info!("spawn asteroid id={id} track={track}");
        state.obstacles.push(Obstacle::asteroid(
            id, track, angle, spawn_radius, entry_speed, orbital_speed, ttl_ticks,
        ));
    }
}

fn spawn_mine(state: &mut RunState) {
    state.mine_spawn_ticks = state.mine_spawn_ticks.saturating_sub(1);
    if state.mine_spawn_ticks > 0 {
        return;
    }
    state.mine_spawn_ticks = MINE_SPAWN_INTERVAL;
    let track = state.rng.random_range(0..NUM_TRACKS);
    let angle = state.rng.random_range(-PI..PI);
    let travel_speed = state.rng.random_range(2.0..5.0);
    let id = state.next_entity_id();
    info!("spawn mine id={id} track={track}");
    state.obstacles.push(Obstacle::mine(id, track, angle, travel_speed));
}

fn spawn_charge(state: &mut RunState) {
    let charge_alive = state
        .obstacles
        .iter()
        .any(|o| matches!(o.kind, ObstacleKind::Charge { .. }));
    if charge_alive {
        state.charge_idle_ticks = 0;
        return;
    }
    state.charge_idle_ticks += 1;
    if state.charge_idle_ticks < CHARGE_SPAWN_IDLE_TICKS {
        return;
    }
    state.charge_idle_ticks = 0;
    // Enter on the far side of the ship's own track
    let track = state.ship.track;
    let angle = normalize_angle(state.ship.angle + PI);
    let id = state.next_entity_id();
    info!("spawn charge id={id} track={track}");
    state.obstacles.push(Obstacle::charge(id, track, angle));
}

fn spawn_pickups(state: &mut RunState) {
    let boost_present = state
        .pickups
        .iter()
        .any(|p| p.kind == PickupKind::SpeedBoost);
    if !boost_present && state.rng.random_bool(BOOST_SPAWN_CHANCE) {
        let track = state.rng.random_range(0..NUM_TRACKS);
        let angle = offset_angle(state);
        let id = state.next_entity_id();
        info!("spawn boost id={id} track={track}");
        state.pickups.push(Pickup {
            id,
            kind: PickupKind::SpeedBoost,
            track,
            angle,
            ttl_ticks: PICKUP_TTL_TICKS,
        });
    }
    if state.rng.random_bool(ENERGY_SPAWN_CHANCE) {
        let track = state.rng.random_range(0..NUM_TRACKS);
        let angle = offset_angle(state);
        let id = state.next_entity_id();
        info!("spawn energy cell id={id} track={track}");
        state.pickups.push(Pickup {
            id,
            kind: PickupKind::EnergyCell,
            track,
            angle,
            ttl_ticks: PICKUP_TTL_TICKS,
        });
    }
}
