//! Run state and core simulation types
//!
//! Everything that must survive a tick (and serialize for determinism
//! checks) lives here. The tick loop in [`super::tick`] is the only mutator.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::snapshot::FinalReport;
use super::track::track_radius;
use crate::consts::*;
use crate::polar_to_cartesian;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Normal simulation: obstacles spawn, dilation accrues, collisions apply
    Active,
    /// Survival timer expired; collision-immune outward acceleration
    Escaping,
    /// Run ended; final score computed, nothing moves
    Terminal,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Completed the escape sequence
    Escaped,
    /// Hull reached zero during the active phase
    Destroyed,
}

/// Result of feeding a hit through the resource model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Shield was up: no hull damage, flat energy cost applied
    Blocked,
    /// Shield was down: full damage applied to the hull
    HullDamage(f32),
}

/// Events surfaced to the presentation / persistence collaborators.
///
/// Drained once per tick by the embedder; never read by the core itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(RunPhase),
    BoostCollected { total: u32 },
    EnergyCollected,
    ShieldBlocked { obstacle_id: u32 },
    HullDamaged { amount: f32, obstacle_id: u32 },
    RunEnded(FinalReport),
}

/// The player's ship: track position, hull, and the energy pool that powers
/// the shield. Owned by the run state; mutated only from the tick loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    /// Occupied track (0 = innermost)
    pub track: usize,
    /// Orbital angle (radians)
    pub angle: f32,
    /// Distance from the black hole; follows the track centerline during the
    /// active phase, grows freely while escaping
    pub orbital_radius: f32,
    /// Tangential speed (grows with boosts, shrinks with hits)
    pub tangential_speed: f32,
    /// Angular speed from the last orbit update (tangential / radius)
    pub angular_speed: f32,
    /// Hull integrity; zero means destroyed
    pub hull: f32,
    /// Energy pool in [0, ENERGY_MAX]
    pub energy: f32,
    /// Whether the shield is up this tick
    pub shield_active: bool,
}

impl Default for Ship {
    fn default() -> Self {
        // Start on the middle track
        let track = NUM_TRACKS / 2;
        Self {
            track,
            angle: 0.0,
            orbital_radius: track_radius(track),
            tangential_speed: BASE_TANGENTIAL_SPEED,
            angular_speed: 0.0,
            hull: HULL_MAX,
            energy: ENERGY_MAX,
            shield_active: false,
        }
    }
}

impl Ship {
    /// Cartesian position for the presentation layer
    pub fn position(&self) -> Vec2 {
        polar_to_cartesian(self.orbital_radius, self.angle)
    }

    /// Per-tick shield and energy bookkeeping.
    ///
    /// Shield engages only while held with energy in the pool; reaching zero
    /// forces it off regardless of intent. Regeneration runs whenever the
    /// shield is down.
    pub fn tick_resources(&mut self, shield_held: bool) {
        if shield_held && self.energy > 0.0 {
            self.shield_active = true;
            self.energy -= SHIELD_DRAIN_PER_TICK;
            if self.energy <= 0.0 {
                self.energy = 0.0;
                self.shield_active = false;
            }
        } else {
            self.shield_active = false;
            self.energy = (self.energy + ENERGY_REGEN_PER_TICK).min(ENERGY_MAX);
        }
    }

    /// Resolve an incoming hit against the shield.
    pub fn absorb_hit(&mut self, damage: f32) -> HitOutcome {
        if self.shield_active {
            self.energy = (self.energy - SHIELD_BLOCK_COST).max(0.0);
            if self.energy == 0.0 {
                self.shield_active = false;
            }
            HitOutcome::Blocked
        } else {
            self.hull -= damage;
            self.tangential_speed =
                (self.tangential_speed - HIT_SPEED_PENALTY).max(MIN_TANGENTIAL_SPEED);
            HitOutcome::HullDamage(damage)
        }
    }

    /// Apply a collected boost crystal: permanent speed bonus, clamped.
    pub fn collect_boost(&mut self) {
        self.tangential_speed =
            (self.tangential_speed + BOOST_SPEED_BONUS).min(MAX_TANGENTIAL_SPEED);
    }

    /// Apply a collected energy cell.
    pub fn collect_energy(&mut self) {
        self.energy = (self.energy + ENERGY_CELL_AMOUNT).min(ENERGY_MAX);
    }

    /// Advance the orbit one tick along the current track.
    pub fn advance_orbit(&mut self) {
        self.orbital_radius = track_radius(self.track);
        self.angular_speed = self.tangential_speed / self.orbital_radius;
        self.angle = crate::normalize_angle(self.angle + self.angular_speed);
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Boost crystal: +1 boost count, permanent speed bonus
    SpeedBoost,
    /// Energy cell: refills part of the energy pool
    EnergyCell,
}

/// A pickup entity, bound to one track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub track: usize,
    pub angle: f32,
    pub ttl_ticks: u32,
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG; the only entropy source in the core
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current phase
    pub phase: RunPhase,
    /// Set on Terminal entry
    pub outcome: Option<RunOutcome>,
    /// Active-phase ticks left before the escape sequence triggers
    pub survival_ticks_remaining: u32,
    /// Player ship
    pub ship: Ship,
    /// Live obstacles (sorted by id for determinism)
    pub obstacles: Vec<Obstacle>,
    /// Live pickups (sorted by id for determinism)
    pub pickups: Vec<Pickup>,
    /// Dilation accumulator; frozen outside the active phase
    pub dilation_score: f64,
    /// Boost crystals collected; never decreases
    pub boost_count: u32,
    /// Ticks until the next forced mine spawn
    pub mine_spawn_ticks: u32,
    /// Ticks the field has been without a following charge
    pub charge_idle_ticks: u32,
    /// Escape bookkeeping: total angle swept and full rotations completed
    pub escape_total_angle: f32,
    pub escape_rotations: u32,
    /// Final report, set exactly once at Terminal entry
    pub final_report: Option<FinalReport>,
    /// Per-tick event queue, drained by the embedder
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl RunState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: RunPhase::Active,
            outcome: None,
            survival_ticks_remaining: SURVIVAL_TICKS,
            ship: Ship::default(),
            obstacles: Vec::new(),
            pickups: Vec::new(),
            dilation_score: 0.0,
            boost_count: 0,
            mine_spawn_ticks: MINE_CHARGE_TICKS * 4,
            charge_idle_ticks: 0,
            escape_total_angle: 0.0,
            escape_rotations: 0,
            final_report: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ticks of the active phase survived so far
    pub fn survival_ticks_elapsed(&self) -> u32 {
        SURVIVAL_TICKS - self.survival_ticks_remaining
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    /// Hand the tick's events to the embedder
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shield_drains_and_regenerates() {
        let mut ship = Ship::default();
        ship.tick_resources(true);
        assert!(ship.shield_active);
        assert!((ship.energy - (ENERGY_MAX - SHIELD_DRAIN_PER_TICK)).abs() < 1e-5);

        ship.tick_resources(false);
        assert!(!ship.shield_active);
        let expected = ENERGY_MAX - SHIELD_DRAIN_PER_TICK + ENERGY_REGEN_PER_TICK;
        assert!((ship.energy - expected).abs() < 1e-5);
    }

    #[test]
    fn test_shield_forced_off_at_zero_energy() {
        let mut ship = Ship {
            energy: SHIELD_DRAIN_PER_TICK,
            ..Ship::default()
        };
        ship.tick_resources(true);
        assert_eq!(ship.energy, 0.0);
        assert!(!ship.shield_active);

        // Held intent with an empty pool never re-engages
        ship.tick_resources(true);
        assert!(!ship.shield_active);
    }

    #[test]
    fn test_regen_clamps_at_max() {
        let mut ship = Ship::default();
        ship.tick_resources(false);
        assert_eq!(ship.energy, ENERGY_MAX);
    }

    #[test]
    fn test_absorb_hit_blocked_costs_energy_not_hull() {
        let mut ship = Ship::default();
        ship.tick_resources(true);
        let hull_before = ship.hull;
        let energy_before = ship.energy;
        assert_eq!(ship.absorb_hit(50.0), HitOutcome::Blocked);
        assert_eq!(ship.hull, hull_before);
        assert!((ship.energy - (energy_before - SHIELD_BLOCK_COST)).abs() < 1e-5);
    }

    #[test]
    fn test_absorb_hit_unshielded_damages_hull_and_slows() {
        let mut ship = Ship::default();
        assert_eq!(ship.absorb_hit(10.0), HitOutcome::HullDamage(10.0));
        assert_eq!(ship.hull, HULL_MAX - 10.0);
        assert!(
            (ship.tangential_speed - (BASE_TANGENTIAL_SPEED - HIT_SPEED_PENALTY)).abs() < 1e-5
        );
    }

    #[test]
    fn test_boost_speed_clamps() {
        let mut ship = Ship::default();
        for _ in 0..20 {
            ship.collect_boost();
        }
        assert_eq!(ship.tangential_speed, MAX_TANGENTIAL_SPEED);
    }

    proptest! {
        /// Energy never leaves [0, max], whatever the intent sequence.
        #[test]
        fn prop_energy_bounds(start in 0.0f32..=ENERGY_MAX, intents in prop::collection::vec(any::<bool>(), 1..200)) {
            let mut ship = Ship { energy: start, ..Ship::default() };
            for held in intents {
                ship.tick_resources(held);
                prop_assert!(ship.energy >= 0.0);
                prop_assert!(ship.energy <= ENERGY_MAX);
                // Shield never active with an empty pool at tick end
                prop_assert!(!(ship.shield_active && ship.energy == 0.0));
            }
        }
    }
}
