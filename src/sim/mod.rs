//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (tick-counted timers, no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod dilation;
pub mod obstacle;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod track;

pub use dilation::{dilation_delta, final_score};
pub use obstacle::{Obstacle, ObstacleKind, ObstaclePhase};
pub use snapshot::{FinalReport, ObstacleType, ObstacleView, PickupView, Snapshot};
pub use state::{GameEvent, Pickup, PickupKind, RunOutcome, RunPhase, RunState, Ship};
pub use tick::{TickInput, tick};
pub use track::{MoveDirection, track_radius};
