//! Intent buffering between raw input and the tick loop
//!
//! Raw input arrives whenever the platform delivers it; the simulation
//! consumes exactly one [`TickInput`] per tick. Lane changes are queued and
//! released one per tick so a quick double-tap still moves two lanes, while
//! the shield is a level: the last reported state wins.

use std::collections::VecDeque;

use crate::sim::{MoveDirection, TickInput};

/// Lane changes buffered beyond this are dropped
const MAX_QUEUED_MOVES: usize = 3;

/// Accumulates raw intents and doles them out one tick at a time
#[derive(Debug, Default)]
pub struct InputAdapter {
    move_queue: VecDeque<MoveDirection>,
    shield_held: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a lane change. Silently dropped once the buffer is full.
    pub fn queue_move(&mut self, direction: MoveDirection) {
        if self.move_queue.len() < MAX_QUEUED_MOVES {
            self.move_queue.push_back(direction);
        }
    }

    pub fn move_inward(&mut self) {
        self.queue_move(MoveDirection::Inward);
    }

    pub fn move_outward(&mut self) {
        self.queue_move(MoveDirection::Outward);
    }

    /// Report the current shield hold state; last report before a tick wins
    pub fn set_shield_held(&mut self, held: bool) {
        self.shield_held = held;
    }

    /// Build the intent for the next tick, consuming one queued move.
    pub fn sample(&mut self) -> TickInput {
        TickInput {
            move_dir: self.move_queue.pop_front(),
            shield_held: self.shield_held,
        }
    }
}
