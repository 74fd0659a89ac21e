//! Dilation scoring model
//!
//! Dilation accrues once per active-phase tick as a function of the occupied
//! track and the current tangential speed. The curve is strictly decreasing
//! in both: moving outward always slows accrual, and flying faster always
//! slows it further. Only the outermost track at high speed goes negative,
//! which is what makes a negative-dilation run (and its score multiplier)
//! something the player has to earn.

use crate::consts::{BASE_TANGENTIAL_SPEED, MAX_TANGENTIAL_SPEED, NUM_TRACKS};

/// Per-track accrual at base speed, innermost first
const TRACK_RATE: [f64; NUM_TRACKS] = [1.0, 0.4, 0.05];
/// Per-track speed sensitivity; steeper outward so the curves never cross
const TRACK_DROP: [f64; NUM_TRACKS] = [0.2, 0.3, 0.5];

/// Dilation accrued in one tick at the given track and tangential speed.
pub fn dilation_delta(track: usize, tangential_speed: f32) -> f64 {
    debug_assert!(track < NUM_TRACKS);
    let f = f64::from(tangential_speed - BASE_TANGENTIAL_SPEED)
        / f64::from(MAX_TANGENTIAL_SPEED - BASE_TANGENTIAL_SPEED);
    TRACK_RATE[track] - TRACK_DROP[track] * f
}

/// Final score from the accumulated dilation and boost count.
///
/// A negative dilation total multiplies by its magnitude; zero or positive
/// collapses to a neutral multiplier of one. Zero boosts means zero score.
pub fn final_score(dilation: f64, boost_count: u32) -> u64 {
    let multiplier = if dilation < 0.0 { -dilation } else { 1.0 };
    (multiplier * f64::from(boost_count) * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{HIT_SPEED_PENALTY, MIN_TANGENTIAL_SPEED};
    use proptest::prelude::*;

    #[test]
    fn test_score_examples() {
        assert_eq!(final_score(-50.0, 3), 15_000);
        assert_eq!(final_score(20.0, 5), 500);
        assert_eq!(final_score(0.0, 4), 400);
        assert_eq!(final_score(-100.0, 0), 0);
    }

    #[test]
    fn test_inner_tracks_never_negative() {
        for track in 0..NUM_TRACKS - 1 {
            let mut speed = MIN_TANGENTIAL_SPEED;
            while speed <= MAX_TANGENTIAL_SPEED {
                assert!(dilation_delta(track, speed) > 0.0);
                speed += HIT_SPEED_PENALTY;
            }
        }
    }

    #[test]
    fn test_outermost_goes_negative_only_when_fast() {
        assert!(dilation_delta(NUM_TRACKS - 1, BASE_TANGENTIAL_SPEED) > 0.0);
        assert!(dilation_delta(NUM_TRACKS - 1, MAX_TANGENTIAL_SPEED) < 0.0);
    }

    proptest! {
        /// Strictly decreasing in track index at any fixed reachable speed.
        #[test]
        fn prop_decreasing_in_track(speed in MIN_TANGENTIAL_SPEED..=MAX_TANGENTIAL_SPEED) {
            for track in 1..NUM_TRACKS {
                prop_assert!(dilation_delta(track, speed) < dilation_delta(track - 1, speed));
            }
        }

        /// Strictly decreasing in speed on every track.
        #[test]
        fn prop_decreasing_in_speed(
            track in 0usize..NUM_TRACKS,
            lo in MIN_TANGENTIAL_SPEED..MAX_TANGENTIAL_SPEED,
        ) {
            let hi = lo + 0.5;
            prop_assert!(dilation_delta(track, hi) < dilation_delta(track, lo));
        }
    }
}
