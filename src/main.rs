//! Headless run driver
//!
//! Plays one full run with a simple reflex pilot and prints the final report
//! as JSON. Useful for balancing passes and determinism checks:
//! the same seed always prints the same report.
//!
//! Usage: black-hole-run [seed]

use log::{debug, info};

use black_hole_run::consts::{NUM_TRACKS, SHIP_RADIUS, TICK_HZ};
use black_hole_run::sim::{self, RunPhase, RunState, track_radius};
use black_hole_run::{InputAdapter, angular_distance};

/// Hold the shield when a hazard is closer than this along the track
const THREAT_ARC: f32 = 120.0;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xB1AC_4013);
    info!("starting run, seed={seed}");

    let mut state = RunState::new(seed);
    let mut input = InputAdapter::new();

    // Head for the outermost track; that is where negative dilation lives
    for _ in 0..NUM_TRACKS {
        input.move_outward();
    }

    while state.phase != RunPhase::Terminal {
        input.set_shield_held(threat_nearby(&state));
        sim::tick(&mut state, input.sample());
        for event in state.drain_events() {
            debug!("tick {}: {event:?}", state.time_ticks);
        }
    }

    if let Some(report) = state.final_report {
        info!(
            "finished after {:.1}s of play",
            f64::from(report.survival_ticks) / f64::from(TICK_HZ)
        );
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("report serialization failed: {err}"),
        }
    }
}

/// Anything dangerous on the ship's track within the threat arc?
fn threat_nearby(state: &RunState) -> bool {
    let ship = &state.ship;
    state.obstacles.iter().any(|o| {
        o.track == ship.track
            && o.on_track()
            && angular_distance(o.angle, ship.angle) * track_radius(o.track)
                < THREAT_ARC + o.body_radius() + SHIP_RADIUS
    })
}
