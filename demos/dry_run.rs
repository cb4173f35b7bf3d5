//! Dry run of a G-code drawing.
//!
//! Feeds a G-code file (or a built-in drawing) through the plotter with
//! simulated motors and reports step counts and the time the drawing would
//! take on the real machine.
//!
//! Run with: `cargo run --example dry_run -- drawing.gcode [spherebot.toml]`

use std::io::Read;

use spherebot_motion::{
    axis::{AxisBuilder, SimulatedActuator},
    config::MachineConfig,
    error::Result,
    pen::SimulatedPen,
    Plotter,
};

/// Built-in drawing: a small square with the pen going up and down.
const SQUARE: &str = "\
(square)
G90
M300 S145
G0 X100 Y-50 F775
M300 S115
G1 X300 F300
G1 Y50
G1 X100
G1 Y-50
M300 S145
G0 X0 Y0
M18
";

/// Delay provider that only adds up the requested time.
#[derive(Default)]
struct ClockDelay {
    ns: u64,
}

impl embedded_hal::delay::DelayNs for ClockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }
}

fn main() -> Result<()> {
    println!("=== SphereBot Dry Run ===\n");

    let mut args = std::env::args().skip(1);
    let program = match args.next() {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("cannot read {}: {}", path, e);
            std::process::exit(1);
        }),
        None if atty_stdin() => SQUARE.to_string(),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .unwrap_or_default();
            input
        }
    };

    let config = match args.next() {
        Some(path) => spherebot_motion::load_config(path)?,
        None => MachineConfig::default(),
    };

    println!("Configuration:");
    println!(
        "  Rotation: {} steps/rev{}",
        config.rotation.total_steps_per_revolution(),
        if config.rotation.wraps { ", wraps" } else { "" }
    );
    println!(
        "  Feedrate: {} steps/s default, {} steps/s max",
        config.motion.default_feedrate.value(),
        config.motion.max_feedrate.value()
    );
    println!("  Zoom: {}\n", config.motion.zoom_factor);

    let rotation = AxisBuilder::new()
        .actuator(SimulatedActuator::new())
        .from_axis_config(&config.rotation)
        .build()?;
    let pen_arm = AxisBuilder::new()
        .actuator(SimulatedActuator::new())
        .from_axis_config(&config.pen_arm)
        .build()?;

    let mut plotter = Plotter::new(
        rotation,
        pen_arm,
        ClockDelay::default(),
        SimulatedPen::new(),
        config,
    )?;

    let mut moves = 0u32;
    let mut errors = 0u32;
    for (number, line) in program.lines().enumerate() {
        for byte in line.bytes().chain(std::iter::once(b'\n')) {
            match plotter.feed(byte) {
                Ok(Some(report)) if !report.is_noop() => moves += 1,
                Ok(_) => {}
                Err(e) => {
                    errors += 1;
                    eprintln!("line {}: {}", number + 1, e);
                }
            }
        }
    }

    let pen_moves = plotter.pen().moves();
    let (mut engine, _) = plotter.into_parts();
    let seconds = engine.delay_mut().ns as f64 / 1e9;
    let (x, y, _) = engine.into_parts();

    println!("Result:");
    println!("  Moves: {} ({} errors)", moves, errors);
    println!(
        "  Rotation: {} steps forward, {} backward, ends at {}",
        x.actuator().forward_steps(),
        x.actuator().backward_steps(),
        x.position().value()
    );
    println!(
        "  Pen arm: {} steps forward, {} backward, ends at {}",
        y.actuator().forward_steps(),
        y.actuator().backward_steps(),
        y.position().value()
    );
    println!("  Pen servo moves: {}", pen_moves);
    println!("  Time spent waiting between steps: {:.1} s", seconds);

    println!("\n=== Dry Run Complete ===");
    Ok(())
}

/// True when nothing is piped in.
fn atty_stdin() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal()
}
