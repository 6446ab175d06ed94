//! Character Locomotion
//!
//! This example drives an Idle/Walk/Run machine from a simulated game loop.
//!
//! Key concepts:
//! - Prioritized rules over the owner's speed
//! - At most one rule fires per tick
//! - Observers reporting every committed change
//! - History of time spent in each state
//!
//! Run with: cargo run --example locomotion

use tickwise::builder::StateMachineBuilder;
use tickwise::core::{State, StateId, Transitions};
use tickwise::state_enum;

state_enum! {
    enum Gait {
        Idle,
        Walk,
        Run,
    }
}

struct Character {
    speed: f32,
    stamina: f32,
}

struct Idle;

impl State<Gait, Character> for Idle {
    fn tick(&mut self, owner: &mut Character, dt: f64, _t: &mut Transitions<Gait>) {
        owner.stamina = (owner.stamina + 10.0 * dt as f32).min(100.0);
    }
}

struct Walk;

impl State<Gait, Character> for Walk {}

struct Run;

impl State<Gait, Character> for Run {
    fn tick(&mut self, owner: &mut Character, dt: f64, transitions: &mut Transitions<Gait>) {
        owner.stamina -= 25.0 * dt as f32;
        if owner.stamina <= 0.0 {
            owner.stamina = 0.0;
            transitions.change_state(Gait::Walk);
        }
    }
}

fn main() {
    println!("=== Character Locomotion ===\n");

    let mut machine = StateMachineBuilder::new()
        .state(Gait::Idle, Idle)
        .state(Gait::Walk, Walk)
        .state(Gait::Run, Run)
        .rule(Gait::Idle, Gait::Walk, |c: &Character| c.speed > 0.1, 1)
        .rule(Gait::Walk, Gait::Run, |c: &Character| c.speed > 5.0 && c.stamina > 20.0, 1)
        .rule(Gait::Walk, Gait::Idle, |c: &Character| c.speed <= 0.1, 0)
        .rule(Gait::Run, Gait::Walk, |c: &Character| c.speed <= 5.0, 0)
        .initial(Gait::Idle)
        .build(Character {
            speed: 0.0,
            stamina: 50.0,
        })
        .unwrap();

    machine.observers_mut().subscribe(|change| {
        println!("  [observer] {change}");
    });

    let inputs = [0.0, 2.0, 8.0, 8.0, 8.0, 8.0, 3.0, 0.0];
    for (frame, speed) in inputs.into_iter().enumerate() {
        machine.owner_mut().speed = speed;
        for _ in 0..30 {
            machine.tick(1.0 / 30.0);
        }
        println!(
            "Second {frame}: speed {speed:>4.1}, state {:<4}, stamina {:>5.1}",
            machine.current_state_path(),
            machine.owner().stamina
        );
    }

    println!("\nTime spent before each change:");
    for record in machine.history().records() {
        let from = record.from.map(|id| id.name().to_string()).unwrap_or_default();
        println!(
            "  {from:>4} -> {:<4} after {:.2}s",
            record.to.name(),
            record.time_in_previous
        );
    }

    println!("\n=== Example Complete ===");
}
