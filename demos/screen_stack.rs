//! Screen Stack
//!
//! This example layers menus over gameplay with a hierarchical machine.
//!
//! Key concepts:
//! - Push pauses the covered screen instead of exiting it
//! - Pop resumes it with its progress intact
//! - A sub-state slot inside gameplay (enemy AI)
//! - Paths reporting every active state, root to leaf
//!
//! Run with: cargo run --example screen_stack

use tickwise::core::{HierarchicalState, State, Transitions};
use tickwise::machine::{HierarchicalMachine, SubStates};
use tickwise::state_enum;

state_enum! {
    enum Screen {
        Gameplay,
        Pause,
        Settings,
        Patrol,
        Chase,
    }
}

#[derive(Default)]
struct Game {
    enemy_near: bool,
}

struct Gameplay {
    frames: u32,
    ai: SubStates<Screen, Game>,
}

impl State<Screen, Game> for Gameplay {
    fn initialize(&mut self, game: &mut Game) {
        self.ai.add(Screen::Patrol, Patrol, game).unwrap();
        self.ai.add(Screen::Chase, Chase, game).unwrap();
    }

    fn enter(&mut self, game: &mut Game, transitions: &mut Transitions<Screen>) {
        self.frames = 0;
        self.ai.change(Screen::Patrol, game, transitions).unwrap();
    }

    fn tick(&mut self, game: &mut Game, _dt: f64, transitions: &mut Transitions<Screen>) {
        self.frames += 1;
        let next = if game.enemy_near {
            Screen::Chase
        } else {
            Screen::Patrol
        };
        self.ai.change(next, game, transitions).unwrap();
    }
}

impl HierarchicalState<Screen, Game> for Gameplay {
    fn pause(&mut self, _game: &mut Game, _t: &mut Transitions<Screen>) {
        println!("  gameplay paused after {} frames", self.frames);
    }

    fn resume(&mut self, _game: &mut Game, _t: &mut Transitions<Screen>) {
        println!("  gameplay resumed at frame {}", self.frames);
    }

    fn sub_states(&self) -> Option<&SubStates<Screen, Game>> {
        Some(&self.ai)
    }

    fn sub_states_mut(&mut self) -> Option<&mut SubStates<Screen, Game>> {
        Some(&mut self.ai)
    }
}

struct Patrol;
impl State<Screen, Game> for Patrol {}
impl HierarchicalState<Screen, Game> for Patrol {}

struct Chase;
impl State<Screen, Game> for Chase {}
impl HierarchicalState<Screen, Game> for Chase {}

struct Menu;
impl State<Screen, Game> for Menu {}
impl HierarchicalState<Screen, Game> for Menu {}

fn main() {
    println!("=== Screen Stack ===\n");

    let mut machine = HierarchicalMachine::new(Game::default());
    machine
        .add_state(
            Screen::Gameplay,
            Gameplay {
                frames: 0,
                ai: SubStates::new(),
            },
        )
        .unwrap();
    machine.add_state(Screen::Pause, Menu).unwrap();
    machine.add_state(Screen::Settings, Menu).unwrap();

    machine.start(Screen::Gameplay).unwrap();
    println!("Started:       {}", machine.current_state_path());

    for _ in 0..10 {
        machine.tick(1.0 / 60.0);
    }
    machine.owner_mut().enemy_near = true;
    machine.tick(1.0 / 60.0);
    println!("Enemy spotted: {}", machine.current_state_path());

    machine.push_state(Screen::Pause).unwrap();
    machine.push_state(Screen::Settings).unwrap();
    println!("Menus open:    {}", machine.current_state_path());

    // Only the top frame ticks while menus are open.
    for _ in 0..100 {
        machine.tick(1.0 / 60.0);
    }

    machine.pop_state().unwrap();
    machine.pop_state().unwrap();
    println!("Menus closed:  {}", machine.current_state_path());

    if let Err(error) = machine.push_state(Screen::Gameplay) {
        println!("Rejected push: {error}");
    }

    println!("\nHistory:");
    for record in machine.history().records() {
        println!("  {:?} -> {:?} ({})", record.from, record.to, record.kind);
    }

    println!("\n=== Example Complete ===");
}
