//! Platform abstraction layer
//!
//! Translates raw pointer/keyboard events into the per-tick [`TickInput`]
//! plus the boundary commands the simulation never sees (export, overlay).

use glam::Vec2;

use crate::sim::TickInput;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
    Char(char),
}

/// Raw input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    PointerPressed(Vec2),
    KeyPressed(Key),
}

/// Requests handled outside the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write the session log to disk
    Export,
    /// Show/hide the stats overlay
    ToggleStats,
}

/// Accumulated input between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    input: TickInput,
    commands: Vec<Command>,
    /// Stats overlay visibility
    pub show_stats: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(pos) => self.input.cursor = Some(pos),
            InputEvent::PointerPressed(pos) => {
                self.input.cursor = Some(pos);
                self.input.launch = true;
                self.input.launch_at = Some(pos);
            }
            InputEvent::KeyPressed(Key::Left) => self.input.aim_steps -= 1,
            InputEvent::KeyPressed(Key::Right) => self.input.aim_steps += 1,
            InputEvent::KeyPressed(Key::Space) => self.input.launch = true,
            InputEvent::KeyPressed(Key::Char('d' | 'D')) => self.commands.push(Command::Export),
            InputEvent::KeyPressed(Key::Char('s' | 'S')) => {
                self.show_stats = !self.show_stats;
                self.commands.push(Command::ToggleStats);
            }
            InputEvent::KeyPressed(Key::Char(_)) => {}
        }
    }

    /// Input for the next tick
    pub fn tick_input(&self) -> &TickInput {
        &self.input
    }

    /// Clear one-shot inputs after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.input = TickInput::default();
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
