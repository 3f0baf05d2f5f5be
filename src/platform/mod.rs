//! Platform abstraction layer
//!
//! Everything that touches the real terminal or the wall clock:
//! - Frame pacing
//! - Keyboard input
//! - Terminal mode setup and restore, and termination signals

pub mod clock;
pub mod input;
pub mod terminal;

pub use clock::FrameClock;
pub use input::{Command, Controller, InputSource, Key, Keys, TerminalInput};
pub use terminal::{TerminalSession, quit_on_signals};
