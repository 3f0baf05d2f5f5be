//! Terminal rendering module
//!
//! The scene is drawn into a [`Frame`] (a plain character grid) and a
//! [`Renderer`] puts the finished frame on screen in one go.

pub mod frame;
pub mod scene;
pub mod terminal;

pub use frame::{Frame, Glyph, Tint};
pub use terminal::TerminalRenderer;

/// Something that can show a frame
pub trait Renderer {
    /// Current drawable size as (columns, rows)
    fn size(&self) -> anyhow::Result<(u16, u16)>;

    /// Display a complete frame; never leaves a partial frame visible
    fn present(&mut self, frame: &Frame) -> anyhow::Result<()>;
}
