//! Crossterm backend
//!
//! Every frame is queued cell by cell into a buffered writer and flushed once,
//! inside a synchronized update where the terminal supports it.

use std::io::{self, BufWriter, Stdout, Write};

use anyhow::Context;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::{cursor, queue};

use super::frame::{Frame, Tint};
use super::Renderer;

/// Colour for each tint
pub fn color_of(tint: Tint) -> Color {
    match tint {
        Tint::Plain => Color::Reset,
        Tint::Road => Color::Grey,
        Tint::Bedrock => Color::DarkGrey,
        Tint::Cone => Color::DarkYellow,
        Tint::Enemy => Color::Magenta,
        Tint::Car => Color::Cyan,
        Tint::Shot => Color::Yellow,
        Tint::Hud => Color::White,
        Tint::Banner => Color::Red,
    }
}

/// Draws frames to stdout
pub struct TerminalRenderer {
    out: BufWriter<Stdout>,
    /// Size of the last presented frame; a change forces a full clear
    last_size: Option<(u16, u16)>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
            last_size: None,
        }
    }

    fn queue_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let size = (frame.width(), frame.height());
        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.last_size != Some(size) {
            queue!(self.out, Clear(ClearType::All))?;
            self.last_size = Some(size);
        }

        let mut current: Option<Tint> = None;
        for y in 0..frame.height() {
            queue!(self.out, cursor::MoveTo(0, y))?;
            for glyph in frame.row(y) {
                if current != Some(glyph.tint) {
                    queue!(self.out, SetForegroundColor(color_of(glyph.tint)))?;
                    current = Some(glyph.tint);
                }
                queue!(self.out, Print(glyph.ch))?;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn size(&self) -> anyhow::Result<(u16, u16)> {
        terminal::size().context("failed to query terminal size")
    }

    fn present(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.queue_frame(frame).context("failed to draw frame")?;
        self.out.flush().context("failed to flush frame")?;
        Ok(())
    }
}
