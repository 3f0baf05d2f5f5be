//! Terminal mode guard
//!
//! Raw mode, the alternate screen and the hidden cursor are acquired together
//! and released together, on every exit path including panics. Termination
//! signals only raise a flag; the game loop sees it and unwinds normally.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, terminal};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

/// Keyboard enhancement flags are currently pushed
static FLAGS_PUSHED: AtomicBool = AtomicBool::new(false);

/// Raise the returned flag on SIGTERM, SIGINT and SIGHUP
///
/// A second signal while the flag is already up exits at once.
pub fn quit_on_signals() -> anyhow::Result<Arc<AtomicBool>> {
    let quit = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    let signals = [SIGTERM, SIGINT, signal_hook::consts::SIGHUP];
    #[cfg(not(unix))]
    let signals = [SIGTERM, SIGINT];
    for sig in signals {
        flag::register_conditional_shutdown(sig, 1, Arc::clone(&quit))
            .with_context(|| format!("failed to register handler for signal {sig}"))?;
        flag::register(sig, Arc::clone(&quit))
            .with_context(|| format!("failed to register handler for signal {sig}"))?;
    }
    Ok(quit)
}

/// RAII guard over the terminal's interactive mode
#[derive(Debug)]
pub struct TerminalSession {
    /// Terminal reports key release events
    enhanced: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen
    pub fn enter() -> anyhow::Result<Self> {
        install_panic_hook();

        // Guard exists before any mode change, so a failure below still restores
        let mut session = Self { enhanced: false };
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )
        .context("failed to enter alternate screen")?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )
            .context("failed to enable key release events")?;
            FLAGS_PUSHED.store(true, Ordering::SeqCst);
            session.enhanced = true;
        }
        log::info!(
            "Terminal session started (release events: {})",
            session.enhanced
        );
        Ok(session)
    }

    /// Whether key releases are reported
    pub fn enhanced(&self) -> bool {
        self.enhanced
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        pop_flags();
        restore();
        log::info!("Terminal restored");
    }
}

/// Pop the keyboard enhancement flags if this process pushed them
fn pop_flags() {
    if take_pushed_flags() {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
}

fn take_pushed_flags() -> bool {
    FLAGS_PUSHED.swap(false, Ordering::SeqCst)
}

/// Put the terminal back into cooked mode; safe to call more than once
fn restore() {
    let mut out = io::stdout();
    let _ = execute!(
        out,
        terminal::EnableLineWrap,
        cursor::Show,
        terminal::LeaveAlternateScreen,
    );
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

/// Restore the terminal before the default hook prints the panic message
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        pop_flags();
        restore();
        default_hook(info);
    }));
}
