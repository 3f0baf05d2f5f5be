//! Keyboard input
//!
//! Input sources report which logical keys are held right now. The
//! [`Controller`] turns successive snapshots into per-tick commands, deriving
//! edge-triggered actions (pause, restart) from the held sets.

use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::sim::TickInput;

/// Logical game keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Jump,
    Shoot,
    Turbo,
    Pause,
    Restart,
    Quit,
}

impl Key {
    pub const ALL: [Key; 6] = [
        Key::Jump,
        Key::Shoot,
        Key::Turbo,
        Key::Pause,
        Key::Restart,
        Key::Quit,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of held keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys(u8);

impl Keys {
    pub const EMPTY: Keys = Keys(0);

    pub fn with(mut self, key: Key) -> Self {
        self.insert(key);
        self
    }

    pub fn insert(&mut self, key: Key) {
        self.0 |= key.bit();
    }

    pub fn remove(&mut self, key: Key) {
        self.0 &= !key.bit();
    }

    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Keys held now that were not held in `prev`
    pub fn pressed_since(&self, prev: Keys) -> Keys {
        Keys(self.0 & !prev.0)
    }

    pub fn union(self, other: Keys) -> Keys {
        Keys(self.0 | other.0)
    }
}

impl FromIterator<Key> for Keys {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        iter.into_iter().fold(Keys::EMPTY, Keys::with)
    }
}

/// Source of held-key snapshots; must never block
pub trait InputSource {
    fn poll(&mut self) -> anyhow::Result<Keys>;
}

/// Map a terminal key to a game key
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::Quit),
            _ => None,
        };
    }
    match code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k' | 'K') => Some(Key::Jump),
        KeyCode::Char(' ' | 'f' | 'F') => Some(Key::Shoot),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l' | 'L') => Some(Key::Turbo),
        KeyCode::Char('p' | 'P') => Some(Key::Pause),
        KeyCode::Char('r' | 'R') => Some(Key::Restart),
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(Key::Quit),
        _ => None,
    }
}

/// How long a key counts as held after its last press or repeat, when the
/// terminal does not report releases
pub const HOLD_WINDOW: Duration = Duration::from_millis(150);

/// Hold window for turbo; outlasts the usual delay before key repeat starts
pub const TURBO_HOLD_WINDOW: Duration = Duration::from_millis(650);

/// Keys that act once per press unless the terminal reports releases
const TAP_KEYS: Keys = Keys(Key::Jump.bit() | Key::Shoot.bit());

/// Keyboard input read from the terminal through crossterm
#[derive(Debug)]
pub struct TerminalInput {
    /// Terminal reports key releases
    enhanced: bool,
    /// Last press or repeat per key
    last_seen: [Option<Instant>; Key::ALL.len()],
    /// Held according to press/release events (enhanced mode)
    held: Keys,
}

impl TerminalInput {
    pub fn new(enhanced: bool) -> Self {
        Self {
            enhanced,
            last_seen: [None; Key::ALL.len()],
            held: Keys::EMPTY,
        }
    }

    /// Fold one key event into the held state; returns the key if it was pressed
    fn apply(&mut self, key: Key, kind: KeyEventKind, now: Instant) -> Option<Key> {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.last_seen[key as usize] = Some(now);
                self.held.insert(key);
                Some(key)
            }
            KeyEventKind::Release => {
                self.held.remove(key);
                None
            }
        }
    }

    /// Keys still inside their hold window at `now`
    fn held_at(&self, now: Instant) -> Keys {
        Key::ALL
            .into_iter()
            .filter(|&key| {
                let window = match key {
                    Key::Turbo => TURBO_HOLD_WINDOW,
                    _ => HOLD_WINDOW,
                };
                self.last_seen[key as usize]
                    .is_some_and(|seen| now.duration_since(seen) < window)
            })
            .collect()
    }

    /// Held keys at `now`, given the keys pressed or repeated since the last poll
    fn snapshot(&self, tapped: Keys, now: Instant) -> Keys {
        if self.enhanced {
            return self.held.union(tapped);
        }
        // Without releases, jump and shoot only count on an actual event
        let held = Keys(self.held_at(now).0 & !TAP_KEYS.0);
        held.union(tapped)
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> anyhow::Result<Keys> {
        let now = Instant::now();
        // A tap pressed and released within one frame still counts once
        let mut tapped = Keys::EMPTY;
        while event::poll(Duration::ZERO).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if let Some(game_key) = map_key(key.code, key.modifiers) {
                    if let Some(pressed) = self.apply(game_key, key.kind, now) {
                        tapped.insert(pressed);
                    }
                }
            }
        }

        Ok(self.snapshot(tapped, now))
    }
}

/// Commands for the next tick(s), derived from one input snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Command {
    pub input: TickInput,
    pub quit: bool,
}

/// Turns held-key snapshots into tick inputs
#[derive(Debug, Default)]
pub struct Controller {
    prev: Keys,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, keys: Keys) -> Command {
        let pressed = keys.pressed_since(self.prev);
        self.prev = keys;
        Command {
            input: TickInput {
                jump: keys.contains(Key::Jump),
                shoot: keys.contains(Key::Shoot),
                turbo: keys.contains(Key::Turbo),
                pause: pressed.contains(Key::Pause),
                restart: pressed.contains(Key::Restart),
            },
            quit: keys.contains(Key::Quit),
        }
    }
}
