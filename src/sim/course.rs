//! Ground elevation profile for the visible field
//!
//! One entry per screen column, left to right. Scrolling drops columns off the
//! left edge and the spawner appends fresh ones on the right.

use std::collections::VecDeque;

/// Per-column elevation levels (0 = base road)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    columns: VecDeque<u8>,
}

impl Course {
    /// A flat course `width` columns wide
    pub fn flat(width: usize, elev: u8) -> Self {
        Self {
            columns: std::iter::repeat_n(elev, width).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Elevation at a screen column; past the right edge the last column repeats
    pub fn elevation(&self, col: usize) -> u8 {
        self.columns
            .get(col)
            .or_else(|| self.columns.back())
            .copied()
            .unwrap_or(0)
    }

    /// Elevation of the rightmost column
    pub fn last(&self) -> u8 {
        self.columns.back().copied().unwrap_or(0)
    }

    /// Drop `n` columns off the left edge
    pub fn shift(&mut self, n: usize) {
        let n = n.min(self.columns.len());
        self.columns.drain(..n);
    }

    /// Append a column on the right edge
    pub fn push(&mut self, elev: u8) {
        self.columns.push_back(elev);
    }

    /// Flatten every visible column to `elev`
    pub fn level(&mut self, elev: u8) {
        self.columns.iter_mut().for_each(|c| *c = elev);
    }

    /// Truncate or extend (repeating the last column) to `width`
    pub fn resize(&mut self, width: usize) {
        let fill = self.last();
        self.columns.resize(width, fill);
    }

    /// Lower any column above `max_elev`
    pub fn clamp_max(&mut self, max_elev: u8) {
        self.columns.iter_mut().for_each(|c| *c = (*c).min(max_elev));
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.columns.iter().copied()
    }
}
