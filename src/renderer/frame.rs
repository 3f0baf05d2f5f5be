//! Character grid for one frame

/// Colour role of a glyph; the terminal backend picks the actual colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    #[default]
    Plain,
    Road,
    Bedrock,
    Cone,
    Enemy,
    Car,
    Shot,
    Hud,
    Banner,
}

/// One terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tint: Tint,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph {
        ch: ' ',
        tint: Tint::Plain,
    };
}

/// A full screen of glyphs, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Glyph>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::BLANK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Blank every cell, reallocating if the size changed
    pub fn reset(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            *self = Frame::new(width, height);
        } else {
            self.cells.fill(Glyph::BLANK);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Set one cell; out-of-bounds writes are clipped
    pub fn set(&mut self, x: i32, y: i32, ch: char, tint: Tint) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Glyph { ch, tint };
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Glyph> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Write a string left to right, clipped at the edges
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, tint: Tint) {
        for (i, ch) in text.chars().enumerate() {
            self.set(x + i as i32, y, ch, tint);
        }
    }

    /// Write a string centred on row `y`
    pub fn put_centered(&mut self, y: i32, text: &str, tint: Tint) {
        let len = text.chars().count() as i32;
        let x = (self.width as i32 - len).max(0) / 2;
        self.put_str(x, y, text, tint);
    }

    /// Draw multi-line art with its top-left corner at (x, y); spaces are transparent
    pub fn put_art(&mut self, x: i32, y: i32, art: &[&str], tint: Tint) {
        for (dy, line) in art.iter().enumerate() {
            for (dx, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    self.set(x + dx as i32, y + dy as i32, ch, tint);
                }
            }
        }
    }

    /// Glyphs of row `y`
    pub fn row(&self, y: u16) -> &[Glyph] {
        let start = y as usize * self.width as usize;
        self.cells
            .get(start..start + self.width as usize)
            .unwrap_or(&[])
    }

    /// Text of row `y` (handy in tests)
    pub fn row_string(&self, y: u16) -> String {
        self.row(y).iter().map(|g| g.ch).collect()
    }
}
