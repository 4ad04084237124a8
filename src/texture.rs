use crate::error::{Error, Result};

/// A color as four channels in R,G,B,A order, one byte each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Creates an opaque color from three channels, defaulting alpha to 255.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 0xFF])
    }

    /// Returns the channels in R,G,B,A order.
    pub fn channels(&self) -> [u8; 4] {
        self.0
    }
}

/// Opaque black.
impl Default for Rgba {
    fn default() -> Self {
        Self([0, 0, 0, 0xFF])
    }
}

/// A cell's displayed symbol: either a literal character or a raw byte code
/// (the form an .art file writes as two hex digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Char(char),
    Code(u8),
}

impl Glyph {
    /// Returns the byte the .art writer emits as a two-digit hex pair,
    /// or `None` when the glyph is a plain single-byte character.
    ///
    /// A multi-byte character collapses to its leading UTF-8 byte here;
    /// the .art symbol grammar has no wider representation for it.
    pub fn hex_byte(&self) -> Option<u8> {
        match self {
            Glyph::Code(code) => Some(*code),
            Glyph::Char(ch) if ch.len_utf8() > 1 => {
                let mut buf = [0u8; 4];
                ch.encode_utf8(&mut buf);
                Some(buf[0])
            }
            Glyph::Char(_) => None,
        }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::Char(' ')
    }
}

/// One grid position: glyph plus foreground and background colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: Glyph,
    pub foreground: Rgba,
    pub background: Rgba,
}

/// An in-memory W×H character-map texture, stored row-major.
///
/// Constructed wholly by the .art parser or the .cart decoder and consumed
/// by the opposite direction; it is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: Vec<Cell>,
}

impl Texture {
    /// Creates a texture from row-major cells.
    /// Fails if either dimension is zero.
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyTexture { width, height });
        }
        debug_assert_eq!(cells.len(), width * height);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Returns the width of the texture in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the texture in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at (row, column).
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.cells[row * self.width + column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rgb_defaults_alpha_to_opaque() {
        assert_eq!(Rgba::rgb(255, 0, 128).channels(), [255, 0, 128, 255]);
    }

    #[test]
    fn zero_sizes_rejected() {
        assert!(matches!(
            Texture::new(0, 3, Vec::new()),
            Err(Error::EmptyTexture { width: 0, height: 3 })
        ));
        assert!(matches!(
            Texture::new(3, 0, Vec::new()),
            Err(Error::EmptyTexture { width: 3, height: 0 })
        ));
    }

    #[test]
    fn cells_indexed_row_major() {
        let cells: Vec<Cell> = "abcdef"
            .chars()
            .map(|ch| Cell {
                glyph: Glyph::Char(ch),
                ..Cell::default()
            })
            .collect();
        let tex = Texture::new(3, 2, cells).unwrap();
        assert_eq!(tex.cell(0, 2).glyph, Glyph::Char('c'));
        assert_eq!(tex.cell(1, 0).glyph, Glyph::Char('d'));
    }

    #[test]
    fn hex_byte_forms() {
        assert_eq!(Glyph::Char('A').hex_byte(), None);
        assert_eq!(Glyph::Code(0x1F).hex_byte(), Some(0x1F));
        // 'é' encodes as c3 a9
        assert_eq!(Glyph::Char('é').hex_byte(), Some(0xC3));
    }
}
