use crate::error::{Error, Result};
use crate::texture::{Cell, Glyph, Rgba, Texture};

/// Tag bytes opening every .cart stream.
pub const MAGIC: [u8; 4] = *b"CART";

/// Serializes a texture to the .cart layout: the `CART` tag, width and
/// height as little-endian u64, then cell records in column-major order
/// (outer column, inner row). Each record is the glyph bytes followed by
/// 4 foreground and 4 background channel bytes.
pub fn encode(texture: &Texture) -> Vec<u8> {
    // glyphs are mostly 1 byte; 9 is the exact record size for those
    let mut out = Vec::with_capacity(MAGIC.len() + 16 + texture.width() * texture.height() * 9);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(texture.width() as u64).to_le_bytes());
    out.extend_from_slice(&(texture.height() as u64).to_le_bytes());
    for column in 0..texture.width() {
        for row in 0..texture.height() {
            let cell = texture.cell(row, column);
            match cell.glyph {
                // No length prefix: the decoder infers the byte count from
                // the UTF-8 encoding of the leading byte. A raw code byte
                // in the ASCII range is indistinguishable from a literal
                // character on the wire, and a code byte >= 0x80 can fuse
                // with the color bytes that follow it into a multi-byte
                // character. Kept as-is for compatibility with existing
                // .cart files.
                Glyph::Char(ch) => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
                Glyph::Code(code) => out.push(code),
            }
            out.extend_from_slice(&cell.foreground.channels());
            out.extend_from_slice(&cell.background.channels());
        }
    }
    out
}

/// Deserializes a .cart byte stream back into a texture, re-indexing the
/// column-major cell records into row-major order.
pub fn decode(bytes: &[u8]) -> Result<Texture> {
    let mut stream = Stream::new(bytes);

    let tag = stream.take(MAGIC.len(), 0, 0)?;
    if tag != &MAGIC[..] {
        return Err(Error::BadMagic([tag[0], tag[1], tag[2], tag[3]]));
    }
    let width = stream.take_u64(0, 0)? as usize;
    let height = stream.take_u64(0, 0)? as usize;
    let cells_expected = width
        .checked_mul(height)
        .filter(|total| *total > 0)
        .ok_or(Error::EmptyTexture { width, height })?;

    // every record takes at least one byte; reject headers that promise
    // more cells than there are bytes before allocating the cell buffer
    if stream.remaining() < cells_expected {
        return Err(Error::TruncatedStream {
            cells_read: 0,
            cells_expected,
        });
    }

    let mut cells = vec![Cell::default(); cells_expected];
    let mut cells_read = 0;
    for column in 0..width {
        for row in 0..height {
            let glyph = stream.take_glyph(cells_read, cells_expected)?;
            let foreground = Rgba(stream.take_rgba(cells_read, cells_expected)?);
            let background = Rgba(stream.take_rgba(cells_read, cells_expected)?);
            // explicit transpose back into the row-major texture
            cells[row * width + column] = Cell {
                glyph,
                foreground,
                background,
            };
            cells_read += 1;
        }
    }
    Texture::new(width, height, cells)
}

/// Byte stream with an explicit read position.
struct Stream<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Stream<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize, cells_read: usize, cells_expected: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(Error::TruncatedStream {
                cells_read,
                cells_expected,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_u64(&mut self, cells_read: usize, cells_expected: usize) -> Result<u64> {
        let bytes = self.take(8, cells_read, cells_expected)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn take_rgba(&mut self, cells_read: usize, cells_expected: usize) -> Result<[u8; 4]> {
        let bytes = self.take(4, cells_read, cells_expected)?;
        Ok(bytes.try_into().unwrap())
    }

    /// Decodes the next glyph from a 4-byte lookahead window.
    ///
    /// If the window's leading byte opens a valid UTF-8 sequence, that
    /// character is the glyph and exactly its encoded length is consumed;
    /// otherwise the single leading byte is a raw code. Only the glyph's
    /// own bytes are removed from the stream, since the color bytes after
    /// it may themselves look like the tail of a longer character.
    fn take_glyph(&mut self, cells_read: usize, cells_expected: usize) -> Result<Glyph> {
        let remaining = &self.bytes[self.pos.min(self.bytes.len())..];
        if remaining.is_empty() {
            return Err(Error::TruncatedStream {
                cells_read,
                cells_expected,
            });
        }
        let window = &remaining[..remaining.len().min(4)];
        let leading = match std::str::from_utf8(window) {
            Ok(s) => s.chars().next(),
            Err(err) if err.valid_up_to() > 0 => {
                // the window straddles a character boundary; the valid
                // prefix still holds the leading character whole
                std::str::from_utf8(&window[..err.valid_up_to()])
                    .unwrap()
                    .chars()
                    .next()
            }
            Err(_) => None,
        };
        match leading {
            Some(ch) => {
                self.pos += ch.len_utf8();
                Ok(Glyph::Char(ch))
            }
            None => {
                self.pos += 1;
                Ok(Glyph::Code(window[0]))
            }
        }
    }
}
