use core::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::texture::{Cell, Glyph, Rgba, Texture};

const SIZE: &str = "size";
const SYMBOLS: &str = "symbols";
const FOREGROUND: &str = "foreground color";
const BACKGROUND: &str = "background color";

/// Cursor over the lines of an .art file.
///
/// Each section parser advances it explicitly; the position survives across
/// sections so the parsers chain without re-scanning. Line numbers are
/// 1-based and refer to the original text, comments included.
pub(crate) struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// Returns the next meaningful line and its line number.
    ///
    /// Blank lines and `//` comments are skipped, tabs are normalized to
    /// spaces. The line is not trimmed: in the symbols section a leading
    /// space is a space glyph.
    fn next_meaningful(&mut self) -> Option<(String, usize)> {
        while self.pos < self.lines.len() {
            self.pos += 1;
            let number = self.pos;
            let line = self.lines[number - 1].replace('\t', " ");
            let significant = line.trim();
            if significant.is_empty() || significant.starts_with("//") {
                continue;
            }
            return Some((line, number));
        }
        None
    }
}

/// Parses the four .art sections (size, symbols, foreground, background)
/// into a texture. Any error aborts the whole file.
pub fn parse(text: &str) -> Result<Texture> {
    let mut cursor = LineCursor::new(text);
    let (width, height) = parse_size(&mut cursor)?;
    let glyphs = parse_symbols(&mut cursor, width, height)?;
    let foregrounds = parse_colors(&mut cursor, width, height, FOREGROUND)?;
    let backgrounds = parse_colors(&mut cursor, width, height, BACKGROUND)?;
    let cells = glyphs
        .into_iter()
        .zip(foregrounds)
        .zip(backgrounds)
        .map(|((glyph, foreground), background)| Cell {
            glyph,
            foreground,
            background,
        })
        .collect();
    Texture::new(width, height, cells)
}

/// Size section: one line of exactly two positive integers, `width height`.
fn parse_size(cursor: &mut LineCursor) -> Result<(usize, usize)> {
    let (line, _) = cursor
        .next_meaningful()
        .ok_or(Error::TruncatedFile { section: SIZE })?;
    let malformed = || Error::MalformedSize(line.trim().into());
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(malformed());
    }
    // usize::from_str rejects negative values along with everything else
    // that is not an integer.
    let width = tokens[0].parse::<usize>().map_err(|_| malformed())?;
    let height = tokens[1].parse::<usize>().map_err(|_| malformed())?;
    if width == 0 || height == 0 {
        return Err(malformed());
    }
    Ok((width, height))
}

/// Symbols section: `height` lines of `width` glyphs, row-major.
fn parse_symbols(cursor: &mut LineCursor, width: usize, height: usize) -> Result<Vec<Glyph>> {
    let mut glyphs = Vec::with_capacity(width * height);
    for _ in 0..height {
        let (line, number) = cursor
            .next_meaningful()
            .ok_or(Error::TruncatedFile { section: SYMBOLS })?;
        glyphs.extend(parse_symbol_row(&line, number, width)?);
    }
    Ok(glyphs)
}

/// Decodes one symbols row, two characters at a time.
///
/// The first character of a pair is the candidate glyph, the second is the
/// separator: a space keeps the glyph literal, a hex digit turns the pair
/// into a byte code, anything else is malformed. A trailing odd character
/// is a literal glyph with an implied space separator.
fn parse_symbol_row(line: &str, number: usize, width: usize) -> Result<Vec<Glyph>> {
    let mut glyphs = Vec::with_capacity(width);
    let mut chars = line.chars();
    while let Some(glyph) = chars.next() {
        let column = 2 * glyphs.len() + 1;
        match chars.next() {
            None | Some(' ') => glyphs.push(Glyph::Char(glyph)),
            Some(separator) if separator.is_ascii_hexdigit() => {
                let hi = glyph.to_digit(16).ok_or(Error::MalformedSymbol {
                    line: number,
                    column,
                })?;
                let lo = separator.to_digit(16).unwrap();
                glyphs.push(Glyph::Code((hi << 4 | lo) as u8));
            }
            Some(_) => {
                return Err(Error::MalformedSymbol {
                    line: number,
                    column,
                })
            }
        }
    }
    if glyphs.len() != width {
        return Err(Error::RowLengthMismatch {
            section: SYMBOLS,
            line: number,
            expected: width,
            found: glyphs.len(),
        });
    }
    Ok(glyphs)
}

/// Color section: `height` lines of `width` whitespace-separated tokens.
/// The foreground and background sections share this grammar.
fn parse_colors(
    cursor: &mut LineCursor,
    width: usize,
    height: usize,
    section: &'static str,
) -> Result<Vec<Rgba>> {
    let mut colors = Vec::with_capacity(width * height);
    for _ in 0..height {
        let (line, number) = cursor
            .next_meaningful()
            .ok_or(Error::TruncatedFile { section })?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(Error::RowLengthMismatch {
                section,
                line: number,
                expected: width,
                found: tokens.len(),
            });
        }
        for token in tokens {
            colors.push(parse_color_token(token).ok_or(Error::MalformedColor {
                section,
                line: number,
            })?);
        }
    }
    Ok(colors)
}

/// Splits a token into 2-hex-digit channel groups; exactly 3 groups (RGB,
/// alpha defaulted to 255) or 4 groups (RGBA) are accepted.
fn parse_color_token(token: &str) -> Option<Rgba> {
    let groups: Vec<&[u8]> = token.as_bytes().chunks(2).collect();
    if groups.len() != 3 && groups.len() != 4 {
        return None;
    }
    let mut channels = [0xFFu8; 4];
    for (i, group) in groups.iter().enumerate() {
        let group = std::str::from_utf8(group).ok()?;
        channels[i] = u8::from_str_radix(group, 16).ok()?;
    }
    Some(Rgba(channels))
}

impl FromStr for Texture {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl fmt::Display for Texture {
    /// Writes the texture in .art format: size, symbols, foreground and
    /// background sections, each preceded by a banner comment. Comments of
    /// the source file are not carried over; round-trips are semantic, not
    /// byte-identical.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "// size")?;
        writeln!(f, "{} {}", self.width, self.height)?;

        writeln!(f, "\n// symbols")?;
        for row in 0..self.height {
            for column in 0..self.width {
                match self.cell(row, column).glyph {
                    Glyph::Char(ch) if ch.len_utf8() == 1 => write!(f, "{} ", ch)?,
                    glyph => write!(f, "{:02x}", glyph.hex_byte().unwrap_or(b' '))?,
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "\n// foreground")?;
        self.fmt_color_section(f, |cell| cell.foreground)?;

        writeln!(f, "\n// background")?;
        self.fmt_color_section(f, |cell| cell.background)?;
        Ok(())
    }
}

impl Texture {
    fn fmt_color_section(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        channel: impl Fn(&Cell) -> Rgba,
    ) -> std::fmt::Result {
        for row in 0..self.height {
            for column in 0..self.width {
                if column > 0 {
                    write!(f, " ")?;
                }
                let [r, g, b, a] = channel(self.cell(row, column)).channels();
                write!(f, "{:02x}{:02x}{:02x}{:02x}", r, g, b, a)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASIC: &str = "\
// a 3x2 texture
3 2

A B C
D E F

// foreground
ff0080 00ff00 0000ff
ffffff 000000 80808040

// background
000000 000000 000000
111111 111111 111111
";

    #[test]
    fn parses_well_formed_file() {
        let tex = parse(BASIC).unwrap();
        assert_eq!(tex.width(), 3);
        assert_eq!(tex.height(), 2);
        assert_eq!(tex.cell(0, 0).glyph, Glyph::Char('A'));
        assert_eq!(tex.cell(1, 2).glyph, Glyph::Char('F'));
        // 3-channel token gets alpha 255, 4-channel keeps its own
        assert_eq!(tex.cell(0, 0).foreground, Rgba([0xFF, 0x00, 0x80, 0xFF]));
        assert_eq!(tex.cell(1, 2).foreground, Rgba([0x80, 0x80, 0x80, 0x40]));
        assert_eq!(tex.cell(1, 0).background, Rgba([0x11, 0x11, 0x11, 0xFF]));
    }

    #[test]
    fn size_must_be_two_positive_integers() {
        assert!(matches!(
            parse("3\nA \nff0000\n000000\n"),
            Err(Error::MalformedSize(_))
        ));
        assert!(matches!(
            parse("3 2 1\n"),
            Err(Error::MalformedSize(_))
        ));
        assert!(matches!(parse("3 x\n"), Err(Error::MalformedSize(_))));
        assert!(matches!(parse("-3 2\n"), Err(Error::MalformedSize(_))));
        assert!(matches!(parse("0 2\n"), Err(Error::MalformedSize(_))));
    }

    #[test]
    fn hex_pair_becomes_byte_code() {
        let tex = parse("2 1\nA 1F\nff0000 ff0000\n000000 000000\n").unwrap();
        assert_eq!(tex.cell(0, 0).glyph, Glyph::Char('A'));
        assert_eq!(tex.cell(0, 1).glyph, Glyph::Code(0x1F));
    }

    #[test]
    fn trailing_odd_character_is_a_glyph() {
        let tex = parse("3 1\nA B C\nff0000 ff0000 ff0000\n000000 000000 000000\n").unwrap();
        assert_eq!(tex.cell(0, 2).glyph, Glyph::Char('C'));
    }

    #[test]
    fn space_glyphs_survive() {
        let tex = parse("2 1\n  X \nff0000 ff0000\n000000 000000\n").unwrap();
        assert_eq!(tex.cell(0, 0).glyph, Glyph::Char(' '));
        assert_eq!(tex.cell(0, 1).glyph, Glyph::Char('X'));
    }

    #[test]
    fn bad_separator_is_malformed_symbol() {
        let err = parse("2 1\nA#B \nff0000 ff0000\n000000 000000\n").unwrap_err();
        assert!(matches!(err, Error::MalformedSymbol { line: 2, column: 1 }));
    }

    #[test]
    fn non_hex_glyph_before_hex_separator_is_malformed_symbol() {
        let err = parse("1 1\nG1\nff0000\n000000\n").unwrap_err();
        assert!(matches!(err, Error::MalformedSymbol { line: 2, .. }));
    }

    #[test]
    fn row_length_must_match_declared_width() {
        let err = parse("3 1\nA B \nff0000 ff0000 ff0000\n000000 000000 000000\n").unwrap_err();
        assert!(matches!(
            err,
            Error::RowLengthMismatch {
                section: "symbols",
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn color_row_length_must_match_declared_width() {
        let err = parse("2 1\nA B \nff0000\n000000 000000\n").unwrap_err();
        assert!(matches!(
            err,
            Error::RowLengthMismatch {
                section: "foreground color",
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn color_tokens_need_three_or_four_groups() {
        assert_eq!(parse_color_token("FF0080"), Some(Rgba([255, 0, 128, 255])));
        assert_eq!(
            parse_color_token("FF008040"),
            Some(Rgba([255, 0, 128, 64]))
        );
        assert_eq!(parse_color_token("FF00"), None);
        assert_eq!(parse_color_token("FF0080FF00"), None);
        assert_eq!(parse_color_token("GG0000"), None);
    }

    #[test]
    fn bad_color_token_reports_section_and_line() {
        let err = parse("1 1\nA \nzz0000\n000000\n").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedColor {
                section: "foreground color",
                line: 3,
            }
        ));
    }

    #[test]
    fn comments_and_blank_lines_skipped_inside_sections() {
        let text = "\
// header comment
2 2

A B
// between rows
C D

ff0000 00ff00

0000ff ffffff
000000 000000
// tail
101010 202020
";
        let tex = parse(text).unwrap();
        assert_eq!(tex.cell(1, 1).glyph, Glyph::Char('D'));
        assert_eq!(tex.cell(1, 1).background, Rgba([0x20, 0x20, 0x20, 0xFF]));
    }

    #[test]
    fn truncated_sections_reported_by_name() {
        assert!(matches!(
            parse(""),
            Err(Error::TruncatedFile { section: "size" })
        ));
        assert!(matches!(
            parse("2 2\nA B \n"),
            Err(Error::TruncatedFile { section: "symbols" })
        ));
        assert!(matches!(
            parse("1 1\nA \n"),
            Err(Error::TruncatedFile {
                section: "foreground color"
            })
        ));
        assert!(matches!(
            parse("1 1\nA \nff0000\n"),
            Err(Error::TruncatedFile {
                section: "background color"
            })
        ));
    }

    #[test]
    fn write_then_parse_is_identity() {
        let tex = parse(BASIC).unwrap();
        let reparsed: Texture = tex.to_string().parse().unwrap();
        assert_eq!(reparsed, tex);
    }

    #[test]
    fn writes_codes_as_hex_and_chars_verbatim() {
        let tex = parse("2 1\nX 1f\nff0000 00ff0080\n000000 000000\n").unwrap();
        let text = tex.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "2 1");
        assert_eq!(lines[4], "X 1f");
        assert_eq!(lines[7], "ff0000ff 00ff0080");
        assert_eq!(lines[10], "000000ff 000000ff");
    }

    #[test]
    fn multibyte_char_written_as_leading_byte_hex() {
        let tex = parse("1 1\né \nff0000\n000000\n").unwrap();
        assert_eq!(tex.cell(0, 0).glyph, Glyph::Char('é'));
        let reparsed: Texture = tex.to_string().parse().unwrap();
        assert_eq!(reparsed.cell(0, 0).glyph, Glyph::Code(0xC3));
    }
}
