use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::art;
use crate::cart;
use crate::error::{Error, Result};

/// Direction of a single file conversion, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// .art text to .cart bytes.
    Encode,
    /// .cart bytes to .art text.
    Decode,
}

impl Direction {
    /// Picks the conversion direction from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("art") => Ok(Self::Encode),
            Some("cart") => Ok(Self::Decode),
            other => Err(Error::UnknownExtension(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Returns the sibling output path: same directory, same stem, the
/// extension swapped to the direction's target form.
pub fn output_path(input: &Path, direction: Direction) -> PathBuf {
    input.with_extension(match direction {
        Direction::Encode => "cart",
        Direction::Decode => "art",
    })
}

/// Converts one file and returns the path of the written output.
///
/// Each conversion owns its texture and buffers and is independent of any
/// other file; the output is written to a temporary file in the destination
/// directory and renamed over the final path only on full success, so a
/// failed parse never leaves a partial output behind.
pub fn convert_file(input: &Path) -> Result<PathBuf> {
    let direction = Direction::from_path(input)?;
    let bytes = match direction {
        Direction::Encode => {
            let text = fs::read_to_string(input)?;
            cart::encode(&art::parse(&text)?)
        }
        Direction::Decode => {
            let texture = cart::decode(&fs::read(input)?)?;
            texture.to_string().into_bytes()
        }
    };
    let output = output_path(input, direction);
    write_atomic(&output, &bytes)?;
    Ok(output)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path).map_err(|err| Error::from(err.error))?;
    Ok(())
}
