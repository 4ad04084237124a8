pub mod art;
pub mod cart;
pub mod convert;
pub mod error;
pub mod texture;

pub use error::{Error, Result};
pub use texture::{Cell, Glyph, Rgba, Texture};
