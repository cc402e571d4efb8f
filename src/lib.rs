//! A library for converting PNG images into multi-resolution ICO files.
//!
//! Each source image is resized to a fixed set of square sizes (16, 32, 48,
//! 64, 128, and 256 pixels by default), and every copy is stored in the ICO
//! file as an uncompressed 32-bpp BMP followed by a one-byte-per-pixel mask.
//!
//! ```no_run
//! use pngico::{convert_dir, IconEncoder};
//! use std::path::Path;
//!
//! let encoder = IconEncoder::new();
//! let report =
//!     convert_dir(Path::new("pngs"), Path::new("icons"), &encoder).unwrap();
//! for error in report.failed() {
//!     eprintln!("{}", error);
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bitmap;
mod convert;
mod encoder;
mod icondir;
mod sizes;
mod source;

pub use crate::bitmap::{
    encode_bitmap, BitmapHeader, EncodedBitmap, MaskPolicy, BITS_PER_PIXEL,
    BMP_HEADER_LEN,
};
pub use crate::convert::{convert_dir, convert_file, BatchReport, ConvertError};
pub use crate::encoder::IconEncoder;
pub use crate::icondir::{
    write_icon, IconDir, IconDirEntry, ICONDIRENTRY_LEN, ICONDIR_LEN,
};
pub use crate::sizes::{size_byte, IconSizes, MAX_ICON_SIZE};
pub use crate::source::read_png;
pub use image::imageops::FilterType;

/// An in-memory image with 16-bit red, green, blue, and alpha channels.
pub type Rgba16Image = image::ImageBuffer<image::Rgba<u16>, Vec<u16>>;

//===========================================================================//
