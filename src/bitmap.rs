use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use image::{GenericImageView, Rgba};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

//===========================================================================//

/// The size of a BITMAPINFOHEADER struct, in bytes.
pub const BMP_HEADER_LEN: u32 = 40;

/// The color depth of every bitmap this crate writes.
pub const BITS_PER_PIXEL: u16 = 32;

// Mask byte values.  Under the ICO AND-mask convention a zero leaves the
// color pixel visible.
const MASK_VISIBLE: u8 = 0x00;
const MASK_HIDDEN: u8 = 0xff;

//===========================================================================//

/// How the mask blob that follows each bitmap is filled in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum MaskPolicy {
    /// Every mask byte is zero, whatever the pixel's alpha.  Transparency is
    /// then carried by the 32-bpp alpha channel alone.  This matches the
    /// masks written by earlier versions of this tool.
    Opaque,
    /// A mask byte is 0xff for pixels whose 8-bit alpha is below the
    /// threshold, and zero otherwise.
    AlphaThreshold(u8),
}

impl Default for MaskPolicy {
    fn default() -> MaskPolicy {
        MaskPolicy::Opaque
    }
}

impl MaskPolicy {
    fn mask_byte(&self, alpha: u8) -> u8 {
        match *self {
            MaskPolicy::Opaque => MASK_VISIBLE,
            MaskPolicy::AlphaThreshold(threshold) => {
                if alpha < threshold {
                    MASK_HIDDEN
                } else {
                    MASK_VISIBLE
                }
            }
        }
    }
}

//===========================================================================//

/// One image encoded for an ICO entry: a 32-bpp BMP (header plus pixel data)
/// and the mask that follows it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedBitmap {
    width: u32,
    height: u32,
    bitmap: Vec<u8>,
    mask: Vec<u8>,
}

impl EncodedBitmap {
    /// Returns the width of the encoded image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the encoded image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the BMP header followed by the BGRA pixel data.
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    /// Returns the mask data, one byte per pixel.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Returns the combined length of the bitmap and mask, which is the size
    /// of this image's data in the ICO file.
    pub fn data_len(&self) -> usize {
        self.bitmap.len() + self.mask.len()
    }
}

//===========================================================================//

/// Encodes an image as a 32-bpp BMP plus a one-byte-per-pixel mask.
///
/// Pixels are written in BGRA order, bottom row first, keeping the high byte
/// of each 16-bit channel.  The mask is written top row first.  Returns an
/// error if the image is empty or too large for the BMP header fields.
pub fn encode_bitmap<I>(
    image: &I,
    mask_policy: MaskPolicy,
) -> io::Result<EncodedBitmap>
where
    I: GenericImageView<Pixel = Rgba<u16>>,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        invalid_input!(
            "Invalid image dimensions (was {}x{}, but both must be nonzero)",
            width,
            height
        );
    }
    if width > (i32::MAX as u32) || height > (i32::MAX as u32) / 2 {
        invalid_input!(
            "Image is too large for a BMP header (was {}x{})",
            width,
            height
        );
    }
    let num_pixels = match width.checked_mul(height) {
        Some(num) => num,
        None => invalid_input!("Width * Height is too large"),
    };
    let image_size = match num_pixels.checked_mul(4) {
        Some(size) => size,
        None => invalid_input!("Image data size is too large"),
    };

    let mut bitmap = Vec::<u8>::with_capacity(bitmap_len(image_size));
    let header = BitmapHeader {
        width: width as i32,
        height: 2 * height as i32,
        planes: 1,
        bits_per_pixel: BITS_PER_PIXEL,
        compression: 0,
        image_size,
    };
    header.write(&mut bitmap)?;

    // The color data is stored row by row, starting from the *bottom* row:
    for y in (0..height).rev() {
        for x in 0..width {
            let [red, green, blue, alpha] = image.get_pixel(x, y).0;
            bitmap.write_u8(high_byte(blue))?;
            bitmap.write_u8(high_byte(green))?;
            bitmap.write_u8(high_byte(red))?;
            bitmap.write_u8(high_byte(alpha))?;
        }
    }
    debug_assert_eq!(bitmap.len(), bitmap_len(image_size));

    let mut mask = Vec::<u8>::with_capacity(num_pixels as usize);
    for y in 0..height {
        for x in 0..width {
            let alpha = high_byte(image.get_pixel(x, y).0[3]);
            mask.push(mask_policy.mask_byte(alpha));
        }
    }

    Ok(EncodedBitmap { width, height, bitmap, mask })
}

// Length of the header plus color data.  Summed in `usize` since the color
// data alone may come within 40 bytes of `u32::MAX`.
fn bitmap_len(image_size: u32) -> usize {
    BMP_HEADER_LEN as usize + image_size as usize
}

fn high_byte(value: u16) -> u8 {
    (value >> 8) as u8
}

//===========================================================================//

/// The fields of a BITMAPINFOHEADER that vary between images.  The
/// resolution and color table fields are always written as zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitmapHeader {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels, doubled to account for the mask that follows the
    /// color data.
    pub height: i32,
    /// Number of color planes; always 1.
    pub planes: u16,
    /// Color depth.
    pub bits_per_pixel: u16,
    /// Compression method; 0 means uncompressed.
    pub compression: u32,
    /// Size of the color data, in bytes.
    pub image_size: u32,
}

impl BitmapHeader {
    /// Reads a BITMAPINFOHEADER from the start of a bitmap blob.
    pub fn read<R: Read>(mut reader: R) -> io::Result<BitmapHeader> {
        let header_len = reader.read_u32::<LittleEndian>()?;
        if header_len != BMP_HEADER_LEN {
            invalid_data!(
                "Invalid BMP header size (was {}, must be {})",
                header_len,
                BMP_HEADER_LEN
            );
        }
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;
        let planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let image_size = reader.read_u32::<LittleEndian>()?;
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let _colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;
        Ok(BitmapHeader {
            width,
            height,
            planes,
            bits_per_pixel,
            compression,
            image_size,
        })
    }

    fn write(&self, data: &mut Vec<u8>) -> io::Result<()> {
        data.write_u32::<LittleEndian>(BMP_HEADER_LEN)?;
        data.write_i32::<LittleEndian>(self.width)?;
        data.write_i32::<LittleEndian>(self.height)?;
        data.write_u16::<LittleEndian>(self.planes)?;
        data.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        data.write_u32::<LittleEndian>(self.compression)?;
        data.write_u32::<LittleEndian>(self.image_size)?;
        data.write_i32::<LittleEndian>(0)?; // horz ppm
        data.write_i32::<LittleEndian>(0)?; // vert ppm
        data.write_u32::<LittleEndian>(0)?; // colors used
        data.write_u32::<LittleEndian>(0)?; // colors important
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
