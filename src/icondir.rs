use crate::bitmap::{EncodedBitmap, BITS_PER_PIXEL};
use crate::sizes::size_byte;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};

//===========================================================================//

// The resource type field of an ICONDIR for icons (as opposed to cursors).
const ICON_RESOURCE_TYPE: u16 = 1;

/// The size of the ICONDIR header, in bytes.
pub const ICONDIR_LEN: u32 = 6;

/// The size of one ICONDIRENTRY, in bytes.
pub const ICONDIRENTRY_LEN: u32 = 16;

//===========================================================================//

/// Writes a complete ICO file containing the given images, in order.
///
/// Each image's bitmap is followed immediately by its mask, and the
/// directory entries point at those bytes.  Returns an error if there are
/// too many images or the file would be larger than 4 GiB.
pub fn write_icon<W: Write>(
    images: &[EncodedBitmap],
    mut writer: W,
) -> io::Result<()> {
    if images.len() > (u16::MAX as usize) {
        invalid_input!(
            "Too many images in ICO file (was {}, but max is {})",
            images.len(),
            u16::MAX
        );
    }
    let num_entries = images.len() as u32;
    let mut header = Vec::<u8>::with_capacity(
        (ICONDIR_LEN + ICONDIRENTRY_LEN * num_entries) as usize,
    );
    header.write_u16::<LittleEndian>(0)?; // reserved
    header.write_u16::<LittleEndian>(ICON_RESOURCE_TYPE)?;
    header.write_u16::<LittleEndian>(num_entries as u16)?;

    let mut payload = Vec::<u8>::new();
    let mut data_offset = ICONDIR_LEN + ICONDIRENTRY_LEN * num_entries;
    for image in images.iter() {
        let data_size = match u32::try_from(image.data_len()) {
            Ok(size) => size,
            Err(_) => invalid_input!(
                "Image data is too large (was {} bytes)",
                image.data_len()
            ),
        };
        let entry = IconDirEntry {
            width: image.width(),
            height: image.height(),
            num_colors: 0,
            color_planes: 1,
            bits_per_pixel: BITS_PER_PIXEL,
            data_size,
            data_offset,
            data: Vec::new(),
        };
        entry.write(&mut header)?;
        payload.extend_from_slice(image.bitmap());
        payload.extend_from_slice(image.mask());
        data_offset = match data_offset.checked_add(data_size) {
            Some(offset) => offset,
            None => invalid_input!("ICO file would exceed 4 GiB"),
        };
    }
    debug_assert_eq!(
        header.len() + payload.len(),
        data_offset as usize
    );
    writer.write_all(&header)?;
    writer.write_all(&payload)?;
    Ok(())
}

//===========================================================================//

/// The directory of an ICO file, with each entry's image data.
#[derive(Clone, Debug)]
pub struct IconDir {
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Returns the entries, in file order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Reads an ICO file's header, directory, and image data.  Returns an
    /// error if the header is not an icon header or a span runs past the end
    /// of the file.
    pub fn read<R: Read + Seek>(mut reader: R) -> io::Result<IconDir> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != ICON_RESOURCE_TYPE {
            invalid_data!(
                "Invalid resource type (was {}, but must be {})",
                restype,
                ICON_RESOURCE_TYPE
            );
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        for _ in 0..num_entries {
            entries.push(IconDirEntry::read(&mut reader)?);
        }
        for entry in entries.iter_mut() {
            reader.seek(SeekFrom::Start(entry.data_offset as u64))?;
            let mut data = vec![0u8; entry.data_size as usize];
            reader.read_exact(&mut data)?;
            entry.data = data;
        }
        Ok(IconDir { entries })
    }
}

//===========================================================================//

/// One entry in an ICO directory.
#[derive(Clone, Debug)]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Returns the width of the image, in pixels.  A width byte of zero is
    /// read as 256.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.  A height byte of zero is
    /// read as 256.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of palette colors; zero for true-color images.
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of color planes.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel (color depth) of the image.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the absolute offset of the image data within the file.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Returns the size of the image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns the raw image data (bitmap followed by mask).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn read<R: Read>(reader: &mut R) -> io::Result<IconDirEntry> {
        let width_byte = reader.read_u8()?;
        let height_byte = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIRENTRY \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_size = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        Ok(IconDirEntry {
            width: if width_byte == 0 { 256 } else { width_byte as u32 },
            height: if height_byte == 0 { 256 } else { height_byte as u32 },
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
            data: Vec::new(),
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(size_byte(self.width))?;
        writer.write_u8(size_byte(self.height))?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        Ok(())
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{write_icon, IconDir};
    use crate::bitmap::{encode_bitmap, MaskPolicy};
    use crate::Rgba16Image;
    use image::Rgba;
    use std::io::Cursor;

    #[test]
    fn write_empty_icon_set() {
        let mut output = Vec::<u8>::new();
        write_icon(&[], &mut output).unwrap();
        let expected: &[u8] = b"\x00\x00\x01\x00\x00\x00";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn read_empty_icon_set() {
        let input = b"\x00\x00\x01\x00\x00\x00";
        let icondir = IconDir::read(Cursor::new(input)).unwrap();
        assert_eq!(icondir.entries().len(), 0);
    }

    #[test]
    fn reject_cursor_set() {
        let input = b"\x00\x00\x02\x00\x00\x00";
        let error = IconDir::read(Cursor::new(input)).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn write_1x1_icon() {
        let mut image = Rgba16Image::new(1, 1);
        image.put_pixel(0, 0, Rgba([0xff00, 0x0000, 0x0000, 0xffff]));
        let encoded = encode_bitmap(&image, MaskPolicy::Opaque).unwrap();
        let mut output = Vec::<u8>::new();
        write_icon(&[encoded], &mut output).unwrap();
        let expected: &[u8] = b"\
            \x00\x00\x01\x00\x01\x00\
            \
            \x01\x01\x00\x00\x01\x00\x20\x00\
            \x2d\x00\x00\x00\x16\x00\x00\x00\
            \
            \x28\x00\x00\x00\x01\x00\x00\x00\x02\x00\x00\x00\
            \x01\x00\x20\x00\x00\x00\x00\x00\x04\x00\x00\x00\
            \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
            \x00\x00\x00\x00\
            \
            \x00\x00\xff\xff\
            \
            \x00";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn write_then_read_directory() {
        let images: Vec<_> = [3u32, 256]
            .iter()
            .map(|&size| {
                let image = Rgba16Image::new(size, size);
                encode_bitmap(&image, MaskPolicy::Opaque).unwrap()
            })
            .collect();
        let mut output = Vec::<u8>::new();
        write_icon(&images, &mut output).unwrap();
        // The 256x256 entry stores zero for its width and height bytes.
        assert_eq!(&output[22..24], &[0, 0]);
        let icondir = IconDir::read(Cursor::new(&output)).unwrap();
        assert_eq!(icondir.entries().len(), 2);
        let first = &icondir.entries()[0];
        assert_eq!(first.width(), 3);
        assert_eq!(first.height(), 3);
        assert_eq!(first.data_offset(), 6 + 2 * 16);
        assert_eq!(first.data_size(), 40 + 36 + 9);
        let second = &icondir.entries()[1];
        assert_eq!(second.width(), 256);
        assert_eq!(second.height(), 256);
        assert_eq!(second.bits_per_pixel(), 32);
        assert_eq!(second.color_planes(), 1);
        assert_eq!(second.num_colors(), 0);
        assert_eq!(second.data_offset(), first.data_offset() + 85);
        assert_eq!(
            (second.data_offset() + second.data_size()) as usize,
            output.len()
        );
        for (entry, image) in icondir.entries().iter().zip(images.iter()) {
            let mut expected = image.bitmap().to_vec();
            expected.extend_from_slice(image.mask());
            assert_eq!(entry.data(), expected.as_slice());
        }
    }
}

//===========================================================================//
