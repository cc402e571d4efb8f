use crate::Rgba16Image;
use std::io::{self, Read};

//===========================================================================//

// Size limits for source images:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// Decodes a PNG file into an image with 16-bit RGBA channels.
///
/// Palette and low-bit-depth images are expanded first.  Eight-bit samples
/// are widened by repeating the byte (`v * 257`), so the high byte of each
/// channel is the original sample.  Returns an error if the PNG data is
/// malformed or empty.
pub fn read_png<R: Read>(reader: R) -> io::Result<Rgba16Image> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut png_reader = match decoder.read_info() {
        Ok(png_reader) => png_reader,
        Err(error) => invalid_data!("Malformed PNG data: {}", error),
    };
    let mut buffer = vec![0u8; png_reader.output_buffer_size()];
    let info = match png_reader.next_frame(&mut buffer) {
        Ok(info) => info,
        Err(error) => invalid_data!("Malformed PNG data: {}", error),
    };
    if info.width < MIN_WIDTH || info.height < MIN_HEIGHT {
        invalid_data!(
            "Invalid PNG dimensions (was {}x{}, but must be at least {}x{})",
            info.width,
            info.height,
            MIN_WIDTH,
            MIN_HEIGHT
        );
    }
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            invalid_data!("Unsupported PNG color type: {:?}", info.color_type);
        }
    };
    let samples: Vec<u16> = match info.bit_depth {
        png::BitDepth::Eight => buffer[..info.buffer_size()]
            .iter()
            .map(|&value| u16::from(value) * 257)
            .collect(),
        png::BitDepth::Sixteen => buffer[..info.buffer_size()]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect(),
        other => invalid_data!("Unsupported PNG bit depth: {:?}", other),
    };

    // At 8 or 16 bits per sample, rows carry no padding.
    let num_pixels = (info.width as usize) * (info.height as usize);
    if samples.len() < num_pixels * channels {
        invalid_data!(
            "PNG data too short (had {} samples, but needs {})",
            samples.len(),
            num_pixels * channels
        );
    }
    let mut rgba = Vec::<u16>::with_capacity(num_pixels * 4);
    for pixel in samples.chunks_exact(channels).take(num_pixels) {
        match *pixel {
            [gray] => rgba.extend_from_slice(&[gray, gray, gray, u16::MAX]),
            [gray, alpha] => rgba.extend_from_slice(&[gray, gray, gray, alpha]),
            [red, green, blue] => {
                rgba.extend_from_slice(&[red, green, blue, u16::MAX])
            }
            [red, green, blue, alpha] => {
                rgba.extend_from_slice(&[red, green, blue, alpha])
            }
            _ => unreachable!(),
        }
    }
    match Rgba16Image::from_raw(info.width, info.height, rgba) {
        Some(image) => Ok(image),
        None => invalid_data!("PNG pixel buffer has the wrong length"),
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::read_png;

    fn encode_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        output
    }

    #[test]
    fn read_rgba8_png() {
        let data = b"\xff\x00\x00\xff\x00\x80\x00\x7f";
        let file = encode_png(
            2,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            data,
        );
        let image = read_png(file.as_slice()).unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(0, 0).0, [0xffff, 0, 0, 0xffff]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0x8080, 0, 0x7f7f]);
    }

    #[test]
    fn read_grayscale8_png() {
        let data = b"\x3f\x7f\xbf\xff";
        let file = encode_png(
            2,
            2,
            png::ColorType::Grayscale,
            png::BitDepth::Eight,
            data,
        );
        let image = read_png(file.as_slice()).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0x3f3f, 0x3f3f, 0x3f3f, 0xffff]);
        assert_eq!(image.get_pixel(1, 1).0, [0xffff, 0xffff, 0xffff, 0xffff]);
    }

    #[test]
    fn read_rgb16_png() {
        let data = b"\x12\x34\x56\x78\x9a\xbc";
        let file = encode_png(
            1,
            1,
            png::ColorType::Rgb,
            png::BitDepth::Sixteen,
            data,
        );
        let image = read_png(file.as_slice()).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0x1234, 0x5678, 0x9abc, 0xffff]);
    }

    #[test]
    fn reject_malformed_png() {
        let error = read_png(&b"not a png"[..]).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }
}

//===========================================================================//
