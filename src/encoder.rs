use crate::bitmap::{encode_bitmap, EncodedBitmap, MaskPolicy};
use crate::icondir::write_icon;
use crate::sizes::IconSizes;
use crate::Rgba16Image;
use image::imageops::{self, FilterType};
use log::debug;
use std::io;

//===========================================================================//

/// Converts one source image into a multi-resolution ICO file.
///
/// The source is resized once per configured size (smallest first), each
/// copy is encoded as a 32-bpp BMP with a mask, and the results are laid out
/// in a single in-memory ICO file.
#[derive(Clone, Debug)]
pub struct IconEncoder {
    sizes: IconSizes,
    filter: FilterType,
    mask_policy: MaskPolicy,
}

impl IconEncoder {
    /// Creates an encoder for the standard sizes, resampling with Lanczos3
    /// and writing all-zero masks.
    pub fn new() -> IconEncoder {
        IconEncoder {
            sizes: IconSizes::standard(),
            filter: FilterType::Lanczos3,
            mask_policy: MaskPolicy::Opaque,
        }
    }

    /// Sets the sizes to generate.
    pub fn with_sizes(mut self, sizes: IconSizes) -> IconEncoder {
        self.sizes = sizes;
        self
    }

    /// Sets the resampling filter used to produce each size.
    pub fn with_filter(mut self, filter: FilterType) -> IconEncoder {
        self.filter = filter;
        self
    }

    /// Sets how the mask blobs are filled in.
    pub fn with_mask_policy(mut self, mask_policy: MaskPolicy) -> IconEncoder {
        self.mask_policy = mask_policy;
        self
    }

    /// Returns the sizes this encoder generates.
    pub fn sizes(&self) -> &IconSizes {
        &self.sizes
    }

    /// Returns the mask policy.
    pub fn mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    /// Resizes and encodes the source once per size, in directory order.
    pub fn encode_variants(
        &self,
        source: &Rgba16Image,
    ) -> io::Result<Vec<EncodedBitmap>> {
        if source.width() == 0 || source.height() == 0 {
            invalid_input!(
                "Invalid source dimensions (was {}x{}, \
                 but both must be nonzero)",
                source.width(),
                source.height()
            );
        }
        let mut variants = Vec::with_capacity(self.sizes.len());
        for &size in self.sizes.as_slice() {
            let resized = imageops::resize(source, size, size, self.filter);
            let encoded = encode_bitmap(&resized, self.mask_policy)?;
            debug!(
                "Encoded {}x{} variant ({} bytes)",
                size,
                size,
                encoded.data_len()
            );
            variants.push(encoded);
        }
        Ok(variants)
    }

    /// Builds the complete ICO file for the source image.
    pub fn assemble(&self, source: &Rgba16Image) -> io::Result<Vec<u8>> {
        let variants = self.encode_variants(source)?;
        let mut output = Vec::new();
        write_icon(&variants, &mut output)?;
        Ok(output)
    }
}

impl Default for IconEncoder {
    fn default() -> IconEncoder {
        IconEncoder::new()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::IconEncoder;
    use crate::bitmap::MaskPolicy;
    use crate::sizes::IconSizes;
    use crate::Rgba16Image;
    use image::imageops::FilterType;
    use image::Rgba;

    #[test]
    fn encode_variants_in_size_order() {
        let source = Rgba16Image::from_pixel(8, 8, Rgba([0, 0, 0xffff, 0xffff]));
        let encoder = IconEncoder::new()
            .with_sizes(IconSizes::new(vec![1, 4, 16]).unwrap())
            .with_filter(FilterType::Nearest);
        let variants = encoder.encode_variants(&source).unwrap();
        let sizes: Vec<u32> = variants.iter().map(|v| v.width()).collect();
        assert_eq!(sizes, vec![1, 4, 16]);
        // A uniform blue image stays uniform blue after nearest resampling.
        assert_eq!(&variants[0].bitmap()[40..], &[0xff, 0x00, 0x00, 0xff]);
    }

    #[test]
    fn mask_policy_is_applied() {
        let source = Rgba16Image::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let encoder = IconEncoder::new()
            .with_sizes(IconSizes::new(vec![2]).unwrap())
            .with_filter(FilterType::Nearest)
            .with_mask_policy(MaskPolicy::AlphaThreshold(0x80));
        assert_eq!(encoder.mask_policy(), MaskPolicy::AlphaThreshold(0x80));
        let variants = encoder.encode_variants(&source).unwrap();
        assert_eq!(variants[0].mask(), &[0xff; 4]);
    }

    #[test]
    fn reject_empty_source() {
        let source = Rgba16Image::new(0, 0);
        let error = IconEncoder::new().assemble(&source).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);
    }
}

//===========================================================================//
