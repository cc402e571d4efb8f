#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io;

//===========================================================================//

/// The largest width/height an ICO entry can describe.
pub const MAX_ICON_SIZE: u32 = 256;

// The square sizes written by default, smallest first.
const STANDARD_SIZES: &[u32] = &[16, 32, 48, 64, 128, 256];

//===========================================================================//

/// Converts an image dimension into the single byte stored for it in an ICO
/// directory entry.
///
/// Any `u32` is accepted.  Dimensions from 1 to 255 map to themselves;
/// dimensions of 256 or more map to the sentinel 0, which ICO readers
/// interpret as "256 or larger".  A dimension of 0 (never produced by this
/// crate) also maps to 0.
pub fn size_byte(size: u32) -> u8 {
    if size >= MAX_ICON_SIZE {
        0
    } else {
        size as u8
    }
}

//===========================================================================//

/// An ordered set of square target sizes, one per ICO entry.
///
/// The sizes are strictly ascending and each lies in `1..=256`, which is the
/// order the entries appear in the output file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<u32>", into = "Vec<u32>")
)]
pub struct IconSizes {
    sizes: Vec<u32>,
}

impl IconSizes {
    /// Creates a validated set of sizes.  Returns an error if `sizes` is
    /// empty, has too many entries for an ICO file, contains a size outside
    /// `1..=256`, or is not strictly ascending.
    pub fn new(sizes: Vec<u32>) -> io::Result<IconSizes> {
        if sizes.is_empty() {
            invalid_input!("Icon size list must not be empty");
        }
        if sizes.len() > (u16::MAX as usize) {
            invalid_input!(
                "Too many icon sizes (was {}, but max is {})",
                sizes.len(),
                u16::MAX
            );
        }
        for &size in sizes.iter() {
            if size == 0 || size > MAX_ICON_SIZE {
                invalid_input!(
                    "Invalid icon size (was {}, but must be from 1 to {})",
                    size,
                    MAX_ICON_SIZE
                );
            }
        }
        for pair in sizes.windows(2) {
            if pair[0] >= pair[1] {
                invalid_input!(
                    "Icon sizes must be strictly ascending \
                     (found {} followed by {})",
                    pair[0],
                    pair[1]
                );
            }
        }
        Ok(IconSizes { sizes })
    }

    /// Returns the standard set of sizes: 16, 32, 48, 64, 128, and 256.
    pub fn standard() -> IconSizes {
        IconSizes { sizes: STANDARD_SIZES.to_vec() }
    }

    /// Returns the sizes, smallest first.
    pub fn as_slice(&self) -> &[u32] {
        &self.sizes
    }

    /// Returns the number of sizes (and so of entries in the ICO file).
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Always false; a validated set has at least one size.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Default for IconSizes {
    fn default() -> IconSizes {
        IconSizes::standard()
    }
}

impl TryFrom<Vec<u32>> for IconSizes {
    type Error = io::Error;

    fn try_from(sizes: Vec<u32>) -> io::Result<IconSizes> {
        IconSizes::new(sizes)
    }
}

impl From<IconSizes> for Vec<u32> {
    fn from(sizes: IconSizes) -> Vec<u32> {
        sizes.sizes
    }
}

//===========================================================================//


//===========================================================================//

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::IconSizes;
    use serde::de::value::{Error, SeqDeserializer};
    use serde::Deserialize;

    fn deserialize(sizes: Vec<u32>) -> Result<IconSizes, Error> {
        IconSizes::deserialize(SeqDeserializer::new(sizes.into_iter()))
    }

    #[test]
    fn deserialize_validates_sizes() {
        assert!(deserialize(vec![32, 16]).is_err());
        assert!(deserialize(vec![0]).is_err());
        let sizes = deserialize(vec![16, 256]).unwrap();
        assert_eq!(sizes.as_slice(), &[16, 256]);
    }
}

//===========================================================================//
