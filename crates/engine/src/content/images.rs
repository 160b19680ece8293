use std::collections::HashMap;
use std::path::Path;

use image::{ImageReader, RgbaImage};
use tracing::info;

use crate::app::EgaColor;

use super::keys::validate_resource_key;
use super::ContentError;

const OPAQUE_ALPHA: u8 = 128;

/// Decoded fixed-palette image: `None` pixels are transparent, each pixel
/// carries a depth offset added to the blit depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteImage {
    width: u32,
    height: u32,
    reference: (i32, i32),
    pixels: Vec<Option<EgaColor>>,
    depth: Vec<i32>,
}

impl PaletteImage {
    /// Reference point defaults to the bottom centre.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Option<EgaColor>>,
    ) -> Result<Self, ContentError> {
        if pixels.len() != width as usize * height as usize {
            return Err(ContentError::ImageSize {
                name: "<inline>".to_string(),
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            reference: ((width / 2) as i32, height as i32 - 1),
            depth: vec![0; pixels.len()],
            pixels,
        })
    }

    pub fn with_reference_point(mut self, x: i32, y: i32) -> Self {
        self.reference = (x, y);
        self
    }

    pub fn with_depth_offsets(mut self, depth: Vec<i32>) -> Result<Self, ContentError> {
        if depth.len() != self.pixels.len() {
            return Err(ContentError::ImageSize {
                name: "<depth>".to_string(),
                width: self.width,
                height: self.height,
                actual: depth.len(),
            });
        }
        self.depth = depth;
        Ok(self)
    }

    fn from_rgba(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|pixel| {
                let [r, g, b, a] = pixel.0;
                (a >= OPAQUE_ALPHA).then(|| EgaColor::nearest(r, g, b))
            })
            .collect::<Vec<_>>();
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            reference: ((width / 2) as i32, height as i32 - 1),
            depth: vec![0; pixels.len()],
            pixels,
        }
    }

    pub fn decode_png(bytes: &[u8], path: &Path) -> Result<Self, ContentError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|source| ContentError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_rgba(&decoded.to_rgba8()))
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let reader = ImageReader::open(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| ContentError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgba(&decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn reference_point(&self) -> (i32, i32) {
        self.reference
    }

    /// Colour and depth offset, or `None` when transparent or out of range.
    pub fn pixel(&self, column: u32, row: u32) -> Option<(EgaColor, i32)> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let offset = row as usize * self.width as usize + column as usize;
        let color = self.pixels.get(offset).copied().flatten()?;
        Some((color, self.depth.get(offset).copied().unwrap_or(0)))
    }
}

/// Images loaded up front by key; a missing or broken image fails the load.
#[derive(Debug, Clone, Default)]
pub struct ImageBank {
    images: HashMap<String, PaletteImage>,
}

impl ImageBank {
    pub fn load(images_dir: &Path, keys: &[&str]) -> Result<Self, ContentError> {
        let mut bank = ImageBank::default();
        for key in keys {
            validate_resource_key(key).map_err(|source| ContentError::ResourceKey {
                key: key.to_string(),
                source,
            })?;
            let path = images_dir.join(format!("{key}.png"));
            let image = PaletteImage::load(&path)?;
            info!(
                key,
                width = image.width(),
                height = image.height(),
                "image_loaded"
            );
            bank.insert(key, image);
        }
        Ok(bank)
    }

    pub fn insert(&mut self, key: &str, image: PaletteImage) {
        self.images.insert(key.to_string(), image);
    }

    pub fn get(&self, key: &str) -> Option<&PaletteImage> {
        self.images.get(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
