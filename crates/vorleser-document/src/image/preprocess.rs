// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR preprocessing — orientation correction, downscale guard, grayscale,
// sharpening, and global-threshold binarisation. Operates on in-memory images
// using the `image` and `imageproc` crates.

use std::io::Cursor;

use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, Luma};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter;
use tracing::{debug, info, instrument};
use vorleser_core::error::{Result, VorleserError};

/// Longest image side accepted before downscaling.
pub const DEFAULT_MAX_DIMENSION: u32 = 3000;

/// Unsharp-style 3x3 kernel applied before thresholding, row-major.
const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// A decoded image together with the orientation its metadata declares.
///
/// Orientation is applied lazily by [`ImagePreprocessor::preprocess`] so the
/// decoded pixels are never modified in place.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
    orientation: Orientation,
}

impl SourceImage {
    /// Decode raw encoded bytes (JPEG, PNG, TIFF, ...) and read the EXIF
    /// orientation, if any.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| VorleserError::Preprocess(format!("failed to sniff image format: {err}")))?;

        let mut decoder = reader
            .into_decoder()
            .map_err(|err| VorleserError::Preprocess(format!("failed to decode image: {err}")))?;

        // Missing or unreadable EXIF is not fatal; the pixels are still usable.
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

        let image = DynamicImage::from_decoder(decoder)
            .map_err(|err| VorleserError::Preprocess(format!("failed to decode image: {err}")))?;

        debug!(
            width = image.width(),
            height = image.height(),
            ?orientation,
            "Image decoded from bytes"
        );
        Ok(Self { image, orientation })
    }

    /// Wrap an already-decoded image with no declared orientation.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::NoTransforms,
        }
    }

    /// Override the declared orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Borrow the decoded pixels as stored (orientation not applied).
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// The image rotated/flipped so it is right-side-up.
    pub fn upright(&self) -> DynamicImage {
        let mut image = self.image.clone();
        image.apply_orientation(self.orientation);
        image
    }
}

/// Normalises and binarises raster images for OCR.
///
/// Every step is a pure function of its input: the same image and threshold
/// always produce the same binary image.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    max_dimension: u32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

impl ImagePreprocessor {
    /// Create a preprocessor that downscales anything whose longer side
    /// exceeds `max_dimension` pixels.
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Decode `data` and run the full pipeline.
    pub fn preprocess_bytes(&self, data: &[u8], threshold: u8) -> Result<GrayImage> {
        let source = SourceImage::from_bytes(data)?;
        Ok(self.preprocess(&source, threshold))
    }

    /// Run the full pipeline:
    ///
    /// 1. Apply the declared orientation
    /// 2. Downscale so the longer side is at most `max_dimension` (Lanczos3)
    /// 3. Convert to 8-bit grayscale (alpha dropped)
    /// 4. Sharpen with a fixed 3x3 kernel
    /// 5. Global threshold: pixels above `threshold` become white, the rest black
    #[instrument(skip(self, source))]
    pub fn preprocess(&self, source: &SourceImage, threshold: u8) -> GrayImage {
        let upright = source.upright();
        info!(
            width = upright.width(),
            height = upright.height(),
            threshold,
            "Preprocessing image for OCR"
        );

        let scaled = self.downscale(upright);
        let gray = scaled.to_luma8();
        let sharpened = sharpen(&gray);
        let binary = binarize(&sharpened, threshold);

        debug!(
            width = binary.width(),
            height = binary.height(),
            "Preprocessing complete"
        );
        binary
    }

    /// Shrink the image so its longer side equals `max_dimension`, keeping
    /// the aspect ratio. Smaller images are returned untouched.
    pub fn downscale(&self, image: DynamicImage) -> DynamicImage {
        match downscale_dimensions(image.width(), image.height(), self.max_dimension) {
            Some((width, height)) => {
                debug!(
                    from_w = image.width(),
                    from_h = image.height(),
                    to_w = width,
                    to_h = height,
                    "Downscaling oversized image"
                );
                image.resize_exact(width, height, FilterType::Lanczos3)
            }
            None => image,
        }
    }

    /// Otsu's threshold for the upright grayscale image, a sensible starting
    /// value for the threshold slider.
    pub fn suggest_threshold(&self, source: &SourceImage) -> u8 {
        let gray = self.downscale(source.upright()).to_luma8();
        let level = contrast::otsu_level(&gray);
        debug!(level, "Otsu threshold computed");
        level
    }
}

/// Target size for an image whose longer side exceeds `max_dimension`, or
/// `None` when no resize is needed. The shorter side is rounded to the
/// nearest pixel and never drops below 1.
pub fn downscale_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if longer <= max_dimension {
        return None;
    }

    let scale = |side: u32| -> u32 {
        let side = side as u64;
        let scaled = (side * max_dimension as u64 + longer as u64 / 2) / longer as u64;
        scaled.max(1) as u32
    };

    if width >= height {
        Some((max_dimension, scale(height)))
    } else {
        Some((scale(width), max_dimension))
    }
}

/// Convolve with [`SHARPEN_KERNEL`]. Border pixels are replicated and the
/// result is clamped to 0..=255.
pub fn sharpen(gray: &GrayImage) -> GrayImage {
    filter::filter3x3::<Luma<u8>, i32, u8>(gray, &SHARPEN_KERNEL)
}

/// Two-level image: values strictly greater than `threshold` become 255.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    contrast::threshold(gray, threshold, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    /// 16x16 gradient covering every gray level exactly once.
    fn gradient() -> GrayImage {
        GrayImage::from_fn(16, 16, |x, y| Luma([(y * 16 + x) as u8]))
    }

    fn white_count(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p.0[0] == 255).count()
    }

    #[test]
    fn downscale_dimensions_landscape() {
        assert_eq!(downscale_dimensions(4000, 2000, 3000), Some((3000, 1500)));
    }

    #[test]
    fn downscale_dimensions_portrait_rounds() {
        // 1000 * 3000 / 4500 = 666.67 → 667
        assert_eq!(downscale_dimensions(1000, 4500, 3000), Some((667, 3000)));
    }

    #[test]
    fn downscale_dimensions_within_limit() {
        assert_eq!(downscale_dimensions(3000, 1200, 3000), None);
        assert_eq!(downscale_dimensions(10, 10, 3000), None);
    }

    #[test]
    fn downscale_dimensions_never_zero() {
        assert_eq!(downscale_dimensions(9000, 1, 3000), Some((3000, 1)));
    }

    #[test]
    fn binarize_produces_two_levels() {
        let binary = binarize(&gradient(), 100);
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // Values 101..=255 are above the threshold.
        assert_eq!(white_count(&binary), 155);
    }

    /// The threshold slider moves the white/black split monotonically: a
    /// higher threshold classifies a subset of the previous white pixels as
    /// white, never a superset.
    #[test]
    fn binarization_is_monotonic_in_threshold() {
        let image = gradient();
        let mut previous = usize::MAX;
        for threshold in 0..=255u8 {
            let whites = white_count(&binarize(&image, threshold));
            assert!(
                whites <= previous,
                "threshold {threshold}: {whites} whites after {previous}"
            );
            previous = whites;
        }
        assert_eq!(white_count(&binarize(&image, 255)), 0);
    }

    #[test]
    fn sharpen_leaves_flat_regions_unchanged() {
        let flat = GrayImage::from_pixel(8, 8, Luma([90u8]));
        assert_eq!(sharpen(&flat), flat);
    }

    #[test]
    fn sharpen_boosts_edges_and_clamps() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([0u8]));
        image.put_pixel(2, 2, Luma([100u8]));
        let sharpened = sharpen(&image);
        assert_eq!(sharpened.get_pixel(2, 2).0[0], 255); // 5 * 100 clamped
        assert_eq!(sharpened.get_pixel(2, 1).0[0], 0); // -100 clamped
    }

    #[test]
    fn rgb_and_rgba_preprocess_identically() {
        let rgb = RgbImage::from_fn(20, 12, |x, y| Rgb([(x * 12) as u8, (y * 20) as u8, 77]));
        let rgba = RgbaImage::from_fn(20, 12, |x, y| {
            let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
            Rgba([r, g, b, 255])
        });

        let pre = ImagePreprocessor::default();
        let a = pre.preprocess(&SourceImage::from_dynamic(DynamicImage::ImageRgb8(rgb)), 120);
        let b = pre.preprocess(&SourceImage::from_dynamic(DynamicImage::ImageRgba8(rgba)), 120);
        assert_eq!(a, b);
    }

    #[test]
    fn preprocess_is_deterministic_and_does_not_mutate_input() {
        let source = SourceImage::from_dynamic(DynamicImage::ImageLuma8(gradient()));
        let before = source.as_dynamic().clone();

        let pre = ImagePreprocessor::default();
        let first = pre.preprocess(&source, 140);
        let second = pre.preprocess(&source, 140);

        assert_eq!(first, second);
        assert_eq!(source.as_dynamic(), &before);
    }

    #[test]
    fn preprocess_downscales_oversized_images() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(400, 200, Luma([200u8])));
        let pre = ImagePreprocessor::new(100);
        let out = pre.preprocess(&SourceImage::from_dynamic(image), 128);
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn preprocess_applies_declared_orientation() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 10, Luma([10u8])));
        let source = SourceImage::from_dynamic(image).with_orientation(Orientation::Rotate90);
        let out = ImagePreprocessor::default().preprocess(&source, 128);
        assert_eq!(out.dimensions(), (10, 30));
    }

    #[test]
    fn decodes_png_bytes_without_exif() {
        let image = DynamicImage::ImageLuma8(gradient());
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();

        let source = SourceImage::from_bytes(&buffer).unwrap();
        assert_eq!(source.orientation(), Orientation::NoTransforms);
        assert_eq!(source.as_dynamic().width(), 16);
    }

    #[test]
    fn corrupt_payload_is_a_preprocess_error() {
        let err = SourceImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, VorleserError::Preprocess(_)), "got {err:?}");
    }

    #[test]
    fn suggested_threshold_splits_bimodal_image() {
        let image = GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 40u8 } else { 220u8 }]));
        let source = SourceImage::from_dynamic(DynamicImage::ImageLuma8(image));
        let level = ImagePreprocessor::default().suggest_threshold(&source);
        assert!((40..220).contains(&level), "level {level}");
    }
}
