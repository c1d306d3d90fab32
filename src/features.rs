use image::{imageops, imageops::FilterType, GrayImage};

use crate::error::{Error, Result};

/// Side of the square feature canvas, in pixels.
pub const FEATURE_SIDE: u32 = 14;

/// Length of a feature vector: one scalar per canvas pixel.
pub const FEATURE_LEN: usize = (FEATURE_SIDE * FEATURE_SIDE) as usize;

/// Normalized 14x14 grayscale representation of a glyph, row-major,
/// 1.0 = fully lit and 0.0 = fully dark.
pub type FeatureVector = Vec<f64>;

/// The external rendering collaborator: something that can measure and paint
/// a glyph in a particular font. Font discovery and filtering live entirely
/// on the caller's side.
pub trait GlyphRasterizer {
    /// Nominal glyph size per font metrics, in pixels. Ascent/descent-based,
    /// so it is an unreliable proxy for the visual bounding box.
    fn measure(&self, glyph: char) -> (u32, u32);

    /// Paints the glyph with its metric box's top-left corner at `(x, y)`,
    /// lighting pixels on the canvas (0 = background).
    fn draw(&self, glyph: char, x: f32, y: f32, canvas: &mut GrayImage);
}

/// Renders a glyph centered on the 14x14 canvas and extracts its features.
///
/// Centering by font metrics alone leaves glyphs without descenders sitting
/// visibly off-center, so the glyph is first rendered at its nominal size to
/// a scratch canvas, every pixel is scanned for the tight visual bounding
/// box, and the final render is shifted by the offset between the visual
/// center and the metric center.
pub fn glyph_features<R: GlyphRasterizer + ?Sized>(
    rasterizer: &R,
    glyph: char,
) -> Result<FeatureVector> {
    let (width, height) = rasterizer.measure(glyph);
    if width == 0 || height == 0 {
        Err(Error::InvalidInput)?;
    }

    let mut scratch = GrayImage::new(width, height);
    rasterizer.draw(glyph, 0.0, 0.0, &mut scratch);

    // offset of the visual center from the metric center; a glyph that
    // painted nothing gets no correction
    let (offset_x, offset_y) = match visual_bounds(&scratch) {
        Some((min_x, min_y, max_x, max_y)) => (
            (max_x + min_x) as f32 / 2.0 - width as f32 / 2.0,
            (max_y + min_y) as f32 / 2.0 - height as f32 / 2.0,
        ),
        None => (0.0, 0.0),
    };

    let mut canvas = GrayImage::new(FEATURE_SIDE, FEATURE_SIDE);
    let center = FEATURE_SIDE as f32 / 2.0;
    rasterizer.draw(
        glyph,
        center - width as f32 / 2.0 - offset_x,
        center - height as f32 / 2.0 - offset_y,
        &mut canvas,
    );

    pixels_from_image(&canvas)
}

/// Extracts features from an already-rendered image, e.g. a finished
/// freehand drawing.
///
/// The source is scaled uniformly by the smaller of the two axis ratios so
/// it fits the canvas without cropping, centered, and padded with the
/// background value.
pub fn image_features(source: &GrayImage) -> Result<FeatureVector> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        Err(Error::InvalidInput)?;
    }

    let ratio = (FEATURE_SIDE as f64 / width as f64).min(FEATURE_SIDE as f64 / height as f64);
    let scaled_w = ((width as f64 * ratio).round() as u32).clamp(1, FEATURE_SIDE);
    let scaled_h = ((height as f64 * ratio).round() as u32).clamp(1, FEATURE_SIDE);

    let scaled = imageops::resize(source, scaled_w, scaled_h, FilterType::Triangle);

    // one of these offsets is always zero
    let mut canvas = GrayImage::new(FEATURE_SIDE, FEATURE_SIDE);
    imageops::overlay(
        &mut canvas,
        &scaled,
        i64::from((FEATURE_SIDE - scaled_w) / 2),
        i64::from((FEATURE_SIDE - scaled_h) / 2),
    );

    pixels_from_image(&canvas)
}

/// Reads one channel per pixel off a finished 14x14 canvas and normalizes
/// to [0, 1]. Rendering is monochrome, so a single channel suffices.
pub fn pixels_from_image(canvas: &GrayImage) -> Result<FeatureVector> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        Err(Error::InvalidInput)?;
    }
    if width != FEATURE_SIDE || height != FEATURE_SIDE {
        Err(Error::DimensionMismatch {
            expected: FEATURE_LEN,
            actual: (width * height) as usize,
        })?;
    }

    Ok(canvas
        .pixels()
        .map(|pixel| f64::from(pixel.0[0]) / 255.0)
        .collect())
}

/// Tight bounding box `(min_x, min_y, max_x, max_y)` of all non-background
/// pixels, or `None` for a fully dark image.
fn visual_bounds(image: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }

        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    bounds
}
