//! Image compositing
//!
//! Chart rasters from the backend are centered onto a branded background
//! template with a foreground overlay stamped on top. Table rasters are
//! autocropped to their non-transparent bounding box instead.

use crate::error::{RenderError, Result};
use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView, RgbaImage, imageops};
use std::io::Cursor;
use std::path::Path;

/// Pixels the chart is nudged upward from true center
const CHART_LIFT: i64 = 15;

/// Fixed background and foreground template images for chart composition
#[derive(Debug, Clone)]
pub struct ChartTemplates {
    background: DynamicImage,
    foreground: DynamicImage,
}

impl ChartTemplates {
    /// Load both templates from disk
    pub fn load(background: &Path, foreground: &Path) -> Result<Self> {
        Ok(Self {
            background: read_template(background)?,
            foreground: read_template(foreground)?,
        })
    }

    /// Build from already-decoded images
    pub fn from_images(background: DynamicImage, foreground: DynamicImage) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Center `raw_png` over the background, lift it slightly, stamp the
    /// foreground overlay, and re-encode as a flattened RGBA PNG
    pub fn compose_chart(&self, raw_png: &[u8]) -> Result<Vec<u8>> {
        let chart = decode_png(raw_png)?;
        let mut canvas = self.background.to_rgba8();

        let x = (i64::from(canvas.width()) - i64::from(chart.width())) / 2;
        let y = (i64::from(canvas.height()) - i64::from(chart.height())) / 2 - CHART_LIFT;
        imageops::overlay(&mut canvas, &chart.to_rgba8(), x, y);
        imageops::overlay(&mut canvas, &self.foreground.to_rgba8(), 0, 0);

        encode_png(&DynamicImage::ImageRgba8(canvas))
    }
}

/// Crop `raw_png` to its non-transparent bounding box, padded by `border`.
///
/// A fully transparent input crops to a single transparent pixel rather
/// than failing.
pub fn autocrop(raw_png: &[u8], border: u32) -> Result<Vec<u8>> {
    let image = decode_png(raw_png)?.to_rgba8();
    let (width, height) = image.dimensions();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        let blank = RgbaImage::new(1, 1);
        return encode_png(&DynamicImage::ImageRgba8(blank));
    }

    let left = min_x.saturating_sub(border);
    let top = min_y.saturating_sub(border);
    let right = (max_x + border + 1).min(width);
    let bottom = (max_y + border + 1).min(height);

    let cropped = imageops::crop_imm(&image, left, top, right - left, bottom - top).to_image();
    encode_png(&DynamicImage::ImageRgba8(cropped))
}

/// Table contract: autocrop with no extra border
pub fn compose_table(raw_png: &[u8]) -> Result<Vec<u8>> {
    autocrop(raw_png, 0)
}

fn read_template(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| RenderError::Template(format!("{}: {e}", path.display())))?;
    Ok(reader.decode()?)
}

fn decode_png(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}
