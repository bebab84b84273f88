//! Matrix rendering onto pixel surfaces.
//!
//! The drawing routine is written against the [`PixelSurface`] trait
//! so a matrix can be painted onto anything rectangular; the crate
//! ships [`ImageCanvas`], an adapter over an RGBA raster from the
//! `image` crate.

use std::convert::Infallible;

use image::{Rgba, RgbaImage};
use qrbind_core::Matrix;

/// A pixel color, RGBA byte order.
pub type Color = [u8; 4];

/// How to paint a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawOptions {
    /// Color of dark modules.
    pub foreground: Color,
    /// Color of light modules and the padding frame.
    pub background: Color,
    /// Frame width in pixels on every side of the symbol.
    pub padding: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions {
            foreground: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
            padding: 0,
        }
    }
}

/// A mutable rectangular pixel target.
pub trait PixelSurface {
    /// Error produced by the surface's own drawing machinery.
    type Error;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Fill an axis-aligned rectangle. The rectangle is always within
    /// the surface bounds when called from [`draw`].
    fn fill_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<(), Self::Error>;
}

/// Paint `matrix` onto the whole of `surface`.
///
/// The symbol is scaled to the area left inside the padding frame,
/// distributing pixels across modules so the full area is covered even
/// when the side length does not divide evenly. Cells are painted
/// per-module; no resampling, every pixel is exactly the foreground or
/// background color.
pub fn draw<S: PixelSurface>(
    matrix: &Matrix,
    surface: &mut S,
    options: &DrawOptions,
) -> Result<(), S::Error> {
    let width = surface.width();
    let height = surface.height();
    surface.fill_rect(0, 0, width, height, options.background)?;

    let side = matrix.size() as u32;
    let inner_w = width.saturating_sub(options.padding * 2);
    let inner_h = height.saturating_sub(options.padding * 2);
    if side == 0 || inner_w == 0 || inner_h == 0 {
        return Ok(());
    }

    // Proportional cell edges: cell k spans [k*inner/side, (k+1)*inner/side).
    let edge = |k: u32, inner: u32| (u64::from(k) * u64::from(inner) / u64::from(side)) as u32;
    for y in 0..side {
        let top = options.padding + edge(y, inner_h);
        let cell_h = edge(y + 1, inner_h) - edge(y, inner_h);
        for x in 0..side {
            if !matrix.is_dark(x as usize, y as usize) {
                continue;
            }
            let left = options.padding + edge(x, inner_w);
            let cell_w = edge(x + 1, inner_w) - edge(x, inner_w);
            surface.fill_rect(left, top, cell_w, cell_h, options.foreground)?;
        }
    }
    Ok(())
}

/// Render `matrix` into a fresh RGBA image at `scale` pixels per
/// module plus the padding frame from `options`.
pub fn render_image(matrix: &Matrix, scale: u32, options: &DrawOptions) -> RgbaImage {
    let side = matrix.size() as u32;
    let extent = side * scale + options.padding * 2;
    let mut canvas = ImageCanvas::new(extent.max(1), extent.max(1));
    // ImageCanvas drawing is infallible.
    draw(matrix, &mut canvas, options).unwrap_or_else(|e| match e {});
    canvas.into_image()
}

/// [`PixelSurface`] adapter over an owned [`RgbaImage`].
pub struct ImageCanvas {
    image: RgbaImage,
}

impl ImageCanvas {
    /// A canvas of the given dimensions, initially transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        ImageCanvas {
            image: RgbaImage::new(width, height),
        }
    }

    /// Take the finished image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl PixelSurface for ImageCanvas {
    type Error = Infallible;

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<(), Infallible> {
        for py in y..y + height {
            for px in x..x + width {
                self.image.put_pixel(px, py, Rgba(color));
            }
        }
        Ok(())
    }
}
