//! Heatmap image encoding.

use std::path::Path;

use image::{imageops, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

use cancellation_analysis_core::heatmap::{DensityGrid, SparseDensityGrid};
use cancellation_common::error::CancellationResult;

/// Map `t` in `[0, 1]` onto the blue-cyan-yellow-red "jet" palette.
pub fn jet(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |offset: f64| {
        let v = (1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    };
    [channel(3.0), channel(2.0), channel(1.0)]
}

/// Opaque colour image of a density grid, scaled to its maximum.
pub fn density_image(grid: &DensityGrid) -> RgbImage {
    ImageBuffer::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        let t = grid
            .normalized_cell(x as usize, y as usize)
            .unwrap_or(0.0);
        Rgb(jet(t))
    })
}

/// Colour image of a sparsified grid; absent cells are fully transparent.
pub fn overlay_image(grid: &SparseDensityGrid) -> RgbaImage {
    let (lo, hi) = grid.range().unwrap_or((0.0, 0.0));
    let span = hi - lo;

    ImageBuffer::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        match grid.cell(x as usize, y as usize) {
            Some(v) => {
                let t = if span > 0.0 { (v - lo) / span } else { 0.0 };
                let [r, g, b] = jet(t);
                Rgba([r, g, b, 255])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    })
}

/// Opacity of the heatmap layer drawn over the task image.
pub const SUPERIMPOSED_ALPHA: f64 = 0.5;

/// The overlay drawn over `background` at [`SUPERIMPOSED_ALPHA`].
///
/// The result has the background's size; overlay cells outside it are
/// dropped.
pub fn superimposed_image(background: &RgbaImage, grid: &SparseDensityGrid) -> RgbaImage {
    let mut layer = overlay_image(grid);
    for pixel in layer.pixels_mut() {
        pixel.0[3] = (f64::from(pixel.0[3]) * SUPERIMPOSED_ALPHA).round() as u8;
    }

    let mut base = background.clone();
    imageops::overlay(&mut base, &layer, 0, 0);
    base
}

pub fn save_density_png(grid: &DensityGrid, path: &Path) -> CancellationResult<()> {
    density_image(grid).save(path)?;
    tracing::debug!("Saved heatmap {}", path.display());
    Ok(())
}

pub fn save_overlay_png(grid: &SparseDensityGrid, path: &Path) -> CancellationResult<()> {
    overlay_image(grid).save(path)?;
    tracing::debug!("Saved transparent heatmap {}", path.display());
    Ok(())
}

pub fn save_superimposed_png(
    task_image: &Path,
    grid: &SparseDensityGrid,
    path: &Path,
) -> CancellationResult<()> {
    let background = image::open(task_image)?.to_rgba8();
    superimposed_image(&background, grid).save(path)?;
    tracing::debug!("Saved superimposed heatmap {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cancellation_analysis_core::heatmap::HeatmapRenderer;
    use cancellation_common::config::DisplaySize;

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(jet(0.0), [0, 0, 128]);
        assert_eq!(jet(1.0), [128, 0, 0]);
        assert_eq!(jet(0.5), [128, 255, 128]);
        assert_eq!(jet(f64::NAN), jet(0.0));
    }

    #[test]
    fn test_density_image_matches_grid_size() {
        let grid = HeatmapRenderer::new(DisplaySize::new(60, 40)).render(&[(30, 20)]);
        let img = density_image(&grid);
        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(img.get_pixel(30, 20).0, jet(1.0));
    }

    #[test]
    fn test_overlay_is_transparent_without_points() {
        let grid = HeatmapRenderer::new(DisplaySize::new(20, 10)).render(&[]);
        let img = overlay_image(&grid.sparsify());
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_overlay_keeps_hotspot_opaque() {
        let grid = HeatmapRenderer::new(DisplaySize::new(60, 40)).render(&[(40, 20)]);
        let img = overlay_image(&grid.sparsify());
        assert_eq!(img.get_pixel(40, 20).0[3], 255);
        assert_eq!(img.get_pixel(0, 0).0[3], 255);
        assert_eq!(img.get_pixel(0, 39).0[3], 0);
    }

    #[test]
    fn test_superimposed_blends_hotspot_and_keeps_background() {
        let grid = HeatmapRenderer::new(DisplaySize::new(60, 40)).render(&[(40, 20)]);
        let background = RgbaImage::from_pixel(60, 40, Rgba([255, 255, 255, 255]));
        let img = superimposed_image(&background, &grid.sparsify());

        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(img.get_pixel(0, 39).0, [255, 255, 255, 255]);

        // Half-opaque dark red over white.
        let [r, g, b, a] = img.get_pixel(40, 20).0;
        assert_eq!(a, 255);
        assert!(r > 128 && r < 255, "red channel {r}");
        assert!(g > 100 && g < 155, "green channel {g}");
        assert_eq!(g, b);
    }
}
