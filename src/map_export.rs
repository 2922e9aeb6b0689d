//! PNG export of generated grids
//!
//! Each cell becomes a `cell_size` x `cell_size` block in its template
//! color. Empty cells are drawn black.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{GenError, GenResult};
use crate::grid::Grid;
use crate::tileset::Tileset;

const EMPTY_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Pixel length of `cells` cells, or an error when it does not fit in a `u32`.
fn scaled_side(cells: usize, cell_size: u32) -> GenResult<u32> {
    u32::try_from(cells)
        .ok()
        .and_then(|cells| cells.checked_mul(cell_size))
        .ok_or_else(|| {
            GenError::InvalidConfig(format!("image too large: {} cells of {} px", cells, cell_size))
        })
}

/// Paint the grid into an image buffer.
pub fn render_image(grid: &Grid, tileset: &Tileset, cell_size: u32) -> GenResult<RgbImage> {
    if cell_size == 0 {
        return Err(GenError::InvalidConfig("cell size must be at least 1".to_string()));
    }

    let width = scaled_side(grid.width(), cell_size)?;
    let height = scaled_side(grid.length(), cell_size)?;
    let mut img: RgbImage = ImageBuffer::from_pixel(width, height, EMPTY_COLOR);

    for (cell, tile) in grid.iter() {
        let Some(tile) = tile else { continue };
        let (r, g, b) = tileset.template(tile).color;
        let px = cell.x as u32 * cell_size;
        let py = cell.y as u32 * cell_size;

        for dy in 0..cell_size {
            for dx in 0..cell_size {
                img.put_pixel(px + dx, py + dy, Rgb([r, g, b]));
            }
        }
    }

    Ok(img)
}

/// Export the grid as a PNG. Returns the image dimensions.
pub fn export_png(grid: &Grid, tileset: &Tileset, path: &Path, cell_size: u32) -> GenResult<(u32, u32)> {
    let img = render_image(grid, tileset, cell_size)?;
    img.save(path)?;
    log::info!("Exported map image to {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.dimensions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::Tile;

    #[test]
    fn test_render_blocks() {
        let mut grid = Grid::new(2, 1);
        grid.place_at(1, 0, Tile::Grass, true);
        let tileset = Tileset::default();

        let img = render_image(&grid, &tileset, 3).unwrap();

        assert_eq!(img.dimensions(), (6, 3));
        assert_eq!(*img.get_pixel(0, 0), EMPTY_COLOR);
        assert_eq!(*img.get_pixel(2, 2), EMPTY_COLOR);
        let (r, g, b) = tileset.template(Tile::Grass).color;
        assert_eq!(*img.get_pixel(3, 0), Rgb([r, g, b]));
        assert_eq!(*img.get_pixel(5, 2), Rgb([r, g, b]));
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let grid = Grid::new(2, 2);
        assert!(render_image(&grid, &Tileset::default(), 0).is_err());
    }

    #[test]
    fn test_oversized_image_rejected() {
        let grid = Grid::new(70_000, 1);
        let result = render_image(&grid, &Tileset::default(), 70_000);
        assert!(matches!(result, Err(GenError::InvalidConfig(_))));

        assert_eq!(scaled_side(10, 8).unwrap(), 80);
        assert!(scaled_side(usize::MAX, 1).is_err());
    }

    #[test]
    fn test_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let mut grid = Grid::new(4, 3);
        grid.place_at(0, 0, Tile::Water, true);

        let dims = export_png(&grid, &Tileset::default(), &path, 2).unwrap();

        assert_eq!(dims, (8, 6));
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 6));
        assert_eq!(*loaded.get_pixel(1, 1), Rgb([40, 90, 180]));
    }
}
