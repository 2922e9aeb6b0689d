//! ASCII rendering and export of generated grids
//!
//! Provides functions to render a grid as text, with or without ANSI color,
//! and to export it to a file along with a legend and tile statistics.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::error::GenResult;
use crate::grid::Grid;
use crate::tileset::{Tile, Tileset};

/// Character used for cells nothing was placed in
pub const EMPTY_CHAR: char = '.';

/// Render a grid to a plain ASCII string, one line per row
pub fn render_ascii(grid: &Grid, tileset: &Tileset) -> String {
    let mut result = String::with_capacity((grid.width() + 1) * grid.length());

    for y in 0..grid.length() as i32 {
        for x in 0..grid.width() as i32 {
            let ch = match grid.tile_at(x, y) {
                Some(tile) => tileset.template(tile).glyph,
                None => EMPTY_CHAR,
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Format a single character with ANSI true color (24-bit) foreground
pub fn ansi_colored_char(ch: char, fg: (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m{}\x1b[0m", fg.0, fg.1, fg.2, ch)
}

/// Render a grid with each glyph drawn in its template color
pub fn render_colored_ascii(grid: &Grid, tileset: &Tileset) -> String {
    let mut result = String::new();

    for y in 0..grid.length() as i32 {
        for x in 0..grid.width() as i32 {
            match grid.tile_at(x, y) {
                Some(tile) => {
                    let template = tileset.template(tile);
                    result.push_str(&ansi_colored_char(template.glyph, template.color));
                }
                None => result.push(EMPTY_CHAR),
            }
        }
        result.push('\n');
    }

    result
}

/// Count cells per tile kind, in [`Tile::all`] order. Kinds with no cells
/// are left out.
pub fn tile_counts(grid: &Grid) -> Vec<(Tile, usize)> {
    Tile::all()
        .iter()
        .map(|&tile| (tile, grid.count(tile)))
        .filter(|&(_, count)| count > 0)
        .collect()
}

/// Legend mapping glyphs to template names
pub fn legend(tileset: &Tileset) -> String {
    let mut legend = String::new();
    legend.push_str("=== LEGEND ===\n");
    for &tile in Tile::all() {
        let template = tileset.template(tile);
        legend.push_str(&format!("  {} {}\n", template.glyph, template.name));
    }
    legend.push_str(&format!("  {} Empty\n", EMPTY_CHAR));
    legend
}

/// Export a grid to an ASCII file with a header, legend and statistics
pub fn export_ascii(grid: &Grid, tileset: &Tileset, path: &Path, method: &str, seed: u64) -> GenResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let total = grid.width() * grid.length();

    // Header
    writeln!(file, "=== GRID GENERATOR MAP ===")?;
    writeln!(file, "Method: {}", method)?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Size: {}x{}", grid.width(), grid.length())?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_ascii(grid, tileset))?;
    writeln!(file)?;

    write!(file, "{}", legend(tileset))?;
    writeln!(file)?;

    // Statistics
    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total cells: {}", total)?;
    let mut counts = tile_counts(grid);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (tile, count) in counts {
        let pct = 100.0 * count as f64 / total as f64;
        writeln!(file, "  {:10} {} {:>6} ({:>5.1}%)", tile.name(), tileset.template(tile).glyph, count, pct)?;
    }
    let empty = grid.count_empty();
    if empty > 0 {
        writeln!(file, "  {:10} {} {:>6}", "Empty", EMPTY_CHAR, empty)?;
    }

    file.flush()?;
    log::info!("Exported ASCII map to {}", path.display());
    Ok(())
}
