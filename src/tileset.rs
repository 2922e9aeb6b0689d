//! Tile kinds and their named templates
//!
//! Generators write [`Tile`] values into the grid. A [`Tileset`] resolves
//! template names ("Water", "Room", ...) to the glyph and color used when a
//! grid is rendered or exported.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};

/// Content marker placed into a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Room,
    Corridor,
    Grass,
    Water,
    Sand,
    Rock,
}

impl Tile {
    pub fn all() -> &'static [Tile] {
        &[
            Tile::Room,
            Tile::Corridor,
            Tile::Grass,
            Tile::Water,
            Tile::Sand,
            Tile::Rock,
        ]
    }

    /// Template name for this tile
    pub fn name(&self) -> &'static str {
        match self {
            Tile::Room => "Room",
            Tile::Corridor => "Corridor",
            Tile::Grass => "Grass",
            Tile::Water => "Water",
            Tile::Sand => "Sand",
            Tile::Rock => "Rock",
        }
    }

    fn index(&self) -> usize {
        match self {
            Tile::Room => 0,
            Tile::Corridor => 1,
            Tile::Grass => 2,
            Tile::Water => 3,
            Tile::Sand => 4,
            Tile::Rock => 5,
        }
    }

    fn default_glyph(&self) -> char {
        match self {
            Tile::Room => '#',
            Tile::Corridor => '+',
            Tile::Grass => '"',
            Tile::Water => '~',
            Tile::Sand => ':',
            Tile::Rock => '^',
        }
    }

    fn default_color(&self) -> (u8, u8, u8) {
        match self {
            Tile::Room => (180, 160, 130),
            Tile::Corridor => (120, 100, 80),
            Tile::Grass => (80, 150, 60),
            Tile::Water => (40, 90, 180),
            Tile::Sand => (220, 200, 140),
            Tile::Rock => (110, 110, 110),
        }
    }
}

/// Visual description of a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileTemplate {
    pub name: String,
    pub tile: Tile,
    pub glyph: char,
    pub color: (u8, u8, u8),
}

/// Partial replacement for a template, as read from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileOverride {
    #[serde(default)]
    pub glyph: Option<char>,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

/// One template per [`Tile`], looked up by name.
#[derive(Clone, Debug)]
pub struct Tileset {
    templates: Vec<TileTemplate>,
}

impl Default for Tileset {
    fn default() -> Self {
        let templates = Tile::all()
            .iter()
            .map(|&tile| TileTemplate {
                name: tile.name().to_string(),
                tile,
                glyph: tile.default_glyph(),
                color: tile.default_color(),
            })
            .collect();

        Self { templates }
    }
}

impl Tileset {
    /// Resolve a template by name (case-insensitive).
    pub fn lookup(&self, name: &str) -> GenResult<&TileTemplate> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| GenError::UnknownTemplate(name.to_string()))
    }

    /// Template for a tile kind. Every kind always has one.
    pub fn template(&self, tile: Tile) -> &TileTemplate {
        &self.templates[tile.index()]
    }

    /// Replace the glyph and/or color of a named template.
    pub fn apply_override(&mut self, name: &str, over: &TileOverride) -> GenResult<()> {
        let tile = self.lookup(name)?.tile;
        let template = &mut self.templates[tile.index()];

        if let Some(glyph) = over.glyph {
            template.glyph = glyph;
        }
        if let Some([r, g, b]) = over.color {
            template.color = (r, g, b);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let tileset = Tileset::default();

        assert_eq!(tileset.lookup("Water").unwrap().tile, Tile::Water);
        assert_eq!(tileset.lookup("corridor").unwrap().tile, Tile::Corridor);
        assert!(matches!(
            tileset.lookup("Lava"),
            Err(GenError::UnknownTemplate(name)) if name == "Lava"
        ));
    }

    #[test]
    fn test_every_tile_has_template() {
        let tileset = Tileset::default();
        for &tile in Tile::all() {
            assert_eq!(tileset.template(tile).tile, tile);
            assert_eq!(tileset.template(tile).name, tile.name());
        }
    }

    #[test]
    fn test_override() {
        let mut tileset = Tileset::default();
        let over = TileOverride { glyph: Some('w'), color: None };
        tileset.apply_override("water", &over).unwrap();

        let water = tileset.template(Tile::Water);
        assert_eq!(water.glyph, 'w');
        assert_eq!(water.color, Tile::Water.default_color());

        assert!(tileset.apply_override("nope", &over).is_err());
    }
}
