//! Noise-field terrain classification
//!
//! Samples a fractal noise field per cell, scales it by an amplitude and
//! buckets the value into water, sand, grass or rock using ascending height
//! thresholds.

use noise::{Billow, Fbm, MultiFractal, NoiseFn, OpenSimplex, Perlin, RidgedMulti, Seedable, SuperSimplex, Value};
use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::grid::Grid;
use crate::seeds::RandomSource;
use crate::tilemap::Tilemap;
use crate::tileset::Tile;

use super::{StepGenerator, StepReport};

/// Base noise algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    #[default]
    OpenSimplex,
    Perlin,
    SuperSimplex,
    Value,
}

/// How octaves of the base noise are combined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalType {
    /// Single octave of the base noise
    None,
    #[default]
    Fbm,
    Billow,
    RidgedMulti,
}

/// Parameters for noise terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub noise_type: NoiseType,
    pub fractal_type: FractalType,
    /// Base frequency (lower = larger features)
    pub frequency: f64,
    /// Multiplier applied to every sample
    pub amplitude: f32,
    /// Number of fractal octaves
    pub octaves: usize,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Amplitude decay per octave (persistence)
    pub gain: f64,
    pub water_height: f32,
    pub sand_height: f32,
    pub grass_height: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            noise_type: NoiseType::OpenSimplex,
            fractal_type: FractalType::Fbm,
            frequency: 0.02,
            amplitude: 1.0,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
            water_height: -0.4,
            sand_height: -0.1,
            grass_height: 0.25,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> GenResult<()> {
        if self.octaves == 0 {
            return Err(GenError::InvalidConfig("noise octaves must be at least 1".to_string()));
        }
        if !(self.frequency > 0.0) {
            return Err(GenError::InvalidConfig(format!(
                "noise frequency must be positive, got {}",
                self.frequency
            )));
        }
        let t = self.thresholds();
        if !(t.water <= t.sand && t.sand <= t.grass) {
            return Err(GenError::InvalidConfig(format!(
                "noise heights must ascend: water {} <= sand {} <= grass {}",
                t.water, t.sand, t.grass
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> HeightThresholds {
        HeightThresholds {
            water: self.water_height,
            sand: self.sand_height,
            grass: self.grass_height,
        }
    }
}

/// Upper bounds (exclusive) of the water, sand and grass bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightThresholds {
    pub water: f32,
    pub sand: f32,
    pub grass: f32,
}

/// Terrain band a sample falls into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    Water,
    Sand,
    Grass,
    Rock,
}

impl Terrain {
    pub fn tile(&self) -> Tile {
        match self {
            Terrain::Water => Tile::Water,
            Terrain::Sand => Tile::Sand,
            Terrain::Grass => Tile::Grass,
            Terrain::Rock => Tile::Rock,
        }
    }
}

/// Classify a height. Bands are checked in order water, sand, grass, so a
/// value equal to a threshold lands in the band above it.
pub fn classify(value: f32, thresholds: &HeightThresholds) -> Terrain {
    if value < thresholds.water {
        Terrain::Water
    } else if value < thresholds.sand {
        Terrain::Sand
    } else if value < thresholds.grass {
        Terrain::Grass
    } else {
        Terrain::Rock
    }
}

/// Sampled value of a cell and the band it was classified into.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseCell {
    pub value: f32,
    /// `None` until the cell is classified
    pub terrain: Option<Terrain>,
}

/// Deterministic 2D noise function built from [`NoiseParams`].
pub struct NoiseField {
    source: Box<dyn NoiseFn<f64, 2>>,
    /// Coordinate scale for the unfractalled source; fractal sources carry
    /// their own frequency
    input_scale: f64,
    amplitude: f32,
}

impl NoiseField {
    pub fn new(params: &NoiseParams, seed: u32) -> Self {
        let source = match params.noise_type {
            NoiseType::OpenSimplex => build_source::<OpenSimplex>(params, seed),
            NoiseType::Perlin => build_source::<Perlin>(params, seed),
            NoiseType::SuperSimplex => build_source::<SuperSimplex>(params, seed),
            NoiseType::Value => build_source::<Value>(params, seed),
        };
        let input_scale = match params.fractal_type {
            FractalType::None => params.frequency,
            _ => 1.0,
        };

        Self {
            source,
            input_scale,
            amplitude: params.amplitude,
        }
    }

    /// Amplitude-scaled noise value at a cell.
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        let point = [x as f64 * self.input_scale, y as f64 * self.input_scale];
        self.source.get(point) as f32 * self.amplitude
    }
}

fn build_source<T>(params: &NoiseParams, seed: u32) -> Box<dyn NoiseFn<f64, 2>>
where
    T: Default + Seedable + NoiseFn<f64, 2> + 'static,
{
    match params.fractal_type {
        FractalType::None => Box::new(T::default().set_seed(seed)),
        FractalType::Fbm => Box::new(configure(Fbm::<T>::new(seed), params)),
        FractalType::Billow => Box::new(configure(Billow::<T>::new(seed), params)),
        FractalType::RidgedMulti => Box::new(configure(RidgedMulti::<T>::new(seed), params)),
    }
}

fn configure<M: MultiFractal>(fractal: M, params: &NoiseParams) -> M {
    fractal
        .set_octaves(params.octaves)
        .set_frequency(params.frequency)
        .set_lacunarity(params.lacunarity)
        .set_persistence(params.gain)
}

/// Step-wise noise run: the first step draws the noise seed, then every step
/// samples and paints one row.
pub struct NoiseGeneration {
    params: NoiseParams,
    thresholds: HeightThresholds,
    field: Option<NoiseField>,
    cells: Tilemap<NoiseCell>,
    row: usize,
}

impl NoiseGeneration {
    pub fn new(params: NoiseParams, grid: &Grid) -> Self {
        let thresholds = params.thresholds();
        Self {
            params,
            thresholds,
            field: None,
            cells: Tilemap::new(grid.width(), grid.length()),
            row: 0,
        }
    }

    pub fn cells(&self) -> &Tilemap<NoiseCell> {
        &self.cells
    }
}

impl StepGenerator for NoiseGeneration {
    fn step(&mut self, grid: &mut Grid, rng: &mut RandomSource) -> StepReport {
        let length = self.cells.length;
        if self.row >= length {
            return StepReport::last("Noise map already finished");
        }

        let field = match self.field.take() {
            Some(field) => field,
            None => {
                let seed = rng.next_u32();
                log::debug!("Noise field seed {} ({:?} / {:?})", seed, self.params.noise_type, self.params.fractal_type);
                NoiseField::new(&self.params, seed)
            }
        };

        let y = self.row;
        for x in 0..self.cells.width {
            let value = field.sample(x, y);
            let terrain = classify(value, &self.thresholds);
            self.cells.set(x, y, NoiseCell { value, terrain: Some(terrain) });
            log::trace!("({}, {}) = {:.3} -> {:?}", x, y, value, terrain);

            if let Some(cell) = grid.try_get_cell(x as i32, y as i32) {
                grid.place_tile(cell, terrain.tile(), true);
            }
        }

        self.field = Some(field);
        self.row += 1;

        let label = format!("Noise row {}/{}", self.row, length);
        if self.row >= length {
            StepReport::last(label)
        } else {
            StepReport::progress(label)
        }
    }
}
