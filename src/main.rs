use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use grid_generator::ascii;
use grid_generator::config::GenerationConfig;
use grid_generator::error::GenResult;
use grid_generator::generation::{
    apply_generation, BspParams, CancellationToken, CellularParams, GenerationMethod, GenerationOutcome,
    NoiseParams, RoomPlacementParams,
};
use grid_generator::grid::Grid;
use grid_generator::map_export;
use grid_generator::seeds::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MethodKind {
    /// Binary space partitioning rooms and corridors
    Bsp,
    /// Cellular automata water/ground smoothing
    Cellular,
    /// Noise-field terrain bands
    Noise,
    /// Simple random room placement
    Rooms,
}

impl MethodKind {
    fn of(method: &GenerationMethod) -> Self {
        match method {
            GenerationMethod::Bsp(_) => MethodKind::Bsp,
            GenerationMethod::CellularAutomata(_) => MethodKind::Cellular,
            GenerationMethod::Noise(_) => MethodKind::Noise,
            GenerationMethod::RoomPlacement(_) => MethodKind::Rooms,
        }
    }

    fn default_method(self) -> GenerationMethod {
        match self {
            MethodKind::Bsp => GenerationMethod::Bsp(BspParams::default()),
            MethodKind::Cellular => GenerationMethod::CellularAutomata(CellularParams::default()),
            MethodKind::Noise => GenerationMethod::Noise(NoiseParams::default()),
            MethodKind::Rooms => GenerationMethod::RoomPlacement(RoomPlacementParams::default()),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "grid_generator")]
#[command(about = "Generate 2D tile grids with BSP, cellular automata or noise")]
struct Args {
    /// Generation method (overrides the one in --config)
    #[arg(long, value_enum)]
    method: Option<MethodKind>,

    /// Width of the grid in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Length of the grid in cells
    #[arg(short = 'L', long)]
    length: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load run settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between steps, in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Cancel the run after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print the grid after every step
    #[arg(long)]
    show_steps: bool,

    /// Use ANSI colors when printing the grid
    #[arg(long)]
    color: bool,

    /// Export the final grid to a text file
    #[arg(long)]
    export_ascii: Option<PathBuf>,

    /// Export the final grid to a PNG image
    #[arg(long)]
    export_png: Option<PathBuf>,

    /// Pixel size of one cell in the PNG export
    #[arg(long, default_value = "8")]
    cell_size: u32,

    /// Write the effective settings to a JSON config file
    #[arg(long)]
    save_config: Option<PathBuf>,
}

/// Merge command line overrides into the loaded (or default) config.
fn build_config(args: &Args) -> GenResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };

    // Switching method resets its parameters; naming the loaded one keeps them
    if let Some(kind) = args.method {
        if kind != MethodKind::of(&config.method) {
            config.method = kind.default_method();
        }
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(length) = args.length {
        config.length = length;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(delay) = args.step_delay_ms {
        config.step_delay_ms = delay;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> GenResult<()> {
    let config = build_config(&args)?;
    let tileset = config.build_tileset()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = RandomSource::derived(seed, config.method.name());
    let mut grid = Grid::new(config.width, config.length);

    println!("Generating {} grid with seed: {}", config.method.name(), seed);
    println!("Grid size: {}x{}", config.width, config.length);

    if let Some(path) = &args.save_config {
        let mut saved = config.clone();
        saved.seed = Some(seed);
        saved.save(path)?;
        println!("Saved config to {}", path.display());
    }

    let cancel = CancellationToken::new();
    let delay = Duration::from_millis(config.step_delay_ms);
    let mut observer = |grid: &Grid, step: usize, label: &str| {
        println!("  [{}] {}", step, label);
        if args.show_steps {
            let frame = if args.color {
                ascii::render_colored_ascii(grid, &tileset)
            } else {
                ascii::render_ascii(grid, &tileset)
            };
            println!("{}", frame);
        }
        if args.max_steps.is_some_and(|max| step >= max) {
            cancel.cancel();
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    };

    let outcome = apply_generation(&config.method, &mut grid, &mut rng, &cancel, &mut observer);
    match outcome {
        GenerationOutcome::Completed { steps } => println!("Generation complete after {} steps", steps),
        GenerationOutcome::Cancelled { steps_completed } => {
            println!("Generation cancelled after {} steps", steps_completed)
        }
    }

    if !args.show_steps {
        let map = if args.color {
            ascii::render_colored_ascii(&grid, &tileset)
        } else {
            ascii::render_ascii(&grid, &tileset)
        };
        println!("{}", map);
    }
    print!("{}", ascii::legend(&tileset));
    for (tile, count) in ascii::tile_counts(&grid) {
        println!("{:10} {:>6}", tile.name(), count);
    }

    if let Some(path) = &args.export_ascii {
        ascii::export_ascii(&grid, &tileset, path, config.method.name(), seed)?;
        println!("Exported ASCII map to {}", path.display());
    }
    if let Some(path) = &args.export_png {
        let (w, h) = map_export::export_png(&grid, &tileset, path, args.cell_size)?;
        println!("Exported {}x{} image to {}", w, h, path.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
