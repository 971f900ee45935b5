//! floorplane CLI: rectify photographs onto the plane of a chessboard.

use clap::{ArgAction, Parser};
use floorplane::chessboard::ChessboardParams;
use floorplane::detect::{default_chess_config, gray_view, ChessPatternDetector};
use floorplane::{
    display_size, DebugDisplay, FloorProjector, GrayImage, GrayImageView, GridSize,
    ProjectionReport, ProjectorParams, DEFAULT_SCREEN,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "floorplane")]
#[command(about = "Rectify images onto the floor plane of a chessboard pattern")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit intermediate images (written to --debug-dir when given).
    #[arg(long)]
    interactive: bool,

    /// Inner-corner rows of the chessboard.
    #[arg(long)]
    rows: usize,

    /// Inner-corner columns of the chessboard.
    #[arg(long)]
    cols: usize,

    /// JSON file with projector parameters and a `chessboard` section.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for rectified images and JSON reports.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Directory for intermediate images in interactive mode.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Input images.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[cfg(not(feature = "tracing"))]
fn level_for(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// With `tracing` enabled the filter comes from `RUST_LOG` instead of `-v`.
fn init_logging(verbose: u8) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        floorplane::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    floorplane::core::init_with_level(level_for(verbose))?;
    Ok(())
}

/// Writes every shown image, resized for a screen, as a PNG.
///
/// Without a directory the images are only announced in the log.
struct DumpDisplay {
    dir: Option<PathBuf>,
    stem: String,
}

impl DebugDisplay for DumpDisplay {
    fn show(&self, name: &str, image: &GrayImageView<'_>, _wait: bool) {
        let Some(dir) = &self.dir else {
            info!("{}: {} ({}x{})", self.stem, name, image.width, image.height);
            return;
        };
        let size = display_size(image.size(), DEFAULT_SCREEN);
        let resized = floorplane::core::resize_gray(image, size);
        let path = dir.join(format!("{}_{}.png", self.stem, name));
        if let Err(e) = save_gray(&resized, &path) {
            warn!("failed to write {}: {e}", path.display());
        }
    }
}

/// Contents of `--config`: projector parameters at the top level, board
/// detector parameters under `chessboard`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    #[serde(flatten)]
    projector: ProjectorParams,
    chessboard: ChessboardParams,
}

#[derive(Serialize)]
struct ImageReport<'a> {
    image: String,
    rectified_path: String,
    #[serde(flatten)]
    projection: &'a ProjectionReport,
}

fn save_gray(img: &GrayImage, path: &Path) -> CliResult<()> {
    let buf = ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .ok_or("image buffer does not match its dimensions")?;
    buf.save(path)?;
    Ok(())
}

fn load_config(cli: &Cli) -> CliResult<CliConfig> {
    let mut config: CliConfig = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| -> CliError { format!("failed to read {}: {e}", path.display()).into() })?;
            serde_json::from_str(&raw)
                .map_err(|e| -> CliError { format!("invalid config {}: {e}", path.display()).into() })?
        }
        None => CliConfig::default(),
    };
    if cli.interactive {
        config.projector.interactive = true;
    }
    Ok(config)
}

fn process_image(
    path: &Path,
    pattern: GridSize,
    config: &CliConfig,
    cli: &Cli,
) -> CliResult<ProjectionReport> {
    let img = ::image::open(path)
        .map_err(|e| -> CliError { format!("failed to open image {}: {e}", path.display()).into() })?
        .to_luma8();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let detector = ChessPatternDetector::new(default_chess_config(), config.chessboard.clone());
    let projector = FloorProjector::new(detector, config.projector.clone()).with_display(DumpDisplay {
        dir: cli.debug_dir.clone(),
        stem: stem.clone(),
    });
    let floor = projector.project(&gray_view(&img), pattern)?;
    let report = floor.report();

    let out_png = cli.out_dir.join(format!("{stem}_floor.png"));
    save_gray(&floor.rectified, &out_png)?;

    let out_json = cli.out_dir.join(format!("{stem}_floor.json"));
    let doc = ImageReport {
        image: path.display().to_string(),
        rectified_path: out_png.display().to_string(),
        projection: &report,
    };
    fs::write(&out_json, serde_json::to_string_pretty(&doc)?)?;

    info!(
        "{}: {}x{} -> {}x{}, square {:.1}px, tilt {:.1} deg, shift {:?}",
        path.display(),
        img.width(),
        img.height(),
        report.width,
        report.height,
        report.square_size_px,
        report.horizon_tilt_deg,
        report.shift
    );
    Ok(report)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> CliResult<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let pattern = GridSize::new(cli.rows, cli.cols)?;
    let config = load_config(&cli)?;
    fs::create_dir_all(&cli.out_dir)?;
    if let Some(dir) = &cli.debug_dir {
        fs::create_dir_all(dir)?;
    }

    let mut failed = 0usize;
    for path in &cli.images {
        if let Err(e) = process_image(path, pattern, &config, &cli) {
            warn!("{}: {e}", path.display());
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} images failed", cli.images.len()).into());
    }
    Ok(())
}
