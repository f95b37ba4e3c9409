use clap::{Parser, Subcommand};
use imgfit::imaging::{Dimensions, Probe, Quality, ShrinkParams, plan_resize, probe};
use imgfit::service::Imaging;
use imgfit::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgfit")]
#[command(about = "Shrink images to fit a box and re-encode them as JPEG or WebP")]
#[command(long_about = "\
Shrink images to fit a box and re-encode them as JPEG or WebP

Sources may be JPEG, PNG, GIF (first frame) or WebP; the format is detected
from the file contents, never from the extension. Images are never upscaled.

Transparent areas of PNG, GIF and WebP sources are painted with the
configured transparency_replacement color before JPEG encoding.

Exit status:
  0  success
  1  the source was skipped (not an image, output not writable, GIF to WebP)
  2  error (unsupported container, bad configuration, resampler failure)

Run 'imgfit gen-config' to generate a documented imgfit.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file (missing file = defaults)
    #[arg(long, default_value = "imgfit.toml", global = true)]
    config: PathBuf,

    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Box constraints shared by `shrink` and `plan`.
#[derive(clap::Args, Clone, Copy)]
struct BoxArgs {
    /// Maximum output width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_width: Option<u32>,
    /// Maximum output height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_height: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Shrink an image to fit the box and write it as JPEG
    Shrink {
        source: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        bounds: BoxArgs,
        /// JPEG quality, 0-100 (default from config)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(0..=100))]
        quality: Option<u32>,
    },
    /// Write a WebP rendition of an image, keeping its dimensions
    Webp {
        source: PathBuf,
        destination: PathBuf,
        /// WebP quality, 0-100 (default from config)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(0..=100))]
        quality: Option<u32>,
    },
    /// Print the detected format and dimensions of a file
    Probe {
        source: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Exit 0 if the file is an image that can be shrunk, 1 otherwise
    Supports { source: PathBuf },
    /// Print the dimensions a shrink would produce, without touching files
    Plan {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
        #[command(flatten)]
        bounds: BoxArgs,
    },
    /// Print a stock imgfit.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Log to stderr: `RUST_LOG` when set, `imgfit=info` otherwise, `imgfit=debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("imgfit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imgfit=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let load_config = || -> Result<config::ImgfitConfig, config::ConfigError> {
        let config = config::load_config(&cli.config)?;
        debug!(path = %cli.config.display(), "configuration loaded");
        Ok(config)
    };

    match cli.command {
        Command::Shrink {
            ref source,
            ref destination,
            bounds,
            quality,
        } => {
            let config = load_config()?;
            let imaging = Imaging::from_config(&config)?;
            let params = ShrinkParams::new(source, destination)
                .max_width(bounds.max_width.or(config.shrink.max_width))
                .max_height(bounds.max_height.or(config.shrink.max_height))
                .quality(quality.map_or(config.shrink.quality(), Quality::new));

            if imaging.shrink(&params)? {
                output::print_conversion(source, destination, Ok(written_size(destination)));
                Ok(ExitCode::SUCCESS)
            } else {
                output::print_conversion(
                    source,
                    destination,
                    Err("not a readable image, or output not writable"),
                );
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Webp {
            ref source,
            ref destination,
            quality,
        } => {
            let config = load_config()?;
            let imaging = Imaging::from_config(&config)?;
            let quality = quality.map_or(config.webp.quality(), Quality::new);

            match imaging.try_to_webp(source, destination, quality) {
                Ok(()) => {
                    output::print_conversion(source, destination, Ok(written_size(destination)));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    output::print_conversion(source, destination, Err(&e.to_string()));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Probe { ref source, json } => match probe(source) {
            Ok(result) => {
                if json {
                    println!("{}", output::format_probe_json(source, &result)?);
                } else {
                    output::print_probe(source, &result);
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}: {e}", source.display());
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Supports { ref source } => {
            let supported = Imaging::new().supports(source);
            println!("{}", if supported { "yes" } else { "no" });
            Ok(if supported {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Plan {
            width,
            height,
            bounds,
        } => {
            let original = Dimensions { width, height };
            let plan = plan_resize(original, bounds.max_width, bounds.max_height);
            println!("{}", output::format_plan(original, plan));
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Dimensions of a freshly written output, if it can be read back.
fn written_size(destination: &Path) -> Option<Dimensions> {
    match probe(destination) {
        Ok(Probe::Supported(info)) => Some(info.dimensions),
        _ => None,
    }
}
