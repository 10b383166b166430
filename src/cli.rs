// pixeltune/src/cli.rs
use crate::ai::{AiConfig, DEFAULT_ANALYZE_MODEL, DEFAULT_API_BASE, DEFAULT_EDIT_MODEL};
use crate::core::{OutputFormat, ResizeAlgorithm};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pixeltune", version, about = "Resize, re-encode and AI-edit photos")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show dimensions, size and type of an image
    Info {
        input: PathBuf,
    },

    /// Resize and re-encode an image
    Resize {
        input: PathBuf,

        /// Output file (default: pixeltune-<millis>.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target width in pixels
        #[arg(short = 'W', long)]
        width: Option<String>,

        /// Target height in pixels
        #[arg(short = 'H', long)]
        height: Option<String>,

        /// Scale in percent of the current size
        #[arg(short, long)]
        scale: Option<u32>,

        /// Let width and height change independently
        #[arg(long)]
        unlock: bool,

        /// Output format (default: same as input)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Quality 1-100, ignored for PNG
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,

        #[arg(long, value_enum, default_value_t = Algorithm::Lanczos3)]
        filter: Algorithm,

        /// Skip lossless PNG optimization
        #[arg(long)]
        no_png_optimize: bool,
    },

    /// Ask the AI service for edit ideas
    Suggest {
        input: PathBuf,

        #[command(flatten)]
        ai: AiArgs,
    },

    /// Edit an image with a text prompt through the AI service
    Edit {
        input: PathBuf,

        #[arg(short, long)]
        prompt: String,

        /// Output file (default: pixeltune-<millis>.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        ai: AiArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AiArgs {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    #[arg(long, env = "PIXELTUNE_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, env = "PIXELTUNE_EDIT_MODEL", default_value = DEFAULT_EDIT_MODEL)]
    pub edit_model: String,

    #[arg(long, env = "PIXELTUNE_ANALYZE_MODEL", default_value = DEFAULT_ANALYZE_MODEL)]
    pub analyze_model: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

impl From<AiArgs> for AiConfig {
    fn from(args: AiArgs) -> Self {
        Self {
            api_key: args.api_key,
            api_base: args.api_base,
            edit_model: args.edit_model,
            analyze_model: args.analyze_model,
            timeout: Duration::from_secs(args.timeout),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Png => OutputFormat::Png,
            Format::Webp => OutputFormat::WebP,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}
