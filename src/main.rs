use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use pixeltune::{
    format_file_size, parse_dimension, unix_millis, AiConfig, Algorithm, Cli, Commands, Download,
    DownloadTarget, Edit, EditorSession, Format, GeminiClient, ImageProcessor, MetadataProcessor,
    PixelTuneError,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match run(cli.command) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<PixelTuneError>() {
            Some(err) => {
                log::debug!("{:?}", err);
                eprintln!("{}", err.user_message());
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Info { input } => process_info(&input),
        Commands::Resize {
            input,
            output,
            width,
            height,
            scale,
            unlock,
            format,
            quality,
            filter,
            no_png_optimize,
        } => process_resize(
            &input,
            output,
            ResizeArgs {
                width,
                height,
                scale,
                unlock,
                format,
                quality,
                filter,
                optimize_png: !no_png_optimize,
            },
        ),
        Commands::Suggest { input, ai } => process_suggest(&input, ai.into()),
        Commands::Edit {
            input,
            prompt,
            output,
            ai,
        } => process_edit(&input, &prompt, output, ai.into()),
    }
}

struct ResizeArgs {
    width: Option<String>,
    height: Option<String>,
    scale: Option<u32>,
    unlock: bool,
    format: Option<Format>,
    quality: Option<u8>,
    filter: Algorithm,
    optimize_png: bool,
}

fn process_info(input: &Path) -> anyhow::Result<()> {
    let mut session = EditorSession::new();
    let source = session.load_path(input)?;
    let has_exif = MetadataProcessor::new().has_metadata(source.bytes());

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(source.byte_size()));
    println!("Dimensions: {} x {} pixels", source.width(), source.height());
    println!("Aspect Ratio: {:.2}:1", source.aspect_ratio());
    println!("Type: {}", source.media_type());
    println!("Has EXIF metadata: {}", has_exif);

    Ok(())
}

fn process_resize(input: &Path, output: Option<PathBuf>, args: ResizeArgs) -> anyhow::Result<()> {
    let mut session = EditorSession::new();
    session.load_path(input)?;

    if args.unlock {
        session.edit(Edit::Lock(false));
    }
    if let Some(format) = args.format {
        session.edit(Edit::Format(format.into()));
    }
    if let Some(quality) = args.quality {
        session.edit(Edit::Quality(quality));
    }
    if let Some(scale) = args.scale {
        session.edit(Edit::Scale(scale));
    }
    if let Some(width) = args.width.as_deref() {
        session.edit(Edit::Width(parse_dimension(width)));
    }
    if let Some(height) = args.height.as_deref() {
        session.edit(Edit::Height(parse_dimension(height)));
    }

    let options = session.options();
    log::debug!(
        "Applying {}x{} {:?} q{} (scale {}%)",
        options.width,
        options.height,
        options.format,
        options.quality,
        options.scale
    );

    let processor = ImageProcessor::new(args.filter.into()).with_png_optimization(args.optimize_png);
    let pb = spinner("Processing...");
    let outcome = session.apply(&processor).map(|r| (r.width, r.height, r.size()));
    pb.finish_and_clear();
    let (width, height, size) = outcome?;

    let original_size = session.source().map(|s| s.byte_size()).unwrap_or(0);
    let download = session
        .download(DownloadTarget::Adjusted, unix_millis())
        .ok_or(PixelTuneError::NoImage)?;
    let output_path = save_download(input, output, &download)?;

    println!(
        "Resized image saved to: {} ({} x {}, {} -> {}{})",
        output_path.display(),
        width,
        height,
        format_file_size(original_size),
        format_file_size(size),
        pixeltune::savings_percent(original_size, size)
            .map(|p| format!(", save {}%", p))
            .unwrap_or_default()
    );

    Ok(())
}

fn process_suggest(input: &Path, config: AiConfig) -> anyhow::Result<()> {
    let mut session = EditorSession::new();
    session.load_path(input)?;

    // Suggestion failures, a missing key included, only leave the list empty
    let suggestions = match GeminiClient::new(config) {
        Ok(client) => {
            let pb = spinner("Analyzing...");
            let suggestions = session.refresh_suggestions(&client).to_vec();
            pb.finish_and_clear();
            suggestions
        }
        Err(e) => {
            log::debug!("Skipping suggestions: {}", e);
            Vec::new()
        }
    };

    if suggestions.is_empty() {
        println!("No suggestions available");
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("{}. {}", i + 1, suggestion);
    }

    Ok(())
}

fn process_edit(
    input: &Path,
    prompt: &str,
    output: Option<PathBuf>,
    config: AiConfig,
) -> anyhow::Result<()> {
    let mut session = EditorSession::new();
    session.load_path(input)?;
    session.set_prompt(prompt);

    // Blank prompts are rejected before any network setup
    let request = session.begin_generate()?;
    let client = GeminiClient::new(config);
    let pb = spinner("Generating...");
    let outcome = client.and_then(|client| request.run(&client));
    pb.finish_and_clear();
    session.finish_generate(&request, outcome)?;

    let download = session
        .download(DownloadTarget::Ai, unix_millis())
        .ok_or(PixelTuneError::NoImage)?;
    let output_path = save_download(input, output, &download)?;

    println!("AI result saved to: {}", output_path.display());

    Ok(())
}

fn save_download(
    input: &Path,
    output: Option<PathBuf>,
    download: &Download<'_>,
) -> anyhow::Result<PathBuf> {
    let path = output.unwrap_or_else(|| input.with_file_name(&download.file_name));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, download.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {} ({} bytes)", path.display(), download.bytes.len());
    Ok(path)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
