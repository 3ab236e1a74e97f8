use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scrollreel::{
    DirSource, DrawOutcome, FrameRGBA, HeadlessDocument, OverlayAnimator, OverlayUpdate,
    ReelConfig, Stage, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    /// Stage configuration JSON. Defaults reproduce the stock hero animation.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the canvas at one scroll position as a PNG.
    Frame(FrameArgs),
    /// Scroll from top to bottom, writing a PNG for every redraw.
    Scrub(ScrubArgs),
    /// Print overlay styles for a progress value.
    Overlays(OverlaysArgs),
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Directory the sequence paths are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Viewport size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720")]
    viewport: Viewport,

    /// Scrollable height of the scroll container, in pixels.
    #[arg(long, default_value_t = 5000.0)]
    scroll_height: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Document scroll offset, in pixels.
    #[arg(long, default_value_t = 0.0)]
    scroll_top: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Number of evenly spaced scroll steps between top and bottom.
    #[arg(long, default_value_t = 90)]
    steps: u32,

    /// Directory receiving `scrub_<step>.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct OverlaysArgs {
    /// Scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ReelConfig::from_path(path)?,
        None => ReelConfig::default(),
    };

    match cli.cmd {
        Command::Frame(args) => cmd_frame(config, args),
        Command::Scrub(args) => cmd_scrub(config, args),
        Command::Overlays(args) => cmd_overlays(&config, &args),
        Command::Config => {
            println!("{}", config.to_json_pretty()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn mount(config: ReelConfig, page: &PageArgs) -> anyhow::Result<Stage<HeadlessDocument>> {
    let doc = HeadlessDocument::for_config(&config, page.viewport, page.scroll_height);
    let source = Arc::new(DirSource::new(&page.root));
    let mut stage = Stage::mount(config, doc, source)?;
    stage.wait_for_frames()?;
    Ok(stage)
}

fn cmd_frame(config: ReelConfig, args: FrameArgs) -> anyhow::Result<()> {
    let mut stage = mount(config, &args.page)?;

    stage.document_mut().set_scroll_top(args.scroll_top);
    let update = stage.on_scroll()?;
    stage.on_animation_frame()?;

    write_png(&stage.snapshot(), &args.out)?;

    let overlays: Vec<_> = stage
        .config()
        .overlays
        .iter()
        .filter_map(|o| {
            stage.document().style(&o.id).map(|style| OverlayUpdate {
                id: o.id.clone(),
                style,
            })
        })
        .collect();
    let report = serde_json::json!({
        "progress": update.progress,
        "frame": update.frame,
        "overlays": overlays_json(&overlays),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scrub(config: ReelConfig, args: ScrubArgs) -> anyhow::Result<()> {
    if args.steps == 0 {
        anyhow::bail!("--steps must be >= 1");
    }
    let mut stage = mount(config, &args.page)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let max_scroll_top = stage
        .document()
        .max_scroll_top(&stage.config().elements.scroll_container);

    let mut written = 0usize;
    let first_frame = stage.current_frame();
    if stage.store().get(first_frame).is_some() {
        write_png(&stage.snapshot(), &args.out_dir.join("scrub_0000.png"))?;
        written += 1;
    } else {
        tracing::warn!(
            frame = %first_frame,
            "first frame unavailable, not writing scrub_0000.png"
        );
    }

    for step in 1..=args.steps {
        let scroll_top = max_scroll_top * f64::from(step) / f64::from(args.steps);
        stage.document_mut().set_scroll_top(scroll_top);
        stage.on_scroll()?;
        if let Some(DrawOutcome::Drawn(_)) = stage.on_animation_frame()? {
            let out = args.out_dir.join(format!("scrub_{step:04}.png"));
            write_png(&stage.snapshot(), &out)?;
            written += 1;
        }
    }

    let stats = stage.stats();
    tracing::info!(draws = stats.draws, skipped = stats.skipped, "scrub finished");
    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_overlays(config: &ReelConfig, args: &OverlaysArgs) -> anyhow::Result<()> {
    if !args.progress.is_finite() {
        anyhow::bail!("--progress must be finite");
    }
    let animator = OverlayAnimator::new(config.overlays.clone());
    let updates = animator.update(args.progress.clamp(0.0, 1.0));
    println!("{}", serde_json::to_string_pretty(&overlays_json(&updates))?);
    Ok(())
}

fn overlays_json(updates: &[OverlayUpdate]) -> serde_json::Value {
    let map = updates
        .iter()
        .map(|u| {
            (
                u.id.clone(),
                serde_json::json!({
                    "opacity": u.style.opacity,
                    "transform": u.style.css_transform(),
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if frame.width == 0 || frame.height == 0 {
        anyhow::bail!("canvas has no area; nothing to write");
    }
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let straight = frame.clone().into_straight();
    image::save_buffer_with_format(
        out,
        &straight.data,
        straight.width,
        straight.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}
