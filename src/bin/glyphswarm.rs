use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glyphswarm::LetterStage as _;

#[derive(Parser, Debug)]
#[command(name = "glyphswarm", version)]
struct Cli {
    /// Show config JSON. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra font directory, may be repeated.
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Write the particle texture atlas as a PNG.
    Atlas(AtlasArgs),
    /// Dump the first cycle's motion plans as JSON.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Time offset in seconds from the start of the show.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Length of the video in seconds.
    #[arg(long, default_value_t = 30.0)]
    secs: f64,

    /// Refuse to overwrite an existing output.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct AtlasArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => glyphswarm::ShowConfig::from_path(path)?,
        None => glyphswarm::ShowConfig::default(),
    };
    config.fonts.dirs.extend(cli.font_dirs.iter().cloned());

    match cli.cmd {
        Command::Frame(args) => cmd_frame(&config, args),
        Command::Render(args) => cmd_render(&config, args),
        Command::Atlas(args) => cmd_atlas(&config, args),
        Command::Plan(args) => cmd_plan(&config, args),
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

fn cmd_frame(config: &glyphswarm::ShowConfig, args: FrameArgs) -> anyhow::Result<()> {
    if !args.at.is_finite() || args.at < 0.0 {
        anyhow::bail!("--at must be a finite, non-negative number of seconds");
    }
    let mut show = glyphswarm::Show::from_config(config)?;
    show.advance_to(args.at)?;
    let frame = show.render_frame()?;
    frame.save_png(&args.out)?;

    eprintln!(
        "wrote {} (cycle {}, '{}')",
        args.out.display(),
        show.driver().state().cycle_id,
        show.driver().state().word
    );
    Ok(())
}

fn cmd_render(config: &glyphswarm::ShowConfig, args: RenderArgs) -> anyhow::Result<()> {
    if !args.secs.is_finite() || args.secs <= 0.0 {
        anyhow::bail!("--secs must be a finite, positive number of seconds");
    }
    let mut show = glyphswarm::Show::from_config(config)?;
    let frames = show.fps().secs_to_frames_floor(args.secs).max(1);

    let sink_opts = glyphswarm::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: !args.no_overwrite,
    };
    let mut sink = glyphswarm::FfmpegSink::new(sink_opts);
    show.render_to_sink(frames, &mut sink)?;

    eprintln!("wrote {} ({frames} frames)", args.out.display());
    Ok(())
}

fn cmd_atlas(config: &glyphswarm::ShowConfig, args: AtlasArgs) -> anyhow::Result<()> {
    config.validate()?;
    let mut rng = rand::rng();
    let mut stage = config.build_stage(config.load_fonts(), &mut rng)?;
    stage.create_particles(&mut rng)?;
    let atlas = stage
        .atlas()
        .context("atlas was not built by the letter stage")?;
    atlas.save_png(&args.out)?;

    eprintln!(
        "wrote {} ({n}x{n} cells of {px} px)",
        args.out.display(),
        n = atlas.matrix_len(),
        px = atlas.cell_px()
    );
    Ok(())
}

fn cmd_plan(config: &glyphswarm::ShowConfig, args: PlanArgs) -> anyhow::Result<()> {
    let show = glyphswarm::Show::from_config(config)?;
    let dump = serde_json::json!({
        "state": show.driver().state(),
        "plans": show.driver().plans(),
    });
    let text = serde_json::to_string_pretty(&dump).context("serialize plans")?;

    match args.out {
        Some(path) => {
            glyphswarm::ensure_parent_dir(&path)?;
            std::fs::write(&path, text)
                .with_context(|| format!("write plans '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
