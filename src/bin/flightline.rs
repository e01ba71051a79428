use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use flightline::{
    Compositor, ControlClient, ControlServer, EntitySpec, FrameSink, LatestFrameSink, PathMap,
    PngSequenceSink, RenderLoopOpts, Request, Rgba8, Stage, StageConfig, render_road_map,
    run_render_loop,
};
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "flightline", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the animation with the control server.
    Run(RunArgs),
    /// Render only the road-map background of a path to PNG.
    Roadmap(RoadmapArgs),
    /// Send one command to a running control server.
    Ctl(CtlArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Stage configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many render ticks.
    #[arg(long)]
    frames: Option<u64>,

    /// Write frames as PNGs into this directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Keep every K-th frame.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Override the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct RoadmapArgs {
    /// Stage configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// JSON file with `[[x, y], ...]` checkpoints; a random path is drawn otherwise.
    #[arg(long)]
    checkpoints: Option<PathBuf>,

    /// Override the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct CtlArgs {
    /// Control server address.
    #[arg(long, default_value = "127.0.0.1:37123")]
    addr: String,

    #[command(subcommand)]
    op: CtlOp,
}

#[derive(Subcommand, Debug)]
enum CtlOp {
    /// List entities.
    List,
    /// Add a random entity and start it.
    Add,
    /// Remove an entity.
    Remove { name: String },
    /// Start an entity (`*` for all).
    Start { name: String },
    /// Stop an entity (`*` for all).
    Stop { name: String },
    /// Show or hide the effect-range outline (`*` for all).
    Range {
        name: String,
        #[arg(long)]
        hide: bool,
    },
    /// Set speed.
    Speed { name: String, speed: f64 },
    /// Set emission rate (`*` for all).
    Rate { name: String, rate: f64 },
    /// Move an entity back to the path start.
    Reset { name: String },
    /// Rebuild the path; random when no checkpoint file is given.
    Regenerate {
        #[arg(long)]
        checkpoints: Option<PathBuf>,
    },
    /// Set speed and color.
    Update {
        name: String,
        speed: f64,
        /// Color as `r,g,b` or `r,g,b,a`.
        #[arg(value_parser = parse_color)]
        color: Rgba8,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Roadmap(args) => cmd_roadmap(args),
        Command::Ctl(args) => cmd_ctl(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<StageConfig> {
    let mut config = match path {
        Some(path) => StageConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => StageConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

fn read_checkpoints(path: &Path) -> anyhow::Result<Vec<[f64; 2]>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read checkpoints '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse checkpoints '{}'", path.display()))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), args.seed)?;
    let fps = config.fps().context("configured fps")?;
    let control_addr = (config.control.host.clone(), config.control.port);

    let stage = Arc::new(Stage::new(config).context("build stage")?);
    for (name, color, speed) in [
        ("entity-1", Rgba8::opaque(255, 255, 0), 1.3),
        ("entity-2", Rgba8::opaque(255, 0, 0), 0.7),
    ] {
        stage
            .add_entity_with(EntitySpec {
                name: Some(name.to_string()),
                color,
                speed,
                start: true,
            })
            .with_context(|| format!("add {name}"))?;
    }

    let server = ControlServer::bind(control_addr, Arc::clone(&stage))
        .context("start control server")?;
    eprintln!("control server on {}", server.local_addr());

    let mut compositor = Compositor::new(stage.config(), stage.fork_rng()?)?;
    let mut sink: Box<dyn FrameSink> = match &args.out_dir {
        Some(dir) => Box::new(PngSequenceSink::new(dir)),
        None => Box::new(LatestFrameSink::new()),
    };
    let opts = RenderLoopOpts {
        fps,
        max_frames: args.frames,
        every: args.every,
    };
    let stop = AtomicBool::new(false);
    let stats = run_render_loop(&stage, &mut compositor, sink.as_mut(), &opts, &stop)
        .context("render loop")?;

    server.shutdown();
    stage.shutdown().context("stop entities")?;
    eprintln!(
        "rendered {} frames ({} kept) at {:.1} fps",
        stats.frames,
        stats.pushed,
        stats.fps()
    );
    Ok(())
}

fn cmd_roadmap(args: RoadmapArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), args.seed)?;
    let map = match &args.checkpoints {
        Some(path) => {
            let pairs = read_checkpoints(path)?;
            let points = flightline::path::checkpoints_from_pairs(&pairs)?;
            PathMap::build(&points, &config.path)?
        }
        None => {
            let mut rng = rand_pcg::Pcg64::seed_from_u64(config.seed.unwrap_or_else(rand::random));
            PathMap::random(&config.path, &mut rng)?
        }
    };
    let frame = render_road_map(&map, config.canvas)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_ctl(args: CtlArgs) -> anyhow::Result<()> {
    let client = ControlClient::resolve(args.addr.as_str())?;
    let request = match args.op {
        CtlOp::List => Request::ListEntities,
        CtlOp::Add => Request::AddEntity,
        CtlOp::Remove { name } => Request::RemoveEntity { name },
        CtlOp::Start { name } => Request::SetRunning {
            name,
            running: true,
        },
        CtlOp::Stop { name } => Request::SetRunning {
            name,
            running: false,
        },
        CtlOp::Range { name, hide } => Request::SetEffectRangeVisible {
            name,
            visible: !hide,
        },
        CtlOp::Speed { name, speed } => Request::SetSpeed { name, speed },
        CtlOp::Rate { name, rate } => Request::SetEmissionRate { name, rate },
        CtlOp::Reset { name } => Request::ResetDistance { name },
        CtlOp::Regenerate { checkpoints } => Request::RegeneratePath {
            checkpoints: checkpoints.as_deref().map(read_checkpoints).transpose()?,
        },
        CtlOp::Update { name, speed, color } => Request::UpdateEntity { name, speed, color },
    };
    let response = client
        .call(&request)
        .with_context(|| format!("send {}", request.command()))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_ok() {
        anyhow::bail!("{} failed: {}", request.command(), response.message);
    }
    Ok(())
}

fn parse_color(s: &str) -> Result<Rgba8, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u8>().map_err(|e| format!("bad channel '{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [r, g, b] => Ok(Rgba8::opaque(*r, *g, *b)),
        [r, g, b, a] => Ok(Rgba8::new(*r, *g, *b, *a)),
        _ => Err(format!("expected r,g,b or r,g,b,a, got '{s}'")),
    }
}
