use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trq_image::config::{self, OptimizeConfig};
use trq_image::imaging::RustBackend;
use trq_image::mapping::{self, SyncRoots};
use trq_image::sync::{self, Dispatcher, Synchronizer};
use trq_image::{output, watch};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

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
#[command(name = "trq-image")]
#[command(about = "Multi-resolution image assets for static sites")]
#[command(long_about = "\
Multi-resolution image assets for static sites

Every image under <src>/images/ is resized to each configured scale tier,
re-encoded to each configured format, and written with a verbatim @raw copy
under <public>/<output_dir>/. Other files are copied unchanged.

  src/images/
  ├── blog/hero.png          → public/images/blog/hero.webp
  │                            public/images/blog/hero@2x.webp
  │                            public/images/blog/hero@raw.png
  ├── blog/logo@2x.png       # declared ratio 2: only tiers with dpr <= max/2
  └── fonts/body.woff2       → public/images/fonts/body.woff2

'watch' keeps the output tree in sync while you work. It only rebuilds
everything on startup with --resize or RESIZE_IMAGES=true.

Run 'trq-image gen-config' to generate a documented trq-image.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Source root, relative to the project root; images are read from <src-dir>/images
    #[arg(long, default_value = "src", global = true)]
    src_dir: PathBuf,

    /// Public root, relative to the project root
    #[arg(long, default_value = "public", global = true)]
    public_dir: PathBuf,

    /// Config file [default: <root>/trq-image.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (capped at the number of CPU cores)
    #[arg(long, short = 'j', global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wipe the output directory and regenerate every asset
    Sync,
    /// Watch the source directory and keep the output in sync
    Watch {
        /// Run a full sync before watching (same as RESIZE_IMAGES=true)
        #[arg(long)]
        resize: bool,
    },
    /// Print the artifacts a source file maps to, without writing anything
    Plan {
        /// Source file, e.g. src/images/blog/hero@2x.png
        path: PathBuf,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Print a stock trq-image.toml with all options documented
    GenConfig,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match &cli.command {
        Command::Sync => {
            let (roots, cfg) = load_project(&cli)?;
            init_thread_pool(cli.jobs);
            let synchronizer = Synchronizer::new(RustBackend::new(), roots.clone(), cfg);
            let report = synchronizer.full_sync()?;
            for event in &report.events {
                output::log_event_report(event, &roots);
            }
            output::print_sync_summary(&report, &roots);
            if report.stats().failures() > 0 {
                std::process::exit(1);
            }
        }
        Command::Watch { resize } => {
            let (roots, cfg) = load_project(&cli)?;
            init_thread_pool(cli.jobs);
            run_watch(roots, cfg, *resize || sync::force_from_env())?;
        }
        Command::Plan { path } => {
            let (roots, cfg) = load_project(&cli)?;
            print_plan(&std::path::absolute(path)?, &roots, &cfg)?;
        }
        Command::Config => {
            let (_, cfg) = load_project(&cli)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the project layout and load its config.
fn load_project(cli: &Cli) -> CliResult<(SyncRoots, OptimizeConfig)> {
    let root = std::path::absolute(&cli.root)?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(config::CONFIG_FILENAME));
    let cfg = config::load_config(&config_path)?;
    let roots =
        SyncRoots::from_project(&root.join(&cli.src_dir), &root.join(&cli.public_dir), &cfg);
    Ok((roots, cfg))
}

fn run_watch(roots: SyncRoots, cfg: OptimizeConfig, force: bool) -> CliResult<()> {
    let synchronizer = Arc::new(Synchronizer::new(RustBackend::new(), roots, cfg));
    // A failed startup sync is already logged; watching continues regardless.
    if let Ok(Some(report)) = synchronizer.start(force) {
        output::print_sync_summary(&report, synchronizer.roots());
    }

    let dispatcher = Dispatcher::new(synchronizer, None);
    watch::watch(&dispatcher)?;
    dispatcher.wait_idle();
    Ok(())
}

fn print_plan(source: &Path, roots: &SyncRoots, cfg: &OptimizeConfig) -> CliResult<()> {
    if mapping::is_image(source) {
        let plan = mapping::plan_outputs(source, roots, cfg)?;
        output::print_plan(source, &plan, roots);
    } else {
        let mirrored = roots.mirror(source)?;
        println!("{} (copied)", roots.display_output(&mirrored));
    }
    Ok(())
}

/// Install the `tracing` subscriber: compact fmt to stderr, `RUST_LOG` filter, default `info`.
fn init_tracing() -> CliResult<()> {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(jobs: Option<usize>) {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let threads = jobs.map_or(cores, |j| j.clamp(1, cores));
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
