use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use routebanner::config::REQUIRED_VARIABLES;
use routebanner::{Banner, BannerReport, Config};
use url::Url;

/// Render a walking route between START_POINT and END_POINT onto each map
/// style listed in STYLES and save the images as PNG files.
#[derive(Parser, Debug)]
#[command(name = "routebanner", version, about)]
struct Cli {
    /// Load variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Directory to write images to (overrides OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// API host for both endpoints (overrides MAPBOX_API_URL)
    #[arg(long)]
    api_base: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Fetch the route and print the static-map URLs without requesting images
    #[arg(long)]
    dry_run: bool,

    /// Exit with status 2 if any style was rejected
    #[arg(long)]
    strict: bool,

    /// Log request details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

const EXIT_FAILURE: u8 = 1;
const EXIT_REJECTED: u8 = 2;

fn run(cli: &Cli) -> anyhow::Result<u8> {
    load_env_file(cli.env_file.as_deref())?;

    let mut config = Config::from_env().with_context(|| {
        format!(
            "config: check all required environment variables ({}) are set",
            REQUIRED_VARIABLES.join(", ")
        )
    })?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    config.timeout_ms = cli.timeout_ms;
    config.log();

    if cli.dry_run {
        let banner = Banner::new(&config)?;
        let (_, overlay) = banner.prepare().context("fetching route")?;
        for line in plan_lines(&banner.plan(&overlay)?) {
            println!("{line}");
        }
        return Ok(0);
    }

    let report = routebanner::run(&config).context("rendering banners")?;

    // Rejections were already logged by the renderer.
    for path in report.saved_paths() {
        println!("{}", path.display());
    }

    Ok(exit_status(&report, cli.strict))
}

/// 0 for a completed run; with `strict`, 2 if any style was rejected.
fn exit_status(report: &BannerReport, strict: bool) -> u8 {
    if strict && !report.all_saved() {
        EXIT_REJECTED
    } else {
        0
    }
}

/// Static-map URLs as printed by `--dry-run`, token masked.
fn plan_lines(urls: &[Url]) -> Vec<String> {
    urls.iter().map(routebanner::redacted).collect()
}

/// Load `.env` (or `path`) into the process environment. Variables already set
/// win. A missing default `.env` is fine; a missing explicit file is not.
fn load_env_file(path: Option<&std::path::Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            dotenvy::from_path(p).with_context(|| format!("loading {}", p.display()))?;
        }
        None => match dotenvy::dotenv() {
            Ok(p) => log::debug!("Loaded {}", p.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("loading .env"),
        },
    }
    Ok(())
}
