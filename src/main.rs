//! KI Fingerprint - Main Entry Point
//!
//! Command line front end for the identity engine: serves the REST API,
//! prints profiles, perturbs PNG files and issues seeds.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ki_fingerprint_engine::{
    api::ApiServer,
    config::{CliArgs, EngineSettings},
    IdentityEngine, PixelBuffer, Seed, NAME, VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}

/// Print the startup banner with version
fn print_banner() {
    println!(
        r#"
{cyan}{bold}  KI-Fingerprint{reset}
{dim}  Coherent device identities and edge-aware canvas noise{reset}
{dim}  Version: {version}{reset}
"#,
        cyan = colors::CYAN,
        bold = colors::BOLD,
        reset = colors::RESET,
        dim = colors::DIM,
        version = VERSION
    );
}

/// Print configuration summary
fn print_config_summary(settings: &EngineSettings, engine: &IdentityEngine) {
    println!(
        "{bold}{blue}Configuration:{reset}",
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
    println!(
        "  {dim}Catalog:{reset}        {}",
        match settings.catalog_path {
            Some(ref path) => path.display().to_string(),
            None => "bundled".to_string(),
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Archetypes:{reset}     {}{}",
        engine.catalog().len(),
        if engine.catalog().is_fallback() {
            format!(" {yellow}(fallback){reset}", yellow = colors::YELLOW, reset = colors::RESET)
        } else {
            String::new()
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Max Scopes:{reset}     {}",
        settings.max_scopes,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Rotation:{reset}       {}ms",
        settings.rotation_max_age_ms,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Noise:{reset}          level {} / edge threshold {}",
        settings.noise_level,
        settings.edge_threshold,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}API Server:{reset}     {}",
        if settings.api_enabled {
            format!(
                "{green}http://127.0.0.1:{}{reset}",
                settings.api_port,
                green = colors::GREEN,
                reset = colors::RESET
            )
        } else {
            format!("{yellow}disabled{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!();
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author("KI-Browser Team")
        .about("Deterministic, coherent device identities for browser automation")
        .long_about(
            "KI-Fingerprint synthesizes device identities from a seed:\n\
             - Weighted archetype catalog (JSON or TOML)\n\
             - Consistent OS, hardware, display, locale and user agent\n\
             - Edge-aware canvas noise keyed to the same seed\n\
             - REST API for remote callers",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("FILE")
                .help("Archetype catalog file (JSON or TOML)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("noise-level")
                .long("noise-level")
                .value_name("FRACTION")
                .help("Canvas noise amplitude as a fraction of full scale (default: 0.001)")
                .value_parser(clap::value_parser!(f64))
                .global(true),
        )
        .arg(
            Arg::new("edge-threshold")
                .long("edge-threshold")
                .value_name("MAGNITUDE")
                .help("Sobel magnitude a pixel must exceed to receive noise (default: 30)")
                .value_parser(clap::value_parser!(f64))
                .global(true),
        )
        .arg(
            Arg::new("max-scopes")
                .long("max-scopes")
                .value_name("COUNT")
                .help("Maximum number of scopes held in memory")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Start the REST API server")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("API server port (default: 9333)")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Print the profile for a scope as JSON")
                .arg(
                    Arg::new("scope")
                        .long("scope")
                        .value_name("NAME")
                        .help("Scope key")
                        .default_value("default"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("HEX")
                        .help("Use this seed instead of issuing a fresh one"),
                ),
        )
        .subcommand(
            Command::new("perturb")
                .about("Apply seeded edge noise to a PNG image")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("HEX")
                        .help("Seed keying the noise")
                        .required(true),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .help("Input image")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output PNG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true),
                ),
        )
        .subcommand(Command::new("seed").about("Print a freshly generated seed"))
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.catalog_path = matches.get_one::<PathBuf>("catalog").cloned();
    args.noise_level = matches.get_one::<f64>("noise-level").copied();
    args.edge_threshold = matches.get_one::<f64>("edge-threshold").copied();
    args.max_scopes = matches.get_one::<usize>("max-scopes").copied();

    if let Some(("serve", serve)) = matches.subcommand() {
        args.api_port = serve.get_one::<u16>("port").copied();
        args.api_enabled = Some(true);
    }

    args
}

/// Initialize the tracing/logging subsystem
///
/// Logs go to stderr so JSON written to stdout stays parseable.
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "tower_http=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Run the API server until Ctrl+C
async fn run_server(
    settings: &EngineSettings,
    engine: Arc<IdentityEngine>,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        print_banner();
        print_config_summary(settings, &engine);
    }

    info!("Starting API server on port {}...", settings.api_port);
    let mut server = ApiServer::new(settings.api_port, engine);
    server
        .start()
        .await
        .with_context(|| format!("Failed to start API server on port {}", settings.api_port))?;

    if !quiet {
        println!(
            "{green}{bold}API Server started:{reset} http://127.0.0.1:{}",
            settings.api_port,
            green = colors::GREEN,
            bold = colors::BOLD,
            reset = colors::RESET
        );
        println!(
            "{dim}Press Ctrl+C to stop{reset}",
            dim = colors::DIM,
            reset = colors::RESET
        );
        println!();
    }

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal, stopping gracefully...");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    server.stop().await;
    Ok(())
}

/// Print a scope's profile as pretty JSON
fn run_profile(engine: &IdentityEngine, matches: &ArgMatches) -> Result<()> {
    let scope = matches
        .get_one::<String>("scope")
        .map(String::as_str)
        .unwrap_or("default");

    let profile = match matches.get_one::<String>("seed") {
        Some(token) => {
            let seed = Seed::new(token.as_str()).context("Invalid --seed")?;
            engine.pin_seed(scope, seed)
        }
        None => engine.get_profile(scope),
    };

    let json = serde_json::to_string_pretty(&*profile).context("Failed to serialize profile")?;
    println!("{}", json);
    Ok(())
}

/// Perturb a PNG file under a seed
fn run_perturb(engine: &IdentityEngine, matches: &ArgMatches) -> Result<()> {
    let token = matches
        .get_one::<String>("seed")
        .context("Missing --seed")?;
    let input = matches
        .get_one::<PathBuf>("input")
        .context("Missing --input")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("Missing --output")?;

    let seed = Seed::new(token.as_str()).context("Invalid --seed")?;
    let image = image::open(input)
        .with_context(|| format!("Failed to read image {}", input.display()))?
        .to_rgba8();
    let buffer = PixelBuffer::from(image);

    let perturbed = engine
        .try_perturb_pixels(&seed, buffer.width(), buffer.height(), buffer.data())
        .context("Failed to perturb image")?;
    let changed = perturbed
        .iter()
        .zip(buffer.data())
        .filter(|(a, b)| a != b)
        .count();

    let out = PixelBuffer::new(buffer.width(), buffer.height(), perturbed.into_owned())?
        .into_image()?;
    out.save(output)
        .with_context(|| format!("Failed to write image {}", output.display()))?;

    info!(
        "Wrote {} ({}x{}, {} channel values changed)",
        output.display(),
        buffer.width(),
        buffer.height(),
        changed
    );
    Ok(())
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    init_tracing(verbosity, quiet);

    match matches.subcommand() {
        Some(("seed", _)) => {
            println!("{}", Seed::generate());
            return Ok(());
        }
        Some(("profile", _)) | Some(("perturb", _)) | Some(("serve", _)) | None => {}
        Some((other, _)) => anyhow::bail!("Unknown command: {}", other),
    }

    let cli_args = parse_cli_args(&matches);
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    let engine = Arc::new(IdentityEngine::new(&settings));

    match matches.subcommand() {
        Some(("profile", sub)) => run_profile(&engine, sub),
        Some(("perturb", sub)) => run_perturb(&engine, sub),
        Some(("serve", _)) => run_server(&settings, engine, quiet).await,
        _ if settings.api_enabled => run_server(&settings, engine, quiet).await,
        _ => {
            build_cli().print_help()?;
            println!();
            Ok(())
        }
    }
}
