use clap::{Parser, Subcommand};
use picturephone_archive::imaging::RustBackend;
use picturephone_archive::pipeline::{self, BuildOptions};
use picturephone_archive::{config, manifest, output};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ARCHIVE_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("ARCHIVE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "picturephone-archive")]
#[command(about = "Archive Broken Picture Phone game exports into a manifest and images")]
#[command(long_about = "\
Archive Broken Picture Phone game exports into a manifest and images

Every saved game page in the source directory becomes one entry in a JSON
manifest; embedded drawings are written out as image files. Re-running is
cheap: games whose images are all still on disk are reused as they are.

Layout:

  books/
  ├── config.toml                   # Optional, see 'gen-config'
  ├── 1610000000000-export.html     # 13-digit epoch millis in the name
  └── export (3).html               # ...or a date in the title heading
  src/manifest.json                 # Written by 'build', newest game first
  public/images/                    # {game}-{author}-{page}[-{player}].{ext}

Set PICTUREPHONE_STRICT=1 (or pass --strict) to fail the build, without
touching the manifest, when any document cannot be archived.

Logging goes to stderr and is controlled with RUST_LOG (default: info).")]
#[command(version = version_string())]
struct Cli {
    /// Directory of export documents
    #[arg(long, default_value = "books", global = true)]
    source: PathBuf,

    /// Manifest file to write (and reuse on the next run)
    #[arg(long, default_value = "src/manifest.json", global = true)]
    manifest: PathBuf,

    /// Directory for extracted images
    #[arg(long, default_value = "public/images", global = true)]
    images: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Ignore the previous manifest and reparse every document
    #[arg(long)]
    no_cache: bool,

    /// Exit non-zero, without writing the manifest, if any document fails
    #[arg(long, env = pipeline::STRICT_ENV, value_parser = clap::builder::FalseyValueParser::new())]
    strict: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract all export documents into the manifest and image directory
    Build(BuildArgs),
    /// Summarize the current manifest
    Stats,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Build(args) => {
            let options = BuildOptions {
                source: cli.source,
                manifest: cli.manifest,
                images: cli.images,
                use_cache: !args.no_cache,
                strict: args.strict,
            };
            let config = config::load_config(&options.source)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_document_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result =
                pipeline::run_with_config(&RustBackend::new(), &options, &config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;

            output::print_run_summary(&report, &options.manifest);
            if !report.manifest_written {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Stats => {
            let games = manifest::load(&cli.manifest)?;
            output::print_stats(&games);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
