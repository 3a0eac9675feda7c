//! pseudojava - compile pseudo-Java sources to Java.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::compile::Emit;
use config::PseudoJavaConfig;
use pseudojava_compiler::{CompileOptions, Layout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pseudojava")]
#[command(about = "Compile pseudo-Java sources to Java", version)]
struct Cli {
    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root used to find .pseudojava/config.toml
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that run the compiler.
#[derive(clap::Args)]
struct CompileFlags {
    /// Output grouping: single-file or per-template
    #[arg(long)]
    layout: Option<Layout>,

    /// Driver class name (overrides the `program` line)
    #[arg(long)]
    program_name: Option<String>,

    /// Spaces per indentation level in generated Java
    #[arg(long)]
    indent: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .pj file and write the generated files
    Compile {
        /// Source file
        input: PathBuf,

        /// Directory for generated files (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// What to write
        #[arg(long, value_enum, default_value_t = Emit::Java)]
        emit: Emit,

        #[command(flatten)]
        flags: CompileFlags,
    },

    /// Compile in memory and report errors without writing anything
    Check {
        /// Source file
        input: PathBuf,

        #[command(flatten)]
        flags: CompileFlags,
    },
}

/// Install a stderr subscriber when `PSEUDOJAVA_LOG` is set or `-v` is given.
fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_env("PSEUDOJAVA_LOG") {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values, then command-line flags on top.
fn options(config: &PseudoJavaConfig, flags: CompileFlags) -> CompileOptions {
    let mut options = config.compile_options();
    if let Some(layout) = flags.layout {
        options.layout = layout;
    }
    if let Some(indent) = flags.indent {
        options.indent = indent;
    }
    if flags.program_name.is_some() {
        options.program_name = flags.program_name;
    }
    options
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = PseudoJavaConfig::load(&root)?;

    match cli.command {
        Commands::Compile {
            input,
            output_dir,
            emit,
            flags,
        } => {
            let output_dir = output_dir
                .or_else(|| config.output.dir.as_ref().map(|dir| root.join(dir)))
                .unwrap_or_else(|| {
                    input
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from("."))
                });
            let options = options(&config, flags);
            for path in commands::compile::cmd_compile(&input, &output_dir, emit, &options)? {
                println!("{}", path.display());
            }
        }
        Commands::Check { input, flags } => {
            let options = options(&config, flags);
            println!("{}", commands::check::cmd_check(&input, &options)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
