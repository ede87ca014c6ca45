//! boxarr - Boxes and Arrows CLI
//!
//! Usage:
//!   boxarr [OPTIONS] [INPUT]
//!
//! Reads the diagram from INPUT or stdin. The SVG goes to `--output`, else
//! to `<input stem>.svg` in the working directory, else to stdout.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::LevelFilter;

use boxes_and_arrows::{render_commands, render_with_config, RenderConfig, RenderError};

#[derive(Parser)]
#[command(name = "boxarr")]
#[command(about = "Generates a diagram from a boxes-and-arrows description")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Output file (defaults to the input name with an .svg extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the draw commands instead of writing SVG
    #[arg(long)]
    commands: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let config = match &cli.config {
        Some(path) => match RenderConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => RenderConfig::default(),
    };

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };
    let filename = cli
        .input
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    if cli.commands {
        match render_commands(&source, &config) {
            Ok(commands) => {
                for command in commands {
                    println!("{:?}", command);
                }
            }
            Err(e) => fail(&e, &source, &filename),
        }
        return;
    }

    let svg = match render_with_config(&source, &config) {
        Ok(svg) => svg,
        Err(e) => fail(&e, &source, &filename),
    };

    let target = cli
        .output
        .clone()
        .or_else(|| cli.input.as_deref().map(|p| PathBuf::from(svg_file_name(p))));
    let written = match &target {
        Some(path) => fs::write(path, &svg),
        None => io::stdout().write_all(svg.as_bytes()),
    };
    if let Err(e) = written {
        let name = target
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        eprintln!("Error writing '{}': {}", name, e);
        process::exit(1);
    }
}

fn fail(error: &RenderError, source: &str, filename: &str) -> ! {
    match error {
        RenderError::Parse(errors) => {
            for e in errors {
                eprint!("{}", e.format(source, filename));
            }
        }
        other => eprintln!("Error: {}", other),
    }
    process::exit(1);
}

/// Output name for `input`: its file name up to the first `.`, plus `.svg`
fn svg_file_name(input: &Path) -> String {
    let basename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = basename.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        "output.svg".to_string()
    } else {
        format!("{}.svg", stem)
    }
}
