//! CLI definition and the command handler.

use crate::config::{Context, StereotypeConfig, DEFAULT_METHODS_PER_CLASS_THRESHOLD};
use crate::driver;
use anyhow::{Context as _, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "stereotyper")]
#[command(about = "Annotate a parsed-source XML archive with method and class stereotypes")]
#[command(version)]
pub struct Cli {
    /// Input archive, or `-` for stdin
    pub input: PathBuf,

    /// Annotated archive output (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the built-in primitive type table
    #[arg(long, env = "STEREOTYPER_PRIMITIVES")]
    pub primitives: Option<PathBuf>,

    /// Replace the built-in stereotype taxonomy
    #[arg(long, env = "STEREOTYPER_STEREOTYPES")]
    pub stereotypes: Option<PathBuf>,

    /// Method count above which a class can be labelled large-class
    #[arg(long, default_value_t = DEFAULT_METHODS_PER_CLASS_THRESHOLD)]
    pub methods_per_class_threshold: usize,

    /// Write a JSON summary report to this path (`-` for stdout)
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> StereotypeConfig {
        StereotypeConfig {
            methods_per_class_threshold: self.methods_per_class_threshold,
            primitives_path: self.primitives.clone(),
            stereotypes_path: self.stereotypes.clone(),
        }
    }
}

pub fn handle_annotate(cli: &Cli) -> Result<()> {
    let ctx = Context::from_config(&cli.config())?;
    let input = read_input(&cli.input)?;
    let annotated = driver::annotate(&input, &ctx)?;

    match &cli.output {
        Some(path) => std::fs::write(path, &annotated.xml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", annotated.xml),
    }

    if let Some(path) = &cli.report {
        if path.as_os_str() == "-" {
            annotated.report.write_json(std::io::stdout().lock())?;
        } else {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            annotated.report.write_json(file)?;
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read archive from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["stereotyper", "archive.xml"]);
        assert_eq!(cli.input, PathBuf::from("archive.xml"));
        assert_eq!(cli.methods_per_class_threshold, 21);
        assert!(cli.output.is_none());
        assert!(cli.report.is_none());
    }

    #[test]
    fn cli_parses_full_surface() {
        let cli = Cli::parse_from([
            "stereotyper",
            "in.xml",
            "-o",
            "out.xml",
            "--primitives",
            "prims.txt",
            "--stereotypes",
            "labels.txt",
            "--methods-per-class-threshold",
            "30",
            "--report",
            "report.json",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("out.xml")));
        assert_eq!(cli.methods_per_class_threshold, 30);
        assert_eq!(cli.config().primitives_path, Some(PathBuf::from("prims.txt")));
    }
}
