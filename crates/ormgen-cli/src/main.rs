//! ormgen command-line loader
//!
//! Reads a catalog from SQLite or a JSON snapshot and dumps or traces the
//! generated schema.

use clap::{ArgGroup, Parser};
use ormgen_core::catalog::{CatalogDriver, CatalogSnapshot, SnapshotDriver};
use ormgen_core::{LoadReport, Loader, LoaderConfig, SqliteDriver};
use std::path::PathBuf;
use tracing::info;

/// ormgen schema loader
#[derive(Parser, Debug)]
#[command(name = "ormgen")]
#[command(version, about = "Generate ORM class definitions from a database catalog")]
#[command(group(ArgGroup::new("source").required(true).args(["sqlite", "snapshot"])))]
pub struct Args {
    /// SQLite database file
    #[arg(long)]
    pub sqlite: Option<PathBuf>,

    /// JSON catalog snapshot
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// JSON loader config; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Namespace for generated classes, e.g. my_app::schema
    #[arg(short = 'n', long)]
    pub schema_name: Option<String>,

    /// Directory to dump artifacts into
    #[arg(short = 'o', long)]
    pub dump_dir: Option<PathBuf>,

    /// Only load tables matching this pattern
    #[arg(long)]
    pub constraint: Option<String>,

    /// Skip tables matching this pattern
    #[arg(long)]
    pub exclude: Option<String>,

    /// Infer relationships from foreign keys
    #[arg(long)]
    pub relationships: bool,

    /// Print the operation trace
    #[arg(long)]
    pub debug: bool,

    /// Delete existing artifacts before dumping
    #[arg(long, conflicts_with = "merge")]
    pub really_erase_my_files: bool,

    /// Rewrite generated regions in place, keeping custom code
    #[arg(long)]
    pub merge: bool,

    /// Directory searched for class extensions (repeatable)
    #[arg(long = "extension-dir")]
    pub extension_dirs: Vec<PathBuf>,

    /// Print the table to moniker map as JSON
    #[arg(long)]
    pub print_monikers: bool,

    /// Write the catalog to this JSON snapshot and exit
    #[arg(long)]
    pub capture: Option<PathBuf>,
}

impl Args {
    /// Config file values with flags applied on top.
    fn loader_config(&self) -> ormgen_core::Result<LoaderConfig> {
        let mut config = match &self.config {
            Some(path) => LoaderConfig::from_path(path)?,
            None => LoaderConfig::default(),
        };

        if let Some(name) = &self.schema_name {
            config.schema_name = Some(name.clone());
        }
        if let Some(dir) = &self.dump_dir {
            config.dump_directory = Some(dir.clone());
        }
        if let Some(pattern) = &self.constraint {
            config.constraint = Some(pattern.clone());
        }
        if let Some(pattern) = &self.exclude {
            config.exclude = Some(pattern.clone());
        }
        config.relationships |= self.relationships;
        config.debug |= self.debug;
        config.really_erase_my_files |= self.really_erase_my_files;
        config.merge_existing |= self.merge;
        config.extension_dirs.extend(self.extension_dirs.iter().cloned());

        Ok(config)
    }

    fn open_driver(&self) -> ormgen_core::Result<Box<dyn CatalogDriver>> {
        if let Some(path) = &self.sqlite {
            info!(path = %path.display(), "opening sqlite catalog");
            return Ok(Box::new(SqliteDriver::open(path)?));
        }
        let path = self.snapshot.clone().unwrap_or_default();
        info!(path = %path.display(), "reading catalog snapshot");
        Ok(Box::new(SnapshotDriver::new(CatalogSnapshot::from_path(&path)?)))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ormgen=info".parse().unwrap())
                .add_directive("ormgen_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = args.open_driver()?;

    if let Some(path) = &args.capture {
        let snapshot = CatalogSnapshot::capture(driver.as_mut())?;
        std::fs::write(path, snapshot.to_json()?)?;
        info!(
            path = %path.display(),
            tables = snapshot.tables.len(),
            "catalog captured"
        );
        return Ok(());
    }

    let options = args.loader_config()?.into_options()?;
    let report = Loader::new(options)?.load(driver.as_mut())?;
    print_report(&args, &report)?;
    Ok(())
}

fn print_report(args: &Args, report: &LoadReport) -> Result<(), Box<dyn std::error::Error>> {
    for line in &report.trace {
        println!("{line}");
    }

    if args.print_monikers {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.registry.moniker_map())?
        );
    }

    if let Some(dump) = &report.dump {
        println!(
            "{} class(es): {} written, {} deleted, {} unchanged",
            report.registry.len(),
            dump.written.len(),
            dump.deleted.len(),
            dump.unchanged.len()
        );
    }
    if !report.warnings.is_empty() {
        println!("{} warning(s)", report.warnings.len());
    }
    Ok(())
}
