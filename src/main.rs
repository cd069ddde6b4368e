mod app;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use rdf_graph_explorer::source::{CommandSource, DataFeeder, DataSource, DatasetSource};
use rdf_graph_explorer::{Config, Explorer, NodeAttributes, NodeEntry};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON dataset to explore.
    #[arg(long, conflicts_with = "command")]
    dataset: Option<PathBuf>,

    /// Program queried for each fetch; its stdout must be a JSON batch.
    #[arg(long)]
    command: Option<String>,

    /// Leading argument passed to `--command`, repeatable.
    #[arg(long = "arg", requires = "command", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Identity to start from. Without it the session starts from the class listing.
    #[arg(long)]
    subject: Option<String>,

    /// Display label for `--subject`.
    #[arg(long, requires = "subject")]
    subject_label: Option<String>,

    /// Type identity of `--subject`, merged as a type edge before any fetch.
    #[arg(long, requires = "subject")]
    subject_type: Option<String>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout ticks per second.
    #[arg(long)]
    tick_rate: Option<f32>,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(tick_rate) = self.tick_rate {
            if !tick_rate.is_finite() || tick_rate <= 0.0 {
                bail!("--tick-rate must be a positive number, got {tick_rate}");
            }
            config.layout.tick_rate = tick_rate;
        }
        Ok(config)
    }

    fn build_source(&self) -> Result<(Arc<dyn DataSource>, String)> {
        if let Some(path) = &self.dataset {
            let source = DatasetSource::load(path)
                .with_context(|| format!("failed to load dataset {}", path.display()))?;
            return Ok((Arc::new(source), format!("dataset {}", path.display())));
        }

        if let Some(program) = &self.command {
            let source = CommandSource::new(program.clone(), self.args.clone());
            return Ok((Arc::new(source), format!("command {program}")));
        }

        Err(anyhow!("either --dataset or --command is required"))
    }

    fn subject(&self) -> Option<NodeEntry> {
        let identity = self.subject.clone()?;
        let mut attributes = NodeAttributes::default();
        if let Some(label) = &self.subject_label {
            attributes = attributes.with_primary_label(label.clone());
        }
        if let Some(type_identity) = &self.subject_type {
            attributes = attributes.with_type(type_identity.clone(), None);
        }
        Some(NodeEntry::new(identity).with_attributes(attributes))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let (source, source_label) = args.build_source()?;
    let subject = args.subject();
    info!(source = %source_label, subject = ?args.subject, "starting explorer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "rdf-graph-explorer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ExplorerApp::new(
                cc,
                Explorer::new(config),
                DataFeeder::new(source),
                subject,
                source_label,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
