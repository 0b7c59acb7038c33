use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "entitylens")]
#[command(about = "Lens-driven, multi-source entity harmonization engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a query through the full pipeline and report the resulting entities.
    Run(RunArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    ResolveOne,
    DiscoverMany,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Free-text query to ingest.
    pub query: String,

    /// Lens id to apply. Falls back to LENS_ID, then --allow-default-lens.
    #[arg(long)]
    pub lens: Option<String>,

    #[arg(long, value_enum, default_value = "discover-many")]
    pub mode: ModeArg,

    /// Persist accepted entities via the Persistence Coordinator.
    #[arg(long)]
    pub persist: bool,

    #[arg(long = "budget-usd")]
    pub budget_usd: Option<f64>,

    #[arg(long = "target-count")]
    pub target_count: Option<u32>,

    #[arg(long = "min-confidence")]
    pub min_confidence: Option<f64>,

    /// Use the embedded structural demo lens when no lens can otherwise be resolved.
    /// Forbidden in validation runs.
    #[arg(long = "allow-default-lens")]
    pub allow_default_lens: bool,
}
