use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use guide_designer::config::DesignConfig;
use guide_designer::data_handling::fasta_sequence::FastaSequence;
use guide_designer::data_handling::SequenceSource;
use guide_designer::export::{format_output_filename, guide_summary, summary_table, write_csv};
use guide_designer::helper_functions::resolve_path;
use guide_designer::pipeline::GuideDesigner;
use guide_designer::validation::{validate_design_inputs, DesignTarget};

#[derive(Parser)]
#[command(author, version, about = "Design and rank SpCas9 sgRNA candidates from a FASTA sequence")]
struct Args {
    /// FASTA file; only the first record is used
    #[arg(short, long)]
    fasta: PathBuf,

    /// Genomic region of the record, e.g. chr17:7661779-7687550
    #[arg(short, long, conflicts_with = "gene")]
    region: Option<String>,

    /// Chromosome of the first base (overrides the record id)
    #[arg(long)]
    chromosome: Option<String>,

    /// 1-based coordinate of the first base
    #[arg(long)]
    start: Option<u64>,

    /// Gene symbol to attach to every guide
    #[arg(short, long)]
    gene: Option<String>,

    #[arg(long)]
    species: Option<String>,

    /// Number of guides to report
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// CSV output path (derived from gene or region if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the off-target estimate
    #[arg(long)]
    seed: Option<u64>,

    /// Keep candidates that fail GC, homopolymer or poly-T checks
    #[arg(long)]
    no_filters: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting guide design");

    let mut config = match &args.config {
        Some(path) => DesignConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DesignConfig::default(),
    };
    if let Some(species) = &args.species {
        config.species = species.clone();
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_filters {
        config.apply_filters = false;
    }
    config.validate().context("invalid design parameters")?;

    let (gene, region) = if args.gene.is_some() || args.region.is_some() {
        let inputs = validate_design_inputs(
            args.gene.as_deref(),
            args.region.as_deref(),
            &config.species,
            config.top_n,
        )?;
        info!(
            "Designing for {} ({})",
            inputs.species.name, inputs.species.genome_assembly
        );
        match inputs.target {
            DesignTarget::Gene(gene) => (Some(gene), None),
            DesignTarget::Region(region) => (None, Some(region)),
        }
    } else {
        (None, None)
    };

    let mut source = FastaSequence::new(&args.fasta)
        .with_anchor(args.chromosome.clone(), args.start)
        .with_gene_name(gene.clone());
    if let Some(region) = &region {
        source = source.with_region(region.clone());
    }
    let window = source
        .load()
        .with_context(|| format!("failed to read sequence from {}", args.fasta.display()))?;

    let top_n = config.top_n;
    let weights = config.weights;
    let mut designer = GuideDesigner::from_config(config);
    let guides = designer.design(&window);

    if guides.is_empty() {
        println!("No guides passed the design criteria.");
    } else {
        println!("{}", summary_table(&guides, top_n, &weights));
        println!();
        println!("{}", guide_summary(&guides[0], 1, &weights));
    }

    let output = match args.output {
        Some(path) => path,
        None => resolve_path(&PathBuf::from(format_output_filename(
            gene.as_deref(),
            region.as_ref(),
        ))),
    };
    write_csv(&output, &guides)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Results saved to: {}", output.display());

    Ok(())
}
