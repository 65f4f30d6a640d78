use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};
use relay_advisor::{
    Advisor, AdvisorError, AppConfig, CsvDatasetProvider, RecommendationEngine, UserQuery,
    report,
    scenario::{
        ActiveTechnique, GenerationScenario, GeneratorType, Inertia, RegulationCurve,
        Supportability, VoltageBlocking,
    },
    writer,
};

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Directory holding the parameter, feature and metrics CSV files
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recommend a relay setting for one generator
    Recommend {
        #[arg(long, value_enum)]
        generator_type: GeneratorType,

        #[arg(long, value_enum)]
        voltage_blocking: VoltageBlocking,

        #[arg(long, value_enum)]
        supportability: Supportability,

        #[arg(long, value_enum)]
        technique: ActiveTechnique,

        #[arg(long, value_enum)]
        curve: RegulationCurve,

        #[arg(long, value_enum)]
        scenario: GenerationScenario,

        /// Generator capacity in kW
        #[arg(long)]
        capacity_kw: f64,

        /// System voltage in kV
        #[arg(long)]
        voltage_kv: f64,

        /// Inertia constant in seconds (synchronous generators only)
        #[arg(long, conflicts_with = "unknown_inertia")]
        inertia: Option<f64>,

        #[arg(long)]
        unknown_inertia: bool,

        /// Print the outcome as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run every query of a JSON-lines file
    Batch {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the active base configuration
    Bases,
    /// Write the active configuration to the user config file
    InitConfig,
}

fn build_advisor(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
) -> Advisor<CsvDatasetProvider> {
    let data_dir = data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    info!("Reading datasets from {:?}", data_dir);
    Advisor::new(
        config.catalog(),
        CsvDatasetProvider::new(data_dir),
        RecommendationEngine::with_thresholds(config.thresholds),
    )
}

fn query_inertia(
    generator_type: GeneratorType,
    inertia: Option<f64>,
    unknown_inertia: bool,
) -> Result<Inertia, AdvisorError> {
    match generator_type {
        // Inverter-based resources have no rotating mass
        GeneratorType::InverterBased => Ok(Inertia::Known(0.0)),
        GeneratorType::Synchronous => match (inertia, unknown_inertia) {
            (_, true) => Ok(Inertia::Unknown),
            (Some(h), false) => Ok(Inertia::Known(h)),
            (None, false) => Err(AdvisorError::InvalidUserInput {
                field: "inertia".to_string(),
                reason: "synchronous generators need --inertia or --unknown-inertia".to_string(),
            }),
        },
    }
}

fn recommend(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
    query: UserQuery,
    json: bool,
) -> Result<(), AdvisorError> {
    let mut advisor = build_advisor(config, data_dir);
    let advice = advisor.advise(&query)?;
    if json {
        let text = serde_json::to_string_pretty(&advice)
            .map_err(|e| AdvisorError::OutputSerializeError { source: e })?;
        println!("{}", text);
    } else {
        print!("{}", report::render(&advice));
    }
    Ok(())
}

fn batch(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
    input: &Path,
    output: &Path,
) -> Result<(), AdvisorError> {
    let queries = serde_jsonlines::json_lines(input)
        .map_err(|e| AdvisorError::QueryLoaderError { source: e })?
        .collect::<Result<Vec<UserQuery>, std::io::Error>>()
        .map_err(|e| AdvisorError::QueryLoaderError { source: e })?;

    let mut advisor = build_advisor(config, data_dir);
    let outcomes: Vec<_> = queries.iter().map(|query| advisor.advise(query)).collect();
    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    if failed > 0 {
        warn!("{} of {} queries failed", failed, outcomes.len());
    }
    writer::write_recommendations(output, &outcomes)?;
    info!("Wrote {} outcomes to {:?}", outcomes.len(), output);
    Ok(())
}

fn bases(config: &AppConfig) -> Result<(), AdvisorError> {
    let text = serde_json::to_string_pretty(&config.catalog())
        .map_err(|e| AdvisorError::OutputSerializeError { source: e })?;
    println!("{}", text);
    Ok(())
}

fn init_config(config: AppConfig, data_dir: Option<PathBuf>) -> Result<(), AdvisorError> {
    let config_path = AppConfig::config_path().ok_or(AdvisorError::NoConfigDir)?;
    config.with_data_dir(data_dir).save()?;
    println!("Saved configuration to {}", config_path.display());
    Ok(())
}

fn run(cli: Args) -> Result<(), AdvisorError> {
    let config = AppConfig::from_local_file()
        .unwrap_or_else(|e| {
            warn!("Ignoring unreadable config file: {}", e);
            None
        })
        .unwrap_or_default();

    match cli.command {
        Commands::Recommend {
            generator_type,
            voltage_blocking,
            supportability,
            technique,
            curve,
            scenario,
            capacity_kw,
            voltage_kv,
            inertia,
            unknown_inertia,
            json,
        } => {
            let query = UserQuery {
                generator_type,
                voltage_blocking,
                supportability,
                technique,
                curve,
                scenario,
                capacity_kw,
                voltage_kv,
                inertia: query_inertia(generator_type, inertia, unknown_inertia)?,
            };
            recommend(&config, cli.data_dir, query, json)
        }
        Commands::Batch { input, output } => batch(&config, cli.data_dir, &input, &output),
        Commands::Bases => bases(&config),
        Commands::InitConfig => init_config(config, cli.data_dir),
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
