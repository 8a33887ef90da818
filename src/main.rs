mod aggregate;
mod chart;
mod config;
mod enrich;
mod infobox;
mod normalize;
mod source;
mod table;
mod wikitext;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use enrich::EnrichOptions;
use normalize::resolve::{DisplacementResolver, PromptResolver, SkipResolver};
use source::WikiSource;
use table::{columns, Record, Table, Value};

#[derive(Parser)]
#[command(name = "wiki_ships", about = "Ship construction statistics from Wikidata + Wikipedia infoboxes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SPARQL query and write the base ship table
    Query {
        /// Output table (.csv or .tsv)
        #[arg(short, long, default_value = "data/ships.csv")]
        output: PathBuf,
        /// Read the query from a file instead of the built-in one
        #[arg(long)]
        query_file: Option<PathBuf>,
        #[arg(long, default_value = config::SPARQL_ENDPOINT)]
        endpoint: String,
    },
    /// Fetch linked articles and merge infobox parameters into the table
    Enrich {
        #[arg(short, long, default_value = "data/ships.csv")]
        input: PathBuf,
        /// Defaults to overwriting the input table
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Infobox template to read
        #[arg(long)]
        template: Option<String>,
        /// Parameters to extract (comma separated); defaults per template
        #[arg(long, value_delimiter = ',')]
        parameters: Vec<String>,
        /// Shortcut for the characteristics template and its parameters
        #[arg(long)]
        characteristics: bool,
        #[arg(long, default_value = config::DEFAULT_LANGUAGE)]
        language: String,
        /// Max rows to enrich (default: all linked rows)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },
    /// Normalize date, manufacturer, length, speed and displacement columns
    Normalize {
        #[arg(short, long, default_value = "data/ships.csv")]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Prompt for ambiguous displacement values instead of skipping them
        #[arg(long)]
        interactive: bool,
    },
    /// Aggregate and chart ships per manufacturer per year
    Chart {
        #[arg(short, long, default_value = "data/ships.csv")]
        input: PathBuf,
        #[arg(long, default_value_t = config::DEFAULT_START_YEAR)]
        start: i32,
        #[arg(long, default_value_t = config::DEFAULT_END_YEAR)]
        end: i32,
    },
    /// Full pipeline: query, both enrich passes, normalize, chart
    Run {
        /// Directory for the staged table files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long, default_value = "8")]
        concurrency: usize,
        #[arg(long)]
        interactive: bool,
        #[arg(long, default_value = config::DEFAULT_LANGUAGE)]
        language: String,
        #[arg(long, default_value_t = config::DEFAULT_START_YEAR)]
        start: i32,
        #[arg(long, default_value_t = config::DEFAULT_END_YEAR)]
        end: i32,
    },
    /// Show table statistics
    Stats {
        #[arg(short, long, default_value = "data/ships.csv")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query {
            output,
            query_file,
            endpoint,
        } => {
            let query = match query_file {
                Some(path) => std::fs::read_to_string(path)?,
                None => config::DEFAULT_QUERY.to_string(),
            };
            let source = WikiSource::new();
            let table = run_query(&source, &endpoint, &query).await?;
            table.write(&output)?;
            println!("Wrote {} ships to {}", table.len(), output.display());
            Ok(())
        }
        Commands::Enrich {
            input,
            output,
            template,
            parameters,
            characteristics,
            language,
            limit,
            concurrency,
        } => {
            let mut table = Table::read(&input)?;
            let options = enrich_options(
                template,
                parameters,
                characteristics,
                language,
                limit,
                concurrency,
            );
            let source = WikiSource::new();
            let stats = enrich::enrich_table(&mut table, &source, &options).await?;
            table.write(output.as_deref().unwrap_or(&input))?;
            stats.print();
            Ok(())
        }
        Commands::Normalize {
            input,
            output,
            interactive,
        } => {
            let mut table = Table::read(&input)?;
            let mut resolver = make_resolver(interactive);
            let counts = normalize::run(&mut table, resolver.as_mut())?;
            table.write(output.as_deref().unwrap_or(&input))?;
            counts.print();
            Ok(())
        }
        Commands::Chart { input, start, end } => {
            let table = Table::read(&input)?;
            if table.is_empty() {
                println!("Table {} is empty.", input.display());
                return Ok(());
            }
            let counts = aggregate::aggregate(&table, start, end)?;
            chart::render(&counts, start, end);
            Ok(())
        }
        Commands::Run {
            data_dir,
            limit,
            concurrency,
            interactive,
            language,
            start,
            end,
        } => {
            run_pipeline(
                &data_dir,
                limit,
                concurrency,
                interactive,
                &language,
                start,
                end,
            )
            .await
        }
        Commands::Stats { input } => {
            let table = Table::read(&input)?;
            print_stats(&table);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_query(source: &WikiSource, endpoint: &str, query: &str) -> Result<Table> {
    let result = source
        .run_query(endpoint, query)
        .await
        .map_err(anyhow::Error::new)?;
    let mut table = Table::new(result.vars);
    for row in result.rows {
        let mut record = Record::new();
        for (var, value) in row {
            record.set(&var, Value::Text(value));
        }
        table.push(record);
    }
    Ok(table)
}

fn enrich_options(
    template: Option<String>,
    parameters: Vec<String>,
    characteristics: bool,
    language: String,
    limit: Option<usize>,
    concurrency: usize,
) -> EnrichOptions {
    let template = template.unwrap_or_else(|| {
        if characteristics {
            config::CHARACTERISTICS_TEMPLATE.to_string()
        } else {
            config::CAREER_TEMPLATE.to_string()
        }
    });
    let parameters = if parameters.is_empty() {
        let defaults = if characteristics {
            config::CHARACTERISTICS_PARAMETERS
        } else {
            config::CAREER_PARAMETERS
        };
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        parameters
    };
    EnrichOptions {
        template,
        parameters,
        language,
        limit,
        concurrency,
    }
}

fn make_resolver(interactive: bool) -> Box<dyn DisplacementResolver> {
    if interactive {
        Box::new(PromptResolver)
    } else {
        Box::new(SkipResolver)
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    data_dir: &std::path::Path,
    limit: Option<usize>,
    concurrency: usize,
    interactive: bool,
    language: &str,
    start: i32,
    end: i32,
) -> Result<()> {
    let source = WikiSource::new();
    let base_path = data_dir.join("ships.csv");
    let enriched_path = data_dir.join("ships_enriched.csv");
    let normalized_path = data_dir.join("ships_normalized.csv");

    // Phase 1: query
    println!("Querying Wikidata...");
    let table = run_query(&source, config::SPARQL_ENDPOINT, config::DEFAULT_QUERY).await?;
    table.write(&base_path)?;
    println!("Wrote {} ships to {}", table.len(), base_path.display());

    // Phase 2: career + characteristics enrichment, staged through disk so
    // the run can be resumed stage by stage.
    let mut table = Table::read(&base_path)?;
    let career = enrich_options(
        None,
        Vec::new(),
        false,
        language.to_string(),
        limit,
        concurrency,
    );
    enrich::enrich_table(&mut table, &source, &career).await?.print();
    let characteristics = enrich_options(
        None,
        Vec::new(),
        true,
        language.to_string(),
        limit,
        concurrency,
    );
    enrich::enrich_table(&mut table, &source, &characteristics)
        .await?
        .print();
    table.write(&enriched_path)?;

    // Phase 3: normalize
    let mut table = Table::read(&enriched_path)?;
    let mut resolver = make_resolver(interactive);
    let counts = normalize::run(&mut table, resolver.as_mut())?;
    table.write(&normalized_path)?;
    counts.print();

    // Phase 4: aggregate + chart
    let table = Table::read(&normalized_path)?;
    let counts = aggregate::aggregate(&table, start, end)?;
    chart::render(&counts, start, end);
    Ok(())
}

fn print_stats(table: &Table) {
    let total = table.len();
    let with_sitelink = table
        .rows()
        .iter()
        .filter(|r| r.text(columns::SITELINK).is_some())
        .count();
    let enriched = table
        .rows()
        .iter()
        .filter(|r| r.field_names().any(|f| f.starts_with("Ship_")))
        .count();
    let dated = table.rows().iter().filter(|r| r.year().is_some()).count();
    let manufactured = table
        .rows()
        .iter()
        .filter(|r| r.manufacturer().is_some())
        .count();
    let displaced = table
        .rows()
        .iter()
        .filter(|r| {
            r.has(columns::STANDARD_DISPLACEMENT) || r.has(columns::FULL_LOAD_DISPLACEMENT)
        })
        .count();

    println!("Rows:                    {}", total);
    println!("With sitelink:           {}", with_sitelink);
    println!("Enriched from infobox:   {}", enriched);
    println!("Normalized date:         {}", dated);
    println!("Normalized manufacturer: {}", manufactured);
    println!("Displacement figures:    {}", displaced);
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
