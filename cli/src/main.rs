use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jsonapi_errors_core::catalog::{self, CatalogEntry, ErrorClass};
use jsonapi_errors_core::{
    Config, DescriptorAttrs, ErrorKey, ErrorTypeRegistry, FailureId, JsonApiError,
    MappingRegistry, Resolver, Source, Status,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonapi-errors")]
#[command(about = "Inspect the HTTP error catalog and render JSON:API error documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog entries
    Catalog {
        /// Only list one class of errors
        #[arg(long, value_enum)]
        class: Option<ClassArg>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Render one catalog error as a JSON:API document
    Render {
        /// Status (404), symbolic code (not_found) or name (NotFound)
        key: String,

        #[arg(long)]
        id: Option<String>,

        /// Override the catalog title
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        detail: Option<String>,

        /// JSON pointer to the offending request member
        #[arg(long)]
        pointer: Option<String>,

        /// Offending query parameter
        #[arg(long)]
        parameter: Option<String>,

        /// Status to report instead of the error's own
        #[arg(long)]
        status: Option<u16>,

        /// Emit only status, title, detail and source
        #[arg(long)]
        short: bool,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Resolve named failures through a mapping config and render them
    Resolve {
        /// Failure names, rendered in order; the first decides the status
        #[arg(required = true)]
        failures: Vec<String>,

        /// Mapping config file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Emit only status, title, detail and source
        #[arg(long)]
        short: bool,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ClassArg {
    Client,
    Server,
}

impl From<ClassArg> for ErrorClass {
    fn from(val: ClassArg) -> Self {
        match val {
            ClassArg::Client => ErrorClass::Client,
            ClassArg::Server => ErrorClass::Server,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Catalog { class, format } => {
            let entries: Vec<&CatalogEntry> = match class {
                Some(class) => {
                    let class = ErrorClass::from(class);
                    catalog::entries().filter(|e| e.class() == class).collect()
                }
                None => catalog::entries().collect(),
            };
            write_json(&entries, None, format)?;
        }
        Commands::Render {
            key,
            id,
            title,
            detail,
            pointer,
            parameter,
            status,
            short,
            output,
            format,
        } => {
            let types = ErrorTypeRegistry::loaded();
            let handle = types
                .require(parse_key(&key))
                .map_err(|e| library_error(e, "Unknown error kind"))?;

            let source = (pointer.is_some() || parameter.is_some()).then(|| Source {
                pointer: pointer.unwrap_or_default(),
                parameter: parameter.unwrap_or_default(),
                ..Source::default()
            });
            let attrs = DescriptorAttrs {
                id,
                title,
                detail,
                source,
                ..DescriptorAttrs::default()
            };

            let resolver = Resolver::from(handle.instantiate(attrs));
            report_status(status.map_or_else(|| resolver.status(), Status::new));
            write_document(&resolver, short, output.as_ref(), format)?;
        }
        Commands::Resolve {
            failures,
            config,
            short,
            output,
            format,
        } => {
            let config_obj: Config = {
                let file = File::open(&config)
                    .with_context(|| format!("Failed to open config file: {}", config.display()))?;
                Config::from_reader(BufReader::new(file))
                    .with_context(|| format!("Failed to parse config from: {}", config.display()))?
            };

            let registry = MappingRegistry::new(Arc::new(ErrorTypeRegistry::loaded()));
            config_obj
                .apply(&registry)
                .map_err(|e| library_error(e, "Invalid config"))?;

            let descriptors = failures
                .iter()
                .map(|name| {
                    registry
                        .lookup_id(&FailureId::named(name.as_str()))
                        .map(|handle| handle.descriptor())
                        .ok_or_else(|| JsonApiError::UnresolvableFailure {
                            failure: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| library_error(e, "Resolution failed"))?;

            let resolver = Resolver::try_from(descriptors)?;
            report_status(resolver.status());
            write_document(&resolver, short, output.as_ref(), format)?;
        }
    }

    Ok(())
}

fn parse_key(key: &str) -> ErrorKey<'_> {
    match key.parse::<u16>() {
        Ok(status) => ErrorKey::Status(status),
        Err(_) => ErrorKey::Symbol(key),
    }
}

fn report_status(status: Status) {
    eprintln!("status: {status}");
}

/// Log the structured form of a library error, then wrap it for display.
fn library_error(err: JsonApiError, context: &'static str) -> anyhow::Error {
    tracing::debug!(error = %err.to_json(), "{context}");
    anyhow::Error::from(err).context(context)
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    Ok(writer)
}

fn write_document(
    resolver: &Resolver,
    short: bool,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let serializer = resolver.serializer();
    let text = match format {
        OutputFormat::Pretty => serializer.to_json_pretty(short)?,
        OutputFormat::Compact => serializer.to_json(short)?,
    };

    let mut writer = open_output(path)?;
    writeln!(writer, "{text}").context("Failed to write JSON")?;
    writer.flush().context("Failed to flush output")?;
    Ok(())
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer = open_output(path)?;

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
