use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sheetchart::csv_reader;
use sheetchart::{generate_chart, ChartOptions, ChartRequest, TabularDataset};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sheetchart")]
#[command(about = "Turn tabular sheet data into chart-ready JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build chart data for a JSON request, e.g.
    /// '{"xAxis":"Month","yAxes":[{"column":"Sales"}],"chartType":"bar"}'
    Chart {
        /// Chart request as a JSON object
        request: String,
        #[command(flatten)]
        input: InputArgs,
        /// JSON file with chart options (palette, bubble_radius, radar_fill_alpha, border_width)
        #[arg(long)]
        options: Option<PathBuf>,
        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },
    /// Print the column names, leading records and row count of a sheet
    Inspect {
        #[command(flatten)]
        input: InputArgs,
        /// Maximum number of records to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Sheet file to read (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Sheet format; guessed from the file extension, CSV otherwise
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Chart {
            request,
            input,
            options,
            pretty,
        } => {
            let dataset = load_dataset(&input)?;
            let options = load_options(options.as_deref())?;
            let request =
                ChartRequest::from_json(&request, &dataset).context("Invalid chart request")?;
            let response =
                generate_chart(&dataset, &request, &options).context("Failed to build chart")?;
            write_json(&response, pretty)
        }
        Command::Inspect { input, limit } => {
            let dataset = load_dataset(&input)?;
            write_json(&dataset.preview(limit), true)
        }
    }
}

fn load_dataset(args: &InputArgs) -> Result<TabularDataset> {
    let format = args.format.unwrap_or_else(|| match &args.input {
        Some(path) => guess_format(path),
        None => InputFormat::Csv,
    });

    match (format, &args.input) {
        (InputFormat::Csv, Some(path)) => csv_reader::read_dataset_from_path(path),
        (InputFormat::Csv, None) => {
            csv_reader::read_dataset_from_stdin().context("Failed to read CSV from stdin")
        }
        (InputFormat::Json, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            parse_json_dataset(&text)
        }
        (InputFormat::Json, None) => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read JSON from stdin")?;
            parse_json_dataset(&text)
        }
    }
}

fn guess_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
        _ => InputFormat::Csv,
    }
}

fn parse_json_dataset(text: &str) -> Result<TabularDataset> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("Failed to parse JSON input")?;
    TabularDataset::from_json(&value)
}

fn load_options(path: Option<&Path>) -> Result<ChartOptions> {
    let Some(path) = path else {
        return Ok(ChartOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse options file '{}'", path.display()))
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
