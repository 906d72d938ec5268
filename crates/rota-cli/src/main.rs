//! Rota CLI - rota workbook import tool

mod logger;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rota_core::CellAddress;
use rota_gas::{
    parse_workbook_by_type, select_sheet_index, select_worksheet, GasConfig, GasParser,
    ImportType, SheetLayout,
};
use rota_xlsx::XlsxReader;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rota")]
#[command(author, version, about = "Import shifts from colour-coded rota workbooks")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a workbook and print the shifts and failures as JSON
    Parse {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Layout of the workbook (gas or build)
        #[arg(short = 't', long = "type", default_value = "gas")]
        import_type: ImportType,

        /// JSON file overriding parser thresholds and keywords
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List all sheets in a workbook, marking the one that would be parsed
    Sheets {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// JSON config file (for the preferred sheet name)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the structure detected in a sheet without extracting shifts
    Inspect {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Sheet name to inspect (default: the sheet that would be parsed)
        #[arg(short, long)]
        sheet: Option<String>,

        /// JSON file overriding parser thresholds and keywords
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    match cli.command {
        Commands::Parse {
            input,
            import_type,
            config,
            pretty,
            output,
        } => parse(
            &input,
            import_type,
            config.as_deref(),
            pretty,
            output.as_deref(),
        ),
        Commands::Sheets { input, config } => list_sheets(&input, config.as_deref()),
        Commands::Inspect {
            input,
            sheet,
            config,
        } => inspect(&input, sheet.as_deref(), config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<GasConfig> {
    let Some(path) = path else {
        return Ok(GasConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    GasConfig::from_json(&json).with_context(|| format!("Invalid config '{}'", path.display()))
}

fn parse(
    input: &Path,
    import_type: ImportType,
    config: Option<&Path>,
    pretty: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    let result = parse_workbook_by_type(&bytes, import_type, &config)
        .with_context(|| format!("Failed to import '{}'", input.display()))?;

    let mut json = if pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialize result")?;
    json.push('\n');

    if let Some(output_path) = output {
        std::fs::write(output_path, &json)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} shifts to '{}'",
            result.shift_count(),
            output_path.display()
        );
    } else {
        io::stdout()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
    }

    // Failures are part of the result, not a reason to exit non-zero
    if !result.failures.is_empty() {
        eprintln!("{} part(s) of the sheet could not be imported:", result.failure_count());
        for failure in &result.failures {
            eprintln!("  - {}", failure);
        }
    }

    Ok(())
}

fn list_sheets(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let selected = select_sheet_index(&workbook, &config.preferred_sheet);

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!(
            "{}\t{}\t{}{}",
            i,
            sheet.name(),
            if sheet.is_visible() { "visible" } else { "hidden" },
            if selected == Some(i) { "\t*" } else { "" }
        );
    }

    Ok(())
}

fn inspect(input: &Path, sheet_name: Option<&str>, config: Option<&Path>) -> Result<()> {
    let parser = GasParser::new(load_config(config)?)?;
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let sheet = match sheet_name {
        Some(name) => workbook
            .worksheet_by_name(name)
            .with_context(|| format!("Sheet '{}' not found", name))?,
        None => select_worksheet(&workbook, &parser.config().preferred_sheet)
            .context("Workbook has no worksheets")?,
    };

    match parser.analyze(sheet) {
        Ok(layout) => print_layout(&layout),
        Err(failure) => {
            println!("Sheet: \"{}\"", sheet.name());
            println!("Cannot be parsed: {}", failure);
        }
    }

    Ok(())
}

fn print_layout(layout: &SheetLayout) {
    let dividers: Vec<String> = layout
        .dividers
        .collapsed
        .iter()
        .map(|row| (row + 1).to_string())
        .collect();

    println!("Sheet: \"{}\"", layout.sheet_name);
    println!("Used range: {}", layout.bounds.to_range());
    println!("Divider rows: {}", dividers.join(", "));
    println!("Site blocks: {}", layout.blocks.len());

    for (i, detail) in layout.blocks.iter().enumerate() {
        println!();
        println!(
            "  Block {}: rows {}-{}",
            i + 1,
            detail.block.start_row + 1,
            detail.block.end_row + 1
        );

        match &detail.address {
            Some(address) => println!(
                "    Address: {} ({}, score {})",
                address.text,
                CellAddress::new(address.row, address.col),
                address.score
            ),
            None => println!("    Address: not found"),
        }

        match detail.date_row {
            Some(row) => {
                let dates: Vec<String> = detail
                    .date_columns
                    .iter()
                    .map(|c| format!("{}={}", CellAddress::new(row, c.col), c.iso_date()))
                    .collect();
                println!("    Date row: {}", row + 1);
                println!("    Dates: {}", dates.join(" "));
            }
            None => println!("    Date row: not found"),
        }
    }
}
