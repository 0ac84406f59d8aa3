//! celldiff CLI - compare the contents of two spreadsheet cells

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use celldiff_core::{build_report, compare, CellRef, Splitter};
use celldiff_xlsx::{ReportWriter, XlsxReader};

#[derive(Parser)]
#[command(name = "celldiff")]
#[command(
    author,
    version,
    about = "Compare the tokenized contents of two spreadsheet cells"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two cells and write a highlighted report workbook
    Compare {
        /// Input workbook (.xlsx)
        input: PathBuf,

        /// First cell reference (e.g. B2)
        #[arg(long)]
        cell1: String,

        /// Second cell reference (e.g. C2)
        #[arg(long)]
        cell2: String,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Delimiter characters; each one splits, line breaks always split
        #[arg(short, long, default_value = "")]
        delimiters: String,

        /// Output workbook path
        #[arg(short, long, default_value = "comparison_result.xlsx")]
        output: PathBuf,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (.xlsx)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            input,
            cell1,
            cell2,
            sheet,
            delimiters,
            output,
        } => run_compare(&input, &cell1, &cell2, sheet.as_deref(), &delimiters, &output),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

fn run_compare(
    input: &PathBuf,
    cell_ref_1: &str,
    cell_ref_2: &str,
    sheet: Option<&str>,
    delimiters: &str,
    output: &PathBuf,
) -> Result<()> {
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => XlsxReader::sheet_names_file(input)
            .with_context(|| format!("Failed to open '{}'", input.display()))?
            .into_iter()
            .next()
            .context("Workbook has no sheets")?,
    };

    let grid = XlsxReader::read_sheet_file(input, &sheet_name)
        .with_context(|| format!("Failed to read sheet '{}' from '{}'", sheet_name, input.display()))?;

    let cell1 = CellRef::parse(cell_ref_1).context("Invalid first cell reference")?;
    let cell2 = CellRef::parse(cell_ref_2).context("Invalid second cell reference")?;

    let content1 = grid
        .text(cell1.row, cell1.col)
        .with_context(|| format!("Cell {} is outside the populated sheet", cell_ref_1))?
        .to_string();
    let content2 = grid
        .text(cell2.row, cell2.col)
        .with_context(|| format!("Cell {} is outside the populated sheet", cell_ref_2))?
        .to_string();

    let splitter = Splitter::new(delimiters).context("Invalid delimiter set")?;
    let cmp = compare(splitter.split(&content1), splitter.split(&content2));

    eprintln!(
        "{}: {} tokens ({} distinct, {} repeated values)",
        cell_ref_1,
        cmp.left.tokens.len(),
        cmp.left.deduped.len(),
        cmp.left.duplicates.len()
    );
    eprintln!(
        "{}: {} tokens ({} distinct, {} repeated values)",
        cell_ref_2,
        cmp.right.tokens.len(),
        cmp.right.deduped.len(),
        cmp.right.duplicates.len()
    );
    eprintln!(
        "unique to {}: {}; unique to {}: {}",
        cell_ref_1,
        cmp.unique_left.len(),
        cell_ref_2,
        cmp.unique_right.len()
    );

    let report = build_report(cell_ref_1, cell_ref_2, &cmp);
    ReportWriter::write_file(&report, output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!("Wrote '{}'", output.display());
    Ok(())
}

fn list_sheets(input: &PathBuf) -> Result<()> {
    let sheets = XlsxReader::sheet_names_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in sheets.iter().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}
