//! html2zpl CLI - HTML to ZPL label conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use html2zpl::render::count_items;
use html2zpl::{
    convert_with_report, label_canvas, parse, repair, validate, ColumnStrategy, JsonFormat,
    LabelConfig, Severity,
};

#[derive(Parser)]
#[command(name = "html2zpl")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert HTML order documents to ZPL thermal labels", long_about = None)]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output ZPL file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an HTML file to ZPL
    Convert {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the conversion report as JSON to stderr
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        label: LabelArgs,
    },

    /// Convert every HTML file in a directory
    Batch {
        /// Directory containing .html files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (input directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        label: LabelArgs,
    },

    /// Check a ZPL file for structural problems
    Validate {
        /// Input ZPL file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair a ZPL file into a single valid label
    Repair {
        /// Input ZPL file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (overwrites the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show canvas, height estimate and table structure
    Info {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        label: LabelArgs,
    },

    /// Show version information
    Version,
}

/// Label settings shared by the converting commands.
#[derive(Args, Clone, Default)]
struct LabelArgs {
    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE", env = "HTML2ZPL_CONFIG")]
    config: Option<PathBuf>,

    /// Printer resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Label width in inches
    #[arg(long)]
    width: Option<f64>,

    /// Label height in inches (estimated from content if not specified)
    #[arg(long)]
    height: Option<f64>,

    /// Printer character set (utf8, cp850, cp852, cp1250, cp1252, cp437)
    #[arg(long)]
    encoding: Option<String>,

    /// Number of order lines for height estimation
    #[arg(long)]
    items: Option<usize>,

    /// Table column width strategy
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Print speed (^PR)
    #[arg(long)]
    speed: Option<u8>,

    /// Keep invalid output instead of repairing it
    #[arg(long)]
    no_repair: bool,
}

impl LabelArgs {
    fn to_config(&self) -> Result<LabelConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => LabelConfig::from_json_file(path)?,
            None => LabelConfig::default(),
        };
        if let Some(dpi) = self.dpi {
            config = config.with_dpi(dpi);
        }
        if let Some(width) = self.width {
            config = config.with_width(width);
        }
        if let Some(height) = self.height {
            config = config.with_height(height);
        }
        if let Some(ref encoding) = self.encoding {
            config = config.with_encoding(encoding.clone());
        }
        if let Some(items) = self.items {
            config = config.with_item_count(items);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_column_strategy(strategy.into());
        }
        if let Some(speed) = self.speed {
            config = config.with_print_speed(speed);
        }
        if self.no_repair {
            config = config.with_auto_repair(false);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Preset layout for order-line tables, content weighting otherwise
    Auto,
    /// Ordinal column plus preset splits
    Structural,
    /// Widths proportional to cell text length
    Content,
}

impl From<Strategy> for ColumnStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Auto => ColumnStrategy::Auto,
            Strategy::Structural => ColumnStrategy::Structural,
            Strategy::Content => ColumnStrategy::ContentWeighted,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            report,
            label,
        }) => cmd_convert(&input, output.as_deref(), report, &label),
        Some(Commands::Batch {
            input,
            output,
            label,
        }) => cmd_batch(&input, output.as_deref(), &label),
        Some(Commands::Validate { input, json }) => cmd_validate(&input, json),
        Some(Commands::Repair { input, output }) => cmd_repair(&input, output.as_deref()),
        Some(Commands::Info { input, label }) => cmd_info(&input, &label),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), false, &LabelArgs::default())
            } else {
                println!("{}", "Usage: html2zpl <FILE> [OUTPUT]".yellow());
                println!("       html2zpl --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_html(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    let html = String::from_utf8(data)
        .map_err(|e| format!("{} is not valid UTF-8: {}", path.display(), e))?;
    Ok(html.trim_start_matches('\u{feff}').to_string())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    report: bool,
    label: &LabelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = label.to_config()?;
    let html = read_html(input)?;
    let result = convert_with_report(&html, &config)?;

    if report {
        eprintln!("{}", html2zpl::render::to_json(&result, JsonFormat::Pretty)?);
    }
    if result.repaired {
        eprintln!("{}", "Output was repaired after validation".yellow());
    }

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!(
            "{} {} ({}x{} dots)",
            "Saved to".green(),
            path.display(),
            result.canvas.width_dots,
            result.canvas.height_dots
        );
    } else {
        println!("{}", result.content);
    }

    Ok(())
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    label: &LabelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = label.to_config()?;
    let files = html_files(input)?;
    if files.is_empty() {
        println!("{} {}", "No HTML files in".yellow(), input.display());
        return Ok(());
    }

    let output_dir = output.unwrap_or(input).to_path_buf();
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    log::debug!(
        "Converting {} files on {} threads",
        files.len(),
        rayon::current_num_threads()
    );
    let failed = AtomicUsize::new(0);
    files.par_iter().for_each(|path| {
        let target = output_dir.join(path.with_extension("zpl").file_name().unwrap_or_default());
        let result = read_html(path)
            .and_then(|html| Ok(convert_with_report(&html, &config)?))
            .and_then(|r| Ok(fs::write(&target, r.content)?));
        if let Err(e) = result {
            failed.fetch_add(1, Ordering::Relaxed);
            pb.println(format!("{} {}: {}", "Failed".red(), path.display(), e));
        }
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let failed = failed.into_inner();
    println!(
        "\n{} {} converted, {} failed",
        "Batch complete:".green().bold(),
        files.len() - failed,
        failed
    );
    if failed > 0 {
        return Err(format!("{} file(s) failed", failed).into());
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    let report = validate(&content);

    if json {
        println!("{}", report.to_json(JsonFormat::Pretty)?);
    } else {
        println!("{}", "Validation Report".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {}", "File".bold(), input.display());
        println!("{}: {}", "Labels".bold(), report.label_count);
        for issue in &report.issues {
            let tag = match issue.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
                Severity::Info => "info".blue(),
            };
            println!("  {} {}", tag, issue.message);
        }
        println!();
        if report.success {
            println!("{}", "Valid".green().bold());
        } else {
            println!("{}", "Invalid".red().bold());
        }
    }

    if !report.success {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_repair(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    let result = repair(&content);
    let target = output.unwrap_or(input);
    fs::write(target, &result.content)?;

    if result.fixed_issues.is_empty() {
        println!("{}", "Nothing to repair".green());
    } else {
        for fix in &result.fixed_issues {
            println!("  {} {}", "fixed".green(), fix);
        }
    }
    println!("{} {}", "Saved to".green(), target.display());

    Ok(())
}

fn cmd_info(input: &Path, label: &LabelArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = label.to_config()?;
    let html = read_html(input)?;
    let doc = parse(&html, &config);
    let canvas = label_canvas(&doc, &config);
    let items = count_items(&doc, config.item_count);

    println!("{}", "Label Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {} dpi", "Resolution".bold(), canvas.dpi);
    println!(
        "{}: {} x {} dots ({:.1} x {:.1} mm)",
        "Canvas".bold(),
        canvas.width_dots,
        canvas.height_dots,
        html2zpl::render::dots_to_mm(canvas.width_dots, canvas.dpi),
        html2zpl::render::dots_to_mm(canvas.height_dots, canvas.dpi)
    );
    if config.explicit_height_dots().is_none() {
        println!("{}: {} ({:?})", "Items".bold(), items.count, items.source);
    }
    println!(
        "{}: {}",
        "Barcode".bold(),
        doc.barcode_data().unwrap_or("none")
    );
    println!("{}: {}", "Style rules".bold(), doc.styles.len());

    let tables = doc.tables();
    println!();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if tables.is_empty() {
        println!("{}", "none".dimmed());
    }
    for (i, table) in tables.iter().enumerate() {
        let s = table.structure();
        let numeric: Vec<String> = s
            .numeric_columns
            .iter()
            .enumerate()
            .filter(|(_, n)| **n)
            .map(|(c, _)| (c + 1).to_string())
            .collect();
        println!(
            "{} {}: {} rows x {} columns, {} header, {} footer, {} merged cells",
            "Table".bold(),
            i + 1,
            s.rows,
            s.columns,
            s.header_rows,
            s.footer_rows,
            s.merged_cells
        );
        if !numeric.is_empty() {
            println!("  {} {}", "numeric columns:".dimmed(), numeric.join(", "));
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "html2zpl".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HTML to ZPL label conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/html2zpl".dimmed());
    println!("License: MIT");
}
