//! Main entry point for the rwzip CLI application.
//!
//! A thin layer over the library: list, extract, and create map directly
//! onto [`Archive`] operations.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Parser;

use rwzip::cli::{Cli, Command};
use rwzip::{Archive, Strip};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::List { file } => list(&file),
        Command::Extract {
            file,
            dir,
            strip,
            prefix,
            include,
            exclude,
            quiet,
        } => {
            let strip = match (strip, prefix) {
                (Some(n), _) => Strip::Components(n),
                (None, Some(p)) => Strip::Prefix(p),
                (None, None) => Strip::None,
            };
            extract(&file, &dir, strip, exclude.as_deref(), include.as_deref(), quiet)
        }
        Command::Create { file, files, level } => create(&file, &files, level),
    }
}

/// Print the archive's contents as a table: size, compressed size,
/// ratio, timestamp, name.
fn list(file: &str) -> Result<()> {
    let mut archive = Archive::open(file)?;
    let entries = archive.contents()?;

    println!(
        "{:>10}  {:>10}  {:>5}  {:>16}  Name",
        "Length", "Size", "Cmpr", "Modified"
    );
    println!("{}", "-".repeat(70));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let ratio = format_ratio(entry.size as u64, entry.compressed_size as u64);

        let modified = Utc
            .timestamp_opt(entry.mtime, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        println!(
            "{:>10}  {:>10}  {}  {:>16}  {}",
            entry.size, entry.compressed_size, ratio, modified, entry.name
        );

        if !entry.folder {
            total_uncompressed += entry.size as u64;
            total_compressed += entry.compressed_size as u64;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {:>29}  {} files",
        total_uncompressed, total_compressed, "", file_count
    );

    Ok(())
}

/// Percentage saved by compression, as a right-aligned table cell.
///
/// Small or incompressible entries can deflate to more bytes than they
/// started with; those clamp to 0% rather than underflowing.
fn format_ratio(size: u64, compressed_size: u64) -> String {
    if size == 0 {
        return "  0%".to_string();
    }
    format!("{:>4}%", 100u64.saturating_sub(compressed_size * 100 / size))
}

fn extract(
    file: &str,
    dir: &str,
    strip: Strip,
    exclude: Option<&str>,
    include: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let mut archive = Archive::open(file)?;
    let extracted = archive.extract(dir, &strip, exclude, include)?;

    if !quiet {
        for entry in &extracted {
            println!("  extracting: {}", entry.path);
        }
        println!("{} entries extracted", extracted.len());
    }

    Ok(())
}

fn create(file: &str, files: &[String], level: u32) -> Result<()> {
    let mut archive = Archive::create(file)?;

    for path in files {
        // Stored name defaults to the path as given, relative and cleaned.
        archive.add_file(path, path, level)?;
    }

    archive.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_compressible_entry() {
        assert_eq!(format_ratio(1000, 400), "  60%");
    }

    #[test]
    fn ratio_clamps_when_compression_expands() {
        // A 1-byte payload deflates to more than 1 byte; the cell must
        // clamp to 0% instead of underflowing.
        assert_eq!(format_ratio(1, 9), "   0%");
        assert_eq!(format_ratio(5, 5), "   0%");
    }

    #[test]
    fn ratio_of_empty_entry() {
        assert_eq!(format_ratio(0, 0), "  0%");
    }
}
