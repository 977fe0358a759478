use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "rwzip")]
#[command(version)]
#[command(about = "Read and write classic 32-bit ZIP archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  rwzip list archive.zip                    list entries with sizes and dates\n  \
  rwzip extract archive.zip -d out -s 1     extract, dropping the top directory\n  \
  rwzip extract archive.zip -i '\\.txt$'     extract only .txt entries\n  \
  rwzip create out.zip a.txt b/c.txt        build an archive from files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List archive contents
    List {
        /// ZIP file path
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Extract an archive
    Extract {
        /// ZIP file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Extract files into DIR (default: current directory)
        #[arg(short = 'd', value_name = "DIR", default_value = ".")]
        dir: String,

        /// Drop the first N path segments from entry names
        #[arg(short = 's', long = "strip", value_name = "N", conflicts_with = "prefix")]
        strip: Option<usize>,

        /// Remove a literal name prefix instead of counting segments
        #[arg(long = "strip-prefix", value_name = "PREFIX")]
        prefix: Option<String>,

        /// Only extract entries matching this regex
        #[arg(short = 'i', long = "include", value_name = "REGEX")]
        include: Option<String>,

        /// Skip entries matching this regex
        #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
        exclude: Option<String>,

        /// Quiet mode
        #[arg(short = 'q')]
        quiet: bool,
    },

    /// Create an archive from files
    Create {
        /// Output ZIP file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Files to add
        #[arg(value_name = "FILES", required = true)]
        files: Vec<String>,

        /// Compression level, 0 stores entries uncompressed
        #[arg(short = 'l', long = "level", value_name = "LEVEL", default_value_t = 6)]
        level: u32,
    },
}
