use clap::Parser;

use crate::zip::DEFAULT_CHUNK_SIZE;

#[derive(Parser, Debug)]
#[command(name = "zipsearch")]
#[command(version)]
#[command(about = "Search for text inside ZIP archive entries without extracting", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipsearch logs.zip \"connection reset\"       search a local archive\n  \
  zipsearch https://example.com/src.zip TODO   search a remote ZIP via Range requests\n  \
  zipsearch -l logs.zip                        list entry names without searching")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Literal text to search for (case-sensitive)
    #[arg(value_name = "TEXT", required_unless_present = "list")]
    pub text: Option<String>,

    /// List entry names instead of searching
    #[arg(short = 'l')]
    pub list: bool,

    /// Quiet mode (-q: no report, -qq: machine-readable matches only)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Read-chunk size in bytes for entry streams
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.archive.starts_with("http://") || self.archive.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
