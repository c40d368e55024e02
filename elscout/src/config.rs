use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::grid::Layout;
use crate::search::SweepOptions;
use crate::stream::Normalization;

/// Settings for grid searches and stride sweeps.
///
/// # Configuration Locations
///
/// Loaded from, in increasing order of precedence:
/// 1. Global `$HOME/.config/elscout/config.yaml`
/// 2. Local `.elscout.yaml` in the current directory
/// 3. A file passed with `--config`
///
/// Command-line arguments override all of them (see [`ScanConfig::merge_with_cli`]).
///
/// # Configuration Format
///
/// ```yaml
/// # Words to look for in the grid
/// queries: ["קדש הקדשים", "החושן"]
///
/// # Grid width and number of leading letters to skip
/// stride: 22
/// offset: 48
///
/// # Draw Hebrew grids right to left
/// layout: right_to_left
///
/// normalization:
///   case_fold: true
///   letters_only: true
///
/// # Stride sweep
/// start_stride: 2
/// start_offset: 0
/// max_stride: 5000
/// max_concurrency: 8
/// context_width: 8
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Queries to look for
    #[serde(default)]
    pub queries: Vec<String>,

    /// Grid width; required for grid searches
    #[serde(default)]
    pub stride: Option<usize>,

    /// Letters skipped before the first grid cell
    #[serde(default)]
    pub offset: usize,

    /// Reading direction used when drawing grids
    #[serde(default)]
    pub layout: Layout,

    /// How source text is reduced to letters
    #[serde(default)]
    pub normalization: Normalization,

    /// First stride tried by a sweep
    #[serde(default = "default_start_stride")]
    pub start_stride: usize,

    /// First offset tried within every stride
    #[serde(default)]
    pub start_offset: usize,

    /// Largest stride tried by a sweep
    #[serde(default)]
    pub max_stride: Option<usize>,

    /// Stride tasks allowed in flight at once.
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: NonZeroUsize,

    /// Letters of context shown around a sweep hit
    #[serde(default = "default_context_width")]
    pub context_width: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Values given on the command line. `None` leaves the configured value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub queries: Vec<String>,
    pub stride: Option<usize>,
    pub offset: Option<usize>,
    pub layout: Option<Layout>,
    pub case_fold: Option<bool>,
    pub letters_only: Option<bool>,
    pub start_stride: Option<usize>,
    pub start_offset: Option<usize>,
    pub max_stride: Option<usize>,
    pub max_concurrency: Option<NonZeroUsize>,
    pub context_width: Option<usize>,
    pub log_level: Option<String>,
}

fn default_start_stride() -> usize {
    2
}

fn default_max_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_context_width() -> usize {
    8
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            stride: None,
            offset: 0,
            layout: Layout::default(),
            normalization: Normalization::default(),
            start_stride: default_start_stride(),
            start_offset: 0,
            max_stride: None,
            max_concurrency: default_max_concurrency(),
            context_width: default_context_width(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus `config_path`,
    /// which must exist if given
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("elscout/config.yaml")),
            Some(PathBuf::from(".elscout.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Applies command-line overrides. Every value given on the command line
    /// wins, even one equal to the default.
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if !cli.queries.is_empty() {
            self.queries = cli.queries;
        }
        if cli.stride.is_some() {
            self.stride = cli.stride;
        }
        if let Some(offset) = cli.offset {
            self.offset = offset;
        }
        if let Some(layout) = cli.layout {
            self.layout = layout;
        }
        if let Some(case_fold) = cli.case_fold {
            self.normalization.case_fold = case_fold;
        }
        if let Some(letters_only) = cli.letters_only {
            self.normalization.letters_only = letters_only;
        }
        if let Some(start_stride) = cli.start_stride {
            self.start_stride = start_stride;
        }
        if let Some(start_offset) = cli.start_offset {
            self.start_offset = start_offset;
        }
        if cli.max_stride.is_some() {
            self.max_stride = cli.max_stride;
        }
        if let Some(max_concurrency) = cli.max_concurrency {
            self.max_concurrency = max_concurrency;
        }
        if let Some(context_width) = cli.context_width {
            self.context_width = context_width;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// The sweep settings of this configuration
    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            start_stride: self.start_stride,
            start_offset: self.start_offset,
            max_stride: self.max_stride,
            max_concurrency: self.max_concurrency,
            context_width: self.context_width,
        }
    }

    /// The effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
