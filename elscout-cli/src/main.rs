use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use elscout::{
    source::{TextSource, VerseRange, VerseText},
    BookSweep, ConfigOverrides, GridIndex, Layout, LetterStream, Match, MatchKind, Normalization,
    ScanConfig, SearchError, StrideSweeper,
};
use serde_json::{json, Value};
use std::{
    collections::HashSet,
    fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the letters come from
#[derive(Args)]
struct SourceArgs {
    /// Text file, one verse per line unless --plain is given
    #[arg(short = 't', long = "text")]
    text: PathBuf,

    /// Read the file as running text instead of verses
    #[arg(long, conflicts_with_all = ["from", "book"])]
    plain: bool,

    /// First verse of the range, e.g. "Numbers 4:11"
    #[arg(long, requires = "to", conflicts_with = "book")]
    from: Option<String>,

    /// Last verse of the range, e.g. "Numbers 4:20"
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Use a whole book
    #[arg(long)]
    book: Option<String>,

    /// Keep upper and lower case distinct
    #[arg(long, overrides_with = "fold_case")]
    keep_case: bool,

    /// Lower-case every letter
    #[arg(long, overrides_with = "keep_case")]
    fold_case: bool,

    /// Keep punctuation and digits in the stream
    #[arg(long, overrides_with = "letters_only")]
    keep_punctuation: bool,

    /// Keep only letters
    #[arg(long, overrides_with = "keep_punctuation")]
    letters_only: bool,
}

impl SourceArgs {
    fn apply(&self, overrides: &mut ConfigOverrides) {
        overrides.case_fold = switch(self.fold_case, self.keep_case);
        overrides.letters_only = switch(self.letters_only, self.keep_punctuation);
    }
}

// An explicit on or off flag, or nothing
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Args)]
struct GridArgs {
    /// Row width of the grid
    #[arg(short = 's', long)]
    stride: Option<usize>,

    /// Letters to skip before the first cell
    #[arg(short = 'o', long)]
    offset: Option<usize>,

    /// Draw rows right to left
    #[arg(long, overrides_with = "ltr")]
    rtl: bool,

    /// Draw rows left to right
    #[arg(long, overrides_with = "rtl")]
    ltr: bool,
}

impl GridArgs {
    fn apply(&self, overrides: &mut ConfigOverrides) {
        overrides.stride = self.stride;
        overrides.offset = self.offset;
        overrides.layout = switch(self.rtl, self.ltr).map(|rtl| {
            if rtl {
                Layout::RightToLeft
            } else {
                Layout::LeftToRight
            }
        });
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the letter grid for a stride and offset
    Grid {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Find queries laid out at a constant step in the grid
    Find {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        grid: GridArgs,

        /// Query to look for (can be specified multiple times)
        #[arg(short = 'q', long = "query")]
        queries: Vec<String>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Try every stride and offset for an equidistant occurrence
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Query to look for (can be specified multiple times)
        #[arg(short = 'q', long = "query")]
        queries: Vec<String>,

        /// First stride to try
        #[arg(long)]
        start_stride: Option<usize>,

        /// First offset to try within every stride
        #[arg(long)]
        start_offset: Option<usize>,

        /// Largest stride to try
        #[arg(long)]
        max_stride: Option<usize>,

        /// Number of strides scanned at once
        #[arg(short = 'j', long)]
        threads: Option<NonZeroUsize>,

        /// Letters of context either side of a hit
        #[arg(short = 'C', long)]
        context: Option<usize>,

        /// Sweep each book of a verse text, then the whole text
        #[arg(long, conflicts_with_all = ["plain", "from", "book"])]
        all_books: bool,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print verses, e.g. "Ge1:1" or "Numbers 4:11-13". An argument naming a
    /// file is read as one reference per line.
    Verses {
        /// Verse text, one verse per line
        #[arg(short = 't', long = "text")]
        text: PathBuf,

        /// References or files of references
        #[arg(required = true)]
        references: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = ScanConfig::load_from(cli.config.as_deref())
        .map_err(|e| SearchError::config_error(e.to_string()))?;
    let mut overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        ..ConfigOverrides::default()
    };

    match cli.command {
        Commands::Grid { source, grid } => {
            source.apply(&mut overrides);
            grid.apply(&mut overrides);
            let config = file_config.merge_with_cli(overrides);
            init_logging(&config.log_level);

            let grid_index = build_grid(&config, &source)?;
            println!("{}", grid_index.render(config.layout));
            Ok(())
        }
        Commands::Find {
            source,
            grid,
            queries,
            json,
        } => {
            source.apply(&mut overrides);
            grid.apply(&mut overrides);
            overrides.queries = queries;
            let config = file_config.merge_with_cli(overrides);
            init_logging(&config.log_level);

            let grid_index = build_grid(&config, &source)?;
            let found = find_all(&grid_index, &config.queries, &config.normalization)?;
            if json {
                print_json(&found_to_json(&found))?;
            } else {
                print_find_results(&grid_index, config.layout, &found);
            }
            Ok(())
        }
        Commands::Sweep {
            source,
            queries,
            start_stride,
            start_offset,
            max_stride,
            threads,
            context,
            all_books,
            json,
        } => {
            source.apply(&mut overrides);
            overrides.queries = queries;
            overrides.start_stride = start_stride;
            overrides.start_offset = start_offset;
            overrides.max_stride = max_stride;
            overrides.max_concurrency = threads;
            overrides.context_width = context;
            let config = file_config.merge_with_cli(overrides);
            init_logging(&config.log_level);

            if config.queries.is_empty() {
                return Err(SearchError::config_error(
                    "No query given; pass -q or list queries in the configuration",
                ));
            }

            let sweeper = StrideSweeper::new(config.sweep_options());
            let started = Instant::now();
            let mut sweeps = Vec::new();
            if all_books {
                let text = VerseText::load(&source.text)?;
                for query in &config.queries {
                    let normalized = normalize_query(query, &config.normalization);
                    let books = sweeper.scan_books(&text, &normalized, &config.normalization)?;
                    sweeps.push((query.as_str(), books));
                }
            } else {
                let stream = load_stream(&source, &config.normalization)?;
                for query in &config.queries {
                    let normalized = normalize_query(query, &config.normalization);
                    let results = sweeper.scan(&stream, &normalized)?;
                    let sweep = BookSweep {
                        book: source.book.clone(),
                        symbols: stream.len(),
                        start_stride: config.start_stride,
                        results,
                    };
                    sweeps.push((query.as_str(), vec![sweep]));
                }
            }
            let elapsed = started.elapsed();
            sweeper.metrics().log_stats();

            if json {
                let value = sweeps
                    .iter()
                    .map(|(query, books)| json!({ "query": query, "sweeps": books }))
                    .collect();
                print_json(&Value::Array(value))?;
            } else {
                print_sweep_results(&sweeps);
                let hits: usize = sweeps
                    .iter()
                    .flat_map(|(_, books)| books.iter())
                    .map(|book| book.results.len())
                    .sum();
                println!(
                    "\nFound {} hits in {}",
                    hits,
                    humantime::format_duration(round_to_millis(elapsed))
                );
            }
            Ok(())
        }
        Commands::Verses { text, references } => {
            let config = file_config.merge_with_cli(overrides);
            init_logging(&config.log_level);

            let verse_text = VerseText::load(&text)?;
            for reference in expand_references(&references)? {
                match print_verses(&verse_text, &reference) {
                    Ok(()) => {}
                    Err(e @ (SearchError::InvalidReference(_) | SearchError::ReferenceNotFound(_))) => {
                        warn!("Skipping {:?}: {}", reference, e)
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }
        Commands::Config => {
            let config = file_config.merge_with_cli(overrides);
            let yaml = config
                .to_yaml()
                .map_err(|e| SearchError::config_error(e.to_string()))?;
            print!("{}", yaml);
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_stream(source: &SourceArgs, normalization: &Normalization) -> Result<LetterStream> {
    if source.plain {
        let contents = read_text(&source.text)?;
        return Ok(LetterStream::new(&contents, normalization));
    }

    let text = VerseText::load(&source.text)?;
    let stream = match (&source.from, &source.to, &source.book) {
        (Some(from), Some(to), _) => text.letter_stream(from, to, normalization)?,
        (_, _, Some(book)) => text.book_stream(book, normalization)?,
        _ => text.full_stream(normalization),
    };
    debug!("Letter stream of {} symbols", stream.len());
    Ok(stream)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SearchError::file_not_found(path),
        _ => SearchError::IoError(e),
    })
}

/// Arguments naming a readable file are replaced by its lines, skipping blank
/// lines and shell script headers
fn expand_references(args: &[String]) -> Result<Vec<String>> {
    let mut references = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if !path.is_file() {
            references.push(arg.clone());
            continue;
        }
        let contents = read_text(path)?;
        references.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| {
                    !line.is_empty() && !line.starts_with("#!") && !line.starts_with("exec ")
                })
                .map(str::to_string),
        );
    }
    Ok(references)
}

fn print_verses(text: &VerseText, reference: &str) -> Result<()> {
    let range: VerseRange = reference.parse()?;
    for verse in text.lookup(&range)? {
        println!("{} {}", verse.reference().to_string().green(), verse.text);
    }
    Ok(())
}

fn build_grid(config: &ScanConfig, source: &SourceArgs) -> Result<GridIndex> {
    let stride = config
        .stride
        .ok_or_else(|| SearchError::config_error("A stride is required (--stride)"))?;
    let stream = load_stream(source, &config.normalization)?;
    GridIndex::build(&stream, stride, config.offset)
}

// Queries go through the same normalization as the text
fn normalize_query(query: &str, normalization: &Normalization) -> String {
    normalization.normalize(query).into_iter().collect()
}

/// Runs every query against the grid. A query that cannot match is reported
/// and skipped; anything else ends the run.
fn find_all<'q>(
    grid: &GridIndex,
    queries: &'q [String],
    normalization: &Normalization,
) -> Result<Vec<(&'q str, Vec<Match>)>> {
    let mut found = Vec::new();
    for query in queries {
        match grid.find(&normalize_query(query, normalization)) {
            Ok(matches) => {
                info!("{:?}: {} matches", query, matches.len());
                found.push((query.as_str(), matches));
            }
            Err(e) if e.is_query_error() => warn!("Skipping query: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}

fn found_to_json(found: &[(&str, Vec<Match>)]) -> Value {
    found
        .iter()
        .map(|(query, matches)| json!({ "query": query, "matches": matches }))
        .collect()
}

fn print_json(value: &Value) -> Result<()> {
    let out = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{}", out);
    Ok(())
}

fn print_find_results(grid: &GridIndex, layout: Layout, found: &[(&str, Vec<Match>)]) {
    let highlighted: HashSet<_> = found
        .iter()
        .flat_map(|(_, matches)| matches.iter())
        .flat_map(|m| m.positions.iter().copied())
        .collect();

    for row in grid.display_rows(layout) {
        let line: String = row
            .iter()
            .map(|(position, symbol)| {
                let cell = symbol.unwrap_or(' ').to_string();
                if highlighted.contains(position) {
                    cell.red().bold().to_string()
                } else {
                    cell
                }
            })
            .collect();
        println!("{}", line);
    }

    for (query, matches) in found {
        println!("\n{} {}", "Query".blue(), query);
        for m in matches {
            let cells: Vec<String> = m.positions.iter().map(|p| p.to_string()).collect();
            let how = match m.kind {
                MatchKind::Grid => format!("grid {}", m.delta),
                MatchKind::Literal => "literal".to_string(),
                MatchKind::ReversedLiteral => "reversed literal".to_string(),
            };
            println!("  {}: {}", how.green(), cells.join(" "));
        }
        println!("Found {} matches", matches.len());
    }
}

fn print_sweep_results(sweeps: &[(&str, Vec<BookSweep>)]) {
    for (query, books) in sweeps {
        println!("{} {}", "Query".blue(), query);
        for sweep in books {
            println!(
                "  {} ({} symbols, strides from {})",
                sweep.book.as_deref().unwrap_or("whole text"),
                sweep.symbols,
                sweep.start_stride
            );
            for r in &sweep.results {
                println!(
                    "    stride {} offset {} {:?}: {} x{} at {}",
                    r.stride.to_string().green(),
                    r.offset,
                    r.direction,
                    r.context,
                    r.count,
                    r.start_index
                );
            }
        }
    }
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
