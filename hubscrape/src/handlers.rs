use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use hubscrape_core::{
    EmptyRecordPolicy, OutputFormat, ScrapeOptions, ScrapeStats, execute_scrape, format_elapsed,
};
use hubscrape_scanner::HubClient;
use hubscrape_scanner::client::DEFAULT_TIMEOUT_SECS;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, info};
use url::Url;

/// Everything a scrape run needs, pulled out of the command line.
#[derive(Debug, Clone)]
pub struct ScrapeArgs {
    pub base_url: String,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub timeout_secs: u64,
    pub max_pages: u32,
    pub delay: Duration,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub empty_records: EmptyRecordPolicy,
    pub null_marker: String,
    pub quiet: bool,
}

impl ScrapeArgs {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let format_name = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("csv");
        let format = OutputFormat::from_str(format_name)
            .ok_or_else(|| anyhow!("unsupported output format '{}'", format_name))?;

        let output = args
            .get_one::<String>("output")
            .ok_or_else(|| anyhow!("--output has no value"))?;

        Ok(Self {
            base_url: args
                .get_one::<Url>("base-url")
                .map(|u| u.as_str().to_string())
                .ok_or_else(|| anyhow!("--base-url has no value"))?,
            user_agent: args
                .get_one::<String>("user-agent")
                .cloned()
                .ok_or_else(|| anyhow!("--user-agent has no value"))?,
            headers: args
                .get_many::<(String, String)>("header")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            timeout_secs: args
                .get_one::<u64>("timeout")
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_pages: args.get_one::<u32>("pages").copied().unwrap_or(0),
            delay: args.get_one::<Duration>("sleep").copied().unwrap_or_default(),
            output: expand_output_path(output),
            format,
            empty_records: if args.get_flag("skip-empty") {
                EmptyRecordPolicy::Skip
            } else {
                EmptyRecordPolicy::Keep
            },
            null_marker: args
                .get_one::<String>("null-marker")
                .cloned()
                .unwrap_or_default(),
            quiet: args.get_flag("quiet"),
        })
    }

    pub fn build_client(&self) -> Result<HubClient> {
        let mut builder = HubClient::builder()
            .with_base_url(&self.base_url)
            .with_user_agent(&self.user_agent)
            .with_timeout(self.timeout_secs);
        for (name, value) in &self.headers {
            builder = builder.with_header(name, value);
        }
        builder.build().context("failed to configure HTTP client")
    }
}

/// Parses a `Name: Value` header argument.
pub fn parse_header_line(line: &str) -> Result<(String, String), String> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: Value', got '{}'", line))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", line));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parses a non-negative number of seconds, fractions allowed.
pub fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", s))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("'{}' must be a finite, non-negative number of seconds", s))
}

/// Expands a leading `~` in the output path.
pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Chooses the log level from `--log-level`, `-v` and `--quiet`, in that
/// order of precedence.
pub fn select_log_level(explicit: Option<&str>, verbose: u8, quiet: bool) -> Level {
    if let Some(level) = explicit.and_then(|l| l.parse::<Level>().ok()) {
        return level;
    }
    match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Installs the timestamped stderr log stream for the whole run.
pub fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_summary(args: &ScrapeArgs, stats: &ScrapeStats, rows: usize, cols: usize) {
    println!();
    print_divider();
    println!("{}", "  SCRAPE COMPLETE".bright_white().bold());
    print_divider();
    println!("  {} Model urls found: {}", "•".cyan(), stats.urls_found);
    println!("  {} Rows written:     {}", "•".cyan(), rows);
    if stats.records_skipped > 0 {
        println!(
            "  {} Empty skipped:    {}",
            "•".yellow(),
            stats.records_skipped
        );
    }
    println!("  {} Columns:          {}", "•".cyan(), cols);
    println!(
        "  {} Elapsed:          {}",
        "•".cyan(),
        format_elapsed(stats.enumerate_time + stats.extract_time)
    );
    println!(
        "{} Saved to {}",
        "✓".green().bold(),
        args.output.display().to_string().bright_white()
    );
}

/// Runs enumeration and extraction, then writes the table.
///
/// The output file is only touched after every page has been scraped.
pub async fn run_scrape(args: &ScrapeArgs) -> Result<ScrapeStats> {
    let client = args.build_client()?;
    info!("Starting webscraping of {}models", client.base_url());

    let options = ScrapeOptions {
        max_pages: args.max_pages,
        delay: args.delay,
        empty_records: args.empty_records,
        show_progress_bars: !args.quiet,
    };

    // The progress bars cover the terminal; the log gets the same steps.
    let progress_callback = Arc::new(|msg: String| {
        debug!("{}", msg);
    });

    let (table, stats) = execute_scrape(client, &options, Some(progress_callback))
        .await
        .context("scrape aborted")?;

    table
        .persist(&args.output, args.format, &args.null_marker)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("File {} has been written", args.output.display());

    if !args.quiet {
        print_summary(args, &stats, table.row_count(), table.columns().len());
    }

    Ok(stats)
}

pub async fn handle_scrape(matches: &ArgMatches) -> Result<()> {
    let args = ScrapeArgs::from_matches(matches)?;
    run_scrape(&args).await?;
    Ok(())
}
