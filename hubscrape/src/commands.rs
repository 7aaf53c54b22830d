use crate::CLAP_STYLING;
use clap::{arg, value_parser};
use hubscrape::handlers::{parse_delay, parse_header_line};
use hubscrape_scanner::client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

pub const DEFAULT_OUTPUT: &str = "huggingface_models_dataset.csv";
const DEFAULT_TIMEOUT: &str = "30";

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("hubscrape")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("hubscrape")
        .about("Scrape model metadata from a model hub into a CSV dataset")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner, progress bars and info logs").required(false))
        .arg(
            arg!(-p --"pages" <N>)
                .required(false)
                .help("Highest listing page index to scrape (page 0 is always read)")
                .value_parser(value_parser!(u32))
                .default_value("0"),
        )
        .arg(
            arg!(-s --"sleep" <SECONDS>)
                .required(false)
                .help("Seconds to wait between requests")
                .value_parser(parse_delay)
                .default_value("0"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Where to write the dataset")
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format: csv, json")
                .value_parser(["csv", "json"])
                .default_value("csv"),
        )
        .arg(
            arg!(--"base-url" <URL>)
                .required(false)
                .help("Model hub to scrape")
                .value_parser(value_parser!(url::Url))
                .default_value(DEFAULT_BASE_URL),
        )
        .arg(
            arg!(-A --"user-agent" <UA>)
                .required(false)
                .help("User-Agent header sent with every request")
                .default_value(DEFAULT_USER_AGENT),
        )
        .arg(
            arg!(-H --"header" <HEADER>)
                .required(false)
                .help("Extra request header as 'Name: Value' (repeatable)")
                .value_parser(parse_header_line)
                .action(clap::ArgAction::Append),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(value_parser!(u64).range(1..))
                .default_value(DEFAULT_TIMEOUT),
        )
        .arg(
            arg!(--"skip-empty")
                .required(false)
                .help("Leave models with no extracted fields out of the dataset")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"null-marker" <TEXT>)
                .required(false)
                .help("Text written for missing values in CSV output")
                .default_value(""),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(clap::ArgAction::Count)
                .conflicts_with("log-level"),
        )
        .arg(
            arg!(--"log-level" <LEVEL>)
                .required(false)
                .help("Log level: error, warn, info, debug, trace")
                .value_parser(["error", "warn", "info", "debug", "trace"]),
        )
}
