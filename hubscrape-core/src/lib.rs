pub mod scrape;
pub mod table;

use colored::Colorize;

pub use scrape::{
    EmptyRecordPolicy, ScrapeOptions, ScrapeProgressCallback, ScrapeStats, execute_scrape,
    format_elapsed,
};
pub use table::{OutputFormat, ResultTable, TableError};

pub fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════╗
    ║   _           _                              ║
    ║  | |__  _   _| |__  ___  ___ _ __ __ _ _ __  ║
    ║  | '_ \| | | | '_ \/ __|/ __| '__/ _` | '_ \ ║
    ║  | | | | |_| | |_) \__ \ (__| | | (_| | |_) |║
    ║  |_| |_|\__,_|_.__/|___/\___|_|  \__,_| .__/ ║
    ║                                       |_|    ║
    ║        model hub metadata scraper            ║
    ╚══════════════════════════════════════════════╝
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "    {} {}\n",
        "version".dimmed(),
        env!("CARGO_PKG_VERSION").bright_white()
    );
}
