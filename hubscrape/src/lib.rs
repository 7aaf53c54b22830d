// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    ScrapeArgs, expand_output_path, handle_scrape, parse_delay, parse_header_line, run_scrape,
    select_log_level,
};

// Re-export scrape functionality from hubscrape-core
pub use hubscrape_core::{EmptyRecordPolicy, OutputFormat, ScrapeOptions, execute_scrape};
