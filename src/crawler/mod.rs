//! Crawler module for the registration listing
//!
//! This module contains the scrape side of the pipeline, including:
//! - HTTP fetching of listing pages
//! - Pagination driven by the page's result count
//! - Extraction of registration rows from page markup
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod paginator;
mod parser;

#[cfg(test)]
mod fixtures;

pub use coordinator::{harvest_pages, parser_for, run_harvest, HarvestReport, HarvestTally, Harvester};
pub use fetcher::{
    build_http_client, page_url, HttpPageSource, PageSource, PAGE_PARAM, PAGE_SIZE_PARAM,
    TERM_PARAM,
};
pub use paginator::{should_stop, FetchedPage, Paginator, MAX_PAGES};
pub use parser::{PageCount, PatternRecordParser, RawRecord, RecordParser, TableRecordParser};
