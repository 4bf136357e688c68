//! Pagination over the registration listing
//!
//! The total size of the result set is only known from the count sentence
//! embedded in each page, so pages are requested one at a time until a page
//! reports that it reaches the end.

use crate::crawler::fetcher::PageSource;
use crate::crawler::parser::PageCount;
use crate::HarvestError;

/// Default hard ceiling on pages fetched in one run
pub const MAX_PAGES: u32 = 10_000;

/// A fetched listing page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 1-based page number
    pub number: u32,
    pub body: String,
    pub count: PageCount,
}

/// Decides whether the page with the given count is the last one
///
/// A page without a readable count is also treated as the last one, so an
/// empty or unexpected page ends the crawl without an error.
pub fn should_stop(count: &PageCount) -> bool {
    match count {
        PageCount::Found { last, total, .. } => last == total,
        PageCount::NotFound => true,
    }
}

/// Fetches pages lazily, starting at page 1
pub struct Paginator<S> {
    source: S,
    next_page: u32,
    max_pages: u32,
    finished: bool,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, max_pages: u32) -> Self {
        Self {
            source,
            next_page: 1,
            max_pages,
            finished: false,
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    /// Fetches the next page, or returns `None` once the result set is exhausted
    ///
    /// A fetch error is returned as is; the paginator does not retry.
    pub async fn next_page(&mut self) -> Result<Option<FetchedPage>, HarvestError> {
        if self.finished {
            return Ok(None);
        }

        if self.next_page > self.max_pages {
            tracing::warn!(
                "Reached the limit of {} pages without the listing reporting its end",
                self.max_pages
            );
            self.finished = true;
            return Ok(None);
        }

        let number = self.next_page;
        tracing::info!("Fetching page {}...", number);

        let body = self.source.fetch_page(number).await?;
        self.next_page += 1;

        let count = PageCount::scan(&body);
        match count {
            PageCount::Found { first, last, total } => {
                tracing::debug!("Page {} holds results {} to {} of {}", number, first, last, total);
            }
            PageCount::NotFound => {
                tracing::warn!(
                    "Page {} has no result count; treating it as the last page",
                    number
                );
            }
        }

        if should_stop(&count) {
            self.finished = true;
        }

        Ok(Some(FetchedPage {
            number,
            body,
            count,
        }))
    }
}
