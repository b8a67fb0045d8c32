use regex::Regex;
use tracing::{debug, warn};

use crate::core::ShelfError;
use crate::utils::url::Url;

use super::cache::Cache;
use super::fetcher::{FetchedResource, Fetcher};

/// Accept/reject patterns applied to every candidate location
///
/// Rejection wins over acceptance; with no accept pattern everything not
/// rejected is allowed.
#[derive(Clone, Debug, Default)]
pub struct UrlFilter {
    accept: Option<Regex>,
    reject: Option<Regex>,
}

impl UrlFilter {
    pub fn new(accept: Option<&str>, reject: Option<&str>) -> Result<UrlFilter, ShelfError> {
        Ok(UrlFilter {
            accept: accept.map(compile_pattern).transpose()?,
            reject: reject.map(compile_pattern).transpose()?,
        })
    }

    pub fn allows(&self, url: &str) -> bool {
        if self.reject.as_ref().is_some_and(|re| re.is_match(url)) {
            false
        } else {
            self.accept.as_ref().map_or(true, |re| re.is_match(url))
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ShelfError> {
    Regex::new(pattern).map_err(|source| ShelfError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Everything the crawler needs to get bytes: a fetcher, its memo and the
/// location filter. Failed retrievals flag the run.
pub struct Session {
    fetcher: Box<dyn Fetcher>,
    cache: Cache,
    filter: UrlFilter,
    had_errors: bool,
}

impl Session {
    pub fn new(fetcher: Box<dyn Fetcher>, filter: UrlFilter) -> Session {
        Session {
            fetcher,
            cache: Cache::new(),
            filter,
            had_errors: false,
        }
    }

    pub fn allows(&self, url: &Url) -> bool {
        self.filter.allows(url.as_str())
    }

    pub fn had_errors(&self) -> bool {
        self.had_errors
    }

    /// Fetches a location once per run; later calls are served from memory
    pub fn retrieve(&mut self, url: &Url) -> Option<FetchedResource> {
        let cache_key = url.as_str();

        if let Some(outcome) = self.cache.get(cache_key) {
            debug!("cache hit: {}", url);
            return outcome.cloned();
        }

        let outcome = match self.fetcher.fetch(url) {
            Ok(resource) => Some(resource),
            Err(e) => {
                warn!("error downloading {}: {}", url, e);
                self.had_errors = true;
                None
            }
        };

        self.cache.set(cache_key, outcome.clone());
        outcome
    }
}
