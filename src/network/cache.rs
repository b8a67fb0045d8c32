use std::collections::HashMap;

use super::fetcher::FetchedResource;

/// Per-run memo of fetch outcomes, keyed by location
///
/// Failures are remembered too, so a location is requested at most once.
#[derive(Default)]
pub struct Cache {
    entries: HashMap<String, Option<FetchedResource>>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Outer `None` means never requested, inner `None` means it failed
    pub fn get(&self, key: &str) -> Option<Option<&FetchedResource>> {
        self.entries.get(key).map(Option::as_ref)
    }

    pub fn set(&mut self, key: &str, outcome: Option<FetchedResource>) {
        self.entries.insert(key.to_string(), outcome);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remembers_success_and_failure() {
        let mut cache = Cache::new();
        assert!(cache.get("http://a/").is_none());

        cache.set("http://a/", Some(FetchedResource::new("text/html", "x")));
        cache.set("http://b/", None);

        assert_eq!(cache.get("http://a/").flatten().unwrap().data, b"x");
        assert_eq!(cache.get("http://b/"), Some(None));
        assert_eq!(cache.len(), 2);
    }
}
