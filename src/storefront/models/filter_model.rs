//! Filter model
//!
//! The product list is a function of the page URL. `FilterState` edits the query
//! string of that URL; it never filters or sorts anything itself.

use url::Url;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_MIN_PRICE: &str = "min_price";
pub const PARAM_MAX_PRICE: &str = "max_price";
pub const PARAM_TAGS: &str = "tags";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";

/// Sort value the sort control falls back to on reset
pub const DEFAULT_SORT: &str = "default";

/// Query-string view over the current page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    url: Url,
}

impl FilterState {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, or remove it when `value` is empty
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.remove(key);
            return;
        }
        let mut replaced = false;
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter_map(|(k, v)| {
                if k == key {
                    if replaced {
                        return None;
                    }
                    replaced = true;
                    return Some((k.into_owned(), value.to_string()));
                }
                Some((k.into_owned(), v.into_owned()))
            })
            .collect();
        self.write_pairs(pairs);
        if !replaced {
            self.url.query_pairs_mut().append_pair(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        if !self.has(key) {
            return;
        }
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.write_pairs(pairs);
    }

    /// Drop every parameter except `keep`
    pub fn retain_only(&mut self, keep: &[&str]) {
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| keep.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.write_pairs(pairs);
    }

    fn write_pairs(&mut self, pairs: Vec<(String, String)>) {
        if pairs.is_empty() {
            self.url.set_query(None);
            return;
        }
        self.url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    /// Selected tags, split from the comma-joined `tags` parameter
    pub fn tags(&self) -> Vec<String> {
        self.get(PARAM_TAGS)
            .map(|tags| {
                tags.split(',')
                    .filter(|t| !t.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_tags(&mut self, tags: &[String]) {
        self.set(PARAM_TAGS, &tags.join(","));
    }

    pub fn page(&self) -> u32 {
        self.get(PARAM_PAGE)
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }

    pub fn set_page(&mut self, page: &str) {
        self.set(PARAM_PAGE, page);
    }
}

/// Page number a pagination link points at, read from its `page` parameter
pub fn page_from_href(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().and_then(|target| {
        target
            .query_pairs()
            .find(|(k, _)| k == PARAM_PAGE)
            .map(|(_, v)| v.into_owned())
    })
}
