// src/records/site.rs
// =============================================================================
// The persisted company record.
//
// One JSON document per company, keyed by its KvK (Dutch chamber of commerce)
// number. The crawler and the search client only care about the website,
// the careers pages and the three accumulated sets; address and sector are
// carried through untouched.
// =============================================================================

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub name: String,
    pub kvk: String,
    #[serde(default)]
    pub website: Option<String>,
    /// None or empty means no careers page has been found yet
    #[serde(default, deserialize_with = "one_or_many")]
    pub careers_page: Option<Vec<String>>,
    #[serde(default)]
    pub address: Option<serde_json::Value>,
    #[serde(default)]
    pub sector: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub external_links: HashSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emails: HashSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub visited: HashSet<String>,
    /// Where this record was loaded from, if it came from disk
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl SiteRecord {
    pub fn new(name: impl Into<String>, kvk: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kvk: kvk.into(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.trim().is_empty())
    }

    pub fn has_careers_page(&self) -> bool {
        self.careers_page.as_ref().is_some_and(|pages| !pages.is_empty())
    }

    // The file this record is written to: where it came from, or <kvk>.json
    pub fn document_path(&self, dir: &Path) -> PathBuf {
        match &self.file_path {
            Some(path) => path.clone(),
            None => dir.join(format!("{}.json", self.kvk)),
        }
    }
}

// Older documents store a single careers URL as a plain string
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(url)) => Some(vec![url]),
        Some(OneOrMany::Many(urls)) => Some(urls),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}
