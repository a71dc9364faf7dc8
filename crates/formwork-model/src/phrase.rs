//! Phrase lookup.
//!
//! Loading and localizing phrases is the host's business; controls only ask
//! for a key and take the first non-empty answer.

use std::collections::BTreeMap;

/// A lookup built from a base key, an optional `_append` segment and an
/// optional `_appendix` segment, plus substitution parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseLookup {
    key: String,
    append: Option<String>,
    appendix: Option<String>,
    params: BTreeMap<String, String>,
}

impl PhraseLookup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn append(mut self, segment: impl Into<String>) -> Self {
        self.append = Some(segment.into());
        self
    }

    pub fn appendix(mut self, segment: impl Into<String>) -> Self {
        self.appendix = Some(segment.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The dotted key actually looked up.
    pub fn full_key(&self) -> String {
        let mut key = self.key.clone();
        for segment in [&self.append, &self.appendix].into_iter().flatten() {
            key.push('.');
            key.push_str(segment);
        }
        key
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

pub trait Phrasebook: Send + Sync {
    /// Raw phrase text for a fully-qualified key.
    fn phrase(&self, key: &str) -> Option<String>;

    /// Resolve a lookup, substituting `{{param}}` placeholders.
    ///
    /// Empty phrases count as missing.
    fn get(&self, lookup: &PhraseLookup) -> Option<String> {
        self.phrase(&lookup.full_key())
            .filter(|text| !text.is_empty())
            .map(|text| substitute(&text, lookup.params()))
    }
}

/// Replace `{{name}}` placeholders with parameter values. Unknown
/// placeholders are left untouched.
pub fn substitute(text: &str, params: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// In-memory phrase bundle.
#[derive(Debug, Clone, Default)]
pub struct MemoryPhrasebook {
    phrases: BTreeMap<String, String>,
}

impl MemoryPhrasebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.phrases.insert(key.into(), text.into());
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Phrasebook for MemoryPhrasebook {
    fn phrase(&self, key: &str) -> Option<String> {
        self.phrases.get(key).cloned()
    }
}

impl FromIterator<(String, String)> for MemoryPhrasebook {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            phrases: iter.into_iter().collect(),
        }
    }
}
