//! Phrase bundles stored as `key,text` CSV files.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use formwork_model::MemoryPhrasebook;

#[derive(Debug, Deserialize)]
struct PhraseRow {
    key: String,
    text: String,
}

/// Load a phrase bundle from disk.
pub fn load_phrases(path: &Path) -> Result<MemoryPhrasebook> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open phrases {}", path.display()))?;
    let phrases =
        read_phrases(file).with_context(|| format!("parse phrases {}", path.display()))?;
    debug!(path = %path.display(), count = phrases.len(), "loaded phrases");
    Ok(phrases)
}

/// Read `key,text` rows. Blank keys are skipped and later rows win.
pub fn read_phrases<R: Read>(reader: R) -> Result<MemoryPhrasebook> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut phrases = MemoryPhrasebook::new();
    for (index, row) in csv.deserialize::<PhraseRow>().enumerate() {
        let row = row.with_context(|| format!("phrase row {}", index + 1))?;
        let key = row.key.trim();
        if key.is_empty() {
            continue;
        }
        phrases.insert(key, row.text);
    }
    Ok(phrases)
}
