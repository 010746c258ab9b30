// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::collection::Collection;
use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::review::engine::ReviewEngine;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::timestamp::Timestamp;

/// One entry of a word list file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordEntry {
    pub vocabulary: String,
    pub pinyin: String,
    pub level: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

pub fn import_word_list(directory: Option<String>, file: &Path) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let text = read_to_string(file)?;
    let entries: Vec<WordEntry> = serde_json::from_str(&text)?;
    let summary = import_entries(&coll.review_engine(), &entries, Timestamp::now())?;
    println!(
        "Imported {} new cards ({} already present). The collection has {} cards.",
        summary.added,
        summary.skipped,
        coll.db.card_count()?
    );
    Ok(())
}

/// Add every entry as a new card. Entries that already exist are skipped.
///
/// The whole list is validated before anything is written.
pub fn import_entries<S: CardStore, K: Scheduler>(
    engine: &ReviewEngine<S, K>,
    entries: &[WordEntry],
    now: Timestamp,
) -> Fallible<ImportSummary> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.vocabulary.trim().is_empty() {
            return fail_with(
                ErrorKind::InvalidInput,
                format!("entry {index} has no vocabulary"),
            );
        }
    }
    let mut summary = ImportSummary::default();
    for entry in entries {
        match engine.create_card(&entry.vocabulary, &entry.pinyin, &entry.level, now)? {
            Some(card) => {
                log::debug!("Added card {} ({}).", card.id(), card.vocabulary());
                summary.added += 1;
            }
            None => summary.skipped += 1,
        }
    }
    Ok(summary)
}
