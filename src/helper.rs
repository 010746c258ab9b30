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

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use tempfile::TempDir;
use tempfile::tempdir;

use crate::db::Database;
use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::scheduler::FsrsScheduler;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::card::Card;
use crate::types::card::CardUpdate;
use crate::types::card::ReviewLog;
use crate::types::card_id::CardId;
use crate::types::date::Date;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The fixed "today" of every test.
pub fn today() -> Date {
    Date::new(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap())
}

/// Local noon `days` days from today, shifted by `hours`.
pub fn at(days: i64, hours: i64) -> Timestamp {
    Timestamp::local_noon(today(), days * 24 + hours)
}

/// A never-reviewed card due at `next_review`.
pub fn new_card(vocabulary: &str, level: &str, next_review: Timestamp) -> Card {
    Card::new(
        vocabulary,
        format!("{vocabulary}-pinyin"),
        level,
        FsrsScheduler::new().initial_state(),
        next_review,
    )
}

/// A card with the given review history. The memory-state is left at the
/// initial state; analytics never looks at it.
pub fn reviewed_card(
    vocabulary: &str,
    level: &str,
    reviews: &[(Timestamp, Rating)],
    next_review: Timestamp,
) -> Card {
    let base = new_card(vocabulary, level, next_review);
    let history: Vec<ReviewLog> = reviews
        .iter()
        .map(|(reviewed_at, rating)| ReviewLog {
            reviewed_at: *reviewed_at,
            rating: *rating,
            metadata: None,
        })
        .collect();
    Card::from_parts(
        base.id().clone(),
        base.vocabulary().to_string(),
        base.pronunciation().to_string(),
        base.level().to_string(),
        base.memory_state().clone(),
        history.last().map(|log| log.reviewed_at),
        next_review,
        history,
    )
}

/// An in-memory database holding `cards`.
pub fn memory_db(cards: &[Card]) -> Fallible<Database> {
    let db = Database::new(":memory:")?;
    for card in cards {
        db.insert_card(card)?;
    }
    Ok(db)
}

/// A collection directory whose database holds `cards`.
pub fn collection_dir(cards: &[Card]) -> Fallible<TempDir> {
    let dir = tempdir()?;
    let path = dir.path().join("lexicards.db");
    let path = path.to_str().unwrap();
    let db = Database::new(path)?;
    for card in cards {
        db.insert_card(card)?;
    }
    Ok(dir)
}

/// A store that can be told to fail, and counts how often it is read.
pub struct FlakyStore {
    inner: Database,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `list_cards` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool) -> Fallible<()> {
        if flag.load(Ordering::SeqCst) {
            fail_with(ErrorKind::Persistence, "store unavailable")
        } else {
            Ok(())
        }
    }
}

impl CardStore for FlakyStore {
    fn list_cards(&self, level: Option<&str>) -> Fallible<Vec<Card>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check(&self.fail_reads)?;
        self.inner.list_cards(level)
    }

    fn get_card(&self, id: &CardId) -> Fallible<Option<Card>> {
        self.check(&self.fail_reads)?;
        self.inner.get_card(id)
    }

    fn insert_card(&self, card: &Card) -> Fallible<bool> {
        self.check(&self.fail_writes)?;
        self.inner.insert_card(card)
    }

    fn update_card(&self, id: &CardId, update: &CardUpdate) -> Fallible<()> {
        self.check(&self.fail_writes)?;
        self.inner.update_card(id, update)
    }
}
