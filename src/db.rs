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

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::store::CardStore;
use crate::types::card::Card;
use crate::types::card::CardUpdate;
use crate::types::card::ReviewLog;
use crate::types::card_id::CardId;
use crate::types::memory_state::MemoryState;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Number of cards in the database.
    pub fn card_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CardStore for Database {
    fn list_cards(&self, level: Option<&str>) -> Fallible<Vec<Card>> {
        let conn = self.acquire();
        let card_rows: Vec<CardRow> = {
            let sql = "select card_id, vocabulary, pronunciation, level, memory_state, last_reviewed, next_review from cards where (?1 is null or level = ?1) order by rowid;";
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query([level])?;
            let mut acc = Vec::new();
            while let Some(row) = rows.next()? {
                acc.push(CardRow::from_row(row)?);
            }
            acc
        };
        let mut histories: HashMap<CardId, Vec<ReviewLog>> = HashMap::new();
        {
            let sql = "select r.card_id, r.reviewed_at, r.rating, r.metadata from reviews r join cards c on c.card_id = r.card_id where (?1 is null or c.level = ?1) order by r.review_id;";
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query([level])?;
            while let Some(row) = rows.next()? {
                let card_id: CardId = row.get(0)?;
                let log = review_from_row(row, 1)?;
                histories.entry(card_id).or_default().push(log);
            }
        }
        let cards = card_rows
            .into_iter()
            .map(|row| {
                let history = histories.remove(&row.card_id).unwrap_or_default();
                row.into_card(history)
            })
            .collect();
        Ok(cards)
    }

    fn get_card(&self, id: &CardId) -> Fallible<Option<Card>> {
        let conn = self.acquire();
        let sql = "select card_id, vocabulary, pronunciation, level, memory_state, last_reviewed, next_review from cards where card_id = ?;";
        let card_row: Option<CardRow> = conn
            .query_row(sql, [id], |row| CardRow::from_row(row))
            .optional()?;
        let Some(card_row) = card_row else {
            return Ok(None);
        };
        let sql =
            "select reviewed_at, rating, metadata from reviews where card_id = ? order by review_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        let mut history = Vec::new();
        while let Some(row) = rows.next()? {
            history.push(review_from_row(row, 0)?);
        }
        Ok(Some(card_row.into_card(history)))
    }

    fn insert_card(&self, card: &Card) -> Fallible<bool> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let now = Timestamp::now();
        let sql = "insert or ignore into cards (card_id, vocabulary, pronunciation, level, memory_state, last_reviewed, next_review, created_at, updated_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?);";
        let inserted = tx.execute(
            sql,
            (
                card.id(),
                card.vocabulary(),
                card.pronunciation(),
                card.level(),
                card.memory_state(),
                card.last_reviewed(),
                card.next_review(),
                now,
                now,
            ),
        )?;
        if inserted > 0 {
            for log in card.review_history() {
                insert_review(&tx, card.id(), log)?;
            }
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn update_card(&self, id: &CardId, update: &CardUpdate) -> Fallible<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let sql = "update cards set memory_state = ?, last_reviewed = ?, next_review = ?, updated_at = ? where card_id = ?;";
        let updated = tx.execute(
            sql,
            (
                &update.memory_state,
                update.last_reviewed,
                update.next_review,
                Timestamp::now(),
                id,
            ),
        )?;
        if updated == 0 {
            return fail_with(ErrorKind::InvalidInput, format!("unknown card id: {id}"));
        }
        insert_review(&tx, id, &update.review)?;
        tx.commit()?;
        log::debug!("Updated card {id}: next review at {:?}", update.next_review);
        Ok(())
    }
}

struct CardRow {
    card_id: CardId,
    vocabulary: String,
    pronunciation: String,
    level: String,
    memory_state: MemoryState,
    last_reviewed: Option<Timestamp>,
    next_review: Timestamp,
}

impl CardRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            card_id: row.get(0)?,
            vocabulary: row.get(1)?,
            pronunciation: row.get(2)?,
            level: row.get(3)?,
            memory_state: row.get(4)?,
            last_reviewed: row.get(5)?,
            next_review: row.get(6)?,
        })
    }

    fn into_card(self, history: Vec<ReviewLog>) -> Card {
        Card::from_parts(
            self.card_id,
            self.vocabulary,
            self.pronunciation,
            self.level,
            self.memory_state,
            self.last_reviewed,
            self.next_review,
            history,
        )
    }
}

/// Reads `reviewed_at, rating, metadata` starting at column `offset`.
fn review_from_row(row: &Row, offset: usize) -> Fallible<ReviewLog> {
    let reviewed_at: Timestamp = row.get(offset)?;
    let rating: Rating = row.get(offset + 1)?;
    let metadata: Option<String> = row.get(offset + 2)?;
    let metadata: Option<Value> = match metadata {
        Some(text) => Some(serde_json::from_str(&text)?),
        None => None,
    };
    Ok(ReviewLog {
        reviewed_at,
        rating,
        metadata,
    })
}

fn insert_review(tx: &Transaction, card_id: &CardId, log: &ReviewLog) -> Fallible<()> {
    let sql = "insert into reviews (card_id, reviewed_at, rating, metadata) values (?, ?, ?, ?);";
    let metadata: Option<String> = log.metadata.as_ref().map(|v| v.to_string());
    tx.execute(sql, (card_id, log.reviewed_at, log.rating, metadata))?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
