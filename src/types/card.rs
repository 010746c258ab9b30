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

use chrono::TimeDelta;
use serde::Serialize;
use serde_json::Value;

use crate::types::card_id::CardId;
use crate::types::memory_state::MemoryState;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// A vocabulary item under spaced repetition.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: CardId,
    /// The word itself.
    vocabulary: String,
    /// Pronunciation aid, e.g. pinyin.
    pronunciation: String,
    /// Difficulty or level tag, e.g. "Novice 1".
    level: String,
    /// Owned by the scheduler.
    memory_state: MemoryState,
    last_reviewed: Option<Timestamp>,
    next_review: Timestamp,
    /// Append-only, oldest first.
    review_history: Vec<ReviewLog>,
}

/// One review event. Never edited once written.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub reviewed_at: Timestamp,
    pub rating: Rating,
    /// Scheduler-specific details about the review.
    pub metadata: Option<Value>,
}

/// Everything a rating changes about a card.
#[derive(Clone, PartialEq, Debug)]
pub struct CardUpdate {
    pub memory_state: MemoryState,
    pub review: ReviewLog,
    pub last_reviewed: Timestamp,
    pub next_review: Timestamp,
}

impl Card {
    /// A card that has never been reviewed. It is due immediately.
    pub fn new(
        vocabulary: impl Into<String>,
        pronunciation: impl Into<String>,
        level: impl Into<String>,
        memory_state: MemoryState,
        created_at: Timestamp,
    ) -> Self {
        let vocabulary = vocabulary.into().trim().to_string();
        let pronunciation = pronunciation.into().trim().to_string();
        let level = level.into().trim().to_string();
        let id = CardId::from_content(&vocabulary, &pronunciation, &level);
        Self {
            id,
            vocabulary,
            pronunciation,
            level,
            memory_state,
            last_reviewed: None,
            next_review: created_at,
            review_history: Vec::new(),
        }
    }

    /// Reassemble a card from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: CardId,
        vocabulary: String,
        pronunciation: String,
        level: String,
        memory_state: MemoryState,
        last_reviewed: Option<Timestamp>,
        next_review: Timestamp,
        review_history: Vec<ReviewLog>,
    ) -> Self {
        Self {
            id,
            vocabulary,
            pronunciation,
            level,
            memory_state,
            last_reviewed,
            next_review,
            review_history,
        }
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    pub fn pronunciation(&self) -> &str {
        &self.pronunciation
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn memory_state(&self) -> &MemoryState {
        &self.memory_state
    }

    pub fn last_reviewed(&self) -> Option<Timestamp> {
        self.last_reviewed
    }

    pub fn next_review(&self) -> Timestamp {
        self.next_review
    }

    pub fn review_history(&self) -> &[ReviewLog] {
        &self.review_history
    }

    pub fn is_new(&self) -> bool {
        self.review_history.is_empty()
    }

    /// Due by calendar day: a card scheduled for later today is due now.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_review.local_date() <= now.local_date()
    }

    /// How long ago the card became due. Negative if it is not due yet.
    pub fn overdue_by(&self, now: Timestamp) -> TimeDelta {
        now.since(self.next_review)
    }

    /// The card as it is after `update` has been committed.
    pub fn with_update(mut self, update: &CardUpdate) -> Self {
        self.memory_state = update.memory_state.clone();
        self.review_history.push(update.review.clone());
        self.last_reviewed = Some(update.last_reviewed);
        self.next_review = update.next_review;
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::types::date::Date;

    fn day() -> Date {
        Date::new(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap())
    }

    #[test]
    fn test_new_card_is_due_immediately() {
        let now = Timestamp::local_noon(day(), 0);
        let card = Card::new(" 你好 ", "nǐ hǎo", "Novice 1", MemoryState::new(json!({})), now);
        assert_eq!(card.vocabulary(), "你好");
        assert_eq!(card.next_review(), now);
        assert!(card.last_reviewed().is_none());
        assert!(card.is_new());
        assert!(card.is_due(now));
    }

    #[test]
    fn test_due_by_calendar_day() {
        let now = Timestamp::local_noon(day(), 0);
        let later_today = Timestamp::local_noon(day(), 6);
        let tomorrow = Timestamp::local_noon(day(), 24);
        let card = Card::new("a", "b", "c", MemoryState::new(json!({})), later_today);
        assert!(card.is_due(now));
        assert!(card.overdue_by(now) < TimeDelta::zero());
        let card = Card::new("a", "b", "c", MemoryState::new(json!({})), tomorrow);
        assert!(!card.is_due(now));
    }

    #[test]
    fn test_with_update_appends_history() {
        let now = Timestamp::local_noon(day(), 0);
        let card = Card::new("a", "b", "c", MemoryState::new(json!({})), now);
        let update = CardUpdate {
            memory_state: MemoryState::new(json!({"s": 1})),
            review: ReviewLog {
                reviewed_at: now,
                rating: Rating::Good,
                metadata: None,
            },
            last_reviewed: now,
            next_review: Timestamp::local_noon(day(), 48),
        };
        let card = card.with_update(&update);
        assert_eq!(card.review_history().len(), 1);
        assert_eq!(card.last_reviewed(), Some(now));
        assert_eq!(card.next_review(), update.next_review);
        assert_eq!(card.memory_state(), &update.memory_state);
    }
}
