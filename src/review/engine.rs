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

use rand::Rng;
use serde::Serialize;

use crate::config::Config;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::review::select::DeckStats;
use crate::review::select::Order;
use crate::review::select::deck_stats;
use crate::review::select::select_daily;
use crate::review::select::select_next;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::card::Card;
use crate::types::card::CardUpdate;
use crate::types::card::ReviewLog;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Owns the scheduling side of the system: which cards are due, in what
/// order, and how a rating turns into a new due date.
pub struct ReviewEngine<S, K> {
    store: S,
    scheduler: K,
    daily_goal: usize,
    order: Order,
    level: Option<String>,
}

/// Where a card would land for one rating.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub rating: Rating,
    pub next_review: Timestamp,
    pub interval_days: i64,
}

impl<S: CardStore, K: Scheduler> ReviewEngine<S, K> {
    pub fn new(store: S, scheduler: K, config: &Config) -> Self {
        Self {
            store,
            scheduler,
            daily_goal: config.daily_goal,
            order: config.order,
            level: config.level.clone(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The working set for today's session.
    pub fn get_due_cards(&self, now: Timestamp) -> Fallible<Vec<Card>> {
        self.get_due_cards_with(now, &mut rand::thread_rng())
    }

    pub fn get_due_cards_with<R: Rng + ?Sized>(
        &self,
        now: Timestamp,
        rng: &mut R,
    ) -> Fallible<Vec<Card>> {
        let cards = self.store.list_cards(self.level.as_deref())?;
        let selected = select_daily(cards, now, self.daily_goal, self.order, rng);
        log::debug!("Selected {} due cards ({:?}).", selected.len(), self.order);
        Ok(selected)
    }

    /// The most urgent due card.
    pub fn next_card(&self, now: Timestamp) -> Fallible<Option<Card>> {
        let cards = self.store.list_cards(self.level.as_deref())?;
        Ok(select_next(&cards, now).cloned())
    }

    pub fn deck_stats(&self, now: Timestamp) -> Fallible<DeckStats> {
        let cards = self.store.list_cards(self.level.as_deref())?;
        Ok(deck_stats(&cards, now))
    }

    /// Add a new, never-reviewed card. Returns `None` if an identical card
    /// already exists.
    pub fn create_card(
        &self,
        vocabulary: &str,
        pronunciation: &str,
        level: &str,
        now: Timestamp,
    ) -> Fallible<Option<Card>> {
        let card = Card::new(
            vocabulary,
            pronunciation,
            level,
            self.scheduler.initial_state(),
            now,
        );
        if self.store.insert_card(&card)? {
            Ok(Some(card))
        } else {
            Ok(None)
        }
    }

    /// Record a rating: run the scheduler, append a review log entry, and
    /// persist. On any failure the stored card is unchanged.
    ///
    /// Resubmitting the same rating against the same stored memory-state at
    /// the same instant produces the same due date.
    pub fn submit_rating(&self, id: &CardId, rating: Rating, now: Timestamp) -> Fallible<Card> {
        let card = match self.store.get_card(id)? {
            Some(card) => card,
            None => return fail_with(ErrorKind::InvalidInput, format!("unknown card id: {id}")),
        };
        let advance = match self.scheduler.advance(card.memory_state(), rating, now) {
            Ok(advance) => advance,
            Err(e) => {
                log::error!("Scheduler rejected card {id}: {e}");
                return Err(ErrorReport::with_kind(
                    ErrorKind::Scheduler,
                    format!("cannot schedule card {id}: {}", e.message()),
                ));
            }
        };
        if advance.next_review < now {
            log::error!(
                "Scheduler returned a due time in the past for card {id}: {:?}",
                advance.next_review
            );
            return fail_with(
                ErrorKind::Scheduler,
                format!("scheduler returned a due time in the past for card {id}"),
            );
        }
        let update = CardUpdate {
            memory_state: advance.memory_state,
            review: ReviewLog {
                reviewed_at: now,
                rating,
                metadata: advance.metadata,
            },
            last_reviewed: now,
            next_review: advance.next_review,
        };
        if let Err(e) = self.store.update_card(id, &update) {
            log::error!("Failed to persist rating for card {id}: {e}");
            let kind = match e.kind() {
                ErrorKind::InvalidInput => ErrorKind::InvalidInput,
                _ => ErrorKind::Persistence,
            };
            return Err(ErrorReport::with_kind(
                kind,
                format!("failed to save rating for card {id}: {}", e.message()),
            ));
        }
        log::debug!("Rated {id} {rating}; next review at {:?}.", update.next_review);
        Ok(card.with_update(&update))
    }

    /// What each rating would do to a card, without changing anything.
    pub fn preview(&self, id: &CardId, now: Timestamp) -> Fallible<Vec<IntervalPreview>> {
        let card = match self.store.get_card(id)? {
            Some(card) => card,
            None => return fail_with(ErrorKind::InvalidInput, format!("unknown card id: {id}")),
        };
        let mut previews = Vec::with_capacity(Rating::ALL.len());
        for rating in Rating::ALL {
            let advance = self.scheduler.advance(card.memory_state(), rating, now)?;
            let seconds = advance.next_review.since(now).num_seconds();
            previews.push(IntervalPreview {
                rating,
                next_review: advance.next_review,
                interval_days: (seconds + 86_399) / 86_400,
            });
        }
        Ok(previews)
    }
}
