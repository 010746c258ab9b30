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

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::review::engine::ReviewEngine;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::card::Card;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// A review session. Owned by the caller and passed to each action; nothing
/// about it is persisted.
#[derive(Clone, Debug)]
pub struct Session {
    cards: Vec<Card>,
    cursor: usize,
    revealed: bool,
}

/// Where the session stands.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Phase<'a> {
    /// The prompt is showing.
    Presenting(&'a Card),
    /// The answer is showing; waiting for a rating.
    Revealed(&'a Card),
    /// Every card in the working set has been rated.
    Empty,
}

impl Session {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            cursor: 0,
            revealed: false,
        }
    }

    /// Start a session over today's due cards.
    pub fn start<S: CardStore, K: Scheduler>(
        engine: &ReviewEngine<S, K>,
        now: Timestamp,
    ) -> Fallible<Self> {
        Ok(Self::new(engine.get_due_cards(now)?))
    }

    pub fn phase(&self) -> Phase<'_> {
        match self.cards.get(self.cursor) {
            None => Phase::Empty,
            Some(card) if self.revealed => Phase::Revealed(card),
            Some(card) => Phase::Presenting(card),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    /// Cards rated so far, and the size of the working set.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor.min(self.cards.len()), self.cards.len())
    }

    /// Show the answer. Revealing twice is harmless.
    pub fn reveal(&mut self) -> Fallible<()> {
        if self.is_finished() {
            return fail_with(ErrorKind::InvalidInput, "session is finished");
        }
        self.revealed = true;
        Ok(())
    }

    /// Rate the current card and move on. Rating a card whose answer is not
    /// showing reveals it first.
    ///
    /// The session only advances once the rating has been committed; on
    /// failure it stays on the same card so the rating can be resubmitted.
    pub fn rate<S: CardStore, K: Scheduler>(
        &mut self,
        engine: &ReviewEngine<S, K>,
        rating: Rating,
        now: Timestamp,
    ) -> Fallible<Card> {
        let id = match self.cards.get(self.cursor) {
            Some(card) => card.id().clone(),
            None => return fail_with(ErrorKind::InvalidInput, "session is finished"),
        };
        self.revealed = true;
        let updated = engine.submit_rating(&id, rating, now)?;
        self.cards[self.cursor] = updated.clone();
        self.cursor += 1;
        self.revealed = false;
        Ok(updated)
    }

    /// Move past the current card without rating it. Used when a card cannot
    /// be scheduled at all.
    pub fn skip(&mut self) {
        if !self.is_finished() {
            self.cursor += 1;
            self.revealed = false;
        }
    }

    /// Throw the working set away and select a fresh one.
    pub fn restart<S: CardStore, K: Scheduler>(
        &mut self,
        engine: &ReviewEngine<S, K>,
        now: Timestamp,
    ) -> Fallible<()> {
        *self = Self::start(engine, now)?;
        Ok(())
    }
}
