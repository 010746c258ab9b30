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

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// How the daily working set is ordered before it is capped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Uniformly shuffled, so the learner does not always meet the same
    /// cards first.
    #[default]
    Shuffle,
    /// Most overdue first, then cards due later today by due time.
    Priority,
}

/// Counts describing the state of a deck at some instant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub reviewed_cards: usize,
    pub overdue_cards: usize,
}

/// The cards due by the end of the calendar day containing `now`, in input
/// order.
pub fn due_cards(cards: Vec<Card>, now: Timestamp) -> Vec<Card> {
    cards.into_iter().filter(|card| card.is_due(now)).collect()
}

/// Priority comparison: overdue cards before the rest, the most overdue
/// first; cards not yet overdue by ascending due time.
pub fn compare_priority(a: &Card, b: &Card, now: Timestamp) -> Ordering {
    let a_overdue = a.overdue_by(now) > chrono::TimeDelta::zero();
    let b_overdue = b.overdue_by(now) > chrono::TimeDelta::zero();
    match (a_overdue, b_overdue) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => b.overdue_by(now).cmp(&a.overdue_by(now)),
        (false, false) => a.next_review().cmp(&b.next_review()),
    }
}

/// Stable: cards that compare equal keep their input order.
pub fn sort_by_priority(cards: &mut [Card], now: Timestamp) {
    cards.sort_by(|a, b| compare_priority(a, b, now));
}

/// Pick the working set for a session: the due cards, ordered, capped at
/// `limit`.
pub fn select_daily<R: Rng + ?Sized>(
    cards: Vec<Card>,
    now: Timestamp,
    limit: usize,
    order: Order,
    rng: &mut R,
) -> Vec<Card> {
    let mut due = due_cards(cards, now);
    match order {
        Order::Shuffle => due.shuffle(rng),
        Order::Priority => sort_by_priority(&mut due, now),
    }
    due.truncate(limit);
    due
}

/// The single most urgent due card, if any.
pub fn select_next(cards: &[Card], now: Timestamp) -> Option<&Card> {
    cards
        .iter()
        .filter(|card| card.is_due(now))
        .min_by(|a, b| compare_priority(a, b, now))
}

pub fn deck_stats(cards: &[Card], now: Timestamp) -> DeckStats {
    let mut stats = DeckStats {
        total_cards: cards.len(),
        ..DeckStats::default()
    };
    for card in cards {
        if card.is_new() {
            stats.new_cards += 1;
        } else {
            stats.reviewed_cards += 1;
        }
        if card.is_due(now) {
            stats.due_cards += 1;
            if card.next_review() < now {
                stats.overdue_cards += 1;
            }
        }
    }
    stats
}
