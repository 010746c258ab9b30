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

use std::sync::Arc;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::CardUpdate;
use crate::types::card_id::CardId;

/// Persistent home of the card collection.
///
/// `update_card` must be atomic per card: the memory-state, timestamps, and
/// the appended review log entry are committed together or not at all, and
/// concurrent updates to the same card are serialised so that the later
/// commit wins.
pub trait CardStore: Send + Sync {
    /// All cards, in insertion order, optionally restricted to one level tag.
    fn list_cards(&self, level: Option<&str>) -> Fallible<Vec<Card>>;

    fn get_card(&self, id: &CardId) -> Fallible<Option<Card>>;

    /// Returns false if a card with the same id already exists.
    fn insert_card(&self, card: &Card) -> Fallible<bool>;

    /// Fails with `ErrorKind::InvalidInput` if the card does not exist.
    fn update_card(&self, id: &CardId, update: &CardUpdate) -> Fallible<()>;
}

impl<S: CardStore + ?Sized> CardStore for Arc<S> {
    fn list_cards(&self, level: Option<&str>) -> Fallible<Vec<Card>> {
        (**self).list_cards(level)
    }

    fn get_card(&self, id: &CardId) -> Fallible<Option<Card>> {
        (**self).get_card(id)
    }

    fn insert_card(&self, card: &Card) -> Fallible<bool> {
        (**self).insert_card(card)
    }

    fn update_card(&self, id: &CardId, update: &CardUpdate) -> Fallible<()> {
        (**self).update_card(id, update)
    }
}
