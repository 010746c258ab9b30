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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::review::engine::ReviewEngine;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::timestamp::Timestamp;

pub fn print_due_cards(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let report = due_report(&coll.review_engine(), Timestamp::now())?;
    print!("{report}");
    Ok(())
}

/// Deck counts followed by today's working set, one card per line.
pub fn due_report<S: CardStore, K: Scheduler>(
    engine: &ReviewEngine<S, K>,
    now: Timestamp,
) -> Fallible<String> {
    let stats = engine.deck_stats(now)?;
    let cards = engine.get_due_cards(now)?;
    let mut lines: Vec<String> = vec![format!(
        "{} cards: {} due, {} overdue, {} new.",
        stats.total_cards, stats.due_cards, stats.overdue_cards, stats.new_cards
    )];
    if cards.is_empty() {
        lines.push("No cards due today.".to_string());
    }
    for card in &cards {
        lines.push(format!(
            "{}  {}  {}  [{}]",
            card.id(),
            card.vocabulary(),
            card.pronunciation(),
            card.level()
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
