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
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::fsrs::Difficulty;
use crate::fsrs::Grade;
use crate::fsrs::Stability;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::interval;
use crate::fsrs::new_difficulty;
use crate::fsrs::new_stability;
use crate::fsrs::retrievability;
use crate::types::memory_state::MemoryState;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The desired recall probability.
const TARGET_RECALL: f64 = 0.9;

/// The minimum review interval in days.
const MIN_INTERVAL: f64 = 1.0;

/// The maximum review interval in days.
const MAX_INTERVAL: f64 = 128.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// What a scheduler produces for one rating.
#[derive(Clone, PartialEq, Debug)]
pub struct Advance {
    pub memory_state: MemoryState,
    pub next_review: Timestamp,
    /// Attached to the review log entry. Opaque to the engine.
    pub metadata: Option<Value>,
}

/// A retention model. Implementations must be pure: the same state, rating,
/// and time always produce the same `Advance`, with `next_review >= now`.
/// They may fail only when the memory-state is structurally invalid.
pub trait Scheduler: Send + Sync {
    /// The memory-state of a card that has never been reviewed.
    fn initial_state(&self) -> MemoryState;

    fn advance(&self, state: &MemoryState, rating: Rating, now: Timestamp) -> Fallible<Advance>;
}

/// Memory-state representation used by `FsrsScheduler`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
enum FsrsState {
    New,
    Review {
        stability: Stability,
        difficulty: Difficulty,
        last_review: Timestamp,
        reps: u32,
        lapses: u32,
    },
}

#[derive(Clone, Copy, Default, Debug)]
pub struct FsrsScheduler;

impl FsrsScheduler {
    pub fn new() -> Self {
        Self
    }

    fn decode(&self, state: &MemoryState) -> Fallible<FsrsState> {
        let decoded: FsrsState = match serde_json::from_value(state.as_value().clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                return fail_with(ErrorKind::Scheduler, format!("malformed memory-state: {e}"));
            }
        };
        if let FsrsState::Review {
            stability,
            difficulty,
            ..
        } = &decoded
        {
            if !stability.is_finite() || *stability <= 0.0 {
                return fail_with(
                    ErrorKind::Scheduler,
                    format!("malformed memory-state: stability {stability}"),
                );
            }
            if !(1.0..=10.0).contains(difficulty) {
                return fail_with(
                    ErrorKind::Scheduler,
                    format!("malformed memory-state: difficulty {difficulty}"),
                );
            }
        }
        Ok(decoded)
    }

    fn encode(state: &FsrsState) -> Fallible<MemoryState> {
        Ok(MemoryState::new(serde_json::to_value(state)?))
    }
}

impl Scheduler for FsrsScheduler {
    fn initial_state(&self) -> MemoryState {
        MemoryState::new(json!({ "phase": "new" }))
    }

    fn advance(&self, state: &MemoryState, rating: Rating, now: Timestamp) -> Fallible<Advance> {
        let grade = Grade::from(rating);
        let forgot = u32::from(grade == Grade::Forgot);
        let (stability, difficulty, reps, lapses, elapsed, recall) = match self.decode(state)? {
            FsrsState::New => (
                initial_stability(grade),
                initial_difficulty(grade),
                1,
                forgot,
                0.0,
                None,
            ),
            FsrsState::Review {
                stability,
                difficulty,
                last_review,
                reps,
                lapses,
            } => {
                let elapsed = (now.since(last_review).num_seconds() as f64 / SECONDS_PER_DAY)
                    .max(0.0);
                let recall = retrievability(elapsed, stability);
                (
                    new_stability(difficulty, stability, recall, grade),
                    new_difficulty(difficulty, grade),
                    reps.saturating_add(1),
                    lapses.saturating_add(forgot),
                    elapsed,
                    Some(recall),
                )
            }
        };
        let interval_days = interval(TARGET_RECALL, stability)
            .round()
            .clamp(MIN_INTERVAL, MAX_INTERVAL);
        let next_review = now.plus(TimeDelta::days(interval_days as i64));
        let memory_state = Self::encode(&FsrsState::Review {
            stability,
            difficulty,
            last_review: now,
            reps,
            lapses,
        })?;
        let metadata = json!({
            "stability": stability,
            "difficulty": difficulty,
            "elapsed_days": elapsed,
            "retrievability": recall,
            "interval_days": interval_days,
        });
        Ok(Advance {
            memory_state,
            next_review,
            metadata: Some(metadata),
        })
    }
}
