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

use std::sync::Mutex;
use std::sync::PoisonError;

use chrono::TimeDelta;

use crate::types::timestamp::Timestamp;

/// Holds the last computed value of one report, and when it was computed.
///
/// An entry is fresh while its age is below the TTL. An entry that appears
/// to come from the future (the clock went backwards) is treated as stale.
pub struct TtlCache<T> {
    ttl: TimeDelta,
    entry: Mutex<Option<Entry<T>>>,
}

struct Entry<T> {
    value: T,
    computed_at: Timestamp,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// The cached value, if it is still fresh at `now`.
    pub fn get(&self, now: Timestamp) -> Option<T> {
        let entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entry.as_ref()?;
        let age = now.since(entry.computed_at);
        if age >= TimeDelta::zero() && age < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Replace the entry. The last writer wins.
    pub fn insert(&self, value: T, now: Timestamp) {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *entry = Some(Entry {
            value,
            computed_at: now,
        });
    }

    pub fn clear(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *entry = None;
    }
}
