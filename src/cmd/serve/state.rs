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
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::analytics::engine::AnalyticsEngine;
use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;
use crate::review::engine::ReviewEngine;
use crate::review::session::Session;
use crate::scheduler::FsrsScheduler;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct ServerState {
    pub review: Arc<ReviewEngine<Database, FsrsScheduler>>,
    pub analytics: Arc<AnalyticsEngine<Database>>,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    pub session: Session,
    /// Shown once on the next page render.
    pub message: Option<String>,
}

impl ServerState {
    pub fn new(coll: &Collection, now: Timestamp) -> Fallible<Self> {
        let review = coll.review_engine();
        let session = Session::start(&review, now)?;
        Ok(Self {
            review: Arc::new(review),
            analytics: Arc::new(coll.analytics_engine()),
            mutable: Arc::new(Mutex::new(MutableState {
                session,
                message: None,
            })),
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, MutableState> {
        self.mutable.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
