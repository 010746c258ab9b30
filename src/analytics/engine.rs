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

use crate::analytics::cache::TtlCache;
use crate::analytics::compute::category_distribution;
use crate::analytics::compute::dashboard_metrics;
use crate::analytics::compute::progress_summary;
use crate::analytics::compute::weekly_series;
use crate::analytics::report::CategoryDistribution;
use crate::analytics::report::DashboardMetrics;
use crate::analytics::report::ProgressSummary;
use crate::analytics::report::WeeklySeries;
use crate::config::Config;
use crate::error::Fallible;
use crate::store::CardStore;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// Read-only reports over the card collection, each cached independently.
///
/// Writes elsewhere do not invalidate the caches; a report can be stale for
/// up to one TTL. If the store cannot be read, a zeroed report is returned
/// and nothing is cached.
pub struct AnalyticsEngine<S> {
    store: S,
    level: Option<String>,
    metrics: TtlCache<DashboardMetrics>,
    weekly: TtlCache<WeeklySeries>,
    categories: TtlCache<CategoryDistribution>,
    progress: TtlCache<ProgressSummary>,
}

impl<S: CardStore> AnalyticsEngine<S> {
    pub fn new(store: S, config: &Config) -> Self {
        let ttl = config.cache_ttl();
        Self {
            store,
            level: config.level.clone(),
            metrics: TtlCache::new(ttl),
            weekly: TtlCache::new(ttl),
            categories: TtlCache::new(ttl),
            progress: TtlCache::new(ttl),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get_dashboard_metrics(&self, now: Timestamp) -> DashboardMetrics {
        self.report(
            "dashboard metrics",
            &self.metrics,
            now,
            |cards| dashboard_metrics(cards, now),
            DashboardMetrics::fallback,
        )
    }

    pub fn get_weekly_series(&self, now: Timestamp) -> WeeklySeries {
        self.report(
            "weekly series",
            &self.weekly,
            now,
            |cards| weekly_series(cards, now),
            || WeeklySeries::fallback(now.local_date()),
        )
    }

    pub fn get_category_distribution(&self, now: Timestamp) -> CategoryDistribution {
        self.report(
            "category distribution",
            &self.categories,
            now,
            category_distribution,
            CategoryDistribution::fallback,
        )
    }

    pub fn get_progress_summary(&self, now: Timestamp) -> ProgressSummary {
        self.report(
            "progress summary",
            &self.progress,
            now,
            |cards| progress_summary(cards, now),
            ProgressSummary::fallback,
        )
    }

    /// Drop every cached report.
    pub fn clear_cache(&self) {
        log::debug!("Clearing analytics cache.");
        self.metrics.clear();
        self.weekly.clear();
        self.categories.clear();
        self.progress.clear();
    }

    fn report<T: Clone>(
        &self,
        name: &str,
        cache: &TtlCache<T>,
        now: Timestamp,
        compute: impl FnOnce(&[Card]) -> T,
        fallback: impl FnOnce() -> T,
    ) -> T {
        if let Some(value) = cache.get(now) {
            log::debug!("Serving {name} from cache.");
            return value;
        }
        match self.load() {
            Ok(cards) => {
                let value = compute(&cards);
                cache.insert(value.clone(), now);
                value
            }
            Err(e) => {
                log::warn!("Failed to compute {name}, returning an empty report: {e}");
                fallback()
            }
        }
    }

    fn load(&self) -> Fallible<Vec<Card>> {
        self.store.list_cards(self.level.as_deref())
    }
}
