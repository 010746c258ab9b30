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

use serde::Serialize;

use crate::types::date::Date;

/// Headline numbers for the dashboard.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Distinct cards with at least one review today.
    pub cards_studied_today: usize,
    pub cards_studied_yesterday: usize,
    /// Percentage of today's reviews rated Good or Easy, rounded.
    pub accuracy_rate: u32,
    pub total_cards: usize,
    /// E.g. "12m".
    pub study_time_today: String,
    pub weekly_change: WeeklyChange,
}

/// Signed percentage changes from yesterday to today, e.g. "+25", "-10", "0".
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChange {
    pub cards_studied: String,
    pub accuracy: String,
}

/// Cards studied on each of the last seven days, oldest first.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySeries {
    pub days: Vec<DayBucket>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: Date,
    /// Short weekday name.
    pub label: String,
    pub count: usize,
}

/// Card counts per level tag, in the order each tag is first seen.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDistribution {
    pub categories: Vec<CategoryCount>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub level: String,
    pub count: usize,
}

/// Long-range progress for the learner's profile.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Distinct days with at least one review among the last thirty.
    pub days_reviewed: usize,
    /// Level tag of the most recently reviewed card.
    pub current_level: String,
    /// Cards reviewed at least once.
    pub total_cards_reviewed: usize,
    /// Up to five cards with the most lapses.
    pub difficult_words: Vec<DifficultWord>,
    /// Review events on each of the last seven days, oldest first.
    pub review_history: Vec<DailyReviews>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultWord {
    pub vocabulary: String,
    pub pinyin: String,
    /// Reviews rated Again.
    pub lapses: usize,
    pub reviews: usize,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReviews {
    pub date: Date,
    pub count: usize,
}

pub const DEFAULT_LEVEL: &str = "Beginner";

impl DashboardMetrics {
    pub fn fallback() -> Self {
        Self {
            cards_studied_today: 0,
            cards_studied_yesterday: 0,
            accuracy_rate: 0,
            total_cards: 0,
            study_time_today: "0m".to_string(),
            weekly_change: WeeklyChange {
                cards_studied: "0".to_string(),
                accuracy: "0".to_string(),
            },
        }
    }
}

impl WeeklySeries {
    /// Seven zero buckets ending on `today`.
    pub fn fallback(today: Date) -> Self {
        let days = (0..7u64)
            .rev()
            .map(|back| {
                let date = today.minus_days(back);
                DayBucket {
                    date,
                    label: date.weekday_label(),
                    count: 0,
                }
            })
            .collect();
        Self { days }
    }

    pub fn counts(&self) -> Vec<usize> {
        self.days.iter().map(|day| day.count).collect()
    }
}

impl CategoryDistribution {
    pub fn fallback() -> Self {
        Self::default()
    }
}

impl ProgressSummary {
    pub fn fallback() -> Self {
        Self {
            days_reviewed: 0,
            current_level: DEFAULT_LEVEL.to_string(),
            total_cards_reviewed: 0,
            difficult_words: Vec::new(),
            review_history: Vec::new(),
        }
    }
}
