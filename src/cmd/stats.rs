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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::analytics::engine::AnalyticsEngine;
use crate::analytics::report::CategoryDistribution;
use crate::analytics::report::DashboardMetrics;
use crate::analytics::report::ProgressSummary;
use crate::analytics::report::WeeklySeries;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::review::engine::ReviewEngine;
use crate::review::select::DeckStats;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatsFormat {
    /// Human-readable summary.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let now = Timestamp::now();
    let stats = collect_stats(&coll.review_engine(), &coll.analytics_engine(), now)?;
    println!("{}", render_stats(&stats, format)?);
    Ok(())
}

/// Every report at once.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    deck: DeckStats,
    dashboard: DashboardMetrics,
    weekly: WeeklySeries,
    categories: CategoryDistribution,
    progress: ProgressSummary,
}

pub fn collect_stats<S: CardStore, K: Scheduler, A: CardStore>(
    review: &ReviewEngine<S, K>,
    analytics: &AnalyticsEngine<A>,
    now: Timestamp,
) -> Fallible<Stats> {
    Ok(Stats {
        deck: review.deck_stats(now)?,
        dashboard: analytics.get_dashboard_metrics(now),
        weekly: analytics.get_weekly_series(now),
        categories: analytics.get_category_distribution(now),
        progress: analytics.get_progress_summary(now),
    })
}

pub fn render_stats(stats: &Stats, format: StatsFormat) -> Fallible<String> {
    match format {
        StatsFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        StatsFormat::Text => Ok(render_text(stats)),
    }
}

fn render_text(stats: &Stats) -> String {
    let deck = &stats.deck;
    let dash = &stats.dashboard;
    let progress = &stats.progress;
    let mut lines: Vec<String> = vec![
        format!(
            "Cards: {} total, {} due, {} overdue, {} new",
            deck.total_cards, deck.due_cards, deck.overdue_cards, deck.new_cards
        ),
        format!(
            "Today: {} cards studied ({}%), accuracy {}% ({}%), study time {}",
            dash.cards_studied_today,
            dash.weekly_change.cards_studied,
            dash.accuracy_rate,
            dash.weekly_change.accuracy,
            dash.study_time_today
        ),
        "Last 7 days:".to_string(),
    ];
    for day in &stats.weekly.days {
        lines.push(format!("  {} {}  {}", day.label, day.date, day.count));
    }
    lines.push("Levels:".to_string());
    for category in &stats.categories.categories {
        lines.push(format!("  {}: {}", category.level, category.count));
    }
    lines.push(format!(
        "Progress: {} days reviewed in the last 30, level {}, {} cards reviewed",
        progress.days_reviewed, progress.current_level, progress.total_cards_reviewed
    ));
    lines.push("Reviews per day:".to_string());
    for day in &progress.review_history {
        lines.push(format!("  {}  {}", day.date, day.count));
    }
    if !progress.difficult_words.is_empty() {
        lines.push("Difficult words:".to_string());
        for word in &progress.difficult_words {
            lines.push(format!(
                "  {} ({}): {} lapses in {} reviews",
                word.vocabulary, word.pinyin, word.lapses, word.reviews
            ));
        }
    }
    lines.join("\n")
}
