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

//! Pure report computations over a snapshot of the card collection. Days are
//! local calendar days, and everything is derived from review histories.
//!
//! The dashboard's today/yesterday counts bucket each card by its latest
//! review only. The weekly series counts a card on every day it was reviewed.

use std::collections::HashSet;

use crate::analytics::report::CategoryCount;
use crate::analytics::report::CategoryDistribution;
use crate::analytics::report::DEFAULT_LEVEL;
use crate::analytics::report::DailyReviews;
use crate::analytics::report::DashboardMetrics;
use crate::analytics::report::DayBucket;
use crate::analytics::report::DifficultWord;
use crate::analytics::report::ProgressSummary;
use crate::analytics::report::WeeklyChange;
use crate::analytics::report::WeeklySeries;
use crate::types::card::Card;
use crate::types::date::Date;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Seconds of study credited per review.
const SECONDS_PER_REVIEW: usize = 30;

/// Window for `ProgressSummary::days_reviewed`, today included.
const PROGRESS_WINDOW_DAYS: u64 = 30;

/// Days in `ProgressSummary::review_history`, today included.
const HISTORY_DAYS: u64 = 7;

/// Length of `ProgressSummary::difficult_words`.
const DIFFICULT_WORDS: usize = 5;

const UNKNOWN_LEVEL: &str = "Unknown";

/// What happened on one calendar day.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DayActivity {
    /// Distinct cards reviewed at least once.
    pub cards: usize,
    /// Review events, counting repeats.
    pub reviews: usize,
    /// Review events rated Good or Easy.
    pub correct: usize,
}

impl DayActivity {
    /// Accuracy as a percentage. Zero when there were no reviews.
    pub fn accuracy(&self) -> f64 {
        if self.reviews == 0 {
            0.0
        } else {
            self.correct as f64 / self.reviews as f64 * 100.0
        }
    }
}

pub fn day_activity(cards: &[Card], day: Date) -> DayActivity {
    let mut activity = DayActivity::default();
    for card in cards {
        let mut studied = false;
        for log in card.review_history() {
            if log.reviewed_at.local_date() == day {
                studied = true;
                activity.reviews += 1;
                if log.rating.is_correct() {
                    activity.correct += 1;
                }
            }
        }
        if studied {
            activity.cards += 1;
        }
    }
    activity
}

/// Cards whose most recent review falls on `day`.
pub fn cards_last_studied_on(cards: &[Card], day: Date) -> usize {
    cards
        .iter()
        .filter(|card| {
            card.review_history()
                .iter()
                .map(|log| log.reviewed_at)
                .max()
                .is_some_and(|at| at.local_date() == day)
        })
        .count()
}

/// Signed, rounded percentage change from `before` to `after`.
///
/// Going from zero to anything positive is reported as "+100"; no change, or
/// zero on both sides, as "0".
pub fn percent_change(after: f64, before: f64) -> String {
    if before > 0.0 {
        let change = ((after - before) / before * 100.0).round() as i64;
        match change {
            0 => "0".to_string(),
            n if n > 0 => format!("+{n}"),
            n => format!("{n}"),
        }
    } else if after > 0.0 {
        "+100".to_string()
    } else {
        "0".to_string()
    }
}

/// Minutes of study, rounded half up, e.g. "2m".
pub fn study_time(reviews: usize) -> String {
    let seconds = reviews * SECONDS_PER_REVIEW;
    format!("{}m", (seconds + 30) / 60)
}

pub fn dashboard_metrics(cards: &[Card], now: Timestamp) -> DashboardMetrics {
    let today = now.local_date();
    let yesterday = today.minus_days(1);
    let today_activity = day_activity(cards, today);
    let yesterday_activity = day_activity(cards, yesterday);
    let studied_today = cards_last_studied_on(cards, today);
    let studied_yesterday = cards_last_studied_on(cards, yesterday);
    let accuracy_today = today_activity.accuracy();
    let accuracy_yesterday = yesterday_activity.accuracy();
    DashboardMetrics {
        cards_studied_today: studied_today,
        cards_studied_yesterday: studied_yesterday,
        accuracy_rate: accuracy_today.round() as u32,
        total_cards: cards.len(),
        study_time_today: study_time(today_activity.reviews),
        weekly_change: WeeklyChange {
            cards_studied: percent_change(studied_today as f64, studied_yesterday as f64),
            accuracy: percent_change(accuracy_today, accuracy_yesterday),
        },
    }
}

pub fn weekly_series(cards: &[Card], now: Timestamp) -> WeeklySeries {
    let today = now.local_date();
    let days = (0..7u64)
        .rev()
        .map(|back| {
            let date = today.minus_days(back);
            DayBucket {
                date,
                label: date.weekday_label(),
                count: day_activity(cards, date).cards,
            }
        })
        .collect();
    WeeklySeries { days }
}

pub fn category_distribution(cards: &[Card]) -> CategoryDistribution {
    let mut categories: Vec<CategoryCount> = Vec::new();
    for card in cards {
        let level = match card.level().trim() {
            "" => UNKNOWN_LEVEL,
            level => level,
        };
        match categories.iter_mut().find(|c| c.level == level) {
            Some(category) => category.count += 1,
            None => categories.push(CategoryCount {
                level: level.to_string(),
                count: 1,
            }),
        }
    }
    CategoryDistribution { categories }
}

pub fn progress_summary(cards: &[Card], now: Timestamp) -> ProgressSummary {
    let today = now.local_date();
    let earliest = today.minus_days(PROGRESS_WINDOW_DAYS - 1);
    let mut days: HashSet<Date> = HashSet::new();
    let mut latest: Option<(Timestamp, &str)> = None;
    let mut reviewed = 0;
    for card in cards {
        if !card.is_new() {
            reviewed += 1;
        }
        for log in card.review_history() {
            let day = log.reviewed_at.local_date();
            if day >= earliest && day <= today {
                days.insert(day);
            }
            if latest.is_none_or(|(at, _)| log.reviewed_at > at) {
                latest = Some((log.reviewed_at, card.level()));
            }
        }
    }
    ProgressSummary {
        days_reviewed: days.len(),
        current_level: latest
            .map(|(_, level)| level.to_string())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
        total_cards_reviewed: reviewed,
        difficult_words: difficult_words(cards),
        review_history: review_history(cards, today),
    }
}

/// Cards with at least one lapse, most lapses first. Ties go to the card with
/// more reviews, then to input order.
pub fn difficult_words(cards: &[Card]) -> Vec<DifficultWord> {
    let mut words: Vec<DifficultWord> = cards
        .iter()
        .filter_map(|card| {
            let history = card.review_history();
            let lapses = history
                .iter()
                .filter(|log| matches!(log.rating, Rating::Again))
                .count();
            (lapses > 0).then(|| DifficultWord {
                vocabulary: card.vocabulary().to_string(),
                pinyin: card.pronunciation().to_string(),
                lapses,
                reviews: history.len(),
            })
        })
        .collect();
    words.sort_by(|a, b| b.lapses.cmp(&a.lapses).then(b.reviews.cmp(&a.reviews)));
    words.truncate(DIFFICULT_WORDS);
    words
}

/// Review events on each of the last seven days, oldest first.
pub fn review_history(cards: &[Card], today: Date) -> Vec<DailyReviews> {
    (0..HISTORY_DAYS)
        .rev()
        .map(|back| {
            let date = today.minus_days(back);
            DailyReviews {
                date,
                count: day_activity(cards, date).reviews,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::at;
    use crate::helper::new_card;
    use crate::helper::reviewed_card;
    use crate::helper::today;

    #[test]
    fn test_accuracy_counts_top_two_grades() {
        let now = at(0, 0);
        let cards = vec![
            reviewed_card("a", "L1", &[(at(0, -3), Rating::Again)], now),
            reviewed_card("b", "L1", &[(at(0, -2), Rating::Good)], now),
            reviewed_card("c", "L1", &[(at(0, -1), Rating::Easy)], now),
            reviewed_card("d", "L1", &[(at(0, 0), Rating::Hard)], now),
        ];
        let metrics = dashboard_metrics(&cards, now);
        assert_eq!(metrics.accuracy_rate, 50);
        assert_eq!(metrics.cards_studied_today, 4);
        assert_eq!(metrics.study_time_today, "2m");
    }

    #[test]
    fn test_no_reviews_is_all_zero() {
        let now = at(0, 0);
        let cards = vec![new_card("a", "L1", now), new_card("b", "L1", now)];
        let metrics = dashboard_metrics(&cards, now);
        assert_eq!(metrics.accuracy_rate, 0);
        assert_eq!(metrics.cards_studied_today, 0);
        assert_eq!(metrics.total_cards, 2);
        assert_eq!(metrics.study_time_today, "0m");
        assert_eq!(metrics.weekly_change.cards_studied, "0");
        assert_eq!(metrics.weekly_change.accuracy, "0");
        assert_eq!(dashboard_metrics(&[], now), DashboardMetrics {
            total_cards: 0,
            ..metrics
        });
    }

    #[test]
    fn test_card_counted_once_per_day() {
        let now = at(0, 0);
        let card = reviewed_card(
            "a",
            "L1",
            &[
                (at(-1, 0), Rating::Good),
                (at(0, -2), Rating::Again),
                (at(0, -1), Rating::Good),
            ],
            now,
        );
        let today = day_activity(std::slice::from_ref(&card), now.local_date());
        assert_eq!(today.cards, 1);
        assert_eq!(today.reviews, 2);
        assert_eq!(today.correct, 1);
        let metrics = dashboard_metrics(&[card], now);
        assert_eq!(metrics.cards_studied_today, 1);
        // Its latest review is today, so it does not count for yesterday.
        assert_eq!(metrics.cards_studied_yesterday, 0);
        assert_eq!(metrics.weekly_change.cards_studied, "+100");
        // 50% today against 100% yesterday.
        assert_eq!(metrics.weekly_change.accuracy, "-50");
        assert_eq!(metrics.study_time_today, "1m");
    }

    #[test]
    fn test_cards_bucketed_by_latest_review() {
        let now = at(0, 0);
        let cards = vec![
            reviewed_card("a", "L1", &[(at(-1, 0), Rating::Good), (at(0, -1), Rating::Good)], now),
            reviewed_card("b", "L1", &[(at(-2, 0), Rating::Good), (at(-1, 1), Rating::Good)], now),
            reviewed_card("c", "L1", &[(at(-1, -1), Rating::Hard)], now),
        ];
        assert_eq!(cards_last_studied_on(&cards, today()), 1);
        assert_eq!(cards_last_studied_on(&cards, today().minus_days(1)), 2);
        assert_eq!(cards_last_studied_on(&cards, today().minus_days(2)), 0);
        let metrics = dashboard_metrics(&cards, now);
        assert_eq!(metrics.cards_studied_today, 1);
        assert_eq!(metrics.cards_studied_yesterday, 2);
        assert_eq!(metrics.weekly_change.cards_studied, "-50");
        // The weekly series still counts every day a card was reviewed.
        assert_eq!(weekly_series(&cards, now).counts(), vec![0, 0, 0, 0, 1, 3, 1]);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(0.0, 0.0), "0");
        assert_eq!(percent_change(3.0, 0.0), "+100");
        assert_eq!(percent_change(0.0, 4.0), "-100");
        assert_eq!(percent_change(5.0, 4.0), "+25");
        assert_eq!(percent_change(4.0, 4.0), "0");
        assert_eq!(percent_change(2.0, 3.0), "-33");
    }

    #[test]
    fn test_study_time_rounds_half_up() {
        assert_eq!(study_time(0), "0m");
        assert_eq!(study_time(1), "1m");
        assert_eq!(study_time(2), "1m");
        assert_eq!(study_time(3), "2m");
        assert_eq!(study_time(40), "20m");
    }

    #[test]
    fn test_weekly_series_oldest_first() {
        let now = at(0, 0);
        let cards = vec![
            reviewed_card(
                "a",
                "L1",
                &[(at(-6, 0), Rating::Good), (at(-6, 1), Rating::Good)],
                now,
            ),
            reviewed_card("b", "L1", &[(at(-6, 0), Rating::Hard), (at(0, 0), Rating::Good)], now),
            reviewed_card("c", "L1", &[(at(-7, 0), Rating::Good), (at(-2, 0), Rating::Good)], now),
        ];
        let series = weekly_series(&cards, now);
        assert_eq!(series.counts(), vec![2, 0, 0, 0, 1, 0, 1]);
        assert_eq!(series.days[0].date, today().minus_days(6));
        assert_eq!(series.days[6].date, today());
        assert_eq!(series.days[6].label, today().weekday_label());
    }

    #[test]
    fn test_category_distribution_in_discovery_order() {
        let now = at(0, 0);
        let cards = vec![
            new_card("a", "Novice 2", now),
            new_card("b", "Novice 1", now),
            new_card("c", "Novice 2", now),
            new_card("d", "", now),
            new_card("e", "Novice 1", now),
        ];
        let distribution = category_distribution(&cards);
        let pairs: Vec<(&str, usize)> = distribution
            .categories
            .iter()
            .map(|c| (c.level.as_str(), c.count))
            .collect();
        assert_eq!(pairs, vec![("Novice 2", 2), ("Novice 1", 2), ("Unknown", 1)]);
        assert!(category_distribution(&[]).categories.is_empty());
    }

    #[test]
    fn test_progress_summary() {
        let now = at(0, 0);
        let cards = vec![
            reviewed_card("a", "Novice 1", &[(at(-40, 0), Rating::Good), (at(-3, 0), Rating::Good)], now),
            reviewed_card("b", "Novice 2", &[(at(-3, 2), Rating::Good), (at(-1, 0), Rating::Easy)], now),
            reviewed_card("c", "Novice 3", &[(at(-29, 0), Rating::Again)], now),
            new_card("d", "Novice 4", now),
        ];
        let summary = progress_summary(&cards, now);
        assert_eq!(summary.days_reviewed, 3);
        assert_eq!(summary.current_level, "Novice 2");
        assert_eq!(summary.total_cards_reviewed, 3);
        let words: Vec<&str> = summary
            .difficult_words
            .iter()
            .map(|w| w.vocabulary.as_str())
            .collect();
        assert_eq!(words, vec!["c"]);
        assert_eq!(summary.difficult_words[0].pinyin, "c-pinyin");
        let counts: Vec<usize> = summary.review_history.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 2, 0, 1, 0]);
        assert_eq!(summary.review_history[6].date, today());

        let empty = progress_summary(&cards[3..], now);
        assert_eq!(empty.days_reviewed, 0);
        assert_eq!(empty.current_level, DEFAULT_LEVEL);
        assert!(empty.difficult_words.is_empty());
        assert_eq!(empty.review_history.len(), 7);
        assert!(empty.review_history.iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_difficult_words_ranked_by_lapses() {
        let now = at(0, 0);
        let again = |n: i64| (at(-n, 0), Rating::Again);
        let good = |n: i64| (at(-n, 0), Rating::Good);
        let cards = vec![
            reviewed_card("one", "L1", &[again(3), good(2)], now),
            reviewed_card("three", "L1", &[again(5), again(4), again(3)], now),
            reviewed_card("never", "L1", &[good(5), good(1)], now),
            reviewed_card("two", "L1", &[again(4), again(2)], now),
            reviewed_card("two-long", "L1", &[again(6), good(5), again(4), good(2)], now),
            reviewed_card("one-b", "L1", &[again(1)], now),
            reviewed_card("one-c", "L1", &[again(1)], now),
        ];
        let words: Vec<(String, usize)> = difficult_words(&cards)
            .into_iter()
            .map(|w| (w.vocabulary, w.lapses))
            .collect();
        assert_eq!(
            words,
            vec![
                ("three".to_string(), 3),
                ("two-long".to_string(), 2),
                ("two".to_string(), 2),
                ("one".to_string(), 1),
                ("one-b".to_string(), 1),
            ]
        );
    }
}
