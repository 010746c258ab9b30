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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::analytics::report::DashboardMetrics;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::template::page_template;
use crate::review::engine::IntervalPreview;
use crate::review::session::Phase;
use crate::types::card::Card;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let now = Timestamp::now();
    let metrics = state.analytics.get_dashboard_metrics(now);
    let mut mutable = state.lock();
    let message = mutable.message.take();
    let (done, total) = mutable.session.progress();
    let main = match mutable.session.phase() {
        Phase::Empty => html! {
            div.finished {
                h1 {
                    "Session Completed"
                }
                form action="/" method="post" {
                    input id="restart" type="submit" name="action" value="Restart";
                }
            }
        },
        Phase::Presenting(card) => {
            let controls = html! {
                form action="/" method="post" {
                    input id="reveal" type="submit" name="action" value="Reveal";
                    input id="skip" type="submit" name="action" value="Skip";
                }
            };
            render_card(card, false, controls, done, total)
        }
        Phase::Revealed(card) => {
            let previews = match state.review.preview(card.id(), now) {
                Ok(previews) => previews,
                Err(e) => {
                    log::warn!("Cannot preview intervals for {}: {e}", card.id());
                    Vec::new()
                }
            };
            let controls = html! {
                form action="/" method="post" {
                    @for rating in Rating::ALL {
                        input
                            id=(rating.as_str())
                            type="submit"
                            name="action"
                            value=(button_label(rating))
                            title=(interval_hint(rating, &previews));
                    }
                    input id="skip" type="submit" name="action" value="Skip";
                }
            };
            render_card(card, true, controls, done, total)
        }
    };
    let body = html! {
        div.root {
            div.card {
                @if let Some(message) = message {
                    div.message {
                        (message)
                    }
                }
                (main)
            }
            (render_dashboard(&metrics))
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_card(card: &Card, reveal: bool, controls: Markup, done: usize, total: usize) -> Markup {
    html! {
        div.header {
            h1 {
                "lexicards"
            }
            div.progress {
                (format!("{done} / {total}"))
            }
        }
        div.level {
            (card.level())
        }
        div.vocabulary {
            (card.vocabulary())
        }
        div.pronunciation {
            @if reveal {
                (card.pronunciation())
            }
        }
        div.controls {
            (controls)
        }
    }
}

fn render_dashboard(metrics: &DashboardMetrics) -> Markup {
    html! {
        div.dashboard {
            div.metric {
                div.label { "Studied today" }
                div.value { (metrics.cards_studied_today) }
                div.change { (format!("{}% vs yesterday", metrics.weekly_change.cards_studied)) }
            }
            div.metric {
                div.label { "Accuracy" }
                div.value { (format!("{}%", metrics.accuracy_rate)) }
                div.change { (format!("{}% vs yesterday", metrics.weekly_change.accuracy)) }
            }
            div.metric {
                div.label { "Study time" }
                div.value { (metrics.study_time_today) }
            }
            div.metric {
                div.label { "Total cards" }
                div.value { (metrics.total_cards) }
            }
        }
    }
}

fn button_label(rating: Rating) -> &'static str {
    match rating {
        Rating::Again => "Again",
        Rating::Hard => "Hard",
        Rating::Good => "Good",
        Rating::Easy => "Easy",
    }
}

fn interval_hint(rating: Rating, previews: &[IntervalPreview]) -> String {
    match previews.iter().find(|p| p.rating == rating) {
        Some(preview) => format!("next review in {}d", preview.interval_days),
        None => String::new(),
    }
}
