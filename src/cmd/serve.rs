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

mod api;
mod get;
mod post;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::Value;
    use serde_json::json;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::cmd::serve::server::start_server;
    use crate::collection::CONFIG_FILE;
    use crate::error::Fallible;
    use crate::helper::at;
    use crate::helper::collection_dir;
    use crate::helper::new_card;
    use crate::types::card::Card;

    async fn start(cards: &[Card]) -> Fallible<(tempfile::TempDir, String)> {
        let dir = collection_dir(cards)?;
        write(dir.path().join(CONFIG_FILE), "open_browser = false\n")?;
        let port = portpicker::pick_unused_port().unwrap();
        let directory = dir.path().display().to_string();
        spawn(async move { start_server(Some(directory), Some(port)).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(bind.as_str()).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok((dir, format!("http://{bind}")))
    }

    async fn post_action(base: &str, action: &str) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(format!("{base}/"))
            .form(&[("action", action)])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        Ok(response.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let result = start_server(Some("./derpherp".to_string()), None).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e_review_session() -> Fallible<()> {
        let cards = vec![
            new_card("你好", "Novice 1", at(-1, 0)),
            new_card("谢谢", "Novice 1", at(-2, 0)),
        ];
        let (_dir, base) = start(&cards).await?;

        // Static assets and the fallback.
        let response = reqwest::get(format!("{base}/style.css")).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");
        let response = reqwest::get(format!("{base}/herp-derp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The first card is showing, answer hidden.
        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert!(response.status().is_success());
        let html = response.text().await.unwrap();
        assert!(html.contains("0 / 2"));
        assert!(html.contains("value=\"Reveal\""));
        assert!(!html.contains("-pinyin"));

        let html = post_action(&base, "Reveal").await?;
        assert!(html.contains("-pinyin"));
        assert!(html.contains("value=\"Good\""));

        let html = post_action(&base, "Good").await?;
        assert!(html.contains("1 / 2"));
        assert!(html.contains("value=\"Reveal\""));

        // Rating reveals the card if it is not showing yet.
        let html = post_action(&base, "Easy").await?;
        assert!(html.contains("Session Completed"));

        // Every page render reads the dashboard, so the cache is stale by now.
        reqwest::Client::new()
            .post(format!("{base}/api/cache/clear"))
            .send()
            .await
            .unwrap();
        let metrics: Value = reqwest::get(format!("{base}/api/metrics"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(metrics["cardsStudiedToday"], 2);
        assert_eq!(metrics["accuracyRate"], 100);
        assert_eq!(metrics["totalCards"], 2);

        // Restart: nothing is due any more.
        let html = post_action(&base, "Restart").await?;
        assert!(html.contains("Session Completed"));
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e_api() -> Fallible<()> {
        let card = new_card("再见", "Novice 2", at(-1, 0));
        let (_dir, base) = start(std::slice::from_ref(&card)).await?;
        let client = reqwest::Client::new();

        let due: Value = reqwest::get(format!("{base}/api/due"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(due.as_array().map(|a| a.len()), Some(1));
        assert_eq!(due[0]["id"], card.id().as_str());
        let next: Value = reqwest::get(format!("{base}/api/next"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(next["vocabulary"], "再见");

        let previews: Value = reqwest::get(format!("{base}/api/cards/{}/preview", card.id()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(previews.as_array().map(|a| a.len()), Some(4));

        // Prime the metrics cache.
        let metrics: Value = reqwest::get(format!("{base}/api/metrics"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(metrics["cardsStudiedToday"], 0);

        let response = client
            .post(format!("{base}/api/cards/{}/rating", card.id()))
            .json(&json!({ "rating": "hard" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated: Value = response.json().await.unwrap();
        assert_eq!(updated["reviewHistory"][0]["rating"], "hard");

        // Unknown rating and unknown card are rejected.
        let response = client
            .post(format!("{base}/api/cards/{}/rating", card.id()))
            .json(&json!({ "rating": "meh" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["retryable"], false);
        let response = client
            .post(format!("{base}/api/cards/nope/rating"))
            .json(&json!({ "rating": "good" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Still cached until cleared.
        let metrics: Value = reqwest::get(format!("{base}/api/metrics"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(metrics["cardsStudiedToday"], 0);
        let response = client
            .post(format!("{base}/api/cache/clear"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let metrics: Value = reqwest::get(format!("{base}/api/metrics"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(metrics["cardsStudiedToday"], 1);

        let categories: Value = reqwest::get(format!("{base}/api/categories"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(categories["categories"][0]["level"], "Novice 2");
        let progress: Value = reqwest::get(format!("{base}/api/progress"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(progress["totalCardsReviewed"], 1);
        assert_eq!(progress["reviewHistory"].as_array().map(|a| a.len()), Some(7));
        assert_eq!(progress["reviewHistory"][6]["count"], 1);
        // Hard is not a lapse.
        assert_eq!(progress["difficultWords"], json!([]));
        let weekly: Value = reqwest::get(format!("{base}/api/weekly"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(weekly["days"][6]["count"], 1);
        let deck: Value = reqwest::get(format!("{base}/api/deck"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(deck["totalCards"], 1);
        assert_eq!(deck["dueCards"], 0);
        let next: Value = reqwest::get(format!("{base}/api/next"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(next.is_null());
        Ok(())
    }
}
