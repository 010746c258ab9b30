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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::cmd::serve::state::ServerState;
use crate::error::Fallible;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
enum Action {
    Reveal,
    Again,
    Hard,
    Good,
    Easy,
    Skip,
    Restart,
}

impl Action {
    fn rating(self) -> Option<Rating> {
        match self {
            Action::Again => Some(Rating::Again),
            Action::Hard => Some(Rating::Hard),
            Action::Good => Some(Rating::Good),
            Action::Easy => Some(Rating::Easy),
            Action::Reveal | Action::Skip | Action::Restart => None,
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    if let Err(e) = action_handler(&state, form.action) {
        log::error!("{e}");
        let message = if e.is_retryable() {
            format!("{e} Please try again.")
        } else {
            e.to_string()
        };
        state.lock().message = Some(message);
    }
    Redirect::to("/")
}

fn action_handler(state: &ServerState, action: Action) -> Fallible<()> {
    let now = Timestamp::now();
    let mut mutable = state.lock();
    let session = &mut mutable.session;
    if let Some(rating) = action.rating() {
        if session.is_finished() {
            return Ok(());
        }
        return match session.rate(state.review.as_ref(), rating, now) {
            Ok(_) => Ok(()),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                // Nothing can be done for this card until its state is fixed.
                session.skip();
                Err(e)
            }
        };
    }
    match action {
        Action::Reveal => {
            if !session.is_finished() {
                session.reveal()?;
            }
        }
        Action::Skip => session.skip(),
        Action::Restart => session.restart(state.review.as_ref(), now)?,
        Action::Again | Action::Hard | Action::Good | Action::Easy => {}
    }
    Ok(())
}
