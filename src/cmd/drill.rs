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

use std::io::BufRead;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::review::engine::ReviewEngine;
use crate::review::session::Phase;
use crate::review::session::Session;
use crate::scheduler::Scheduler;
use crate::store::CardStore;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub fn drill_in_terminal(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let engine = coll.review_engine();
    let mut input = stdin().lock();
    let mut output = stdout().lock();
    run_drill(&engine, &mut input, &mut output, Timestamp::now)?;
    Ok(())
}

/// Run one review session over a line-based terminal. Returns the number of
/// ratings committed.
///
/// End of input ends the session; ratings committed so far are kept.
pub fn run_drill<S, K, R, W>(
    engine: &ReviewEngine<S, K>,
    input: &mut R,
    output: &mut W,
    clock: impl Fn() -> Timestamp,
) -> Fallible<usize>
where
    S: CardStore,
    K: Scheduler,
    R: BufRead,
    W: Write,
{
    let mut session = Session::start(engine, clock())?;
    if session.is_finished() {
        writeln!(output, "No cards due today.")?;
        return Ok(0);
    }
    let mut reviewed = 0;
    'session: loop {
        let card = match session.phase() {
            Phase::Empty => break,
            Phase::Presenting(card) | Phase::Revealed(card) => card.clone(),
        };
        let (done, total) = session.progress();
        writeln!(
            output,
            "[{}/{}] {}  ({})",
            done + 1,
            total,
            card.vocabulary(),
            card.level()
        )?;
        writeln!(output, "[press enter to reveal, q to quit]")?;
        match read_command(input)? {
            None => break,
            Some(line) if line == "q" => break,
            Some(_) => {}
        }
        session.reveal()?;
        writeln!(output, "A: {}", card.pronunciation())?;
        loop {
            writeln!(output, "{}", rating_prompt())?;
            let Some(line) = read_command(input)? else {
                break 'session;
            };
            match line.as_str() {
                "q" => break 'session,
                "s" => {
                    session.skip();
                    break;
                }
                _ => {}
            }
            let rating: Rating = match line.parse() {
                Ok(rating) => rating,
                Err(e) => {
                    writeln!(output, "{e}")?;
                    continue;
                }
            };
            match session.rate(engine, rating, clock()) {
                Ok(updated) => {
                    reviewed += 1;
                    writeln!(
                        output,
                        "Next review: {}",
                        updated.next_review().local_date()
                    )?;
                    break;
                }
                Err(e) if e.is_retryable() => {
                    writeln!(output, "{e} (try again)")?;
                }
                Err(e) => {
                    writeln!(output, "{e} (skipping card)")?;
                    session.skip();
                    break;
                }
            }
        }
    }
    writeln!(output, "Session finished: {reviewed} cards reviewed.")?;
    Ok(reviewed)
}

fn rating_prompt() -> String {
    let grades: Vec<String> = Rating::ALL
        .iter()
        .map(|rating| format!("{} = {}", rating.as_u8(), rating))
        .collect();
    format!("Rating: ({}, s = skip, q = quit)", grades.join(", "))
}

/// The next line, trimmed and lowercased. `None` at end of input.
fn read_command<R: BufRead>(input: &mut R) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::helper::FlakyStore;
    use crate::helper::at;
    use crate::helper::memory_db;
    use crate::helper::new_card;
    use crate::scheduler::FsrsScheduler;
    use crate::types::card::Card;

    fn engine(n: usize) -> Fallible<ReviewEngine<Arc<FlakyStore>, FsrsScheduler>> {
        let cards: Vec<Card> = (0..n)
            .map(|i| new_card(&format!("w{i}"), "Novice 1", at(-1, 0)))
            .collect();
        let store = Arc::new(FlakyStore::new(memory_db(&cards)?));
        Ok(ReviewEngine::new(store, FsrsScheduler::new(), &Config::default()))
    }

    fn drill(
        engine: &ReviewEngine<Arc<FlakyStore>, FsrsScheduler>,
        script: &str,
    ) -> Fallible<(usize, String)> {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output: Vec<u8> = Vec::new();
        let reviewed = run_drill(engine, &mut input, &mut output, || at(0, 0))?;
        Ok((reviewed, String::from_utf8(output).unwrap()))
    }

    #[test]
    fn test_full_session() -> Fallible<()> {
        let engine = engine(2)?;
        let (reviewed, output) = drill(&engine, "\n3\n\nmeh\neasy\n")?;
        assert_eq!(reviewed, 2);
        assert!(output.contains("[1/2]"));
        assert!(output.contains("[2/2]"));
        assert!(output.contains("invalid rating: meh"));
        assert!(output.ends_with("Session finished: 2 cards reviewed.\n"));
        let stored = engine.store().list_cards(None)?;
        assert!(stored.iter().all(|card| card.review_history().len() == 1));
        Ok(())
    }

    #[test]
    fn test_quit_and_end_of_input() -> Fallible<()> {
        let engine = engine(2)?;
        assert_eq!(drill(&engine, "q\n")?.0, 0);
        assert_eq!(drill(&engine, "")?.0, 0);
        assert_eq!(drill(&engine, "\n2\n")?.0, 1);
        let stored = engine.store().list_cards(None)?;
        let rated = stored.iter().filter(|card| !card.is_new()).count();
        assert_eq!(rated, 1);
        Ok(())
    }

    #[test]
    fn test_persistence_failure_stays_on_card() -> Fallible<()> {
        let engine = engine(1)?;
        engine.store().fail_writes(true);
        let (reviewed, output) = drill(&engine, "\n3\n3\nq\n")?;
        assert_eq!(reviewed, 0);
        assert_eq!(output.matches("(try again)").count(), 2);
        Ok(())
    }

    #[test]
    fn test_rating_prompt() {
        assert_eq!(
            rating_prompt(),
            "Rating: (1 = again, 2 = hard, 3 = good, 4 = easy, s = skip, q = quit)"
        );
    }

    #[test]
    fn test_nothing_due() -> Fallible<()> {
        let engine = engine(0)?;
        let (reviewed, output) = drill(&engine, "")?;
        assert_eq!(reviewed, 0);
        assert_eq!(output, "No cards due today.\n");
        Ok(())
    }
}
