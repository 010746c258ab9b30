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

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::drill::drill_in_terminal;
use crate::cmd::due::print_due_cards;
use crate::cmd::import::import_word_list;
use crate::cmd::serve::server::start_server;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add the words in a JSON word list to a collection.
    Import {
        /// Path to the word list: `[{"vocabulary", "pinyin", "level"}]`.
        file: PathBuf,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// List the cards due today.
    Due {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Review today's cards in the terminal.
    Drill {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Print progress statistics.
    Stats {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Review today's cards in the browser.
    Serve {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Port to listen on, overriding the collection's config.
        #[arg(long)]
        port: Option<u16>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Import { file, directory } => import_word_list(directory, &file),
        Command::Due { directory } => print_due_cards(directory),
        Command::Drill { directory } => drill_in_terminal(directory),
        Command::Stats { directory, format } => print_stats(directory, format),
        Command::Serve { directory, port } => start_server(directory, port).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Command::command().debug_assert();
    }

    #[test]
    fn test_parse_stats() {
        let cli = Command::try_parse_from(["lexicards", "stats", "deck", "--format", "json"]).unwrap();
        match cli {
            Command::Stats { directory, format } => {
                assert_eq!(directory.as_deref(), Some("deck"));
                assert_eq!(format, StatsFormat::Json);
            }
            _ => panic!("expected the stats command"),
        }
    }
}
