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

use std::env::current_dir;
use std::path::PathBuf;

use crate::analytics::engine::AnalyticsEngine;
use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::review::engine::ReviewEngine;
use crate::scheduler::FsrsScheduler;

pub const DATABASE_FILE: &str = "lexicards.db";
pub const CONFIG_FILE: &str = "lexicards.toml";

/// A collection directory: its settings and its card database.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory.join(CONFIG_FILE))?;

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;
        log::debug!("Opened collection at {directory:?}.");

        Ok(Self {
            directory,
            config,
            db,
        })
    }

    pub fn review_engine(&self) -> ReviewEngine<Database, FsrsScheduler> {
        ReviewEngine::new(self.db.clone(), FsrsScheduler::new(), &self.config)
    }

    pub fn analytics_engine(&self) -> AnalyticsEngine<Database> {
        AnalyticsEngine::new(self.db.clone(), &self.config)
    }
}
