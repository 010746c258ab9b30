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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

/// Number of hex digits kept from the content hash.
const ID_LENGTH: usize = 16;

/// A card's stable identity. Opaque to everything except the store.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from a card's immutable content, so that importing the
    /// same word twice yields the same card.
    pub fn from_content(vocabulary: &str, pronunciation: &str, level: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in [vocabulary, pronunciation, level] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        let hex = hasher.finalize().to_hex();
        Self(hex[..ID_LENGTH].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for CardId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for CardId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Ok(CardId(string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_is_stable() {
        let a = CardId::from_content("你好", "nǐ hǎo", "Novice 1");
        let b = CardId::from_content("你好", "nǐ hǎo", "Novice 1");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), ID_LENGTH);
    }

    #[test]
    fn test_from_content_separates_fields() {
        let a = CardId::from_content("ab", "c", "x");
        let b = CardId::from_content("a", "bc", "x");
        assert_ne!(a, b);
    }
}
