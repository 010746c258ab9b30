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

use chrono::DateTime;
use chrono::Local;
use chrono::TimeDelta;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::types::date::Date;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The calendar day this instant falls on, in the local timezone.
    pub fn local_date(self) -> Date {
        let ts = self.0.with_timezone(&Local);
        Date::new(ts.date_naive())
    }

    /// Saturates at the latest representable instant instead of panicking.
    pub fn plus(self, delta: TimeDelta) -> Self {
        Self(self.0.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Signed time elapsed from `earlier` to `self`.
    pub fn since(self, earlier: Timestamp) -> TimeDelta {
        self.0 - earlier.0
    }

    /// Local noon on the given day, plus an offset in hours. Test fixtures use
    /// this so that day bucketing never straddles midnight.
    #[cfg(test)]
    pub fn local_noon(date: Date, hours: i64) -> Self {
        use chrono::TimeZone;
        let noon = date
            .into_inner()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let local = Local.from_local_datetime(&noon).earliest().unwrap();
        Self(local.with_timezone(&Utc)).plus(TimeDelta::hours(hours))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let str = self.0.to_rfc3339();
        Ok(ToSqlOutput::from(str))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        let ts =
            DateTime::parse_from_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        let ts = ts.with_timezone(&Utc);
        Ok(Timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_local_noon_round_trips_to_the_same_day() {
        let date = Date::new(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        let ts = Timestamp::local_noon(date, 0);
        assert_eq!(ts.local_date(), date);
        assert_eq!(Timestamp::local_noon(date, -24).local_date(), date.minus_days(1));
    }

    #[test]
    fn test_since_is_signed() {
        let a = Timestamp::now();
        let b = a.plus(TimeDelta::days(2));
        assert_eq!(b.since(a), TimeDelta::days(2));
        assert_eq!(a.since(b), TimeDelta::days(-2));
    }

    #[test]
    fn test_plus_saturates() {
        let ts = Timestamp::new(DateTime::<Utc>::MAX_UTC);
        assert_eq!(ts.plus(TimeDelta::days(1)), ts);
    }
}
