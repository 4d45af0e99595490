//! Search and sort over record collections.
//!
//! Every collection implements [`Queryable`]: a fixed set of text fields to
//! search, and a lookup from a sort key (the record's camelCase field name)
//! to a comparable [`SortValue`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::{Decimal, TimeMs};

mod records;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        SortConfig {
            key: key.into(),
            direction,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Desc)
    }

    /// Column-header click policy: the same key flips the direction, a new
    /// key starts ascending.
    pub fn toggled(&self, key: &str) -> SortConfig {
        if self.key == key {
            SortConfig::new(key, self.direction.flipped())
        } else {
            SortConfig::asc(key)
        }
    }

    fn is_date_key(&self) -> bool {
        self.key.to_ascii_lowercase().contains("date")
    }
}

/// A field value as seen by the comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortValue<'a> {
    Null,
    Bool(bool),
    Number(Decimal),
    Date(TimeMs),
    Text(Cow<'a, str>),
}

impl<'a> SortValue<'a> {
    pub fn text(value: &'a str) -> Self {
        SortValue::Text(Cow::Borrowed(value))
    }

    pub fn opt_text(value: Option<&'a str>) -> Self {
        value.map(Self::text).unwrap_or(SortValue::Null)
    }

    pub fn number(value: Decimal) -> Self {
        SortValue::Number(value)
    }

    pub fn opt_number(value: Option<Decimal>) -> Self {
        value.map(SortValue::Number).unwrap_or(SortValue::Null)
    }

    pub fn date(value: TimeMs) -> Self {
        SortValue::Date(value)
    }

    pub fn opt_date(value: Option<TimeMs>) -> Self {
        value.map(SortValue::Date).unwrap_or(SortValue::Null)
    }

    /// Date-like keys read text as a timestamp; unparsable text is null.
    fn as_date(self) -> Self {
        match self {
            SortValue::Text(text) => TimeMs::parse(&text)
                .map(SortValue::Date)
                .unwrap_or(SortValue::Null),
            other => other,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Null => 4,
        }
    }
}

/// A record that can be searched and sorted.
pub trait Queryable {
    /// Text fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Value for a sort key; unknown keys are [`SortValue::Null`].
    fn sort_value(&self, key: &str) -> SortValue<'_>;
}

/// Ascending comparison with nulls greater than everything.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    use SortValue::*;

    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Greater,
        (_, Null) => Ordering::Less,
        (Number(x), Number(y)) => x.cmp(y),
        (Date(x), Date(y)) => x.cmp(y),
        (Bool(x), Bool(y)) => x.cmp(y),
        (Text(x), Text(y)) => compare_text(x, y),
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

/// Case-folded comparison first, raw text as the tie-breaker.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring match of an already case-folded needle.
fn matches_search<T: Queryable>(record: &T, needle: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filter by search term, then stable-sort by the configured key.
///
/// A blank search term keeps every record. The result borrows the input
/// records; nothing is copied or re-identified.
pub fn filter_and_sort<'a, T: Queryable>(
    records: &'a [T],
    search_term: &str,
    sort: &SortConfig,
) -> Vec<&'a T> {
    let needle = search_term.trim().to_lowercase();
    let date_key = sort.is_date_key();

    let mut keyed: Vec<(SortValue<'a>, &'a T)> = records
        .iter()
        .filter(|record| needle.is_empty() || matches_search(*record, &needle))
        .map(|record| {
            let value = record.sort_value(&sort.key);
            let value = if date_key { value.as_date() } else { value };
            (value, record)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_values(a, b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
        note: Option<&'static str>,
        amount: Option<Decimal>,
        due_date: Option<&'static str>,
    }

    impl Queryable for Row {
        fn search_fields(&self) -> Vec<&str> {
            let mut fields = vec![self.name];
            fields.extend(self.note);
            fields
        }

        fn sort_value(&self, key: &str) -> SortValue<'_> {
            match key {
                "name" => SortValue::text(self.name),
                "amount" => SortValue::opt_number(self.amount),
                "dueDate" => SortValue::opt_text(self.due_date),
                "mixed" => {
                    if self.id % 2 == 0 {
                        SortValue::text(self.name)
                    } else {
                        SortValue::opt_number(self.amount)
                    }
                }
                _ => SortValue::Null,
            }
        }
    }

    fn row(id: u32, name: &'static str, amount: Option<i64>, due: Option<&'static str>) -> Row {
        Row {
            id,
            name,
            note: None,
            amount: amount.map(Decimal::from),
            due_date: due,
        }
    }

    fn ids(rows: &[&Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row(1, "banana", Some(30), Some("2024-03-01")),
            row(2, "Apple", Some(5), None),
            row(3, "cherry", None, Some("not a date")),
            row(4, "apple", Some(100), Some("2024-01-15")),
        ]
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let rows = sample();
        let result = filter_and_sort(&rows, "   ", &SortConfig::asc("unknown"));
        assert_eq!(result.len(), rows.len());
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut rows = sample();
        rows[2].note = Some("Pick APPLES later");
        let result = filter_and_sort(&rows, "  APP ", &SortConfig::asc("unknown"));
        assert_eq!(ids(&result), vec![2, 3, 4]);
    }

    #[test]
    fn test_numeric_sort_with_nulls() {
        let rows = sample();
        let asc = filter_and_sort(&rows, "", &SortConfig::asc("amount"));
        assert_eq!(ids(&asc), vec![2, 1, 4, 3]);

        let desc = filter_and_sort(&rows, "", &SortConfig::desc("amount"));
        assert_eq!(ids(&desc), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_text_sort_is_case_folded_and_stable() {
        let rows = sample();
        let asc = filter_and_sort(&rows, "", &SortConfig::asc("name"));
        // "Apple" < "apple" on the raw tie-break, both before banana.
        assert_eq!(ids(&asc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_date_keys_parse_and_unparsable_is_null() {
        let rows = sample();
        let asc = filter_and_sort(&rows, "", &SortConfig::asc("dueDate"));
        assert_eq!(ids(&asc), vec![4, 1, 2, 3]);

        let desc = filter_and_sort(&rows, "", &SortConfig::desc("dueDate"));
        assert_eq!(ids(&desc), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_single_null_date_placement() {
        let rows = vec![row(1, "a", None, None), row(2, "b", None, Some("2024-01-01"))];
        let asc = filter_and_sort(&rows, "", &SortConfig::asc("dueDate"));
        assert_eq!(ids(&asc), vec![2, 1]);
        let desc = filter_and_sort(&rows, "", &SortConfig::desc("dueDate"));
        assert_eq!(ids(&desc), vec![1, 2]);
    }

    #[test]
    fn test_mixed_kinds_fall_back_to_kind_order() {
        let rows = sample();
        let asc = filter_and_sort(&rows, "", &SortConfig::asc("mixed"));
        // Numbers (ids 1 -> 30) before text (ids 2 "Apple", 4 "apple"); id 3 is null.
        assert_eq!(ids(&asc), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_toggle_policy() {
        let config = SortConfig::asc("name");
        assert_eq!(config.toggled("name"), SortConfig::desc("name"));
        assert_eq!(config.toggled("name").toggled("name"), SortConfig::asc("name"));
        assert_eq!(SortConfig::desc("name").toggled("amount"), SortConfig::asc("amount"));
    }

    #[test]
    fn test_sort_direction_from_str() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(" asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("up".parse::<SortDirection>().is_err());
    }
}
