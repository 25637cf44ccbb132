//! Composable constraints over stored players.
//!
//! A [`Criteria`] carries one optional constraint per filterable
//! attribute. It is turned into a list of [`Predicate`]s, all of which
//! must hold for a player to match; an empty list matches everything.
//! Storage backends either evaluate predicates directly
//! ([`Predicate::matches`]) or translate them into their own query
//! language.

use std::cmp::Ordering;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::errors::BackendError;
use crate::player::{Player, Profession, Race};
use crate::timestamp::from_millis_saturating;

/// A filterable or sortable attribute of a player.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Column {
    Id,
    Name,
    Title,
    Race,
    Profession,
    Level,
    Experience,
    Birthday,
    Banned,
}

impl Column {
    /// The column name in the database.
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Title => "title",
            Column::Race => "race",
            Column::Profession => "profession",
            Column::Level => "level",
            Column::Experience => "experience",
            Column::Birthday => "birthday",
            Column::Banned => "banned",
        }
    }

    /// Reads this attribute from `player`.
    pub fn value_of(self, player: &Player) -> Value {
        match self {
            Column::Id => Value::BigInt(player.id),
            Column::Name => Value::Text(player.name.clone()),
            Column::Title => Value::Text(player.title.clone()),
            Column::Race => Value::Text(player.race.as_str().to_owned()),
            Column::Profession => Value::Text(player.profession.as_str().to_owned()),
            Column::Level => Value::Int(player.level),
            Column::Experience => Value::Int(player.experience),
            Column::Birthday => Value::Time(player.birthday),
            Column::Banned => Value::Bool(player.banned),
        }
    }
}

/// A value compared against a column.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum Value {
    Text(String),
    Int(i32),
    BigInt(i64),
    Bool(bool),
    Time(OffsetDateTime),
}

/// A single constraint on one column.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// The column contains the text (case-sensitive).
    Contains(Column, String),
    Equals(Column, Value),
    AtLeast(Column, Value),
    AtMost(Column, Value),
    /// Both bounds inclusive.
    Between(Column, Value, Value),
}

impl Predicate {
    pub fn matches(&self, player: &Player) -> bool {
        use Predicate::*;

        match self {
            Contains(column, needle) => match column.value_of(player) {
                Value::Text(haystack) => haystack.contains(needle.as_str()),
                _ => false,
            },
            Equals(column, value) => column.value_of(player) == *value,
            AtLeast(column, min) => compare(column.value_of(player), min, Ordering::is_ge),
            AtMost(column, max) => compare(column.value_of(player), max, Ordering::is_le),
            Between(column, min, max) => {
                let actual = column.value_of(player);

                compare(actual.clone(), min, Ordering::is_ge)
                    && compare(actual, max, Ordering::is_le)
            }
        }
    }
}

fn compare(actual: Value, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    actual.partial_cmp(bound).map_or(false, accept)
}

/// An optional inclusive range. A missing side leaves that side open.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Bounds { min, max }
    }

    fn predicate(self, column: Column, wrap: impl Fn(T) -> Value) -> Option<Predicate> {
        match (self.min, self.max) {
            (None, None) => None,
            (Some(min), None) => Some(Predicate::AtLeast(column, wrap(min))),
            (None, Some(max)) => Some(Predicate::AtMost(column, wrap(max))),
            (Some(min), Some(max)) => Some(Predicate::Between(column, wrap(min), wrap(max))),
        }
    }
}

/// The optional constraints a caller may place on a listing or count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub banned: Option<bool>,
    pub level: Bounds<i32>,
    pub experience: Bounds<i32>,

    /// Epoch milliseconds; `min` is "after", `max` is "before".
    pub birthday: Bounds<i64>,
}

impl Criteria {
    /// Returns one predicate per constraint present.
    pub fn predicates(&self) -> Vec<Predicate> {
        let text = |column, value: &Option<String>| {
            value
                .as_ref()
                .map(|v| Predicate::Contains(column, v.clone()))
        };
        let label = |column, value: Option<&'static str>| {
            value.map(|v| Predicate::Equals(column, Value::Text(v.to_owned())))
        };

        vec![
            text(Column::Name, &self.name),
            text(Column::Title, &self.title),
            label(Column::Race, self.race.map(|r| r.as_str())),
            label(Column::Profession, self.profession.map(|p| p.as_str())),
            self.banned
                .map(|b| Predicate::Equals(Column::Banned, Value::Bool(b))),
            self.level.predicate(Column::Level, Value::Int),
            self.experience.predicate(Column::Experience, Value::Int),
            self.birthday.predicate(Column::Birthday, |millis| {
                Value::Time(from_millis_saturating(millis))
            }),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Builds the predicates once, for testing many players.
    pub fn matcher(&self) -> impl Fn(&Player) -> bool {
        let predicates = self.predicates();

        move |player: &Player| predicates.iter().all(|p| p.matches(player))
    }

    pub fn matches(&self, player: &Player) -> bool {
        self.matcher()(player)
    }
}

/// The attribute listings are sorted by, ascending.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    Id,
    Name,
    Experience,
    Birthday,
    Level,
}

impl Default for Order {
    fn default() -> Self {
        Order::Id
    }
}

impl Order {
    pub fn column(self) -> Column {
        match self {
            Order::Id => Column::Id,
            Order::Name => Column::Name,
            Order::Experience => Column::Experience,
            Order::Birthday => Column::Birthday,
            Order::Level => Column::Level,
        }
    }

    /// Compares two players by this attribute, then by ID.
    pub fn compare(self, a: &Player, b: &Player) -> Ordering {
        let column = self.column();

        column
            .value_of(a)
            .partial_cmp(&column.value_of(b))
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    }
}

/// A zero-based page of results.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Page {
    number: i64,
    size: i64,
}

impl Page {
    pub fn new(number: i32, size: i32) -> Result<Self, BackendError> {
        if number < 0 {
            return Err(BackendError::invalid("pageNumber"));
        }

        if size < 1 {
            return Err(BackendError::invalid("pageSize"));
        }

        Ok(Page {
            number: i64::from(number),
            size: i64::from(size),
        })
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// The number of results to skip.
    pub fn offset(&self) -> i64 {
        self.number * self.size
    }
}
