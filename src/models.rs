//! Survey payload types and their validation rules.
//!
//! A `Response` arrives from the client, is checked with [`Response::validate`],
//! and only then reaches a store, which turns it into a `StoredResponse` by
//! minting its identifier.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

pub const AGE_RANGE: (i64, i64) = (0, 150);
pub const RATING_RANGE: (i64, i64) = (0, 10);
pub const OWNED_RANGE: (i64, i64) = (0, 1000);

/// The fixed set of animals a survey may rate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Animal {
    Dog,
    Cat,
    Bird,
    Horse,
    Snake,
}

impl Animal {
    pub const ALL: [Animal; 5] = [
        Animal::Dog,
        Animal::Cat,
        Animal::Bird,
        Animal::Horse,
        Animal::Snake,
    ];

    /// Parses an animal key as it appears in a submitted `animals` map.
    pub fn from_key(key: &str) -> Option<Animal> {
        trace!("Parsing Animal from '{}'", key);
        match key {
            "dog" => Some(Animal::Dog),
            "cat" => Some(Animal::Cat),
            "bird" => Some(Animal::Bird),
            "horse" => Some(Animal::Horse),
            "snake" => Some(Animal::Snake),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Animal::Dog => "dog",
            Animal::Cat => "cat",
            Animal::Bird => "bird",
            Animal::Horse => "horse",
            Animal::Snake => "snake",
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Reads an explicit JSON `null` the same way as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AnimalResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub rating: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub owned: i64,
}

/// A survey submission as sent by the client. Not persisted on its own.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "null_as_default")]
    pub animals: BTreeMap<String, AnimalResponse>,
    #[serde(deserialize_with = "null_as_default")]
    pub age: i64,
}

/// A response together with the identifier its store assigned to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub id: String,
    #[serde(flatten)]
    pub response: Response,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub count: u64,
}

/// Field path → human readable message, one entry per invalid field.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn range_error((min, max): (i64, i64)) -> String {
    format!("Must be between {} and {}", min, max)
}

fn in_range(value: i64, (min, max): (i64, i64)) -> bool {
    (min..=max).contains(&value)
}

impl Response {
    /// Checks every field and reports all violations at once.
    ///
    /// Unknown animals are reported as `animals.<key>` and nothing else is
    /// checked for that entry. For known animals only the first failing of
    /// `rating` then `owned` is reported.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut issues = ValidationErrors::default();

        for (key, answer) in &self.animals {
            if Animal::from_key(key).is_none() {
                issues.insert(format!("animals.{}", key), "No Such Animal");
                continue;
            }

            if !in_range(answer.rating, RATING_RANGE) {
                issues.insert(
                    format!("animals.{}.rating", key),
                    range_error(RATING_RANGE),
                );
            } else if !in_range(answer.owned, OWNED_RANGE) {
                issues.insert(format!("animals.{}.owned", key), range_error(OWNED_RANGE));
            }
        }

        if !in_range(self.age, AGE_RANGE) {
            issues.insert("age", range_error(AGE_RANGE));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

impl StoredResponse {
    pub fn new(id: String, response: Response) -> Self {
        Self { id, response }
    }
}
