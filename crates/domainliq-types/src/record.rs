//! DNS record primitives shared by the resolver client and the match rules.

use serde::{Deserialize, Serialize};

/// DNS record types the platform queries, with their wire-format codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Txt,
    Ns,
    A,
}

impl RecordType {
    /// Numeric RR type code, as carried in the DoH JSON `type` field.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Txt => 16,
            Self::Ns => 2,
            Self::A => 1,
        }
    }

    /// Reverse of [`code`](Self::code).
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            16 => Some(Self::Txt),
            2 => Some(Self::Ns),
            1 => Some(Self::A),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Txt => write!(f, "TXT"),
            Self::Ns => write!(f, "NS"),
            Self::A => write!(f, "A"),
        }
    }
}

/// A deduplicated set of record values, preserving first-seen order.
///
/// Dedup is by exact string; normalization (case, trailing dots) belongs to
/// the match rules, not the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    values: Vec<String>,
}

impl RecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; exact duplicates are ignored. Returns `true` if the
    /// value was new.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.values.iter().any(|v| v == &value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Union with another set; the other set's new values are appended in
    /// their original order.
    pub fn merge(&mut self, other: Self) {
        for value in other.values {
            self.insert(value);
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl FromIterator<String> for RecordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for RecordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
