use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Binary review polarity, stored as `0`/`1` on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    pub fn label(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Self::Negative),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Positive => "positive",
        }
    }
}

impl TryFrom<u8> for Sentiment {
    type Error = String;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        Self::from_label(label).ok_or_else(|| format!("sentiment label must be 0 or 1, got {label}"))
    }
}

impl From<Sentiment> for u8 {
    fn from(sentiment: Sentiment) -> Self {
        sentiment.label()
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "neg" | "negative" => Ok(Self::Negative),
            "1" | "pos" | "positive" => Ok(Self::Positive),
            other => Err(format!("unknown sentiment {other:?} (expected 0/1 or negative/positive)")),
        }
    }
}

/// One labeled review, a row of the `review,sentiment` CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub review: String,
    pub sentiment: Sentiment,
}

impl Record {
    pub fn new(review: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            review: review.into(),
            sentiment,
        }
    }
}

/// Up to `N` consecutive records; shorter (or empty) at the end of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.review.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.sentiment.label()).collect()
    }
}

impl From<Vec<Record>> for Batch {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
