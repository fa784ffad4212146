//! Scan and query configurations.
//!
//! The access layer treats these as opaque pass-through values; only store
//! clients interpret them.

use super::native::{NativeDocument, NativeValue};

/// One filter predicate over a top-level attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub attribute: String,
    pub op: ConditionOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOp {
    Equals(NativeValue),
    NotEquals(NativeValue),
    /// String attribute starts with the prefix.
    BeginsWith(String),
    /// String attribute contains the text, or list attribute holds it as `S`.
    Contains(String),
    Exists,
    NotExists,
}

impl Condition {
    pub fn new(attribute: impl Into<String>, op: ConditionOp) -> Self {
        Self {
            attribute: attribute.into(),
            op,
        }
    }

    pub fn equals(attribute: impl Into<String>, value: NativeValue) -> Self {
        Self::new(attribute, ConditionOp::Equals(value))
    }

    pub fn begins_with(attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(attribute, ConditionOp::BeginsWith(prefix.into()))
    }

    pub fn matches(&self, document: &NativeDocument) -> bool {
        let value = document.get(self.attribute.as_str());
        match &self.op {
            ConditionOp::Equals(expected) => value == Some(expected),
            ConditionOp::NotEquals(expected) => value != Some(expected),
            ConditionOp::BeginsWith(prefix) => value
                .and_then(NativeValue::as_str)
                .is_some_and(|text| text.starts_with(prefix.as_str())),
            ConditionOp::Contains(needle) => match value {
                Some(NativeValue::String(text)) => text.contains(needle.as_str()),
                Some(NativeValue::List(items)) => items
                    .iter()
                    .any(|item| item.as_str() == Some(needle.as_str())),
                _ => false,
            },
            ConditionOp::Exists => value.is_some(),
            ConditionOp::NotExists => value.is_none(),
        }
    }
}

/// Parameters of one paged scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Conditions applied after the page limit, all must hold.
    pub filter: Vec<Condition>,
    /// Maximum number of items evaluated for this page.
    pub limit: Option<u32>,
    /// Resume strictly after this partition key.
    pub exclusive_start_key: Option<String>,
    /// Restrict the scan to documents carrying this attribute.
    pub index_name: Option<String>,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, key: impl Into<String>) -> Self {
        self.exclusive_start_key = Some(key.into());
        self
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }
}

/// Parameters of one paged key-condition query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Equality value for the partition key, or for the indexed attribute
    /// when `index_name` is set.
    pub key_value: NativeValue,
    /// Attribute-named secondary index.
    pub index_name: Option<String>,
    pub filter: Vec<Condition>,
    pub limit: Option<u32>,
    pub exclusive_start_key: Option<String>,
    /// Ascending partition-key order when `true`.
    pub scan_forward: bool,
}

impl QueryConfig {
    /// Query for the document stored under `partition_key`.
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self::new(NativeValue::String(partition_key.into()))
    }

    /// Query `index_name` for documents whose attribute equals `value`.
    pub fn index(index_name: impl Into<String>, value: NativeValue) -> Self {
        let mut config = Self::new(value);
        config.index_name = Some(index_name.into());
        config
    }

    fn new(key_value: NativeValue) -> Self {
        Self {
            key_value,
            index_name: None,
            filter: Vec::new(),
            limit: None,
            exclusive_start_key: None,
            scan_forward: true,
        }
    }

    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, key: impl Into<String>) -> Self {
        self.exclusive_start_key = Some(key.into());
        self
    }

    pub fn backward(mut self) -> Self {
        self.scan_forward = false;
        self
    }

    /// Whether the item stored at `key` satisfies the key condition.
    pub fn key_matches(&self, key: &str, document: &NativeDocument) -> bool {
        match self.index_name.as_deref() {
            None => self.key_value.as_str() == Some(key),
            Some(index) => document.get(index) == Some(&self.key_value),
        }
    }
}
