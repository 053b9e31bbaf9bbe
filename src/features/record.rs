// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Feature record and snapshot types.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialized form of [`FeatureValue::Unknown`].
pub const UNKNOWN_MARKER: &str = "unknown";

/// A feature that may be unavailable for a backend.
///
/// Serializes as the bare value when known and as the string `"unknown"`
/// otherwise, so an unknown error rate never reads as `0` or `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<T> {
    /// Value reported by the provider
    Known(T),
    /// Provider had no data
    Unknown,
}

impl<T> FeatureValue<T> {
    /// Get the value if known.
    pub fn known(&self) -> Option<&T> {
        match self {
            FeatureValue::Known(v) => Some(v),
            FeatureValue::Unknown => None,
        }
    }

    /// Check whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, FeatureValue::Unknown)
    }
}

impl<T> From<Option<T>> for FeatureValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FeatureValue::Known(v),
            None => FeatureValue::Unknown,
        }
    }
}

impl<T: Serialize> Serialize for FeatureValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Known(v) => v.serialize(serializer),
            FeatureValue::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FeatureValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<V> {
            Known(V),
            Marker(String),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Known(v) => Ok(FeatureValue::Known(v)),
            Repr::Marker(m) if m == UNKNOWN_MARKER => Ok(FeatureValue::Unknown),
            Repr::Marker(m) => Err(D::Error::custom(format!(
                "expected a value or \"{}\", got \"{}\"",
                UNKNOWN_MARKER, m
            ))),
        }
    }
}

/// Normalized features of one backend.
///
/// Field order is the serialized key order and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendFeatureRecord {
    /// Backend name
    pub name: String,
    /// Pending jobs at query time
    pub queue_length: u64,
    /// Whether the backend accepts jobs
    pub operational: bool,
    /// Qubit count
    pub num_qubits: FeatureValue<u32>,
    /// First reported gate error rate
    pub primary_error_rate: FeatureValue<f64>,
    /// Estimated probability the backend goes down
    pub downtime_probability: f64,
}

/// Ordered feature records of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSnapshot {
    records: Vec<BackendFeatureRecord>,
}

impl FeatureSnapshot {
    /// Create a snapshot from records, keeping their order.
    pub fn new(records: Vec<BackendFeatureRecord>) -> Self {
        Self { records }
    }

    /// Append a record.
    pub fn push(&mut self, record: BackendFeatureRecord) {
        self.records.push(record);
    }

    /// Records in registry order.
    pub fn records(&self) -> &[BackendFeatureRecord] {
        &self.records
    }

    /// Look up a record by backend name.
    pub fn get(&self, name: &str) -> Option<&BackendFeatureRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the snapshot as a JSON document.
    ///
    /// Reals use serde_json's shortest round-trip form, so very small rates
    /// print in exponent notation (`1e-6`). JSON parsers read both forms.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        let mut doc = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        doc.push('\n');
        Ok(doc)
    }
}
