//! Reportable event records.
//!
//! An [`EventRecord`] is immutable once built: fields are private and only
//! exposed through accessors. The timestamp is the moment the event was
//! recorded, never the moment it is flushed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};
use crate::identity::{Enrichment, IdentifierProvider};
use crate::ids::EventId;
use crate::property::{Properties, PropertyValue};

/// A single reportable event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    id: EventId,
    name: String,
    #[serde(default)]
    properties: Properties,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enrichment: Option<Enrichment>,
}

impl EventRecord {
    /// Record an event with no properties, timestamped now.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::builder(name).build()
    }

    /// Start building an event.
    pub fn builder(name: impl Into<String>) -> EventRecordBuilder {
        EventRecordBuilder {
            name: name.into(),
            properties: Properties::new(),
            timestamp: None,
            enrichment: None,
        }
    }

    /// Event ID.
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// Event name, e.g. `Purchase` or `InstallApp`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Look up a single property.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// When the event was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Identifier enrichment attached at construction, if any.
    pub fn enrichment(&self) -> Option<&Enrichment> {
        self.enrichment.as_ref()
    }

    /// Check the construction invariants.
    ///
    /// Records built through [`EventRecordBuilder`] always pass; this guards
    /// records that arrive through deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyEventName);
        }
        if self.properties.keys().any(String::is_empty) {
            return Err(CoreError::EmptyPropertyKey {
                event: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Builder for [`EventRecord`].
#[derive(Debug)]
#[must_use]
pub struct EventRecordBuilder {
    name: String,
    properties: Properties,
    timestamp: Option<DateTime<Utc>>,
    enrichment: Option<Enrichment>,
}

impl EventRecordBuilder {
    /// Set a property, replacing any previous value for the key.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        let _ = self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge a property map, overriding existing keys.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Override the recorded-at timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach identifiers from a provider.
    pub fn enrich(mut self, provider: &dyn IdentifierProvider) -> Self {
        self.enrichment = Some(provider.snapshot());
        self
    }

    /// Attach a pre-captured enrichment.
    pub fn enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Finish the record. Fails on an empty name or property key.
    pub fn build(self) -> Result<EventRecord> {
        let record = EventRecord {
            id: EventId::new(),
            name: self.name,
            properties: self.properties,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            enrichment: self.enrichment,
        };
        record.validate()?;
        Ok(record)
    }
}
