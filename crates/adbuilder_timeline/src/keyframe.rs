// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions.

use crate::easing::Easing;
use crate::element::ElementId;
use crate::error::TimelineError;
use crate::value::{AnimationProperty, AnimationValue, PropertyValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A timed value for one property of one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KeyframeRecord", into = "KeyframeRecord")]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in seconds. Not clamped; may lie outside the timeline.
    pub time: f64,
    /// Element this keyframe animates
    pub element_id: ElementId,
    /// Property-bound value
    pub value: PropertyValue,
    /// Easing of the segment that ends at this keyframe
    pub easing: Easing,
}

impl Keyframe {
    /// Create a keyframe with the default easing
    pub fn new(element_id: ElementId, time: f64, value: PropertyValue) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            element_id,
            value,
            easing: Easing::default(),
        }
    }

    /// Set easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Property this keyframe animates
    pub fn property(&self) -> AnimationProperty {
        self.value.property()
    }

    /// Merge a patch into this keyframe.
    ///
    /// The patch is validated before anything is written, so a rejected
    /// patch leaves the keyframe untouched.
    pub fn apply_patch(&mut self, patch: &KeyframePatch) -> Result<(), TimelineError> {
        let value = patch
            .value
            .map(|v| PropertyValue::new(self.property(), v))
            .transpose()?;

        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(value) = value {
            self.value = value;
        }
        if let Some(easing) = patch.easing {
            self.easing = easing;
        }
        Ok(())
    }
}

/// Partial update for a keyframe. The property itself cannot change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyframePatch {
    /// New time
    pub time: Option<f64>,
    /// New value, must match the keyframe's property shape
    pub value: Option<AnimationValue>,
    /// New easing
    pub easing: Option<Easing>,
}

impl KeyframePatch {
    /// Patch only the time
    pub fn time(time: f64) -> Self {
        Self { time: Some(time), ..Self::default() }
    }

    /// Patch only the value
    pub fn value(value: impl Into<AnimationValue>) -> Self {
        Self { value: Some(value.into()), ..Self::default() }
    }

    /// Patch only the easing
    pub fn easing(easing: Easing) -> Self {
        Self { easing: Some(easing), ..Self::default() }
    }
}

/// Persisted keyframe layout: `{id, time, elementId, property, value, easing}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeRecord {
    #[serde(default)]
    id: KeyframeId,
    time: f64,
    element_id: ElementId,
    property: String,
    value: AnimationValue,
    #[serde(default)]
    easing: Easing,
}

impl TryFrom<KeyframeRecord> for Keyframe {
    type Error = TimelineError;

    fn try_from(record: KeyframeRecord) -> Result<Self, Self::Error> {
        let property = AnimationProperty::from_name(&record.property)
            .ok_or(TimelineError::UnknownProperty(record.property))?;
        Ok(Self {
            id: record.id,
            time: record.time,
            element_id: record.element_id,
            value: PropertyValue::new(property, record.value)?,
            easing: record.easing,
        })
    }
}

impl From<Keyframe> for KeyframeRecord {
    fn from(keyframe: Keyframe) -> Self {
        Self {
            id: keyframe.id,
            time: keyframe.time,
            element_id: keyframe.element_id,
            property: keyframe.value.property().name().to_string(),
            value: keyframe.value.value(),
            easing: keyframe.easing,
        }
    }
}
