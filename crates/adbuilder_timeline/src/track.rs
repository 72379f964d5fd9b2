// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-element animation tracks.

use crate::element::ElementId;
use crate::keyframe::{Keyframe, KeyframeId, KeyframeRecord};
use crate::value::AnimationProperty;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// All keyframes of one element.
///
/// `visible`, `locked` and `expanded` are presentation flags only; sampling
/// and playback always use every keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationTrack {
    /// Unique track ID
    #[serde(default)]
    pub id: TrackId,
    /// Element this track animates
    pub element_id: ElementId,
    /// Keyframes, kept sorted by time at rest (stable for ties)
    #[serde(default, deserialize_with = "deserialize_keyframes")]
    pub keyframes: Vec<Keyframe>,
    /// Whether the track is shown
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether the track is locked against edits in the UI
    #[serde(default)]
    pub locked: bool,
    /// Whether per-property rows are expanded
    #[serde(default = "default_true")]
    pub expanded: bool,
}

fn default_true() -> bool {
    true
}

/// Keep well-formed keyframes, drop the rest with a warning
fn deserialize_keyframes<'de, D>(deserializer: D) -> Result<Vec<Keyframe>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Vec::<KeyframeRecord>::deserialize(deserializer)?;
    Ok(records
        .into_iter()
        .filter_map(|record| match Keyframe::try_from(record) {
            Ok(keyframe) => Some(keyframe),
            Err(e) => {
                tracing::warn!("Dropping keyframe on load: {}", e);
                None
            }
        })
        .collect())
}

impl AnimationTrack {
    /// Create an empty track for an element
    pub fn new(element_id: ElementId) -> Self {
        Self {
            id: TrackId::new(),
            element_id,
            keyframes: Vec::new(),
            visible: true,
            locked: false,
            expanded: true,
        }
    }

    /// Add a keyframe and restore time order
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> KeyframeId {
        let id = keyframe.id;
        self.keyframes.push(keyframe);
        self.sort_keyframes();
        id
    }

    /// Remove a keyframe; the track itself stays even when emptied
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) -> Option<Keyframe> {
        let idx = self.keyframes.iter().position(|k| k.id == keyframe_id)?;
        Some(self.keyframes.remove(idx))
    }

    /// Stable sort by time; equal times keep insertion order
    pub(crate) fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == keyframe_id)
    }

    /// Get mutable keyframe by ID
    pub fn keyframe_mut(&mut self, keyframe_id: KeyframeId) -> Option<&mut Keyframe> {
        self.keyframes.iter_mut().find(|k| k.id == keyframe_id)
    }

    /// Keyframes of one property, sorted by time.
    ///
    /// Order is re-derived on every call instead of trusting the stored
    /// order; ties keep their relative storage order.
    pub fn keyframes_for(&self, property: AnimationProperty) -> Vec<&Keyframe> {
        let mut matching: Vec<&Keyframe> = self
            .keyframes
            .iter()
            .filter(|k| k.property() == property)
            .collect();
        matching.sort_by(|a, b| a.time.total_cmp(&b.time));
        matching
    }

    /// Properties that have at least one keyframe, in timeline row order
    pub fn animated_properties(&self) -> Vec<AnimationProperty> {
        AnimationProperty::ALL
            .into_iter()
            .filter(|p| self.keyframes.iter().any(|k| k.property() == *p))
            .collect()
    }

    /// Whether the track has any keyframes
    pub fn has_animations(&self) -> bool {
        !self.keyframes.is_empty()
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> f64 {
        self.keyframes.iter().map(|k| k.time).fold(0.0, f64::max)
    }

    /// Flip visibility
    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
    }

    /// Flip lock
    pub fn toggle_lock(&mut self) {
        self.locked = !self.locked;
    }

    /// Flip expansion
    pub fn toggle_expansion(&mut self) {
        self.expanded = !self.expanded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropertyValue;

    fn track() -> AnimationTrack {
        AnimationTrack::new(ElementId::new("e"))
    }

    fn width_at(time: f64, value: f64) -> Keyframe {
        Keyframe::new(ElementId::new("e"), time, PropertyValue::Width(value))
    }

    #[test]
    fn test_new_track_flags() {
        let t = track();
        assert!(t.visible);
        assert!(!t.locked);
        assert!(t.expanded);
        assert!(!t.has_animations());
    }

    #[test]
    fn test_add_keeps_time_order_and_tie_order() {
        let mut t = track();
        t.add_keyframe(width_at(2.0, 1.0));
        let first_tie = t.add_keyframe(width_at(1.0, 2.0));
        let second_tie = t.add_keyframe(width_at(1.0, 3.0));
        t.add_keyframe(width_at(0.0, 4.0));

        let times: Vec<f64> = t.keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 1.0, 2.0]);
        assert_eq!(t.keyframes[1].id, first_tie);
        assert_eq!(t.keyframes[2].id, second_tie);
    }

    #[test]
    fn test_keyframes_for_resorts_stale_order() {
        let mut t = track();
        let a = t.add_keyframe(width_at(0.0, 1.0));
        t.add_keyframe(width_at(1.0, 2.0));
        // Bypass the store's re-sort
        t.keyframe_mut(a).unwrap().time = 5.0;

        let times: Vec<f64> = t.keyframes_for(AnimationProperty::Width).iter().map(|k| k.time).collect();
        assert_eq!(times, vec![1.0, 5.0]);
    }

    #[test]
    fn test_remove_keeps_empty_track() {
        let mut t = track();
        let id = t.add_keyframe(width_at(0.0, 1.0));
        assert!(t.remove_keyframe(id).is_some());
        assert!(t.remove_keyframe(id).is_none());
        assert_eq!(t.keyframe_count(), 0);
    }

    #[test]
    fn test_animated_properties() {
        let mut t = track();
        t.add_keyframe(Keyframe::new(ElementId::new("e"), 0.0, PropertyValue::Opacity(0.0)));
        t.add_keyframe(width_at(0.0, 1.0));
        assert_eq!(
            t.animated_properties(),
            vec![AnimationProperty::Width, AnimationProperty::Opacity]
        );
    }

    #[test]
    fn test_malformed_keyframes_dropped_on_load() {
        let json = r#"{
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "elementId": "e",
            "keyframes": [
                {"time": 0, "elementId": "e", "property": "opacity", "value": 1},
                {"time": 1, "elementId": "e", "property": "opacity", "value": {"x": 1, "y": 0}},
                {"time": 2, "elementId": "e", "property": "sparkle", "value": 3}
            ],
            "visible": false, "locked": true, "expanded": false
        }"#;
        let t: AnimationTrack = serde_json::from_str(json).unwrap();
        assert_eq!(t.keyframe_count(), 1);
        assert!(!t.visible);
        assert!(t.locked);
    }
}
