// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline state and the keyframe store.
//!
//! `TimelineState` is owned by the document session. Every edit goes through
//! the methods here; the sampler and the playback driver only borrow it.

use crate::easing::Easing;
use crate::element::ElementId;
use crate::error::{Result, TimelineError};
use crate::keyframe::{Keyframe, KeyframeId, KeyframePatch};
use crate::track::{AnimationTrack, TrackId};
use crate::value::{AnimationProperty, AnimationValue, PropertyValue};
use serde::{Deserialize, Serialize};

/// Timeline length of a new document, in seconds
pub const DEFAULT_DURATION: f64 = 10.0;

/// Shortest allowed timeline, in seconds
pub const MIN_DURATION: f64 = 1.0;

/// Per-document timeline state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineState {
    /// Playhead position in seconds
    pub current_time: f64,
    /// Timeline length in seconds
    pub duration: f64,
    /// Whether playback is running
    pub is_playing: bool,
    /// Playback speed multiplier
    pub playback_speed: f64,
    /// Whether playback wraps at the end
    #[serde(rename = "loop")]
    pub looping: bool,
    /// One track per animated element
    pub tracks: Vec<AnimationTrack>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineState {
    /// Fresh timeline: playhead at 0, 10 s long, paused
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_DURATION)
    }

    /// Fresh timeline with a given length
    pub fn with_duration(duration: f64) -> Self {
        Self {
            current_time: 0.0,
            duration: duration.max(MIN_DURATION),
            is_playing: false,
            playback_speed: 1.0,
            looping: false,
            tracks: Vec::new(),
        }
    }

    /// Reset to the defaults of a new document
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ---- Tracks ----

    /// Create a track for an element. No-op if one already exists.
    pub fn create_track(&mut self, element_id: &ElementId) -> TrackId {
        if let Some(track) = self.track_for(element_id) {
            return track.id;
        }
        let track = AnimationTrack::new(element_id.clone());
        let id = track.id;
        tracing::debug!("Created track {:?} for element {}", id, element_id);
        self.tracks.push(track);
        id
    }

    /// Remove an element's track entirely
    pub fn remove_track(&mut self, element_id: &ElementId) -> Option<AnimationTrack> {
        let idx = self.tracks.iter().position(|t| &t.element_id == element_id)?;
        Some(self.tracks.remove(idx))
    }

    /// Track of an element
    pub fn track_for(&self, element_id: &ElementId) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| &t.element_id == element_id)
    }

    /// Track by ID
    pub fn track(&self, track_id: TrackId) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    fn track_mut(&mut self, track_id: TrackId) -> Result<&mut AnimationTrack> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))
    }

    /// Flip a track's visibility flag
    pub fn toggle_visibility(&mut self, track_id: TrackId) -> Result<()> {
        self.track_mut(track_id)?.toggle_visibility();
        Ok(())
    }

    /// Flip a track's lock flag
    pub fn toggle_lock(&mut self, track_id: TrackId) -> Result<()> {
        self.track_mut(track_id)?.toggle_lock();
        Ok(())
    }

    /// Flip a track's expansion flag
    pub fn toggle_expansion(&mut self, track_id: TrackId) -> Result<()> {
        self.track_mut(track_id)?.toggle_expansion();
        Ok(())
    }

    // ---- Keyframes ----

    /// Add a keyframe, creating the element's track if needed.
    ///
    /// `time` is stored as given; clamping it to the timeline is the
    /// caller's job. Keyframes at an identical time are all kept.
    pub fn add_keyframe(
        &mut self,
        element_id: &ElementId,
        property: AnimationProperty,
        time: f64,
        value: AnimationValue,
    ) -> Result<KeyframeId> {
        let value = PropertyValue::new(property, value)?;
        Ok(self.insert_keyframe(element_id, time, value, Easing::default()))
    }

    /// Typed form of [`add_keyframe`](Self::add_keyframe)
    pub fn insert_keyframe(
        &mut self,
        element_id: &ElementId,
        time: f64,
        value: PropertyValue,
        easing: Easing,
    ) -> KeyframeId {
        let idx = match self.tracks.iter().position(|t| &t.element_id == element_id) {
            Some(idx) => idx,
            None => {
                self.create_track(element_id);
                self.tracks.len() - 1
            }
        };
        tracing::debug!(
            "Adding {} keyframe for {} at {:.3}s",
            value.property(),
            element_id,
            time
        );
        let keyframe = Keyframe::new(element_id.clone(), time, value).with_easing(easing);
        self.tracks[idx].add_keyframe(keyframe)
    }

    /// Merge a patch into a keyframe, wherever it lives.
    ///
    /// A patch that moves the keyframe in time re-sorts its track.
    pub fn update_keyframe(&mut self, keyframe_id: KeyframeId, patch: &KeyframePatch) -> Result<()> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.keyframe(keyframe_id).is_some())
            .ok_or(TimelineError::KeyframeNotFound(keyframe_id))?;
        if let Some(keyframe) = track.keyframe_mut(keyframe_id) {
            keyframe.apply_patch(patch)?;
        }
        if patch.time.is_some() {
            track.sort_keyframes();
        }
        Ok(())
    }

    /// Remove a keyframe. Its track is kept even if it becomes empty.
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) -> Result<Keyframe> {
        self.tracks
            .iter_mut()
            .find_map(|t| t.remove_keyframe(keyframe_id))
            .ok_or(TimelineError::KeyframeNotFound(keyframe_id))
    }

    /// Find a keyframe in any track
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.tracks.iter().find_map(|t| t.keyframe(keyframe_id))
    }

    /// Whether an element has at least one keyframe
    pub fn has_animations(&self, element_id: &ElementId) -> bool {
        self.track_for(element_id).is_some_and(AnimationTrack::has_animations)
    }

    /// Properties of an element that have keyframes
    pub fn animated_properties(&self, element_id: &ElementId) -> Vec<AnimationProperty> {
        self.track_for(element_id)
            .map(AnimationTrack::animated_properties)
            .unwrap_or_default()
    }

    // ---- Transport settings ----

    /// Move the playhead, clamped to `[0, duration]`
    pub fn seek(&mut self, time: f64) {
        self.current_time = clamp_time(time, self.duration);
    }

    /// Set the timeline length, at least one second.
    ///
    /// Keyframes past the new end are kept but become unreachable.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration.max(MIN_DURATION) } else { self.duration };
        self.current_time = self.current_time.min(self.duration);
    }

    /// Set the playback speed multiplier as given
    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback_speed = speed;
    }

    /// Flip looping
    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
    }

    /// Latest keyframe time across all tracks
    pub fn content_duration(&self) -> f64 {
        self.tracks.iter().map(AnimationTrack::end_time).fold(0.0, f64::max)
    }

    // ---- Persistence ----

    /// Serialize to the document JSON layout
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from the document JSON layout. Playback is never restored.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(json)?;
        Ok(state.into_loaded())
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load from RON. Playback is never restored.
    pub fn from_ron(ron_str: &str) -> Result<Self> {
        let state: Self = ron::from_str(ron_str)?;
        Ok(state.into_loaded())
    }

    /// Normalize freshly deserialized state
    pub(crate) fn into_loaded(mut self) -> Self {
        self.is_playing = false;
        if !self.duration.is_finite() || self.duration < MIN_DURATION {
            self.duration = MIN_DURATION;
        }
        self.current_time = clamp_time(self.current_time, self.duration);
        self.tracks = merge_duplicate_tracks(std::mem::take(&mut self.tracks));
        for track in &mut self.tracks {
            track.sort_keyframes();
        }
        self
    }
}

/// Fold later tracks of an element into its first one, keeping keyframe
/// insertion order so the stable sort decides ties as before
fn merge_duplicate_tracks(tracks: Vec<AnimationTrack>) -> Vec<AnimationTrack> {
    let mut merged: Vec<AnimationTrack> = Vec::with_capacity(tracks.len());
    for track in tracks {
        match merged.iter_mut().find(|t| t.element_id == track.element_id) {
            Some(first) => {
                tracing::warn!(
                    "Merging duplicate track {:?} into {:?} for {}",
                    track.id,
                    first.id,
                    track.element_id
                );
                first.keyframes.extend(track.keyframes);
            }
            None => merged.push(track),
        }
    }
    merged
}

fn clamp_time(time: f64, duration: f64) -> f64 {
    if time.is_nan() {
        0.0
    } else {
        time.clamp(0.0, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Point;

    fn el(id: &str) -> ElementId {
        ElementId::new(id)
    }

    #[test]
    fn test_defaults() {
        let state = TimelineState::new();
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 10.0);
        assert!(!state.is_playing);
        assert_eq!(state.playback_speed, 1.0);
        assert!(!state.looping);
        assert!(state.tracks.is_empty());
    }

    #[test]
    fn test_create_track_is_idempotent() {
        let mut state = TimelineState::new();
        let first = state.create_track(&el("a"));
        state
            .add_keyframe(&el("a"), AnimationProperty::Width, 1.0, 50.0.into())
            .unwrap();
        let second = state.create_track(&el("a"));

        assert_eq!(first, second);
        assert_eq!(state.tracks.len(), 1);
        assert_eq!(state.tracks[0].keyframe_count(), 1);
    }

    #[test]
    fn test_add_keyframe_auto_creates_track_and_keeps_duplicates() {
        let mut state = TimelineState::new();
        state.add_keyframe(&el("a"), AnimationProperty::Opacity, 1.0, 0.5.into()).unwrap();
        state.add_keyframe(&el("a"), AnimationProperty::Opacity, 1.0, 0.7.into()).unwrap();
        assert_eq!(state.tracks.len(), 1);
        assert_eq!(state.tracks[0].keyframe_count(), 2);
    }

    #[test]
    fn test_add_keyframe_does_not_clamp() {
        let mut state = TimelineState::with_duration(2.0);
        let id = state.add_keyframe(&el("a"), AnimationProperty::Rotation, 7.5, 90.0.into()).unwrap();
        assert_eq!(state.keyframe(id).unwrap().time, 7.5);
    }

    #[test]
    fn test_add_keyframe_rejects_wrong_shape() {
        let mut state = TimelineState::new();
        let result = state.add_keyframe(&el("a"), AnimationProperty::Width, 0.0, Point::new(1.0, 1.0).into());
        assert!(matches!(result, Err(TimelineError::MalformedValue { .. })));
        assert!(state.tracks.is_empty());
    }

    #[test]
    fn test_update_time_resorts_track() {
        let mut state = TimelineState::new();
        let a = state.add_keyframe(&el("a"), AnimationProperty::Width, 0.0, 1.0.into()).unwrap();
        let b = state.add_keyframe(&el("a"), AnimationProperty::Width, 1.0, 2.0.into()).unwrap();

        state.update_keyframe(a, &KeyframePatch::time(3.0)).unwrap();
        let order: Vec<KeyframeId> = state.tracks[0].keyframes.iter().map(|k| k.id).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn test_update_missing_keyframe_is_not_found() {
        let mut state = TimelineState::new();
        let err = state.update_keyframe(KeyframeId::new(), &KeyframePatch::time(1.0)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_keyframe_keeps_track() {
        let mut state = TimelineState::new();
        let id = state.add_keyframe(&el("a"), AnimationProperty::Height, 0.0, 10.0.into()).unwrap();
        state.remove_keyframe(id).unwrap();
        assert_eq!(state.tracks.len(), 1);
        assert!(!state.has_animations(&el("a")));
        assert!(state.remove_keyframe(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_toggles() {
        let mut state = TimelineState::new();
        let id = state.create_track(&el("a"));
        state.toggle_visibility(id).unwrap();
        state.toggle_lock(id).unwrap();
        state.toggle_expansion(id).unwrap();
        let track = state.track(id).unwrap();
        assert!(!track.visible && track.locked && !track.expanded);
        assert!(state.toggle_lock(TrackId::new()).is_err());
    }

    #[test]
    fn test_seek_and_duration_clamping() {
        let mut state = TimelineState::new();
        state.seek(-3.0);
        assert_eq!(state.current_time, 0.0);
        state.seek(42.0);
        assert_eq!(state.current_time, 10.0);

        state.set_duration(0.2);
        assert_eq!(state.duration, 1.0);
        assert_eq!(state.current_time, 1.0);
    }

    #[test]
    fn test_json_layout_and_load_forces_paused() {
        let mut state = TimelineState::new();
        state.add_keyframe(&el("a"), AnimationProperty::Position, 0.0, Point::new(1.0, 2.0).into()).unwrap();
        state.is_playing = true;
        state.looping = true;

        let json = state.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["loop"], true);
        assert_eq!(value["isPlaying"], true);
        assert_eq!(value["tracks"][0]["keyframes"][0]["property"], "position");

        let loaded = TimelineState::from_json(&json).unwrap();
        assert!(!loaded.is_playing);
        assert!(loaded.looping);
        assert_eq!(loaded.tracks, state.tracks);
    }

    #[test]
    fn test_ron_snapshot() {
        let mut state = TimelineState::new();
        state.add_keyframe(&el("a"), AnimationProperty::Scale, 1.0, 1.5.into()).unwrap();
        let ron_str = state.to_ron().unwrap();
        let loaded = TimelineState::from_ron(&ron_str).unwrap();
        assert_eq!(loaded.tracks, state.tracks);
    }

    #[test]
    fn test_load_merges_tracks_of_the_same_element() {
        let json = r#"{
            "duration": 5,
            "tracks": [
                {"elementId": "a", "keyframes": [
                    {"time": 1, "elementId": "a", "property": "width", "value": 80}
                ]},
                {"elementId": "b", "keyframes": []},
                {"elementId": "a", "keyframes": [
                    {"time": 0, "elementId": "a", "property": "opacity", "value": 0.25}
                ]}
            ]
        }"#;
        let state = TimelineState::from_json(json).unwrap();

        assert_eq!(state.tracks.len(), 2);
        assert_eq!(state.tracks[0].element_id, el("a"));
        assert_eq!(state.tracks[1].element_id, el("b"));
        assert_eq!(
            state.animated_properties(&el("a")),
            vec![AnimationProperty::Width, AnimationProperty::Opacity]
        );
        let times: Vec<f64> = state.tracks[0].keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0]);
    }
}
