// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scrub-mode sampling.
//!
//! Pure functions of `(element, time, tracks)`. They are called every frame
//! while scrubbing and when playback pauses, so they never accumulate state.
//!
//! Duplicate keyframe times: order is re-derived with a stable sort on every
//! call. At or before the first time the first keyframe wins; at an interior
//! time shared by several keyframes the last one in insertion order wins.

use crate::element::{Element, VisualState};
use crate::track::AnimationTrack;
use crate::value::{AnimationProperty, PropertyValue};

/// Sample one property of a track at time `t`.
///
/// `rest` is returned untouched when there is no track or the track has no
/// keyframes for `property`.
pub fn sample_property(
    track: Option<&AnimationTrack>,
    property: AnimationProperty,
    t: f64,
    rest: PropertyValue,
) -> PropertyValue {
    let Some(track) = track else {
        return rest;
    };
    let keyframes = track.keyframes_for(property);
    let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
        return rest;
    };

    if t.is_nan() || t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    let next = keyframes.partition_point(|k| k.time <= t);
    if next == 0 {
        return first.value;
    }
    let Some(b) = keyframes.get(next) else {
        return last.value;
    };
    let a = keyframes[next - 1];

    let gap = b.time - a.time;
    let progress = if gap > 0.0 { (t - a.time) / gap } else { 0.0 };
    a.value.lerp(&b.value, b.easing.apply(progress))
}

/// Find the track animating an element
pub fn track_for<'a>(tracks: &'a [AnimationTrack], element: &Element) -> Option<&'a AnimationTrack> {
    tracks.iter().find(|t| t.element_id == element.id)
}

/// Sample every property of an element. Scale is kept separate from size.
pub fn sample_visual_state(element: &Element, t: f64, tracks: &[AnimationTrack]) -> VisualState {
    let track = track_for(tracks, element);
    let mut state = element.rest_state();
    for property in AnimationProperty::ALL {
        let rest = state.get(property);
        state.set(sample_property(track, property, t, rest));
    }
    state
}

/// Copy of `element` with its animated attributes at time `t`.
///
/// Width and height are sampled first and then multiplied by the sampled
/// scale, so size and scale keyframes compose.
pub fn sample_element(element: &Element, t: f64, tracks: &[AnimationTrack]) -> Element {
    sample_visual_state(element, t, tracks).apply_to(element)
}

/// Sample a whole document
pub fn sample_elements(elements: &[Element], t: f64, tracks: &[AnimationTrack]) -> Vec<Element> {
    elements.iter().map(|e| sample_element(e, t, tracks)).collect()
}
