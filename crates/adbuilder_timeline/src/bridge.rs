// SPDX-License-Identifier: MIT OR Apache-2.0
//! Native animation bridge.
//!
//! Turns the keyframes ahead of the playhead into absolute-offset tween
//! schedules and hands them to an [`AnimationHost`]. Schedules are owned
//! snapshots: editing tracks after `play()` does not touch them.

use crate::easing::Easing;
use crate::element::{Element, ElementId, VisualState};
use crate::sampler::{sample_visual_state, track_for};
use crate::track::AnimationTrack;
use crate::value::{AnimationProperty, PropertyValue};
use indexmap::IndexSet;

/// The animation engine that owns visual state while playback runs
pub trait AnimationHost {
    /// Whether the element's render node exists
    fn is_attached(&self, element: &ElementId) -> bool;

    /// Write visual attributes immediately
    fn apply(&mut self, element: &ElementId, state: &VisualState);

    /// Start running a schedule. Replaces any schedule already running for
    /// the same element.
    fn start(&mut self, schedule: ElementSchedule);

    /// Drop every scheduled and in-flight tween of an element. No tween of
    /// that element may write state after this returns.
    fn cancel(&mut self, element: &ElementId);

    /// Current visual attributes of an element
    fn live_state(&self, element: &ElementId) -> Option<VisualState>;
}

/// One segment of a property animation.
///
/// `from`/`to` are the full keyframe interval. A segment that begins
/// mid-interval starts at `progress_start`, so the eased curve is the same
/// one the sampler walks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Animated property
    pub property: AnimationProperty,
    /// Value at the start of the keyframe interval
    pub from: PropertyValue,
    /// Value at the end of the keyframe interval
    pub to: PropertyValue,
    /// Easing of the interval
    pub easing: Easing,
    /// Start, in ms after the schedule starts
    pub start_offset_ms: f64,
    /// Length in ms
    pub duration_ms: f64,
    /// Interval progress at `start_offset_ms`, in `[0, 1)`
    pub progress_start: f64,
}

impl Tween {
    /// End, in ms after the schedule starts
    pub fn end_offset_ms(&self) -> f64 {
        self.start_offset_ms + self.duration_ms
    }

    /// Value after `elapsed_ms` of schedule time; holds `to` once finished
    pub fn value_at(&self, elapsed_ms: f64) -> PropertyValue {
        let local = if self.duration_ms > 0.0 {
            ((elapsed_ms - self.start_offset_ms) / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let progress = self.progress_start + (1.0 - self.progress_start) * local;
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    /// Value the tween starts from
    pub fn initial_value(&self) -> PropertyValue {
        self.from.lerp(&self.to, self.easing.apply(self.progress_start))
    }
}

/// Every tween of one element, snapshotted when playback (re)starts
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSchedule {
    /// Target element
    pub element_id: ElementId,
    /// Tweens grouped by property, each group in time order
    pub tweens: Vec<Tween>,
}

impl ElementSchedule {
    /// Tweens of one property
    pub fn tweens_for(&self, property: AnimationProperty) -> impl Iterator<Item = &Tween> {
        self.tweens.iter().filter(move |t| t.property == property)
    }

    /// Value of a property after `elapsed_ms`, `None` if it is not animated.
    ///
    /// The latest tween that has started wins; before the first one starts
    /// its initial value holds.
    pub fn value_at(&self, property: AnimationProperty, elapsed_ms: f64) -> Option<PropertyValue> {
        let mut current: Option<&Tween> = None;
        for tween in self.tweens_for(property) {
            if current.is_none() || tween.start_offset_ms <= elapsed_ms {
                current = Some(tween);
            }
        }
        current.map(|t| {
            if elapsed_ms < t.start_offset_ms {
                t.initial_value()
            } else {
                t.value_at(elapsed_ms)
            }
        })
    }

    /// Time at which the last tween finishes
    pub fn end_offset_ms(&self) -> f64 {
        self.tweens.iter().map(Tween::end_offset_ms).fold(0.0, f64::max)
    }

    /// Whether there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

/// Build the tween chain for one property.
///
/// Only keyframes strictly after `now` produce tweens. The segment that
/// contains `now` is clipped so that it starts at offset 0.
pub fn property_tweens(
    track: &AnimationTrack,
    property: AnimationProperty,
    now: f64,
    speed: f64,
) -> Vec<Tween> {
    let keyframes = track.keyframes_for(property);
    let first_future = keyframes.partition_point(|k| k.time <= now);
    let to_ms = |seconds: f64| seconds / speed * 1000.0;

    (first_future..keyframes.len())
        .map(|i| {
            let b = keyframes[i];
            match i.checked_sub(1).map(|prev| keyframes[prev]) {
                // Nothing before the first keyframe: hold its value until it is reached
                None => Tween {
                    property,
                    from: b.value,
                    to: b.value,
                    easing: b.easing,
                    start_offset_ms: 0.0,
                    duration_ms: to_ms(b.time - now),
                    progress_start: 0.0,
                },
                Some(a) => {
                    let segment_start = a.time.max(now);
                    let gap = b.time - a.time;
                    let progress_start = if gap > 0.0 { (segment_start - a.time) / gap } else { 0.0 };
                    Tween {
                        property,
                        from: a.value,
                        to: b.value,
                        easing: b.easing,
                        start_offset_ms: to_ms(segment_start - now),
                        duration_ms: to_ms(b.time - segment_start),
                        progress_start,
                    }
                }
            }
        })
        .collect()
}

/// Build the schedule of one element from `now` at `speed`
pub fn build_schedule(track: &AnimationTrack, now: f64, speed: f64) -> ElementSchedule {
    let tweens = AnimationProperty::ALL
        .into_iter()
        .flat_map(|property| property_tweens(track, property, now, speed))
        .collect();
    ElementSchedule {
        element_id: track.element_id.clone(),
        tweens,
    }
}

/// Hands schedules to a host and remembers which elements it animates
#[derive(Debug, Default)]
pub struct NativeBridge {
    active: IndexSet<ElementId>,
}

impl NativeBridge {
    /// Create a bridge with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Snap every animated element to its `now` sample and start its
    /// schedule. Returns the number of schedules started.
    ///
    /// Detached elements are skipped. Nothing is scheduled for a speed that
    /// is not a positive finite number.
    pub fn schedule_all<H: AnimationHost>(
        &mut self,
        host: &mut H,
        elements: &[Element],
        tracks: &[AnimationTrack],
        now: f64,
        speed: f64,
    ) -> usize {
        let speed_ok = speed.is_finite() && speed > 0.0;
        if !speed_ok {
            tracing::warn!("Not scheduling native playback at speed {}", speed);
        }

        let mut started = 0;
        for element in elements {
            let Some(track) = track_for(tracks, element).filter(|t| t.has_animations()) else {
                continue;
            };
            if !host.is_attached(&element.id) {
                tracing::debug!("Skipping detached element {}", element.id);
                continue;
            }

            host.apply(&element.id, &sample_visual_state(element, now, tracks));
            if !speed_ok {
                continue;
            }

            let schedule = build_schedule(track, now, speed);
            if schedule.is_empty() {
                continue;
            }
            tracing::debug!(
                "Scheduling {} tweens for {} ({:.0} ms)",
                schedule.tweens.len(),
                element.id,
                schedule.end_offset_ms()
            );
            host.start(schedule);
            self.active.insert(element.id.clone());
            started += 1;
        }
        started
    }

    /// Cancel one element's schedule
    pub fn cancel_element<H: AnimationHost>(&mut self, host: &mut H, element: &ElementId) {
        if self.active.shift_remove(element) {
            host.cancel(element);
        }
    }

    /// Cancel every schedule this bridge started
    pub fn cancel_all<H: AnimationHost>(&mut self, host: &mut H) {
        for element in self.active.drain(..) {
            host.cancel(&element);
        }
    }

    /// Whether the bridge has a running schedule for an element
    pub fn is_active(&self, element: &ElementId) -> bool {
        self.active.contains(element)
    }

    /// Elements with running schedules, in scheduling order
    pub fn active_elements(&self) -> impl Iterator<Item = &ElementId> {
        self.active.iter()
    }
}
