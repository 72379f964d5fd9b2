// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static keyframe-table export.
//!
//! Maps keyframe times to percentages of the timeline and samples the
//! element at each stop, so a CSS animation walks the same curve as the
//! sampler.

use crate::element::{Element, VisualState};
use crate::sampler::{sample_visual_state, track_for};
use crate::timeline::{TimelineState, MIN_DURATION};
use crate::track::AnimationTrack;
use std::fmt::Write as _;

/// Times closer than this collapse into one stop
const STOP_EPSILON: f64 = 1e-9;

/// One stop of a keyframe table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeStop {
    /// Position in the animation, 0..=100
    pub percent: f64,
    /// Timeline time in seconds
    pub time: f64,
    /// Sampled attributes at `time`
    pub state: VisualState,
}

/// Percentage table for one element
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTable {
    /// Timeline length the percentages refer to
    pub duration: f64,
    /// Stops in ascending order, always including 0% and 100%
    pub stops: Vec<KeyframeStop>,
}

impl KeyframeTable {
    /// Build the table of an element.
    ///
    /// Every keyframe inside `[0, duration]` becomes a stop. Each gap
    /// between stops is split into `samples_per_segment` equal parts so
    /// curves CSS cannot express (bounce, elastic) survive export.
    pub fn build(element: &Element, tracks: &[AnimationTrack], duration: f64, samples_per_segment: usize) -> Self {
        let duration = if duration.is_finite() { duration.max(MIN_DURATION) } else { MIN_DURATION };

        let mut breakpoints = vec![0.0, duration];
        if let Some(track) = track_for(tracks, element) {
            breakpoints.extend(
                track
                    .keyframes
                    .iter()
                    .map(|k| k.time)
                    .filter(|t| (0.0..=duration).contains(t)),
            );
        }
        sort_dedup(&mut breakpoints);

        let parts = samples_per_segment.max(1);
        let mut times = Vec::with_capacity(breakpoints.len() * parts);
        for pair in breakpoints.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            for i in 0..parts {
                times.push(start + (end - start) * i as f64 / parts as f64);
            }
        }
        times.push(duration);
        sort_dedup(&mut times);

        let stops = times
            .into_iter()
            .map(|time| KeyframeStop {
                percent: time / duration * 100.0,
                time,
                state: sample_visual_state(element, time, tracks),
            })
            .collect();

        Self { duration, stops }
    }

    /// Render as a CSS `@keyframes` block.
    ///
    /// Width and height are unscaled; scale goes into `transform`, which
    /// expects `transform-origin: 0 0` like [`css_rule`] sets.
    pub fn to_css(&self, name: &str) -> String {
        let mut css = String::new();
        let _ = writeln!(css, "@keyframes {} {{", name);
        for stop in &self.stops {
            let s = &stop.state;
            let _ = writeln!(
                css,
                "  {:.2}% {{ left: {:.2}px; top: {:.2}px; width: {:.2}px; height: {:.2}px; opacity: {:.3}; transform: rotate({:.2}deg) scale({:.3}); }}",
                stop.percent, s.x, s.y, s.width, s.height, s.opacity, s.rotation, s.scale
            );
        }
        css.push_str("}\n");
        css
    }
}

fn sort_dedup(times: &mut Vec<f64>) {
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() < STOP_EPSILON);
}

/// Animation name derived from an element ID, safe as a CSS identifier
pub fn animation_name(element: &Element) -> String {
    let id: String = element
        .id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!("anim-{}", id)
}

/// ID selector matching the element's DOM node, with the ID CSS-escaped
pub fn element_selector(element: &Element) -> String {
    let mut selector = String::from("#");
    for (i, c) in element.id.as_str().chars().enumerate() {
        match c {
            '\0' => selector.push('\u{FFFD}'),
            c if c.is_ascii_control() => selector.push_str(&format!("\\{:x} ", c as u32)),
            '0'..='9' if i == 0 => selector.push_str(&format!("\\{:x} ", c as u32)),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => selector.push(c),
            c => {
                selector.push('\\');
                selector.push(c);
            }
        }
    }
    selector
}

/// CSS rule attaching an animation to an element selector
pub fn css_rule(selector: &str, name: &str, duration: f64, looping: bool) -> String {
    let iterations = if looping { "infinite" } else { "1 forwards" };
    format!(
        "{} {{ position: absolute; transform-origin: 0 0; animation: {} {:.3}s linear {}; }}\n",
        selector, name, duration, iterations
    )
}

/// Stylesheet for every animated element of a document
pub fn export_css(elements: &[Element], state: &TimelineState, samples_per_segment: usize) -> String {
    let mut css = String::new();
    for element in elements {
        if !state.has_animations(&element.id) {
            continue;
        }
        let table = KeyframeTable::build(element, &state.tracks, state.duration, samples_per_segment);
        let name = animation_name(element);
        css.push_str(&table.to_css(&name));
        css.push_str(&css_rule(&element_selector(element), &name, table.duration, state.looping));
    }
    css
}
