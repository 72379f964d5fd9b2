// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved ad documents: elements plus their timeline.

use crate::error::{PreviewError, Result};
use adbuilder_timeline::{AnimationProperty, Easing, Element, Point, PropertyValue, TimelineState};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved document as the editor writes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,
    /// Canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,
    /// Elements in paint order
    pub elements: Vec<Element>,
    /// Animation timeline
    #[serde(default)]
    pub timeline: TimelineState,
}

fn default_canvas_width() -> f64 {
    300.0
}

fn default_canvas_height() -> f64 {
    250.0
}

impl Document {
    /// Read a document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PreviewError::io(path, e))?;
        Self::from_json(&content).map_err(|source| PreviewError::Document {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a document. Playback state is never restored.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        document.timeline.is_playing = false;
        Ok(document)
    }

    /// Write a document as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| PreviewError::Document {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|e| PreviewError::io(path, e))
    }

    /// Built-in 300x250 banner used when no document is given
    pub fn demo() -> Self {
        let mut headline = Element::text("headline", "Summer Sale");
        headline.x = 20.0;
        headline.y = 30.0;
        let mut cta = Element::button("cta", "Shop now");
        cta.x = 70.0;
        cta.y = 170.0;
        let mut hero = Element::image("hero", "hero.png");
        hero.x = 180.0;
        hero.y = 60.0;
        hero.width = 100.0;
        hero.height = 100.0;

        let mut timeline = TimelineState::with_duration(4.0);
        timeline.looping = true;

        let h = &headline.id;
        timeline.insert_keyframe(h, 0.0, PropertyValue::Position(Point::new(-220.0, 30.0)), Easing::Linear);
        timeline.insert_keyframe(h, 1.0, PropertyValue::Position(Point::new(20.0, 30.0)), Easing::EaseOut);
        timeline.insert_keyframe(h, 0.0, PropertyValue::Opacity(0.0), Easing::Linear);
        timeline.insert_keyframe(h, 0.8, PropertyValue::Opacity(1.0), Easing::Ease);

        let c = &cta.id;
        timeline.insert_keyframe(c, 1.0, PropertyValue::Scale(0.5), Easing::Linear);
        timeline.insert_keyframe(c, 1.8, PropertyValue::Scale(1.0), Easing::Elastic);

        let i = &hero.id;
        timeline.insert_keyframe(i, 0.5, PropertyValue::Position(Point::new(180.0, -120.0)), Easing::Linear);
        timeline.insert_keyframe(i, 1.6, PropertyValue::Position(Point::new(180.0, 60.0)), Easing::Bounce);
        timeline.insert_keyframe(i, 2.5, PropertyValue::Rotation(0.0), Easing::Linear);
        timeline.insert_keyframe(i, 3.5, PropertyValue::Rotation(360.0), Easing::EaseInOut);

        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            elements: vec![headline, cta, hero],
            timeline,
        }
    }

    /// Number of elements with at least one keyframe
    pub fn animated_element_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| self.timeline.has_animations(&e.id))
            .count()
    }

    /// Properties animated on each element, for the run summary
    pub fn animation_summary(&self) -> Vec<(String, Vec<AnimationProperty>)> {
        self.elements
            .iter()
            .filter(|e| self.timeline.has_animations(&e.id))
            .map(|e| (e.id.to_string(), self.timeline.animated_properties(&e.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_round_trips_through_json() {
        let demo = Document::demo();
        let json = serde_json::to_string(&demo).unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, demo);
        assert_eq!(loaded.animated_element_count(), 3);
    }

    #[test]
    fn test_minimal_document() {
        let json = r#"{"elements":[{"id":"t","type":"text","text":"Hi","fontSize":20,"x":0,"y":0,"width":50,"height":20}]}"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.timeline, TimelineState::new());
        assert_eq!(doc.canvas_width, 300.0);
    }

    #[test]
    fn test_playing_flag_is_cleared() {
        let mut demo = Document::demo();
        demo.timeline.is_playing = true;
        let json = serde_json::to_string(&demo).unwrap();
        assert!(!Document::from_json(&json).unwrap().timeline.is_playing);
    }

    #[test]
    fn test_summary_lists_animated_properties() {
        let summary = Document::demo().animation_summary();
        assert_eq!(summary[0].0, "headline");
        assert_eq!(summary[0].1, vec![AnimationProperty::Position, AnimationProperty::Opacity]);
    }
}
