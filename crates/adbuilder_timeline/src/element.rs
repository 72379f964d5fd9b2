// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document elements as seen by the animation engine.
//!
//! Elements are owned by the document. The engine only reads their id and
//! rest-state geometry; the type-specific payload is carried through
//! untouched.

use crate::value::{AnimationProperty, Point, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque element identifier, stable for the element's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Type-specific element payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    /// Text block
    Text {
        /// Text content
        text: String,
        /// Font size in pixels
        font_size: f64,
        /// Font family
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_family: Option<String>,
        /// Fill color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<String>,
    },
    /// Image
    Image {
        /// Image source (URL or data URL)
        src: String,
        /// Fit mode (`cover`, `contain`, `stretch`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_fit: Option<String>,
    },
    /// Clickable button
    Button {
        /// Button label
        label: String,
        /// Click-through URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
        /// Background color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<String>,
        /// Label color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_color: Option<String>,
    },
}

/// A visual element with rest-state geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element ID
    pub id: ElementId,
    /// Type-specific payload
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Opacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Element {
    /// Create an element with default rotation and opacity
    pub fn new(id: impl Into<ElementId>, kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            width,
            height,
            rotation: None,
            opacity: None,
        }
    }

    /// Create a text element
    pub fn text(id: impl Into<ElementId>, text: impl Into<String>) -> Self {
        Self::new(
            id,
            ElementKind::Text {
                text: text.into(),
                font_size: 28.0,
                font_family: None,
                fill: Some("#111".to_string()),
            },
            40.0,
            40.0,
            200.0,
            60.0,
        )
    }

    /// Create an image element
    pub fn image(id: impl Into<ElementId>, src: impl Into<String>) -> Self {
        Self::new(
            id,
            ElementKind::Image { src: src.into(), image_fit: None },
            40.0,
            40.0,
            200.0,
            60.0,
        )
    }

    /// Create a button element
    pub fn button(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self::new(
            id,
            ElementKind::Button {
                label: label.into(),
                href: None,
                fill: Some("#2563eb".to_string()),
                text_color: Some("#fff".to_string()),
            },
            40.0,
            40.0,
            160.0,
            48.0,
        )
    }

    /// Rest-state value of a property (used when it has no keyframes)
    pub fn rest_value(&self, property: AnimationProperty) -> PropertyValue {
        self.rest_state().get(property)
    }

    /// Rest-state visual attributes
    pub fn rest_state(&self) -> VisualState {
        VisualState {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation.unwrap_or(0.0),
            opacity: self.opacity.unwrap_or(1.0),
            scale: 1.0,
        }
    }
}

/// The attributes the renderer writes for an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Unscaled width
    pub width: f64,
    /// Unscaled height
    pub height: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Opacity
    pub opacity: f64,
    /// Uniform scale multiplier
    pub scale: f64,
}

impl VisualState {
    /// Read one property
    pub fn get(&self, property: AnimationProperty) -> PropertyValue {
        match property {
            AnimationProperty::Position => PropertyValue::Position(Point::new(self.x, self.y)),
            AnimationProperty::Width => PropertyValue::Width(self.width),
            AnimationProperty::Height => PropertyValue::Height(self.height),
            AnimationProperty::Rotation => PropertyValue::Rotation(self.rotation),
            AnimationProperty::Opacity => PropertyValue::Opacity(self.opacity),
            AnimationProperty::Scale => PropertyValue::Scale(self.scale),
        }
    }

    /// Write one property
    pub fn set(&mut self, value: PropertyValue) {
        match value {
            PropertyValue::Position(p) => {
                self.x = p.x;
                self.y = p.y;
            }
            PropertyValue::Width(v) => self.width = v,
            PropertyValue::Height(v) => self.height = v,
            PropertyValue::Rotation(v) => self.rotation = v,
            PropertyValue::Opacity(v) => self.opacity = v,
            PropertyValue::Scale(v) => self.scale = v,
        }
    }

    /// Rendered size, width and height multiplied by scale
    pub fn effective_size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }

    /// Component-wise comparison within `eps`
    pub fn approx_eq(&self, other: &VisualState, eps: f64) -> bool {
        self.max_distance(other) <= eps
    }

    /// Largest per-property difference; positions compare per axis
    pub fn max_distance(&self, other: &VisualState) -> f64 {
        AnimationProperty::ALL
            .iter()
            .map(|p| self.get(*p).distance(&other.get(*p)))
            .fold(0.0, f64::max)
    }

    /// Copy of `element` with these attributes applied, scale folded into the size
    pub fn apply_to(&self, element: &Element) -> Element {
        let (width, height) = self.effective_size();
        Element {
            x: self.x,
            y: self.y,
            width,
            height,
            rotation: Some(self.rotation),
            opacity: Some(self.opacity),
            ..element.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_state_defaults() {
        let el = Element::text("a", "Hello");
        let rest = el.rest_state();
        assert_eq!(rest.rotation, 0.0);
        assert_eq!(rest.opacity, 1.0);
        assert_eq!(rest.scale, 1.0);
        assert_eq!(el.rest_value(AnimationProperty::Position), PropertyValue::Position(Point::new(40.0, 40.0)));
    }

    #[test]
    fn test_apply_folds_scale_into_size() {
        let el = Element::button("b", "Buy");
        let mut state = el.rest_state();
        state.set(PropertyValue::Scale(2.0));
        let scaled = state.apply_to(&el);
        assert_eq!(scaled.width, 320.0);
        assert_eq!(scaled.height, 96.0);
        assert_eq!(scaled.kind, el.kind);
    }

    #[test]
    fn test_max_distance_picks_largest_component() {
        let el = Element::text("a", "Hello");
        let rest = el.rest_state();
        let mut moved = rest;
        moved.set(PropertyValue::Position(Point::new(43.0, 40.5)));
        moved.set(PropertyValue::Opacity(0.75));

        assert_eq!(rest.max_distance(&rest), 0.0);
        assert_eq!(rest.max_distance(&moved), 3.0);
        assert!(rest.approx_eq(&moved, 3.0));
        assert!(!rest.approx_eq(&moved, 2.9));
    }

    #[test]
    fn test_element_json_layout() {
        let json = r#"{
            "id": "x1", "type": "text", "text": "Sale", "fontSize": 32,
            "x": 10, "y": 20, "width": 100, "height": 40, "opacity": 0.5,
            "visible": true, "layerGroupId": null, "layerOrder": 0
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.id, ElementId::new("x1"));
        assert_eq!(el.opacity, Some(0.5));
        assert!(matches!(el.kind, ElementKind::Text { font_size, .. } if font_size == 32.0));

        let out = serde_json::to_value(&el).unwrap();
        assert_eq!(out["type"], "text");
        assert_eq!(out["fontSize"], 32.0);
    }

    #[test]
    fn test_approx_eq() {
        let a = Element::image("i", "a.png").rest_state();
        let mut b = a;
        b.x += 1e-9;
        assert!(a.approx_eq(&b, 1e-6));
        b.opacity = 0.2;
        assert!(!a.approx_eq(&b, 1e-6));
    }
}
