// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable properties and their values.

use crate::error::TimelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in design-space pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shape of the value a property carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single number
    Scalar,
    /// An `{x, y}` pair
    Point,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Scalar => f.write_str("scalar"),
            ValueShape::Point => f.write_str("point"),
        }
    }
}

/// Animatable element property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationProperty {
    /// Top-left corner, `{x, y}`
    Position,
    /// Width in pixels
    Width,
    /// Height in pixels
    Height,
    /// Rotation in degrees
    Rotation,
    /// Opacity, nominally 0..1
    Opacity,
    /// Uniform size multiplier, not stored on the element
    Scale,
}

impl AnimationProperty {
    /// All properties in timeline row order
    pub const ALL: [AnimationProperty; 6] = [
        AnimationProperty::Position,
        AnimationProperty::Width,
        AnimationProperty::Height,
        AnimationProperty::Rotation,
        AnimationProperty::Opacity,
        AnimationProperty::Scale,
    ];

    /// Value shape required by this property
    pub fn shape(&self) -> ValueShape {
        match self {
            AnimationProperty::Position => ValueShape::Point,
            _ => ValueShape::Scalar,
        }
    }

    /// Wire/display name
    pub fn name(&self) -> &'static str {
        match self {
            AnimationProperty::Position => "position",
            AnimationProperty::Width => "width",
            AnimationProperty::Height => "height",
            AnimationProperty::Rotation => "rotation",
            AnimationProperty::Opacity => "opacity",
            AnimationProperty::Scale => "scale",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Marker color used by the timeline panel
    pub fn color(&self) -> [u8; 3] {
        match self {
            AnimationProperty::Position => [239, 68, 68],
            AnimationProperty::Width => [59, 130, 246],
            AnimationProperty::Height => [168, 85, 247],
            AnimationProperty::Rotation => [234, 179, 8],
            AnimationProperty::Opacity => [107, 114, 128],
            AnimationProperty::Scale => [236, 72, 153],
        }
    }
}

impl fmt::Display for AnimationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped keyframe value as it appears on the wire: a number or `{x, y}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimationValue {
    /// Scalar value
    Scalar(f64),
    /// Point value
    Point(Point),
}

impl AnimationValue {
    /// Shape of this value
    pub fn shape(&self) -> ValueShape {
        match self {
            AnimationValue::Scalar(_) => ValueShape::Scalar,
            AnimationValue::Point(_) => ValueShape::Point,
        }
    }

    /// Get as scalar if possible
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            AnimationValue::Scalar(v) => Some(*v),
            AnimationValue::Point(_) => None,
        }
    }

    /// Get as point if possible
    pub fn as_point(&self) -> Option<Point> {
        match self {
            AnimationValue::Point(p) => Some(*p),
            AnimationValue::Scalar(_) => None,
        }
    }
}

impl From<f64> for AnimationValue {
    fn from(value: f64) -> Self {
        AnimationValue::Scalar(value)
    }
}

impl From<Point> for AnimationValue {
    fn from(value: Point) -> Self {
        AnimationValue::Point(value)
    }
}

/// A value bound to its property.
///
/// The variant names the property, so a point can never be attached to a
/// scalar property or the other way round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    /// Position value
    Position(Point),
    /// Width value
    Width(f64),
    /// Height value
    Height(f64),
    /// Rotation value (degrees)
    Rotation(f64),
    /// Opacity value
    Opacity(f64),
    /// Scale multiplier
    Scale(f64),
}

impl PropertyValue {
    /// Bind an untyped value to a property, rejecting shape mismatches
    pub fn new(property: AnimationProperty, value: AnimationValue) -> Result<Self, TimelineError> {
        let malformed = || TimelineError::MalformedValue {
            property,
            expected: property.shape(),
        };
        Ok(match property {
            AnimationProperty::Position => Self::Position(value.as_point().ok_or_else(malformed)?),
            AnimationProperty::Width => Self::Width(value.as_scalar().ok_or_else(malformed)?),
            AnimationProperty::Height => Self::Height(value.as_scalar().ok_or_else(malformed)?),
            AnimationProperty::Rotation => Self::Rotation(value.as_scalar().ok_or_else(malformed)?),
            AnimationProperty::Opacity => Self::Opacity(value.as_scalar().ok_or_else(malformed)?),
            AnimationProperty::Scale => Self::Scale(value.as_scalar().ok_or_else(malformed)?),
        })
    }

    /// Property this value belongs to
    pub fn property(&self) -> AnimationProperty {
        match self {
            Self::Position(_) => AnimationProperty::Position,
            Self::Width(_) => AnimationProperty::Width,
            Self::Height(_) => AnimationProperty::Height,
            Self::Rotation(_) => AnimationProperty::Rotation,
            Self::Opacity(_) => AnimationProperty::Opacity,
            Self::Scale(_) => AnimationProperty::Scale,
        }
    }

    /// Untyped wire form
    pub fn value(&self) -> AnimationValue {
        match *self {
            Self::Position(p) => AnimationValue::Point(p),
            Self::Width(v) | Self::Height(v) | Self::Rotation(v) | Self::Opacity(v) | Self::Scale(v) => {
                AnimationValue::Scalar(v)
            }
        }
    }

    /// Scalar payload, `None` for position
    pub fn as_scalar(&self) -> Option<f64> {
        self.value().as_scalar()
    }

    /// Interpolate towards `other` by an already-eased progress.
    ///
    /// `other` must belong to the same property; if it does not, `self` is
    /// returned unchanged.
    pub fn lerp(&self, other: &PropertyValue, progress: f64) -> PropertyValue {
        let mix = |a: f64, b: f64| a + (b - a) * progress;
        match (*self, *other) {
            (Self::Position(a), Self::Position(b)) => {
                Self::Position(Point::new(mix(a.x, b.x), mix(a.y, b.y)))
            }
            (Self::Width(a), Self::Width(b)) => Self::Width(mix(a, b)),
            (Self::Height(a), Self::Height(b)) => Self::Height(mix(a, b)),
            (Self::Rotation(a), Self::Rotation(b)) => Self::Rotation(mix(a, b)),
            (Self::Opacity(a), Self::Opacity(b)) => Self::Opacity(mix(a, b)),
            (Self::Scale(a), Self::Scale(b)) => Self::Scale(mix(a, b)),
            _ => {
                tracing::warn!(
                    "Refusing to interpolate {} towards {}",
                    self.property(),
                    other.property()
                );
                *self
            }
        }
    }

    /// Largest per-component distance to `other`, infinite for mismatched properties
    pub fn distance(&self, other: &PropertyValue) -> f64 {
        match (self.value(), other.value()) {
            (AnimationValue::Point(a), AnimationValue::Point(b))
                if self.property() == other.property() =>
            {
                (a.x - b.x).abs().max((a.y - b.y).abs())
            }
            (AnimationValue::Scalar(a), AnimationValue::Scalar(b))
                if self.property() == other.property() =>
            {
                (a - b).abs()
            }
            _ => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = PropertyValue::new(AnimationProperty::Opacity, Point::new(1.0, 2.0).into());
        assert!(matches!(
            err,
            Err(TimelineError::MalformedValue {
                property: AnimationProperty::Opacity,
                expected: ValueShape::Scalar
            })
        ));
        assert!(PropertyValue::new(AnimationProperty::Position, 3.0.into()).is_err());
    }

    #[test]
    fn test_each_property_binds_its_shape() {
        for property in AnimationProperty::ALL {
            let value = match property.shape() {
                ValueShape::Point => AnimationValue::Point(Point::new(4.0, 5.0)),
                ValueShape::Scalar => AnimationValue::Scalar(4.0),
            };
            let bound = PropertyValue::new(property, value).unwrap();
            assert_eq!(bound.property(), property);
            assert_eq!(bound.value(), value);
        }
    }

    #[test]
    fn test_position_lerps_components_independently() {
        let a = PropertyValue::Position(Point::new(0.0, 10.0));
        let b = PropertyValue::Position(Point::new(100.0, 20.0));
        assert_eq!(a.lerp(&b, 0.5), PropertyValue::Position(Point::new(50.0, 15.0)));
    }

    #[test]
    fn test_mismatched_lerp_keeps_self() {
        let a = PropertyValue::Width(10.0);
        let b = PropertyValue::Height(20.0);
        assert_eq!(a.lerp(&b, 0.5), a);
        assert!(a.distance(&b).is_infinite());
    }

    #[test]
    fn test_wire_forms() {
        let point: AnimationValue = serde_json::from_str(r#"{"x":1,"y":2}"#).unwrap();
        assert_eq!(point, AnimationValue::Point(Point::new(1.0, 2.0)));
        let scalar: AnimationValue = serde_json::from_str("0.5").unwrap();
        assert_eq!(scalar, AnimationValue::Scalar(0.5));
        let property: AnimationProperty = serde_json::from_str("\"rotation\"").unwrap();
        assert_eq!(property, AnimationProperty::Rotation);
    }
}
