//! Product image transform and the editor operations that change it.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 3.0;
pub const SCALE_STEP: f32 = 0.1;
/// Slider range for the x/y offsets, in pixels.
pub const OFFSET_RANGE: f32 = 200.0;

/// Scale, offset and rotation applied to the fitted product image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    /// Degrees, clockwise.
    #[serde(default)]
    pub rotation: f32,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
        }
    }
}

impl ImageTransform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Replace non-finite values and clamp scale into the editor's range.
    pub fn sanitized(self) -> Self {
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        Self {
            scale: finite_or(self.scale, 1.0).clamp(MIN_SCALE, MAX_SCALE),
            x: finite_or(self.x, 0.0),
            y: finite_or(self.y, 0.0),
            rotation: finite_or(self.rotation, 0.0) % 360.0,
        }
    }
}

/// Drag/zoom editor state for one selected product.
///
/// Mirrors the interactive editor: buttons step the zoom, sliders set
/// exact values, and a pointer drag moves the image.
#[derive(Debug, Clone, Default)]
pub struct ImageEditor {
    transform: ImageTransform,
    drag_origin: Option<(f32, f32)>,
}

impl ImageEditor {
    pub fn new(initial: ImageTransform) -> Self {
        Self {
            transform: initial.sanitized(),
            drag_origin: None,
        }
    }

    pub fn transform(&self) -> ImageTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn zoom_in(&mut self) -> ImageTransform {
        self.set_scale(self.transform.scale + SCALE_STEP)
    }

    pub fn zoom_out(&mut self) -> ImageTransform {
        self.set_scale(self.transform.scale - SCALE_STEP)
    }

    pub fn set_scale(&mut self, scale: f32) -> ImageTransform {
        // Snap to one decimal so repeated steps don't drift.
        let snapped = (scale * 10.0).round() / 10.0;
        self.transform.scale = snapped.clamp(MIN_SCALE, MAX_SCALE);
        self.transform
    }

    /// Slider input for the horizontal offset.
    pub fn set_x(&mut self, x: f32) -> ImageTransform {
        self.transform.x = x.round().clamp(-OFFSET_RANGE, OFFSET_RANGE);
        self.transform
    }

    /// Slider input for the vertical offset.
    pub fn set_y(&mut self, y: f32) -> ImageTransform {
        self.transform.y = y.round().clamp(-OFFSET_RANGE, OFFSET_RANGE);
        self.transform
    }

    pub fn set_rotation(&mut self, degrees: f32) -> ImageTransform {
        self.transform.rotation = degrees % 360.0;
        self.transform
    }

    /// Primary-button press at pointer position `(px, py)`.
    pub fn begin_drag(&mut self, px: f32, py: f32) {
        self.drag_origin = Some((px - self.transform.x, py - self.transform.y));
    }

    /// Pointer move. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, px: f32, py: f32) -> ImageTransform {
        if let Some((ox, oy)) = self.drag_origin {
            self.transform.x = px - ox;
            self.transform.y = py - oy;
        }
        self.transform
    }

    /// Pointer release or leave.
    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) -> ImageTransform {
        self.transform = ImageTransform::default();
        self.drag_origin = None;
        self.transform
    }

    /// Reset scale and position, keep rotation.
    pub fn fit(&mut self) -> ImageTransform {
        self.transform = ImageTransform {
            rotation: self.transform.rotation,
            ..ImageTransform::default()
        };
        self.transform
    }
}
