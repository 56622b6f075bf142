//! Centralized constants used across the application.
//!
//! Geometry values are in canonical image pixels unless noted otherwise.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1440.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Default number of undo snapshots kept per image
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Smallest box a text label may be resized to
pub const MIN_TEXT_WIDTH: f32 = 60.0;
pub const MIN_TEXT_HEIGHT: f32 = 24.0;

/// Size given to new text labels (and to records that omit a size)
pub const DEFAULT_TEXT_WIDTH: f32 = 180.0;
pub const DEFAULT_TEXT_HEIGHT: f32 = 48.0;

/// Smallest box a highlight may be resized to
pub const MIN_HIGHLIGHT_WIDTH: f32 = 8.0;
pub const MIN_HIGHLIGHT_HEIGHT: f32 = 8.0;

/// Size given to a highlight placed with a single click
pub const DEFAULT_HIGHLIGHT_WIDTH: f32 = 100.0;
pub const DEFAULT_HIGHLIGHT_HEIGHT: f32 = 30.0;

/// Arrowhead length and half-angle (radians)
pub const ARROW_HEAD_LENGTH: f32 = 18.0;
pub const ARROW_HEAD_HALF_ANGLE: f32 = std::f32::consts::PI / 7.0;

/// Width of the invisible stroke used when hit-testing arrows
pub const ARROW_HIT_STROKE: f32 = 24.0;

/// Side of the square resize handle drawn at a box's bottom-right corner
pub const RESIZE_HANDLE_SIZE: f32 = 16.0;

/// Radius of the circular arrow endpoint handles
pub const ENDPOINT_HANDLE_RADIUS: f32 = 8.0;

/// Points used to approximate an ellipse outline when painting
pub const ELLIPSE_SEGMENTS: usize = 48;
