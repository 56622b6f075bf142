//! Conversion between client (window) coordinates and canonical canvas space.
//!
//! The canvas rectangle moves whenever the camera pans or zooms, so callers
//! build a fresh [`CoordinateMapper`] for every pointer event instead of
//! caching one.

use bevy::prelude::*;

/// The canvas element's on-screen bounding rectangle, in client pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl ClientRect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            min,
            size: max - min,
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }
}

/// Map a client point into canonical canvas coordinates.
///
/// `intrinsic_size` is the canvas resolution when it differs from the rendered
/// size; `None` means one canonical unit per client pixel.
pub fn client_to_canvas(client: Vec2, rect: ClientRect, intrinsic_size: Option<Vec2>) -> Vec2 {
    let scale = intrinsic_size.map_or(Vec2::ONE, |intrinsic| scale_factors(rect.size, intrinsic));
    (client - rect.min) * scale
}

fn scale_factors(rendered: Vec2, intrinsic: Vec2) -> Vec2 {
    let axis = |rendered: f32, intrinsic: f32| {
        if rendered.abs() > f32::EPSILON && intrinsic.is_finite() {
            intrinsic / rendered
        } else {
            1.0
        }
    };
    Vec2::new(axis(rendered.x, intrinsic.x), axis(rendered.y, intrinsic.y))
}

/// Two-way mapping for one frame's canvas placement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    rect: ClientRect,
    scale: Vec2,
}

impl CoordinateMapper {
    pub fn new(rect: ClientRect, intrinsic_size: Vec2) -> Self {
        Self {
            rect,
            scale: scale_factors(rect.size, intrinsic_size),
        }
    }

    /// A canvas drawn at its intrinsic size with its origin at `origin`
    pub fn unscaled(origin: Vec2, size: Vec2) -> Self {
        Self {
            rect: ClientRect::new(origin, size),
            scale: Vec2::ONE,
        }
    }

    pub fn rect(&self) -> ClientRect {
        self.rect
    }

    pub fn to_canvas(&self, client: Vec2) -> Vec2 {
        (client - self.rect.min) * self.scale
    }

    pub fn to_client(&self, canvas: Vec2) -> Vec2 {
        self.rect.min + canvas / self.scale
    }

    /// Convert a canonical length (stroke width, font size) to client pixels
    pub fn length_to_client(&self, length: f32) -> f32 {
        length / self.scale.x.max(f32::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_point_offset_by_rect_origin() {
        let rect = ClientRect::new(Vec2::new(20.0, 10.0), Vec2::new(960.0, 540.0));
        let canvas = client_to_canvas(Vec2::new(100.0, 50.0), rect, None);
        assert_eq!(canvas, Vec2::new(80.0, 40.0));
    }

    #[test]
    fn test_scaled_canvas_uses_intrinsic_resolution() {
        let rect = ClientRect::new(Vec2::new(0.0, 0.0), Vec2::new(480.0, 270.0));
        let canvas = client_to_canvas(Vec2::new(240.0, 135.0), rect, Some(Vec2::new(960.0, 540.0)));
        assert_eq!(canvas, Vec2::new(480.0, 270.0));
    }

    #[test]
    fn test_zero_sized_rect_falls_back_to_unit_scale() {
        let rect = ClientRect::new(Vec2::new(5.0, 5.0), Vec2::ZERO);
        let canvas = client_to_canvas(Vec2::new(6.0, 7.0), rect, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(canvas, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_mapper_round_trips_between_spaces() {
        let mapper = CoordinateMapper::new(
            ClientRect::new(Vec2::new(100.0, 40.0), Vec2::new(400.0, 300.0)),
            Vec2::new(800.0, 600.0),
        );
        let client = Vec2::new(300.0, 190.0);
        let canvas = mapper.to_canvas(client);
        assert_eq!(canvas, Vec2::new(400.0, 300.0));
        assert_eq!(mapper.to_client(canvas), client);
        assert_eq!(mapper.length_to_client(10.0), 5.0);
    }

    #[test]
    fn test_same_inputs_same_outputs() {
        let mapper = CoordinateMapper::unscaled(Vec2::new(3.0, 4.0), Vec2::new(10.0, 10.0));
        assert_eq!(
            mapper.to_canvas(Vec2::new(5.0, 5.0)),
            mapper.to_canvas(Vec2::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_client_rect_from_corners_normalizes() {
        let rect = ClientRect::from_corners(Vec2::new(50.0, 10.0), Vec2::new(10.0, 30.0));
        assert_eq!(rect.min, Vec2::new(10.0, 10.0));
        assert_eq!(rect.size, Vec2::new(40.0, 20.0));
        assert!(rect.contains(Vec2::new(20.0, 20.0)));
        assert!(!rect.contains(Vec2::new(60.0, 20.0)));
    }
}
