use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::common::is_cursor_over_ui;

#[derive(Component)]
pub struct CanvasCamera;

#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 20.0;

/// Zoom that fits `image_size` inside `viewport` with a small margin
pub fn fit_scale(image_size: Vec2, viewport: Vec2) -> f32 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 || image_size.x <= 0.0 || image_size.y <= 0.0 {
        return 1.0;
    }
    let ratio = image_size / (viewport * 0.9);
    ratio.x.max(ratio.y).clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        CanvasCamera,
        CameraZoom::default(),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<CanvasCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<CanvasCamera>>,
    mut contexts: EguiContexts,
) {
    // Scrolling inside panels scrolls the panel, not the canvas
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.1,
            MouseScrollUnit::Pixel => event.y * 0.001,
        };

        zoom.scale = (zoom.scale * (1.0 - scroll_amount)).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<CanvasCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Centre the camera on the image and zoom so it fits the window
pub fn fit_camera_to_image(
    image_size: Vec2,
    window_query: &Query<&Window, With<PrimaryWindow>>,
    camera_query: &mut Query<(&mut Transform, &mut CameraZoom), With<CanvasCamera>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((mut transform, mut zoom)) = camera_query.single_mut() else {
        return;
    };
    transform.translation.x = 0.0;
    transform.translation.y = 0.0;
    zoom.scale = fit_scale(image_size, window.size());
}
