//! The image canvas: background sprite, camera and the on-screen rectangle
//! the overlay maps pointer positions through.
//!
//! The image sprite is centred at the world origin at its intrinsic size,
//! so canonical (0, 0) sits at world `(-w/2, h/2)`. Panning and zooming only
//! move the projected rectangle.

pub mod camera;
pub mod image;

pub use self::image::{ImageLoadError, ImageOpened, OpenImageRequest, pick_image_file};
pub use camera::CanvasCamera;

use bevy::prelude::*;

use crate::config::ConfigLoaded;
use crate::overlay::{ClientRect, CoordinateMapper, Documents};

/// Canvas view updates (overlay input runs after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanvasViewUpdated;

/// Where the active image is drawn this frame, in window coordinates
#[derive(Resource, Default)]
pub struct CanvasView {
    rect: Option<ClientRect>,
    intrinsic_size: Vec2,
}

impl CanvasView {
    /// A mapper for the current frame's placement
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.rect
            .map(|rect| CoordinateMapper::new(rect, self.intrinsic_size))
    }
}

/// Project the active image's corners to the viewport
fn update_canvas_view(
    documents: Res<Documents>,
    camera_query: Query<(&Camera, &GlobalTransform), With<CanvasCamera>>,
    mut view: ResMut<CanvasView>,
) {
    let (Some(doc), Ok((camera, camera_transform))) = (documents.active(), camera_query.single())
    else {
        view.rect = None;
        return;
    };

    let half = doc.image.size() / 2.0;
    let top_left = camera.world_to_viewport(camera_transform, Vec3::new(-half.x, half.y, 0.0));
    let bottom_right = camera.world_to_viewport(camera_transform, Vec3::new(half.x, -half.y, 0.0));

    view.rect = match (top_left, bottom_right) {
        (Ok(a), Ok(b)) => Some(ClientRect::from_corners(a, b)),
        _ => None,
    };
    view.intrinsic_size = doc.image.size();
}

pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanvasView>()
            .init_resource::<ImageLoadError>()
            .add_message::<OpenImageRequest>()
            .add_message::<ImageOpened>()
            .add_systems(Startup, camera::spawn_camera)
            .add_systems(Startup, image::open_initial_image.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    image::handle_open_image_requests.run_if(on_message::<OpenImageRequest>),
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    update_canvas_view,
                )
                    .chain()
                    .in_set(CanvasViewUpdated),
            );
    }
}
