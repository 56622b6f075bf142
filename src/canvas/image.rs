//! Background image provider: opening, sizing and displaying the image that
//! annotations are drawn over.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy::window::PrimaryWindow;

use crate::config::{AppConfig, UpdateLastImagePathRequest};
use crate::overlay::{Documents, ImageInfo, InteractionController};

use super::camera::{CameraZoom, CanvasCamera, fit_camera_to_image};

/// File extensions offered in the open dialog
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "gif"];

/// Marker for the sprite showing the active image
#[derive(Component)]
pub struct CanvasImage;

/// Message to open an image and make it the active document
#[derive(Message)]
pub struct OpenImageRequest {
    pub path: PathBuf,
}

/// Sent once an image is on screen and its document is active
#[derive(Message)]
pub struct ImageOpened {
    pub image_id: String,
    /// False when the image already had a document this session
    pub first_open: bool,
}

/// Resource for image open errors
#[derive(Resource, Default)]
pub struct ImageLoadError {
    pub message: Option<String>,
}

/// Spawn a native open dialog filtered to supported images
pub fn pick_image_file() -> Task<Option<PathBuf>> {
    AsyncComputeTaskPool::get().spawn(async {
        rfd::AsyncFileDialog::new()
            .set_title("Open Image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
            .await
            .map(|h| h.path().to_path_buf())
    })
}

/// Read the image header for its intrinsic size
pub fn read_image_info(path: &Path) -> Result<ImageInfo, String> {
    let (width, height) = image::image_dimensions(path)
        .map_err(|e| format!("Could not read image {}: {}", path.display(), e))?;
    if width == 0 || height == 0 {
        return Err(format!("Image {} has no pixels", path.display()));
    }
    Ok(ImageInfo {
        id: ImageInfo::id_for_path(path),
        path: path.to_path_buf(),
        width,
        height,
    })
}

/// Startup system: open the image named on the command line, or the last
/// image from config when it still exists
pub fn open_initial_image(config: Res<AppConfig>, mut requests: MessageWriter<OpenImageRequest>) {
    let from_args = std::env::args().nth(1).map(PathBuf::from);
    let path = from_args.or_else(|| {
        config
            .data
            .last_image_path
            .clone()
            .filter(|path| path.exists())
    });
    if let Some(path) = path {
        requests.write(OpenImageRequest { path });
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_open_image_requests(
    mut requests: MessageReader<OpenImageRequest>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<AppConfig>,
    existing: Query<Entity, With<CanvasImage>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut camera_query: Query<(&mut Transform, &mut CameraZoom), With<CanvasCamera>>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
    mut error: ResMut<ImageLoadError>,
    mut opened: MessageWriter<ImageOpened>,
    mut last_path: MessageWriter<UpdateLastImagePathRequest>,
) {
    // Only the most recent request matters
    let Some(request) = requests.read().last() else {
        return;
    };

    let info = match read_image_info(&request.path) {
        Ok(info) => info,
        Err(message) => {
            warn!("{}", message);
            error.message = Some(message);
            return;
        }
    };

    if let Some(doc) = documents.active_mut() {
        controller.reset(doc);
    }
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let size = info.size();
    commands.spawn((
        Sprite {
            image: asset_server.load(info.path.clone()),
            custom_size: Some(size),
            ..default()
        },
        Transform::default(),
        CanvasImage,
    ));
    fit_camera_to_image(size, &window_query, &mut camera_query);

    info!(
        "Opened image {} ({}x{}) as {}",
        info.path.display(),
        info.width,
        info.height,
        info.id
    );
    let image_id = info.id.clone();
    let first_open = documents.get(&image_id).is_none();
    last_path.write(UpdateLastImagePathRequest {
        path: info.path.clone(),
    });
    documents.open(info, config.data.history_limit);
    opened.write(ImageOpened {
        image_id,
        first_open,
    });
}
