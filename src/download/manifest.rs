//! Wire types for the manifest negotiation step.

use serde::{Deserialize, Serialize};

/// Mesh format requested for every asset.
pub const DEFAULT_MESH_MIME_TYPE: &str = "application/x-fbx";

/// Export options sent with every manifest request.
///
/// Defaults:
/// - `highpoly`: `true` (high-poly geometry)
/// - `ztool`: `true` (sculpting-tool data)
/// - `lowerlod_normals`: `false`
/// - `albedo_lods`: `true` (per-LOD albedo maps)
/// - `mesh_mime_type`: `application/x-fbx`
/// - `brushes`: `true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreferences {
    pub highpoly: bool,
    pub ztool: bool,
    pub lowerlod_normals: bool,
    pub albedo_lods: bool,
    #[serde(rename = "meshMimeType")]
    pub mesh_mime_type: String,
    pub brushes: bool,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            highpoly: true,
            ztool: true,
            lowerlod_normals: false,
            albedo_lods: true,
            mesh_mime_type: DEFAULT_MESH_MIME_TYPE.to_string(),
            brushes: true,
        }
    }
}

/// Body of the manifest `POST`.
#[derive(Debug, Serialize)]
pub struct DownloadManifest<'a> {
    pub asset: &'a str,
    pub config: &'a ExportPreferences,
}

impl<'a> DownloadManifest<'a> {
    #[must_use]
    pub fn new(asset_id: &'a str, preferences: &'a ExportPreferences) -> Self {
        Self {
            asset: asset_id,
            config: preferences,
        }
    }
}

/// The only field of the manifest response the pipeline uses.
#[derive(Debug, Deserialize)]
pub struct ManifestResponse {
    #[serde(default)]
    pub id: String,
}
