//! Scene and mesh files
//!
//! Uses RON (Rusty Object Notation) for human-readable scene and mesh files.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::camera::OrbitCamera;
use super::geometry::{cube, uv_sphere};
use crate::rasterizer::{
    AttributeChannel, CheckerPipeline, Color, DiffusePipeline, Framebuffer, Mesh, RasterError,
    ScenePipeline, ATTRIBUTE_SLOTS,
};

/// Error type for scene loading and output
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
}

/// Camera placement, angles in radians except the field of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 4.0,
            yaw: 0.6,
            pitch: 0.4,
            fov_y_degrees: 50.0,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> OrbitCamera {
        let mut camera = OrbitCamera::new(self.target, self.distance);
        camera.fov_y = self.fov_y_degrees.to_radians();
        camera.rotate(self.pitch, self.yaw);
        camera
    }
}

/// Shading variant and its light parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PipelineConfig {
    Diffuse {
        light_direction: Vec3,
        intensity: f32,
    },
    Checker {
        light_direction: Vec3,
        intensity: f32,
        cells: f32,
    },
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::Diffuse {
            light_direction: DiffusePipeline::DEFAULT_LIGHT,
            intensity: DiffusePipeline::DEFAULT_INTENSITY,
        }
    }
}

impl PipelineConfig {
    /// Build the pipeline with an identity projection; the caller sets the
    /// camera projection each frame.
    pub fn build(&self) -> ScenePipeline {
        match *self {
            PipelineConfig::Diffuse { light_direction, intensity } => {
                ScenePipeline::Diffuse(DiffusePipeline {
                    projection: Mat4::IDENTITY,
                    light_direction,
                    intensity,
                })
            }
            PipelineConfig::Checker { light_direction, intensity, cells } => {
                let mut checker = CheckerPipeline::new(Mat4::IDENTITY);
                checker.diffuse.light_direction = light_direction;
                checker.diffuse.intensity = intensity;
                checker.cells = cells;
                ScenePipeline::Checker(checker)
            }
        }
    }
}

/// Where the scene's mesh comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    Cube,
    Sphere { rings: u32, segments: u32 },
    /// RON mesh file, relative paths resolve against the scene file
    File(PathBuf),
}

impl Default for MeshSource {
    fn default() -> Self {
        MeshSource::Sphere { rings: 24, segments: 32 }
    }
}

/// A renderable scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    pub clear_color: Color,
    pub camera: CameraConfig,
    pub pipeline: PipelineConfig,
    pub mesh: MeshSource,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            clear_color: Color::WHITE,
            camera: CameraConfig::default(),
            pipeline: PipelineConfig::default(),
            mesh: MeshSource::default(),
        }
    }
}

impl SceneConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn framebuffer(&self) -> Result<Framebuffer, SceneError> {
        Ok(Framebuffer::new(self.width, self.height)?.with_clear_color(self.clear_color))
    }

    /// Build the mesh, resolving relative file paths against `base_dir`
    pub fn load_mesh(&self, base_dir: &Path) -> Result<Mesh, SceneError> {
        let mesh = match &self.mesh {
            MeshSource::Cube => cube()?,
            MeshSource::Sphere { rings, segments } => uv_sphere(*rings, *segments)?,
            MeshSource::File(path) => load_mesh_data(base_dir.join(path))?.to_mesh()?,
        };
        log::info!(
            "Loaded mesh: {} triangles, {} vertices",
            mesh.primitive_count(),
            mesh.vertex_count(AttributeChannel::Position)
        );
        Ok(mesh)
    }
}

/// One channel declaration in a mesh file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub channel: AttributeChannel,
    pub stride: u32,
    #[serde(default)]
    pub offset: u32,
    /// Scalars per vertex; the channel's default width when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<u32>,
}

/// On-disk mesh: flat indices, flat scalars and channel layouts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub indices: Vec<u32>,
    pub scalars: Vec<f32>,
    pub layouts: Vec<LayoutEntry>,
}

impl MeshData {
    pub fn to_mesh(&self) -> Result<Mesh, RasterError> {
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&self.scalars)?;
        for entry in &self.layouts {
            let components = entry.components.unwrap_or(entry.channel.default_components());
            mesh.set_attribute_layout_sized(entry.channel, entry.stride, entry.offset, components)?;
        }
        mesh.set_indices(&self.indices)?;
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn from_mesh(mesh: &Mesh) -> Self {
        let channels = [AttributeChannel::Position, AttributeChannel::Normal, AttributeChannel::TexCoord]
            .into_iter()
            .chain((0..(ATTRIBUTE_SLOTS - 3) as u8).map(AttributeChannel::Reserved));

        let layouts = channels
            .filter_map(|channel| {
                let layout = mesh.layout(channel);
                layout.is_declared().then_some(LayoutEntry {
                    channel,
                    stride: layout.stride,
                    offset: layout.offset,
                    components: (layout.components != channel.default_components())
                        .then_some(layout.components),
                })
            })
            .collect();

        Self {
            indices: mesh.triangles().flat_map(|t| t.indices()).collect(),
            scalars: mesh.attribute_buffer().to_vec(),
            layouts,
        }
    }
}

fn pretty() -> ron::ser::PrettyConfig {
    ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string())
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    let scene: SceneConfig = ron::from_str(s)?;
    if scene.width == 0 || scene.height == 0 {
        return Err(RasterError::InvalidArgument(format!(
            "scene size {}x{} must be positive",
            scene.width, scene.height
        ))
        .into());
    }
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneConfig, path: P) -> Result<(), SceneError> {
    let contents = ron::ser::to_string_pretty(scene, pretty())?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn load_mesh_data<P: AsRef<Path>>(path: P) -> Result<MeshData, SceneError> {
    let contents = fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}

pub fn save_mesh_data<P: AsRef<Path>>(data: &MeshData, path: P) -> Result<(), SceneError> {
    let contents = ron::ser::to_string_pretty(data, pretty())?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Triangle;

    #[test]
    fn test_partial_scene_uses_defaults() {
        let scene = load_scene_from_str("(width: 32, height: 16, mesh: Cube)").unwrap();
        assert_eq!(scene.width, 32);
        assert_eq!(scene.height, 16);
        assert_eq!(scene.mesh, MeshSource::Cube);
        assert_eq!(scene.clear_color, Color::WHITE);
        assert_eq!(scene.camera, CameraConfig::default());
        assert!((scene.aspect() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_scene_round_trip() {
        let scene = SceneConfig {
            width: 100,
            height: 50,
            clear_color: Color::new(1, 2, 3),
            pipeline: PipelineConfig::Checker {
                light_direction: Vec3::new(0.0, 1.0, 0.5),
                intensity: 0.8,
                cells: 4.0,
            },
            mesh: MeshSource::File(PathBuf::from("mesh.ron")),
            ..SceneConfig::default()
        };
        let text = ron::ser::to_string_pretty(&scene, pretty()).unwrap();
        assert_eq!(load_scene_from_str(&text).unwrap(), scene);
    }

    #[test]
    fn test_scene_rejects_zero_size_and_bad_syntax() {
        assert!(matches!(
            load_scene_from_str("(width: 0)"),
            Err(SceneError::Raster(RasterError::InvalidArgument(_)))
        ));
        assert!(matches!(load_scene_from_str("(width: "), Err(SceneError::Parse(_))));
    }

    #[test]
    fn test_pipeline_config_builds_variant() {
        let checker = PipelineConfig::Checker {
            light_direction: Vec3::X,
            intensity: 0.5,
            cells: 2.0,
        };
        match checker.build() {
            ScenePipeline::Checker(p) => {
                assert_eq!(p.cells, 2.0);
                assert_eq!(p.diffuse.light_direction, Vec3::X);
            }
            other => panic!("expected checker, got {}", other.name()),
        }
        assert_eq!(PipelineConfig::default().build().name(), "diffuse");
    }

    #[test]
    fn test_mesh_data_from_ron() {
        let text = r#"(
            indices: [0, 1, 2],
            scalars: [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            layouts: [(channel: Position, stride: 3)],
        )"#;
        let data: MeshData = ron::from_str(text).unwrap();
        let mesh = data.to_mesh().unwrap();
        assert_eq!(mesh.triangle(0).unwrap(), Triangle::new(0, 1, 2));
        assert_eq!(mesh.attribute::<Vec3>(AttributeChannel::Position, 2), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(MeshData::from_mesh(&mesh), data);
    }

    #[test]
    fn test_mesh_data_rejects_bad_index() {
        let data = MeshData {
            indices: vec![0, 1, 9],
            scalars: vec![0.0; 9],
            layouts: vec![LayoutEntry {
                channel: AttributeChannel::Position,
                stride: 3,
                offset: 0,
                components: None,
            }],
        };
        assert!(matches!(data.to_mesh(), Err(RasterError::OutOfRange { .. })));
    }

    #[test]
    fn test_mesh_data_rejects_truncated_scalars() {
        let text = r#"(
            indices: [0, 1, 2],
            scalars: [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0],
            layouts: [(channel: Position, stride: 3)],
        )"#;
        let data: MeshData = ron::from_str(text).unwrap();
        assert!(matches!(
            data.to_mesh(),
            Err(RasterError::OutOfRange { what: "vertex", index: 2, .. })
        ));
    }

    #[test]
    fn test_mesh_data_keeps_explicit_width() {
        let text = r#"(
            indices: [0, 1, 2],
            scalars: [0.0, 0.0, 1.0, 0.5, 1.0, 0.0, 1.0, 0.5, 0.0, 1.0, 1.0, 0.5],
            layouts: [
                (channel: Position, stride: 4),
                (channel: Reserved(0), stride: 4, offset: 3, components: Some(1)),
            ],
        )"#;
        let data: MeshData = ron::from_str(text).unwrap();
        let mesh = data.to_mesh().unwrap();
        assert_eq!(mesh.attribute::<f32>(AttributeChannel::Reserved(0), 2), 0.5);
        assert_eq!(MeshData::from_mesh(&mesh), data);
    }

    #[test]
    fn test_bundled_assets_parse() {
        let scenes = [
            include_str!("../../assets/scenes/sphere.ron"),
            include_str!("../../assets/scenes/checker_cube.ron"),
            include_str!("../../assets/scenes/quad.ron"),
        ];
        for text in scenes {
            load_scene_from_str(text).unwrap();
        }
        assert_eq!(load_scene_from_str(scenes[0]).unwrap(), SceneConfig::default());

        let data: MeshData = ron::from_str(include_str!("../../assets/meshes/quad.ron")).unwrap();
        let mesh = data.to_mesh().unwrap();
        assert_eq!(mesh.primitive_count(), 2);
        assert_eq!(mesh.attribute::<Vec3>(AttributeChannel::Normal, 0), Vec3::Z);
    }

    #[test]
    fn test_generated_mesh_survives_file_format() {
        let scene = SceneConfig { mesh: MeshSource::Cube, ..SceneConfig::default() };
        let mesh = scene.load_mesh(Path::new(".")).unwrap();
        let data = MeshData::from_mesh(&mesh);
        assert_eq!(data.layouts.len(), 3);
        let text = ron::ser::to_string(&data).unwrap();
        let back: MeshData = ron::from_str(&text).unwrap();
        assert_eq!(back.to_mesh().unwrap().primitive_count(), 12);
    }
}
