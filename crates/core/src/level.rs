//! Level description files.
//!
//! One entity per line: `TYPE ASSETPATH px py pz rx ry rz sx sy sz`.
//! Lines that are empty or start with `#` are skipped. Numbers are read left
//! to right; the first missing or unreadable one and everything after it
//! stay zero. Parsing never fails.

use crate::collision::Aabb;
use crate::config::ArenaConfig;
use crate::core_types::vec3::Vec3;
use nalgebra::{Matrix4, Rotation3};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Yaw below which a wall is treated as X-aligned (radians)
const WALL_AXIS_THRESHOLD: f32 = 0.1;
/// Trees collide as a 1 x 10 x 1 trunk standing on their position
const TREE_COLLIDER_SIZE: Vec3 = Vec3::new(1.0, 10.0, 1.0);

#[derive(Debug)]
pub enum LevelError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io { path, source } => {
                write!(f, "failed to read level file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Enemy,
    Wall,
    Tree,
    Plane,
    /// Unrecognized type, kept so hosts can handle their own props
    Other(String),
}

impl EntryKind {
    fn from_token(token: &str) -> Self {
        match token {
            "ENEMY" => EntryKind::Enemy,
            "WALL" => EntryKind::Wall,
            "TREE" => EntryKind::Tree,
            "PLANE" => EntryKind::Plane,
            other => EntryKind::Other(other.to_owned()),
        }
    }
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEntry {
    pub kind: EntryKind,
    pub asset_path: String,
    pub position: Vec3,
    /// Euler angles in radians; only x and y are used
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl LevelEntry {
    /// Parse a single non-comment line.
    fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let kind = EntryKind::from_token(tokens.next()?);
        let asset_path = tokens.next().unwrap_or_default().to_owned();

        let mut values = [0.0_f32; 9];
        for slot in &mut values {
            match tokens.next().and_then(|t| t.parse::<f32>().ok()) {
                Some(v) => *slot = v,
                None => break,
            }
        }

        Some(LevelEntry {
            kind,
            asset_path,
            position: Vec3::new(values[0], values[1], values[2]),
            rotation: Vec3::new(values[3], values[4], values[5]),
            scale: Vec3::new(values[6], values[7], values[8]),
        })
    }

    /// Scale, then rotate about X, then about Y, then translate.
    pub fn world_transform(&self) -> Matrix4<f32> {
        let s = Matrix4::new_nonuniform_scaling(&self.scale);
        let rx = Rotation3::from_axis_angle(&Vec3::x_axis(), self.rotation.x).to_homogeneous();
        let ry = Rotation3::from_axis_angle(&Vec3::y_axis(), self.rotation.y).to_homogeneous();
        Matrix4::new_translation(&self.position) * ry * rx * s
    }

    /// Static collision box contributed by this entry, if any.
    ///
    /// Wall footprints only support walls turned 0 or 90 degrees: a yaw near
    /// zero spans X, anything else spans Z.
    pub fn obstacle(&self) -> Option<Aabb> {
        match self.kind {
            EntryKind::Wall => {
                let size = if self.rotation.y.abs() < WALL_AXIS_THRESHOLD {
                    Vec3::new(self.scale.x * 2.0, self.scale.z * 2.0, 1.0)
                } else {
                    Vec3::new(1.0, self.scale.z * 2.0, self.scale.x * 2.0)
                };
                Some(Aabb::from_center_size(self.position, size))
            }
            EntryKind::Tree => {
                let center = self.position + Vec3::new(0.0, TREE_COLLIDER_SIZE.y * 0.5, 0.0);
                Some(Aabb::from_center_size(center, TREE_COLLIDER_SIZE))
            }
            _ => None,
        }
    }
}

/// Mesh instance the renderer draws as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticProp {
    pub asset_path: String,
    pub transform: Matrix4<f32>,
}

/// A parsed level file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelDescription {
    entries: Vec<LevelEntry>,
}

impl LevelDescription {
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            if let Some(entry) = LevelEntry::parse(line) {
                if let EntryKind::Other(name) = &entry.kind {
                    debug!("Line {}: unhandled entry type {}", line_no + 1, name);
                }
                entries.push(entry);
            }
        }
        LevelDescription { entries }
    }

    /// Read and parse a level file.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::parse(&text);
        info!(
            "Loaded level {} with {} entries",
            path.display(),
            level.entries.len()
        );
        Ok(level)
    }

    pub fn entries(&self) -> &[LevelEntry] {
        &self.entries
    }

    /// `(position, scale)` of each enemy, in file order
    pub fn enemy_spawns(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Enemy)
            .map(|e| (e.position, e.scale))
    }

    /// Collision boxes from walls and trees, in file order
    pub fn level_obstacles(&self) -> Vec<Aabb> {
        self.entries.iter().filter_map(LevelEntry::obstacle).collect()
    }

    /// Level obstacles followed by the four arena walls.
    pub fn obstacles(&self, arena: &ArenaConfig) -> Vec<Aabb> {
        let mut obstacles = self.level_obstacles();
        obstacles.extend(arena_walls(arena));
        obstacles
    }

    /// Meshes for walls and trees
    pub fn static_props(&self) -> Vec<StaticProp> {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Wall | EntryKind::Tree))
            .map(|e| StaticProp {
                asset_path: e.asset_path.clone(),
                transform: e.world_transform(),
            })
            .collect()
    }

    /// Ground plane transform. The last `PLANE` entry wins.
    pub fn ground_transform(&self) -> Matrix4<f32> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == EntryKind::Plane)
            .map_or_else(default_ground_transform, LevelEntry::world_transform)
    }
}

/// 100 x 100 ground sitting just below y = 0.
pub fn default_ground_transform() -> Matrix4<f32> {
    Matrix4::new_translation(&Vec3::new(0.0, -0.1, 0.0))
        * Matrix4::new_nonuniform_scaling(&Vec3::new(50.0, 1.0, 50.0))
}

/// The four boundary walls, north, south, east, west.
///
/// Present whatever the level contains.
pub fn arena_walls(arena: &ArenaConfig) -> [Aabb; 4] {
    let offset = arena.map_limit + arena.wall_thickness * 0.5;
    let along_x = Vec3::new(arena.wall_span, arena.wall_height, arena.wall_thickness);
    let along_z = Vec3::new(arena.wall_thickness, arena.wall_height, arena.wall_span);
    [
        Aabb::from_center_size(Vec3::new(0.0, 0.0, offset), along_x),
        Aabb::from_center_size(Vec3::new(0.0, 0.0, -offset), along_x),
        Aabb::from_center_size(Vec3::new(offset, 0.0, 0.0), along_z),
        Aabb::from_center_size(Vec3::new(-offset, 0.0, 0.0), along_z),
    ]
}
