//! Loading pipeline: reads data files, resolves names, builds worlds.
//!
//! Provides format detection (RON/JSON/TOML), deserialization helpers, and
//! the layout builder that turns a [`LayoutFile`] into a [`GridWorld`].

use crate::schema::LayoutFile;
use flowscan_core::config::ScanConfig;
use flowscan_core::geom::GridPosition;
use flowscan_core::grid::{GridError, GridWorld};
use flowscan_core::id::{NodeId, TeamId};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A block could not be placed.
    #[error("cannot place block '{name}' in {file}: {source}")]
    Grid {
        file: PathBuf,
        name: String,
        #[source]
        source: GridError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stand-in file name for text parsed from memory.
const INLINE: &str = "<inline>";

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_with<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_with(&content, format, path)
}

// ===========================================================================
// Scan configuration
// ===========================================================================

/// Load a [`ScanConfig`]. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<ScanConfig, DataLoadError> {
    let config = deserialize_file(path)?;
    debug!(file = %path.display(), "loaded scan config");
    Ok(config)
}

pub fn parse_config_str(text: &str, format: Format) -> Result<ScanConfig, DataLoadError> {
    parse_with(text, format, Path::new(INLINE))
}

// ===========================================================================
// Layouts
// ===========================================================================

/// A built layout plus the name of every block.
#[derive(Debug)]
pub struct LoadedLayout {
    pub world: GridWorld,
    pub names: HashMap<String, NodeId>,
}

impl LoadedLayout {
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }
}

/// Load and build a layout file.
pub fn load_layout(path: &Path) -> Result<LoadedLayout, DataLoadError> {
    let layout: LayoutFile = deserialize_file(path)?;
    build_world_from(&layout, path)
}

pub fn parse_layout_str(text: &str, format: Format) -> Result<LayoutFile, DataLoadError> {
    parse_with(text, format, Path::new(INLINE))
}

/// Build a world from an already parsed layout.
pub fn build_world(layout: &LayoutFile) -> Result<LoadedLayout, DataLoadError> {
    build_world_from(layout, Path::new(INLINE))
}

fn build_world_from(layout: &LayoutFile, file: &Path) -> Result<LoadedLayout, DataLoadError> {
    let mut world = GridWorld::with_tile_size(layout.tile_size);
    world.set_fog(layout.fog);
    let mut names: HashMap<String, NodeId> = HashMap::new();

    for entry in &layout.blocks {
        check_duplicate(&names, &entry.name, file)?;
        let id = world
            .place(
                entry.kind.clone(),
                GridPosition::new(entry.x, entry.y),
                entry.size,
                entry.rotation,
                TeamId(entry.team),
            )
            .map_err(|source| DataLoadError::Grid {
                file: file.to_path_buf(),
                name: entry.name.clone(),
                source,
            })?;
        if let Some(unloadable) = entry.unloadable {
            if let Some(node) = world.node_mut(id) {
                node.unloadable = unloadable;
            }
        }
        names.insert(entry.name.clone(), id);
    }

    for link in &layout.links {
        let from = *resolve_name(&names, &link.from, file, "block")?;
        let to = *resolve_name(&names, &link.to, file, "block")?;
        if let Err(err) = world.link(from, to) {
            warn!(from = %link.from, to = %link.to, %err, "link rejected");
        }
    }

    for reveal in &layout.reveal {
        world.reveal(TeamId(reveal.team), reveal.min, reveal.max);
    }

    debug!(
        file = %file.display(),
        blocks = world.node_count(),
        links = layout.links.len(),
        "built layout"
    );
    Ok(LoadedLayout { world, names })
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BlockEntry, LinkEntry};
    use flowscan_core::block::BlockKind;
    use flowscan_core::geom::Direction;
    use flowscan_core::render::Color;
    use flowscan_core::world::World;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flowscan_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    fn entry(name: &str, kind: BlockKind, x: i32, y: i32) -> BlockEntry {
        BlockEntry {
            name: name.to_string(),
            kind,
            x,
            y,
            size: 1,
            rotation: Direction::East,
            team: 0,
            unloadable: None,
        }
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("scan.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("scan.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("scan.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["scan.yaml", "scan"] {
            let result = detect_format(Path::new(name));
            assert!(matches!(
                result,
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Config
    // -----------------------------------------------------------------------

    #[test]
    fn config_from_each_format() {
        let ron = parse_config_str(r#"(pulse: (period: 8.0))"#, Format::Ron).unwrap();
        assert_eq!(ron.pulse.period, 8.0);
        assert_eq!(ron.pulse.base, 0.6);

        let toml = parse_config_str("[passes]\nliquid = false\n", Format::Toml).unwrap();
        assert!(!toml.passes.liquid);
        assert!(toml.passes.item);

        let json = parse_config_str(r#"{"colors": {"item_output": "102030"}}"#, Format::Json)
            .unwrap();
        assert_eq!(json.colors.item_output, Color::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn config_bad_color_is_parse_error() {
        let result = parse_config_str(r#"{"colors": {"accent": "nope"}}"#, Format::Json);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));
    }

    #[test]
    fn load_config_from_file() {
        let dir = make_test_dir("config_file");
        let path = dir.join("scan.toml");
        fs::write(&path, "[colors]\naccent = \"ffffff\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.colors.accent, Color::rgb(0xff, 0xff, 0xff));

        cleanup(&dir);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let dir = make_test_dir("config_missing");
        let result = load_config(&dir.join("absent.ron"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Layouts
    // -----------------------------------------------------------------------

    #[test]
    fn build_world_places_and_names_blocks() {
        let layout = LayoutFile {
            blocks: vec![
                entry("belt", BlockKind::Conveyor { armored: false }, 0, 0),
                entry("vault", BlockKind::Storage, 1, 0),
            ],
            ..LayoutFile::default()
        };
        let loaded = build_world(&layout).unwrap();
        let belt = loaded.id("belt").unwrap();
        assert_eq!(loaded.world.node_count(), 2);
        assert_eq!(loaded.world.node_at_tile(GridPosition::new(0, 0)), Some(belt));
        assert!(loaded.world.node(loaded.id("vault").unwrap()).unwrap().unloadable);
    }

    #[test]
    fn built_world_matches_hand_placed() {
        use flowscan_core::test_utils::{conveyor, grid, place, router};

        let layout = LayoutFile {
            blocks: vec![
                entry("belt", conveyor(), 0, 0),
                entry("hub", router(), 1, 0),
            ],
            ..LayoutFile::default()
        };
        let loaded = build_world(&layout).unwrap();

        let mut expected = grid();
        place(&mut expected, conveyor(), 0, 0, Direction::East);
        place(&mut expected, router(), 1, 0, Direction::East);

        for x in 0..2 {
            let pos = GridPosition::new(x, 0);
            let built = loaded.world.node_at_tile(pos).and_then(|id| loaded.world.node(id));
            let hand = expected.node_at_tile(pos).and_then(|id| expected.node(id));
            assert_eq!(built.map(|n| &n.kind), hand.map(|n| &n.kind));
            assert_eq!(built.map(|n| n.rotation), hand.map(|n| n.rotation));
        }
        let belt = loaded.id("belt").unwrap();
        assert_eq!(loaded.world.front(belt), loaded.id("hub"));
    }

    #[test]
    fn unloadable_override_applies() {
        let mut vault = entry("vault", BlockKind::Storage, 0, 0);
        vault.unloadable = Some(false);
        let layout = LayoutFile {
            blocks: vec![vault],
            ..LayoutFile::default()
        };
        let loaded = build_world(&layout).unwrap();
        assert!(!loaded.world.node(loaded.id("vault").unwrap()).unwrap().unloadable);
    }

    #[test]
    fn duplicate_block_name_rejected() {
        let layout = LayoutFile {
            blocks: vec![
                entry("a", BlockKind::Router, 0, 0),
                entry("a", BlockKind::Router, 1, 0),
            ],
            ..LayoutFile::default()
        };
        let result = build_world(&layout);
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "a"
        ));
    }

    #[test]
    fn overlapping_blocks_rejected() {
        let layout = LayoutFile {
            blocks: vec![
                entry("a", BlockKind::Router, 0, 0),
                entry("b", BlockKind::Router, 0, 0),
            ],
            ..LayoutFile::default()
        };
        let result = build_world(&layout);
        assert!(matches!(
            result,
            Err(DataLoadError::Grid { ref name, source: GridError::Occupied(_), .. }) if name == "b"
        ));
    }

    #[test]
    fn unresolved_link_rejected() {
        let layout = LayoutFile {
            blocks: vec![entry("a", BlockKind::Router, 0, 0)],
            links: vec![LinkEntry {
                from: "a".into(),
                to: "ghost".into(),
            }],
            ..LayoutFile::default()
        };
        let result = build_world(&layout);
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "block", .. }) if name == "ghost"
        ));
    }

    #[test]
    fn non_linkable_link_is_skipped() {
        let layout = LayoutFile {
            blocks: vec![
                entry("a", BlockKind::Router, 0, 0),
                entry("b", BlockKind::Router, 1, 0),
            ],
            links: vec![LinkEntry {
                from: "a".into(),
                to: "b".into(),
            }],
            ..LayoutFile::default()
        };
        let loaded = build_world(&layout).unwrap();
        assert_eq!(loaded.world.node_count(), 2);
    }

    #[test]
    fn bridge_link_sets_both_ends() {
        let bridge = BlockKind::ItemBridge(flowscan_core::block::BridgeConfig::with_range(4));
        let layout = LayoutFile {
            blocks: vec![entry("in", bridge.clone(), 0, 0), entry("out", bridge, 3, 0)],
            links: vec![LinkEntry {
                from: "in".into(),
                to: "out".into(),
            }],
            ..LayoutFile::default()
        };
        let loaded = build_world(&layout).unwrap();
        let world = &loaded.world;
        match &world.node(loaded.id("in").unwrap()).unwrap().kind {
            BlockKind::ItemBridge(cfg) => assert_eq!(cfg.link, Some(GridPosition::new(3, 0))),
            other => panic!("unexpected kind {other:?}"),
        }
        match &world.node(loaded.id("out").unwrap()).unwrap().kind {
            BlockKind::ItemBridge(cfg) => assert_eq!(cfg.incoming, vec![GridPosition::new(0, 0)]),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn layout_from_toml_file() {
        let dir = make_test_dir("layout_toml");
        let path = dir.join("line.toml");
        fs::write(
            &path,
            r#"
fog = true

[[blocks]]
name = "belt"
kind = { Conveyor = { armored = false } }
x = 0
y = 0
rotation = "East"

[[blocks]]
name = "router"
kind = "Router"
x = 1
y = 0
team = 2

[[reveal]]
team = 0
min = { x = 1, y = 0 }
max = { x = 1, y = 0 }
"#,
        )
        .unwrap();

        let loaded = load_layout(&path).unwrap();
        let router = loaded.id("router").unwrap();
        assert!(loaded.world.is_discovered_by(router, TeamId(0)));
        assert!(!loaded.world.is_discovered_by(router, TeamId(1)));

        cleanup(&dir);
    }

    #[test]
    fn layout_parse_error_names_file() {
        let dir = make_test_dir("layout_bad");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result = load_layout(&path);
        match result {
            Err(DataLoadError::Parse { file, .. }) => assert_eq!(file, path),
            other => panic!("expected parse error, got {other:?}"),
        }

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::UnsupportedFormat {
            file: PathBuf::from("layout.yaml"),
        };
        assert!(format!("{e}").contains("layout.yaml"));

        let e = DataLoadError::Parse {
            file: PathBuf::from("bad.ron"),
            detail: "syntax error".to_string(),
        };
        assert!(format!("{e}").contains("bad.ron"));
        assert!(format!("{e}").contains("syntax error"));

        let e = DataLoadError::Grid {
            file: PathBuf::from("layout.ron"),
            name: "vault".to_string(),
            source: GridError::InvalidSize,
        };
        let msg = format!("{e}");
        assert!(msg.contains("vault"));
        assert!(msg.contains("at least 1"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
