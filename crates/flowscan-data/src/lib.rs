//! Flowscan Data -- file loading for scan configuration and world layouts.
//!
//! Both kinds of file may be written in RON, TOML, or JSON; the format is
//! picked from the file extension.

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, Format, LoadedLayout, build_world, load_config, load_layout, parse_config_str,
    parse_layout_str,
};
