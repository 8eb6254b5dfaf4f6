//! CLI command implementations

pub mod inspect;
pub mod simulate;

use std::path::Path;

use trailhead_core::Result;
use trailhead_terrain::HeightField;

/// Decode a heightmap by extension: `.png` through the image decoder, anything else as raw u16
pub fn load_heightmap(path: &Path, dimension: Option<usize>) -> Result<HeightField> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        HeightField::from_png(path)
    } else {
        HeightField::from_raw_file(path, dimension)
    }
}
