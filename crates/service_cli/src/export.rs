//! CSV export of value surfaces.

use std::path::{Path, PathBuf};

use pricer_pricing::mc::ValueSurface;
use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// File name of the exported panels.
pub const PANEL_FILE: &str = "value_function_panel.csv";

#[derive(Serialize)]
struct PanelRow<'a> {
    label: &'a str,
    x1: f64,
    x2: f64,
    value: f64,
}

/// Writes `label,x1,x2,value` rows for every surface into `dir`.
///
/// Returns the path of the written file.
pub fn write_panels(dir: &Path, surfaces: &[ValueSurface]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(PANEL_FILE);

    let mut writer = csv::Writer::from_path(&path)?;
    let mut rows = 0usize;
    for surface in surfaces {
        for point in &surface.points {
            writer.serialize(PanelRow {
                label: &surface.label,
                x1: point.x1,
                x2: point.x2,
                value: point.value,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    info!(
        path = %path.display(),
        panels = surfaces.len(),
        rows,
        "Value surfaces written"
    );
    Ok(path)
}
