//! Polyline export as two-column CSV

use crate::Result;
use crate::plot::Polyline2D;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export a polyline to a CSV file
pub fn export_csv(line: &Polyline2D, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(line, &mut writer)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), points = line.len(), "wrote CSV");
    Ok(())
}

/// Write `x,y` rows under a header; non-finite samples are written as empty cells
pub fn write_csv<W: Write>(line: &Polyline2D, writer: &mut W) -> Result<()> {
    if line.x.len() != line.y.len() {
        return Err(crate::Error::Export(format!(
            "polyline has {} x values and {} y values",
            line.x.len(),
            line.y.len()
        )));
    }

    writeln!(writer, "x,y")?;
    for (x, y) in line.points() {
        writeln!(writer, "{},{}", cell(x), cell(y))?;
    }
    Ok(())
}

fn cell(v: f64) -> String {
    if v.is_finite() { v.to_string() } else { String::new() }
}
