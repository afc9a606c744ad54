//! Electrode table export: one CSV row per contact, with coordinates in
//! surface RAS and in MNI305 template space.

use std::io::Write;
use std::path::Path;

use serde::{Serialize, Serializer};

use geometry::{Point, Transform};
use units::todo::Lengthf32;
use crate::electrode::Hemisphere;
use crate::error::Result;

/// The subject's registration to the MNI305 template
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubjectTransforms {
    /// FreeSurfer surface RAS (tkrRAS) to scanner RAS
    pub tkr_ras_to_scanner: Transform,
    /// Scanner RAS to MNI305 (`talairach.xfm`)
    pub scanner_to_mni305: Transform,
}

impl SubjectTransforms {
    pub fn scanner(&self, p: &Point) -> Point { self.tkr_ras_to_scanner.point_to_world(p) }
    pub fn mni305 (&self, p: &Point) -> Point { self.scanner_to_mni305.point_to_world(&self.scanner(p)) }
}

fn r_logical<S: Serializer>(b: &bool, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(if *b { "TRUE" } else { "FALSE" })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportRow {
    pub electrode: String,
    pub label: String,
    #[serde(serialize_with = "r_logical")]
    pub valid: bool,
    #[serde(rename = "Coord_x")] pub coord_x: Lengthf32,
    #[serde(rename = "Coord_y")] pub coord_y: Lengthf32,
    #[serde(rename = "Coord_z")] pub coord_z: Lengthf32,
    pub template_subject: String,
    #[serde(serialize_with = "r_logical")]
    pub surface_electrode: bool,
    pub surface_type: String,
    pub radius: Lengthf32,
    pub vertex_number: i64,
    pub hemisphere: Hemisphere,
    pub distance_to_surface: Option<Lengthf32>,
    #[serde(rename = "MNI305_x")] pub mni305_x: Lengthf32,
    #[serde(rename = "MNI305_y")] pub mni305_y: Lengthf32,
    #[serde(rename = "MNI305_z")] pub mni305_z: Lengthf32,
}

/// Write rows, with a header line, as CSV
pub fn write_csv<W: Write>(rows: &[ExportRow], sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    for row in rows { writer.serialize(row)?; }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(rows: &[ExportRow], path: impl AsRef<Path>) -> Result<()> {
    write_csv(rows, std::fs::File::create(path)?)
}
