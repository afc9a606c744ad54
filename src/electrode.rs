//! Localized contacts and the ordered chains they form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use geometry::{Point, Vector};
use units::todo::Lengthf32;
use crate::atlas::{AtlasLabel, UNKNOWN};
use crate::chain::ChainEstimate;
use crate::export::{ExportRow, SubjectTransforms};
use crate::grid::VolumeGrid;
use crate::refine::{refine, RefineParams};

/// Colour ramps for displaying shifts have this many entries
pub const SHIFT_PALETTE_SIZE: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere { Left, Right }

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Left => "left", Self::Right => "right" })
    }
}

impl Hemisphere {
    /// From FreeSurfer naming: `lh-`/`rh-` anywhere, or a `Left-`/`Right-` prefix
    pub fn from_label(label: &str) -> Option<Self> {
        if label.starts_with("Left-")  || label.contains("lh-") { return Some(Self::Left)  }
        if label.starts_with("Right-") || label.contains("rh-") { return Some(Self::Right) }
        None
    }

    /// Right of the anterior commissure is right
    pub fn from_x(x: Lengthf32, anterior_commissure_x: Lengthf32) -> Self {
        if x > anterior_commissure_x { Self::Right } else { Self::Left }
    }
}

/// How a contact was, or is being, localized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "CT/volume")] CtVolume,
    #[serde(rename = "MRI slice")] MriSlice,
    #[serde(rename = "refine")]    Refine,
    #[serde(rename = "disabled")]  Disabled,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CtVolume => "CT/volume",
            Self::MriSlice => "MRI slice",
            Self::Refine   => "refine",
            Self::Disabled => "disabled",
        }
    }

    /// New contacts can be placed in this mode
    pub fn can_add(&self) -> bool { matches!(self, Self::CtVolume | Self::MriSlice) }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ct/volume" | "ct" | "volume" => Ok(Self::CtVolume),
            "mri slice" | "mri" | "slice" => Ok(Self::MriSlice),
            "refine"                      => Ok(Self::Refine),
            "disabled"                    => Ok(Self::Disabled),
            _ => Err(format!("unknown localization mode '{s}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Electrode {
    pub order: usize,
    position: Point,
    initial_position: Point,
    /// Clinical label
    pub label: String,
    /// Electrode number within the subject
    pub electrode: String,
    pub hemisphere: Hemisphere,
    enabled: bool,
    pub mode: Mode,
    pub fs_label: String,
    pub fs_index: u32,
    /// Lead direction, recorded when the contact was interpolated
    pub constrain_axis: Option<Vector>,
    pub surface_electrode: bool,
    pub surface_type: String,
    pub radius: Lengthf32,
    pub vertex_number: i64,
    pub distance_to_surface: Option<Lengthf32>,
    pub notes: String,
}

impl Electrode {

    pub fn new(order: usize, position: Point, mode: Mode) -> Self {
        Self {
            order,
            position,
            initial_position: position,
            label: format!("NoLabel{order}"),
            electrode: order.to_string(),
            hemisphere: Hemisphere::from_x(position.x, 0.0),
            enabled: true,
            mode,
            fs_label: UNKNOWN.into(),
            fs_index: 0,
            constrain_axis: None,
            surface_electrode: false,
            surface_type: "pial".into(),
            radius: 1.0,
            vertex_number: -1,
            distance_to_surface: None,
            notes: String::new(),
        }
    }

    /// Record the atlas label, and infer the hemisphere from it if it names
    /// one; otherwise from the side of the anterior commissure.
    pub fn with_atlas_label(mut self, fs: AtlasLabel, anterior_commissure_x: Lengthf32) -> Self {
        self.hemisphere = Hemisphere::from_label(&fs.label)
            .unwrap_or_else(|| Hemisphere::from_x(self.position.x, anterior_commissure_x));
        self.fs_label = fs.label;
        self.fs_index = fs.index;
        self
    }

    pub fn position        (&self) -> Point { self.position }
    pub fn initial_position(&self) -> Point { self.initial_position }
    pub fn enabled         (&self) -> bool  { self.enabled }
    pub fn enable (&mut self) { self.enabled = true  }
    pub fn disable(&mut self) { self.enabled = false }

    /// A position with NaN or infinite components is invalid
    pub fn is_valid(&self) -> bool { self.position.iter().all(|x| x.is_finite()) }

    pub fn set_position(&mut self, p: Point) { self.position = p; }
    pub fn reset_position(&mut self) { self.position = self.initial_position; }

    /// Displacement from the current back to the initial position
    pub fn shift(&self) -> Vector { self.initial_position - self.position }

    /// Entry of a 64-colour ramp: one per tenth of a millimetre of shift
    pub fn shift_palette_index(&self) -> usize {
        let i = (self.shift().norm() * 10.0).floor();
        if i.is_finite() && i > 0.0 { (i as usize).min(SHIFT_PALETTE_SIZE - 1) } else { 0 }
    }

    /// `None` reverts to a placeholder label
    pub fn update_label(&mut self, label: Option<&str>) {
        self.label = match label {
            Some(l) if !l.trim().is_empty() => l.trim().to_string(),
            _ => format!("N/A {}", self.order),
        };
    }

    /// Manual edit: move by `step` along world `axis` (0, 1 or 2)
    pub fn nudge(&mut self, axis: usize, step: Lengthf32) {
        if axis > 2 { warn!(axis, "nudge: no such axis"); return }
        self.position[axis] += step;
    }

    /// Snap onto the intensity centroid of the CT around the contact. Only
    /// contacts localized in the volume are adjusted; returns the distance
    /// moved.
    pub fn adjust(&mut self, ct: &VolumeGrid, params: &RefineParams) -> Option<Lengthf32> {
        if self.mode != Mode::CtVolume || !self.is_valid() { return None }
        let refined = refine(self.position, ct, self.constrain_axis, params);
        let moved = (refined - self.position).norm();
        self.position = refined;
        Some(moved)
    }

    pub fn export_row(&self, transforms: &SubjectTransforms, template_subject: &str) -> ExportRow {
        let mni = transforms.mni305(&self.position);
        ExportRow {
            electrode: self.electrode.clone(),
            label: self.label.clone(),
            valid: self.is_valid(),
            coord_x: self.position.x,
            coord_y: self.position.y,
            coord_z: self.position.z,
            template_subject: template_subject.to_string(),
            surface_electrode: self.surface_electrode,
            surface_type: self.surface_type.clone(),
            radius: self.radius,
            vertex_number: self.vertex_number,
            hemisphere: self.hemisphere,
            distance_to_surface: self.distance_to_surface,
            mni305_x: mni.x,
            mni305_y: mni.y,
            mni305_z: mni.z,
        }
    }
}

/// The contacts of one subject, in order of localization
#[derive(Clone, Debug, Default)]
pub struct ElectrodeChain {
    electrodes: Vec<Electrode>,
    anterior_commissure_x: Lengthf32,
}

impl ElectrodeChain {
    pub fn new() -> Self { Self::default() }

    pub fn with_anterior_commissure(x: Lengthf32) -> Self {
        Self { electrodes: vec![], anterior_commissure_x: x }
    }

    pub fn len     (&self) -> usize { self.electrodes.len() }
    pub fn is_empty(&self) -> bool  { self.electrodes.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Electrode> { self.electrodes.iter() }
    pub fn last(&self) -> Option<&Electrode> { self.electrodes.last() }

    pub fn positions(&self) -> Vec<Point> { self.iter().map(Electrode::position).collect() }

    fn next_order(&self) -> usize { self.last().map_or(1, |e| e.order + 1) }

    pub fn get    (&self,     order: usize) -> Option<&    Electrode> { self.electrodes.iter()    .find(|e| e.order == order) }
    pub fn get_mut(&mut self, order: usize) -> Option<&mut Electrode> { self.electrodes.iter_mut().find(|e| e.order == order) }

    /// Add a contact; refused (`None`) in the refine and disabled modes
    pub fn add(&mut self, position: Point, mode: Mode, fs: Option<AtlasLabel>) -> Option<&mut Electrode> {
        if !mode.can_add() {
            debug!(%mode, "electrodes: not adding in this mode");
            return None
        }
        let mut electrode = Electrode::new(self.next_order(), position, mode);
        electrode.hemisphere = Hemisphere::from_x(position.x, self.anterior_commissure_x);
        if let Some(fs) = fs { electrode = electrode.with_atlas_label(fs, self.anterior_commissure_x); }
        debug!(order = electrode.order, ?position, "electrodes: added");
        self.electrodes.push(electrode);
        self.electrodes.last_mut()
    }

    pub fn dispose(&mut self, order: usize) -> Option<Electrode> {
        let i = self.electrodes.iter().position(|e| e.order == order)?;
        debug!(order, "electrodes: disposed");
        Some(self.electrodes.remove(i))
    }

    pub fn clear(&mut self) { self.electrodes.clear() }

    /// Refine every CT contact; returns how many moved
    pub fn adjust_all(&mut self, ct: &VolumeGrid, params: &RefineParams) -> usize {
        self.electrodes.iter_mut()
            .filter_map(|e| e.adjust(ct, params))
            .filter(|&moved| moved > 0.0)
            .count()
    }

    /// Replace the last contact by the interpolated ones, which end with the
    /// re-derived last contact. Each records the lead direction.
    pub fn apply_interpolation(
        &mut self,
        estimate: ChainEstimate,
        mode: Mode,
        mut atlas: impl FnMut(&Point) -> Option<AtlasLabel>,
    ) -> usize {
        if !mode.can_add() || estimate.positions.is_empty() { return 0 }
        self.electrodes.pop();
        self.append(estimate, mode, &mut atlas, true)
    }

    /// Append extrapolated contacts
    pub fn apply_extension(
        &mut self,
        estimate: ChainEstimate,
        mode: Mode,
        mut atlas: impl FnMut(&Point) -> Option<AtlasLabel>,
    ) -> usize {
        if !mode.can_add() { return 0 }
        self.append(estimate, mode, &mut atlas, false)
    }

    fn append(
        &mut self,
        estimate: ChainEstimate,
        mode: Mode,
        atlas: &mut impl FnMut(&Point) -> Option<AtlasLabel>,
        constrain: bool,
    ) -> usize {
        let count = estimate.positions.len();
        for p in estimate.positions {
            let fs = atlas(&p);
            if let Some(e) = self.add(p, mode, fs) {
                if constrain { e.constrain_axis = estimate.direction; }
            }
        }
        count
    }

    /// One row per contact; disabled ones only if asked for
    pub fn export_rows(
        &self,
        transforms: &SubjectTransforms,
        template_subject: &str,
        include_disabled: bool,
    ) -> Vec<ExportRow> {
        self.iter()
            .filter(|e| include_disabled || e.enabled())
            .map(|e| e.export_row(transforms, template_subject))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ElectrodeChain {
    type Item = &'a Electrode;
    type IntoIter = std::slice::Iter<'a, Electrode>;
    fn into_iter(self) -> Self::IntoIter { self.electrodes.iter() }
}
