//! Anatomical labels for world points, read from a labelled atlas volume.
//!
//! Electrodes often sit exactly on voxels which the atlas leaves unlabelled
//! (region boundaries, sulci). Those fall back to a majority vote over a small
//! cubic neighbourhood.

use std::collections::HashMap;
use tracing::{debug, trace};

use geometry::Point;
use crate::grid::VolumeGrid;
use crate::index::window;
use units::todo::Intensityf32;

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_NEIGHBOURHOOD: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct AtlasEntry {
    pub label: String,
    pub rgba: [u8; 4],
}

/// Maps atlas voxel values to region names and colours
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasTable {
    entries: HashMap<u32, AtlasEntry>,
}

impl AtlasTable {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, index: u32, entry: AtlasEntry) -> Option<AtlasEntry> {
        self.entries.insert(index, entry)
    }

    pub fn get  (&self, index: u32) -> Option<&AtlasEntry> { self.entries.get(&index) }
    pub fn label(&self, index: u32) -> Option<&str> { self.get(index).map(|e| e.label.as_str()) }
    pub fn len     (&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool  { self.entries.is_empty() }
}

impl FromIterator<(u32, AtlasEntry)> for AtlasTable {
    fn from_iter<I: IntoIterator<Item = (u32, AtlasEntry)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasLabel {
    pub label: String,
    pub index: u32,
}

impl AtlasLabel {
    pub fn unknown() -> Self { Self { label: UNKNOWN.into(), index: 0 } }

    /// Look `index` up in `table`; a missing entry reads as [`UNKNOWN`]
    pub fn from_index(index: u32, table: &AtlasTable) -> Self {
        let label = table.label(index).unwrap_or(UNKNOWN).to_string();
        Self { label, index }
    }
}

/// Atlas voxels store label indices as floats. Background, and anything that
/// cannot be an index, reads as 0.
fn label_index(v: Intensityf32) -> u32 {
    if v.is_finite() && v >= 0.5 { v.round() as u32 } else { 0 }
}

/// Labels points against an atlas, keeping the vote tally between calls
pub struct Labeler {
    neighbourhood: usize,
    // (label, votes) in order of first appearance, which breaks ties
    votes: Vec<(u32, usize)>,
}

impl Default for Labeler {
    fn default() -> Self { Self::new(DEFAULT_NEIGHBOURHOOD) }
}

impl Labeler {
    pub fn new(neighbourhood: usize) -> Self { Self { neighbourhood, votes: vec![] } }

    pub fn label(&mut self, point: &Point, atlas: &VolumeGrid, table: &AtlasTable) -> AtlasLabel {
        let centre = atlas.nearest_voxel(point);
        let index = label_index(atlas.value(centre));
        if index != 0 { return AtlasLabel::from_index(index, table) }

        let Some(index) = self.majority(centre, atlas) else {
            trace!(?point, "atlas: unlabelled neighbourhood");
            return AtlasLabel::unknown()
        };
        debug!(?point, index, "atlas: label from neighbourhood vote");
        AtlasLabel::from_index(index, table)
    }

    fn majority(&mut self, [ci, cj, ck]: [usize; 3], atlas: &VolumeGrid) -> Option<u32> {
        let [nx, ny, nz] = atlas.dims();
        let h = self.neighbourhood;
        self.votes.clear();
        for i in window(ci, h, nx) {
            for j in window(cj, h, ny) {
                for k in window(ck, h, nz) {
                    let index = label_index(atlas.value([i, j, k]));
                    if index == 0 { continue }
                    match self.votes.iter_mut().find(|(l, _)| *l == index) {
                        Some((_, n)) => *n += 1,
                        None => self.votes.push((index, 1)),
                    }
                }
            }
        }
        let mut best: Option<(u32, usize)> = None;
        for &(index, n) in &self.votes {
            if best.map_or(true, |(_, most)| n > most) { best = Some((index, n)); }
        }
        best.map(|(index, _)| index)
    }
}

/// Label `point` with a fresh [`Labeler`] using the default neighbourhood
pub fn label_position(point: &Point, atlas: &VolumeGrid, table: &AtlasTable) -> AtlasLabel {
    Labeler::default().label(point, atlas, table)
}
