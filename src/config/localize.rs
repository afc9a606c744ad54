//! Configuration file parser for the localization engine
//!
//! Every section, and every field within a section, is optional: missing ones
//! take the values with which the algorithms were tuned.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use units::{mm, mm_, Length};
use units::todo::{Intensityf32, Ratiof32};
use crate::atlas::DEFAULT_NEIGHBOURHOOD;
use crate::chain::Escalation;
use crate::error::Result;
use crate::refine::RefineParams;
use super::deserialize_uom;
use super::deserialize_uom_opt;

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)] pub raycast: Raycast,
    #[serde(default)] pub refine : Refine,
    #[serde(default)] pub atlas  : Atlas,
    #[serde(default)] pub chain  : Chain,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Raycast {
    /// Radius of the cylinder around the view ray in which voxels are hit
    #[serde(default = "default_tolerance")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub tolerance: Length,

    /// Project hits onto the view ray
    #[serde(default = "yes")]
    pub snap: bool,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Refine {
    /// Half-width of the search window
    #[serde(default = "default_max_step")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub max_step: Length,

    #[serde(default = "default_decay")]
    pub decay: f32,

    /// Intensity above which voxels count double (`ct_threshold_min`)
    #[serde(default)]
    pub high_confidence: Option<Intensityf32>,

    #[serde(default = "default_constrain_fraction")]
    pub constrain_fraction: Ratiof32,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Atlas {
    /// Half-width, in voxels, of the majority vote for unlabelled voxels
    #[serde(default = "default_neighbourhood")]
    pub neighbourhood: usize,

    /// Contacts with larger `x` are on the right, unless their label says otherwise
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_opt")]
    pub anterior_commissure_x: Option<Length>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Chain {
    #[serde(default = "default_tolerance_start")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub tolerance_start: Length,

    #[serde(default = "default_tolerance_step")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub tolerance_step: Length,

    #[serde(default = "default_tolerance_max")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub tolerance_max: Length,

    #[serde(default = "default_accept_radius")]
    #[serde(deserialize_with = "deserialize_uom")]
    pub accept_radius: Length,

    #[serde(default = "default_accept_growth")]
    pub accept_growth: Ratiof32,

    /// Keep refined contacts on the view ray rather than on the voxel hit
    #[serde(default)]
    pub snap: bool,
}

fn yes() -> bool { true }
fn default_tolerance         () -> Length   { mm(  2.0) }
fn default_max_step          () -> Length   { mm(  2.0) }
fn default_decay             () -> f32      {      8.0  }
fn default_constrain_fraction() -> Ratiof32 {      0.9  }
fn default_neighbourhood     () -> usize    { DEFAULT_NEIGHBOURHOOD }
fn default_tolerance_start   () -> Length   { mm(  0.5) }
fn default_tolerance_step    () -> Length   { mm(  0.5) }
fn default_tolerance_max     () -> Length   { mm(100.0) }
fn default_accept_radius     () -> Length   { mm( 10.0) }
fn default_accept_growth     () -> Ratiof32 {      0.1  }

impl Default for Raycast {
    fn default() -> Self { Self { tolerance: default_tolerance(), snap: yes() } }
}

impl Default for Refine {
    fn default() -> Self {
        Self {
            max_step: default_max_step(),
            decay: default_decay(),
            high_confidence: None,
            constrain_fraction: default_constrain_fraction(),
        }
    }
}

impl Default for Atlas {
    fn default() -> Self { Self { neighbourhood: default_neighbourhood(), anterior_commissure_x: None } }
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            tolerance_start: default_tolerance_start(),
            tolerance_step : default_tolerance_step(),
            tolerance_max  : default_tolerance_max(),
            accept_radius  : default_accept_radius(),
            accept_growth  : default_accept_growth(),
            snap           : false,
        }
    }
}

impl Refine {
    pub fn params(&self) -> RefineParams {
        RefineParams {
            max_step: mm_(self.max_step),
            decay: self.decay,
            high_confidence: self.high_confidence,
            constrain_fraction: self.constrain_fraction,
        }
    }
}

impl Chain {
    pub fn escalation(&self) -> Escalation {
        Escalation {
            start: mm_(self.tolerance_start),
            step : mm_(self.tolerance_step),
            max  : mm_(self.tolerance_max),
            accept_radius: mm_(self.accept_radius),
            accept_growth: self.accept_growth,
        }
    }
}

impl std::str::FromStr for Config {
    type Err = toml::de::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> { toml::from_str(s) }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config: String = fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
}
