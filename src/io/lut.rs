//! FreeSurfer colour lookup tables (`FreeSurferColorLUT.txt` and friends)
//!
//! One region per line: `index name r g b a`. Blank lines and `#` comments are
//! ignored. Missing colour columns read as 0.

use std::path::Path;

use crate::atlas::{AtlasEntry, AtlasTable};
use crate::error::{LocalizeError, Result};

pub fn parse_lut(text: &str) -> Result<AtlasTable> {
    let mut table = AtlasTable::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() { continue }
        let bad = |reason: String| LocalizeError::LookupTable { line: n + 1, reason };

        let mut fields = line.split_whitespace();
        let index = fields.next().unwrap_or("");
        let index: u32 = index.parse().map_err(|e| bad(format!("index '{index}': {e}")))?;
        let label = fields.next().ok_or_else(|| bad("missing label".into()))?.to_string();
        let mut rgba = [0_u8; 4];
        for (c, field) in rgba.iter_mut().zip(fields.by_ref()) {
            *c = field.parse().map_err(|e| bad(format!("colour '{field}': {e}")))?;
        }
        if fields.next().is_some() { return Err(bad("too many columns".into())) }
        table.insert(index, AtlasEntry { label, rgba });
    }
    Ok(table)
}

pub fn read_lut(path: &Path) -> Result<AtlasTable> {
    parse_lut(&std::fs::read_to_string(path)?)
}
