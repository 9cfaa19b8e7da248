// config.rs
//
// Turns a config file into a Vec<UnitClassConfig>, one entry per
// non-blank, non-`#` line of the form `"<class>": {"fu": N, "rs": N,
// "cc": N}`.
//
// The reference tool (original_source/tomsim/tomsim/tomsim.cpp,
// readConfigFile) never actually parses JSON: it walks each line with
// find/substr to pull out the class name and the three integers, and is
// documented to tolerate stray whitespace. We keep that tolerance by
// trying serde_json on the line first (most config files found in the
// wild for this format are valid JSON fragments) and falling back to
// the original's substring scan when that fails, so both well-formed
// and loosely-formatted lines parse the same way the original tool did.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use crate::errors::SimError;
use crate::scheduler::UnitClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitClassConfig {
    pub class: UnitClass,
    pub num_fus: usize,
    pub num_rs: usize,
    pub latency: usize,
}

#[derive(Debug, Deserialize)]
struct RawFields {
    fu: usize,
    rs: usize,
    cc: usize,
}

pub fn load_unit_classes(path: &Path) -> Result<Vec<UnitClassConfig>, SimError> {
    let contents = fs::read_to_string(path)?;
    let mut classes = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (class_name, fields) = parse_line(line).ok_or_else(|| {
            SimError::ParseError(format!("line {}: could not parse `{}`", line_no + 1, line))
        })?;
        let class = class_from_name(&class_name).ok_or_else(|| {
            SimError::ConfigError(format!("line {}: unknown unit class `{}`", line_no + 1, class_name))
        })?;
        debug!(
            "config: {} -> fu={} rs={} cc={}",
            class.as_str(),
            fields.fu,
            fields.rs,
            fields.cc
        );
        if fields.cc == 0 {
            return Err(SimError::ConfigError(format!(
                "line {}: `cc` for {} must be a positive integer",
                line_no + 1,
                class_name
            )));
        }
        classes.push(UnitClassConfig {
            class,
            num_fus: fields.fu,
            num_rs: fields.rs,
            latency: fields.cc,
        });
    }

    for class in UnitClass::ALL {
        if !classes.iter().any(|c| c.class == class) {
            warn!(
                "config: class `{}` is absent; it will have zero functional units and zero \
                 reservation stations, which deadlocks any program that needs it",
                class.as_str()
            );
        }
    }

    Ok(classes)
}

fn class_from_name(name: &str) -> Option<UnitClass> {
    match name {
        "integer" => Some(UnitClass::Integer),
        "divider" => Some(UnitClass::Divider),
        "multiplier" => Some(UnitClass::Multiplier),
        "load" => Some(UnitClass::Load),
        "store" => Some(UnitClass::Store),
        _ => None,
    }
}

/// Splits a config line into its class name and `{fu, rs, cc}` fields,
/// trying strict JSON first and falling back to the original tool's
/// substring scan.
fn parse_line(line: &str) -> Option<(String, RawFields)> {
    if let Some((name, fields)) = parse_line_as_json(line) {
        return Some((name, fields));
    }
    parse_line_by_scan(line)
}

fn parse_line_as_json(line: &str) -> Option<(String, RawFields)> {
    let wrapped = format!("{{{}}}", line.trim_end_matches(','));
    let map: std::collections::HashMap<String, RawFields> = serde_json::from_str(&wrapped).ok()?;
    let (name, fields) = map.into_iter().next()?;
    Some((name, fields))
}

/// Mirrors readConfigFile's approach: find the quoted key, then walk
/// `"field": value` fragments by searching for `":"` and the next `,`
/// or `}`, without requiring the line to be syntactically valid JSON.
fn parse_line_by_scan(line: &str) -> Option<(String, RawFields)> {
    let key_start = line.find('"')? + 1;
    let key_end = line[key_start..].find('"')? + key_start;
    let key = line[key_start..key_end].to_string();

    let rest = &line[key_end..];
    let fu = scan_field(rest, "fu")?;
    let rs = scan_field(rest, "rs")?;
    let cc = scan_field(rest, "cc")?;

    Some((key, RawFields { fu, rs, cc }))
}

fn scan_field(text: &str, field: &str) -> Option<usize> {
    let needle = format!("\"{}\"", field);
    let field_start = text.find(&needle)? + needle.len();
    let colon = text[field_start..].find(':')? + field_start + 1;
    let rest = &text[colon..];
    let end = rest
        .find(|c: char| c == ',' || c == '}')
        .unwrap_or(rest.len());
    rest[..end].trim().parse().ok()
}
