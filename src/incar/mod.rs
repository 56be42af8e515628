/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! INCAR codec
//!
//! An INCAR file is a flat list of `TAG = value` assignments. Values are
//! booleans (`.TRUE.` / `.FALSE.`), integers, reals, bare strings, or
//! whitespace-separated lists of those; the `n*value` repeat shorthand is
//! expanded on parse. Tags are case-insensitive and stored lowercase;
//! writing emits them uppercase in sorted order. Unknown tags are carried
//! through untouched, the known-tag table only feeds diagnostics.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaspIoError};

/// INCAR tags recognized by the validation pass. Not exhaustive for every
/// VASP build, only the tags seen in common relaxation/SCF/NSCF decks.
static KNOWN_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "addgrid", "aexx", "algo", "amix", "bmix", "ediff", "ediffg", "emax", "emin", "encut",
        "gga", "gga_compat", "hfscreen", "ibrion", "icharg", "isif", "ismear", "ispin", "istart",
        "isym", "ivdw", "kpar", "lasph", "lcharg", "ldau", "ldauj", "ldaul", "ldautype", "ldauu",
        "lhfcalc", "lmaxmix", "lnoncollinear", "lorbit", "lreal", "lsorbit", "lwave", "magmom",
        "nbands", "nedos", "nelect", "nelm", "nelmin", "npar", "nsw", "nupdown", "potim", "prec",
        "sigma", "smass", "symprec", "system", "tebeg", "teend",
    ]
    .into_iter()
    .collect()
});

/// True when `tag` (any case) is in the known-tag table.
pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

/// A single INCAR value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncarValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
    /// Whitespace-separated list; elements are scalars, never nested lists
    List(Vec<IncarValue>),
}

impl fmt::Display for IncarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncarValue::Bool(true) => write!(f, ".TRUE."),
            IncarValue::Bool(false) => write!(f, ".FALSE."),
            IncarValue::Int(v) => write!(f, "{}", v),
            // Whole reals keep a decimal point so they parse back as reals
            IncarValue::Real(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            IncarValue::Real(v) => write!(f, "{}", v),
            IncarValue::Str(v) => write!(f, "{}", v),
            IncarValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for IncarValue {
    fn from(v: bool) -> Self {
        IncarValue::Bool(v)
    }
}

impl From<i64> for IncarValue {
    fn from(v: i64) -> Self {
        IncarValue::Int(v)
    }
}

impl From<f64> for IncarValue {
    fn from(v: f64) -> Self {
        IncarValue::Real(v)
    }
}

impl From<&str> for IncarValue {
    fn from(v: &str) -> Self {
        IncarValue::Str(v.to_string())
    }
}

impl IncarValue {
    /// Convert a JSON value into an INCAR value. Objects and nested
    /// arrays have no INCAR representation and are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Ok(IncarValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(IncarValue::Int(i))
                } else {
                    Ok(IncarValue::Real(n.as_f64().ok_or_else(|| {
                        VaspIoError::Validation(format!("unrepresentable number {}", n))
                    })?))
                }
            }
            Value::String(s) => Ok(IncarValue::Str(s.clone())),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let scalar = IncarValue::from_json(item)?;
                    if matches!(scalar, IncarValue::List(_)) {
                        return Err(VaspIoError::Validation(
                            "nested lists are not representable in INCAR".to_string(),
                        ));
                    }
                    out.push(scalar);
                }
                Ok(IncarValue::List(out))
            }
            Value::Null | Value::Object(_) => Err(VaspIoError::Validation(format!(
                "value {} is not representable in INCAR",
                value
            ))),
        }
    }
}

/// An INCAR parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incar {
    tags: BTreeMap<String, IncarValue>,
}

impl Incar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of tag -> value pairs.
    pub fn from_json(object: &serde_json::Value) -> Result<Self> {
        let map = object.as_object().ok_or_else(|| {
            VaspIoError::Validation("INCAR parameters must be a JSON object".to_string())
        })?;
        let mut incar = Incar::new();
        for (tag, value) in map {
            incar.set(tag, IncarValue::from_json(value)?);
        }
        Ok(incar)
    }

    pub fn get(&self, tag: &str) -> Option<&IncarValue> {
        self.tags.get(&tag.to_ascii_lowercase())
    }

    /// Set a tag, overwriting any previous value.
    pub fn set(&mut self, tag: &str, value: impl Into<IncarValue>) {
        self.tags.insert(tag.to_ascii_lowercase(), value.into());
    }

    /// Set a tag only when it is not already present. Returns whether the
    /// value was inserted.
    pub fn set_if_absent(&mut self, tag: &str, value: impl Into<IncarValue>) -> bool {
        let key = tag.to_ascii_lowercase();
        if self.tags.contains_key(&key) {
            return false;
        }
        self.tags.insert(key, value.into());
        true
    }

    pub fn remove(&mut self, tag: &str) -> Option<IncarValue> {
        self.tags.remove(&tag.to_ascii_lowercase())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags and values in sorted tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IncarValue)> + '_ {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convenience boolean read: absent tags are false.
    pub fn get_bool(&self, tag: &str) -> bool {
        matches!(self.get(tag), Some(IncarValue::Bool(true)))
    }

    /// Log a warning for every tag not in the known-tag table and return
    /// the offenders.
    pub fn unknown_tags(&self) -> Vec<&str> {
        let mut unknown = Vec::new();
        for tag in self.tags.keys() {
            if !KNOWN_TAGS.contains(tag.as_str()) {
                warn!("unrecognized INCAR tag {}", tag.to_uppercase());
                unknown.push(tag.as_str());
            }
        }
        unknown
    }
}

/// Serialize to INCAR text: one sorted `TAG = value` line per tag.
pub fn incar_to_string(incar: &Incar) -> String {
    let mut out = String::new();
    for (tag, value) in incar.iter() {
        out.push_str(&format!("{} = {}\n", tag.to_uppercase(), value));
    }
    out
}

/// Write an INCAR file, truncating any existing file.
pub fn write_incar<P: AsRef<Path>>(incar: &Incar, path: P) -> Result<()> {
    debug!("writing INCAR to {}", path.as_ref().display());
    let mut file = File::create(path)?;
    file.write_all(incar_to_string(incar).as_bytes())?;
    Ok(())
}

/// Parse an INCAR file from disk.
pub fn parse_incar<P: AsRef<Path>>(path: P) -> Result<Incar> {
    let content = std::fs::read_to_string(path)?;
    parse_incar_str(&content)
}

/// Parse INCAR-format text.
pub fn parse_incar_str(content: &str) -> Result<Incar> {
    let mut incar = Incar::new();
    for (i, raw_line) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        // Several assignments may share a line, separated by semicolons.
        for clause in line.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            let (tag, value_text) = clause.split_once('=').ok_or_else(|| {
                VaspIoError::format(line_no, raw_line, "expected TAG = value")
            })?;
            let tag = tag.trim();
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(VaspIoError::format(
                    line_no,
                    raw_line,
                    format!("invalid INCAR tag {:?}", tag),
                ));
            }
            let value = parse_value(value_text.trim(), line_no, raw_line)?;
            incar.set(tag, value);
        }
    }
    Ok(incar)
}

fn strip_comment(line: &str) -> &str {
    match line.find(|c| c == '#' || c == '!') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_value(text: &str, line_no: usize, raw_line: &str) -> Result<IncarValue> {
    if text.is_empty() {
        return Err(VaspIoError::format(line_no, raw_line, "missing value"));
    }
    let mut scalars = Vec::new();
    for token in text.split_whitespace() {
        // n*value expands to n copies of the scalar
        if let Some((count, rest)) = token.split_once('*') {
            if let Ok(count) = count.parse::<usize>() {
                if rest.is_empty() {
                    return Err(VaspIoError::format(
                        line_no,
                        raw_line,
                        format!("repeat shorthand {:?} has no value", token),
                    ));
                }
                let scalar = parse_scalar(rest);
                scalars.extend(std::iter::repeat(scalar).take(count));
                continue;
            }
        }
        scalars.push(parse_scalar(token));
    }
    if scalars.len() == 1 {
        Ok(scalars.pop().unwrap())
    } else {
        Ok(IncarValue::List(scalars))
    }
}

fn parse_scalar(token: &str) -> IncarValue {
    let upper = token.trim_matches('.').to_ascii_uppercase();
    match upper.as_str() {
        "TRUE" | "T" => return IncarValue::Bool(true),
        "FALSE" | "F" => return IncarValue::Bool(false),
        _ => {}
    }
    if let Ok(v) = token.parse::<i64>() {
        return IncarValue::Int(v);
    }
    if let Ok(v) = token.parse::<f64>() {
        return IncarValue::Real(v);
    }
    IncarValue::Str(token.to_string())
}
