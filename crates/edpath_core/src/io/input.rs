use std::{collections::HashMap, fs, io::Read, path::Path, sync::Arc};

use crate::{
    Error, Result, Waypoint, WaypointKind, WaypointPath, constants::MINOR_MARKER,
    provider::CoordinateSource,
};

const REF_MARKER: &str = "Ref:";
const LABEL_SEPARATOR: &str = " - ";

/// One parsed line of a waypoint list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaypointEntry {
    pub name: String,
    pub label: String,
    pub kind: WaypointKind,
}

/// Parses a line-oriented waypoint list.
///
/// Accepted lines:
/// - `Label - GalMap Ref: Canonical Name`
/// - `Canonical Name/Label`
/// - `Canonical Name`
///
/// Blank lines and `#` comments are skipped. A `_` at the start of the line
/// or the end of the name marks a minor waypoint.
pub fn parse_waypoint_list(text: &str) -> Result<Vec<WaypointEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry = parse_line(line)
            .map_err(|e| Error::invalid_input(format!("line {}: {e}", idx + 1)))?;
        entries.push(entry);
    }

    if entries.len() < 2 {
        return Err(Error::invalid_input(format!(
            "a waypoint list needs a start and a finish, got {} entr{}",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" }
        )));
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Result<WaypointEntry> {
    let mut kind = WaypointKind::Major;
    let mut line = line;
    if let Some(rest) = line.strip_prefix(MINOR_MARKER) {
        kind = WaypointKind::Minor;
        line = rest.trim_start();
    }

    let (name, label) = if let Some(idx) = line.find(REF_MARKER) {
        let head = &line[..idx];
        let label = head
            .rsplit_once(LABEL_SEPARATOR)
            .map_or("", |(label, _)| label);
        (&line[idx + REF_MARKER.len()..], label)
    } else if let Some((name, label)) = line.split_once('/') {
        (name, label)
    } else {
        (line, line)
    };

    let mut name = name.trim();
    if let Some(rest) = name.strip_suffix(MINOR_MARKER) {
        kind = WaypointKind::Minor;
        name = rest.trim_end();
    }
    if name.is_empty() {
        return Err(Error::invalid_input(format!("no waypoint name in {line:?}")));
    }

    let label = label.trim().trim_end_matches(MINOR_MARKER).trim_end();
    let label = if label.is_empty() { name } else { label };

    Ok(WaypointEntry {
        name: name.to_string(),
        label: label.to_string(),
        kind,
    })
}

/// Reads a waypoint list from `path`, or from stdin when `path` is `None`.
pub fn read_waypoint_list(path: Option<&Path>) -> Result<Vec<WaypointEntry>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_waypoint_list(&text)
}

/// Turns parsed entries into waypoints, creating each identity once so legs
/// that share a waypoint share its distance cache too.
pub struct WaypointResolver<S> {
    source: S,
    known: HashMap<String, Arc<Waypoint>>,
}

impl<S: CoordinateSource> WaypointResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            known: HashMap::new(),
        }
    }

    pub fn waypoint(&mut self, entry: &WaypointEntry) -> Result<Arc<Waypoint>> {
        if let Some(wp) = self.known.get(&entry.name) {
            return Ok(Arc::clone(wp));
        }
        let coords = self.source.resolve(&entry.name)?;
        let wp = Waypoint::new(entry.name.as_str(), coords)
            .with_label(entry.label.as_str())
            .with_kind(entry.kind)
            .shared();
        self.known.insert(entry.name.clone(), Arc::clone(&wp));
        Ok(wp)
    }

    /// Resolves every entry; a single failure fails the whole path.
    pub fn path(&mut self, entries: &[WaypointEntry]) -> Result<WaypointPath> {
        let waypoints = entries
            .iter()
            .map(|entry| self.waypoint(entry))
            .collect::<Result<Vec<_>>>()?;
        WaypointPath::new(waypoints)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
