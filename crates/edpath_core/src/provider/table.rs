use std::{collections::HashMap, fs, path::Path};

use crate::{Coords, Error, Result, provider::CoordinateSource};

/// In-memory coordinates keyed by case-insensitive name.
///
/// Loads from JSON shaped as `{"Name": [x, y, z], ...}`.
#[derive(Clone, Debug, Default)]
pub struct CoordinateTable {
    entries: HashMap<String, Coords>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<f64>> = serde_json::from_str(raw)?;
        let mut table = Self::new();
        for (name, components) in parsed {
            let coords = Coords::from_components(&components)
                .map_err(|e| Error::invalid_input(format!("coordinates of {name:?}: {e}")))?;
            table.insert(&name, coords);
        }
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let table = Self::from_json_str(&raw)?;
        log::debug!(
            "coords: loaded table path={} entries={}",
            path.display(),
            table.len()
        );
        Ok(table)
    }

    pub fn insert(&mut self, name: &str, coords: Coords) {
        self.entries.insert(name.to_lowercase(), coords);
    }

    pub fn with(mut self, name: &str, coords: Coords) -> Self {
        self.insert(name, coords);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CoordinateSource for CoordinateTable {
    fn resolve(&self, name: &str) -> Result<Coords> {
        self.entries
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| Error::not_found(format!("no coordinates for {name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateTable;
    use crate::{Coords, Error, provider::CoordinateSource};

    #[test]
    fn loads_json_and_ignores_case() {
        let table = CoordinateTable::from_json_str(
            r#"{"Sagittarius A*": [25.21875, -20.90625, 25899.96875], "Sol": [0, 0, 0]}"#,
        )
        .expect("table");

        assert_eq!(table.len(), 2);
        let sgr = table.resolve("sagittarius a*").expect("resolve");
        assert_eq!(sgr, Coords::new(25.21875, -20.90625, 25899.96875));
    }

    #[test]
    fn unknown_names_are_not_found() {
        let table = CoordinateTable::new().with("Sol", Coords::new(0.0, 0.0, 0.0));
        let err = table.resolve("Achenar").expect_err("unknown");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn short_coordinates_are_invalid_input() {
        let err = CoordinateTable::from_json_str(r#"{"Sol": [0, 0]}"#).expect_err("two components");
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("\"Sol\""));
    }
}
