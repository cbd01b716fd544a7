use crate::prelude::Point;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Owned, order-preserving snapshot of every group and its clicks.
///
/// Serializes as a map so JSON output keeps the store's group ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMapping {
    entries: Vec<(String, Vec<Point>)>,
}

impl ClickMapping {
    pub fn get(&self, name: &str) -> Option<&[Point]> {
        self.entries
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, points)| points.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Point])> {
        self.entries
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of clicks across all groups.
    pub fn click_count(&self) -> usize {
        self.entries.iter().map(|(_, points)| points.len()).sum()
    }
}

impl FromIterator<(String, Vec<Point>)> for ClickMapping {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Point>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ClickMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, points) in &self.entries {
            map.serialize_entry(name, points)?;
        }
        map.end()
    }
}
