use anyhow::Context;
use clickcore::{ClickMapping, GroupedPointStore, Point};

const ABSENT: &str = "-";

/// Click table for one group; rows are numbered from 1.
pub fn render_group(name: &str, points: &[Point]) -> String {
    let mut out = format!("Group '{}' ({} clicks)\n", name, points.len());
    out.push_str(&format!(
        "{:>5}  {:>8}  {:>8}\n",
        "Index", "Click X", "Click Y"
    ));
    for (row, point) in points.iter().enumerate() {
        out.push_str(&format!(
            "{:>5}  {:>8}  {:>8}\n",
            row + 1,
            cell(point.x),
            cell(point.y)
        ));
    }
    out
}

pub fn render_groups(store: &GroupedPointStore) -> String {
    let current = store.current_group();
    store
        .groups()
        .iter()
        .map(|group| {
            let marker = if group.name() == current { '*' } else { ' ' };
            format!("{} {} ({} clicks)\n", marker, group.name(), group.len())
        })
        .collect()
}

pub fn render_json(mapping: &ClickMapping) -> anyhow::Result<String> {
    serde_json::to_string_pretty(mapping).context("serializing click mapping")
}

fn cell(value: Option<i64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| v.to_string())
}
