//! In-memory click store: named groups of ordered points plus a current-group
//! cursor.
//!
//! Every method either completes its mutation or returns an error with the
//! store untouched. The cursor always names an existing group; removing the
//! last group re-seeds [`DEFAULT_GROUP`].

pub mod group;
pub mod mapping;

pub use group::Group;
pub use mapping::ClickMapping;

use crate::codec;
use crate::prelude::{Point, StoreError, StoreResult, DEFAULT_GROUP};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedPointStore {
    groups: Vec<Group>,
    current: usize,
}

impl GroupedPointStore {
    pub fn new() -> Self {
        Self {
            groups: vec![Group::new(DEFAULT_GROUP)],
            current: 0,
        }
    }

    /// Builds a store from already-validated groups; the first becomes current.
    pub(crate) fn from_groups(groups: Vec<Group>) -> Self {
        if groups.is_empty() {
            return Self::new();
        }
        Self { groups, current: 0 }
    }

    pub fn current_group(&self) -> &str {
        self.groups[self.current].name()
    }

    /// Group names in insertion order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(Group::name)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Creates an empty group; existing groups are left alone.
    pub fn add_group(&mut self, name: &str) -> StoreResult<()> {
        validate_name(name)?;
        self.ensure_group(name);
        Ok(())
    }

    /// Moves the cursor to an existing group.
    pub fn select_group(&mut self, name: &str) -> StoreResult<()> {
        let index = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        self.current = index;
        Ok(())
    }

    /// Selects `name`, creating it first when missing.
    pub fn set_group(&mut self, name: &str) -> StoreResult<()> {
        validate_name(name)?;
        self.current = self.ensure_group(name);
        Ok(())
    }

    /// Deletes a group and returns its clicks.
    pub fn remove_group(&mut self, name: Option<&str>) -> StoreResult<Vec<Point>> {
        let index = self.index_of(name)?;
        let removed = self.groups.remove(index);

        if self.groups.is_empty() {
            self.groups.push(Group::new(DEFAULT_GROUP));
            self.current = 0;
        } else if index == self.current {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        }

        Ok(removed.into_points())
    }

    pub fn rename_group(&mut self, old: &str, new: &str) -> StoreResult<()> {
        let index = self
            .position(old)
            .ok_or_else(|| StoreError::NotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        if self.contains_group(new) {
            return Err(StoreError::Conflict(new.to_string()));
        }
        self.groups[index].rename(new);
        Ok(())
    }

    /// Appends a click, creating the target group when it does not exist.
    pub fn add_click(
        &mut self,
        x: Option<i64>,
        y: Option<i64>,
        group: Option<&str>,
    ) -> StoreResult<()> {
        let point = Point::new(x, y)?;
        self.add_point(point, group)
    }

    /// Appends an already-built point; shares the creation rules of
    /// [`add_click`](Self::add_click).
    pub fn add_point(&mut self, point: Point, group: Option<&str>) -> StoreResult<()> {
        let index = match group {
            Some(name) => {
                validate_name(name)?;
                self.ensure_group(name)
            }
            None => self.current,
        };
        self.groups[index].push(point);
        Ok(())
    }

    pub fn get_click(&self, index: usize, group: Option<&str>) -> StoreResult<Point> {
        let target = &self.groups[self.index_of(group)?];
        target.get(index).ok_or_else(|| out_of_range(target, index))
    }

    /// Removes one click; later clicks shift down by one.
    pub fn remove_click(&mut self, index: usize, group: Option<&str>) -> StoreResult<Point> {
        let position = self.index_of(group)?;
        let target = &mut self.groups[position];
        match target.remove(index) {
            Some(point) => Ok(point),
            None => Err(out_of_range(target, index)),
        }
    }

    /// Empties a group in place and returns how many clicks were dropped.
    pub fn clear_group(&mut self, group: Option<&str>) -> StoreResult<usize> {
        let position = self.index_of(group)?;
        Ok(self.groups[position].clear())
    }

    pub fn extract_group(&self, group: Option<&str>) -> StoreResult<&[Point]> {
        Ok(self.groups[self.index_of(group)?].points())
    }

    pub fn to_mapping(&self) -> ClickMapping {
        self.groups
            .iter()
            .map(|group| (group.name().to_string(), group.points().to_vec()))
            .collect()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        codec::csv::save(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        codec::csv::load(path)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.name() == name)
    }

    fn index_of(&self, group: Option<&str>) -> StoreResult<usize> {
        match group {
            Some(name) => self
                .position(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string())),
            None => Ok(self.current),
        }
    }

    fn ensure_group(&mut self, name: &str) -> usize {
        match self.position(name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        }
    }
}

impl Default for GroupedPointStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument(
            "group name must not be empty".into(),
        ));
    }
    Ok(())
}

fn out_of_range(group: &Group, index: usize) -> StoreError {
    StoreError::OutOfRange {
        group: group.name().to_string(),
        index,
        len: group.len(),
    }
}
