use crate::prelude::Point;

/// A named, ordered run of clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    points: Vec<Point>,
}

impl Group {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub(crate) fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.points.len();
        self.points.clear();
        removed
    }

    pub(crate) fn into_points(self) -> Vec<Point> {
        self.points
    }
}
