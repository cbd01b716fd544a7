use crate::prelude::{Point, StoreResult};
use crate::store::GroupedPointStore;

/// Pointer gesture reported by a viewer, in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button: records the position, rounded to the nearest pixel.
    Primary { x: f64, y: f64 },
    /// Secondary button: records a placeholder without a position.
    Secondary,
}

impl PointerEvent {
    pub fn to_point(self) -> StoreResult<Point> {
        match self {
            PointerEvent::Primary { x, y } => Point::from_f64(x, y),
            PointerEvent::Secondary => Ok(Point::placeholder()),
        }
    }
}

impl GroupedPointStore {
    /// Appends the point for `event` and returns what was stored.
    pub fn record_pointer(
        &mut self,
        event: PointerEvent,
        group: Option<&str>,
    ) -> StoreResult<Point> {
        let point = event.to_point()?;
        self.add_point(point, group)?;
        Ok(point)
    }
}
