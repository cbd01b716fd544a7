//! Data model and CSV persistence for grouped image clicks.
//!
//! A [`GroupedPointStore`] keeps named groups of clicked points in insertion
//! order together with a current-group cursor. Viewers and controllers drive
//! it through plain method calls and persist it with the CSV codec.

pub mod codec;
pub mod pointer;
pub mod prelude;
pub mod store;
pub mod telemetry;

pub use pointer::PointerEvent;
pub use prelude::{Point, StoreError, StoreResult, DEFAULT_GROUP};
pub use store::{ClickMapping, Group, GroupedPointStore};
