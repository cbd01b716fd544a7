pub mod table;

pub use table::{render_group, render_groups, render_json};
