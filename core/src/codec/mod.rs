pub mod csv;

pub use self::csv::{load, read_csv, save, write_csv, HEADER};
