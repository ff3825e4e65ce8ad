pub mod fits;

pub use fits::{load_frame, write_frame, FitsHeader};
