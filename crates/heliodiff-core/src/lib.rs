pub mod align;
pub mod consts;
pub mod diff;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod locate;
pub mod pipeline;
pub mod starfield;
pub mod stats;
pub mod suppress;
