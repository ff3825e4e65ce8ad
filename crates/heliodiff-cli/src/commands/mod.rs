pub mod config;
pub mod diff;
pub mod info;
pub mod plain;
pub mod run;
