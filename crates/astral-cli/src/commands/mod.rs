pub mod find;
pub mod import;
pub mod plugins;
pub mod report;
pub mod run;
pub mod stats;
