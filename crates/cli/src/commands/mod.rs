pub mod chains;
pub mod config;
pub mod price;
pub mod report;
pub mod scan;
