pub mod advisor;
pub mod json_scan;
pub mod prompt;
pub mod weather;
