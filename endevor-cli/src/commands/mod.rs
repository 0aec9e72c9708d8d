pub mod location;
pub mod report;
pub mod service;
pub mod sync;
