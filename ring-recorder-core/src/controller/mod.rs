pub mod driver;
pub mod recorder;
