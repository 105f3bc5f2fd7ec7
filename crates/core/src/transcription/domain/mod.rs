pub mod device;
pub mod transcriber;
pub mod transcript;
