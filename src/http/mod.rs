pub mod executor;
pub mod method;
pub mod payload;
pub mod transport;
