pub mod batch;
pub mod sheet;
pub mod sync;
pub mod upload;
