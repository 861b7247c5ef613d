pub mod model;
pub mod photo_store;
pub mod repository;
pub mod snapshot;
