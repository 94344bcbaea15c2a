pub mod file_store;
pub mod post_repository;
pub mod principal_repository;
pub mod profile_repository;
