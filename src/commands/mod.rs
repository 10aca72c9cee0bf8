pub mod fetch;
pub mod profile;
