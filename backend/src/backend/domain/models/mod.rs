pub mod event;
pub mod profile;
