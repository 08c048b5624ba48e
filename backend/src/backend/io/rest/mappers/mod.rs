pub mod event_mapper;
pub mod profile_mapper;
