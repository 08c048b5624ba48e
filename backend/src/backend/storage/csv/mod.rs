//! Flat-file storage: CSV collections per profile, YAML for profiles and the
//! global configuration.

pub mod connection;
pub mod event_repository;
pub mod profile_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use event_repository::EventRepository;
pub use profile_repository::ProfileRepository;
