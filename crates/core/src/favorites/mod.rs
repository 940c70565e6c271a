//! Favorites watch list

pub mod ports;
pub mod service;

pub use service::FavoritesService;
