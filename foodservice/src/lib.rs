pub mod api;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;

#[cfg(any(feature = "server", test))]
pub mod auth;

#[cfg(any(feature = "server", test))]
pub mod formatter;

#[cfg(any(feature = "server", test))]
mod handlers;

#[cfg(any(feature = "server", test))]
pub mod places_client;

#[cfg(any(feature = "server", test))]
pub mod recipe_search;

#[cfg(any(feature = "server", test))]
pub mod recipes_repository;

#[cfg(any(feature = "server", test))]
pub mod recommendations;

#[cfg(any(feature = "server", test))]
pub mod recommendations_updater;

#[cfg(any(feature = "server", test))]
pub mod user_sessions;
