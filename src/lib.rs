pub mod config;
pub mod content;
pub mod db;
pub mod i18n;
pub mod localizer;
pub mod migration;
pub mod resolver;
pub mod security;
pub mod server;
pub mod store;
