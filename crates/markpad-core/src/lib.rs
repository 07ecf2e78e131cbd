pub mod app;
pub mod config;
pub mod db;
pub mod debounce;
pub mod documents;
pub mod export;
pub mod markdown;
pub mod storage;
pub mod store;
pub mod theme;
