// Library target shared by the binary, integration tests and benchmarks.
rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod provider;
pub mod session;
pub mod store;
pub mod tokenizer;
pub mod ui;
