#![allow(dead_code)]

pub mod fake_client;
pub mod scripted_console;

use log::LevelFilter;
use objprobe_core::{ProfileForm, ProfileStore, SessionManager};
use std::sync::Arc;

use fake_client::FakeClientFactory;

/// Logs appear only when you run with `-- --nocapture` or when the test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn form(host: &str, alias: &str) -> ProfileForm {
    ProfileForm {
        host: host.into(),
        access_key: "AK".into(),
        secret_key: "SK".into(),
        secure: true,
        alias: alias.into(),
    }
}

/// A session manager over a store inside `dir`, backed by `factory`.
pub fn sessions_in(dir: &std::path::Path, factory: &Arc<FakeClientFactory>) -> SessionManager {
    SessionManager::new(ProfileStore::in_dir(dir), factory.clone())
}
