use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_HOME: &str = "REGRESSLAB_CONFIG_HOME";
const DISABLE_KEYRING: &str = "REGRESSLAB_DISABLE_KEYRING";
const API_URL: &str = "REGRESSLAB_API_URL";

/// Points the app root at a temp dir and keeps tests off the OS keyring.
pub struct RegressLabEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl RegressLabEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = [CONFIG_HOME, DISABLE_KEYRING, API_URL]
            .into_iter()
            .map(|key| (key, std::env::var(key).ok()))
            .collect();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME, path);
            std::env::set_var(DISABLE_KEYRING, "1");
            std::env::remove_var(API_URL);
        }
        Self {
            previous,
            _lock: lock,
        }
    }

    #[allow(dead_code)]
    pub fn set_api_url(&self, value: &str) {
        // SAFETY: the guard holds the global env lock.
        unsafe {
            std::env::set_var(API_URL, value);
        }
    }
}

impl Drop for RegressLabEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
