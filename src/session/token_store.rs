//! Access token persistence: OS keyring first, encrypted file fallback.
//!
//! The fallback is a ChaCha20-Poly1305 sealed blob (`nonce || ciphertext`)
//! next to a random per-install key. Both files are owner-only on unix.

use std::io::Write;
use std::path::{Path, PathBuf};

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use crate::app_dirs;

const KEYRING_SERVICE: &str = "regresslab";
const KEYRING_ACCOUNT: &str = "api_access_token";
const DISABLE_KEYRING_ENV: &str = "REGRESSLAB_DISABLE_KEYRING";
const TOKEN_FILE: &str = "access_token.bin";
const KEY_FILE: &str = "access_token.key";
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),
    #[error("Could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Stored access token is unreadable: {0}")]
    Corrupt(&'static str),
    #[error("Secrets directory unavailable: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
}

/// Where the bearer token lives between launches.
#[derive(Clone, Debug)]
pub struct SessionTokenStore {
    file: SealedFile,
}

impl SessionTokenStore {
    /// Store with its file fallback in `<app root>/secrets`.
    pub fn new() -> Result<Self, TokenStoreError> {
        Ok(Self::new_in(app_dirs::secrets_dir()?))
    }

    pub fn new_in(dir: impl Into<PathBuf>) -> Self {
        Self {
            file: SealedFile { dir: dir.into() },
        }
    }

    pub fn get(&self) -> Result<Option<String>, TokenStoreError> {
        match keyring_entry().and_then(|entry| entry.get_password().ok()) {
            Some(token) => Ok(Some(token)),
            None => self.file.open(),
        }
    }

    /// Save the token. The keyring only counts once the value reads back;
    /// otherwise the sealed file is used. Blank tokens are ignored.
    pub fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }
        if let Some(entry) = keyring_entry()
            && entry.set_password(token).is_ok()
            && entry.get_password().ok().as_deref() == Some(token)
        {
            if let Err(err) = self.file.clear() {
                tracing::debug!("Leaving stale token file behind: {err}");
            }
            return Ok(());
        }
        tracing::debug!("Keyring unavailable; sealing access token to disk");
        self.file.seal(token)
    }

    pub fn delete(&self) -> Result<(), TokenStoreError> {
        if let Some(entry) = keyring_entry() {
            let _ = entry.delete_credential();
        }
        self.file.clear()
    }
}

fn keyring_entry() -> Option<keyring::Entry> {
    let disabled = std::env::var(DISABLE_KEYRING_ENV)
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
    if disabled {
        return None;
    }
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT).ok()
}

/// Token encrypted at rest with a key stored beside it.
#[derive(Clone, Debug)]
struct SealedFile {
    dir: PathBuf,
}

impl SealedFile {
    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    fn open(&self) -> Result<Option<String>, TokenStoreError> {
        let Some(blob) = read_optional(&self.token_path())? else {
            return Ok(None);
        };
        let Some(key) = read_optional(&self.key_path())? else {
            return Err(TokenStoreError::Corrupt("encryption key is missing"));
        };
        if blob.len() < NONCE_LEN {
            return Err(TokenStoreError::Corrupt("token file is truncated"));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = cipher(&key)?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenStoreError::Corrupt("token failed authentication"))?;
        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|_| TokenStoreError::Corrupt("token is not UTF-8"))
    }

    fn seal(&self, token: &str) -> Result<(), TokenStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        let key = match read_optional(&self.key_path())? {
            Some(key) => key,
            None => {
                let key = random_bytes::<KEY_LEN>()?.to_vec();
                write_private(&self.key_path(), &key)?;
                key
            }
        };
        let nonce = random_bytes::<NONCE_LEN>()?;
        let ciphertext = cipher(&key)?
            .encrypt(Nonce::from_slice(&nonce), token.as_bytes())
            .map_err(|_| TokenStoreError::Unavailable("encryption failed".into()))?;
        write_private(&self.token_path(), &[nonce.as_slice(), ciphertext.as_slice()].concat())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        for path in [self.token_path(), self.key_path()] {
            match std::fs::remove_file(&path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                    return Err(io_error(&path, err));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn cipher(key: &[u8]) -> Result<ChaCha20Poly1305, TokenStoreError> {
    if key.len() != KEY_LEN {
        return Err(TokenStoreError::Corrupt("encryption key has the wrong length"));
    }
    Ok(ChaCha20Poly1305::new(Key::from_slice(key)))
}

fn random_bytes<const N: usize>() -> Result<[u8; N], TokenStoreError> {
    use rand::TryRngCore;
    let mut out = [0u8; N];
    rand::rngs::OsRng
        .try_fill_bytes(&mut out)
        .map_err(|err| TokenStoreError::Unavailable(err.to_string()))?;
    Ok(out)
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, TokenStoreError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path, err)),
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> Result<(), TokenStoreError> {
    let mut options = std::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .and_then(|mut file| file.write_all(bytes))
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> TokenStoreError {
    TokenStoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Forces the encrypted-file fallback for the duration of a test.
#[cfg(test)]
pub(crate) struct KeyringDisabledGuard {
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl KeyringDisabledGuard {
    pub(crate) fn new() -> Self {
        static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        let lock = LOCK.lock().unwrap_or_else(|err| err.into_inner());
        // SAFETY: every test touching this variable holds LOCK.
        unsafe {
            std::env::set_var(DISABLE_KEYRING_ENV, "1");
        }
        Self { _lock: lock }
    }
}

#[cfg(test)]
impl Drop for KeyringDisabledGuard {
    fn drop(&mut self) {
        // SAFETY: every test touching this variable holds LOCK.
        unsafe {
            std::env::remove_var(DISABLE_KEYRING_ENV);
        }
    }
}
