//! File-backed token store using `cap_std` directory handles.
//!
//! The credential lives in one file inside a dedicated directory. Writes go
//! to a uniquely named staging file that is renamed over the live file, so
//! a crash never leaves a half-written token behind. Reads are served from
//! an in-memory copy loaded at open time.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::Credential;
use crate::domain::ports::{TokenStore, TokenStoreError};

/// File name holding the credential inside the store directory.
pub const CREDENTIAL_FILE: &str = "credential";

/// Token store persisting across process restarts.
#[derive(Debug)]
pub struct FileTokenStore {
    directory: Dir,
    path: PathBuf,
    cached: RwLock<Option<Credential>>,
}

fn io_error(path: &Path, error: io::Error) -> TokenStoreError {
    TokenStoreError::io(format!("{}: {error}", path.display()))
}

impl FileTokenStore {
    /// Open (creating if needed) the store rooted at `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when the directory cannot be created
    /// or read and [`TokenStoreError::Corrupt`] when the stored file is not
    /// UTF-8. The file holds the token byte for byte; only an empty file
    /// reads as signed out.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, TokenStoreError> {
        let root = directory.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| io_error(root, error))?;
        let handle = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| io_error(root, error))?;
        let path = root.join(CREDENTIAL_FILE);
        let cached = load(&handle, &path)?;
        debug!(path = %path.display(), present = cached.is_some(), "token store opened");
        Ok(Self {
            directory: handle,
            path,
            cached: RwLock::new(cached),
        })
    }

    /// Location of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, credential: &Credential) -> Result<(), TokenStoreError> {
        let staging = format!(".{CREDENTIAL_FILE}-{}.tmp", Uuid::new_v4().simple());
        let result = (|| -> io::Result<()> {
            self.directory.write(&staging, credential.expose().as_bytes())?;
            restrict_permissions(&self.directory, &staging)?;
            self.directory
                .rename(&staging, &self.directory, CREDENTIAL_FILE)
        })();
        if result.is_err() {
            let _cleanup_result = self.directory.remove_file(&staging);
        }
        result.map_err(|error| io_error(&self.path, error))
    }
}

fn load(directory: &Dir, path: &Path) -> Result<Option<Credential>, TokenStoreError> {
    let raw = match directory.read(CREDENTIAL_FILE) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(io_error(path, error)),
    };
    if raw.is_empty() {
        warn!(path = %path.display(), "ignoring empty credential file");
        return Ok(None);
    }
    let token = String::from_utf8(raw)
        .map_err(|error| TokenStoreError::corrupt(format!("{}: {error}", path.display())))?;
    Credential::new(token)
        .map(Some)
        .map_err(|error| TokenStoreError::corrupt(format!("{}: {error}", path.display())))
}

#[cfg(unix)]
fn restrict_permissions(directory: &Dir, file: &str) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = cap_std::fs::Permissions::from_std(std::fs::Permissions::from_mode(0o600));
    directory.set_permissions(file, permissions)
}

#[cfg(not(unix))]
fn restrict_permissions(_directory: &Dir, _file: &str) -> io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Credential> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: &Credential) -> Result<(), TokenStoreError> {
        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        self.write_atomically(credential)?;
        *cached = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        match self.directory.remove_file(CREDENTIAL_FILE) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(io_error(&self.path, error)),
        }
        cached.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn credential(token: &str) -> Credential {
        Credential::new(token).expect("token")
    }

    #[rstest]
    fn a_fresh_directory_has_no_credential(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path().join("nested/portal")).expect("open");
        assert!(store.get().is_none());
    }

    #[rstest]
    fn credentials_survive_reopening(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        store.set(&credential("first")).expect("set");
        store.set(&credential("second")).expect("replace");
        drop(store);

        let reopened = FileTokenStore::open(temp_dir.path()).expect("reopen");
        assert_eq!(reopened.get(), Some(credential("second")));
    }

    #[rstest]
    fn clearing_removes_the_file_and_is_idempotent(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        store.set(&credential("abc")).expect("set");
        store.clear().expect("clear");
        store.clear().expect("second clear");

        assert!(store.get().is_none());
        assert!(!store.path().exists());
    }

    #[rstest]
    fn no_staging_files_are_left_behind(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        store.set(&credential("abc")).expect("set");

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .expect("list")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![CREDENTIAL_FILE.to_owned()]);
    }

    #[cfg(unix)]
    #[rstest]
    fn credential_file_is_private(temp_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        store.set(&credential("abc")).expect("set");
        let mode = std::fs::metadata(store.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[rstest]
    fn empty_files_read_as_signed_out(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join(CREDENTIAL_FILE), b"").expect("seed");
        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        assert!(store.get().is_none());
    }

    #[rstest]
    #[case(" padded ")]
    #[case("line\n")]
    #[case("   ")]
    fn tokens_are_restored_byte_for_byte(temp_dir: TempDir, #[case] token: &str) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open");
        store.set(&credential(token)).expect("set");
        drop(store);

        let reopened = FileTokenStore::open(temp_dir.path()).expect("reopen");
        assert_eq!(
            reopened.get().map(|c| c.expose().to_owned()),
            Some(token.to_owned())
        );
    }

    #[rstest]
    fn non_utf8_files_are_corrupt(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join(CREDENTIAL_FILE), [0xff, 0xfe]).expect("seed");
        assert!(matches!(
            FileTokenStore::open(temp_dir.path()),
            Err(TokenStoreError::Corrupt { .. })
        ));
    }
}
