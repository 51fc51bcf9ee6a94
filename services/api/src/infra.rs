use chrono::Utc;
use credential_board::board::{ResumeRef, ResumeStore, ResumeStoreError, ResumeUpload};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes resumes under a single directory, creating it on first use.
#[derive(Debug, Clone)]
pub(crate) struct FsResumeStore {
    root: PathBuf,
}

impl FsResumeStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResumeStore for FsResumeStore {
    fn save(&self, upload: ResumeUpload) -> Result<ResumeRef, ResumeStoreError> {
        fs::create_dir_all(&self.root).map_err(|source| ResumeStoreError::Write {
            path: self.root.clone(),
            source,
        })?;

        let path = self.root.join(&upload.file_name);
        let size_bytes = upload.bytes.len() as u64;
        fs::write(&path, &upload.bytes).map_err(|source| ResumeStoreError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(ResumeRef {
            path: path.display().to_string(),
            content_type: upload.content_type,
            size_bytes,
            uploaded_at: Utc::now(),
        })
    }

    fn remove(&self, path: &str) -> Result<(), ResumeStoreError> {
        let path = PathBuf::from(path);
        if !path.starts_with(&self.root) {
            return Err(ResumeStoreError::Remove {
                source: io::Error::new(io::ErrorKind::InvalidInput, "outside the resume directory"),
                path,
            });
        }
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ResumeStoreError::Remove { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credential_board::board::UserId;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "credential-board-{label}-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    fn upload(file_name: &str, bytes: &[u8]) -> ResumeUpload {
        ResumeUpload {
            owner: UserId(7),
            file_name: file_name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn saves_under_the_configured_directory() {
        let root = scratch_dir("save");
        let store = FsResumeStore::new(root.join("nested"));

        let stored = store
            .save(upload("user_7_cv.pdf", b"%PDF-1.4"))
            .expect("resume written");

        let expected = root.join("nested").join("user_7_cv.pdf");
        assert_eq!(stored.path, expected.display().to_string());
        assert_eq!(stored.size_bytes, 8);
        assert_eq!(fs::read(&expected).expect("file exists"), b"%PDF-1.4");

        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn replaces_an_earlier_upload_with_the_same_name() {
        let root = scratch_dir("replace");
        let store = FsResumeStore::new(&root);

        store.save(upload("user_7_cv.pdf", b"old")).expect("first");
        store.save(upload("user_7_cv.pdf", b"newer")).expect("second");

        assert_eq!(
            fs::read(root.join("user_7_cv.pdf")).expect("file exists"),
            b"newer"
        );
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn removes_stored_files_and_tolerates_missing_ones() {
        let root = scratch_dir("remove");
        let store = FsResumeStore::new(&root);
        let stored = store
            .save(upload("user_7_cv.pdf", b"%PDF"))
            .expect("resume written");

        store.remove(&stored.path).expect("removed");
        assert!(!root.join("user_7_cv.pdf").exists());
        store.remove(&stored.path).expect("already gone");

        let outside = scratch_dir("outside");
        fs::write(&outside, b"keep me").expect("outside file written");
        let err = store
            .remove(&outside.display().to_string())
            .expect_err("outside the root");
        assert!(matches!(err, ResumeStoreError::Remove { .. }));
        assert!(outside.exists());

        fs::remove_file(&outside).expect("cleanup");
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn unwritable_root_reports_the_path() {
        let root = scratch_dir("blocked");
        fs::write(&root, b"not a directory").expect("blocker written");
        let store = FsResumeStore::new(&root);

        let err = store
            .save(upload("user_7_cv.pdf", b"%PDF"))
            .expect_err("root is a file");
        assert!(matches!(err, ResumeStoreError::Write { .. }));
        assert!(err.to_string().contains("credential-board-blocked"));

        fs::remove_file(&root).expect("cleanup");
    }
}
