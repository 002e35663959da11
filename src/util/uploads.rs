//! Attachment file storage.
//!
//! Files are copied into the workspace uploads directory as
//! `{ticket_id}_{unix_seconds}_{name}` and referenced from the database by
//! the URL-style path `/uploads/{stored_name}`. Storage only ever sees that
//! path; the bytes never pass through it.

use crate::error::{Result, TicketError};
use crate::model::NewAttachment;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// URL prefix recorded in `attachments.path`.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// A file copied into the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub attachment: NewAttachment,
    pub disk_path: PathBuf,
}

/// Copy `source` into `uploads_dir` for `ticket_id`.
///
/// # Errors
///
/// Returns `UploadSourceMissing` if `source` is not a readable file, or an
/// IO error if the copy fails.
pub fn store_upload(
    uploads_dir: &Path,
    ticket_id: i64,
    source: &Path,
    now: DateTime<Utc>,
) -> Result<StoredUpload> {
    let source = dunce::canonicalize(source).map_err(|_| TicketError::UploadSourceMissing {
        path: source.to_path_buf(),
    })?;
    if !source.is_file() {
        return Err(TicketError::UploadSourceMissing { path: source });
    }

    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    crate::validation::TicketValidator::validate_filename(&filename)?;

    fs::create_dir_all(uploads_dir)?;

    let safe_name = sanitize_filename(&filename);
    let (stored_name, disk_path, mut dest) =
        create_unique(uploads_dir, ticket_id, now, &safe_name)?;

    let copied = fs::File::open(&source).and_then(|mut src| io::copy(&mut src, &mut dest));
    let bytes = match copied {
        Ok(bytes) => bytes,
        Err(err) => {
            drop(dest);
            let _ = fs::remove_file(&disk_path);
            return Err(err.into());
        }
    };
    debug!(ticket_id, src = %source.display(), dest = %disk_path.display(), bytes, "Stored upload");

    Ok(StoredUpload {
        attachment: NewAttachment {
            content_type: guess_content_type(&filename),
            size_bytes: i64::try_from(bytes).ok(),
            path: format!("{UPLOADS_URL_PREFIX}/{stored_name}"),
            filename,
        },
        disk_path,
    })
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(name, "_");
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Create `{ticket_id}_{unix}_{name}` exclusively, adding a counter on collision.
fn create_unique(
    uploads_dir: &Path,
    ticket_id: i64,
    now: DateTime<Utc>,
    safe_name: &str,
) -> Result<(String, PathBuf, fs::File)> {
    let mut n = 0u32;
    loop {
        let stored_name = if n == 0 {
            format!("{ticket_id}_{}_{safe_name}", now.timestamp())
        } else {
            format!("{ticket_id}_{}_{n}_{safe_name}", now.timestamp())
        };
        let disk_path = uploads_dir.join(&stored_name);
        match OpenOptions::new().write(true).create_new(true).open(&disk_path) {
            Ok(file) => return Ok((stored_name, disk_path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(err) => return Err(err.into()),
        }
    }
}

/// Content type guessed from the file extension.
#[must_use]
pub fn guess_content_type(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn store_upload_records_size_and_path() {
        let temp = TempDir::new().expect("tempdir");
        let source = temp.path().join("error log.txt");
        fs::write(&source, b"hello world!").expect("write source");
        let uploads = temp.path().join("uploads");
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let stored = store_upload(&uploads, 7, &source, now).expect("store");

        assert_eq!(stored.attachment.filename, "error log.txt");
        assert_eq!(stored.attachment.size_bytes, Some(12));
        assert_eq!(stored.attachment.content_type.as_deref(), Some("text/plain"));
        assert_eq!(stored.attachment.path, "/uploads/7_1700000000_error_log.txt");
        assert_eq!(fs::read(&stored.disk_path).unwrap(), b"hello world!");
    }

    #[test]
    fn store_upload_never_overwrites() {
        let temp = TempDir::new().expect("tempdir");
        let source = temp.path().join("a.png");
        fs::write(&source, b"1").expect("write source");
        let uploads = temp.path().join("uploads");
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let first = store_upload(&uploads, 1, &source, now).expect("first");
        let second = store_upload(&uploads, 1, &source, now).expect("second");
        assert_ne!(first.disk_path, second.disk_path);
        assert_eq!(second.attachment.path, "/uploads/1_1700000000_1_a.png");
    }

    #[test]
    fn missing_source_is_reported() {
        let temp = TempDir::new().expect("tempdir");
        let err = store_upload(
            &temp.path().join("uploads"),
            1,
            &temp.path().join("nope.txt"),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, TicketError::UploadSourceMissing { .. }));
    }

    #[test]
    fn sanitize_strips_traversal_and_spaces() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("my report (v2).pdf"), "my_report_v2_.pdf");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn unknown_extension_has_no_content_type() {
        assert_eq!(guess_content_type("README"), None);
        assert_eq!(guess_content_type("dump.zzqx"), None);
    }

    #[test]
    fn common_office_and_media_types_are_recognised() {
        assert_eq!(guess_content_type("photo.JPG").as_deref(), Some("image/jpeg"));
        assert_eq!(guess_content_type("clip.mp4").as_deref(), Some("video/mp4"));
        assert_eq!(
            guess_content_type("report.docx").as_deref(),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
        assert_eq!(
            guess_content_type("sheet.xlsx").as_deref(),
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        );
    }

    #[test]
    fn existing_upload_is_kept_when_names_collide() {
        let temp = TempDir::new().expect("tempdir");
        let uploads = temp.path().join("uploads");
        fs::create_dir_all(&uploads).expect("uploads dir");
        let taken = uploads.join("3_1700000000_note.txt");
        fs::write(&taken, b"someone else's file").expect("write existing");
        let source = temp.path().join("note.txt");
        fs::write(&source, b"mine").expect("write source");
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let stored = store_upload(&uploads, 3, &source, now).expect("store");

        assert_eq!(stored.attachment.path, "/uploads/3_1700000000_1_note.txt");
        assert_eq!(fs::read(&taken).unwrap(), b"someone else's file");
        assert_eq!(fs::read(&stored.disk_path).unwrap(), b"mine");
    }
}
