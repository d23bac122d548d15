#![allow(missing_docs)]

use doclife::{
    limits::DEFAULT_MAX_FILE_SIZE, DocumentValidator, Limits, UploadedFile, ValidationError,
    ValidationField,
};

fn pdf(size: usize) -> UploadedFile {
    UploadedFile::new("releve.pdf", "application/pdf", vec![b'%'; size])
}

#[test]
fn accepts_file_at_exact_size_limit() {
    let validator = DocumentValidator::default();

    assert_eq!(validator.validate(&pdf(DEFAULT_MAX_FILE_SIZE as usize)), Ok(()));
}

#[test]
fn rejects_file_one_byte_over_limit() {
    let validator = DocumentValidator::default();

    let err = validator
        .validate(&pdf(DEFAULT_MAX_FILE_SIZE as usize + 1))
        .expect_err("5 MiB + 1 must be rejected");
    assert_eq!(err.field(), ValidationField::File);
    assert!(matches!(
        err,
        ValidationError::FileTooLarge {
            size,
            max_file_size,
            ..
        } if size == DEFAULT_MAX_FILE_SIZE + 1 && max_file_size == DEFAULT_MAX_FILE_SIZE
    ));
}

#[test]
fn rejects_disallowed_extension() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("setup.exe", "application/pdf", &b"MZ"[..]);

    let err = validator.validate(&file).expect_err("exe must be rejected");
    assert!(matches!(
        err,
        ValidationError::ExtensionNotAllowed { ref extension, .. } if extension == "exe"
    ));
}

#[test]
fn rejects_missing_extension() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("README", "application/pdf", &b"text"[..]);

    assert!(matches!(
        validator.validate(&file),
        Err(ValidationError::ExtensionNotAllowed { ref extension, .. }) if extension.is_empty()
    ));
}

#[test]
fn extension_check_is_case_insensitive() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("PHOTO.JPEG", "image/jpeg", &b"\xff\xd8\xff"[..]);

    assert_eq!(validator.validate(&file), Ok(()));
    assert_eq!(file.extension(), "jpeg");
}

#[test]
fn rejects_disallowed_mime_type() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("scan.pdf", "application/x-msdownload", &b"%PDF"[..]);

    let err = validator.validate(&file).expect_err("mime must be rejected");
    assert!(matches!(
        err,
        ValidationError::MimeTypeNotAllowed { ref mime, .. } if mime == "application/x-msdownload"
    ));
}

#[test]
fn rejects_unparsable_mime_type() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("scan.pdf", "pdf please", &b"%PDF"[..]);

    assert!(matches!(
        validator.validate(&file),
        Err(ValidationError::MimeTypeNotAllowed { .. })
    ));
}

#[test]
fn mime_wildcard_patterns_are_honoured() {
    let validator = DocumentValidator::new(Limits {
        allowed_mime_types: vec!["image/*".to_owned()],
        ..Limits::default()
    });

    assert_eq!(
        validator.validate(&UploadedFile::new("a.png", "image/png", &b"png"[..])),
        Ok(())
    );
    assert!(validator
        .validate(&UploadedFile::new("a.pdf", "application/pdf", &b"pdf"[..]))
        .is_err());
}

#[test]
fn rejects_empty_and_truncated_uploads_first() {
    let validator = DocumentValidator::default();

    let empty = UploadedFile::new("vide.exe", "application/zip", Vec::<u8>::new());
    assert!(matches!(
        validator.validate(&empty),
        Err(ValidationError::CorruptedFile { .. })
    ));

    let truncated = pdf(10).with_declared_size(20);
    let err = validator.validate(&truncated).expect_err("truncated upload");
    assert!(matches!(err, ValidationError::CorruptedFile { ref reason, .. } if reason.contains("10 of 20")));

    assert_eq!(validator.validate(&pdf(10).with_declared_size(10)), Ok(()));
}

#[test]
fn each_failure_has_a_distinct_message() {
    let validator = DocumentValidator::default();
    let too_large = validator
        .validate(&pdf(DEFAULT_MAX_FILE_SIZE as usize + 1))
        .expect_err("too large");
    let bad_ext = validator
        .validate(&UploadedFile::new("a.exe", "application/pdf", &b"x"[..]))
        .expect_err("bad extension");
    let bad_mime = validator
        .validate(&UploadedFile::new("a.pdf", "text/html", &b"x"[..]))
        .expect_err("bad mime");

    let messages = [too_large.to_string(), bad_ext.to_string(), bad_mime.to_string()];
    assert_ne!(messages[0], messages[1]);
    assert_ne!(messages[1], messages[2]);
    assert_ne!(messages[0], messages[2]);
}

#[test]
fn mime_and_extension_are_checked_independently() {
    let validator = DocumentValidator::default();
    let file = UploadedFile::new("scan.pdf", "image/png", &b"%PDF"[..]);

    assert_eq!(validator.validate(&file), Ok(()));
}
