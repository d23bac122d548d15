#![allow(missing_docs)]

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use doclife::{
    DocumentError, DocumentManager, OwnerKind, SuffixStrategy, UploadedFile, ValidationError,
    ValidationField,
};
use uuid::Uuid;

const TWO_MIB: usize = 2 * 1024 * 1024;

#[tokio::test]
async fn teacher_cv_lifecycle() {
    let root = temp_root();
    let manager = manager(&root);

    let mut body = b"%PDF-1.7\n".to_vec();
    body.resize(TWO_MIB, b'x');
    let file = UploadedFile::new("CV Dupont.pdf", "application/pdf", body.clone())
        .with_declared_size(TWO_MIB as u64);

    let document = manager
        .upload(file, OwnerKind::Enseignant, 5, "cv")
        .await
        .expect("upload should succeed");

    assert_eq!(document.type_code, "cv");
    assert_eq!(document.original_name, "CV Dupont.pdf");
    assert_eq!(document.size_bytes, TWO_MIB as u64);
    assert_eq!(document.extension, "pdf");
    assert_eq!(document.checksum.len(), 64);
    assert!(document.path.starts_with("documents/enseignant/5/enseignant_5_cv_"));
    assert!(document.stored_name.ends_with(".pdf"));
    assert!(document.belongs_to(OwnerKind::Enseignant, 5));

    let stored_path = root.join(&document.path);
    assert_eq!(tokio::fs::read(&stored_path).await.expect("read stored file"), body);

    assert!(manager.validate_integrity(&document).await);

    let mut tampered = body.clone();
    tampered[100] ^= 0x01;
    tokio::fs::write(&stored_path, &tampered)
        .await
        .expect("tamper with stored file");
    assert!(!manager.validate_integrity(&document).await);

    assert!(manager.delete(&document.path).await.expect("delete should succeed"));
    assert!(!tokio::fs::try_exists(&stored_path).await.expect("try_exists"));
    assert!(!manager.validate_integrity(&document).await);
    assert!(!manager.delete(&document.path).await.expect("second delete is a no-op"));

    cleanup(root).await;
}

#[tokio::test]
async fn upload_then_verify_round_trip_for_each_allowed_format() {
    let root = temp_root();
    let manager = manager(&root);

    let files = [
        ("acte_naissance", "acte.pdf", "application/pdf"),
        ("photo_identite", "photo.JPG", "image/jpeg"),
        ("bulletin_precedent", "bulletin.png", "image/png"),
        ("certificat_medical", "certificat.doc", "application/msword"),
        (
            "justificatif_domicile",
            "facture.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
    ];
    for (type_code, name, mime) in files {
        let document = manager
            .upload(UploadedFile::new(name, mime, name.as_bytes().to_vec()), OwnerKind::Eleve, 12, type_code)
            .await
            .expect("upload should succeed");
        assert!(manager.validate_integrity(&document).await, "{type_code} should verify");
    }

    cleanup(root).await;
}

#[tokio::test]
async fn rejected_upload_writes_nothing() {
    let root = temp_root();
    let manager = manager(&root);

    let err = manager
        .upload(
            UploadedFile::new("cv.pdf", "application/pdf", &b"%PDF"[..]),
            OwnerKind::Eleve,
            1,
            "cv",
        )
        .await
        .expect_err("cv is not a student document");
    assert!(matches!(
        err,
        DocumentError::Validation(ValidationError::UnknownDocumentType { .. })
    ));

    let err = manager
        .upload(
            UploadedFile::new("virus.exe", "application/pdf", &b"MZ"[..]),
            OwnerKind::Enseignant,
            1,
            "cv",
        )
        .await
        .expect_err("exe must be rejected");
    assert!(matches!(
        err,
        DocumentError::Validation(ValidationError::ExtensionNotAllowed { .. })
    ));

    assert!(!tokio::fs::try_exists(root.join("documents"))
        .await
        .expect("try_exists"));

    cleanup(root).await;
}

#[tokio::test]
async fn reupload_of_same_type_keeps_previous_file() {
    let root = temp_root();
    let manager = manager(&root);

    let first = manager
        .upload(pdf("v1"), OwnerKind::Enseignant, 5, "cv")
        .await
        .expect("first upload");
    let second = manager
        .upload(pdf("v2"), OwnerKind::Enseignant, 5, "cv")
        .await
        .expect("second upload");

    assert_ne!(first.stored_name, second.stored_name);
    assert!(tokio::fs::try_exists(root.join(&first.path)).await.expect("try_exists"));
    assert!(tokio::fs::try_exists(root.join(&second.path)).await.expect("try_exists"));

    cleanup(root).await;
}

#[tokio::test]
async fn upload_multiple_collects_failures_without_aborting() {
    let root = temp_root();
    let manager = manager(&root);

    let mut files = BTreeMap::new();
    files.insert("cv".to_owned(), pdf("cv"));
    files.insert(
        "diplomes".to_owned(),
        UploadedFile::new("diplome.exe", "application/pdf", &b"MZ"[..]),
    );
    files.insert("passeport".to_owned(), pdf("passeport"));
    files.insert(
        "rib".to_owned(),
        UploadedFile::new("rib.pdf", "application/pdf", vec![0u8; 5 * 1024 * 1024 + 1]),
    );

    let batch = manager
        .upload_multiple(files, OwnerKind::Enseignant, 5)
        .await;

    assert!(!batch.is_complete());
    assert_eq!(batch.documents.keys().collect::<Vec<_>>(), ["cv"]);
    assert_eq!(batch.errors.len(), 3);
    assert_eq!(batch.errors["diplomes"].field, ValidationField::File);
    assert_eq!(batch.errors["passeport"].field, ValidationField::DocumentType);
    assert_eq!(batch.errors["rib"].field, ValidationField::File);
    assert!(batch.errors["rib"].message.contains("exceeding"));

    cleanup(root).await;
}

#[tokio::test]
async fn document_types_and_statistics() {
    let root = temp_root();
    let manager = manager(&root);

    assert!(manager.document_types(OwnerKind::Enseignant).contains_key("cv"));
    assert!(!manager.document_types(OwnerKind::Eleve).contains_key("cv"));

    let empty = manager
        .document_statistics(OwnerKind::Enseignant, 5)
        .await
        .expect("stats of a missing directory");
    assert_eq!(empty.file_count, 0);

    manager
        .upload(pdf("12345"), OwnerKind::Enseignant, 5, "cv")
        .await
        .expect("upload");
    manager
        .upload(
            UploadedFile::new("id.png", "image/png", &b"png"[..]),
            OwnerKind::Enseignant,
            5,
            "piece_identite",
        )
        .await
        .expect("upload");
    manager
        .upload(pdf("abc"), OwnerKind::Enseignant, 5, "diplomes")
        .await
        .expect("upload");

    let stats = manager
        .document_statistics(OwnerKind::Enseignant, 5)
        .await
        .expect("stats");
    assert_eq!(stats.file_count, 3);
    assert_eq!(stats.total_size, 11);
    assert_eq!(stats.by_extension["pdf"].count, 2);
    assert_eq!(stats.by_extension["pdf"].size, 8);
    assert_eq!(stats.by_extension["png"].count, 1);

    cleanup(root).await;
}

#[tokio::test]
async fn injected_suffix_flows_into_stored_name() {
    let root = temp_root();
    let manager = DocumentManager::builder()
        .root(&root)
        .suffix_strategy(SuffixStrategy::custom(|| "fixed000".to_owned()))
        .build()
        .expect("builder should succeed");

    let document = manager
        .upload(pdf("x"), OwnerKind::Eleve, 3, "certificat_scolarite")
        .await
        .expect("upload");
    assert!(document.stored_name.starts_with("eleve_3_certificat_scolarite_"));
    assert!(document.stored_name.ends_with("_fixed000.pdf"));

    cleanup(root).await;
}

fn pdf(content: &str) -> UploadedFile {
    UploadedFile::new("document.pdf", "application/pdf", content.as_bytes().to_vec())
}

fn manager(root: &Path) -> DocumentManager {
    DocumentManager::builder()
        .root(root)
        .build()
        .expect("builder should succeed")
}

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("doclife-test-{}", Uuid::new_v4()))
}

async fn cleanup(path: PathBuf) {
    let _ = tokio::fs::remove_dir_all(path).await;
}
