#![allow(missing_docs)]

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use doclife::{
    DocumentError, DocumentManager, DocumentRegistry, JsonOwnerStore, MemoryOwnerStore,
    NotFoundError, OwnerKind, OwnerStore, UploadedFile, ValidationField,
};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn json_store_reads_document_field_per_kind() {
    let root = temp_root();
    write_records(
        &root,
        "enseignant",
        json!([
            { "id": 5, "nom": "Dupont", "documents_administratifs": {
                "cv": {
                    "nom_original": "cv.pdf",
                    "nom_fichier": "enseignant_5_cv_1_abcdefgh.pdf",
                    "chemin": "documents/enseignant/5/enseignant_5_cv_1_abcdefgh.pdf",
                    "taille": 3,
                    "type_mime": "application/pdf",
                    "extension": "pdf",
                    "type_document": "cv",
                    "date_upload": "2024-01-15 09:30:00",
                    "checksum": ""
                }
            }},
            { "id": "6", "nom": "Martin", "documents_administratifs": [] },
            { "id": 7, "nom": "Durand" }
        ]),
    )
    .await;
    let store = JsonOwnerStore::new(&root);

    let owners = store.owners(OwnerKind::Enseignant).await.expect("records should load");
    assert_eq!(owners.keys().copied().collect::<Vec<_>>(), [5, 6, 7]);
    assert!(owners[&5u64].contains("cv"));
    assert!(owners[&6u64].is_empty());
    assert!(owners[&7u64].is_empty());

    assert!(store.exists(OwnerKind::Enseignant, 7).await.expect("exists"));
    assert!(!store.exists(OwnerKind::Enseignant, 8).await.expect("exists"));

    cleanup(root).await;
}

#[tokio::test]
async fn json_store_save_preserves_other_fields() {
    let root = temp_root();
    write_records(
        &root,
        "eleve",
        json!([
            { "id": 12, "nom": "Benali", "classe_id": 3, "documents_justificatifs": null },
            { "id": 13, "nom": "Okafor", "documents_justificatifs": null }
        ]),
    )
    .await;
    let store = JsonOwnerStore::new(&root);
    let manager = manager(&root.join("storage"));

    let document = manager
        .upload(
            UploadedFile::new("acte.pdf", "application/pdf", &b"%PDF"[..]),
            OwnerKind::Eleve,
            12,
            "acte_naissance",
        )
        .await
        .expect("upload");
    let registry: DocumentRegistry = [document.clone()].into_iter().collect();
    store
        .save_documents(OwnerKind::Eleve, 12, &registry)
        .await
        .expect("save should succeed");

    let raw: Value = serde_json::from_str(
        &tokio::fs::read_to_string(root.join("eleve.json"))
            .await
            .expect("read records"),
    )
    .expect("valid json");
    assert_eq!(raw[0]["nom"], "Benali");
    assert_eq!(raw[0]["classe_id"], 3);
    assert_eq!(raw[0]["documents_justificatifs"]["acte_naissance"]["chemin"], document.path.as_str());
    assert_eq!(raw[1]["documents_justificatifs"], Value::Null);

    let reloaded = store.documents(OwnerKind::Eleve, 12).await.expect("reload");
    assert_eq!(reloaded, registry);

    cleanup(root).await;
}

#[tokio::test]
async fn json_store_missing_records_file_is_an_error() {
    let root = temp_root();
    let store = JsonOwnerStore::new(&root);

    assert!(store.valid_ids(OwnerKind::Eleve).await.is_err());
    assert!(store
        .save_documents(OwnerKind::Eleve, 1, &DocumentRegistry::new())
        .await
        .is_err());
}

#[tokio::test]
async fn json_store_save_rejects_unknown_owner() {
    let root = temp_root();
    write_records(&root, "eleve", json!([{ "id": 1 }])).await;
    let store = JsonOwnerStore::new(&root);

    assert!(store
        .save_documents(OwnerKind::Eleve, 2, &DocumentRegistry::new())
        .await
        .is_err());

    cleanup(root).await;
}

#[tokio::test]
async fn attach_records_successes_and_reports_failures() {
    let root = temp_root();
    let manager = manager(&root);
    let owners = MemoryOwnerStore::new();
    owners
        .insert_owner(OwnerKind::Enseignant, 5, DocumentRegistry::new())
        .await;

    let mut files = BTreeMap::new();
    files.insert(
        "cv".to_owned(),
        UploadedFile::new("cv.pdf", "application/pdf", &b"%PDF"[..]),
    );
    files.insert(
        "diplomes".to_owned(),
        UploadedFile::new("diplome.bmp", "image/bmp", &b"BM"[..]),
    );

    let batch = manager
        .attach(&owners, files, OwnerKind::Enseignant, 5)
        .await
        .expect("attach should succeed");
    assert_eq!(batch.documents.len(), 1);
    assert_eq!(batch.errors["diplomes"].field, ValidationField::File);

    let registry = owners
        .get(OwnerKind::Enseignant, 5)
        .await
        .expect("owner record");
    assert_eq!(registry.get("cv"), batch.documents.get("cv"));
    assert!(!registry.contains("diplomes"));

    cleanup(root).await;
}

#[tokio::test]
async fn attach_to_missing_owner_is_not_found() {
    let root = temp_root();
    let manager = manager(&root);
    let owners = MemoryOwnerStore::new();

    let mut files = BTreeMap::new();
    files.insert(
        "cv".to_owned(),
        UploadedFile::new("cv.pdf", "application/pdf", &b"%PDF"[..]),
    );

    let err = manager
        .attach(&owners, files, OwnerKind::Enseignant, 404)
        .await
        .expect_err("owner does not exist");
    assert!(matches!(
        err,
        DocumentError::NotFound(NotFoundError::Owner { id: 404, .. })
    ));
    assert!(!tokio::fs::try_exists(root.join("documents"))
        .await
        .expect("try_exists"));

    cleanup(root).await;
}

#[tokio::test]
async fn detach_deletes_file_and_entry() {
    let root = temp_root();
    let manager = manager(&root);
    let owners = MemoryOwnerStore::new();
    owners
        .insert_owner(OwnerKind::Eleve, 12, DocumentRegistry::new())
        .await;

    let mut files = BTreeMap::new();
    files.insert(
        "photo_identite".to_owned(),
        UploadedFile::new("photo.jpg", "image/jpeg", &b"\xff\xd8"[..]),
    );
    manager
        .attach(&owners, files, OwnerKind::Eleve, 12)
        .await
        .expect("attach");

    let removed = manager
        .detach(&owners, OwnerKind::Eleve, 12, "photo_identite")
        .await
        .expect("detach should succeed");
    assert!(!tokio::fs::try_exists(root.join(&removed.path))
        .await
        .expect("try_exists"));
    assert!(owners
        .get(OwnerKind::Eleve, 12)
        .await
        .expect("owner record")
        .is_empty());

    let err = manager
        .detach(&owners, OwnerKind::Eleve, 12, "photo_identite")
        .await
        .expect_err("entry already removed");
    assert!(matches!(
        err,
        DocumentError::NotFound(NotFoundError::Document { .. })
    ));

    cleanup(root).await;
}

async fn write_records(dir: &Path, kind: &str, records: Value) {
    tokio::fs::create_dir_all(dir).await.expect("create dir");
    tokio::fs::write(
        dir.join(format!("{kind}.json")),
        serde_json::to_vec_pretty(&records).expect("encode records"),
    )
    .await
    .expect("write records");
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
