//! Batch reclamation of orphaned documents, directories and archives.
//!
//! A run makes four passes: registry entries whose file is gone, owner
//! directories whose owner no longer exists, top-level directories that are not
//! an owner kind, and archives past retention. A failure on one item is logged
//! and counted; the run always reaches the end and reports its counts.

use std::{
    collections::BTreeSet,
    time::{Duration, SystemTime},
};

use serde::Serialize;

use crate::{
    checksum::ChecksumVerifier,
    error::StorageError,
    owner::{OwnerId, OwnerKind, OwnerScope},
    path::{kind_directory, owner_directory, ARCHIVES_DIR, DOCUMENTS_DIR},
    storage::{DiskStorage, OwnerStore},
};

/// Options of one reclamation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReclaimOptions {
    /// Owner kinds to scan.
    pub scope: OwnerScope,
    /// Report what would be removed without touching storage or records.
    pub dry_run: bool,
    /// Re-hash existing files and report checksum mismatches.
    pub validate_integrity: bool,
}

/// What a reclamation run found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// A registry entry whose file does not exist; dropped from the registry.
    MissingFile {
        /// Owner kind.
        owner_kind: OwnerKind,
        /// Owner id.
        owner_id: OwnerId,
        /// Document type of the entry.
        type_code: String,
        /// Recorded path.
        path: String,
    },
    /// An existing file whose content no longer matches its checksum; kept.
    InvalidChecksum {
        /// Owner kind.
        owner_kind: OwnerKind,
        /// Owner id.
        owner_id: OwnerId,
        /// Document type of the entry.
        type_code: String,
        /// Recorded path.
        path: String,
    },
    /// An owner record whose document map could not be decoded; skipped.
    UnreadableRecord {
        /// Owner kind.
        owner_kind: OwnerKind,
        /// Owner id, when the record carries one.
        owner_id: Option<OwnerId>,
        /// Decoding failure.
        error: String,
    },
    /// An owner directory with no matching owner; removed.
    OrphanDirectory {
        /// Root-relative directory.
        path: String,
    },
    /// A directory under `documents/` that is not an owner kind; removed.
    UnknownKindDirectory {
        /// Root-relative directory.
        path: String,
    },
    /// An archive older than the retention window; removed.
    ExpiredArchive {
        /// Root-relative archive path.
        path: String,
    },
}

/// Final counts of a reclamation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReclaimReport {
    /// Entries, directories and archives removed (or that would be, in dry-run).
    pub cleaned: usize,
    /// Documents failing the checksum audit.
    pub invalid: usize,
    /// Items and owner records skipped because of an error.
    pub failures: usize,
    /// Everything found, in discovery order.
    pub findings: Vec<Finding>,
}

impl ReclaimReport {
    fn clean(&mut self, finding: Finding) {
        self.cleaned += 1;
        self.findings.push(finding);
    }

    fn fail(&mut self, item: &str, err: &StorageError) {
        self.failures += 1;
        tracing::warn!(item, error = %err, "reclaim: skipping item after error");
    }
}

/// Detects and removes orphaned registry entries, directories and archives.
#[derive(Debug, Clone, Copy)]
pub struct OrphanReclaimer<'a> {
    storage: &'a DiskStorage,
    archive_retention: Duration,
}

impl<'a> OrphanReclaimer<'a> {
    /// Creates a reclaimer over `storage`, expiring archives older than `archive_retention`.
    pub fn new(storage: &'a DiskStorage, archive_retention: Duration) -> Self {
        Self {
            storage,
            archive_retention,
        }
    }

    /// Runs every pass against the current time.
    pub async fn run(&self, owners: &dyn OwnerStore, options: ReclaimOptions) -> ReclaimReport {
        self.run_at(owners, options, SystemTime::now()).await
    }

    /// Runs every pass, judging archive age against `now`.
    pub async fn run_at(
        &self,
        owners: &dyn OwnerStore,
        options: ReclaimOptions,
        now: SystemTime,
    ) -> ReclaimReport {
        let mut report = ReclaimReport::default();
        tracing::info!(
            scope = %options.scope,
            dry_run = options.dry_run,
            validate_integrity = options.validate_integrity,
            "reclaim: starting"
        );

        for kind in options.scope.kinds() {
            self.reclaim_registries(owners, kind, options, &mut report).await;

            match owners.valid_ids(kind).await {
                Ok(valid_ids) => {
                    self.reclaim_directories(kind, &valid_ids, options.dry_run, &mut report)
                        .await;
                }
                Err(err) => report.fail(&kind_directory(kind), &err),
            }
        }

        self.reclaim_unknown_kinds(options.dry_run, &mut report).await;
        self.reclaim_archives(now, options.dry_run, &mut report).await;

        tracing::info!(
            cleaned = report.cleaned,
            invalid = report.invalid,
            failures = report.failures,
            dry_run = options.dry_run,
            "reclaim: finished"
        );
        report
    }

    /// Removes owner directories of `kind` whose id is not in `valid_ids`.
    pub async fn reclaim_owner_directories(
        &self,
        kind: OwnerKind,
        valid_ids: &BTreeSet<OwnerId>,
        dry_run: bool,
    ) -> ReclaimReport {
        let mut report = ReclaimReport::default();
        self.reclaim_directories(kind, valid_ids, dry_run, &mut report)
            .await;
        report
    }

    async fn reclaim_registries(
        &self,
        owners: &dyn OwnerStore,
        kind: OwnerKind,
        options: ReclaimOptions,
        report: &mut ReclaimReport,
    ) {
        let records = match owners.load(kind).await {
            Ok(records) => records,
            Err(err) => {
                report.fail(&format!("{kind} records"), &err);
                return;
            }
        };

        for rejected in records.rejected {
            let item = match rejected.id {
                Some(id) => format!("{kind} `{id}` record"),
                None => format!("{kind} record"),
            };
            report.fail(&item, &rejected.error);
            report.findings.push(Finding::UnreadableRecord {
                owner_kind: kind,
                owner_id: rejected.id,
                error: rejected.error.to_string(),
            });
        }

        for (id, registry) in records.owners {
            if registry.is_empty() {
                continue;
            }

            let mut working = registry.clone();
            for (type_code, document) in &registry {
                let exists = match self.storage.exists(&document.path).await {
                    Ok(exists) => exists,
                    Err(err) => {
                        report.fail(&document.path, &err);
                        continue;
                    }
                };

                if !exists {
                    working.remove(type_code);
                    report.clean(Finding::MissingFile {
                        owner_kind: kind,
                        owner_id: id,
                        type_code: type_code.clone(),
                        path: document.path.clone(),
                    });
                    continue;
                }

                if options.validate_integrity {
                    let current = match self.storage.read(&document.path).await {
                        Ok(current) => current,
                        Err(err) => {
                            report.fail(&document.path, &err);
                            continue;
                        }
                    };
                    if !ChecksumVerifier::verify(document, current.as_deref()) {
                        tracing::warn!(
                            owner_kind = %kind,
                            owner_id = id,
                            type_code = type_code.as_str(),
                            path = document.path.as_str(),
                            "reclaim: checksum mismatch"
                        );
                        report.invalid += 1;
                        report.findings.push(Finding::InvalidChecksum {
                            owner_kind: kind,
                            owner_id: id,
                            type_code: type_code.clone(),
                            path: document.path.clone(),
                        });
                    }
                }
            }

            if working != registry && !options.dry_run {
                if let Err(err) = owners.save_documents(kind, id, &working).await {
                    report.fail(&owner_directory(kind, id), &err);
                }
            }
        }
    }

    async fn reclaim_directories(
        &self,
        kind: OwnerKind,
        valid_ids: &BTreeSet<OwnerId>,
        dry_run: bool,
        report: &mut ReclaimReport,
    ) {
        let kind_dir = kind_directory(kind);
        let dirs = match self.storage.list_dirs(&kind_dir).await {
            Ok(dirs) => dirs,
            Err(err) => {
                report.fail(&kind_dir, &err);
                return;
            }
        };

        for dir in dirs {
            let owned = dir
                .name
                .parse::<OwnerId>()
                .map_or(false, |id| valid_ids.contains(&id));
            if owned {
                continue;
            }

            let relative = format!("{kind_dir}/{}", dir.name);
            if !dry_run {
                if let Err(err) = self.storage.remove_dir(&relative).await {
                    report.fail(&relative, &err);
                    continue;
                }
            }
            tracing::debug!(path = relative.as_str(), dry_run, "reclaim: orphan owner directory");
            report.clean(Finding::OrphanDirectory { path: relative });
        }
    }

    async fn reclaim_unknown_kinds(&self, dry_run: bool, report: &mut ReclaimReport) {
        let dirs = match self.storage.list_dirs(DOCUMENTS_DIR).await {
            Ok(dirs) => dirs,
            Err(err) => {
                report.fail(DOCUMENTS_DIR, &err);
                return;
            }
        };

        for dir in dirs {
            if OwnerKind::is_known_dir(&dir.name) {
                continue;
            }

            let relative = format!("{DOCUMENTS_DIR}/{}", dir.name);
            if !dry_run {
                if let Err(err) = self.storage.remove_dir(&relative).await {
                    report.fail(&relative, &err);
                    continue;
                }
            }
            tracing::debug!(path = relative.as_str(), dry_run, "reclaim: unknown kind directory");
            report.clean(Finding::UnknownKindDirectory { path: relative });
        }
    }

    async fn reclaim_archives(&self, now: SystemTime, dry_run: bool, report: &mut ReclaimReport) {
        let archives = match self.storage.list_files(ARCHIVES_DIR).await {
            Ok(archives) => archives,
            Err(err) => {
                report.fail(ARCHIVES_DIR, &err);
                return;
            }
        };

        for archive in archives {
            let Some(modified) = archive.modified else {
                continue;
            };
            let expired = now
                .duration_since(modified)
                .map_or(false, |age| age > self.archive_retention);
            if !expired {
                continue;
            }

            let relative = format!("{ARCHIVES_DIR}/{}", archive.name);
            if !dry_run {
                match self.storage.remove_file(&relative).await {
                    Ok(_) => {}
                    Err(err) => {
                        report.fail(&relative, &err);
                        continue;
                    }
                }
            }
            tracing::debug!(path = relative.as_str(), dry_run, "reclaim: expired archive");
            report.clean(Finding::ExpiredArchive { path: relative });
        }
    }
}
