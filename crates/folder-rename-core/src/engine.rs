use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::mapping::MappingTable;
use crate::RenameError;

/// Counters for one pass over a target directory.
///
/// Every candidate lands in `total`; renamed ones also in `succeeded`, broken
/// ones in `failed`. Candidates already carrying their target name are in
/// neither, see [`RunResult::unchanged`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunResult {
    pub fn unchanged(&self) -> usize {
        self.total
            .saturating_sub(self.succeeded)
            .saturating_sub(self.failed)
    }

    /// Figure shown to the user: no-ops and failures together.
    pub fn not_renamed(&self) -> usize {
        self.total.saturating_sub(self.succeeded)
    }

    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Renamed { .. } => self.succeeded += 1,
            Outcome::Unchanged => {}
            Outcome::Unresolved | Outcome::Collision { .. } | Outcome::Failed { .. } => {
                self.failed += 1
            }
        }
    }
}

/// What happened to a single candidate folder.
#[derive(Debug)]
pub enum Outcome {
    /// Renamed, or would have been in a dry run.
    Renamed { to: PathBuf },
    /// Already carries its target name.
    Unchanged,
    /// Name found in neither table.
    Unresolved,
    /// Something already occupies the target name.
    Collision { to: PathBuf },
    Failed { to: PathBuf, error: io::Error },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::Unresolved | Outcome::Collision { .. } | Outcome::Failed { .. }
        )
    }
}

/// Names taken and freed by dry-run renames the disk never saw.
#[derive(Debug, Default)]
struct PendingNames {
    claimed: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl PendingNames {
    fn is_occupied(&self, path: &Path) -> bool {
        if self.claimed.contains(path) {
            return true;
        }
        !self.vacated.contains(path) && fs::symlink_metadata(path).is_ok()
    }

    fn record_move(&mut self, from: &Path, to: &Path) {
        self.claimed.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.claimed.insert(to.to_path_buf());
    }
}

type RenameFn = fn(&Path, &Path) -> io::Result<()>;

fn rename_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

pub struct RenameEngine<'a> {
    mapping: &'a MappingTable,
    dry_run: bool,
    rename: RenameFn,
}

impl<'a> RenameEngine<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self {
            mapping,
            dry_run: false,
            rename: rename_dir,
        }
    }

    #[cfg(test)]
    fn with_rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }

    /// Runs every check without touching the disk. Would-be renames are
    /// remembered per container, so later siblings see the same collisions
    /// a real run would.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Renames every folder two levels below `root`.
    ///
    /// Directories directly under `root` are containers and keep their names;
    /// their own subdirectories are the candidates. A failure on one
    /// candidate is counted and the walk moves on.
    pub fn run(&self, root: &Path) -> Result<RunResult, RenameError> {
        if !root.is_dir() {
            return Err(RenameError::InvalidTarget {
                path: root.to_path_buf(),
            });
        }

        info!("Starting rename pass: {:?}", root);
        if self.dry_run {
            warn!("Dry run mode - no changes will be made");
        }

        let mut result = RunResult::default();

        for container in list_directories(root)? {
            debug!("Scanning container: {:?}", container);

            let candidates = match list_directories(&container) {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!("Unable to list {:?}, skipping it: {}", container, e);
                    continue;
                }
            };

            let mut pending = PendingNames::default();
            for candidate in &candidates {
                let outcome = self.process(candidate, &mut pending);
                result.record(&outcome);
            }
        }

        info!(
            "Rename pass complete: {} examined, {} renamed, {} failed, {} already named",
            result.total,
            result.succeeded,
            result.failed,
            result.unchanged()
        );

        Ok(result)
    }

    /// Resolves and applies the new name for one candidate folder.
    pub fn process_candidate(&self, path: &Path) -> Outcome {
        self.process(path, &mut PendingNames::default())
    }

    fn process(&self, path: &Path, pending: &mut PendingNames) -> Outcome {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!("No mapping for {:?}: name is not valid UTF-8", path);
            return Outcome::Unresolved;
        };

        let Some(new_name) = self.mapping.resolve(name) else {
            warn!("No mapping found for '{}', skipping", name);
            return Outcome::Unresolved;
        };

        if new_name == name {
            info!("Folder '{}' already has its mapped name, skipping", name);
            return Outcome::Unchanged;
        }

        let new_path = match path.parent() {
            Some(parent) => parent.join(new_name),
            None => PathBuf::from(new_name),
        };

        if pending.is_occupied(&new_path) {
            error!("Cannot rename '{}': '{}' already exists", name, new_name);
            return Outcome::Collision { to: new_path };
        }

        if self.dry_run {
            info!("Would rename directory: {:?} -> {:?}", path, new_path);
            pending.record_move(path, &new_path);
            return Outcome::Renamed { to: new_path };
        }

        match (self.rename)(path, &new_path) {
            Ok(()) => {
                info!("Renamed directory: {:?} -> {:?}", path, new_path);
                Outcome::Renamed { to: new_path }
            }
            Err(e) => {
                error!("Failed to rename {:?} -> {:?}: {}", path, new_path, e);
                Outcome::Failed {
                    to: new_path,
                    error: e,
                }
            }
        }
    }
}

/// Snapshot of the directories directly inside `dir`, in listing order.
fn list_directories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;

    Ok(entries
        .iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> MappingTable {
        [("101", "Invoices"), ("102", "Receipts")].into_iter().collect()
    }

    #[test]
    fn test_run_result_partition() {
        let mut result = RunResult::default();
        result.record(&Outcome::Renamed {
            to: PathBuf::from("a"),
        });
        result.record(&Outcome::Unchanged);
        result.record(&Outcome::Unresolved);
        result.record(&Outcome::Collision {
            to: PathBuf::from("b"),
        });
        result.record(&Outcome::Failed {
            to: PathBuf::from("c"),
            error: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });

        assert_eq!(result.total, 5);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 3);
        assert_eq!(result.unchanged(), 1);
        assert_eq!(result.not_renamed(), 4);
    }

    #[test]
    fn test_counts_never_underflow() {
        let result = RunResult {
            total: 1,
            succeeded: 2,
            failed: 1,
        };

        assert_eq!(result.unchanged(), 0);
        assert_eq!(result.not_renamed(), 0);
    }

    fn fail_on_101(from: &Path, to: &Path) -> io::Result<()> {
        if from.file_name().is_some_and(|name| name == "101") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "folder is in use"));
        }
        fs::rename(from, to)
    }

    #[test]
    fn test_rename_error_is_counted_and_walk_continues() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Batch1/101")).unwrap();
        fs::create_dir_all(dir.path().join("Batch1/102")).unwrap();
        fs::create_dir_all(dir.path().join("Batch2/Receipts")).unwrap();

        let table = mapping();
        let result = RenameEngine::new(&table)
            .with_rename(fail_on_101)
            .run(dir.path())
            .unwrap();

        assert_eq!(
            result,
            RunResult {
                total: 3,
                succeeded: 2,
                failed: 1
            }
        );
        assert!(dir.path().join("Batch1/101").is_dir());
        assert!(!dir.path().join("Batch1/Invoices").exists());
        assert!(dir.path().join("Batch1/Receipts").is_dir());
        assert!(dir.path().join("Batch2/102").is_dir());
    }

    #[test]
    fn test_rename_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("101");
        fs::create_dir(&candidate).unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table)
            .with_rename(fail_on_101)
            .process_candidate(&candidate);

        match outcome {
            Outcome::Failed { to, error } => {
                assert_eq!(to, dir.path().join("Invoices"));
                assert_eq!(error.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(candidate.is_dir());
    }

    #[test]
    fn test_pending_names() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("101");
        let to = dir.path().join("Invoices");
        fs::create_dir(&from).unwrap();

        let mut pending = PendingNames::default();
        assert!(pending.is_occupied(&from));
        assert!(!pending.is_occupied(&to));

        pending.record_move(&from, &to);
        assert!(!pending.is_occupied(&from));
        assert!(pending.is_occupied(&to));
    }

    #[test]
    fn test_dry_run_follows_freed_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("B");
        let second = dir.path().join("A");
        fs::create_dir(&first).unwrap();
        fs::create_dir(&second).unwrap();

        let table: MappingTable = [("A", "B"), ("B", "C")].into_iter().collect();
        let engine = RenameEngine::new(&table).dry_run(true);
        let mut pending = PendingNames::default();

        assert!(matches!(engine.process(&first, &mut pending), Outcome::Renamed { .. }));
        // "B" is only free because the dry run moved it to "C"
        assert!(matches!(engine.process(&second, &mut pending), Outcome::Renamed { .. }));
        assert!(first.is_dir());
        assert!(second.is_dir());
        assert!(!dir.path().join("C").exists());
    }

    #[test]
    fn test_forward_rename() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("101");
        fs::create_dir(&candidate).unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table).process_candidate(&candidate);

        assert!(matches!(outcome, Outcome::Renamed { .. }));
        assert!(!candidate.exists());
        assert!(dir.path().join("Invoices").is_dir());
    }

    #[test]
    fn test_reverse_rename() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("Receipts");
        fs::create_dir(&candidate).unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table).process_candidate(&candidate);

        assert!(matches!(outcome, Outcome::Renamed { .. }));
        assert!(dir.path().join("102").is_dir());
    }

    #[test]
    fn test_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("Unknown");
        fs::create_dir(&candidate).unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table).process_candidate(&candidate);

        assert!(matches!(outcome, Outcome::Unresolved));
        assert!(outcome.is_failure());
        assert!(candidate.is_dir());
    }

    #[test]
    fn test_unchanged_when_already_named() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("Same");
        fs::create_dir(&candidate).unwrap();

        let table: MappingTable = [("Same", "Same")].into_iter().collect();
        let outcome = RenameEngine::new(&table).process_candidate(&candidate);

        assert!(matches!(outcome, Outcome::Unchanged));
        assert!(!outcome.is_failure());
        assert!(candidate.is_dir());
    }

    #[test]
    fn test_collision_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("101");
        fs::create_dir(&candidate).unwrap();
        fs::write(dir.path().join("Invoices"), "keep me").unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table).process_candidate(&candidate);

        assert!(matches!(outcome, Outcome::Collision { .. }));
        assert!(candidate.is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join("Invoices")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_dry_run_leaves_folder() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = dir.path().join("101");
        fs::create_dir(&candidate).unwrap();

        let table = mapping();
        let outcome = RenameEngine::new(&table)
            .dry_run(true)
            .process_candidate(&candidate);

        match outcome {
            Outcome::Renamed { to } => assert_eq!(to, dir.path().join("Invoices")),
            other => panic!("Expected Renamed, got {:?}", other),
        }
        assert!(candidate.is_dir());
        assert!(!dir.path().join("Invoices").exists());
    }

    #[test]
    fn test_run_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let table = mapping();
        let result = RenameEngine::new(&table).run(&dir.path().join("missing"));

        assert!(matches!(result, Err(RenameError::InvalidTarget { .. })));
    }

    #[test]
    fn test_run_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "").unwrap();

        let table = mapping();
        let result = RenameEngine::new(&table).run(&file);

        assert!(matches!(result, Err(RenameError::InvalidTarget { .. })));
    }

    #[test]
    fn test_list_directories_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let mut names: Vec<_> = list_directories(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a", "b"]);
    }
}
