//! Integration tests for backup, restore and pruning workflows.
//!
//! Each test builds a mock WTF folder in a temporary directory and drives
//! the public API end to end.

use filetime::FileTime;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use walkdir::WalkDir;
use wtf_backup_core::{BackupManager, Error, FileCopier, Logger};

/// Logger that keeps every message for later inspection.
#[derive(Default)]
struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    fn record(&self, level: &str, message: fmt::Arguments<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} {}", level, message));
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: fmt::Arguments<'_>) {
        self.record("DEBUG", message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        self.record("INFO", message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.record("WARN", message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.record("ERROR", message);
    }
}

/// Test fixture with a WTF folder, a backup folder and a restore target.
struct TestFixture {
    _temp_dir: TempDir,
    wtf_path: PathBuf,
    backup_dir: PathBuf,
    restore_path: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let wtf_path = base.join("WTF");
        let backup_dir = base.join("backups");
        let restore_path = base.join("restored");
        fs::create_dir_all(&wtf_path).expect("Failed to create WTF dir");

        Self {
            _temp_dir: temp_dir,
            wtf_path,
            backup_dir,
            restore_path,
        }
    }

    fn write(&self, relative: &str, content: &[u8]) {
        let path = self.wtf_path.join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
        fs::write(path, content).expect("Failed to write file");
    }

    /// A realistic spread of account, realm and character settings.
    fn create_wtf_tree(&self) {
        self.write("Config.wtf", b"SET locale \"enUS\"\n");
        self.write("Account/ACC/SavedVariables/Details.lua", b"Details_Global = {}\n");
        self.write("Account/ACC/SavedVariables/Details_Streamer.lua", b"Streamer = {}\n");
        self.write("Account/ACC/SavedVariables/WeakAuras.lua", &[7u8; 70_000]);
        self.write(
            "Account/ACC/Realm/Char/SavedVariablesPerCharacter/Details.lua",
            b"Details_Char = {}\n",
        );
        self.write(
            "Account/ACC/Realm/Char/SavedVariables/Details.lua",
            b"Details_CharGlobal = {}\n",
        );
        self.write("Account/ACC/Realm/Char/layout-local.txt", b"layout\n");
        self.write("Account/ACC/Realm/Char/SavedVariables/Plater.lua", b"Plater = {}\n");
        fs::create_dir_all(self.wtf_path.join("Account/ACC/Empty")).unwrap();
    }

    fn manager(&self) -> BackupManager {
        BackupManager::new(&self.backup_dir)
    }
}

/// Relative path -> file content for every file below `root`
fn tree_contents(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.expect("walk failed"))
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn set_mtime(path: &Path, unix_secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0))
        .expect("Failed to set mtime");
}

#[test]
fn test_backup_is_faithful_copy() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();

    let info = fixture.manager().create_backup(&fixture.wtf_path, false).unwrap();

    assert!(info.name.starts_with("WTF_Backup_"));
    assert_eq!(info.path.parent().unwrap(), fixture.backup_dir);
    assert_eq!(tree_contents(&info.path), tree_contents(&fixture.wtf_path));
    assert_eq!(info.summary.files, 8);
    assert!(info.path.join("Account/ACC/Empty").is_dir());
}

#[test]
fn test_copy_tree_many_files_with_small_buffer() {
    let fixture = TestFixture::new();
    for i in 0..200 {
        let content: Vec<u8> = (0..(i * 37) as u32).map(|b| (b % 251) as u8).collect();
        fixture.write(&format!("dir{}/sub{}/file{}.bin", i % 7, i % 3, i), &content);
    }

    let dst = fixture.backup_dir.join("copy");
    let summary = FileCopier::new(64)
        .copy_tree(&fixture.wtf_path, &dst, false)
        .unwrap();

    assert_eq!(summary.files, 200);
    assert_eq!(tree_contents(&dst), tree_contents(&fixture.wtf_path));
}

#[test]
fn test_copy_tree_reports_failure_and_copies_the_rest() {
    let fixture = TestFixture::new();
    fixture.write("a/first.txt", b"first");
    fixture.write("a/blocked.txt", b"blocked");
    fixture.write("b/second.txt", b"second");

    // A directory where a file should go makes that single copy fail
    let dst = fixture.backup_dir.join("copy");
    fs::create_dir_all(dst.join("a/blocked.txt")).unwrap();

    let err = FileCopier::default()
        .copy_tree(&fixture.wtf_path, &dst, false)
        .unwrap_err();

    assert!(matches!(err, Error::FileCopyFailed { .. }));
    assert_eq!(fs::read(dst.join("a/first.txt")).unwrap(), b"first");
    assert_eq!(fs::read(dst.join("b/second.txt")).unwrap(), b"second");
}

#[test]
fn test_copy_tree_with_progress() {
    let fixture = TestFixture::new();
    fixture.write("empty.lua", b"");
    fixture.write("data.lua", &[1u8; 4096]);

    let dst = fixture.backup_dir.join("copy");
    let summary = FileCopier::default()
        .copy_tree(&fixture.wtf_path, &dst, true)
        .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.bytes, 4096);
    assert_eq!(fs::metadata(dst.join("empty.lua")).unwrap().len(), 0);
}

#[test]
fn test_two_backups_do_not_collide() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();
    let manager = fixture.manager();

    let first = manager.create_backup(&fixture.wtf_path, false).unwrap();
    let second = manager.create_backup(&fixture.wtf_path, false).unwrap();

    assert_ne!(first.name, second.name);
    assert!(second.name > first.name);
    assert_eq!(manager.list_backups().unwrap().len(), 2);
    assert_eq!(tree_contents(&first.path), tree_contents(&second.path));
}

#[test]
fn test_restore_only_selected_addon() {
    let fixture = TestFixture::new();
    fixture.write("Account/ACC/SavedVariables/MyAddon.lua", b"0123456789");
    fixture.write("Account/ACC/SavedVariables/Other.lua", b"abcde");

    let manager = fixture.manager();
    let info = manager.create_backup(&fixture.wtf_path, false).unwrap();
    assert_eq!(info.summary.files, 2);

    let summary = manager
        .restore_addon(&fixture.restore_path, "MyAddon", false)
        .unwrap();

    assert_eq!(summary.snapshot, info.path);
    assert_eq!(summary.files, vec!["Account/ACC/SavedVariables/MyAddon.lua"]);
    assert_eq!(summary.bytes, 10);

    let restored = tree_contents(&fixture.restore_path);
    assert_eq!(restored.len(), 1);
    assert_eq!(
        restored["Account/ACC/SavedVariables/MyAddon.lua"],
        b"0123456789".to_vec()
    );
    assert!(!fixture
        .restore_path
        .join("Account/ACC/SavedVariables/Other.lua")
        .exists());
}

#[test]
fn test_restore_covers_all_scopes_and_companions() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();
    let manager = fixture.manager();
    manager.create_backup(&fixture.wtf_path, false).unwrap();

    let summary = manager
        .restore_addon(&fixture.restore_path, "Details", false)
        .unwrap();

    let restored: Vec<_> = tree_contents(&fixture.restore_path).into_keys().collect();
    assert_eq!(
        restored,
        vec![
            "Account/ACC/Realm/Char/SavedVariables/Details.lua",
            "Account/ACC/Realm/Char/SavedVariablesPerCharacter/Details.lua",
            "Account/ACC/SavedVariables/Details.lua",
            "Account/ACC/SavedVariables/Details_Streamer.lua",
        ]
    );
    assert_eq!(summary.files.len(), 4);

    // Nothing unrelated was materialised
    assert!(!fixture.restore_path.join("Account/ACC/Empty").exists());
    assert!(!fixture.restore_path.join("Config.wtf").exists());
}

#[test]
fn test_restore_uses_latest_snapshot() {
    let fixture = TestFixture::new();
    fs::create_dir_all(&fixture.backup_dir).unwrap();

    for (name, content) in [
        ("WTF_Backup_2024-01-01_10-00-00", b"old".as_slice()),
        ("WTF_Backup_2024-06-01_10-00-00", b"new".as_slice()),
    ] {
        let file = fixture
            .backup_dir
            .join(name)
            .join("Account/ACC/SavedVariables/Bagnon.lua");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }

    let summary = fixture
        .manager()
        .restore_addon(&fixture.restore_path, "Bagnon", false)
        .unwrap();

    assert!(summary.snapshot.ends_with("WTF_Backup_2024-06-01_10-00-00"));
    assert_eq!(
        fs::read(fixture.restore_path.join("Account/ACC/SavedVariables/Bagnon.lua")).unwrap(),
        b"new"
    );
}

#[test]
fn test_restore_twice_overwrites() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();
    let manager = fixture.manager();
    manager.create_backup(&fixture.wtf_path, false).unwrap();

    let first = manager
        .restore_addon(&fixture.restore_path, "Plater", true)
        .unwrap();
    let target = fixture
        .restore_path
        .join("Account/ACC/Realm/Char/SavedVariables/Plater.lua");
    fs::write(&target, b"locally edited and longer than before").unwrap();

    let second = manager
        .restore_addon(&fixture.restore_path, "Plater", true)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(&target).unwrap(), b"Plater = {}\n");
}

#[test]
fn test_restore_unknown_or_blank_addon_is_noop() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();
    let manager = fixture.manager();
    manager.create_backup(&fixture.wtf_path, false).unwrap();

    for addon in ["NotInstalled", ""] {
        let summary = manager
            .restore_addon(&fixture.restore_path, addon, false)
            .unwrap();
        assert!(summary.files.is_empty());
    }
    assert!(!fixture.restore_path.exists());
}

#[test]
fn test_restore_from_empty_backup_folder() {
    let fixture = TestFixture::new();
    fs::create_dir_all(&fixture.backup_dir).unwrap();
    fs::create_dir_all(fixture.backup_dir.join("unrelated")).unwrap();

    let err = fixture
        .manager()
        .restore_addon(&fixture.restore_path, "Details", false)
        .unwrap_err();
    assert!(matches!(err, Error::NoBackupsFound(_)));
}

#[test]
fn test_restore_from_missing_backup_folder() {
    let fixture = TestFixture::new();

    let err = fixture
        .manager()
        .restore_addon(&fixture.restore_path, "Details", false)
        .unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
}

#[test]
fn test_prune_keeps_most_recently_modified() {
    let fixture = TestFixture::new();
    fs::create_dir_all(&fixture.backup_dir).unwrap();

    let names = [
        "WTF_Backup_2024-01-01_00-00-00",
        "WTF_Backup_2024-01-02_00-00-00",
        "WTF_Backup_2024-01-03_00-00-00",
        "WTF_Backup_2024-01-04_00-00-00",
        "WTF_Backup_2024-01-05_00-00-00",
    ];
    for (i, name) in names.iter().enumerate() {
        let dir = fixture.backup_dir.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("Config.wtf"), b"x").unwrap();
        set_mtime(&dir, 1_700_000_000 + i as i64 * 86_400);
    }
    fs::create_dir(fixture.backup_dir.join("keep-me")).unwrap();

    let logger = Arc::new(RecordingLogger::default());
    let manager = fixture.manager().with_logger(logger.clone());
    let outcome = manager.prune(2).unwrap();

    assert_eq!(outcome.kept.len(), 2);
    assert_eq!(outcome.removed.len(), 3);
    assert!(outcome.failed.is_empty());

    let mut remaining: Vec<_> = fs::read_dir(&fixture.backup_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    remaining.sort();
    assert_eq!(remaining, vec![names[3], names[4], "keep-me"]);

    let removals = logger
        .lines()
        .into_iter()
        .filter(|l| l.starts_with("INFO Removing old backup"))
        .count();
    assert_eq!(removals, 3);
}

#[test]
fn test_prune_within_limit_is_noop() {
    let fixture = TestFixture::new();
    fixture.create_wtf_tree();
    let manager = fixture.manager();
    manager.create_backup(&fixture.wtf_path, false).unwrap();

    let outcome = manager.prune(5).unwrap();
    assert_eq!(outcome.kept.len(), 1);
    assert!(outcome.removed.is_empty());
    assert_eq!(manager.list_backups().unwrap().len(), 1);
}
