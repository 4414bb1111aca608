//! ACID and crash recovery integration tests for QuizVault.
//!
//! These tests verify that the storage layer provides the expected
//! durability and atomicity guarantees at the QuizVault level.
//!
//! # Crash Simulation
//!
//! We simulate a crash by dropping the `QuizVault` handle without calling
//! `close()`. Since redb durably commits data during `commit()` (not during
//! `close()`), dropping the handle simulates an ungraceful shutdown.
//!
//! redb uses shadow paging (not a WAL), so the database is always in a
//! consistent state: either the commit completed (data is present) or it
//! didn't (data is absent). There is never a half-committed state.

use quizvault::{Config, QuizVault, Record};
use tempfile::tempdir;

/// Helper: open a QuizVault at the given path with default config.
fn open_vault(path: &std::path::Path) -> QuizVault {
    QuizVault::open(path, Config::default()).unwrap()
}

fn numbered(n: usize) -> Record {
    Record::new(format!("Question {}\nA. yes\nB. no", n), "A")
}

// ============================================================================
// Durability Tests
// ============================================================================

#[test]
fn test_committed_data_survives_normal_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("durable.db");

    let vault = open_vault(&path);
    let capture = vault.capture("setA", &numbered(1)).unwrap();
    vault.close().unwrap();

    let vault = open_vault(&path);
    let retrieved = vault.get_record("setA", &capture.fingerprint).unwrap();
    assert_eq!(retrieved, Some(numbered(1)), "Data must survive a normal close");
    vault.close().unwrap();
}

#[test]
fn test_committed_data_survives_crash() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crash.db");

    let fingerprint;
    {
        let vault = open_vault(&path);
        fingerprint = vault.capture("setA", &numbered(1)).unwrap().fingerprint;
        vault.create_collection("setA").unwrap();
        vault.set_active_collection("setA").unwrap();
        // Drop without close
    }

    let vault = open_vault(&path);
    assert!(vault.contains("setA", &fingerprint).unwrap());
    assert_eq!(vault.active_collection().unwrap(), "setA");
    vault.close().unwrap();
}

#[test]
fn test_bulk_data_survives_crash() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bulk.db");

    {
        let vault = open_vault(&path);
        for n in 0..100 {
            assert!(vault.capture("bulk", &numbered(n)).unwrap().inserted);
        }
    }

    let vault = open_vault(&path);
    assert_eq!(vault.count("bulk").unwrap(), 100);
    vault.close().unwrap();
}

#[test]
fn test_multiple_crash_cycles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cycles.db");

    for cycle in 0..5 {
        let vault = open_vault(&path);
        assert_eq!(vault.count("setA").unwrap(), cycle as u64);
        vault.capture("setA", &numbered(cycle)).unwrap();
        // Drop without close
    }

    let vault = open_vault(&path);
    assert_eq!(vault.count("setA").unwrap(), 5);
    vault.close().unwrap();
}

// ============================================================================
// Atomicity Tests
// ============================================================================

#[test]
fn test_delete_collection_is_all_or_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("atomic.db");

    {
        let vault = open_vault(&path);
        vault.create_collection("setA").unwrap();
        for n in 0..10 {
            vault.capture("setA", &numbered(n)).unwrap();
        }
        assert_eq!(vault.delete_collection("setA").unwrap(), 10);
    }

    let vault = open_vault(&path);
    assert_eq!(vault.list_collections().unwrap(), vec!["quizletData"]);
    assert_eq!(vault.count("setA").unwrap(), 0);
    vault.close().unwrap();
}

#[test]
fn test_reinsert_after_crash_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dedup.db");

    {
        let vault = open_vault(&path);
        vault.capture("setA", &numbered(1)).unwrap();
    }

    let vault = open_vault(&path);
    let again = vault
        .capture("setA", &Record::new(numbered(1).question, "B"))
        .unwrap();
    assert!(!again.inserted);
    assert_eq!(
        vault.get_record("setA", &again.fingerprint).unwrap(),
        Some(numbered(1))
    );
    vault.close().unwrap();
}
