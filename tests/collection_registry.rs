//! Integration tests for the collection registry.

use quizvault::{
    ActivePointer, Config, ProtectedResourceError, QuizVault, Record, VaultError,
};
use tempfile::tempdir;

fn open_vault(dir: &tempfile::TempDir) -> QuizVault {
    QuizVault::open(dir.path().join("registry.db"), Config::default()).unwrap()
}

// ============================================================================
// List / Create
// ============================================================================

#[test]
fn test_first_run_lists_default() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    assert_eq!(vault.list_collections().unwrap(), vec!["quizletData"]);
    vault.close().unwrap();
}

#[test]
fn test_create_collection() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    assert!(vault.create_collection("setA").unwrap());
    assert!(vault.create_collection("  setB  ").unwrap());

    assert_eq!(
        vault.list_collections().unwrap(),
        vec!["quizletData", "setA", "setB"]
    );
    vault.close().unwrap();
}

#[test]
fn test_create_existing_or_blank_is_noop() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();

    assert!(!vault.create_collection("setA").unwrap());
    assert!(!vault.create_collection(" setA ").unwrap());
    assert!(!vault.create_collection("quizletData").unwrap());
    assert!(!vault.create_collection("").unwrap());
    assert!(!vault.create_collection("   ").unwrap());

    assert_eq!(vault.list_collections().unwrap().len(), 2);
    vault.close().unwrap();
}

#[test]
fn test_create_too_long_name_fails() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    let err = vault.create_collection(&"x".repeat(256)).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(vault.list_collections().unwrap().len(), 1);
    vault.close().unwrap();
}

// ============================================================================
// Active Pointer
// ============================================================================

#[test]
fn test_active_defaults_when_unset() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    assert_eq!(vault.active_collection().unwrap(), "quizletData");
    assert_eq!(vault.active_pointer().unwrap(), ActivePointer::Unset);
    vault.close().unwrap();
}

#[test]
fn test_set_active() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    vault.set_active_collection("setA").unwrap();

    assert_eq!(vault.active_collection().unwrap(), "setA");
    assert_eq!(vault.active_pointer().unwrap(), ActivePointer::Bound);
    vault.close().unwrap();
}

#[test]
fn test_ghost_active_is_not_validated() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.set_active_collection("ghost").unwrap();

    assert_eq!(vault.active_collection().unwrap(), "ghost");
    assert!(!vault
        .list_collections()
        .unwrap()
        .contains(&"ghost".to_string()));
    vault.close().unwrap();
}

#[test]
fn test_deleted_active_falls_back_to_default() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    vault.set_active_collection("setA").unwrap();
    vault.delete_collection("setA").unwrap();

    assert_eq!(vault.active_collection().unwrap(), "quizletData");
    assert_eq!(vault.active_pointer().unwrap(), ActivePointer::BoundToDeleted);

    // The stale pointer is kept as stored.
    assert_eq!(vault.registry().unwrap().active.as_deref(), Some("setA"));
    vault.close().unwrap();
}

#[test]
fn test_recreated_collection_becomes_active_again() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    vault.set_active_collection("setA").unwrap();
    vault.delete_collection("setA").unwrap();
    vault.create_collection("setA").unwrap();

    assert_eq!(vault.active_collection().unwrap(), "setA");
    vault.close().unwrap();
}

#[test]
fn test_selecting_previously_deleted_name_binds_again() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    vault.delete_collection("setA").unwrap();
    vault.set_active_collection("setA").unwrap();

    assert_eq!(vault.active_pointer().unwrap(), ActivePointer::Bound);
    assert_eq!(vault.active_collection().unwrap(), "setA");
    assert!(!vault
        .list_collections()
        .unwrap()
        .contains(&"setA".to_string()));
    vault.close().unwrap();

    // The binding is persisted, not just cached.
    let vault = open_vault(&dir);
    assert_eq!(vault.active_collection().unwrap(), "setA");
    vault.close().unwrap();
}

#[test]
fn test_deleting_active_ghost_falls_back_to_default() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.set_active_collection("ghost").unwrap();
    vault.delete_collection("ghost").unwrap();

    assert_eq!(vault.active_pointer().unwrap(), ActivePointer::BoundToDeleted);
    assert_eq!(vault.active_collection().unwrap(), "quizletData");
    assert_eq!(vault.list_collections().unwrap(), vec!["quizletData"]);
    vault.close().unwrap();
}

#[test]
fn test_fallback_survives_reopen() {
    let dir = tempdir().unwrap();

    let vault = open_vault(&dir);
    vault.create_collection("setA").unwrap();
    vault.set_active_collection("setA").unwrap();
    vault.delete_collection("setA").unwrap();
    vault.close().unwrap();

    let vault = open_vault(&dir);
    assert_eq!(vault.active_collection().unwrap(), "quizletData");
    vault.close().unwrap();
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_default_is_protected() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault
        .capture("quizletData", &Record::new("Q1", "A"))
        .unwrap();

    let err = vault.delete_collection("quizletData").unwrap_err();
    assert!(matches!(
        err,
        VaultError::Protected(ProtectedResourceError::DefaultCollection(_))
    ));
    assert_eq!(vault.count("quizletData").unwrap(), 1);
    assert_eq!(vault.list_collections().unwrap(), vec!["quizletData"]);
    vault.close().unwrap();
}

#[test]
fn test_delete_removes_name_and_records() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    vault.create_collection("setB").unwrap();
    vault.capture("setA", &Record::new("Q1", "A")).unwrap();
    vault.capture("setA", &Record::new("Q2", "A")).unwrap();

    assert_eq!(vault.delete_collection("setA").unwrap(), 2);

    assert_eq!(vault.list_collections().unwrap(), vec!["quizletData", "setB"]);
    assert_eq!(vault.count("setA").unwrap(), 0);
    vault.close().unwrap();
}

#[test]
fn test_delete_keeps_other_collections() {
    let dir = tempdir().unwrap();
    let vault = open_vault(&dir);

    vault.create_collection("setA").unwrap();
    let shared = Record::new("Q1", "A");
    vault.capture("setA", &shared).unwrap();
    vault.capture("quizletData", &shared).unwrap();

    vault.delete_collection("setA").unwrap();

    assert!(vault
        .contains("quizletData", &shared.fingerprint())
        .unwrap());
    vault.close().unwrap();
}
