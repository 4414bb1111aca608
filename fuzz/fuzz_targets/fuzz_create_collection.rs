#![no_main]

use libfuzzer_sys::fuzz_target;
use quizvault::{Config, QuizVault};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let vault = QuizVault::in_memory(Config::default()).unwrap();
    match vault.create_collection(name) {
        Ok(true) => {
            let names = vault.list_collections().unwrap();
            assert!(names.iter().any(|n| n == name.trim()));
            vault.delete_collection(name).unwrap();
            assert_eq!(vault.list_collections().unwrap(), vec!["quizletData"]);
        }
        Ok(false) => {}
        Err(e) => assert!(e.is_validation()),
    }
});
