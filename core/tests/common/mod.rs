//! Common test utilities and fixtures
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use verdiff_core::{Attribution, LocalVersionStore, NormalizedSchema};

/// Test fixture paths and utilities
pub struct TestFixtures {
    pub schemas_dir: PathBuf,
    pub texts_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

        Self {
            schemas_dir: fixtures_dir.join("schemas"),
            texts_dir: fixtures_dir.join("texts"),
        }
    }

    pub fn schema_path(&self, name: &str) -> PathBuf {
        self.schemas_dir.join(name)
    }

    pub fn schema(&self, name: &str) -> NormalizedSchema {
        NormalizedSchema::load(&self.schema_path(name)).expect("Failed to load schema fixture")
    }

    pub fn text(&self, name: &str) -> String {
        fs::read_to_string(self.texts_dir.join(name)).expect("Failed to read text fixture")
    }
}

/// A version store rooted in a temporary directory
pub struct TestStore {
    pub temp_dir: TempDir,
    pub store: LocalVersionStore,
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalVersionStore::new(temp_dir.path().join("store"));
        Self { temp_dir, store }
    }
}

pub fn author() -> Attribution {
    Attribution::new("u-100", "Barbara Liskov")
}

pub fn reviewer() -> Attribution {
    Attribution::new("u-200", "Edsger Dijkstra")
}
