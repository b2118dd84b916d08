// Test fixtures for integration testing

use super::fakes::{EchoChat, HashingEmbedder};
use kbase::core::config::Config;
use kbase::core::embedding::Embedder;
use kbase::core::llm::ChatModel;
use kbase::core::services::Services;
use kbase::core::storage::LanceVectorIndex;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Directory of documents on disk
#[allow(dead_code)]
pub struct DocDir {
    pub dir: TempDir,
}

impl DocDir {
    /// Create a directory holding `(relative_path, content)` files
    #[allow(dead_code)]
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full_path = dir.path().join(path);
            std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            std::fs::write(&full_path, content).unwrap();
        }
        Self { dir }
    }

    /// A few short documents on unrelated topics
    #[allow(dead_code)]
    pub fn small() -> Self {
        Self::with_files(&[
            (
                "refunds.txt",
                "Refunds are issued within 30 days of purchase when the receipt is presented.",
            ),
            (
                "shipping.md",
                "# Shipping\n\nOrders ship from the Rotterdam warehouse every weekday.",
            ),
            (
                "staff.csv",
                "name,role,office\nAda,engineer,Delft\nGrace,manager,\n",
            ),
            ("notes/empty.txt", "   \n"),
        ])
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// `len` characters of text whose windows are all distinct
#[allow(dead_code)]
pub fn known_text(len: usize) -> String {
    let mut text = String::new();
    let mut i = 0;
    while text.chars().count() < len {
        text.push_str(&format!("word{i:04} "));
        i += 1;
    }
    text.chars().take(len).collect()
}

/// Services over a temporary index, with fake model services
#[allow(dead_code)]
pub struct TestServices {
    pub services: Arc<Services>,
    pub index_dir: TempDir,
}

/// Services with the hashing embedder and `chat`
#[allow(dead_code)]
pub fn test_services(chat: Arc<dyn ChatModel>) -> TestServices {
    test_services_with(Config::default(), Arc::new(HashingEmbedder::default()), chat)
}

/// Services with explicit config and model fakes
#[allow(dead_code)]
pub fn test_services_with(
    mut config: Config,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
) -> TestServices {
    let index_dir = TempDir::new().unwrap();
    config.storage.index_dir = index_dir.path().to_path_buf();

    let index = Arc::new(
        LanceVectorIndex::open(
            &config.storage.index_dir,
            &config.storage.table_name,
            config.storage.metric,
            config.storage.nprobe,
        )
        .unwrap(),
    );
    let services = Services::with_components(config, index, embedder, chat);

    TestServices {
        services: Arc::new(services),
        index_dir,
    }
}

/// Default services replying with the prompt
#[allow(dead_code)]
pub fn echo_services() -> TestServices {
    test_services(Arc::new(EchoChat))
}
