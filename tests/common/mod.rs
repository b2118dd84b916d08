// Common test utilities and fixtures

pub mod fakes;
pub mod fixtures;

// Re-export commonly used items
// Note: not every test binary uses every helper
#[allow(unused_imports)]
pub use fakes::{EchoChat, FailingChat, FailingEmbedder, HashingEmbedder};
#[allow(unused_imports)]
pub use fixtures::{
    echo_services, known_text, test_services, test_services_with, DocDir, TestServices,
};
