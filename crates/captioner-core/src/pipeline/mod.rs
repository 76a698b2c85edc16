//! Captioning pipeline components.
//!
//! - **discovery**: Find image files in a folder
//! - **requester**: Read one image and ask the service for captions
//! - **driver**: Run discovery + requests and print the results

pub mod discovery;
pub mod driver;
pub mod requester;

// Re-exports for convenient access
pub use discovery::{DiscoveredFile, ImageDiscovery};
pub use driver::{CaptionRunner, RunOptions, RunOutcome, RunSummary};
pub use requester::{caption_image, DescribeOptions};
