//! Captioner Core - print auto-generated captions for a folder of images.
//!
//! Each supported image in a folder is uploaded to the Azure Computer Vision
//! describe operation, and the returned captions are printed with their
//! confidence scores.
//!
//! ```text
//! Config → Credentials → CaptionService → Discover → Describe (per image) → Output
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::{CaptionRunner, CaptionServiceFactory, Config, OutputFormat, OutputWriter, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> captioner_core::Result<()> {
//!     let config = Config::load()?;
//!     let service = CaptionServiceFactory::create(&config.service, &config.limits)?;
//!
//!     let runner = CaptionRunner::new(service.as_ref(), RunOptions::from_config(&config));
//!     let mut out = OutputWriter::new(std::io::stdout(), OutputFormat::Text);
//!     runner.run(&config.image_dir(), &mut out).await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod vision;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CaptionError, ConfigError, PipelineError, PipelineResult, Result, ServiceError};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    caption_image, CaptionRunner, DescribeOptions, DiscoveredFile, ImageDiscovery, RunOptions,
    RunOutcome, RunSummary,
};
pub use types::{Caption, CaptionRecord, Confidence, ImageDescription};
pub use vision::{CaptionService, CaptionServiceFactory, Credentials, DescribeRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Test utilities shared across modules.
#[cfg(test)]
pub(crate) mod test_utils {
    use crate::error::ServiceError;
    use crate::types::{Caption, ImageDescription};
    use crate::vision::{CaptionService, DescribeRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    type ResponseFn =
        dyn Fn(u32, &DescribeRequest) -> Result<ImageDescription, ServiceError> + Send + Sync;

    /// A configurable in-memory caption service.
    ///
    /// Each call to `describe()` invokes the response factory with the call
    /// index and the request, so tests can vary results per attempt or per
    /// image contents.
    pub struct MockService {
        response_fn: Box<ResponseFn>,
        call_count: Arc<AtomicU32>,
    }

    impl MockService {
        pub fn new<F>(response_fn: F) -> Self
        where
            F: Fn(u32, &DescribeRequest) -> Result<ImageDescription, ServiceError>
                + Send
                + Sync
                + 'static,
        {
            Self {
                response_fn: Box::new(response_fn),
                call_count: Arc::new(AtomicU32::new(0)),
            }
        }

        /// Always return the same captions.
        pub fn captions(captions: &[(&str, f64)]) -> Self {
            let captions: Vec<Caption> = captions
                .iter()
                .map(|(text, confidence)| Caption::new(*text, *confidence))
                .collect();
            Self::new(move |_, _| Ok(ImageDescription::from_captions(captions.clone())))
        }

        /// Always fail with an HTTP error.
        pub fn failing(status_code: Option<u16>, message: &str) -> Self {
            let message = message.to_string();
            Self::new(move |_, _| {
                Err(ServiceError::Http {
                    message: message.clone(),
                    status_code,
                })
            })
        }

        pub fn calls(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl CaptionService for MockService {
        fn name(&self) -> &str {
            "mock"
        }

        async fn describe(
            &self,
            request: &DescribeRequest,
        ) -> Result<ImageDescription, ServiceError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            (self.response_fn)(idx, request)
        }
    }
}
