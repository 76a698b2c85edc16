//! The captioning run: discover images, describe each one, print results.

use std::io::Write;
use std::path::Path;

use super::discovery::ImageDiscovery;
use super::requester::{caption_image, DescribeOptions};
use crate::config::{Config, ProcessingConfig};
use crate::error::{CaptionError, PipelineError, Result};
use crate::output::OutputWriter;
use crate::vision::CaptionService;

/// Options for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Which files count as images
    pub processing: ProcessingConfig,
    /// Per-image request parameters
    pub describe: DescribeOptions,
    /// Stop at the first failed image and return its error
    pub fail_fast: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            processing: config.processing.clone(),
            describe: DescribeOptions::from_config(config),
            fail_fast: config.pipeline.fail_fast,
        }
    }
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Images submitted to the service (or failed locally)
    pub processed: usize,
    /// Images with at least one caption
    pub captioned: usize,
    /// Images the service returned no captions for
    pub empty: usize,
    /// Images that failed to read or describe
    pub failed: usize,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The image folder does not exist; nothing was attempted
    FolderMissing,
    /// The folder holds no supported images; nothing was attempted
    NoImages,
    /// Every discovered image was attempted
    Completed(RunSummary),
}

/// Drives one captioning pass over a folder.
pub struct CaptionRunner<'a> {
    service: &'a dyn CaptionService,
    options: RunOptions,
}

impl<'a> CaptionRunner<'a> {
    pub fn new(service: &'a dyn CaptionService, options: RunOptions) -> Self {
        Self { service, options }
    }

    /// Caption every supported image in `dir`, in sorted order.
    ///
    /// A missing folder or an empty folder prints a notice and returns
    /// normally. A folder that exists but cannot be listed is an error. A failed image is logged and skipped unless `fail_fast`
    /// is set, in which case its error is returned.
    pub async fn run<W: Write>(
        &self,
        dir: &Path,
        out: &mut OutputWriter<W>,
    ) -> Result<RunOutcome> {
        if !dir.is_dir() {
            let notice = format!("Folder '{}' does not exist. Exiting...", dir.display());
            tracing::warn!("{notice}");
            out.write_notice(&notice)?;
            return Ok(RunOutcome::FolderMissing);
        }

        let discovery = ImageDiscovery::new(self.options.processing.clone());
        let files = discovery
            .discover(dir)
            .map_err(|source| PipelineError::FolderRead {
                path: dir.to_path_buf(),
                source,
            })?;
        if files.is_empty() {
            let notice = format!("No valid images found in '{}'. Exiting...", dir.display());
            tracing::warn!("{notice}");
            out.write_notice(&notice)?;
            return Ok(RunOutcome::NoImages);
        }
        tracing::info!(
            "Found {} image(s) to caption ({} bytes) using {}",
            files.len(),
            ImageDiscovery::total_size(&files),
            self.service.name()
        );

        let mut summary = RunSummary::default();
        for file in &files {
            tracing::debug!("Describing {:?}", file.path);
            summary.processed += 1;

            match caption_image(self.service, &file.path, &self.options.describe).await {
                Ok(description) => {
                    if description.has_captions() {
                        summary.captioned += 1;
                    } else {
                        summary.empty += 1;
                    }
                    out.write_description(&file.path, &description)?;
                }
                Err(e) if self.options.fail_fast => {
                    out.flush()?;
                    return Err(CaptionError::Pipeline(e));
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Failed: {e}");
                }
            }
        }
        out.flush()?;

        tracing::info!(
            "Captioned {} of {} image(s) ({} without captions, {} failed)",
            summary.captioned,
            summary.processed,
            summary.empty,
            summary.failed
        );
        Ok(RunOutcome::Completed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::output::OutputFormat;
    use crate::test_utils::MockService;
    use crate::types::{Caption, ImageDescription};
    use std::fs;

    async fn run_text(
        service: &MockService,
        dir: &Path,
        options: RunOptions,
    ) -> (Result<RunOutcome>, String) {
        let mut out = OutputWriter::new(Vec::new(), OutputFormat::Text);
        let result = CaptionRunner::new(service, options).run(dir, &mut out).await;
        (result, String::from_utf8(out.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_folder_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("images");
        let service = MockService::captions(&[("unused", 0.5)]);

        let (result, output) = run_text(&service, &missing, RunOptions::default()).await;

        assert_eq!(result.unwrap(), RunOutcome::FolderMissing);
        assert_eq!(
            output,
            format!("Folder '{}' does not exist. Exiting...\n", missing.display())
        );
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_folder_without_images_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let service = MockService::captions(&[("unused", 0.5)]);

        let (result, output) = run_text(&service, dir.path(), RunOptions::default()).await;

        assert_eq!(result.unwrap(), RunOutcome::NoImages);
        assert_eq!(
            output,
            format!(
                "No valid images found in '{}'. Exiting...\n",
                dir.path().display()
            )
        );
        assert_eq!(service.calls(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_folder_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.jpg"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running as root: permissions are not enforced.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let service = MockService::captions(&[("unused", 0.5)]);

        let (result, output) = run_text(&service, &locked, RunOptions::default()).await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            result,
            Err(CaptionError::Pipeline(PipelineError::FolderRead { .. }))
        ));
        assert!(!output.contains("No valid images"));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_prints_every_caption_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pets.jpg"), b"x").unwrap();
        let service = MockService::captions(&[("a cat on a chair", 0.91), ("a dog nearby", 0.55)]);

        let (result, output) = run_text(&service, dir.path(), RunOptions::default()).await;

        assert_eq!(
            output,
            "Image: pets.jpg\n  Caption: a cat on a chair\n  Confidence: 0.91\n\n\
             Image: pets.jpg\n  Caption: a dog nearby\n  Confidence: 0.55\n\n"
        );
        assert_eq!(
            result.unwrap(),
            RunOutcome::Completed(RunSummary {
                processed: 1,
                captioned: 1,
                empty: 0,
                failed: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_zero_captions_prints_single_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blank.jpg"), b"x").unwrap();
        let service = MockService::captions(&[]);

        let (result, output) = run_text(&service, dir.path(), RunOptions::default()).await;

        assert_eq!(output, "No captions found for image: blank.jpg\n");
        match result.unwrap() {
            RunOutcome::Completed(summary) => assert_eq!(summary.empty, 1),
            other => panic!("Expected completed run, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rounds_confidence_for_display() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        let service = MockService::captions(&[("a lake", 0.8675)]);

        let (_, output) = run_text(&service, dir.path(), RunOptions::default()).await;

        assert!(output.contains("  Confidence: 0.87\n"), "got: {output}");
    }

    #[tokio::test]
    async fn test_passes_language_and_candidate_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let service = MockService::new(|_, request| {
            assert_eq!(request.language, "ja");
            assert_eq!(request.max_candidates, 3);
            Ok(ImageDescription::default())
        });
        let mut options = RunOptions::default();
        options.describe.language = "ja".to_string();
        options.describe.max_candidates = 3;

        let (result, _) = run_text(&service, dir.path(), options).await;
        assert!(result.is_ok());
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_image_does_not_abort_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"ok").unwrap();
        fs::write(dir.path().join("b.jpg"), b"broken").unwrap();
        fs::write(dir.path().join("c.jpg"), b"ok").unwrap();
        let service = MockService::new(|_, request| {
            if &request.image[..] == b"broken" {
                Err(ServiceError::Http {
                    message: "HTTP 400: Input data is not a valid image.".to_string(),
                    status_code: Some(400),
                })
            } else {
                Ok(ImageDescription::from_captions(vec![Caption::new(
                    "something", 0.5,
                )]))
            }
        });

        let (result, output) = run_text(&service, dir.path(), RunOptions::default()).await;

        assert_eq!(service.calls(), 3);
        assert!(output.contains("Image: a.jpg"));
        assert!(!output.contains("Image: b.jpg"));
        assert!(output.contains("Image: c.jpg"));
        assert_eq!(
            result.unwrap(),
            RunOutcome::Completed(RunSummary {
                processed: 3,
                captioned: 2,
                empty: 0,
                failed: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"broken").unwrap();
        fs::write(dir.path().join("b.jpg"), b"ok").unwrap();
        let service = MockService::failing(Some(401), "access denied");
        let options = RunOptions {
            fail_fast: true,
            ..RunOptions::default()
        };

        let (result, output) = run_text(&service, dir.path(), options).await;

        assert!(matches!(
            result,
            Err(CaptionError::Pipeline(PipelineError::Service { .. }))
        ));
        assert_eq!(service.calls(), 1);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_jsonl_run_emits_records_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        let service = MockService::captions(&[("a thing", 0.42)]);

        let mut out = OutputWriter::new(Vec::new(), OutputFormat::JsonLines);
        CaptionRunner::new(&service, RunOptions::default())
            .run(dir.path(), &mut out)
            .await
            .unwrap();
        let output = String::from_utf8(out.into_inner()).unwrap();

        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["file_name"], "a.jpg");
        assert_eq!(first["captions"][0]["confidence"], 0.42);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.pipeline.fail_fast = true;
        config.caption.max_candidates = 2;

        let options = RunOptions::from_config(&config);
        assert!(options.fail_fast);
        assert_eq!(options.describe.max_candidates, 2);
        assert_eq!(options.processing.supported_formats.len(), 3);
    }
}
