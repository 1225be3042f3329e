//! Derivative orchestration - decode once, then scale and write each derivative.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{ArtifactPaths, BoundBox, Derivative, DerivativeReport, JobStatus};

use super::decode::{Bitmap, DecoderRegistry, DecoderSelector};
use super::scale::Scaler;
use super::validate::Validator;
use super::write::JpegWriter;

/// Runs the thumbnail and small jobs for a resolved source.
pub struct DerivativeProcessor {
    selector: DecoderSelector,
    validator: Validator,
    scaler: Scaler,
    writer: JpegWriter,
    thumbnail: BoundBox,
    small: BoundBox,
    concurrent: bool,
    job_timeout_ms: u64,
}

impl DerivativeProcessor {
    /// Create a processor using `registry` for decoding.
    pub fn new(config: &Config, registry: DecoderRegistry) -> Self {
        Self {
            selector: DecoderSelector::new(registry, config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            scaler: Scaler::new(),
            writer: JpegWriter::new(config.derivatives.jpeg_quality),
            thumbnail: config.derivatives.thumbnail,
            small: config.derivatives.small,
            concurrent: config.derivatives.concurrent,
            job_timeout_ms: config.limits.derivative_timeout_ms,
        }
    }

    pub fn selector(&self) -> &DecoderSelector {
        &self.selector
    }

    fn bound(&self, derivative: Derivative) -> BoundBox {
        match derivative {
            Derivative::Thumbnail => self.thumbnail,
            Derivative::Small => self.small,
        }
    }

    /// Generate both derivatives of `source`.
    ///
    /// Never fails as a whole: each job reports its own status, and a
    /// failure in one job does not affect the other.
    pub async fn process(&self, source: &Path, paths: &ArtifactPaths) -> DerivativeReport {
        let start = Instant::now();

        if !source.exists() {
            tracing::error!("Source {:?} is missing, skipping derivative jobs", source);
            return DerivativeReport::both(JobStatus::Skipped {
                reason: format!("source not found: {}", source.display()),
            });
        }

        let bitmap = match self.load(source).await {
            Ok(bitmap) => Arc::new(bitmap),
            Err(e) => {
                tracing::error!("Cannot load {:?}: {}", source, e);
                return DerivativeReport::both(JobStatus::Failed {
                    error: e.to_string(),
                });
            }
        };
        tracing::trace!("  Load: {:?}", start.elapsed());

        let (thumbnail, small) = if self.concurrent {
            tokio::join!(
                self.run_job(Derivative::Thumbnail, &bitmap, paths),
                self.run_job(Derivative::Small, &bitmap, paths)
            )
        } else {
            let thumbnail = self.run_job(Derivative::Thumbnail, &bitmap, paths).await;
            let small = self.run_job(Derivative::Small, &bitmap, paths).await;
            (thumbnail, small)
        };

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{})",
            source,
            start.elapsed(),
            bitmap.width,
            bitmap.height
        );
        DerivativeReport { thumbnail, small }
    }

    /// Select, validate and decode the source.
    async fn load(&self, source: &Path) -> Result<Bitmap, PipelineError> {
        let kind = self.selector.select(source)?;
        self.validator.validate(source, kind)?;
        self.selector.decode(source, kind).await
    }

    async fn run_job(
        &self,
        derivative: Derivative,
        bitmap: &Arc<Bitmap>,
        paths: &ArtifactPaths,
    ) -> JobStatus {
        let dest = paths.derivative_path(derivative).to_path_buf();
        match self.scale_and_write(derivative, bitmap, dest.clone()).await {
            Ok((width, height)) => {
                tracing::info!("Wrote {} {}x{} to {:?}", derivative, width, height, dest);
                JobStatus::Written { width, height }
            }
            Err(e) => {
                tracing::error!("{} job for {:?} failed: {}", derivative, dest, e);
                JobStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Scale and write on the blocking pool under the job timeout.
    ///
    /// A blocking write cannot be cancelled, so on timeout this still waits
    /// for it to finish before reporting `Timeout`. The caller's key guard
    /// therefore outlives every write to the derivative paths.
    async fn scale_and_write(
        &self,
        derivative: Derivative,
        bitmap: &Arc<Bitmap>,
        dest: PathBuf,
    ) -> Result<(u32, u32), PipelineError> {
        let bitmap = Arc::clone(bitmap);
        let bound = self.bound(derivative);
        let scaler = self.scaler;
        let writer = self.writer;
        let dest_for_task = dest.clone();

        let mut job = tokio::task::spawn_blocking(move || {
            let scaled = scaler.scale(&bitmap.image, bound);
            writer.write(&scaled, &dest_for_task)?;
            Ok::<_, PipelineError>((scaled.width(), scaled.height()))
        });

        match timeout(Duration::from_millis(self.job_timeout_ms), &mut job).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Encode {
                path: dest,
                message: format!("Task join error: {}", e),
            }),
            Err(_) => {
                if let Err(e) = job.await {
                    tracing::warn!("{} task for {:?} ended abnormally: {}", derivative, dest, e);
                }
                Err(PipelineError::Timeout {
                    path: dest,
                    stage: derivative.to_string(),
                    timeout_ms: self.job_timeout_ms,
                })
            }
        }
    }
}
