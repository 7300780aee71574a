//! The cancellable download pipeline: fetch chapters, assemble documents,
//! deliver them, and clean up behind itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use courier_core::{DownloadPlan, MergeChoice, Mode};
use courier_engine::{
    chapter_url, ChapterFetcher, DocumentAssembler, FailureKind, FetchVariant, Workdir,
};
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::transport::Transport;
use crate::{texts, UserId};

/// Delivered documents linger briefly so slow transports finish reading
/// them, then are deleted to bound disk usage.
pub const PDF_DELETE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadReport {
    pub delivered: usize,
    pub cancelled: bool,
}

#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn ChapterFetcher>,
    assembler: Arc<dyn DocumentAssembler>,
    transport: Arc<dyn Transport>,
    workdir: Workdir,
    pdf_ttl: Duration,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ChapterFetcher>,
        assembler: Arc<dyn DocumentAssembler>,
        transport: Arc<dyn Transport>,
        workdir: Workdir,
    ) -> Self {
        Self {
            fetcher,
            assembler,
            transport,
            workdir,
            pdf_ttl: PDF_DELETE_DELAY,
        }
    }

    /// Shortens the delivered-document lifetime; used by tests.
    pub fn with_pdf_ttl(mut self, ttl: Duration) -> Self {
        self.pdf_ttl = ttl;
        self
    }

    pub fn workdir(&self) -> &Workdir {
        &self.workdir
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Runs one chapter range to completion or cancellation. Failed chapters
    /// are skipped, never fatal; cancellation removes every chapter folder
    /// in the claimed range.
    pub async fn run(
        &self,
        user: UserId,
        plan: &DownloadPlan,
        cancel: &CancellationToken,
    ) -> DownloadReport {
        let variant = variant_for(plan.mode);
        let mut delivered = 0;
        let mut merged_pages: Vec<PathBuf> = Vec::new();

        for chapter in plan.start..=plan.end {
            if cancel.is_cancelled() {
                self.cleanup_range(plan, variant);
                return DownloadReport {
                    delivered,
                    cancelled: true,
                };
            }

            let url = chapter_url(&plan.url_template, chapter);
            let pages = match self
                .fetcher
                .fetch_chapter(&url, chapter, &self.workdir, variant, cancel)
                .await
            {
                Ok(pages) => pages,
                Err(err) if err.kind == FailureKind::Cancelled => {
                    self.cleanup_range(plan, variant);
                    return DownloadReport {
                        delivered,
                        cancelled: true,
                    };
                }
                Err(err) => {
                    warn!("chapter {chapter} failed, skipping: {err}");
                    continue;
                }
            };
            if pages.is_empty() {
                warn!("chapter {chapter} produced no pages, skipping");
                continue;
            }

            match plan.merge {
                MergeChoice::Split => {
                    let pdf = self.workdir.pdf_path(&plan.title, chapter);
                    if self.assemble_and_deliver(user, pages, pdf).await {
                        delivered += 1;
                    }
                    if let Err(err) = self.workdir.remove_chapter_dir(chapter, variant) {
                        warn!("cleanup of chapter {chapter} failed: {err}");
                    }
                }
                MergeChoice::Merged => merged_pages.extend(pages),
            }
        }

        if plan.merge == MergeChoice::Merged {
            if !merged_pages.is_empty() {
                let pdf = self
                    .workdir
                    .merged_pdf_path(&plan.title, plan.start, plan.end);
                if self.assemble_and_deliver(user, merged_pages, pdf).await {
                    delivered += 1;
                }
            }
            self.cleanup_range(plan, variant);
        }

        info!(
            "chapters {}-{} of {} finished with {delivered} document(s) for user {user}",
            plan.start, plan.end, plan.title
        );
        DownloadReport {
            delivered,
            cancelled: false,
        }
    }

    async fn assemble_and_deliver(&self, user: UserId, pages: Vec<PathBuf>, pdf: PathBuf) -> bool {
        let assembler = Arc::clone(&self.assembler);
        let out = pdf.clone();
        let assembled =
            tokio::task::spawn_blocking(move || assembler.assemble(&pages, &out)).await;
        let wrote = match assembled {
            Ok(Ok(wrote)) => wrote,
            Ok(Err(err)) => {
                error!("assembling {} failed: {err}", pdf.display());
                return false;
            }
            Err(err) => {
                error!("assembler task failed: {err}");
                return false;
            }
        };
        if !wrote {
            return false;
        }

        let caption = pdf
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sent = match self.transport.send_document(user, &pdf, &caption).await {
            Ok(()) => true,
            Err(err) => {
                error!("delivering {} failed: {err}", pdf.display());
                let _ = self
                    .transport
                    .send_text(user, &texts::delivery_failed(&caption))
                    .await;
                false
            }
        };
        // The document is deleted on schedule whether or not the upload worked.
        schedule_delete(pdf, self.pdf_ttl);
        sent
    }

    fn cleanup_range(&self, plan: &DownloadPlan, variant: FetchVariant) {
        if let Err(err) = self
            .workdir
            .remove_chapter_range(plan.start, plan.end, variant)
        {
            warn!("range cleanup failed: {err}");
        }
    }
}

pub fn variant_for(mode: Mode) -> FetchVariant {
    match mode {
        Mode::Normal => FetchVariant::Standard,
        Mode::HighFidelity => FetchVariant::HighFidelity,
    }
}

/// Deletes a delivered document after a delay.
fn schedule_delete(path: PathBuf, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("expired document {}", path.display()),
            Err(err) => debug!("document {} already gone: {err}", path.display()),
        }
    });
}
