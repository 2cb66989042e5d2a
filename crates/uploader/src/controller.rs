//! Upload task controller.
//!
//! One [`UploadController`] drives one file through
//! `Fingerprinting → CheckingExistence → Initializing → Uploading →
//! Completing → Done`, short-circuiting when the store already has the
//! content. Chunks go out in sequential batches; every request of a batch
//! settles before the next batch starts, and pause or cancel requests raised
//! through an [`UploadHandle`] are observed between batches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use searchhub_transfer::{
    AcknowledgedSet, ChunkPlan, Fingerprint, ProgressCallback, ProgressReporter, UploadSubject,
    derive_fingerprint, validate_folder_name,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::UploadError;
use crate::finalizer::CompletionFinalizer;
use crate::negotiator::{SessionHandle, SessionNegotiator};
use crate::store::RemoteStore;
use crate::transmitter::ChunkTransmitter;
use crate::types::{ResumeMode, UploadOptions, UploadOutcome, UploadState};

/// Phase label passed to the progress callback for instant uploads.
pub const PHASE_INSTANT: &str = "instant upload";

/// Phase label passed to the progress callback while chunks are sent.
pub const PHASE_UPLOADING: &str = "uploading";

/// Flags shared between a controller and its handles.
#[derive(Debug, Default)]
struct Control {
    paused: AtomicBool,
    cancel: CancellationToken,
}

/// Cloneable remote control for a running upload.
///
/// Handles only raise flags; the controller acts on them at the next batch
/// boundary.
#[derive(Debug, Clone)]
pub struct UploadHandle {
    control: Arc<Control>,
    state: watch::Receiver<UploadState>,
}

impl UploadHandle {
    /// Requests a pause. The batch in flight still settles.
    pub fn pause(&self) {
        debug!("pause requested");
        self.control.paused.store(true, Ordering::SeqCst);
    }

    /// Cancels the upload for good. Results of the batch in flight are
    /// discarded and no further progress is reported.
    pub fn cancel(&self) {
        debug!("cancel requested");
        self.control.cancel.cancel();
    }

    pub fn is_paused(&self) -> bool {
        self.control.paused.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.cancel.is_cancelled()
    }

    /// Completes once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.control.cancel.cancelled().await
    }

    pub fn state(&self) -> UploadState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.clone()
    }
}

/// Drives a single file upload.
pub struct UploadController {
    store: Arc<dyn RemoteStore>,
    subject: Box<dyn UploadSubject>,
    options: UploadOptions,
    plan: ChunkPlan,
    /// Every index acknowledged since construction; drives progress.
    acked: AcknowledgedSet,
    /// Indices acknowledged under the current session.
    session_acked: AcknowledgedSet,
    fingerprint: Option<Fingerprint>,
    session: Option<SessionHandle>,
    reporter: ProgressReporter,
    control: Arc<Control>,
    state_tx: watch::Sender<UploadState>,
}

impl UploadController {
    /// Creates a controller in `Idle`.
    ///
    /// The destination folder is validated here, before any request. An
    /// empty folder means the store root.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        subject: Box<dyn UploadSubject>,
        mut options: UploadOptions,
    ) -> Result<Self, UploadError> {
        options.folder = options.folder.filter(|f| !f.is_empty());
        if let Some(folder) = options.folder.as_deref() {
            validate_folder_name(folder)?;
        }
        options.concurrency = options.concurrency.max(1);

        let plan = ChunkPlan::new(subject.size(), options.chunk_size);
        let acked = AcknowledgedSet::new(plan.len());
        let session_acked = AcknowledgedSet::new(plan.len());
        let (state_tx, _) = watch::channel(UploadState::Idle);

        Ok(Self {
            store,
            subject,
            options,
            plan,
            acked,
            session_acked,
            fingerprint: None,
            session: None,
            reporter: ProgressReporter::new(None),
            control: Arc::new(Control::default()),
            state_tx,
        })
    }

    /// Returns a handle for pausing, cancelling and observing this upload.
    pub fn handle(&self) -> UploadHandle {
        UploadHandle {
            control: Arc::clone(&self.control),
            state: self.state_tx.subscribe(),
        }
    }

    pub fn state(&self) -> UploadState {
        *self.state_tx.borrow()
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    /// Chunks acknowledged since this controller was created.
    ///
    /// Restarting under a new session does not shrink this set.
    pub fn acknowledged(&self) -> &AcknowledgedSet {
        &self.acked
    }

    /// Session of the current or most recent run.
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// Runs the whole pipeline from the start.
    ///
    /// Returns [`UploadError::Paused`] when a pause was observed; call
    /// [`resume`](Self::resume) to continue. Any other error leaves the
    /// controller in `Failed` (or `Cancelled`), and calling `upload` again
    /// retries from the top. Reported progress never drops below what an
    /// earlier run of this controller already reported.
    pub async fn upload(
        &mut self,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, UploadError> {
        self.control.paused.store(false, Ordering::SeqCst);
        self.reporter.set_callback(on_progress);
        self.run().await
    }

    /// Continues after a pause.
    ///
    /// With [`ResumeMode::Restart`] this is the same as [`upload`](Self::upload).
    /// With [`ResumeMode::ContinueSession`] and a session still held from the
    /// paused run, the store is asked for the session's progress first. If it
    /// still knows the session and holds every chunk acknowledged under it,
    /// only the missing chunks are sent; otherwise the upload restarts.
    pub async fn resume(
        &mut self,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, UploadError> {
        self.control.paused.store(false, Ordering::SeqCst);
        self.reporter.set_callback(on_progress);

        if self.options.resume_mode == ResumeMode::ContinueSession
            && self.state() == UploadState::Paused
            && let (Some(fingerprint), Some(session)) =
                (self.fingerprint.clone(), self.session.clone())
        {
            self.checkpoint()?;
            if self.session_intact(&session).await {
                return self.transmit_and_finalize(fingerprint, session).await;
            }
        }

        self.run().await
    }

    /// `true` if the store still holds every chunk acknowledged under
    /// `session` for a plan of the same length.
    async fn session_intact(&self, session: &SessionHandle) -> bool {
        let upload_id = session.upload_id.as_str();
        match SessionNegotiator::new(self.store.as_ref())
            .query_progress(upload_id)
            .await
        {
            Ok(remote)
                if remote.total_chunks as usize == self.plan.len()
                    && remote.uploaded_chunks as usize >= self.session_acked.len() =>
            {
                debug!(
                    %upload_id,
                    remote_chunks = remote.uploaded_chunks,
                    local_chunks = self.session_acked.len(),
                    "continuing session"
                );
                true
            }
            Ok(remote) => {
                warn!(
                    %upload_id,
                    remote_chunks = remote.uploaded_chunks,
                    remote_total = remote.total_chunks,
                    local_chunks = self.session_acked.len(),
                    planned = self.plan.len(),
                    "store disagrees with the paused session, restarting"
                );
                false
            }
            Err(e) => {
                warn!(%upload_id, error = %e, "paused session is gone, restarting");
                false
            }
        }
    }

    async fn run(&mut self) -> Result<UploadOutcome, UploadError> {
        self.checkpoint()?;
        self.session = None;
        self.session_acked = AcknowledgedSet::new(self.plan.len());
        let store = Arc::clone(&self.store);
        let negotiator = SessionNegotiator::new(store.as_ref());

        self.set_state(UploadState::Fingerprinting);
        let fingerprint = derive_fingerprint(self.subject.as_ref()).await;
        self.fingerprint = Some(fingerprint.clone());
        self.checkpoint()?;

        self.set_state(UploadState::CheckingExistence);
        let exists = match negotiator.check_exists(&fingerprint).await {
            Ok(exists) => exists,
            Err(e) => return self.fail(e),
        };
        self.checkpoint()?;

        if exists {
            self.set_state(UploadState::ShortCircuited);
            info!(file = self.subject.name(), %fingerprint, "content already stored, instant upload");
            self.reporter.report(100.0, PHASE_INSTANT);
            self.set_state(UploadState::Done);
            return Ok(UploadOutcome::instant(fingerprint));
        }

        self.set_state(UploadState::Initializing);
        let folder = self.options.folder.clone();
        let session = match negotiator
            .open(self.subject.as_ref(), &fingerprint, &self.plan, folder.as_deref())
            .await
        {
            Ok(session) => session,
            Err(e) => return self.fail(e),
        };
        self.session = Some(session.clone());
        self.checkpoint()?;

        self.transmit_and_finalize(fingerprint, session).await
    }

    async fn transmit_and_finalize(
        &mut self,
        fingerprint: Fingerprint,
        session: SessionHandle,
    ) -> Result<UploadOutcome, UploadError> {
        self.set_state(UploadState::Uploading);
        let store = Arc::clone(&self.store);
        let pending = self.plan.pending(&self.session_acked);

        for (batch_no, batch) in pending.chunks(self.options.concurrency).enumerate() {
            self.checkpoint()?;
            if self.control.paused.load(Ordering::SeqCst) {
                return self.pause_here();
            }

            let results = {
                let transmitter = ChunkTransmitter::new(store.as_ref(), self.subject.as_ref());
                join_all(batch.iter().map(|chunk| transmitter.send(&session, *chunk))).await
            };
            self.checkpoint()?;

            let mut first_error = None;
            for result in results {
                match result {
                    Ok(index) => {
                        self.session_acked.insert(index)?;
                        self.acked.insert(index)?;
                    }
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
            self.reporter.report_acknowledged(&self.acked, PHASE_UPLOADING);
            debug!(
                upload_id = %session.upload_id,
                batch = batch_no,
                acked = self.session_acked.len(),
                planned = self.plan.len(),
                "batch settled"
            );

            if let Some(e) = first_error {
                return self.fail(e);
            }
        }

        self.checkpoint()?;
        if self.control.paused.load(Ordering::SeqCst) {
            return self.pause_here();
        }

        self.set_state(UploadState::Completing);
        let finalized = match CompletionFinalizer::new(store.as_ref())
            .finalize(&session, self.options.add_to_index)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(e),
        };

        self.set_state(UploadState::Done);
        info!(
            file = self.subject.name(),
            upload_id = %session.upload_id,
            file_path = finalized.file_path.as_deref().unwrap_or(""),
            indexed = ?finalized.indexed,
            "upload complete"
        );

        Ok(UploadOutcome {
            fingerprint,
            instant: false,
            upload_id: Some(session.upload_id),
            message: finalized.message,
            file_path: finalized.file_path,
            indexed: finalized.indexed,
            parse_output: finalized.parse_output,
            multimodal_indexed: finalized.multimodal_indexed,
        })
    }

    /// Ends the run as `Cancelled` if a cancel was requested.
    fn checkpoint(&mut self) -> Result<(), UploadError> {
        if !self.control.cancel.is_cancelled() {
            return Ok(());
        }
        self.reporter.silence();
        if self.state() != UploadState::Cancelled {
            info!(file = self.subject.name(), "upload cancelled");
            self.set_state(UploadState::Cancelled);
        }
        Err(UploadError::Cancelled)
    }

    fn pause_here<T>(&self) -> Result<T, UploadError> {
        info!(
            file = self.subject.name(),
            acked = self.session_acked.len(),
            planned = self.plan.len(),
            "upload paused"
        );
        self.set_state(UploadState::Paused);
        Err(UploadError::Paused)
    }

    fn fail<T>(&self, e: UploadError) -> Result<T, UploadError> {
        error!(file = self.subject.name(), error = %e, "upload failed");
        self.set_state(UploadState::Failed);
        Err(e)
    }

    fn set_state(&self, next: UploadState) {
        let prev = self.state_tx.send_replace(next);
        debug!(file = self.subject.name(), from = ?prev, to = ?next, "state transition");
    }
}
