// Conversion request dispatch
// Turns a user action into one backend request and one result

use super::indicator::BusyIndicator;
use super::service::ConversionService;
use crate::models::{
    BackendStatus, ConversionMode, ConversionRequest, ConversionResult, ConversionSession,
    FailureKind,
};
use crate::readiness::ReadinessGate;
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Please select both the input file and output folder.")]
    MissingSelection,
    #[error("Conversion is not available yet. {0}")]
    NotReady(String),
    #[error("Failed to read {path:?}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid output folder {path:?}: {source}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    BackendUnavailable(String),
    #[error("Failed to connect to backend: {0}")]
    Unreachable(String),
    /// The backend's own message, verbatim
    #[error("{0}")]
    Rejected(String),
}

impl ConversionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConversionError::MissingSelection => FailureKind::Validation,
            ConversionError::NotReady(_) => FailureKind::NotReady,
            ConversionError::ReadSource { .. } | ConversionError::OutputFolder { .. } => {
                FailureKind::Io
            }
            ConversionError::BackendUnavailable(_) => FailureKind::BackendUnavailable,
            ConversionError::Unreachable(_) => FailureKind::BackendUnreachable,
            ConversionError::Rejected(_) => FailureKind::Rejected,
        }
    }
}

impl From<ConversionError> for ConversionResult {
    fn from(error: ConversionError) -> Self {
        ConversionResult::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

pub struct ConversionDispatcher<S> {
    service: S,
    gate: Arc<ReadinessGate>,
    backend_status: watch::Receiver<BackendStatus>,
    ai_busy: Arc<BusyIndicator>,
}

impl<S: ConversionService> ConversionDispatcher<S> {
    pub fn new(
        service: S,
        gate: Arc<ReadinessGate>,
        backend_status: watch::Receiver<BackendStatus>,
        ai_busy: Arc<BusyIndicator>,
    ) -> Self {
        Self {
            service,
            gate,
            backend_status,
            ai_busy,
        }
    }

    /// Run one conversion to completion. Blocks on the HTTP call.
    pub fn request_conversion(
        &self,
        mode: ConversionMode,
        session: &ConversionSession,
    ) -> ConversionResult {
        match self.dispatch(mode, session) {
            Ok(artifact_path) => {
                info!("{} conversion saved to {:?}", mode.label(), artifact_path);
                ConversionResult::Success { artifact_path }
            }
            Err(e) => {
                warn!("{} conversion failed: {}", mode.label(), e);
                e.into()
            }
        }
    }

    pub fn dispatch(
        &self,
        mode: ConversionMode,
        session: &ConversionSession,
    ) -> Result<PathBuf, ConversionError> {
        let (source_file, output_folder) = session
            .selections()
            .ok_or(ConversionError::MissingSelection)?;

        if !self.gate.is_ready() {
            let state = self.gate.state();
            return Err(ConversionError::NotReady(format!(
                "AI Model Loading please wait: {}s",
                state.remaining_seconds
            )));
        }

        {
            let status = self.backend_status.borrow();
            if status.is_fatal() {
                return Err(ConversionError::BackendUnavailable(status.describe()));
            }
        }

        let source_code = fs::read_to_string(&source_file).map_err(|source| {
            ConversionError::ReadSource {
                path: source_file.clone(),
                source,
            }
        })?;

        // The backend runs from its own directory, so relative folders would land there
        let output_folder = std::path::absolute(&output_folder).map_err(|source| {
            ConversionError::OutputFolder {
                path: output_folder.clone(),
                source,
            }
        })?;

        let request = ConversionRequest::new(mode, source_code, output_folder);
        debug!(
            "Dispatching {} conversion of {:?} into {:?}",
            mode.label(),
            source_file,
            request.output_folder
        );

        // Cleared on every exit path, including panics in the service
        let _busy = mode.shows_busy_indicator().then(|| self.ai_busy.raise());

        let reply = self
            .service
            .submit(&request)
            .map_err(|e| ConversionError::Unreachable(e.to_string()))?;

        if reply.is_success() {
            Ok(request.artifact_path())
        } else {
            Err(ConversionError::Rejected(reply.error_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::service::{HttpConversionService, ServiceReply, TransportError};
    use crate::conversion::test_support::{refused_url, StubBackend};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeService {
        calls: Arc<AtomicUsize>,
        reply: Result<ServiceReply, String>,
        busy: Option<Arc<BusyIndicator>>,
        busy_during_call: Arc<Mutex<Vec<bool>>>,
        output_folders: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FakeService {
        fn replying(status: u16, body: serde_json::Value) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                reply: Ok(ServiceReply {
                    status,
                    body: Some(body),
                }),
                busy: None,
                busy_during_call: Arc::new(Mutex::new(Vec::new())),
                output_folders: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: Err("connection refused".to_string()),
                ..Self::replying(200, serde_json::json!({}))
            }
        }

        fn watching(mut self, busy: Arc<BusyIndicator>) -> Self {
            self.busy = Some(busy);
            self
        }
    }

    impl ConversionService for FakeService {
        fn submit(&self, request: &ConversionRequest) -> Result<ServiceReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output_folders
                .lock()
                .unwrap()
                .push(request.output_folder.clone());
            if let Some(busy) = &self.busy {
                self.busy_during_call.lock().unwrap().push(busy.is_active());
            }
            self.reply
                .clone()
                .map_err(TransportError::Unreachable)
        }

        fn ping(&self) -> Result<bool, TransportError> {
            Ok(true)
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        session: ConversionSession,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.cpp");
        fs::write(&source, "int main() { return 0; }").unwrap();
        let output = dir.path().join("out");
        fs::create_dir(&output).unwrap();

        Fixture {
            session: ConversionSession::new(Some(source), Some(output.clone())),
            output,
            _dir: dir,
        }
    }

    fn dispatcher<S: ConversionService>(service: S, busy: Arc<BusyIndicator>) -> ConversionDispatcher<S> {
        let (_tx, rx) = watch::channel(BackendStatus::Running { pid: None });
        ConversionDispatcher::new(service, Arc::new(ReadinessGate::new(0)), rx, busy)
    }

    #[test]
    fn test_success_reports_mode_artifact_path() {
        let fx = fixture();

        for mode in ConversionMode::ALL {
            let service = FakeService::replying(200, serde_json::json!({ "message": "done" }));
            let result = dispatcher(service, Arc::new(BusyIndicator::new()))
                .request_conversion(mode, &fx.session);

            assert_eq!(
                result,
                ConversionResult::Success {
                    artifact_path: fx.output.join(mode.output_file_name())
                }
            );
        }
    }

    #[test]
    fn test_relative_output_folder_sent_as_absolute() {
        let fx = fixture();
        let session = ConversionSession::new(fx.session.source_file.clone(), Some("out".into()));
        let service = FakeService::replying(200, serde_json::json!({ "message": "done" }));
        let sent = service.output_folders.clone();

        let result = dispatcher(service, Arc::new(BusyIndicator::new()))
            .request_conversion(ConversionMode::RuleBased, &session);

        let expected = std::env::current_dir().unwrap().join("out");
        assert_eq!(*sent.lock().unwrap(), vec![expected.clone()]);
        assert!(expected.is_absolute());
        assert_eq!(
            result,
            ConversionResult::Success {
                artifact_path: expected.join("output_sastra.rs")
            }
        );
    }

    #[test]
    fn test_missing_selection_never_calls_backend() {
        let fx = fixture();
        let sessions = [
            ConversionSession::default(),
            ConversionSession::new(fx.session.source_file.clone(), None),
            ConversionSession::new(None, fx.session.output_folder.clone()),
            ConversionSession::new(Some(PathBuf::new()), fx.session.output_folder.clone()),
        ];

        for session in &sessions {
            let service = FakeService::replying(200, serde_json::json!({}));
            let calls = service.calls.clone();
            let result = dispatcher(service, Arc::new(BusyIndicator::new()))
                .request_conversion(ConversionMode::RuleBased, session);

            assert_eq!(result.failure_kind(), Some(FailureKind::Validation));
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn test_closed_gate_never_calls_backend() {
        let fx = fixture();
        let service = FakeService::replying(200, serde_json::json!({}));
        let calls = service.calls.clone();
        let (_tx, rx) = watch::channel(BackendStatus::Running { pid: None });
        let dispatcher = ConversionDispatcher::new(
            service,
            Arc::new(ReadinessGate::new(60)),
            rx,
            Arc::new(BusyIndicator::new()),
        );

        let result = dispatcher.request_conversion(ConversionMode::AiAssisted, &fx.session);

        assert_eq!(result.failure_kind(), Some(FailureKind::NotReady));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dead_backend_never_called() {
        let fx = fixture();
        let service = FakeService::replying(200, serde_json::json!({}));
        let calls = service.calls.clone();
        let (_tx, rx) = watch::channel(BackendStatus::Failed {
            reason: "No such file or directory".to_string(),
        });
        let dispatcher = ConversionDispatcher::new(
            service,
            Arc::new(ReadinessGate::new(0)),
            rx,
            Arc::new(BusyIndicator::new()),
        );

        let result = dispatcher.request_conversion(ConversionMode::RuleBased, &fx.session);

        assert_eq!(result.failure_kind(), Some(FailureKind::BackendUnavailable));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unreadable_source_is_io_error() {
        let fx = fixture();
        let session = ConversionSession::new(
            Some(fx.output.join("missing.cpp")),
            fx.session.output_folder.clone(),
        );
        let service = FakeService::replying(200, serde_json::json!({}));
        let calls = service.calls.clone();

        let result = dispatcher(service, Arc::new(BusyIndicator::new()))
            .request_conversion(ConversionMode::RuleBased, &session);

        assert_eq!(result.failure_kind(), Some(FailureKind::Io));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rejection_message_is_verbatim() {
        let fx = fixture();
        let stub = StubBackend::respond(500, r#"{"error":"X"}"#);
        let service = HttpConversionService::new(&stub.url(), Duration::from_secs(5)).unwrap();

        let result = dispatcher(service, Arc::new(BusyIndicator::new()))
            .request_conversion(ConversionMode::RuleBased, &fx.session);
        stub.finish();

        assert_eq!(
            result,
            ConversionResult::Failure {
                kind: FailureKind::Rejected,
                message: "X".to_string()
            }
        );
    }

    #[test]
    fn test_unreachable_is_distinct_from_rejection() {
        let fx = fixture();
        let service = HttpConversionService::new(&refused_url(), Duration::from_secs(2)).unwrap();

        let result = dispatcher(service, Arc::new(BusyIndicator::new()))
            .request_conversion(ConversionMode::RuleBased, &fx.session);

        assert_eq!(result.failure_kind(), Some(FailureKind::BackendUnreachable));
        assert_ne!(result.failure_kind(), Some(FailureKind::Rejected));
        match result {
            ConversionResult::Failure { message, .. } => {
                assert!(message.starts_with("Failed to connect to backend"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_ai_indicator_active_during_request_and_cleared_after() {
        let fx = fixture();
        let cases = [
            FakeService::replying(200, serde_json::json!({ "message": "ok" })),
            FakeService::replying(500, serde_json::json!({ "error": "model crashed" })),
            FakeService::unreachable(),
        ];

        for service in cases {
            let busy = Arc::new(BusyIndicator::new());
            let service = service.watching(busy.clone());
            let seen = service.busy_during_call.clone();

            dispatcher(service, busy.clone())
                .request_conversion(ConversionMode::AiAssisted, &fx.session);

            assert_eq!(*seen.lock().unwrap(), vec![true]);
            assert!(!busy.is_active());
        }
    }

    #[test]
    fn test_rule_based_does_not_raise_indicator() {
        let fx = fixture();
        let busy = Arc::new(BusyIndicator::new());
        let service = FakeService::replying(200, serde_json::json!({})).watching(busy.clone());
        let seen = service.busy_during_call.clone();

        dispatcher(service, busy).request_conversion(ConversionMode::RuleBased, &fx.session);

        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }
}
