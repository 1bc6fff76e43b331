//! End-to-end integration tests for DocChat.
//!
//! These tests exercise the full pipeline from configuration and upload
//! through extraction, truncation, context assembly, and the completion
//! gateway, using the same wiring the CLI and server use.

use std::sync::Arc;

use docchat_config::AppConfig;
use docchat_core::document::SourceKind;
use docchat_core::error::{GatewayError, SessionError};
use docchat_core::gateway::{AssembledRequest, Completion, CompletionGateway};
use docchat_core::message::Role;
use docchat_extract::KindExtractor;
use docchat_session::{ContextAssembler, NoticeKind, Session, SessionController, SessionRegistry};

// ── Mock Gateway ─────────────────────────────────────────────────────────

/// A mock gateway that returns scripted outcomes in sequence and records
/// the requests it was given.
struct ScriptedGateway {
    outcomes: std::sync::Mutex<Vec<Result<Completion, GatewayError>>>,
    requests: std::sync::Mutex<Vec<AssembledRequest>>,
}

impl ScriptedGateway {
    fn new(outcomes: Vec<Result<Completion, GatewayError>>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn text(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(Completion::text(*r))).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, n: usize) -> AssembledRequest {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl CompletionGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: &AssembledRequest) -> Result<Completion, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        let outcomes = self.outcomes.lock().unwrap();
        let call = requests.len();
        if call >= outcomes.len() {
            panic!(
                "ScriptedGateway exhausted: call #{}, have {}",
                call,
                outcomes.len()
            );
        }
        requests.push(request.clone());
        outcomes[call].clone()
    }
}

fn controller(config: &AppConfig, gateway: Arc<ScriptedGateway>) -> SessionController {
    SessionController::new(
        ContextAssembler::from_config(&config.session),
        gateway,
        Arc::new(KindExtractor::new()),
    )
}

// ── E2E: Conversation ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_first_turn_without_document() {
    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::text(&["Hello!"]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    assert_eq!(controller.preview(&session).len(), 1);

    let reply = controller
        .handle_user_input(&mut session, "Hi")
        .await
        .expect("turn should succeed");

    assert_eq!(reply.content, "Hello!");
    let turns: Vec<(Role, &str)> = session
        .log()
        .snapshot()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(turns, vec![(Role::User, "Hi"), (Role::Assistant, "Hello!")]);

    let sent = gateway.request(0);
    assert_eq!(sent.messages[0].role, Role::System);
    assert_eq!(sent.messages[0].content, "You are a helpful assistant.");
    assert_eq!(sent.len(), 2);
}

#[tokio::test]
async fn e2e_long_document_is_truncated_in_context() {
    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::text(&["Summarised."]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    let body: String = "abcdefghij".repeat(600);
    controller
        .handle_document_upload(&mut session, body.as_bytes(), SourceKind::PlainText, Some("long.txt"))
        .await
        .unwrap();
    controller
        .handle_user_input(&mut session, "Summarise it")
        .await
        .unwrap();

    let sent = gateway.request(0);
    let expected = format!("Reference Document (truncated): {}", &body[..5000]);
    assert_eq!(sent.messages[1].content, expected);
    assert_eq!(sent.messages[2].content, "Summarise it");
}

#[tokio::test]
async fn e2e_configured_budget_and_prompt() {
    let toml_str = r#"
        [session]
        max_document_length = 12
        system_prompt = "Only answer from the document."
        document_template = "DOC: {document}"
    "#;
    let config: AppConfig = toml::from_str(toml_str).unwrap();
    config.validate().unwrap();

    let gateway = Arc::new(ScriptedGateway::text(&["ok"]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    controller
        .handle_document_upload(&mut session, b"The quick brown fox", SourceKind::PlainText, None)
        .await
        .unwrap();
    controller.handle_user_input(&mut session, "?").await.unwrap();

    let sent = gateway.request(0);
    assert_eq!(sent.messages[0].content, "Only answer from the document.");
    assert_eq!(sent.messages[1].content, "DOC: The quick br");
}

#[tokio::test]
async fn e2e_gateway_failure_then_recovery() {
    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::new(vec![
        Err(GatewayError::RateLimited { retry_after_secs: 5 }),
        Ok(Completion::text("Sorry for the wait.")),
    ]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    let snapshot = controller.on_submit(&mut session, "Are you there?").await;
    assert_eq!(snapshot.error_kind(), Some(NoticeKind::CompletionFailed));
    assert_eq!(snapshot.turns.len(), 1);

    let snapshot = controller.on_submit(&mut session, "Hello?").await;
    assert!(snapshot.error.is_none());
    let roles: Vec<Role> = snapshot.turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn e2e_empty_input_never_reaches_gateway() {
    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::text(&[]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    let err = controller.handle_user_input(&mut session, "").await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyInput));
    assert!(session.log().is_empty());
    assert_eq!(gateway.calls(), 0);
}

// ── E2E: Documents ───────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_text_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agenda.txt");
    std::fs::write(&path, "1. Budget\n2. Hiring\n").unwrap();

    let kind = SourceKind::from_path(&path).unwrap();
    assert_eq!(kind, SourceKind::PlainText);

    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::text(&["Two items."]));
    let controller = controller(&config, gateway.clone());
    let mut session = Session::new(config.session.max_document_length);

    let bytes = std::fs::read(&path).unwrap();
    controller
        .handle_document_upload(&mut session, &bytes, kind, Some("agenda.txt"))
        .await
        .unwrap();
    controller
        .handle_user_input(&mut session, "How many items?")
        .await
        .unwrap();

    assert!(gateway.request(0).messages[1].content.ends_with("1. Budget\n2. Hiring\n"));
}

#[tokio::test]
async fn e2e_corrupt_pdf_keeps_previous_document() {
    let config = AppConfig::default();
    let controller = controller(&config, Arc::new(ScriptedGateway::text(&[])));
    let mut session = Session::new(config.session.max_document_length);

    controller
        .handle_document_upload(&mut session, b"Earlier notes", SourceKind::PlainText, None)
        .await
        .unwrap();
    let snapshot = controller
        .on_upload(&mut session, b"%PDF-1.7 truncated garbage", SourceKind::Pdf, Some("bad.pdf"))
        .await;

    assert_eq!(snapshot.error_kind(), Some(NoticeKind::ExtractionFailed));
    assert_eq!(session.document().current(), Some("Earlier notes"));
}

#[tokio::test]
async fn e2e_invalid_utf8_text_is_rejected() {
    let config = AppConfig::default();
    let controller = controller(&config, Arc::new(ScriptedGateway::text(&[])));
    let mut session = Session::new(config.session.max_document_length);

    let err = controller
        .handle_document_upload(&mut session, &[0xC3, 0x28], SourceKind::PlainText, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::ExtractionFailed(_)));
    assert!(session.document().document().is_none());
}

#[test]
fn e2e_unsupported_kinds_are_rejected() {
    assert!(matches!(
        SourceKind::from_mime("image/png"),
        Err(SessionError::UnsupportedSourceKind(_))
    ));
    assert!(matches!(
        SourceKind::from_path(std::path::Path::new("deck.pptx")),
        Err(SessionError::UnsupportedSourceKind(_))
    ));
}

// ── E2E: Sessions ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_registry_sessions_are_isolated() {
    let config = AppConfig::default();
    let gateway = Arc::new(ScriptedGateway::text(&["A", "B"]));
    let controller = controller(&config, gateway.clone());
    let registry = SessionRegistry::from_config(&config.session);

    let (first_id, first) = registry.create().await;
    let (_, second) = registry.create().await;

    {
        let mut session = first.lock().await;
        controller
            .handle_document_upload(&mut session, b"Private to first", SourceKind::PlainText, None)
            .await
            .unwrap();
        controller.handle_user_input(&mut session, "one").await.unwrap();
    }
    {
        let mut session = second.lock().await;
        controller.handle_user_input(&mut session, "two").await.unwrap();
    }

    // The second session's request never saw the first session's document.
    let second_request = gateway.request(1);
    assert_eq!(second_request.len(), 2);
    assert_eq!(second_request.messages[1].content, "two");

    registry.remove(&first_id).await.unwrap();
    assert_eq!(registry.len().await, 1);
    assert!(registry.get(&first_id).await.is_err());
}
