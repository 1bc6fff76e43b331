//! `docchat chat` — Interactive or single-message chat about a document.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docchat_config::AppConfig;
use docchat_core::document::SourceKind;
use docchat_core::gateway::AssembledRequest;
use docchat_core::message::Role;
use docchat_extract::KindExtractor;
use docchat_session::{ContextAssembler, Session, SessionController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Message(String),
    Upload(PathBuf),
    Forget,
    History,
    Context,
    Help,
    Exit,
    Invalid(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            return Self::Exit;
        }

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (command, arg) = match rest.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (rest, ""),
        };

        match command {
            "upload" if arg.is_empty() => Self::Invalid("Usage: /upload PATH".into()),
            "upload" => Self::Upload(PathBuf::from(arg)),
            "forget" => Self::Forget,
            "history" => Self::History,
            "context" => Self::Context,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => Self::Invalid(format!("Unknown command: /{other} (try /help)")),
        }
    }
}

pub async fn run(
    document: Option<PathBuf>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup instructions when no key is configured
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY=gsk_...        (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...       (with DOCCHAT_PROVIDER=openai)");
        eprintln!("    DOCCHAT_API_KEY=...         (generic, highest priority)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = docchat_providers::build_from_config(&config);
    let gateway = router.default().ok_or("No default provider configured")?;
    let controller = SessionController::new(
        ContextAssembler::from_config(&config.session),
        gateway,
        Arc::new(KindExtractor::new()),
    );
    let mut session = Session::new(config.session.max_document_length);
    let max_upload = config.session.max_upload_bytes;

    if let Some(path) = &document {
        upload_file(&controller, &mut session, path, max_upload).await?;
    }

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = controller.handle_user_input(&mut session, &msg).await;
        eprint!("\r              \r");
        println!("{}", result?.content);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  DocChat: Interactive Mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Document:  {}", describe_document(&session));
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!("  Type /exit or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Invalid(reason) => eprintln!("  {reason}"),
            ReplCommand::Upload(path) => {
                match upload_file(&controller, &mut session, &path, max_upload).await {
                    Ok(()) => println!("  Document:  {}", describe_document(&session)),
                    Err(e) => eprintln!("  [Error] {e}"),
                }
            }
            ReplCommand::Forget => {
                controller.clear_document(&mut session);
                println!("  Document forgotten. The conversation continues without it.");
            }
            ReplCommand::History => print_history(&session),
            ReplCommand::Context => print_context(&controller.preview(&session)),
            ReplCommand::Message(text) => {
                eprint!("  ...");
                let result = controller.handle_user_input(&mut session, &text).await;
                eprint!("\r     \r");
                match result {
                    Ok(reply) => {
                        println!();
                        for line in reply.content.lines() {
                            println!("  Assistant > {line}");
                        }
                    }
                    Err(e) => eprintln!("  [Error] {e}"),
                }
                println!();
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// Read a document from disk and make it the session's reference document.
async fn upload_file(
    controller: &SessionController,
    session: &mut Session,
    path: &Path,
    max_bytes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = SourceKind::from_path(path)?;

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| format!("Cannot read {}: {e}", path.display()))?
        .len();
    if size > max_bytes as u64 {
        return Err(format!(
            "{} is {size} bytes; the upload limit is {max_bytes} bytes",
            path.display()
        )
        .into());
    }

    let bytes = tokio::fs::read(path).await?;
    let filename = path.file_name().and_then(|n| n.to_str());
    debug!(path = %path.display(), kind = %kind, bytes = bytes.len(), "Uploading document");

    controller
        .handle_document_upload(session, &bytes, kind, filename)
        .await?;
    Ok(())
}

fn describe_document(session: &Session) -> String {
    match session.document().document() {
        None => "none (use /upload PATH)".into(),
        Some(doc) => {
            let name = doc.filename().unwrap_or("(unnamed)");
            if doc.is_truncated() {
                format!(
                    "{name} ({} chars, first {} used)",
                    doc.raw_chars(),
                    doc.truncated_chars()
                )
            } else {
                format!("{name} ({} chars)", doc.raw_chars())
            }
        }
    }
}

fn print_help() {
    println!("  /upload PATH   Load a .pdf or .txt file as the reference document");
    println!("  /forget        Drop the current document");
    println!("  /history       Show the conversation so far");
    println!("  /context       Show the request the next message would send");
    println!("  /exit          Quit");
}

fn print_history(session: &Session) {
    if session.log().is_empty() {
        println!("  (no messages yet)");
        return;
    }
    for turn in session.log().snapshot() {
        let label = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        println!("  [{}] {label} > {}", turn.timestamp.format("%H:%M:%S"), turn.content);
    }
}

fn print_context(request: &AssembledRequest) {
    println!(
        "  {} messages, {} chars",
        request.len(),
        request.total_chars()
    );
    for (i, message) in request.messages.iter().enumerate() {
        let preview: String = message.content.chars().take(80).collect();
        let ellipsis = if message.content.chars().count() > 80 { "..." } else { "" };
        println!("  {i:>3} {:<9} {preview}{ellipsis}", message.role.as_str());
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::error::GatewayError;
    use docchat_core::gateway::{Completion, CompletionGateway};

    struct UnusedGateway;

    #[async_trait::async_trait]
    impl CompletionGateway for UnusedGateway {
        fn name(&self) -> &str {
            "unused"
        }

        async fn complete(&self, _request: &AssembledRequest) -> Result<Completion, GatewayError> {
            Err(GatewayError::NotConfigured("not used in these tests".into()))
        }
    }

    fn controller() -> SessionController {
        SessionController::new(
            ContextAssembler::default(),
            Arc::new(UnusedGateway),
            Arc::new(KindExtractor::new()),
        )
    }

    #[test]
    fn parses_messages_and_commands() {
        assert_eq!(ReplCommand::parse("hello"), ReplCommand::Message("hello".into()));
        assert_eq!(
            ReplCommand::parse("/upload  notes.txt "),
            ReplCommand::Upload(PathBuf::from("notes.txt"))
        );
        assert_eq!(ReplCommand::parse("/forget"), ReplCommand::Forget);
        assert_eq!(ReplCommand::parse("/history"), ReplCommand::History);
        assert_eq!(ReplCommand::parse("/context"), ReplCommand::Context);
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Exit);
        assert_eq!(ReplCommand::parse("quit"), ReplCommand::Exit);
    }

    #[test]
    fn blank_line_is_passed_through_as_message() {
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Message("   ".into()));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(matches!(ReplCommand::parse("/upload"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/frobnicate"), ReplCommand::Invalid(_)));
    }

    #[tokio::test]
    async fn upload_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Meeting moved to Friday.").unwrap();

        let mut session = Session::default();
        upload_file(&controller(), &mut session, &path, 1024).await.unwrap();

        assert_eq!(session.document().current(), Some("Meeting moved to Friday."));
        assert_eq!(describe_document(&session), "notes.txt (24 chars)");
    }

    #[tokio::test]
    async fn upload_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, "binary").unwrap();

        let mut session = Session::default();
        let err = upload_file(&controller(), &mut session, &path, 1024)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported document type"));
        assert!(session.document().document().is_none());
    }

    #[tokio::test]
    async fn upload_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "x".repeat(100)).unwrap();

        let mut session = Session::default();
        let err = upload_file(&controller(), &mut session, &path, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upload limit"));
    }
}
