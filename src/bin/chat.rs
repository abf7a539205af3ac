//! Terminal chat client for a running BrandFlow relay.
//!
//! Commands: a plain line is sent as a message; `/templates` lists quick prompts,
//! `/use <n>` loads one into the draft, `/send` submits the draft, `/demo` runs the
//! workflow demo and `/quit` exits.

use std::process::ExitCode;
use std::sync::Mutex;

use tokio::io::{AsyncBufReadExt, BufReader};

use brandflow::chat::{
    ChatController, ChatSession, FLOW_DEMO_PROMPT, HttpRelayClient, QUICK_PROMPTS,
    SessionSnapshot, SessionView, SubmitRejection, TurnStatus,
};
use brandflow::config::ClientConfig;
use brandflow::start_brandflow::init_tracing;

#[derive(Default)]
struct Printed {
    messages: usize,
    loading: bool,
    error: Option<String>,
}

/// Prints whatever changed since the previous render.
#[derive(Default)]
struct TerminalView {
    printed: Mutex<Printed>,
}

impl SessionView for TerminalView {
    fn render(&self, snapshot: &SessionSnapshot) {
        let mut printed = match self.printed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for message in snapshot.messages.iter().skip(printed.messages) {
            println!("\n[{}]\n{}", message.role().display_label(), message.content());
        }
        printed.messages = snapshot.messages.len();

        if snapshot.loading && !printed.loading {
            println!("\n... BrandFlow يكتب الآن");
        }
        printed.loading = snapshot.loading;

        if snapshot.error != printed.error {
            if let Some(error) = &snapshot.error {
                eprintln!("\n! {error}");
            }
            printed.error.clone_from(&snapshot.error);
        }
    }
}

type Controller = ChatController<HttpRelayClient, TerminalView>;

fn main() -> ExitCode {
    init_tracing();

    let config = match ClientConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    let client = match HttpRelayClient::new(&config.relay_url, config.timeout) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create relay client: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!("Relay endpoint: {}", client.endpoint());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let controller = ChatController::with_view(ChatSession::new(), client, TerminalView::default());
    if let Err(e) = rt.block_on(repl(&controller)) {
        tracing::error!("Input error: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn repl(controller: &Controller) -> std::io::Result<()> {
    println!("BrandFlow: اكتب رسالتك، أو /templates، /use <n>، /send، /demo، /quit");
    println!("المسودة الحالية: {}", controller.snapshot().draft);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        let outcome = match command
            .split_once(' ')
            .map_or((command, ""), |(c, a)| (c, a.trim()))
        {
            ("/quit", _) => break,
            ("/templates", _) => {
                list_templates();
                continue;
            }
            ("/use", arg) => {
                use_template(controller, arg);
                continue;
            }
            ("/send", _) if !controller.can_submit() => {
                println!("لا يمكن الإرسال الآن: المسودة فارغة أو هناك رد قيد الانتظار.");
                continue;
            }
            ("/send", _) => controller.submit_draft().await,
            ("/demo", _) => controller.run_demo(FLOW_DEMO_PROMPT).await,
            _ => controller.submit(&line).await,
        };
        report(outcome);
    }
    Ok(())
}

fn list_templates() {
    for (i, template) in QUICK_PROMPTS.iter().enumerate() {
        println!("{}. {}: {}", i + 1, template.title, template.description);
    }
}

fn use_template(controller: &Controller, arg: &str) {
    let template = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| QUICK_PROMPTS.get(i));
    match template {
        Some(template) if controller.select_template(template) => {
            println!("المسودة: {}", controller.snapshot().draft);
        }
        Some(_) => println!("انتظر حتى يكتمل الرد الحالي."),
        None => println!("استخدم /use <1-{}>", QUICK_PROMPTS.len()),
    }
}

fn report(outcome: Result<TurnStatus, SubmitRejection>) {
    match outcome {
        Ok(TurnStatus::Fulfilled) => {}
        Ok(TurnStatus::Failed) => tracing::debug!("turn failed; fallback shown"),
        Err(SubmitRejection::EmptyDraft) => println!("لا يوجد نص لإرساله."),
        Err(rejection) => println!("{rejection}"),
    }
}
