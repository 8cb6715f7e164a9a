//! Stdin-driven address field.
//!
//! Each line is one user action:
//!
//! ```text
//! :tap            tap the label (start editing)
//! :submit         return key
//! :blur           focus lost
//! :paste TEXT     paste button
//! :scan TEXT      scan button (decoded QR payload)
//! :accept         accept the resolved-address suggestion
//! :reject         drop the suggestion
//! :quit           stop reading input
//! anything else   the full text of the field after a keystroke
//! ```

use std::borrow::Cow;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use recipient_core::{
    truncate_address, AddressField, ChangeOutcome, FieldEvent, OutputMode, RecipientConfig,
    RecipientError, ResolutionCoordinator, ResolutionOutcome, ResolutionReply,
};

enum Action<'a> {
    Tap,
    Submit,
    Blur,
    Paste(&'a str),
    Scan(&'a str),
    Accept,
    Reject,
    Quit,
    Type(&'a str),
}

fn parse_action(line: &str) -> Action<'_> {
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    let argument = argument.trim_start();
    match command {
        ":tap" => Action::Tap,
        ":submit" => Action::Submit,
        ":blur" => Action::Blur,
        ":paste" => Action::Paste(argument),
        ":scan" => Action::Scan(argument),
        ":accept" => Action::Accept,
        ":reject" => Action::Reject,
        ":quit" => Action::Quit,
        _ => Action::Type(line),
    }
}

struct Session {
    mode: OutputMode,
    auto_accept: bool,
    field: AddressField,
    events: UnboundedReceiver<FieldEvent>,
    coordinator: ResolutionCoordinator,
    /// Generation of the lookup we are still waiting on.
    pending: Option<u64>,
}

impl Session {
    fn emit(&self, value: serde_json::Value) -> Result<()> {
        let json = serde_json::to_string(&value).context("failed to serialize session output")?;
        println!("{json}");
        Ok(())
    }

    fn report_state(&self) -> Result<()> {
        match self.mode {
            OutputMode::Human => {
                println!(
                    "{} {}",
                    format!("[{:?}]", self.field.mode()).bright_black(),
                    truncate_address(self.field.text())
                );
                Ok(())
            }
            OutputMode::Agent => self.emit(json!({
                "type": "state",
                "mode": self.field.mode(),
                "text": self.field.text(),
                "generation": self.field.generation(),
            })),
        }
    }

    fn drain_events(&mut self) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match self.mode {
                OutputMode::Human => match &event {
                    FieldEvent::EditingStarted => println!("{}", "editing started".cyan()),
                    FieldEvent::PaymentRequestRecognized(request) => println!(
                        "{} {}",
                        "payment request:".green().bold(),
                        request.to_uri().green()
                    ),
                },
                OutputMode::Agent => self.emit(json!({ "type": "event", "event": event }))?,
            }
        }
        Ok(())
    }

    fn handle_change(&mut self, outcome: ChangeOutcome) {
        if let ChangeOutcome::ResolveDomain(ticket) = outcome {
            self.pending = Some(ticket.generation);
            self.coordinator.submit(ticket);
        }
    }

    fn accept(&mut self) {
        if self.field.accept_suggestion().is_none() && self.mode == OutputMode::Human {
            println!("{}", "nothing to accept".yellow());
        }
    }

    /// Returns false when the session should stop.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        match parse_action(line) {
            Action::Tap => {
                self.field.begin_editing();
            }
            Action::Submit => {
                self.field.submit();
            }
            Action::Blur => {
                self.field.focus_lost();
            }
            Action::Paste(text) => {
                let outcome = self.field.paste(text);
                self.handle_change(outcome);
            }
            Action::Scan(payload) => {
                let outcome = self.field.scan(payload);
                self.handle_change(outcome);
            }
            Action::Accept => self.accept(),
            Action::Reject => {
                self.field.reject_suggestion();
            }
            Action::Quit => return Ok(false),
            Action::Type(text) => {
                let outcome = self.field.change_text(text);
                self.handle_change(outcome);
            }
        }

        self.drain_events()?;
        self.report_state()?;
        Ok(true)
    }

    fn handle_reply(&mut self, reply: ResolutionReply) -> Result<()> {
        if self.pending == Some(reply.ticket.generation) {
            self.pending = None;
        }

        let domain = reply.ticket.domain.clone();
        let hint = if self.auto_accept { "" } else { "(:accept to use)" };
        let outcome = self.field.apply_resolution(&reply.ticket, reply.result);

        match self.mode {
            OutputMode::Human => match &outcome {
                ResolutionOutcome::Stale => {}
                ResolutionOutcome::Failed(err) => {
                    println!("{} {}", "could not resolve:".yellow(), err.to_string().yellow())
                }
                ResolutionOutcome::Suggested(address) => println!(
                    "{} {} → {} {}",
                    "resolved".green(),
                    domain.as_str().bold(),
                    address.green(),
                    hint.bright_black()
                ),
            },
            OutputMode::Agent => {
                let (status, detail) = match &outcome {
                    ResolutionOutcome::Stale => ("stale", json!(null)),
                    ResolutionOutcome::Failed(err) => (
                        "failed",
                        json!({ "error": err.code(), "message": err.to_string() }),
                    ),
                    ResolutionOutcome::Suggested(address) => ("suggested", json!(address)),
                };
                self.emit(json!({
                    "type": "resolution",
                    "domain": domain,
                    "generation": reply.ticket.generation,
                    "status": status,
                    "detail": detail,
                }))?;
            }
        }

        if self.auto_accept && matches!(outcome, ResolutionOutcome::Suggested(_)) {
            self.accept();
        }

        self.drain_events()?;
        if !matches!(outcome, ResolutionOutcome::Stale) {
            self.report_state()?;
        }
        Ok(())
    }
}

/// One input line as text. Invalid UTF-8 is replaced rather than ending the session.
fn decode_line(raw: &[u8]) -> String {
    let line = String::from_utf8_lossy(raw);
    if matches!(line, Cow::Owned(_)) {
        warn!(bytes = raw.len(), "input line is not valid UTF-8; invalid bytes replaced");
    }
    line.trim_end_matches(['\r', '\n']).to_string()
}

pub async fn run(mode: OutputMode, config: &RecipientConfig, auto_accept: bool) -> Result<i32> {
    let resolver = config.build_resolver().map_err(RecipientError::from)?;
    let (field, events) = AddressField::new(config.classifier(), config.ticker.clone());
    let (coordinator, mut replies) =
        ResolutionCoordinator::new(resolver, config.resolver_timeout());

    let mut session = Session {
        mode,
        auto_accept,
        field,
        events,
        coordinator,
        pending: None,
    };

    if mode == OutputMode::Human {
        crate::render::human_header("RECIPIENT — Address Field");
        println!(
            "{}",
            "Type recipient text, or :tap :submit :blur :paste :scan :accept :reject :quit"
                .bright_black()
        );
    }

    let mut stdin = BufReader::new(tokio::io::stdin());
    // Bytes of a read cancelled by `select!` stay here until the line completes.
    let mut raw = Vec::new();
    loop {
        tokio::select! {
            read = stdin.read_until(b'\n', &mut raw) => {
                let read = read.map_err(RecipientError::from)?;
                if read == 0 && raw.is_empty() {
                    break;
                }
                let line = decode_line(&raw);
                raw.clear();
                if !session.handle_line(&line)? {
                    break;
                }
            }
            Some(reply) = replies.recv() => session.handle_reply(reply)?,
        }
    }

    // Input is closed; let the latest lookup land so its outcome is reported.
    debug!(pending = ?session.pending, "input closed");
    while session.pending.is_some() {
        match replies.recv().await {
            Some(reply) => session.handle_reply(reply)?,
            None => break,
        }
    }

    Ok(0)
}
