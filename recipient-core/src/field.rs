//! Headless model of the send screen's address field.
//!
//! The field is either showing a finalized recipient (`Display`) or accepting
//! keystrokes (`Editing`). Both views read the same `text`, so they cannot drift.
//! Every change bumps a generation counter; domain lookups are tagged with the
//! generation they were issued for and results for older generations are dropped.
//!
//! Callers observe exactly two signals on the event channel: editing started, and
//! a payment request was recognized.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::classifier::{Classification, Classifier};
use crate::domain::DomainName;
use crate::resolver::ResolutionError;
use crate::types::{PaymentRequest, Ticker};
use crate::validation::is_valid_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    Display,
    Editing,
}

/// Outward signals of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "request")]
pub enum FieldEvent {
    EditingStarted,
    PaymentRequestRecognized(PaymentRequest),
}

/// A domain lookup issued for one generation of the field's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionTicket {
    pub generation: u64,
    pub domain: DomainName,
    pub ticker: Ticker,
}

/// A resolved address waiting for the caller to accept or reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub generation: u64,
    pub domain: DomainName,
    pub address: String,
}

/// Result of offering new text to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Keystrokes arrived while the field was not editing; nothing changed.
    NotEditing,
    /// The text parsed as a payment request; it was handed off and editing stopped.
    HandedOff,
    /// The text was applied and looks like a domain; resolve it with this ticket.
    ResolveDomain(ResolutionTicket),
    /// The text was applied as literal input.
    Continue,
}

/// What applying a resolution result did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The text changed since the lookup was issued; result ignored.
    Stale,
    /// Lookup failed; the typed text is untouched.
    Failed(ResolutionError),
    /// Lookup succeeded; the address is held as a suggestion.
    Suggested(String),
}

#[derive(Debug)]
pub struct AddressField {
    classifier: Classifier,
    ticker: Ticker,
    mode: FieldMode,
    editable: bool,
    text: String,
    generation: u64,
    suggestion: Option<Suggestion>,
    events: UnboundedSender<FieldEvent>,
}

impl AddressField {
    /// New editable field in `Display` mode with empty text, plus its event receiver.
    pub fn new(classifier: Classifier, ticker: Ticker) -> (Self, UnboundedReceiver<FieldEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let field = Self {
            classifier,
            ticker,
            mode: FieldMode::Display,
            editable: true,
            text: String::new(),
            generation: 0,
            suggestion: None,
            events,
        };
        (field, receiver)
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The displayed recipient, if any.
    pub fn address(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Replace the underlying value programmatically (e.g. after a hand-off).
    pub fn set_content(&mut self, content: Option<&str>) {
        self.replace_text(content.unwrap_or_default());
    }

    /// Tap on the display label. Returns whether editing started.
    pub fn begin_editing(&mut self) -> bool {
        if !self.editable || self.mode == FieldMode::Editing {
            return false;
        }
        self.mode = FieldMode::Editing;
        self.emit(FieldEvent::EditingStarted);
        true
    }

    /// Return key. Returns whether the field left editing.
    pub fn submit(&mut self) -> bool {
        self.end_editing()
    }

    /// Loss of focus. Returns whether the field left editing.
    pub fn focus_lost(&mut self) -> bool {
        self.end_editing()
    }

    /// Full text after a keystroke; only honoured while editing.
    pub fn change_text(&mut self, text: &str) -> ChangeOutcome {
        if self.mode != FieldMode::Editing {
            return ChangeOutcome::NotEditing;
        }
        self.offer(text)
    }

    /// Paste button: replaces the whole text in either mode.
    pub fn paste(&mut self, text: &str) -> ChangeOutcome {
        self.offer(text)
    }

    /// Scan button: a decoded QR payload, treated like a paste.
    pub fn scan(&mut self, payload: &str) -> ChangeOutcome {
        self.offer(payload)
    }

    /// Apply a lookup result. Only the current generation's result is ever used.
    pub fn apply_resolution(
        &mut self,
        ticket: &ResolutionTicket,
        result: Result<String, ResolutionError>,
    ) -> ResolutionOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                domain = %ticket.domain,
                "dropping stale resolution"
            );
            return ResolutionOutcome::Stale;
        }

        let address = match result {
            Ok(address) => address,
            Err(err) => {
                warn!(domain = %ticket.domain, error = %err, "domain resolution failed");
                return ResolutionOutcome::Failed(err);
            }
        };

        if !is_valid_address(&address, self.classifier.network()) {
            let err = ResolutionError::InvalidResponse(format!(
                "'{address}' is not a valid {} address",
                self.classifier.network()
            ));
            warn!(domain = %ticket.domain, error = %err, "domain resolved to unusable value");
            return ResolutionOutcome::Failed(err);
        }

        info!(domain = %ticket.domain, "domain resolved; awaiting confirmation");
        self.suggestion = Some(Suggestion {
            generation: ticket.generation,
            domain: ticket.domain.clone(),
            address: address.clone(),
        });
        ResolutionOutcome::Suggested(address)
    }

    /// Write the suggested address into the field and re-classify it.
    pub fn accept_suggestion(&mut self) -> Option<PaymentRequest> {
        let suggestion = self.suggestion.take()?;
        if suggestion.generation != self.generation {
            return None;
        }

        self.replace_text(&suggestion.address);
        match self.classifier.classify(&self.text) {
            Classification::PaymentRequest(request) => {
                self.mode = FieldMode::Display;
                self.emit(FieldEvent::PaymentRequestRecognized(request.clone()));
                Some(request)
            }
            Classification::Domain(_) | Classification::Literal => None,
        }
    }

    pub fn reject_suggestion(&mut self) -> Option<Suggestion> {
        self.suggestion.take()
    }

    fn offer(&mut self, candidate: &str) -> ChangeOutcome {
        match self.classifier.classify(candidate) {
            Classification::PaymentRequest(request) => {
                // The change itself is not applied; the receiver decides what to show.
                self.bump();
                self.mode = FieldMode::Display;
                self.emit(FieldEvent::PaymentRequestRecognized(request));
                ChangeOutcome::HandedOff
            }
            Classification::Domain(domain) => {
                self.replace_text(candidate);
                ChangeOutcome::ResolveDomain(ResolutionTicket {
                    generation: self.generation,
                    domain,
                    ticker: self.ticker.clone(),
                })
            }
            Classification::Literal => {
                self.replace_text(candidate);
                ChangeOutcome::Continue
            }
        }
    }

    fn replace_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.bump();
    }

    fn bump(&mut self) {
        self.generation += 1;
        self.suggestion = None;
    }

    fn end_editing(&mut self) -> bool {
        if self.mode != FieldMode::Editing {
            return false;
        }
        self.mode = FieldMode::Display;
        true
    }

    fn emit(&self, event: FieldEvent) {
        if self.events.send(event).is_err() {
            debug!("field event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainSuffixSet;
    use crate::types::Network;

    const URI: &str = "litecoin:LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q?amount=0.5";
    const RESOLVED: &str = "ltc1qg82tmtnh9zf3fg0qzzyl4hfxaj7rytxmncuwmd";

    fn field() -> (AddressField, UnboundedReceiver<FieldEvent>) {
        AddressField::new(
            Classifier::new(Network::Mainnet, DomainSuffixSet::default()),
            Ticker::default(),
        )
    }

    fn editing_field() -> (AddressField, UnboundedReceiver<FieldEvent>) {
        let (mut field, mut events) = field();
        assert!(field.begin_editing());
        assert_eq!(events.try_recv().unwrap(), FieldEvent::EditingStarted);
        (field, events)
    }

    fn ticket_for(outcome: ChangeOutcome) -> ResolutionTicket {
        match outcome {
            ChangeOutcome::ResolveDomain(ticket) => ticket,
            other => panic!("expected a resolution ticket, got {other:?}"),
        }
    }

    #[test]
    fn tap_starts_editing_once() {
        let (mut field, mut events) = field();
        assert_eq!(field.mode(), FieldMode::Display);
        assert!(field.begin_editing());
        assert!(!field.begin_editing());
        assert_eq!(field.mode(), FieldMode::Editing);
        assert_eq!(events.try_recv().unwrap(), FieldEvent::EditingStarted);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn tap_is_ignored_when_not_editable() {
        let (mut field, mut events) = field();
        field.set_editable(false);
        assert!(!field.begin_editing());
        assert_eq!(field.mode(), FieldMode::Display);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn submit_and_focus_loss_return_to_display() {
        let (mut field, _events) = editing_field();
        field.change_text("hello");
        assert!(field.submit());
        assert_eq!(field.mode(), FieldMode::Display);
        assert_eq!(field.text(), "hello");
        assert!(!field.submit());

        field.begin_editing();
        assert!(field.focus_lost());
        assert_eq!(field.mode(), FieldMode::Display);
    }

    #[test]
    fn keystrokes_outside_editing_are_ignored() {
        let (mut field, _events) = field();
        assert_eq!(field.change_text("hello"), ChangeOutcome::NotEditing);
        assert_eq!(field.text(), "");
        assert_eq!(field.generation(), 0);
    }

    #[test]
    fn literal_text_keeps_editing() {
        let (mut field, mut events) = editing_field();
        assert_eq!(field.change_text("hello"), ChangeOutcome::Continue);
        assert_eq!(field.text(), "hello");
        assert_eq!(field.address(), Some("hello"));
        assert_eq!(field.mode(), FieldMode::Editing);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn payment_uri_hands_off_and_stops_editing() {
        let (mut field, mut events) = editing_field();
        field.change_text("Lcv");
        assert_eq!(field.change_text(URI), ChangeOutcome::HandedOff);
        assert_eq!(field.mode(), FieldMode::Display);
        assert_eq!(field.text(), "Lcv");

        match events.try_recv().unwrap() {
            FieldEvent::PaymentRequestRecognized(request) => {
                assert_eq!(request.address, "LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q");
                assert_eq!(request.amount_litoshi, Some(50_000_000));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn paste_works_from_display() {
        let (mut field, mut events) = field();
        assert_eq!(field.paste(URI), ChangeOutcome::HandedOff);
        assert!(matches!(
            events.try_recv().unwrap(),
            FieldEvent::PaymentRequestRecognized(_)
        ));

        assert_eq!(field.scan("not a request"), ChangeOutcome::Continue);
        assert_eq!(field.text(), "not a request");
        assert_eq!(field.mode(), FieldMode::Display);
    }

    #[test]
    fn domain_text_issues_ticket_for_current_generation() {
        let (mut field, _events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        assert_eq!(ticket.generation, field.generation());
        assert_eq!(ticket.domain.as_str(), "ihatefiat.crypto");
        assert_eq!(ticket.ticker, Ticker::new("ltc"));
        assert_eq!(field.text(), "ihatefiat.crypto");
    }

    #[test]
    fn failed_resolution_keeps_typed_text() {
        let (mut field, mut events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        let outcome = field.apply_resolution(
            &ticket,
            Err(ResolutionError::UnknownName {
                domain: "ihatefiat.crypto".to_string(),
            }),
        );
        assert!(matches!(outcome, ResolutionOutcome::Failed(_)));
        assert_eq!(field.text(), "ihatefiat.crypto");
        assert!(field.suggestion().is_none());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn resolved_value_that_is_not_an_address_is_a_failure() {
        let (mut field, _events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        let outcome = field.apply_resolution(&ticket, Ok("0xdeadbeef".to_string()));
        assert!(matches!(
            outcome,
            ResolutionOutcome::Failed(ResolutionError::InvalidResponse(_))
        ));
        assert_eq!(field.text(), "ihatefiat.crypto");
    }

    #[test]
    fn stale_resolution_is_dropped() {
        let (mut field, _events) = editing_field();
        let old = ticket_for(field.change_text("ihatefiat.crypto"));
        let new = ticket_for(field.change_text("ihatefiat.crypt0.crypto"));

        assert_eq!(
            field.apply_resolution(&old, Ok(RESOLVED.to_string())),
            ResolutionOutcome::Stale
        );
        assert!(field.suggestion().is_none());

        assert_eq!(
            field.apply_resolution(&new, Ok(RESOLVED.to_string())),
            ResolutionOutcome::Suggested(RESOLVED.to_string())
        );
    }

    #[test]
    fn success_is_only_a_suggestion_until_accepted() {
        let (mut field, mut events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        field.apply_resolution(&ticket, Ok(RESOLVED.to_string()));
        assert_eq!(field.text(), "ihatefiat.crypto");
        assert!(events.try_recv().is_err());

        let request = field.accept_suggestion().unwrap();
        assert_eq!(request.address, RESOLVED);
        assert_eq!(field.text(), RESOLVED);
        assert_eq!(field.mode(), FieldMode::Display);
        assert_eq!(
            events.try_recv().unwrap(),
            FieldEvent::PaymentRequestRecognized(request)
        );
        assert!(field.accept_suggestion().is_none());
    }

    #[test]
    fn typing_after_resolution_discards_suggestion() {
        let (mut field, _events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        field.apply_resolution(&ticket, Ok(RESOLVED.to_string()));
        field.change_text("ihatefiat.crypt");
        assert!(field.suggestion().is_none());
        assert!(field.accept_suggestion().is_none());
        assert_eq!(field.text(), "ihatefiat.crypt");
    }

    #[test]
    fn rejected_suggestion_leaves_text() {
        let (mut field, _events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        field.apply_resolution(&ticket, Ok(RESOLVED.to_string()));
        let suggestion = field.reject_suggestion().unwrap();
        assert_eq!(suggestion.address, RESOLVED);
        assert_eq!(field.text(), "ihatefiat.crypto");
    }

    #[test]
    fn set_content_syncs_value_and_invalidates_lookups() {
        let (mut field, _events) = editing_field();
        let ticket = ticket_for(field.change_text("ihatefiat.crypto"));
        field.set_content(Some("LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q"));
        assert_eq!(field.text(), "LcvVxjzYuQ5LbUCq7fqnZGFgwD9u6Fnt6Q");
        assert_eq!(
            field.apply_resolution(&ticket, Ok(RESOLVED.to_string())),
            ResolutionOutcome::Stale
        );

        field.set_content(None);
        assert_eq!(field.address(), None);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(FieldEvent::EditingStarted).unwrap();
        assert_eq!(json["event"], "editing_started");
    }
}
