use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, EventEnvelope};
use super::commands::PaymentCommand;
use super::errors::PaymentError;
use super::events::*;
use super::value_objects::{Currency, PaymentStatus};

// ============================================================================
// Payment Aggregate - Domain Logic
// ============================================================================
//
// All fields are private: a payment is only ever obtained through `create`
// or by replaying a stored log with `load_from_events`.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct PaymentAggregate {
    // Identity
    id: Uuid,
    version: i64,

    // Current State (derived from events)
    status: PaymentStatus,
    amount: Decimal,
    currency: Currency,
    description: Option<String>,

    // Audit Trail
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<EventEnvelope<PaymentEvent>>,
}

impl PaymentAggregate {
    /// Validate input and start a new payment in `created` status.
    pub fn create(
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<Self, PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }
        let currency = Currency::parse(currency)?;

        let first = EventEnvelope::new(
            Uuid::new_v4(),
            1,
            PaymentEvent::PaymentInitiated(PaymentInitiated {
                amount,
                currency,
                description,
            }),
        );

        Self::apply_first_event(&first)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn generate_link(&mut self, base_domain: &str) -> Result<EventEnvelope<PaymentEvent>, PaymentError> {
        self.execute(&PaymentCommand::GenerateLink {
            base_domain: base_domain.to_string(),
        })
    }

    pub fn client_redirected(&mut self) -> Result<EventEnvelope<PaymentEvent>, PaymentError> {
        self.execute(&PaymentCommand::MarkClientRedirected)
    }

    pub fn succeed(&mut self) -> Result<EventEnvelope<PaymentEvent>, PaymentError> {
        self.execute(&PaymentCommand::Succeed)
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<EventEnvelope<PaymentEvent>, PaymentError> {
        self.execute(&PaymentCommand::Fail { reason: reason.into() })
    }

    /// Decide, record and return the event a command produces.
    ///
    /// On error nothing is recorded and the status is unchanged.
    pub fn execute(&mut self, command: &PaymentCommand) -> Result<EventEnvelope<PaymentEvent>, PaymentError> {
        let mut events = self.handle_command(command)?;
        if events.len() != 1 {
            return Err(PaymentError::UnexpectedEventCount(events.len()));
        }
        let event = events.remove(0);

        let envelope = EventEnvelope::new(self.id, self.version + 1, event)
            .with_timestamp(self.next_timestamp());

        self.apply_event(&envelope)?;
        Ok(envelope)
    }

    fn decide(&self, command: &PaymentCommand) -> Result<PaymentEvent, PaymentError> {
        let event = match command {
            PaymentCommand::GenerateLink { base_domain } => {
                PaymentEvent::PaymentLinkGenerated(PaymentLinkGenerated {
                    link: self.payment_link(base_domain),
                })
            }
            PaymentCommand::MarkClientRedirected => {
                PaymentEvent::ClientRedirectedToProvider(ClientRedirectedToProvider {})
            }
            PaymentCommand::Succeed => PaymentEvent::PaymentSucceeded(PaymentSucceeded {
                transaction_id: Uuid::new_v4(),
            }),
            PaymentCommand::Fail { reason } => PaymentEvent::PaymentFailed(PaymentFailed {
                reason: reason.clone(),
            }),
        };

        // Reject early so callers get the transition error before any envelope exists
        self.status.transition(event.kind())?;
        Ok(event)
    }

    fn payment_link(&self, base_domain: &str) -> String {
        format!("{}/{}", base_domain.trim_end_matches('/'), self.id)
    }

    /// Timestamps never go backwards within one log, even if the clock does.
    fn next_timestamp(&self) -> DateTime<Utc> {
        Utc::now().max(self.updated_at)
    }

    // ------------------------------------------------------------------------
    // Read-only view
    // ------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Full ordered event log
    pub fn events(&self) -> &[EventEnvelope<PaymentEvent>] {
        &self.events
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for PaymentAggregate {
    type Event = PaymentEvent;
    type Command = PaymentCommand;
    type Error = PaymentError;

    fn apply_first_event(envelope: &EventEnvelope<Self::Event>) -> Result<Self, Self::Error> {
        match &envelope.event_data {
            PaymentEvent::PaymentInitiated(e) => {
                if e.amount <= Decimal::ZERO {
                    return Err(PaymentError::InvalidAmount(e.amount));
                }
                if envelope.sequence_number != 1 {
                    return Err(PaymentError::SequenceGap {
                        expected: 1,
                        found: envelope.sequence_number,
                    });
                }

                Ok(Self {
                    id: envelope.aggregate_id,
                    version: envelope.sequence_number,
                    status: PaymentStatus::Created,
                    amount: e.amount,
                    currency: e.currency.clone(),
                    description: e.description.clone(),
                    created_at: envelope.timestamp,
                    updated_at: envelope.timestamp,
                    events: vec![envelope.clone()],
                })
            }
            other => Err(PaymentError::NotInitialized(other.kind().as_str().to_string())),
        }
    }

    fn apply_event(&mut self, envelope: &EventEnvelope<Self::Event>) -> Result<(), Self::Error> {
        // Validate everything before touching state
        if envelope.aggregate_id != self.id {
            return Err(PaymentError::ForeignEvent {
                expected: self.id,
                found: envelope.aggregate_id,
            });
        }
        if envelope.sequence_number != self.version + 1 {
            return Err(PaymentError::SequenceGap {
                expected: self.version + 1,
                found: envelope.sequence_number,
            });
        }
        if envelope.timestamp < self.updated_at {
            return Err(PaymentError::TimestampRegression {
                previous: self.updated_at,
                found: envelope.timestamp,
            });
        }
        let next_status = self.status.transition(envelope.event_data.kind())?;

        self.status = next_status;
        self.version = envelope.sequence_number;
        self.updated_at = envelope.timestamp;
        self.events.push(envelope.clone());

        tracing::trace!(
            payment_id = %self.id,
            event_type = %envelope.event_type,
            status = %self.status,
            version = self.version,
            "Applied payment event"
        );

        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        Ok(vec![self.decide(command)?])
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::core::ReplayError;
    use rust_decimal_macros::dec;

    const DOMAIN: &str = "https://pay.example.com";

    fn create_test_payment() -> PaymentAggregate {
        PaymentAggregate::create(dec!(1000), "RUB", Some("order #123".to_string())).unwrap()
    }

    fn kinds(payment: &PaymentAggregate) -> Vec<EventType> {
        payment.events().iter().map(|e| e.event_data.kind()).collect()
    }

    #[test]
    fn test_create_payment() {
        let payment = create_test_payment();

        assert_eq!(payment.status(), PaymentStatus::Created);
        assert_eq!(payment.amount(), dec!(1000));
        assert_eq!(payment.currency().as_str(), "RUB");
        assert_eq!(payment.description(), Some("order #123"));
        assert_eq!(payment.version(), 1);
        assert_eq!(kinds(&payment), vec![EventType::PaymentInitiated]);
        assert_eq!(payment.events()[0].aggregate_id, payment.id());
        assert_eq!(payment.created_at(), payment.updated_at());
    }

    #[test]
    fn test_create_without_description() {
        let payment = PaymentAggregate::create(dec!(0.01), "USD", None).unwrap();
        assert_eq!(payment.description(), None);
        assert_eq!(payment.status(), PaymentStatus::Created);
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        assert_ne!(create_test_payment().id(), create_test_payment().id());
    }

    #[test]
    fn test_create_with_non_positive_amount_fails() {
        for amount in [dec!(0), dec!(-1), dec!(-0.01)] {
            let result = PaymentAggregate::create(amount, "RUB", None);
            assert!(matches!(result, Err(PaymentError::InvalidAmount(a)) if a == amount));
        }
    }

    #[test]
    fn test_create_with_invalid_currency_fails() {
        for currency in ["rub", "RU", "RUBL", "12A", ""] {
            let result = PaymentAggregate::create(dec!(100), currency, None);
            assert!(matches!(result, Err(PaymentError::InvalidCurrency(_))));
        }
    }

    #[test]
    fn test_generate_link() {
        let mut payment = create_test_payment();

        let event = payment.generate_link(DOMAIN).unwrap();

        assert_eq!(payment.status(), PaymentStatus::LinkReady);
        assert_eq!(event.sequence_number, 2);
        assert_eq!(event.event_type, "payment_link_generated");
        match &event.event_data {
            PaymentEvent::PaymentLinkGenerated(e) => {
                assert_eq!(e.link, format!("{}/{}", DOMAIN, payment.id()));
            }
            other => panic!("Unexpected event: {:?}", other),
        }
        assert_eq!(payment.events().last(), Some(&event));
    }

    #[test]
    fn test_generate_link_does_not_double_slash() {
        let mut payment = create_test_payment();
        let event = payment.generate_link("https://pay.example.com/").unwrap();

        match event.event_data {
            PaymentEvent::PaymentLinkGenerated(e) => {
                assert_eq!(e.link, format!("https://pay.example.com/{}", payment.id()));
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_generate_link_twice_fails() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();

        let result = payment.generate_link(DOMAIN);
        assert!(matches!(result, Err(PaymentError::LinkAlreadyGenerated(PaymentStatus::LinkReady))));
        assert_eq!(payment.status(), PaymentStatus::LinkReady);
        assert_eq!(payment.events().len(), 2);
    }

    #[test]
    fn test_client_redirected_requires_link() {
        let mut payment = create_test_payment();

        let result = payment.client_redirected();
        assert!(matches!(result, Err(PaymentError::LinkNotGenerated(PaymentStatus::Created))));

        payment.generate_link(DOMAIN).unwrap();
        payment.client_redirected().unwrap();
        assert_eq!(payment.status(), PaymentStatus::ClientRedirected);
    }

    #[test]
    fn test_succeed_before_client_action_fails() {
        let mut payment = PaymentAggregate::create(dec!(100), "RUB", None).unwrap();

        let result = payment.succeed();
        assert!(matches!(result, Err(PaymentError::ClientActionRequired(PaymentStatus::Created))));
        assert_eq!(payment.events().len(), 1);
        assert_eq!(payment.status(), PaymentStatus::Created);
    }

    #[test]
    fn test_fail_before_client_action_fails() {
        let mut payment = create_test_payment();
        assert!(matches!(payment.fail("declined"), Err(PaymentError::ClientActionRequired(_))));
        assert_eq!(payment.events().len(), 1);
    }

    #[test]
    fn test_succeed_from_link_ready() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();

        let event = payment.succeed().unwrap();
        assert_eq!(payment.status(), PaymentStatus::Success);
        assert!(matches!(event.event_data, PaymentEvent::PaymentSucceeded(_)));
    }

    #[test]
    fn test_succeed_generates_fresh_transaction_ids() {
        let transaction_id = |payment: &mut PaymentAggregate| {
            payment.generate_link(DOMAIN).unwrap();
            match payment.succeed().unwrap().event_data {
                PaymentEvent::PaymentSucceeded(e) => e.transaction_id,
                other => panic!("Unexpected event: {:?}", other),
            }
        };

        let a = transaction_id(&mut create_test_payment());
        let b = transaction_id(&mut create_test_payment());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fail_records_reason() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        payment.client_redirected().unwrap();

        let event = payment.fail("insufficient funds").unwrap();
        assert_eq!(payment.status(), PaymentStatus::Failed);
        assert_eq!(
            event.event_data,
            PaymentEvent::PaymentFailed(PaymentFailed { reason: "insufficient funds".into() })
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        payment.succeed().unwrap();

        assert!(payment.generate_link(DOMAIN).is_err());
        assert!(payment.client_redirected().is_err());
        assert!(payment.succeed().is_err());
        assert!(payment.fail("late").is_err());
        assert_eq!(payment.status(), PaymentStatus::Success);
        assert_eq!(payment.events().len(), 3);
    }

    #[test]
    fn test_failed_commands_leave_no_trace() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        let before = (payment.status(), payment.events().len(), payment.version(), payment.updated_at());

        assert!(payment.generate_link(DOMAIN).is_err());

        let after = (payment.status(), payment.events().len(), payment.version(), payment.updated_at());
        assert_eq!(before, after);
    }

    #[test]
    fn test_timestamps_are_non_decreasing() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        payment.client_redirected().unwrap();
        payment.succeed().unwrap();

        let events = payment.events();
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(payment.updated_at(), events[3].timestamp);
        assert_eq!(payment.created_at(), events[0].timestamp);
    }

    #[test]
    fn test_handle_command_does_not_mutate() {
        let payment = create_test_payment();

        let events = payment
            .handle_command(&PaymentCommand::GenerateLink { base_domain: DOMAIN.into() })
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventType::PaymentLinkGenerated);
        assert_eq!(payment.status(), PaymentStatus::Created);
        assert_eq!(payment.events().len(), 1);
    }

    #[test]
    fn test_execute_records_what_handle_command_decides() {
        let mut payment = create_test_payment();
        let command = PaymentCommand::Fail { reason: "declined".into() };
        payment.generate_link(DOMAIN).unwrap();

        let decided = payment.handle_command(&command).unwrap();
        let envelope = payment.execute(&command).unwrap();

        assert_eq!(vec![envelope.event_data.clone()], decided);
        assert_eq!(envelope.sequence_number, 3);
        assert_eq!(payment.events().last(), Some(&envelope));
    }

    #[test]
    fn test_execute_propagates_handle_command_rejection() {
        let mut payment = create_test_payment();

        let decided = payment.handle_command(&PaymentCommand::Succeed);
        let executed = payment.execute(&PaymentCommand::Succeed);

        assert_eq!(decided.unwrap_err(), executed.unwrap_err());
        assert_eq!(payment.events().len(), 1);
    }

    #[test]
    fn test_full_success_scenario() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        payment.client_redirected().unwrap();
        payment.succeed().unwrap();

        assert_eq!(payment.status(), PaymentStatus::Success);
        assert_eq!(
            kinds(&payment),
            vec![
                EventType::PaymentInitiated,
                EventType::PaymentLinkGenerated,
                EventType::ClientRedirectedToProvider,
                EventType::PaymentSucceeded,
            ]
        );
        let sequence: Vec<_> = payment.events().iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3, 4]);
    }

    // ------------------------------------------------------------------------
    // Reconstitution
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_from_events_round_trip() {
        let mut flows: Vec<PaymentAggregate> = Vec::new();

        flows.push(create_test_payment());

        let mut p = create_test_payment();
        p.generate_link(DOMAIN).unwrap();
        flows.push(p);

        let mut p = create_test_payment();
        p.generate_link(DOMAIN).unwrap();
        p.client_redirected().unwrap();
        p.fail("declined").unwrap();
        flows.push(p);

        let mut p = create_test_payment();
        p.generate_link(DOMAIN).unwrap();
        p.succeed().unwrap();
        flows.push(p);

        for original in flows {
            let replayed = PaymentAggregate::load_from_events(original.events()).unwrap();

            assert_eq!(replayed.id(), original.id());
            assert_eq!(replayed.status(), original.status());
            assert_eq!(replayed.version(), original.version());
            assert_eq!(replayed.events(), original.events());
            assert_eq!(replayed.amount(), original.amount());
            assert_eq!(replayed.currency(), original.currency());
            assert_eq!(replayed.updated_at(), original.updated_at());
        }
    }

    #[test]
    fn test_replayed_aggregate_accepts_further_commands() {
        let mut original = create_test_payment();
        original.generate_link(DOMAIN).unwrap();

        let mut replayed = PaymentAggregate::load_from_events(original.events()).unwrap();
        let event = replayed.client_redirected().unwrap();

        assert_eq!(event.sequence_number, 3);
        assert_eq!(replayed.status(), PaymentStatus::ClientRedirected);
    }

    #[test]
    fn test_load_from_empty_events_fails() {
        let result = PaymentAggregate::load_from_events(&[]);
        assert!(matches!(result, Err(PaymentError::Replay(ReplayError::EmptyHistory))));
    }

    #[test]
    fn test_load_requires_initiated_first() {
        let id = Uuid::new_v4();
        let events = vec![EventEnvelope::new(
            id,
            1,
            PaymentEvent::PaymentLinkGenerated(PaymentLinkGenerated { link: "x".into() }),
        )];

        let result = PaymentAggregate::load_from_events(&events);
        assert!(matches!(result, Err(PaymentError::NotInitialized(t)) if t == "payment_link_generated"));
    }

    #[test]
    fn test_load_rejects_invalid_transition_in_history() {
        let payment = create_test_payment();
        let mut events = payment.events().to_vec();
        events.push(EventEnvelope::new(
            payment.id(),
            2,
            PaymentEvent::PaymentSucceeded(PaymentSucceeded { transaction_id: Uuid::new_v4() }),
        ));

        let result = PaymentAggregate::load_from_events(&events);
        assert!(matches!(result, Err(PaymentError::ClientActionRequired(PaymentStatus::Created))));
    }

    #[test]
    fn test_load_rejects_second_initiation() {
        let payment = create_test_payment();
        let mut events = payment.events().to_vec();
        let mut duplicate = events[0].clone();
        duplicate.sequence_number = 2;
        events.push(duplicate);

        assert!(matches!(
            PaymentAggregate::load_from_events(&events),
            Err(PaymentError::AlreadyInitiated)
        ));
    }

    #[test]
    fn test_load_rejects_foreign_events() {
        let mut a = create_test_payment();
        let mut b = create_test_payment();
        a.generate_link(DOMAIN).unwrap();
        b.generate_link(DOMAIN).unwrap();

        let events = vec![a.events()[0].clone(), b.events()[1].clone()];
        assert!(matches!(
            PaymentAggregate::load_from_events(&events),
            Err(PaymentError::ForeignEvent { .. })
        ));
    }

    #[test]
    fn test_load_rejects_sequence_gaps() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();
        payment.client_redirected().unwrap();

        let events = vec![payment.events()[0].clone(), payment.events()[2].clone()];
        assert!(matches!(
            PaymentAggregate::load_from_events(&events),
            Err(PaymentError::SequenceGap { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_load_rejects_timestamps_going_backwards() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();

        let mut events = payment.events().to_vec();
        events[1].timestamp = events[0].timestamp - chrono::Duration::days(1);

        assert!(matches!(
            PaymentAggregate::load_from_events(&events),
            Err(PaymentError::TimestampRegression { previous, found })
                if previous == events[0].timestamp && found == events[1].timestamp
        ));
    }

    #[test]
    fn test_load_accepts_equal_timestamps() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();

        let mut events = payment.events().to_vec();
        events[1].timestamp = events[0].timestamp;

        let replayed = PaymentAggregate::load_from_events(&events).unwrap();
        assert_eq!(replayed.updated_at(), replayed.created_at());
    }

    #[test]
    fn test_load_accepts_reserved_expiry_event() {
        let mut payment = create_test_payment();
        payment.generate_link(DOMAIN).unwrap();

        let mut events = payment.events().to_vec();
        events.push(EventEnvelope::new(
            payment.id(),
            3,
            PaymentEvent::PaymentExpired(PaymentExpired {}),
        ));

        let replayed = PaymentAggregate::load_from_events(&events).unwrap();
        assert_eq!(replayed.status(), PaymentStatus::Expired);
        assert_eq!(replayed.events().len(), 3);
    }

    #[test]
    fn test_load_rejects_non_positive_initial_amount() {
        let events = vec![EventEnvelope::new(
            Uuid::new_v4(),
            1,
            PaymentEvent::PaymentInitiated(PaymentInitiated {
                amount: dec!(0),
                currency: Currency::parse("RUB").unwrap(),
                description: None,
            }),
        )];

        assert!(matches!(
            PaymentAggregate::load_from_events(&events),
            Err(PaymentError::InvalidAmount(_))
        ));
    }
}
