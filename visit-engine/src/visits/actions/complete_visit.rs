//! CompleteVisit command handler
//!
//! Commits the ReadyForPickup -> Completed transition, recording the
//! payment details collected by the completion wizard. Payment capture is
//! data entry only - no transaction is performed here.

use async_trait::async_trait;

use crate::visits::lifecycle::validate_transition;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, PaymentDetails, VisitEvent, VisitEventType, VisitStatus};

/// CompleteVisit action
#[derive(Debug, Clone)]
pub struct CompleteVisitAction {
    pub visit_id: String,
    pub payment: PaymentDetails,
}

#[async_trait]
impl CommandHandler for CompleteVisitAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate transition
        validate_transition(ctx.snapshot, VisitStatus::Completed)?;

        // 2. Commit status and payment details
        ctx.snapshot.status = VisitStatus::Completed;
        ctx.snapshot.payment = Some(self.payment);

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::VisitCompleted,
            EventPayload::VisitCompleted {
                visit_number: ctx.snapshot.visit_number.clone(),
                payment: self.payment,
                final_total_gross: ctx.snapshot.total_gross,
            },
        );

        Ok(vec![event])
    }
}
