//! RegisterVisit command handler
//!
//! Fills a freshly created draft visit with the customer, vehicle and
//! intake services. The visit id and visit number are generated by the
//! VisitManager before dispatch. Intake services are created confirmed;
//! the approval workflow only applies to changes proposed later.

use async_trait::async_trait;

use crate::visits::actions::build_line_item;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::models::{CustomerRef, VehicleRef};
use shared::visit::{
    EventPayload, LineItemStatus, ServiceItemInput, VisitEvent, VisitEventType,
};

/// RegisterVisit action
#[derive(Debug, Clone)]
pub struct RegisterVisitAction {
    pub visit_id: String,
    pub customer: CustomerRef,
    pub vehicle: VehicleRef,
    pub services: Vec<ServiceItemInput>,
}

#[async_trait]
impl CommandHandler for RegisterVisitAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Resolve intake services (confirmed, no pending operation)
        let mut items = Vec::with_capacity(self.services.len());
        for input in &self.services {
            items.push(build_line_item(
                input,
                ctx.catalog(),
                LineItemStatus::Confirmed,
                None,
            )?);
        }

        // 2. Fill the blank draft created by the manager
        ctx.snapshot.customer = self.customer.clone();
        ctx.snapshot.vehicle = self.vehicle.clone();
        ctx.snapshot.services = items;
        recalculate_totals(ctx.snapshot);

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::VisitRegistered,
            EventPayload::VisitRegistered {
                visit_number: ctx.snapshot.visit_number.clone(),
                customer_name: ctx.snapshot.customer.name.clone(),
                vehicle_label: ctx.snapshot.vehicle.label.clone(),
                services: ctx.snapshot.services.clone(),
                total_gross: ctx.snapshot.total_gross,
            },
        );

        Ok(vec![event])
    }
}
