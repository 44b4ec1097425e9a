//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! specific command type.

use async_trait::async_trait;

use crate::catalog::ServiceCatalog;
use crate::pricing;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    LineItemStatus, PendingOperation, ServiceItemInput, ServiceLineItem, VisitCommand,
    VisitCommandPayload, VisitEvent,
};

mod add_services;
mod apply_uniform_discount;
mod approve_change;
mod archive_visit;
mod cancel_draft;
mod complete_visit;
mod confirm_draft;
mod mark_ready;
mod propose_add;
mod propose_delete;
mod propose_edit;
pub mod register_visit;
mod reject_change;
mod reject_visit;

pub use add_services::AddServicesAction;
pub use apply_uniform_discount::ApplyUniformDiscountAction;
pub use approve_change::ApproveChangeAction;
pub use archive_visit::ArchiveVisitAction;
pub use cancel_draft::CancelDraftAction;
pub use complete_visit::CompleteVisitAction;
pub use confirm_draft::ConfirmDraftAction;
pub use mark_ready::MarkReadyAction;
pub use propose_add::ProposeAddAction;
pub use propose_delete::ProposeDeleteAction;
pub use propose_edit::ProposeEditAction;
pub use register_visit::RegisterVisitAction;
pub use reject_change::RejectChangeAction;
pub use reject_visit::RejectVisitAction;

/// Resolve a service input into a line item snapshot
///
/// Catalog inputs (`service_id` set) take name/price/VAT from the
/// catalog; ad-hoc inputs carry them inline. The final prices come from
/// the pricing engine.
pub(crate) fn build_line_item(
    input: &ServiceItemInput,
    catalog: Option<&dyn ServiceCatalog>,
    status: LineItemStatus,
    pending_operation: Option<PendingOperation>,
) -> Result<ServiceLineItem, VisitError> {
    let (service_id, service_name, base_price_net, vat_rate) = match input.service_id {
        Some(sid) => {
            let catalog = catalog.ok_or_else(|| {
                VisitError::InvalidOperation("Service catalog is not available".to_string())
            })?;
            let service = catalog
                .find_service(sid)
                .ok_or(VisitError::ServiceNotFound(sid))?;
            if !service.is_active {
                return Err(VisitError::InvalidOperation(format!(
                    "Catalog service {} is not active",
                    sid
                )));
            }
            (Some(sid), service.name, service.base_price_net, service.vat_rate)
        }
        None => {
            let name = input
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    VisitError::InvalidOperation("Ad-hoc service requires a name".to_string())
                })?;
            let base_price_net = input.base_price_net.ok_or_else(|| {
                VisitError::InvalidOperation("Ad-hoc service requires a base price".to_string())
            })?;
            let vat_rate = input.vat_rate.ok_or_else(|| {
                VisitError::InvalidOperation("Ad-hoc service requires a VAT rate".to_string())
            })?;
            (None, name, base_price_net, vat_rate)
        }
    };

    let breakdown = pricing::price(base_price_net, vat_rate, &input.adjustment)?;

    Ok(ServiceLineItem {
        id: uuid::Uuid::new_v4().to_string(),
        service_id,
        service_name,
        base_price_net,
        vat_rate,
        adjustment: input.adjustment,
        note: input.note.clone(),
        final_price_net: breakdown.final_price_net,
        final_price_gross: breakdown.final_price_gross,
        status,
        pending_operation,
        previous_price_net: None,
        previous_price_gross: None,
    })
}

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    RegisterVisit(RegisterVisitAction),
    AddServices(AddServicesAction),
    ProposeAdd(ProposeAddAction),
    ProposeEdit(ProposeEditAction),
    ProposeDelete(ProposeDeleteAction),
    ApproveChange(ApproveChangeAction),
    RejectChange(RejectChangeAction),
    ApplyUniformDiscount(ApplyUniformDiscountAction),
    ConfirmDraft(ConfirmDraftAction),
    CancelDraft(CancelDraftAction),
    MarkReady(MarkReadyAction),
    CompleteVisit(CompleteVisitAction),
    RejectVisit(RejectVisitAction),
    ArchiveVisit(ArchiveVisitAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        match self {
            CommandAction::RegisterVisit(action) => action.execute(ctx, metadata).await,
            CommandAction::AddServices(action) => action.execute(ctx, metadata).await,
            CommandAction::ProposeAdd(action) => action.execute(ctx, metadata).await,
            CommandAction::ProposeEdit(action) => action.execute(ctx, metadata).await,
            CommandAction::ProposeDelete(action) => action.execute(ctx, metadata).await,
            CommandAction::ApproveChange(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectChange(action) => action.execute(ctx, metadata).await,
            CommandAction::ApplyUniformDiscount(action) => action.execute(ctx, metadata).await,
            CommandAction::ConfirmDraft(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelDraft(action) => action.execute(ctx, metadata).await,
            CommandAction::MarkReady(action) => action.execute(ctx, metadata).await,
            CommandAction::CompleteVisit(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectVisit(action) => action.execute(ctx, metadata).await,
            CommandAction::ArchiveVisit(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert VisitCommand to CommandAction
///
/// This is the ONLY place with a match on VisitCommandPayload.
impl From<&VisitCommand> for CommandAction {
    fn from(cmd: &VisitCommand) -> Self {
        match &cmd.payload {
            VisitCommandPayload::RegisterVisit { .. } => {
                // RegisterVisit is handled in VisitManager to generate the
                // visit id and visit number. This path should never be reached.
                unreachable!(
                    "RegisterVisit should be handled by VisitManager, not From<&VisitCommand>"
                )
            }
            VisitCommandPayload::AddServices { visit_id, services } => {
                CommandAction::AddServices(AddServicesAction {
                    visit_id: visit_id.clone(),
                    services: services.clone(),
                })
            }
            VisitCommandPayload::ProposeAddService { visit_id, service } => {
                CommandAction::ProposeAdd(ProposeAddAction {
                    visit_id: visit_id.clone(),
                    service: service.clone(),
                })
            }
            VisitCommandPayload::ProposeEditService {
                visit_id,
                item_id,
                adjustment,
                note,
            } => CommandAction::ProposeEdit(ProposeEditAction {
                visit_id: visit_id.clone(),
                item_id: item_id.clone(),
                adjustment: *adjustment,
                note: note.clone(),
            }),
            VisitCommandPayload::ProposeDeleteService { visit_id, item_id } => {
                CommandAction::ProposeDelete(ProposeDeleteAction {
                    visit_id: visit_id.clone(),
                    item_id: item_id.clone(),
                })
            }
            VisitCommandPayload::ApproveChange { visit_id, item_id } => {
                CommandAction::ApproveChange(ApproveChangeAction {
                    visit_id: visit_id.clone(),
                    item_id: item_id.clone(),
                })
            }
            VisitCommandPayload::RejectChange { visit_id, item_id } => {
                CommandAction::RejectChange(RejectChangeAction {
                    visit_id: visit_id.clone(),
                    item_id: item_id.clone(),
                })
            }
            VisitCommandPayload::ApplyUniformDiscount {
                visit_id,
                target_amount,
                price_basis,
            } => CommandAction::ApplyUniformDiscount(ApplyUniformDiscountAction {
                visit_id: visit_id.clone(),
                target_amount: *target_amount,
                price_basis: *price_basis,
            }),
            VisitCommandPayload::ConfirmDraft { visit_id } => {
                CommandAction::ConfirmDraft(ConfirmDraftAction {
                    visit_id: visit_id.clone(),
                })
            }
            VisitCommandPayload::CancelDraft { visit_id } => {
                CommandAction::CancelDraft(CancelDraftAction {
                    visit_id: visit_id.clone(),
                })
            }
            VisitCommandPayload::MarkReady {
                visit_id,
                notification,
            } => CommandAction::MarkReady(MarkReadyAction {
                visit_id: visit_id.clone(),
                notification: notification.clone(),
            }),
            VisitCommandPayload::CompleteVisit { visit_id, payment } => {
                CommandAction::CompleteVisit(CompleteVisitAction {
                    visit_id: visit_id.clone(),
                    payment: *payment,
                })
            }
            VisitCommandPayload::RejectVisit { visit_id, reason } => {
                CommandAction::RejectVisit(RejectVisitAction {
                    visit_id: visit_id.clone(),
                    reason: reason.clone(),
                })
            }
            VisitCommandPayload::ArchiveVisit { visit_id } => {
                CommandAction::ArchiveVisit(ArchiveVisitAction {
                    visit_id: visit_id.clone(),
                })
            }
        }
    }
}
