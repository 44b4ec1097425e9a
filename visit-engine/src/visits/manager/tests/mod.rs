use super::*;
use shared::models::{CatalogService, CustomerRef, VehicleRef};
use shared::visit::{
    Adjustment, CommandErrorCode, InvoiceType, PaymentDetails, PaymentMethod, PriceBasis,
    ServiceItemInput, VisitCommandPayload, VisitStatus,
};

fn create_test_manager() -> VisitManager {
    VisitManager::with_memory_store()
}

fn create_test_manager_with_catalog() -> VisitManager {
    let catalog = crate::catalog::MemoryCatalog::new();
    catalog.insert(CatalogService {
        id: 7,
        name: "Oil change".to_string(),
        base_price_net: 25_000,
        vat_rate: 23,
        is_active: true,
    });
    catalog.insert(CatalogService {
        id: 8,
        name: "Timing belt".to_string(),
        base_price_net: 120_000,
        vat_rate: 23,
        is_active: true,
    });
    let mut manager = create_test_manager();
    manager.set_catalog(Arc::new(catalog));
    manager
}

fn ad_hoc(name: &str, base_net: i64, vat: i32) -> ServiceItemInput {
    ServiceItemInput {
        service_id: None,
        name: Some(name.to_string()),
        base_price_net: Some(base_net),
        vat_rate: Some(vat),
        adjustment: Adjustment::unchanged(),
        note: None,
    }
}

fn catalog_item(service_id: i64) -> ServiceItemInput {
    ServiceItemInput {
        service_id: Some(service_id),
        ..Default::default()
    }
}

fn test_customer(email: Option<&str>) -> CustomerRef {
    CustomerRef {
        id: Some("cust-1".to_string()),
        name: "Jan Kowalski".to_string(),
        email: email.map(|e| e.to_string()),
        phone: Some("+48 600 100 200".to_string()),
    }
}

fn test_vehicle() -> VehicleRef {
    VehicleRef {
        id: Some("veh-1".to_string()),
        label: "WX 12345 - Skoda Octavia".to_string(),
    }
}

// ========================================================================
// Helper: register a visit with services
// ========================================================================

async fn register_visit(manager: &VisitManager, services: Vec<ServiceItemInput>) -> String {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::RegisterVisit {
            customer: test_customer(Some("jan@example.com")),
            vehicle: test_vehicle(),
            services,
            currency: None,
        },
    );
    let resp = manager.execute_command(cmd).await;
    assert!(resp.success, "Failed to register visit: {:?}", resp.error);
    resp.visit_id.unwrap()
}

/// Register and immediately confirm (Draft -> InProgress)
async fn register_in_progress_visit(
    manager: &VisitManager,
    services: Vec<ServiceItemInput>,
) -> String {
    let visit_id = register_visit(manager, services).await;
    let resp = confirm_draft(manager, &visit_id).await;
    assert!(resp.success, "Failed to confirm draft: {:?}", resp.error);
    visit_id
}

// ========================================================================
// Helper: command shortcuts
// ========================================================================

async fn confirm_draft(manager: &VisitManager, visit_id: &str) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ConfirmDraft {
            visit_id: visit_id.to_string(),
        },
    );
    manager.execute_command(cmd).await
}

async fn propose_edit(
    manager: &VisitManager,
    visit_id: &str,
    item_id: &str,
    adjustment: Adjustment,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ProposeEditService {
            visit_id: visit_id.to_string(),
            item_id: item_id.to_string(),
            adjustment,
            note: None,
        },
    );
    manager.execute_command(cmd).await
}

async fn propose_add(
    manager: &VisitManager,
    visit_id: &str,
    service: ServiceItemInput,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ProposeAddService {
            visit_id: visit_id.to_string(),
            service,
        },
    );
    manager.execute_command(cmd).await
}

async fn propose_delete(
    manager: &VisitManager,
    visit_id: &str,
    item_id: &str,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ProposeDeleteService {
            visit_id: visit_id.to_string(),
            item_id: item_id.to_string(),
        },
    );
    manager.execute_command(cmd).await
}

async fn approve_change(
    manager: &VisitManager,
    visit_id: &str,
    item_id: &str,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ApproveChange {
            visit_id: visit_id.to_string(),
            item_id: item_id.to_string(),
        },
    );
    manager.execute_command(cmd).await
}

async fn reject_change(
    manager: &VisitManager,
    visit_id: &str,
    item_id: &str,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::RejectChange {
            visit_id: visit_id.to_string(),
            item_id: item_id.to_string(),
        },
    );
    manager.execute_command(cmd).await
}

async fn mark_ready(manager: &VisitManager, visit_id: &str) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::MarkReady {
            visit_id: visit_id.to_string(),
            notification: None,
        },
    );
    manager.execute_command(cmd).await
}

async fn complete_visit(manager: &VisitManager, visit_id: &str) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::CompleteVisit {
            visit_id: visit_id.to_string(),
            payment: PaymentDetails {
                method: PaymentMethod::Card,
                invoice: InvoiceType::Vat,
            },
        },
    );
    manager.execute_command(cmd).await
}

async fn apply_uniform_discount(
    manager: &VisitManager,
    visit_id: &str,
    target_amount: i64,
    price_basis: PriceBasis,
) -> shared::visit::CommandResponse {
    let cmd = shared::visit::VisitCommand::new(
        "op-1",
        "Test Operator",
        VisitCommandPayload::ApplyUniformDiscount {
            visit_id: visit_id.to_string(),
            target_amount,
            price_basis,
        },
    );
    manager.execute_command(cmd).await
}

// ========================================================================
// Helper: assertions
// ========================================================================

fn assert_visit_status(manager: &VisitManager, visit_id: &str, expected: VisitStatus) {
    let snapshot = manager.get_visit(visit_id).unwrap();
    assert_eq!(
        snapshot.status, expected,
        "Expected visit status {:?}, got {:?}",
        expected, snapshot.status
    );
}

fn assert_totals(manager: &VisitManager, visit_id: &str, total_net: i64, total_gross: i64) {
    let snapshot = manager.get_visit(visit_id).unwrap();
    assert_eq!(
        snapshot.total_net, total_net,
        "Expected total_net {}, got {}",
        total_net, snapshot.total_net
    );
    assert_eq!(
        snapshot.total_gross, total_gross,
        "Expected total_gross {}, got {}",
        total_gross, snapshot.total_gross
    );
}

fn error_code(resp: &shared::visit::CommandResponse) -> CommandErrorCode {
    resp.error.as_ref().expect("expected an error").code.clone()
}

mod test_boundary;
