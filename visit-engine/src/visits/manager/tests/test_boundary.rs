use super::*;

// ========================================================================
// Terminal-state guards
// ========================================================================

async fn complete_fully(manager: &VisitManager, visit_id: &str) {
    assert!(confirm_draft(manager, visit_id).await.success);
    assert!(mark_ready(manager, visit_id).await.success);
    assert!(complete_visit(manager, visit_id).await.success);
}

#[tokio::test]
async fn test_every_mutation_rejected_on_completed_visit() {
    let manager = create_test_manager();
    let visit_id = register_visit(&manager, vec![ad_hoc("Oil change", 25_000, 23)]).await;
    let item_id = manager.get_visit(&visit_id).unwrap().services[0].id.clone();
    complete_fully(&manager, &visit_id).await;

    let attempts = vec![
        VisitCommandPayload::ConfirmDraft {
            visit_id: visit_id.clone(),
        },
        VisitCommandPayload::CancelDraft {
            visit_id: visit_id.clone(),
        },
        VisitCommandPayload::MarkReady {
            visit_id: visit_id.clone(),
            notification: None,
        },
        VisitCommandPayload::CompleteVisit {
            visit_id: visit_id.clone(),
            payment: PaymentDetails {
                method: PaymentMethod::Cash,
                invoice: InvoiceType::Receipt,
            },
        },
        VisitCommandPayload::RejectVisit {
            visit_id: visit_id.clone(),
            reason: None,
        },
        VisitCommandPayload::ArchiveVisit {
            visit_id: visit_id.clone(),
        },
        VisitCommandPayload::ProposeAddService {
            visit_id: visit_id.clone(),
            service: ad_hoc("Anything", 1_000, 23),
        },
        VisitCommandPayload::ProposeEditService {
            visit_id: visit_id.clone(),
            item_id: item_id.clone(),
            adjustment: Adjustment::Percent(-10),
            note: None,
        },
        VisitCommandPayload::ProposeDeleteService {
            visit_id: visit_id.clone(),
            item_id: item_id.clone(),
        },
        VisitCommandPayload::ApproveChange {
            visit_id: visit_id.clone(),
            item_id: item_id.clone(),
        },
        VisitCommandPayload::RejectChange {
            visit_id: visit_id.clone(),
            item_id: item_id.clone(),
        },
        VisitCommandPayload::ApplyUniformDiscount {
            visit_id: visit_id.clone(),
            target_amount: 10_000,
            price_basis: PriceBasis::Net,
        },
    ];

    for payload in attempts {
        let resp = manager
            .execute_command(shared::visit::VisitCommand::new(
                "op-1",
                "Test Operator",
                payload.clone(),
            ))
            .await;
        assert!(!resp.success, "Expected failure for {:?}", payload);
        assert_eq!(
            error_code(&resp),
            CommandErrorCode::TerminalStateViolation,
            "Expected terminal violation for {:?}",
            payload
        );
    }

    // Status unchanged throughout
    assert_visit_status(&manager, &visit_id, VisitStatus::Completed);
}

#[tokio::test]
async fn test_rejected_and_archived_are_equally_terminal() {
    let manager = create_test_manager();

    for admin in ["reject", "archive"] {
        let visit_id = register_visit(&manager, vec![]).await;
        let payload = if admin == "reject" {
            VisitCommandPayload::RejectVisit {
                visit_id: visit_id.clone(),
                reason: None,
            }
        } else {
            VisitCommandPayload::ArchiveVisit {
                visit_id: visit_id.clone(),
            }
        };
        assert!(
            manager
                .execute_command(shared::visit::VisitCommand::new(
                    "op-1",
                    "Test Operator",
                    payload
                ))
                .await
                .success
        );

        let resp = confirm_draft(&manager, &visit_id).await;
        assert!(!resp.success);
        assert_eq!(error_code(&resp), CommandErrorCode::TerminalStateViolation);
    }
}

// ========================================================================
// Frozen bill after ReadyForPickup
// ========================================================================

#[tokio::test]
async fn test_line_items_frozen_after_ready() {
    let manager = create_test_manager();
    let visit_id =
        register_in_progress_visit(&manager, vec![ad_hoc("Oil change", 25_000, 23)]).await;
    let item_id = manager.get_visit(&visit_id).unwrap().services[0].id.clone();
    assert!(mark_ready(&manager, &visit_id).await.success);

    let resp = propose_edit(&manager, &visit_id, &item_id, Adjustment::Percent(-10)).await;
    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);

    let resp = propose_add(&manager, &visit_id, ad_hoc("Extra", 5_000, 23)).await;
    assert!(!resp.success);

    let resp = apply_uniform_discount(&manager, &visit_id, 10_000, PriceBasis::Net).await;
    assert!(!resp.success);

    // The bill did not move
    assert_totals(&manager, &visit_id, 25_000, 30_750);
}

#[tokio::test]
async fn test_cancel_non_draft_rejected() {
    let manager = create_test_manager();
    let visit_id = register_in_progress_visit(&manager, vec![]).await;

    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::CancelDraft {
                visit_id: visit_id.clone(),
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);
    // Still present
    assert_visit_status(&manager, &visit_id, VisitStatus::InProgress);
}

// ========================================================================
// Input validation
// ========================================================================

#[tokio::test]
async fn test_ad_hoc_service_requires_inline_fields() {
    let manager = create_test_manager();
    let visit_id = register_visit(&manager, vec![]).await;

    let incomplete = ServiceItemInput {
        service_id: None,
        name: Some("Mystery work".to_string()),
        base_price_net: None,
        vat_rate: Some(23),
        adjustment: Adjustment::unchanged(),
        note: None,
    };
    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::AddServices {
                visit_id: visit_id.clone(),
                services: vec![incomplete],
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);
    assert!(manager.get_visit(&visit_id).unwrap().services.is_empty());
}

#[tokio::test]
async fn test_invalid_vat_rate_is_pricing_error() {
    let manager = create_test_manager();
    let visit_id = register_visit(&manager, vec![]).await;

    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::AddServices {
                visit_id: visit_id.clone(),
                services: vec![ad_hoc("Broken", 10_000, 123)],
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidPricingInput);
}

#[tokio::test]
async fn test_inactive_catalog_service_rejected() {
    let catalog = crate::catalog::MemoryCatalog::new();
    catalog.insert(CatalogService {
        id: 9,
        name: "Retired service".to_string(),
        base_price_net: 10_000,
        vat_rate: 23,
        is_active: false,
    });
    let mut manager = create_test_manager();
    manager.set_catalog(Arc::new(catalog));

    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::RegisterVisit {
                customer: test_customer(None),
                vehicle: test_vehicle(),
                services: vec![catalog_item(9)],
                currency: None,
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);
}

#[tokio::test]
async fn test_catalog_add_without_catalog_configured() {
    let manager = create_test_manager();
    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::RegisterVisit {
                customer: test_customer(None),
                vehicle: test_vehicle(),
                services: vec![catalog_item(7)],
                currency: None,
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);
}

#[tokio::test]
async fn test_register_honours_currency_override() {
    let manager = create_test_manager();
    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::RegisterVisit {
                customer: test_customer(None),
                vehicle: test_vehicle(),
                services: vec![],
                currency: Some("EUR".to_string()),
            },
        ))
        .await;
    assert!(resp.success);

    let snapshot = manager.get_visit(&resp.visit_id.unwrap()).unwrap();
    assert_eq!(snapshot.currency, "EUR");
}

#[tokio::test]
async fn test_direct_add_after_draft_rejected() {
    let manager = create_test_manager();
    let visit_id = register_in_progress_visit(&manager, vec![]).await;

    let resp = manager
        .execute_command(shared::visit::VisitCommand::new(
            "op-1",
            "Test Operator",
            VisitCommandPayload::AddServices {
                visit_id: visit_id.clone(),
                services: vec![ad_hoc("Oil change", 25_000, 23)],
            },
        ))
        .await;

    assert!(!resp.success);
    assert_eq!(error_code(&resp), CommandErrorCode::InvalidOperation);
}
