mod common;

use anyhow::Result;
use common::{test_ledger, AliceFeed};
use ordledger::domain::{IssueKind, NewOrder};

#[tokio::test]
async fn test_valid_order_has_no_issues() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    AliceFeed::create(&ledger).await?;

    let issues = ledger.validate_orders().await?;
    assert!(issues.is_empty());

    let lines = ledger.generate_report().await?.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1][4], "Processing");

    Ok(())
}

#[tokio::test]
async fn test_raw_order_with_bad_refs_and_status() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let id = ledger
        .record_order(NewOrder::new(999, 999).with_status("Bogus"))
        .await?;

    let issues = ledger.validate_orders().await?;
    assert_eq!(issues.len(), 3);
    assert!(issues.iter().all(|issue| issue.order_id == id));
    assert_eq!(issues[0].kind, IssueKind::MissingCustomer);
    assert_eq!(issues[1].kind, IssueKind::MissingProduct);
    assert_eq!(issues[2].kind, IssueKind::InvalidStatus(Some("Bogus".into())));

    let report = ledger.generate_report().await?;
    assert!(!report.contains_order(id));
    assert_eq!(report.lines().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_invalid_status_update_is_flagged() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;

    let changed = ledger
        .update_order_status(fixture.order, "Lost", Some("courier".into()))
        .await?;
    assert_eq!(changed, 1);

    let issues = ledger.validate_orders().await?;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].order_id, fixture.order);
    assert_eq!(issues[0].description(), "Invalid status: Lost");

    Ok(())
}

#[tokio::test]
async fn test_every_known_status_is_valid() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;

    for status in ["Processing", "Completed", "Failed", "Cancelled"] {
        ledger
            .update_order_status(fixture.order, status, None)
            .await?;
        assert!(ledger.validate_orders().await?.is_empty(), "{}", status);
    }

    // Matching is case-sensitive
    ledger
        .update_order_status(fixture.order, "completed", None)
        .await?;
    assert_eq!(ledger.validate_orders().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_issues_follow_order_id_then_check() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;

    // order 2: missing product only
    let second = ledger
        .create_order(fixture.customer, 500, None)
        .await?;
    // order 3: missing customer and bad status
    let third = ledger
        .record_order(NewOrder::new(600, fixture.product).with_status("Pending"))
        .await?;

    let issues = ledger.validate_orders().await?;
    let flat: Vec<(i64, String)> = issues
        .iter()
        .map(|issue| (issue.order_id, issue.description()))
        .collect();

    assert_eq!(
        flat,
        vec![
            (second, "Missing product".to_string()),
            (third, "Missing customer".to_string()),
            (third, "Invalid status: Pending".to_string()),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_valid_refs_never_report_missing() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let mut orders = Vec::new();
    for i in 0..3 {
        let customer = ledger.create_customer(format!("Customer {}", i), None).await?;
        for j in 0..2 {
            let product = ledger
                .create_product(format!("Product {}-{}", i, j), None)
                .await?;
            orders.push(ledger.create_order(customer, product, None).await?);
        }
    }

    let issues = ledger.validate_orders().await?;
    assert!(issues.is_empty());
    assert_eq!(ledger.generate_report().await?.rows.len(), orders.len());

    Ok(())
}

#[tokio::test]
async fn test_demo_sequence() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let c1 = ledger
        .create_customer("Alice Martin".into(), Some("alice@example.com".into()))
        .await?;
    let c2 = ledger
        .create_customer("Test Customer".into(), Some("test@example.com".into()))
        .await?;
    let p1 = ledger
        .create_product("Market Data Feed".into(), Some("data_feed".into()))
        .await?;
    let p2 = ledger
        .create_product("Index Subscription".into(), Some("subscription".into()))
        .await?;
    let o1 = ledger.create_order(c1, p1, Some("Initial order".into())).await?;
    let o2 = ledger.create_order(c2, p2, Some("Subscription order".into())).await?;
    ledger.create_subscription(o2, 3).await?;
    ledger
        .update_order_status(o1, "Completed", Some("Provisioned successfully".into()))
        .await?;
    let bad = ledger
        .record_order(NewOrder::new(999, 999).with_status("UnknownStatus"))
        .await?;

    let issues = ledger.validate_orders().await?;
    let rendered: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            format!("({}, Missing customer)", bad),
            format!("({}, Missing product)", bad),
            format!("({}, Invalid status: UnknownStatus)", bad),
        ]
    );

    let lines = ledger.generate_report().await?.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1][1], "Alice Martin");
    assert_eq!(lines[1][4], "Completed");
    assert_eq!(lines[1][5], "Provisioned successfully");
    assert_eq!(lines[2][2], "Index Subscription");
    assert_eq!(lines[2][4], "Processing");

    Ok(())
}
