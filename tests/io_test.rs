mod common;

use anyhow::Result;
use common::{test_ledger, AliceFeed};
use ordledger::domain::NewOrder;
use ordledger::io::{Exporter, ImportOptions, Importer, LedgerSnapshot};

#[tokio::test]
async fn test_export_report_csv() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;
    ledger
        .update_order_status(fixture.order, "Completed", Some("a, b".into()))
        .await?;
    ledger.create_order(999, 999, None).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&ledger).export_report_csv(&mut buffer).await?;
    assert_eq!(count, 1);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "OrderID,Customer,Product,CreatedAt,Status,Comment");
    assert!(lines[1].starts_with("1,Alice,Feed,"));
    assert!(lines[1].ends_with(",Completed,\"a, b\""));

    Ok(())
}

#[tokio::test]
async fn test_export_report_json() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    AliceFeed::create(&ledger).await?;

    let mut buffer = Vec::new();
    Exporter::new(&ledger).export_report_json(&mut buffer).await?;

    let rows: serde_json::Value = serde_json::from_slice(&buffer)?;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["customer"], "Alice");
    assert_eq!(rows[0]["status"], "Processing");
    assert!(rows[0]["comment"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_export_issues_csv() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let id = ledger
        .record_order(NewOrder::new(999, 999).with_status("Bogus"))
        .await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&ledger).export_issues_csv(&mut buffer).await?;
    assert_eq!(count, 3);

    let csv = String::from_utf8(buffer)?;
    assert_eq!(
        csv,
        format!(
            "order_id,issue\n{id},Missing customer\n{id},Missing product\n{id},Invalid status: Bogus\n",
            id = id
        )
    );

    Ok(())
}

#[tokio::test]
async fn test_export_full_json() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;
    let sub = ledger.create_subscription(fixture.order, 2).await?;
    ledger.cancel_subscription(sub).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&ledger).export_full_json(&mut buffer).await?;
    assert_eq!(snapshot.customers.len(), 1);
    assert_eq!(snapshot.orders.len(), 1);

    let parsed: LedgerSnapshot = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed.products[0].product_type, "data_feed");
    assert_eq!(parsed.orders[0], snapshot.orders[0]);
    assert_eq!(parsed.subscriptions.len(), 1);
    assert!(!parsed.subscriptions[0].active);

    Ok(())
}

#[tokio::test]
async fn test_import_orders_keeps_status_and_refs() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fixture = AliceFeed::create(&ledger).await?;

    let csv = format!(
        "customer_id,product_id,status,comment,created_at\n\
         {c},{p},Completed,imported,2024-02-01T09:00:00+00:00\n\
         999,{p},Weird,,\n",
        c = fixture.customer,
        p = fixture.product
    );

    let result = Importer::new(&ledger)
        .import_orders_csv(csv.as_bytes(), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 2);
    assert!(result.errors.is_empty());

    let orders = ledger.list_orders().await?;
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[1].status, "Completed");
    assert_eq!(orders[1].comment.as_deref(), Some("imported"));
    assert_eq!(orders[1].created_at.to_rfc3339(), "2024-02-01T09:00:00+00:00");
    assert!(orders[2].comment.is_none());

    let issues = ledger.validate_orders().await?;
    let descriptions: Vec<String> = issues.iter().map(|i| i.description()).collect();
    assert_eq!(descriptions, vec!["Missing customer", "Invalid status: Weird"]);
    assert!(issues.iter().all(|i| i.order_id == orders[2].id));

    Ok(())
}

#[tokio::test]
async fn test_import_reports_bad_lines_and_continues() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let csv = "customer_id,product_id,status,comment\n\
               abc,1,Processing,\n\
               1,2,Processing,ok\n\
               1,2,Processing,,not-a-date\n";

    let result = Importer::new(&ledger)
        .import_orders_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].line, 2);
    assert_eq!(result.errors[0].field.as_deref(), Some("customer_id"));
    assert_eq!(result.errors[1].line, 4);
    assert_eq!(result.errors[1].field.as_deref(), Some("created_at"));
    assert_eq!(ledger.list_orders().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let csv = "customer_id,product_id,status,comment\n1,1,Processing,\n2,2,Failed,x\n";
    let result = Importer::new(&ledger)
        .import_orders_csv(csv.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 2);
    assert!(ledger.list_orders().await?.is_empty());

    Ok(())
}
