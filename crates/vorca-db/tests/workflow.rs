//! End-to-end flows through the public `Database` API.

use tempfile::TempDir;
use vorca_core::{
    AdjustmentReason, AdjustmentRequest, CartLine, CheckoutRequest, ErrorKind, Money, NewLocation,
    NewProduct, PaymentMethod, Principal, Role, TransferLine, TransferRequest, TransferStatus,
};
use vorca_db::{Database, DbConfig};

fn manager() -> Principal {
    Principal::new("manager-1", Role::Manager)
}

#[tokio::test]
async fn stock_sell_transfer_and_reconcile() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("flow.db")))
        .await
        .unwrap();
    let owner = Principal::new("owner-1", Role::Owner);

    let kmg = db
        .locations()
        .create(&owner, &NewLocation { name: "Kemang".into(), code: "KMG".into() })
        .await
        .unwrap();
    let stb = db
        .locations()
        .create(&owner, &NewLocation { name: "Setiabudi".into(), code: "STB".into() })
        .await
        .unwrap();
    let americano = db
        .products()
        .create(
            &manager(),
            &NewProduct {
                sku: "BN-AM-001".into(),
                name: "Americano".into(),
                description: Some("Double shot".into()),
                barcode: None,
                price: Money::from_minor(28_000),
                cost: Some(Money::from_minor(9_000)),
                location_id: kmg.id.clone(),
            },
        )
        .await
        .unwrap();

    db.inventory()
        .adjust(
            &manager(),
            &AdjustmentRequest {
                product_id: americano.id.clone(),
                location_id: kmg.id.clone(),
                quantity: 30,
                reason: AdjustmentReason::StockTake,
                notes: Some("Opening count".into()),
            },
        )
        .await
        .unwrap();

    let sale = db
        .sales()
        .checkout(
            &Principal::new("cashier-1", Role::Cashier),
            &CheckoutRequest {
                location_id: kmg.id.clone(),
                items: vec![CartLine {
                    product_id: americano.id.clone(),
                    quantity: 2,
                    unit_price: Money::from_minor(28_000),
                }],
                discount: Money::from_minor(2_160),
                payment_method: PaymentMethod::Debit,
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.sale.total.minor(), 60_000);

    let transfer = db
        .transfers()
        .request(
            &manager(),
            &TransferRequest {
                from_location_id: kmg.id.clone(),
                to_location_id: stb.id.clone(),
                items: vec![TransferLine {
                    product_id: americano.id.clone(),
                    quantity: 10,
                }],
            },
        )
        .await
        .unwrap();
    let id = transfer.transfer.id;

    let err = db.transfers().complete(&manager(), &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    db.transfers().approve(&manager(), &id).await.unwrap();
    let done = db.transfers().complete(&manager(), &id).await.unwrap();
    assert_eq!(done.transfer.status, TransferStatus::Completed);

    let source = db.inventory().reconcile(&americano.id, &kmg.id).await.unwrap();
    assert_eq!(source.quantity, 18);
    assert_eq!(source.adjustment_count, 3);
    assert!(source.is_consistent());

    let destination = db.inventory().reconcile(&americano.id, &stb.id).await.unwrap();
    assert_eq!(destination.quantity, 10);
    assert!(destination.is_consistent());

    // Renaming the product leaves the sale line snapshot alone
    db.products()
        .update(
            &manager(),
            &americano.id,
            &vorca_core::ProductPatch {
                name: Some("Americano Large".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let fetched = db.sales().get_by_id(&sale.sale.id).await.unwrap().unwrap();
    assert_eq!(fetched.items[0].name_snapshot, "Americano");

    // Referenced by a sale, so the product stays
    let err = db.products().delete(&manager(), &americano.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(db.products().get_by_id(&americano.id).await.unwrap().is_some());

    let low = db.inventory().low_stock(Some(&kmg.id)).await.unwrap();
    assert!(low.is_empty());
}
