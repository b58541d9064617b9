//! # Register Facade
//!
//! The single entry point for every write. The register owns the writer
//! turn and the live-query engine; repositories stay plain data access.
//!
//! ## Single-Writer Discipline
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  caller ──► Register::commit_sale / add_product / ...         │
//! │                │                                              │
//! │                ▼  acquire turn (tokio Mutex)                  │
//! │          repository writes (one logical unit)                 │
//! │                │                                              │
//! │                ▼                                              │
//! │          publish ONE ChangeSet, awaited in-turn               │
//! │                │                                              │
//! │                ▼  release turn                                │
//! │          next writer proceeds                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Live subscribers therefore never observe the middle of a multi-table
//! operation: the sale-commit writes the ledger entry and every stock
//! decrement before its single publish runs.

use chrono::{Local, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use caja_core::checkout::{self, CheckoutRequest};
use caja_core::validation::{validate_name, validate_product_input};
use caja_core::{
    BusinessConfig, Cart, Category, DailyCash, Product, ProductInput, ReceiptPayload, Sale, Unit,
    User, ValidationError,
};

use crate::backup::Snapshot;
use crate::error::{StoreError, StoreResult};
use crate::live::{ChangeSet, LiveQuery, LiveQueryEngine, Table};
use crate::pool::Store;

// =============================================================================
// Commit Outcome
// =============================================================================

/// Result of a successful sale-commit: the appended ledger entry plus the
/// render-ready receipt payload.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub sale: Sale,
    pub receipt: ReceiptPayload,
}

// =============================================================================
// Register
// =============================================================================

/// The register: store handle, writer turn, live-query engine.
///
/// All mutation goes through methods on this type. Each method performs
/// one logical operation under the turn lock and publishes exactly one
/// changeset after its writes are committed.
pub struct Register {
    store: Store,
    live: LiveQueryEngine,
    turn: Mutex<()>,
}

impl Register {
    pub fn new(store: Store) -> Self {
        Register {
            store,
            live: LiveQueryEngine::new(),
            turn: Mutex::new(()),
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The local calendar day sales and cash records are keyed by.
    pub fn today() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    // -------------------------------------------------------------------------
    // Catalog Administration
    // -------------------------------------------------------------------------

    /// Validates and inserts a product.
    pub async fn add_product(&self, input: &ProductInput) -> StoreResult<Product> {
        validate_product_input(input)?;

        let _turn = self.turn.lock().await;
        let product = self.store.products().insert(input).await?;
        self.live.publish(&ChangeSet::single(Table::Products)).await;
        Ok(product)
    }

    /// Validates and updates a product in place.
    pub async fn update_product(&self, id: i64, input: &ProductInput) -> StoreResult<()> {
        validate_product_input(input)?;

        let _turn = self.turn.lock().await;
        self.store.products().update(id, input).await?;
        self.live.publish(&ChangeSet::single(Table::Products)).await;
        Ok(())
    }

    /// Deletes a product. Historical sales keep their line snapshots.
    pub async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let _turn = self.turn.lock().await;
        self.store.products().delete(id).await?;
        self.live.publish(&ChangeSet::single(Table::Products)).await;
        Ok(())
    }

    pub async fn add_category(&self, name: &str) -> StoreResult<Category> {
        validate_name("category", name)?;

        let _turn = self.turn.lock().await;
        let category = self.store.catalog().insert_category(name.trim()).await?;
        self.live
            .publish(&ChangeSet::single(Table::Categories))
            .await;
        Ok(category)
    }

    pub async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let _turn = self.turn.lock().await;
        self.store.catalog().delete_category(id).await?;
        self.live
            .publish(&ChangeSet::single(Table::Categories))
            .await;
        Ok(())
    }

    pub async fn add_unit(&self, name: &str) -> StoreResult<Unit> {
        validate_name("unit", name)?;

        let _turn = self.turn.lock().await;
        let unit = self.store.catalog().insert_unit(name.trim()).await?;
        self.live.publish(&ChangeSet::single(Table::Units)).await;
        Ok(unit)
    }

    pub async fn delete_unit(&self, id: i64) -> StoreResult<()> {
        let _turn = self.turn.lock().await;
        self.store.catalog().delete_unit(id).await?;
        self.live.publish(&ChangeSet::single(Table::Units)).await;
        Ok(())
    }

    pub async fn add_user(&self, name: &str) -> StoreResult<User> {
        validate_name("user", name)?;

        let _turn = self.turn.lock().await;
        let user = self.store.users().insert(name.trim()).await?;
        self.live.publish(&ChangeSet::single(Table::Users)).await;
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let _turn = self.turn.lock().await;
        self.store.users().delete(id).await?;
        self.live.publish(&ChangeSet::single(Table::Users)).await;
        Ok(())
    }

    /// Replaces the business configuration singleton.
    pub async fn set_config(&self, config: &BusinessConfig) -> StoreResult<()> {
        validate_name("business name", &config.name)?;

        let _turn = self.turn.lock().await;
        self.store.config().set(config).await?;
        self.live.publish(&ChangeSet::single(Table::Config)).await;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sale Commit
    // -------------------------------------------------------------------------

    /// Runs the full commit state machine over the session cart.
    ///
    /// Validating and Computing Totals happen before the turn is taken;
    /// a rejection therefore touches no state at all. On success the
    /// ledger entry is appended first, then each cataloged line's stock
    /// is decremented, then the cart is cleared and a single changeset
    /// covering sales and products is published.
    ///
    /// The two persistence steps are not one transaction: a crash after
    /// the append leaves stock undecremented, detectable by reconciling
    /// stock against the ledger. There is no automatic compensation.
    pub async fn commit_sale(
        &self,
        cart: &mut Cart,
        request: &CheckoutRequest,
    ) -> StoreResult<CommitOutcome> {
        checkout::validate(cart, request)?;
        let totals = checkout::compute_totals(cart, request)?;

        let _turn = self.turn.lock().await;

        let now = Utc::now();
        let sale = Sale {
            id: 0,
            document_type: request.document_type,
            document_number: checkout::document_number(request.document_type, now),
            created_at: now,
            day: Self::today(),
            vendor: request.vendor.trim().to_string(),
            client_tax_id: request.client_tax_id.clone(),
            lines: cart.items.iter().map(|i| i.to_sale_line()).collect(),
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            payment_cents: totals.payment_cents,
            change_cents: totals.change_cents,
        };

        let committed = self.store.sales().append(&sale).await?;

        // Step two of the commit: decrement stock per cataloged line. A
        // product deleted between add-to-cart and commit is skipped; the
        // sale itself stands.
        for line in &committed.lines {
            if let Some(product_id) = line.product_id {
                match self
                    .store
                    .products()
                    .adjust_stock(product_id, -line.quantity)
                    .await
                {
                    Ok(()) => {}
                    Err(StoreError::NotFound { .. }) => {
                        warn!(product_id, "Stock adjustment skipped, product missing");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        cart.clear();

        let config = self.store.config().get().await?.unwrap_or_default();
        let receipt = ReceiptPayload::assemble(&committed, &config);

        info!(
            document_number = %committed.document_number,
            total_cents = committed.total_cents,
            lines = committed.lines.len(),
            "Sale committed"
        );

        self.live
            .publish(&ChangeSet::of(&[Table::Sales, Table::Products]))
            .await;

        Ok(CommitOutcome {
            sale: committed,
            receipt,
        })
    }

    // -------------------------------------------------------------------------
    // Cash Reconciliation
    // -------------------------------------------------------------------------

    /// Records the opening float for a day; re-entering overwrites.
    pub async fn set_opening_amount(&self, day: &str, opening_cents: i64) -> StoreResult<DailyCash> {
        if opening_cents < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: "opening amount".to_string(),
            }
            .into());
        }

        let _turn = self.turn.lock().await;
        let cash = self.store.cash().set_opening(day, opening_cents).await?;
        self.live
            .publish(&ChangeSet::single(Table::DailyCash))
            .await;
        Ok(cash)
    }

    /// Expected drawer total for a day: opening float plus the day's
    /// sales sum. Derived on every call, never stored.
    pub async fn drawer_total(&self, day: &str) -> StoreResult<i64> {
        let opening = self
            .store
            .cash()
            .opening(day)
            .await?
            .map(|c| c.opening_cents)
            .unwrap_or(0);
        let sales = self.store.sales().total_for_day(day).await?;
        Ok(opening + sales)
    }

    // -------------------------------------------------------------------------
    // Live Views
    // -------------------------------------------------------------------------
    //
    // Registration takes the writer turn: the initial computation and the
    // subscription insert happen with no publish in between, so a view is
    // never stale from birth.

    /// Live catalog, ordered by name.
    pub async fn live_products(&self) -> StoreResult<LiveQuery<Vec<Product>>> {
        let _turn = self.turn.lock().await;
        let store = self.store.clone();
        self.live
            .register(&[Table::Products], move || {
                let store = store.clone();
                async move { store.products().list().await }
            })
            .await
    }

    /// Live ledger slice for one day, oldest first.
    pub async fn live_sales_for_day(&self, day: &str) -> StoreResult<LiveQuery<Vec<Sale>>> {
        let _turn = self.turn.lock().await;
        let store = self.store.clone();
        let day = day.to_string();
        self.live
            .register(&[Table::Sales], move || {
                let store = store.clone();
                let day = day.clone();
                async move { store.sales().list_for_day(&day).await }
            })
            .await
    }

    /// Live sum of a day's sale totals.
    pub async fn live_day_total(&self, day: &str) -> StoreResult<LiveQuery<i64>> {
        let _turn = self.turn.lock().await;
        let store = self.store.clone();
        let day = day.to_string();
        self.live
            .register(&[Table::Sales], move || {
                let store = store.clone();
                let day = day.clone();
                async move { store.sales().total_for_day(&day).await }
            })
            .await
    }

    /// Live expected drawer total (opening float + day's sales).
    pub async fn live_drawer_total(&self, day: &str) -> StoreResult<LiveQuery<i64>> {
        let _turn = self.turn.lock().await;
        let store = self.store.clone();
        let day = day.to_string();
        self.live
            .register(&[Table::Sales, Table::DailyCash], move || {
                let store = store.clone();
                let day = day.clone();
                async move {
                    let opening = store
                        .cash()
                        .opening(&day)
                        .await?
                        .map(|c| c.opening_cents)
                        .unwrap_or(0);
                    let sales = store.sales().total_for_day(&day).await?;
                    Ok(opening + sales)
                }
            })
            .await
    }

    // -------------------------------------------------------------------------
    // Backup
    // -------------------------------------------------------------------------

    /// Exports every table into a snapshot.
    pub async fn export(&self) -> StoreResult<Snapshot> {
        let _turn = self.turn.lock().await;

        let snapshot = Snapshot {
            exported_at: Utc::now(),
            products: self.store.products().list().await?,
            categories: self.store.catalog().list_categories().await?,
            units: self.store.catalog().list_units().await?,
            users: self.store.users().list().await?,
            sales: self.store.sales().list().await?,
            config: self.store.config().get().await?,
            daily_cash: self.store.cash().list().await?,
        };

        info!(records = snapshot.record_count(), "Store exported");
        Ok(snapshot)
    }

    /// Imports a snapshot by merging every record under its id. Existing
    /// records not present in the snapshot are left untouched; nothing is
    /// ever deleted by an import.
    pub async fn import(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let _turn = self.turn.lock().await;

        for product in &snapshot.products {
            self.store.products().upsert(product).await?;
        }
        for category in &snapshot.categories {
            self.store.catalog().upsert_category(category).await?;
        }
        for unit in &snapshot.units {
            self.store.catalog().upsert_unit(unit).await?;
        }
        for user in &snapshot.users {
            self.store.users().upsert(user).await?;
        }
        for sale in &snapshot.sales {
            self.store.sales().upsert(sale).await?;
        }
        if let Some(config) = &snapshot.config {
            self.store.config().set(config).await?;
        }
        for cash in &snapshot.daily_cash {
            self.store
                .cash()
                .set_opening(&cash.day, cash.opening_cents)
                .await?;
        }

        info!(records = snapshot.record_count(), "Snapshot imported");

        self.live.publish(&ChangeSet::all()).await;
        Ok(())
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::StoreConfig;
    use caja_core::{CheckoutError, DocumentType};

    async fn register() -> Register {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        Register::new(store)
    }

    fn input(name: &str, price_cents: i64, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price_cents,
            category: "Abarrotes".to_string(),
            unit: "und".to_string(),
            image: None,
            stock,
        }
    }

    async fn seeded_cart(reg: &Register) -> (Cart, Product, Product) {
        let arroz = reg.add_product(&input("Arroz Extra", 450, 10)).await.unwrap();
        let aceite = reg.add_product(&input("Aceite Primor", 1100, 5)).await.unwrap();

        let mut cart = Cart::new();
        cart.add_product(&arroz, 2);
        cart.add_product(&aceite, 1);
        (cart, arroz, aceite)
    }

    #[tokio::test]
    async fn test_commit_sale_reference_scenario() {
        let reg = register().await;
        let (mut cart, arroz, aceite) = seeded_cart(&reg).await;
        let gaseosa = reg.add_product(&input("Gaseosa", 850, 30)).await.unwrap();

        let mut req = CheckoutRequest::boleta("Turno Mañana");
        req.discount_cents = 100;
        req.payment_cents = Some(2500);

        let outcome = reg.commit_sale(&mut cart, &req).await.unwrap();

        assert_eq!(outcome.sale.subtotal_cents, 2000);
        assert_eq!(outcome.sale.total_cents, 1900);
        assert_eq!(outcome.sale.change_cents, 600);
        assert!(outcome.sale.document_number.starts_with("B001-"));
        assert!(cart.is_empty());

        // Stock decremented per line; products not in the cart untouched.
        let arroz = reg.store().products().get(arroz.id).await.unwrap().unwrap();
        let aceite = reg.store().products().get(aceite.id).await.unwrap().unwrap();
        let gaseosa = reg.store().products().get(gaseosa.id).await.unwrap().unwrap();
        assert_eq!(arroz.stock, 8);
        assert_eq!(aceite.stock, 4);
        assert_eq!(gaseosa.stock, 30);

        // The ledger entry is visible under today's day key.
        let today = Register::today();
        let sales = reg.store().sales().list_for_day(&today).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_commit_touches_nothing() {
        let reg = register().await;
        let (mut cart, arroz, _) = seeded_cart(&reg).await;

        // Underpayment.
        let mut req = CheckoutRequest::boleta("Admin");
        req.payment_cents = Some(500);
        let err = reg.commit_sale(&mut cart, &req).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(caja_core::CoreError::Checkout(
                CheckoutError::InsufficientPayment { .. }
            ))
        ));

        // Factura without a valid tax id.
        let mut req = CheckoutRequest::boleta("Admin");
        req.document_type = DocumentType::Factura;
        assert!(reg.commit_sale(&mut cart, &req).await.is_err());

        // No ledger entry, no stock movement, cart intact.
        assert_eq!(reg.store().sales().count().await.unwrap(), 0);
        let arroz = reg.store().products().get(arroz.id).await.unwrap().unwrap();
        assert_eq!(arroz.stock, 10);
        assert_eq!(cart.line_count(), 2);
    }

    #[tokio::test]
    async fn test_commit_with_unspecified_payment() {
        let reg = register().await;
        let (mut cart, _, _) = seeded_cart(&reg).await;

        let req = CheckoutRequest::boleta("Admin");
        let outcome = reg.commit_sale(&mut cart, &req).await.unwrap();
        assert_eq!(outcome.sale.payment_cents, 0);
        assert_eq!(outcome.sale.change_cents, 0);
        assert_eq!(outcome.sale.total_cents, 2000);
    }

    #[tokio::test]
    async fn test_receipt_uses_business_config() {
        let reg = register().await;
        reg.set_config(&BusinessConfig {
            name: "INVERSIONES CIELO Y DYLAN".to_string(),
            tax_id: "20602953638".to_string(),
            address: "Imperial, Cañete".to_string(),
            phone: "918944885".to_string(),
        })
        .await
        .unwrap();

        let (mut cart, _, _) = seeded_cart(&reg).await;
        let req = CheckoutRequest::boleta("Admin");
        let outcome = reg.commit_sale(&mut cart, &req).await.unwrap();

        assert_eq!(outcome.receipt.business_tax_id, "20602953638");
        assert!(outcome.receipt.qr_payload.starts_with("20602953638|BOLETA|"));
    }

    #[tokio::test]
    async fn test_drawer_total_is_opening_plus_sales() {
        let reg = register().await;
        let today = Register::today();

        reg.set_opening_amount(&today, 5000).await.unwrap();

        let producto = reg.add_product(&input("Gaseosa", 12000, 3)).await.unwrap();
        let mut cart = Cart::new();
        cart.add_product(&producto, 1);
        reg.commit_sale(&mut cart, &CheckoutRequest::boleta("Admin"))
            .await
            .unwrap();

        assert_eq!(reg.drawer_total(&today).await.unwrap(), 17000);

        // Re-entering the opening overwrites; no second record, new total.
        reg.set_opening_amount(&today, 6000).await.unwrap();
        assert_eq!(reg.drawer_total(&today).await.unwrap(), 18000);
        assert_eq!(reg.store().cash().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_opening_amount_rejects_negative() {
        let reg = register().await;
        assert!(reg.set_opening_amount("2024-01-10", -1).await.is_err());
    }

    #[tokio::test]
    async fn test_live_views_update_once_per_commit() {
        let reg = register().await;
        let today = Register::today();
        let (mut cart, _, _) = seeded_cart(&reg).await;

        let day_total = reg.live_day_total(&today).await.unwrap();
        let drawer = reg.live_drawer_total(&today).await.unwrap();
        assert_eq!(day_total.current(), 0);

        reg.set_opening_amount(&today, 5000).await.unwrap();
        assert_eq!(drawer.current(), 5000);

        reg.commit_sale(&mut cart, &CheckoutRequest::boleta("Admin"))
            .await
            .unwrap();

        // Both views already reflect the committed sale.
        assert_eq!(day_total.current(), 2000);
        assert_eq!(drawer.current(), 7000);
    }

    #[tokio::test]
    async fn test_live_view_is_fresh_at_registration() {
        let reg = register().await;
        let today = Register::today();
        let (mut cart, _, _) = seeded_cart(&reg).await;

        reg.commit_sale(&mut cart, &CheckoutRequest::boleta("Admin"))
            .await
            .unwrap();

        // A view registered after the commit starts at the committed
        // state; no publish is needed to catch it up.
        let day_total = reg.live_day_total(&today).await.unwrap();
        assert_eq!(day_total.current(), 2000);
    }

    #[tokio::test]
    async fn test_live_products_see_catalog_changes() {
        let reg = register().await;
        let view = reg.live_products().await.unwrap();
        assert!(view.current().is_empty());

        reg.add_product(&input("Arroz", 450, 10)).await.unwrap();
        assert_eq!(view.current().len(), 1);
        assert_eq!(view.current()[0].name, "Arroz");
    }

    #[tokio::test]
    async fn test_import_merges_without_deleting() {
        let reg = register().await;
        let original = reg.add_product(&input("Arroz", 450, 10)).await.unwrap();

        let snapshot = reg.export().await.unwrap();

        // Local edits after the export.
        let mut edited = input("Arroz Premium", 500, 10);
        edited.stock = 7;
        reg.update_product(original.id, &edited).await.unwrap();
        let later = reg.add_product(&input("Aceite", 1100, 5)).await.unwrap();

        reg.import(&snapshot).await.unwrap();

        // The snapshot's version wins per id; the newer record survives.
        let restored = reg.store().products().get(original.id).await.unwrap().unwrap();
        assert_eq!(restored.name, "Arroz");
        assert_eq!(restored.stock, 10);
        assert!(reg.store().products().get(later.id).await.unwrap().is_some());

        // Importing the same snapshot again changes nothing.
        reg.import(&snapshot).await.unwrap();
        let after = reg.export().await.unwrap();
        assert_eq!(after.products.len(), 2);
        assert_eq!(
            reg.store().products().get(original.id).await.unwrap().unwrap(),
            restored
        );
    }

    #[tokio::test]
    async fn test_catalog_validation_rejects_bad_input() {
        let reg = register().await;

        assert!(reg.add_product(&input("", 450, 1)).await.is_err());
        assert!(reg.add_product(&input("Arroz", -1, 1)).await.is_err());
        assert!(reg.add_category("   ").await.is_err());
        assert_eq!(reg.store().products().count().await.unwrap(), 0);
    }
}
