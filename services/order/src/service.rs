//! Order placement saga and the enriched read path

use crate::models::{Order, OrderLine, OrderLineRequest};
use crate::publisher::EventPublisher;
use crate::repository::OrderStore;
use crate::simulator;
use account::client::AccountsApi;
use account::models::Account;
use catalog::client::CatalogApi;
use catalog::models::Product;
use chrono::Utc;
use common::error::{ServiceError, ServiceResult};
use common::events::EmailJob;
use common::id;
use std::collections::{HashMap, HashSet};
use tracing::{error, info, warn};

pub struct OrderService<A, C, S, P> {
    accounts: A,
    catalog: C,
    store: S,
    publisher: P,
}

impl<A, C, S, P> OrderService<A, C, S, P>
where
    A: AccountsApi,
    C: CatalogApi,
    S: OrderStore,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(accounts: A, catalog: C, store: S, publisher: P) -> Self {
        Self {
            accounts,
            catalog,
            store,
            publisher,
        }
    }

    /// Run the placement saga
    ///
    /// Steps are strictly ordered: validate account, resolve products,
    /// reserve stock, persist, publish the confirmation email, schedule the
    /// status stream. Stock reservation is the non-idempotent step; any
    /// failure after it re-increments the already-reserved lines before the
    /// error is returned.
    pub async fn place_order(
        &self,
        account_id: &str,
        requested: &[OrderLineRequest],
    ) -> ServiceResult<Order> {
        // Step 1: the account must exist
        let account = match self.accounts.get(account_id).await {
            Ok(account) => account,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::NotFound("account not found".to_string()));
            }
            Err(other) => return Err(other),
        };

        // Step 2: resolve the requested products in one batch; ids the
        // catalog does not know are silently dropped
        let ids: Vec<String> = requested.iter().map(|l| l.product_id.clone()).collect();
        if ids.is_empty() {
            return Err(ServiceError::Validation("product list is empty".to_string()));
        }
        let products = self.catalog.list(0, 0, Some(&ids), None).await?;

        // Step 3: reserve stock line by line
        let reserved = self.reserve_lines(requested, &products).await?;
        if reserved.is_empty() {
            return Err(ServiceError::NoLinesAccepted(
                "no order lines could be fulfilled".to_string(),
            ));
        }

        // Step 4: persist, compensating the reservations on failure
        let order = Order {
            id: id::generate(),
            created_at: Utc::now(),
            account_id: account_id.to_string(),
            total_price: reserved
                .iter()
                .map(|l| l.price * f64::from(l.quantity))
                .sum(),
            products: reserved,
        };
        if let Err(e) = self.store.create(&order).await {
            error!("order persist failed, rolling back reservations: {}", e);
            self.compensate(&order.products).await;
            return Err(e);
        }
        info!(
            "order {} saved for account {} (total {:.2})",
            order.id, order.account_id, order.total_price
        );

        // Step 5: confirmation email, best-effort
        let job = confirmation_email(&account, &order);
        if let Err(e) = self.publisher.publish_email(&job).await {
            error!("failed to publish confirmation email for {}: {}", order.id, e);
        }

        // Step 6: the status stream outlives this request
        simulator::spawn(self.publisher.clone(), order.id.clone());

        Ok(order)
    }

    /// Reserve stock for every satisfiable line
    ///
    /// Lines whose quantity exceeds the available stock are dropped. A
    /// catalog failure mid-loop rolls back the lines already reserved.
    async fn reserve_lines(
        &self,
        requested: &[OrderLineRequest],
        products: &[Product],
    ) -> ServiceResult<Vec<OrderLine>> {
        let mut reserved = Vec::new();

        for product in products {
            let Some(request) = requested.iter().find(|l| l.product_id == product.id) else {
                continue;
            };
            if request.quantity == 0 || i64::from(request.quantity) > i64::from(product.stock) {
                warn!(
                    "dropping line for product {}: requested {} with stock {}",
                    product.id, request.quantity, product.stock
                );
                continue;
            }

            match self
                .catalog
                .update_stock_and_sold(&product.id, request.quantity as i32)
                .await
            {
                Ok(true) => reserved.push(OrderLine {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    description: product.description.clone(),
                    price: product.price,
                    quantity: request.quantity,
                    stock: product.stock,
                }),
                Ok(false) => {
                    // lost a race against another order; treat like short stock
                    warn!("reservation rejected for product {}", product.id);
                }
                Err(e) => {
                    error!("reservation failed mid-saga, compensating: {}", e);
                    self.compensate(&reserved).await;
                    return Err(e);
                }
            }
        }

        Ok(reserved)
    }

    /// Hand reserved stock back after a failure
    async fn compensate(&self, reserved: &[OrderLine]) {
        for line in reserved {
            let quantity = -(line.quantity as i32);
            if let Err(e) = self
                .catalog
                .update_stock_and_sold(&line.product_id, quantity)
                .await
            {
                error!(
                    "compensation failed for product {} (qty {}): {}",
                    line.product_id, line.quantity, e
                );
            }
        }
    }

    /// Orders for an account, lines enriched with current catalog metadata
    pub async fn orders_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>> {
        let mut orders = self.store.list_for_account(account_id).await?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let unique: HashSet<String> = orders
            .iter()
            .flat_map(|o| o.products.iter().map(|l| l.product_id.clone()))
            .collect();
        let ids: Vec<String> = unique.into_iter().collect();

        let products = self.catalog.list(0, 0, Some(&ids), None).await?;
        let by_id: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        for order in &mut orders {
            for line in &mut order.products {
                if let Some(product) = by_id.get(line.product_id.as_str()) {
                    line.name = product.name.clone();
                    line.description = product.description.clone();
                    line.price = product.price;
                    line.stock = product.stock;
                }
            }
        }

        info!("returning {} orders for account {}", orders.len(), account_id);
        Ok(orders)
    }
}

fn confirmation_email(account: &Account, order: &Order) -> EmailJob {
    let items: Vec<String> = order
        .products
        .iter()
        .map(|l| format!("- {} x{} (${:.2})", l.name, l.quantity, l.price))
        .collect();

    let mut data = HashMap::new();
    data.insert("Name".to_string(), account.name.clone());
    data.insert("Email".to_string(), account.email.clone());
    data.insert("Order".to_string(), order.id.clone());
    data.insert("Total".to_string(), format!("${:.2}", order.total_price));
    data.insert("Items".to_string(), items.join("\n"));

    EmailJob {
        to: account.email.clone(),
        subject: "Order Confirmation".to_string(),
        template_name: "order_confirmation".to_string(),
        template_data: data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account::models::{AccountWithHash, NewAccount};
    use async_trait::async_trait;
    use catalog::models::NewProduct;
    use common::events::OrderStatusUpdate;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct FakeAccounts {
        rows: Arc<Mutex<HashMap<String, Account>>>,
    }

    impl FakeAccounts {
        async fn insert(&self, name: &str, email: &str) -> String {
            let id = id::generate();
            self.rows.lock().await.insert(
                id.clone(),
                Account {
                    id: id.clone(),
                    name: name.to_string(),
                    email: email.to_string(),
                    role: "user".to_string(),
                    token_version: 1,
                    is_active: true,
                },
            );
            id
        }
    }

    #[async_trait]
    impl AccountsApi for FakeAccounts {
        async fn create(&self, _new_account: &NewAccount) -> ServiceResult<Account> {
            unimplemented!("not exercised by the order service")
        }

        async fn get(&self, id: &str) -> ServiceResult<Account> {
            self.rows
                .lock()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound("account not found".to_string()))
        }

        async fn list(&self, _skip: u64, _take: u64) -> ServiceResult<Vec<Account>> {
            unimplemented!("not exercised by the order service")
        }

        async fn get_for_auth(&self, _email: &str) -> ServiceResult<AccountWithHash> {
            unimplemented!("not exercised by the order service")
        }

        async fn increment_token_version(&self, _id: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn update_password(&self, _email: &str, _password: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn deactivate(&self, _id: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn reactivate(&self, _id: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn delete(&self, _id: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }
    }

    /// In-memory catalog applying the same guarded update as the SQL
    #[derive(Clone, Default)]
    struct FakeCatalog {
        rows: Arc<Mutex<HashMap<String, Product>>>,
        fail_after: Arc<Mutex<Option<usize>>>,
        updates: Arc<Mutex<usize>>,
    }

    impl FakeCatalog {
        async fn insert(&self, name: &str, price: f64, stock: i32) -> String {
            let product = Product {
                id: id::generate(),
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                stock,
                sold: 0,
                out_of_stock: stock <= 0,
            };
            let id = product.id.clone();
            self.rows.lock().await.insert(id.clone(), product);
            id
        }

        async fn product(&self, id: &str) -> Product {
            self.rows.lock().await.get(id).unwrap().clone()
        }

        /// Make the nth stock update fail with an upstream error
        async fn fail_on_update(&self, nth: usize) {
            *self.fail_after.lock().await = Some(nth);
        }
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn create(&self, _new_product: &NewProduct) -> ServiceResult<Product> {
            unimplemented!("not exercised by the order service")
        }

        async fn get(&self, id: &str) -> ServiceResult<Product> {
            self.rows
                .lock()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound("product not found".to_string()))
        }

        async fn list(
            &self,
            _skip: u64,
            _take: u64,
            ids: Option<&[String]>,
            _query: Option<&str>,
        ) -> ServiceResult<Vec<Product>> {
            let rows = self.rows.lock().await;
            let ids = ids.unwrap_or_default();
            let mut found: Vec<Product> = ids
                .iter()
                .filter_map(|id| rows.get(id).cloned())
                .collect();
            found.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(found)
        }

        async fn update_stock_and_sold(&self, id: &str, quantity: i32) -> ServiceResult<bool> {
            {
                let mut count = self.updates.lock().await;
                *count += 1;
                if let Some(nth) = *self.fail_after.lock().await {
                    if *count == nth {
                        return Err(ServiceError::Upstream("catalog unavailable".to_string()));
                    }
                }
            }

            let mut rows = self.rows.lock().await;
            let product = rows
                .get_mut(id)
                .ok_or_else(|| ServiceError::NotFound("product not found".to_string()))?;
            if product.stock < quantity {
                return Ok(false);
            }
            product.stock -= quantity;
            product.sold += quantity;
            product.out_of_stock = product.stock <= 0;
            Ok(true)
        }

        async fn delete(&self, _id: &str) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn restock(&self, _id: &str, _new_stock: i32) -> ServiceResult<()> {
            unimplemented!("not exercised by the order service")
        }

        async fn suggest(
            &self,
            _prefix: &str,
            _size: Option<u64>,
            _use_ai: bool,
        ) -> ServiceResult<Vec<Product>> {
            unimplemented!("not exercised by the order service")
        }
    }

    #[derive(Clone, Default)]
    struct FakeStore {
        orders: Arc<Mutex<Vec<Order>>>,
        fail: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl OrderStore for FakeStore {
        async fn create(&self, order: &Order) -> ServiceResult<()> {
            if *self.fail.lock().await {
                return Err(ServiceError::Upstream("insert failed".to_string()));
            }
            self.orders.lock().await.push(order.clone());
            Ok(())
        }

        async fn list_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .await
                .iter()
                .filter(|o| o.account_id == account_id)
                .cloned()
                .map(|mut o| {
                    // the real store only keeps ids and quantities
                    for line in &mut o.products {
                        line.name = String::new();
                        line.description = String::new();
                        line.price = 0.0;
                        line.stock = 0;
                    }
                    o
                })
                .collect())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        emails: Arc<Mutex<Vec<EmailJob>>>,
        statuses: Arc<Mutex<Vec<OrderStatusUpdate>>>,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish_email(&self, job: &EmailJob) -> ServiceResult<()> {
            self.emails.lock().await.push(job.clone());
            Ok(())
        }

        async fn publish_status(&self, update: &OrderStatusUpdate) -> ServiceResult<()> {
            self.statuses.lock().await.push(update.clone());
            Ok(())
        }
    }

    type TestService = OrderService<FakeAccounts, FakeCatalog, FakeStore, RecordingPublisher>;

    fn service() -> (TestService, FakeAccounts, FakeCatalog, FakeStore, RecordingPublisher) {
        let accounts = FakeAccounts::default();
        let catalog = FakeCatalog::default();
        let store = FakeStore::default();
        let publisher = RecordingPublisher::default();
        (
            OrderService::new(
                accounts.clone(),
                catalog.clone(),
                store.clone(),
                publisher.clone(),
            ),
            accounts,
            catalog,
            store,
            publisher,
        )
    }

    fn line(product_id: &str, quantity: u32) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn happy_path_decrements_stock_and_totals_correctly() {
        let (svc, accounts, catalog, store, publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Keyboard", 5.0, 10).await;

        let order = svc.place_order(&alice, &[line(&p, 3)]).await.unwrap();

        assert!((order.total_price - 15.0).abs() < 1e-6);
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].quantity, 3);
        assert_eq!(order.products[0].stock, 10);

        let after = catalog.product(&p).await;
        assert_eq!(after.stock, 7);
        assert_eq!(after.sold, 3);
        assert!(!after.out_of_stock);

        assert_eq!(store.orders.lock().await.len(), 1);

        let emails = publisher.emails.lock().await;
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "a@x.com");
        assert_eq!(emails[0].template_name, "order_confirmation");
    }

    #[tokio::test(start_paused = true)]
    async fn draining_stock_flags_out_of_stock() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Mouse", 2.5, 4).await;

        svc.place_order(&alice, &[line(&p, 4)]).await.unwrap();

        let after = catalog.product(&p).await;
        assert_eq!(after.stock, 0);
        assert!(after.out_of_stock);
    }

    #[tokio::test(start_paused = true)]
    async fn unsatisfiable_lines_yield_no_lines_accepted() {
        let (svc, accounts, catalog, store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p1 = catalog.insert("Desk", 100.0, 2).await;
        let p2 = catalog.insert("Chair", 50.0, 0).await;

        let result = svc
            .place_order(&alice, &[line(&p1, 5), line(&p2, 1)])
            .await;
        assert!(matches!(result, Err(ServiceError::NoLinesAccepted(_))));

        // nothing persisted, nothing reserved
        assert!(store.orders.lock().await.is_empty());
        assert_eq!(catalog.product(&p1).await.stock, 2);
        assert_eq!(catalog.product(&p2).await.stock, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn short_stock_lines_are_dropped_but_order_proceeds() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p1 = catalog.insert("Desk", 100.0, 2).await;
        let p2 = catalog.insert("Lamp", 20.0, 10).await;

        let order = svc
            .place_order(&alice, &[line(&p1, 5), line(&p2, 2)])
            .await
            .unwrap();

        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].product_id, p2);
        assert!((order.total_price - 40.0).abs() < 1e-6);
        assert_eq!(catalog.product(&p1).await.stock, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_product_ids_are_silently_dropped() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Lamp", 20.0, 10).await;

        let order = svc
            .place_order(&alice, &[line(&p, 1), line("nonexistent-product-id-00000", 2)])
            .await
            .unwrap();

        assert_eq!(order.products.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_account_fails_before_any_reservation() {
        let (svc, _accounts, catalog, _store, _publisher) = service();
        let p = catalog.insert("Lamp", 20.0, 10).await;

        let result = svc
            .place_order("missing-account-id-0000000", &[line(&p, 1)])
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert_eq!(catalog.product(&p).await.stock, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn persist_failure_hands_reserved_stock_back() {
        let (svc, accounts, catalog, store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Lamp", 20.0, 10).await;
        *store.fail.lock().await = true;

        let result = svc.place_order(&alice, &[line(&p, 4)]).await;
        assert!(matches!(result, Err(ServiceError::Upstream(_))));

        let after = catalog.product(&p).await;
        assert_eq!(after.stock, 10);
        assert_eq!(after.sold, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn mid_loop_catalog_failure_compensates_earlier_lines() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p1 = catalog.insert("Desk", 100.0, 5).await;
        let p2 = catalog.insert("Lamp", 20.0, 5).await;
        // first reservation succeeds, second blows up, compensation is the third
        catalog.fail_on_update(2).await;

        let result = svc
            .place_order(&alice, &[line(&p1, 2), line(&p2, 2)])
            .await;
        assert!(matches!(result, Err(ServiceError::Upstream(_))));

        assert_eq!(catalog.product(&p1).await.stock, 5);
        assert_eq!(catalog.product(&p2).await.stock, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stock_is_conserved_across_many_orders() {
        let (svc, accounts, catalog, store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Widget", 1.0, 20).await;

        for quantity in [3u32, 5, 2] {
            svc.place_order(&alice, &[line(&p, quantity)]).await.unwrap();
        }

        let placed: u32 = store
            .orders
            .lock()
            .await
            .iter()
            .flat_map(|o| o.products.iter().map(|l| l.quantity))
            .sum();
        let after = catalog.product(&p).await;
        assert_eq!(after.stock + placed as i32, 20);
        assert_eq!(after.sold, placed as i32);
    }

    #[tokio::test(start_paused = true)]
    async fn placement_schedules_the_four_status_transitions() {
        let (svc, accounts, catalog, _store, publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Widget", 1.0, 20).await;

        let order = svc.place_order(&alice, &[line(&p, 1)]).await.unwrap();

        // paused clock: sleeping past the four 15 s steps drains the task
        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        let statuses = publisher.statuses.lock().await;
        let names: Vec<&str> = statuses.iter().map(|u| u.status.as_str()).collect();
        assert_eq!(names, vec!["Confirmed", "Packed", "Shipped", "Delivered"]);
        assert!(statuses.iter().all(|u| u.order_id == order.id));
    }

    #[tokio::test(start_paused = true)]
    async fn read_path_enriches_lines_from_the_catalog() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p = catalog.insert("Keyboard", 5.0, 10).await;

        svc.place_order(&alice, &[line(&p, 2)]).await.unwrap();

        let orders = svc.orders_for_account(&alice).await.unwrap();
        assert_eq!(orders.len(), 1);
        let read_line = &orders[0].products[0];
        assert_eq!(read_line.name, "Keyboard");
        assert!((read_line.price - 5.0).abs() < 1e-6);
        // current stock, not the placement snapshot
        assert_eq!(read_line.stock, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn total_matches_sum_of_line_prices() {
        let (svc, accounts, catalog, _store, _publisher) = service();
        let alice = accounts.insert("Alice", "a@x.com").await;
        let p1 = catalog.insert("Desk", 99.99, 5).await;
        let p2 = catalog.insert("Lamp", 20.5, 5).await;

        let order = svc
            .place_order(&alice, &[line(&p1, 2), line(&p2, 3)])
            .await
            .unwrap();

        let expected: f64 = order
            .products
            .iter()
            .map(|l| l.price * f64::from(l.quantity))
            .sum();
        assert!((order.total_price - expected).abs() < 1e-6);
    }
}
