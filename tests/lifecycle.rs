//! Order lifecycle integration tests over the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use tiffinbox::domain::{
    Cart, CartItem, DeliveryStatus, Order, PaymentMethod, Role, ShippingAddress, User,
};
use tiffinbox::notify::{Notifier, NotifyError};
use tiffinbox::service::{CartService, CreateOrder, OrderService};
use tiffinbox::store::{CartStore, MemoryStore, OrderStore, StoreError, UserStore};
use tiffinbox::ApiError;

#[derive(Default)]
struct RecordingNotifier {
    created: AtomicUsize,
    status_changed: AtomicUsize,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn order_created(&self, _: &Order, _: &str, _: &str) -> Result<(), NotifyError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn status_changed(&self, _: &Order, _: &str, _: &str) -> Result<(), NotifyError> {
        self.status_changed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn order_created(&self, _: &Order, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Publish("mail transport down".into()))
    }

    async fn status_changed(&self, _: &Order, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Publish("mail transport down".into()))
    }
}

/// Cart store whose writes fail only when emptying the cart, to exercise the
/// clear-after-persist gap.
struct ClearFailingCarts {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl CartStore for ClearFailingCarts {
    async fn find(&self, owner: Uuid) -> Result<Option<Cart>, StoreError> {
        CartStore::find(self.inner.as_ref(), owner).await
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        if cart.items.is_empty() {
            return Err(StoreError::Corrupt("simulated write failure".into()));
        }
        CartStore::upsert(self.inner.as_ref(), cart).await
    }
}

/// Order store that refuses every insert, to prove a failed persist leaves
/// the cart untouched.
struct InsertFailingOrders;

#[async_trait]
impl OrderStore for InsertFailingOrders {
    async fn insert(&self, _: &Order) -> Result<(), StoreError> {
        Err(StoreError::Corrupt("simulated write failure".into()))
    }

    async fn find(&self, _: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(None)
    }

    async fn set_status(
        &self,
        _: Uuid,
        _: DeliveryStatus,
        _: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<Order>, StoreError> {
        Ok(None)
    }

    async fn list_for_owner(&self, _: Uuid) -> Result<Vec<Order>, StoreError> {
        Ok(vec![])
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(vec![])
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ravi Menon".into(),
        phone: "9876543210".into(),
        address_line1: "4 Temple Street".into(),
        city: Some("Kochi".into()),
        ..ShippingAddress::default()
    }
}

fn cart_item(name: &str, discount_price: i64, quantity: u32) -> CartItem {
    CartItem {
        id: Uuid::new_v4(),
        name: name.into(),
        image: "https://cdn.example.com/food.jpg".into(),
        original_price: discount_price + 30,
        discount_price,
        quantity,
        category: "Mains".into(),
        description: None,
    }
}

fn cod() -> CreateOrder {
    CreateOrder {
        shipping_address: None,
        payment_method: PaymentMethod::Cod,
        payment_id: None,
    }
}

struct Env {
    store: Arc<MemoryStore>,
    carts: CartService,
    orders: OrderService,
    notifier: Arc<RecordingNotifier>,
    user: User,
    admin: User,
}

async fn env() -> Env {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let mut user = User::new("Ravi Menon", "ravi@example.com", Role::User);
    user.default_address = Some(address());
    let admin = User::new("Ops Desk", "ops@example.com", Role::Admin);
    UserStore::upsert(store.as_ref(), &user).await.unwrap();
    UserStore::upsert(store.as_ref(), &admin).await.unwrap();

    let carts = CartService::new(store.clone() as Arc<dyn CartStore>);
    let orders = OrderService::new(
        store.clone() as Arc<dyn CartStore>,
        store.clone() as Arc<dyn OrderStore>,
        store.clone() as Arc<dyn UserStore>,
        notifier.clone() as Arc<dyn Notifier>,
    );

    Env {
        store,
        carts,
        orders,
        notifier,
        user,
        admin,
    }
}

/// Lets fire-and-forget notification tasks run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn order_snapshots_cart_and_clears_it() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 2))
        .await
        .unwrap();

    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    assert_eq!(order.total_amount, 400);
    assert_eq!(order.delivery_status, DeliveryStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert!(env.carts.items(env.user.id).await.unwrap().is_empty());

    settle().await;
    assert_eq!(env.notifier.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_cart_cannot_become_an_order() {
    let env = env().await;
    // Absent cart.
    let err = env.orders.create_order(env.user.id, cod()).await.unwrap_err();
    assert_eq!(err.to_string(), "Cart is empty. Cannot create order.");

    // Present but emptied cart.
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    env.carts.clear(env.user.id).await.unwrap();
    let err = env.orders.create_order(env.user.id, cod()).await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyCart));

    assert!(env.orders.orders_for(env.user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn totals_are_immune_to_later_cart_mutation() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Thali", 150, 2))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();
    assert_eq!(order.total_amount, 300);

    // Refill the cart with pricier items; the placed order must not move.
    env.carts
        .add_item(env.user.id, cart_item("Thali", 999, 9))
        .await
        .unwrap();
    let fetched = env.orders.get_order(order.id, &env.user).await.unwrap();
    assert_eq!(fetched.order.total_amount, 300);
    assert_eq!(fetched.order.items[0].discount_price, 150);
}

#[tokio::test]
async fn status_must_pass_through_shipped() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    let err = env
        .orders
        .update_status(order.id, DeliveryStatus::Delivered, &env.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStatus(_)));

    env.orders
        .update_status(order.id, DeliveryStatus::Shipped, &env.admin)
        .await
        .unwrap();
    let updated = env
        .orders
        .update_status(order.id, DeliveryStatus::Delivered, &env.admin)
        .await
        .unwrap();
    assert_eq!(updated.delivery_status, DeliveryStatus::Delivered);

    settle().await;
    assert_eq!(env.notifier.status_changed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn delivered_is_terminal() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();
    env.orders
        .update_status(order.id, DeliveryStatus::Shipped, &env.admin)
        .await
        .unwrap();
    env.orders
        .update_status(order.id, DeliveryStatus::Delivered, &env.admin)
        .await
        .unwrap();

    let err = env
        .orders
        .update_status(order.id, DeliveryStatus::Shipped, &env.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidStatus(_)));
}

#[tokio::test]
async fn same_state_request_is_an_accepted_noop() {
    // The transition table lists each state as its own allowed target, so a
    // repeat request succeeds without effect.
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    let updated = env
        .orders
        .update_status(order.id, DeliveryStatus::Pending, &env.admin)
        .await
        .unwrap();
    assert_eq!(updated.delivery_status, DeliveryStatus::Pending);
}

#[tokio::test]
async fn only_admins_move_orders() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    let err = env
        .orders
        .update_status(order.id, DeliveryStatus::Shipped, &env.user)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));
}

#[tokio::test]
async fn only_owner_or_admin_reads_an_order() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    let stranger = User::new("Someone Else", "else@example.com", Role::User);
    UserStore::upsert(env.store.as_ref(), &stranger)
        .await
        .unwrap();

    let err = env.orders.get_order(order.id, &stranger).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let as_owner = env.orders.get_order(order.id, &env.user).await.unwrap();
    assert_eq!(
        as_owner.customer.as_ref().map(|c| c.email.as_str()),
        Some("ravi@example.com")
    );
    let as_admin = env.orders.get_order(order.id, &env.admin).await.unwrap();
    assert_eq!(as_admin.order.id, order.id);
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let order = env.orders.create_order(env.user.id, cod()).await.unwrap();

    let first = env.orders.get_order(order.id, &env.user).await.unwrap();
    let second = env.orders.get_order(order.id, &env.user).await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn my_orders_come_newest_first() {
    let env = env().await;
    let mut ids = vec![];
    for _ in 0..3 {
        env.carts
            .add_item(env.user.id, cart_item("Pizza", 200, 1))
            .await
            .unwrap();
        ids.push(env.orders.create_order(env.user.id, cod()).await.unwrap().id);
    }

    let listed = env.orders.orders_for(env.user.id).await.unwrap();
    let listed_ids: Vec<Uuid> = listed.iter().map(|o| o.id).collect();
    ids.reverse();
    assert_eq!(listed_ids, ids);
}

#[tokio::test]
async fn online_payment_requires_a_reference() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();

    let err = env
        .orders
        .create_order(
            env.user.id,
            CreateOrder {
                shipping_address: None,
                payment_method: PaymentMethod::Online,
                payment_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let order = env
        .orders
        .create_order(
            env.user.id,
            CreateOrder {
                shipping_address: None,
                payment_method: PaymentMethod::Online,
                payment_id: Some("pi_abc".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(order.payment_id.as_deref(), Some("pi_abc"));
}

#[tokio::test]
async fn address_override_beats_the_stored_default() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();

    let override_address = ShippingAddress {
        full_name: "Ravi Menon".into(),
        phone: "9999999999".into(),
        address_line1: "Office, 2nd Floor".into(),
        ..ShippingAddress::default()
    };
    let order = env
        .orders
        .create_order(
            env.user.id,
            CreateOrder {
                shipping_address: Some(override_address.clone()),
                payment_method: PaymentMethod::Cod,
                payment_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.shipping_address, override_address);
}

#[tokio::test]
async fn incomplete_address_is_rejected() {
    let env = env().await;
    env.carts
        .add_item(env.user.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();

    let err = env
        .orders
        .create_order(
            env.user.id,
            CreateOrder {
                shipping_address: Some(ShippingAddress {
                    full_name: "Ravi Menon".into(),
                    phone: String::new(),
                    address_line1: "4 Temple Street".into(),
                    ..ShippingAddress::default()
                }),
                payment_method: PaymentMethod::Cod,
                payment_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingAddress));
}

#[tokio::test]
async fn missing_address_everywhere_is_rejected() {
    let env = env().await;
    let mut bare = User::new("No Address", "bare@example.com", Role::User);
    bare.default_address = None;
    UserStore::upsert(env.store.as_ref(), &bare).await.unwrap();
    env.carts
        .add_item(bare.id, cart_item("Pizza", 200, 1))
        .await
        .unwrap();

    let err = env.orders.create_order(bare.id, cod()).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingAddress));
}

#[tokio::test]
async fn unknown_user_cannot_order() {
    let env = env().await;
    let ghost = Uuid::new_v4();
    env.carts
        .add_item(ghost, cart_item("Pizza", 200, 1))
        .await
        .unwrap();
    let err = env.orders.create_order(ghost, cod()).await.unwrap_err();
    assert!(matches!(err, ApiError::UserNotFound));
}

#[tokio::test]
async fn notification_failure_never_fails_the_operation() {
    let store = Arc::new(MemoryStore::new());
    let mut user = User::new("Ravi Menon", "ravi@example.com", Role::User);
    user.default_address = Some(address());
    let admin = User::new("Ops Desk", "ops@example.com", Role::Admin);
    UserStore::upsert(store.as_ref(), &user).await.unwrap();
    UserStore::upsert(store.as_ref(), &admin).await.unwrap();

    let carts = CartService::new(store.clone() as Arc<dyn CartStore>);
    let orders = OrderService::new(
        store.clone() as Arc<dyn CartStore>,
        store.clone() as Arc<dyn OrderStore>,
        store.clone() as Arc<dyn UserStore>,
        Arc::new(FailingNotifier) as Arc<dyn Notifier>,
    );

    carts
        .add_item(user.id, cart_item("Pizza", 200, 2))
        .await
        .unwrap();
    let order = orders.create_order(user.id, cod()).await.unwrap();
    settle().await;

    let updated = orders
        .update_status(order.id, DeliveryStatus::Shipped, &admin)
        .await
        .unwrap();
    assert_eq!(updated.delivery_status, DeliveryStatus::Shipped);
    settle().await;
}

#[tokio::test]
async fn failed_persist_leaves_the_cart_alone() {
    let store = Arc::new(MemoryStore::new());
    let mut user = User::new("Ravi Menon", "ravi@example.com", Role::User);
    user.default_address = Some(address());
    UserStore::upsert(store.as_ref(), &user).await.unwrap();

    let carts = CartService::new(store.clone() as Arc<dyn CartStore>);
    let orders = OrderService::new(
        store.clone() as Arc<dyn CartStore>,
        Arc::new(InsertFailingOrders) as Arc<dyn OrderStore>,
        store.clone() as Arc<dyn UserStore>,
        Arc::new(RecordingNotifier::default()) as Arc<dyn Notifier>,
    );

    carts
        .add_item(user.id, cart_item("Pizza", 200, 2))
        .await
        .unwrap();
    let err = orders.create_order(user.id, cod()).await.unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));

    let items = carts.items(user.id).await.unwrap();
    assert_eq!(items.len(), 1, "cart must survive a failed order persist");
}

#[tokio::test]
async fn failed_cart_clear_leaves_the_order_standing() {
    // Known gap: order persist and cart clear are separate writes with no
    // transaction across them. A clear failure keeps both documents.
    let store = Arc::new(MemoryStore::new());
    let mut user = User::new("Ravi Menon", "ravi@example.com", Role::User);
    user.default_address = Some(address());
    UserStore::upsert(store.as_ref(), &user).await.unwrap();

    let flaky_carts = Arc::new(ClearFailingCarts {
        inner: store.clone(),
    });
    let carts = CartService::new(store.clone() as Arc<dyn CartStore>);
    let orders = OrderService::new(
        flaky_carts as Arc<dyn CartStore>,
        store.clone() as Arc<dyn OrderStore>,
        store.clone() as Arc<dyn UserStore>,
        Arc::new(RecordingNotifier::default()) as Arc<dyn Notifier>,
    );

    carts
        .add_item(user.id, cart_item("Pizza", 200, 2))
        .await
        .unwrap();
    let order = orders.create_order(user.id, cod()).await.unwrap();
    assert_eq!(order.total_amount, 400);

    let listed = orders.orders_for(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    // The cart still holds its items; eventual cleanup is out of band.
    assert_eq!(carts.items(user.id).await.unwrap().len(), 1);
}
