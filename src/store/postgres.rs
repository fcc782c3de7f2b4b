//! Postgres store. Scalar fields are plain columns; the document-shaped
//! fields (`items`, `shippingAddress`, `push_tokens`) are JSONB so the stored
//! representation matches the wire contract byte for byte.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::order::{OrderItem, ShippingAddress};
use crate::domain::{Cart, DeliveryStatus, Order, PaymentMethod, Product, Role, User};
use crate::store::{CartStore, OrderStore, ProductStore, StoreError, UserStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and runs pending migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct CartRow {
    owner: Uuid,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            owner: row.owner,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    owner: Uuid,
    items: Json<Vec<OrderItem>>,
    total_amount: i64,
    delivery_status: String,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let delivery_status: DeliveryStatus = row
            .delivery_status
            .parse()
            .map_err(|e: crate::domain::order::ParseStatusError| StoreError::Corrupt(e.to_string()))?;
        let payment_method: PaymentMethod = row
            .payment_method
            .parse()
            .map_err(|e: crate::domain::order::ParseMethodError| StoreError::Corrupt(e.to_string()))?;
        Ok(Self {
            id: row.id,
            owner: row.owner,
            items: row.items.0,
            total_amount: row.total_amount,
            delivery_status,
            shipping_address: row.shipping_address.0,
            payment_method,
            payment_id: row.payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    default_address: Option<Json<ShippingAddress>>,
    push_tokens: Json<Vec<String>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        let role = match row.role.as_str() {
            "user" => Role::User,
            "admin" => Role::Admin,
            other => return Err(StoreError::Corrupt(format!("unknown role: {other}"))),
        };
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            default_address: row.default_address.map(|a| a.0),
            push_tokens: row.push_tokens.0,
        })
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find(&self, owner: Uuid) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT * FROM carts WHERE owner = $1")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Cart::from))
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO carts (owner, items, created_at, updated_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (owner) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at",
        )
        .bind(cart.owner)
        .bind(Json(&cart.items))
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, owner, items, total_amount, delivery_status, shipping_address, \
             payment_method, payment_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id)
        .bind(order.owner)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(order.delivery_status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(order.payment_method.as_str())
        .bind(&order.payment_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET delivery_status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE owner = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, role, default_address, push_tokens) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, \
             role = EXCLUDED.role, default_address = EXCLUDED.default_address, \
             push_tokens = EXCLUDED.push_tokens",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(role_str(user.role))
        .bind(user.default_address.as_ref().map(Json))
        .bind(Json(&user.push_tokens))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn upsert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products (id, name, image, original_price, discount_price, category, \
             description, rating, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, image = EXCLUDED.image, \
             original_price = EXCLUDED.original_price, discount_price = EXCLUDED.discount_price, \
             category = EXCLUDED.category, description = EXCLUDED.description, \
             rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.image)
        .bind(product.original_price)
        .bind(product.discount_price)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.rating)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}
