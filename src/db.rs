use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::{debug, info};

use crate::cache::{Cache, CacheManager};

/// Represents a customer in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub telegram_id: i64,
    pub name: String,
    pub phone: String,
    pub language: String,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents a product in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
}

/// Represents a customer's cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: i64,
    pub customer_id: i64,
    pub delivery_method: String,
    pub delivery_address: Option<String>,
    pub delivery_area_id: Option<i64>,
}

/// A cart line joined with its product, as rendered in chat
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemView {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub product_options: serde_json::Value,
}

impl CartItemView {
    /// Line total for this cart entry
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Represents an order in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub order_number: String,
    pub status: String,
    pub subtotal: f64,
    pub delivery_charge: f64,
    pub total: f64,
    pub delivery_method: String,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a cart line at confirmation time
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_options: serde_json::Value,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
}

/// How an order leaves the kitchen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pickup" => Some(DeliveryMethod::Pickup),
            "delivery" => Some(DeliveryMethod::Delivery),
            _ => None,
        }
    }
}

/// Order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Orders are immutable apart from these forward transitions
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Completed)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    // Create customers table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id BIGSERIAL PRIMARY KEY,
            telegram_id BIGINT UNIQUE NOT NULL,
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(20) NOT NULL,
            language VARCHAR(10) DEFAULT 'en',
            delivery_address VARCHAR(500),
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create customers table")?;

    // Create menu_categories table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS menu_categories (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) UNIQUE NOT NULL,
            description TEXT,
            display_order INTEGER DEFAULT 0,
            is_active BOOLEAN DEFAULT TRUE,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create menu_categories table")?;

    // Create products table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(200) UNIQUE NOT NULL,
            category_id BIGINT REFERENCES menu_categories(id),
            description TEXT,
            price DOUBLE PRECISION NOT NULL,
            is_active BOOLEAN DEFAULT TRUE,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create products table")?;

    // Create delivery_areas table (referenced by carts and orders)
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS delivery_areas (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            charge DOUBLE PRECISION NOT NULL DEFAULT 0,
            is_active BOOLEAN DEFAULT TRUE,
            display_order INTEGER DEFAULT 0
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create delivery_areas table")?;

    // Create carts table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS carts (
            id BIGSERIAL PRIMARY KEY,
            customer_id BIGINT UNIQUE NOT NULL REFERENCES customers(id),
            delivery_method VARCHAR(20) NOT NULL DEFAULT 'pickup',
            delivery_address VARCHAR(500),
            delivery_area_id BIGINT REFERENCES delivery_areas(id),
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create carts table")?;

    // Create cart_items table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cart_items (
            id BIGSERIAL PRIMARY KEY,
            cart_id BIGINT NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
            product_id BIGINT NOT NULL REFERENCES products(id),
            quantity INTEGER NOT NULL DEFAULT 1,
            unit_price DOUBLE PRECISION NOT NULL,
            product_options JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create cart_items table")?;

    // Create orders table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id BIGSERIAL PRIMARY KEY,
            customer_id BIGINT NOT NULL REFERENCES customers(id),
            order_number VARCHAR(20) UNIQUE NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            subtotal DOUBLE PRECISION NOT NULL,
            delivery_charge DOUBLE PRECISION NOT NULL DEFAULT 0,
            total DOUBLE PRECISION NOT NULL,
            delivery_method VARCHAR(20) NOT NULL DEFAULT 'pickup',
            delivery_address VARCHAR(500),
            delivery_area_id BIGINT REFERENCES delivery_areas(id),
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create orders table")?;

    // Create order_items table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS order_items (
            id BIGSERIAL PRIMARY KEY,
            order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            product_id BIGINT,
            product_name VARCHAR(200) NOT NULL,
            product_options JSONB NOT NULL DEFAULT '{}',
            quantity INTEGER NOT NULL,
            unit_price DOUBLE PRECISION NOT NULL,
            total_price DOUBLE PRECISION NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create order_items table")?;

    // Create indexes for performance
    sqlx::query("CREATE INDEX IF NOT EXISTS customers_phone_idx ON customers(phone)")
        .execute(pool)
        .await
        .context("Failed to create customers phone index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS cart_items_cart_id_idx ON cart_items(cart_id)")
        .execute(pool)
        .await
        .context("Failed to create cart_items cart_id index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS orders_customer_id_idx ON orders(customer_id)")
        .execute(pool)
        .await
        .context("Failed to create orders customer_id index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS order_items_order_id_idx ON order_items(order_id)")
        .execute(pool)
        .await
        .context("Failed to create order_items order_id index")?;

    seed_catalog(pool).await?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Seed the fixed menu categories and products
///
/// Product ids are stable and referenced by the menu callback mapping,
/// so rows are inserted with explicit ids and conflicts are ignored.
async fn seed_catalog(pool: &PgPool) -> Result<()> {
    debug!("Seeding menu catalog");

    sqlx::query(
        "INSERT INTO menu_categories (id, name, description, display_order) VALUES
            (1, 'bread', 'Traditional breads', 1),
            (2, 'spread', 'Traditional spreads and condiments', 2),
            (3, 'spice', 'Traditional spice blends', 3),
            (4, 'beverage', 'Traditional beverages', 4)
        ON CONFLICT DO NOTHING",
    )
    .execute(pool)
    .await
    .context("Failed to seed menu categories")?;

    sqlx::query(
        "INSERT INTO products (id, name, category_id, description, price) VALUES
            (1, 'Kubaneh', 1, 'Traditional Yemenite bread', 25.00),
            (2, 'Samneh', 2, 'Traditional clarified butter', 15.00),
            (3, 'Red Bisbas', 3, 'Traditional Yemenite spice blend', 12.00),
            (4, 'Hawaij soup spice', 3, 'Traditional soup spice blend', 8.00),
            (5, 'Hawaij coffee spice', 3, 'Traditional coffee spice blend', 8.00),
            (6, 'White coffee', 4, 'Traditional Yemenite white coffee', 10.00),
            (7, 'Hilbeh', 2, 'Traditional fenugreek spread (available Wed-Fri only)', 18.00)
        ON CONFLICT DO NOTHING",
    )
    .execute(pool)
    .await
    .context("Failed to seed products")?;

    Ok(())
}

fn customer_from_row(row: &sqlx::postgres::PgRow) -> Customer {
    Customer {
        id: row.get(0),
        telegram_id: row.get(1),
        name: row.get(2),
        phone: row.get(3),
        language: row.get(4),
        delivery_address: row.get(5),
        created_at: row.get(6),
        updated_at: row.get(7),
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, telegram_id, name, phone, language, delivery_address, created_at, updated_at";

/// Get a customer by Telegram ID
pub async fn get_customer_by_telegram_id(
    pool: &PgPool,
    telegram_id: i64,
) -> Result<Option<Customer>> {
    debug!(telegram_id = %telegram_id, "Getting customer by telegram_id");

    let row = sqlx::query(&format!(
        "SELECT {} FROM customers WHERE telegram_id = $1",
        CUSTOMER_COLUMNS
    ))
    .bind(telegram_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get customer by telegram_id")?;

    match row {
        Some(row) => {
            let customer = customer_from_row(&row);
            debug!(customer_id = %customer.id, "Customer found");
            Ok(Some(customer))
        }
        None => {
            debug!(telegram_id = %telegram_id, "No customer found");
            Ok(None)
        }
    }
}

/// Get a customer by primary key
pub async fn get_customer_by_id(pool: &PgPool, customer_id: i64) -> Result<Option<Customer>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM customers WHERE id = $1",
        CUSTOMER_COLUMNS
    ))
    .bind(customer_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get customer by id")?;

    Ok(row.map(|row| customer_from_row(&row)))
}

/// Get a customer by phone number
pub async fn get_customer_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Customer>> {
    debug!("Getting customer by phone");

    let row = sqlx::query(&format!(
        "SELECT {} FROM customers WHERE phone = $1",
        CUSTOMER_COLUMNS
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await
    .context("Failed to get customer by phone")?;

    Ok(row.map(|row| customer_from_row(&row)))
}

/// Get or create a customer, re-linking a known phone number to a new telegram id
///
/// Returns the customer and whether they already existed. A returning customer
/// gets their name, phone and language refreshed; a known phone seen from a
/// new telegram account is re-linked rather than duplicated.
pub async fn get_or_create_customer(
    pool: &PgPool,
    telegram_id: i64,
    name: &str,
    phone: &str,
    language: &str,
) -> Result<(Customer, bool)> {
    debug!(telegram_id = %telegram_id, "Getting or creating customer");

    // Existing customer for this telegram account
    if get_customer_by_telegram_id(pool, telegram_id).await?.is_some() {
        let row = sqlx::query(&format!(
            "UPDATE customers SET name = $1, phone = $2, language = $3, updated_at = CURRENT_TIMESTAMP
             WHERE telegram_id = $4 RETURNING {}",
            CUSTOMER_COLUMNS
        ))
        .bind(name)
        .bind(phone)
        .bind(language)
        .bind(telegram_id)
        .fetch_one(pool)
        .await
        .context("Failed to update existing customer")?;

        let customer = customer_from_row(&row);
        info!(customer_id = %customer.id, "Returning customer updated");
        return Ok((customer, true));
    }

    // Known phone number registered from a different telegram account
    if get_customer_by_phone(pool, phone).await?.is_some() {
        let row = sqlx::query(&format!(
            "UPDATE customers SET telegram_id = $1, name = $2, language = $3, updated_at = CURRENT_TIMESTAMP
             WHERE phone = $4 RETURNING {}",
            CUSTOMER_COLUMNS
        ))
        .bind(telegram_id)
        .bind(name)
        .bind(language)
        .bind(phone)
        .fetch_one(pool)
        .await
        .context("Failed to re-link customer by phone")?;

        let customer = customer_from_row(&row);
        info!(customer_id = %customer.id, "Customer re-linked to new telegram account");
        return Ok((customer, true));
    }

    // Brand new customer
    let row = sqlx::query(&format!(
        "INSERT INTO customers (telegram_id, name, phone, language) VALUES ($1, $2, $3, $4)
         RETURNING {}",
        CUSTOMER_COLUMNS
    ))
    .bind(telegram_id)
    .bind(name)
    .bind(phone)
    .bind(language)
    .fetch_one(pool)
    .await
    .context("Failed to create new customer")?;

    let customer = customer_from_row(&row);
    info!(customer_id = %customer.id, "Customer created successfully");
    Ok((customer, false))
}

/// Update a customer's language preference
pub async fn update_customer_language(
    pool: &PgPool,
    telegram_id: i64,
    language: &str,
) -> Result<bool> {
    debug!(telegram_id = %telegram_id, language = %language, "Updating customer language");

    let result = sqlx::query(
        "UPDATE customers SET language = $1, updated_at = CURRENT_TIMESTAMP WHERE telegram_id = $2",
    )
    .bind(language)
    .bind(telegram_id)
    .execute(pool)
    .await
    .context("Failed to update customer language")?;

    Ok(result.rows_affected() > 0)
}

/// Update a customer's saved delivery address
pub async fn update_customer_delivery_address(
    pool: &PgPool,
    telegram_id: i64,
    delivery_address: &str,
) -> Result<bool> {
    debug!(telegram_id = %telegram_id, "Updating customer delivery address");

    let result = sqlx::query(
        "UPDATE customers SET delivery_address = $1, updated_at = CURRENT_TIMESTAMP WHERE telegram_id = $2",
    )
    .bind(delivery_address)
    .bind(telegram_id)
    .execute(pool)
    .await
    .context("Failed to update customer delivery address")?;

    let rows_affected = result.rows_affected();
    if rows_affected > 0 {
        debug!(telegram_id = %telegram_id, "Delivery address updated successfully");
        Ok(true)
    } else {
        info!("No customer found with telegram_id: {telegram_id}");
        Ok(false)
    }
}

/// Get a customer, consulting the cache before the database
pub async fn get_customer_cached(
    pool: &PgPool,
    cache: &Mutex<CacheManager>,
    telegram_id: i64,
) -> Result<Option<Customer>> {
    {
        let manager = cache.lock();
        if let Some(customer) = manager.customer_cache.get(&telegram_id) {
            return Ok(Some(customer));
        }
    }

    let customer = get_customer_by_telegram_id(pool, telegram_id).await?;

    if let Some(ref found) = customer {
        let mut manager = cache.lock();
        let ttl = manager.customer_ttl;
        manager.customer_cache.insert(telegram_id, found.clone(), ttl);
    }

    Ok(customer)
}

/// Get a product by ID
pub async fn get_product_by_id(pool: &PgPool, product_id: i64) -> Result<Option<Product>> {
    debug!(product_id = %product_id, "Getting product");

    let row = sqlx::query(
        "SELECT id, name, category_id, description, price, is_active FROM products WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get product by id")?;

    Ok(row.map(|row| Product {
        id: row.get(0),
        name: row.get(1),
        category_id: row.get(2),
        description: row.get(3),
        price: row.get(4),
        is_active: row.get(5),
    }))
}

/// Get a product, consulting the cache before the database
pub async fn get_product_cached(
    pool: &PgPool,
    cache: &Mutex<CacheManager>,
    product_id: i64,
) -> Result<Option<Product>> {
    {
        let manager = cache.lock();
        if let Some(product) = manager.product_cache.get(&product_id) {
            return Ok(Some(product));
        }
    }

    let product = get_product_by_id(pool, product_id).await?;

    if let Some(ref found) = product {
        let mut manager = cache.lock();
        let ttl = manager.product_ttl;
        manager.product_cache.insert(product_id, found.clone(), ttl);
    }

    Ok(product)
}

fn cart_from_row(row: &sqlx::postgres::PgRow) -> Cart {
    Cart {
        id: row.get(0),
        customer_id: row.get(1),
        delivery_method: row.get(2),
        delivery_address: row.get(3),
        delivery_area_id: row.get(4),
    }
}

const CART_COLUMNS: &str = "id, customer_id, delivery_method, delivery_address, delivery_area_id";

/// Get the customer's cart, if any
pub async fn get_cart_by_telegram_id(pool: &PgPool, telegram_id: i64) -> Result<Option<Cart>> {
    let row = sqlx::query(
        "SELECT c.id, c.customer_id, c.delivery_method, c.delivery_address, c.delivery_area_id
         FROM carts c
         JOIN customers cu ON cu.id = c.customer_id
         WHERE cu.telegram_id = $1",
    )
    .bind(telegram_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get cart by telegram_id")?;

    Ok(row.map(|row| cart_from_row(&row)))
}

/// Get the customer's cart, creating an empty one on first use
pub async fn get_or_create_cart(pool: &PgPool, customer_id: i64) -> Result<Cart> {
    debug!(customer_id = %customer_id, "Getting or creating cart");

    let row = sqlx::query(&format!(
        "SELECT {} FROM carts WHERE customer_id = $1",
        CART_COLUMNS
    ))
    .bind(customer_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get cart")?;

    if let Some(row) = row {
        return Ok(cart_from_row(&row));
    }

    let row = sqlx::query(&format!(
        "INSERT INTO carts (customer_id) VALUES ($1) RETURNING {}",
        CART_COLUMNS
    ))
    .bind(customer_id)
    .fetch_one(pool)
    .await
    .context("Failed to create cart")?;

    let cart = cart_from_row(&row);
    debug!(cart_id = %cart.id, "Cart created");
    Ok(cart)
}

/// Add a product to the customer's cart
///
/// A line already holding this product has its quantity incremented; the
/// options recorded on first add are kept. Returns false when the customer
/// or product is unknown.
pub async fn add_to_cart(
    pool: &PgPool,
    telegram_id: i64,
    product_id: i64,
    quantity: i32,
    options: &serde_json::Value,
) -> Result<bool> {
    debug!(telegram_id = %telegram_id, product_id = %product_id, "Adding product to cart");

    let customer = match get_customer_by_telegram_id(pool, telegram_id).await? {
        Some(customer) => customer,
        None => {
            info!("No customer found with telegram_id: {telegram_id}");
            return Ok(false);
        }
    };

    let product = match get_product_by_id(pool, product_id).await? {
        Some(product) if product.is_active => product,
        _ => {
            info!("No active product found with id: {product_id}");
            return Ok(false);
        }
    };

    let cart = get_or_create_cart(pool, customer.id).await?;

    let existing = sqlx::query(
        "SELECT id FROM cart_items WHERE cart_id = $1 AND product_id = $2",
    )
    .bind(cart.id)
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .context("Failed to look up existing cart item")?;

    match existing {
        Some(row) => {
            let item_id: i64 = row.get(0);
            sqlx::query(
                "UPDATE cart_items SET quantity = quantity + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
            )
            .bind(quantity)
            .bind(item_id)
            .execute(pool)
            .await
            .context("Failed to increment cart item quantity")?;
            debug!(cart_item_id = %item_id, "Cart item quantity incremented");
        }
        None => {
            sqlx::query(
                "INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, product_options)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(cart.id)
            .bind(product_id)
            .bind(quantity)
            .bind(product.price)
            .bind(options)
            .execute(pool)
            .await
            .context("Failed to insert cart item")?;
            debug!(cart_id = %cart.id, product_id = %product_id, "Cart item added");
        }
    }

    Ok(true)
}

/// List the customer's cart lines with product names
pub async fn get_cart_items(pool: &PgPool, telegram_id: i64) -> Result<Vec<CartItemView>> {
    debug!(telegram_id = %telegram_id, "Listing cart items");

    let rows = sqlx::query(
        "SELECT ci.id, ci.product_id, p.name, ci.quantity, ci.unit_price, ci.product_options
         FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         JOIN customers cu ON cu.id = c.customer_id
         JOIN products p ON p.id = ci.product_id
         WHERE cu.telegram_id = $1
         ORDER BY ci.created_at",
    )
    .bind(telegram_id)
    .fetch_all(pool)
    .await
    .context("Failed to list cart items")?;

    let items: Vec<CartItemView> = rows
        .into_iter()
        .map(|row| CartItemView {
            id: row.get(0),
            product_id: row.get(1),
            product_name: row.get(2),
            quantity: row.get(3),
            unit_price: row.get(4),
            product_options: row.get(5),
        })
        .collect();

    debug!(
        "Found {} cart items for telegram_id: {telegram_id}",
        items.len()
    );
    Ok(items)
}

/// Adjust a cart line's quantity by a signed delta, removing it at zero
pub async fn adjust_cart_item_quantity(
    pool: &PgPool,
    telegram_id: i64,
    product_id: i64,
    delta: i32,
) -> Result<bool> {
    debug!(telegram_id = %telegram_id, product_id = %product_id, delta = %delta, "Adjusting cart item quantity");

    let row = sqlx::query(
        "SELECT ci.id, ci.quantity FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         JOIN customers cu ON cu.id = c.customer_id
         WHERE cu.telegram_id = $1 AND ci.product_id = $2",
    )
    .bind(telegram_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .context("Failed to look up cart item for adjustment")?;

    let (item_id, current): (i64, i32) = match row {
        Some(row) => (row.get(0), row.get(1)),
        None => return Ok(false),
    };

    let next = current + delta;
    if next <= 0 {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id)
            .execute(pool)
            .await
            .context("Failed to remove cart item")?;
    } else {
        sqlx::query(
            "UPDATE cart_items SET quantity = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(next)
        .bind(item_id)
        .execute(pool)
        .await
        .context("Failed to update cart item quantity")?;
    }

    Ok(true)
}

/// Remove a product's line from the cart entirely
pub async fn remove_from_cart(pool: &PgPool, telegram_id: i64, product_id: i64) -> Result<bool> {
    debug!(telegram_id = %telegram_id, product_id = %product_id, "Removing product from cart");

    let result = sqlx::query(
        "DELETE FROM cart_items ci
         USING carts c, customers cu
         WHERE ci.cart_id = c.id AND c.customer_id = cu.id
           AND cu.telegram_id = $1 AND ci.product_id = $2",
    )
    .bind(telegram_id)
    .bind(product_id)
    .execute(pool)
    .await
    .context("Failed to remove cart item")?;

    Ok(result.rows_affected() > 0)
}

/// Record the cart's delivery method and address
pub async fn update_cart_delivery(
    pool: &PgPool,
    telegram_id: i64,
    delivery_method: DeliveryMethod,
    delivery_address: Option<&str>,
) -> Result<bool> {
    debug!(telegram_id = %telegram_id, method = %delivery_method.as_str(), "Updating cart delivery");

    let result = sqlx::query(
        "UPDATE carts SET delivery_method = $1,
                delivery_address = COALESCE($2, delivery_address),
                updated_at = CURRENT_TIMESTAMP
         FROM customers cu
         WHERE carts.customer_id = cu.id AND cu.telegram_id = $3",
    )
    .bind(delivery_method.as_str())
    .bind(delivery_address)
    .bind(telegram_id)
    .execute(pool)
    .await
    .context("Failed to update cart delivery")?;

    Ok(result.rows_affected() > 0)
}

/// Drop the cart and all of its items
pub async fn clear_cart(pool: &PgPool, telegram_id: i64) -> Result<bool> {
    debug!(telegram_id = %telegram_id, "Clearing cart");

    let result = sqlx::query(
        "DELETE FROM carts
         USING customers cu
         WHERE carts.customer_id = cu.id AND cu.telegram_id = $1",
    )
    .bind(telegram_id)
    .execute(pool)
    .await
    .context("Failed to clear cart")?;

    let rows_affected = result.rows_affected();
    if rows_affected > 0 {
        debug!(telegram_id = %telegram_id, "Cart cleared");
    }
    Ok(rows_affected > 0)
}

/// Generate a unique order number: SS + timestamp + 4 random characters
pub fn generate_order_number() -> String {
    const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_CHARSET.len());
            SUFFIX_CHARSET[idx] as char
        })
        .collect();

    format!("SS{}{}", timestamp, suffix)
}

/// Create an order with snapshot items in a single transaction
#[allow(clippy::too_many_arguments)]
pub async fn create_order_with_items(
    pool: &PgPool,
    customer_id: i64,
    order_number: &str,
    subtotal: f64,
    delivery_charge: f64,
    delivery_method: DeliveryMethod,
    delivery_address: Option<&str>,
    items: &[CartItemView],
) -> Result<Order> {
    debug!(customer_id = %customer_id, order_number = %order_number, "Creating order");

    let total = subtotal + delivery_charge;
    let mut tx = pool.begin().await.context("Failed to begin order transaction")?;

    let row = sqlx::query(
        "INSERT INTO orders (customer_id, order_number, status, subtotal, delivery_charge, total, delivery_method, delivery_address)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, customer_id, order_number, status, subtotal, delivery_charge, total, delivery_method, delivery_address, created_at",
    )
    .bind(customer_id)
    .bind(order_number)
    .bind(OrderStatus::Pending.as_str())
    .bind(subtotal)
    .bind(delivery_charge)
    .bind(total)
    .bind(delivery_method.as_str())
    .bind(delivery_address)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to insert order")?;

    let order = Order {
        id: row.get(0),
        customer_id: row.get(1),
        order_number: row.get(2),
        status: row.get(3),
        subtotal: row.get(4),
        delivery_charge: row.get(5),
        total: row.get(6),
        delivery_method: row.get(7),
        delivery_address: row.get(8),
        created_at: row.get(9),
    };

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, product_name, product_options, quantity, unit_price, total_price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(&item.product_options)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.line_total())
        .execute(&mut *tx)
        .await
        .context("Failed to insert order item")?;
    }

    tx.commit().await.context("Failed to commit order transaction")?;

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        item_count = %items.len(),
        "Order created successfully"
    );
    Ok(order)
}

/// Read an order by ID
pub async fn get_order_by_id(pool: &PgPool, order_id: i64) -> Result<Option<Order>> {
    debug!(order_id = %order_id, "Reading order");

    let row = sqlx::query(
        "SELECT id, customer_id, order_number, status, subtotal, delivery_charge, total, delivery_method, delivery_address, created_at
         FROM orders WHERE id = $1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .context("Failed to read order")?;

    Ok(row.map(|row| Order {
        id: row.get(0),
        customer_id: row.get(1),
        order_number: row.get(2),
        status: row.get(3),
        subtotal: row.get(4),
        delivery_charge: row.get(5),
        total: row.get(6),
        delivery_method: row.get(7),
        delivery_address: row.get(8),
        created_at: row.get(9),
    }))
}

/// List the snapshot items of an order
pub async fn get_order_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>> {
    debug!(order_id = %order_id, "Listing order items");

    let rows = sqlx::query(
        "SELECT id, order_id, product_id, product_name, product_options, quantity, unit_price, total_price
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .context("Failed to list order items")?;

    Ok(rows
        .into_iter()
        .map(|row| OrderItem {
            id: row.get(0),
            order_id: row.get(1),
            product_id: row.get(2),
            product_name: row.get(3),
            product_options: row.get(4),
            quantity: row.get(5),
            unit_price: row.get(6),
            total_price: row.get(7),
        })
        .collect())
}

/// Update an order's status
pub async fn update_order_status(pool: &PgPool, order_id: i64, new_status: OrderStatus) -> Result<bool> {
    debug!(order_id = %order_id, status = %new_status.as_str(), "Updating order status");

    let result = sqlx::query(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(new_status.as_str())
    .bind(order_id)
    .execute(pool)
    .await
    .context("Failed to update order status")?;

    let rows_affected = result.rows_affected();
    if rows_affected > 0 {
        info!(order_id = %order_id, "Order status updated to {}", new_status.as_str());
        Ok(true)
    } else {
        info!("No order found with ID: {order_id}");
        Ok(false)
    }
}
