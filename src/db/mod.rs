mod access;
mod analytics;
mod catalog;
mod content;
mod orders;
mod reviews;
mod users;

pub use catalog::{NewProduct, ProductPatch};
pub use orders::{NewOrderLine, OrderError};
pub use reviews::ReviewError;
pub use users::UserAuthRow;

use leptos::logging;
use rusqlite::{Connection, Error};
use std::sync::Arc;
use tokio::sync::Mutex;

/// True when the error is a UNIQUE/CHECK constraint refusal, which the API
/// layer reports as a validation failure rather than a server error.
pub fn is_constraint_violation(err: &Error) -> bool {
    matches!(
        err,
        Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// Define a struct to represent a database connection
#[derive(Debug)]
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Create a new database connection
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        logging::log!("Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Create the database schema
    pub async fn create_schema(&self) -> Result<(), Error> {
        let conn = self.conn.lock().await;

        // 1. Roles and users
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role_id INTEGER NOT NULL,
                is_active TEXT NOT NULL DEFAULT 'Y',
                failed_logins INTEGER NOT NULL DEFAULT 0,
                locked_until TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (role_id) REFERENCES roles(id)
            );
            INSERT OR IGNORE INTO roles (name, description) VALUES
            ('Admin', 'Back-office administrator'),
            ('Customer', 'Storefront customer');",
        )
        .map_err(|e| {
            eprintln!("Failed creating roles/users tables: {}", e);
            e
        })?;

        // 2. Admin navigation: menus and the role -> menu mapping
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS menus (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                path TEXT NOT NULL,
                icon TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_active TEXT NOT NULL DEFAULT 'Y'
            );
            CREATE TABLE IF NOT EXISTS role_menus (
                role_id INTEGER NOT NULL,
                menu_id INTEGER NOT NULL,
                PRIMARY KEY (role_id, menu_id),
                FOREIGN KEY (role_id) REFERENCES roles(id) ON DELETE CASCADE,
                FOREIGN KEY (menu_id) REFERENCES menus(id) ON DELETE CASCADE
            );",
        )
        .map_err(|e| {
            eprintln!("Failed creating menus tables: {}", e);
            e
        })?;

        // 3. Catalog: categories, collections, products
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                is_active TEXT NOT NULL DEFAULT 'Y'
            );
            CREATE TABLE IF NOT EXISTS collections (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                is_active TEXT NOT NULL DEFAULT 'Y'
            );
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                price_cents INTEGER NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0,
                category_id INTEGER,
                image_url TEXT,
                is_active TEXT NOT NULL DEFAULT 'Y',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (category_id) REFERENCES categories(id)
            );
            CREATE TABLE IF NOT EXISTS collection_products (
                collection_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                PRIMARY KEY (collection_id, product_id),
                FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE,
                FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
            );",
        )
        .map_err(|e| {
            eprintln!("Failed creating catalog tables: {}", e);
            e
        })?;

        // 4. Reviews. The partial unique index is what holds the
        // one-active-review-per-(user, product) invariant under concurrent
        // submissions; the handler-level existence check only shapes the
        // error message.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT NOT NULL DEFAULT '',
                is_active TEXT NOT NULL DEFAULT 'Y',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (product_id) REFERENCES products(id)
            );
            CREATE UNIQUE INDEX IF NOT EXISTS ux_reviews_one_active
                ON reviews (user_id, product_id) WHERE is_active = 'Y';",
        )
        .map_err(|e| {
            eprintln!("Failed creating reviews table: {}", e);
            e
        })?;

        // 5. Content: banners, blog posts, newsletter subscribers
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS banners (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                image_url TEXT NOT NULL,
                link_url TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_active TEXT NOT NULL DEFAULT 'Y'
            );
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                body TEXT NOT NULL DEFAULT '',
                author_id INTEGER NOT NULL,
                published TEXT NOT NULL DEFAULT 'N',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (author_id) REFERENCES users(id)
            );
            CREATE TABLE IF NOT EXISTS newsletter_subscribers (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                subscribed_at TEXT NOT NULL DEFAULT (datetime('now')),
                is_active TEXT NOT NULL DEFAULT 'Y'
            );",
        )
        .map_err(|e| {
            eprintln!("Failed creating content tables: {}", e);
            e
        })?;

        // 6. Orders, order items, payments
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY,
                reference TEXT NOT NULL UNIQUE,
                user_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending',
                total_cents INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (user_id) REFERENCES users(id)
            );
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY,
                order_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                quantity INTEGER NOT NULL,
                unit_price_cents INTEGER NOT NULL,
                FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE,
                FOREIGN KEY (product_id) REFERENCES products(id)
            );
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY,
                order_id INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL,
                method TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Completed',
                paid_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (order_id) REFERENCES orders(id)
            );",
        )
        .map_err(|e| {
            eprintln!("Failed creating order tables: {}", e);
            e
        })?;

        Ok(())
    }

    /// Seeds the default admin navigation entries and maps them to the
    /// Admin role. Safe to call on every startup.
    pub async fn seed_admin_menus(&self) -> Result<(), Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let defaults = [
            ("Dashboard", "/admin", "chart", 0),
            ("Products", "/admin/products", "box", 1),
            ("Categories", "/admin/categories", "tag", 2),
            ("Collections", "/admin/collections", "layers", 3),
            ("Reviews", "/admin/reviews", "star", 4),
            ("Orders", "/admin/orders", "cart", 5),
            ("Banners", "/admin/banners", "image", 6),
            ("Blog", "/admin/blog", "pen", 7),
            ("Newsletter", "/admin/newsletter", "mail", 8),
            ("Access", "/admin/access", "lock", 9),
        ];

        for (title, path, icon, sort_order) in defaults {
            let existing: Option<i64> = match tx.query_row(
                "SELECT id FROM menus WHERE path = ?",
                [path],
                |row| row.get(0),
            ) {
                Ok(id) => Some(id),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e),
            };
            let menu_id = match existing {
                Some(id) => id,
                None => {
                    tx.execute(
                        "INSERT INTO menus (title, path, icon, sort_order) VALUES (?, ?, ?, ?)",
                        rusqlite::params![title, path, icon, sort_order],
                    )?;
                    tx.last_insert_rowid()
                }
            };
            tx.execute(
                "INSERT OR IGNORE INTO role_menus (role_id, menu_id)
                 SELECT id, ? FROM roles WHERE name = 'Admin'",
                [menu_id],
            )?;
        }

        tx.commit()?;
        logging::log!("[DB] Admin menus seeded");
        Ok(())
    }

    /// Creates the bootstrap admin account if no user holds the Admin role
    /// yet. The password hash is produced by the caller.
    pub async fn seed_admin_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let admin_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users u JOIN roles r ON u.role_id = r.id WHERE r.name = 'Admin'",
            [],
            |row| row.get(0),
        )?;
        if admin_count == 0 {
            tx.execute(
                "INSERT INTO users (username, email, password_hash, role_id)
                 SELECT ?, ?, ?, id FROM roles WHERE name = 'Admin'",
                rusqlite::params![username, email, password_hash],
            )?;
            logging::log!("[DB] Bootstrap admin '{}' created", username);
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use leptos::logging::log;

    // Helper function to create test database
    pub async fn create_test_db() -> Database {
        log!("[TEST] Creating in-memory test database");
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        log!("[TEST] Database schema created");
        db
    }

    /// Registers a customer directly, bypassing the API layer.
    pub async fn insert_test_user(db: &Database, username: &str) -> i64 {
        db.create_user(
            username,
            &format!("{}@example.com", username),
            "$argon2id$test-hash",
            db.role_id_by_name("Customer").await.unwrap().unwrap(),
        )
        .await
        .unwrap()
    }

    /// Inserts an active product with stock and returns its id.
    pub async fn insert_test_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> i64 {
        db.insert_product(&super::NewProduct {
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: format!("{} description", name),
            price_cents,
            stock,
            category_id: None,
            image_url: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_schema_creation() {
        log!("[TEST] Starting test_schema_creation");
        let db = create_test_db().await;

        // Verify tables exist
        let conn = db.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in [
            "roles",
            "users",
            "menus",
            "role_menus",
            "categories",
            "collections",
            "products",
            "collection_products",
            "reviews",
            "banners",
            "posts",
            "newsletter_subscribers",
            "orders",
            "order_items",
            "payments",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = create_test_db().await;
        db.seed_admin_menus().await.unwrap();
        db.seed_admin_menus().await.unwrap();
        db.seed_admin_user("admin", "admin@example.com", "$argon2id$hash")
            .await
            .unwrap();
        db.seed_admin_user("admin2", "admin2@example.com", "$argon2id$hash")
            .await
            .unwrap();

        let conn = db.conn.lock().await;
        let menu_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM menus", [], |row| row.get(0))
            .unwrap();
        assert_eq!(menu_count, 10);

        // Second seed must not create a second admin
        let admin_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users u JOIN roles r ON u.role_id = r.id WHERE r.name = 'Admin'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(admin_count, 1);
    }
}
