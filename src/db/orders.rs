use super::Database;
use crate::models::order::{Order, OrderItem, OrderStatus, Payment};
use leptos::logging::log;
use rusqlite::{params, Error, Transaction};
use thiserror::Error as ThisError;
use uuid::Uuid;

/// One requested line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, ThisError)]
pub enum OrderError {
    #[error("order has no lines")]
    Empty,
    #[error("quantity must be positive for product {0}")]
    BadQuantity(i64),
    #[error("product {0} does not exist")]
    UnknownProduct(i64),
    #[error("not enough stock for product {0}")]
    InsufficientStock(i64),
    #[error("order not found")]
    NotFound,
    #[error("order is {current}, cannot move to {requested}")]
    InvalidTransition { current: String, requested: String },
    #[error(transparent)]
    Db(#[from] Error),
}

const ORDER_COLUMNS: &str =
    "o.id, o.reference, o.user_id, u.username, o.status, o.total_cents, o.created_at, o.updated_at";

fn order_from_row(row: &rusqlite::Row<'_>) -> Result<Order, Error> {
    Ok(Order {
        id: row.get(0)?,
        reference: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        status: row.get(4)?,
        total_cents: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        items: Vec::new(),
    })
}

fn items_for_order(tx_or_conn: &rusqlite::Connection, order_id: i64) -> Result<Vec<OrderItem>, Error> {
    let mut stmt = tx_or_conn.prepare(
        "SELECT oi.id, oi.order_id, oi.product_id, p.name, oi.quantity, oi.unit_price_cents
         FROM order_items oi
         JOIN products p ON oi.product_id = p.id
         WHERE oi.order_id = ?
         ORDER BY oi.id",
    )?;
    let items = stmt.query_map([order_id], |row| {
        Ok(OrderItem {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_id: row.get(2)?,
            product_name: row.get(3)?,
            quantity: row.get(4)?,
            unit_price_cents: row.get(5)?,
        })
    })?;
    items.collect()
}

fn order_status(tx: &Transaction<'_>, order_id: i64) -> Result<Option<OrderStatus>, Error> {
    match tx.query_row("SELECT status FROM orders WHERE id = ?", [order_id], |row| {
        row.get::<_, String>(0)
    }) {
        Ok(s) => Ok(OrderStatus::parse(&s)),
        Err(Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

impl Database {
    /// Creates an order from its lines in one transaction: validates every
    /// product and its stock, prices the lines at current product prices,
    /// decrements stock, and inserts order plus items. Nothing is written
    /// if any line fails.
    pub async fn create_order(
        &self,
        user_id: i64,
        lines: &[NewOrderLine],
    ) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Empty);
        }
        log!("[DB] Creating order for user {} with {} line(s)", user_id, lines.len());

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(OrderError::Db)?;

        let mut total_cents: i64 = 0;
        let mut priced: Vec<(i64, i64, i64)> = Vec::new(); // (product_id, quantity, unit_price)
        for line in lines {
            if line.quantity <= 0 {
                return Err(OrderError::BadQuantity(line.product_id));
            }
            let row: Option<(i64, i64)> = match tx.query_row(
                "SELECT price_cents, stock FROM products WHERE id = ? AND is_active = 'Y'",
                [line.product_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            ) {
                Ok(pair) => Some(pair),
                Err(Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(OrderError::Db(e)),
            };
            let (price_cents, stock) = row.ok_or(OrderError::UnknownProduct(line.product_id))?;
            if stock < line.quantity {
                return Err(OrderError::InsufficientStock(line.product_id));
            }
            total_cents += price_cents * line.quantity;
            priced.push((line.product_id, line.quantity, price_cents));
        }

        let reference = Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO orders (reference, user_id, status, total_cents) VALUES (?, ?, 'Pending', ?)",
            params![reference, user_id, total_cents],
        )
        .map_err(OrderError::Db)?;
        let order_id = tx.last_insert_rowid();

        for (product_id, quantity, unit_price_cents) in &priced {
            tx.execute(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price_cents)
                 VALUES (?, ?, ?, ?)",
                params![order_id, product_id, quantity, unit_price_cents],
            )
            .map_err(OrderError::Db)?;
            tx.execute(
                "UPDATE products SET stock = stock - ?, updated_at = datetime('now') WHERE id = ?",
                params![quantity, product_id],
            )
            .map_err(OrderError::Db)?;
        }

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id WHERE o.id = ?"
        );
        let mut order = tx
            .query_row(&sql, [order_id], order_from_row)
            .map_err(OrderError::Db)?;
        order.items = items_for_order(&tx, order_id).map_err(OrderError::Db)?;

        tx.commit().map_err(OrderError::Db)?;
        log!("[DB] Order {} created, total {} cents", order_id, total_cents);
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id WHERE o.id = ?"
        );
        let mut order = match conn.query_row(&sql, [id], order_from_row) {
            Ok(order) => order,
            Err(Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };
        order.items = items_for_order(&conn, id)?;
        Ok(Some(order))
    }

    pub async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id
             WHERE o.user_id = ? ORDER BY o.created_at DESC, o.id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt.query_map([user_id], order_from_row)?;
        let mut result: Vec<Order> = orders.collect::<Result<_, _>>()?;
        for order in &mut result {
            order.items = items_for_order(&conn, order.id)?;
        }
        Ok(result)
    }

    pub async fn list_all_orders(&self) -> Result<Vec<Order>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id
             ORDER BY o.created_at DESC, o.id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt.query_map([], order_from_row)?;
        let mut result: Vec<Order> = orders.collect::<Result<_, _>>()?;
        for order in &mut result {
            order.items = items_for_order(&conn, order.id)?;
        }
        Ok(result)
    }

    /// Records a payment for the full order total and moves the order from
    /// Pending to Paid, atomically.
    pub async fn pay_order(&self, order_id: i64, method: &str) -> Result<Order, OrderError> {
        log!("[DB] Paying order {}", order_id);
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(OrderError::Db)?;

        let current = order_status(&tx, order_id)
            .map_err(OrderError::Db)?
            .ok_or(OrderError::NotFound)?;
        if current != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                current: current.as_str().to_string(),
                requested: OrderStatus::Paid.as_str().to_string(),
            });
        }

        let total_cents: i64 = tx
            .query_row(
                "SELECT total_cents FROM orders WHERE id = ?",
                [order_id],
                |row| row.get(0),
            )
            .map_err(OrderError::Db)?;
        tx.execute(
            "INSERT INTO payments (order_id, amount_cents, method) VALUES (?, ?, ?)",
            params![order_id, total_cents, method],
        )
        .map_err(OrderError::Db)?;
        tx.execute(
            "UPDATE orders SET status = 'Paid', updated_at = datetime('now') WHERE id = ?",
            [order_id],
        )
        .map_err(OrderError::Db)?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id WHERE o.id = ?"
        );
        let mut order = tx
            .query_row(&sql, [order_id], order_from_row)
            .map_err(OrderError::Db)?;
        order.items = items_for_order(&tx, order_id).map_err(OrderError::Db)?;

        tx.commit().map_err(OrderError::Db)?;
        Ok(order)
    }

    /// Moves an order along its lifecycle. Cancelling a pending order puts
    /// the reserved stock back.
    pub async fn set_order_status(
        &self,
        order_id: i64,
        next: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(OrderError::Db)?;

        let current = order_status(&tx, order_id)
            .map_err(OrderError::Db)?
            .ok_or(OrderError::NotFound)?;
        if !current.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                current: current.as_str().to_string(),
                requested: next.as_str().to_string(),
            });
        }

        if next == OrderStatus::Cancelled {
            tx.execute(
                "UPDATE products SET stock = stock + (
                    SELECT oi.quantity FROM order_items oi
                    WHERE oi.order_id = ? AND oi.product_id = products.id
                 ), updated_at = datetime('now')
                 WHERE id IN (SELECT product_id FROM order_items WHERE order_id = ?)",
                params![order_id, order_id],
            )
            .map_err(OrderError::Db)?;
        }
        tx.execute(
            "UPDATE orders SET status = ?, updated_at = datetime('now') WHERE id = ?",
            params![next.as_str(), order_id],
        )
        .map_err(OrderError::Db)?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN users u ON o.user_id = u.id WHERE o.id = ?"
        );
        let mut order = tx
            .query_row(&sql, [order_id], order_from_row)
            .map_err(OrderError::Db)?;
        order.items = items_for_order(&tx, order_id).map_err(OrderError::Db)?;

        tx.commit().map_err(OrderError::Db)?;
        log!("[DB] Order {} moved to {}", order_id, next.as_str());
        Ok(order)
    }

    pub async fn payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, order_id, amount_cents, method, status, paid_at FROM payments
             WHERE order_id = ? ORDER BY id",
        )?;
        let payments = stmt.query_map([order_id], |row| {
            Ok(Payment {
                id: row.get(0)?,
                order_id: row.get(1)?,
                amount_cents: row.get(2)?,
                method: row.get(3)?,
                status: row.get(4)?,
                paid_at: row.get(5)?,
            })
        })?;
        payments.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_db, insert_test_product, insert_test_user};
    use super::{NewOrderLine, OrderError};
    use crate::models::order::OrderStatus;
    use leptos::logging::log;

    #[tokio::test]
    async fn test_order_creation_prices_and_decrements_stock() {
        log!("[TEST] Starting test_order_creation_prices_and_decrements_stock");
        let db = create_test_db().await;
        let user = insert_test_user(&db, "alice").await;
        let desk = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 10).await;

        let order = db
            .create_order(
                user,
                &[
                    NewOrderLine { product_id: desk, quantity: 1 },
                    NewOrderLine { product_id: lamp, quantity: 2 },
                ],
            )
            .await
            .unwrap();

        assert_eq!(order.status, "Pending");
        assert_eq!(order.total_cents, 45900 + 2 * 7900);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.username.as_deref(), Some("alice"));

        assert_eq!(db.get_product(desk).await.unwrap().unwrap().stock, 3);
        assert_eq!(db.get_product(lamp).await.unwrap().unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_order_creation_fails_atomically() {
        log!("[TEST] Starting test_order_creation_fails_atomically");
        let db = create_test_db().await;
        let user = insert_test_user(&db, "bob").await;
        let desk = insert_test_product(&db, "Walnut Desk", 45900, 4).await;
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 1).await;

        // Second line exceeds stock, so the whole order must be rejected
        let result = db
            .create_order(
                user,
                &[
                    NewOrderLine { product_id: desk, quantity: 2 },
                    NewOrderLine { product_id: lamp, quantity: 5 },
                ],
            )
            .await;
        assert!(matches!(result, Err(OrderError::InsufficientStock(p)) if p == lamp));

        // No stock was touched and no order exists
        assert_eq!(db.get_product(desk).await.unwrap().unwrap().stock, 4);
        assert_eq!(db.get_product(lamp).await.unwrap().unwrap().stock, 1);
        assert!(db.list_orders_for_user(user).await.unwrap().is_empty());

        let unknown = db
            .create_order(user, &[NewOrderLine { product_id: 9999, quantity: 1 }])
            .await;
        assert!(matches!(unknown, Err(OrderError::UnknownProduct(9999))));

        let empty = db.create_order(user, &[]).await;
        assert!(matches!(empty, Err(OrderError::Empty)));
    }

    #[tokio::test]
    async fn test_payment_flow() {
        log!("[TEST] Starting test_payment_flow");
        let db = create_test_db().await;
        let user = insert_test_user(&db, "carol").await;
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 10).await;

        let order = db
            .create_order(user, &[NewOrderLine { product_id: lamp, quantity: 1 }])
            .await
            .unwrap();

        let paid = db.pay_order(order.id, "card").await.unwrap();
        assert_eq!(paid.status, "Paid");

        let payments = db.payments_for_order(order.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 7900);
        assert_eq!(payments[0].method, "card");

        // Paying twice is an invalid transition and records nothing
        let again = db.pay_order(order.id, "card").await;
        assert!(matches!(again, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(db.payments_for_order(order.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        log!("[TEST] Starting test_status_transitions");
        let db = create_test_db().await;
        let user = insert_test_user(&db, "dave").await;
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 10).await;

        let order = db
            .create_order(user, &[NewOrderLine { product_id: lamp, quantity: 1 }])
            .await
            .unwrap();

        // Pending cannot ship
        let shipped = db.set_order_status(order.id, OrderStatus::Shipped).await;
        assert!(matches!(shipped, Err(OrderError::InvalidTransition { .. })));

        db.pay_order(order.id, "card").await.unwrap();
        let shipped = db.set_order_status(order.id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(shipped.status, "Shipped");
        let delivered = db.set_order_status(order.id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.status, "Delivered");

        // Paid/shipped orders cannot be cancelled
        let cancelled = db.set_order_status(order.id, OrderStatus::Cancelled).await;
        assert!(matches!(cancelled, Err(OrderError::InvalidTransition { .. })));

        let missing = db.set_order_status(999, OrderStatus::Paid).await;
        assert!(matches!(missing, Err(OrderError::NotFound)));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock() {
        log!("[TEST] Starting test_cancel_restores_stock");
        let db = create_test_db().await;
        let user = insert_test_user(&db, "erin").await;
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 10).await;

        let order = db
            .create_order(user, &[NewOrderLine { product_id: lamp, quantity: 4 }])
            .await
            .unwrap();
        assert_eq!(db.get_product(lamp).await.unwrap().unwrap().stock, 6);

        let cancelled = db.set_order_status(order.id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.status, "Cancelled");
        assert_eq!(db.get_product(lamp).await.unwrap().unwrap().stock, 10);
    }
}
