use super::Database;
use crate::models::analytics::{DailySales, DashboardSummary, ProductRating, TopProduct};
use crate::models::order::Order;
use leptos::logging::log;
use rusqlite::Error;

// Orders that count toward revenue: paid and anything after paid.
const REVENUE_STATUSES: &str = "('Paid', 'Shipped', 'Delivered')";

impl Database {
    /// Headline numbers for the admin dashboard in one pass.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT
                (SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE status IN {REVENUE_STATUSES}),
                (SELECT COUNT(*) FROM orders WHERE status != 'Cancelled'),
                (SELECT COUNT(*) FROM users u JOIN roles r ON u.role_id = r.id
                 WHERE r.name = 'Customer' AND u.is_active = 'Y'),
                (SELECT COUNT(*) FROM products WHERE is_active = 'Y'),
                (SELECT COUNT(*) FROM reviews WHERE is_active = 'Y'),
                (SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active = 'Y')"
        );
        let summary = conn.query_row(&sql, [], |row| {
            Ok(DashboardSummary {
                revenue_cents: row.get(0)?,
                order_count: row.get(1)?,
                customer_count: row.get(2)?,
                product_count: row.get(3)?,
                review_count: row.get(4)?,
                subscriber_count: row.get(5)?,
            })
        })?;
        log!("[DB] Dashboard summary computed");
        Ok(summary)
    }

    /// Paid orders and revenue grouped by calendar day for the last `days`
    /// days. Days with no sales are absent from the result.
    pub async fn sales_by_day(&self, days: i64) -> Result<Vec<DailySales>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT date(created_at), COUNT(*), SUM(total_cents)
             FROM orders
             WHERE status IN {REVENUE_STATUSES}
               AND created_at >= datetime('now', '-' || ? || ' days')
             GROUP BY date(created_at)
             ORDER BY date(created_at)"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([days], |row| {
            Ok(DailySales {
                day: row.get(0)?,
                orders: row.get(1)?,
                revenue_cents: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    /// Best sellers by units across revenue-bearing orders.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT p.id, p.name, SUM(oi.quantity), SUM(oi.quantity * oi.unit_price_cents)
             FROM order_items oi
             JOIN orders o ON oi.order_id = o.id
             JOIN products p ON oi.product_id = p.id
             WHERE o.status IN {REVENUE_STATUSES}
             GROUP BY p.id, p.name
             ORDER BY SUM(oi.quantity) DESC, p.id
             LIMIT ?"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([limit], |row| {
            Ok(TopProduct {
                product_id: row.get(0)?,
                name: row.get(1)?,
                units_sold: row.get(2)?,
                revenue_cents: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    /// Average rating per product over active reviews only.
    pub async fn product_ratings(&self) -> Result<Vec<ProductRating>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, COUNT(rv.id), AVG(rv.rating)
             FROM reviews rv
             JOIN products p ON rv.product_id = p.id
             WHERE rv.is_active = 'Y'
             GROUP BY p.id, p.name
             ORDER BY AVG(rv.rating) DESC, p.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProductRating {
                product_id: row.get(0)?,
                name: row.get(1)?,
                review_count: row.get(2)?,
                avg_rating: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    pub async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT o.id, o.reference, o.user_id, u.username, o.status, o.total_cents,
                    o.created_at, o.updated_at
             FROM orders o JOIN users u ON o.user_id = u.id
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT ?",
        )?;
        let rows = stmt.query_map([limit], |row| {
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
        })?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_db, insert_test_product, insert_test_user};
    use super::super::{Database, NewOrderLine};
    use crate::models::order::OrderStatus;
    use leptos::logging::log;

    async fn seed_shop(db: &Database) -> (i64, i64, i64) {
        let alice = insert_test_user(db, "alice").await;
        let desk = insert_test_product(db, "Walnut Desk", 45900, 10).await;
        let lamp = insert_test_product(db, "Desk Lamp", 7900, 20).await;
        (alice, desk, lamp)
    }

    #[tokio::test]
    async fn test_dashboard_summary_excludes_inactive_data() {
        log!("[TEST] Starting test_dashboard_summary_excludes_inactive_data");
        let db = create_test_db().await;
        let (alice, desk, lamp) = seed_shop(&db).await;

        let paid = db
            .create_order(alice, &[NewOrderLine { product_id: desk, quantity: 1 }])
            .await
            .unwrap();
        db.pay_order(paid.id, "card").await.unwrap();

        // A pending and a cancelled order contribute no revenue
        db.create_order(alice, &[NewOrderLine { product_id: lamp, quantity: 1 }])
            .await
            .unwrap();
        let cancelled = db
            .create_order(alice, &[NewOrderLine { product_id: lamp, quantity: 2 }])
            .await
            .unwrap();
        db.set_order_status(cancelled.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let review = db.insert_review(alice, desk, 5, "Great").await.unwrap();
        db.insert_review(alice, lamp, 3, "Fine").await.unwrap();
        db.soft_delete_review(review.id).await.unwrap();

        db.subscribe_email("a@example.com").await.unwrap();

        let summary = db.dashboard_summary().await.unwrap();
        assert_eq!(summary.revenue_cents, 45900);
        assert_eq!(summary.order_count, 2, "cancelled order is not counted");
        assert_eq!(summary.customer_count, 1);
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.review_count, 1, "soft-deleted review is not counted");
        assert_eq!(summary.subscriber_count, 1);
    }

    #[tokio::test]
    async fn test_sales_by_day_and_top_products() {
        log!("[TEST] Starting test_sales_by_day_and_top_products");
        let db = create_test_db().await;
        let (alice, desk, lamp) = seed_shop(&db).await;

        for _ in 0..3 {
            let order = db
                .create_order(alice, &[NewOrderLine { product_id: lamp, quantity: 2 }])
                .await
                .unwrap();
            db.pay_order(order.id, "card").await.unwrap();
            // One active review per (user, product): make room for the next loop
            let reviews = db.get_reviews_by_product(lamp).await.unwrap();
            if let Some(r) = reviews.first() {
                db.soft_delete_review(r.id).await.unwrap();
            }
            db.insert_review(alice, lamp, 4, "Still good").await.unwrap();
        }
        let desk_order = db
            .create_order(alice, &[NewOrderLine { product_id: desk, quantity: 1 }])
            .await
            .unwrap();
        db.pay_order(desk_order.id, "transfer").await.unwrap();

        let sales = db.sales_by_day(30).await.unwrap();
        assert_eq!(sales.len(), 1, "all test orders land on today");
        assert_eq!(sales[0].orders, 4);
        assert_eq!(sales[0].revenue_cents, 3 * 2 * 7900 + 45900);

        let top = db.top_products(5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, lamp);
        assert_eq!(top[0].units_sold, 6);
        assert_eq!(top[1].product_id, desk);

        let ratings = db.product_ratings().await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].product_id, lamp);
        assert_eq!(ratings[0].review_count, 1);
        assert!((ratings[0].avg_rating - 4.0).abs() < f64::EPSILON);

        let recent = db.recent_orders(2).await.unwrap();
        assert_eq!(recent.len(), 2);
    }
}
