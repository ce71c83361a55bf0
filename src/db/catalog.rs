use super::Database;
use crate::models::category::Category;
use crate::models::collection::Collection;
use crate::models::product::Product;
use leptos::logging::log;
use rusqlite::{params, Error, ToSql};

/// Fields for a product being created. Ids and timestamps come from the
/// database.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}

/// Partial update for a product; None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub category_id: Option<Option<i64>>,
    pub image_url: Option<Option<String>>,
}

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price_cents, p.stock,
            p.category_id, c.name, p.image_url, p.is_active, p.created_at, p.updated_at";

fn product_from_row(row: &rusqlite::Row<'_>) -> Result<Product, Error> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        price_cents: row.get(4)?,
        stock: row.get(5)?,
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        image_url: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn category_from_row(row: &rusqlite::Row<'_>) -> Result<Category, Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
    })
}

fn collection_from_row(row: &rusqlite::Row<'_>) -> Result<Collection, Error> {
    Ok(Collection {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
    })
}

impl Database {
    // ---- products ----

    pub async fn insert_product(&self, product: &NewProduct) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO products (name, slug, description, price_cents, stock, category_id, image_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                product.name,
                product.slug,
                product.description,
                product.price_cents,
                product.stock,
                product.category_id,
                product.image_url,
            ],
        )?;
        let id = conn.last_insert_rowid();
        log!("[DB] Product created: {} (id {})", product.name, id);
        Ok(id)
    }

    pub async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, Error> {
        {
            let conn = self.conn.lock().await;

            let mut sets = vec!["updated_at = datetime('now')".to_string()];
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(name) = &patch.name {
                sets.push("name = ?".to_string());
                values.push(Box::new(name.clone()));
            }
            if let Some(description) = &patch.description {
                sets.push("description = ?".to_string());
                values.push(Box::new(description.clone()));
            }
            if let Some(price_cents) = patch.price_cents {
                sets.push("price_cents = ?".to_string());
                values.push(Box::new(price_cents));
            }
            if let Some(stock) = patch.stock {
                sets.push("stock = ?".to_string());
                values.push(Box::new(stock));
            }
            if let Some(category_id) = &patch.category_id {
                sets.push("category_id = ?".to_string());
                values.push(Box::new(*category_id));
            }
            if let Some(image_url) = &patch.image_url {
                sets.push("image_url = ?".to_string());
                values.push(Box::new(image_url.clone()));
            }
            values.push(Box::new(id));

            let sql = format!(
                "UPDATE products SET {} WHERE id = ? AND is_active = 'Y'",
                sets.join(", ")
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            let changed = conn.execute(&sql, &params[..])?;
            if changed == 0 {
                return Ok(None);
            }
            log!("[DB] Product {} updated", id);
        }
        self.get_product(id).await
    }

    pub async fn soft_delete_product(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE products SET is_active = 'N', updated_at = datetime('now')
             WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        if changed > 0 {
            log!("[DB] Product {} soft-deleted", id);
        }
        Ok(changed > 0)
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.id = ? AND p.is_active = 'Y'"
        );
        match conn.query_row(&sql, [id], product_from_row) {
            Ok(product) => Ok(Some(product)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.slug = ? AND p.is_active = 'Y'"
        );
        match conn.query_row(&sql, [slug], product_from_row) {
            Ok(product) => Ok(Some(product)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Active products, optionally narrowed to a category or a collection.
    pub async fn list_products(
        &self,
        category_slug: Option<&str>,
        collection_slug: Option<&str>,
    ) -> Result<Vec<Product>, Error> {
        let conn = self.conn.lock().await;

        let mut sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.is_active = 'Y'"
        );
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(category_slug) = category_slug {
            sql.push_str(" AND c.slug = ? AND c.is_active = 'Y'");
            values.push(Box::new(category_slug.to_string()));
        }
        if let Some(collection_slug) = collection_slug {
            sql.push_str(
                " AND p.id IN (
                    SELECT cp.product_id FROM collection_products cp
                    JOIN collections col ON cp.collection_id = col.id
                    WHERE col.slug = ? AND col.is_active = 'Y'
                )",
            );
            values.push(Box::new(collection_slug.to_string()));
        }
        sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let products = stmt.query_map(&params[..], product_from_row)?;
        let result: Vec<Product> = products.collect::<Result<_, _>>()?;
        log!("[DB] Fetched {} product(s)", result.len());
        Ok(result)
    }

    // ---- categories ----

    pub async fn insert_category(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO categories (name, slug, description) VALUES (?, ?, ?)",
            params![name, slug, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub async fn update_category(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Category>, Error> {
        {
            let conn = self.conn.lock().await;
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(name) = name {
                sets.push("name = ?");
                values.push(Box::new(name.to_string()));
            }
            if let Some(description) = description {
                sets.push("description = ?");
                values.push(Box::new(description.to_string()));
            }
            if sets.is_empty() {
                drop(conn);
                return self.get_category(id).await;
            }
            values.push(Box::new(id));
            let sql = format!(
                "UPDATE categories SET {} WHERE id = ? AND is_active = 'Y'",
                sets.join(", ")
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            if conn.execute(&sql, &params[..])? == 0 {
                return Ok(None);
            }
        }
        self.get_category(id).await
    }

    pub async fn soft_delete_category(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE categories SET is_active = 'N' WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        Ok(changed > 0)
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, Error> {
        let conn = self.conn.lock().await;
        match conn.query_row(
            "SELECT id, name, slug, description, is_active FROM categories
             WHERE id = ? AND is_active = 'Y'",
            [id],
            category_from_row,
        ) {
            Ok(category) => Ok(Some(category)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, slug, description, is_active FROM categories
             WHERE is_active = 'Y' ORDER BY name",
        )?;
        let categories = stmt.query_map([], category_from_row)?;
        categories.collect()
    }

    // ---- collections ----

    pub async fn insert_collection(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO collections (name, slug, description) VALUES (?, ?, ?)",
            params![name, slug, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub async fn soft_delete_collection(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE collections SET is_active = 'N' WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        Ok(changed > 0)
    }

    pub async fn list_collections(&self) -> Result<Vec<Collection>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, slug, description, is_active FROM collections
             WHERE is_active = 'Y' ORDER BY name",
        )?;
        let collections = stmt.query_map([], collection_from_row)?;
        collections.collect()
    }

    pub async fn add_product_to_collection(
        &self,
        collection_id: i64,
        product_id: i64,
    ) -> Result<(), Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO collection_products (collection_id, product_id) VALUES (?, ?)",
            params![collection_id, product_id],
        )?;
        Ok(())
    }

    pub async fn remove_product_from_collection(
        &self,
        collection_id: i64,
        product_id: i64,
    ) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM collection_products WHERE collection_id = ? AND product_id = ?",
            params![collection_id, product_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_db, insert_test_product};
    use super::{NewProduct, ProductPatch};
    use leptos::logging::log;

    #[tokio::test]
    async fn test_product_lifecycle() {
        log!("[TEST] Starting test_product_lifecycle");
        let db = create_test_db().await;
        let category_id = db
            .insert_category("Lighting", "lighting", Some("Lamps and fixtures"))
            .await
            .unwrap();

        let id = db
            .insert_product(&NewProduct {
                name: "Arc Lamp".into(),
                slug: "arc-lamp".into(),
                description: "Floor-standing arc lamp".into(),
                price_cents: 18900,
                stock: 6,
                category_id: Some(category_id),
                image_url: None,
            })
            .await
            .unwrap();

        let product = db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.category_name.as_deref(), Some("Lighting"));
        assert_eq!(product.price_cents, 18900);

        let by_slug = db.get_product_by_slug("arc-lamp").await.unwrap().unwrap();
        assert_eq!(by_slug.id, id);

        // Patch a subset of fields
        let updated = db
            .update_product(
                id,
                &ProductPatch {
                    price_cents: Some(17900),
                    stock: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price_cents, 17900);
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.name, "Arc Lamp");

        // Soft delete removes it from the read paths
        assert!(db.soft_delete_product(id).await.unwrap());
        assert!(db.get_product(id).await.unwrap().is_none());
        assert!(db.list_products(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_products_filters() {
        log!("[TEST] Starting test_list_products_filters");
        let db = create_test_db().await;
        let seating = db.insert_category("Seating", "seating", None).await.unwrap();

        let chair = db
            .insert_product(&NewProduct {
                name: "Oak Chair".into(),
                slug: "oak-chair".into(),
                description: String::new(),
                price_cents: 8900,
                stock: 12,
                category_id: Some(seating),
                image_url: None,
            })
            .await
            .unwrap();
        let lamp = insert_test_product(&db, "Desk Lamp", 7900, 10).await;

        let all = db.list_products(None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let seated = db.list_products(Some("seating"), None).await.unwrap();
        assert_eq!(seated.len(), 1);
        assert_eq!(seated[0].id, chair);

        let summer = db
            .insert_collection("Summer Sale", "summer-sale", None)
            .await
            .unwrap();
        db.add_product_to_collection(summer, lamp).await.unwrap();

        let on_sale = db.list_products(None, Some("summer-sale")).await.unwrap();
        assert_eq!(on_sale.len(), 1);
        assert_eq!(on_sale[0].id, lamp);

        assert!(db.remove_product_from_collection(summer, lamp).await.unwrap());
        assert!(db.list_products(None, Some("summer-sale")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_update_and_delete() {
        let db = create_test_db().await;
        let id = db.insert_category("Decor", "decor", None).await.unwrap();

        let updated = db
            .update_category(id, Some("Home Decor"), Some("Vases and prints"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Home Decor");

        assert!(db.soft_delete_category(id).await.unwrap());
        assert!(db.get_category(id).await.unwrap().is_none());
        assert!(db.list_categories().await.unwrap().is_empty());
    }
}
