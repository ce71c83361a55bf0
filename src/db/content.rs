use super::Database;
use crate::models::banner::Banner;
use crate::models::newsletter::Subscriber;
use crate::models::post::Post;
use leptos::logging::log;
use rusqlite::{params, Error, ToSql};

fn banner_from_row(row: &rusqlite::Row<'_>) -> Result<Banner, Error> {
    Ok(Banner {
        id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        link_url: row.get(3)?,
        sort_order: row.get(4)?,
        is_active: row.get(5)?,
    })
}

const POST_COLUMNS: &str =
    "po.id, po.title, po.slug, po.body, po.author_id, u.username, po.published, po.created_at, po.updated_at";

fn post_from_row(row: &rusqlite::Row<'_>) -> Result<Post, Error> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        body: row.get(3)?,
        author_id: row.get(4)?,
        author_name: row.get(5)?,
        published: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl Database {
    // ---- banners ----

    pub async fn insert_banner(
        &self,
        title: &str,
        image_url: &str,
        link_url: Option<&str>,
        sort_order: i64,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO banners (title, image_url, link_url, sort_order) VALUES (?, ?, ?, ?)",
            params![title, image_url, link_url, sort_order],
        )?;
        let id = conn.last_insert_rowid();
        log!("[DB] Banner created: {} (id {})", title, id);
        Ok(id)
    }

    pub async fn update_banner(
        &self,
        id: i64,
        title: Option<&str>,
        image_url: Option<&str>,
        link_url: Option<Option<&str>>,
        sort_order: Option<i64>,
    ) -> Result<Option<Banner>, Error> {
        {
            let conn = self.conn.lock().await;
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(title) = title {
                sets.push("title = ?");
                values.push(Box::new(title.to_string()));
            }
            if let Some(image_url) = image_url {
                sets.push("image_url = ?");
                values.push(Box::new(image_url.to_string()));
            }
            if let Some(link_url) = link_url {
                sets.push("link_url = ?");
                values.push(Box::new(link_url.map(|s| s.to_string())));
            }
            if let Some(sort_order) = sort_order {
                sets.push("sort_order = ?");
                values.push(Box::new(sort_order));
            }
            if sets.is_empty() {
                drop(conn);
                return self.get_banner(id).await;
            }
            values.push(Box::new(id));
            let sql = format!(
                "UPDATE banners SET {} WHERE id = ? AND is_active = 'Y'",
                sets.join(", ")
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            if conn.execute(&sql, &params[..])? == 0 {
                return Ok(None);
            }
        }
        self.get_banner(id).await
    }

    pub async fn get_banner(&self, id: i64) -> Result<Option<Banner>, Error> {
        let conn = self.conn.lock().await;
        match conn.query_row(
            "SELECT id, title, image_url, link_url, sort_order, is_active FROM banners
             WHERE id = ? AND is_active = 'Y'",
            [id],
            banner_from_row,
        ) {
            Ok(banner) => Ok(Some(banner)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Active banners in display order, for the storefront carousel.
    pub async fn list_active_banners(&self) -> Result<Vec<Banner>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, title, image_url, link_url, sort_order, is_active FROM banners
             WHERE is_active = 'Y' ORDER BY sort_order, id",
        )?;
        let banners = stmt.query_map([], banner_from_row)?;
        banners.collect()
    }

    pub async fn soft_delete_banner(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE banners SET is_active = 'N' WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        Ok(changed > 0)
    }

    // ---- blog posts ----

    pub async fn insert_post(
        &self,
        title: &str,
        slug: &str,
        body: &str,
        author_id: i64,
        published: bool,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO posts (title, slug, body, author_id, published) VALUES (?, ?, ?, ?, ?)",
            params![title, slug, body, author_id, if published { "Y" } else { "N" }],
        )?;
        let id = conn.last_insert_rowid();
        log!("[DB] Post created: {} (id {})", slug, id);
        Ok(id)
    }

    pub async fn update_post(
        &self,
        id: i64,
        title: Option<&str>,
        body: Option<&str>,
        published: Option<bool>,
    ) -> Result<Option<Post>, Error> {
        {
            let conn = self.conn.lock().await;
            let mut sets = vec!["updated_at = datetime('now')".to_string()];
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(title) = title {
                sets.push("title = ?".to_string());
                values.push(Box::new(title.to_string()));
            }
            if let Some(body) = body {
                sets.push("body = ?".to_string());
                values.push(Box::new(body.to_string()));
            }
            if let Some(published) = published {
                sets.push("published = ?".to_string());
                values.push(Box::new(if published { "Y" } else { "N" }.to_string()));
            }
            values.push(Box::new(id));
            let sql = format!("UPDATE posts SET {} WHERE id = ?", sets.join(", "));
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            if conn.execute(&sql, &params[..])? == 0 {
                return Ok(None);
            }
        }
        self.get_post(id).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
        if changed > 0 {
            log!("[DB] Post {} deleted", id);
        }
        Ok(changed > 0)
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts po JOIN users u ON po.author_id = u.id WHERE po.id = ?"
        );
        match conn.query_row(&sql, [id], post_from_row) {
            Ok(post) => Ok(Some(post)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Published post for the public blog page.
    pub async fn get_published_post_by_slug(&self, slug: &str) -> Result<Option<Post>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts po JOIN users u ON po.author_id = u.id
             WHERE po.slug = ? AND po.published = 'Y'"
        );
        match conn.query_row(&sql, [slug], post_from_row) {
            Ok(post) => Ok(Some(post)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_posts(&self, published_only: bool) -> Result<Vec<Post>, Error> {
        let conn = self.conn.lock().await;
        let mut sql = format!(
            "SELECT {POST_COLUMNS} FROM posts po JOIN users u ON po.author_id = u.id"
        );
        if published_only {
            sql.push_str(" WHERE po.published = 'Y'");
        }
        sql.push_str(" ORDER BY po.created_at DESC, po.id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt.query_map([], post_from_row)?;
        posts.collect()
    }

    // ---- newsletter ----

    /// Subscribing an address that already exists just reactivates it.
    pub async fn subscribe_email(&self, email: &str) -> Result<Subscriber, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO newsletter_subscribers (email) VALUES (?)
             ON CONFLICT(email) DO UPDATE SET is_active = 'Y'",
            [email],
        )?;
        let subscriber = conn.query_row(
            "SELECT id, email, subscribed_at, is_active FROM newsletter_subscribers WHERE email = ?",
            [email],
            |row| {
                Ok(Subscriber {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    subscribed_at: row.get(2)?,
                    is_active: row.get(3)?,
                })
            },
        )?;
        log!("[DB] Newsletter subscription for {}", email);
        Ok(subscriber)
    }

    pub async fn unsubscribe_email(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE newsletter_subscribers SET is_active = 'N' WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        Ok(changed > 0)
    }

    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, email, subscribed_at, is_active FROM newsletter_subscribers
             WHERE is_active = 'Y' ORDER BY subscribed_at DESC, id DESC",
        )?;
        let subscribers = stmt.query_map([], |row| {
            Ok(Subscriber {
                id: row.get(0)?,
                email: row.get(1)?,
                subscribed_at: row.get(2)?,
                is_active: row.get(3)?,
            })
        })?;
        subscribers.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_test_db, insert_test_user};
    use leptos::logging::log;

    #[tokio::test]
    async fn test_banner_ordering_and_delete() {
        log!("[TEST] Starting test_banner_ordering_and_delete");
        let db = create_test_db().await;
        let late = db
            .insert_banner("Clearance", "/img/clearance.jpg", None, 5)
            .await
            .unwrap();
        let early = db
            .insert_banner("New Season", "/img/season.jpg", Some("/products"), 1)
            .await
            .unwrap();

        let banners = db.list_active_banners().await.unwrap();
        assert_eq!(banners.len(), 2);
        assert_eq!(banners[0].id, early, "banners come back in sort order");
        assert_eq!(banners[1].id, late);

        assert!(db.soft_delete_banner(late).await.unwrap());
        let banners = db.list_active_banners().await.unwrap();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].id, early);
    }

    #[tokio::test]
    async fn test_post_publishing_flow() {
        log!("[TEST] Starting test_post_publishing_flow");
        let db = create_test_db().await;
        let author = insert_test_user(&db, "editor").await;

        let id = db
            .insert_post("Autumn lookbook", "autumn-lookbook", "Draft body", author, false)
            .await
            .unwrap();

        // Draft is invisible to the public paths
        assert!(db.list_posts(true).await.unwrap().is_empty());
        assert!(db
            .get_published_post_by_slug("autumn-lookbook")
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.list_posts(false).await.unwrap().len(), 1);

        db.update_post(id, None, Some("Final body"), Some(true))
            .await
            .unwrap()
            .unwrap();
        let post = db
            .get_published_post_by_slug("autumn-lookbook")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.body, "Final body");
        assert_eq!(post.author_name.as_deref(), Some("editor"));

        assert!(db.delete_post(id).await.unwrap());
        assert!(db.list_posts(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        log!("[TEST] Starting test_subscribe_is_idempotent");
        let db = create_test_db().await;

        let first = db.subscribe_email("shopper@example.com").await.unwrap();
        let second = db.subscribe_email("shopper@example.com").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.list_subscribers().await.unwrap().len(), 1);

        assert!(db.unsubscribe_email(first.id).await.unwrap());
        assert!(db.list_subscribers().await.unwrap().is_empty());

        // Re-subscribing after an unsubscribe reactivates the same row
        let back = db.subscribe_email("shopper@example.com").await.unwrap();
        assert_eq!(back.id, first.id);
        assert_eq!(back.is_active, "Y");
    }
}
