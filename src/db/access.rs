use super::Database;
use crate::models::role::{Menu, Role};
use leptos::logging::log;
use rusqlite::{params, Error, ToSql};

fn menu_from_row(row: &rusqlite::Row<'_>) -> Result<Menu, Error> {
    Ok(Menu {
        id: row.get(0)?,
        title: row.get(1)?,
        path: row.get(2)?,
        icon: row.get(3)?,
        sort_order: row.get(4)?,
        is_active: row.get(5)?,
    })
}

impl Database {
    pub async fn list_roles(&self) -> Result<Vec<Role>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name, description FROM roles ORDER BY id")?;
        let roles = stmt.query_map([], |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        roles.collect()
    }

    pub async fn insert_menu(
        &self,
        title: &str,
        path: &str,
        icon: Option<&str>,
        sort_order: i64,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO menus (title, path, icon, sort_order) VALUES (?, ?, ?, ?)",
            params![title, path, icon, sort_order],
        )?;
        let id = conn.last_insert_rowid();
        log!("[DB] Menu created: {} (id {})", title, id);
        Ok(id)
    }

    pub async fn update_menu(
        &self,
        id: i64,
        title: Option<&str>,
        path: Option<&str>,
        icon: Option<Option<&str>>,
        sort_order: Option<i64>,
    ) -> Result<Option<Menu>, Error> {
        {
            let conn = self.conn.lock().await;
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(title) = title {
                sets.push("title = ?");
                values.push(Box::new(title.to_string()));
            }
            if let Some(path) = path {
                sets.push("path = ?");
                values.push(Box::new(path.to_string()));
            }
            if let Some(icon) = icon {
                sets.push("icon = ?");
                values.push(Box::new(icon.map(|s| s.to_string())));
            }
            if let Some(sort_order) = sort_order {
                sets.push("sort_order = ?");
                values.push(Box::new(sort_order));
            }
            if sets.is_empty() {
                drop(conn);
                return self.get_menu(id).await;
            }
            values.push(Box::new(id));
            let sql = format!(
                "UPDATE menus SET {} WHERE id = ? AND is_active = 'Y'",
                sets.join(", ")
            );
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
            if conn.execute(&sql, &params[..])? == 0 {
                return Ok(None);
            }
        }
        self.get_menu(id).await
    }

    pub async fn get_menu(&self, id: i64) -> Result<Option<Menu>, Error> {
        let conn = self.conn.lock().await;
        match conn.query_row(
            "SELECT id, title, path, icon, sort_order, is_active FROM menus
             WHERE id = ? AND is_active = 'Y'",
            [id],
            menu_from_row,
        ) {
            Ok(menu) => Ok(Some(menu)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn soft_delete_menu(&self, id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE menus SET is_active = 'N' WHERE id = ? AND is_active = 'Y'",
            [id],
        )?;
        Ok(changed > 0)
    }

    pub async fn list_menus(&self) -> Result<Vec<Menu>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, title, path, icon, sort_order, is_active FROM menus
             WHERE is_active = 'Y' ORDER BY sort_order, id",
        )?;
        let menus = stmt.query_map([], menu_from_row)?;
        menus.collect()
    }

    pub async fn assign_menu_to_role(&self, role_id: i64, menu_id: i64) -> Result<(), Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO role_menus (role_id, menu_id) VALUES (?, ?)",
            params![role_id, menu_id],
        )?;
        log!("[DB] Menu {} assigned to role {}", menu_id, role_id);
        Ok(())
    }

    pub async fn unassign_menu_from_role(&self, role_id: i64, menu_id: i64) -> Result<bool, Error> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM role_menus WHERE role_id = ? AND menu_id = ?",
            params![role_id, menu_id],
        )?;
        Ok(changed > 0)
    }

    /// The navigation a given role sees, in display order. Drives the admin
    /// panel sidebar.
    pub async fn menus_for_role(&self, role_name: &str) -> Result<Vec<Menu>, Error> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.title, m.path, m.icon, m.sort_order, m.is_active
             FROM menus m
             JOIN role_menus rm ON m.id = rm.menu_id
             JOIN roles r ON rm.role_id = r.id
             WHERE r.name = ? AND m.is_active = 'Y'
             ORDER BY m.sort_order, m.id",
        )?;
        let menus = stmt.query_map([role_name], menu_from_row)?;
        menus.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::create_test_db;
    use leptos::logging::log;

    #[tokio::test]
    async fn test_menu_assignment_drives_navigation() {
        log!("[TEST] Starting test_menu_assignment_drives_navigation");
        let db = create_test_db().await;
        db.seed_admin_menus().await.unwrap();

        let admin_menus = db.menus_for_role("Admin").await.unwrap();
        assert_eq!(admin_menus.len(), 10);
        assert_eq!(admin_menus[0].title, "Dashboard");

        // Customers see nothing until something is assigned
        assert!(db.menus_for_role("Customer").await.unwrap().is_empty());

        let customer = db.role_id_by_name("Customer").await.unwrap().unwrap();
        let orders_menu = admin_menus.iter().find(|m| m.title == "Orders").unwrap();
        db.assign_menu_to_role(customer, orders_menu.id).await.unwrap();

        let customer_menus = db.menus_for_role("Customer").await.unwrap();
        assert_eq!(customer_menus.len(), 1);
        assert_eq!(customer_menus[0].title, "Orders");

        assert!(db.unassign_menu_from_role(customer, orders_menu.id).await.unwrap());
        assert!(db.menus_for_role("Customer").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_menu_leaves_navigation() {
        let db = create_test_db().await;
        db.seed_admin_menus().await.unwrap();

        let menus = db.menus_for_role("Admin").await.unwrap();
        let banner_menu = menus.iter().find(|m| m.title == "Banners").unwrap();
        assert!(db.soft_delete_menu(banner_menu.id).await.unwrap());

        let menus = db.menus_for_role("Admin").await.unwrap();
        assert_eq!(menus.len(), 9);
        assert!(menus.iter().all(|m| m.title != "Banners"));
    }

    #[tokio::test]
    async fn test_menu_update() {
        let db = create_test_db().await;
        let id = db.insert_menu("Reports", "/admin/reports", None, 20).await.unwrap();

        let updated = db
            .update_menu(id, Some("Sales Reports"), None, Some(Some("chart")), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Sales Reports");
        assert_eq!(updated.icon.as_deref(), Some("chart"));
        assert_eq!(updated.path, "/admin/reports");
    }
}
