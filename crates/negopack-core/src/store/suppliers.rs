//! Supplier CRUD. Suppliers are visible to every signed-in account and are
//! independent of deals: deleting a deal never touches its supplier, and a
//! supplier still referenced by deals cannot be removed.

use super::{map_constraint, uuid_col, Store};
use crate::account::Profile;
use crate::error::{NegoError, Result};
use crate::supplier::{Supplier, SupplierInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

const SUPPLIER_COLS: &str = "id, name, contact_person, email, phone, category, owner_id, created_at";

fn read_supplier(row: &rusqlite::Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        contact_person: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        category: row.get(5)?,
        owner_id: uuid_col(row, 6)?,
        created_at: row.get(7)?,
    })
}

impl Store {
    pub fn create_supplier(&self, actor: &Profile, input: SupplierInput) -> Result<Supplier> {
        input.validate()?;
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person,
            email: input.email,
            phone: input.phone,
            category: input.category,
            owner_id: actor.id,
            created_at: Utc::now(),
        };
        let conn = self.conn();
        conn.execute(
            "INSERT INTO suppliers (id, name, contact_person, email, phone, category, owner_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                supplier.id.to_string(),
                supplier.name,
                supplier.contact_person,
                supplier.email,
                supplier.phone,
                supplier.category,
                supplier.owner_id.to_string(),
                supplier.created_at,
            ],
        )?;
        Ok(supplier)
    }

    pub fn get_supplier(&self, id: Uuid) -> Result<Supplier> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SUPPLIER_COLS} FROM suppliers WHERE id = ?1"),
            [id.to_string()],
            read_supplier,
        )
        .optional()?
        .ok_or_else(|| NegoError::SupplierNotFound(id.to_string()))
    }

    pub fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {SUPPLIER_COLS} FROM suppliers ORDER BY name"))?;
        let rows = stmt.query_map([], read_supplier)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_supplier(
        &self,
        actor: &Profile,
        id: Uuid,
        input: SupplierInput,
    ) -> Result<Supplier> {
        input.validate()?;
        let existing = self.get_supplier(id)?;
        if existing.owner_id != actor.id && !actor.role.is_admin() {
            return Err(NegoError::Forbidden(
                "supplier belongs to another account".into(),
            ));
        }
        {
            let conn = self.conn();
            conn.execute(
                "UPDATE suppliers SET name = ?1, contact_person = ?2, email = ?3, phone = ?4, \
                 category = ?5 WHERE id = ?6",
                params![
                    input.name.trim(),
                    input.contact_person,
                    input.email,
                    input.phone,
                    input.category,
                    id.to_string(),
                ],
            )?;
        }
        self.get_supplier(id)
    }

    pub fn delete_supplier(&self, actor: &Profile, id: Uuid) -> Result<()> {
        let existing = self.get_supplier(id)?;
        if existing.owner_id != actor.id && !actor.role.is_admin() {
            return Err(NegoError::Forbidden(
                "supplier belongs to another account".into(),
            ));
        }
        let conn = self.conn();
        conn.execute("DELETE FROM suppliers WHERE id = ?1", [id.to_string()])
            .map_err(|e| map_constraint(e, "supplier is referenced by existing deals"))?;
        Ok(())
    }
}
