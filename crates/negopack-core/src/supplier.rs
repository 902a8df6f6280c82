use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An independent supplier entity. Referenced by many deals and never
/// cascade-deleted with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Writable supplier fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category: String,
}

impl SupplierInput {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::error::NegoError::Validation(
                "supplier name is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        let input = SupplierInput {
            name: " ".into(),
            contact_person: String::new(),
            email: String::new(),
            phone: String::new(),
            category: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
