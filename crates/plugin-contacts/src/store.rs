//! In-memory contact storage.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

/// Fields of a contact to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

impl NewContact {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Contact name must not be empty"));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(AppError::validation(format!(
                    "'{email}' is not a valid email address"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    contacts: Vec<Contact>,
    next_id: u64,
}

/// Contacts kept in insertion order.
#[derive(Debug, Default)]
pub struct ContactStore {
    inner: RwLock<Inner>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `contacts`; invalid entries are skipped.
    pub async fn seeded(contacts: Vec<NewContact>) -> Self {
        let store = Self::new();
        for contact in contacts {
            let _ = store.create(contact).await;
        }
        store
    }

    pub async fn list(&self) -> Vec<Contact> {
        self.inner.read().await.contacts.clone()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.contacts.len()
    }

    pub async fn get(&self, id: u64) -> AppResult<Contact> {
        self.inner
            .read()
            .await
            .contacts
            .iter()
            .find(|contact| contact.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Contact {id} not found")))
    }

    pub async fn create(&self, contact: NewContact) -> AppResult<Contact> {
        contact.validate()?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let created = Contact {
            id: inner.next_id,
            name: contact.name.trim().to_string(),
            email: contact.email,
            phone_numbers: contact.phone_numbers,
        };
        inner.contacts.push(created.clone());
        Ok(created)
    }

    /// Creates every contact or none of them.
    pub async fn import(&self, contacts: Vec<NewContact>) -> AppResult<Vec<Contact>> {
        for contact in &contacts {
            contact.validate()?;
        }

        let mut created = Vec::with_capacity(contacts.len());
        for contact in contacts {
            created.push(self.create(contact).await?);
        }
        info!(count = created.len(), "Contacts imported");
        Ok(created)
    }

    /// Contacts whose name or email contains `query`, case-insensitively.
    pub async fn search(&self, query: &str) -> Vec<Contact> {
        let query = query.to_lowercase();
        self.inner
            .read()
            .await
            .contacts
            .iter()
            .filter(|contact| {
                contact.name.to_lowercase().contains(&query)
                    || contact
                        .email
                        .as_deref()
                        .is_some_and(|email| email.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }
}
