use std::sync::Arc;

use thiserror::Error;

use crate::database::{ContactStore, StoreError};
use crate::models::Contact;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no contact exists with id {0}")]
    NotFound(i64),

    #[error("a contact already exists with id {0}")]
    AlreadyExists(i64),

    #[error("contact id {body} in request body does not match path id {path}")]
    IdMismatch { path: i64, body: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Enforces the existence and duplicate invariants around the store.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    pub async fn get_all_contacts(&self) -> Result<Vec<Contact>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// Fails when the payload carries an id that already resolves to a
    /// record; an id that resolves to nothing is kept as supplied.
    pub async fn create_contact(&self, contact: Contact) -> Result<Contact, ServiceError> {
        if let Some(id) = contact.id {
            if self.store.find_by_id(id).await?.is_some() {
                return Err(ServiceError::AlreadyExists(id));
            }
        }

        Ok(self.store.save(contact).await?)
    }

    /// Full-record replacement. The path id is authoritative: a body id
    /// that differs from it is rejected before the store is touched.
    pub async fn update_contact(&self, id: i64, contact: Contact) -> Result<Contact, ServiceError> {
        if let Some(body_id) = contact.id {
            if body_id != id {
                return Err(ServiceError::IdMismatch { path: id, body: body_id });
            }
        }

        if self.store.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        Ok(self.store.save(Contact { id: Some(id), ..contact }).await?)
    }

    pub async fn get_contact(&self, id: i64) -> Result<Contact, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete_contact(&self, id: i64) -> Result<(), ServiceError> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        Ok(self.store.delete_by_id(id).await?)
    }

    pub async fn delete_all(&self) -> Result<(), ServiceError> {
        Ok(self.store.delete_all().await?)
    }
}
