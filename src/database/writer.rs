use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};

use super::{StoreError, Writer};
use crate::entities::v1::users::{ActiveModel, Entity};
use crate::models::v1::user::NewUser;

/// [`Writer`] over the insert-only write pool
///
/// Inserts skip `RETURNING` so the write role needs no `SELECT` grant.
#[derive(Clone, Debug)]
pub struct SeaWriter {
    db: DatabaseConnection,
}

impl SeaWriter {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Writer for SeaWriter {
    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> Result<(), StoreError> {
        let model = ActiveModel {
            username: Set(user.username),
            password: Set(user.password),
            sensitive_note: Set(user.sensitive_note),
            role: Set(user.role),
            ..Default::default()
        };

        Entity::insert(model).exec_without_returning(&self.db).await?;

        Ok(())
    }
}
