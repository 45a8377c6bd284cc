use async_trait::async_trait;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::{Reader, StoreError};
use crate::entities::v1::users::{Column, Entity};
use crate::models::v1::user::{Credential, Profile, SearchPattern, UserSummary};

/// [`Reader`] over the read pool
#[derive(Clone, Debug)]
pub struct SeaReader {
    db: DatabaseConnection,
}

impl SeaReader {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Reader for SeaReader {
    #[tracing::instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let credential = Entity::find()
            .select_only()
            .columns([Column::Id, Column::Username, Column::Password, Column::Role])
            .filter(Column::Username.eq(username))
            .into_model::<Credential>()
            .one(&self.db)
            .await?;

        Ok(credential)
    }

    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, id: i32) -> Result<Option<Profile>, StoreError> {
        let profile = Entity::find()
            .select_only()
            .columns([Column::Username, Column::SensitiveNote])
            .filter(Column::Id.eq(id))
            .into_model::<Profile>()
            .one(&self.db)
            .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self, pattern))]
    async fn search(
        &self,
        pattern: &SearchPattern,
        limit: u64,
    ) -> Result<Vec<UserSummary>, StoreError> {
        let like = LikeExpr::new(pattern.as_str()).escape(SearchPattern::ESCAPE);
        let users = Entity::find()
            .select_only()
            .columns([Column::Id, Column::Username])
            .filter(Column::Username.like(like))
            .order_by_asc(Column::Id)
            .limit(limit)
            .into_model::<UserSummary>()
            .all(&self.db)
            .await?;

        tracing::debug!(results = users.len(), "Search completed");

        Ok(users)
    }
}
