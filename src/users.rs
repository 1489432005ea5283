use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use crate::{
    db::now_sec,
    entities::user,
    error::{AppError, AppResult},
    models::{UserCreate, UserUpdate},
};

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: UserCreate) -> AppResult<user::Model> {
        self.ensure_unique(Some(&input.username), Some(&input.email), None).await?;

        let model = user::ActiveModel {
            id: Default::default(),
            username: Set(input.username),
            email: Set(input.email),
            full_name: Set(input.full_name),
            created_at: Set(now_sec()),
            is_active: Set(true),
        };
        let created = model.insert(&self.db).await?;

        debug!(user_id = created.id, username = %created.username, "registered user");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<user::Model>> {
        let users = user::Entity::find().order_by_asc(user::Column::Id).all(&self.db).await?;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> AppResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn update(&self, id: i32, patch: UserUpdate) -> AppResult<user::Model> {
        let existing = self.get(id).await?;

        let username = patch.username.as_deref().filter(|u| *u != existing.username);
        let email = patch.email.as_deref().filter(|e| *e != existing.email);
        self.ensure_unique(username, email, Some(id)).await?;

        let mut model: user::ActiveModel = existing.into();
        if let Some(username) = patch.username {
            model.username = Set(username);
        }
        if let Some(email) = patch.email {
            model.email = Set(email);
        }
        if let Some(full_name) = patch.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(is_active) = patch.is_active {
            model.is_active = Set(is_active);
        }

        if !model.is_changed() {
            return self.get(id).await;
        }
        let updated = model.update(&self.db).await?;

        debug!(user_id = id, "updated user");
        Ok(updated)
    }

    /// Marks the user inactive; the row is kept.
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let mut model: user::ActiveModel = self.get(id).await?.into();
        model.is_active = Set(false);
        model.update(&self.db).await?;

        debug!(user_id = id, "deactivated user");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<i32>,
    ) -> AppResult<()> {
        let mut any = Condition::any();
        if let Some(username) = username {
            any = any.add(user::Column::Username.eq(username));
        }
        if let Some(email) = email {
            any = any.add(user::Column::Email.eq(email));
        }
        if any.is_empty() {
            return Ok(());
        }

        let mut query = user::Entity::find().filter(any);
        if let Some(id) = exclude_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        if let Some(clash) = query.one(&self.db).await? {
            let field = if username.is_some_and(|u| u == clash.username) {
                "username"
            } else {
                "email"
            };
            return Err(AppError::Conflict(format!("User with this {field} already exists.")));
        }
        Ok(())
    }
}
