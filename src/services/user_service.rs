use crate::{
    helpers::thing_helpers::{create_user_thing, validate_object_id},
    models::user::UserRecord,
    Error, Result,
};
use surrealdb::{engine::any::Any, Surreal};

pub struct UserService;

impl UserService {
    pub async fn get_user(db: &Surreal<Any>, user_id: &str) -> Result<Option<UserRecord>> {
        let user_thing = create_user_thing(user_id);

        let mut response = db
            .query("SELECT * FROM $user_id;")
            .bind(("user_id", user_thing))
            .await?;

        let user: Option<UserRecord> = response.take(0)?;
        Ok(user)
    }

    /// Adds one play and its duration to the listener's totals
    pub async fn record_listen(db: &Surreal<Any>, user_id: &str, duration: f64) -> Result<()> {
        let user_key = validate_object_id(user_id)?;

        let sql = r#"
            UPDATE $user_id SET
                listen_count = (listen_count OR 0) + 1,
                total_listening_time = (total_listening_time OR 0) + $duration
            RETURN AFTER;
        "#;

        let mut response = db
            .query(sql)
            .bind(("user_id", create_user_thing(user_key)))
            .bind(("duration", duration))
            .await?;

        let updated: Option<UserRecord> = response.take(0)?;
        updated.map(|_| ()).ok_or_else(|| Error::UserNotFound {
            id: user_key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{insert_user, setup_db};

    #[tokio::test]
    async fn test_record_listen_accumulates() {
        let db = setup_db().await;
        let user_id = insert_user(&db).await;

        UserService::record_listen(&db, &user_id, 90.0).await.unwrap();
        UserService::record_listen(&db, &user_id, 30.5).await.unwrap();

        let user = UserService::get_user(&db, &user_id).await.unwrap().unwrap();
        assert_eq!(user.listen_count, 2);
        assert_eq!(user.total_listening_time, 120.5);
    }

    #[tokio::test]
    async fn test_record_listen_unknown_user() {
        let db = setup_db().await;

        let result = UserService::record_listen(&db, "65f0a1b2c3d4e5f6a7b8c9d0", 10.0).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));
    }
}
