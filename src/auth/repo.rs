use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User, UserRow},
    db::RepoError,
};

/// The Users collection.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// Fails with [`RepoError::Conflict`] when the email is taken.
    async fn create(&self, new: NewUser) -> Result<User, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, RepoError> {
    User::try_from(row).map_err(|e| RepoError::Database(sqlx::Error::Decode(e.into())))
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.db)
        .await?;
        into_user(row)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    #[derive(Default)]
    pub struct MemoryUserRepo {
        users: Mutex<Vec<User>>,
    }

    impl MemoryUserRepo {
        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserRepo for MemoryUserRepo {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn create(&self, new: NewUser) -> Result<User, RepoError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new.email) {
                return Err(RepoError::Conflict);
            }
            let user = User {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                role: new.role,
                created_at: OffsetDateTime::now_utc(),
            };
            users.push(user.clone());
            Ok(user)
        }
    }

    /// Every call fails as if the pool were exhausted.
    pub struct UnavailableUserRepo;

    #[async_trait]
    impl UserRepo for UnavailableUserRepo {
        async fn find_by_email(&self, _: &str) -> Result<Option<User>, RepoError> {
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_id(&self, _: Uuid) -> Result<Option<User>, RepoError> {
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn create(&self, _: NewUser) -> Result<User, RepoError> {
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let repo = MemoryUserRepo::default();
        let new = NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: crate::auth::roles::Role::User,
        };
        let user = repo.create(new.clone()).await.unwrap();
        assert!(matches!(repo.create(new).await, Err(RepoError::Conflict)));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_id(user.id).await.unwrap().unwrap().email, "ada@example.com");
    }
}
