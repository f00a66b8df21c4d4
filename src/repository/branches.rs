//! Branches repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_error, AppError, AppResult},
    models::branch::{Branch, CreateBranch, UpdateBranch},
};

#[derive(Clone)]
pub struct BranchesRepository {
    pool: Pool<Postgres>,
}

impl BranchesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Branch with id {} not found", id)))
    }

    pub async fn create(&self, data: &CreateBranch) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (name, address, code, phone, email, opening_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.address.as_deref().unwrap_or(""))
        .bind(&data.code)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.opening_hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Branch"))
    }

    pub async fn update(&self, id: i32, data: &UpdateBranch) -> AppResult<Branch> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.address, "address");
        add_field!(data.code, "code");
        add_field!(data.phone, "phone");
        add_field!(data.email, "email");
        add_field!(data.opening_hours, "opening_hours");

        let query = format!(
            "UPDATE branches SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );
        let mut builder = sqlx::query_as::<_, Branch>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.address);
        bind_field!(data.code);
        bind_field!(data.phone);
        bind_field!(data.email);
        bind_field!(data.opening_hours);

        builder
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Branch"))?
            .ok_or_else(|| AppError::NotFound(format!("Branch with id {} not found", id)))
    }

    /// Delete branch; its stock, usages and loans go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Branch with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
