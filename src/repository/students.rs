//! Students repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_error, AppError, AppResult},
    models::{
        page_bounds,
        student::{CreateStudent, Student, StudentQuery, UpdateStudent},
    },
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Search students by faculty and name fragment
    pub async fn search(&self, query: &StudentQuery) -> AppResult<(Vec<Student>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        let offset = (page - 1) * per_page;
        let name = query.name.as_ref().map(|n| format!("%{}%", n));

        const FILTER: &str = r#"
            WHERE ($1::int IS NULL OR faculty_id = $1)
              AND ($2::text IS NULL OR last_name ILIKE $2 OR first_name ILIKE $2)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM students {}", FILTER))
            .bind(query.faculty_id)
            .bind(&name)
            .fetch_one(&self.pool)
            .await?;

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT * FROM students {} ORDER BY last_name, first_name, id LIMIT $3 OFFSET $4",
            FILTER
        ))
        .bind(query.faculty_id)
        .bind(&name)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((students, total))
    }

    pub async fn create(&self, data: &CreateStudent) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (last_name, first_name, student_id, faculty_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.last_name)
        .bind(&data.first_name)
        .bind(&data.student_id)
        .bind(data.faculty_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Student"))
    }

    pub async fn update(&self, id: i32, data: &UpdateStudent) -> AppResult<Student> {
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

        add_field!(data.last_name, "last_name");
        add_field!(data.first_name, "first_name");
        add_field!(data.student_id, "student_id");
        add_field!(data.faculty_id, "faculty_id");

        let query = format!(
            "UPDATE students SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );
        let mut builder = sqlx::query_as::<_, Student>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.last_name);
        bind_field!(data.first_name);
        bind_field!(data.student_id);
        bind_field!(data.faculty_id);

        builder
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Student"))?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Delete a student with no active loan; returned loans go with them
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM students WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE student_id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "Student {} still has {} active loan(s)",
                id, active
            )));
        }

        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
