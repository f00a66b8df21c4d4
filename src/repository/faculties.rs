//! Faculties and faculty usage registry repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_error, AppError, AppResult},
    models::faculty::{CreateFaculty, Faculty, FacultyUsage, RegisterUsage, UpdateFaculty},
};

#[derive(Clone)]
pub struct FacultiesRepository {
    pool: Pool<Postgres>,
}

impl FacultiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Faculty>> {
        let faculties = sqlx::query_as::<_, Faculty>("SELECT * FROM faculties ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(faculties)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Faculty> {
        sqlx::query_as::<_, Faculty>("SELECT * FROM faculties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Faculty with id {} not found", id)))
    }

    pub async fn create(&self, data: &CreateFaculty) -> AppResult<Faculty> {
        sqlx::query_as::<_, Faculty>(
            "INSERT INTO faculties (name, code, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Faculty"))
    }

    pub async fn update(&self, id: i32, data: &UpdateFaculty) -> AppResult<Faculty> {
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
        add_field!(data.code, "code");
        add_field!(data.description, "description");

        let query = format!(
            "UPDATE faculties SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );
        let mut builder = sqlx::query_as::<_, Faculty>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.code);
        bind_field!(data.description);

        builder
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Faculty"))?
            .ok_or_else(|| AppError::NotFound(format!("Faculty with id {} not found", id)))
    }

    /// Delete faculty; refused while students belong to it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM faculties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Faculty"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Faculty with id {} not found", id)));
        }
        Ok(())
    }

    /// Record that a faculty uses a stocked book; registering twice returns the first row
    pub async fn register(&self, data: &RegisterUsage) -> AppResult<FacultyUsage> {
        let mut tx = self.pool.begin().await?;

        let stocked: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM book_inventories WHERE book_id = $1 AND branch_id = $2 FOR SHARE",
        )
        .bind(data.book_id)
        .bind(data.branch_id)
        .fetch_optional(&mut *tx)
        .await?;

        if stocked.is_none() {
            return Err(AppError::Validation(format!(
                "Book {} has no inventory record at branch {}",
                data.book_id, data.branch_id
            )));
        }

        let inserted = sqlx::query_as::<_, FacultyUsage>(
            r#"
            INSERT INTO book_faculty_usages
                (book_id, faculty_id, branch_id, course_code, course_name, semester, academic_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (book_id, faculty_id, branch_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(data.faculty_id)
        .bind(data.branch_id)
        .bind(&data.course_code)
        .bind(&data.course_name)
        .bind(&data.semester)
        .bind(&data.academic_year)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Faculty usage"))?;

        let usage = match inserted {
            Some(usage) => usage,
            None => {
                sqlx::query_as::<_, FacultyUsage>(
                    r#"
                    SELECT * FROM book_faculty_usages
                    WHERE book_id = $1 AND faculty_id = $2 AND branch_id = $3
                    "#,
                )
                .bind(data.book_id)
                .bind(data.faculty_id)
                .bind(data.branch_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(usage)
    }

    /// Remove a usage row
    pub async fn unregister(&self, usage_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_faculty_usages WHERE id = $1")
            .bind(usage_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Faculty usage with id {} not found",
                usage_id
            )));
        }
        Ok(())
    }

    /// Distinct faculties using a book at a branch, by name
    pub async fn list_faculties_for(&self, book_id: i32, branch_id: i32) -> AppResult<Vec<Faculty>> {
        let faculties = sqlx::query_as::<_, Faculty>(
            r#"
            SELECT DISTINCT f.*
            FROM faculties f
            JOIN book_faculty_usages u ON u.faculty_id = f.id
            WHERE u.book_id = $1 AND u.branch_id = $2
            ORDER BY f.name
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(faculties)
    }

    pub async fn count_faculties_for(&self, book_id: i32, branch_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT faculty_id)
            FROM book_faculty_usages
            WHERE book_id = $1 AND branch_id = $2
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Usage rows of one faculty
    pub async fn list_usages_for_faculty(&self, faculty_id: i32) -> AppResult<Vec<FacultyUsage>> {
        let usages = sqlx::query_as::<_, FacultyUsage>(
            "SELECT * FROM book_faculty_usages WHERE faculty_id = $1 ORDER BY book_id, branch_id",
        )
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usages)
    }
}
