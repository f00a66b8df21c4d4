//! Faculties, students and the faculty usage registry

use crate::{
    error::{AppError, AppResult},
    models::{
        faculty::{
            CreateFaculty, FacultiesForBook, Faculty, FacultyUsage, RegisterUsage, UpdateFaculty,
        },
        student::{CreateStudent, Student, StudentQuery, UpdateStudent},
    },
    repository::Repository,
};

fn not_blank(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be blank", field)));
    }
    Ok(value.to_string())
}

#[derive(Clone)]
pub struct PeopleService {
    repository: Repository,
}

impl PeopleService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Faculties

    pub async fn list_faculties(&self) -> AppResult<Vec<Faculty>> {
        self.repository.faculties.list().await
    }

    pub async fn get_faculty(&self, id: i32) -> AppResult<Faculty> {
        self.repository.faculties.get_by_id(id).await
    }

    pub async fn create_faculty(&self, mut data: CreateFaculty) -> AppResult<Faculty> {
        data.name = not_blank(&data.name, "Faculty name")?;
        let faculty = self.repository.faculties.create(&data).await?;
        tracing::info!("Created faculty {} ({})", faculty.id, faculty.name);
        Ok(faculty)
    }

    pub async fn update_faculty(&self, id: i32, mut data: UpdateFaculty) -> AppResult<Faculty> {
        if let Some(ref name) = data.name {
            data.name = Some(not_blank(name, "Faculty name")?);
        }
        self.repository.faculties.update(id, &data).await
    }

    pub async fn delete_faculty(&self, id: i32) -> AppResult<()> {
        self.repository.faculties.delete(id).await?;
        tracing::info!("Deleted faculty {}", id);
        Ok(())
    }

    // Usage registry

    /// Record that a faculty uses a book stocked at a branch
    pub async fn register_usage(&self, data: RegisterUsage) -> AppResult<FacultyUsage> {
        self.repository.faculties.get_by_id(data.faculty_id).await?;
        let usage = self.repository.faculties.register(&data).await?;
        tracing::info!(
            "Faculty {} uses book {} at branch {} (usage {})",
            usage.faculty_id, usage.book_id, usage.branch_id, usage.id
        );
        Ok(usage)
    }

    pub async fn unregister_usage(&self, usage_id: i32) -> AppResult<()> {
        self.repository.faculties.unregister(usage_id).await?;
        tracing::info!("Removed faculty usage {}", usage_id);
        Ok(())
    }

    pub async fn list_faculties_for(&self, book_id: i32, branch_id: i32) -> AppResult<Vec<Faculty>> {
        self.repository.faculties.list_faculties_for(book_id, branch_id).await
    }

    pub async fn count_faculties_for(&self, book_id: i32, branch_id: i32) -> AppResult<i64> {
        self.repository.faculties.count_faculties_for(book_id, branch_id).await
    }

    /// Faculties using a book at a branch, with their count
    pub async fn faculties_for_book(&self, book_id: i32, branch_id: i32) -> AppResult<FacultiesForBook> {
        let faculties = self.list_faculties_for(book_id, branch_id).await?;
        let count = self.count_faculties_for(book_id, branch_id).await?;
        Ok(FacultiesForBook {
            book_id,
            branch_id,
            count,
            faculties,
        })
    }

    pub async fn list_usages_for_faculty(&self, faculty_id: i32) -> AppResult<Vec<FacultyUsage>> {
        self.repository.faculties.get_by_id(faculty_id).await?;
        self.repository.faculties.list_usages_for_faculty(faculty_id).await
    }

    // Students

    pub async fn search_students(&self, query: &StudentQuery) -> AppResult<(Vec<Student>, i64)> {
        self.repository.students.search(query).await
    }

    pub async fn get_student(&self, id: i32) -> AppResult<Student> {
        self.repository.students.get_by_id(id).await
    }

    pub async fn create_student(&self, mut data: CreateStudent) -> AppResult<Student> {
        data.last_name = not_blank(&data.last_name, "Last name")?;
        data.first_name = not_blank(&data.first_name, "First name")?;
        data.student_id = not_blank(&data.student_id, "Student ID")?;
        let student = self.repository.students.create(&data).await?;
        tracing::info!("Created student {} ({})", student.id, student.full_name());
        Ok(student)
    }

    pub async fn update_student(&self, id: i32, mut data: UpdateStudent) -> AppResult<Student> {
        if let Some(ref name) = data.last_name {
            data.last_name = Some(not_blank(name, "Last name")?);
        }
        if let Some(ref name) = data.first_name {
            data.first_name = Some(not_blank(name, "First name")?);
        }
        if let Some(ref number) = data.student_id {
            data.student_id = Some(not_blank(number, "Student ID")?);
        }
        self.repository.students.update(id, &data).await
    }

    pub async fn delete_student(&self, id: i32) -> AppResult<()> {
        self.repository.students.delete(id).await?;
        tracing::info!("Deleted student {}", id);
        Ok(())
    }
}
