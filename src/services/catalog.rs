//! Catalog management service: authors, publishers, books and branches

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, CreatePublisher, Publisher, UpdateAuthor, UpdatePublisher},
        book::{check_author_ids, check_price, normalize_isbn, Book, BookQuery, CreateBook, UpdateBook},
        branch::{Branch, CreateBranch, UpdateBranch},
    },
    repository::Repository,
};

/// Trim a required text field, rejecting blank values
fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be blank", field)));
    }
    Ok(value.to_string())
}

/// Trim an optional text field, turning blank values into None
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Authors

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, mut data: CreateAuthor) -> AppResult<Author> {
        data.first_name = required(&data.first_name, "First name")?;
        data.last_name = required(&data.last_name, "Last name")?;
        data.patronymic = optional(data.patronymic);
        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Created author {} ({})", author.id, author.full_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, mut data: UpdateAuthor) -> AppResult<Author> {
        if let Some(ref name) = data.first_name {
            data.first_name = Some(required(name, "First name")?);
        }
        if let Some(ref name) = data.last_name {
            data.last_name = Some(required(name, "Last name")?);
        }
        // An empty patronymic clears it
        data.patronymic = data.patronymic.map(|p| p.trim().to_string());
        self.repository.authors.update(id, &data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    // Publishers

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.list().await
    }

    pub async fn get_publisher(&self, id: i32) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await
    }

    pub async fn create_publisher(&self, mut data: CreatePublisher) -> AppResult<Publisher> {
        data.name = required(&data.name, "Publisher name")?;
        let publisher = self.repository.publishers.create(&data).await?;
        tracing::info!("Created publisher {} ({})", publisher.id, publisher.name);
        Ok(publisher)
    }

    pub async fn update_publisher(&self, id: i32, mut data: UpdatePublisher) -> AppResult<Publisher> {
        if let Some(ref name) = data.name {
            data.name = Some(required(name, "Publisher name")?);
        }
        self.repository.publishers.update(id, &data).await
    }

    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        self.repository.publishers.delete(id).await?;
        tracing::info!("Deleted publisher {}", id);
        Ok(())
    }

    // Books

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    async fn check_authors_exist(&self, author_ids: &[i32]) -> AppResult<()> {
        check_author_ids(author_ids)?;
        let missing = self.repository.authors.missing_ids(author_ids).await?;
        if let Some(id) = missing.first() {
            return Err(AppError::Validation(format!("Author {} does not exist", id)));
        }
        Ok(())
    }

    pub async fn create_book(&self, mut data: CreateBook) -> AppResult<Book> {
        data.title = required(&data.title, "Title")?;
        check_price(data.price)?;
        self.check_authors_exist(&data.author_ids).await?;
        let isbn = optional(data.isbn.take())
            .map(|raw| normalize_isbn(&raw))
            .transpose()?;

        let book = self.repository.books.create(&data, isbn.as_deref()).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, mut data: UpdateBook) -> AppResult<Book> {
        if let Some(ref title) = data.title {
            data.title = Some(required(title, "Title")?);
        }
        check_price(data.price)?;
        if let Some(ref author_ids) = data.author_ids {
            self.check_authors_exist(author_ids).await?;
        }
        let isbn = optional(data.isbn.take())
            .map(|raw| normalize_isbn(&raw))
            .transpose()?;

        self.repository.books.update(id, &data, isbn.as_deref()).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    // Branches

    pub async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        self.repository.branches.list().await
    }

    pub async fn get_branch(&self, id: i32) -> AppResult<Branch> {
        self.repository.branches.get_by_id(id).await
    }

    pub async fn create_branch(&self, mut data: CreateBranch) -> AppResult<Branch> {
        data.name = required(&data.name, "Branch name")?;
        let branch = self.repository.branches.create(&data).await?;
        tracing::info!("Created branch {} ({})", branch.id, branch.name);
        Ok(branch)
    }

    pub async fn update_branch(&self, id: i32, mut data: UpdateBranch) -> AppResult<Branch> {
        if let Some(ref name) = data.name {
            data.name = Some(required(name, "Branch name")?);
        }
        self.repository.branches.update(id, &data).await
    }

    pub async fn delete_branch(&self, id: i32) -> AppResult<()> {
        self.repository.branches.delete(id).await?;
        tracing::info!("Deleted branch {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  Central  ", "Branch name").unwrap(), "Central");
        assert!(matches!(
            required("   ", "Branch name"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(None), None);
    }
}
