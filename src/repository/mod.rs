//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod branches;
pub mod faculties;
pub mod inventory;
pub mod loans;
pub mod students;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub publishers: authors::PublishersRepository,
    pub books: books::BooksRepository,
    pub branches: branches::BranchesRepository,
    pub inventory: inventory::InventoryRepository,
    pub faculties: faculties::FacultiesRepository,
    pub students: students::StudentsRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            publishers: authors::PublishersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            branches: branches::BranchesRepository::new(pool.clone()),
            inventory: inventory::InventoryRepository::new(pool.clone()),
            faculties: faculties::FacultiesRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}
