//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, branches, faculties, health, inventory, loans, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bibliotheca API",
        version = "1.0.0",
        description = "University library REST API: catalog, branch inventory, faculty usage and loans",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        books::list_authors,
        books::get_author,
        books::create_author,
        books::update_author,
        books::delete_author,
        books::list_publishers,
        books::get_publisher,
        books::create_publisher,
        books::update_publisher,
        books::delete_publisher,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::get_book_inventory,
        books::count_book_borrowers,
        // Branches
        branches::list_branches,
        branches::get_branch,
        branches::create_branch,
        branches::update_branch,
        branches::delete_branch,
        branches::list_branch_books,
        // Inventory
        inventory::get_counts,
        inventory::get_record,
        inventory::adjust,
        inventory::set_shelf_location,
        // Faculties
        faculties::list_faculties,
        faculties::get_faculty,
        faculties::create_faculty,
        faculties::update_faculty,
        faculties::delete_faculty,
        faculties::list_faculty_usages,
        faculties::register_usage,
        faculties::unregister_usage,
        faculties::faculties_for_book,
        // Students
        students::list_students,
        students::get_student,
        students::create_student,
        students::update_student,
        students::delete_student,
        // Loans
        loans::list_loans,
        loans::list_overdue,
        loans::get_loan,
        loans::issue_loan,
        loans::return_loan,
        loans::delete_loan,
    ),
    components(
        schemas(
            // Catalog
            crate::models::author::Author,
            crate::models::author::BookAuthor,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::author::Publisher,
            crate::models::author::CreatePublisher,
            crate::models::author::UpdatePublisher,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BorrowerCount,
            // Branches
            crate::models::branch::Branch,
            crate::models::branch::CreateBranch,
            crate::models::branch::UpdateBranch,
            // Inventory
            crate::models::inventory::InventoryRecord,
            crate::models::inventory::StockCounts,
            crate::models::inventory::AdjustInventory,
            crate::models::inventory::UpdateShelfLocation,
            crate::models::inventory::BranchStock,
            crate::models::inventory::BookStock,
            // Faculties
            crate::models::faculty::Faculty,
            crate::models::faculty::CreateFaculty,
            crate::models::faculty::UpdateFaculty,
            crate::models::faculty::FacultyUsage,
            crate::models::faculty::RegisterUsage,
            crate::models::faculty::FacultiesForBook,
            // Students
            crate::models::student::Student,
            crate::models::student::CreateStudent,
            crate::models::student::UpdateStudent,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanView,
            crate::models::loan::IssueLoan,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Authors, publishers and books"),
        (name = "branches", description = "Library branches"),
        (name = "inventory", description = "Copy counts per book and branch"),
        (name = "faculties", description = "Faculties and the books they use"),
        (name = "students", description = "Student records"),
        (name = "loans", description = "Loan lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
