mod database;
mod error;
mod handlers;
mod ids;
mod models;
mod reporting;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use dotenvy::dotenv;

use database::{create_database_pool, Database};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let app = create_router(db);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("meridian server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}

fn create_router(db: Database) -> Router {
    Router::new()
        // CRM
        .route("/crm/api/clients", get(handlers::crm::clients_list))
        .route("/crm/api/clients", post(handlers::crm::create_client))
        .route("/crm/api/clients/:id", get(handlers::crm::get_client))
        .route("/crm/api/clients/:id", put(handlers::crm::update_client))
        .route("/crm/api/clients/:id", delete(handlers::crm::delete_client))
        .route("/crm/api/contacts", get(handlers::crm::contacts_list))
        .route("/crm/api/contacts", post(handlers::crm::create_contact))
        .route("/crm/api/contacts/:id", delete(handlers::crm::delete_contact))
        .route("/crm/api/emails", get(handlers::crm::emails_list))
        .route("/crm/api/emails", post(handlers::crm::create_email))
        .route("/crm/api/emails/:id", delete(handlers::crm::delete_email))
        .route("/crm/tickets", get(handlers::crm::tickets_list))
        .route("/crm/tickets", post(handlers::crm::create_ticket))
        .route("/crm/tickets/:id", get(handlers::crm::get_ticket))
        .route("/crm/tickets/:id", put(handlers::crm::update_ticket))
        .route("/crm/tickets/:id", delete(handlers::crm::delete_ticket))
        // HR
        .route("/hr/api/employees", get(handlers::hr::employees_list))
        .route("/hr/api/employees", post(handlers::hr::create_employee))
        .route("/hr/api/employees/:id", get(handlers::hr::get_employee))
        .route("/hr/api/employees/:id", put(handlers::hr::update_employee))
        .route("/hr/api/employees/:id", delete(handlers::hr::delete_employee))
        .route(
            "/hr/api/employees/:id/attendance",
            get(handlers::hr::employee_attendance),
        )
        .route("/hr/api/payroll", get(handlers::hr::payroll_list))
        .route("/hr/api/payroll", post(handlers::hr::create_payroll))
        .route("/hr/api/payroll/:id", get(handlers::hr::get_payroll))
        .route("/hr/api/payroll/:id", put(handlers::hr::update_payroll))
        .route("/hr/api/payroll/:id", delete(handlers::hr::delete_payroll))
        .route("/hr/api/attendance", get(handlers::hr::attendance_list))
        .route("/hr/api/attendance", post(handlers::hr::create_attendance))
        .route("/hr/api/leave", get(handlers::hr::leave_list))
        .route("/hr/api/leave", post(handlers::hr::create_leave))
        .route("/hr/api/leave/:id", get(handlers::hr::get_leave))
        .route("/hr/api/leave/:id", delete(handlers::hr::delete_leave))
        // Finance
        .route("/api/finance/incomes", get(handlers::finance::incomes_list))
        .route("/api/finance/incomes", post(handlers::finance::create_income))
        .route("/api/finance/incomes/:id", get(handlers::finance::get_income))
        .route("/api/finance/incomes/:id", put(handlers::finance::update_income))
        .route("/api/finance/incomes/:id", delete(handlers::finance::delete_income))
        .route("/api/finance/expenses", get(handlers::finance::expenses_list))
        .route("/api/finance/expenses", post(handlers::finance::create_expense))
        .route("/api/finance/expenses/:id", get(handlers::finance::get_expense))
        .route("/api/finance/expenses/:id", put(handlers::finance::update_expense))
        .route("/api/finance/expenses/:id", delete(handlers::finance::delete_expense))
        .route("/api/finance/summary", get(handlers::finance::financial_summary))
        .route("/api/finance/cash-flow", get(handlers::finance::cash_flow))
        .route("/api/finance/balance-sheet", get(handlers::finance::balance_sheet))
        .route("/api/finance/reports", get(handlers::finance::financial_reports))
        .route(
            "/api/finance/report-history",
            get(handlers::finance::report_history_list),
        )
        .route(
            "/api/finance/report-history",
            post(handlers::finance::create_report_history),
        )
        .route(
            "/api/finance/report-history/:id",
            get(handlers::finance::get_report_history),
        )
        .route(
            "/api/finance/report-history/:id",
            delete(handlers::finance::delete_report_history),
        )
        .route("/api/finance/test", get(handlers::finance::test_api))
        // Inventory
        .route("/api/inventory/categories", get(handlers::inventory::categories_list))
        .route("/api/inventory/categories", post(handlers::inventory::create_category))
        .route("/api/inventory/categories/:id", get(handlers::inventory::get_category))
        .route("/api/inventory/categories/:id", put(handlers::inventory::update_category))
        .route(
            "/api/inventory/categories/:id",
            delete(handlers::inventory::delete_category),
        )
        .route(
            "/api/inventory/categories/:id/items",
            get(handlers::inventory::category_items),
        )
        .route("/api/inventory/items", get(handlers::inventory::items_list))
        .route("/api/inventory/items", post(handlers::inventory::create_item))
        .route("/api/inventory/items/:id", get(handlers::inventory::get_item))
        .route("/api/inventory/items/:id", put(handlers::inventory::update_item))
        .route("/api/inventory/items/:id", delete(handlers::inventory::delete_item))
        // Logistics
        .route("/logistics/api/warehouses", get(handlers::logistics::warehouses_list))
        .route("/logistics/api/warehouses", post(handlers::logistics::create_warehouse))
        .route("/logistics/api/warehouses/:id", get(handlers::logistics::get_warehouse))
        .route("/logistics/api/warehouses/:id", put(handlers::logistics::update_warehouse))
        .route(
            "/logistics/api/warehouses/:id",
            delete(handlers::logistics::delete_warehouse),
        )
        .route("/logistics/api/vehicles", get(handlers::logistics::vehicles_list))
        .route("/logistics/api/vehicles", post(handlers::logistics::create_vehicle))
        .route("/logistics/api/vehicles/:id", get(handlers::logistics::get_vehicle))
        .route("/logistics/api/vehicles/:id", put(handlers::logistics::update_vehicle))
        .route("/logistics/api/vehicles/:id", delete(handlers::logistics::delete_vehicle))
        .route("/logistics/api/orders", get(handlers::logistics::orders_list))
        .route("/logistics/api/orders", post(handlers::logistics::create_order))
        .route("/logistics/api/orders/:id", get(handlers::logistics::get_order))
        .route("/logistics/api/orders/:id", put(handlers::logistics::update_order))
        .route("/logistics/api/orders/:id", delete(handlers::logistics::delete_order))
        .route("/logistics/api/orders/:id/ship", post(handlers::logistics::ship_order))
        .route("/logistics/api/shipments", get(handlers::logistics::shipments_list))
        .route("/logistics/api/shipments/:id", get(handlers::logistics::get_shipment))
        .route(
            "/logistics/api/shipments/:id",
            delete(handlers::logistics::delete_shipment),
        )
        .route(
            "/logistics/api/proof-of-delivery",
            get(handlers::logistics::proofs_list),
        )
        .route(
            "/logistics/api/proof-of-delivery",
            post(handlers::logistics::submit_proof_of_delivery),
        )
        .route(
            "/logistics/api/proof-of-delivery/:id",
            get(handlers::logistics::get_proof),
        )
        .route(
            "/logistics/api/proof-of-delivery/:id",
            delete(handlers::logistics::delete_proof),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
