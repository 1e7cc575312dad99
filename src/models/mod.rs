pub mod crm;
pub mod finance;
pub mod hr;
pub mod inventory;
pub mod logistics;

// Re-export only the types we actually use
pub use crm::{
    Client, ClientContact, ClientEmail, CreateClient, CreateClientContact, CreateClientEmail,
    CreateTicket, Ticket, UpdateTicket,
};
pub use finance::{
    CreateExpense, CreateIncome, CreateReportHistory, Expense, Income, ReportHistory,
};
pub use hr::{
    Attendance, CreateAttendance, CreateEmployee, CreateLeave, CreatePayroll, Employee, Leave,
    Payroll,
};
pub use inventory::{Category, CreateCategory, CreateItem, Item, ItemWithCategory, UpdateItem};
pub use logistics::{
    CreateOrder, CreateProofOfDelivery, CreateVehicle, CreateWarehouse, Order,
    ProofOfDeliveryDisplay, Shipment, UpdateOrder, Vehicle, Warehouse,
};
