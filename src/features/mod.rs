pub mod bills;
pub mod new_bill;
pub mod router;
pub mod store;
