pub mod availability;
pub mod coordinator;
pub mod flow;
