pub mod alerts;
pub mod offline;
pub mod remote;
