pub mod problem;
pub mod requests;
pub mod responses;
