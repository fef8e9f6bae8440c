pub mod balance;
pub mod entities;
pub mod requests;
pub mod responses;
