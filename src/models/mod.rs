pub mod application;
pub mod company;
pub mod payment;
pub mod user;
pub mod vacancy;
