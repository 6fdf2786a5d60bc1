pub mod auth;
pub mod categories;
pub mod customers;
pub mod health;
pub mod products;
pub mod sales;
