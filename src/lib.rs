#![doc = "The `taskhive` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, data access, authentication, email delivery,"]
#![doc = "routing configuration and error handling for the taskhive service."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
