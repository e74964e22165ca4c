pub mod app;
pub mod auth;
pub mod register;
pub mod screens;
