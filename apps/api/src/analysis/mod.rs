pub mod controller;
pub mod handlers;
pub mod orchestrator;
pub mod validation;
