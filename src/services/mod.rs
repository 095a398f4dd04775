pub mod availability;
pub mod calls;
pub mod prompt;
pub mod registry;
pub mod templates;
pub mod tools;
pub mod transition;
