pub mod datasources;
pub mod health;
pub mod scheduler;
pub mod watchers;
