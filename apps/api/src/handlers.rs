pub mod classrooms;
pub mod fallback;
pub mod health;
pub mod tasks;
pub mod users;
