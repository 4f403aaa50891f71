//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod deadline;
mod in_memory_store;
mod postgres_classroom_repository;
mod postgres_error;
mod postgres_permission_repository;
mod postgres_task_repository;
mod postgres_token_repository;
mod postgres_user_repository;

#[cfg(test)]
mod test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_store::InMemoryStore;
pub use postgres_classroom_repository::PostgresClassroomRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_task_repository::PostgresTaskRepository;
pub use postgres_token_repository::PostgresTokenRepository;
pub use postgres_user_repository::PostgresUserRepository;
