pub mod env_store;
pub mod revalidate;
