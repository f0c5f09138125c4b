pub mod id;
pub mod todo;
