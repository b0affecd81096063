#![forbid(unsafe_code)]

pub mod repository;
pub mod seed;

pub use repository::{
    ExamRepository, InMemoryRepository, ResultRepository, Storage, StorageError, UserRepository,
};
