//! Test utilities for store tests.

pub mod gated_repository;
pub mod mock_generators;

#[allow(unused_imports)]
pub use gated_repository::GatedRepository;
#[allow(unused_imports)]
pub use mock_generators::{EchoImageGenerator, FixedStoryGenerator, sample_book};
