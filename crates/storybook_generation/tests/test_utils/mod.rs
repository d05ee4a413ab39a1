//! Test utilities for generation tests.

pub mod mock_generators;
pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_generators::{
    FailingRepository, ImageBehavior, MockImageGenerator, MockStoryGenerator, draft_with_pages,
};
#[allow(unused_imports)]
pub use mock_transport::{MockReply, MockTransport};
