pub mod app;
pub mod fixtures;

pub use app::{TestApp, make_test_app};
pub use fixtures::{TestData, body_json, feedback_body, request, setup_test_data, submit};
