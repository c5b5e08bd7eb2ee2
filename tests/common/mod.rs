// Common test utilities


// Re-export commonly used items
// Note: These may appear unused in some test binaries
#[allow(unused_imports)]
pub use helpers::{
    call_tool_body, create_test_app, create_test_app_with_ids, initialize_body, list_tools_body,
    post_json, read_json, sequential_ids, test_config, FakeSearchBackend, TestApp,
};
