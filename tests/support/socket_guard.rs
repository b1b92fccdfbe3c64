//! Lets wiremock tests skip on hosts that forbid binding localhost.
//!
//! Set `MEGASCANS_REQUIRE_SOCKET_TESTS=1` to fail instead of skipping.

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a mock server, or returns `None` after logging why the calling test is skipped.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let caller = std::panic::Location::caller();
    let bindable = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if bindable {
            return Some(MockServer::start().await);
        }
        let required = std::env::var("MEGASCANS_REQUIRE_SOCKET_TESTS")
            .is_ok_and(|value| matches!(value.as_str(), "1" | "true"));
        assert!(
            !required,
            "cannot bind a localhost socket for the mock server ({caller})"
        );
        eprintln!("skipping {caller}: cannot bind a localhost socket for the mock server");
        None
    }
}
