pub mod handshake_tests;
pub mod renegotiation_tests;
pub mod routing_tests;
pub mod teardown_tests;
