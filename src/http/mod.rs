//! HTTP protocol implementation.
//!
//! This module implements the minimal HTTP/1.1 subset the server speaks:
//! one request per connection, conditional GET, and byte-range responses.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The main connection handler implementing the request-response state machine
//! - **`parser`**: Parses the request line and the recognized headers from one inbound chunk
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One read of one inbound chunk
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Static responder or application gateway
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               └─ Close → Closed (no keep-alive)
//! ```
//!
//! Every path into `Closed` tears the connection down exactly once; a parse
//! failure or an empty read closes without writing a response.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
