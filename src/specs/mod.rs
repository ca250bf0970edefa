// src/specs/mod.rs
//! # Wire “specs” module
//!
//! Knows **what the archive sends back** and nothing else. Each spec here
//! covers one remote procedure and encodes where the card objects live in
//! its response and how to get them out without trusting the shape.
//!
//! ## What lives here
//! - **Request payloads** for remote procedures (the tRPC batch `input`).
//! - **Body decoding**: splitting a batched response into fragments,
//!   decoding each on its own, and walking the known container paths.
//! - **Tolerance**: unknown keys ignored, broken fragments skipped and logged.
//!
//! ## What does **not** live here
//! - **Networking**: `core::net::ArchiveClient` does the request.
//! - **Field extraction**: `extract` reads description/flavor/artist out of
//!   the records these specs return.
//! - **Merging or persistence**: `merge` and `store`.
//!
//! ## Typical call chain
//! ```text
//! runner → scrape::ArchiveFetcher::fetch_all → core::net::get_text
//!                                            ↘ specs::search::decode_body
//! ```
//!
//! ## Testing notes
//! Decoding is pure over the body text, so tests feed captured or
//! hand-written bodies straight to `decode_body`.
pub mod search;
