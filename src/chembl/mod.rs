//! ChEMBL activity search client.
//!
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api

pub mod client;
pub mod fetcher;
pub mod response;

pub use client::{query_url, ChemblClient, QuerySettings};
