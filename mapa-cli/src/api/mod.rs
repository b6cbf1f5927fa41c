//! SharePoint Online access for the source workbook
//!
//! Authenticates with the resource-owner password grant and downloads a
//! single file from a document library. Failures are reported as
//! [`FetchError`] and are never retried.

pub mod auth;
pub mod client;

pub use client::SharePointClient;
