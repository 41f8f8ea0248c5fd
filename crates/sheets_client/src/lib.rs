//! Sheet web app client library.
//!
//! Read/append access to the Google Apps Script deployment that fronts
//! the event's registration spreadsheet.

pub mod rest;

pub use rest::SheetsClient;
