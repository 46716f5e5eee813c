//! Amazon Selling Partner API collaborators

pub mod auth;
pub mod client;
pub mod listing;
pub mod service;

pub use auth::{LwaCredentials, LwaTokenProvider};
pub use client::{
    ListingIssue, ListingSubmission, ListingSubmissionResult, ProductTypeDefinition,
    ProductTypeSummary, SpApiClient,
};
pub use listing::{build_listing_attributes, coerce_value};
pub use service::AmazonSpApiService;
