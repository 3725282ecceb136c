//! Client code for kiteshell.
//!
//! This crate provides the HTTP fetch pipeline, the request interceptor with
//! its cache strategies and lifecycle, and the hosted table clients (reviews
//! and the visitor counter) shared by the server.

pub mod fetch;
pub mod intercept;
pub mod reviews;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod visitors;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network, Request};
pub use intercept::{
    Disposition, Interceptor, LifecycleHandler, Outcome, Policy, Registration, RegistrationReport, ResponseSource,
    ShellConfig, ShellResponse, WorkerState,
};
pub use reviews::{AdminGate, NewReview, Review, ReviewsClient};
pub use store::{StoreClient, StoreConfig, StoreError};
pub use visitors::{VisitorCount, VisitorCounter};
