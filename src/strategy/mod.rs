//! Rate selection and offer allocation.
//!
//! Everything in here is pure: book rows and balances in, decisions out.

pub mod allocator;
pub mod normalizer;
pub mod rate_selector;

pub use allocator::{allocate, allocate_default, AllocationPlan};
pub use normalizer::{annualize, deduplicate, normalize, normalize_with};
pub use rate_selector::{select_best, top_n, RateCandidate};
