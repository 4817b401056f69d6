//! Form data shared by every wizard step.

pub mod state;
pub mod types;

pub use state::{FormPatch, FormState, FormUpdate};
pub use types::{
    AccessGrantEntry, AccessGrantPatch, AccessLevel, Acknowledgement, IssueCategory, RequestKind,
    StorageTier,
};
