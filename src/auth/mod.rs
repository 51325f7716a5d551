//! Authentication front end: form validation, local accounts, and the
//! signed-in session that feeds the session gate.

pub mod accounts;
pub mod validation;

pub use accounts::{AccountRecord, AccountRegistry, SessionFile};
pub use validation::{validate_sign_in, validate_sign_up, ValidationError};
