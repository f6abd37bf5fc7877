//! User lookup interface.
//!
//! Account records themselves live outside this service. Verification only
//! needs to know which subject, if any, owns a phone number.

use async_trait::async_trait;

use crate::domain::value_objects::{PhoneNumber, SubjectId};
use crate::errors::StoreResult;

/// Lookup of accounts by phone
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the subject owning a phone number
    ///
    /// # Returns
    /// * `Ok(Some(SubjectId))` - Account found
    /// * `Ok(None)` - No account uses this phone
    /// * `Err(StoreError)` - Lookup failed
    async fn find_subject_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<SubjectId>>;
}
