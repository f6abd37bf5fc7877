//! In-memory account lookup

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use sw_core::domain::value_objects::{PhoneNumber, SubjectId};
use sw_core::errors::StoreResult;
use sw_core::repositories::UserRepository;

/// Phone to subject map for development and tests
#[derive(Default)]
pub struct InMemoryUserRepository {
    subjects: DashMap<String, SubjectId>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account for `phone` with a fresh subject id
    pub fn add_user(&self, phone: &PhoneNumber) -> SubjectId {
        let subject = SubjectId(Uuid::new_v4());
        self.subjects.insert(phone.as_str().to_string(), subject);
        subject
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_subject_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<SubjectId>> {
        Ok(self.subjects.get(phone.as_str()).map(|subject| *subject))
    }
}
