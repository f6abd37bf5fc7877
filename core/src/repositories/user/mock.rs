//! Mock implementation of UserRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::value_objects::{PhoneNumber, SubjectId};
use crate::errors::StoreResult;

use super::trait_::UserRepository;

/// Mock user repository keyed by E.164 phone
pub struct MockUserRepository {
    users: Mutex<HashMap<String, SubjectId>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Register an account for `phone` and return its subject id
    pub fn add_user(&self, phone: &str) -> SubjectId {
        let subject = SubjectId(Uuid::new_v4());
        self.users.lock().unwrap().insert(phone.to_string(), subject);
        subject
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_subject_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<SubjectId>> {
        Ok(self.users.lock().unwrap().get(phone.as_str()).copied())
    }
}
