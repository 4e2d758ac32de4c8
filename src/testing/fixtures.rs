//! Test fixtures for impersonation tests

use crate::traits::identity::Identity;
use uuid::Uuid;

/// Helper functions for generating fake test data
pub mod fake {
    use super::*;

    /// Generate a fake email address
    pub fn email() -> String {
        format!("test-{}@example.com", Uuid::new_v4().simple())
    }

    /// Generate a fake UUID as a string
    pub fn uuid() -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate a fake name
    pub fn name() -> String {
        format!("Test User {}", &Uuid::new_v4().simple().to_string()[..8])
    }
}

/// A user with explicit impersonation capabilities.
///
/// Regular users can be impersonated but cannot impersonate; admins can
/// impersonate but are protected from being impersonated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub can_impersonate: bool,
    pub can_be_impersonated: bool,
}

impl TestUser {
    /// A regular user with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self::builder().with_id(id).build()
    }

    /// An admin with the given id.
    pub fn admin(id: impl Into<String>) -> Self {
        Self::builder()
            .with_id(id)
            .can_impersonate(true)
            .can_be_impersonated(false)
            .build()
    }

    pub fn builder() -> TestUserBuilder {
        TestUserBuilder::default()
    }

    /// A regular user with generated values
    pub fn generate() -> Self {
        Self::builder().build()
    }
}

impl Identity for TestUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn can_be_impersonated(&self) -> bool {
        self.can_be_impersonated
    }

    fn can_impersonate(&self) -> bool {
        self.can_impersonate
    }
}

/// Builder for TestUser
pub struct TestUserBuilder {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    can_impersonate: bool,
    can_be_impersonated: bool,
}

impl Default for TestUserBuilder {
    fn default() -> Self {
        Self {
            id: None,
            email: None,
            name: None,
            can_impersonate: false,
            can_be_impersonated: true,
        }
    }
}

impl TestUserBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn can_impersonate(mut self, allowed: bool) -> Self {
        self.can_impersonate = allowed;
        self
    }

    pub fn can_be_impersonated(mut self, allowed: bool) -> Self {
        self.can_be_impersonated = allowed;
        self
    }

    pub fn build(self) -> TestUser {
        TestUser {
            id: self.id.unwrap_or_else(fake::uuid),
            email: self.email.unwrap_or_else(fake::email),
            name: self.name.unwrap_or_else(fake::name),
            can_impersonate: self.can_impersonate,
            can_be_impersonated: self.can_be_impersonated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_user_capabilities() {
        let user = TestUser::new("2");
        assert_eq!(user.id(), "2");
        assert!(!user.can_impersonate());
        assert!(user.can_be_impersonated());
    }

    #[test]
    fn test_admin_capabilities() {
        let admin = TestUser::admin("1");
        assert!(admin.can_impersonate());
        assert!(!admin.can_be_impersonated());
    }

    #[test]
    fn test_builder_generates_missing_fields() {
        let user = TestUser::builder().with_email("custom@example.com").build();

        assert_eq!(user.email, "custom@example.com");
        assert_eq!(user.id.len(), 36);
        assert!(user.name.starts_with("Test User "));
    }
}
