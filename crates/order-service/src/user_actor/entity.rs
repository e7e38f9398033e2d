//! [`ActorEntity`] implementation for [`User`].

use super::error::UserError;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;

/// `local@domain.tld`, nothing stricter.
fn validate_email(email: &str) -> Result<(), UserError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !email.contains(char::is_whitespace)
    });
    if valid {
        Ok(())
    } else {
        Err(UserError::InvalidEmail(email.to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::EmptyName);
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        validate_name(&params.name)?;
        validate_email(&params.email)?;
        Ok(Self::new(id, params.name, params.email.to_lowercase()))
    }

    /// # Fields Updated
    /// - `name`: display name
    /// - `email`: contact address, lower-cased
    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            validate_name(&name)?;
            self.name = name;
        }
        if let Some(email) = update.email {
            validate_email(&email)?;
            self.email = email.to_lowercase();
        }
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice @example.com").is_err());
        assert!(validate_email("alice@.com").is_err());
    }

    #[test]
    fn create_normalises_email() {
        let user = User::from_create_params(
            UserId(1),
            UserCreate {
                name: "Alice".into(),
                email: "Alice@Example.com".into(),
            },
        )
        .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }
}
