//! User service
//!
//! Profile and contact-list reads. `online` is never stored; it is read from
//! the presence registry at request time.

use parley_common::AppResult;
use parley_core::{DomainError, UserId};

use crate::dto::{ContactResponse, CurrentUserResponse};
use crate::state::AppState;

pub struct UserService<'a> {
    state: &'a AppState,
}

impl<'a> UserService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn current_user(&self, user_id: UserId) -> AppResult<CurrentUserResponse> {
        let user = self
            .state
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let online = self.state.router().is_online(user_id);
        Ok(CurrentUserResponse::new(user, online))
    }

    /// Everyone except the caller
    pub async fn contacts(&self, user_id: UserId) -> AppResult<Vec<ContactResponse>> {
        let users = self.state.users().list_all().await?;
        let online = self.state.router().online_users();

        Ok(users
            .into_iter()
            .filter(|user| user.id != user_id)
            .map(|user| {
                let is_online = online.contains(&user.id);
                ContactResponse::from(user.into_contact(is_online))
            })
            .collect())
    }
}
