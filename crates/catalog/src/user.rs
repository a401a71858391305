use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tours_core::{Entity, FieldErrors, UserId};

use crate::{BLANK_MESSAGE, is_blank};

/// Declared genre of a catalog user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "H")]
    Hombre,
    #[serde(rename = "M")]
    Mujer,
}

impl Genre {
    pub fn code(self) -> &'static str {
        match self {
            Genre::Hombre => "H",
            Genre::Mujer => "M",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "H" => Some(Genre::Hombre),
            "M" => Some(Genre::Mujer),
            _ => None,
        }
    }
}

/// A person registered in the catalog (not a login account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub genre: Option<Genre>,
    pub key: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub genre: Option<Genre>,
    pub key: Option<String>,
    pub user_type: Option<String>,
}

/// Partial update for a user; same supplied/untouched convention as
/// [`crate::ZonePatch`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<Option<NaiveDate>>,
    pub genre: Option<Option<Genre>>,
    pub key: Option<Option<String>>,
    pub user_type: Option<Option<String>>,
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if is_blank(email) {
        errors.add("email", BLANK_MESSAGE);
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        errors.add("email", "Enter a valid email address.");
    }
}

impl NewUser {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.name) {
            errors.add("name", BLANK_MESSAGE);
        }
        if is_blank(&self.last_name) {
            errors.add("last_name", BLANK_MESSAGE);
        }
        check_email(&mut errors, &self.email);
        errors
    }
}

impl UserPatch {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.as_deref().is_some_and(is_blank) {
            errors.add("name", BLANK_MESSAGE);
        }
        if self.last_name.as_deref().is_some_and(is_blank) {
            errors.add("last_name", BLANK_MESSAGE);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        errors
    }
}

impl User {
    pub fn create(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            name: new.name,
            last_name: new.last_name,
            email: new.email,
            birthday: new.birthday,
            genre: new.genre,
            key: new.key,
            user_type: new.user_type,
        }
    }

    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = birthday;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(key) = &patch.key {
            self.key = key.clone();
        }
        if let Some(user_type) = &patch.user_type {
            self.user_type = user_type.clone();
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}
