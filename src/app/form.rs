//! Edit form backing the "Update user" modal.

use crate::model::{User, UserId, UserPatch};

/// Field labels in display order.
pub const FORM_FIELDS: [&str; 5] = ["Name", "Email", "Phone", "City", "Zip Code"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditForm {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub zipcode: String,
    /// Index into [`FORM_FIELDS`].
    pub focused: usize,
}

impl EditForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            city: user.address.city.clone(),
            zipcode: user.address.zipcode.clone(),
            focused: 0,
        }
    }

    pub fn value(&self, idx: usize) -> &str {
        match idx {
            0 => &self.name,
            1 => &self.email,
            2 => &self.phone,
            3 => &self.city,
            _ => &self.zipcode,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focused {
            0 => &mut self.name,
            1 => &mut self.email,
            2 => &mut self.phone,
            3 => &mut self.city,
            _ => &mut self.zipcode,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % FORM_FIELDS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    /// Every editable field is sent, changed or not.
    pub fn to_patch(&self) -> UserPatch {
        UserPatch::new(self.id)
            .name(self.name.clone())
            .email(self.email.clone())
            .phone(self.phone.clone())
            .address(self.city.clone(), self.zipcode.clone())
    }
}
