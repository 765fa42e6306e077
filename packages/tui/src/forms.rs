//! Form buffers and the validation that runs before any remote call.

use telcome_session::Role;
use tui_input::Input;

/// Minimum password length accepted by the sign-in and sign-up forms.
const MIN_PASSWORD_LEN: usize = 6;

/// Validate credentials before hitting the network. Returns the inline
/// error text to display, if any.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), String> {
    if !email.contains('@') {
        return Err("Please enter a valid email address.".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInField {
    Email,
    Password,
}

pub struct SignInForm {
    pub email: Input,
    pub password: Input,
    pub focus: SignInField,
}

impl SignInForm {
    pub fn new() -> Self {
        Self {
            email: Input::default(),
            password: Input::default(),
            focus: SignInField::Email,
        }
    }

    pub fn focused_mut(&mut self) -> &mut Input {
        match self.focus {
            SignInField::Email => &mut self.email,
            SignInField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            SignInField::Email => SignInField::Password,
            SignInField::Password => SignInField::Email,
        };
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_credentials(self.email.value(), self.password.value())
    }
}

impl Default for SignInForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpField {
    Username,
    Email,
    Password,
}

pub struct SignUpForm {
    pub username: Input,
    pub email: Input,
    pub password: Input,
    /// Self-service registration only creates client accounts.
    pub role: Role,
    pub focus: SignUpField,
}

impl SignUpForm {
    pub fn new() -> Self {
        Self {
            username: Input::default(),
            email: Input::default(),
            password: Input::default(),
            role: Role::Client,
            focus: SignUpField::Username,
        }
    }

    pub fn focused_mut(&mut self) -> &mut Input {
        match self.focus {
            SignUpField::Username => &mut self.username,
            SignUpField::Email => &mut self.email,
            SignUpField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            SignUpField::Username => SignUpField::Email,
            SignUpField::Email => SignUpField::Password,
            SignUpField::Password => SignUpField::Username,
        };
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.username.value().trim().is_empty() {
            return Err("Please choose a username.".to_string());
        }
        validate_credentials(self.email.value(), self.password.value())
    }
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self::new()
    }
}
