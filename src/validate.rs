//! Field validators for the signup form.
//!
//! Each validator trims its input and returns `Ok(())` or the [`Reason`] to
//! show under the field. Patterns:
//!
//! - full name: `^[A-Za-z]+ [A-Za-z]+$`
//! - username: 3 to 50 characters matching `^[A-Za-z0-9_]+(?: [A-Za-z0-9_]+)*$`
//! - email: `^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(\.[A-Za-z]{2,})?$`
//!
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 14;
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Why a field was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    EnterFullName,
    EnterFirstAndLastName,
    EnterUsername,
    UsernameFormat,
    EnterEmail,
    InvalidEmail,
    EnterPassword,
    PasswordComplexity,
    PasswordTooShort,
    PasswordTooLong,
    ConfirmPassword,
    PasswordsDoNotMatch,
}

impl Reason {
    pub fn message(self) -> &'static str {
        match self {
            Reason::EnterFullName => "Please enter your full name",
            Reason::EnterFirstAndLastName => "Please enter your first and last name",
            Reason::EnterUsername => "Please enter a username",
            Reason::UsernameFormat => {
                "Username must be between 3 and 50 characters long and can only contain letters, digits, underscores and single spaces"
            }
            Reason::EnterEmail => "Please enter your email",
            Reason::InvalidEmail => "Please enter a valid email address",
            Reason::EnterPassword => "Please enter a password",
            Reason::PasswordComplexity => {
                "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character"
            }
            Reason::PasswordTooShort => "Password must be at least 8 characters long",
            Reason::PasswordTooLong => "Password must be at most 14 characters long",
            Reason::ConfirmPassword => "Please confirm your password",
            Reason::PasswordsDoNotMatch => "Passwords do not match",
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// The five signup inputs, in form order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    FullName,
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FullName,
        Field::Username,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full name",
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm password",
        }
    }
}

pub type FieldResult = std::result::Result<(), Reason>;

type Pattern = LazyLock<Option<Regex>>;

static FULL_NAME: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z]+ [A-Za-z]+$").ok());

// The length bound is checked separately; `regex` has no lookahead.
static USERNAME: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+(?: [A-Za-z0-9_]+)*$").ok());

static EMAIL: Pattern = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(\.[A-Za-z]{2,})?$").ok()
});

/// A pattern that failed to compile matches nothing.
fn is_match_of(pattern: &Pattern, s: &str) -> bool {
    match &**pattern {
        Some(re) => re.is_match(s),
        None => false,
    }
}

pub fn validate_full_name(input: &str) -> FieldResult {
    let s = input.trim();
    if s.is_empty() {
        return Err(Reason::EnterFullName);
    }
    if is_match_of(&FULL_NAME, s) { Ok(()) } else { Err(Reason::EnterFirstAndLastName) }
}

pub fn validate_username(input: &str) -> FieldResult {
    let s = input.trim();
    if s.is_empty() {
        return Err(Reason::EnterUsername);
    }
    let len = s.chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) && is_match_of(&USERNAME, s) {
        Ok(())
    } else {
        Err(Reason::UsernameFormat)
    }
}

pub fn validate_email(input: &str) -> FieldResult {
    let s = input.trim();
    if s.is_empty() {
        return Err(Reason::EnterEmail);
    }
    if is_match_of(&EMAIL, s) { Ok(()) } else { Err(Reason::InvalidEmail) }
}

/// True when `password` has an uppercase letter, a lowercase letter, a digit
/// and one of [`PASSWORD_SPECIALS`].
pub fn validate_password_complexity(password: &str) -> bool {
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    upper && lower && digit && special
}

/// Reasons are reported in a fixed priority: empty, complexity, too short,
/// too long. Lengths are counted in Unicode scalar values.
pub fn validate_password(input: &str) -> FieldResult {
    let s = input.trim();
    if s.is_empty() {
        return Err(Reason::EnterPassword);
    }
    if !validate_password_complexity(s) {
        return Err(Reason::PasswordComplexity);
    }
    let len = s.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(Reason::PasswordTooShort);
    }
    if len > PASSWORD_MAX_LEN {
        return Err(Reason::PasswordTooLong);
    }
    Ok(())
}

pub fn validate_confirm_password(password: &str, confirm: &str) -> FieldResult {
    let confirm = confirm.trim();
    if confirm.is_empty() {
        return Err(Reason::ConfirmPassword);
    }
    if password.trim() != confirm {
        return Err(Reason::PasswordsDoNotMatch);
    }
    Ok(())
}

/// Raw signup inputs as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub is_admin: bool,
}

impl SignupForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        }
    }
}

/// Outcome of one validation pass: one error slot per field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupReport {
    slots: [Option<Reason>; 5],
}

impl SignupReport {
    pub fn get(&self, field: Field) -> Option<Reason> {
        self.slots[field as usize]
    }

    pub fn is_valid(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Failing fields in form order.
    pub fn errors(&self) -> impl Iterator<Item = (Field, Reason)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|r| (f, r)))
    }
}

impl Display for SignupReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, reason) in self.errors() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.label(), reason)?;
            first = false;
        }
        Ok(())
    }
}

/// Validate every field. The report is built from scratch on each call, so
/// no message from an earlier pass survives.
pub fn validate_signup(form: &SignupForm) -> SignupReport {
    let results = [
        validate_full_name(&form.full_name),
        validate_username(&form.username),
        validate_email(&form.email),
        validate_password(&form.password),
        validate_confirm_password(&form.password, &form.confirm_password),
    ];
    SignupReport {
        slots: results.map(|r| r.err()),
    }
}
