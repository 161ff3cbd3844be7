//! Request validation.
//!
//! Validators collect every field failure (no early abort) so a client can
//! fix a form in one round trip. A failed validation renders as 422 with
//! `errors: [{field, message, code}]`.

use serde::Serialize;

use crate::app::dto::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UpdateProfileRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    pub code: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            field,
            message: message.into(),
            code,
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"), "required")
    }
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    check_email(&mut errors, "email", &req.email);

    if req.password.is_empty() {
        errors.push(FieldError::required("password"));
    } else {
        check_password_strength(&mut errors, "password", &req.password);
    }
    if req.confirm_password != req.password {
        errors.push(FieldError::new(
            "confirmPassword",
            "passwords do not match",
            "mismatch",
        ));
    }

    check_name(&mut errors, "firstName", &req.first_name);
    check_name(&mut errors, "lastName", &req.last_name);

    if let Some(phone) = non_empty(&req.phone_number) {
        check_phone(&mut errors, "phoneNumber", phone);
    }

    if req.user_type.trim().is_empty() {
        errors.push(FieldError::required("userType"));
    }

    // Business accounts must name the company they register under.
    if req.user_type == "BUSINESS_USER" {
        match non_empty(&req.company_name) {
            Some(name) if name.len() > 100 => errors.push(FieldError::new(
                "companyName",
                "companyName cannot exceed 100 characters",
                "too_long",
            )),
            Some(_) => {}
            None => errors.push(FieldError::new(
                "companyName",
                "companyName is required for business accounts",
                "required",
            )),
        }
    }

    finish(errors)
}

pub fn validate_login(req: &LoginRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    check_email(&mut errors, "email", &req.email);
    if req.password.is_empty() {
        errors.push(FieldError::required("password"));
    } else if req.password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "password must be at least 6 characters long",
            "too_short",
        ));
    }

    finish(errors)
}

pub fn validate_update_profile(req: &UpdateProfileRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    check_max_len(&mut errors, "firstName", &req.first_name, 50);
    check_max_len(&mut errors, "lastName", &req.last_name, 50);
    check_max_len(&mut errors, "displayName", &req.display_name, 100);

    if let Some(phone) = non_empty(&req.phone_number) {
        check_phone(&mut errors, "phoneNumber", phone);
    }
    if let Some(url) = non_empty(&req.photo_url) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(FieldError::new(
                "photoURL",
                "photoURL must be a valid http(s) URL",
                "invalid_url",
            ));
        }
    }

    finish(errors)
}

pub fn validate_change_password(req: &ChangePasswordRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.current_password.is_empty() {
        errors.push(FieldError::required("currentPassword"));
    }
    if req.new_password.is_empty() {
        errors.push(FieldError::required("newPassword"));
    } else {
        check_password_strength(&mut errors, "newPassword", &req.new_password);
    }

    finish(errors)
}

pub fn validate_reset_password(req: &ResetPasswordRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_email(&mut errors, "email", &req.email);
    finish(errors)
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_email(errors: &mut Vec<FieldError>, field: &'static str, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::required(field));
        return;
    }
    if !is_valid_email(email) {
        errors.push(FieldError::new(
            field,
            "please provide a valid email address",
            "invalid_email",
        ));
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn check_name(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::required(field));
    } else if value.len() > 50 {
        errors.push(FieldError::new(
            field,
            format!("{field} cannot exceed 50 characters"),
            "too_long",
        ));
    }
}

fn check_max_len(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &Option<String>,
    max: usize,
) {
    if let Some(value) = non_empty(value) {
        if value.len() > max {
            errors.push(FieldError::new(
                field,
                format!("{field} cannot exceed {max} characters"),
                "too_long",
            ));
        }
    }
}

fn check_phone(errors: &mut Vec<FieldError>, field: &'static str, phone: &str) {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        errors.push(FieldError::new(
            field,
            "please provide a valid phone number",
            "invalid_phone",
        ));
    }
}

fn check_password_strength(errors: &mut Vec<FieldError>, field: &'static str, password: &str) {
    if password.len() < 8 {
        errors.push(FieldError::new(
            field,
            format!("{field} must be at least 8 characters long"),
            "too_short",
        ));
        return;
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.push(FieldError::new(
            field,
            format!("{field} must contain an uppercase letter, a lowercase letter, and a digit"),
            "too_weak",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "Str0ngPass".to_string(),
            confirm_password: "Str0ngPass".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            phone_number: None,
            user_type: "CLIENT_USER".to_string(),
            company_name: None,
        }
    }

    #[test]
    fn valid_register_passes() {
        assert!(validate_register(&register_request()).is_ok());
    }

    #[test]
    fn business_user_without_company_name_is_rejected() {
        let mut req = register_request();
        req.user_type = "BUSINESS_USER".to_string();

        let errors = validate_register(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "companyName" && e.code == "required"));
    }

    #[test]
    fn password_mismatch_is_reported() {
        let mut req = register_request();
        req.confirm_password = "Different1".to_string();

        let errors = validate_register(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "confirmPassword" && e.code == "mismatch"));
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let mut req = register_request();
        req.password = "alllowercase1".to_string();
        req.confirm_password = req.password.clone();

        let errors = validate_register(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "password" && e.code == "too_weak"));
    }

    #[test]
    fn all_failures_are_collected_at_once() {
        let req = RegisterRequest {
            email: "nope".to_string(),
            password: String::new(),
            confirm_password: "x".to_string(),
            first_name: String::new(),
            last_name: "Smith".to_string(),
            phone_number: Some("abc".to_string()),
            user_type: "CLIENT_USER".to_string(),
            company_name: None,
        };

        let errors = validate_register(&req).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        for field in ["email", "password", "confirmPassword", "firstName", "phoneNumber"] {
            assert!(fields.contains(&field), "missing failure for {field}");
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@.co"));
    }

    #[test]
    fn profile_url_must_be_http() {
        let req = UpdateProfileRequest {
            first_name: None,
            last_name: None,
            display_name: None,
            phone_number: None,
            photo_url: Some("ftp://example.com/x.png".to_string()),
        };
        let errors = validate_update_profile(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "photoURL"));
    }
}
