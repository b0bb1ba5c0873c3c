use crate::api::requests::CustomerInput;
use rocketstore::customers::CreateCustomerCommand;
use std::collections::BTreeMap;

const MAX_NAME_CHARS: usize = 200;
const MAX_EMAIL_CHARS: usize = 200;
const MAX_ADDRESS_CHARS: usize = 500;
const VAT_NUMBER_DIGITS: usize = 9;

pub const NAME_FIELD: &str = "Customer.Name";
pub const EMAIL_FIELD: &str = "Customer.EmailAddress";
pub const VAT_NUMBER_FIELD: &str = "Customer.VatNumber";
pub const ADDRESS_FIELD: &str = "Customer.Address";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required {
        field: &'static str,
        label: &'static str,
    },
    TooLong {
        field: &'static str,
        label: &'static str,
        max: usize,
        actual: usize,
    },
    InvalidEmail,
    InvalidVatNumber,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field, .. } | ValidationError::TooLong { field, .. } => field,
            ValidationError::InvalidEmail => EMAIL_FIELD,
            ValidationError::InvalidVatNumber => VAT_NUMBER_FIELD,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Required { label, .. } => write!(f, "'{}' must not be empty.", label),
            ValidationError::TooLong {
                label, max, actual, ..
            } => write!(
                f,
                "The length of '{}' must be {} characters or fewer. You entered {} characters.",
                label, max, actual
            ),
            ValidationError::InvalidEmail => write!(f, "'Email Address' is not a valid email address."),
            ValidationError::InvalidVatNumber => write!(f, "'Vat Number' is not in the correct format."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation failures grouped by field, in field order
#[derive(Debug, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn by_field(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut map: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for error in &self.0 {
            map.entry(error.field()).or_default().push(error.to_string());
        }
        map
    }
}

pub struct CustomerValidator;

impl CustomerValidator {
    /// Validates submitted customer fields and builds the create command from them.
    pub fn to_command(input: CustomerInput) -> Result<CreateCustomerCommand, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = Self::required(&mut errors, input.name, NAME_FIELD, "Name", MAX_NAME_CHARS);
        let email = Self::required(
            &mut errors,
            input.email_address,
            EMAIL_FIELD,
            "Email Address",
            MAX_EMAIL_CHARS,
        );
        if let Some(email) = &email {
            if !is_email_address(email) {
                errors.push(ValidationError::InvalidEmail);
            }
        }

        let vat_number = input.vat_number.filter(|v| !v.is_empty());
        if let Some(vat) = &vat_number {
            if !is_vat_number(vat) {
                errors.push(ValidationError::InvalidVatNumber);
            }
        }

        let address = input.address.filter(|a| !a.trim().is_empty());
        if let Some(address) = &address {
            Self::max_length(&mut errors, address, ADDRESS_FIELD, "Address", MAX_ADDRESS_CHARS);
        }

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(CreateCustomerCommand {
                name,
                email,
                vat_number,
                address,
            }),
            _ => Err(errors),
        }
    }

    fn required(
        errors: &mut ValidationErrors,
        value: Option<String>,
        field: &'static str,
        label: &'static str,
        max: usize,
    ) -> Option<String> {
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(value) => {
                Self::max_length(errors, &value, field, label, max);
                Some(value)
            }
            None => {
                errors.push(ValidationError::Required { field, label });
                None
            }
        }
    }

    fn max_length(
        errors: &mut ValidationErrors,
        value: &str,
        field: &'static str,
        label: &'static str,
        max: usize,
    ) {
        let actual = value.chars().count();
        if actual > max {
            errors.push(ValidationError::TooLong {
                field,
                label,
                max,
                actual,
            });
        }
    }
}

/// One `@` with non-empty local and domain parts, no whitespace.
fn is_email_address(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_vat_number(value: &str) -> bool {
    value.len() == VAT_NUMBER_DIGITS && value.bytes().all(|b| b.is_ascii_digit())
}
