//! Checkout form model and submit-time validation
//!
//! Validation never fails fast: every problem is collected so the page can
//! mark all offending fields at once. Only the selected payment method's
//! fields are checked.

use crate::address::ServiceArea;
use crate::validate::{
    is_valid_card_number, is_valid_cep, is_valid_cpf_cnpj, is_valid_cvv, is_valid_email,
    is_valid_expiry, is_valid_phone,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment methods offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card: name, number, expiry, CVV
    #[default]
    CreditCard,
    /// Bank slip: CPF/CNPJ
    Boleto,
    /// Instant transfer: PIX key
    Pix,
}

impl PaymentMethod {
    /// Form value of this method
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Boleto => "boleto",
            Self::Pix => "pix",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "boleto" => Ok(Self::Boleto),
            "pix" => Ok(Self::Pix),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Form fields, identified by their element ids
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Email,
    Phone,
    FirstName,
    LastName,
    Address,
    Neighborhood,
    City,
    State,
    ZipCode,
    CardName,
    CardNumber,
    Expiry,
    Cvv,
    Cpf,
    PixKey,
    /// Form-level: cart problems
    Cart,
    /// Form-level: anything else (order placement failures)
    General,
}

impl Field {
    /// Every field, page order first, then the form-level ones
    pub const ALL: [Self; 17] = [
        Self::Email,
        Self::Phone,
        Self::FirstName,
        Self::LastName,
        Self::Address,
        Self::Neighborhood,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::CardName,
        Self::CardNumber,
        Self::Expiry,
        Self::Cvv,
        Self::Cpf,
        Self::PixKey,
        Self::Cart,
        Self::General,
    ];

    /// Element id in the page
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Address => "address",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::CardName => "cardName",
            Self::CardNumber => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::Cpf => "cpf",
            Self::PixKey => "pixKey",
            Self::Cart => "cart",
            Self::General => "general",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Inline error attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field
    pub field: Field,
    /// Message shown next to it
    pub message: String,
}

impl FieldError {
    /// Create error
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw checkout form values
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub apartment: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub card_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub card_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expiry: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cvv: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cpf: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pix_key: String,
}

impl CheckoutForm {
    /// Current value of `field` (empty for form-level fields)
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Address => &self.address,
            Field::Neighborhood => &self.neighborhood,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::ZipCode => &self.zip_code,
            Field::CardName => &self.card_name,
            Field::CardNumber => &self.card_number,
            Field::Expiry => &self.expiry,
            Field::Cvv => &self.cvv,
            Field::Cpf => &self.cpf,
            Field::PixKey => &self.pix_key,
            Field::Cart | Field::General => "",
        }
    }

    /// Collect every validation problem, in page order
    #[must_use]
    pub fn validate(&self, cart_is_empty: bool, area: &ServiceArea, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Validator::default();

        errors.check(
            Field::Email,
            &self.email,
            "Email é obrigatório",
            is_valid_email,
            "Por favor, insira um email válido",
        );
        errors.check(
            Field::Phone,
            &self.phone,
            "Telefone é obrigatório",
            is_valid_phone,
            "Por favor, insira um telefone válido",
        );
        errors.check(
            Field::FirstName,
            &self.first_name,
            "Nome é obrigatório",
            has_two_chars,
            "Nome deve ter pelo menos 2 caracteres",
        );
        errors.check(
            Field::LastName,
            &self.last_name,
            "Sobrenome é obrigatório",
            has_two_chars,
            "Sobrenome deve ter pelo menos 2 caracteres",
        );
        errors.require(Field::Address, &self.address, "Endereço é obrigatório");
        errors.require(Field::Neighborhood, &self.neighborhood, "Bairro é obrigatório");
        errors.require(Field::City, &self.city, "Cidade é obrigatória");
        errors.require(Field::State, &self.state, "Estado é obrigatório");
        if !area.contains(&self.city, &self.state) {
            errors.push(Field::City, area.rejection_message());
        }
        errors.check(
            Field::ZipCode,
            &self.zip_code,
            "CEP é obrigatório",
            is_valid_cep,
            "Por favor, insira um CEP válido",
        );

        match self.payment_method {
            PaymentMethod::CreditCard => {
                errors.require(Field::CardName, &self.card_name, "Nome no cartão é obrigatório");
                errors.check(
                    Field::CardNumber,
                    &self.card_number,
                    "Número do cartão é obrigatório",
                    is_valid_card_number,
                    "Por favor, insira um número de cartão válido",
                );
                errors.check(
                    Field::Expiry,
                    &self.expiry,
                    "Data de validade é obrigatória",
                    |v| is_valid_expiry(v, today),
                    "Por favor, insira uma data de validade válida",
                );
                errors.check(
                    Field::Cvv,
                    &self.cvv,
                    "CVV é obrigatório",
                    is_valid_cvv,
                    "Por favor, insira um CVV válido",
                );
            }
            PaymentMethod::Boleto => errors.check(
                Field::Cpf,
                &self.cpf,
                "CPF/CNPJ é obrigatório",
                is_valid_cpf_cnpj,
                "Por favor, insira um CPF ou CNPJ válido",
            ),
            PaymentMethod::Pix => errors.check(
                Field::PixKey,
                &self.pix_key,
                "Chave PIX é obrigatória",
                |v| v.chars().count() >= 5,
                "Chave PIX inválida",
            ),
        }

        if cart_is_empty {
            errors.push(Field::Cart, "Seu carrinho está vazio");
        }
        errors.0
    }
}

fn has_two_chars(value: &str) -> bool {
    value.chars().count() >= 2
}

#[derive(Default)]
struct Validator(Vec<FieldError>);

impl Validator {
    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn require(&mut self, field: Field, value: &str, missing: &str) {
        if value.trim().is_empty() {
            self.push(field, missing);
        }
    }

    fn check(
        &mut self,
        field: Field,
        value: &str,
        missing: &str,
        valid: impl Fn(&str) -> bool,
        invalid: &str,
    ) {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, missing);
        } else if !valid(value) {
            self.push(field, invalid);
        }
    }
}
