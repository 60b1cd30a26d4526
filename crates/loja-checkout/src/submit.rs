//! Order submission
//!
//! The integrated storefront posts the checkout form to the server, which
//! records the order and answers with an `HX-Redirect` to the payment page.
//! A refused order comes back as a small error fragment naming one field.
//! Without a submitter the controller issues a local reference instead.

use crate::error::SubmitError;
use crate::form::{CheckoutForm, Field, FieldError};
use async_trait::async_trait;
use loja_cart::{Cart, LineItem};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Response header carrying the payment page on success
pub const REDIRECT_HEADER: &str = "HX-Redirect";

const REJECTED_FALLBACK: &str = "Erro ao processar pedido. Tente novamente.";

static FIELD_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-field="([A-Za-z]+)"|id="([A-Za-z]+)-error""#).expect("valid pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid pattern"));

/// Order as sent to the order endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Form values
    pub form: CheckoutForm,
    /// Every cart line, installation included
    pub cart_items: Vec<LineItem>,
}

impl OrderRequest {
    /// Build from the form and the current cart
    #[must_use]
    pub fn new(form: &CheckoutForm, cart: &Cart) -> Self {
        Self {
            form: form.clone(),
            cart_items: cart.items().cloned().collect(),
        }
    }

    /// URL-encoded form body: the server's field names plus `cart_items`
    /// as a JSON string
    ///
    /// Card data and the PIX key stay on the page; payment happens after the
    /// redirect.
    ///
    /// # Errors
    /// - `SubmitError::Encode` if the cart cannot be serialized
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, SubmitError> {
        let form = &self.form;
        let text_fields = [
            Field::Email,
            Field::Phone,
            Field::FirstName,
            Field::LastName,
            Field::Address,
            Field::Neighborhood,
            Field::City,
            Field::State,
            Field::ZipCode,
        ];

        let mut fields: Vec<(&'static str, String)> = text_fields
            .into_iter()
            .map(|field| (field.id(), form.value(field).to_string()))
            .collect();
        fields.push(("apartment", form.apartment.clone()));
        fields.push((Field::Cpf.id(), form.cpf.clone()));
        fields.push(("paymentMethod", form.payment_method.as_str().to_string()));
        fields.push(("cart_items", serde_json::to_string(&self.cart_items)?));
        Ok(fields)
    }
}

/// Payment page the server sends the buyer to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentRedirect(String);

impl PaymentRedirect {
    /// Wrap a location
    #[inline]
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// The location
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Places orders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Place `request`, returning where to pay
    ///
    /// # Errors
    /// - `SubmitError::Rejected` if the server refused the order on a field
    /// - `SubmitError` for transport and server failures
    async fn submit(&self, request: &OrderRequest) -> Result<PaymentRedirect, SubmitError>;
}

/// Read the error fragment the order endpoint renders for a refused order
///
/// The field comes from a `data-field` attribute or an `<field>-error` id;
/// an unknown or missing field is reported as a form-level error.
#[must_use]
pub fn parse_rejection(markup: &str) -> FieldError {
    let field = FIELD_ATTR
        .captures(markup)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|name| name.as_str().parse::<Field>().ok())
        .unwrap_or(Field::General);

    let text = TAG.replace_all(markup, " ");
    let message = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if message.is_empty() {
        FieldError::new(field, REJECTED_FALLBACK)
    } else {
        FieldError::new(field, message)
    }
}

/// Posts orders as a form to the order endpoint
#[derive(Debug, Clone)]
pub struct HttpOrderSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderSubmitter {
    /// Create submitter posting to `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Create submitter sharing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl OrderSubmitter for HttpOrderSubmitter {
    async fn submit(&self, request: &OrderRequest) -> Result<PaymentRedirect, SubmitError> {
        tracing::info!(
            endpoint = %self.endpoint,
            items = request.cart_items.len(),
            method = request.form.payment_method.as_str(),
            "submitting order"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .form(&request.form_fields()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let location = response
            .headers()
            .get(REDIRECT_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map(PaymentRedirect::new);
        if let Some(location) = location {
            return Ok(location);
        }

        let body = response.text().await?;
        Err(SubmitError::Rejected(parse_rejection(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::PaymentMethod;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn request() -> OrderRequest {
        let mut cart = Cart::new();
        cart.add("Filter A", Decimal::new(4990, 2), Some(3));
        let form = CheckoutForm {
            email: "ana@loja.com.br".into(),
            first_name: "Ana".into(),
            zip_code: "79002-170".into(),
            payment_method: PaymentMethod::Pix,
            pix_key: "ana@loja.com.br".into(),
            card_number: "4111111111111111".into(),
            ..CheckoutForm::default()
        };
        OrderRequest::new(&form, &cart)
    }

    #[test]
    fn form_uses_server_field_names() {
        let fields = request().form_fields().unwrap();
        let get = |name: &str| {
            fields
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("email"), Some("ana@loja.com.br"));
        assert_eq!(get("firstName"), Some("Ana"));
        assert_eq!(get("zipCode"), Some("79002-170"));
        assert_eq!(get("paymentMethod"), Some("pix"));
        assert_eq!(get("first_name"), None);
        assert_eq!(get("cardNumber"), None);
        assert_eq!(get("pixKey"), None);
    }

    #[test]
    fn cart_items_travel_as_json_text() {
        let fields = request().form_fields().unwrap();
        let (_, raw) = fields.iter().find(|(key, _)| *key == "cart_items").unwrap();
        let items: serde_json::Value = serde_json::from_str(raw).unwrap();

        assert_eq!(items[0]["name"], "Filter A");
        assert_eq!(items[0]["price"], 49.9);
        assert_eq!(items[0]["quantity"], 1);
        assert_eq!(items[0]["id"], 3);
    }

    #[test]
    fn rejection_names_its_field() {
        let markup = r#"<div class="error" data-field="zipCode">
            <p>Por favor, insira um CEP válido</p>
        </div>"#;
        assert_eq!(
            parse_rejection(markup),
            FieldError::new(Field::ZipCode, "Por favor, insira um CEP válido")
        );

        let markup = r#"<p id="cart-error">Seu carrinho está vazio</p>"#;
        assert_eq!(
            parse_rejection(markup),
            FieldError::new(Field::Cart, "Seu carrinho está vazio")
        );
    }

    #[test]
    fn rejection_without_field_is_form_level() {
        let error = parse_rejection("<p>Pagamento temporariamente indisponível.</p>");
        assert_eq!(error.field, Field::General);
        assert_eq!(error.message, "Pagamento temporariamente indisponível.");

        assert_eq!(parse_rejection("  ").message, REJECTED_FALLBACK);
    }
}
