//! Checkout form controller
//!
//! Formats fields as they are typed, resolves the postal code into an
//! address, and on submit either marks every invalid field or places the
//! order. A locally placed order clears the cart; an order placed on the
//! server keeps it until payment completes on the page it redirects to.

use crate::address::{AddressInfo, AddressLookup};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, SubmitError};
use crate::form::{CheckoutForm, Field, FieldError};
use crate::format::{digits_only, format_card_number, format_cep, format_cpf_cnpj, format_expiry};
use crate::order_ref::OrderReference;
use crate::submit::{OrderRequest, OrderSubmitter, PaymentRedirect};
use crate::summary::CheckoutSummary;
use chrono::NaiveDate;
use loja_cart::{Cart, CartEngine, CartStore};
use loja_ui::{InstallationUpsell, SummaryRefresh, UpsellSession, UpsellTarget};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

const LOOKUP_NOT_FOUND: &str = "CEP não encontrado";
const LOOKUP_FAILED: &str = "Não foi possível consultar o CEP";
const ORDER_FAILED: &str = "Erro ao processar pedido. Tente novamente.";

/// Checkout page operations
pub trait CheckoutSurface: Send + Sync {
    /// Show `error` next to its field, with the error style
    fn show_field_error(&self, error: &FieldError);
    /// Remove every inline error
    fn clear_field_errors(&self);
    /// Scroll `field` into view
    fn scroll_into_view(&self, field: Field);
    /// Overwrite the value of `field`
    fn set_field_value(&self, field: Field, value: &str);
    /// Redraw the order summary (and the place-order control)
    fn render_summary(&self, summary: &CheckoutSummary);
    /// Hide the form and show the confirmation
    fn show_confirmation(&self, reference: &OrderReference);
    /// Scroll to the top of the page
    fn scroll_to_top(&self);
    /// Leave the checkout for `location`
    fn navigate(&self, location: &str);
}

/// Redraws the checkout summary; handed to the upsell as its re-render target
pub struct SummaryRenderer {
    surface: Arc<dyn CheckoutSurface>,
    config: CheckoutConfig,
}

impl SummaryRenderer {
    /// Render `cart` and return the summary drawn
    pub fn render(&self, cart: &Cart) -> CheckoutSummary {
        let summary = CheckoutSummary::from_cart(cart, &self.config);
        self.surface.render_summary(&summary);
        summary
    }
}

impl SummaryRefresh for SummaryRenderer {
    fn refresh_summary(&self, cart: &Cart) {
        self.render(cart);
    }
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Invalid(Vec<FieldError>),
    /// The order endpoint refused; cart kept
    Rejected(FieldError),
    /// Order placed locally and cart cleared
    Placed(OrderReference),
    /// Order recorded by the server; buyer sent to pay, cart kept
    Redirected(PaymentRedirect),
}

/// Result of a postal code input event
pub enum PostalCodeOutcome<S> {
    /// Fewer than 8 digits so far
    Incomplete,
    /// Same code as the last lookup; nothing was looked up or offered
    Unchanged,
    /// Lookup failed or the code is unknown
    LookupFailed,
    /// Address resolved outside the service area
    OutOfArea(AddressInfo),
    /// Address prefilled; the upsell is open if one is wired
    Serviceable {
        /// Resolved address
        address: AddressInfo,
        /// Open upsell, waiting for a decision
        upsell: Option<UpsellSession<S>>,
    },
}

impl<S> fmt::Debug for PostalCodeOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => f.write_str("Incomplete"),
            Self::Unchanged => f.write_str("Unchanged"),
            Self::LookupFailed => f.write_str("LookupFailed"),
            Self::OutOfArea(address) => f.debug_tuple("OutOfArea").field(address).finish(),
            Self::Serviceable { address, upsell } => f
                .debug_struct("Serviceable")
                .field("address", address)
                .field("upsell", &upsell.is_some())
                .finish(),
        }
    }
}

/// Checkout form controller
pub struct CheckoutController<S> {
    engine: Arc<CartEngine<S>>,
    surface: Arc<dyn CheckoutSurface>,
    lookup: Arc<dyn AddressLookup>,
    submitter: Option<Arc<dyn OrderSubmitter>>,
    upsell: Option<Arc<InstallationUpsell<S>>>,
    summary: Arc<SummaryRenderer>,
    config: CheckoutConfig,
    /// Digits of the last code that got an answer from the lookup
    last_code: Mutex<Option<String>>,
}

impl<S> fmt::Debug for CheckoutController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutController")
            .field("config", &self.config)
            .field("submitter", &self.submitter.is_some())
            .field("upsell", &self.upsell.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: CartStore + 'static> CheckoutController<S> {
    /// Create controller; orders get local references until a submitter is set
    pub fn new(
        engine: Arc<CartEngine<S>>,
        surface: Arc<dyn CheckoutSurface>,
        lookup: Arc<dyn AddressLookup>,
        config: CheckoutConfig,
    ) -> Self {
        let summary = Arc::new(SummaryRenderer {
            surface: Arc::clone(&surface),
            config: config.clone(),
        });
        Self {
            engine,
            surface,
            lookup,
            submitter: None,
            upsell: None,
            summary,
            config,
            last_code: Mutex::new(None),
        }
    }

    /// Place orders through `submitter`
    #[must_use]
    pub fn with_submitter(mut self, submitter: Arc<dyn OrderSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Offer the installation once a serviceable address is entered
    #[must_use]
    pub fn with_upsell(mut self, upsell: Arc<InstallationUpsell<S>>) -> Self {
        self.upsell = Some(upsell);
        self
    }

    /// Checkout configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Redraw the order summary from the persisted cart
    pub fn render_summary(&self) -> CheckoutSummary {
        self.summary.render(&self.engine.cart())
    }

    /// Format `raw` for `field`, writing it back if it changed
    ///
    /// City and state are pinned to the service area whatever is typed.
    pub fn on_input(&self, field: Field, raw: &str) -> String {
        let area = &self.config.service_area;
        let value = match field {
            Field::CardNumber => format_card_number(raw),
            Field::Expiry => format_expiry(raw),
            Field::Cvv => digits_only(raw),
            Field::Cpf => format_cpf_cnpj(raw),
            Field::ZipCode => format_cep(raw),
            Field::City => area.city.clone(),
            Field::State => area.state.clone(),
            _ => raw.to_string(),
        };
        if value != raw {
            self.surface.set_field_value(field, &value);
        }
        value
    }

    /// Handle postal code input; looks the address up at 8 digits
    ///
    /// Re-entering the code that was last answered does nothing, so the
    /// installation is offered once per address.
    ///
    /// # Errors
    /// - `CheckoutError::Ui` if the upsell failed for a reason other than
    ///   its markup not loading
    pub async fn on_postal_code_input(&self, raw: &str) -> Result<PostalCodeOutcome<S>, CheckoutError> {
        let cep = self.on_input(Field::ZipCode, raw);
        let digits = digits_only(&cep);
        if digits.len() != 8 {
            return Ok(PostalCodeOutcome::Incomplete);
        }
        if self.last_code.lock().as_deref() == Some(digits.as_str()) {
            tracing::debug!(cep = %digits, "postal code unchanged");
            return Ok(PostalCodeOutcome::Unchanged);
        }

        let looked_up = self.lookup.lookup(&digits).await;
        *self.last_code.lock() = match &looked_up {
            Err(error) if !error.is_not_found() => None,
            _ => Some(digits.clone()),
        };

        let address = match looked_up {
            Ok(address) => address,
            Err(error) => {
                tracing::warn!(%error, cep = %digits, "postal code lookup failed");
                let message = if error.is_not_found() {
                    LOOKUP_NOT_FOUND
                } else {
                    LOOKUP_FAILED
                };
                self.reset_address();
                self.surface
                    .show_field_error(&FieldError::new(Field::ZipCode, message));
                return Ok(PostalCodeOutcome::LookupFailed);
            }
        };

        let area = &self.config.service_area;
        if !area.contains(&address.city, &address.state) {
            tracing::warn!(city = %address.city, state = %address.state, "postal code outside service area");
            self.reset_address();
            self.surface
                .show_field_error(&FieldError::new(Field::ZipCode, area.rejection_message()));
            return Ok(PostalCodeOutcome::OutOfArea(address));
        }

        self.surface.set_field_value(Field::Address, &address.street);
        self.surface
            .set_field_value(Field::Neighborhood, &address.neighborhood);
        self.pin_area();

        let upsell = match &self.upsell {
            Some(upsell) => {
                let summary: Arc<dyn SummaryRefresh> = self.summary.clone();
                match upsell.begin(UpsellTarget::Rerender(summary)).await {
                    Ok(session) => Some(session),
                    Err(error) if error.is_not_loaded() => {
                        tracing::warn!(%error, "installation offer unavailable");
                        None
                    }
                    Err(error) => return Err(error.into()),
                }
            }
            None => None,
        };
        Ok(PostalCodeOutcome::Serviceable { address, upsell })
    }

    /// Validate and place the order, relative to today's date
    ///
    /// # Errors
    /// - `CheckoutError::Cart` if the cart cannot be cleared
    pub async fn submit(&self, form: &CheckoutForm) -> Result<SubmitOutcome, CheckoutError> {
        self.submit_on(form, chrono::Local::now().date_naive()).await
    }

    /// Validate and place the order, judging card expiry against `today`
    ///
    /// # Errors
    /// - `CheckoutError::Cart` if the cart cannot be cleared
    pub async fn submit_on(
        &self,
        form: &CheckoutForm,
        today: NaiveDate,
    ) -> Result<SubmitOutcome, CheckoutError> {
        self.surface.clear_field_errors();
        let cart = self.engine.cart();

        let errors = form.validate(cart.is_empty(), &self.config.service_area, today);
        if let Some(first) = errors.first() {
            for error in &errors {
                self.surface.show_field_error(error);
            }
            self.surface.scroll_into_view(first.field);
            tracing::debug!(count = errors.len(), "checkout form invalid");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        if let Some(submitter) = &self.submitter {
            let error = match submitter.submit(&OrderRequest::new(form, &cart)).await {
                Ok(redirect) => {
                    tracing::info!(%redirect, "order accepted, redirecting to payment");
                    self.surface.navigate(redirect.as_str());
                    return Ok(SubmitOutcome::Redirected(redirect));
                }
                Err(SubmitError::Rejected(error)) => {
                    tracing::warn!(field = %error.field, message = %error.message, "order refused");
                    error
                }
                Err(error) => {
                    tracing::error!(%error, "order submission failed");
                    FieldError::new(Field::General, ORDER_FAILED)
                }
            };
            self.surface.show_field_error(&error);
            self.surface.scroll_into_view(error.field);
            return Ok(SubmitOutcome::Rejected(error));
        }

        let reference = OrderReference::generate_now();
        self.engine.clear()?;
        self.surface.show_confirmation(&reference);
        self.surface.scroll_to_top();
        tracing::info!(%reference, total = %CheckoutSummary::from_cart(&cart, &self.config).total, "order placed");
        Ok(SubmitOutcome::Placed(reference))
    }

    fn reset_address(&self) {
        self.surface.set_field_value(Field::Address, "");
        self.surface.set_field_value(Field::Neighborhood, "");
        self.pin_area();
    }

    fn pin_area(&self) {
        let area = &self.config.service_area;
        self.surface.set_field_value(Field::City, &area.city);
        self.surface.set_field_value(Field::State, &area.state);
    }
}
