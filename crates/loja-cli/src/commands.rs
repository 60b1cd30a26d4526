//! Command implementations
//!
//! Everything here returns text instead of printing so the binary stays a
//! thin dispatcher and the output can be tested.

use crate::config::StorefrontConfig;
use anyhow::Context;
use chrono::NaiveDate;
use loja_admin::Product;
use loja_cart::{format_brl, item_label, BadgeState, Cart, CartEngine, FileBackend, JsonCartStore};
use loja_checkout::format::{format_card_number, format_cep, format_cpf_cnpj, format_expiry};
use loja_checkout::validate::{
    is_valid_card_number, is_valid_cep, is_valid_cpf_cnpj, is_valid_cvv, is_valid_email,
    is_valid_expiry, is_valid_phone,
};
use loja_checkout::{
    AddressInfo, CheckoutForm, CheckoutSummary, CheckoutSurface, Field, FieldError,
    OrderReference, ServiceArea,
};
use loja_ui::EmptyState;
use parking_lot::Mutex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Cart engine over the file-backed store
pub type FileEngine = CartEngine<JsonCartStore<FileBackend>>;

/// Open the cart kept in the configured data directory
///
/// # Errors
/// - the data directory cannot be created
pub fn open_engine(config: &StorefrontConfig) -> anyhow::Result<Arc<FileEngine>> {
    let backend = FileBackend::open(&config.data_dir)
        .with_context(|| format!("opening cart storage in {}", config.data_dir.display()))?;
    let store = JsonCartStore::new(backend, config.cart.storage_key.clone());
    Ok(Arc::new(CartEngine::new(store, config.cart.clone())))
}

/// Cart as shown in the cart modal: product lines and the checkout total
#[must_use]
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_display_empty() {
        let empty = EmptyState::default();
        return format!("{}\n{}", empty.title, empty.hint);
    }

    let mut out = String::new();
    for item in cart.display_items() {
        out.push_str(&format!(
            "{:>3} x {}  {} = {}\n",
            item.quantity,
            item.name,
            format_brl(item.price),
            format_brl(item.line_total()),
        ));
    }
    if cart.has_installation() {
        out.push_str("  + installation\n");
    }
    out.push_str(&format!(
        "{}  total {}",
        item_label(cart.badge_count()),
        format_brl(cart.checkout_subtotal())
    ));
    out
}

/// Badge text; empty when hidden
#[must_use]
pub fn render_badge(badge: BadgeState) -> String {
    match badge {
        BadgeState::Hidden => String::new(),
        BadgeState::Visible(count) => count.to_string(),
    }
}

/// Checkout summary with shipping and tax
#[must_use]
pub fn render_summary(summary: &CheckoutSummary) -> String {
    let mut out = String::new();
    for row in &summary.rows {
        match row.quantity {
            Some(quantity) => out.push_str(&format!(
                "{} x{quantity}  {}\n",
                row.name,
                format_brl(row.amount)
            )),
            None => out.push_str(&format!("{}  {}\n", row.name, format_brl(row.amount))),
        }
    }
    let [subtotal, shipping, tax, total] = summary.formatted_totals();
    out.push_str(&format!(
        "subtotal {subtotal}\nshipping {shipping}\ntax      {tax}\ntotal    {total}"
    ));
    out
}

/// Field kinds the `check` and `format` commands accept
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Card,
    Expiry,
    Cvv,
    Cpf,
    Email,
    Phone,
    Cep,
}

impl FieldKind {
    /// Names accepted on the command line
    pub const NAMES: [&'static str; 7] = ["card", "expiry", "cvv", "cpf", "email", "phone", "cep"];

    /// Kinds with an input formatter
    pub const FORMATTABLE: [&'static str; 4] = ["card", "expiry", "cpf", "cep"];
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "expiry" => Ok(Self::Expiry),
            "cvv" => Ok(Self::Cvv),
            "cpf" => Ok(Self::Cpf),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "cep" => Ok(Self::Cep),
            other => Err(format!("unknown field kind: {other}")),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Card => "card",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::Cpf => "cpf",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Cep => "cep",
        };
        f.write_str(name)
    }
}

/// Whether `value` passes the checkout validator for `kind`
#[must_use]
pub fn check_field(kind: FieldKind, value: &str, today: NaiveDate) -> bool {
    match kind {
        FieldKind::Card => is_valid_card_number(value),
        FieldKind::Expiry => is_valid_expiry(value, today),
        FieldKind::Cvv => is_valid_cvv(value),
        FieldKind::Cpf => is_valid_cpf_cnpj(value),
        FieldKind::Email => is_valid_email(value),
        FieldKind::Phone => is_valid_phone(value),
        FieldKind::Cep => is_valid_cep(value),
    }
}

/// `value` as the checkout form would display it; `None` if `kind` has no formatter
#[must_use]
pub fn format_field(kind: FieldKind, value: &str) -> Option<String> {
    match kind {
        FieldKind::Card => Some(format_card_number(value)),
        FieldKind::Expiry => Some(format_expiry(value)),
        FieldKind::Cpf => Some(format_cpf_cnpj(value)),
        FieldKind::Cep => Some(format_cep(value)),
        FieldKind::Cvv | FieldKind::Email | FieldKind::Phone => None,
    }
}

/// Resolved address and whether it is inside `area`
#[must_use]
pub fn describe_address(address: &AddressInfo, area: &ServiceArea) -> String {
    let serviceable = if area.contains(&address.city, &address.state) {
        "serviceable".to_string()
    } else {
        area.rejection_message()
    };
    format!(
        "{}, {}\n{} - {}\n{serviceable}",
        address.street, address.neighborhood, address.city, address.state
    )
}

/// One catalogue line
#[must_use]
pub fn render_product(product: &Product) -> String {
    format!(
        "#{:<4} {}  {}  [{}]{}",
        product.id,
        product.name,
        format_brl(product.price),
        product.category_label(),
        if product.is_available { "" } else { " (hidden)" }
    )
}

/// Read a checkout form from a JSON (`.json`) or TOML file
///
/// # Errors
/// - the file cannot be read or parsed
pub fn load_form(path: &Path) -> anyhow::Result<CheckoutForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let form = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&raw)?
    } else {
        toml::from_str(&raw)?
    };
    Ok(form)
}

/// Checkout page rendered as terminal lines
#[derive(Debug, Default)]
pub struct TerminalCheckout {
    lines: Mutex<Vec<String>>,
}

impl TerminalCheckout {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lines written so far
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    fn push(&self, line: String) {
        self.lines.lock().push(line);
    }
}

impl CheckoutSurface for TerminalCheckout {
    fn show_field_error(&self, error: &FieldError) {
        self.push(format!("{}: {}", error.field, error.message));
    }

    fn clear_field_errors(&self) {
        self.lines.lock().clear();
    }

    fn scroll_into_view(&self, _field: Field) {}

    fn set_field_value(&self, field: Field, value: &str) {
        tracing::debug!(%field, value, "field updated");
    }

    fn render_summary(&self, summary: &CheckoutSummary) {
        self.push(render_summary(summary));
    }

    fn show_confirmation(&self, reference: &OrderReference) {
        self.push(format!("Order placed: {reference}"));
    }

    fn scroll_to_top(&self) {}

    fn navigate(&self, location: &str) {
        self.push(format!("Continue payment at {location}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loja_checkout::CheckoutConfig;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add("Filter A", Decimal::new(4990, 2), Some(1));
        cart.add("Filter A", Decimal::new(4990, 2), Some(1));
        cart
    }

    #[test]
    fn renders_empty_cart() {
        assert_eq!(
            render_cart(&Cart::new()),
            "Your cart is empty\nAdd some products to get started!"
        );
    }

    #[test]
    fn renders_cart_lines_and_total() {
        let mut cart = cart();
        cart.upsert_installation(Decimal::new(12000, 2));
        assert_eq!(
            render_cart(&cart),
            "  2 x Filter A  R$ 49.90 = R$ 99.80\n  + installation\n2 items  total R$ 219.80"
        );
    }

    #[test]
    fn renders_summary_totals() {
        let summary = CheckoutSummary::from_cart(&cart(), &CheckoutConfig::default());
        let text = render_summary(&summary);
        assert!(text.starts_with("Filter A x2  R$ 99.80\n"));
        assert!(text.ends_with("total    R$ 117.78"));
    }

    #[test]
    fn badge_text() {
        assert_eq!(render_badge(BadgeState::Hidden), "");
        assert_eq!(render_badge(BadgeState::Visible(3)), "3");
    }

    #[test]
    fn field_kinds() {
        for name in FieldKind::NAMES {
            let kind: FieldKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }
        for name in FieldKind::FORMATTABLE {
            let kind: FieldKind = name.parse().unwrap();
            assert!(format_field(kind, "1").is_some());
        }
        assert_eq!(format_field(FieldKind::Email, "a@b.co"), None);
        assert_eq!(
            format_field(FieldKind::Cpf, "12345678901").as_deref(),
            Some("123.456.789-01")
        );

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(check_field(FieldKind::Card, "4111 1111 1111 1111", today));
        assert!(!check_field(FieldKind::Expiry, "01/20", today));
    }

    #[test]
    fn describes_out_of_area_address() {
        let address = AddressInfo {
            street: "Rua X".into(),
            neighborhood: "Centro".into(),
            city: "Cuiabá".into(),
            state: "MT".into(),
        };
        assert!(describe_address(&address, &ServiceArea::default())
            .ends_with("Atendemos apenas clientes em Campo Grande, MS"));
    }

    #[test]
    fn terminal_transcript() {
        let page = TerminalCheckout::new();
        page.show_field_error(&FieldError::new(Field::Email, "Email é obrigatório"));
        page.clear_field_errors();
        page.show_confirmation(&OrderReference::new("ORD-1"));
        assert_eq!(page.take_lines(), vec!["Order placed: ORD-1".to_string()]);
        assert!(page.take_lines().is_empty());
    }

    #[test]
    fn form_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.toml");
        std::fs::write(
            &path,
            "email = \"ana@loja.com.br\"\npayment_method = \"pix\"\npix_key = \"ana@loja.com.br\"\n",
        )
        .unwrap();
        let form = load_form(&path).unwrap();
        assert_eq!(form.email, "ana@loja.com.br");
        assert_eq!(form.payment_method, loja_checkout::PaymentMethod::Pix);
    }
}
