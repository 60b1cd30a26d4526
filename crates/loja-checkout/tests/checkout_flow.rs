use async_trait::async_trait;
use chrono::NaiveDate;
use loja_cart::{JsonCartStore, MemoryBackend, INSTALLATION_SERVICE};
use loja_checkout::{
    AddressInfo, AddressLookup, CheckoutConfig, CheckoutController, CheckoutForm,
    CheckoutSummary, CheckoutSurface, Field, FieldError, LookupError, OrderReference,
    PaymentMethod, PostalCodeOutcome, SubmitOutcome,
};
use loja_test_utils::{brl, engine_with, InstantDialog, MemoryEngine, RecordingPage, StaticContent};
use loja_ui::{InstallationUpsell, UpsellAction, View};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

type Store = JsonCartStore<MemoryBackend>;

/// Lookup double answering from a fixed table
struct TableLookup(HashMap<&'static str, AddressInfo>);

impl TableLookup {
    fn campo_grande() -> Self {
        let mut table = HashMap::new();
        table.insert(
            "79002170",
            AddressInfo {
                street: "Rua 14 de Julho".into(),
                neighborhood: "Centro".into(),
                city: "Campo Grande".into(),
                state: "MS".into(),
            },
        );
        Self(table)
    }
}

#[async_trait]
impl AddressLookup for TableLookup {
    async fn lookup(&self, cep: &str) -> Result<AddressInfo, LookupError> {
        self.0
            .get(cep)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(cep.to_string()))
    }
}

#[derive(Default)]
struct CheckoutPage {
    values: Mutex<HashMap<Field, String>>,
    errors: Mutex<Vec<FieldError>>,
    summaries: Mutex<Vec<CheckoutSummary>>,
    confirmations: Mutex<Vec<OrderReference>>,
    scrolled_to_top: Mutex<usize>,
    navigations: Mutex<Vec<String>>,
}

impl CheckoutPage {
    fn value(&self, field: Field) -> String {
        self.values.lock().get(&field).cloned().unwrap_or_default()
    }

    fn last_summary(&self) -> CheckoutSummary {
        self.summaries.lock().last().cloned().expect("summary rendered")
    }
}

impl CheckoutSurface for CheckoutPage {
    fn show_field_error(&self, error: &FieldError) {
        self.errors.lock().push(error.clone());
    }

    fn clear_field_errors(&self) {
        self.errors.lock().clear();
    }

    fn scroll_into_view(&self, _field: Field) {}

    fn set_field_value(&self, field: Field, value: &str) {
        self.values.lock().insert(field, value.to_string());
    }

    fn render_summary(&self, summary: &CheckoutSummary) {
        self.summaries.lock().push(summary.clone());
    }

    fn show_confirmation(&self, reference: &OrderReference) {
        self.confirmations.lock().push(reference.clone());
    }

    fn scroll_to_top(&self) {
        *self.scrolled_to_top.lock() += 1;
    }

    fn navigate(&self, location: &str) {
        self.navigations.lock().push(location.to_string());
    }
}

struct Fixture {
    controller: CheckoutController<Store>,
    page: Arc<CheckoutPage>,
    engine: Arc<MemoryEngine>,
}

fn fixture(content: StaticContent) -> Fixture {
    let engine = engine_with(&[("Purificador Alfa", 59990)]);
    let page = Arc::new(CheckoutPage::default());
    let upsell = Arc::new(InstallationUpsell::new(
        engine.clone(),
        Arc::new(content),
        Arc::new(RecordingPage::new()),
        Arc::new(InstantDialog::default()),
    ));
    let controller = CheckoutController::new(
        engine.clone(),
        page.clone(),
        Arc::new(TableLookup::campo_grande()),
        CheckoutConfig::default(),
    )
    .with_upsell(upsell);
    Fixture {
        controller,
        page,
        engine,
    }
}

fn card_form(page: &CheckoutPage, controller: &CheckoutController<Store>) -> CheckoutForm {
    CheckoutForm {
        email: "joao@loja.com.br".into(),
        phone: "(67) 99999-0000".into(),
        first_name: "João".into(),
        last_name: "Lima".into(),
        address: page.value(Field::Address),
        neighborhood: page.value(Field::Neighborhood),
        city: page.value(Field::City),
        state: page.value(Field::State),
        zip_code: page.value(Field::ZipCode),
        payment_method: PaymentMethod::CreditCard,
        card_name: "JOAO LIMA".into(),
        card_number: controller.on_input(Field::CardNumber, "4111111111111111"),
        expiry: controller.on_input(Field::Expiry, "1230"),
        cvv: controller.on_input(Field::Cvv, "123"),
        ..CheckoutForm::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[tokio::test]
async fn test_serviceable_code_prefills_and_offers_installation() {
    let f = fixture(StaticContent::new());

    let outcome = f.controller.on_postal_code_input("79002170").await.unwrap();
    let PostalCodeOutcome::Serviceable { address, upsell } = outcome else {
        panic!("expected serviceable address");
    };
    assert_eq!(address.street, "Rua 14 de Julho");
    assert_eq!(f.page.value(Field::Address), "Rua 14 de Julho");
    assert_eq!(f.page.value(Field::ZipCode), "79002-170");

    let session = upsell.expect("upsell opened");
    let decided = session.choose(UpsellAction::Add).await.unwrap().unwrap();
    assert!(decided.accepted);

    let summary = f.page.last_summary();
    assert_eq!(summary.subtotal, brl(71990));
    assert!(summary
        .rows
        .iter()
        .any(|row| row.name == INSTALLATION_SERVICE && row.quantity.is_none()));
}

#[tokio::test]
async fn test_missing_upsell_markup_still_prefills() {
    let f = fixture(StaticContent::failing(&[View::InstallationModal]));

    let outcome = f.controller.on_postal_code_input("79002-170").await.unwrap();
    assert!(matches!(
        outcome,
        PostalCodeOutcome::Serviceable { upsell: None, .. }
    ));
    assert_eq!(f.page.value(Field::Neighborhood), "Centro");
    assert!(!f.engine.has_installation());
}

#[tokio::test]
async fn test_card_order_after_declined_installation() {
    let f = fixture(StaticContent::new());

    if let PostalCodeOutcome::Serviceable {
        upsell: Some(session),
        ..
    } = f.controller.on_postal_code_input("79002170").await.unwrap()
    {
        session.choose(UpsellAction::Skip).await.unwrap();
    }
    assert!(!f.engine.has_installation());

    let form = card_form(&f.page, &f.controller);
    assert_eq!(form.card_number, "4111 1111 1111 1111");
    assert_eq!(form.expiry, "12/30");

    let outcome = f.controller.submit_on(&form, today()).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Placed(_)), "{outcome:?}");
    assert!(f.engine.cart().is_empty());
    assert_eq!(f.page.confirmations.lock().len(), 1);
    assert_eq!(*f.page.scrolled_to_top.lock(), 1);
    assert!(f.page.navigations.lock().is_empty());

    assert!(!f.controller.render_summary().can_place_order());
}

#[tokio::test]
async fn test_unknown_code_then_invalid_submit() {
    let f = fixture(StaticContent::new());

    let outcome = f.controller.on_postal_code_input("00000000").await.unwrap();
    assert!(matches!(outcome, PostalCodeOutcome::LookupFailed));
    assert_eq!(f.page.value(Field::City), "Campo Grande");

    let form = card_form(&f.page, &f.controller);
    let outcome = f.controller.submit_on(&form, today()).await.unwrap();
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation errors");
    };
    let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![Field::Address, Field::Neighborhood]);
    assert_eq!(*f.page.errors.lock(), errors);
    assert_eq!(f.engine.badge_count(), 1);
}

#[tokio::test]
async fn test_retyped_code_is_not_offered_again() {
    let f = fixture(StaticContent::new());

    let PostalCodeOutcome::Serviceable {
        upsell: Some(session),
        ..
    } = f.controller.on_postal_code_input("79002170").await.unwrap()
    else {
        panic!("expected the installation offer");
    };
    session.choose(UpsellAction::Skip).await.unwrap().unwrap();

    let outcome = f.controller.on_postal_code_input("79002-17").await.unwrap();
    assert!(matches!(outcome, PostalCodeOutcome::Incomplete));
    let outcome = f.controller.on_postal_code_input("79002-170").await.unwrap();
    assert!(matches!(outcome, PostalCodeOutcome::Unchanged), "{outcome:?}");
    assert!(!f.engine.has_installation());
}
