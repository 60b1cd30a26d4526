use anyhow::{bail, Context};
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use loja_admin::{
    brands, create_brand_once, delete_if_listed, order_detail_text, to_text, AdminApi,
    AdminClient, OrderFilter, OrderStatus,
};
use loja_checkout::{
    AddressLookup, CheckoutController, CheckoutSummary, HttpOrderSubmitter, SubmitOutcome,
    ViaCepClient,
};
use loja_cli::commands::{self, FieldKind, TerminalCheckout};
use loja_cli::{logging, StorefrontConfig, DEFAULT_CONFIG_FILE};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount {raw:?}: {e}"))
}

fn value_arg(kinds: &'static [&'static str]) -> [Arg; 2] {
    [
        Arg::new("kind")
            .required(true)
            .value_parser(PossibleValuesParser::new(kinds.iter().copied()))
            .help("Field kind"),
        Arg::new("value")
            .required(true)
            .allow_hyphen_values(true)
            .help("Value as typed"),
    ]
}

fn cli() -> Command {
    Command::new("loja")
        .version(loja_cli::VERSION)
        .about("Storefront cart, checkout and admin from the terminal")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_FILE)
                .help("Configuration file; missing means defaults"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the cart data directory"),
        )
        .subcommand(
            Command::new("cart")
                .about("Inspect and change the cart")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show cart lines and total"))
                .subcommand(
                    Command::new("add")
                        .about("Add one unit of a product")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("price")
                                .required(true)
                                .value_parser(parse_decimal),
                        )
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_parser(value_parser!(i64))
                                .help("Catalogue product id"),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a line")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("qty")
                        .about("Change a line's quantity by a delta")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("delta")
                                .required(true)
                                .allow_hyphen_values(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("install")
                        .about("Add the installation service (or remove it)")
                        .arg(
                            Arg::new("remove")
                                .long("remove")
                                .action(ArgAction::SetTrue)
                                .help("Decline instead"),
                        ),
                )
                .subcommand(Command::new("clear").about("Empty the cart")),
        )
        .subcommand(Command::new("badge").about("Print the cart badge count"))
        .subcommand(
            Command::new("checkout")
                .about("Checkout summary and order placement")
                .subcommand_required(true)
                .subcommand(Command::new("summary").about("Totals with shipping and tax"))
                .subcommand(
                    Command::new("place")
                        .about("Validate a form file and place the order")
                        .arg(
                            Arg::new("form")
                                .required(true)
                                .value_parser(value_parser!(PathBuf))
                                .help("Form values as TOML or JSON"),
                        )
                        .arg(
                            Arg::new("submit")
                                .long("submit")
                                .action(ArgAction::SetTrue)
                                .help("Send to the order endpoint instead of issuing a local reference"),
                        ),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a field value")
                .args(value_arg(&FieldKind::NAMES)),
        )
        .subcommand(
            Command::new("format")
                .about("Format a field value as the form would")
                .args(value_arg(&FieldKind::FORMATTABLE)),
        )
        .subcommand(
            Command::new("cep")
                .about("Look up a postal code and check the service area")
                .arg(Arg::new("code").required(true)),
        )
        .subcommand(
            Command::new("admin")
                .about("Admin console")
                .subcommand_required(true)
                .subcommand(Command::new("products").about("List the catalogue"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete a product")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("orders")
                        .about("List orders")
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(|s: &str| s.parse::<OrderStatus>()),
                        )
                        .arg(Arg::new("payment-status").long("payment-status")),
                )
                .subcommand(
                    Command::new("status")
                        .about("Change an order's status")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                        .arg(
                            Arg::new("status")
                                .required(true)
                                .value_parser(|s: &str| s.parse::<OrderStatus>()),
                        ),
                )
                .subcommand(
                    Command::new("order")
                        .about("Show one order with its items")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(Command::new("brands").about("List product brands"))
                .subcommand(
                    Command::new("brand-add")
                        .about("Register a brand")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<StorefrontConfig> {
    let path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = StorefrontConfig::load(&path)?;
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    Ok(config)
}

fn kind_of(args: &ArgMatches) -> anyhow::Result<(FieldKind, String)> {
    let kind = args
        .get_one::<String>("kind")
        .context("missing field kind")?
        .parse::<FieldKind>()
        .map_err(anyhow::Error::msg)?;
    let value = args.get_one::<String>("value").context("missing value")?;
    Ok((kind, value.clone()))
}

fn run_cart(config: &StorefrontConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    let engine = commands::open_engine(config)?;
    let cart = match matches.subcommand() {
        Some(("show", _)) => engine.cart(),
        Some(("add", args)) => {
            let name = args.get_one::<String>("name").context("missing name")?;
            let price = *args.get_one::<Decimal>("price").context("missing price")?;
            engine.add(name, price, args.get_one::<i64>("id").copied())?
        }
        Some(("remove", args)) => {
            engine.remove(args.get_one::<String>("name").context("missing name")?)?
        }
        Some(("qty", args)) => {
            let name = args.get_one::<String>("name").context("missing name")?;
            let delta = *args.get_one::<i64>("delta").context("missing delta")?;
            engine.set_quantity_delta(name, delta)?
        }
        Some(("install", args)) if args.get_flag("remove") => engine.remove_installation()?,
        Some(("install", _)) => engine.upsert_installation()?,
        Some(("clear", _)) => engine.clear()?,
        _ => bail!("unknown cart command"),
    };
    println!("{}", commands::render_cart(&cart));
    Ok(())
}

async fn run_checkout(config: &StorefrontConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    let engine = commands::open_engine(config)?;
    match matches.subcommand() {
        Some(("summary", _)) => {
            let summary = CheckoutSummary::from_cart(&engine.cart(), &config.checkout);
            println!("{}", commands::render_summary(&summary));
        }
        Some(("place", args)) => {
            let path = args.get_one::<PathBuf>("form").context("missing form")?;
            let form = commands::load_form(path)?;
            let page = Arc::new(TerminalCheckout::new());
            let lookup = Arc::new(ViaCepClient::new(config.checkout.lookup_base_url.clone()));
            let mut controller =
                CheckoutController::new(engine, page.clone(), lookup, config.checkout.clone());
            if args.get_flag("submit") {
                controller = controller.with_submitter(Arc::new(HttpOrderSubmitter::new(
                    config.checkout.order_endpoint.clone(),
                )));
            }

            let outcome = controller.submit(&form).await?;
            for line in page.take_lines() {
                println!("{line}");
            }
            if !matches!(
                outcome,
                SubmitOutcome::Placed(_) | SubmitOutcome::Redirected(_)
            ) {
                std::process::exit(1);
            }
        }
        _ => bail!("unknown checkout command"),
    }
    Ok(())
}

async fn run_admin(config: &StorefrontConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    let api = AdminClient::new(config.admin.clone());
    match matches.subcommand() {
        Some(("products", _)) => {
            for product in api.list_products().await? {
                println!("{}", commands::render_product(&product));
            }
        }
        Some(("delete", args)) => {
            let id = *args.get_one::<i64>("id").context("missing id")?;
            if delete_if_listed(&api, id).await? {
                println!("deleted #{id}");
            } else {
                println!("#{id} not found");
            }
        }
        Some(("orders", args)) => {
            let mut filter = OrderFilter::new();
            if let Some(status) = args.get_one::<OrderStatus>("status") {
                filter = filter.with_status(*status);
            }
            if let Some(payment) = args.get_one::<String>("payment-status") {
                filter = filter.with_payment_status(payment.clone());
            }
            println!("{}", to_text(&api.list_orders(&filter).await?));
        }
        Some(("status", args)) => {
            let id = *args.get_one::<i64>("id").context("missing id")?;
            let status = *args.get_one::<OrderStatus>("status").context("missing status")?;
            api.update_order_status(id, status).await?;
            println!("order #{id} is now {status}");
        }
        Some(("order", args)) => {
            let id = *args.get_one::<i64>("id").context("missing id")?;
            println!("{}", order_detail_text(&api, id).await?);
        }
        Some(("brands", _)) => {
            for brand in brands(&api).await? {
                println!("#{:<4} {}", brand.id, brand.name);
            }
        }
        Some(("brand-add", args)) => {
            let name = args.get_one::<String>("name").context("missing name")?;
            match create_brand_once(&api, name).await? {
                Some(brand) => println!("created brand #{} {}", brand.id, brand.name),
                None => println!("brand {} already registered", name.trim()),
            }
        }
        _ => bail!("unknown admin command"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    logging::init(&config.log_level, config.log_json)?;

    match matches.subcommand() {
        Some(("cart", args)) => run_cart(&config, args)?,
        Some(("badge", _)) => {
            let engine = commands::open_engine(&config)?;
            println!("{}", commands::render_badge(engine.badge()));
        }
        Some(("checkout", args)) => run_checkout(&config, args).await?,
        Some(("check", args)) => {
            let (kind, value) = kind_of(args)?;
            let today = chrono::Local::now().date_naive();
            let valid = commands::check_field(kind, &value, today);
            println!("{kind}: {}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
        }
        Some(("format", args)) => {
            let (kind, value) = kind_of(args)?;
            let formatted = commands::format_field(kind, &value)
                .with_context(|| format!("{kind} has no formatter"))?;
            println!("{formatted}");
        }
        Some(("cep", args)) => {
            let code = args.get_one::<String>("code").context("missing code")?;
            let lookup = ViaCepClient::new(config.checkout.lookup_base_url.clone());
            let address = lookup.lookup(code).await?;
            println!(
                "{}",
                commands::describe_address(&address, &config.checkout.service_area)
            );
        }
        Some(("admin", args)) => run_admin(&config, args).await?,
        Some(("config", _)) => print!("{}", config.to_toml()?),
        _ => {}
    }
    Ok(())
}
