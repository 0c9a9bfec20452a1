use tracing::{error, info, Instrument};

use teashop_pos::app_system::{setup_tracing, OrderSystem, SystemError};
use teashop_pos::config::Config;
use teashop_pos::dashboard::{build_report, DateFilter};
use teashop_pos::domain::{Cart, IceLevel, ProductCreate, SugarLevel, ToppingCatalog};
use teashop_pos::order_actor::{Customer, OrderContext, OrderError, PaymentSelection};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = Config::from_env();
    info!(?config, "Starting tea shop order system");
    let system = OrderSystem::new(config);

    // Seed a small catalog
    let span = tracing::info_span!("catalog_seed");
    let (latte, peach_tea) = async {
        let coffee = system.category_client.create_category("Cà phê").await?;
        let tea = system.category_client.create_category("Trà trái cây").await?;
        let latte = system
            .product_client
            .create_product(ProductCreate::new("Bạc xỉu", 25_000, coffee.id))
            .await?;
        let peach_tea = system
            .product_client
            .create_product(ProductCreate::new("Trà đào cam sả", 35_000, tea.id))
            .await?;
        Ok::<_, SystemError>((latte, peach_tea))
    }
    .instrument(span)
    .await?;

    // Build a cart at the counter
    let toppings = ToppingCatalog::default();
    let mut cart = Cart::new();
    let first = cart.add_product(&latte)?;
    cart.set_quantity(first, 2)?;
    cart.set_sugar_level(first, SugarLevel::LessSugar)?;
    let second = cart.add_product(&peach_tea)?;
    cart.set_upsize(second, true)?;
    cart.set_ice_level(second, IceLevel::LessIce)?;
    if let Some(pearls) = toppings.find(20) {
        cart.add_topping(second, pearls)?;
    }

    let total = cart
        .total(system.config().upsize_surcharge)
        .ok_or(OrderError::AmountOverflow)?;
    let context = OrderContext {
        customer: Customer::table("5"),
        payment: PaymentSelection::split(50_000, total.saturating_sub(50_000)),
    };

    let span = tracing::info_span!("order_processing");
    let order = async { system.order_client.submit_order(&cart, &context).await }
        .instrument(span)
        .await?;
    info!(order_id = %order.id, total_price = order.total_price, "Order submitted");

    // Kitchen picks it up and finishes it
    system.order_client.start_preparing(order.id.clone()).await?;
    let order = system.order_client.complete_order(order.id.clone()).await?;
    for entry in &order.timeline {
        info!(status = %entry.status, actor = %entry.actor, description = %entry.description, "Timeline");
    }

    if let Err(e) = system.order_client.cancel_order(order.id.clone()).await {
        error!(error = %e, "Cancel rejected as expected");
    }

    let orders = system.order_client.list_orders().await?;
    let products = system.product_client.list_products().await?;
    let categories = system.category_client.list_categories().await?;
    let report = build_report(
        &orders,
        &products,
        &categories,
        DateFilter::Last7Days,
        chrono::Utc::now(),
        system.config().utc_offset(),
    );
    info!(
        orders = report.summary.total_orders,
        revenue = report.summary.total_revenue,
        cash = report.summary.cash_revenue,
        transfer = report.summary.transfer_revenue,
        peak_hour = ?report.peak_hour,
        "Dashboard summary"
    );
    match serde_json::to_string(&report.top_products) {
        Ok(json) => info!(top_products = %json, "Best sellers"),
        Err(e) => error!(error = %e, "Could not serialize best sellers"),
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
