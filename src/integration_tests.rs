#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use crate::actor_framework::ChangeKind;
    use crate::app_system::OrderSystem;
    use crate::clients::OrderClient;
    use crate::clock::{test_clock, Clock};
    use crate::config::Config;
    use crate::dashboard::{build_report, filter_orders, DateFilter, OrderFilter};
    use crate::domain::{Cart, Order, OrderStatus, PaymentMethod, ProductCreate, Role, ToppingCatalog};
    use crate::live_view::{Applied, LiveCollection};
    use crate::mock_framework::{create_mock_client, expect_create, expect_get, expect_update};
    use crate::order_actor::{
        Customer, LifecyclePolicy, OrderContext, OrderError, OrderLifecycle, PaymentSelection,
    };

    fn mock_order_client() -> (OrderClient, tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Order>>) {
        let (inner, rx) = create_mock_client::<Order>(10);
        let lifecycle = OrderLifecycle::new(LifecyclePolicy::default(), Arc::new(test_clock()));
        (OrderClient::new(inner, lifecycle), rx)
    }

    fn latte_cart() -> Cart {
        let product = crate::domain::Product {
            id: "p1".to_string(),
            name: "Bạc xỉu".to_string(),
            price: 25_000,
            image: "☕".to_string(),
            category_id: "c1".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        let mut cart = Cart::new();
        let line = cart.add_product(&product).unwrap();
        cart.set_quantity(line, 2).unwrap();
        cart
    }

    #[tokio::test]
    async fn submit_sends_built_payload_to_store() {
        let (client, mut rx) = mock_order_client();
        let cart = latte_cart();

        let task = tokio::spawn(async move {
            let context = OrderContext {
                customer: Customer::WalkIn,
                payment: PaymentSelection::full(PaymentMethod::Cash),
            };
            client.submit_order(&cart, &context).await
        });

        let (payload, responder) = expect_create(&mut rx).await.expect("Expected Order Create");
        assert_eq!(payload.table_label, "Vãng lai");
        assert_eq!(payload.total_price, 50_000);
        assert_eq!(payload.source_payment.cash, Some(50_000));
        assert_eq!(payload.timeline.len(), 1);

        let order = Order {
            id: "o1".to_string(),
            table_label: payload.table_label,
            items: payload.items,
            total_price: payload.total_price,
            source_payment: payload.source_payment,
            is_cancelled: payload.is_cancelled,
            status: payload.status,
            timeline: payload.timeline,
            created_at: test_clock().now(),
        };
        responder.send(Ok(order.clone())).unwrap();

        assert_eq!(task.await.unwrap(), Ok(order));
    }

    #[tokio::test]
    async fn rejected_cart_never_reaches_store() {
        let (client, mut rx) = mock_order_client();
        let cart = latte_cart();
        let context = OrderContext {
            customer: Customer::table("  "),
            payment: PaymentSelection::cash(50_000),
        };

        let result = client.submit_order(&cart, &context).await;
        assert_eq!(result, Err(OrderError::MissingTableLabel));
        assert!(rx.try_recv().is_err());
        // Still usable for a corrected retry.
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn transition_reads_then_writes_patch() {
        let (client, mut rx) = mock_order_client();
        let lifecycle = client.lifecycle().clone();
        let payload = lifecycle
            .build_order(
                &latte_cart(),
                &OrderContext {
                    customer: Customer::table("4"),
                    payment: PaymentSelection::transfer(50_000),
                },
            )
            .unwrap();
        let stored = Order {
            id: "o1".to_string(),
            table_label: payload.table_label,
            items: payload.items,
            total_price: payload.total_price,
            source_payment: payload.source_payment,
            is_cancelled: false,
            status: payload.status,
            timeline: payload.timeline,
            created_at: test_clock().now(),
        };

        let task = tokio::spawn(async move { client.start_preparing("o1".to_string()).await });

        let (id, responder) = expect_get(&mut rx).await.expect("Expected Order Get");
        assert_eq!(id, "o1");
        responder.send(Ok(Some(stored.clone()))).unwrap();

        let (id, patch, responder) = expect_update(&mut rx).await.expect("Expected Order Update");
        assert_eq!(id, "o1");
        assert_eq!(patch.status, OrderStatus::Preparing);
        assert_eq!(patch.timeline.len(), 2);
        assert_eq!(patch.timeline[1].actor, Role::Kitchen);

        let mut updated = stored;
        updated.status = patch.status;
        updated.timeline = patch.timeline;
        responder.send(Ok(updated.clone())).unwrap();

        assert_eq!(task.await.unwrap(), Ok(updated));
    }

    #[tokio::test]
    async fn transition_of_missing_order_is_not_found() {
        let (client, mut rx) = mock_order_client();
        let task = tokio::spawn(async move { client.cancel_order("ghost".to_string()).await });

        let (_, responder) = expect_get(&mut rx).await.expect("Expected Order Get");
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::NotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn full_order_flow_through_real_actors() {
        let clock = Arc::new(test_clock());
        let system = OrderSystem::with_clock(Config::default(), clock.clone());

        let tea = system.category_client.create_category(" Trà sữa ").await.unwrap();
        assert_eq!(tea.name, "Trà sữa");
        let milk_tea = system
            .product_client
            .create_product(ProductCreate::new("Trà sữa trân châu", 30_000, tea.id.clone()))
            .await
            .unwrap();

        let mut feed = system.order_client.subscribe().await.unwrap();
        let mut live_orders: LiveCollection<Order> = LiveCollection::new();

        // Scenario: one upsized drink with pearls paid by transfer.
        let mut cart = Cart::new();
        let line = cart.add_product(&milk_tea).unwrap();
        cart.set_upsize(line, true).unwrap();
        let pearls = ToppingCatalog::default().find(19).cloned().unwrap();
        cart.add_topping(line, &pearls).unwrap();
        let context = OrderContext {
            customer: Customer::table("7"),
            payment: PaymentSelection::full(PaymentMethod::Transfer),
        };

        let order = system.order_client.submit_order(&cart, &context).await.unwrap();
        assert_eq!(order.total_price, 45_000);
        assert_eq!(order.created_at, clock.now());

        let event = feed.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(live_orders.apply(event), Applied::Inserted);

        system.order_client.start_preparing(order.id.clone()).await.unwrap();
        let done = system.order_client.complete_order(order.id.clone()).await.unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert_eq!(done.timeline.len(), 3);

        let err = system.order_client.cancel_order(order.id.clone()).await.unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidStatusTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled,
            }
        );

        // Both updates are queued; draining converges on the latest revision.
        assert!(live_orders.drain(&mut feed).is_empty());
        assert_eq!(live_orders.get(&order.id).unwrap().status, OrderStatus::Completed);

        system.order_client.unsubscribe(feed.id()).await.unwrap();
        system.order_client.unsubscribe(feed.id()).await.unwrap();

        let orders = system.order_client.list_orders().await.unwrap();
        let completed = filter_orders(&orders, OrderFilter::Completed, clock.now(), system.config().utc_offset());
        assert_eq!(completed.len(), 1);

        let products = system.product_client.list_products().await.unwrap();
        let categories = system.category_client.list_categories().await.unwrap();
        let report = build_report(
            &orders,
            &products,
            &categories,
            DateFilter::All,
            clock.now(),
            system.config().utc_offset(),
        );
        assert_eq!(report.summary.total_revenue, 45_000);
        assert_eq!(report.summary.transfer_revenue, 45_000);
        assert_eq!(report.best_category.unwrap().category_name, "Trà sữa");

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn orders_with_equal_timestamps_list_newest_insert_first() {
        let system = OrderSystem::with_clock(Config::default(), Arc::new(test_clock()));
        let context = OrderContext {
            customer: Customer::WalkIn,
            payment: PaymentSelection::full(PaymentMethod::Cash),
        };
        let first = system.order_client.submit_order(&latte_cart(), &context).await.unwrap();
        let second = system.order_client.submit_order(&latte_cart(), &context).await.unwrap();
        assert_eq!(first.created_at, second.created_at);

        let ids: Vec<String> = system
            .order_client
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|order| order.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn inactive_product_and_image_replacement() {
        let system = OrderSystem::with_clock(Config::default(), Arc::new(test_clock()));
        let product = system
            .product_client
            .create_product(ProductCreate::new("Cà phê muối", 29_000, "c1"))
            .await
            .unwrap();
        assert_eq!(product.image, "☕");

        let updated = system
            .product_client
            .replace_image(product.id.clone(), "salt.png".to_string(), vec![0x89, 0x50])
            .await
            .unwrap();
        assert!(updated
            .image
            .starts_with("http://localhost:54321/storage/v1/object/public/product-images/products/product_"));
        assert!(updated.image.ends_with(".png"));

        let hidden = system.product_client.set_active(product.id.clone(), false).await.unwrap();
        let mut cart = Cart::new();
        assert!(cart.add_product(&hidden).is_err());

        system.shutdown().await.unwrap();
    }
}
