//! 发现与补全流程测试，浏览器由脚本化的假宿主代替

mod support;

use std::sync::Arc;

use order_harvest::infrastructure::{BroadcastNotifier, MemoryStore};
use order_harvest::services::RefreshPublisher;
use order_harvest::{
    BackfillFlow, BackfillOutcome, Config, ExtractError, KeyValueStore, OrderId, OrdersRepository,
};
use support::{detail_page, listing_page, FakeHost};

fn setup() -> (Arc<MemoryStore>, RefreshPublisher) {
    let store = Arc::new(MemoryStore::new());
    let publisher = RefreshPublisher::new(store.clone(), Arc::new(BroadcastNotifier::default()));
    (store, publisher)
}

fn id(raw: &str) -> OrderId {
    OrderId::parse(raw).unwrap()
}

#[tokio::test]
async fn discovery_stops_on_first_empty_page() {
    let config = Config::default();
    let host = FakeHost::new("about:blank")
        .with_page(
            config.listing_url(2023, 0),
            listing_page(&["111-0000001-0000001", "111-0000001-0000002"]),
        )
        // 不满一页也继续翻页
        .with_page(config.listing_url(2023, 10), listing_page(&["111-0000001-0000003"]));

    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store.clone()).await.unwrap();
    let report = order_harvest::DiscoveryFlow::new(&config)
        .run(&host, &mut repo, &publisher, 2023)
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.ids_found, 3);
    assert!(!report.reached_limit);
    assert_eq!(
        host.navigations(),
        vec![
            config.listing_url(2023, 0),
            config.listing_url(2023, 10),
            config.listing_url(2023, 20),
        ]
    );

    let reloaded = OrdersRepository::load(store).await.unwrap();
    let stored: Vec<&str> = reloaded.orders_by_year()[&2023]
        .iter()
        .map(OrderId::as_str)
        .collect();
    assert_eq!(
        stored,
        vec!["111-0000001-0000001", "111-0000001-0000002", "111-0000001-0000003"]
    );
}

#[tokio::test]
async fn discovery_stops_at_offset_limit() {
    let config = Config {
        order_index_limit: 30,
        ..Config::default()
    };
    let mut host = FakeHost::new("about:blank");
    for start in [0, 10, 20, 30] {
        host = host.with_page(config.listing_url(2024, start), listing_page(&["222-0000000-0000001"]));
    }

    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store).await.unwrap();
    let report = order_harvest::DiscoveryFlow::new(&config)
        .run(&host, &mut repo, &publisher, 2024)
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 3);
    assert!(report.reached_limit);
    assert_eq!(repo.known_count(), 1);
}

#[tokio::test]
async fn discovery_refuses_zero_page_size() {
    let config = Config {
        orders_per_page: 0,
        ..Config::default()
    };
    let host = FakeHost::new("about:blank")
        .with_page(config.listing_url(2024, 0), listing_page(&["222-0000000-0000001"]));
    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store).await.unwrap();

    let result = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        order_harvest::DiscoveryFlow::new(&config).run(&host, &mut repo, &publisher, 2024),
    )
    .await
    .expect("翻页应立即结束");

    let err = result.unwrap_err();
    assert!(err.to_string().contains("orders_per_page"));
    assert!(host.navigations().is_empty());
    assert_eq!(repo.known_count(), 0);
}

#[tokio::test]
async fn discovery_of_empty_year_creates_no_entry() {
    let config = Config::default();
    let host = FakeHost::new("about:blank");
    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store.clone()).await.unwrap();

    let report = order_harvest::DiscoveryFlow::new(&config)
        .run(&host, &mut repo, &publisher, 2022)
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 1);
    assert!(repo.orders_by_year().is_empty());
    assert!(store.get("ordersByYear").await.unwrap().is_none());
}

#[tokio::test]
async fn backfill_halts_on_first_failure() {
    let config = Config::default();
    let first = id("100-0000000-0000001");
    let second = id("100-0000000-0000002");
    let third = id("100-0000000-0000003");

    let host = FakeHost::new("about:blank")
        .with_page(
            config.detail_url(&first),
            detail_page(first.as_str(), "January 5, 2023", "$42.10", &[("Widget", "$42.10")], &[]),
        )
        .with_page(
            config.detail_url(&second),
            "<html><body><b>Order Placed:</b> January 6, 2023</body></html>",
        )
        .with_page(
            config.detail_url(&third),
            detail_page(third.as_str(), "January 7, 2023", "$1.00", &[("Pin", "$1.00")], &[]),
        );

    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store.clone()).await.unwrap();
    repo.merge(2023, &[first.clone(), second.clone(), third.clone()])
        .await
        .unwrap();

    let outcome = BackfillFlow::new(&config)
        .run(&host, &mut repo, &publisher)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BackfillOutcome::Halted {
            saved: 1,
            order_id: second.clone(),
            reason: ExtractError::NoOrderNumber,
        }
    );
    assert_eq!(host.opened(), vec![config.detail_url(&first), config.detail_url(&second)]);
    // 失败的页面保持打开
    assert_eq!(host.closed().len(), 1);

    let reloaded = OrdersRepository::load(store).await.unwrap();
    assert_eq!(reloaded.order_details().len(), 1);
    assert!(reloaded.detail_for(&first).is_some());
    assert!(reloaded.detail_for(&third).is_none());
    assert_eq!(reloaded.missing_count(), 2);
}

#[tokio::test]
async fn backfill_completes_and_exports() {
    let config = Config::default();
    let older = id("200-0000000-0000001");
    let newer = id("200-0000000-0000002");

    let host = FakeHost::new("about:blank")
        .with_page(
            config.detail_url(&older),
            detail_page(
                older.as_str(),
                "March 3, 2022",
                "$1,234.56",
                &[("Desk", "$1,200.00"), ("Lamp", "$34.56")],
                &[("March 4, 2022", "$1,234.56")],
            ),
        )
        .with_page(
            config.detail_url(&newer),
            detail_page(newer.as_str(), "January 5, 2023", "$9.99", &[("Cable", "$9.99")], &[]),
        );

    let (store, publisher) = setup();
    let mut repo = OrdersRepository::load(store).await.unwrap();
    repo.merge(2023, &[newer.clone()]).await.unwrap();
    repo.merge(2022, &[older.clone()]).await.unwrap();

    let outcome = BackfillFlow::new(&config)
        .run(&host, &mut repo, &publisher)
        .await
        .unwrap();
    assert_eq!(outcome, BackfillOutcome::Completed { saved: 2 });
    assert_eq!(host.closed().len(), 2);

    // 按年份顺序补全，导出保持写入顺序
    let saved: Vec<&str> = repo.order_details().keys().map(OrderId::as_str).collect();
    assert_eq!(saved, vec![older.as_str(), newer.as_str()]);

    let tsv = repo.export(&config);
    let lines: Vec<&str> = tsv.lines().collect();
    // 表头 + 旧订单两件商品各配一笔扣款 + 新订单一件商品
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("1\t2022-03-03\t1234.56\t200-0000000-0000001\t"));
    assert!(lines[2].contains("\tLamp\t34.56\tCC Charge\t2022-03-04\t1234.56"));
    assert!(lines[3].starts_with("2\t2023-01-05\t9.99\t200-0000000-0000002\t"));
    assert!(lines[3].ends_with("\tOther\t\t"));

    // 没有缺失详情时再跑一次不做任何事
    let again = BackfillFlow::new(&config)
        .run(&host, &mut repo, &publisher)
        .await
        .unwrap();
    assert_eq!(again.saved(), 0);
    assert_eq!(host.opened().len(), 2);
}
