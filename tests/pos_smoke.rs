mod common;

use common::{init_tracing, temp_config};

use od_query::{most_frequent, sales_trend};
use od_store::{PaymentMethod, Sale, Table, TableStore};

#[test]
fn test_sale_append_feeds_customer_insights() {
    init_tracing();
    let config = temp_config("pos_smoke");
    let store = TableStore::open(&config.global.data_dir)
        .unwrap()
        .with_locking(config.store.locking);

    let sale = store
        .append(Sale::new(
            "Lotion X",
            5,
            50.0,
            "2024-01-01",
            "Jane",
            PaymentMethod::Cash,
        ))
        .unwrap();
    assert_eq!(sale.sale_id, "S001");

    // A fresh handle sees the persisted row.
    let reopened = TableStore::open(&config.global.data_dir).unwrap();
    let sales: Table<Sale> = reopened.load().unwrap();
    assert_eq!(sales.len(), 1);

    let top = most_frequent(sales.iter().map(|s| s.customer_name.as_str()));
    assert_eq!(top, Some(("Jane".to_string(), 1)));

    let trend = sales_trend(&sales).unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].1, 50.0);
}

#[test]
fn test_tables_survive_reopen_round_trip() {
    init_tracing();
    let config = temp_config("round_trip");
    let store = TableStore::open(&config.global.data_dir).unwrap();

    for (customer, price) in [("Jane", 10.0), ("Kofi", 20.0), ("Jane", 30.0)] {
        store
            .append(Sale::new(
                "Soap",
                1,
                price,
                "2024-02-01",
                customer,
                PaymentMethod::Card,
            ))
            .unwrap();
    }

    let loaded: Table<Sale> = store.load().unwrap();
    store.save(&loaded).unwrap();

    let reloaded: Table<Sale> = TableStore::open(&config.global.data_dir)
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(loaded, reloaded);
    assert_eq!(reloaded.rows()[2].sale_id, "S003");
}
