//! 样例数据
//!
//! 以固定 ID 覆盖写入，重复执行结果一致（待处理退款的创建时间除外）。

use chrono::{DateTime, TimeZone, Utc};
use recall_shared::document::timestamp;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{Customer, Product, Purchase, Refund, RefundState};
use crate::payment::SimulatedGateway;
use crate::repository::refund_repo::issued_state;
use crate::repository::{
    CustomerRepository, ProductRepository, PurchaseRepository, RefundRepository,
};
use crate::service::dto::SeedSummary;

const SAMPLE_SKU: &str = "LET-123";
const SAMPLE_PAYMENT_INTENT: &str = "pi_mock_12345";
const SAMPLE_AMOUNT: i64 = 499;

pub struct SeedService {
    products: ProductRepository,
    customers: CustomerRepository,
    purchases: PurchaseRepository,
    refunds: RefundRepository,
}

impl SeedService {
    pub fn new(
        products: ProductRepository,
        customers: CustomerRepository,
        purchases: PurchaseRepository,
        refunds: RefundRepository,
    ) -> Self {
        Self {
            products,
            customers,
            purchases,
            refunds,
        }
    }

    #[instrument(skip(self))]
    pub async fn seed_sample_data(&self) -> Result<SeedSummary> {
        let products = sample_products();
        let customers = sample_customers();
        let purchases = sample_purchases();
        let refunds = sample_refunds(timestamp::now());

        for product in &products {
            self.products.put(product).await?;
        }
        for customer in &customers {
            self.customers.put(customer).await?;
        }
        for purchase in &purchases {
            self.purchases.put(purchase).await?;
        }
        for refund in &refunds {
            self.refunds.put(refund).await?;
        }

        let summary = SeedSummary {
            products: products.len(),
            customers: customers.len(),
            purchases: purchases.len(),
            refunds: refunds.len(),
        };
        info!(?summary, "Sample data seeded");
        Ok(summary)
    }
}

fn sample_products() -> Vec<Product> {
    vec![Product {
        id: SAMPLE_SKU.to_string(),
        sku: SAMPLE_SKU.to_string(),
        name: "Bagged Lettuce".to_string(),
        supplier: "Fresh Farms".to_string(),
        price: SAMPLE_AMOUNT,
    }]
}

fn sample_customers() -> Vec<Customer> {
    [
        ("cust_1", "Alice Johnson", "alice@example.com"),
        ("cust_2", "Bob Smith", "bob@example.com"),
        ("cust_3", "Charlie Brown", "charlie@example.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

fn sample_purchases() -> Vec<Purchase> {
    [
        ("purch_1", "cust_1", "BATCH-441", "2023-10-01"),
        ("purch_2", "cust_2", "BATCH-441", "2023-10-05"),
        ("purch_3", "cust_3", "BATCH-999", "2023-11-01"),
    ]
    .into_iter()
    .map(|(id, customer_id, batch, date)| Purchase {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        sku: SAMPLE_SKU.to_string(),
        batch: batch.to_string(),
        date: date.to_string(),
    })
    .collect()
}

/// 两笔历史已发放退款与两笔待处理退款（创建时间由存储填充）
fn sample_refunds(now: DateTime<Utc>) -> Vec<Refund> {
    let issued_created = [
        ("ref_1", "cust_1", Utc.with_ymd_and_hms(2023, 10, 1, 10, 0, 0).single()),
        ("ref_2", "cust_2", Utc.with_ymd_and_hms(2023, 10, 5, 14, 30, 0).single()),
    ];
    let pending = [("ref_3", "cust_3"), ("ref_4", "cust_1")];

    let issued = issued_created.into_iter().map(|(id, customer_id, created_at)| Refund {
        id: id.to_string(),
        purchase_id: format!("purch_{id}"),
        payment_intent_id: Some(SAMPLE_PAYMENT_INTENT.to_string()),
        amount: SAMPLE_AMOUNT,
        customer_id: customer_id.to_string(),
        created_at,
        state: issued_state(now, SimulatedGateway::settlement_ref(id)),
    });
    let pending = pending.into_iter().map(|(id, customer_id)| Refund {
        id: id.to_string(),
        purchase_id: format!("purch_{id}"),
        payment_intent_id: Some(SAMPLE_PAYMENT_INTENT.to_string()),
        amount: SAMPLE_AMOUNT,
        customer_id: customer_id.to_string(),
        created_at: None,
        state: RefundState::Pending,
    });

    issued.chain(pending).collect()
}
