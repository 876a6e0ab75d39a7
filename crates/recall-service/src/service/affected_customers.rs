//! 受影响客户查询
//!
//! 按 SKU + 批次查出购买记录，再按客户 ID 集合一次性批量读取客户，
//! 避免逐条查询。客户记录缺失的购买不进入结果，单独列出其购买 ID。

use std::collections::BTreeSet;

use tracing::{instrument, warn};

use crate::error::{RecallError, Result};
use crate::repository::{CustomerRepository, PurchaseRepository};
use crate::service::dto::{AffectedCustomer, AffectedCustomers};

pub struct AffectedCustomerService {
    purchases: PurchaseRepository,
    customers: CustomerRepository,
}

impl AffectedCustomerService {
    pub fn new(purchases: PurchaseRepository, customers: CustomerRepository) -> Self {
        Self {
            purchases,
            customers,
        }
    }

    #[instrument(skip(self))]
    pub async fn find_affected_customers(&self, sku: &str, batch: &str) -> Result<AffectedCustomers> {
        if sku.trim().is_empty() || batch.trim().is_empty() {
            return Err(RecallError::Validation("缺少 sku 或 batch".to_string()));
        }

        let purchases = self.purchases.find_by_sku_batch(sku, batch).await?;
        if purchases.is_empty() {
            return Ok(AffectedCustomers::default());
        }

        let customer_ids: Vec<String> = purchases
            .iter()
            .map(|p| p.customer_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let customers = self.customers.get_many(&customer_ids).await?;

        let mut result = AffectedCustomers::default();
        for purchase in purchases {
            match customers.get(&purchase.customer_id) {
                Some(customer) => result.customers.push(AffectedCustomer {
                    purchase_id: purchase.id,
                    customer_id: purchase.customer_id,
                    sku: purchase.sku,
                    batch: purchase.batch,
                    date: purchase.date,
                    customer_name: customer.name.clone(),
                    customer_email: customer.email.clone(),
                }),
                None => {
                    warn!(
                        purchase_id = %purchase.id,
                        customer_id = %purchase.customer_id,
                        "Purchase references a missing customer"
                    );
                    result.unresolved_purchase_ids.push(purchase.id);
                }
            }
        }

        Ok(result)
    }
}
