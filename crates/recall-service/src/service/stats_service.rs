//! 退款统计
//!
//! 全量扫描退款后在内存中聚合。缺少 createdAt 的历史记录按当前时间归桶。

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use recall_shared::document::timestamp;
use tracing::{debug, instrument};

use crate::error::{RecallError, Result};
use crate::models::{Refund, RefundStatus};
use crate::repository::RefundRepository;
use crate::service::dto::{DailyVolume, RefundStats, WeekdayVolume};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub struct StatsService {
    refunds: RefundRepository,
    daily_window_days: u32,
}

impl StatsService {
    pub fn new(refunds: RefundRepository, daily_window_days: u32) -> Self {
        Self {
            refunds,
            daily_window_days,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<RefundStats> {
        let refunds = self.refunds.scan_all().await?;
        debug!(count = refunds.len(), "Aggregating refund stats");
        aggregate(&refunds, timestamp::now(), self.daily_window_days)
    }
}

fn cents_to_display(cents: i128) -> f64 {
    cents as f64 / 100.0
}

/// 聚合退款统计
///
/// - `total_refunded`: 已发放退款金额合计（分）
/// - `chart_data`: 所有退款按创建日星期几（周一起）汇总的金额
/// - `daily_data`: 截至 `now` 当天的最近 `window_days` 天按日期汇总，旧日期在前
///
/// 金额以 i128 累加，合计超出 i64 时返回 `Internal`。
pub fn aggregate(
    refunds: &[Refund],
    now: DateTime<Utc>,
    window_days: u32,
) -> Result<RefundStats> {
    let mut total_refunded = 0i128;
    let mut pending_count = 0u64;
    let mut issued_count = 0u64;
    let mut weekday_cents = [0i128; 7];

    let today = now.date_naive();
    let window_start = today - Duration::days(i64::from(window_days.saturating_sub(1)));
    let mut daily: Vec<(NaiveDate, i128, u64)> = (0..window_days)
        .map(|offset| (window_start + Duration::days(i64::from(offset)), 0, 0))
        .collect();

    for refund in refunds {
        let amount = i128::from(refund.amount);
        match refund.status() {
            RefundStatus::Issued => {
                total_refunded += amount;
                issued_count += 1;
            }
            RefundStatus::Pending => pending_count += 1,
        }

        let created_at = refund.created_at.unwrap_or(now);
        weekday_cents[created_at.weekday().num_days_from_monday() as usize] += amount;

        let date = created_at.date_naive();
        if window_days > 0 && date >= window_start && date <= today {
            let slot = &mut daily[(date - window_start).num_days() as usize];
            slot.1 += amount;
            slot.2 += 1;
        }
    }

    let total_refunded = i64::try_from(total_refunded).map_err(|_| {
        RecallError::Internal(format!("已发放退款合计超出可表示范围: {total_refunded}"))
    })?;

    Ok(RefundStats {
        total_refunded,
        pending_count,
        issued_count,
        chart_data: WEEKDAYS
            .iter()
            .zip(weekday_cents)
            .map(|(&name, cents)| WeekdayVolume {
                name,
                refunds: cents_to_display(cents),
            })
            .collect(),
        daily_data: daily
            .into_iter()
            .map(|(date, cents, count)| DailyVolume {
                date: date.format("%Y-%m-%d").to_string(),
                refunds: cents_to_display(cents),
                count,
            })
            .collect(),
    })
}
