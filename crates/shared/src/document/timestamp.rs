//! 时间戳编解码
//!
//! 文档中的时间统一存储为固定微秒精度的 RFC 3339 UTC 字符串
//! （如 `2024-05-01T10:00:00.000000Z`），字典序与时间先后一致，
//! 存储后端可直接按字符串排序。

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// 当前时间，截断到微秒
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 格式化为存储格式
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 解析任意 RFC 3339 时间为 UTC
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
}

/// 转为文档字段值
pub fn to_value(ts: &DateTime<Utc>) -> Value {
    Value::String(format(ts))
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// `Option<DateTime<Utc>>` 字段的编解码
pub mod option {
    use super::*;

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_some(&format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
