use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Number, Value};
use sqlx::{Column, ColumnIndex, Decode, Row, TypeInfo, ValueRef};
use tracing::debug;
use watcher_core::parser::parse_nested;
use watcher_core::{ExpiredDataRecord, WatcherDefinition, WatcherError, WatcherResult};

use crate::datasource::{Datasource, DbPool};

/// 执行监控配置的查询语句获取呆滞数据
#[derive(Clone)]
pub struct SqlFetcher {
    timeout: Duration,
}

impl SqlFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn fetch_records(
        &self,
        datasource: &Datasource,
        watcher: &Arc<WatcherDefinition>,
    ) -> WatcherResult<Vec<ExpiredDataRecord>> {
        if watcher.get_expired.trim().is_empty() {
            return Err(WatcherError::Configuration(format!(
                "监控 {} 未配置查询语句",
                watcher.app
            )));
        }

        let pool = datasource.connect().await?;
        let rows = tokio::time::timeout(self.timeout, query_rows(&pool, &watcher.get_expired))
            .await
            .map_err(|_| WatcherError::Timeout(format!("查询数据源 {}", datasource.code())))??;

        debug!(
            "数据源 {} 返回 {} 行: app={}",
            datasource.code(),
            rows.len(),
            watcher.app
        );

        Ok(rows
            .iter()
            .map(|row| {
                let nested = parse_nested(row);
                ExpiredDataRecord::from_nested(datasource.code(), watcher.clone(), &nested)
            })
            .collect())
    }
}

/// 以文本协议执行查询，每行转为平铺键值对
async fn query_rows(pool: &DbPool, sql: &str) -> Result<Vec<Map<String, Value>>, sqlx::Error> {
    let rows: Vec<Map<String, Value>> = match pool {
        DbPool::MySql(pool) => sqlx::raw_sql(sql)
            .fetch_all(pool)
            .await?
            .iter()
            .map(row_to_map)
            .collect(),
        DbPool::Postgres(pool) => sqlx::raw_sql(sql)
            .fetch_all(pool)
            .await?
            .iter()
            .map(row_to_map)
            .collect(),
        DbPool::Sqlite(pool) => sqlx::raw_sql(sql)
            .fetch_all(pool)
            .await?
            .iter()
            .map(row_to_map)
            .collect(),
    };
    Ok(rows)
}

/// 将一行结果转为以列名为键的平铺键值对
///
/// 不依赖固定表结构：每列按文本读取，再根据值的类型名还原为数字、布尔或字符串。
/// DECIMAL、日期等类型保留为字符串或数字，不会因类型不受支持而整行失败。
fn row_to_map<R>(row: &R) -> Map<String, Value>
where
    R: Row,
    usize: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database>,
    for<'r> Vec<u8>: Decode<'r, R::Database>,
{
    row.columns()
        .iter()
        .map(|column| (column.name().to_string(), column_value(row, column.ordinal())))
        .collect()
}

fn column_value<R>(row: &R, index: usize) -> Value
where
    R: Row,
    usize: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database>,
    for<'r> Vec<u8>: Decode<'r, R::Database>,
{
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    match row.try_get_unchecked::<String, _>(index) {
        Ok(text) => decode_text(&type_name, text),
        Err(_) => match row.try_get_unchecked::<Vec<u8>, _>(index) {
            Ok(bytes) => Value::from(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Value::Null,
        },
    }
}

/// 根据列类型名把文本值还原为JSON值
fn decode_text(type_name: &str, text: String) -> Value {
    let base = type_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase();

    match base.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "INT2" | "INT4"
        | "INT8" | "YEAR" | "OID" | "FLOAT" | "DOUBLE" | "REAL" | "FLOAT4" | "FLOAT8"
        | "DECIMAL" | "NUMERIC" => parse_number(text),
        "BOOL" | "BOOLEAN" => match text.trim() {
            "t" | "true" | "1" => Value::Bool(true),
            "f" | "false" | "0" => Value::Bool(false),
            _ => Value::String(text),
        },
        _ => Value::String(text),
    }
}

fn parse_number(text: String) -> Value {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Value::from(value);
    }
    if let Ok(value) = trimmed.parse::<u64>() {
        return Value::from(value);
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(text),
    }
}
