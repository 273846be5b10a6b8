//! 平铺键值对解析
//!
//! SQL结果列只能是平铺的，列名里用 `.` 表达层级（如 `Extend.Region`），
//! 这里把它们还原为嵌套对象。

use std::collections::HashMap;

use serde_json::{Map, Value};

const KEY_SEPARATOR: char = '.';

/// 将平铺键值对递归解析为嵌套对象
///
/// 不含 `.` 的键原样保留；含 `.` 的键按第一段分组，剩余部分重新用 `.` 拼接
/// 作为子对象的键，再对子对象递归解析。每层递归键的段数严格减少，因此必然终止。
/// 同名的普通键与分组键冲突时，分组结果覆盖普通键。
pub fn parse_nested(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut nested = Map::new();
    let mut groups: HashMap<&str, Map<String, Value>> = HashMap::new();

    for (key, value) in flat {
        match key.split_once(KEY_SEPARATOR) {
            Some((head, rest)) => {
                groups
                    .entry(head)
                    .or_default()
                    .insert(rest.to_string(), value.clone());
            }
            None => {
                nested.insert(key.clone(), value.clone());
            }
        }
    }

    for (head, group) in groups {
        nested.insert(head.to_string(), Value::Object(parse_nested(&group)));
    }

    nested
}

/// 解析为整数
///
/// 支持各类数字以及十进制字符串，小数向零截断；空值或无法解析时返回0。
pub fn parse_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|n| n.min(i64::MAX as u64) as i64))
            .or_else(|| number.as_f64().map(|n| n as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|n| n.is_finite()).map(|n| n as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
