use crate::domain::model::{CatalogPage, Category, Product};
use crate::utils::error::FetchFailure;
use serde_json::{Map, Value};

/// 解析產品清單回應
///
/// 先依 HTTP 狀態碼分類，2xx 才嘗試解析本文。本文接受三種形狀
/// （依優先順序）：裸陣列（legacy）、`{"data": [...], "count": n}`
/// （wrapper，現行格式）、以及 `products` / `items` 別名鍵。
/// 純函數，無任何副作用；診斷輸出是呼叫端的責任。
pub fn resolve(raw_body: &str, status: u16) -> Result<CatalogPage, FetchFailure> {
    if let Some(failure) = classify_status(status) {
        return Err(failure);
    }

    let root: Value = serde_json::from_str(raw_body)
        .map_err(|e| FetchFailure::malformed_json(&e.to_string(), raw_body))?;

    match root {
        Value::Array(items) => Ok(collect_products(&items, None)),
        Value::Object(obj) => resolve_wrapper(&obj),
        _ => Err(FetchFailure::unrecognized_root()),
    }
}

/// 狀態碼分類，回傳 None 表示 2xx、可以解析本文
pub(crate) fn classify_status(status: u16) -> Option<FetchFailure> {
    match status {
        200..=299 => None,
        404 => Some(FetchFailure::not_found()),
        408 => Some(FetchFailure::timeout()),
        500..=599 => Some(FetchFailure::server_error(status)),
        _ => Some(FetchFailure::http_error(status)),
    }
}

fn resolve_wrapper(obj: &Map<String, Value>) -> Result<CatalogPage, FetchFailure> {
    // 依優先順序找出清單鍵，容忍 API 命名漂移
    for key in ["data", "products", "items"] {
        if let Some(Value::Array(items)) = lookup(obj, key) {
            // wrapper 宣稱的 count 原樣帶出，不跟實際長度對齊
            let reported = lookup(obj, "count").and_then(coerce_i64);
            return Ok(collect_products(items, reported));
        }
    }
    Err(FetchFailure::unrecognized_object())
}

fn collect_products(items: &[Value], reported_count: Option<i64>) -> CatalogPage {
    let mut products = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for item in items {
        match parse_product(item) {
            Some(product) => products.push(product),
            // 單一元素壞掉不拖垮整份清單
            None => skipped += 1,
        }
    }

    let count = reported_count.unwrap_or(products.len() as i64);
    CatalogPage {
        products,
        count,
        skipped,
    }
}

/// 欄位名稱比對不分大小寫
fn lookup<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.iter()
        .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value))
}

/// 數值欄位接受 JSON 數字或數字字串
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn parse_product(value: &Value) -> Option<Product> {
    let obj = value.as_object()?;

    let id = coerce_i64(lookup(obj, "id")?)?;
    let name = coerce_string(lookup(obj, "name")?)?;
    let price = coerce_f64(lookup(obj, "price")?)?;
    let stock = coerce_i64(lookup(obj, "stock")?)?;

    if !price.is_finite() || price <= 0.0 || stock < 0 {
        return None;
    }

    let category = parse_category(lookup(obj, "category")?)?;

    Some(Product {
        id,
        name,
        price,
        stock,
        category,
    })
}

fn parse_category(value: &Value) -> Option<Category> {
    let obj = value.as_object()?;

    let id = coerce_i64(lookup(obj, "id")?)?;
    let name = coerce_string(lookup(obj, "name")?)?;
    if name.is_empty() || name.chars().count() > 50 {
        return None;
    }

    // description 允許為空字串，缺漏時視為空
    let description = lookup(obj, "description")
        .and_then(coerce_string)
        .unwrap_or_default();
    if description.chars().count() > 200 {
        return None;
    }

    Some(Category {
        id,
        name,
        description,
    })
}
