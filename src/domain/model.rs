use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// 解析完成後即為不可變的值物件，除了 id 之外沒有身分概念
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: Category,
}

/// 一次成功取回的產品頁
///
/// `count` 是 wrapper 回應宣稱的筆數，不保證等於 `products.len()`；
/// `skipped` 是因欄位缺漏或不合法而被略過的元素數。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub count: i64,
    pub skipped: usize,
}
