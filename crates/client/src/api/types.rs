//! Request and response bodies of the REST API.
//!
//! Field names follow the backend's `snake_case` JSON.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use shopapp_core::{CategoryId, OrderId, OrderStatus, Price, ProductId, ProductImageId, RoleId, UserId};

use crate::cart::CartItem;

// =============================================================================
// Categories
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Body of category create and update requests.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDto {
    pub name: String,
}

// =============================================================================
// Products
// =============================================================================

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// File name of the thumbnail, relative to the image endpoint.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub product_images: Vec<ProductImage>,
    /// Absolute thumbnail URL, filled in by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image_url: String,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total number of pages, when the backend reports it.
    pub total_pages: Option<u32>,
}

/// The product listing comes back either as a bare array or wrapped with a
/// page count, depending on the backend version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductListResponse {
    Paged {
        products: Vec<Product>,
        #[serde(rename = "totalPages", alias = "total_pages")]
        total_pages: u32,
    },
    Bare(Vec<Product>),
}

impl From<ProductListResponse> for ProductPage {
    fn from(response: ProductListResponse) -> Self {
        match response {
            ProductListResponse::Paged {
                products,
                total_pages,
            } => Self {
                products,
                total_pages: Some(total_pages),
            },
            ProductListResponse::Bare(products) => Self {
                products,
                total_pages: None,
            },
        }
    }
}

/// Filter for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub keyword: String,
    /// `None` lists every category (sent as `0`).
    pub category_id: Option<CategoryId>,
    /// Zero-based page index.
    pub page: u32,
    pub limit: u32,
}

/// Body of product create and update requests.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub category_id: CategoryId,
}

/// Response of the image upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
}

/// A file to upload as a product image.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Orders
// =============================================================================

/// Body of order placement and update requests.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDto {
    pub user_id: UserId,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub total_money: Price,
    pub shipping_method: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub cart_items: Vec<CartItem>,
}

/// An order as returned by the orders endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub fullname: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_money: Price,
    #[serde(default)]
    pub shipping_method: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub order_details: Vec<OrderDetail>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub product: Option<Product>,
    pub price: Price,
    pub number_of_products: u32,
    pub total_money: Price,
}

/// Filter for the order search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub keyword: String,
    pub page: u32,
    pub limit: u32,
}

// =============================================================================
// Users
// =============================================================================

/// Body of the login request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginDto {
    pub phone_number: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    pub role_id: RoleId,
}

/// Response of the login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

/// Body of the registration request.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterDto {
    pub fullname: String,
    pub phone_number: String,
    pub address: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    #[serde(serialize_with = "expose_secret")]
    pub retype_password: SecretString,
    pub date_of_birth: NaiveDate,
    pub facebook_account_id: i64,
    pub google_account_id: i64,
    pub role_id: RoleId,
}

/// Body of the profile update request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserDto {
    pub fullname: String,
    pub address: String,
    #[serde(serialize_with = "expose_optional_secret", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    #[serde(serialize_with = "expose_optional_secret", skip_serializing_if = "Option::is_none")]
    pub retype_password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::ref_option)] // signature required by serialize_with
fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product_json(id: i32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": 19.5,
            "thumbnail": "a.png",
            "description": "",
            "category_id": 2,
        })
    }

    #[test]
    fn test_product_list_bare_array() {
        let json = serde_json::json!([product_json(1), product_json(2)]);
        let page: ProductPage = serde_json::from_value::<ProductListResponse>(json)
            .unwrap()
            .into();
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn test_product_list_paged() {
        let json = serde_json::json!({ "products": [product_json(1)], "totalPages": 4 });
        let page: ProductPage = serde_json::from_value::<ProductListResponse>(json)
            .unwrap()
            .into();
        assert_eq!(page.products[0].price.amount(), Decimal::new(195, 1));
        assert_eq!(page.total_pages, Some(4));
    }

    #[test]
    fn test_product_optional_fields_default() {
        let product: Product =
            serde_json::from_value(serde_json::json!({ "id": 3, "name": "Bare", "price": 1 }))
                .unwrap();
        assert!(product.thumbnail.is_none());
        assert!(product.product_images.is_empty());
        assert!(product.category_id.is_none());
    }

    #[test]
    fn test_login_dto_sends_password_but_debug_hides_it() {
        let dto = LoginDto {
            phone_number: "0912345678".to_string(),
            password: SecretString::from("hunter2-hunter2"),
            role_id: RoleId::new(1),
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["password"], "hunter2-hunter2");
        assert_eq!(json["role_id"], 1);

        assert!(!format!("{dto:?}").contains("hunter2"));
    }

    #[test]
    fn test_update_user_dto_skips_absent_password() {
        let dto = UpdateUserDto {
            fullname: "Nguyen Van A".to_string(),
            address: "Ha Noi".to_string(),
            password: None,
            retype_password: None,
            date_of_birth: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("date_of_birth").is_none());
    }

    #[test]
    fn test_order_dto_serializes_cart_items() {
        let dto = OrderDto {
            user_id: UserId::new(7),
            fullname: "A".to_string(),
            email: String::new(),
            phone_number: "0900000000".to_string(),
            address: "Somewhere".to_string(),
            note: String::new(),
            total_money: Price::new(Decimal::new(3000, 2)),
            shipping_method: "express".to_string(),
            payment_method: "cod".to_string(),
            coupon_code: None,
            cart_items: vec![CartItem {
                product_id: ProductId::new(5),
                quantity: 2,
            }],
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json["cart_items"],
            serde_json::json!([{ "product_id": 5, "quantity": 2 }])
        );
        assert!(json.get("coupon_code").is_none());
    }

    #[test]
    fn test_order_parses_backend_shape() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 11,
            "user_id": 7,
            "fullname": "A",
            "phone_number": "0900000000",
            "order_date": "2024-05-01",
            "status": "shipped",
            "total_money": 30.0,
            "order_details": [{
                "id": 1,
                "product": null,
                "price": 15.0,
                "number_of_products": 2,
                "total_money": 30.0
            }]
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.order_details.len(), 1);
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }
}
