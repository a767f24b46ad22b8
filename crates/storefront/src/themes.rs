//! Built-in theme rendering.
//!
//! When a store's theme has no uploaded export, its storefront is rendered
//! server-side from one of a small set of built-in templates. The theme slug
//! picks the template family; unrecognized slugs get the generic layout, so
//! a store never renders blank just because its theme is exotic.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;

use crate::filters;
use crate::middleware::CustomerSession;
use crate::platform::{CategorySummary, LiveStore, ProductSummary};

/// Built-in template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Electronics,
    Fashion,
    Generic,
}

impl ThemeKind {
    /// Map a theme slug to its built-in template family.
    ///
    /// Slugs are free-form ("electronics-v2", "fashion-minimal"), so match
    /// on the family prefix.
    #[must_use]
    pub fn from_slug(slug: &str) -> Self {
        let lower = slug.to_ascii_lowercase();
        if lower.starts_with("electronics") || lower.starts_with("tech") {
            Self::Electronics
        } else if lower.starts_with("fashion") || lower.starts_with("apparel") {
            Self::Fashion
        } else {
            Self::Generic
        }
    }
}

/// Store fields shared by every built-in theme.
///
/// Flattened for template use: optional profile fields render as empty
/// strings and templates test `is_empty()` instead of unwrapping.
#[derive(Debug, Clone)]
pub struct StoreView {
    pub name: String,
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub logo_url: String,
    pub contact_email: String,
    pub total_products: u64,
}

/// One product tile.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub discounted: bool,
    pub image: String,
    pub in_stock: bool,
}

/// One category chip.
#[derive(Debug, Clone)]
pub struct CategoryChip {
    pub name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "themes/electronics.html")]
struct ElectronicsTemplate {
    store: StoreView,
    products: Vec<ProductCard>,
    categories: Vec<CategoryChip>,
    customer_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "themes/fashion.html")]
struct FashionTemplate {
    store: StoreView,
    products: Vec<ProductCard>,
    categories: Vec<CategoryChip>,
    customer_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "themes/generic.html")]
struct GenericTemplate {
    store: StoreView,
    products: Vec<ProductCard>,
    categories: Vec<CategoryChip>,
    customer_name: String,
}

/// Render the built-in template for a theme slug.
#[must_use]
pub fn render(theme_slug: &str, live: &LiveStore, customer: Option<&CustomerSession>) -> Response {
    let store = store_view(live);
    let products: Vec<ProductCard> = live.products.iter().map(product_card).collect();
    let categories: Vec<CategoryChip> = live.categories.iter().map(category_chip).collect();
    let customer_name = customer
        .and_then(|record| record.customer.name.clone())
        .unwrap_or_default();

    match ThemeKind::from_slug(theme_slug) {
        ThemeKind::Electronics => ElectronicsTemplate {
            store,
            products,
            categories,
            customer_name,
        }
        .into_response(),
        ThemeKind::Fashion => FashionTemplate {
            store,
            products,
            categories,
            customer_name,
        }
        .into_response(),
        ThemeKind::Generic => GenericTemplate {
            store,
            products,
            categories,
            customer_name,
        }
        .into_response(),
    }
}

fn store_view(live: &LiveStore) -> StoreView {
    let store = &live.store;
    StoreView {
        name: store.name.clone(),
        slug: store.slug.to_string(),
        tagline: store.tagline.clone().unwrap_or_default(),
        description: store.description.clone().unwrap_or_default(),
        logo_url: store.logo_url.clone().unwrap_or_default(),
        contact_email: store.email.clone().unwrap_or_default(),
        total_products: live.total_products,
    }
}

fn product_card(product: &ProductSummary) -> ProductCard {
    let discounted = product
        .compare_at_price
        .is_some_and(|original| original > product.price);
    ProductCard {
        name: product.name.clone(),
        description: product.description.clone().unwrap_or_default(),
        price: product.price,
        original_price: product.compare_at_price.unwrap_or(product.price),
        discounted,
        image: product.images.first().cloned().unwrap_or_default(),
        in_stock: product.inventory_quantity > 0,
    }
}

fn category_chip(category: &CategorySummary) -> CategoryChip {
    CategoryChip {
        name: category.name.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn live_store_with_products() -> LiveStore {
        let json = r#"{
            "store": {
                "id": "t_1",
                "name": "Acme Gadgets",
                "slug": "acme",
                "tagline": "Everything beeps"
            },
            "products": [
                {
                    "id": "p_1",
                    "name": "Widget",
                    "price": 19.99,
                    "compareAtPrice": 24.99,
                    "images": ["https://cdn.example/widget.jpg"],
                    "inventoryQuantity": 5
                },
                {
                    "id": "p_2",
                    "name": "Doodad",
                    "price": 5.00,
                    "inventoryQuantity": 0
                }
            ],
            "categories": [{"id": "c_1", "name": "Gadgets"}],
            "totalProducts": 2
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_theme_families_match_on_prefix() {
        assert_eq!(ThemeKind::from_slug("electronics"), ThemeKind::Electronics);
        assert_eq!(
            ThemeKind::from_slug("electronics-v2"),
            ThemeKind::Electronics
        );
        assert_eq!(ThemeKind::from_slug("Fashion-Minimal"), ThemeKind::Fashion);
        assert_eq!(ThemeKind::from_slug("gardening"), ThemeKind::Generic);
    }

    #[test]
    fn test_product_card_discount_flag() {
        let live = live_store_with_products();
        let card = product_card(&live.products[0]);
        assert!(card.discounted);
        assert_eq!(card.original_price, Decimal::new(2499, 2));
        assert!(card.in_stock);

        let plain = product_card(&live.products[1]);
        assert!(!plain.discounted);
        assert_eq!(plain.original_price, plain.price);
        assert!(!plain.in_stock);
    }

    #[test]
    fn test_store_view_flattens_optional_fields() {
        let live = live_store_with_products();
        let view = store_view(&live);
        assert_eq!(view.name, "Acme Gadgets");
        assert_eq!(view.tagline, "Everything beeps");
        assert!(view.description.is_empty());
        assert!(view.logo_url.is_empty());
    }

    #[test]
    fn test_electronics_template_renders_products_and_prices() {
        let live = live_store_with_products();
        let template = ElectronicsTemplate {
            store: store_view(&live),
            products: live.products.iter().map(product_card).collect(),
            categories: live.categories.iter().map(category_chip).collect(),
            customer_name: String::new(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("Acme Gadgets"));
        assert!(html.contains("Widget"));
        assert!(html.contains("$19.99"));
        assert!(html.contains("$24.99"));
        assert!(html.contains("Sold out"));
    }

    #[test]
    fn test_fashion_template_greets_signed_in_customer() {
        let live = live_store_with_products();
        let template = FashionTemplate {
            store: store_view(&live),
            products: Vec::new(),
            categories: Vec::new(),
            customer_name: "Ada".to_string(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("Ada"));
        assert!(!html.contains("/s/acme/login\""));
    }

    #[test]
    fn test_generic_template_links_login_for_guests() {
        let live = live_store_with_products();
        let template = GenericTemplate {
            store: store_view(&live),
            products: Vec::new(),
            categories: Vec::new(),
            customer_name: String::new(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("/s/acme/login"));
    }
}
