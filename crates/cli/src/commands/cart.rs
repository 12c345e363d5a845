//! The local shopping cart.
//!
//! Stands in for the browser cart: a JSON file keyed by product id, durable
//! across invocations, rehydrated on every run. Totals shown here come from
//! the same pricing formula the order engine applies, so the preview matches
//! what the server will charge. A cart file that cannot be read or parsed is
//! treated as empty rather than an error, like local storage.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Deserialize;

use clementine_core::{Cart, CartItem, ProductId};

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product to the cart (quantities merge per product)
    Add {
        product_id: i32,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity for a product (0 removes it)
    Update {
        product_id: i32,
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove { product_id: i32 },
    /// Show the cart with its price breakdown
    List,
    /// Empty the cart
    Clear,
    /// Submit the cart as an order; clears the cart on success
    Checkout {
        #[arg(long)]
        user_id: i32,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        zip_code: String,
        #[arg(long, default_value = "USA")]
        country: String,
        /// card, paypal, apple_pay, or google_pay
        #[arg(long, default_value = "card")]
        payment_method: String,
    },
}

/// Product fields the cart needs from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductView {
    name: String,
    price: Decimal,
    #[serde(default)]
    images: Vec<String>,
}

/// Order fields the confirmation needs from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderView {
    id: i32,
    prices: PricesView,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricesView {
    total_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Run a cart subcommand.
///
/// # Errors
///
/// Returns an error if the API is unreachable, the server rejects a request,
/// or the cart file cannot be written.
pub async fn run(
    action: CartAction,
    cart_file: Option<String>,
    api_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = cart_path(cart_file);
    let mut cart = load_cart(&path);

    match action {
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product_id = ProductId::new(product_id);
            let product = fetch_product(api_url, product_id).await?;

            cart.add(CartItem {
                product_id,
                name: product.name.clone(),
                price: product.price,
                image: product.images.first().cloned(),
                quantity,
            });
            save_cart(&path, &cart)?;
            tracing::info!(product = product.name, quantity, "added to cart");
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            cart.update_quantity(ProductId::new(product_id), quantity);
            save_cart(&path, &cart)?;
            tracing::info!(product_id, quantity, "cart updated");
        }
        CartAction::Remove { product_id } => {
            cart.remove(ProductId::new(product_id));
            save_cart(&path, &cart)?;
            tracing::info!(product_id, "removed from cart");
        }
        CartAction::List => print_cart(&cart),
        CartAction::Clear => {
            cart.clear();
            save_cart(&path, &cart)?;
            tracing::info!("cart cleared");
        }
        CartAction::Checkout {
            user_id,
            first_name,
            last_name,
            address,
            city,
            zip_code,
            country,
            payment_method,
        } => {
            if cart.is_empty() {
                return Err("cart is empty".into());
            }

            let payload = checkout_payload(
                &cart,
                user_id,
                &first_name,
                &last_name,
                &address,
                &city,
                &zip_code,
                &country,
                &payment_method,
            );
            let order = submit_order(api_url, &payload).await?;

            cart.clear();
            save_cart(&path, &cart)?;
            tracing::info!(
                order = order.id,
                total = %order.prices.total_price,
                "order placed, cart cleared"
            );
        }
    }

    Ok(())
}

/// Resolve the cart file path: flag, then env var, then the default name.
fn cart_path(flag: Option<String>) -> PathBuf {
    flag.or_else(|| std::env::var("CLEMENTINE_CART_FILE").ok())
        .unwrap_or_else(|| ".clementine-cart.json".to_string())
        .into()
}

/// Rehydrate the cart, treating a missing or corrupt file as empty.
fn load_cart(path: &Path) -> Cart {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str(&contents).ok())
        .unwrap_or_default()
}

/// Persist the cart as JSON.
fn save_cart(path: &Path, cart: &Cart) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(cart)?)?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>4} x {:<40} {:>10}",
            item.quantity, item.name, item.price
        );
    }

    let totals = cart.totals();
    println!("{:->60}", "");
    println!("{:>47} {:>10}", "items", totals.items_price);
    println!("{:>47} {:>10}", "shipping", totals.shipping_price);
    println!("{:>47} {:>10}", "tax", totals.tax_price);
    println!("{:>47} {:>10}", "total", totals.total_price);
}

async fn fetch_product(
    api_url: &str,
    id: ProductId,
) -> Result<ProductView, Box<dyn std::error::Error>> {
    let response = reqwest::get(format!("{api_url}/api/products/{id}")).await?;

    if !response.status().is_success() {
        let message = response
            .json::<ApiMessage>()
            .await
            .map_or_else(|_| "product fetch failed".to_string(), |m| m.message);
        return Err(message.into());
    }

    Ok(response.json::<ProductView>().await?)
}

#[allow(clippy::too_many_arguments)]
fn checkout_payload(
    cart: &Cart,
    user_id: i32,
    first_name: &str,
    last_name: &str,
    address: &str,
    city: &str,
    zip_code: &str,
    country: &str,
    payment_method: &str,
) -> serde_json::Value {
    let order_items: Vec<serde_json::Value> = cart
        .items()
        .iter()
        .map(|item| {
            serde_json::json!({
                "product": item.product_id,
                "name": item.name,
                "price": item.price,
                "quantity": item.quantity,
                "image": item.image,
            })
        })
        .collect();

    serde_json::json!({
        "userId": user_id,
        "orderItems": order_items,
        "shippingAddress": {
            "firstName": first_name,
            "lastName": last_name,
            "address": address,
            "city": city,
            "zipCode": zip_code,
            "country": country,
        },
        "paymentInfo": {
            "method": payment_method,
            "status": "completed",
        },
    })
}

async fn submit_order(
    api_url: &str,
    payload: &serde_json::Value,
) -> Result<OrderView, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{api_url}/api/orders"))
        .json(payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let message = response
            .json::<ApiMessage>()
            .await
            .map_or_else(|_| "order rejected".to_string(), |m| m.message);
        return Err(message.into());
    }

    Ok(response.json::<OrderView>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            price: price.parse().expect("decimal literal"),
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_cart_file_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "clementine-cart-test-{}.json",
            std::process::id()
        ));

        let mut cart = Cart::new();
        cart.add(item(1, "19.99", 2));
        save_cart(&path, &cart).expect("save");

        let restored = load_cart(&path);
        assert_eq!(restored, cart);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_cart_file_is_empty() {
        let cart = load_cart(Path::new("/nonexistent/clementine-cart.json"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_corrupt_cart_file_is_empty() {
        let path = std::env::temp_dir().join(format!(
            "clementine-cart-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{not json").expect("write");

        let cart = load_cart(&path);
        assert!(cart.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checkout_payload_shape() {
        let mut cart = Cart::new();
        cart.add(item(3, "20", 2));

        let payload = checkout_payload(
            &cart, 7, "Ada", "Lovelace", "12 Analytical Row", "London", "EC1A", "UK", "card",
        );

        assert_eq!(payload["userId"], 7);
        assert_eq!(payload["orderItems"][0]["product"], 3);
        assert_eq!(payload["orderItems"][0]["quantity"], 2);
        assert_eq!(payload["shippingAddress"]["zipCode"], "EC1A");
        assert_eq!(payload["paymentInfo"]["status"], "completed");
    }

    #[test]
    fn test_cart_path_default() {
        // Flag wins over everything
        assert_eq!(
            cart_path(Some("/tmp/my-cart.json".to_string())),
            PathBuf::from("/tmp/my-cart.json")
        );
    }
}
