//! Data Service Helpers
//!
//! Request validation and the starter menu used by the seeding operation.

use super::{error::StoreError, models::*};

/// Rejects product input the service would not store.
pub fn validate_product_input(input: &ProductInput) -> Result<(), StoreError> {
    if input.name.trim().is_empty() {
        return Err(StoreError::invalid("product name must not be empty"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(StoreError::invalid("product price must be a non-negative number"));
    }
    Ok(())
}

pub fn validate_category_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::invalid("category name must not be empty"));
    }
    Ok(())
}

pub fn validate_profile(profile: &UserProfile) -> Result<(), StoreError> {
    if profile.name.trim().is_empty() {
        return Err(StoreError::invalid("profile name must not be empty"));
    }
    Ok(())
}

/// Checks an order payload before an identifier is assigned.
///
/// The total is stored as submitted; it is not recomputed from the items.
pub fn validate_new_order(order: &NewOrder) -> Result<(), StoreError> {
    if order.items.is_empty() {
        return Err(StoreError::invalid("order must contain at least one item"));
    }
    for item in &order.items {
        if item.quantity == 0 {
            return Err(StoreError::invalid(format!(
                "item {} has zero quantity",
                item.product_id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(StoreError::invalid(format!(
                "item {} has an invalid price",
                item.product_id
            )));
        }
    }
    if !order.total_amount.is_finite() || order.total_amount < 0.0 {
        return Err(StoreError::invalid("total amount must be a non-negative number"));
    }

    let fields = [
        ("customer name", &order.customer_name),
        ("customer email", &order.customer_email),
        ("customer address", &order.customer_address),
    ];
    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(StoreError::invalid(format!("{label} must not be empty")));
        }
    }
    Ok(())
}

/// Starter menu: category name followed by (name, description, price) entries.
pub fn default_menu() -> Vec<(&'static str, Vec<(&'static str, &'static str, f64)>)> {
    vec![
        (
            "Beverages",
            vec![
                ("Masala Chai", "Spiced milk tea brewed with ginger and cardamom", 50.0),
                ("Cold Coffee", "Chilled coffee blended with milk and ice cream", 120.0),
                ("Fresh Lime Soda", "Sweet or salted, made to order", 70.0),
            ],
        ),
        (
            "Pizzas",
            vec![
                ("Margherita", "Tomato, mozzarella and basil", 249.0),
                ("Chicken Tikka Pizza", "Tandoori chicken, onions and peppers", 349.0),
            ],
        ),
        (
            "Snacks",
            vec![
                ("Veg Sandwich", "Grilled sandwich with fresh vegetables", 110.0),
                ("French Fries", "Crisp fries with house seasoning", 99.0),
            ],
        ),
    ]
}

/// Sums `price * quantity` over order items.
pub fn order_items_total(items: &[OrderItem]) -> f64 {
    items
        .iter()
        .map(|i| i.price * f64::from(i.quantity))
        .sum()
}

/// Orders products cheapest first; equal prices keep their id order.
pub fn sort_by_price(products: &mut [Product]) {
    products.sort_by(|a, b| a.price.total_cmp(&b.price));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> NewOrder {
        NewOrder {
            items: vec![OrderItem {
                product_id: 1,
                quantity: 2,
                price: 50.0,
            }],
            total_amount: 100.0,
            customer_name: "Asha".into(),
            customer_email: "a@x.com".into(),
            customer_address: "12 MG Road".into(),
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(validate_new_order(&order()).is_ok());
    }

    #[test]
    fn test_order_without_items_is_rejected() {
        let mut o = order();
        o.items.clear();
        assert!(matches!(validate_new_order(&o), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_order_with_blank_email_is_rejected() {
        let mut o = order();
        o.customer_email = "  ".into();
        let err = validate_new_order(&o).unwrap_err();
        assert!(err.to_string().contains("customer email"));
    }

    #[test]
    fn test_negative_product_price_is_rejected() {
        let input = ProductInput {
            name: "Tea".into(),
            description: String::new(),
            price: -1.0,
            image_url: String::new(),
            available: true,
            category_id: None,
        };
        assert!(validate_product_input(&input).is_err());
    }

    #[test]
    fn test_order_items_total() {
        let items = vec![
            OrderItem { product_id: 1, quantity: 2, price: 50.0 },
            OrderItem { product_id: 2, quantity: 1, price: 120.0 },
        ];
        assert_eq!(order_items_total(&items), 220.0);
    }

    #[test]
    fn test_sort_by_price_is_stable() {
        let product = |id, price| Product {
            id,
            name: format!("Item {id}"),
            description: String::new(),
            price,
            available: true,
            image_url: String::new(),
            category_id: None,
        };
        let mut products = vec![product(1, 99.0), product(2, 50.0), product(3, 99.0), product(4, 10.0)];

        sort_by_price(&mut products);

        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_blank_profile_name_is_rejected() {
        assert!(validate_profile(&UserProfile { name: " ".into() }).is_err());
        assert!(validate_profile(&UserProfile { name: "Asha".into() }).is_ok());
    }
}
