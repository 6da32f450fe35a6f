//! Built-in sample catalog, shown when the gateway is unreachable or empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Category, Product};

const CATEGORY_BASE: u128 = 0x6a1f_0c2e_0000_4000_8000_0000_0000_0000;
const PRODUCT_BASE: u128 = 0x6a1f_0c2e_0001_4000_8000_0000_0000_0000;

fn sample_time() -> DateTime<Utc> {
    // 2025-01-27T00:00:00Z
    DateTime::from_timestamp(1_737_936_000, 0).unwrap_or_default()
}

pub fn category_id(n: u128) -> Uuid {
    Uuid::from_u128(CATEGORY_BASE + n)
}

pub fn product_id(n: u128) -> Uuid {
    Uuid::from_u128(PRODUCT_BASE + n)
}

pub fn sample_categories() -> Vec<Category> {
    [
        (
            "Air Conditioners",
            "air-conditioners",
            "Cool your home",
            "https://images.pexels.com/photos/5490235/pexels-photo-5490235.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Televisions",
            "televisions",
            "Entertainment systems",
            "https://images.pexels.com/photos/1201996/pexels-photo-1201996.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Ovens",
            "ovens",
            "Kitchen appliances",
            "https://images.pexels.com/photos/2635038/pexels-photo-2635038.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Washing Machines",
            "washing-machines",
            "Laundry solutions",
            "https://images.pexels.com/photos/5824900/pexels-photo-5824900.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Refrigerators",
            "refrigerators",
            "Keep food fresh",
            "https://images.pexels.com/photos/2343468/pexels-photo-2343468.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Deep Freezers",
            "deep-freezers",
            "Frozen storage",
            "https://images.pexels.com/photos/2343468/pexels-photo-2343468.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
    ]
    .into_iter()
    .zip(1u128..)
    .map(|((name, slug, description, image_url), n)| Category {
        id: category_id(n),
        name: name.into(),
        slug: slug.into(),
        description: description.into(),
        image_url: image_url.into(),
        created_at: sample_time(),
    })
    .collect()
}

fn specs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn sample_products() -> Vec<Product> {
    let rows: [(&str, &str, i64, i32, BTreeMap<String, String>, &str); 6] = [
        (
            "Samsung 1.5 Ton Split AC",
            "Energy efficient air conditioner with inverter technology",
            45_000,
            10,
            specs(&[
                ("capacity", "1.5 Ton"),
                ("type", "Split"),
                ("energy_rating", "5 Star"),
            ]),
            "https://images.pexels.com/photos/5490235/pexels-photo-5490235.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "LG 43\" Smart TV",
            "4K Ultra HD Smart TV with WebOS",
            35_000,
            15,
            specs(&[
                ("size", "43 inch"),
                ("resolution", "4K"),
                ("smart", "Yes"),
            ]),
            "https://images.pexels.com/photos/1201996/pexels-photo-1201996.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Walton 25L Microwave Oven",
            "Digital microwave oven with grill function",
            12_000,
            8,
            specs(&[
                ("capacity", "25L"),
                ("type", "Digital"),
                ("grill", "Yes"),
            ]),
            "https://images.pexels.com/photos/2635038/pexels-photo-2635038.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Haier 8kg Washing Machine",
            "Front load washing machine with multiple wash programs",
            28_000,
            5,
            specs(&[
                ("capacity", "8kg"),
                ("type", "Front Load"),
                ("rpm", "1200"),
            ]),
            "https://images.pexels.com/photos/5824900/pexels-photo-5824900.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Singer 350L Refrigerator",
            "Double door refrigerator with frost-free technology",
            32_000,
            12,
            specs(&[
                ("capacity", "350L"),
                ("type", "Double Door"),
                ("frost_free", "Yes"),
            ]),
            "https://images.pexels.com/photos/2343468/pexels-photo-2343468.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
        (
            "Jamuna 200L Deep Freezer",
            "Chest freezer with energy efficient compressor",
            22_000,
            6,
            specs(&[
                ("capacity", "200L"),
                ("type", "Chest"),
                ("energy_rating", "4 Star"),
            ]),
            "https://images.pexels.com/photos/2343468/pexels-photo-2343468.jpeg?auto=compress&cs=tinysrgb&w=500",
        ),
    ];

    rows.into_iter()
        .zip(1u128..)
        .map(
            |((name, description, price, stock, specifications, image_url), n)| Product {
                id: product_id(n),
                name: name.into(),
                description: description.into(),
                price: Decimal::from(price),
                category_id: Some(category_id(n)),
                image_url: image_url.into(),
                specifications,
                stock,
                featured: true,
                created_at: sample_time(),
                updated_at: sample_time(),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sample_product_belongs_to_a_sample_category() {
        let categories = sample_categories();
        let products = sample_products();
        assert_eq!(categories.len(), 6);
        assert_eq!(products.len(), 6);
        for product in &products {
            assert!(
                categories
                    .iter()
                    .any(|c| Some(c.id) == product.category_id)
            );
            assert!(product.featured && product.is_purchasable());
        }
    }
}
