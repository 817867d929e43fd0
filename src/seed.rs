//! Demo data: the store's directory, bank accounts and starter catalog.

use crate::domain::aggregates::{BankAccount, Category, Product, ProductDraft, Role, User, DEFAULT_ADMIN_ID};
use crate::domain::value_objects::{Email, Money};
use crate::repository::Stores;
use crate::sheet::parse_date;

const STORE_HOLDER: &str = "El Amigo E.I.R.L.";

/// (name, category, stock, purchase price, sale price, expiry as typed in the store sheet)
const STARTER_CATALOG: [(&str, Category, u32, f64, f64, &str); 20] = [
    ("SURFAC 820 500ML", Category::Disinfectants, 2, 10.00, 14.00, "5/08/2023"),
    ("SURFAC 820 250ML", Category::Disinfectants, 3, 6.50, 10.00, "19/08/2023"),
    ("PROTEXIN 1 LITRO", Category::Probiotics, 1, 40.00, 53.00, "23/10/2023"),
    ("DORSAN 250ML", Category::Antiparasitics, 3, 16.00, 20.00, "25/08/2022"),
    ("TIFON 1 LITRO LIQUIDO", Category::Fertilizers, 0, 38.00, 45.00, ""),
    ("TIFON 1/4 LIQUIDO", Category::Fertilizers, 3, 14.00, 20.00, ""),
    ("PLATOS DE PERRO GRANDE", Category::PetAccessories, 3, 5.00, 6.50, ""),
    ("PLATO GATO", Category::PetAccessories, 1, 2.50, 4.00, ""),
    ("HORMIFIN GRANULADO", Category::Fertilizers, 4, 6.00, 9.00, ""),
    ("SULFATO DE COBRE DE 1K", Category::Fertilizers, 2, 13.00, 18.00, "Mar-22"),
    ("CURTINE UV DE 500GR", Category::Medicines, 2, 30.00, 42.00, "20/04/2022"),
    ("EVITANE DE 1KG", Category::Medicines, 1, 24.00, 33.00, "20/02/2023"),
    ("TIFON DE 1KG POLVO", Category::Fertilizers, 8, 8.50, 13.00, "Set-23"),
    ("BOMBA 10 DE", Category::Equipment, 6, 13.50, 17.00, "Feb-24"),
    ("RUMIFAR DE 100GR", Category::Medicines, 2, 13.00, 17.00, "Feb-24"),
    ("SULFATO DE MAGNESIO X 1KG", Category::Fertilizers, 4, 7.50, 10.00, ""),
    ("METSUL", Category::Fertilizers, 2, 15.00, 20.00, "23/11/2022"),
    ("POLIFON X 25GR", Category::Vitamins, 10, 7.00, 9.00, "May-23"),
    ("ANTIPAPILOMA DE 20ML", Category::Medicines, 2, 11.00, 15.00, "Nov-22"),
    ("VERRUFIN X 20ML", Category::Medicines, 1, 10.50, 14.00, "Jun-22"),
];

pub fn seed_demo_data(stores: &Stores) {
    seed_users(stores);
    seed_bank_accounts(stores);
    seed_catalog(stores);
    tracing::info!(
        users = stores.users.count(),
        products = stores.products.count(),
        bank_accounts = stores.bank_accounts.count(),
        "demo data loaded"
    );
}

pub fn seed_users(stores: &Stores) {
    let directory = [
        (DEFAULT_ADMIN_ID, "Diana", "diana@admin.com", Role::Admin, "Zaru2025"),
        ("user-001", "Donato", "donato@gmail.com", Role::Employee, "123"),
        ("user-002", "Alex", "alex@vetstock.com", Role::Employee, "123"),
        ("user-003", "Maria", "maria@vetstock.com", Role::Employee, "123"),
        ("user-004", "Jane", "jane@vetstock.com", Role::Employee, "123"),
    ];
    for (id, name, email, role, password) in directory {
        if stores.users.contains(id) {
            continue;
        }
        let mut user = User::new(id, name, Email::new(email), role, password);
        user.take_events();
        stores.users.append(user);
    }
}

pub fn seed_bank_accounts(stores: &Stores) {
    let accounts = [
        BankAccount::new("acc-001", "Banco de Crédito del Perú (BCP)", STORE_HOLDER, "123-4567890-1-23", Some("00212300456789012398".into())),
        BankAccount::new("acc-002", "Interbank", STORE_HOLDER, "098-7654321000", Some("00309801076543210051".into())),
    ];
    for account in accounts {
        if !stores.bank_accounts.contains(&account.id) {
            stores.bank_accounts.append(account);
        }
    }
}

pub fn seed_catalog(stores: &Stores) {
    for (i, (name, category, stock, purchase, sale, expiry)) in STARTER_CATALOG.into_iter().enumerate() {
        let id = format!("prod-{:03}", i + 1);
        if stores.products.contains(&id) {
            continue;
        }
        let draft = ProductDraft {
            name: name.to_string(),
            barcode: None,
            category,
            stock,
            purchase_price: Money::from_f64(purchase).unwrap_or(Money::ZERO),
            sale_price: Money::from_f64(sale).unwrap_or(Money::ZERO),
            expiry_date: parse_date(expiry),
            image_url: None,
        };
        match Product::create(id, draft) {
            Ok(mut product) => {
                product.take_events();
                stores.products.append(product);
            }
            Err(e) => tracing::warn!(name, error = %e, "skipping starter product"),
        }
    }
}
