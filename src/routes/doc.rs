use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{ProfileList, SetRoleRequest, UpdateOrderStatusRequest},
        auth::{LoginRequest, LoginResponse},
        cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
        orders::OrderList,
        products::{CategoryList, CategoryProducts, ProductList},
        wishlist::{WishlistToggle, WishlistView},
    },
    identity::{ExternalEmail, ExternalUser, Registration},
    models::{
        CartItem, Category, DashboardStats, Identity, Order, OrderItem, OrderStatus,
        OrderWithItems, PaymentMethod, Product, Role, UserProfile, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        account, admin, auth, cart, categories, health, orders, products, wishlist,
    },
    store::{
        CheckoutForm, ProductSort,
        admin::{CategoryDraft, ProductDraft, ProductPatch},
        profile::ProfileEdit,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::external_sign_in,
        auth::me,
        products::list_products,
        products::featured_products,
        products::get_product,
        categories::list_categories,
        categories::category_products,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::toggle_wishlist,
        orders::list_orders,
        orders::checkout,
        account::get_profile,
        account::edit_profile,
        admin::dashboard,
        admin::list_all_orders,
        admin::update_order_status,
        admin::list_categories,
        admin::create_category,
        admin::delete_category,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_staff,
        admin::list_users,
        admin::set_role
    ),
    components(
        schemas(
            Identity,
            Role,
            UserProfile,
            Category,
            Product,
            ProductSort,
            CartItem,
            WishlistItem,
            Order,
            OrderItem,
            OrderStatus,
            OrderWithItems,
            PaymentMethod,
            DashboardStats,
            Registration,
            ExternalUser,
            ExternalEmail,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartView,
            WishlistView,
            WishlistToggle,
            CheckoutForm,
            ProfileEdit,
            OrderList,
            ProductList,
            CategoryList,
            CategoryProducts,
            CategoryDraft,
            ProductDraft,
            ProductPatch,
            UpdateOrderStatusRequest,
            SetRoleRequest,
            ProfileList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and provider exchange"),
        (name = "Products", description = "Catalog products, with sample fallback"),
        (name = "Categories", description = "Catalog categories, with sample fallback"),
        (name = "Cart", description = "Cart of the signed-in user"),
        (name = "Wishlist", description = "Saved products of the signed-in user"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Account", description = "Profile of the signed-in user"),
        (name = "Admin", description = "Back office, staff and admin only"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
