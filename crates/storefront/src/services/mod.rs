//! Resource services.
//!
//! One small struct per remote resource, each holding the shared
//! [`ApiClient`]. Methods map one-to-one onto API endpoints: build the path,
//! attach the body or query, flag whether the bearer credential is needed,
//! and hand the request to the adapter. Failures propagate unchanged.

mod address;
mod auth;
mod baby;
mod blog;
mod brand;
mod cart;
mod category;
mod hospital;
mod order;
mod product;

pub use address::AddressService;
pub use auth::AuthService;
pub use baby::BabyService;
pub use blog::BlogService;
pub use brand::BrandService;
pub use cart::CartService;
pub use category::CategoryService;
pub use hospital::HospitalService;
pub use order::OrderService;
pub use product::ProductService;

use babynest_core::ApiResponse;

use crate::api::ApiClient;

/// Body of mutations whose payload callers do not need.
pub type Acknowledgement = ApiResponse<serde_json::Value>;

/// Every resource service over one shared client.
#[derive(Debug, Clone)]
pub struct Services {
    pub address: AddressService,
    pub auth: AuthService,
    pub baby: BabyService,
    pub blog: BlogService,
    pub brand: BrandService,
    pub cart: CartService,
    pub category: CategoryService,
    pub hospital: HospitalService,
    pub order: OrderService,
    pub product: ProductService,
}

impl Services {
    #[must_use]
    pub fn new(api: &ApiClient) -> Self {
        Self {
            address: AddressService::new(api.clone()),
            auth: AuthService::new(api.clone()),
            baby: BabyService::new(api.clone()),
            blog: BlogService::new(api.clone()),
            brand: BrandService::new(api.clone()),
            cart: CartService::new(api.clone()),
            category: CategoryService::new(api.clone()),
            hospital: HospitalService::new(api.clone()),
            order: OrderService::new(api.clone()),
            product: ProductService::new(api.clone()),
        }
    }
}
