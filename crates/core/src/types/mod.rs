//! Domain types for the Babynest marketplace API.
//!
//! Records mirror the JSON the API returns; request payloads mirror what it
//! accepts. Everything here is plain data.

pub mod address;
pub mod baby;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod envelope;
pub mod id;
pub mod order;
pub mod params;
pub mod status;
pub mod upload;
pub mod user;

pub use address::{Address, AddressInput};
pub use baby::{Baby, BabyInput, VaccineDateUpdate, VaccineRecord};
pub use cart::{AddToCart, CartItem, CheckoutDetail, ItemType, UpdateCartItem};
pub use catalog::{Brand, BrandSummary, Category, Product, ProductVariant};
pub use content::{Blog, Hospital};
pub use envelope::{ApiResponse, Paginated};
pub use id::*;
pub use order::{NewOrder, Order, OrderItem};
pub use params::{HospitalFilter, PageParams, ProductFilter, QueryParams};
pub use status::*;
pub use upload::FileUpload;
pub use user::{GoogleLogin, LoginRequest, LoginResponse, RegisterInput, User};
